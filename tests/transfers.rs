use curtain::{Ciphers, Entry, Error, Receiver, Sender};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn three_entries() -> Vec<Entry> {
    vec![
        Entry::new("k1", "v1"),
        Entry::new("k2", "v2"),
        Entry::new("k3", "v3"),
    ]
}

#[test]
fn test_single_entry_retrieval() -> Result<(), Error> {
    let entries = vec![Entry::new("a", "hello")];
    assert_eq!(curtain::simulate(&entries, "a")?, "hello");
    Ok(())
}

#[test]
fn test_middle_pick_of_three() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();

    for conceal in [false, true] {
        let sender = Sender::new(&mut rng, conceal)?;
        let prepared = sender.prepare(&three_entries())?;

        let mut receiver = Receiver::new(&sender.publish_key(), conceal);
        let request = receiver.build_request(&mut rng, "k2")?;
        let ciphers = sender.retrieve(&mut rng, &request, &prepared)?;

        let values = receiver.decrypt_response(&ciphers)?;
        assert_eq!(values.len(), 1);
        assert_eq!(values["k2"], "v2");

        // A different receiver which chose another index cannot use the same
        // response map: its stored secret belongs to a foreign request key.
        let mut other = Receiver::new(&sender.publish_key(), conceal);
        other.build_request(&mut rng, "k1")?;
        let expected = if conceal {
            Error::NoMatchingCipher
        } else {
            Error::AuthFailed
        };
        assert_eq!(other.decrypt_response(&ciphers), Err(expected));
    }

    Ok(())
}

#[test]
fn test_prepared_entries_are_reusable_across_rounds() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();
    let entries = three_entries();

    let sender = Sender::new(&mut rng, true)?;
    let prepared = sender.prepare(&entries)?;

    // The cached index points depend only on the Sender's long-term key.
    assert_eq!(sender.prepare(&entries)?, prepared);
    let indices: Vec<_> = prepared.iter().map(|p| p.index()).collect();
    assert_eq!(indices, ["k1", "k2", "k3"]);

    let mut first = Receiver::new(&sender.publish_key(), true);
    let request = first.build_request(&mut rng, "k1")?;
    let ciphers = sender.retrieve(&mut rng, &request, &prepared)?;
    assert_eq!(first.decrypt_response(&ciphers)?["k1"], "v1");

    let mut second = Receiver::new(&sender.publish_key(), true);
    let request = second.build_request(&mut rng, "k3")?;
    let ciphers = sender.retrieve(&mut rng, &request, &prepared)?;
    assert_eq!(second.decrypt_response(&ciphers)?["k3"], "v3");

    Ok(())
}

#[test]
fn test_tampered_ciphertexts_are_rejected() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();

    let sender = Sender::new(&mut rng, true)?;
    let prepared = sender.prepare(&three_entries())?;

    let mut receiver = Receiver::new(&sender.publish_key(), true);
    let request = receiver.build_request(&mut rng, "k2")?;
    let ciphers = sender.retrieve(&mut rng, &request, &prepared)?;

    // Flip one bit in each ciphertext, once in the nonce prefix and once in
    // the authenticated payload; the chosen entry must fail to open.
    for flipped_byte in [0, 30] {
        let corrupted: Ciphers = ciphers
            .iter()
            .map(|(index, cipher)| {
                let mut cipher = cipher.to_vec();
                cipher[flipped_byte] ^= 1;
                (index.to_string(), cipher)
            })
            .collect();

        assert_eq!(receiver.decrypt_response(&corrupted), Err(Error::AuthFailed));
    }

    // The untampered map still decrypts: failed calls retained the secrets.
    assert_eq!(receiver.decrypt_response(&ciphers)?["k2"], "v2");
    Ok(())
}

#[test]
fn test_responses_from_a_foreign_sender_are_rejected() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();
    let entries = three_entries();

    for (conceal, expected) in [(true, Error::NoMatchingCipher), (false, Error::AuthFailed)] {
        let sender_a = Sender::new(&mut rng, conceal)?;
        let sender_b = Sender::new(&mut rng, conceal)?;

        let mut receiver = Receiver::new(&sender_a.publish_key(), conceal);
        let request = receiver.build_request(&mut rng, "k2")?;

        let prepared_b = sender_b.prepare(&entries)?;
        let foreign = sender_b.retrieve(&mut rng, &request, &prepared_b)?;

        assert_eq!(receiver.decrypt_response(&foreign), Err(expected));
    }

    Ok(())
}

#[test]
fn test_oversized_indices_are_rejected_by_both_parties() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();
    let oversized = "a".repeat(33);

    let sender = Sender::new(&mut rng, true)?;
    assert_eq!(
        sender.prepare(&[Entry::new(oversized.clone(), "v")]),
        Err(Error::InvalidIndex)
    );

    let mut receiver = Receiver::new(&sender.publish_key(), true);
    assert_eq!(
        receiver.build_request(&mut rng, &oversized),
        Err(Error::InvalidIndex)
    );

    Ok(())
}

#[test]
fn test_duplicate_indices_are_rejected() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();
    let sender = Sender::new(&mut rng, true)?;

    let duplicated = vec![
        Entry::new("k1", "v1"),
        Entry::new("k2", "v2"),
        Entry::new("k1", "other"),
    ];
    assert_eq!(sender.prepare(&duplicated), Err(Error::DuplicateIndex));

    let prepared = sender.prepare(&three_entries())?;
    let twice: Vec<_> = prepared.iter().chain(prepared.iter()).cloned().collect();

    let mut receiver = Receiver::new(&sender.publish_key(), true);
    let request = receiver.build_request(&mut rng, "k1")?;
    assert_eq!(
        sender.retrieve(&mut rng, &request, &twice),
        Err(Error::DuplicateIndex)
    );

    Ok(())
}

#[test]
fn test_request_keys_do_not_leak_the_chosen_index() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();
    let sender = Sender::new(&mut rng, true)?;

    // Request keys are freshly blinded per call: no repetitions, regardless
    // of whether the chosen index stays fixed or varies.
    let mut seen = std::collections::HashSet::new();
    for i in 0..64 {
        let mut receiver = Receiver::new(&sender.publish_key(), true);
        let fixed = receiver.build_request(&mut rng, "k1")?;
        assert!(seen.insert(fixed.to_bytes()));

        let varying = receiver.build_request(&mut rng, &format!("k{i}"))?;
        assert!(seen.insert(varying.to_bytes()));
    }

    Ok(())
}

#[test]
fn test_concealed_response_indices_hide_the_entry_indices() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();
    let entries = three_entries();

    let sender = Sender::new(&mut rng, true)?;
    let prepared = sender.prepare(&entries)?;

    let mut receiver = Receiver::new(&sender.publish_key(), true);
    let request = receiver.build_request(&mut rng, "k2")?;
    let ciphers = sender.retrieve(&mut rng, &request, &prepared)?;

    for (response_index, _) in ciphers.iter() {
        assert_eq!(response_index.len(), 64);
        assert!(response_index.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(entries.iter().all(|e| e.index != response_index));
    }

    Ok(())
}

#[test]
fn test_response_indices_do_not_depend_on_entry_order() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();

    let sender = Sender::new(&mut rng, true)?;
    let mut reversed = three_entries();
    reversed.reverse();

    let mut receiver = Receiver::new(&sender.publish_key(), true);
    let request = receiver.build_request(&mut rng, "k2")?;

    let ciphers = sender.retrieve(&mut rng, &request, &sender.prepare(&three_entries())?)?;
    let shuffled = sender.retrieve(&mut rng, &request, &sender.prepare(&reversed)?)?;

    // Up to map-key equality, the observable response map is the same.
    let keys: Vec<_> = ciphers.iter().map(|(i, _)| i.to_string()).collect();
    let shuffled_keys: Vec<_> = shuffled.iter().map(|(i, _)| i.to_string()).collect();
    assert_eq!(keys, shuffled_keys);

    Ok(())
}

#[test]
fn test_accumulated_requests_decrypt_from_merged_responses() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();

    let sender = Sender::new(&mut rng, true)?;
    let prepared = sender.prepare(&three_entries())?;
    let mut receiver = Receiver::new(&sender.publish_key(), true);

    let request_1 = receiver.build_request(&mut rng, "k1")?;
    let request_3 = receiver.build_request(&mut rng, "k3")?;

    let round_1 = sender.retrieve(&mut rng, &request_1, &prepared)?;
    let round_3 = sender.retrieve(&mut rng, &request_3, &prepared)?;

    // A single round's response cannot satisfy both accumulated secrets.
    assert_eq!(
        receiver.decrypt_response(&round_1),
        Err(Error::NoMatchingCipher)
    );

    // Concealed response indices never collide across rounds, so the rounds
    // can be merged and consumed in one pass.
    let merged: Ciphers = round_1
        .iter()
        .chain(round_3.iter())
        .map(|(i, c)| (i.to_string(), c.to_vec()))
        .collect();
    let values = receiver.decrypt_response(&merged)?;
    assert_eq!(values.len(), 2);
    assert_eq!(values["k1"], "v1");
    assert_eq!(values["k3"], "v3");

    // The consumed secrets are gone; a second decryption finds nothing.
    assert!(receiver.decrypt_response(&merged)?.is_empty());

    Ok(())
}

#[test]
fn test_mismatched_concealment_configurations_fail() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();

    let sender = Sender::new(&mut rng, true)?;
    let prepared = sender.prepare(&three_entries())?;

    let mut receiver = Receiver::new(&sender.publish_key(), false);
    let request = receiver.build_request(&mut rng, "k2")?;
    let ciphers = sender.retrieve(&mut rng, &request, &prepared)?;

    assert_eq!(
        receiver.decrypt_response(&ciphers),
        Err(Error::NoMatchingCipher)
    );

    Ok(())
}

#[test]
fn test_response_maps_survive_transport_serialization() -> Result<(), Error> {
    let mut rng = ChaCha20Rng::from_entropy();

    let sender = Sender::new(&mut rng, true)?;
    let prepared = sender.prepare(&three_entries())?;

    let mut receiver = Receiver::new(&sender.publish_key(), true);
    let request_bytes = receiver.build_request(&mut rng, "k3")?.to_bytes();

    // Round trip both wire artifacts through their byte encodings.
    let request = curtain::RequestKey::from_bytes(&request_bytes)?;
    let ciphers = sender.retrieve(&mut rng, &request, &prepared)?;
    let received = Ciphers::from_bytes(&ciphers.to_bytes()?)?;

    assert_eq!(receiver.decrypt_response(&received)?["k3"], "v3");
    Ok(())
}

#[test]
fn test_unicode_entries_round_trip() -> Result<(), Error> {
    let entries = vec![
        Entry::new("grüße", "größte Geheimnisse"),
        Entry::new("日本", "秘密の値"),
    ];
    assert_eq!(curtain::simulate(&entries, "日本")?, "秘密の値");
    Ok(())
}

#[test]
fn test_simulate_unknown_index_fails() {
    let entries = three_entries();
    assert_eq!(
        curtain::simulate(&entries, "k4"),
        Err(Error::NoMatchingCipher)
    );
}
