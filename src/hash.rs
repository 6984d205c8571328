//! Keyed Blake2b hashing for response-index concealment.

use crate::group::KEY_LEN;

/// Computes the keyed Blake2b MAC (digest size 32) of an input.
pub(crate) fn mac(input: &[u8], key: &[u8]) -> [u8; KEY_LEN] {
    let digest = blake2b_simd::Params::new()
        .hash_length(KEY_LEN)
        .key(key)
        .hash(input);

    let mut result = [0u8; KEY_LEN];
    result.copy_from_slice(digest.as_bytes());
    result
}

/// Conceals a response index under a per-entry key.
///
/// The MAC of the raw UTF-8 index bytes is rendered as lowercase hex, the
/// canonical textual encoding shared by both parties, so the response map is
/// keyed by strings whether or not concealment is active.
pub(crate) fn conceal_index(index: &str, key: &[u8; KEY_LEN]) -> String {
    hex::encode(mac(index.as_bytes(), key))
}

#[test]
fn test_mac_is_deterministic() {
    let key = [7u8; KEY_LEN];
    assert_eq!(mac(b"entry", &key), mac(b"entry", &key));
}

#[test]
fn test_mac_separates_inputs_and_keys() {
    let key_a = [1u8; KEY_LEN];
    let key_b = [2u8; KEY_LEN];
    assert_ne!(mac(b"entry", &key_a), mac(b"entry", &key_b));
    assert_ne!(mac(b"entry", &key_a), mac(b"other", &key_a));
}

#[test]
fn test_concealed_indices_are_lowercase_hex() {
    let concealed = conceal_index("entry", &[3u8; KEY_LEN]);
    assert_eq!(concealed.len(), 2 * KEY_LEN);
    assert!(concealed
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}
