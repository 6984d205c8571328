//! The Sender and Receiver of the 1-out-of-N OT protocol.
//!
//! Implements the key agreement of the [CO15](https://eprint.iacr.org/2015/267.pdf)
//! "Simplest OT" protocol, generalized from a choice bit to N string-indexed
//! entries. With Sender keypair `(y, S = y·B)`, squared key `U = y·S` and a
//! request key `R = scalar(i)·S + x·B` built by the [`Receiver`] for its
//! chosen index `i`, the Sender derives `y·R = scalar(i)·U + x·S` and per
//! entry `j` the key point
//!
//! ```text
//! K_j = y·R − scalar(j)·U = x·S + (scalar(i) − scalar(j))·U
//! ```
//!
//! `K_i` collapses to `x·S`, which the Receiver computed itself; every other
//! `K_j` requires the discrete log `y` and stays out of the Receiver's reach.

use std::collections::{BTreeMap, HashSet};

use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::group;
use crate::hash;
use crate::sealing;
use crate::types::{Ciphers, Entry, PreparedEntry, RequestKey, SenderKey, SharedSecret};
use crate::Error;

/// The party holding the indexed entries.
///
/// A Sender keeps one long-term OT keypair for its lifetime and can serve any
/// number of retrievals against it. [`Sender::retrieve`] only reads Sender
/// state, so a Sender may be shared across threads once its entries are
/// prepared.
pub struct Sender {
    ot_secret: Scalar,
    ot_key: EdwardsPoint,
    ot_u: EdwardsPoint,
    conceal_response_indices: bool,
}

impl Sender {
    /// Creates a new Sender with a fresh OT keypair.
    ///
    /// `conceal_response_indices` selects whether response maps are keyed by
    /// keyed-MAC digests instead of plaintext indices. The flag is never
    /// negotiated on the wire; both parties must be constructed with the same
    /// choice.
    pub fn new<RNG>(rng: &mut RNG, conceal_response_indices: bool) -> Result<Self, Error>
    where
        RNG: RngCore + CryptoRng,
    {
        let ot_secret = group::random_scalar(rng)?;
        let ot_key = ED25519_BASEPOINT_TABLE * &ot_secret;
        let ot_u = ot_key * ot_secret;

        Ok(Self {
            ot_secret,
            ot_key,
            ot_u,
            conceal_response_indices,
        })
    }

    /// Returns the Sender's public OT key. Idempotent.
    pub fn publish_key(&self) -> SenderKey {
        SenderKey(self.ot_key)
    }

    /// Precomputes the per-entry OT index points for a set of entries.
    ///
    /// An index point `scalar(index)·U` depends only on the entry index and
    /// the Sender's long-term key, so the prepared entries can be reused
    /// across rounds and receivers. Fails with [`Error::InvalidIndex`] if an
    /// index exceeds 32 bytes and with [`Error::DuplicateIndex`] if an index
    /// appears twice.
    pub fn prepare(&self, entries: &[Entry]) -> Result<Vec<PreparedEntry>, Error> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut prepared = Vec::with_capacity(entries.len());

        for entry in entries {
            if !seen.insert(entry.index.as_str()) {
                return Err(Error::DuplicateIndex);
            }
            prepared.push(PreparedEntry {
                index: entry.index.clone(),
                value: entry.value.clone(),
                index_otu: self.ot_u * group::index_to_scalar(&entry.index)?,
            });
        }

        Ok(prepared)
    }

    /// Encrypts all prepared entries against a Receiver's request key.
    ///
    /// Computes the shared secret point `T = y·R` and, per entry, the key
    /// point `K = T − scalar(index)·U`, whose 32-byte encoding seals the
    /// entry value. The Sender cannot tell which single key point the
    /// Receiver is able to reproduce.
    ///
    /// The call is all-or-nothing: on any error no partial response map is
    /// returned.
    pub fn retrieve<RNG>(
        &self,
        rng: &mut RNG,
        request_key: &RequestKey,
        entries: &[PreparedEntry],
    ) -> Result<Ciphers, Error>
    where
        RNG: RngCore + CryptoRng,
    {
        let shared = request_key.0 * self.ot_secret;

        let mut seen = HashSet::with_capacity(entries.len());
        let mut ciphers = BTreeMap::new();
        for entry in entries {
            if !seen.insert(entry.index.as_str()) {
                return Err(Error::DuplicateIndex);
            }

            let key = Zeroizing::new((shared - entry.index_otu).compress().to_bytes());
            let cipher = sealing::seal(rng, &key, entry.value.as_bytes())?;
            let response_index = if self.conceal_response_indices {
                hash::conceal_index(&entry.index, &key)
            } else {
                entry.index.clone()
            };
            ciphers.insert(response_index, cipher);
        }

        Ok(Ciphers(ciphers))
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        self.ot_secret.zeroize();
    }
}

/// The party retrieving a single entry per round.
///
/// A Receiver accumulates one shared secret per requested index and consumes
/// all of them when the matching response map arrives.
pub struct Receiver {
    sender_key: EdwardsPoint,
    ot_secrets: BTreeMap<String, SharedSecret>,
    conceal_response_indices: bool,
}

impl Receiver {
    /// Creates a Receiver bound to a Sender's public OT key.
    ///
    /// `conceal_response_indices` must match the Sender's configuration.
    pub fn new(sender_key: &SenderKey, conceal_response_indices: bool) -> Self {
        Self {
            sender_key: sender_key.0,
            ot_secrets: BTreeMap::new(),
            conceal_response_indices,
        }
    }

    /// Builds the tailored request key for an entry of interest.
    ///
    /// With fresh randomness `x`, the request key is
    /// `R = scalar(index)·S + x·B`, uniform in the group from the Sender's
    /// perspective, and the shared secret `x·S` is stored under the index.
    /// Every call accumulates one secret; each request is answered in its own
    /// round.
    pub fn build_request<RNG>(
        &mut self,
        rng: &mut RNG,
        entry_index: &str,
    ) -> Result<RequestKey, Error>
    where
        RNG: RngCore + CryptoRng,
    {
        let index_scalar = group::index_to_scalar(entry_index)?;
        let mut blind = group::random_scalar(rng)?;

        let secret = self.sender_key * blind;
        let request = self.sender_key * index_scalar + ED25519_BASEPOINT_TABLE * &blind;
        blind.zeroize();

        self.ot_secrets.insert(
            entry_index.to_string(),
            SharedSecret(secret.compress().to_bytes()),
        );

        Ok(RequestKey(request))
    }

    /// Decrypts the entry of interest per accumulated request.
    ///
    /// Every accumulated secret must find its ciphertext in the response map
    /// ([`Error::NoMatchingCipher`] otherwise) and authenticate under it
    /// ([`Error::AuthFailed`] otherwise). The call is all-or-nothing: on any
    /// error no partial result is returned and the secrets are retained. On
    /// success the consumed secrets are discarded.
    pub fn decrypt_response(&mut self, ciphers: &Ciphers) -> Result<BTreeMap<String, String>, Error> {
        let mut values = BTreeMap::new();

        for (index, secret) in &self.ot_secrets {
            let cipher = if self.conceal_response_indices {
                ciphers.get(&hash::conceal_index(index, secret.as_bytes()))
            } else {
                ciphers.get(index)
            }
            .ok_or(Error::NoMatchingCipher)?;

            let plain = sealing::open(secret.as_bytes(), cipher)?;
            let value = String::from_utf8(plain).map_err(|_| Error::InvalidUtf8)?;
            values.insert(index.clone(), value);
        }

        self.ot_secrets.clear();
        Ok(values)
    }
}

#[test]
fn test_chosen_entry_round_trip() {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let entries = vec![
        Entry::new("k1", "v1"),
        Entry::new("k2", "v2"),
        Entry::new("k3", "v3"),
    ];

    for conceal in [false, true] {
        let sender = Sender::new(&mut rng, conceal).unwrap();
        let prepared = sender.prepare(&entries).unwrap();

        let mut receiver = Receiver::new(&sender.publish_key(), conceal);
        let request = receiver.build_request(&mut rng, "k2").unwrap();
        let ciphers = sender.retrieve(&mut rng, &request, &prepared).unwrap();

        assert_eq!(ciphers.len(), 3);
        let values = receiver.decrypt_response(&ciphers).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["k2"], "v2");
    }
}

#[test]
fn test_unchosen_entries_stay_sealed() {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let entries = vec![Entry::new("k1", "v1"), Entry::new("k2", "v2")];

    let sender = Sender::new(&mut rng, false).unwrap();
    let prepared = sender.prepare(&entries).unwrap();

    let mut receiver = Receiver::new(&sender.publish_key(), false);
    let request = receiver.build_request(&mut rng, "k1").unwrap();
    let ciphers = sender.retrieve(&mut rng, &request, &prepared).unwrap();

    // The shared secret for "k1" must not open the ciphertext of "k2".
    let chosen_secret = receiver.ot_secrets.get("k1").unwrap();
    assert_eq!(
        crate::sealing::open(chosen_secret.as_bytes(), ciphers.get("k2").unwrap()),
        Err(Error::AuthFailed)
    );
}

#[test]
fn test_request_keys_are_randomized() {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let sender = Sender::new(&mut rng, true).unwrap();
    let mut receiver = Receiver::new(&sender.publish_key(), true);

    let r1 = receiver.build_request(&mut rng, "k1").unwrap();
    let r2 = receiver.build_request(&mut rng, "k1").unwrap();
    assert_ne!(r1.to_bytes(), r2.to_bytes());
}
