//! Common type definitions and wire artifacts.

use std::collections::BTreeMap;

use curve25519_dalek::edwards::EdwardsPoint;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::group::{self, KEY_LEN};
use crate::Error;

/// The Sender's public OT key, published once per Sender instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderKey(pub(crate) EdwardsPoint);

impl SenderKey {
    /// Returns the canonical 32-byte Ed25519 encoding of the key.
    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        self.0.compress().to_bytes()
    }

    /// Decodes a key from its canonical 32-byte Ed25519 encoding.
    pub fn from_bytes(bytes: &[u8; KEY_LEN]) -> Result<Self, Error> {
        Ok(Self(group::decompress(bytes)?))
    }
}

/// A Receiver's tailored request key, independently randomized per OT round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestKey(pub(crate) EdwardsPoint);

impl RequestKey {
    /// Returns the canonical 32-byte Ed25519 encoding of the key.
    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        self.0.compress().to_bytes()
    }

    /// Decodes a key from its canonical 32-byte Ed25519 encoding.
    pub fn from_bytes(bytes: &[u8; KEY_LEN]) -> Result<Self, Error> {
        Ok(Self(group::decompress(bytes)?))
    }
}

/// A per-index shared secret point encoding, held by a Receiver between
/// building a request and decrypting the matching response.
pub(crate) struct SharedSecret(pub(crate) [u8; KEY_LEN]);

impl SharedSecret {
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// One retrievable record offered by a [`Sender`](crate::Sender).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The entry's index; at most 32 bytes of UTF-8, unique per retrieval.
    pub index: String,
    /// The entry's value; UTF-8 of arbitrary length.
    pub value: String,
}

impl Entry {
    /// Creates an entry from an index and a value.
    pub fn new(index: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            value: value.into(),
        }
    }
}

/// An [`Entry`] extended with its cached OT index point.
///
/// The index point depends only on the entry index and the Sender's long-term
/// key, so prepared entries can be computed once and reused across any number
/// of rounds and receivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedEntry {
    pub(crate) index: String,
    pub(crate) value: String,
    pub(crate) index_otu: EdwardsPoint,
}

impl PreparedEntry {
    /// The index of the underlying entry.
    pub fn index(&self) -> &str {
        &self.index
    }
}

/// The Sender's encrypted response map for one OT round.
///
/// Maps response indices to nonce-prefixed ciphertexts. A response index is
/// the plaintext entry index, or its lowercase-hex keyed MAC when response
/// index concealment is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphers(pub(crate) BTreeMap<String, Vec<u8>>);

impl Ciphers {
    /// Returns the number of ciphertexts in the response map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the response map contains no ciphertexts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the ciphertext stored under a response index.
    pub fn get(&self, response_index: &str) -> Option<&[u8]> {
        self.0.get(response_index).map(Vec::as_slice)
    }

    /// Iterates over all response indices and their ciphertexts.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0.iter().map(|(i, c)| (i.as_str(), c.as_slice()))
    }

    /// Serializes the response map for transport.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserializes a response map received from the other party.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl FromIterator<(String, Vec<u8>)> for Ciphers {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[test]
fn test_keys_round_trip_through_their_encoding() {
    use curve25519_dalek::constants::ED25519_BASEPOINT_COMPRESSED;

    let bytes = ED25519_BASEPOINT_COMPRESSED.to_bytes();
    assert_eq!(SenderKey::from_bytes(&bytes).unwrap().to_bytes(), bytes);
    assert_eq!(RequestKey::from_bytes(&bytes).unwrap().to_bytes(), bytes);
}

#[test]
fn test_keys_reject_small_order_encodings() {
    let mut order_two = [0xffu8; KEY_LEN];
    order_two[0] = 0xec;
    order_two[KEY_LEN - 1] = 0x7f;
    assert_eq!(SenderKey::from_bytes(&order_two), Err(Error::InvalidPoint));
    assert_eq!(RequestKey::from_bytes(&order_two), Err(Error::InvalidPoint));
}

#[test]
fn test_ciphers_round_trip_through_bincode() {
    let ciphers: Ciphers = vec![
        ("k1".to_string(), vec![1u8, 2, 3]),
        ("k2".to_string(), vec![4u8, 5]),
    ]
    .into_iter()
    .collect();

    let bytes = ciphers.to_bytes().unwrap();
    assert_eq!(Ciphers::from_bytes(&bytes).unwrap(), ciphers);
}

#[test]
fn test_corrupted_cipher_buffers_fail_deserialization() {
    assert_eq!(Ciphers::from_bytes(&[0xff]), Err(Error::BincodeError));
}
