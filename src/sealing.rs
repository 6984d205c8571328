//! Authenticated symmetric encryption of entry values.
//!
//! Entries are sealed with XSalsa20-Poly1305 as defined by the NaCl
//! "secretbox" construction: a 24-byte random nonce is prefixed to the
//! authenticated ciphertext.

use rand::{CryptoRng, RngCore};
use xsalsa20poly1305::aead::{Aead, KeyInit};
use xsalsa20poly1305::{Key, Nonce, XSalsa20Poly1305};

use crate::group::KEY_LEN;
use crate::Error;

/// Number of bytes of a secretbox nonce.
pub(crate) const NONCE_LEN: usize = 24;

/// Seals a plaintext under a 32-byte key, prefixing the fresh nonce.
pub(crate) fn seal<RNG>(
    rng: &mut RNG,
    key: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, Error>
where
    RNG: RngCore + CryptoRng,
{
    let mut nonce = [0u8; NONCE_LEN];
    rng.try_fill_bytes(&mut nonce)
        .map_err(|_| Error::RandomnessFailure)?;

    let sealed = XSalsa20Poly1305::new(Key::from_slice(key))
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| Error::SealFailure)?;

    let mut cipher = Vec::with_capacity(NONCE_LEN + sealed.len());
    cipher.extend_from_slice(&nonce);
    cipher.extend(sealed);
    Ok(cipher)
}

/// Opens a nonce-prefixed ciphertext under a 32-byte key.
pub(crate) fn open(key: &[u8; KEY_LEN], cipher: &[u8]) -> Result<Vec<u8>, Error> {
    if cipher.len() < NONCE_LEN {
        return Err(Error::AuthFailed);
    }
    let (nonce, sealed) = cipher.split_at(NONCE_LEN);

    XSalsa20Poly1305::new(Key::from_slice(key))
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| Error::AuthFailed)
}

#[test]
fn test_seal_then_open_is_the_identity() {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let key = [11u8; KEY_LEN];

    let cipher = seal(&mut rng, &key, b"payload").unwrap();
    assert_eq!(open(&key, &cipher).unwrap(), b"payload");

    // Nonces are fresh per seal, so ciphertexts never repeat.
    let again = seal(&mut rng, &key, b"payload").unwrap();
    assert_ne!(cipher, again);
}

#[test]
fn test_any_bit_flip_is_detected() {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let key = [11u8; KEY_LEN];
    let cipher = seal(&mut rng, &key, b"payload").unwrap();

    for byte in 0..cipher.len() {
        let mut corrupted = cipher.clone();
        corrupted[byte] ^= 1;
        assert_eq!(open(&key, &corrupted), Err(Error::AuthFailed));
    }
}

#[test]
fn test_opening_with_the_wrong_key_fails() {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let cipher = seal(&mut rng, &[11u8; KEY_LEN], b"payload").unwrap();

    assert_eq!(open(&[12u8; KEY_LEN], &cipher), Err(Error::AuthFailed));
}

#[test]
fn test_truncated_ciphertexts_fail() {
    let key = [11u8; KEY_LEN];
    assert_eq!(open(&key, &[0u8; NONCE_LEN - 1]), Err(Error::AuthFailed));
    assert_eq!(open(&key, &[]), Err(Error::AuthFailed));
}
