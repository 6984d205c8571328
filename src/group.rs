//! Ed25519 group operations underlying the OT key agreement.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};

use crate::Error;

/// Number of bytes of a scalar, a compressed point and a symmetric key.
pub(crate) const KEY_LEN: usize = 32;

/// Samples a scalar uniformly from the Ed25519 scalar field.
pub(crate) fn random_scalar<RNG>(rng: &mut RNG) -> Result<Scalar, Error>
where
    RNG: RngCore + CryptoRng,
{
    let mut bytes = [0u8; 64];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|_| Error::RandomnessFailure)?;
    Ok(Scalar::from_bytes_mod_order_wide(&bytes))
}

/// Interprets an entry index as a scalar.
///
/// The UTF-8 encoding of the index is left-padded with zero bytes to 32 bytes
/// and reduced mod the group order. Sender and Receiver apply the identical
/// interpretation, which is all the key agreement requires.
pub(crate) fn index_to_scalar(index: &str) -> Result<Scalar, Error> {
    let index_bytes = index.as_bytes();
    if index_bytes.len() > KEY_LEN {
        return Err(Error::InvalidIndex);
    }
    let mut padded = [0u8; KEY_LEN];
    padded[KEY_LEN - index_bytes.len()..].copy_from_slice(index_bytes);
    Ok(Scalar::from_bytes_mod_order(padded))
}

/// Decompresses a 32-byte encoding into an Ed25519 point.
///
/// Encodings that do not decompress, or that decompress to a point with a
/// small-order component, are rejected.
pub(crate) fn decompress(bytes: &[u8; KEY_LEN]) -> Result<EdwardsPoint, Error> {
    let point = CompressedEdwardsY(*bytes)
        .decompress()
        .ok_or(Error::InvalidPoint)?;
    if !point.is_torsion_free() {
        return Err(Error::InvalidPoint);
    }
    Ok(point)
}

#[test]
fn test_index_scalars_are_right_aligned() {
    let mut padded = [0u8; KEY_LEN];
    padded[KEY_LEN - 1] = b'a';
    assert_eq!(
        index_to_scalar("a").unwrap(),
        Scalar::from_bytes_mod_order(padded)
    );

    let mut padded = [0u8; KEY_LEN];
    padded[KEY_LEN - 2..].copy_from_slice(b"k1");
    assert_eq!(
        index_to_scalar("k1").unwrap(),
        Scalar::from_bytes_mod_order(padded)
    );
}

#[test]
fn test_index_length_is_bounded() {
    let exactly_32 = "a".repeat(32);
    assert!(index_to_scalar(&exactly_32).is_ok());

    let oversized = "a".repeat(33);
    assert_eq!(index_to_scalar(&oversized), Err(Error::InvalidIndex));

    // Multi-byte code points count in bytes, not chars.
    let umlauts = "ä".repeat(17);
    assert_eq!(index_to_scalar(&umlauts), Err(Error::InvalidIndex));
}

#[test]
fn test_distinct_indices_map_to_distinct_scalars() {
    assert_ne!(index_to_scalar("k1").unwrap(), index_to_scalar("k2").unwrap());
}

#[test]
fn test_decompression_accepts_the_basepoint() {
    use curve25519_dalek::constants::ED25519_BASEPOINT_COMPRESSED;

    assert!(decompress(ED25519_BASEPOINT_COMPRESSED.as_bytes()).is_ok());
}

#[test]
fn test_decompression_rejects_small_order_points() {
    // y = -1 encodes the order-2 point (0, -1).
    let mut order_two = [0xffu8; KEY_LEN];
    order_two[0] = 0xec;
    order_two[KEY_LEN - 1] = 0x7f;
    assert_eq!(decompress(&order_two), Err(Error::InvalidPoint));
}

#[test]
fn test_random_scalars_do_not_repeat() {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let a = random_scalar(&mut rng).unwrap();
    let b = random_scalar(&mut rng).unwrap();
    assert_ne!(a, b);
}
