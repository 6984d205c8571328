//! 1-out-of-N Oblivious Transfer (OT) with concealed response indices.
//!
//! This crate implements the [CO15](https://eprint.iacr.org/2015/267.pdf)
//! "Simplest OT" protocol over the Ed25519 curve, extended from 1-out-of-2 to
//! 1-out-of-N indexed entries: a [`Receiver`] recovers exactly the entry it
//! chose from a [`Sender`]'s collection, without the Sender learning which
//! entry that was and without the Receiver learning anything about the other
//! N-1 entries. Entry payloads are protected with XSalsa20-Poly1305
//! authenticated encryption, and (by default) the indices of the Sender's
//! response map are concealed behind a keyed Blake2b hash, so the Receiver
//! cannot even correlate ciphertexts with indices other than its chosen one.
//!
//! Communication channels are deliberately _not_ part of this crate. The
//! sending and receiving of messages needs to be handled by the user of this
//! crate, which allows the OT protocol to be used both in sync and async
//! environments.
//!
//! # Examples
//!
//! ```
//! use curtain::{Entry, Error, Receiver, Sender};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! fn main() -> Result<(), Error> {
//!     let mut rng = ChaCha20Rng::from_entropy();
//!
//!     // The Sender holds a collection of indexed entries:
//!     let entries = vec![
//!         Entry::new("alpha", "first secret"),
//!         Entry::new("beta", "second secret"),
//!         Entry::new("gamma", "third secret"),
//!     ];
//!
//!     // Both parties must agree (out of band) on whether response indices
//!     // are concealed:
//!     let sender = Sender::new(&mut rng, true)?;
//!     let prepared = sender.prepare(&entries)?;
//!
//!     // The Receiver learns the Sender's public OT key and picks an entry:
//!     let mut receiver = Receiver::new(&sender.publish_key(), true);
//!     let request = receiver.build_request(&mut rng, "beta")?;
//!
//!     // The Sender encrypts all entries against the request key, unaware of
//!     // which one the Receiver can actually open:
//!     let ciphers = sender.retrieve(&mut rng, &request, &prepared)?;
//!
//!     // The Receiver can open exactly the entry it chose:
//!     let values = receiver.decrypt_response(&ciphers)?;
//!     assert_eq!(values["beta"], "second secret");
//!
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod group;
mod hash;
mod sealing;
mod simulator;
mod transfer;
mod types;

pub use simulator::*;
pub use transfer::{Receiver, Sender};
pub use types::{Ciphers, Entry, PreparedEntry, RequestKey, SenderKey};

/// Errors occurring during the validation or the execution of the OT protocol.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// An entry index was longer than 32 bytes of UTF-8.
    InvalidIndex,
    /// A point encoding was not a valid Ed25519 group element.
    InvalidPoint,
    /// Two entries within a single retrieval shared the same index.
    DuplicateIndex,
    /// The response map contained no ciphertext for an accumulated secret.
    NoMatchingCipher,
    /// An AEAD authentication tag was invalid, due to an accidental or
    /// deliberate data corruption, a wrong key or a mismatched sender.
    AuthFailed,
    /// A decrypted entry value was not valid UTF-8.
    InvalidUtf8,
    /// The AEAD cipher rejected the plaintext during sealing.
    SealFailure,
    /// The cryptographically secure random number generator failed.
    RandomnessFailure,
    /// The provided byte buffer could not be serialized to / deserialized
    /// from bincode.
    BincodeError,
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidIndex => f.write_str("Entry index exceeds 32 bytes of UTF-8"),
            Error::InvalidPoint => {
                f.write_str("The encoding is not a valid Ed25519 group element")
            }
            Error::DuplicateIndex => {
                f.write_str("At least 2 entries of a single retrieval share an index")
            }
            Error::NoMatchingCipher => {
                f.write_str("The response map contains no ciphertext for a requested index")
            }
            Error::AuthFailed => f.write_str("At least 1 AEAD authentication check failed"),
            Error::InvalidUtf8 => f.write_str("A decrypted entry value is not valid UTF-8"),
            Error::SealFailure => f.write_str("The AEAD cipher rejected the plaintext"),
            Error::RandomnessFailure => f.write_str("The system randomness source failed"),
            Error::BincodeError => {
                f.write_str("The message could not be serialized to / deserialized from bincode")
            }
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(_: bincode::Error) -> Self {
        Self::BincodeError
    }
}
