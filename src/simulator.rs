//! OT round simulation under ideal message delivery.

use crate::{Entry, Error, Receiver, Sender};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Simulates one complete OT round on a local machine, returning the value of
/// the chosen entry.
///
/// The round is performed using the full cryptographic protocol exposed by
/// [`Sender`] and [`Receiver`], with response index concealment enabled and
/// entropy-seeded RNGs for both parties. The messages between the parties are
/// passed directly in memory, so this function simulates an OT exchange under
/// ideal delivery conditions, without any transport in between.
pub fn simulate(entries: &[Entry], chosen_index: &str) -> Result<String, Error> {
    let mut sender_rng = ChaCha20Rng::from_entropy();
    let mut receiver_rng = ChaCha20Rng::from_entropy();

    let sender = Sender::new(&mut sender_rng, true)?;
    let prepared = sender.prepare(entries)?;

    let mut receiver = Receiver::new(&sender.publish_key(), true);
    let request = receiver.build_request(&mut receiver_rng, chosen_index)?;

    let ciphers = sender.retrieve(&mut sender_rng, &request, &prepared)?;

    let mut values = receiver.decrypt_response(&ciphers)?;
    values.remove(chosen_index).ok_or(Error::NoMatchingCipher)
}
