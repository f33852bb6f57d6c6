//! Pseudo-random streams for matrix noise and certificate signatures.
//!
//! Every operation that needs randomness takes an explicit generator handle.
//! A run seeds one [`HarnessRng`] once; parallel work derives an independent
//! stream per unit of work from the same seed so results depend only on the
//! seed, never on scheduling. None of this is suitable for key material.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generator type used throughout the harness.
pub type HarnessRng = ChaCha20Rng;

/// Creates the run generator from a 64-bit seed.
pub fn seeded(seed: u64) -> HarnessRng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Creates the independent stream `index` for `seed`.
pub fn trial_stream(seed: u64, index: u64) -> HarnessRng {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    rng.set_stream(index);
    rng
}

/// Seed taken from the wall clock, used when no fixed seed is configured.
pub fn seed_from_clock() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_nanos() as u64,
        Err(err) => err.duration().as_nanos() as u64,
    }
}

/// Draws a 32-bit value by combining two 16-bit draws (shift-and-combine).
pub fn draw_u32<R: RngCore + ?Sized>(rng: &mut R) -> u32 {
    let low = rng.gen::<u16>() as u32;
    let high = rng.gen::<u16>() as u32;
    low | (high << 16)
}

/// Draws a 64-bit value by combining two 32-bit draws.
pub fn draw_u64<R: RngCore + ?Sized>(rng: &mut R) -> u64 {
    let low = rng.gen::<u32>() as u64;
    let high = rng.gen::<u32>() as u64;
    low | (high << 32)
}
