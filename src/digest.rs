//! Rolling content digest used to compare matrices before and after the
//! lattice transform.
//!
//! The digest is the classic multiply-by-33 accumulation seeded with
//! `0x1505`: for every byte `b`, `hash = (hash << 5) + hash + b` modulo 2^64.
//! It is order-sensitive and deterministic, and it is not a cryptographic
//! hash.

/// Initial accumulator value. An empty input digests to this.
pub const DIGEST_SEED: u64 = 0x1505;

/// Computes the digest of `data` in one pass.
pub fn compute_digest(data: &[u8]) -> u64 {
    data.iter().fold(DIGEST_SEED, |hash, &b| step(hash, b))
}

#[inline(always)]
fn step(hash: u64, byte: u8) -> u64 {
    (hash << 5).wrapping_add(hash).wrapping_add(byte as u64)
}

/// Streaming form of [`compute_digest`].
///
/// Feeding the same bytes in any number of chunks yields the same value as a
/// single call over the concatenation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollingDigest {
    state: u64,
}

impl RollingDigest {
    pub fn new() -> Self {
        Self { state: DIGEST_SEED }
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.state = data.iter().fold(self.state, |hash, &b| step(hash, b));
        self
    }

    pub fn finish(&self) -> u64 {
        self.state
    }
}

impl Default for RollingDigest {
    fn default() -> Self {
        Self::new()
    }
}
