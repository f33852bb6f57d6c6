use crate::error::Result;
use crate::lattice::LatticeContext;
use crate::rng::draw_u64;
use rand_core::RngCore;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of 64-bit words in a certificate signature.
pub const SIGNATURE_WORDS: usize = 4;

/// Lifecycle tag of a certificate, stored as one byte.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuantumState {
    Superposed = 0x01,
    Entangled = 0x02,
    Collapsed = 0x03,
}

impl QuantumState {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::Superposed),
            0x02 => Some(Self::Entangled),
            0x03 => Some(Self::Collapsed),
            _ => None,
        }
    }
}

impl fmt::Display for QuantumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Superposed => "superposed",
            Self::Entangled => "entangled",
            Self::Collapsed => "collapsed",
        };
        f.write_str(name)
    }
}

/// Certificate record produced once per trial.
///
/// The signature is a test fixture drawn from the harness generator; it is
/// not derived from any key and proves nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct Certificate {
    pub signature: [u64; SIGNATURE_WORDS],
    /// Seconds since the Unix epoch at generation.
    pub timestamp: f64,
    pub qubits: u32,
    pub state: QuantumState,
    /// `[P, G, N]`
    pub lattice_params: [u32; 3],
}

impl Certificate {
    /// Signature words as concatenated lowercase hex, without padding.
    pub fn signature_hex(&self) -> String {
        self.signature.iter().map(|word| format!("{:x}", word)).collect()
    }

    /// A certificate stays usable until its state collapses.
    pub fn is_coherent(&self) -> bool {
        self.state != QuantumState::Collapsed
    }
}

/// Source of certificates for the driver.
///
/// This is where record allocation can fail: an `Err` from `issue` makes the
/// driver skip that trial's report. [`generate_certificate_at`] itself never
/// fails.
pub trait CertificateIssuer {
    fn issue<R: RngCore + ?Sized>(
        &mut self,
        ctx: &LatticeContext,
        rng: &mut R,
    ) -> Result<Certificate>;
}

/// Issues certificates stamped with the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClockIssuer;

impl CertificateIssuer for SystemClockIssuer {
    fn issue<R: RngCore + ?Sized>(
        &mut self,
        ctx: &LatticeContext,
        rng: &mut R,
    ) -> Result<Certificate> {
        generate_certificate(ctx, rng)
    }
}

/// Generates a certificate for `ctx` stamped with the current time.
pub fn generate_certificate<R: RngCore + ?Sized>(
    ctx: &LatticeContext,
    rng: &mut R,
) -> Result<Certificate> {
    generate_certificate_at(ctx, rng, unix_timestamp())
}

/// Generates a certificate for `ctx` with an explicit timestamp.
pub fn generate_certificate_at<R: RngCore + ?Sized>(
    ctx: &LatticeContext,
    rng: &mut R,
    timestamp: f64,
) -> Result<Certificate> {
    let mut signature = [0u64; SIGNATURE_WORDS];
    for word in signature.iter_mut() {
        *word = draw_u64(rng);
    }

    Ok(Certificate {
        signature,
        timestamp,
        qubits: ctx.qubits(),
        state: QuantumState::Superposed,
        lattice_params: ctx.lattice_params().to_array(),
    })
}

/// Wall-clock seconds since the Unix epoch; negative if the clock is set
/// before it.
pub fn unix_timestamp() -> f64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs_f64(),
        Err(err) => -err.duration().as_secs_f64(),
    }
}
