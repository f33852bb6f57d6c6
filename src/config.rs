use crate::error::{DtpsError, Result};
use crate::lattice::BasisFill;

/// Matrix side length used by the self-test.
pub const QUANTUM_DIMS: u32 = 512;

/// Informational security level recorded in the context.
pub const SECURITY_LEVEL: u32 = 256;

/// Number of trials per run.
pub const TEST_VECTORS: usize = 100;

/// Parameters of one self-test run.
///
/// `Default` gives the fixed configuration of the shipped binary; tests and
/// benches build smaller ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    pub dimension: u32,
    pub security_level: u32,
    pub trials: usize,
    pub basis: BasisFill,
    /// Fixed generator seed. `None` seeds from the clock at start.
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            dimension: QUANTUM_DIMS,
            security_level: SECURITY_LEVEL,
            trials: TEST_VECTORS,
            basis: BasisFill::Random,
            seed: None,
        }
    }
}

impl HarnessConfig {
    pub fn with_dimension(mut self, dimension: u32) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_basis(mut self, basis: BasisFill) -> Self {
        self.basis = basis;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension.checked_mul(2).is_none() {
            return Err(DtpsError::MemoryAllocationError(format!(
                "lattice basis for dimension {} exceeds the address space",
                self.dimension
            )));
        }
        Ok(())
    }
}
