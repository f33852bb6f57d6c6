use crate::error::{DtpsError, Result};
use crate::rng::draw_u32;
use rand_core::RngCore;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Prime modulus P carried in every certificate (2^32 - 5).
pub const PRIME_P: u32 = 0xFFFF_FFFB;

/// Generator G carried in every certificate (2^16 + 1).
pub const GENERATOR_G: u32 = 0x1_0001;

/// The `[P, G, N]` parameter triple of a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatticeParams {
    pub prime: u32,
    pub generator: u32,
    pub dimension: u32,
}

impl LatticeParams {
    pub fn for_dimension(dimension: u32) -> Self {
        Self {
            prime: PRIME_P,
            generator: GENERATOR_G,
            dimension,
        }
    }

    pub fn to_array(self) -> [u32; 3] {
        [self.prime, self.generator, self.dimension]
    }
}

/// How the harness populates the basis before running trials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasisFill {
    /// Independent pseudo-random words.
    Random,
    /// All zero, which turns the transform into the identity.
    Zero,
    /// Every entry set to the same word.
    Constant(u32),
}

/// Bookkeeping returned when a context is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReleasedResources {
    pub basis_words: usize,
    pub state_values: usize,
}

/// Lattice configuration plus the two buffers it owns.
///
/// The basis is a `dimension x dimension` row-major matrix; the quantum state
/// is a vector of `dimension` floats. Both are allocated by [`LatticeContext::new`]
/// and released together by [`LatticeContext::destroy`] (or on drop), wiped
/// before the memory is returned.
#[derive(Debug, Zeroize, ZeroizeOnDrop)]
pub struct LatticeContext {
    dimension: u32,
    security_level: u32,
    lattice_basis: Vec<u32>,
    quantum_state: Vec<f32>,
}

impl LatticeContext {
    /// Allocates a context for `dimension`.
    ///
    /// Either both buffers are obtained or an allocation error is returned and
    /// nothing is handed back; a buffer reserved before the failure is freed
    /// on the way out.
    pub fn new(dimension: u32, security_level: u32) -> Result<Self> {
        if dimension.checked_mul(2).is_none() {
            return Err(DtpsError::MemoryAllocationError(format!(
                "lattice basis for dimension {} exceeds the address space",
                dimension
            )));
        }

        let side = dimension as usize;
        let cells = side.checked_mul(side).ok_or_else(|| {
            DtpsError::MemoryAllocationError(format!(
                "lattice basis of {}x{} entries exceeds the address space",
                dimension, dimension
            ))
        })?;

        let lattice_basis = allocate_zeroed::<u32>(cells)?;
        let quantum_state = allocate_zeroed::<f32>(side)?;

        debug!(dimension, security_level, basis_words = cells, "lattice context allocated");

        Ok(Self {
            dimension,
            security_level,
            lattice_basis,
            quantum_state,
        })
    }

    /// Releases both buffers. Consuming `self` rules out use after release.
    pub fn destroy(self) -> ReleasedResources {
        let released = ReleasedResources {
            basis_words: self.lattice_basis.len(),
            state_values: self.quantum_state.len(),
        };
        debug!(
            dimension = self.dimension,
            basis_words = released.basis_words,
            "lattice context released"
        );
        drop(self);
        released
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn security_level(&self) -> u32 {
        self.security_level
    }

    /// Matrix side length as an index type.
    pub fn side(&self) -> usize {
        self.dimension as usize
    }

    /// Qubit count reported in certificates, `2 * dimension`.
    pub fn qubits(&self) -> u32 {
        // `new` rejects dimensions whose double overflows.
        self.dimension * 2
    }

    pub fn lattice_params(&self) -> LatticeParams {
        LatticeParams::for_dimension(self.dimension)
    }

    pub fn basis(&self) -> &[u32] {
        &self.lattice_basis
    }

    pub fn basis_mut(&mut self) -> &mut [u32] {
        &mut self.lattice_basis
    }

    pub fn quantum_state(&self) -> &[f32] {
        &self.quantum_state
    }

    /// Populates the basis according to `fill`. Only `Random` draws from `rng`.
    pub fn fill_basis<R: RngCore + ?Sized>(&mut self, fill: BasisFill, rng: &mut R) {
        match fill {
            BasisFill::Random => {
                for entry in self.lattice_basis.iter_mut() {
                    *entry = draw_u32(rng);
                }
            }
            BasisFill::Zero => self.lattice_basis.fill(0),
            BasisFill::Constant(word) => self.lattice_basis.fill(word),
        }
    }

    pub fn basis_is_zero(&self) -> bool {
        self.lattice_basis.iter().all(|&x| x == 0)
    }
}

fn allocate_zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, T::default());
    Ok(buffer)
}
