//! Lattice transform self-check.
//!
//! A fresh noise matrix `M` is XORed with the context basis into `M'`, and
//! the digests of both are compared. A changed digest means the transform is
//! not a no-op; it says nothing about correctness or security.

use crate::digest::compute_digest;
use crate::error::{DtpsError, Result};
use crate::lattice::LatticeContext;
use crate::rng::draw_u32;
use byteorder::{ByteOrder, LittleEndian};
use rand_core::RngCore;
use std::mem::size_of;

/// Digests of the matrix before and after the transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformOutcome {
    pub original_digest: u64,
    pub transformed_digest: u64,
}

impl TransformOutcome {
    /// The transform test passes when the digests differ.
    pub fn changed(&self) -> bool {
        self.original_digest != self.transformed_digest
    }
}

/// Scratch space for one transform test, sized once and reused across trials.
#[derive(Debug)]
pub struct TransformWorkspace {
    dimension: u32,
    original: Vec<u32>,
    transformed: Vec<u32>,
    bytes: Vec<u8>,
}

impl TransformWorkspace {
    pub fn new(dimension: u32) -> Result<Self> {
        let side = dimension as usize;
        let cells = side.checked_mul(side);
        let byte_len = cells.and_then(|c| c.checked_mul(size_of::<u32>()));
        let (cells, byte_len) = match (cells, byte_len) {
            (Some(c), Some(b)) => (c, b),
            _ => {
                return Err(DtpsError::MemoryAllocationError(format!(
                    "transform workspace for dimension {} exceeds the address space",
                    dimension
                )))
            }
        };

        let mut original = Vec::new();
        original.try_reserve_exact(cells)?;
        original.resize(cells, 0);

        let mut transformed = Vec::new();
        transformed.try_reserve_exact(cells)?;
        transformed.resize(cells, 0);

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(byte_len)?;
        bytes.resize(byte_len, 0);

        Ok(Self {
            dimension,
            original,
            transformed,
            bytes,
        })
    }

    pub fn for_context(ctx: &LatticeContext) -> Result<Self> {
        Self::new(ctx.dimension())
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// The noise matrix of the last test.
    pub fn original(&self) -> &[u32] {
        &self.original
    }

    /// The transformed matrix of the last test.
    pub fn transformed(&self) -> &[u32] {
        &self.transformed
    }

    fn digest_of(words: &[u32], bytes: &mut [u8]) -> u64 {
        LittleEndian::write_u32_into(words, bytes);
        compute_digest(bytes)
    }
}

/// XORs `basis` into `matrix` element-wise. Applying it twice is the identity.
pub fn apply_basis(matrix: &mut [u32], basis: &[u32]) -> Result<()> {
    if matrix.len() != basis.len() {
        return Err(DtpsError::InvalidDimension {
            expected: basis.len(),
            got: matrix.len(),
        });
    }
    for (entry, &mask) in matrix.iter_mut().zip(basis.iter()) {
        *entry ^= mask;
    }
    Ok(())
}

/// Runs one transform test against the basis of `ctx`.
///
/// Returns `changed() == false` for an all-zero basis; that is a counted
/// outcome, not an error.
pub fn test_lattice_transform<R: RngCore + ?Sized>(
    ctx: &LatticeContext,
    workspace: &mut TransformWorkspace,
    rng: &mut R,
) -> Result<TransformOutcome> {
    if workspace.dimension != ctx.dimension() {
        return Err(DtpsError::InvalidDimension {
            expected: ctx.side(),
            got: workspace.dimension as usize,
        });
    }

    for entry in workspace.original.iter_mut() {
        *entry = draw_u32(rng);
    }

    workspace.transformed.copy_from_slice(&workspace.original);
    apply_basis(&mut workspace.transformed, ctx.basis())?;

    let original_digest = TransformWorkspace::digest_of(&workspace.original, &mut workspace.bytes);
    let transformed_digest =
        TransformWorkspace::digest_of(&workspace.transformed, &mut workspace.bytes);

    Ok(TransformOutcome {
        original_digest,
        transformed_digest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::BasisFill;
    use crate::rng::seeded;
    use proptest::prelude::*;

    fn context(dimension: u32, fill: BasisFill) -> LatticeContext {
        let mut rng = seeded(5);
        let mut ctx = LatticeContext::new(dimension, 256).unwrap();
        ctx.fill_basis(fill, &mut rng);
        ctx
    }

    #[test]
    fn test_zero_basis_is_identity() {
        let ctx = context(8, BasisFill::Zero);
        let mut workspace = TransformWorkspace::for_context(&ctx).unwrap();
        let mut rng = seeded(11);
        for _ in 0..5 {
            let outcome = test_lattice_transform(&ctx, &mut workspace, &mut rng).unwrap();
            assert!(!outcome.changed());
            assert_eq!(workspace.original(), workspace.transformed());
        }
    }

    #[test]
    fn test_nonzero_basis_changes_digest() {
        let ctx = context(16, BasisFill::Random);
        let mut workspace = TransformWorkspace::for_context(&ctx).unwrap();
        let mut rng = seeded(12);
        for _ in 0..10 {
            let outcome = test_lattice_transform(&ctx, &mut workspace, &mut rng).unwrap();
            assert!(outcome.changed());
        }
    }

    #[test]
    fn test_digest_covers_raw_matrix_bytes() {
        let ctx = context(4, BasisFill::Constant(1));
        let mut workspace = TransformWorkspace::for_context(&ctx).unwrap();
        let outcome = test_lattice_transform(&ctx, &mut workspace, &mut seeded(3)).unwrap();

        let mut bytes = Vec::new();
        for word in workspace.original() {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        assert_eq!(bytes.len(), 16 * 4);
        assert_eq!(outcome.original_digest, compute_digest(&bytes));
    }

    #[test]
    fn test_workspace_reused_across_trials() {
        let ctx = context(4, BasisFill::Random);
        let mut workspace = TransformWorkspace::for_context(&ctx).unwrap();
        let mut rng = seeded(21);
        let first = test_lattice_transform(&ctx, &mut workspace, &mut rng).unwrap();
        let second = test_lattice_transform(&ctx, &mut workspace, &mut rng).unwrap();
        assert_ne!(first.original_digest, second.original_digest);
    }

    #[test]
    fn test_mismatched_workspace_rejected() {
        let ctx = context(4, BasisFill::Random);
        let mut workspace = TransformWorkspace::new(8).unwrap();
        let err = test_lattice_transform(&ctx, &mut workspace, &mut seeded(1)).unwrap_err();
        assert!(matches!(err, DtpsError::InvalidDimension { expected: 4, got: 8 }));
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let ctx = context(8, BasisFill::Random);
        let mut workspace = TransformWorkspace::for_context(&ctx).unwrap();
        let a = test_lattice_transform(&ctx, &mut workspace, &mut seeded(99)).unwrap();
        let b = test_lattice_transform(&ctx, &mut workspace, &mut seeded(99)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn test_xor_involution(
            matrix in prop::collection::vec(any::<u32>(), 16),
            basis in prop::collection::vec(any::<u32>(), 16),
        ) {
            let mut transformed = matrix.clone();
            apply_basis(&mut transformed, &basis).unwrap();
            apply_basis(&mut transformed, &basis).unwrap();
            prop_assert_eq!(transformed, matrix);
        }

        #[test]
        fn test_nonzero_mask_changes_matrix(
            matrix in prop::collection::vec(any::<u32>(), 16),
            position in 0usize..16,
            mask in 1u32..,
        ) {
            let mut basis = vec![0u32; 16];
            basis[position] = mask;
            let mut transformed = matrix.clone();
            apply_basis(&mut transformed, &basis).unwrap();
            prop_assert_ne!(transformed, matrix);
        }
    }
}
