//! Deterministic self-test harness for DTPS lattice transforms and
//! certificate records.
//!
//! The harness exercises two placeholder operations: XORing a pseudo-random
//! matrix with a lattice basis and checking that the content digest moves,
//! and producing certificate records with derived lattice parameters. None of
//! it is a cryptographic construction.

pub mod benchmark;
pub mod certificate;
pub mod config;
pub mod digest;
pub mod driver;
pub mod error;
pub mod lattice;
pub mod rng;
pub mod telemetry;
pub mod transform;


pub use benchmark::{run_benchmark, BenchmarkReport};
pub use certificate::{
    generate_certificate, generate_certificate_at, Certificate, CertificateIssuer, QuantumState,
    SystemClockIssuer,
};
pub use config::HarnessConfig;
pub use digest::{compute_digest, RollingDigest};
pub use driver::{run_selftest, run_selftest_with, Harness, HarnessSummary, RunStatus, TrialOutcome};
pub use error::{DtpsError, Result};
pub use lattice::{BasisFill, LatticeContext, LatticeParams, ReleasedResources};
pub use transform::{apply_basis, test_lattice_transform, TransformOutcome, TransformWorkspace};
