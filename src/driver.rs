//! Self-test driver.
//!
//! One run seeds a generator once, allocates one lattice context, and then
//! for each trial runs the transform test and issues a certificate. Transform
//! outcomes are counted; certificates are reported and dropped. A context
//! that cannot be allocated ends the run before any trial.

use crate::certificate::{Certificate, CertificateIssuer, SystemClockIssuer};
use crate::config::HarnessConfig;
use crate::error::Result;
use crate::lattice::{LatticeContext, ReleasedResources};
use crate::rng::{seed_from_clock, seeded};
use crate::transform::{test_lattice_transform, TransformOutcome, TransformWorkspace};
use rand_core::RngCore;
use std::fmt;
use std::io::Write;
use tracing::{debug, error, info, warn};

/// Diagnostic written to the error channel when the context is unavailable.
pub const CONTEXT_FAILURE_MESSAGE: &str = "Failed to allocate quantum context";

/// Result of a single trial.
#[derive(Clone, Debug)]
pub struct TrialOutcome {
    pub index: usize,
    pub transform: TransformOutcome,
    /// `None` when the issuer failed; the trial still counts its transform.
    pub certificate: Option<Certificate>,
}

/// Aggregate of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarnessSummary {
    pub successes: usize,
    pub total: usize,
    pub certificates_issued: usize,
}

impl HarnessSummary {
    pub fn all_passed(&self) -> bool {
        self.successes == self.total
    }
}

impl fmt::Display for HarnessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} successful", self.successes, self.total)
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Completed {
        summary: HarnessSummary,
        released: ReleasedResources,
    },
    /// The lattice context (or its scratch space) could not be allocated.
    ContextUnavailable,
}

/// A prepared run: populated context, reusable workspace, generator, issuer.
pub struct Harness<R, I = SystemClockIssuer> {
    context: LatticeContext,
    workspace: TransformWorkspace,
    rng: R,
    issuer: I,
    trials: usize,
}

impl<R: RngCore, I: CertificateIssuer> Harness<R, I> {
    pub fn new(config: &HarnessConfig, mut rng: R, issuer: I) -> Result<Self> {
        config.validate()?;

        let mut context = LatticeContext::new(config.dimension, config.security_level)?;
        context.fill_basis(config.basis, &mut rng);
        if context.basis_is_zero() && config.dimension > 0 {
            warn!(dimension = config.dimension, "lattice basis is all zero; transform is the identity");
        }
        let workspace = TransformWorkspace::for_context(&context)?;

        Ok(Self {
            context,
            workspace,
            rng,
            issuer,
            trials: config.trials,
        })
    }

    pub fn context(&self) -> &LatticeContext {
        &self.context
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Runs trial `index`. Issuer failures are logged and leave the
    /// certificate empty.
    pub fn run_trial(&mut self, index: usize) -> Result<TrialOutcome> {
        let transform = test_lattice_transform(&self.context, &mut self.workspace, &mut self.rng)?;

        let certificate = match self.issuer.issue(&self.context, &mut self.rng) {
            Ok(cert) => Some(cert),
            Err(err) => {
                warn!(trial = index, error = %err, "certificate generation failed");
                None
            }
        };

        Ok(TrialOutcome {
            index,
            transform,
            certificate,
        })
    }

    /// Runs every trial, writes the report to `out`, and releases the context.
    pub fn run<W: Write>(mut self, out: &mut W) -> Result<(HarnessSummary, ReleasedResources)> {
        writeln!(out, "Running quantum operation tests...")?;

        let mut summary = HarnessSummary {
            successes: 0,
            total: self.trials,
            certificates_issued: 0,
        };

        for index in 0..self.trials {
            let trial = self.run_trial(index)?;

            writeln!(out, "Original matrix hash: {:x}", trial.transform.original_digest)?;
            writeln!(out, "Transformed matrix hash: {:x}", trial.transform.transformed_digest)?;
            if trial.transform.changed() {
                summary.successes += 1;
            } else {
                debug!(trial = index, "transform left the digest unchanged");
            }

            if let Some(cert) = trial.certificate {
                summary.certificates_issued += 1;
                writeln!(out, "Test vector {}: Certificate generated successfully", index)?;
                writeln!(out, "  Signature: {}", cert.signature_hex())?;
            }
        }

        writeln!(out, "Quantum tests completed: {}", summary)?;
        if !summary.all_passed() {
            debug!(
                failed = summary.total - summary.successes,
                "some transform trials left the digest unchanged"
            );
        }

        let Harness { context, .. } = self;
        let released = context.destroy();
        Ok((summary, released))
    }
}

/// Runs the self-test with a clock seed (unless the configuration fixes one)
/// and the system-clock issuer.
pub fn run_selftest<O: Write, E: Write>(
    config: &HarnessConfig,
    out: &mut O,
    err: &mut E,
) -> Result<RunStatus> {
    let seed = config.seed.unwrap_or_else(seed_from_clock);
    info!(seed, dimension = config.dimension, trials = config.trials, "seeding self-test");
    run_selftest_with(config, seeded(seed), SystemClockIssuer, out, err)
}

/// Runs the self-test with an explicit generator and issuer.
pub fn run_selftest_with<R, I, O, E>(
    config: &HarnessConfig,
    rng: R,
    issuer: I,
    out: &mut O,
    err: &mut E,
) -> Result<RunStatus>
where
    R: RngCore,
    I: CertificateIssuer,
    O: Write,
    E: Write,
{
    let harness = match Harness::new(config, rng, issuer) {
        Ok(harness) => harness,
        Err(e) if e.is_allocation() => {
            error!(error = %e, dimension = config.dimension, "lattice context allocation failed");
            writeln!(err, "{}", CONTEXT_FAILURE_MESSAGE)?;
            return Ok(RunStatus::ContextUnavailable);
        }
        Err(e) => return Err(e),
    };

    let (summary, released) = harness.run(out)?;
    info!(
        successes = summary.successes,
        total = summary.total,
        certificates = summary.certificates_issued,
        "self-test finished"
    );
    Ok(RunStatus::Completed { summary, released })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::BasisFill;
    use crate::rng::seeded;

    #[test]
    fn test_summary_display() {
        let summary = HarnessSummary {
            successes: 3,
            total: 5,
            certificates_issued: 5,
        };
        assert_eq!(summary.to_string(), "3/5 successful");
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_run_trial_reports_certificate() {
        let config = HarnessConfig::default()
            .with_dimension(4)
            .with_trials(1)
            .with_basis(BasisFill::Constant(1));
        let mut harness = Harness::new(&config, seeded(1), SystemClockIssuer).unwrap();
        let trial = harness.run_trial(0).unwrap();
        assert!(trial.transform.changed());
        let cert = trial.certificate.unwrap();
        assert_eq!(cert.qubits, 8);
    }

    #[test]
    fn test_context_sized_from_config() {
        let config = HarnessConfig::default().with_dimension(6).with_trials(2);
        let harness = Harness::new(&config, seeded(2), SystemClockIssuer).unwrap();
        assert_eq!(harness.context().basis().len(), 36);
        assert_eq!(harness.trials(), 2);
    }

    #[test]
    fn test_qubit_overflow_reports_context_failure() {
        let config = HarnessConfig::default().with_dimension(u32::MAX / 2 + 1);
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        let status =
            run_selftest_with(&config, seeded(1), SystemClockIssuer, &mut out, &mut err).unwrap();
        assert_eq!(status, RunStatus::ContextUnavailable);
        assert!(out.is_empty());
        assert_eq!(err, format!("{}\n", CONTEXT_FAILURE_MESSAGE).into_bytes());
    }

    #[test]
    fn test_zero_basis_run_is_not_all_passed() {
        let config = HarnessConfig::default()
            .with_dimension(2)
            .with_trials(2)
            .with_basis(BasisFill::Zero);
        let harness = Harness::new(&config, seeded(3), SystemClockIssuer).unwrap();
        assert!(harness.context().basis_is_zero());
        let (summary, _) = harness.run(&mut Vec::<u8>::new()).unwrap();
        assert!(!summary.all_passed());
        assert_eq!(summary.successes, 0);
    }
}
