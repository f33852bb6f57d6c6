//! Parallel timing run over the transform test and certificate generation.
//!
//! Iterations run on the rayon pool. Each one draws from its own stream of
//! the run seed and owns its own workspace, so the per-iteration outcomes are
//! identical for a given seed however the pool schedules them.

use crate::certificate::{generate_certificate, Certificate};
use crate::error::{DtpsError, Result};
use crate::lattice::{BasisFill, LatticeContext};
use crate::rng::trial_stream;
use crate::transform::{test_lattice_transform, TransformOutcome, TransformWorkspace};
use rayon::prelude::*;
use std::mem::size_of;
use std::time::{Duration, Instant};
use tracing::info;

/// Stream index reserved for populating the basis.
const BASIS_STREAM: u64 = u64::MAX;

/// Aggregated benchmark figures.
#[derive(Clone, Debug)]
pub struct BenchmarkReport {
    pub matrix_size: u32,
    pub iterations: usize,
    pub avg_time_ms: f64,
    /// Fraction of issued certificates that were still coherent.
    pub coherence_rate: f64,
    /// Fraction of iterations whose transform changed the digest.
    pub change_rate: f64,
    /// Signature bytes per matrix entry, averaged over iterations.
    pub avg_efficiency: f64,
    /// Per-iteration outcomes in iteration order.
    pub outcomes: Vec<TransformOutcome>,
}

struct Sample {
    elapsed: Duration,
    outcome: TransformOutcome,
    coherent: bool,
    efficiency: f64,
}

/// Signature bytes relative to the `matrix_size x matrix_size` input.
fn signature_efficiency(certificate: &Certificate, matrix_size: u32) -> f64 {
    let cells = (matrix_size as f64) * (matrix_size as f64);
    if cells == 0.0 {
        return 0.0;
    }
    (certificate.signature.len() * size_of::<u64>()) as f64 / cells
}

pub fn run_benchmark(matrix_size: u32, iterations: usize, seed: u64) -> Result<BenchmarkReport> {
    if iterations == 0 {
        return Err(DtpsError::InvalidParameters(
            "Must run at least one iteration".to_string(),
        ));
    }

    let mut context = LatticeContext::new(matrix_size, crate::config::SECURITY_LEVEL)?;
    context.fill_basis(BasisFill::Random, &mut trial_stream(seed, BASIS_STREAM));
    let context = &context;

    let samples = (0..iterations)
        .into_par_iter()
        .map_init(
            || TransformWorkspace::for_context(context),
            |workspace, index| -> Result<Sample> {
                let workspace = match workspace {
                    Ok(ws) => ws,
                    Err(err) => return Err(DtpsError::MemoryAllocationError(err.to_string())),
                };
                let mut rng = trial_stream(seed, index as u64);

                let start = Instant::now();
                let outcome = test_lattice_transform(context, workspace, &mut rng)?;
                let certificate = generate_certificate(context, &mut rng)?;
                let elapsed = start.elapsed();

                Ok(Sample {
                    elapsed,
                    outcome,
                    coherent: certificate.is_coherent(),
                    efficiency: signature_efficiency(&certificate, matrix_size),
                })
            },
        )
        .collect::<Result<Vec<_>>>()?;

    let n = samples.len() as f64;
    let total: Duration = samples.iter().map(|s| s.elapsed).sum();
    let coherent = samples.iter().filter(|s| s.coherent).count() as f64;
    let changed = samples.iter().filter(|s| s.outcome.changed()).count() as f64;

    let report = BenchmarkReport {
        matrix_size,
        iterations,
        avg_time_ms: total.as_secs_f64() * 1000.0 / n,
        coherence_rate: coherent / n,
        change_rate: changed / n,
        avg_efficiency: samples.iter().map(|s| s.efficiency).sum::<f64>() / n,
        outcomes: samples.into_iter().map(|s| s.outcome).collect(),
    };

    info!(
        matrix_size,
        iterations,
        avg_time_ms = report.avg_time_ms,
        coherence_rate = report.coherence_rate,
        avg_efficiency = report.avg_efficiency,
        "benchmark finished"
    );

    Ok(report)
}
