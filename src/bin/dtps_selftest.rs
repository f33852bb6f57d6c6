//! dtps-selftest - runs the lattice transform and certificate self-test

use dtps_selftest::telemetry::setup_tracing;
use dtps_selftest::{run_selftest, HarnessConfig, RunStatus};
use std::io;
use std::process::ExitCode;
use tracing::{error, Level};

fn main() -> ExitCode {
    setup_tracing(Level::INFO);

    let config = HarnessConfig::default();
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    match run_selftest(&config, &mut out, &mut err) {
        Ok(RunStatus::Completed { .. }) => ExitCode::SUCCESS,
        Ok(RunStatus::ContextUnavailable) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "self-test aborted");
            ExitCode::FAILURE
        }
    }
}
