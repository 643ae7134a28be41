//! Command: run only the verification battery.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::runner::Runner;
use crate::steps::{Context, catalog};
use crate::verify::RunReport;

/// Run the verification command.
///
/// Failing checks are reported but do not make the command fail.
///
/// # Errors
///
/// Returns an error if configuration loading fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let mut ctx = setup.context(global, Arc::clone(log))?;
    verify(&mut ctx)?;
    Ok(())
}

/// Put the install locations on the session `PATH` and run every probe.
///
/// # Errors
///
/// Returns an error if the step registry is malformed.
pub fn verify(ctx: &mut Context) -> Result<RunReport> {
    catalog::prime_session(ctx);
    let runner = Runner::new(catalog::registry()?).with_probes(catalog::verification_probes);
    Ok(runner.verify(ctx))
}
