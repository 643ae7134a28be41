//! Command: the provisioning flow.
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::error::ProvisionError;
use crate::logging::Logger;
use crate::runner::Runner;
use crate::skip_state::{SkipSet, SkipStateStore};
use crate::steps::{Context, catalog};
use crate::verify::{RunReport, print_next_steps};

/// Where the skip list comes from.
#[derive(Debug, Clone, Copy)]
pub enum SkipSource<'a> {
    /// Given on the command line; no prompts.
    Given(&'a SkipSet),
    /// Offered from, and optionally saved to, the file at this path.
    Stored(&'a Path),
}

/// Run the provisioning command.
///
/// # Errors
///
/// Returns an error on an unsupported platform, a configuration error or a
/// fatal step failure.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let version = super::version::current();
    log.info(&format!("devsetup {version}"));

    let setup = super::CommandSetup::init(global, log)?;
    let skip_path = global
        .skip_file
        .clone()
        .unwrap_or_else(|| SkipStateStore::default_path(&setup.home));
    let mut ctx = setup.context(global, Arc::clone(log))?;

    let source = global
        .skip
        .as_ref()
        .map_or(SkipSource::Stored(&skip_path), SkipSource::Given);
    provision(&mut ctx, source, log)?;
    Ok(())
}

/// Check the platform, settle the skip list, run every step and verify.
///
/// The summary is printed even when a step aborts the run.
///
/// # Errors
///
/// Returns an error if the platform is unsupported (before any step runs),
/// a skip prompt fails, or an aborting step fails.
pub fn provision(ctx: &mut Context, skip: SkipSource<'_>, log: &Logger) -> Result<RunReport> {
    if let Err(e) = ctx.platform.ensure_supported() {
        log.error(&e.to_string());
        for alternative in ctx.platform.alternatives() {
            log.info(&format!("  - {alternative}"));
        }
        return Err(ProvisionError::from(e).into());
    }
    if ctx.dry_run {
        log.warn("dry run: nothing will be changed");
    }

    let registry = catalog::registry().map_err(ProvisionError::from)?;
    let runner = Runner::new(registry).with_probes(catalog::verification_probes);
    let skip = match skip {
        SkipSource::Given(set) => set.clone(),
        SkipSource::Stored(path) => {
            let store = SkipStateStore::new(path, Arc::clone(&ctx.fs_ops));
            store.resolve(ctx.prompt.as_ref(), &runner.registry().listing(), log)?
        }
    };
    if !skip.is_empty() {
        log.debug(&format!("skip list: {skip}"));
    }

    let outcome = runner.run(&skip, ctx);
    log.print_summary();
    let report = outcome.map_err(ProvisionError::from)?;
    print_next_steps(ctx);
    Ok(report)
}
