//! Command: list the numbered steps.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::PackageGroup;
use crate::logging::Logger;
use crate::skip_state::SkipStateStore;
use crate::steps::{Context, catalog};

/// Run the steps command.
///
/// # Errors
///
/// Returns an error if configuration loading fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let skip_path = global
        .skip_file
        .clone()
        .unwrap_or_else(|| SkipStateStore::default_path(&setup.home));
    let ctx = setup.context(global, Arc::clone(log))?;
    let store = SkipStateStore::new(skip_path, Arc::clone(&ctx.fs_ops));
    for line in describe(&ctx, &store)? {
        println!("{line}");
    }
    Ok(())
}

/// Lines of the listing: every step, the packages of each group on this
/// platform, and the saved skip list.
///
/// # Errors
///
/// Returns an error if the registry is malformed or the skip file cannot
/// be read.
pub fn describe(ctx: &Context, store: &SkipStateStore) -> Result<Vec<String>> {
    let registry = catalog::registry()?;
    let mut lines: Vec<String> = registry.listing().lines().map(str::to_string).collect();

    lines.push(String::new());
    for (group, name) in [
        (PackageGroup::Base, "base"),
        (PackageGroup::Runtime, "runtime"),
        (PackageGroup::Cli, "cli"),
    ] {
        let names = catalog::package_names(ctx, group);
        let shown = if names.is_empty() {
            "(none)".to_string()
        } else {
            names.join(" ")
        };
        lines.push(format!("{name} packages: {shown}"));
    }

    lines.push(String::new());
    match store.load_raw()? {
        Some(raw) if !raw.is_empty() => {
            lines.push(format!("saved skip list: {raw} ({})", store.path().display()));
        }
        _ => lines.push(format!("no saved skip list ({})", store.path().display())),
    }
    Ok(lines)
}
