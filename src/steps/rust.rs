//! Step 7: rustup and the Rust toolchain.
use anyhow::Result;

use super::{Context, Step, StepResult};
use crate::actions::install_if_absent;
use crate::actions::tool::{Installer, ToolResource};

/// The Rust toolchain through rustup.
#[derive(Debug)]
pub struct InstallRust;

impl Step for InstallRust {
    fn label(&self) -> &str {
        "Install Rust"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let cargo_bin = ctx.home_path(".cargo").join("bin");
        ctx.session.prepend_path(cargo_bin);

        let rust = &ctx.config.rust;
        let installer = if ctx.platform.is_windows() {
            Installer::Package {
                id: rust
                    .winget
                    .clone()
                    .unwrap_or_else(|| "Rustlang.Rustup".to_string()),
            }
        } else {
            // The shell profile step owns PATH; rustup must not edit profiles.
            Installer::script(&rust.rustup_url, "sh", &["-y", "--no-modify-path"])
        };
        let cargo = ToolResource::new("cargo", installer, ctx);
        let change = install_if_absent(&cargo, ctx.log.as_ref(), ctx.dry_run)?;
        Ok(StepResult::from_changes(&[change]))
    }
}
