//! Step 5: zsh and Oh My Zsh.
use anyhow::Result;

use super::{Context, Step, StepResult};
use crate::actions::install_if_absent;
use crate::actions::tool::{Installer, ToolResource};

/// zsh and the Oh My Zsh framework.
#[derive(Debug)]
pub struct InstallZsh;

impl Step for InstallZsh {
    fn label(&self) -> &str {
        "Install zsh and Oh My Zsh"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.platform.is_windows()
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let zsh = ToolResource::new(
            "zsh",
            Installer::Package {
                id: "zsh".to_string(),
            },
            ctx,
        );
        let framework = ToolResource::new(
            "oh-my-zsh",
            Installer::script(&ctx.config.shell.oh_my_zsh_url, "sh", &["--unattended"])
                .with_env("RUNZSH", "no")
                .with_env("CHSH", "no")
                .with_env("KEEP_ZSHRC", "yes"),
            ctx,
        )
        .with_marker(ctx.home_path(".oh-my-zsh"));

        let changes = [
            install_if_absent(&zsh, ctx.log.as_ref(), ctx.dry_run)?,
            install_if_absent(&framework, ctx.log.as_ref(), ctx.dry_run)?,
        ];
        Ok(StepResult::from_changes(&changes))
    }
}
