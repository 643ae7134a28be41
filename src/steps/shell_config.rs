//! Step 12: shell profile files.
use std::path::Path;

use anyhow::Result;

use super::{Context, Step, StepResult};
use crate::actions::managed_file::ManagedFile;
use crate::actions::profile_line::ProfileLine;
use crate::actions::{ResourceChange, configure_with_confirmation, install_if_absent};
use crate::config::Config;
use crate::platform::Arch;

/// `.zshrc`, `.profile` exports and the PowerShell profile.
#[derive(Debug)]
pub struct ConfigureShell;

/// Generated `.zshrc`.
#[must_use]
pub fn render_zshrc(config: &Config) -> String {
    let theme = format!("~/.config/oh-my-posh/{}", config.prompt.theme_file);
    format!(
        "# Managed by devsetup. Local additions belong in ~/.zshrc.local.\n\
         export ZSH=\"$HOME/.oh-my-zsh\"\n\
         ZSH_THEME=\"{zsh_theme}\"\n\
         plugins=({plugins})\n\
         source \"$ZSH/oh-my-zsh.sh\"\n\
         \n\
         [ -f \"$HOME/.profile\" ] && source \"$HOME/.profile\"\n\
         [ -f \"$HOME/.zshrc.local\" ] && source \"$HOME/.zshrc.local\"\n\
         \n\
         if command -v oh-my-posh >/dev/null 2>&1; then\n  \
         eval \"$(oh-my-posh init zsh --config {theme})\"\n\
         fi\n",
        zsh_theme = config.shell.zsh_theme,
        plugins = config.shell.plugins.join(" "),
    )
}

/// Lines `.profile` must carry so new shells find every installed tool.
#[must_use]
pub fn profile_lines(ctx: &Context) -> Vec<String> {
    let mut lines = Vec::new();
    if ctx.platform.is_macos() {
        let brew = if ctx.platform.arch == Arch::Arm64 {
            "/opt/homebrew/bin/brew"
        } else {
            "/usr/local/bin/brew"
        };
        lines.push(format!("eval \"$({brew} shellenv)\""));
    } else {
        let go_bin = Path::new(&ctx.config.go.install_dir).join("go").join("bin");
        lines.push(ProfileLine::path_export(&go_bin.to_string_lossy()));
    }
    for dir in ["$HOME/go/bin", "$HOME/.cargo/bin", "$HOME/.local/bin"] {
        lines.push(ProfileLine::path_export(dir));
    }
    lines
}

fn configure_posix(ctx: &Context) -> Result<Vec<ResourceChange>> {
    let mut changes = Vec::new();

    let zshrc_path = ctx.home_path(".zshrc");
    let zshrc = ManagedFile::new(
        &zshrc_path,
        render_zshrc(&ctx.config),
        ctx.fs_ops.as_ref(),
    );
    changes.push(configure_with_confirmation(
        &zshrc,
        &format!("Replace {} with the generated version?", zshrc_path.display()),
        ctx.prompt.as_ref(),
        ctx.log.as_ref(),
        ctx.dry_run,
    )?);

    let profile = ctx.home_path(".profile");
    for line in profile_lines(ctx) {
        let entry = ProfileLine::new(&profile, line, ctx.fs_ops.as_ref());
        changes.push(install_if_absent(&entry, ctx.log.as_ref(), ctx.dry_run)?);
    }
    Ok(changes)
}

fn configure_powershell(ctx: &Context) -> Result<Vec<ResourceChange>> {
    let profile = ctx
        .home_path("Documents")
        .join("PowerShell")
        .join("Microsoft.PowerShell_profile.ps1");
    let line = format!(
        "oh-my-posh init pwsh --config \"$env:USERPROFILE\\.config\\oh-my-posh\\{}\" | Invoke-Expression",
        ctx.config.prompt.theme_file
    );
    let entry = ProfileLine::new(&profile, line, ctx.fs_ops.as_ref());
    Ok(vec![install_if_absent(&entry, ctx.log.as_ref(), ctx.dry_run)?])
}

impl Step for ConfigureShell {
    fn label(&self) -> &str {
        "Configure shell profiles"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let changes = if ctx.platform.is_windows() {
            configure_powershell(ctx)?
        } else {
            configure_posix(ctx)?
        };
        Ok(StepResult::from_changes(&changes))
    }
}
