//! Steps 1, 2, 8 and 9: package manager preparation and package groups.
use anyhow::Result;

use super::{Context, FailurePolicy, Step, StepResult};
use crate::actions::package::{self, PackageResource};
use crate::actions::tool::{Installer, ToolResource};
use crate::actions::{Resource, ResourceState, install_if_absent};
use crate::config::{PackageGroup, packages};
use crate::error::ActionError;
use crate::platform::{Arch, PackageManager};

/// Make the platform package manager usable: bootstrap Homebrew on macOS,
/// refresh package metadata on Linux, require winget on Windows.
#[derive(Debug)]
pub struct PreparePackageManager;

impl PreparePackageManager {
    fn bootstrap_homebrew(ctx: &mut Context) -> Result<StepResult> {
        let prefix = if ctx.platform.arch == Arch::Arm64 {
            "/opt/homebrew/bin"
        } else {
            "/usr/local/bin"
        };
        ctx.session.prepend_path(prefix);

        let change = {
            let installer = Installer::script(&ctx.config.homebrew.install_url, "bash", &[])
                .with_env("NONINTERACTIVE", "1");
            let brew = ToolResource::new("brew", installer, ctx);
            install_if_absent(&brew, ctx.log.as_ref(), ctx.dry_run)?
        };
        if ctx.dry_run {
            return Ok(StepResult::from_changes(&[change]));
        }
        if !ctx.which("brew") {
            return Err(ActionError::InstallIncomplete {
                target: "brew".to_string(),
            }
            .into());
        }
        ctx.run_interactive("brew", &["update"], &[])?;
        Ok(StepResult::from_changes(&[change]))
    }

    fn refresh(ctx: &Context, program: &str, args: &[&str]) -> Result<StepResult> {
        if !ctx.which("sudo") {
            return Err(ActionError::MissingPrerequisite {
                tool: "sudo".to_string(),
                hint: "package installation needs root privileges through sudo".to_string(),
            }
            .into());
        }
        if ctx.dry_run {
            ctx.log.dry_run(&format!("would run: {program} {}", args.join(" ")));
            return Ok(StepResult::DryRun);
        }
        ctx.run_interactive(program, args, &[])?;
        Ok(StepResult::Ok)
    }
}

impl Step for PreparePackageManager {
    fn label(&self) -> &str {
        "Prepare package manager"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        match ctx.package_manager()? {
            PackageManager::Brew => Self::bootstrap_homebrew(ctx),
            PackageManager::Dnf => Self::refresh(ctx, "sudo", &["dnf", "makecache", "-y"]),
            PackageManager::Apt => Self::refresh(ctx, "sudo", &["apt-get", "update"]),
            PackageManager::Winget => {
                if ctx.which("winget") {
                    Ok(StepResult::AlreadyPresent)
                } else {
                    Err(ActionError::MissingPrerequisite {
                        tool: "winget".to_string(),
                        hint: "install \"App Installer\" from the Microsoft Store, then re-run"
                            .to_string(),
                    }
                    .into())
                }
            }
        }
    }
}

/// Install every configured package of one group.
///
/// A strict step installs all missing packages in one batch and fails as a
/// whole. A tolerant step installs them one by one and reports the ones
/// that failed as a warning.
#[derive(Debug)]
pub struct InstallPackages {
    label: &'static str,
    group: PackageGroup,
    tolerant: bool,
}

impl InstallPackages {
    /// One batch install; a failure aborts the run.
    #[must_use]
    pub const fn strict(label: &'static str, group: PackageGroup) -> Self {
        Self {
            label,
            group,
            tolerant: false,
        }
    }

    /// One install per package; failures end the step with a warning.
    #[must_use]
    pub const fn tolerant(label: &'static str, group: PackageGroup) -> Self {
        Self {
            label,
            group,
            tolerant: true,
        }
    }

    fn missing(&self, ctx: &Context, manager: PackageManager) -> Result<Vec<String>> {
        let mut missing = Vec::new();
        for pkg in packages::select(&ctx.config.packages, self.group, &ctx.platform.family) {
            let id = pkg.id_for(manager);
            let resource = PackageResource::new(id, manager, ctx);
            match resource.current_state()? {
                ResourceState::Correct => ctx.log.debug(&format!("{id}: already installed")),
                _ => missing.push(id.to_string()),
            }
        }
        Ok(missing)
    }
}

impl Step for InstallPackages {
    fn label(&self) -> &str {
        self.label
    }

    fn failure_policy(&self) -> FailurePolicy {
        if self.tolerant {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        }
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let manager = ctx.package_manager()?;
        let missing = self.missing(ctx, manager)?;
        if missing.is_empty() {
            return Ok(StepResult::AlreadyPresent);
        }
        if ctx.dry_run {
            for id in &missing {
                ctx.log.dry_run(&format!("would install {id} ({manager})"));
            }
            return Ok(StepResult::DryRun);
        }

        ctx.log.info(&format!("installing {}", missing.join(", ")));
        if !self.tolerant {
            let ids: Vec<&str> = missing.iter().map(String::as_str).collect();
            package::install(ctx, manager, &ids)?;
            return Ok(StepResult::Ok);
        }

        let mut failed = Vec::new();
        for id in &missing {
            if let Err(e) = package::install(ctx, manager, &[id.as_str()]) {
                ctx.log.warn(&format!("{id}: {e:#}"));
                failed.push(id.as_str());
            }
        }
        if failed.is_empty() {
            Ok(StepResult::Ok)
        } else {
            Ok(StepResult::Warned(format!("not installed: {}", failed.join(", "))))
        }
    }
}
