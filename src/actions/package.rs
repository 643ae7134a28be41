//! Package installation resource.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::platform::PackageManager;
use crate::steps::Context;

/// A system package that can be checked and installed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name (or winget ID) as the manager knows it.
    pub id: String,
    /// Manager that installs and queries the package.
    pub manager: PackageManager,
    ctx: &'a Context,
}

impl<'a> PackageResource<'a> {
    /// Package `id` under `manager`.
    #[must_use]
    pub fn new(id: &str, manager: PackageManager, ctx: &'a Context) -> Self {
        Self {
            id: id.to_string(),
            manager,
            ctx,
        }
    }
}

/// Command that reports whether `id` is installed.
#[must_use]
pub fn query_command(manager: PackageManager, id: &str) -> (&'static str, Vec<String>) {
    let args: Vec<&str> = match manager {
        PackageManager::Brew => vec!["list", "--versions", id],
        PackageManager::Dnf => vec!["-q", id],
        PackageManager::Apt => vec!["-W", "-f=${Status}", id],
        PackageManager::Winget => vec![
            "list",
            "--id",
            id,
            "--exact",
            "--accept-source-agreements",
            "--disable-interactivity",
        ],
    };
    let program = match manager {
        PackageManager::Brew => "brew",
        PackageManager::Dnf => "rpm",
        PackageManager::Apt => "dpkg-query",
        PackageManager::Winget => "winget",
    };
    (program, args.into_iter().map(String::from).collect())
}

/// Command that installs every id in `ids` in one invocation.
///
/// Winget installs one package per call, so callers pass a single id for it.
#[must_use]
pub fn install_command(manager: PackageManager, ids: &[&str]) -> (&'static str, Vec<String>) {
    let (program, mut args): (&str, Vec<&str>) = match manager {
        PackageManager::Brew => ("brew", vec!["install"]),
        PackageManager::Dnf => ("sudo", vec!["dnf", "install", "-y"]),
        PackageManager::Apt => (
            "sudo",
            vec!["DEBIAN_FRONTEND=noninteractive", "apt-get", "install", "-y"],
        ),
        PackageManager::Winget => (
            "winget",
            vec![
                "install",
                "--exact",
                "--silent",
                "--accept-package-agreements",
                "--accept-source-agreements",
                "--id",
            ],
        ),
    };
    args.extend_from_slice(ids);
    (program, args.into_iter().map(String::from).collect())
}

fn is_installed(manager: PackageManager, id: &str, stdout: &str) -> bool {
    match manager {
        PackageManager::Brew => !stdout.trim().is_empty(),
        PackageManager::Dnf => true,
        PackageManager::Apt => stdout.contains("install ok installed"),
        PackageManager::Winget => stdout.to_lowercase().contains(&id.to_lowercase()),
    }
}

/// Install `ids` with `manager`, batching where the manager allows it.
///
/// # Errors
///
/// Returns an error if any install command fails.
pub fn install(ctx: &Context, manager: PackageManager, ids: &[&str]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let batches: Vec<Vec<&str>> = if manager == PackageManager::Winget {
        ids.iter().map(|id| vec![*id]).collect()
    } else {
        vec![ids.to_vec()]
    };
    for batch in batches {
        let (program, args) = install_command(manager, &batch);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        ctx.run_interactive(program, &args, &[])?;
    }
    Ok(())
}

impl Resource for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.id, self.manager)
    }

    fn current_state(&self) -> Result<ResourceState> {
        let (program, args) = query_command(self.manager, &self.id);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = self.ctx.run_unchecked(program, &args)?;
        if result.success && is_installed(self.manager, &self.id, &result.stdout) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        install(self.ctx, self.manager, &[self.id.as_str()])?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::steps::test_helpers::{RecordingExecutor, linux_context};
    use std::sync::Arc;

    #[test]
    fn description_names_manager() {
        let (ctx, _fs) = linux_context(RecordingExecutor::new());
        let r = PackageResource::new("ripgrep", PackageManager::Apt, &ctx);
        assert_eq!(r.description(), "ripgrep (apt)");
    }

    #[test]
    fn apt_query_parses_status() {
        let exec = RecordingExecutor::new().respond(
            "dpkg-query -W",
            true,
            "install ok installed",
        );
        let (ctx, _fs) = linux_context(exec);
        let r = PackageResource::new("git", PackageManager::Apt, &ctx);
        assert_eq!(r.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn apt_deinstalled_package_is_missing() {
        let exec = RecordingExecutor::new().respond(
            "dpkg-query -W",
            true,
            "deinstall ok config-files",
        );
        let (ctx, _fs) = linux_context(exec);
        let r = PackageResource::new("git", PackageManager::Apt, &ctx);
        assert_eq!(r.current_state().unwrap(), ResourceState::Missing);
    }

    #[test]
    fn failed_query_is_missing() {
        let exec = RecordingExecutor::new().respond("rpm -q", false, "");
        let (ctx, _fs) = linux_context(exec);
        let r = PackageResource::new("zsh", PackageManager::Dnf, &ctx);
        assert_eq!(r.current_state().unwrap(), ResourceState::Missing);
    }

    #[test]
    fn winget_query_matches_id_case_insensitively() {
        assert!(is_installed(
            PackageManager::Winget,
            "Git.Git",
            "Name  Id       Version\nGit   git.git  2.45.0\n"
        ));
        assert!(!is_installed(PackageManager::Winget, "Git.Git", "No installed package found"));
    }

    #[test]
    fn install_command_batches_linux_managers() {
        let (program, args) = install_command(PackageManager::Dnf, &["git", "curl"]);
        assert_eq!(program, "sudo");
        assert_eq!(args, vec!["dnf", "install", "-y", "git", "curl"]);

        let (program, args) = install_command(PackageManager::Apt, &["git"]);
        assert_eq!(program, "sudo");
        assert_eq!(args.last().map(String::as_str), Some("git"));
        assert!(args.contains(&"DEBIAN_FRONTEND=noninteractive".to_string()));
    }

    #[test]
    fn install_runs_one_winget_call_per_id() {
        let exec = Arc::new(RecordingExecutor::new());
        let (ctx, _fs) = crate::steps::test_helpers::context_for(
            crate::platform::Family::Windows,
            Arc::clone(&exec),
        );
        install(&ctx, PackageManager::Winget, &["Git.Git", "BurntSushi.ripgrep.MSVC"]).unwrap();
        let calls = exec.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].ends_with("--id Git.Git"));
        assert!(calls[1].ends_with("--id BurntSushi.ripgrep.MSVC"));
    }

    #[test]
    fn install_batches_apt_into_one_call() {
        let exec = Arc::new(RecordingExecutor::new());
        let (ctx, _fs) = linux_context(Arc::clone(&exec));
        install(&ctx, PackageManager::Apt, &["git", "curl", "zsh"]).unwrap();
        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].ends_with("install -y git curl zsh"));
    }

    #[test]
    fn install_nothing_runs_nothing() {
        let exec = Arc::new(RecordingExecutor::new());
        let (ctx, _fs) = linux_context(Arc::clone(&exec));
        install(&ctx, PackageManager::Apt, &[]).unwrap();
        assert!(exec.calls().is_empty());
    }
}
