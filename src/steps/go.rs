//! Step 6: the Go toolchain.
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use super::{Context, Step, StepResult};
use crate::actions::install_if_absent;
use crate::actions::tool::Installer;
use crate::actions::version::{Version, VersionRequirement};
use crate::platform::PackageManager;

/// The Go toolchain, at the configured version or newer.
#[derive(Debug)]
pub struct InstallGo;

/// Tarball URL for `version` on this platform, e.g.
/// `https://go.dev/dl/go1.22.5.linux-amd64.tar.gz`.
///
/// # Errors
///
/// Returns an error if the architecture has no published download.
pub fn download_url(ctx: &Context, version: &Version) -> Result<String> {
    let base = ctx.config.go.download_base.trim_end_matches('/');
    let arch = ctx.platform.download_arch()?;
    Ok(format!(
        "{base}/go{version}.{}-{arch}.tar.gz",
        ctx.platform.os_tag()
    ))
}

fn installer(ctx: &Context, version: &Version) -> Result<Installer> {
    let go = &ctx.config.go;
    Ok(match ctx.package_manager()? {
        PackageManager::Brew => Installer::Package {
            id: go.brew.clone().unwrap_or_else(|| "go".to_string()),
        },
        PackageManager::Winget => Installer::Package {
            id: go.winget.clone().unwrap_or_else(|| "GoLang.Go".to_string()),
        },
        PackageManager::Dnf | PackageManager::Apt => Installer::Archive {
            url: download_url(ctx, version)?,
            dest: PathBuf::from(&go.install_dir),
            replaces: Path::new(&go.install_dir).join("go"),
        },
    })
}

impl Step for InstallGo {
    fn label(&self) -> &str {
        "Install Go"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let minimum = Version::parse(&ctx.config.go.version).ok_or_else(|| {
            anyhow!(
                "invalid Go version in configuration: {:?}",
                ctx.config.go.version
            )
        })?;

        if ctx.platform.is_windows() {
            ctx.session.prepend_path(r"C:\Program Files\Go\bin");
        } else {
            ctx.session
                .prepend_path(Path::new(&ctx.config.go.install_dir).join("go").join("bin"));
        }
        let gopath_bin = ctx.home_path("go").join("bin");
        ctx.session.prepend_path(gopath_bin);

        let installer = installer(ctx, &minimum)?;
        let go = VersionRequirement::new("go", &["version"], minimum, installer, ctx);
        let change = install_if_absent(&go, ctx.log.as_ref(), ctx.dry_run)?;
        Ok(StepResult::from_changes(&[change]))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::Family;
    use crate::steps::test_helpers::{RecordingExecutor, StaticFetcher, context_for, linux_context};
    use std::sync::Arc;

    #[test]
    fn download_url_names_os_and_arch() {
        let (ctx, _fs) = linux_context(RecordingExecutor::new());
        let url = download_url(&ctx, &Version::parse("1.22.5").unwrap()).unwrap();
        assert_eq!(url, "https://go.dev/dl/go1.22.5.linux-amd64.tar.gz");
    }

    #[test]
    fn current_go_is_left_alone() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_binary("go")
                .respond("go version", true, "go version go1.23.0 linux/amd64\n"),
        );
        let (mut ctx, _fs) = linux_context(Arc::clone(&exec));
        assert_eq!(InstallGo.run(&mut ctx).unwrap(), StepResult::AlreadyPresent);
        assert_eq!(exec.calls(), vec!["go version"]);
    }

    #[test]
    fn outdated_go_is_replaced_from_tarball() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_binary("go")
                .respond("go version", true, "go version go1.19.2 linux/amd64\n"),
        );
        let (ctx, _fs) = linux_context(Arc::clone(&exec));
        let mut ctx = ctx.with_fetcher(Arc::new(StaticFetcher::text("tarball")));
        assert_eq!(InstallGo.run(&mut ctx).unwrap(), StepResult::Ok);
        assert!(exec.ran("sudo rm -rf /usr/local/go"));
        assert!(exec.ran("sudo tar -C /usr/local -xzf"));
    }

    #[test]
    fn failed_upgrade_leaves_no_download_behind() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_binary("go")
                .respond("go version", true, "go version go1.19.2 linux/amd64\n")
                .respond("sudo tar", false, ""),
        );
        let (ctx, _fs) = linux_context(Arc::clone(&exec));
        let mut ctx = ctx.with_fetcher(Arc::new(StaticFetcher::text("tarball")));
        assert!(InstallGo.run(&mut ctx).is_err());
        let calls = exec.calls();
        let archive = calls
            .iter()
            .find_map(|c| c.strip_prefix("sudo tar -C /usr/local -xzf "))
            .unwrap();
        assert_ne!(archive, "/tmp/go1.22.5.linux-amd64.tar.gz");
        assert!(!Path::new(archive).exists());
    }

    #[test]
    fn session_path_gains_go_directories() {
        let exec = Arc::new(RecordingExecutor::new().with_binary("go"));
        let (mut ctx, _fs) = linux_context(exec);
        ctx.dry_run = true;
        InstallGo.run(&mut ctx).unwrap();
        assert_eq!(
            ctx.session.path_prepends,
            vec![
                PathBuf::from("/home/test/go/bin"),
                PathBuf::from("/usr/local/go/bin")
            ]
        );
    }

    #[test]
    fn macos_uses_homebrew() {
        let exec = Arc::new(RecordingExecutor::new());
        let (mut ctx, _fs) = context_for(Family::MacOs, Arc::clone(&exec));
        assert_eq!(InstallGo.run(&mut ctx).unwrap(), StepResult::Ok);
        assert_eq!(exec.calls(), vec!["brew install go"]);
    }
}
