//! Command-line tools detected on the session `PATH` and their installers.
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::package;
use super::{Resource, ResourceChange, ResourceState};
use crate::steps::Context;

/// How a missing tool gets installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installer {
    /// Install a package with the platform package manager.
    Package {
        /// Package name or winget ID.
        id: String,
    },
    /// Download a shell script and run it as `<shell> -c <script> <shell> <args...>`.
    Script {
        /// Script location.
        url: String,
        /// Interpreter, e.g. `sh` or `bash`.
        shell: String,
        /// Arguments passed to the script.
        args: Vec<String>,
        /// Extra environment for the interpreter.
        env: Vec<(String, String)>,
    },
    /// Download a gzipped tarball and unpack it into `dest`, removing
    /// `replaces` first so that an older version does not linger.
    Archive {
        /// Tarball location.
        url: String,
        /// Directory the tarball is unpacked into.
        dest: PathBuf,
        /// Previous installation removed before unpacking.
        replaces: PathBuf,
    },
}

impl Installer {
    /// Shorthand for a script installer with no extra environment.
    #[must_use]
    pub fn script(url: &str, shell: &str, args: &[&str]) -> Self {
        Self::Script {
            url: url.to_string(),
            shell: shell.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            env: Vec::new(),
        }
    }

    /// Add an environment variable to a script installer.
    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        if let Self::Script { env, .. } = &mut self {
            env.push((key.to_string(), value.to_string()));
        }
        self
    }
}

/// Run `installer` for real.
///
/// # Errors
///
/// Returns an error if the download, the package manager or the installer
/// script fails. A downloaded archive is deleted whether or not unpacking
/// succeeds.
pub fn run_installer(ctx: &Context, installer: &Installer) -> Result<()> {
    match installer {
        Installer::Package { id } => {
            let manager = ctx.package_manager()?;
            package::install(ctx, manager, &[id.as_str()])
        }
        Installer::Script {
            url,
            shell,
            args,
            env,
        } => {
            ctx.log.debug(&format!("fetching installer {url}"));
            let script = ctx.fetcher.fetch_text(url)?;
            let mut argv: Vec<&str> = vec!["-c", script.as_str(), shell.as_str()];
            argv.extend(args.iter().map(String::as_str));
            let env: Vec<(&str, &str)> =
                env.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            ctx.run_interactive(shell, &argv, &env)
                .with_context(|| format!("installer from {url} failed"))
        }
        Installer::Archive {
            url,
            dest,
            replaces,
        } => {
            ctx.log.debug(&format!("downloading {url}"));
            let bytes = ctx.fetcher.fetch(url)?;
            // Random name, owner-only mode; removed when `archive` drops.
            let mut archive = tempfile::Builder::new()
                .prefix("devsetup-")
                .suffix(".tar.gz")
                .tempfile()
                .context("creating download file")?;
            archive
                .write_all(&bytes)
                .with_context(|| format!("writing {}", archive.path().display()))?;
            let archive_str = archive.path().to_string_lossy().into_owned();
            let replaces_str = replaces.to_string_lossy().into_owned();
            let dest_str = dest.to_string_lossy().into_owned();
            ctx.run_interactive("sudo", &["rm", "-rf", replaces_str.as_str()], &[])?;
            ctx.run_interactive(
                "sudo",
                &["tar", "-C", dest_str.as_str(), "-xzf", archive_str.as_str()],
                &[],
            )?;
            archive.close().with_context(|| format!("removing {archive_str}"))?;
            Ok(())
        }
    }
}

/// A tool that counts as present when its binary is on the session `PATH`
/// or, for tools that are not binaries, when `marker` exists.
#[derive(Debug)]
pub struct ToolResource<'a> {
    /// Binary looked up on the session `PATH`.
    pub binary: String,
    /// Path whose existence marks the tool as installed.
    pub marker: Option<PathBuf>,
    /// How to install the tool.
    pub installer: Installer,
    ctx: &'a Context,
}

impl<'a> ToolResource<'a> {
    /// Tool found as `binary`, installed by `installer`.
    #[must_use]
    pub fn new(binary: &str, installer: Installer, ctx: &'a Context) -> Self {
        Self {
            binary: binary.to_string(),
            marker: None,
            installer,
            ctx,
        }
    }

    /// Treat the tool as present when `path` exists.
    #[must_use]
    pub fn with_marker(mut self, path: impl Into<PathBuf>) -> Self {
        self.marker = Some(path.into());
        self
    }
}

impl Resource for ToolResource<'_> {
    fn description(&self) -> String {
        self.binary.clone()
    }

    fn current_state(&self) -> Result<ResourceState> {
        let present = match &self.marker {
            Some(marker) => self.ctx.fs_ops.exists(marker),
            None => self.ctx.which(&self.binary),
        };
        Ok(if present {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        run_installer(self.ctx, &self.installer)?;
        Ok(ResourceChange::Applied)
    }
}
