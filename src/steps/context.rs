//! Shared state handed to every step.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::actions::git_identity::GitIdentity;
use crate::config::Config;
use crate::exec::{ExecResult, Executor};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::platform::{PackageManager, Platform};
use crate::prompt::{Prompt, TerminalPrompt};

/// Values captured while the run progresses.
///
/// Later steps read what earlier steps recorded here instead of re-reading
/// the process environment, which the run never modifies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Directories prepended to `PATH` for every later command, newest first.
    pub path_prepends: Vec<PathBuf>,
    /// Git author name set or found by the identity step.
    pub git_name: Option<String>,
    /// Git author email set or found by the identity step.
    pub git_email: Option<String>,
}

impl Session {
    /// Prepend `dir` to the session `PATH`. Adding the same directory twice
    /// moves it to the front.
    pub fn prepend_path(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        self.path_prepends.retain(|d| d != &dir);
        self.path_prepends.insert(0, dir);
    }

    /// `PATH` as later commands should see it: session entries followed by
    /// the inherited `PATH`.
    #[must_use]
    pub fn search_path(&self) -> Option<OsString> {
        if self.path_prepends.is_empty() {
            return None;
        }
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let dirs = self
            .path_prepends
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        std::env::join_paths(dirs).ok()
    }

    /// Remember the git identity for later steps (the SSH key label).
    pub fn capture_identity(&mut self, identity: &GitIdentity) {
        self.git_name.clone_from(&identity.name);
        self.git_email.clone_from(&identity.email);
    }

    /// Extra environment for a spawned command.
    #[must_use]
    pub fn env(&self) -> Vec<(String, String)> {
        self.search_path()
            .map(|path| vec![("PATH".to_string(), path.to_string_lossy().into_owned())])
            .unwrap_or_default()
    }
}

/// Everything a step needs to inspect and change the host.
pub struct Context {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Detected host platform.
    pub platform: Arc<Platform>,
    /// Logger shared with the runner.
    pub log: Arc<dyn Log>,
    /// Process execution backend.
    pub executor: Arc<dyn Executor>,
    /// Source of answers for every interactive question.
    pub prompt: Arc<dyn Prompt>,
    /// Filesystem operation abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
    /// Download backend.
    pub fetcher: Arc<dyn Fetcher>,
    /// User's home directory path.
    pub home: PathBuf,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// State recorded by earlier steps.
    pub session: Session,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("prompt", &self.prompt)
            .field("fs_ops", &self.fs_ops)
            .field("fetcher", &self.fetcher)
            .field("home", &self.home)
            .field("dry_run", &self.dry_run)
            .field("session", &self.session)
            .finish()
    }
}

impl Context {
    /// Creates a context backed by the real terminal, filesystem and network.
    ///
    /// # Errors
    ///
    /// Returns an error if the HOME (or USERPROFILE on Windows) environment
    /// variable is not set.
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        dry_run: bool,
    ) -> Result<Self> {
        Ok(Self {
            config,
            platform,
            log,
            executor,
            prompt: Arc::new(TerminalPrompt),
            fs_ops: Arc::new(SystemFileSystemOps),
            fetcher: Arc::new(HttpFetcher::new()),
            home: home_dir()?,
            dry_run,
            session: Session::default(),
        })
    }

    /// Replace the answer source.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<dyn Prompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Replace the download backend.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Work in `home` instead of the detected home directory.
    #[must_use]
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    /// Package manager of a supported platform.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`](crate::error::PlatformError)
    /// on an unsupported host.
    pub fn package_manager(&self) -> Result<PackageManager> {
        Ok(self.platform.ensure_supported()?)
    }

    /// Path under the home directory.
    #[must_use]
    pub fn home_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.home.join(relative)
    }

    /// Run a command with the session environment, failing on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    pub fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.executor.run_with_env(program, args, &self.session.env())
    }

    /// Run a command with the session environment, allowing failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the command cannot be spawned.
    pub fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.executor
            .run_unchecked_with_env(program, args, &self.session.env())
    }

    /// Run an installer attached to the terminal with the session
    /// environment plus `extra`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    pub fn run_interactive(
        &self,
        program: &str,
        args: &[&str],
        extra: &[(&str, &str)],
    ) -> Result<()> {
        let mut env = self.session.env();
        env.extend(extra.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));
        self.executor.run_interactive_with_env(program, args, &env)
    }

    /// Whether `program` is on the session `PATH`.
    #[must_use]
    pub fn which(&self, program: &str) -> bool {
        let path = self.session.search_path();
        self.executor.which_in(program, path.as_deref())
    }
}

/// Home directory of the invoking user.
///
/// # Errors
///
/// Returns an error if neither `HOME` nor (on Windows) `USERPROFILE` is set.
pub fn home_dir() -> Result<PathBuf> {
    let home = if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE")
            .or_else(|_| std::env::var("HOME"))
            .map_err(|_| {
                anyhow::anyhow!("neither USERPROFILE nor HOME environment variable is set")
            })?
    } else {
        std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?
    };
    Ok(PathBuf::from(home))
}
