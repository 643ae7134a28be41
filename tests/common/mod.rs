// Shared helpers for integration tests.
//
// Provides a temporary home directory and a scripted fake host so each
// integration test can drive the full step flow without touching the real
// machine or the network.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};

use devsetup_cli::config::Config;
use devsetup_cli::exec::{Env, ExecResult, Executor};
use devsetup_cli::fetch::Fetcher;
use devsetup_cli::logging::{Log, Logger};
use devsetup_cli::platform::{Arch, Family, Platform};
use devsetup_cli::prompt::ScriptedPrompt;
use devsetup_cli::steps::Context;

/// Binaries present on a machine that has already been provisioned.
pub const PROVISIONED: &[&str] = &[
    "sudo",
    "dpkg-query",
    "git",
    "curl",
    "ssh-keygen",
    "zsh",
    "go",
    "cargo",
    "rustc",
    "node",
    "python3",
    "rg",
    "jq",
    "fzf",
    "gh",
    "oh-my-posh",
    "fc-list",
];

/// Executor that answers from a script instead of spawning processes.
///
/// Commands are matched by prefix of the joined command line. Unknown
/// commands succeed with empty output. `ssh-keygen -f <path>` writes a fake
/// key pair so the step can show the public key.
#[derive(Debug, Default)]
pub struct FakeHost {
    binaries: Mutex<HashSet<String>>,
    responses: Vec<(String, bool, String)>,
    calls: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host where every tool the flow installs is already present.
    pub fn provisioned() -> Self {
        let mut host = Self::new();
        for binary in PROVISIONED {
            host = host.with_binary(binary);
        }
        host.respond("dpkg-query", true, "install ok installed")
            .respond("go version", true, "go version go1.22.5 linux/amd64\n")
            .respond("fc-list", true, "MesloLGM Nerd Font\n")
            .respond("git config --global --get user.name", true, "Ada Lovelace\n")
            .respond(
                "git config --global --get user.email",
                true,
                "ada@example.com\n",
            )
    }

    pub fn with_binary(self, binary: &str) -> Self {
        self.binaries
            .lock()
            .expect("binaries lock")
            .insert(binary.to_string());
        self
    }

    pub fn without_binary(self, binary: &str) -> Self {
        self.binaries.lock().expect("binaries lock").remove(binary);
        self
    }

    /// Answer every command starting with `prefix`. Earlier answers win.
    pub fn respond(mut self, prefix: &str, success: bool, stdout: &str) -> Self {
        self.responses
            .push((prefix.to_string(), success, stdout.to_string()));
        self
    }

    /// Every command line run so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, program: &str, args: &[&str]) -> String {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line.clone());
        line
    }

    fn answer(&self, line: &str) -> ExecResult {
        self.responses
            .iter()
            .find(|(prefix, _, _)| line.starts_with(prefix.as_str()))
            .map_or_else(
                || ExecResult {
                    success: true,
                    code: Some(0),
                    ..ExecResult::default()
                },
                |(_, success, stdout)| ExecResult {
                    stdout: stdout.clone(),
                    stderr: String::new(),
                    success: *success,
                    code: Some(i32::from(!*success)),
                },
            )
    }

    fn fake_keygen(args: &[&str]) {
        let Some(path) = args
            .iter()
            .position(|a| *a == "-f")
            .and_then(|i| args.get(i + 1))
        else {
            return;
        };
        let label = args
            .iter()
            .position(|a| *a == "-C")
            .and_then(|i| args.get(i + 1))
            .copied()
            .unwrap_or_default();
        std::fs::write(path, "PRIVATE KEY\n").expect("write private key");
        std::fs::write(
            format!("{path}.pub"),
            format!("ssh-ed25519 AAAAC3Nza {label}\n"),
        )
        .expect("write public key");
    }
}

impl Executor for FakeHost {
    fn run_with_env(&self, program: &str, args: &[&str], env: &Env) -> Result<ExecResult> {
        let result = self.run_unchecked_with_env(program, args, env)?;
        if !result.success {
            bail!("{program} failed");
        }
        Ok(result)
    }

    fn run_unchecked_with_env(
        &self,
        program: &str,
        args: &[&str],
        _env: &Env,
    ) -> Result<ExecResult> {
        if !self.binaries.lock().expect("binaries lock").contains(program) {
            bail!("{program}: not found");
        }
        let line = self.record(program, args);
        if program == "ssh-keygen" {
            Self::fake_keygen(args);
        }
        Ok(self.answer(&line))
    }

    fn run_interactive_with_env(&self, program: &str, args: &[&str], _env: &Env) -> Result<()> {
        let line = self.record(program, args);
        if self.answer(&line).success {
            Ok(())
        } else {
            bail!("{program} failed")
        }
    }

    fn which_in(&self, program: &str, _path: Option<&OsStr>) -> bool {
        self.binaries.lock().expect("binaries lock").contains(program)
    }
}

/// Fetcher for a host without network access.
#[derive(Debug)]
pub struct Offline;

impl Fetcher for Offline {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        bail!("offline: {url}")
    }
}

/// An isolated home directory backed by a [`tempfile::TempDir`].
pub struct TestHome {
    pub root: tempfile::TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Path of `relative` inside the home directory.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Create a directory (and parents) inside the home directory.
    pub fn with_dir(self, relative: &str) -> Self {
        std::fs::create_dir_all(self.join(relative)).expect("create dir");
        self
    }

    /// Write `content` to `relative`, creating parents.
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write file");
        self
    }

    pub fn read(&self, relative: &str) -> Option<String> {
        std::fs::read_to_string(self.join(relative)).ok()
    }

    /// Saved skip list location for this home.
    pub fn skip_file(&self) -> PathBuf {
        self.join(".config/devsetup/skip_steps")
    }

    /// Context over this home, `host` and the embedded configuration.
    pub fn context(
        &self,
        family: Family,
        host: &Arc<FakeHost>,
        prompt: &Arc<ScriptedPrompt>,
        dry_run: bool,
    ) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::new("test"));
        let config = Config::embedded().expect("embedded config");
        let ctx = Context::new(
            Arc::new(config),
            Arc::new(Platform::new(family, Arch::Amd64)),
            Arc::clone(&log) as Arc<dyn Log>,
            Arc::clone(host) as Arc<dyn Executor>,
            dry_run,
        )
        .expect("context")
        .with_home(self.path())
        .with_prompt(Arc::clone(prompt) as Arc<dyn devsetup_cli::prompt::Prompt>)
        .with_fetcher(Arc::new(Offline));
        (ctx, log)
    }
}
