//! Running external commands, with per-call environment and `PATH`.
use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code, absent when killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Extra environment variables applied to a single command.
pub type Env = [(String, String)];

/// Abstraction over process execution.
///
/// Every method takes the extra environment for the command so that PATH
/// changes made earlier in the run reach later commands without touching
/// the process environment.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command with captured output, failing on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    fn run_with_env(&self, program: &str, args: &[&str], env: &Env) -> Result<ExecResult>;

    /// Run a command with captured output, returning the result whatever
    /// the exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the command cannot be spawned.
    fn run_unchecked_with_env(&self, program: &str, args: &[&str], env: &Env)
    -> Result<ExecResult>;

    /// Run a command attached to the terminal (installers that prompt for a
    /// password or print progress), failing on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    fn run_interactive_with_env(&self, program: &str, args: &[&str], env: &Env) -> Result<()>;

    /// Check whether `program` is found on `path` (or the process PATH when
    /// `path` is `None`).
    fn which_in(&self, program: &str, path: Option<&OsStr>) -> bool;

    /// Run a command with the inherited environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.run_with_env(program, args, &[])
    }

    /// Run a command with the inherited environment, allowing failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the command cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.run_unchecked_with_env(program, args, &[])
    }

    /// Check if a program is available on the process PATH.
    fn which(&self, program: &str) -> bool {
        self.which_in(program, None)
    }
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

fn command(program: &str, args: &[&str], env: &Env) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd
}

impl Executor for SystemExecutor {
    fn run_with_env(&self, program: &str, args: &[&str], env: &Env) -> Result<ExecResult> {
        let result = self.run_unchecked_with_env(program, args, env)?;
        if !result.success {
            bail!(
                "{program} failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    fn run_unchecked_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &Env,
    ) -> Result<ExecResult> {
        let output = command(program, args, env)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_interactive_with_env(&self, program: &str, args: &[&str], env: &Env) -> Result<()> {
        let status = command(program, args, env)
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        if !status.success() {
            bail!("{program} failed (exit {})", status.code().unwrap_or(-1));
        }
        Ok(())
    }

    fn which_in(&self, program: &str, path: Option<&OsStr>) -> bool {
        match path {
            Some(paths) => std::env::current_dir()
                .is_ok_and(|cwd| which::which_in(program, Some(paths), cwd).is_ok()),
            None => which::which(program).is_ok(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn echo(exec: &SystemExecutor, msg: &str) -> Result<ExecResult> {
        #[cfg(windows)]
        {
            exec.run("cmd", &["/C", "echo", msg])
        }
        #[cfg(not(windows))]
        {
            exec.run("echo", &[msg])
        }
    }

    #[test]
    fn run_echo() {
        let result = echo(&SystemExecutor, "hello").unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn run_failure_is_error() {
        #[cfg(windows)]
        let result = SystemExecutor.run("cmd", &["/C", "exit", "1"]);
        #[cfg(not(windows))]
        let result = SystemExecutor.run("false", &[]);
        assert!(result.is_err(), "non-zero exit should produce an error");
    }

    #[test]
    fn run_unchecked_failure_sets_success_false() {
        #[cfg(windows)]
        let result = SystemExecutor.run_unchecked("cmd", &["/C", "exit", "1"]).unwrap();
        #[cfg(not(windows))]
        let result = SystemExecutor.run_unchecked("false", &[]).unwrap();
        assert!(!result.success);
    }

    #[test]
    fn run_unchecked_missing_program_is_error() {
        let result = SystemExecutor.run_unchecked("this-program-does-not-exist-12345", &[]);
        assert!(result.is_err());
    }

    #[cfg(not(windows))]
    #[test]
    fn run_with_env_passes_variables() {
        let env = vec![("DEVSETUP_TEST_VAR".to_string(), "marker".to_string())];
        let result = SystemExecutor
            .run_with_env("sh", &["-c", "echo $DEVSETUP_TEST_VAR"], &env)
            .unwrap();
        assert_eq!(result.stdout.trim(), "marker");
    }

    #[test]
    fn which_missing_program() {
        assert!(!SystemExecutor.which("this-program-does-not-exist-12345"));
    }

    #[test]
    fn which_in_searches_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let name = if cfg!(windows) { "fake-tool.exe" } else { "fake-tool" };
        let tool = dir.path().join(name);
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        assert!(SystemExecutor.which_in("fake-tool", Some(dir.path().as_os_str())));
        assert!(!SystemExecutor.which("fake-tool"));
    }
}
