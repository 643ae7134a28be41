//! Post-run verification battery and the "next steps" guide.
//!
//! Probes never fail the run: every outcome, including a spawn error, is
//! turned into a [`CheckResult`].
use std::path::PathBuf;

use crate::logging::Log;
use crate::steps::Context;

/// What a probe inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeKind {
    /// Run `program args...` and report its first output line.
    Command {
        /// Binary looked up on the session `PATH`.
        program: String,
        /// Arguments, usually a version flag.
        args: Vec<String>,
    },
    /// Check that an artifact exists.
    File(PathBuf),
}

/// A named check run after the steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// Name shown in the report.
    pub name: String,
    /// What is inspected.
    pub kind: ProbeKind,
}

impl Probe {
    /// Probe that runs `program args...`.
    #[must_use]
    pub fn command(name: &str, program: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: ProbeKind::Command {
                program: program.to_string(),
                args: args.iter().map(|a| (*a).to_string()).collect(),
            },
        }
    }

    /// Probe that checks `path` exists.
    #[must_use]
    pub fn file(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            kind: ProbeKind::File(path.into()),
        }
    }
}

/// Outcome of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Name of the probe.
    pub name: String,
    /// Whether the check succeeded.
    pub passed: bool,
    /// First output line, or why the check failed.
    pub detail: String,
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Run one probe with the session environment.
#[must_use]
pub fn probe(ctx: &Context, probe: &Probe) -> CheckResult {
    let (passed, detail) = match &probe.kind {
        ProbeKind::File(path) => {
            if ctx.fs_ops.exists(path) {
                (true, path.display().to_string())
            } else {
                (false, format!("{} missing", path.display()))
            }
        }
        ProbeKind::Command { program, args } => {
            if ctx.which(program) {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                match ctx.run_unchecked(program, &args) {
                    Ok(result) if result.success => (true, first_line(&result.stdout)),
                    Ok(result) => {
                        let line = first_line(&result.stderr);
                        let detail = if line.is_empty() {
                            format!("exited with {}", result.code.unwrap_or(-1))
                        } else {
                            line
                        };
                        (false, detail)
                    }
                    Err(e) => (false, format!("{e:#}")),
                }
            } else {
                (false, "not found".to_string())
            }
        }
    };
    CheckResult {
        name: probe.name.clone(),
        passed,
        detail,
    }
}

/// Results of the verification battery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One result per probe, in probe order.
    pub checks: Vec<CheckResult>,
}

impl RunReport {
    /// Run every probe in order.
    #[must_use]
    pub fn collect(ctx: &Context, probes: &[Probe]) -> Self {
        Self {
            checks: probes.iter().map(|p| probe(ctx, p)).collect(),
        }
    }

    /// Number of checks that passed.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Number of checks that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.checks.len() - self.passed()
    }

    /// Print one line per check and a tally.
    pub fn print(&self, log: &dyn Log) {
        if self.checks.is_empty() {
            return;
        }
        log.stage("Verification");
        let width = self.checks.iter().map(|c| c.name.len()).max().unwrap_or(0);
        for check in &self.checks {
            let line = format!("{:<width$}  {}", check.name, check.detail);
            if check.passed {
                log.info(&format!("\u{2713} {line}"));
            } else {
                log.warn(&format!("\u{2717} {line}"));
            }
        }
        log.info(&format!(
            "{} of {} checks passed",
            self.passed(),
            self.checks.len()
        ));
    }
}

/// Manual follow-ups the run cannot do itself.
#[must_use]
pub fn next_steps(ctx: &Context) -> Vec<String> {
    let mut steps = Vec::new();
    let public_key = ctx.home_path(".ssh").join("id_ed25519.pub");
    if ctx.fs_ops.exists(&public_key) {
        steps.push(format!(
            "Register {} with your Git host (GitHub: Settings > SSH and GPG keys)",
            public_key.display()
        ));
    }
    if ctx.platform.is_windows() {
        steps.push("Restart Windows Terminal so the new font and profile load".to_string());
    } else {
        steps.push("Open a new terminal, or run `exec zsh -l`, to load the new PATH".to_string());
        steps.push("Make zsh your login shell: chsh -s \"$(command -v zsh)\"".to_string());
    }
    steps.push(format!(
        "Select the \"{}\" font in your terminal if it does not pick it up",
        ctx.config.terminal.font_face
    ));
    steps.push("Run `devsetup verify` at any time to re-check the toolchain".to_string());
    steps
}

/// Print [`next_steps`] as a numbered list.
pub fn print_next_steps(ctx: &Context) {
    ctx.log.stage("Next steps");
    for (i, step) in next_steps(ctx).iter().enumerate() {
        ctx.log.info(&format!("{}. {step}", i + 1));
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::FileSystemOps as _;
    use crate::platform::Family;
    use crate::steps::test_helpers::{RecordingExecutor, context_for, linux_context};
    use std::path::Path;

    #[test]
    fn missing_binary_is_not_found() {
        let (ctx, _fs) = linux_context(RecordingExecutor::new());
        let r = probe(&ctx, &Probe::command("go", "go", &["version"]));
        assert!(!r.passed);
        assert_eq!(r.detail, "not found");
    }

    #[test]
    fn success_reports_first_stdout_line() {
        let exec = RecordingExecutor::new()
            .with_binary("go")
            .respond("go version", true, "go version go1.22.5 linux/amd64\nextra\n");
        let (ctx, _fs) = linux_context(exec);
        let r = probe(&ctx, &Probe::command("go", "go", &["version"]));
        assert!(r.passed);
        assert_eq!(r.detail, "go version go1.22.5 linux/amd64");
    }

    #[test]
    fn failure_reports_first_stderr_line() {
        let exec = RecordingExecutor::new()
            .with_binary("rustc")
            .respond("rustc", false, "");
        let (ctx, _fs) = linux_context(exec);
        let r = probe(&ctx, &Probe::command("rustc", "rustc", &["--version"]));
        assert!(!r.passed);
        assert_eq!(r.detail, "mock failure");
    }

    #[test]
    fn file_probe_checks_presence() {
        let (ctx, fs) = linux_context(RecordingExecutor::new());
        let p = Probe::file("ssh key", "/home/test/.ssh/id_ed25519.pub");
        assert!(!probe(&ctx, &p).passed);
        fs.write_text(Path::new("/home/test/.ssh/id_ed25519.pub"), "ssh-ed25519 AAAA")
            .unwrap();
        assert!(probe(&ctx, &p).passed);
    }

    #[test]
    fn report_counts() {
        let exec = RecordingExecutor::new().with_binary("git");
        let (ctx, _fs) = linux_context(exec);
        let report = RunReport::collect(
            &ctx,
            &[
                Probe::command("git", "git", &["--version"]),
                Probe::command("zsh", "zsh", &["--version"]),
            ],
        );
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn next_steps_mention_key_only_when_present() {
        let (ctx, fs) = linux_context(RecordingExecutor::new());
        assert!(!next_steps(&ctx).iter().any(|s| s.contains("id_ed25519")));
        fs.write_text(Path::new("/home/test/.ssh/id_ed25519.pub"), "k").unwrap();
        assert!(next_steps(&ctx)[0].contains("id_ed25519.pub"));
    }

    #[test]
    fn windows_next_steps_skip_chsh() {
        let (ctx, _fs) = context_for(Family::Windows, RecordingExecutor::new());
        assert!(!next_steps(&ctx).iter().any(|s| s.contains("chsh")));
    }
}
