//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, StepEntry, StepStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Console and file output both go through [`tracing`]; see
/// [`init_subscriber`](super::subscriber::init_subscriber). Every message is
/// also written to `$XDG_CACHE_HOME/devsetup/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    steps: Mutex<Vec<StepEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger. Only stores the log file path for the summary;
    /// the file itself is created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            steps: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// All recorded step entries, in the order they were recorded.
    #[must_use]
    pub fn entries(&self) -> Vec<StepEntry> {
        self.steps.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error (stderr, red).
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning (stderr, yellow).
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a step banner.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational line.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log an action that `--dry-run` suppressed.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a step result for the summary.
    pub fn record_step(
        &self,
        ordinal: u32,
        label: &str,
        status: StepStatus,
        message: Option<&str>,
    ) {
        if let Ok(mut guard) = self.steps.lock() {
            guard.push(StepEntry {
                ordinal,
                label: label.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed steps.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(StepStatus::Failed)
    }

    fn count(&self, status: StepStatus) -> usize {
        self.steps
            .lock()
            .map_or(0, |guard| guard.iter().filter(|s| s.status == status).count())
    }

    /// Print the summary of all recorded steps.
    pub fn print_summary(&self) {
        let steps = self.entries();
        if steps.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut changed = 0u32;
        let mut present = 0u32;
        let mut skipped = 0u32;
        let mut warned = 0u32;
        let mut failed = 0u32;

        for step in &steps {
            let (icon, color) = match step.status {
                StepStatus::Ok => {
                    changed += 1;
                    ("✓", "\x1b[32m")
                }
                StepStatus::AlreadyPresent | StepStatus::Declined | StepStatus::DryRun => {
                    present += 1;
                    ("=", "\x1b[37m")
                }
                StepStatus::Skipped | StepStatus::NotApplicable => {
                    skipped += 1;
                    ("·", "\x1b[2m")
                }
                StepStatus::Warned => {
                    warned += 1;
                    ("!", "\x1b[33m")
                }
                StepStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = step
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!(
                "{color}{icon} {:>2}. {}{suffix}\x1b[0m",
                step.ordinal, step.label
            ));
        }

        let total = changed + present + skipped + warned + failed;
        self.info(&format!(
            "{total} steps: \x1b[32m{changed} changed\x1b[0m, \x1b[37m{present} unchanged\x1b[0m, \x1b[2m{skipped} skipped\x1b[0m, \x1b[33m{warned} warned\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_step(&self, ordinal: u32, label: &str, status: StepStatus, message: Option<&str>) {
        self.record_step(ordinal, label, status, message);
    }
}
