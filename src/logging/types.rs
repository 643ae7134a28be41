//! Core logging types: step entries, status, and the [`Log`] trait.

/// Step execution result for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    /// Step ordinal.
    pub ordinal: u32,
    /// Step label.
    pub label: String,
    /// How the step ended.
    pub status: StepStatus,
    /// Optional detail (skip reason, warning, error description).
    pub message: Option<String>,
}

/// Status of a step once the runner is done with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step made changes and completed.
    Ok,
    /// Step found everything already in place; nothing was changed.
    AlreadyPresent,
    /// User chose to keep an existing artifact.
    Declined,
    /// Step ordinal was in the skip set.
    Skipped,
    /// Step does not apply to this platform.
    NotApplicable,
    /// Step ran in dry-run mode; no changes were applied.
    DryRun,
    /// Step completed with a recoverable problem.
    Warned,
    /// Step returned an error. For an aborting step this is the last entry.
    Failed,
}

/// Abstraction over logging backends.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_step(&self, ordinal: u32, label: &str, status: StepStatus, message: Option<&str>);
}
