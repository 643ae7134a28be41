//! Numbered provisioning steps and the registry that orders them.
pub mod catalog;
mod context;
pub mod fonts;
pub mod git;
pub mod go;
pub mod packages;
pub mod prompt_theme;
pub mod rust;
pub mod shell;
pub mod shell_config;
pub mod ssh;

use std::collections::BTreeMap;

use anyhow::Result;

pub use context::{Context, Session, home_dir};

use crate::actions::ResourceChange;
use crate::error::RegistryError;

/// What a step did.
///
/// # Examples
///
/// ```
/// use devsetup_cli::steps::StepResult;
///
/// let kept = StepResult::Declined("kept existing key".into());
/// assert!(matches!(kept, StepResult::Declined(_)));
/// assert_ne!(StepResult::Ok, StepResult::AlreadyPresent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// Step made changes.
    Ok,
    /// Everything was already in place.
    AlreadyPresent,
    /// The user kept an existing artifact.
    Declined(String),
    /// A recoverable problem was handled inside the step.
    Warned(String),
    /// Step ran in dry-run mode.
    DryRun,
}

impl StepResult {
    /// Fold the changes of a step's resources into one result.
    ///
    /// Any applied change makes the step `Ok`. Otherwise the first skipped
    /// resource makes it `Warned`, a kept artifact makes it `Declined` and a
    /// dry-run preview makes it `DryRun`, in that order. A step with nothing
    /// to do is `AlreadyPresent`.
    #[must_use]
    pub fn from_changes(changes: &[ResourceChange]) -> Self {
        let any = |pred: fn(&ResourceChange) -> bool| changes.iter().any(pred);
        if any(|c| matches!(c, ResourceChange::Applied)) {
            Self::Ok
        } else if let Some(ResourceChange::Skipped { reason }) = changes
            .iter()
            .find(|c| matches!(c, ResourceChange::Skipped { .. }))
        {
            Self::Warned(reason.clone())
        } else if any(|c| matches!(c, ResourceChange::Kept)) {
            Self::Declined("kept existing configuration".to_string())
        } else if any(|c| matches!(c, ResourceChange::WouldApply)) {
            Self::DryRun
        } else {
            Self::AlreadyPresent
        }
    }
}

/// How the runner reacts when a step returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the whole run.
    Abort,
    /// Log a warning, record the failure and go on with the next step.
    Continue,
}

/// A numbered unit of provisioning work.
pub trait Step: Send + Sync {
    /// Short human-readable label shown in listings and logs.
    fn label(&self) -> &str;

    /// How the runner handles an error from [`Step::run`].
    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Abort
    }

    /// Whether this step applies to the current platform.
    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    /// Execute the step. Must detect existing state before acting.
    ///
    /// # Errors
    ///
    /// Returns an error if the step cannot complete; the runner consults
    /// [`Step::failure_policy`] to decide what happens next.
    fn run(&self, ctx: &mut Context) -> Result<StepResult>;
}

/// Steps keyed by ordinal, iterated in ascending order.
pub struct StepRegistry {
    steps: BTreeMap<u32, Box<dyn Step>>,
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.labels()).finish()
    }
}

impl StepRegistry {
    /// Build a registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on ordinal zero or a duplicate ordinal.
    pub fn new(steps: Vec<(u32, Box<dyn Step>)>) -> Result<Self, RegistryError> {
        let mut map: BTreeMap<u32, Box<dyn Step>> = BTreeMap::new();
        for (ordinal, step) in steps {
            if ordinal == 0 {
                return Err(RegistryError::ZeroOrdinal(step.label().to_string()));
            }
            if let Some(first) = map.get(&ordinal) {
                return Err(RegistryError::DuplicateOrdinal {
                    ordinal,
                    first: first.label().to_string(),
                    second: step.label().to_string(),
                });
            }
            map.insert(ordinal, step);
        }
        Ok(Self { steps: map })
    }

    /// Steps in ascending ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &dyn Step)> {
        self.steps.iter().map(|(o, s)| (*o, s.as_ref()))
    }

    /// Number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// `(ordinal, label)` pairs in order.
    #[must_use]
    pub fn labels(&self) -> Vec<(u32, &str)> {
        self.iter().map(|(o, s)| (o, s.label())).collect()
    }

    /// Numbered listing shown before asking which steps to skip.
    #[must_use]
    pub fn listing(&self) -> String {
        self.iter()
            .map(|(o, s)| format!("{o:>3}. {}", s.label()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
