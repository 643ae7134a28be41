//! Idempotent action primitives (check + apply pattern).
pub mod git_identity;
pub mod json_settings;
pub mod managed_file;
pub mod package;
pub mod profile_line;
pub mod ssh_key;
pub mod tool;
pub mod version;

use anyhow::Result;

use crate::logging::Log;
use crate::prompt::{Prompt, confirm};

/// State of a resource on the host.
///
/// # Examples
///
/// ```
/// use devsetup_cli::actions::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let old = ResourceState::Incorrect { current: "go 1.19.2".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert!(matches!(old, ResourceState::Incorrect { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g. the application owning a settings
    /// file is not installed).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of bringing a resource to its desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// An existing resource differs and the user chose to keep it.
    Kept,
    /// Dry run: the resource would have been changed.
    WouldApply,
    /// Resource could not be applied; the step decides how serious that is.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Something on the host that can be checked and brought to a desired state.
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined (spawn failures,
    /// unreadable files).
    fn current_state(&self) -> Result<ResourceState>;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if installers, downloads or writes fail.
    fn apply(&self) -> Result<ResourceChange>;
}

/// Install `resource` unless it is already in place.
///
/// An outdated resource (`Incorrect`) is reinstalled without asking.
///
/// # Errors
///
/// Returns an error if the state check or the installation fails.
pub fn install_if_absent(
    resource: &dyn Resource,
    log: &dyn Log,
    dry_run: bool,
) -> Result<ResourceChange> {
    match resource.current_state()? {
        ResourceState::Correct => {
            log.debug(&format!("{}: already present", resource.description()));
            Ok(ResourceChange::AlreadyCorrect)
        }
        ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
        ResourceState::Missing | ResourceState::Incorrect { .. } if dry_run => {
            log.dry_run(&format!("would install {}", resource.description()));
            Ok(ResourceChange::WouldApply)
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } => {
            log.info(&format!("installing {}", resource.description()));
            resource.apply()
        }
    }
}

/// Create `resource` when absent; when a different version exists, ask
/// `question` first. An empty answer keeps the existing artifact.
///
/// # Errors
///
/// Returns an error if the state check, the prompt or the write fails.
pub fn configure_with_confirmation(
    resource: &dyn Resource,
    question: &str,
    prompt: &dyn Prompt,
    log: &dyn Log,
    dry_run: bool,
) -> Result<ResourceChange> {
    match resource.current_state()? {
        ResourceState::Correct => {
            log.debug(&format!("{}: up to date", resource.description()));
            Ok(ResourceChange::AlreadyCorrect)
        }
        ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
        ResourceState::Missing if dry_run => {
            log.dry_run(&format!("would create {}", resource.description()));
            Ok(ResourceChange::WouldApply)
        }
        ResourceState::Incorrect { .. } if dry_run => {
            log.dry_run(&format!("would ask before replacing {}", resource.description()));
            Ok(ResourceChange::WouldApply)
        }
        ResourceState::Missing => resource.apply(),
        ResourceState::Incorrect { current } => {
            log.info(&format!("{} exists ({current})", resource.description()));
            if confirm(prompt, question, false)? {
                resource.apply()
            } else {
                log.info(&format!("keeping existing {}", resource.description()));
                Ok(ResourceChange::Kept)
            }
        }
    }
}
