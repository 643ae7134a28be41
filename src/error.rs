//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] with the `?` operator.
//!
//! ```text
//! ProvisionError
//! ├── Platform(PlatformError) - unsupported host or architecture
//! ├── Registry(RegistryError) - malformed step registry
//! ├── Run(RunError)           - fatal step failure
//! ├── Action(ActionError)     - missing prerequisites, failed installers
//! └── Config(ConfigError)     - TOML loading
//! ```
use thiserror::Error;

/// Top-level error type for the provisioning engine.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Host platform check failed.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Step registry could not be built.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An aborting step failed.
    #[error(transparent)]
    Run(#[from] RunError),

    /// An action backend failed outside a step.
    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by the platform probe.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The host is not one of the supported families.
    #[error("unsupported platform: {platform}")]
    Unsupported {
        /// Description of the detected host.
        platform: String,
        /// Alternative entry points to suggest to the user.
        alternatives: Vec<String>,
    },

    /// No toolchain download exists for this CPU architecture.
    #[error("unsupported architecture: {0}")]
    UnsupportedArch(String),
}

/// Errors raised while building the step registry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Ordinal 0 was given to the named step.
    #[error("step ordinal must be positive (step '{0}')")]
    ZeroOrdinal(String),

    /// Two steps share an ordinal.
    #[error("duplicate step ordinal {ordinal}: '{first}' and '{second}'")]
    DuplicateOrdinal {
        /// The contested ordinal.
        ordinal: u32,
        /// Label of the step registered first.
        first: String,
        /// Label of the step that collided with it.
        second: String,
    },
}

/// A step whose failure policy is `Abort` failed; the run stops here.
#[derive(Error, Debug)]
pub enum RunError {
    /// The step that stopped the run, and why.
    #[error("step {ordinal} ({label}) failed: {reason}")]
    Fatal {
        /// Ordinal of the failed step.
        ordinal: u32,
        /// Its label.
        label: String,
        /// Rendered error chain.
        reason: String,
    },
}

/// Errors raised by action backends.
#[derive(Error, Debug)]
pub enum ActionError {
    /// A tool the step cannot work without is absent.
    #[error("required tool '{tool}' not found: {hint}")]
    MissingPrerequisite {
        /// Binary that was looked for.
        tool: String,
        /// How to get it.
        hint: String,
    },

    /// An installer ran but the target is still absent.
    #[error("{target} still not found after installation")]
    InstallIncomplete {
        /// What was being installed.
        target: String,
    },

    /// A download failed.
    #[error("failed to download {url}: {reason}")]
    Download {
        /// Requested location.
        url: String,
        /// Transport or decoding error.
        reason: String,
    },

    /// A structured settings document did not have the expected shape.
    #[error("cannot set '{key_path}': {reason}")]
    SettingsShape {
        /// Dotted key being set.
        key_path: String,
        /// What was found instead of an object.
        reason: String,
    },

    /// No answer was available for an interactive prompt.
    #[error("no answer available for prompt: {0}")]
    NoAnswer(String),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Configuration file.
        path: String,
        /// Underlying read error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("invalid TOML in {path}: {source}")]
    Parse {
        /// Configuration file, or `<embedded>`.
        path: String,
        /// Parser error with location.
        source: toml::de::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn platform_unsupported_display() {
        let e = PlatformError::Unsupported {
            platform: "Arch Linux".to_string(),
            alternatives: vec![],
        };
        assert_eq!(e.to_string(), "unsupported platform: Arch Linux");
    }

    #[test]
    fn registry_duplicate_display() {
        let e = RegistryError::DuplicateOrdinal {
            ordinal: 3,
            first: "Configure git".to_string(),
            second: "Install Go".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "duplicate step ordinal 3: 'Configure git' and 'Install Go'"
        );
    }

    #[test]
    fn run_fatal_display() {
        let e = RunError::Fatal {
            ordinal: 1,
            label: "Prepare package manager".to_string(),
            reason: "winget not found".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "step 1 (Prepare package manager) failed: winget not found"
        );
    }

    #[test]
    fn missing_prerequisite_display() {
        let e = ActionError::MissingPrerequisite {
            tool: "winget".to_string(),
            hint: "install App Installer from the Microsoft Store".to_string(),
        };
        assert!(e.to_string().starts_with("required tool 'winget' not found"));
    }

    #[test]
    fn config_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: "/tmp/devsetup.toml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/tmp/devsetup.toml"));
    }

    #[test]
    fn provision_error_from_platform_error() {
        let e: ProvisionError = PlatformError::UnsupportedArch("riscv64".to_string()).into();
        assert!(e.to_string().contains("Platform error"));
    }

    #[test]
    fn run_error_is_transparent() {
        let e: ProvisionError = RunError::Fatal {
            ordinal: 2,
            label: "x".to_string(),
            reason: "y".to_string(),
        }
        .into();
        assert_eq!(e.to_string(), "step 2 (x) failed: y");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ProvisionError>();
        assert_send_sync::<PlatformError>();
        assert_send_sync::<RegistryError>();
        assert_send_sync::<RunError>();
        assert_send_sync::<ActionError>();
        assert_send_sync::<ConfigError>();
    }

    #[test]
    fn action_error_converts_to_anyhow() {
        let e = ActionError::InstallIncomplete {
            target: "go".to_string(),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
