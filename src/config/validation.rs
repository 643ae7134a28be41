//! Non-fatal configuration checks.
use std::collections::HashSet;

use super::Config;
use crate::platform::Family;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration section (e.g. "packages", "go").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Warning about `item` in section `source`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Check configuration for common mistakes. Never fails; problems are
/// reported as warnings and the run goes on.
#[must_use]
pub fn validate(config: &Config) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for package in &config.packages {
        if package.name.trim().is_empty() {
            warnings.push(ValidationWarning::new(
                "packages",
                &package.name,
                "package name is empty",
            ));
        }
        if !seen.insert(package.name.as_str()) {
            warnings.push(ValidationWarning::new(
                "packages",
                &package.name,
                "package declared more than once",
            ));
        }
        for tag in &package.platforms {
            if !Family::SUPPORTED_TAGS.contains(&tag.as_str()) {
                warnings.push(ValidationWarning::new(
                    "packages",
                    &package.name,
                    format!("unknown platform tag '{tag}'"),
                ));
            }
        }
    }

    if crate::actions::version::Version::parse(&config.go.version).is_none() {
        warnings.push(ValidationWarning::new(
            "go",
            "version",
            format!("'{}' is not a version number", config.go.version),
        ));
    }

    if !config.terminal.font_key_path.is_empty()
        && config.terminal.font_key_path.split('.').any(str::is_empty)
    {
        warnings.push(ValidationWarning::new(
            "terminal",
            "font_key_path",
            "key path contains an empty segment",
        ));
    }

    warnings
}
