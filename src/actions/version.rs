//! Dotted version numbers and minimum-version requirements.
use std::cmp::Ordering;
use std::fmt;

use anyhow::Result;

use super::tool::{Installer, run_installer};
use super::{Resource, ResourceChange, ResourceState};
use crate::steps::Context;

/// A dotted numeric version such as `1.22.5`.
///
/// Missing trailing components compare as zero, so `1.22 == 1.22.0`.
#[derive(Debug, Clone, Eq)]
pub struct Version(Vec<u64>);

impl Version {
    /// Parse `1.22.5`, `v1.22.5` or `go1.22.5`. Returns `None` for anything
    /// without a leading numeric component.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text
            .strip_prefix("go")
            .or_else(|| text.strip_prefix('v'))
            .unwrap_or(text);
        let parts: Option<Vec<u64>> = text.split('.').map(|p| p.parse().ok()).collect();
        parts.filter(|p| !p.is_empty()).map(Self)
    }

    /// Find the first dotted version (at least `major.minor`) in command
    /// output such as `go version go1.22.5 linux/amd64`.
    #[must_use]
    pub fn extract(output: &str) -> Option<Self> {
        let chars: Vec<char> = output.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if chars.get(i).is_some_and(char::is_ascii_digit) {
                let start = i;
                while chars
                    .get(i)
                    .is_some_and(|c| c.is_ascii_digit() || *c == '.')
                {
                    i += 1;
                }
                let candidate: String = chars.get(start..i)?.iter().collect();
                let candidate = candidate.trim_end_matches('.');
                if candidate.contains('.')
                    && let Some(v) = Self::parse(candidate)
                {
                    return Some(v);
                }
            }
            i += 1;
        }
        None
    }

    fn component(&self, idx: usize) -> u64 {
        self.0.get(idx).copied().unwrap_or(0)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// A tool that must be installed at `minimum` or newer.
///
/// The installed version is read from `<binary> <args...>` on the session
/// `PATH`. A missing binary is `Missing`; an older one is `Incorrect`.
#[derive(Debug)]
pub struct VersionRequirement<'a> {
    /// Binary looked up on the session `PATH`.
    pub binary: String,
    /// Arguments that make the binary print its version.
    pub version_args: Vec<String>,
    /// Oldest acceptable version.
    pub minimum: Version,
    /// How to install or upgrade the tool.
    pub installer: Installer,
    ctx: &'a Context,
}

impl<'a> VersionRequirement<'a> {
    /// Require `binary` at `minimum` or newer.
    #[must_use]
    pub fn new(
        binary: &str,
        version_args: &[&str],
        minimum: Version,
        installer: Installer,
        ctx: &'a Context,
    ) -> Self {
        Self {
            binary: binary.to_string(),
            version_args: version_args.iter().map(|a| (*a).to_string()).collect(),
            minimum,
            installer,
            ctx,
        }
    }

    /// Version currently on the session `PATH`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error only if the version command cannot be spawned.
    pub fn installed(&self) -> Result<Option<Version>> {
        if !self.ctx.which(&self.binary) {
            return Ok(None);
        }
        let args: Vec<&str> = self.version_args.iter().map(String::as_str).collect();
        let result = self.ctx.run_unchecked(&self.binary, &args)?;
        if !result.success {
            return Ok(None);
        }
        Ok(Version::extract(&result.stdout))
    }
}

impl Resource for VersionRequirement<'_> {
    fn description(&self) -> String {
        format!("{} >= {}", self.binary, self.minimum)
    }

    fn current_state(&self) -> Result<ResourceState> {
        match self.installed()? {
            None => Ok(ResourceState::Missing),
            Some(v) if v < self.minimum => Ok(ResourceState::Incorrect {
                current: format!("{} {v}", self.binary),
            }),
            Some(_) => Ok(ResourceState::Correct),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        run_installer(self.ctx, &self.installer)?;
        Ok(ResourceChange::Applied)
    }
}
