//! Which step ordinals to skip, and the per-user file that remembers it.
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::config::config_dir;
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::prompt::{Prompt, confirm};

/// Step ordinals excluded from a run.
///
/// Ordinals that name no registered step are kept and simply never match.
///
/// # Examples
///
/// ```
/// use devsetup_cli::skip_state::SkipSet;
///
/// let skip = SkipSet::parse("2, 5").unwrap();
/// assert!(skip.contains(2) && skip.contains(5));
/// assert!(!skip.contains(3));
/// assert_eq!(skip.to_string(), "2,5");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet(BTreeSet<u32>);

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|t| !t.is_empty())
}

impl SkipSet {
    /// Parse a comma-separated list of ordinals. Whitespace around tokens
    /// is ignored and an empty list skips nothing.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first token that is not a non-negative
    /// integer.
    pub fn parse(text: &str) -> Result<Self, String> {
        tokens(text)
            .map(|t| {
                t.parse::<u32>()
                    .map_err(|_| format!("'{t}' is not a step number"))
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    /// Like [`SkipSet::parse`] but drops unreadable tokens, returning them
    /// alongside the set.
    #[must_use]
    pub fn parse_lenient(text: &str) -> (Self, Vec<String>) {
        let mut set = BTreeSet::new();
        let mut rejected = Vec::new();
        for t in tokens(text) {
            match t.parse::<u32>() {
                Ok(n) => {
                    set.insert(n);
                }
                Err(_) => rejected.push(t.to_string()),
            }
        }
        (Self(set), rejected)
    }

    /// Whether step `ordinal` is skipped.
    #[must_use]
    pub fn contains(&self, ordinal: u32) -> bool {
        self.0.contains(&ordinal)
    }

    /// Whether nothing is skipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Skipped ordinals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<u32> for SkipSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for SkipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// The persisted skip list: one line of comma-separated ordinals.
#[derive(Debug, Clone)]
pub struct SkipStateStore {
    path: PathBuf,
    fs_ops: Arc<dyn FileSystemOps>,
}

impl SkipStateStore {
    /// Store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        Self {
            path: path.into(),
            fs_ops,
        }
    }

    /// `$XDG_CONFIG_HOME/devsetup/skip_steps`.
    #[must_use]
    pub fn default_path(home: &Path) -> PathBuf {
        config_dir(home).join("skip_steps")
    }

    /// Location of the saved list.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw first line of the file, if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load_raw(&self) -> Result<Option<String>> {
        let text = self
            .fs_ops
            .read_text(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        Ok(text.map(|t| t.lines().next().unwrap_or_default().trim().to_string()))
    }

    /// The persisted set, if the file exists. Unreadable tokens are dropped
    /// and logged at debug level.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self, log: &dyn Log) -> Result<Option<SkipSet>> {
        let Some(raw) = self.load_raw()? else {
            return Ok(None);
        };
        let (saved, rejected) = SkipSet::parse_lenient(&raw);
        for token in rejected {
            log.debug(&format!(
                "{}: ignoring '{token}': not a step number",
                self.path.display()
            ));
        }
        Ok(Some(saved))
    }

    /// Overwrite the file with `raw`, exactly as the user typed it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be written.
    pub fn save(&self, raw: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            self.fs_ops.create_dir_all(dir)?;
        }
        self.fs_ops
            .write_text(&self.path, &format!("{}\n", raw.trim()))
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Show `listing` and ask which steps to skip. Returns the set and the
    /// raw answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt fails.
    pub fn prompt_for_skips(
        &self,
        prompt: &dyn Prompt,
        listing: &str,
        log: &dyn Log,
    ) -> Result<(SkipSet, String)> {
        log.info("Steps:");
        for line in listing.lines() {
            log.info(line);
        }
        let raw = prompt.ask("Steps to skip (comma-separated, empty for none)", "")?;
        let (set, rejected) = SkipSet::parse_lenient(&raw);
        for token in rejected {
            log.debug(&format!("ignoring '{token}': not a step number"));
        }
        Ok((set, raw.trim().to_string()))
    }

    /// Start-up flow: offer the saved list, otherwise ask, then offer to
    /// save the fresh answer.
    ///
    /// # Errors
    ///
    /// Returns an error if a prompt fails or the file cannot be read or
    /// written.
    pub fn resolve(&self, prompt: &dyn Prompt, listing: &str, log: &dyn Log) -> Result<SkipSet> {
        if let Some(saved) = self.load(log)? {
            let shown = if saved.is_empty() {
                "none".to_string()
            } else {
                saved.to_string()
            };
            if confirm(prompt, &format!("Use saved skip list ({shown})?"), true)? {
                return Ok(saved);
            }
        }

        let (set, raw) = self.prompt_for_skips(prompt, listing, log)?;
        if confirm(prompt, "Save this choice for future runs?", false)? {
            self.save(&raw)?;
            log.info(&format!("saved skip list to {}", self.path.display()));
        }
        Ok(set)
    }
}
