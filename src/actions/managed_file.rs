//! Files whose whole content is generated.
use std::path::PathBuf;

use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::operations::FileSystemOps;

/// A file that should contain exactly `content`.
#[derive(Debug)]
pub struct ManagedFile<'a> {
    /// File location.
    pub path: PathBuf,
    /// Complete desired content.
    pub content: String,
    fs_ops: &'a dyn FileSystemOps,
}

impl<'a> ManagedFile<'a> {
    /// Manage `path` so that it holds `content`.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        fs_ops: &'a dyn FileSystemOps,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            fs_ops,
        }
    }
}

impl Resource for ManagedFile<'_> {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(match self.fs_ops.read_text(&self.path)? {
            None => ResourceState::Missing,
            Some(current) if current == self.content => ResourceState::Correct,
            Some(current) => ResourceState::Incorrect {
                current: format!("{} lines, different content", current.lines().count()),
            },
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.fs_ops.write_text(&self.path, &self.content)?;
        Ok(ResourceChange::Applied)
    }
}
