//! Single lines appended to shell profile files.
use std::path::PathBuf;

use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::operations::FileSystemOps;

/// A line that must appear in a profile file. Existing content is kept and
/// the line is appended when absent.
#[derive(Debug)]
pub struct ProfileLine<'a> {
    /// Profile file.
    pub path: PathBuf,
    /// Exact line to ensure, without the trailing newline.
    pub line: String,
    fs_ops: &'a dyn FileSystemOps,
}

impl<'a> ProfileLine<'a> {
    /// Ensure `line` appears in `path`.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        line: impl Into<String>,
        fs_ops: &'a dyn FileSystemOps,
    ) -> Self {
        Self {
            path: path.into(),
            line: line.into(),
            fs_ops,
        }
    }

    /// `export PATH="<dir>:$PATH"` for POSIX shells.
    #[must_use]
    pub fn path_export(dir: &str) -> String {
        format!("export PATH=\"{dir}:$PATH\"")
    }
}

impl Resource for ProfileLine<'_> {
    fn description(&self) -> String {
        format!("{} in {}", self.line, self.path.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        let present = self
            .fs_ops
            .read_text(&self.path)?
            .is_some_and(|text| text.lines().any(|l| l.trim() == self.line.trim()));
        Ok(if present {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        let mut text = self.fs_ops.read_text(&self.path)?.unwrap_or_default();
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&self.line);
        text.push('\n');
        self.fs_ops.write_text(&self.path, &text)?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::MockFileSystemOps;
    use std::path::Path;

    const PROFILE: &str = "/home/test/.profile";

    #[test]
    fn path_export_format() {
        assert_eq!(
            ProfileLine::path_export("/usr/local/go/bin"),
            "export PATH=\"/usr/local/go/bin:$PATH\""
        );
    }

    #[test]
    fn appends_after_existing_content() {
        let fs = MockFileSystemOps::new().with_file(PROFILE, "umask 022");
        let line = ProfileLine::new(PROFILE, "export EDITOR=vim", &fs);
        assert_eq!(line.current_state().unwrap(), ResourceState::Missing);
        line.apply().unwrap();
        assert_eq!(
            fs.content(Path::new(PROFILE)).as_deref(),
            Some("umask 022\nexport EDITOR=vim\n")
        );
        assert_eq!(line.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn indented_line_counts_as_present() {
        let fs = MockFileSystemOps::new().with_file(PROFILE, "  export EDITOR=vim\n");
        let line = ProfileLine::new(PROFILE, "export EDITOR=vim", &fs);
        assert_eq!(line.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn creates_missing_profile() {
        let fs = MockFileSystemOps::new();
        let line = ProfileLine::new(PROFILE, "export A=1", &fs);
        line.apply().unwrap();
        assert_eq!(fs.content(Path::new(PROFILE)).as_deref(), Some("export A=1\n"));
    }
}
