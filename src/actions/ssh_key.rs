//! SSH key generation and the label embedded in the key.
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{Resource, ResourceChange, ResourceState};
use crate::error::ActionError;
use crate::steps::Context;

/// Where the label of a generated key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// Email captured earlier in this run.
    Session,
    /// `git config --global user.email`.
    GitConfig,
    /// Typed in by the user.
    Prompt,
}

/// Resolve the key label: the email captured earlier in the run, then the
/// global git email, then an interactive prompt. In that order.
///
/// # Errors
///
/// Returns an error if the prompt fails or the user enters nothing.
pub fn resolve_key_label(ctx: &Context) -> Result<(String, LabelSource)> {
    if let Some(email) = ctx.session.git_email.as_deref().filter(|e| !e.is_empty()) {
        return Ok((email.to_string(), LabelSource::Session));
    }
    let persisted = ctx.run_unchecked("git", &["config", "--global", "--get", "user.email"]);
    if let Ok(result) = persisted
        && result.success
        && !result.stdout.trim().is_empty()
    {
        return Ok((result.stdout.trim().to_string(), LabelSource::GitConfig));
    }
    let answer = ctx.prompt.ask("Email address for the SSH key", "")?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(ActionError::NoAnswer("Email address for the SSH key".to_string()).into());
    }
    Ok((answer.to_string(), LabelSource::Prompt))
}

/// An ed25519 key pair at `path` / `path.pub`.
#[derive(Debug)]
pub struct SshKeyResource<'a> {
    /// Private key location.
    pub path: PathBuf,
    /// Comment stored in the public key.
    pub label: String,
    ctx: &'a Context,
}

impl<'a> SshKeyResource<'a> {
    /// Key pair at `path` labelled `label`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, label: &str, ctx: &'a Context) -> Self {
        Self {
            path: path.into(),
            label: label.to_string(),
            ctx,
        }
    }

    /// Path of the public half.
    #[must_use]
    pub fn public_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".pub");
        PathBuf::from(name)
    }

    /// Print the public key once, with instructions for registering it.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key cannot be read.
    pub fn show_public_key(&self) -> Result<()> {
        let public = self
            .ctx
            .fs_ops
            .read_text(&self.public_path())?
            .with_context(|| format!("{} was not created", self.public_path().display()))?;
        self.ctx.log.info("Your new public key:");
        self.ctx.log.info(public.trim());
        self.ctx.log.info(
            "Add it to your Git host (GitHub: Settings > SSH and GPG keys > New SSH key) \
             before cloning over SSH.",
        );
        Ok(())
    }
}

impl Resource for SshKeyResource<'_> {
    fn description(&self) -> String {
        format!("SSH key {}", self.path.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.ctx.fs_ops.exists(&self.path) {
            Ok(ResourceState::Incorrect {
                current: "a key is already present".to_string(),
            })
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if !self.ctx.which("ssh-keygen") {
            return Err(ActionError::MissingPrerequisite {
                tool: "ssh-keygen".to_string(),
                hint: "install an OpenSSH client".to_string(),
            }
            .into());
        }
        if let Some(dir) = self.path.parent() {
            self.ctx.fs_ops.create_dir_all(dir)?;
        }
        self.ctx.fs_ops.remove_file(&self.path)?;
        self.ctx.fs_ops.remove_file(&self.public_path())?;
        let path = self.path.to_string_lossy().into_owned();
        self.ctx.run(
            "ssh-keygen",
            &["-q", "-t", "ed25519", "-C", &self.label, "-f", &path, "-N", ""],
        )?;
        self.show_public_key()?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::FileSystemOps as _;
    use crate::prompt::ScriptedPrompt;
    use crate::steps::test_helpers::{RecordingExecutor, linux_context};
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn label_prefers_session_email() {
        let exec = Arc::new(
            RecordingExecutor::new().respond("git config", true, "persisted@example.com\n"),
        );
        let (mut ctx, _fs) = linux_context(Arc::clone(&exec));
        let prompt = Arc::new(ScriptedPrompt::new(["typed@example.com"]));
        ctx = ctx.with_prompt(Arc::clone(&prompt) as Arc<dyn crate::prompt::Prompt>);
        ctx.session.git_email = Some("session@example.com".to_string());
        let (label, source) = resolve_key_label(&ctx).unwrap();
        assert_eq!(label, "session@example.com");
        assert_eq!(source, LabelSource::Session);
        assert!(exec.calls().is_empty());
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn label_falls_back_to_git_config() {
        let exec = RecordingExecutor::new().respond("git config", true, "persisted@example.com\n");
        let (ctx, _fs) = linux_context(exec);
        let prompt = Arc::new(ScriptedPrompt::new(["typed@example.com"]));
        let ctx = ctx.with_prompt(Arc::clone(&prompt) as Arc<dyn crate::prompt::Prompt>);
        let (label, source) = resolve_key_label(&ctx).unwrap();
        assert_eq!(label, "persisted@example.com");
        assert_eq!(source, LabelSource::GitConfig);
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn label_falls_back_to_prompt() {
        let exec = RecordingExecutor::new().respond("git config", false, "");
        let (ctx, _fs) = linux_context(exec);
        let prompt = Arc::new(ScriptedPrompt::new(["typed@example.com"]));
        let ctx = ctx.with_prompt(Arc::clone(&prompt) as Arc<dyn crate::prompt::Prompt>);
        let (label, source) = resolve_key_label(&ctx).unwrap();
        assert_eq!(label, "typed@example.com");
        assert_eq!(source, LabelSource::Prompt);
        assert_eq!(prompt.asked().len(), 1);
    }

    #[test]
    fn empty_prompt_answer_is_error() {
        let exec = RecordingExecutor::new().respond("git config", false, "");
        let (ctx, _fs) = linux_context(exec);
        let ctx = ctx.with_prompt(Arc::new(ScriptedPrompt::new([""])));
        assert!(resolve_key_label(&ctx).is_err());
    }

    #[test]
    fn public_path_appends_suffix() {
        let (ctx, _fs) = linux_context(RecordingExecutor::new());
        let key = SshKeyResource::new("/home/test/.ssh/id_ed25519", "me@example.com", &ctx);
        assert_eq!(
            key.public_path(),
            PathBuf::from("/home/test/.ssh/id_ed25519.pub")
        );
    }

    #[test]
    fn existing_key_asks_before_replacing() {
        let (ctx, fs) = linux_context(RecordingExecutor::new());
        let key = SshKeyResource::new("/home/test/.ssh/id_ed25519", "me@example.com", &ctx);
        assert_eq!(key.current_state().unwrap(), ResourceState::Missing);
        fs.write_text(Path::new("/home/test/.ssh/id_ed25519"), "k").unwrap();
        assert!(matches!(
            key.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
    }

    #[test]
    fn apply_runs_keygen_with_label() {
        let exec = Arc::new(RecordingExecutor::new().with_binary("ssh-keygen"));
        let (ctx, fs) = linux_context(Arc::clone(&exec));
        fs.write_text(Path::new("/home/test/.ssh/id_ed25519.pub"), "stale\n")
            .unwrap();
        let key = SshKeyResource::new("/home/test/.ssh/id_ed25519", "me@example.com", &ctx);
        // The recording executor creates no files, so the stale public key
        // is gone and nothing replaced it.
        let err = key.apply().unwrap_err();
        assert!(err.to_string().contains("was not created"));
        assert_eq!(
            exec.calls(),
            vec!["ssh-keygen -q -t ed25519 -C me@example.com -f /home/test/.ssh/id_ed25519 -N "]
        );
    }

    #[test]
    fn apply_without_keygen_is_missing_prerequisite() {
        let (ctx, _fs) = linux_context(RecordingExecutor::new());
        let key = SshKeyResource::new("/home/test/.ssh/id_ed25519", "me@example.com", &ctx);
        let err = key.apply().unwrap_err();
        assert!(err.to_string().contains("ssh-keygen"));
    }
}
