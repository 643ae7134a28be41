//! Step 4: SSH key generation.
use anyhow::Result;

use super::{Context, Step, StepResult};
use crate::actions::Resource;
use crate::actions::ResourceState;
use crate::actions::ssh_key::{LabelSource, SshKeyResource, resolve_key_label};
use crate::prompt::confirm;

/// Generate an ed25519 SSH key labelled with the user's email.
#[derive(Debug)]
pub struct GenerateSshKey;

impl Step for GenerateSshKey {
    fn label(&self) -> &str {
        "Generate SSH key"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let path = ctx.home_path(".ssh/id_ed25519");
        let exists = matches!(
            SshKeyResource::new(&path, "", ctx).current_state()?,
            ResourceState::Incorrect { .. }
        );

        if exists {
            if ctx.dry_run {
                ctx.log.dry_run(&format!(
                    "would ask before replacing {}",
                    path.display()
                ));
                return Ok(StepResult::DryRun);
            }
            let question = format!("Overwrite existing SSH key {}?", path.display());
            if !confirm(ctx.prompt.as_ref(), &question, false)? {
                return Ok(StepResult::Declined("kept existing SSH key".to_string()));
            }
        } else if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would generate an SSH key at {}", path.display()));
            return Ok(StepResult::DryRun);
        }

        let (label, source) = resolve_key_label(ctx)?;
        if source != LabelSource::Session {
            ctx.log.debug(&format!("SSH key label from {source:?}: {label}"));
        }
        SshKeyResource::new(&path, &label, ctx).apply()?;
        Ok(StepResult::Ok)
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

    const KEY: &str = "/home/test/.ssh/id_ed25519";

    #[test]
    fn declining_overwrite_keeps_key() {
        let exec = Arc::new(RecordingExecutor::new().with_binary("ssh-keygen"));
        let (ctx, fs) = linux_context(Arc::clone(&exec));
        fs.write_text(Path::new(KEY), "old").unwrap();
        let mut ctx = ctx.with_prompt(Arc::new(ScriptedPrompt::new(["n"])));
        let result = GenerateSshKey.run(&mut ctx).unwrap();
        assert_eq!(
            result,
            StepResult::Declined("kept existing SSH key".to_string())
        );
        assert!(exec.calls().is_empty());
        assert_eq!(fs.content(Path::new(KEY)).as_deref(), Some("old"));
    }

    #[test]
    fn new_key_uses_session_email() {
        let exec = Arc::new(RecordingExecutor::new().with_binary("ssh-keygen"));
        let (mut ctx, _fs) = linux_context(Arc::clone(&exec));
        ctx.session.git_email = Some("ada@example.com".to_string());
        // The recording executor writes no key, so reading it back fails
        // after ssh-keygen ran with the right label.
        assert!(GenerateSshKey.run(&mut ctx).is_err());
        assert!(exec.ran("ssh-keygen -q -t ed25519 -C ada@example.com"));
    }

    #[test]
    fn dry_run_never_prompts() {
        let exec = Arc::new(RecordingExecutor::new());
        let (ctx, fs) = linux_context(Arc::clone(&exec));
        fs.write_text(Path::new(KEY), "old").unwrap();
        let prompt = Arc::new(ScriptedPrompt::new(Vec::<String>::new()));
        let mut ctx = ctx.with_prompt(Arc::clone(&prompt) as Arc<dyn crate::prompt::Prompt>);
        ctx.dry_run = true;
        assert_eq!(GenerateSshKey.run(&mut ctx).unwrap(), StepResult::DryRun);
        assert!(prompt.asked().is_empty());
        assert!(exec.calls().is_empty());
    }
}
