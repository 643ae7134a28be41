//! Step 3: git author identity.
use anyhow::Result;

use super::{Context, Step, StepResult};
use crate::actions::git_identity::GitIdentity;
use crate::error::ActionError;
use crate::prompt::confirm;

/// Set the global git author identity and remember it for later steps.
#[derive(Debug)]
pub struct ConfigureGitIdentity;

fn ask_required(ctx: &Context, question: &str, default: Option<&str>) -> Result<String> {
    let answer = ctx.prompt.ask(question, default.unwrap_or_default())?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(ActionError::NoAnswer(question.to_string()).into());
    }
    Ok(answer.to_string())
}

impl Step for ConfigureGitIdentity {
    fn label(&self) -> &str {
        "Configure git identity"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        if !ctx.which("git") {
            if ctx.dry_run {
                ctx.log.dry_run("would configure the global git identity");
                return Ok(StepResult::DryRun);
            }
            return Err(ActionError::MissingPrerequisite {
                tool: "git".to_string(),
                hint: "install git (base packages step)".to_string(),
            }
            .into());
        }

        let existing = GitIdentity::read(ctx)?;
        if existing.is_complete() {
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would ask before replacing git identity {existing}"));
                ctx.session.capture_identity(&existing);
                return Ok(StepResult::DryRun);
            }
            let question = format!("Replace existing git identity {existing}?");
            if !confirm(ctx.prompt.as_ref(), &question, false)? {
                ctx.session.capture_identity(&existing);
                return Ok(StepResult::Declined(format!("kept git identity {existing}")));
            }
        } else if ctx.dry_run {
            ctx.log.dry_run("would ask for a git name and email");
            return Ok(StepResult::DryRun);
        }

        let identity = GitIdentity {
            name: Some(ask_required(ctx, "Git user name", existing.name.as_deref())?),
            email: Some(ask_required(ctx, "Git email", existing.email.as_deref())?),
        };
        identity.write(ctx)?;
        ctx.log.info(&format!("git identity set to {identity}"));
        ctx.session.capture_identity(&identity);
        Ok(StepResult::Ok)
    }
}
