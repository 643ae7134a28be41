//! Step 11: fonts and terminal settings.
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, FailurePolicy, Step, StepResult};
use crate::actions::json_settings::JsonSettings;
use crate::actions::{Resource, ResourceChange, ResourceState, configure_with_confirmation};

/// Nerd Font for the prompt glyphs and the terminal font setting.
#[derive(Debug)]
pub struct InstallFonts;

/// A Nerd Font installed through `oh-my-posh font install`.
///
/// Presence is read from `fc-list` where fontconfig exists. Elsewhere the
/// font is always reinstalled, which `oh-my-posh` does in place.
#[derive(Debug)]
pub struct FontResource<'a> {
    /// Font name as `oh-my-posh font install` takes it.
    pub font: String,
    /// Face name looked for in `fc-list`.
    pub face: String,
    ctx: &'a Context,
}

impl<'a> FontResource<'a> {
    /// Font `font`, detected by its face name `face`.
    #[must_use]
    pub fn new(font: &str, face: &str, ctx: &'a Context) -> Self {
        Self {
            font: font.to_string(),
            face: face.to_string(),
            ctx,
        }
    }
}

impl Resource for FontResource<'_> {
    fn description(&self) -> String {
        format!("{} Nerd Font", self.font)
    }

    fn current_state(&self) -> Result<ResourceState> {
        if !self.ctx.which("oh-my-posh") {
            return Ok(ResourceState::Invalid {
                reason: "oh-my-posh is not installed, font skipped".to_string(),
            });
        }
        if !self.ctx.which("fc-list") {
            return Ok(ResourceState::Missing);
        }
        let listed = self.ctx.run_unchecked("fc-list", &[":", "family"])?;
        let face = self.face.to_lowercase();
        let present = listed.success
            && listed
                .stdout
                .lines()
                .any(|l| l.to_lowercase().contains(&face));
        Ok(if present {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.ctx
            .run_interactive("oh-my-posh", &["font", "install", &self.font], &[])?;
        Ok(ResourceChange::Applied)
    }
}

/// Settings document of the terminal emulator, if there is one to patch.
#[must_use]
pub fn terminal_settings_path(ctx: &Context) -> Option<PathBuf> {
    if let Some(path) = &ctx.config.terminal.settings_path {
        return Some(path.clone());
    }
    ctx.platform.is_windows().then(|| {
        ctx.home_path("AppData")
            .join("Local")
            .join("Packages")
            .join("Microsoft.WindowsTerminal_8wekyb3d8bbwe")
            .join("LocalState")
            .join("settings.json")
    })
}

fn recoverable(ctx: &Context, what: &str, result: Result<ResourceChange>) -> ResourceChange {
    result.unwrap_or_else(|e| {
        ctx.log.warn(&format!("{what}: {e:#}"));
        ResourceChange::Skipped {
            reason: format!("{what} failed"),
        }
    })
}

impl Step for InstallFonts {
    fn label(&self) -> &str {
        "Install fonts and terminal settings"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Continue
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let prompt_cfg = &ctx.config.prompt;
        let terminal = &ctx.config.terminal;
        let mut changes = Vec::new();

        let font = FontResource::new(&prompt_cfg.font, &terminal.font_face, ctx);
        let font_change = match font.current_state()? {
            ResourceState::Correct => ResourceChange::AlreadyCorrect,
            ResourceState::Invalid { reason } => ResourceChange::Skipped { reason },
            _ if ctx.dry_run => {
                ctx.log
                    .dry_run(&format!("would install {}", font.description()));
                ResourceChange::WouldApply
            }
            _ => recoverable(ctx, "font install", font.apply()),
        };
        changes.push(font_change);

        if let Some(path) = terminal_settings_path(ctx) {
            let setting = JsonSettings::new(
                &path,
                &terminal.font_key_path,
                terminal.font_face.as_str(),
                ctx.fs_ops.as_ref(),
            );
            let question = format!("Set terminal font to {}?", terminal.font_face);
            let result = configure_with_confirmation(
                &setting,
                &question,
                ctx.prompt.as_ref(),
                ctx.log.as_ref(),
                ctx.dry_run,
            );
            changes.push(recoverable(ctx, "terminal settings", result));
        } else {
            ctx.log.debug("no terminal settings document to update");
        }

        Ok(StepResult::from_changes(&changes))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::operations::FileSystemOps as _;
    use crate::platform::Family;
    use crate::steps::test_helpers::{RecordingExecutor, context_for, linux_context};
    use serde_json::Value;
    use std::path::Path;
    use std::sync::Arc;

    fn with_settings(ctx: Context, path: &str) -> Context {
        let mut config = Config::embedded().unwrap();
        config.terminal.settings_path = Some(PathBuf::from(path));
        Context {
            config: Arc::new(config),
            ..ctx
        }
    }

    #[test]
    fn font_present_in_fontconfig_is_left_alone() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_binary("oh-my-posh")
                .with_binary("fc-list")
                .respond("fc-list", true, "MesloLGM Nerd Font,MesloLGM NF\n"),
        );
        let (mut ctx, _fs) = linux_context(Arc::clone(&exec));
        assert_eq!(InstallFonts.run(&mut ctx).unwrap(), StepResult::AlreadyPresent);
        assert!(!exec.ran("oh-my-posh"));
    }

    #[test]
    fn missing_font_is_installed() {
        let exec = Arc::new(RecordingExecutor::new().with_binary("oh-my-posh"));
        let (mut ctx, _fs) = linux_context(Arc::clone(&exec));
        assert_eq!(InstallFonts.run(&mut ctx).unwrap(), StepResult::Ok);
        assert!(exec.ran("oh-my-posh font install Meslo"));
    }

    #[test]
    fn font_failure_is_a_warning() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_binary("oh-my-posh")
                .respond("oh-my-posh font install", false, ""),
        );
        let (mut ctx, _fs) = linux_context(Arc::clone(&exec));
        assert_eq!(
            InstallFonts.run(&mut ctx).unwrap(),
            StepResult::Warned("font install failed".to_string())
        );
    }

    #[test]
    fn without_oh_my_posh_the_font_is_skipped() {
        let (mut ctx, _fs) = linux_context(RecordingExecutor::new());
        let result = InstallFonts.run(&mut ctx).unwrap();
        assert!(matches!(result, StepResult::Warned(reason) if reason.contains("oh-my-posh")));
    }

    #[test]
    fn windows_terminal_settings_default_path() {
        let (ctx, _fs) = context_for(Family::Windows, RecordingExecutor::new());
        let path = terminal_settings_path(&ctx).unwrap();
        assert!(path.ends_with("LocalState/settings.json"));
        let (ctx, _fs) = linux_context(RecordingExecutor::new());
        assert!(terminal_settings_path(&ctx).is_none());
    }

    #[test]
    fn terminal_font_is_set_in_configured_document() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_binary("oh-my-posh")
                .with_binary("fc-list")
                .respond("fc-list", true, "MesloLGM Nerd Font\n"),
        );
        let (ctx, fs) = linux_context(exec);
        fs.write_text(Path::new("/home/test/term.json"), r#"{"profiles":{}}"#)
            .unwrap();
        let mut ctx = with_settings(ctx, "/home/test/term.json");
        assert_eq!(InstallFonts.run(&mut ctx).unwrap(), StepResult::Ok);
        let doc: Value =
            serde_json::from_str(&fs.content(Path::new("/home/test/term.json")).unwrap()).unwrap();
        assert_eq!(doc["profiles"]["defaults"]["font"]["face"], "MesloLGM Nerd Font");
    }

    #[test]
    fn malformed_settings_are_a_warning() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_binary("oh-my-posh")
                .with_binary("fc-list")
                .respond("fc-list", true, "MesloLGM Nerd Font\n"),
        );
        let (ctx, fs) = linux_context(exec);
        fs.write_text(Path::new("/home/test/term.json"), "{ broken").unwrap();
        let mut ctx = with_settings(ctx, "/home/test/term.json");
        assert_eq!(
            InstallFonts.run(&mut ctx).unwrap(),
            StepResult::Warned("terminal settings failed".to_string())
        );
    }
}
