//! Step 10: Oh My Posh and its theme.
use anyhow::Result;
use serde_json::{Value, json};

use super::{Context, Step, StepResult};
use crate::actions::managed_file::ManagedFile;
use crate::actions::tool::{Installer, ToolResource};
use crate::actions::{configure_with_confirmation, install_if_absent};
use crate::config::PromptConfig;
use crate::steps::FailurePolicy;

const SCHEMA: &str =
    "https://raw.githubusercontent.com/JanDeDobbeleer/oh-my-posh/main/themes/schema.json";

/// Oh My Posh and its theme document.
#[derive(Debug)]
pub struct InstallPromptTheme;

fn segment(kind: &str, accent: &str) -> Value {
    let template = match kind {
        "path" => " {{ .Path }} ",
        "git" => " {{ .HEAD }}{{ if .Working.Changed }} *{{ end }} ",
        "session" => " {{ .UserName }}@{{ .HostName }} ",
        "time" => " {{ .CurrentDate | date .Format }} ",
        _ => " {{ .Full }} ",
    };
    let mut seg = json!({
        "type": kind,
        "style": "plain",
        "foreground": accent,
        "template": template,
    });
    if kind == "path" {
        seg["properties"] = json!({ "style": "folder" });
    }
    if kind == "git" {
        seg["properties"] = json!({ "fetch_status": true });
    }
    seg
}

/// Theme document built from the `[prompt]` configuration.
///
/// The output is deterministic so that an unchanged configuration leaves
/// an existing theme file untouched.
#[must_use]
pub fn render_theme(prompt: &PromptConfig) -> String {
    let segments: Vec<Value> = prompt
        .segments
        .iter()
        .map(|kind| segment(kind, &prompt.accent))
        .collect();
    let doc = json!({
        "$schema": SCHEMA,
        "version": 2,
        "final_space": true,
        "blocks": [
            {
                "type": "prompt",
                "alignment": "left",
                "segments": segments,
            },
            {
                "type": "prompt",
                "alignment": "left",
                "newline": true,
                "segments": [{
                    "type": "text",
                    "style": "plain",
                    "foreground": prompt.accent,
                    "template": "❯",
                }],
            }
        ],
    });
    // `Value`'s map keeps keys sorted, so this is stable across runs.
    let mut text = serde_json::to_string_pretty(&doc).unwrap_or_default();
    text.push('\n');
    text
}

impl Step for InstallPromptTheme {
    fn label(&self) -> &str {
        "Install Oh My Posh and theme"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Continue
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let local_bin = ctx.home_path(".local").join("bin");
        ctx.session.prepend_path(&local_bin);

        let cfg = &ctx.config.prompt;
        let installer = if ctx.platform.is_macos() {
            Installer::Package {
                id: cfg
                    .brew
                    .clone()
                    .unwrap_or_else(|| "oh-my-posh".to_string()),
            }
        } else if ctx.platform.is_windows() {
            Installer::Package {
                id: cfg
                    .winget
                    .clone()
                    .unwrap_or_else(|| "JanDeDobbeleer.OhMyPosh".to_string()),
            }
        } else {
            let dir = local_bin.to_string_lossy().into_owned();
            Installer::script(&cfg.install_url, "bash", &["-s", "--", "-d", &dir])
        };
        let posh = ToolResource::new("oh-my-posh", installer, ctx);
        let installed = install_if_absent(&posh, ctx.log.as_ref(), ctx.dry_run)?;

        let theme_path = theme_path(ctx);
        let theme = ManagedFile::new(&theme_path, render_theme(cfg), ctx.fs_ops.as_ref());
        let question = format!("Overwrite prompt theme {}?", theme_path.display());
        let themed = configure_with_confirmation(
            &theme,
            &question,
            ctx.prompt.as_ref(),
            ctx.log.as_ref(),
            ctx.dry_run,
        )?;
        Ok(StepResult::from_changes(&[installed, themed]))
    }
}

/// Where the generated theme document lives.
#[must_use]
pub fn theme_path(ctx: &Context) -> std::path::PathBuf {
    ctx.home_path(".config")
        .join("oh-my-posh")
        .join(&ctx.config.prompt.theme_file)
}
