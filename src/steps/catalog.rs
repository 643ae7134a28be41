//! The provisioning flow: which steps exist, in which order, and what the
//! verification battery checks afterwards.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::fonts::InstallFonts;
use super::git::ConfigureGitIdentity;
use super::go::InstallGo;
use super::packages::{InstallPackages, PreparePackageManager};
use super::prompt_theme::{InstallPromptTheme, theme_path};
use super::rust::InstallRust;
use super::shell::InstallZsh;
use super::shell_config::ConfigureShell;
use super::ssh::GenerateSshKey;
use super::{Context, Step, StepRegistry};
use crate::config::packages;
use crate::error::RegistryError;
use crate::verify::Probe;

fn boxed(step: impl Step + 'static) -> Box<dyn Step> {
    Box::new(step)
}

/// Ordinals and steps of the full flow.
#[must_use]
pub fn steps() -> Vec<(u32, Box<dyn Step>)> {
    use crate::config::PackageGroup::{Base, Cli, Runtime};
    vec![
        (1, boxed(PreparePackageManager)),
        (2, boxed(InstallPackages::strict("Install base packages", Base))),
        (3, boxed(ConfigureGitIdentity)),
        (4, boxed(GenerateSshKey)),
        (5, boxed(InstallZsh)),
        (6, boxed(InstallGo)),
        (7, boxed(InstallRust)),
        (8, boxed(InstallPackages::strict("Install language runtimes", Runtime))),
        (9, boxed(InstallPackages::tolerant("Install CLI utilities", Cli))),
        (10, boxed(InstallPromptTheme)),
        (11, boxed(InstallFonts)),
        (12, boxed(ConfigureShell)),
    ]
}

/// Registry of the full flow.
///
/// # Errors
///
/// Returns [`RegistryError`] if [`steps`] repeats an ordinal or uses zero.
pub fn registry() -> Result<StepRegistry, RegistryError> {
    StepRegistry::new(steps())
}

/// Checks run after the steps, for the current platform.
#[must_use]
pub fn verification_probes(ctx: &Context) -> Vec<Probe> {
    let mut probes = vec![Probe::command("git", "git", &["--version"])];
    if !ctx.platform.is_windows() {
        probes.push(Probe::command("zsh", "zsh", &["--version"]));
    }
    probes.extend([
        Probe::command("go", "go", &["version"]),
        Probe::command("rustc", "rustc", &["--version"]),
        Probe::command("cargo", "cargo", &["--version"]),
        Probe::command("oh-my-posh", "oh-my-posh", &["version"]),
    ]);

    let mut seen: BTreeSet<String> = probes.iter().map(|p| p.name.clone()).collect();
    for pkg in &ctx.config.packages {
        let Some(binary) = &pkg.binary else { continue };
        if !pkg.applies_to(&ctx.platform.family) || !seen.insert(binary.clone()) {
            continue;
        }
        probes.push(Probe::command(binary, binary, &["--version"]));
    }

    probes.push(Probe::file(
        "ssh public key",
        ctx.home_path(".ssh").join("id_ed25519.pub"),
    ));
    probes.push(Probe::file("prompt theme", theme_path(ctx)));
    probes
}

/// Put every directory the steps install tools into on the session `PATH`,
/// so that a verification-only run finds the same binaries as a full run.
pub fn prime_session(ctx: &mut Context) {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if ctx.platform.is_macos() {
        dirs.push(PathBuf::from("/usr/local/bin"));
        dirs.push(PathBuf::from("/opt/homebrew/bin"));
    }
    if ctx.platform.is_windows() {
        dirs.push(PathBuf::from(r"C:\Program Files\Go\bin"));
    } else {
        dirs.push(Path::new(&ctx.config.go.install_dir).join("go").join("bin"));
    }
    dirs.push(ctx.home_path("go").join("bin"));
    dirs.push(ctx.home_path(".cargo").join("bin"));
    dirs.push(ctx.home_path(".local").join("bin"));
    for dir in dirs {
        ctx.session.prepend_path(dir);
    }
}

/// Package names installed by `group` on this platform, for listings.
#[must_use]
pub fn package_names(ctx: &Context, group: crate::config::PackageGroup) -> Vec<String> {
    packages::select(&ctx.config.packages, group, &ctx.platform.family)
        .into_iter()
        .map(|p| p.name.clone())
        .collect()
}
