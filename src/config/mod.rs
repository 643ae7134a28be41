//! Provisioning data: package lists, toolchain versions, shell and prompt
//! settings. Loaded from TOML; defaults are embedded in the binary.
pub mod packages;
pub mod toml_loader;
pub mod validation;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
pub use packages::{Package, PackageGroup};

/// Defaults shipped with the binary.
const EMBEDDED: &str = include_str!("../../conf/devsetup.toml");

/// All loaded configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Every `[[packages]]` entry, in file order.
    pub packages: Vec<Package>,
    /// `[homebrew]` section.
    pub homebrew: HomebrewConfig,
    /// `[go]` section.
    pub go: GoConfig,
    /// `[rust]` section.
    pub rust: RustConfig,
    /// `[shell]` section.
    pub shell: ShellConfig,
    /// `[prompt]` section.
    pub prompt: PromptConfig,
    /// `[terminal]` section.
    pub terminal: TerminalConfig,
}

/// `[homebrew]`: bootstrap of the macOS package manager.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HomebrewConfig {
    /// Homebrew install script.
    pub install_url: String,
}

/// `[go]`: Go toolchain version and sources.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoConfig {
    /// Minimum acceptable version; also the version downloaded on Linux.
    pub version: String,
    /// Base URL of the release tarballs.
    pub download_base: String,
    /// Directory the Linux tarball is extracted into (`<dir>/go`).
    pub install_dir: String,
    /// Homebrew formula, when it differs from `go`.
    pub brew: Option<String>,
    /// winget ID, when it differs from `GoLang.Go`.
    pub winget: Option<String>,
}

/// `[rust]`: rustup bootstrap.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RustConfig {
    /// rustup-init script for Unix hosts.
    pub rustup_url: String,
    /// winget ID of rustup.
    pub winget: Option<String>,
}

/// `[shell]`: zsh framework and `.zshrc` content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Oh My Zsh install script.
    pub oh_my_zsh_url: String,
    /// `ZSH_THEME` written to `.zshrc`.
    pub zsh_theme: String,
    /// Oh My Zsh plugins enabled in `.zshrc`.
    pub plugins: Vec<String>,
}

/// `[prompt]`: Oh My Posh install and theme.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Oh My Posh install script for Linux.
    pub install_url: String,
    /// Homebrew formula.
    pub brew: Option<String>,
    /// winget ID.
    pub winget: Option<String>,
    /// Theme path, relative to the home directory.
    pub theme_file: String,
    /// Accent color of the prompt segments.
    pub accent: String,
    /// Segment types shown, left to right.
    pub segments: Vec<String>,
    /// Nerd Font installed by `oh-my-posh font install`.
    pub font: String,
}

/// `[terminal]`: terminal emulator settings tweak.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Settings document to patch. Defaults to Windows Terminal's on Windows.
    pub settings_path: Option<PathBuf>,
    /// Dotted key path of the font field, e.g. `profiles.defaults.font.face`.
    pub font_key_path: String,
    /// Font face written at `font_key_path`.
    pub font_face: String,
}

impl Config {
    /// The embedded defaults alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document does not parse, which only
    /// happens if it was edited incorrectly.
    pub fn embedded() -> Result<Self, ConfigError> {
        let table = toml_loader::parse_table(EMBEDDED, "embedded defaults")?;
        toml_loader::deserialize(table, "embedded defaults")
    }

    /// Load the embedded defaults overlaid with `path`.
    ///
    /// Every top-level section defined in `path` replaces the default
    /// section. A missing file leaves the defaults untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let base = toml_loader::parse_table(EMBEDDED, "embedded defaults")?;
        let user = toml_loader::load_table(path)?;
        toml_loader::deserialize(
            toml_loader::overlay(base, user),
            &path.display().to_string(),
        )
    }

    /// Default location of the user file:
    /// `$XDG_CONFIG_HOME/devsetup/devsetup.toml` (or `~/.config/...`).
    #[must_use]
    pub fn default_path(home: &Path) -> PathBuf {
        config_dir(home).join("devsetup.toml")
    }

    /// Validate the configuration and return any warnings found.
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        validation::validate(self)
    }
}

/// `$XDG_CONFIG_HOME/devsetup` or `~/.config/devsetup`.
#[must_use]
pub fn config_dir(home: &Path) -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(|| home.join(".config"), PathBuf::from)
        .join("devsetup")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config = Config::embedded().unwrap();
        assert!(!config.packages.is_empty());
        assert!(!config.go.version.is_empty());
        assert!(config.rust.rustup_url.starts_with("https://"));
        assert_eq!(config.terminal.font_key_path, "profiles.defaults.font.face");
    }

    #[test]
    fn embedded_defaults_have_no_warnings() {
        let config = Config::embedded().unwrap();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
    }

    #[test]
    fn load_missing_user_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config.go.version, Config::embedded().unwrap().go.version);
    }

    #[test]
    fn user_section_replaces_default_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devsetup.toml");
        std::fs::write(
            &path,
            "[[packages]]\nname = \"htop\"\ngroup = \"cli\"\n\n[go]\nversion = \"1.23.0\"\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.packages.len(), 1);
        assert_eq!(config.packages[0].name, "htop");
        assert_eq!(config.go.version, "1.23.0");
        // sections the user file does not define keep their defaults
        assert!(!config.shell.plugins.is_empty());
    }

    #[test]
    fn load_rejects_wrong_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devsetup.toml");
        std::fs::write(&path, "[go]\nversion = 5\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
