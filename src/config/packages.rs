//! Package entries and their per-platform resolution.
use serde::Deserialize;

use crate::platform::{Family, PackageManager};

/// Which provisioning step installs a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageGroup {
    /// Compilers, build tools and fetch tools needed by later steps.
    #[default]
    Base,
    /// Language runtimes.
    Runtime,
    /// Optional command-line utilities.
    Cli,
}

/// A package to install, as declared in `[[packages]]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Package {
    /// Default package name, used when no manager-specific name is given.
    pub name: String,
    /// Step that installs the package.
    #[serde(default)]
    pub group: PackageGroup,
    /// Family tags this package applies to. Empty means every platform.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Executable probed after the run to verify the install.
    #[serde(default)]
    pub binary: Option<String>,
    /// Homebrew name override.
    #[serde(default)]
    pub brew: Option<String>,
    /// dnf name override.
    #[serde(default)]
    pub dnf: Option<String>,
    /// apt name override.
    #[serde(default)]
    pub apt: Option<String>,
    /// winget ID override.
    #[serde(default)]
    pub winget: Option<String>,
}

impl Package {
    /// Whether this package is installed on `family`.
    #[must_use]
    pub fn applies_to(&self, family: &Family) -> bool {
        self.platforms.is_empty() || self.platforms.iter().any(|p| p == family.tag())
    }

    /// Name or id to hand to `manager`, falling back to [`Package::name`].
    #[must_use]
    pub fn id_for(&self, manager: PackageManager) -> &str {
        let id = match manager {
            PackageManager::Brew => &self.brew,
            PackageManager::Dnf => &self.dnf,
            PackageManager::Apt => &self.apt,
            PackageManager::Winget => &self.winget,
        };
        id.as_deref().unwrap_or(&self.name)
    }
}

/// Packages of `group` that apply to `family`, in declaration order.
#[must_use]
pub fn select<'a>(
    packages: &'a [Package],
    group: PackageGroup,
    family: &Family,
) -> Vec<&'a Package> {
    packages
        .iter()
        .filter(|p| p.group == group && p.applies_to(family))
        .collect()
}
