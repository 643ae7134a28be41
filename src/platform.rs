//! Host platform detection: OS family, CPU architecture, package manager.
use std::fmt;

use crate::error::PlatformError;

/// Operating system family the provisioning flow knows how to drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Family {
    /// macOS, provisioned with Homebrew.
    MacOs,
    /// Fedora, provisioned with dnf.
    Fedora,
    /// Ubuntu, provisioned with apt.
    Ubuntu,
    /// Windows, provisioned with winget.
    Windows,
    /// Any other host. `like` carries the `ID_LIKE` tokens of a Linux
    /// distribution so that the error can point at a close alternative.
    Unsupported {
        /// Human-readable name of the host.
        name: String,
        /// `ID_LIKE` tokens, empty when unknown.
        like: Vec<String>,
    },
}

impl Family {
    /// Lowercase tag used in configuration files (`platforms = ["fedora"]`).
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Fedora => "fedora",
            Self::Ubuntu => "ubuntu",
            Self::Windows => "windows",
            Self::Unsupported { .. } => "unsupported",
        }
    }

    /// Tags accepted in configuration files.
    pub const SUPPORTED_TAGS: &'static [&'static str] = &["macos", "fedora", "ubuntu", "windows"];
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => write!(f, "macOS"),
            Self::Fedora => write!(f, "Fedora"),
            Self::Ubuntu => write!(f, "Ubuntu"),
            Self::Windows => write!(f, "Windows"),
            Self::Unsupported { name, .. } => write!(f, "{name}"),
        }
    }
}

/// CPU architecture, named the way toolchain download URLs name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arch {
    /// 64-bit x86.
    Amd64,
    /// 64-bit ARM.
    Arm64,
    /// 32-bit ARM.
    Armv6l,
    /// Anything else, by machine name.
    Other(String),
}

impl Arch {
    /// Map a machine name (`uname -m` or `std::env::consts::ARCH`) to an [`Arch`].
    ///
    /// 32-bit ARM boards map to `armv6l`, the only 32-bit ARM build most
    /// toolchains publish.
    #[must_use]
    pub fn parse(machine: &str) -> Self {
        match machine.trim() {
            "x86_64" | "amd64" => Self::Amd64,
            "aarch64" | "arm64" => Self::Arm64,
            "armv6l" | "armv7l" | "arm" => Self::Armv6l,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amd64 => write!(f, "amd64"),
            Self::Arm64 => write!(f, "arm64"),
            Self::Armv6l => write!(f, "armv6l"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Package manager frontend for a supported family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Homebrew.
    Brew,
    /// dnf.
    Dnf,
    /// apt, through `apt-get`.
    Apt,
    /// winget.
    Winget,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brew => write!(f, "brew"),
            Self::Dnf => write!(f, "dnf"),
            Self::Apt => write!(f, "apt"),
            Self::Winget => write!(f, "winget"),
        }
    }
}

/// Platform information for the current host. Resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system family.
    pub family: Family,
    /// CPU architecture.
    pub arch: Arch,
    /// Package manager, absent on unsupported hosts.
    pub package_manager: Option<PackageManager>,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        let os = std::env::consts::OS;
        let os_release = if os == "linux" {
            std::fs::read_to_string("/etc/os-release").ok()
        } else {
            None
        };
        Self::from_parts(os, os_release.as_deref(), &machine_name())
    }

    /// Resolve a platform from raw host markers.
    ///
    /// `os` follows `std::env::consts::OS`, `os_release` is the content of
    /// `/etc/os-release` (Linux only) and `machine` is a `uname -m` style name.
    #[must_use]
    pub fn from_parts(os: &str, os_release: Option<&str>, machine: &str) -> Self {
        let family = match os {
            "macos" => Family::MacOs,
            "windows" => Family::Windows,
            "linux" => linux_family(os_release.unwrap_or_default()),
            other => Family::Unsupported {
                name: other.to_string(),
                like: Vec::new(),
            },
        };
        Self::new(family, Arch::parse(machine))
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub fn new(family: Family, arch: Arch) -> Self {
        let package_manager = match family {
            Family::MacOs => Some(PackageManager::Brew),
            Family::Fedora => Some(PackageManager::Dnf),
            Family::Ubuntu => Some(PackageManager::Apt),
            Family::Windows => Some(PackageManager::Winget),
            Family::Unsupported { .. } => None,
        };
        Self {
            family,
            arch,
            package_manager,
        }
    }

    /// Fail unless the family is one the provisioning flow supports.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] naming the host and the closest
    /// alternatives.
    pub fn ensure_supported(&self) -> Result<PackageManager, PlatformError> {
        self.package_manager
            .ok_or_else(|| PlatformError::Unsupported {
                platform: self.family.to_string(),
                alternatives: self.alternatives(),
            })
    }

    /// Suggestions shown when the host is not supported.
    #[must_use]
    pub fn alternatives(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Family::Unsupported { like, .. } = &self.family {
            if like.iter().any(|l| l == "debian" || l == "ubuntu") {
                out.push(
                    "Debian-based host: use an Ubuntu machine, or install the packages \
                     from `devsetup steps` manually with `sudo apt-get install`"
                        .to_string(),
                );
            }
            if like.iter().any(|l| l == "fedora" || l == "rhel") {
                out.push(
                    "Red Hat-based host: use a Fedora machine, or install the packages \
                     from `devsetup steps` manually with `sudo dnf install`"
                        .to_string(),
                );
            }
        }
        out.push(
            "supported platforms: macOS (brew), Fedora (dnf), Ubuntu (apt), Windows (winget)"
                .to_string(),
        );
        out
    }

    /// Whether the host runs Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.family == Family::Windows
    }

    /// Whether the host runs macOS.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.family == Family::MacOs
    }

    /// Whether the host is a supported Linux distribution.
    #[must_use]
    pub const fn is_linux(&self) -> bool {
        matches!(self.family, Family::Fedora | Family::Ubuntu)
    }

    /// OS component of toolchain download names (`go1.22.5.<os>-<arch>.tar.gz`).
    #[must_use]
    pub const fn os_tag(&self) -> &'static str {
        match self.family {
            Family::MacOs => "darwin",
            Family::Windows => "windows",
            _ => "linux",
        }
    }

    /// Architecture component of toolchain download names.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedArch`] for architectures without a
    /// published download.
    pub fn download_arch(&self) -> Result<&'static str, PlatformError> {
        match &self.arch {
            Arch::Amd64 => Ok("amd64"),
            Arch::Arm64 => Ok("arm64"),
            Arch::Armv6l => Ok("armv6l"),
            Arch::Other(name) => Err(PlatformError::UnsupportedArch(name.clone())),
        }
    }
}

/// Resolve a Linux distribution from `/etc/os-release`.
fn linux_family(os_release: &str) -> Family {
    let field = |key: &str| {
        os_release.lines().find_map(|line| {
            let (k, v) = line.split_once('=')?;
            (k.trim() == key).then(|| v.trim().trim_matches('"').to_string())
        })
    };

    match field("ID").as_deref() {
        Some("fedora") => Family::Fedora,
        Some("ubuntu") => Family::Ubuntu,
        id => Family::Unsupported {
            name: field("PRETTY_NAME")
                .or_else(|| id.map(String::from))
                .unwrap_or_else(|| "unknown Linux".to_string()),
            like: field("ID_LIKE")
                .map(|v| v.split_whitespace().map(String::from).collect())
                .unwrap_or_default(),
        },
    }
}

/// Machine name of the running host.
///
/// 32-bit ARM builds ask `uname -m` so `armv6l` and `armv7l` can be told apart.
fn machine_name() -> String {
    let arch = std::env::consts::ARCH;
    if arch == "arm"
        && let Ok(output) = std::process::Command::new("uname").arg("-m").output()
        && output.status.success()
    {
        return String::from_utf8_lossy(&output.stdout).trim().to_string();
    }
    arch.to_string()
}
