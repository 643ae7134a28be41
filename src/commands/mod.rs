//! Subcommand implementations and their shared setup.
pub mod run;
pub mod steps;
pub mod verify;
pub mod version;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::steps::{Context, home_dir};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, home resolution and configuration
/// loading so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected host platform.
    pub platform: Platform,
    /// Loaded and validated configuration.
    pub config: Config,
    /// Home directory every step works in.
    pub home: PathBuf,
}

impl CommandSetup {
    /// Detect the platform, find the home directory and load configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// configuration file fails to parse.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let platform = Platform::detect();
        let home = home_dir()?;
        log.debug(&format!("platform: {} ({:?})", platform.family, platform.arch));
        let config = load_config(global, &home, log)?;
        Ok(Self {
            platform,
            config,
            home,
        })
    }

    /// Context over the real system for this setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn context(self, global: &GlobalOpts, log: Arc<Logger>) -> Result<Context> {
        Ok(Context::new(
            Arc::new(self.config),
            Arc::new(self.platform),
            log as Arc<dyn Log>,
            Arc::new(SystemExecutor),
            global.dry_run,
        )?
        .with_home(self.home))
    }
}

/// Load the configuration named by `--config`, or the user file, over the
/// embedded defaults, and print any validation warnings.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(global: &GlobalOpts, home: &Path, log: &dyn Log) -> Result<Config> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(home));
    log.stage("Loading configuration");
    let config = Config::load(&path)?;
    log.debug(&format!("configuration: {}", path.display()));
    log.info(&format!("loaded {} packages", config.packages.len()));

    let warnings = config.validate();
    if !warnings.is_empty() {
        log.warn(&format!(
            "found {} configuration warning(s):",
            warnings.len()
        ));
        for warning in &warnings {
            log.warn(&format!(
                "  {} [{}]: {}",
                warning.source, warning.item, warning.message
            ));
        }
    }
    Ok(config)
}
