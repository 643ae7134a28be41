//! TOML configuration loading with section-level overrides.
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ConfigError;

/// Parse a TOML file into a table. A missing file yields an empty table.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, and
/// [`ConfigError::Parse`] if it is not valid TOML.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    if !path.exists() {
        return Ok(toml::Table::new());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_table(&content, &path.display().to_string())
}

/// Parse TOML text into a table; `origin` names the source in errors.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if `content` is not valid TOML.
pub fn parse_table(content: &str, origin: &str) -> Result<toml::Table, ConfigError> {
    content.parse::<toml::Table>().map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })
}

/// Replace every top-level section of `base` that `overrides` defines.
#[must_use]
pub fn overlay(mut base: toml::Table, overrides: toml::Table) -> toml::Table {
    for (key, value) in overrides {
        base.insert(key, value);
    }
    base
}

/// Deserialize a merged table into the target type.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the table does not match `T`.
pub fn deserialize<T: DeserializeOwned>(
    table: toml::Table,
    origin: &str,
) -> Result<T, ConfigError> {
    toml::Value::Table(table).try_into().map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })
}
