//! One field inside a JSON settings document.
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde_json::{Map, Value};

use super::{Resource, ResourceChange, ResourceState};
use crate::error::ActionError;
use crate::operations::FileSystemOps;

/// Sets `key_path` (dotted, e.g. `profiles.defaults.font.face`) to `value`
/// in the JSON document at `path`, creating intermediate objects.
///
/// A missing document is `Invalid`: the application that owns it is not
/// installed, so there is nothing to configure.
#[derive(Debug)]
pub struct JsonSettings<'a> {
    /// Settings document.
    pub path: PathBuf,
    /// Dotted key to set.
    pub key_path: String,
    /// Value stored at `key_path`.
    pub value: Value,
    fs_ops: &'a dyn FileSystemOps,
}

impl<'a> JsonSettings<'a> {
    /// Set `key_path` to `value` in the document at `path`.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        key_path: &str,
        value: impl Into<Value>,
        fs_ops: &'a dyn FileSystemOps,
    ) -> Self {
        Self {
            path: path.into(),
            key_path: key_path.to_string(),
            value: value.into(),
            fs_ops,
        }
    }

    fn segments(&self) -> Vec<&str> {
        self.key_path.split('.').collect()
    }

    fn load(&self) -> Result<Option<Value>> {
        let Some(text) = self.fs_ops.read_text(&self.path)? else {
            return Ok(None);
        };
        let doc = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(doc))
    }
}

/// Value at `segments` under `doc`, if every step exists.
#[must_use]
pub fn get_path<'v>(doc: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    segments.iter().try_fold(doc, |node, key| node.get(key))
}

/// Set `segments` under `doc` to `value`, creating missing objects.
///
/// # Errors
///
/// Returns [`ActionError::SettingsShape`] if a step of the path exists but
/// is not an object.
pub fn set_path(doc: &mut Value, segments: &[&str], value: Value) -> Result<(), ActionError> {
    let shape = |reason: String| ActionError::SettingsShape {
        key_path: segments.join("."),
        reason,
    };
    let Some((last, parents)) = segments.split_last() else {
        return Err(shape("empty key path".to_string()));
    };
    let mut node = doc;
    for key in parents {
        let obj = node
            .as_object_mut()
            .ok_or_else(|| shape(format!("parent of '{key}' is not an object")))?;
        node = obj
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let obj = node
        .as_object_mut()
        .ok_or_else(|| shape(format!("parent of '{last}' is not an object")))?;
    obj.insert((*last).to_string(), value);
    Ok(())
}

impl Resource for JsonSettings<'_> {
    fn description(&self) -> String {
        format!("{} in {}", self.key_path, self.path.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        let Some(doc) = self.load()? else {
            return Ok(ResourceState::Invalid {
                reason: format!("{} not found", self.path.display()),
            });
        };
        Ok(match get_path(&doc, &self.segments()) {
            None => ResourceState::Missing,
            Some(v) if *v == self.value => ResourceState::Correct,
            Some(v) => ResourceState::Incorrect {
                current: v.to_string(),
            },
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        let mut doc = self
            .load()?
            .unwrap_or_else(|| Value::Object(Map::new()));
        set_path(&mut doc, &self.segments(), self.value.clone())?;
        let mut text = serde_json::to_string_pretty(&doc)?;
        text.push('\n');
        self.fs_ops.write_text(&self.path, &text)?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::MockFileSystemOps;
    use serde_json::json;
    use std::path::Path;

    const SETTINGS: &str = "/home/test/settings.json";
    const KEY: &str = "profiles.defaults.font.face";

    #[test]
    fn set_path_creates_intermediate_objects() {
        let mut doc = json!({"profiles": {"list": []}});
        set_path(&mut doc, &["profiles", "defaults", "font", "face"], json!("Meslo")).unwrap();
        assert_eq!(doc["profiles"]["defaults"]["font"]["face"], "Meslo");
        assert_eq!(doc["profiles"]["list"], json!([]));
    }

    #[test]
    fn set_path_rejects_non_object_parent() {
        let mut doc = json!({"profiles": []});
        let err = set_path(&mut doc, &["profiles", "defaults"], json!(1)).unwrap_err();
        assert!(err.to_string().contains("profiles.defaults"));
    }

    #[test]
    fn get_path_walks_objects() {
        let doc = json!({"a": {"b": 2}});
        assert_eq!(get_path(&doc, &["a", "b"]), Some(&json!(2)));
        assert_eq!(get_path(&doc, &["a", "c"]), None);
    }

    #[test]
    fn missing_document_is_invalid() {
        let fs = MockFileSystemOps::new();
        let s = JsonSettings::new(SETTINGS, KEY, "Meslo", &fs);
        assert!(matches!(
            s.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn state_tracks_current_value() {
        let fs = MockFileSystemOps::new()
            .with_file(SETTINGS, r#"{"profiles":{"defaults":{"font":{"face":"Cascadia"}}}}"#);
        let s = JsonSettings::new(SETTINGS, KEY, "Meslo", &fs);
        assert_eq!(
            s.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "\"Cascadia\"".to_string()
            }
        );
        s.apply().unwrap();
        assert_eq!(s.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn apply_keeps_unrelated_fields() {
        let fs = MockFileSystemOps::new().with_file(SETTINGS, r#"{"theme":"dark"}"#);
        let s = JsonSettings::new(SETTINGS, KEY, "Meslo", &fs);
        s.apply().unwrap();
        let doc: Value = serde_json::from_str(&fs.content(Path::new(SETTINGS)).unwrap()).unwrap();
        assert_eq!(doc["theme"], "dark");
        assert_eq!(doc["profiles"]["defaults"]["font"]["face"], "Meslo");
    }

    #[test]
    fn malformed_document_is_error() {
        let fs = MockFileSystemOps::new().with_file(SETTINGS, "{ not json");
        let s = JsonSettings::new(SETTINGS, KEY, "Meslo", &fs);
        assert!(s.current_state().is_err());
    }
}
