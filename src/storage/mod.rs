use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use thiserror::Error;

use crate::env;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("unable to access preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to encode preferences: {0}")]
    Json(#[from] serde_json::Error),
}

/// Process-wide named store backed by a flat JSON object on disk.
///
/// Values live in memory once loaded; every `set` rewrites the file so a
/// restart sees the last written value.
#[derive(Clone, Debug)]
pub struct Preferences {
    path: PathBuf,
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl Preferences {
    /// Open the store in the default per-user location.
    pub fn open_default() -> Self {
        // Best-effort directory creation; failures are surfaced on write.
        if let Err(err) = env::ensure_app_dir() {
            warn!("preferences: unable to create app dir: {err}");
        }
        Self::open(env::preferences_path())
    }

    /// Open the store at `path`. A missing or unreadable file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = read_values(&path);
        debug!(
            "preferences: loaded {} value(s) from {}",
            values.len(),
            path.display()
        );
        Self {
            path,
            values: Arc::new(Mutex::new(values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        let snapshot = {
            let mut values = self.lock();
            values.insert(key.to_owned(), value.to_owned());
            values.clone()
        };
        write_values(&self.path, &snapshot)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map of strings.
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_values(path: &Path) -> BTreeMap<String, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return BTreeMap::new(),
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!(
            "preferences: ignoring malformed {} ({err})",
            path.display()
        );
        BTreeMap::new()
    })
}

fn write_values(path: &Path, values: &BTreeMap<String, String>) -> Result<(), PrefsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| PrefsError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let encoded = serde_json::to_string_pretty(values)?;
    fs::write(path, encoded.as_bytes()).map_err(|source| PrefsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::open(dir.path().join("preferences.json"));
        assert_eq!(prefs.get("locale"), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let prefs = Preferences::open(&path);
        prefs.set("locale", "fa").unwrap();
        prefs.set("locale", "en").unwrap();

        let reopened = Preferences::open(&path);
        assert_eq!(reopened.get("locale").as_deref(), Some("en"));
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();

        let prefs = Preferences::open(&path);
        assert_eq!(prefs.get("locale"), None);
        prefs.set("locale", "fa").unwrap();
        assert_eq!(Preferences::open(&path).get("locale").as_deref(), Some("fa"));
    }
}
