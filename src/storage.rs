//! Local key-value persistence. The document lives under a single fixed key.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::StorageError;

/// Key the document is stored under
pub const CONTENT_KEY: &str = "content";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// A JSON object file. Read once when opened, rewritten on every write.
pub struct LocalStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(target: "storage", path = %path.display(), error = %e, "ignoring unreadable store");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                tracing::warn!(target: "storage", path = %path.display(), error = %e, "store read failed");
                Map::new()
            }
        };
        Self { path, entries }
    }

    /// Data directory used when no path is given on the command line
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("quill"))
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::data_dir().map(|p| p.join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_out(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string(&self.entries)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        self.write_out()
    }
}

/// In-memory store that records every write
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: Map<String, Value>,
    pub writes: Vec<(String, Value)>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with(key: &str, value: Value) -> Self {
        let mut entries = Map::new();
        entries.insert(key.to_string(), value);
        Self {
            entries,
            writes: Vec::new(),
        }
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.writes.push((key.to_string(), value.clone()));
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("storage.json"));
        assert!(store.get(CONTENT_KEY).is_none());
    }

    #[test]
    fn set_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        let mut store = LocalStore::open(&path);
        store.set(CONTENT_KEY, json!({"type": "doc"})).unwrap();

        let reopened = LocalStore::open(&path);
        assert_eq!(reopened.get(CONTENT_KEY), Some(json!({"type": "doc"})));
    }

    #[test]
    fn last_write_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut store = LocalStore::open(&path);
        store.set(CONTENT_KEY, json!(1)).unwrap();
        store.set(CONTENT_KEY, json!(2)).unwrap();
        assert_eq!(LocalStore::open(&path).get(CONTENT_KEY), Some(json!(2)));
    }

    #[test]
    fn corrupt_file_reads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = LocalStore::open(&path);
        assert!(store.get(CONTENT_KEY).is_none());
    }

    #[test]
    fn other_keys_are_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"other": true}"#).unwrap();
        let mut store = LocalStore::open(&path);
        store.set(CONTENT_KEY, json!("x")).unwrap();
        let reopened = LocalStore::open(&path);
        assert_eq!(reopened.get("other"), Some(json!(true)));
        assert_eq!(reopened.get(CONTENT_KEY), Some(json!("x")));
    }
}
