use anyhow::Context;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Slot holding the editor's saved draft.
pub const SAVED_TEXT_KEY: &str = "savedText";

/// String slots persisted as one JSON object on disk.
#[derive(Debug, Clone)]
pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_slots()?.remove(key))
    }

    /// Writes one slot, keeping the others.
    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut slots = self.read_slots()?;
        slots.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&slots).context("failed to serialize notes")?;
        fs::write(&self.path, content)
            .context(format!("failed to write notes to {}", self.path.display()))?;
        debug!("[Editor] Saved slot '{}' to {}", key, self.path.display());
        Ok(())
    }

    fn read_slots(&self) -> anyhow::Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content)
                .context(format!("{} is not a valid notes file", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => {
                Err(e).context(format!("failed to read notes from {}", self.path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn temp_store() -> (TempDir, NoteStore) {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes").join("notes.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_reads_empty() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get(SAVED_TEXT_KEY).unwrap(), None);
    }

    #[test]
    fn set_then_get_keeps_other_slots() {
        let (_dir, store) = temp_store();
        store.set("other", "keep me").unwrap();
        store.set(SAVED_TEXT_KEY, "<p>draft</p>").unwrap();
        store.set(SAVED_TEXT_KEY, "<p>draft v2</p>").unwrap();

        assert_eq!(store.get(SAVED_TEXT_KEY).unwrap().as_deref(), Some("<p>draft v2</p>"));
        assert_eq!(store.get("other").unwrap().as_deref(), Some("keep me"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.json"));
        fs::write(store.path(), "not json").unwrap();
        assert!(store.get(SAVED_TEXT_KEY).is_err());
    }
}
