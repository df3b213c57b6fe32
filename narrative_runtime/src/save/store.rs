//! Save slots on disk: one JSON file per slot plus a rolling autosave.

use std::fs;
use std::path::{Path, PathBuf};

use super::{SaveError, SaveId, SaveSnapshot};

const AUTOSAVE_FILE: &str = "autosave.json";

/// A directory of save files.
///
/// Reads never fail on bad data: an unreadable or outdated file is logged
/// and treated as absent.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrite the autosave slot.
    pub fn autosave(&self, snapshot: &SaveSnapshot) -> Result<(), SaveError> {
        self.write(&self.dir.join(AUTOSAVE_FILE), snapshot)
    }

    /// Write a named slot, keyed by the snapshot's id.
    pub fn save_slot(&self, snapshot: &SaveSnapshot) -> Result<(), SaveError> {
        self.write(&self.slot_path(&snapshot.id), snapshot)
    }

    pub fn load_autosave(&self) -> Option<SaveSnapshot> {
        read_snapshot(&self.dir.join(AUTOSAVE_FILE))
    }

    pub fn load(&self, id: &SaveId) -> Option<SaveSnapshot> {
        read_snapshot(&self.slot_path(id))
    }

    /// The most recent readable save, autosave included.
    pub fn load_last(&self) -> Option<SaveSnapshot> {
        self.list().into_iter().next()
    }

    /// Every readable save, newest first.
    pub fn list(&self) -> Vec<SaveSnapshot> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::debug!("No saves in {}: {}", self.dir.display(), err);
                return Vec::new();
            }
        };

        let mut saves: Vec<SaveSnapshot> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| read_snapshot(&path))
            .collect();

        saves.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        saves
    }

    /// Remove a slot. Returns whether a file was deleted.
    pub fn delete(&self, id: &SaveId) -> Result<bool, SaveError> {
        let path = self.slot_path(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    pub fn has_save(&self) -> bool {
        self.load_last().is_some()
    }

    fn slot_path(&self, id: &SaveId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn write(&self, path: &Path, snapshot: &SaveSnapshot) -> Result<(), SaveError> {
        fs::create_dir_all(&self.dir)?;
        snapshot.save_json(path)?;
        log::info!("Saved '{}' to {}", snapshot.name, path.display());
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Option<SaveSnapshot> {
    if !path.exists() {
        return None;
    }
    match SaveSnapshot::load_json(path) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            log::warn!("Ignoring unreadable save {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            Self(std::env::temp_dir().join(format!("bardo-saves-{}", Uuid::new_v4())))
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn snapshot(name: &str, saved_at: u64) -> SaveSnapshot {
        let mut snap = SaveSnapshot::new(name, "story", "{}", "text", Vec::new());
        snap.saved_at = saved_at;
        snap
    }

    #[test]
    fn test_empty_store() {
        let dir = TempDir::new();
        let store = SaveStore::new(&dir.0);

        assert!(!store.has_save());
        assert!(store.list().is_empty());
        assert!(store.load_last().is_none());
        assert!(store.load_autosave().is_none());
    }

    #[test]
    fn test_slots_and_autosave() {
        let dir = TempDir::new();
        let store = SaveStore::new(&dir.0);

        let slot = snapshot("Slot", 100);
        store.save_slot(&slot).unwrap();
        store.autosave(&snapshot("Auto", 200)).unwrap();

        assert_eq!(store.load(&slot.id), Some(slot.clone()));
        assert_eq!(store.load_autosave().unwrap().name, "Auto");

        let names: Vec<_> = store.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Auto", "Slot"]);
        assert_eq!(store.load_last().unwrap().name, "Auto");
    }

    #[test]
    fn test_autosave_overwrites() {
        let dir = TempDir::new();
        let store = SaveStore::new(&dir.0);

        store.autosave(&snapshot("First", 1)).unwrap();
        store.autosave(&snapshot("Second", 2)).unwrap();

        assert_eq!(store.list().len(), 1);
        assert_eq!(store.load_autosave().unwrap().name, "Second");
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new();
        let store = SaveStore::new(&dir.0);
        let slot = snapshot("Slot", 1);
        store.save_slot(&slot).unwrap();

        assert!(store.delete(&slot.id).unwrap());
        assert!(!store.delete(&slot.id).unwrap());
        assert!(store.load(&slot.id).is_none());
    }

    #[test]
    fn test_corrupt_file_reads_as_absent() {
        let dir = TempDir::new();
        let store = SaveStore::new(&dir.0);
        store.save_slot(&snapshot("Good", 1)).unwrap();
        fs::write(dir.0.join(AUTOSAVE_FILE), "{ broken").unwrap();

        assert!(store.load_autosave().is_none());
        let saves = store.list();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].name, "Good");
    }
}
