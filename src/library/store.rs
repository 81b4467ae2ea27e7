//! Book persistence.
//!
//! [`JsonBookStore`] keeps one pretty-printed JSON file per book:
//!
//! ```text
//! <books_dir>/
//!   book-1718000000-1.json
//!   book-1718000042-2.json
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::book::BookRecord;
use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("book record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Ids become file names, so only `[A-Za-z0-9_-]` is accepted.
    #[error("invalid book id {0:?}")]
    InvalidId(String),
}

// ---------------------------------------------------------------------------
// RecordStore trait
// ---------------------------------------------------------------------------

/// Keyed storage for [`BookRecord`]s.
pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when no record has this id.
    fn get(&self, id: &str) -> Result<Option<BookRecord>, StoreError>;

    /// Insert or replace by `record.id`.
    fn put(&self, record: &BookRecord) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Every record, oldest first.
    fn list(&self) -> Result<Vec<BookRecord>, StoreError>;
}

// Compile-time assertion: Box<dyn RecordStore> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn RecordStore>) {}
};

// ---------------------------------------------------------------------------
// JsonBookStore
// ---------------------------------------------------------------------------

/// Directory of `<id>.json` files.
#[derive(Debug, Clone)]
pub struct JsonBookStore {
    dir: PathBuf,
}

impl JsonBookStore {
    /// Store rooted at `dir`.  The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Self {
        Self::new(AppPaths::new().books_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    fn read(path: &Path) -> Result<BookRecord, StoreError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl RecordStore for JsonBookStore {
    fn get(&self, id: &str) -> Result<Option<BookRecord>, StoreError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn put(&self, record: &BookRecord) -> Result<(), StoreError> {
        let path = self.path_for(&record.id)?;
        std::fs::create_dir_all(&self.dir)?;
        let data = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, data)?;
        log::debug!("library: saved {} to {}", record.id, path.display());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<BookRecord>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match Self::read(&path) {
                    Ok(record) => records.push(record),
                    Err(e) => log::warn!("library: skipping {}: {e}", path.display()),
                }
            }
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ChunkingPolicy;
    use tempfile::tempdir;

    fn book(title: &str) -> BookRecord {
        BookRecord::ingest(title, "A short text. With two sentences.", ChunkingPolicy::default())
    }

    #[test]
    fn put_then_get() {
        let dir = tempdir().unwrap();
        let store = JsonBookStore::new(dir.path().join("books"));
        let record = book("First");

        store.put(&record).unwrap();
        assert_eq!(store.get(&record.id).unwrap(), Some(record));
    }

    #[test]
    fn get_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonBookStore::new(dir.path());
        assert_eq!(store.get("book-1-1").unwrap(), None);
    }

    #[test]
    fn put_replaces_existing() {
        let dir = tempdir().unwrap();
        let store = JsonBookStore::new(dir.path());
        let mut record = book("First");
        store.put(&record).unwrap();

        record.title = "Renamed".into();
        store.put(&record).unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.get(&record.id).unwrap().unwrap().title, "Renamed");
    }

    #[test]
    fn delete_reports_removal() {
        let dir = tempdir().unwrap();
        let store = JsonBookStore::new(dir.path());
        let record = book("Gone");
        store.put(&record).unwrap();

        assert!(store.delete(&record.id).unwrap());
        assert!(!store.delete(&record.id).unwrap());
        assert_eq!(store.get(&record.id).unwrap(), None);
    }

    #[test]
    fn list_is_ordered_and_skips_foreign_files() {
        let dir = tempdir().unwrap();
        let store = JsonBookStore::new(dir.path());
        let mut older = book("Older");
        older.created_at = 10;
        let mut newer = book("Newer");
        newer.created_at = 20;
        store.put(&newer).unwrap();
        store.put(&older).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();

        let titles: Vec<_> = store.list().unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Older", "Newer"]);
    }

    #[test]
    fn list_of_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonBookStore::new(dir.path().join("nope"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn rejects_path_like_ids() {
        let dir = tempdir().unwrap();
        let store = JsonBookStore::new(dir.path());
        assert!(matches!(store.get("../etc"), Err(StoreError::InvalidId(_))));
        assert!(matches!(store.delete(""), Err(StoreError::InvalidId(_))));
    }

    #[test]
    fn usable_as_trait_object() {
        let dir = tempdir().unwrap();
        let store: Box<dyn RecordStore> = Box::new(JsonBookStore::new(dir.path()));
        let record = book("Boxed");
        store.put(&record).unwrap();
        assert_eq!(store.list().unwrap(), vec![record]);
    }
}
