use super::types::TaskList;
use crate::shared::errors::StorageError;
use crate::shared::paths::ensure_dir;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Key the list collection is stored under.
pub const STORAGE_KEY: &str = "taskflow-lists";

// ============================================================================
// Byte Stores
// ============================================================================

/// Minimal key-value byte store the snapshot is mirrored into.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(&path)?))
    }

    /// Writes to a sibling temp file and renames it into place, so readers
    /// only ever see a complete snapshot.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        ensure_dir(&self.dir)
            .map_err(|e| StorageError::directory(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp_path, value)?;
        std::fs::rename(&tmp_path, &path)?;

        tracing::trace!(
            target: "tasks::storage",
            path = %path.display(),
            bytes = value.len(),
            "Snapshot written"
        );
        Ok(())
    }
}

/// In-process byte store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, StorageError> {
        self.entries.lock().map_err(|e| {
            StorageError::ReadError(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

// ============================================================================
// Persistence Port
// ============================================================================

/// Loads and saves full snapshots of the list collection.
pub trait ListsPersistence: Send + Sync {
    /// `None` when nothing was saved yet; a saved empty collection is
    /// `Some(vec![])`.
    fn load_snapshot(&self) -> Result<Option<Vec<TaskList>>, StorageError>;

    fn save(&self, lists: &[TaskList]) -> Result<(), StorageError>;

    /// Returns an empty collection when nothing was saved yet.
    fn load(&self) -> Result<Vec<TaskList>, StorageError> {
        Ok(self.load_snapshot()?.unwrap_or_default())
    }
}

/// JSON snapshot of the collection under [`STORAGE_KEY`].
#[derive(Debug, Clone)]
pub struct KeyValuePersistence<S> {
    store: S,
}

impl<S: KeyValueStore> KeyValuePersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl KeyValuePersistence<FileKeyValueStore> {
    /// Snapshot file inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileKeyValueStore::new(dir))
    }
}

impl<S: KeyValueStore> ListsPersistence for KeyValuePersistence<S> {
    fn load_snapshot(&self) -> Result<Option<Vec<TaskList>>, StorageError> {
        let Some(bytes) = self.store.get(STORAGE_KEY)? else {
            tracing::debug!(target: "tasks::storage", "No stored lists found");
            return Ok(None);
        };

        let mut lists: Vec<TaskList> = serde_json::from_slice(&bytes)?;
        let repaired = repair_list_ids(&mut lists);
        if repaired > 0 {
            tracing::warn!(
                target: "tasks::storage",
                repaired = repaired,
                "Stored tasks disagreed with their owning list, listId fixed"
            );
        }

        tracing::debug!(target: "tasks::storage", lists = lists.len(), "Lists loaded");
        Ok(Some(lists))
    }

    fn save(&self, lists: &[TaskList]) -> Result<(), StorageError> {
        let content = serde_json::to_vec(lists)?;
        self.store.set(STORAGE_KEY, &content)
    }
}

/// Membership in `tasks` wins over a stale `list_id`. Returns how many
/// tasks were fixed.
fn repair_list_ids(lists: &mut [TaskList]) -> usize {
    let mut repaired = 0;
    for list in lists.iter_mut() {
        for task in &mut list.tasks {
            if task.list_id != list.id {
                task.list_id = list.id.clone();
                repaired += 1;
            }
        }
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::tasks::types::{Priority, Task};
    use chrono::NaiveDate;

    fn sample_lists() -> Vec<TaskList> {
        vec![
            TaskList {
                id: "l1".into(),
                name: "My Tasks".into(),
                tasks: vec![Task {
                    id: "t1".into(),
                    title: "Buy milk".into(),
                    description: Some("2 litres".into()),
                    due_date: NaiveDate::from_ymd_opt(2024, 12, 31),
                    completed: true,
                    priority: Priority::Low,
                    tags: vec![],
                    list_id: "l1".into(),
                }],
            },
            TaskList {
                id: "l2".into(),
                name: "Empty".into(),
                tasks: vec![],
            },
        ]
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let persistence = KeyValuePersistence::new(MemoryKeyValueStore::new());
        assert!(persistence.load().unwrap().is_empty());
        assert_eq!(persistence.load_snapshot().unwrap(), None);
    }

    #[test]
    fn test_saved_empty_collection_is_distinct_from_missing() {
        let persistence = KeyValuePersistence::new(MemoryKeyValueStore::new());
        persistence.save(&[]).unwrap();
        assert_eq!(persistence.load_snapshot().unwrap(), Some(vec![]));
    }

    #[test]
    fn test_memory_round_trip() {
        let persistence = KeyValuePersistence::new(MemoryKeyValueStore::new());
        let lists = sample_lists();
        persistence.save(&lists).unwrap();
        assert_eq!(persistence.load().unwrap(), lists);
    }

    #[test]
    fn test_snapshot_layout() {
        let store = MemoryKeyValueStore::new();
        let persistence = KeyValuePersistence::new(store.clone());
        persistence.save(&sample_lists()).unwrap();

        let bytes = store.get(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let task = &value[0]["tasks"][0];
        assert_eq!(task["listId"], "l1");
        assert_eq!(task["dueDate"], "2024-12-31");
        assert_eq!(task["priority"], "low");
        assert_eq!(task["tags"], serde_json::json!([]));
    }

    #[test]
    fn test_file_round_trip_and_no_temp_left() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        let persistence = KeyValuePersistence::in_dir(&dir);

        assert!(persistence.load().unwrap().is_empty());

        let lists = sample_lists();
        persistence.save(&lists).unwrap();
        assert_eq!(persistence.load().unwrap(), lists);

        let names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["taskflow-lists.json"]);
    }

    #[test]
    fn test_corrupt_snapshot_is_parse_error() {
        let store = MemoryKeyValueStore::new();
        store.set(STORAGE_KEY, b"{not json").unwrap();
        let persistence = KeyValuePersistence::new(store);
        assert!(matches!(persistence.load(), Err(StorageError::ParseError(_))));
    }

    #[test]
    fn test_load_repairs_stale_list_id() {
        let store = MemoryKeyValueStore::new();
        let mut lists = sample_lists();
        lists[0].tasks[0].list_id = "stale".into();
        store
            .set(STORAGE_KEY, &serde_json::to_vec(&lists).unwrap())
            .unwrap();

        let loaded = KeyValuePersistence::new(store).load().unwrap();
        assert_eq!(loaded[0].tasks[0].list_id, "l1");
    }

    #[test]
    fn test_reads_snapshot_without_optional_fields() {
        let store = MemoryKeyValueStore::new();
        store
            .set(
                STORAGE_KEY,
                br#"[{"id":"l1","name":"Inbox","tasks":[{"id":"t1","title":"x","listId":"l1"}]}]"#,
            )
            .unwrap();

        let loaded = KeyValuePersistence::new(store).load().unwrap();
        let task = &loaded[0].tasks[0];
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
        assert!(task.tags.is_empty());
        assert_eq!(task.due_date, None);
    }
}
