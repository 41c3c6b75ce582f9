use crate::errors::StorageError;
use crate::models::CheckinStore;
use async_trait::async_trait;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{error, warn};

/// Whole-document persistence for the check-in store.
///
/// Every request loads the full document and, when mutating, saves it back.
/// Implementations do not coordinate concurrent writers.
#[async_trait]
pub trait CheckinStorage: Send + Sync {
    async fn load(&self) -> Result<CheckinStore, StorageError>;
    async fn save(&self, store: &CheckinStore) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and an empty document if the file is missing.
    pub async fn init(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::io(parent, err))?;
        }

        let exists = fs::try_exists(&self.path)
            .await
            .map_err(|err| StorageError::io(&self.path, err))?;
        if !exists {
            self.save(&CheckinStore::new()).await?;
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn write_then_rename(&self, temp: &Path, payload: &[u8]) -> Result<(), StorageError> {
        let mut file = fs::File::create(temp)
            .await
            .map_err(|err| StorageError::io(temp, err))?;
        file.write_all(payload)
            .await
            .map_err(|err| StorageError::io(temp, err))?;
        file.sync_all()
            .await
            .map_err(|err| StorageError::io(temp, err))?;
        drop(file);

        fs::rename(temp, &self.path)
            .await
            .map_err(|err| StorageError::io(&self.path, err))
    }
}

#[async_trait]
impl CheckinStorage for FileStorage {
    async fn load(&self) -> Result<CheckinStore, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(store) => Ok(store),
                // Not JSON, or JSON that is not an object.
                Err(err) => {
                    warn!(path = %self.path.display(), "ignoring unreadable check-in data: {err}");
                    Ok(CheckinStore::new())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(CheckinStore::new()),
            Err(err) => Err(StorageError::io(&self.path, err)),
        }
    }

    async fn save(&self, store: &CheckinStore) -> Result<(), StorageError> {
        let payload = serde_json::to_vec_pretty(store)?;
        let temp = self.temp_path();

        if let Err(err) = self.write_then_rename(&temp, &payload).await {
            error!(path = %self.path.display(), "failed to persist check-in data: {err}");
            if let Err(cleanup) = fs::remove_file(&temp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %temp.display(), "temporary file left behind: {cleanup}");
                }
            }
            return Err(err);
        }
        Ok(())
    }
}

/// Keeps the document in memory; failures can be switched on for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<CheckinStore>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(store: CheckinStore) -> Self {
        Self {
            data: Mutex::new(store),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> CheckinStore {
        self.data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CheckinStorage for MemoryStorage {
    async fn load(&self) -> Result<CheckinStore, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("read refused".to_string()));
        }
        Ok(self.snapshot())
    }

    async fn save(&self, store: &CheckinStore) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("write refused".to_string()));
        }
        *self
            .data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = store.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckinRecord;

    fn record(day: &str) -> CheckinRecord {
        CheckinRecord {
            date: day.to_string(),
            timestamp: 1_767_600_000_000,
            created_at: "2026-01-05T08:00:00.000000".to_string(),
            is_retroactive: None,
        }
    }

    fn store_with(days: &[&str]) -> CheckinStore {
        days.iter()
            .map(|day| (day.to_string(), record(day).to_value().unwrap()))
            .collect()
    }

    #[tokio::test]
    async fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkin_data.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_non_object_json_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkin_data.json");
        std::fs::write(&path, b"[1, 2, 3]").unwrap();

        let storage = FileStorage::new(&path);
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn loosely_shaped_records_survive_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkin_data.json");
        std::fs::write(
            &path,
            br#"{"1":{"date":"1","timestamp":1,"created_at":"a","note":"x"},"2":{"date":"2","timestamp":2}}"#,
        )
        .unwrap();
        let storage = FileStorage::new(&path);

        let mut store = storage.load().await.unwrap();
        assert_eq!(store.len(), 2);
        store.insert("3".to_string(), record("3").to_value().unwrap());
        storage.save(&store).await.unwrap();

        let reloaded = storage.load().await.unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded["1"]["note"], "x");
        assert_eq!(reloaded["2"], serde_json::json!({ "date": "2", "timestamp": 2 }));
    }

    #[tokio::test]
    async fn init_creates_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("checkin_data.json");
        let storage = FileStorage::new(&path);

        storage.init().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{}");
    }

    #[tokio::test]
    async fn init_keeps_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("checkin_data.json"));
        storage.save(&store_with(&["3"])).await.unwrap();

        storage.init().await.unwrap();

        assert!(storage.load().await.unwrap().contains_key("3"));
    }

    #[tokio::test]
    async fn save_writes_indented_json_and_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("checkin_data.json"));

        storage.save(&store_with(&["1", "2"])).await.unwrap();

        let contents = std::fs::read_to_string(storage.path()).unwrap();
        assert!(contents.contains("\n  \"1\": {"));
        assert!(!storage.temp_path().exists());
        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded, store_with(&["1", "2"]));
    }

    #[tokio::test]
    async fn failed_save_leaves_previous_file_intact() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("checkin_data.json"));
        storage.save(&store_with(&["1"])).await.unwrap();
        let before = std::fs::read(storage.path()).unwrap();

        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(storage.temp_path()).unwrap();
        let result = storage.save(&store_with(&["1", "2", "3"])).await;

        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert_eq!(std::fs::read(storage.path()).unwrap(), before);
        // Cleanup cannot unlink a directory; it is reported and left in place.
        assert!(storage.temp_path().is_dir());
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("checkin_data.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("occupied"), b"x").unwrap();
        let storage = FileStorage::new(&target);

        let result = storage.save(&store_with(&["1"])).await;

        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert!(!storage.temp_path().exists());
        assert!(target.join("occupied").exists());
    }

    #[tokio::test]
    async fn memory_storage_failure_switches() {
        let storage = MemoryStorage::with_data(store_with(&["5"]));
        storage.set_fail_writes(true);
        assert!(storage.save(&CheckinStore::new()).await.is_err());
        assert!(storage.snapshot().contains_key("5"));

        storage.set_fail_reads(true);
        assert!(storage.load().await.is_err());
    }
}
