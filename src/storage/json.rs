use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    models::store::{CURRENT_VERSION, Store},
    storage::{
        Storage, StorageError,
        migrations::{apply_migrations, detect_version},
    },
};

/// How many previous copies of the store are kept in `backups/`.
const MAX_BACKUPS: usize = 5;

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn backup_dir(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or(Path::new("."))
            .join("backups")
    }

    fn lock(&self) -> Result<File, StorageError> {
        let lock_path = self.path.with_extension("lock");
        let save_failed = |source| StorageError::SaveFailed {
            path: lock_path.clone(),
            source,
        };
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(save_failed)?;
        lock_file.lock_exclusive().map_err(save_failed)?;
        Ok(lock_file)
    }

    /// Copies the current store file aside before it gets replaced. Nothing
    /// to do on the very first save.
    fn back_up_current(&self) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }

        let backup_dir = self.backup_dir();
        let backup_failed = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StorageError::BackupFailed { path, source }
        };
        fs::create_dir_all(&backup_dir).map_err(backup_failed(&backup_dir))?;

        // Zero-padded nanoseconds keep lexical order equal to age order.
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("store");
        let stamp = jiff::Timestamp::now().as_nanosecond();
        let backup_path = backup_dir.join(format!("{stem}-{stamp:020}.json"));
        fs::copy(&self.path, &backup_path).map_err(backup_failed(&backup_path))?;

        self.prune_backups()
            .map_err(backup_failed(&backup_dir))
    }

    fn prune_backups(&self) -> io::Result<()> {
        let mut backups = fs::read_dir(self.backup_dir())?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();
        backups.sort();

        let excess = backups.len().saturating_sub(MAX_BACKUPS);
        for stale in &backups[..excess] {
            fs::remove_file(stale)?;
        }
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Store, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Store::default()),
            Err(e) => {
                return Err(StorageError::LoadFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let parse_failed = |source| StorageError::ParseFailed {
            path: self.path.clone(),
            source,
        };

        let mut document: Value = serde_json::from_str(&content).map_err(parse_failed)?;
        let file_version = detect_version(&document)?;
        if file_version > CURRENT_VERSION {
            return Err(StorageError::FutureVersion(file_version));
        }
        if file_version < CURRENT_VERSION {
            tracing::info!(
                from = file_version,
                to = CURRENT_VERSION,
                "migrating store document"
            );
            document = apply_migrations(document, file_version, CURRENT_VERSION)?;
        }
        if let Some(fields) = document.as_object_mut() {
            fields.insert("version".to_string(), Value::from(CURRENT_VERSION));
        }

        serde_json::from_value(document).map_err(parse_failed)
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(store)
            .map_err(|source| StorageError::SerializeFailed { source })?;

        let temp_path = PathBuf::from(format!("{}.tmp.{}", self.path.display(), Uuid::new_v4()));
        fs::write(&temp_path, json).map_err(|source| StorageError::SaveFailed {
            path: temp_path.clone(),
            source,
        })?;

        let lock_file = self.lock()?;
        let committed = self.back_up_current().and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|source| StorageError::SaveFailed {
                path: self.path.clone(),
                source,
            })
        });
        if committed.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        FileExt::unlock(&lock_file).map_err(|source| StorageError::SaveFailed {
            path: self.path.clone(),
            source,
        })?;

        committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{category::Category, item::Item};

    fn backup_count(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .count()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));

        let mut item = Item::new("Buy milk").unwrap();
        item.is_done = true;
        let category = Category {
            name: String::from("Groceries"),
            slug: String::from("groceries"),
            color: Some(String::from("green")),
            items: vec![item],
            ..Category::default()
        };
        let store = Store {
            version: CURRENT_VERSION,
            categories: vec![category],
        };

        storage.save(&store).unwrap();
        let loaded = storage.load().unwrap();

        assert_eq!(loaded.categories.len(), 1);
        assert_eq!(loaded.categories[0].id, store.categories[0].id);
        assert_eq!(loaded.categories[0].color.as_deref(), Some("green"));
        assert_eq!(loaded.categories[0].items, store.categories[0].items);
    }

    #[test]
    fn test_load_missing_file_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("absent.json"));
        let store = storage.load().unwrap();
        assert_eq!(store.version, CURRENT_VERSION);
        assert!(store.categories.is_empty());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let result = JsonFileStorage::new(path).load();
        assert!(matches!(result, Err(StorageError::ParseFailed { .. })));
    }

    #[test]
    fn test_load_without_version_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{ "categories": [] }"#).unwrap();

        let store = JsonFileStorage::new(path).load().unwrap();
        assert_eq!(store.version, CURRENT_VERSION);
    }

    #[test]
    fn test_load_version_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{ "version": 0, "categories": [] }"#).unwrap();

        let result = JsonFileStorage::new(path).load();
        assert!(matches!(result, Err(StorageError::InvalidVersion)));
    }

    #[test]
    fn test_load_future_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{ "version": 999, "categories": [] }"#).unwrap();

        let result = JsonFileStorage::new(path).load();
        assert!(matches!(result, Err(StorageError::FutureVersion(999))));
    }

    #[test]
    fn test_backups_are_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        let backups = dir.path().join("backups");

        storage.save(&Store::default()).unwrap();
        assert!(!backups.exists(), "first save has nothing to back up");

        for _ in 0..7 {
            storage.save(&Store::default()).unwrap();
        }

        assert_eq!(backup_count(&backups), MAX_BACKUPS);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        storage.save(&Store::default()).unwrap();

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }
}
