use std::cell::{Cell, Ref, RefCell};

use thiserror::Error;

use crate::{
    models::store::Store,
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Another write is already in progress")]
    Conflict,
}

/// The committed store snapshot plus the backend it is persisted through.
///
/// Writes go through [`Database::write`], which applies the mutation to a
/// draft copy and only swaps it in once the backend accepted it, so readers
/// never observe a half-applied change. Every commit bumps [`revision`],
/// which is what views compare against to know they are stale.
///
/// [`revision`]: Database::revision
pub struct Database<S: Storage> {
    storage: S,
    committed: RefCell<Store>,
    revision: Cell<u64>,
    writing: Cell<bool>,
}

/// Marks a write as in progress for as long as it lives.
struct WriteGuard<'a> {
    writing: &'a Cell<bool>,
}

impl<'a> WriteGuard<'a> {
    fn acquire(writing: &'a Cell<bool>) -> Result<Self, WriteError> {
        if writing.replace(true) {
            return Err(WriteError::Conflict);
        }
        Ok(Self { writing })
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.writing.set(false);
    }
}

impl<S: Storage> Database<S> {
    pub fn open(storage: S) -> Result<Self, StorageError> {
        let store = storage.load()?;
        Ok(Self {
            storage,
            committed: RefCell::new(store),
            revision: Cell::new(0),
            writing: Cell::new(false),
        })
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    pub fn snapshot(&self) -> Ref<'_, Store> {
        self.committed.borrow()
    }

    pub fn read<T>(&self, reader: impl FnOnce(&Store) -> T) -> T {
        reader(&self.committed.borrow())
    }

    pub fn write<T>(&self, mutator: impl FnOnce(&mut Store) -> T) -> Result<T, WriteError> {
        let _guard = WriteGuard::acquire(&self.writing)?;

        let mut draft = self.committed.borrow().clone();
        let output = mutator(&mut draft);
        self.storage.save(&draft)?;

        *self.committed.borrow_mut() = draft;
        self.revision.set(self.revision.get() + 1);
        tracing::debug!(revision = self.revision.get(), "committed write");

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{
        models::category::Category,
        storage::memory::MemoryStorage,
    };

    fn work_category() -> Category {
        Category {
            name: String::from("Work"),
            slug: String::from("work"),
            ..Category::default()
        }
    }

    #[test]
    fn test_write_commits_and_bumps_revision() {
        let db = Database::open(MemoryStorage::default()).unwrap();
        assert_eq!(db.revision(), 0);

        db.write(|store| store.add_category(work_category())).unwrap();

        assert_eq!(db.revision(), 1);
        assert_eq!(db.read(|store| store.categories.len()), 1);
        assert_eq!(db.storage().load().unwrap().categories.len(), 1);
    }

    #[test]
    fn test_failed_write_leaves_snapshot_untouched() {
        let db = Database::open(MemoryStorage::default()).unwrap();
        db.storage().fail_writes(true);

        let result = db.write(|store| store.add_category(work_category()));

        assert!(matches!(
            result,
            Err(WriteError::Storage(StorageError::Unavailable))
        ));
        assert_eq!(db.revision(), 0);
        assert!(db.snapshot().categories.is_empty());

        db.storage().fail_writes(false);
        db.write(|store| store.add_category(work_category())).unwrap();
        assert_eq!(db.snapshot().categories.len(), 1);
    }

    #[test]
    fn test_nested_write_conflicts() {
        let db = Rc::new(Database::open(MemoryStorage::default()).unwrap());
        let inner_db = Rc::clone(&db);

        let inner = db
            .write(move |store| {
                store.add_category(work_category());
                inner_db.write(|store| store.categories.clear())
            })
            .unwrap();

        assert!(matches!(inner, Err(WriteError::Conflict)));
        assert_eq!(db.snapshot().categories.len(), 1);
        assert_eq!(db.revision(), 1);
    }
}
