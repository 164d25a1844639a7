use std::cell::{Cell, RefCell};

use crate::{
    models::store::Store,
    storage::{Storage, StorageError},
};

/// Keeps the last saved store in memory. Used by tests and `--ephemeral`
/// runs; `fail_writes` simulates a store that has gone away.
#[derive(Default)]
pub struct MemoryStorage {
    saved: RefCell<Store>,
    failing: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryStorage {
    pub fn new(store: Store) -> Self {
        Self {
            saved: RefCell::new(store),
            ..Self::default()
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn fail_writes(&self, failing: bool) {
        self.failing.set(failing);
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Store, StorageError> {
        Ok(self.saved.borrow().clone())
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        if self.failing.get() {
            return Err(StorageError::Unavailable);
        }
        *self.saved.borrow_mut() = store.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
