use dashmap::DashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A handle to a collection's read-write lock.
///
/// The handle owns an `Arc` to the lock, so it stays valid even if the
/// collection is dropped from the registry while the handle is alive.
#[derive(Clone)]
pub struct LockHandle {
    lock: Arc<RwLock<()>>,
}

impl LockHandle {
    /// Acquires shared access.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read()
    }

    /// Acquires exclusive access.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }
}

/// Registry of per-collection read-write locks.
///
/// Locks are created lazily, with compute-if-absent semantics, the first time a
/// collection name is seen and live until [LockRegistry::remove_lock] is called
/// for that name (on collection drop) or the registry is cleared (on close).
///
/// # Examples
///
/// ```
/// use lodedb::common::LockRegistry;
///
/// let registry = LockRegistry::new();
/// let lock = registry.get_lock("users");
/// {
///     let _shared = lock.read();
/// }
/// {
///     let _exclusive = lock.write();
/// }
/// assert_eq!(registry.lock_count(), 1);
/// ```
#[derive(Clone)]
pub struct LockRegistry {
    locks: Arc<DashMap<String, Arc<RwLock<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        LockRegistry {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Gets the lock for `name`, creating it if it doesn't exist yet.
    ///
    /// Two threads racing on the same unseen name always receive the same lock.
    pub fn get_lock(&self, name: &str) -> LockHandle {
        let lock = self
            .locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .value()
            .clone();
        LockHandle { lock }
    }

    /// Removes the lock for `name`.
    ///
    /// Returns `true` if a lock was registered under that name.
    pub fn remove_lock(&self, name: &str) -> bool {
        self.locks.remove(name).is_some()
    }

    /// Removes every lock.
    pub fn clear(&self) {
        self.locks.clear();
    }

    /// Returns the number of locks currently registered.
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
