use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted container with read-write locking.
///
/// Every chunk in the world lives in an `MtResource<Chunk>`. The owning thread
/// edits chunks through `get_mut()`, while the mesh scheduler copies the chunks
/// of a vicinity through short `get()` calls and hands the copy to a worker.
///
/// # Examples
///
/// ```
/// use voxel_engine_core::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let shared = counter.clone();
///
/// std::thread::spawn(move || *shared.get_mut() += 1)
///     .join()
///     .unwrap();
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// A writer that panicked while holding the lock does not poison the resource
/// for everyone else: chunk runs are always left valid between statements, so
/// the guard is recovered instead.
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a guard that allows reading the contained value.
    ///
    /// Multiple readers may hold guards at once.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns an exclusive guard that allows modifying the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` under a read lock and returns its result, releasing the lock
    /// before returning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.get())
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
