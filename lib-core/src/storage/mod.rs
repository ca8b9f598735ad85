/// Storage implementation for a file system directory.
pub mod fs;

use std::{collections::BTreeMap, io, sync::RwLock};

use bytes::Bytes;

/// A backing store for outputs and the manifest.
///
/// Implementations must be safe to use from several worker threads at once.
pub trait Storage: Send + Sync {
    /// Writes an object, replacing any previous one with the same name.
    /// Readers must observe either the old or the new content, never a partial write.
    fn write(&self, name: &str, data: &[u8]) -> io::Result<()>;
    /// Reads an object. Returns `None` if it does not exist.
    fn read(&self, name: &str) -> io::Result<Option<Bytes>>;
    /// Checks if an object exists.
    fn exists(&self, name: &str) -> bool;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn write(&self, name: &str, data: &[u8]) -> io::Result<()> {
        (**self).write(name, data)
    }
    fn read(&self, name: &str) -> io::Result<Option<Bytes>> {
        (**self).read(name)
    }
    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }
}

/// An in-memory storage. Useful for tests and for embedding outputs in another build step.
#[derive(Default)]
pub struct MemoryStorage(RwLock<BTreeMap<Box<str>, Bytes>>);
impl MemoryStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a stored object, if present.
    /// # Panics
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.0.read().unwrap().get(name).cloned()
    }

    /// Removes a stored object and returns it, if present.
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn remove(&self, name: &str) -> Option<Bytes> {
        self.0.write().unwrap().remove(name)
    }

    /// Returns names of all stored objects in sorted order.
    /// # Panics
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn names(&self) -> Vec<Box<str>> {
        self.0.read().unwrap().keys().cloned().collect()
    }

    /// Returns the number of stored objects.
    /// # Panics
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().unwrap().len()
    }

    /// Checks if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl Storage for MemoryStorage {
    fn write(&self, name: &str, data: &[u8]) -> io::Result<()> {
        let mut m = self.0.write().map_err(|_| io::Error::other("storage lock poisoned"))?;
        m.insert(name.into(), Bytes::copy_from_slice(data));
        Ok(())
    }
    fn read(&self, name: &str) -> io::Result<Option<Bytes>> {
        let m = self.0.read().map_err(|_| io::Error::other("storage lock poisoned"))?;
        Ok(m.get(name).cloned())
    }
    fn exists(&self, name: &str) -> bool {
        self.0.read().is_ok_and(|m| m.contains_key(name))
    }
}
