//! Where the thread identity lives between sessions.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use sillage_model::ThreadId;

/// A key-value capability holding the current thread identity.
///
/// The engine only reads the current identity and replaces it wholesale,
/// it never needs to know how the identity is kept.
pub trait ThreadStore: Send + Sync {
    /// Reads the current identity, if one has been stored.
    fn get(&self) -> io::Result<Option<ThreadId>>;

    /// Replaces the current identity.
    fn set(&self, id: &ThreadId) -> io::Result<()>;
}

impl<T: ThreadStore + ?Sized> ThreadStore for Arc<T> {
    #[inline]
    fn get(&self) -> io::Result<Option<ThreadId>> {
        (**self).get()
    }

    #[inline]
    fn set(&self, id: &ThreadId) -> io::Result<()> {
        (**self).set(id)
    }
}

/// A store that keeps the identity in memory only.
#[derive(Debug, Default)]
pub struct MemoryThreadStore(Mutex<Option<ThreadId>>);

impl MemoryThreadStore {
    /// Creates a store already holding `id`.
    #[inline]
    pub fn with_thread_id(id: ThreadId) -> Self {
        Self(Mutex::new(Some(id)))
    }
}

impl ThreadStore for MemoryThreadStore {
    fn get(&self) -> io::Result<Option<ThreadId>> {
        let id = self.0.lock().map_err(|_| poisoned())?;
        Ok(id.clone())
    }

    fn set(&self, id: &ThreadId) -> io::Result<()> {
        let mut current = self.0.lock().map_err(|_| poisoned())?;
        *current = Some(id.clone());
        Ok(())
    }
}

/// A store that keeps the identity as a single line in a file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileThreadStore {
    path: PathBuf,
}

impl FileThreadStore {
    /// Creates a store backed by the file at `path`. The file and its
    /// parent directories are created on the first write.
    #[inline]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl ThreadStore for FileThreadStore {
    fn get(&self) -> io::Result<Option<ThreadId>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        let id = content.trim();
        if id.is_empty() {
            return Ok(None);
        }
        Ok(Some(ThreadId::from(id)))
    }

    fn set(&self, id: &ThreadId) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{id}\n"))
    }
}

#[inline]
fn poisoned() -> io::Error {
    io::Error::other("thread store lock is poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryThreadStore::default();
        assert_eq!(store.get().unwrap(), None);

        let id = ThreadId::generate();
        store.set(&id).unwrap();
        assert_eq!(store.get().unwrap(), Some(id));
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileThreadStore::new(dir.path().join("nested/thread_id"));
        assert_eq!(store.get().unwrap(), None);

        store.set(&ThreadId::from("T1")).unwrap();
        assert_eq!(store.get().unwrap(), Some(ThreadId::from("T1")));

        // Another store on the same file sees the replacement.
        let other = FileThreadStore::new(dir.path().join("nested/thread_id"));
        other.set(&ThreadId::from("T2")).unwrap();
        assert_eq!(store.get().unwrap(), Some(ThreadId::from("T2")));
    }

    #[test]
    fn test_blank_file_has_no_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thread_id");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(FileThreadStore::new(path).get().unwrap(), None);
    }
}
