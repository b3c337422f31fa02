//! Storage backends for encoded objects.
//!
//! The object store addresses encoded payloads by identity through the
//! [`Backend`] trait, so the backing medium can be a directory on disk,
//! an in-memory map for tests, or a remote blob service, without
//! touching hashing or tree-building logic.

use crate::error::Result;
use crate::ident::Identity;
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Persistence for encoded object payloads, addressed by identity.
pub trait Backend {
    /// Store `bytes` under `id` if no object is present there yet.
    ///
    /// Idempotent create: a repeated or concurrent write of the same
    /// object must succeed, never fail with "already exists".
    fn put(&self, id: &Identity, bytes: &[u8]) -> Result<()>;

    /// Read the payload stored under `id`, or `None` if absent.
    fn get(&self, id: &Identity) -> Result<Option<Vec<u8>>>;

    /// Whether an object is present under `id`.
    fn exists(&self, id: &Identity) -> Result<bool>;
}

/// A flat directory of object files, one per identity.
///
/// Each object is a single file named by its full 64-character hex
/// identity, directly inside the objects directory. Writes go through a
/// temporary file and an atomic rename, so a reader never observes a
/// partially written object.
#[derive(Debug)]
pub struct DirBackend {
    dir: PathBuf,
}

impl DirBackend {
    /// Open a backend over `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the object file for `id`.
    pub fn object_path(&self, id: &Identity) -> PathBuf {
        self.dir.join(id.to_hex())
    }
}

impl Backend for DirBackend {
    fn put(&self, id: &Identity, bytes: &[u8]) -> Result<()> {
        let path = self.object_path(id);
        if path.exists() {
            return Ok(());
        }

        // A racing writer that lands first is overwritten with identical
        // bytes; persist() replaces atomically either way.
        let mut temp_file = tempfile::NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(bytes)?;
        temp_file.flush()?;
        temp_file.persist(&path)?;

        log::debug!("wrote object {}", id);
        Ok(())
    }

    fn get(&self, id: &Identity) -> Result<Option<Vec<u8>>> {
        match fs::File::open(self.object_path(id)) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn exists(&self, id: &Identity) -> Result<bool> {
        Ok(self.object_path(id).exists())
    }
}

/// An in-memory backend for tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: Mutex<BTreeMap<Identity, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.locked().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked().is_empty()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, BTreeMap<Identity, Vec<u8>>> {
        self.objects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn put(&self, id: &Identity, bytes: &[u8]) -> Result<()> {
        self.locked().entry(*id).or_insert_with(|| bytes.to_vec());
        Ok(())
    }

    fn get(&self, id: &Identity) -> Result<Option<Vec<u8>>> {
        Ok(self.locked().get(id).cloned())
    }

    fn exists(&self, id: &Identity) -> Result<bool> {
        Ok(self.locked().contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn check_backend(backend: &dyn Backend) {
        let id = Identity::of(b"payload");

        assert!(!backend.exists(&id).unwrap());
        assert_eq!(backend.get(&id).unwrap(), None);

        backend.put(&id, b"payload").unwrap();
        assert!(backend.exists(&id).unwrap());
        assert_eq!(backend.get(&id).unwrap(), Some(b"payload".to_vec()));

        // Repeated put of the same object succeeds.
        backend.put(&id, b"payload").unwrap();
        assert_eq!(backend.get(&id).unwrap(), Some(b"payload".to_vec()));
    }

    #[test]
    fn test_dir_backend() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DirBackend::new(temp_dir.path().join("objects")).unwrap();
        check_backend(&backend);
    }

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new();
        check_backend(&backend);
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_dir_backend_flat_layout() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DirBackend::new(temp_dir.path().join("objects")).unwrap();

        let id = Identity::of(b"layout");
        backend.put(&id, b"bytes").unwrap();

        // One file per object, named by the full hex identity, no sharding.
        let path = backend.object_path(&id);
        assert!(path.exists());
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(id.to_hex().as_str())
        );
        let names: Vec<_> = fs::read_dir(temp_dir.path().join("objects"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_dir_backend_empty_payload() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DirBackend::new(temp_dir.path().join("objects")).unwrap();

        let id = Identity::of(b"");
        backend.put(&id, &[]).unwrap();
        assert!(backend.exists(&id).unwrap());
        assert_eq!(backend.get(&id).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_dir_backend_put_does_not_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DirBackend::new(temp_dir.path().join("objects")).unwrap();

        let id = Identity::of(b"stable");
        backend.put(&id, b"first").unwrap();
        // A second put under the same identity leaves the stored bytes alone.
        backend.put(&id, b"second").unwrap();
        assert_eq!(backend.get(&id).unwrap(), Some(b"first".to_vec()));
    }
}
