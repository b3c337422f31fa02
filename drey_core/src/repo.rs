//! Repository layout and lifecycle.
//!
//! A repository is a work tree with a metadata folder:
//!
//! ```text
//! <root>/
//!   .drey/
//!     config    key=value: format version and hash algorithm
//!     index     staging index ledger
//!     objects/  one file per object, named by identity
//! ```
//!
//! The repository guarantees this layout exists before any core
//! operation runs; the object store and staging index are handed their
//! locations through [`Repository::objects`] and [`Repository::index`].

use crate::backend::DirBackend;
use crate::error::{Error, Result};
use crate::ident::Algorithm;
use crate::index::StagingIndex;
use crate::store::ObjectStore;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the metadata folder inside the work tree.
pub const META_DIR: &str = ".drey";

/// An on-disk repository: a work tree plus the `.drey` metadata folder.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    algorithm: Algorithm,
}

impl Repository {
    /// Initialize a repository at `root`, creating the work tree folder,
    /// the metadata folder, an empty staging index, and the config file.
    ///
    /// Initializing where a repository already exists opens it instead;
    /// the existing index and objects are left untouched.
    pub fn init<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if Self::is_repository(&root) {
            log::info!("repository already exists at {}", root.display());
            return Self::open(root);
        }

        let meta = root.join(META_DIR);
        fs::create_dir_all(meta.join("objects"))?;

        let config_content = format!("version=1\nalgo={}\n", Algorithm::Blake3.as_str());
        fs::write(meta.join("config"), config_content)?;

        StagingIndex::open(meta.join("index"))?;

        log::info!("initialized repository at {}", root.display());
        Ok(Self {
            root,
            algorithm: Algorithm::Blake3,
        })
    }

    /// Open an existing repository at `root`.
    ///
    /// Validates the metadata layout and reads the configuration.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let meta = root.join(META_DIR);

        if !root.is_dir() {
            return Err(Error::invalid_argument(format!(
                "not a repository: {} does not exist",
                root.display()
            )));
        }

        let config_path = meta.join("config");
        if !config_path.is_file() {
            return Err(Error::invalid_argument(format!(
                "not a repository: {} has no config file",
                root.display()
            )));
        }

        let config_content = fs::read_to_string(&config_path)?;
        let algorithm = Self::parse_config(&config_content)?;

        if !meta.join("objects").is_dir() {
            return Err(Error::invalid_argument(format!(
                "not a repository: {} has no objects directory",
                root.display()
            )));
        }
        if !meta.join("index").is_file() {
            return Err(Error::invalid_argument(format!(
                "not a repository: {} has no index file",
                root.display()
            )));
        }

        Ok(Self { root, algorithm })
    }

    /// Whether `root` holds a complete repository layout.
    pub fn is_repository(root: &Path) -> bool {
        let meta = root.join(META_DIR);
        meta.join("config").is_file()
            && meta.join("index").is_file()
            && meta.join("objects").is_dir()
    }

    /// Parse the config file to extract the algorithm.
    fn parse_config(content: &str) -> Result<Algorithm> {
        let mut version = None;
        let mut algo = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                match key.trim() {
                    "version" => version = Some(value.trim()),
                    "algo" => algo = Some(value.trim()),
                    _ => {}
                }
            }
        }

        if version != Some("1") {
            return Err(Error::invalid_argument(format!(
                "Unsupported config version: {:?}",
                version
            )));
        }

        let algo_str =
            algo.ok_or_else(|| Error::invalid_argument("Missing algo in config"))?;
        Algorithm::parse(algo_str)
    }

    /// Delete the whole repository: work tree, metadata, objects, index.
    pub fn destroy(self) -> Result<()> {
        fs::remove_dir_all(&self.root)?;
        log::info!("destroyed repository at {}", self.root.display());
        Ok(())
    }

    /// The work tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configured hash algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Path of the objects directory.
    pub fn objects_dir(&self) -> PathBuf {
        self.root.join(META_DIR).join("objects")
    }

    /// Path of the staging index file.
    pub fn index_path(&self) -> PathBuf {
        self.root.join(META_DIR).join("index")
    }

    /// An object store over this repository's objects directory.
    pub fn objects(&self) -> Result<ObjectStore<DirBackend>> {
        Ok(ObjectStore::new(DirBackend::new(self.objects_dir())?))
    }

    /// The staging index of this repository.
    pub fn index(&self) -> Result<StagingIndex> {
        StagingIndex::open(self.index_path())
    }

    /// Find a file by name anywhere in the work tree, skipping the
    /// metadata folder. Returns the path relative to the work tree root.
    pub fn find_file(&self, name: &str) -> Result<Option<PathBuf>> {
        find_file_in(&self.root, name, &self.root)
    }

    /// Whether a file with the given name exists anywhere in the work tree.
    pub fn contains_file(&self, name: &str) -> Result<bool> {
        Ok(self.find_file(name)?.is_some())
    }
}

fn find_file_in(dir: &Path, name: &str, root: &Path) -> Result<Option<PathBuf>> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            if entry.file_name() == META_DIR {
                continue;
            }
            if let Some(found) = find_file_in(&path, name, root)? {
                return Ok(Some(found));
            }
        } else if entry.file_name().to_str() == Some(name) {
            let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            return Ok(Some(rel));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::TreeBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");

        let repo = Repository::init(&root).unwrap();
        assert_eq!(repo.root(), root);
        assert_eq!(repo.algorithm(), Algorithm::Blake3);

        assert!(root.join(".drey/objects").is_dir());
        assert!(root.join(".drey/index").is_file());
        let config = fs::read_to_string(root.join(".drey/config")).unwrap();
        assert!(config.contains("version=1"));
        assert!(config.contains("algo=blake3-256"));
    }

    #[test]
    fn test_init_on_existing_repository_keeps_state() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");

        let repo = Repository::init(&root).unwrap();
        let id = repo.objects().unwrap().put("kept\n").unwrap();

        let reopened = Repository::init(&root).unwrap();
        assert!(reopened.objects().unwrap().exists(&id).unwrap());
    }

    #[test]
    fn test_open_validates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");

        assert!(Repository::open(&root).is_err());

        fs::create_dir_all(&root).unwrap();
        assert!(Repository::open(&root).is_err());

        Repository::init(&root).unwrap();
        assert!(Repository::open(&root).is_ok());

        fs::remove_dir_all(root.join(".drey/objects")).unwrap();
        assert!(Repository::open(&root).is_err());
    }

    #[test]
    fn test_is_repository() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");

        assert!(!Repository::is_repository(&root));
        Repository::init(&root).unwrap();
        assert!(Repository::is_repository(&root));
    }

    #[test]
    fn test_parse_config() {
        assert_eq!(
            Repository::parse_config("version=1\nalgo=blake3-256\n").unwrap(),
            Algorithm::Blake3
        );
        assert_eq!(
            Repository::parse_config("# comment\nversion=1\nalgo=blake3-256\n").unwrap(),
            Algorithm::Blake3
        );
        assert!(Repository::parse_config("version=99\nalgo=blake3-256\n").is_err());
        assert!(Repository::parse_config("version=1\n").is_err());
        assert!(Repository::parse_config("version=1\nalgo=sha1\n").is_err());
    }

    #[test]
    fn test_destroy_removes_everything() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");

        let repo = Repository::init(&root).unwrap();
        fs::write(root.join("data.txt"), "work tree file").unwrap();

        repo.destroy().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_find_file_in_work_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");
        let repo = Repository::init(&root).unwrap();

        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("src/nested/needle.txt"), "found").unwrap();

        let found = repo.find_file("needle.txt").unwrap();
        assert_eq!(found, Some(PathBuf::from("src/nested/needle.txt")));
        assert!(repo.contains_file("needle.txt").unwrap());
        assert!(!repo.contains_file("missing.txt").unwrap());
    }

    #[test]
    fn test_find_file_skips_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");
        let repo = Repository::init(&root).unwrap();

        // "config" only exists inside .drey, which the search ignores.
        assert_eq!(repo.find_file("config").unwrap(), None);
    }

    #[test]
    fn test_capture_through_repository() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");
        let repo = Repository::init(&root).unwrap();

        fs::create_dir_all(root.join("main/utils")).unwrap();
        fs::write(root.join("main/a.txt"), "Apple").unwrap();
        fs::write(root.join("main/utils/b.txt"), "Banana").unwrap();

        let store = repo.objects().unwrap();
        let index = repo.index().unwrap();
        let builder = TreeBuilder::new(&store, &index, repo.root());

        let root_id = builder.build("main").unwrap();
        assert!(store.exists(&root_id).unwrap());

        // Blobs and trees land as flat files in the objects directory.
        let object_count = fs::read_dir(repo.objects_dir()).unwrap().count();
        assert_eq!(object_count, 4);

        // The ledger holds the two blob lines.
        let content = fs::read_to_string(repo.index_path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("blob "));
        assert!(lines[0].ends_with(" main/a.txt"));
    }
}
