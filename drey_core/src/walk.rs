//! Directory walking and tree construction.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::ident::Identity;
use crate::index::StagingIndex;
use crate::store::ObjectStore;
use crate::tree::{self, EntryKind, TreeEntry};
use std::fs;
use std::path::{Path, PathBuf};

/// Builds tree objects for directories and records captured entries in
/// the staging index.
///
/// The walk is recursive and post-order: every child object's identity
/// is known before its parent's listing is assembled. Within a
/// directory, files come first and subdirectories after, each group
/// sorted by byte-wise name comparison; this order determines the tree
/// object's text and therefore its identity, independent of the
/// filesystem's enumeration order.
#[derive(Debug)]
pub struct TreeBuilder<'a, B: Backend> {
    store: &'a ObjectStore<B>,
    index: &'a StagingIndex,
    root: PathBuf,
    index_trees: bool,
}

impl<'a, B: Backend> TreeBuilder<'a, B> {
    /// Create a builder over a work tree rooted at `root`.
    ///
    /// By default only blob entries are recorded in the staging index;
    /// see [`TreeBuilder::index_trees`].
    pub fn new(
        store: &'a ObjectStore<B>,
        index: &'a StagingIndex,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            index,
            root: root.into(),
            index_trees: false,
        }
    }

    /// Whether tree (directory) entries are recorded in the staging
    /// index alongside blob entries.
    pub fn index_trees(mut self, yes: bool) -> Self {
        self.index_trees = yes;
        self
    }

    /// Capture the directory at `rel_path` (relative to the work tree
    /// root), returning the identity of its tree object.
    ///
    /// Fails with `InvalidArgument` before any object is written if the
    /// path does not resolve to an existing directory. On success, one
    /// batch of entries is appended to the staging index; on failure,
    /// nothing is appended and any objects already written remain in
    /// place, harmless because they are immutable and content-addressed.
    pub fn build(&self, rel_path: &str) -> Result<Identity> {
        let rel = clean_rel_path(rel_path)?;
        let dir = if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        };

        if !dir.is_dir() {
            return Err(Error::invalid_argument(format!(
                "not a directory: {}",
                rel_path
            )));
        }

        let mut staged = Vec::new();
        let id = self.build_dir(&dir, rel, &mut staged)?;
        self.index.append(&staged)?;

        log::info!("captured {} as {}", if rel.is_empty() { "." } else { rel }, id);
        Ok(id)
    }

    /// Capture a single file as a blob, appending one entry to the
    /// staging index.
    pub fn capture_file(&self, rel_path: &str) -> Result<Identity> {
        let rel = clean_rel_path(rel_path)?;
        let path = self.root.join(rel);

        if !path.is_file() {
            return Err(Error::invalid_argument(format!("not a file: {}", rel_path)));
        }

        let id = self.put_blob(&path)?;
        let entry = TreeEntry::new(EntryKind::Blob, id, rel.to_string())?;
        self.index.append(std::slice::from_ref(&entry))?;

        log::info!("captured {} as {}", rel, id);
        Ok(id)
    }

    fn build_dir(&self, dir: &Path, rel: &str, staged: &mut Vec<TreeEntry>) -> Result<Identity> {
        let (files, subdirs) = list_children(dir)?;
        let mut listing = Vec::with_capacity(files.len() + subdirs.len());

        for name in &files {
            let id = self.put_blob(&dir.join(name))?;
            let entry = TreeEntry::new(EntryKind::Blob, id, child_path(rel, name))?;
            staged.push(entry.clone());
            listing.push(entry);
        }

        for name in &subdirs {
            let child_rel = child_path(rel, name);
            let id = self.build_dir(&dir.join(name), &child_rel, staged)?;
            let entry = TreeEntry::new(EntryKind::Tree, id, child_rel)?;
            if self.index_trees {
                staged.push(entry.clone());
            }
            listing.push(entry);
        }

        self.store.put(&tree::render_tree(&listing))
    }

    fn put_blob(&self, path: &Path) -> Result<Identity> {
        let raw = fs::read_to_string(path)?;
        self.store.put(&normalize_lines(&raw))
    }
}

/// Normalize text so every line ends with exactly one `\n`, including
/// the final line. Lines are terminated by `\n`, `\r\n`, or a bare
/// `\r`; all three collapse to `\n`. The empty string stays empty.
pub fn normalize_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(|c| c == '\r' || c == '\n') {
            Some(pos) => {
                out.push_str(&rest[..pos]);
                out.push('\n');
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + skip..];
            }
            None => {
                out.push_str(rest);
                out.push('\n');
                rest = "";
            }
        }
    }
    out
}

/// List a directory's immediate children, split into file and
/// subdirectory names, each sorted by byte-wise comparison.
fn list_children(dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().into_string().map_err(|name| {
            Error::invalid_argument(format!("file name is not UTF-8: {:?}", name))
        })?;

        let file_type = entry.file_type()?;
        if file_type.is_file() {
            files.push(name);
        } else if file_type.is_dir() {
            subdirs.push(name);
        } else {
            return Err(Error::invalid_argument(format!(
                "unsupported file type: {}",
                entry.path().display()
            )));
        }
    }

    files.sort_by(|a, b| tree::name_order(a, b));
    subdirs.sort_by(|a, b| tree::name_order(a, b));
    Ok((files, subdirs))
}

fn child_path(rel: &str, name: &str) -> String {
    if rel.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", rel, name)
    }
}

fn clean_rel_path(rel_path: &str) -> Result<&str> {
    if Path::new(rel_path).is_absolute() {
        return Err(Error::invalid_argument(format!(
            "path must be relative: {}",
            rel_path
        )));
    }
    match rel_path {
        "." | "" => Ok(""),
        r => Ok(r.trim_end_matches('/')),
    }
}
