//! Tree object text format.
//!
//! A tree object is a UTF-8 listing of a directory's children, one entry
//! per line:
//!
//! ```text
//! blob <identity> <path>
//! tree <identity> <path>
//! ```
//!
//! Every line is `\n`-terminated and there is no trailing blank line.
//! Line order is content-affecting: the builder emits files first, then
//! subdirectories, each group sorted by byte-wise name comparison, and
//! rendering preserves that order. Reordering entries changes the tree's
//! identity even when the child set is unchanged.

use crate::error::{Error, Result};
use crate::ident::Identity;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Entry kind in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A blob (file content).
    Blob,
    /// A subtree (directory listing).
    Tree,
}

impl EntryKind {
    /// The keyword used in tree and index lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Blob => "blob",
            EntryKind::Tree => "tree",
        }
    }

    /// Parse the keyword of a stored line.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(EntryKind::Blob),
            "tree" => Ok(EntryKind::Tree),
            _ => Err(Error::corrupt_object(format!("unknown entry kind: {}", s))),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entry in a tree: a child blob or subtree at a relative path.
///
/// Paths are `/`-separated and relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// Kind of the referenced object.
    pub kind: EntryKind,
    /// Identity of the referenced object.
    pub identity: Identity,
    /// Relative path of the child.
    pub path: String,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(kind: EntryKind, identity: Identity, path: String) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::invalid_argument("Entry path cannot be empty"));
        }
        if path.contains('\n') || path.contains('\r') {
            return Err(Error::invalid_argument(
                "Entry path cannot contain line terminators",
            ));
        }
        if path.contains('\0') {
            return Err(Error::invalid_argument(
                "Entry path cannot contain null bytes",
            ));
        }

        Ok(Self {
            kind,
            identity,
            path,
        })
    }

    /// Render the entry as a tree/index line (without the terminating newline).
    pub fn to_line(&self) -> String {
        format!("{} {} {}", self.kind, self.identity, self.path)
    }

    /// Parse an entry from a stored line.
    ///
    /// The path field may itself contain spaces; only the first two
    /// fields are delimited.
    pub fn parse(line: &str) -> Result<Self> {
        let mut fields = line.splitn(3, ' ');
        let kind = fields
            .next()
            .ok_or_else(|| Error::corrupt_object(format!("malformed entry line: {:?}", line)))?;
        let identity = fields
            .next()
            .ok_or_else(|| Error::corrupt_object(format!("malformed entry line: {:?}", line)))?;
        let path = fields
            .next()
            .ok_or_else(|| Error::corrupt_object(format!("malformed entry line: {:?}", line)))?;

        let kind = EntryKind::parse(kind)?;
        let identity = Identity::from_hex(identity)
            .map_err(|e| Error::corrupt_object(format!("bad identity in entry line: {}", e)))?;

        TreeEntry::new(kind, identity, path.to_string())
            .map_err(|e| Error::corrupt_object(format!("bad path in entry line: {}", e)))
    }
}

impl fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line())
    }
}

/// Byte-wise name ordering for directory children.
///
/// This ordering determines tree object content and therefore identity;
/// it must not depend on locale or platform collation.
pub fn name_order(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Render entries into tree object text, one `\n`-terminated line each.
///
/// Order is preserved; callers establish the canonical order before
/// rendering. An empty entry list renders to the empty string.
pub fn render_tree(entries: &[TreeEntry]) -> String {
    let mut text = String::new();
    for entry in entries {
        text.push_str(&entry.to_line());
        text.push('\n');
    }
    text
}

/// Parse tree object text back into entries.
pub fn parse_tree(text: &str) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    for line in text.lines() {
        entries.push(TreeEntry::parse(line)?);
    }
    Ok(entries)
}
