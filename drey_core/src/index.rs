//! Append-only staging index.

use crate::error::Result;
use crate::tree::TreeEntry;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// The staging index: an append-only ledger of captured entries.
///
/// One entry per line, in the same `<kind> <identity> <path>` grammar as
/// tree objects. The ledger is never deduplicated, reordered, or
/// rewritten; re-capturing an unchanged directory appends a fresh,
/// possibly identical, batch of lines.
#[derive(Debug)]
pub struct StagingIndex {
    path: PathBuf,
}

impl StagingIndex {
    /// Open the index at `path`, creating an empty file if absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            File::create(&path)?;
        }

        Ok(Self { path })
    }

    /// Append a batch of entries.
    ///
    /// An empty batch is a no-op and does not touch the file. The batch
    /// is rendered up front and written with a single call, so appends
    /// from concurrent builds never interleave mid-line.
    pub fn append(&self, entries: &[TreeEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut batch = String::new();
        for entry in entries {
            batch.push_str(&entry.to_line());
            batch.push('\n');
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(batch.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Read every entry currently in the ledger, oldest first.
    ///
    /// A line that does not parse is a `CorruptObject` error; the ledger
    /// is written only through `append`, so malformed content means the
    /// file was damaged.
    pub fn entries(&self) -> Result<Vec<TreeEntry>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            entries.push(TreeEntry::parse(&line)?);
        }

        Ok(entries)
    }

    /// Path of the underlying ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
