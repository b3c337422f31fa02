//! # Drey Core
//!
//! A minimal content-addressed object store with directory snapshots.
//!
//! Files and directory hierarchies become immutable objects addressed by
//! the BLAKE3 hash of their content: blobs hold newline-normalized file
//! text, trees hold a line-per-child listing, and identical content is
//! stored exactly once. Every capture also appends to an append-only
//! staging index recording what was taken.
//!
//! ## Example
//!
//! ```no_run
//! use drey_core::{Repository, TreeBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Initialize a repository around an existing work tree
//! let repo = Repository::init("./my-repo")?;
//!
//! // Capture a directory as a Merkle tree of objects
//! let store = repo.objects()?;
//! let index = repo.index()?;
//! let builder = TreeBuilder::new(&store, &index, repo.root());
//! let root_id = builder.build("main")?;
//!
//! // Objects are retrievable by identity
//! let listing = store.get(&root_id)?;
//! println!("{}", listing);
//! # Ok(())
//! # }
//! ```

mod backend;
pub mod codec;
mod error;
mod ident;
mod index;
mod repo;
mod store;
mod tree;
mod walk;

pub use backend::{Backend, DirBackend, MemoryBackend};
pub use error::{Error, Result};
pub use ident::{Algorithm, Identity, IDENTITY_SIZE};
pub use index::StagingIndex;
pub use repo::{Repository, META_DIR};
pub use store::ObjectStore;
pub use tree::{name_order, parse_tree, render_tree, EntryKind, TreeEntry};
pub use walk::{normalize_lines, TreeBuilder};
