//! Content-addressed object store.

use crate::backend::Backend;
use crate::codec;
use crate::error::{Error, Result};
use crate::ident::Identity;

/// A content-addressed store of immutable text objects.
///
/// The store computes identities over the raw object text, encodes the
/// text through the codec, and hands the encoded payload to its backend.
/// Objects are written at most once per distinct content: storing text
/// whose identity already exists is a read-only no-op.
#[derive(Debug)]
pub struct ObjectStore<B: Backend> {
    backend: B,
}

impl<B: Backend> ObjectStore<B> {
    /// Create a store over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Store `text`, returning its identity whether it was newly written
    /// or already present.
    pub fn put(&self, text: &str) -> Result<Identity> {
        let id = Identity::of(text.as_bytes());

        if !self.backend.exists(&id)? {
            let encoded = codec::encode(text)?;
            self.backend.put(&id, &encoded)?;
        }

        Ok(id)
    }

    /// Whether an object is stored under `id`.
    pub fn exists(&self, id: &Identity) -> Result<bool> {
        self.backend.exists(id)
    }

    /// Retrieve and decode the object stored under `id`.
    ///
    /// The decoded text is re-hashed and checked against `id`, so a
    /// corrupted or tampered object surfaces as `CorruptObject` instead
    /// of being returned.
    pub fn get(&self, id: &Identity) -> Result<String> {
        let bytes = self
            .backend
            .get(id)?
            .ok_or_else(|| Error::object_not_found(id.to_hex()))?;

        let text = codec::decode(&bytes)?;

        let computed = Identity::of(text.as_bytes());
        if computed != *id {
            return Err(Error::corrupt_object(format!(
                "identity mismatch: expected {}, got {}",
                id, computed
            )));
        }

        Ok(text)
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
