//! Record index persistence.
//!
//! The index is an ordered JSON array of record id strings under one fixed
//! key. Adds append, deletes remove by value; no ordering is imposed on
//! read, so presentation order is the caller's concern.

use crate::platform::SecureKeyValueStore;

use super::error::VaultError;
use super::{keys, VaultResult};

/// Loads the index. An absent index reads as empty (first run).
pub(crate) fn load(store: &dyn SecureKeyValueStore) -> VaultResult<Vec<String>> {
    let raw = store
        .get(keys::INDEX_KEY.to_owned())
        .map_err(|e| VaultError::storage("reading record index", &e))?;
    match raw {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| VaultError::serialization("decoding record index", &e)),
        None => Ok(Vec::new()),
    }
}

/// Persists the index.
pub(crate) fn save(store: &dyn SecureKeyValueStore, ids: &[String]) -> VaultResult<()> {
    let json = serde_json::to_string(ids)
        .map_err(|e| VaultError::serialization("encoding record index", &e))?;
    store
        .set(keys::INDEX_KEY.to_owned(), json)
        .map_err(|e| VaultError::storage("writing record index", &e))
}
