//! Credential record storage over the host secure store.
//!
//! The secure store offers no way to enumerate keys, so the vault keeps an
//! explicit index — a JSON array of record ids under one fixed key — next
//! to one serialized record per id. The index and the records must never
//! diverge; since the store cannot write two keys atomically, [`RecordStore`]
//! bundles each mutation with a rollback and exposes an explicit
//! [`RecordStore::reconcile`] pass that repairs what a crash between the two
//! writes can leave behind.
//!
//! Layout in the secure store:
//!
//! | key                    | value                              |
//! |------------------------|------------------------------------|
//! | `sesame_record_list`   | JSON array of record id strings    |
//! | `sesame_record_<id>`   | one [`CredentialRecord`] as JSON   |

mod error;
mod index;
pub(crate) mod keys;
mod store;
mod types;

pub use error::VaultError;
pub use store::RecordStore;
pub use types::{CredentialRecord, RecordDraft};

/// Result type alias for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;
