//! Error types for the vault and the credential gate.

use thiserror::Error;

use crate::platform::SecureStoreError;

/// Errors surfaced by the vault, the gate, and the session.
///
/// Every public operation returns a definite `Result`; nothing panics
/// across the FFI boundary. Storage failures are logged where they are
/// caught and carried with the name of the failing operation.
#[derive(Debug, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum VaultError {
    /// The platform secure store failed a read, write, or delete.
    #[error("storage failure while {context}: {reason}")]
    StorageFailure {
        /// The operation that was in flight.
        context: String,
        /// Host-provided description of the failure.
        reason: String,
    },

    /// A required field failed validation before any storage call.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The targeted record does not exist (or no longer exists).
    #[error("record not found: {id}")]
    RecordNotFound {
        /// The id that could not be resolved.
        id: String,
    },

    /// A stored value could not be encoded or decoded.
    #[error("serialization failure while {context}: {reason}")]
    Serialization {
        /// The operation that was in flight.
        context: String,
        /// Underlying serde error.
        reason: String,
    },

    /// The operation requires an unlocked session.
    #[error("vault is locked")]
    Locked,

    /// No PIN has been set up yet.
    #[error("setup has not been completed")]
    NotSetUp,

    /// Setup was already completed; the PIN cannot be re-created this way.
    #[error("setup has already been completed")]
    AlreadySetUp,

    /// An internal invariant failed.
    #[error("internal error: {reason}")]
    Internal {
        /// Description of the failure.
        reason: String,
    },
}

impl VaultError {
    /// Wraps a secure-store failure, logging it at the boundary.
    pub(crate) fn storage(context: &str, source: &SecureStoreError) -> Self {
        log::warn!("storage failure while {context}: {source}");
        Self::StorageFailure {
            context: context.to_owned(),
            reason: source.to_string(),
        }
    }

    /// Creates a validation error for `field`.
    pub(crate) fn invalid_field(field: &str, reason: &str) -> Self {
        Self::InvalidField {
            field: field.to_owned(),
            reason: reason.to_owned(),
        }
    }

    /// Wraps a serde failure.
    pub(crate) fn serialization(context: &str, source: &serde_json::Error) -> Self {
        Self::Serialization {
            context: context.to_owned(),
            reason: source.to_string(),
        }
    }

    /// Creates an internal error.
    pub(crate) fn internal(reason: String) -> Self {
        Self::Internal { reason }
    }
}
