//! Encrypted key-value storage trait implemented by the host.

use thiserror::Error;

/// Failure raised by a [`SecureKeyValueStore`] implementation.
///
/// The host maps whatever its storage framework throws (Keychain status
/// codes, Keystore exceptions) into [`SecureStoreError::Backend`]; the core
/// never inspects the reason beyond logging it.
#[derive(Debug, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum SecureStoreError {
    /// The platform storage backend rejected or failed the operation.
    #[error("secure store backend failure: {reason}")]
    Backend {
        /// Host-provided description of the failure.
        reason: String,
    },
}

// An undeclared exception thrown by the host implementation surfaces as a
// backend failure rather than a crash.
impl From<uniffi::UnexpectedUniFFICallbackError> for SecureStoreError {
    fn from(err: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Backend { reason: err.reason }
    }
}

/// Encrypted-at-rest string storage provided by the host OS.
///
/// This is the only persistence substrate the core uses. The contract is
/// deliberately minimal — get, set, delete — because that is all the mobile
/// secure-storage APIs offer in common: there are no transactions and no
/// way to enumerate keys. The vault maintains its own identifier index to
/// work around the missing enumeration primitive.
///
/// # Security Requirements
///
/// - Values MUST be encrypted at rest with device-bound key material.
/// - Implementations SHOULD scope entries so they do not survive
///   backup/restore onto a different device.
///
/// Calls are issued one at a time from the vault session; implementations
/// do not need to support concurrent access from the core. There is no
/// cancellation and no timeout — a stalled backend call stalls the caller.
#[uniffi::export(with_foreign)]
pub trait SecureKeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails the read. An absent
    /// key is not an error.
    fn get(&self, key: String) -> Result<Option<String>, SecureStoreError>;

    /// Writes `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails the write.
    fn set(&self, key: String, value: String) -> Result<(), SecureStoreError>;

    /// Removes the value stored under `key`.
    ///
    /// Deleting an absent key is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails the delete.
    fn delete(&self, key: String) -> Result<(), SecureStoreError>;
}
