//! The vault session: the composition root handed to the host app.
//!
//! [`SesameVault`] owns the credential gate, the record store, and the
//! in-memory record cache. The cache has exactly one writer path (this
//! session); it is reloaded on every unlock transition and cleared on
//! [`SesameVault::lock`] so records never leak across sessions. Unlocking
//! also runs the vault's reconciliation pass, so index drift from an
//! earlier crash is repaired before the first read.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::gate::CredentialGate;
use crate::platform::{
    BiometricAuthenticator, BiometricCapability, BiometricVerdict, SecureKeyValueStore,
};
use crate::vault::{CredentialRecord, RecordDraft, RecordStore, VaultError};

/// The Sesame vault session.
///
/// This is the main entry point for Swift/Kotlin. Construct it once at app
/// start with the platform collaborators and keep it for the process
/// lifetime; the locked/unlocked state is transient and every launch starts
/// locked.
///
/// # Example (Swift)
///
/// ```swift
/// let vault = SesameVault(store: KeychainStore(), biometric: LocalAuthBridge())
/// if try vault.isSetupComplete() {
///     _ = try vault.unlockWithPin(pin: enteredPin)
/// }
/// ```
#[derive(uniffi::Object)]
pub struct SesameVault {
    gate: CredentialGate,
    records: RecordStore,
    cache: Mutex<Vec<CredentialRecord>>,
}

#[uniffi::export]
impl SesameVault {
    /// Creates a vault session over the host platform collaborators.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(
        store: Arc<dyn SecureKeyValueStore>,
        biometric: Arc<dyn BiometricAuthenticator>,
    ) -> Arc<Self> {
        Arc::new(Self {
            gate: CredentialGate::new(Arc::clone(&store), biometric),
            records: RecordStore::new(store),
            cache: Mutex::new(Vec::new()),
        })
    }

    // Gate

    /// Returns `true` once a PIN has been set up on this device.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails the read.
    pub fn is_setup_complete(&self) -> Result<bool, VaultError> {
        self.gate.is_setup_complete()
    }

    /// First-run setup: persists the PIN and unlocks the vault.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySetUp` when a PIN exists, a validation error for a
    /// malformed PIN, and a storage error if a write fails.
    pub fn complete_setup(&self, pin: String) -> Result<(), VaultError> {
        self.gate.complete_setup(&pin)?;
        self.after_unlock()
    }

    /// Attempts to unlock with a PIN. Returns `true` on a match.
    ///
    /// A mismatch is a normal outcome, not an error; there is no attempt
    /// counter and no lockout.
    ///
    /// # Errors
    ///
    /// Returns `NotSetUp` before setup, and a storage or serialization
    /// error if the persisted PIN cannot be read.
    pub fn unlock_with_pin(&self, pin: String) -> Result<bool, VaultError> {
        if !self.gate.verify_pin(&pin)? {
            return Ok(false);
        }
        self.after_unlock()?;
        Ok(true)
    }

    /// Attempts to unlock with the platform biometric prompt.
    ///
    /// The verdict distinguishes user cancellation from rejection so the
    /// host can decide whether to offer a retry.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cache reload after a granted
    /// challenge fails.
    pub fn unlock_with_biometrics(
        &self,
        prompt: String,
    ) -> Result<BiometricVerdict, VaultError> {
        let verdict = self.gate.authenticate_biometric(&prompt);
        if verdict == BiometricVerdict::Granted {
            self.after_unlock()?;
        }
        Ok(verdict)
    }

    /// Locks the vault and clears the record cache.
    pub fn lock(&self) {
        self.gate.lock();
        self.cache().clear();
    }

    /// Returns `true` while the vault is unlocked.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.gate.is_authenticated()
    }

    /// The biometric capability probed at startup.
    #[must_use]
    pub fn biometric_capability(&self) -> BiometricCapability {
        self.gate.capability()
    }

    // Records

    /// Returns a snapshot of the cached records, in index order.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] while the vault is locked.
    pub fn records(&self) -> Result<Vec<CredentialRecord>, VaultError> {
        self.ensure_unlocked()?;
        Ok(self.cache().clone())
    }

    /// Re-reads every record from storage and replaces the cache.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] while the vault is locked, and a
    /// storage error if the reload fails.
    pub fn refresh(&self) -> Result<(), VaultError> {
        self.ensure_unlocked()?;
        let loaded = self.records.list_all()?;
        *self.cache() = loaded;
        Ok(())
    }

    /// Creates a record and returns it with its generated id and
    /// creation time.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] while the vault is locked, a
    /// validation error for an empty title or secret, and a storage error
    /// if a write fails.
    pub fn add_record(&self, draft: RecordDraft) -> Result<CredentialRecord, VaultError> {
        self.ensure_unlocked()?;
        let record = self.records.add(&draft, unix_now()?)?;
        self.cache().push(record.clone());
        Ok(record)
    }

    /// Updates an existing record's fields and refreshes its
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] while the vault is locked,
    /// `RecordNotFound` for an unknown id, a validation error for an empty
    /// title or secret, and a storage error if a write fails.
    pub fn update_record(
        &self,
        record: CredentialRecord,
    ) -> Result<CredentialRecord, VaultError> {
        self.ensure_unlocked()?;
        let updated = self.records.update(&record, unix_now()?)?;
        let mut cache = self.cache();
        if let Some(slot) = cache.iter_mut().find(|r| r.id == updated.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Deletes a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] while the vault is locked,
    /// `RecordNotFound` for an unknown (or already deleted) id, and a
    /// storage error if a write fails.
    pub fn delete_record(&self, id: String) -> Result<(), VaultError> {
        self.ensure_unlocked()?;
        self.records.delete(&id)?;
        self.cache().retain(|r| r.id != id);
        Ok(())
    }
}

impl SesameVault {
    /// Post-unlock housekeeping: repair index drift, then load the cache.
    fn after_unlock(&self) -> Result<(), VaultError> {
        let pruned = self.records.reconcile()?;
        if pruned > 0 {
            log::info!("reconciled record index: pruned {pruned} dangling entries");
        }
        let loaded = self.records.list_all()?;
        *self.cache() = loaded;
        Ok(())
    }

    fn ensure_unlocked(&self) -> Result<(), VaultError> {
        if self.gate.is_authenticated() {
            Ok(())
        } else {
            Err(VaultError::Locked)
        }
    }

    fn cache(&self) -> MutexGuard<'_, Vec<CredentialRecord>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn unix_now() -> Result<u64, VaultError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| VaultError::internal(format!("system clock before unix epoch: {e}")))
}
