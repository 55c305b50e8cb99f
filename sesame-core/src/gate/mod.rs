//! The credential gate: PIN setup, PIN and biometric checks, lock state.
//!
//! The gate persists two values — the PIN envelope and a setup-complete
//! flag — and keeps one transient bit, `authenticated`, which starts false
//! on every process launch and is reset by [`CredentialGate::lock`].
//!
//! State flow: `NotSetUp` → (`complete_setup`) → `Unlocked`;
//! `Locked` → (`verify_pin` | `authenticate_biometric` success) →
//! `Unlocked` → (`lock`) → `Locked`.
//!
//! Repeated PIN guesses are not rate-limited here. A lockout/backoff policy
//! is a product decision that has not been made; until it is, hosts should
//! treat the gate as best-effort UI protection, not a brute-force barrier.

mod pin;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::platform::{
    BiometricAuthenticator, BiometricCapability, BiometricVerdict, SecureKeyValueStore,
};
use crate::vault::keys;
use crate::vault::{VaultError, VaultResult};

use pin::PinEnvelope;

/// Decides locked/unlocked state via PIN or biometric check.
pub struct CredentialGate {
    store: Arc<dyn SecureKeyValueStore>,
    biometric: Arc<dyn BiometricAuthenticator>,
    capability: BiometricCapability,
    authenticated: AtomicBool,
}

impl CredentialGate {
    /// Creates a gate over the given platform collaborators.
    ///
    /// The biometric capability is probed once here and cached for the
    /// lifetime of the gate.
    #[must_use]
    pub fn new(
        store: Arc<dyn SecureKeyValueStore>,
        biometric: Arc<dyn BiometricAuthenticator>,
    ) -> Self {
        let capability = biometric.capability();
        Self {
            store,
            biometric,
            capability,
            authenticated: AtomicBool::new(false),
        }
    }

    /// Returns `true` once [`Self::complete_setup`] has persisted a PIN.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails the read.
    pub fn is_setup_complete(&self) -> VaultResult<bool> {
        let flag = self
            .store
            .get(keys::SETUP_FLAG_KEY.to_owned())
            .map_err(|e| VaultError::storage("reading setup flag", &e))?;
        Ok(flag.as_deref() == Some(keys::SETUP_FLAG_VALUE))
    }

    /// Persists the PIN envelope and the setup flag, then unlocks.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::AlreadySetUp`] when a PIN exists, a validation
    /// error for a malformed PIN (4–8 digits), and a storage error if a
    /// write fails.
    pub fn complete_setup(&self, pin: &str) -> VaultResult<()> {
        if self.is_setup_complete()? {
            return Err(VaultError::AlreadySetUp);
        }
        pin::validate_pin(pin)?;

        let envelope = PinEnvelope::derive(pin);
        let json = serde_json::to_string(&envelope)
            .map_err(|e| VaultError::serialization("encoding pin envelope", &e))?;
        self.store
            .set(keys::PIN_KEY.to_owned(), json)
            .map_err(|e| VaultError::storage("writing pin envelope", &e))?;
        self.store
            .set(
                keys::SETUP_FLAG_KEY.to_owned(),
                keys::SETUP_FLAG_VALUE.to_owned(),
            )
            .map_err(|e| VaultError::storage("writing setup flag", &e))?;

        self.authenticated.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Checks `candidate` against the persisted PIN.
    ///
    /// Returns `true` iff the candidate matches; a match unlocks the gate.
    /// There is no attempt counter and no lockout.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotSetUp`] when no PIN has been persisted, and
    /// a storage or serialization error if the envelope cannot be read.
    pub fn verify_pin(&self, candidate: &str) -> VaultResult<bool> {
        let raw = self
            .store
            .get(keys::PIN_KEY.to_owned())
            .map_err(|e| VaultError::storage("reading pin envelope", &e))?
            .ok_or(VaultError::NotSetUp)?;
        let envelope: PinEnvelope = serde_json::from_str(&raw)
            .map_err(|e| VaultError::serialization("decoding pin envelope", &e))?;

        let matched = envelope.matches(candidate)?;
        if matched {
            self.authenticated.store(true, Ordering::SeqCst);
        }
        Ok(matched)
    }

    /// Presents the platform biometric prompt; `Granted` unlocks the gate.
    pub fn authenticate_biometric(&self, prompt: &str) -> BiometricVerdict {
        let verdict = self.biometric.authenticate(prompt.to_owned());
        if verdict == BiometricVerdict::Granted {
            self.authenticated.store(true, Ordering::SeqCst);
        }
        verdict
    }

    /// Clears the transient unlocked state. The PIN and setup flag persist.
    pub fn lock(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    /// Returns `true` while the gate is unlocked.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// The biometric capability probed at construction.
    #[must_use]
    pub const fn capability(&self) -> BiometricCapability {
        self.capability
    }
}

#[cfg(test)]
mod tests {
    use crate::platform::memory::{MemoryBiometric, MemorySecureStore};

    use super::*;

    fn new_gate() -> (CredentialGate, Arc<MemorySecureStore>, Arc<MemoryBiometric>) {
        let store = Arc::new(MemorySecureStore::new());
        let biometric = Arc::new(MemoryBiometric::new(BiometricCapability::Face));
        let store_dyn: Arc<dyn SecureKeyValueStore> = store.clone();
        let biometric_dyn: Arc<dyn BiometricAuthenticator> = biometric.clone();
        let gate = CredentialGate::new(store_dyn, biometric_dyn);
        (gate, store, biometric)
    }

    #[test]
    fn test_fresh_install_flow() {
        let (gate, _, _) = new_gate();
        assert!(!gate.is_setup_complete().unwrap());
        assert!(!gate.is_authenticated());

        gate.complete_setup("4321").unwrap();
        assert!(gate.is_setup_complete().unwrap());
        assert!(gate.is_authenticated());
    }

    #[test]
    fn test_setup_rejects_second_run_and_bad_pins() {
        let (gate, _, _) = new_gate();
        gate.complete_setup("1234").unwrap();
        assert!(matches!(
            gate.complete_setup("5678"),
            Err(VaultError::AlreadySetUp)
        ));

        let (gate, _, _) = new_gate();
        assert!(matches!(
            gate.complete_setup("12"),
            Err(VaultError::InvalidField { .. })
        ));
        assert!(!gate.is_setup_complete().unwrap());
    }

    #[test]
    fn test_verify_pin() {
        let (gate, _, _) = new_gate();
        gate.complete_setup("1234").unwrap();
        gate.lock();

        assert!(!gate.verify_pin("0000").unwrap());
        assert!(!gate.is_authenticated());

        assert!(gate.verify_pin("1234").unwrap());
        assert!(gate.is_authenticated());
    }

    #[test]
    fn test_verify_pin_before_setup() {
        let (gate, _, _) = new_gate();
        assert!(matches!(
            gate.verify_pin("1234"),
            Err(VaultError::NotSetUp)
        ));
    }

    #[test]
    fn test_pin_is_not_stored_raw() {
        let (gate, store, _) = new_gate();
        gate.complete_setup("1234").unwrap();
        let stored = store.raw_get("sesame_pin").unwrap();
        assert!(!stored.contains("1234"));
    }

    #[test]
    fn test_biometric_unlock_and_cancellation() {
        let (gate, _, biometric) = new_gate();
        gate.complete_setup("1234").unwrap();
        gate.lock();

        biometric.set_verdict(BiometricVerdict::Cancelled);
        assert_eq!(
            gate.authenticate_biometric("Unlock"),
            BiometricVerdict::Cancelled
        );
        assert!(!gate.is_authenticated());

        biometric.set_verdict(BiometricVerdict::Granted);
        assert_eq!(
            gate.authenticate_biometric("Unlock"),
            BiometricVerdict::Granted
        );
        assert!(gate.is_authenticated());
        assert_eq!(biometric.prompt_count(), 2);
    }

    #[test]
    fn test_capability_probed_once() {
        let (gate, _, _) = new_gate();
        assert_eq!(gate.capability(), BiometricCapability::Face);
    }

    #[test]
    fn test_lock_keeps_persisted_state() {
        let (gate, store, _) = new_gate();
        gate.complete_setup("1234").unwrap();
        gate.lock();
        assert!(!gate.is_authenticated());
        assert!(gate.is_setup_complete().unwrap());
        assert!(store.contains("sesame_pin"));
    }
}
