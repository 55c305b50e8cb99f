//! In-memory implementations of the platform traits for testing.
//!
//! These implementations are NOT secure for production use. They are
//! designed for unit and integration testing of the gate and record store.

// Allow certain clippy lints for test-only code
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use super::{
    BiometricAuthenticator, BiometricCapability, BiometricVerdict, SecureKeyValueStore,
    SecureStoreError,
};

// =============================================================================
// Memory Secure Store
// =============================================================================

/// In-memory secure store backed by a `HashMap`.
///
/// **FOR TESTING ONLY** — values are held in plain memory with no
/// encryption. Beyond the plain store contract it supports per-key write
/// poisoning, which tests use to interrupt the vault's two-step
/// record-plus-index write sequences partway through.
#[derive(Default)]
pub struct MemorySecureStore {
    /// Stored entries, keyed by storage key.
    entries: RwLock<HashMap<String, String>>,
    /// Keys whose next `set` calls fail.
    poisoned_writes: RwLock<HashSet<String>>,
}

impl MemorySecureStore {
    /// Creates a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Returns `true` if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().unwrap().contains_key(key)
    }

    /// Reads a value without going through the trait, for assertions.
    #[must_use]
    pub fn raw_get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    /// Writes a value without going through the trait, for test setup.
    pub fn raw_set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
    }

    /// Makes every subsequent `set` on `key` fail until [`Self::heal`].
    pub fn poison_writes_to(&self, key: &str) {
        self.poisoned_writes.write().unwrap().insert(key.to_owned());
    }

    /// Clears all write poisoning.
    pub fn heal(&self) {
        self.poisoned_writes.write().unwrap().clear();
    }

    /// Clears all stored entries and poisoning.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
        self.heal();
    }
}

impl SecureKeyValueStore for MemorySecureStore {
    fn get(&self, key: String) -> Result<Option<String>, SecureStoreError> {
        Ok(self.entries.read().unwrap().get(&key).cloned())
    }

    fn set(&self, key: String, value: String) -> Result<(), SecureStoreError> {
        if self.poisoned_writes.read().unwrap().contains(&key) {
            return Err(SecureStoreError::Backend {
                reason: format!("write to {key} rejected by test harness"),
            });
        }
        self.entries.write().unwrap().insert(key, value);
        Ok(())
    }

    fn delete(&self, key: String) -> Result<(), SecureStoreError> {
        self.entries.write().unwrap().remove(&key);
        Ok(())
    }
}

// =============================================================================
// Memory Biometric Authenticator
// =============================================================================

/// Scripted biometric authenticator.
///
/// Reports a fixed capability and answers every challenge with a
/// configurable verdict. Prompt messages are recorded for assertions.
pub struct MemoryBiometric {
    capability: BiometricCapability,
    verdict: Mutex<BiometricVerdict>,
    prompts: Mutex<Vec<String>>,
}

impl MemoryBiometric {
    /// Creates an authenticator with the given capability that grants
    /// every challenge.
    #[must_use]
    pub fn new(capability: BiometricCapability) -> Self {
        Self {
            capability,
            verdict: Mutex::new(BiometricVerdict::Granted),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Scripts the verdict returned by subsequent challenges.
    pub fn set_verdict(&self, verdict: BiometricVerdict) {
        *self.verdict.lock().unwrap() = verdict;
    }

    /// Returns the number of challenges presented so far.
    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Returns the message of the most recent challenge, if any.
    #[must_use]
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl Default for MemoryBiometric {
    fn default() -> Self {
        Self::new(BiometricCapability::None)
    }
}

impl BiometricAuthenticator for MemoryBiometric {
    fn capability(&self) -> BiometricCapability {
        self.capability
    }

    fn authenticate(&self, prompt: String) -> BiometricVerdict {
        self.prompts.lock().unwrap().push(prompt);
        self.verdict.lock().unwrap().clone()
    }
}

// =============================================================================
// Memory Platform Bundle
// =============================================================================

/// Combines the in-memory implementations for easy test setup.
///
/// # Example
///
/// ```
/// use sesame_core::platform::MemoryPlatform;
///
/// let platform = MemoryPlatform::new();
///
/// // Use platform.store, platform.biometric
/// ```
pub struct MemoryPlatform {
    /// In-memory secure store.
    pub store: Arc<MemorySecureStore>,
    /// Scripted biometric authenticator.
    pub biometric: Arc<MemoryBiometric>,
}

impl MemoryPlatform {
    /// Creates a platform bundle with an empty store and a fingerprint
    /// authenticator that grants every challenge.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemorySecureStore::new()),
            biometric: Arc::new(MemoryBiometric::new(BiometricCapability::Fingerprint)),
        }
    }

    /// Clears all stored data (useful for test isolation).
    pub fn reset(&self) {
        self.store.clear();
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_memory_store_basic() {
        let store = MemorySecureStore::new();

        assert!(store.is_empty());
        assert!(store.get("pin".into()).unwrap().is_none());

        store.set("pin".into(), "1234".into()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains("pin"));
        assert_eq!(store.get("pin".into()).unwrap(), Some("1234".into()));

        store.set("pin".into(), "4321".into()).unwrap();
        assert_eq!(store.get("pin".into()).unwrap(), Some("4321".into()));

        store.delete("pin".into()).unwrap();
        assert!(store.get("pin".into()).unwrap().is_none());
        assert!(!store.contains("pin"));
    }

    #[test]
    fn test_memory_store_delete_absent_is_noop() {
        let store = MemorySecureStore::new();
        store.delete("missing".into()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_poisoned_writes() {
        let store = MemorySecureStore::new();
        store.set("a".into(), "1".into()).unwrap();

        store.poison_writes_to("a");
        assert!(store.set("a".into(), "2".into()).is_err());
        // Reads and deletes are unaffected
        assert_eq!(store.get("a".into()).unwrap(), Some("1".into()));

        store.heal();
        store.set("a".into(), "2".into()).unwrap();
        assert_eq!(store.raw_get("a"), Some("2".into()));
    }

    #[test]
    fn test_memory_store_thread_safety() {
        use std::thread;

        let store = Arc::new(MemorySecureStore::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store
                    .set(format!("key-{i}"), format!("value-{i}"))
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_memory_biometric_scripting() {
        let biometric = MemoryBiometric::new(BiometricCapability::Face);
        assert_eq!(biometric.capability(), BiometricCapability::Face);
        assert_eq!(biometric.prompt_count(), 0);

        let verdict = biometric.authenticate("Unlock Sesame".into());
        assert_eq!(verdict, BiometricVerdict::Granted);
        assert_eq!(biometric.prompt_count(), 1);
        assert_eq!(biometric.last_prompt(), Some("Unlock Sesame".into()));

        biometric.set_verdict(BiometricVerdict::Cancelled);
        assert_eq!(
            biometric.authenticate("again".into()),
            BiometricVerdict::Cancelled
        );
    }

    #[test]
    fn test_memory_platform_bundle() {
        let platform = MemoryPlatform::new();

        platform.store.set("k".into(), "v".into()).unwrap();
        assert!(platform.store.contains("k"));

        assert_eq!(
            platform.biometric.capability(),
            BiometricCapability::Fingerprint
        );

        platform.reset();
        assert!(platform.store.is_empty());
    }
}
