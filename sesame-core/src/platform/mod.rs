//! Platform abstraction traits for the vault.
//!
//! Everything Sesame persists goes through the host's encrypted key-value
//! store, and every biometric challenge goes through the host's local
//! authentication framework. Both capabilities are abstracted behind
//! foreign-implemented traits so the core stays platform-agnostic:
//!
//! - [`SecureKeyValueStore`] — encrypted-at-rest string storage
//! - [`BiometricAuthenticator`] — capability probing and challenges
//!
//! # Platform Implementations
//!
//! ## iOS (Swift)
//! - `SecureKeyValueStore`: Keychain Services
//!   (`kSecAttrAccessibleWhenUnlockedThisDeviceOnly`)
//! - `BiometricAuthenticator`: `LocalAuthentication` (Face ID / Touch ID)
//!
//! ## Android (Kotlin)
//! - `SecureKeyValueStore`: `EncryptedSharedPreferences` backed by the
//!   Android Keystore
//! - `BiometricAuthenticator`: `BiometricPrompt`

mod biometric;
pub mod memory;
mod secure_store;

pub use biometric::{BiometricAuthenticator, BiometricCapability, BiometricVerdict};
pub use secure_store::{SecureKeyValueStore, SecureStoreError};

// Re-export memory implementations for testing
pub use memory::MemoryPlatform;
