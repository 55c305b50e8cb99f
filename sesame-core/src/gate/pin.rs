//! PIN derivation and verification.
//!
//! The PIN is never persisted raw: a random salt is drawn at setup and
//! `SHA-256(salt ‖ pin)` is stored next to it as a hex-encoded envelope.
//! Verification recomputes the digest for the candidate and compares in
//! constant time.

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::vault::{VaultError, VaultResult};

const SALT_LEN: usize = 16;

/// Minimum PIN length accepted at setup.
const MIN_PIN_LEN: usize = 4;
/// Maximum PIN length accepted at setup.
const MAX_PIN_LEN: usize = 8;

/// Salt and digest persisted under the PIN key.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PinEnvelope {
    salt: String,
    digest: String,
}

impl PinEnvelope {
    /// Derives a fresh envelope for `pin` with a random salt.
    pub(crate) fn derive(pin: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let digest = pin_digest(&salt, pin);
        Self {
            salt: hex::encode(salt),
            digest: hex::encode(digest),
        }
    }

    /// Checks `candidate` against the stored digest in constant time.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the stored envelope's hex fields
    /// are corrupt.
    pub(crate) fn matches(&self, candidate: &str) -> VaultResult<bool> {
        let salt = decode_hex(&self.salt, "pin salt")?;
        let stored = decode_hex(&self.digest, "pin digest")?;
        let computed = pin_digest(&salt, candidate);
        Ok(computed.ct_eq(stored.as_slice()).into())
    }
}

/// Validates the PIN format accepted at setup: 4 to 8 ASCII digits.
pub(crate) fn validate_pin(pin: &str) -> VaultResult<()> {
    if pin.len() < MIN_PIN_LEN || pin.len() > MAX_PIN_LEN {
        return Err(VaultError::invalid_field(
            "pin",
            "must be 4 to 8 digits long",
        ));
    }
    if !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VaultError::invalid_field("pin", "must contain only digits"));
    }
    Ok(())
}

fn pin_digest(salt: &[u8], pin: &str) -> [u8; 32] {
    let mut material = Zeroizing::new(Vec::with_capacity(salt.len() + pin.len()));
    material.extend_from_slice(salt);
    material.extend_from_slice(pin.as_bytes());
    Sha256::digest(material.as_slice()).into()
}

fn decode_hex(value: &str, label: &str) -> VaultResult<Vec<u8>> {
    hex::decode(value)
        .map_err(|e| VaultError::internal(format!("corrupt {label}: {e}")))
}
