//! Biometric authentication trait implemented by the host.

/// Biometric modality available on the device.
///
/// Queried once when the gate is constructed; a capability change
/// mid-session (e.g. the user enrolling a fingerprint while the app runs)
/// is not picked up until the next launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum BiometricCapability {
    /// Face-recognition hardware is available and enrolled.
    Face,
    /// Fingerprint hardware is available and enrolled.
    Fingerprint,
    /// No usable biometric hardware.
    None,
}

/// Outcome of a biometric challenge.
///
/// User cancellation is distinguished from rejection so the caller can
/// decide whether a retry affordance makes sense.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum BiometricVerdict {
    /// The user passed the biometric check.
    Granted,
    /// The user dismissed the prompt.
    Cancelled,
    /// The platform rejected the challenge.
    Denied {
        /// Host-provided description of the rejection.
        reason: String,
    },
}

/// Local biometric authentication provided by the host OS.
///
/// Implemented over `LocalAuthentication` on iOS and `BiometricPrompt` on
/// Android. The challenge call blocks until the user completes or dismisses
/// the system prompt.
#[uniffi::export(with_foreign)]
pub trait BiometricAuthenticator: Send + Sync {
    /// Reports the strongest biometric modality the device supports.
    fn capability(&self) -> BiometricCapability;

    /// Presents the system biometric prompt with the given message.
    fn authenticate(&self, prompt: String) -> BiometricVerdict;
}
