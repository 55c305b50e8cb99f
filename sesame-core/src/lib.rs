#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! Sesame core — the portable engine of the Sesame password manager.
//!
//! The host app (Swift or Kotlin) supplies the platform collaborators — the
//! OS-encrypted key-value store and the biometric authenticator — as
//! foreign-implemented traits; this crate owns everything else: PIN setup
//! and verification, the credential record store with its identifier index,
//! and the vault session that ties the two together.
//!
//! The main entry point is [`SesameVault`].

pub mod gate;
pub mod logger;
pub mod platform;
pub mod session;
pub mod vault;

pub use session::SesameVault;

uniffi::setup_scaffolding!("sesame_core");
