//! # saferchat-crypto
//!
//! Kryptografie fuer die saferchat Session-Engine.
//!
//! ## Module
//! - `keys` - Lokales X25519-Schluessel-Paar, Base64-Kodierung
//! - `sealed` - Verschluesselung pro Empfaenger (ephemeral DH + HKDF + AES-GCM)
//! - `hash` - SHA-256 des Kanal-Geheimnisses
//! - `provider` - `CryptoProvider`-Trait und Standard-Implementierung
//! - `types` - Gemeinsame Typen
//! - `error` - Fehlertypen

pub mod error;
pub mod hash;
pub mod keys;
pub mod provider;
pub mod sealed;
pub mod types;

// Bequeme Re-Exports
pub use error::{CryptoError, CryptoResult};
pub use hash::hash_secret;
pub use keys::{decode_public_key, LocalKeys, KEY_LEN};
pub use provider::{derive_credential, CryptoProvider, X25519Provider};
pub use types::SecretBytes;
