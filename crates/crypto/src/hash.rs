//! Hash des Kanal-Geheimnisses
//!
//! Auf dem Draht wird nur der SHA-256-Hash (Hex, Kleinbuchstaben) des
//! Geheimnisses uebertragen, nie das Geheimnis selbst.

use sha2::{Digest, Sha256};

/// SHA-256 des Geheimnisses als Hex-String
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
