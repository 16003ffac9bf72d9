//! Lokales X25519-Schluessel-Paar und Schluessel-Kodierung
//!
//! Oeffentliche Schluessel werden als Standard-Base64 (mit Padding)
//! uebertragen. Der private Schluessel verlaesst den Client nie.

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use saferchat_core::PublicKey;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::error::{CryptoError, CryptoResult};

/// Laenge eines X25519-Schluessels in Bytes
pub const KEY_LEN: usize = 32;

/// Schluessel-Paar des lokalen Benutzers
pub struct LocalKeys {
    secret: StaticSecret,
    public: X25519PublicKey,
}

impl LocalKeys {
    /// Generiert ein neues Schluessel-Paar
    pub fn generate() -> Self {
        Self::from_secret(StaticSecret::random_from_rng(OsRng))
    }

    /// Stellt ein Schluessel-Paar aus einem privaten Schluessel wieder her
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self::from_secret(StaticSecret::from(bytes))
    }

    fn from_secret(secret: StaticSecret) -> Self {
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    pub fn private_key_bytes(&self) -> [u8; KEY_LEN] {
        self.secret.to_bytes()
    }

    pub fn public_key_bytes(&self) -> [u8; KEY_LEN] {
        self.public.to_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(self.public_key_bytes().to_vec())
    }

    pub fn encoded_public_key(&self) -> String {
        encode_public_key(&self.public)
    }

    pub(crate) fn secret(&self) -> &StaticSecret {
        &self.secret
    }
}

impl std::fmt::Debug for LocalKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalKeys {{ public: {} }}", self.encoded_public_key())
    }
}

fn encode_public_key(key: &X25519PublicKey) -> String {
    STANDARD.encode(key.as_bytes())
}

/// Dekodiert einen Base64-kodierten oeffentlichen Schluessel
pub fn decode_public_key(encoded: &str) -> CryptoResult<PublicKey> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CryptoError::SchluesselDekodierung(e.to_string()))?;
    if bytes.len() != KEY_LEN {
        return Err(CryptoError::UngueltigeSchluesselLaenge {
            erwartet: KEY_LEN,
            erhalten: bytes.len(),
        });
    }
    Ok(PublicKey::new(bytes))
}

/// Wandelt einen opaken Schluessel in ein X25519-Array
pub(crate) fn key_array(key: &PublicKey) -> CryptoResult<[u8; KEY_LEN]> {
    key.as_bytes()
        .try_into()
        .map_err(|_| CryptoError::UngueltigeSchluesselLaenge {
            erwartet: KEY_LEN,
            erhalten: key.as_bytes().len(),
        })
}
