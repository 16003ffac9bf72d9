//! Crypto-Provider – Schnittstelle der Session-Engine zur Kryptografie
//!
//! Die Engine kennt nur den Trait `CryptoProvider`. Die Standard-
//! Implementierung `X25519Provider` versiegelt jede Nachricht einzeln fuer
//! den Empfaenger (siehe `sealed`). Der Trait nutzt `async_trait`, damit die
//! Futures `Send` sind und pro Empfaenger ein eigener Task laufen kann.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use saferchat_core::{ChannelCredential, PublicKey};

use crate::error::{CryptoError, CryptoResult};
use crate::hash;
use crate::keys::{self, LocalKeys};
use crate::sealed;

/// Kryptografische Primitive, die die Session-Engine benoetigt
#[async_trait]
pub trait CryptoProvider: Send + Sync {
    /// Dekodiert einen uebertragenen oeffentlichen Schluessel
    fn decode_key(&self, encoded: &str) -> CryptoResult<PublicKey>;

    /// Verschluesselt `plaintext` fuer genau einen Empfaenger
    async fn encrypt(&self, plaintext: &str, recipient: &PublicKey) -> CryptoResult<String>;

    /// Entschluesselt eine an den lokalen Benutzer gerichtete Nachricht
    async fn decrypt(&self, ciphertext: &str) -> CryptoResult<String>;

    /// Hash des Kanal-Geheimnisses (so wie er auf dem Draht erscheint)
    async fn hash_secret(&self, secret: &str) -> CryptoResult<String>;

    /// Eigener oeffentlicher Schluessel (roh)
    fn public_key(&self) -> PublicKey;

    /// Eigener oeffentlicher Schluessel (kodiert)
    fn encoded_public_key(&self) -> String;
}

/// Standard-Provider auf Basis eines lokalen X25519-Schluessel-Paars
#[derive(Debug)]
pub struct X25519Provider {
    keys: LocalKeys,
}

impl X25519Provider {
    pub fn neu(keys: LocalKeys) -> Self {
        Self { keys }
    }

    /// Provider mit frisch generiertem Schluessel-Paar
    pub fn generieren() -> Self {
        Self::neu(LocalKeys::generate())
    }

    pub fn keys(&self) -> &LocalKeys {
        &self.keys
    }
}

#[async_trait]
impl CryptoProvider for X25519Provider {
    fn decode_key(&self, encoded: &str) -> CryptoResult<PublicKey> {
        keys::decode_public_key(encoded)
    }

    async fn encrypt(&self, plaintext: &str, recipient: &PublicKey) -> CryptoResult<String> {
        let recipient = keys::key_array(recipient)?;
        let sealed = sealed::seal(plaintext.as_bytes(), &recipient)?;
        Ok(STANDARD.encode(sealed))
    }

    async fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        let sealed = STANDARD.decode(ciphertext.trim())?;
        let plaintext = sealed::open(&sealed, self.keys.secret())?;
        Ok(String::from_utf8(plaintext)?)
    }

    async fn hash_secret(&self, secret: &str) -> CryptoResult<String> {
        Ok(hash::hash_secret(secret))
    }

    fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }

    fn encoded_public_key(&self) -> String {
        self.keys.encoded_public_key()
    }
}

/// Leitet Kanal-Zugangsdaten aus Name und Geheimnis ab.
///
/// Einziger Weg zu einem `ChannelCredential` mit neuem Geheimnis: der Hash
/// wird hier immer frisch berechnet.
pub async fn derive_credential(
    provider: &dyn CryptoProvider,
    name: &str,
    secret: &str,
) -> CryptoResult<ChannelCredential> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CryptoError::UngueltigeDaten(
            "Kanal-Name darf nicht leer sein".into(),
        ));
    }
    let hashed = provider.hash_secret(secret).await?;
    tracing::debug!(kanal = %name, "Kanal-Zugangsdaten abgeleitet");
    Ok(ChannelCredential::from_parts(name, secret, hashed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verschluesseln_und_entschluesseln() {
        let alice = X25519Provider::generieren();
        let bob = X25519Provider::generieren();

        let ct = alice.encrypt("hi", &bob.public_key()).await.unwrap();
        assert_eq!(bob.decrypt(&ct).await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn falscher_empfaenger_kann_nicht_entschluesseln() {
        let alice = X25519Provider::generieren();
        let bob = X25519Provider::generieren();
        let eve = X25519Provider::generieren();

        let ct = alice.encrypt("nur bob", &bob.public_key()).await.unwrap();
        assert!(eve.decrypt(&ct).await.is_err());
    }

    #[tokio::test]
    async fn kein_base64_beim_entschluesseln() {
        let bob = X25519Provider::generieren();
        let err = bob.decrypt("%%%").await.unwrap_err();
        assert!(matches!(err, CryptoError::Base64(_)));
    }

    #[tokio::test]
    async fn schluessel_mit_falscher_laenge_beim_verschluesseln() {
        let alice = X25519Provider::generieren();
        let err = alice
            .encrypt("x", &PublicKey::new(vec![0u8; 5]))
            .await
            .unwrap_err();
        assert!(matches!(err, CryptoError::UngueltigeSchluesselLaenge { .. }));
    }

    #[tokio::test]
    async fn decode_key_passt_zum_kodierten_schluessel() {
        let alice = X25519Provider::generieren();
        let decoded = alice.decode_key(&alice.encoded_public_key()).unwrap();
        assert_eq!(decoded, alice.public_key());
    }

    #[tokio::test]
    async fn credential_hash_passt_zum_geheimnis() {
        let provider = X25519Provider::generieren();
        let cred = derive_credential(&provider, "general", "s3cret").await.unwrap();
        assert_eq!(cred.name(), "general");
        assert_eq!(cred.secret(), "s3cret");
        assert_eq!(cred.hashed_secret(), hash::hash_secret("s3cret"));
    }

    #[tokio::test]
    async fn neues_geheimnis_ergibt_neuen_hash() {
        let provider = X25519Provider::generieren();
        let alt = derive_credential(&provider, "general", "eins").await.unwrap();
        let neu = derive_credential(&provider, "general", "zwei").await.unwrap();
        assert_ne!(alt.hashed_secret(), neu.hashed_secret());
    }

    #[tokio::test]
    async fn leerer_kanal_name_wird_abgelehnt() {
        let provider = X25519Provider::generieren();
        assert!(derive_credential(&provider, "  ", "x").await.is_err());
    }
}
