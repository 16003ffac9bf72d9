//! Verschluesselung pro Empfaenger (Sealed Box)
//!
//! Jede Nachricht wird fuer genau einen Empfaenger versiegelt:
//! 1. Ephemeres X25519-Schluessel-Paar generieren
//! 2. DH mit dem oeffentlichen Schluessel des Empfaengers
//! 3. HKDF-SHA256 -> Nachrichten-Schluessel (Salt: ephemeral || empfaenger)
//! 4. AES-256-GCM verschluesseln
//!
//! ## Format
//! ```text
//! [ephemeral_public(32)] [nonce(12)] [ciphertext + auth_tag(16)]
//! ```

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey, StaticSecret};

use crate::error::{CryptoError, CryptoResult};
use crate::keys::KEY_LEN;
use crate::types::SecretBytes;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const INFO: &[u8] = b"saferchat-message-v1";

/// Versiegelt `plaintext` fuer den Empfaenger mit `recipient_public_key`
pub fn seal(plaintext: &[u8], recipient_public_key: &[u8; KEY_LEN]) -> CryptoResult<Vec<u8>> {
    let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = X25519PublicKey::from(&ephemeral_secret);

    let recipient_pk = X25519PublicKey::from(*recipient_public_key);
    let dh_output = ephemeral_secret.diffie_hellman(&recipient_pk);

    let message_key = derive_message_key(
        dh_output.as_bytes(),
        ephemeral_public.as_bytes(),
        recipient_public_key,
    )?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(message_key.as_bytes()));
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;

    let mut out = Vec::with_capacity(KEY_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(ephemeral_public.as_bytes());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Oeffnet eine versiegelte Nachricht mit dem eigenen privaten Schluessel
pub fn open(sealed: &[u8], recipient_secret: &StaticSecret) -> CryptoResult<Vec<u8>> {
    if sealed.len() < KEY_LEN + NONCE_LEN + TAG_LEN {
        return Err(CryptoError::UngueltigeDaten(format!(
            "Versiegelte Nachricht zu kurz: {} Bytes",
            sealed.len()
        )));
    }

    let (ephemeral_bytes, rest) = sealed.split_at(KEY_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let mut ephemeral = [0u8; KEY_LEN];
    ephemeral.copy_from_slice(ephemeral_bytes);
    let ephemeral_public = X25519PublicKey::from(ephemeral);

    let own_public = X25519PublicKey::from(recipient_secret);
    let dh_output = recipient_secret.diffie_hellman(&ephemeral_public);

    let message_key =
        derive_message_key(dh_output.as_bytes(), &ephemeral, own_public.as_bytes())?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(message_key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))
}

fn derive_message_key(
    dh_secret: &[u8],
    ephemeral_public: &[u8; KEY_LEN],
    recipient_public: &[u8; KEY_LEN],
) -> CryptoResult<SecretBytes> {
    let mut salt = [0u8; 2 * KEY_LEN];
    salt[..KEY_LEN].copy_from_slice(ephemeral_public);
    salt[KEY_LEN..].copy_from_slice(recipient_public);

    let hk = Hkdf::<Sha256>::new(Some(&salt), dh_secret);
    let mut okm = vec![0u8; 32];
    hk.expand(INFO, &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(SecretBytes::new(okm))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
