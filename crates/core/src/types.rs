//! Gemeinsame Datentypen fuer saferchat
//!
//! Identitaet, Kanal-Zugangsdaten und Peers sind reine Werte. Sie werden
//! nie feldweise veraendert, sondern bei einer Aenderung komplett ersetzt.

use serde::{Deserialize, Serialize};

/// Oeffentlicher Schluessel (fuer die Engine opak)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    pub bytes: Vec<u8>,
}

impl PublicKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Lokale Identitaet des Benutzers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    display_name: String,
    public_key: PublicKey,
    encoded_public_key: String,
}

impl Identity {
    pub fn new(
        display_name: impl Into<String>,
        public_key: PublicKey,
        encoded_public_key: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            public_key,
            encoded_public_key: encoded_public_key.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn encoded_public_key(&self) -> &str {
        &self.encoded_public_key
    }

    /// Eine Identitaet ohne Anzeigenamen gilt als nicht vorhanden
    pub fn ist_leer(&self) -> bool {
        self.display_name.trim().is_empty()
    }
}

/// Zugangsdaten fuer einen Kanal
///
/// `hashed_secret` ist immer der Hash von `secret`. Es gibt keine Setter:
/// ein neues Geheimnis bedeutet neue Zugangsdaten, die ueber den
/// Crypto-Provider abgeleitet werden (`saferchat_crypto::derive_credential`).
#[derive(Clone, PartialEq, Eq)]
pub struct ChannelCredential {
    name: String,
    secret: String,
    hashed_secret: String,
}

impl ChannelCredential {
    /// Setzt Zugangsdaten aus bereits gehashtem Geheimnis zusammen.
    ///
    /// Der Aufrufer garantiert `hashed_secret == hash(secret)`.
    pub fn from_parts(
        name: impl Into<String>,
        secret: impl Into<String>,
        hashed_secret: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
            hashed_secret: hashed_secret.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn hashed_secret(&self) -> &str {
        &self.hashed_secret
    }
}

impl std::fmt::Debug for ChannelCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelCredential")
            .field("name", &self.name)
            .field("secret", &"[REDACTED]")
            .field("hashed_secret", &self.hashed_secret)
            .finish()
    }
}

/// Ein anderer Teilnehmer im Kanal
///
/// Schluessel im Roster ist der Anzeigename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub display_name: String,
    pub public_key: PublicKey,
    pub encoded_public_key: String,
}

impl Peer {
    pub fn new(
        display_name: impl Into<String>,
        public_key: PublicKey,
        encoded_public_key: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            public_key,
            encoded_public_key: encoded_public_key.into(),
        }
    }
}

/// Verbindungsphase einer Session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Joined,
    Leaving,
}

impl std::fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "getrennt"),
            Self::Connecting => write!(f, "verbinde"),
            Self::Joined => write!(f, "im Kanal"),
            Self::Leaving => write!(f, "verlasse Kanal"),
        }
    }
}
