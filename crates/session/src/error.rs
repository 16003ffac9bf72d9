//! Fehlertypen der Session-Engine

use saferchat_crypto::CryptoError;
use saferchat_protocol::ProtocolError;
use thiserror::Error;

/// Fehlertyp der Session-Engine
#[derive(Debug, Error)]
pub enum SessionError {
    /// Ohne Identitaet startet die Engine nicht
    #[error("Keine Identitaet vorhanden")]
    KeineIdentitaet,

    /// Operation erfordert eine gestartete Session
    #[error("Session wurde nicht gestartet")]
    NichtGestartet,

    /// Ungueltige Eingabe der Oberflaeche (leerer Name/Kanal)
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    /// Transport nicht verfuegbar oder Senden fehlgeschlagen
    #[error("Transportfehler: {0}")]
    Transport(String),

    /// Schluessel-Dekodierung oder Entschluesselung fehlgeschlagen
    #[error("Kryptografiefehler: {0}")]
    Krypto(#[from] CryptoError),

    /// Ungueltiges oder unbekanntes Envelope
    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] ProtocolError),

    /// IO-Fehler (TCP)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Erstellt einen Transportfehler
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Erstellt einen Eingabefehler
    pub fn ungueltig(msg: impl Into<String>) -> Self {
        Self::UngueltigeEingabe(msg.into())
    }

    /// Transportfehler sind voruebergehend: Keepalive/Reconnect beheben sie
    pub fn ist_wiederholbar(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Io(_))
    }

    /// Fehler bei Schluessel-Dekodierung oder Entschluesselung
    pub fn ist_krypto(&self) -> bool {
        matches!(self, Self::Krypto(_))
    }
}

/// Result-Typ der Session-Engine
pub type SessionResult<T> = Result<T, SessionError>;
