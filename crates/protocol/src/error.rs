//! Fehlertypen fuer das Protokoll-Crate

use thiserror::Error;

/// Fehler beim Umwandeln zwischen Envelope und Aktion/Ereignis
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unbekannter Ereignistyp: {0}")]
    UnbekannterTyp(String),

    #[error("Ungueltige Nutzdaten fuer '{typ}': {quelle}")]
    UngueltigeDaten {
        typ: String,
        #[source]
        quelle: serde_json::Error,
    },

    #[error("Serialisierung fehlgeschlagen: {0}")]
    Serialisierung(#[from] serde_json::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
