//! Envelope – die Transporteinheit `{type, data}`
//!
//! Der Transport kennt nur Envelopes. Welche Aktion oder welches Ereignis
//! darin steckt, entscheiden `Action::into_envelope` und
//! `ServerEvent::from_envelope`.

use serde::{Deserialize, Serialize};

/// Typisierte Transporteinheit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Nachrichtentyp, z.B. `join` oder `peer_joined`
    #[serde(rename = "type")]
    pub kind: String,
    /// Nutzdaten (fehlt bei `leave` und `empty`)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Erstellt einen Envelope mit Nutzdaten
    pub fn new(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Erstellt einen Envelope ohne Nutzdaten
    pub fn leer(kind: impl Into<String>) -> Self {
        Self::new(kind, serde_json::Value::Null)
    }

    /// Serialisiert den Envelope als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert einen Envelope aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leerer_envelope_ohne_data_feld() {
        let json = Envelope::leer("leave").to_json().unwrap();
        assert_eq!(json, r#"{"type":"leave"}"#);
    }

    #[test]
    fn envelope_ohne_data_wird_gelesen() {
        let env = Envelope::from_json(r#"{"type":"empty"}"#).unwrap();
        assert_eq!(env.kind, "empty");
        assert!(env.data.is_null());
    }

    #[test]
    fn envelope_vergleichbar_in_signalen() {
        fn ist_eq<T: Eq>(_: &T) {}
        let env = Envelope::new("peer_left", serde_json::json!({"who": {"name": "bob"}}));
        ist_eq(&env);
        assert_eq!(env, env.clone());
    }
}
