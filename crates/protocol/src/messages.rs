//! Aktions- und Ereignisvokabular
//!
//! Ausgehend (Client -> Server): `join`, `leave`, `send_message`, `empty`.
//! Eingehend (Server -> Client): `peer_joined`, `message_received`,
//! `peer_left`, `command_rejected`.
//!
//! ## Beispiel `join`
//! ```text
//! {"type":"join","data":{"channel":"lobby","secret":"<sha256-hex>",
//!   "name":{"name":"alice","key":"<base64>"}}}
//! ```

use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::error::{ProtocolError, ProtocolResult};

// ---------------------------------------------------------------------------
// Envelope-Typen
// ---------------------------------------------------------------------------

pub const TYP_JOIN: &str = "join";
pub const TYP_LEAVE: &str = "leave";
pub const TYP_SEND_MESSAGE: &str = "send_message";
pub const TYP_EMPTY: &str = "empty";

pub const TYP_PEER_JOINED: &str = "peer_joined";
pub const TYP_MESSAGE_RECEIVED: &str = "message_received";
pub const TYP_PEER_LEFT: &str = "peer_left";
pub const TYP_COMMAND_REJECTED: &str = "command_rejected";

// ---------------------------------------------------------------------------
// Nutzdaten
// ---------------------------------------------------------------------------

/// Name + kodierter oeffentlicher Schluessel eines Teilnehmers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub name: String,
    pub key: String,
}

/// Verweis auf einen Teilnehmer nur ueber den Namen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRef {
    pub name: String,
}

/// Kanal beitreten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub channel: String,
    /// Gehashtes Kanal-Geheimnis (nie das Klartext-Geheimnis)
    #[serde(rename = "secret")]
    pub hashed_secret: String,
    /// Eigene Identitaet
    pub name: PeerInfo,
}

/// Verschluesselte Nachricht an genau einen Empfaenger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub to: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerJoinedEvent {
    pub who: PeerInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceivedEvent {
    pub from: PeerRef,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerLeftEvent {
    pub who: PeerRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRejectedEvent {
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Aktionen (ausgehend)
// ---------------------------------------------------------------------------

/// Alle Aktionen die der Client sendet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Join(JoinRequest),
    Leave,
    SendMessage(SendMessageRequest),
    /// Keepalive ohne Inhalt
    Empty,
}

impl Action {
    /// Envelope-Typ der Aktion
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join(_) => TYP_JOIN,
            Self::Leave => TYP_LEAVE,
            Self::SendMessage(_) => TYP_SEND_MESSAGE,
            Self::Empty => TYP_EMPTY,
        }
    }

    /// Verpackt die Aktion in einen Envelope
    pub fn into_envelope(self) -> ProtocolResult<Envelope> {
        let kind = self.kind();
        Ok(match self {
            Self::Join(req) => Envelope::new(kind, serde_json::to_value(req)?),
            Self::SendMessage(req) => Envelope::new(kind, serde_json::to_value(req)?),
            Self::Leave | Self::Empty => Envelope::leer(kind),
        })
    }

    /// Liest eine Aktion aus einem Envelope (Gegenstelle/Tests)
    pub fn from_envelope(envelope: Envelope) -> ProtocolResult<Self> {
        match envelope.kind.as_str() {
            TYP_JOIN => Ok(Self::Join(nutzdaten(envelope)?)),
            TYP_LEAVE => Ok(Self::Leave),
            TYP_SEND_MESSAGE => Ok(Self::SendMessage(nutzdaten(envelope)?)),
            TYP_EMPTY => Ok(Self::Empty),
            _ => Err(ProtocolError::UnbekannterTyp(envelope.kind)),
        }
    }
}

// ---------------------------------------------------------------------------
// Ereignisse (eingehend)
// ---------------------------------------------------------------------------

/// Alle Ereignisse die der Server sendet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    PeerJoined(PeerJoinedEvent),
    MessageReceived(MessageReceivedEvent),
    PeerLeft(PeerLeftEvent),
    CommandRejected(CommandRejectedEvent),
}

impl ServerEvent {
    /// Envelope-Typ des Ereignisses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PeerJoined(_) => TYP_PEER_JOINED,
            Self::MessageReceived(_) => TYP_MESSAGE_RECEIVED,
            Self::PeerLeft(_) => TYP_PEER_LEFT,
            Self::CommandRejected(_) => TYP_COMMAND_REJECTED,
        }
    }

    /// Dekodiert ein Ereignis; unbekannte Typen ergeben `UnbekannterTyp`
    pub fn from_envelope(envelope: Envelope) -> ProtocolResult<Self> {
        match envelope.kind.as_str() {
            TYP_PEER_JOINED => Ok(Self::PeerJoined(nutzdaten(envelope)?)),
            TYP_MESSAGE_RECEIVED => Ok(Self::MessageReceived(nutzdaten(envelope)?)),
            TYP_PEER_LEFT => Ok(Self::PeerLeft(nutzdaten(envelope)?)),
            TYP_COMMAND_REJECTED => Ok(Self::CommandRejected(nutzdaten(envelope)?)),
            _ => Err(ProtocolError::UnbekannterTyp(envelope.kind)),
        }
    }

    /// Verpackt das Ereignis in einen Envelope (Gegenstelle/Tests)
    pub fn into_envelope(self) -> ProtocolResult<Envelope> {
        let kind = self.kind();
        let data = match self {
            Self::PeerJoined(e) => serde_json::to_value(e)?,
            Self::MessageReceived(e) => serde_json::to_value(e)?,
            Self::PeerLeft(e) => serde_json::to_value(e)?,
            Self::CommandRejected(e) => serde_json::to_value(e)?,
        };
        Ok(Envelope::new(kind, data))
    }
}

fn nutzdaten<T: serde::de::DeserializeOwned>(envelope: Envelope) -> ProtocolResult<T> {
    let Envelope { kind, data } = envelope;
    serde_json::from_value(data).map_err(|quelle| ProtocolError::UngueltigeDaten { typ: kind, quelle })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_wire_format() {
        let action = Action::Join(JoinRequest {
            channel: "lobby".into(),
            hashed_secret: "abc".into(),
            name: PeerInfo {
                name: "alice".into(),
                key: "KEY".into(),
            },
        });
        let env = action.into_envelope().unwrap();
        assert_eq!(env.kind, "join");
        assert_eq!(
            env.data,
            json!({"channel": "lobby", "secret": "abc", "name": {"name": "alice", "key": "KEY"}})
        );
    }

    #[test]
    fn leave_und_empty_ohne_nutzdaten() {
        let leave = Action::Leave.into_envelope().unwrap();
        assert_eq!(leave.to_json().unwrap(), r#"{"type":"leave"}"#);
        let empty = Action::Empty.into_envelope().unwrap();
        assert_eq!(empty.to_json().unwrap(), r#"{"type":"empty"}"#);
    }

    #[test]
    fn peer_joined_aus_json() {
        let env = Envelope::from_json(
            r#"{"type":"peer_joined","data":{"who":{"name":"bob","key":"Qk9C"}}}"#,
        )
        .unwrap();
        let event = ServerEvent::from_envelope(env).unwrap();
        assert_eq!(
            event,
            ServerEvent::PeerJoined(PeerJoinedEvent {
                who: PeerInfo {
                    name: "bob".into(),
                    key: "Qk9C".into()
                }
            })
        );
    }

    #[test]
    fn command_rejected_aus_json() {
        let env = Envelope::new("command_rejected", json!({"reason": "bad secret"}));
        match ServerEvent::from_envelope(env).unwrap() {
            ServerEvent::CommandRejected(e) => assert_eq!(e.reason, "bad secret"),
            other => panic!("Erwartet CommandRejected, erhalten {:?}", other),
        }
    }

    #[test]
    fn unbekannter_typ_wird_abgelehnt() {
        let env = Envelope::new("voice_init", json!({}));
        let err = ServerEvent::from_envelope(env).unwrap_err();
        assert!(matches!(err, ProtocolError::UnbekannterTyp(t) if t == "voice_init"));
    }

    #[test]
    fn fehlende_felder_werden_gemeldet() {
        let env = Envelope::new("message_received", json!({"from": {"name": "bob"}}));
        let err = ServerEvent::from_envelope(env).unwrap_err();
        assert!(matches!(err, ProtocolError::UngueltigeDaten { ref typ, .. } if typ == "message_received"));
    }

    #[test]
    fn send_message_zurueck_lesbar() {
        let aktion = Action::SendMessage(SendMessageRequest {
            to: "bob".into(),
            message: "c1ph3r".into(),
        });
        let env = aktion.clone().into_envelope().unwrap();
        assert_eq!(Action::from_envelope(env).unwrap(), aktion);
    }
}
