//! Chat-Ereignisse im Nachrichten-Log
//!
//! Jedes Ereignis bekommt beim Anhaengen einen monoton steigenden Index,
//! der die Anzeigereihenfolge bestimmt. Angehaengte Ereignisse sind
//! unveraenderlich.

use chrono::{DateTime, Utc};

use crate::types::Peer;

/// Art eines Chat-Ereignisses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEventKind {
    /// Ein Peer ist dem Kanal beigetreten
    PeerJoined(Peer),
    /// Ein Peer hat den Kanal verlassen
    PeerLeft(Peer),
    /// Entschluesselte Nachricht eines Peers
    MessageReceived { from: Peer, text: String },
    /// Eigene Nachricht (lokales Echo)
    LocalSent(String),
}

impl ChatEventKind {
    /// Anzeigename des beteiligten Peers (None beim lokalen Echo)
    pub fn peer_name(&self) -> Option<&str> {
        match self {
            Self::PeerJoined(peer) | Self::PeerLeft(peer) => Some(&peer.display_name),
            Self::MessageReceived { from, .. } => Some(&from.display_name),
            Self::LocalSent(_) => None,
        }
    }
}

/// Ein Eintrag im Nachrichten-Log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Position im Log (monoton steigend, ab 0)
    pub index: u64,
    /// Zeitpunkt des Anhaengens
    pub at: DateTime<Utc>,
    pub kind: ChatEventKind,
}

impl ChatEvent {
    pub fn new(index: u64, kind: ChatEventKind) -> Self {
        Self {
            index,
            at: Utc::now(),
            kind,
        }
    }
}

impl std::fmt::Display for ChatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let zeit = self.at.format("%H:%M:%S");
        match &self.kind {
            ChatEventKind::PeerJoined(peer) => {
                write!(f, "[{zeit}] * {} joined the channel", peer.display_name)
            }
            ChatEventKind::PeerLeft(peer) => {
                write!(f, "[{zeit}] * {} left the channel", peer.display_name)
            }
            ChatEventKind::MessageReceived { from, text } => {
                write!(f, "[{zeit}] <{}> {}", from.display_name, text)
            }
            ChatEventKind::LocalSent(text) => write!(f, "[{zeit}] <me> {}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PublicKey;

    fn bob() -> Peer {
        Peer::new("bob", PublicKey::new(vec![7; 32]), "BwcH")
    }

    #[test]
    fn peer_name_je_art() {
        assert_eq!(ChatEventKind::PeerJoined(bob()).peer_name(), Some("bob"));
        assert_eq!(ChatEventKind::PeerLeft(bob()).peer_name(), Some("bob"));
        let msg = ChatEventKind::MessageReceived {
            from: bob(),
            text: "hi".into(),
        };
        assert_eq!(msg.peer_name(), Some("bob"));
        assert_eq!(ChatEventKind::LocalSent("x".into()).peer_name(), None);
    }

    #[test]
    fn anzeige_enthaelt_text() {
        let event = ChatEvent::new(
            3,
            ChatEventKind::MessageReceived {
                from: bob(),
                text: "hallo".into(),
            },
        );
        let zeile = event.to_string();
        assert!(zeile.contains("<bob> hallo"));

        let joined = ChatEvent::new(4, ChatEventKind::PeerJoined(bob())).to_string();
        assert!(joined.ends_with("bob joined the channel"));
    }
}
