//! saferchat-core – Gemeinsame Datentypen
//!
//! Dieses Crate stellt die Werte bereit, die Engine, Crypto-Provider und
//! Client gemeinsam nutzen: Identitaet, Kanal-Zugangsdaten, Peers,
//! Verbindungsphase und Chat-Ereignisse.

pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use event::{ChatEvent, ChatEventKind};
pub use types::{ChannelCredential, ConnectionPhase, Identity, Peer, PublicKey};
