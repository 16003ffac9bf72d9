//! saferchat-protocol – Netzwerkprotokoll-Definitionen
//!
//! Definiert den `{type, data}`-Envelope, das Aktions- und
//! Ereignisvokabular zwischen Client und Server sowie den Frame-Codec
//! fuer die TCP-Verbindung.

pub mod envelope;
pub mod error;
pub mod messages;
pub mod wire;

pub use envelope::Envelope;
pub use error::{ProtocolError, ProtocolResult};
pub use messages::{
    Action, CommandRejectedEvent, JoinRequest, MessageReceivedEvent, PeerInfo, PeerJoinedEvent,
    PeerLeftEvent, PeerRef, SendMessageRequest, ServerEvent,
};
pub use wire::FrameCodec;
