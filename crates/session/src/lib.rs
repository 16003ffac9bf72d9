//! saferchat-session – Kanal-Session-Engine
//!
//! Dieses Crate implementiert:
//! - Session: Verbindungsphase, Beitritt/Verlassen, Reconnect, Ereignisverarbeitung
//! - Roster und Nachrichten-Log
//! - Keepalive-Timer und Benachrichtigungs-Policy
//! - Outbox: Zustellstatus pro Nachricht und Empfaenger
//! - Transport-Trait + TcpTransport-Implementierung
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use saferchat_session::{Session, SessionConfig, SessionHandle, TcpTransport};
//! # use saferchat_session::{NotificationPlatform, Presenter};
//! # fn kollaborateure() -> (Arc<dyn Presenter>, Arc<dyn NotificationPlatform>) { unimplemented!() }
//!
//! # async fn beispiel() -> Result<(), Box<dyn std::error::Error>> {
//! let crypto = Arc::new(saferchat_crypto::X25519Provider::generieren());
//! let transport = Arc::new(TcpTransport::neu("127.0.0.1:4000", 1024 * 1024));
//! let (presenter, plattform) = kollaborateure();
//!
//! let credential = saferchat_crypto::derive_credential(&*crypto, "lobby", "geheim").await?;
//! let identity = saferchat_core::Identity::new(
//!     "alice",
//!     saferchat_crypto::CryptoProvider::public_key(&*crypto),
//!     saferchat_crypto::CryptoProvider::encoded_public_key(&*crypto),
//! );
//!
//! let mut session = Session::neu(SessionConfig::default(), transport, crypto, presenter, plattform);
//! session.start(Some(identity), credential, Vec::new()).await?;
//!
//! let (handle, intents) = SessionHandle::kanal(32);
//! let laeuft = tokio::spawn(session.run(intents));
//! handle.send_message("hallo").await?;
//! handle.shutdown().await?;
//! laeuft.await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod keepalive;
pub mod log;
pub mod notify;
pub mod outbox;
pub mod presenter;
pub mod roster;
pub mod session;
pub mod tcp;
pub mod transport;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use keepalive::{Keepalive, MIN_KEEPALIVE};
pub use log::MessageLog;
pub use notify::{notification_text, NotificationDispatcher, NotificationPlatform};
pub use outbox::{DeliveryReport, DeliveryStatus, Outbox, MAX_ABGESCHLOSSEN};
pub use presenter::{CredentialPrompt, EditParams, Intent, Presenter, SessionHandle};
pub use roster::Roster;
pub use session::{Session, SERVER_NICHT_ERREICHBAR};
pub use tcp::TcpTransport;
pub use transport::{Transport, TransportSignal};
