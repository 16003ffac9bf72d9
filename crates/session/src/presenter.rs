//! Praesentationsgrenze
//!
//! Die Engine meldet Aenderungen ueber den `Presenter`. In die andere
//! Richtung schickt die Oberflaeche `Intent`s ueber ein `SessionHandle`.

use saferchat_core::{ChatEvent, ConnectionPhase};
use tokio::sync::mpsc;

use crate::error::{SessionError, SessionResult};

/// Rueckkanal der Engine zur Oberflaeche
pub trait Presenter: Send + Sync {
    /// Ein Ereignis wurde an das Log angehaengt
    fn event_appended(&self, event: &ChatEvent);

    /// Kurzer Hinweis fuer den Benutzer (z.B. Server nicht erreichbar)
    fn notice(&self, text: &str);

    /// Zugangsdaten erneut abfragen (nach abgelehntem Beitritt)
    fn prompt_credentials(&self, prompt: &CredentialPrompt);

    fn phase_changed(&self, _phase: ConnectionPhase) {}
}

/// Vorbelegung fuer den Zugangsdaten-Dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPrompt {
    pub display_name: String,
    pub channel: String,
}

/// Neue Identitaet und/oder neue Kanal-Zugangsdaten
#[derive(Clone, PartialEq, Eq)]
pub struct EditParams {
    pub display_name: String,
    pub channel: String,
    pub secret: String,
}

impl std::fmt::Debug for EditParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditParams")
            .field("display_name", &self.display_name)
            .field("channel", &self.channel)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Absicht der Oberflaeche
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SendMessage(String),
    Edit(EditParams),
    Shutdown,
}

/// Klonbarer Zugang zur laufenden Session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Intent>,
}

impl SessionHandle {
    /// Erzeugt Handle und Empfaenger fuer `Session::run`
    pub fn kanal(puffer: usize) -> (Self, mpsc::Receiver<Intent>) {
        let (tx, rx) = mpsc::channel(puffer);
        (Self { tx }, rx)
    }

    pub async fn send_message(&self, text: impl Into<String>) -> SessionResult<()> {
        self.senden(Intent::SendMessage(text.into())).await
    }

    pub async fn edit(&self, params: EditParams) -> SessionResult<()> {
        self.senden(Intent::Edit(params)).await
    }

    pub async fn shutdown(&self) -> SessionResult<()> {
        self.senden(Intent::Shutdown).await
    }

    async fn senden(&self, intent: Intent) -> SessionResult<()> {
        self.tx
            .send(intent)
            .await
            .map_err(|_| SessionError::NichtGestartet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handle_leitet_intents_weiter() {
        let (handle, mut rx) = SessionHandle::kanal(4);
        handle.send_message("hallo").await.unwrap();
        handle.clone().shutdown().await.unwrap();
        assert_eq!(rx.recv().await, Some(Intent::SendMessage("hallo".into())));
        assert_eq!(rx.recv().await, Some(Intent::Shutdown));
    }

    #[tokio::test]
    async fn handle_ohne_session() {
        let (handle, rx) = SessionHandle::kanal(1);
        drop(rx);
        assert!(matches!(
            handle.shutdown().await,
            Err(SessionError::NichtGestartet)
        ));
    }

    #[test]
    fn edit_debug_verbirgt_geheimnis() {
        let params = EditParams {
            display_name: "alice".into(),
            channel: "lobby".into(),
            secret: "hunter2".into(),
        };
        assert!(!format!("{:?}", params).contains("hunter2"));
    }
}
