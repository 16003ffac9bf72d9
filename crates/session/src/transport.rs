//! Transport-Schnittstelle
//!
//! Der Transport bewegt Envelopes zwischen Client und Server. Die Engine
//! sendet `Action`s und bekommt ueber `subscribe` einen Strom von Signalen.

use async_trait::async_trait;
use saferchat_protocol::{Action, Envelope};
use tokio::sync::mpsc;

use crate::error::SessionResult;

/// Signal vom Transport an die Engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    /// Ein Envelope vom Server
    Envelope(Envelope),
    /// Verbindungsfehler (Verbindung ist danach getrennt)
    Error(String),
    /// Verbindung wurde sauber beendet
    Closed,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Baut die Verbindung auf. Ist sie schon offen, passiert nichts.
    async fn connect(&self) -> SessionResult<()>;

    /// Sendet eine Aktion. Kehrt zurueck sobald der Transport sie angenommen hat.
    async fn send(&self, action: Action) -> SessionResult<()>;

    /// Neuer Empfaenger fuer Signale. Ersetzt einen frueheren Abonnenten.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<TransportSignal>;
}
