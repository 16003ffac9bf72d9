//! TCP-Transport – Length-prefixed JSON ueber `FrameCodec`
//!
//! Die Verbindung wird in Sink und Stream geteilt. Der Sink liegt hinter
//! einem async Mutex (mehrere Zustell-Tasks senden parallel), der Stream
//! wird von einem Lese-Task gelesen, der alles als `TransportSignal` an den
//! aktuellen Abonnenten weiterreicht.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use saferchat_protocol::{Action, Envelope, FrameCodec};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;

use crate::error::{SessionError, SessionResult};
use crate::transport::{Transport, TransportSignal};

type FrameSink = SplitSink<Framed<TcpStream, FrameCodec>, Envelope>;
type FrameStream = SplitStream<Framed<TcpStream, FrameCodec>>;
type Abonnent = Arc<Mutex<Option<mpsc::UnboundedSender<TransportSignal>>>>;

/// Verbindung zum Chat-Server ueber TCP
pub struct TcpTransport {
    adresse: String,
    max_frame_size: usize,
    sink: Arc<tokio::sync::Mutex<Option<FrameSink>>>,
    abonnent: Abonnent,
}

impl TcpTransport {
    pub fn neu(adresse: impl Into<String>, max_frame_size: usize) -> Self {
        Self {
            adresse: adresse.into(),
            max_frame_size,
            sink: Arc::new(tokio::sync::Mutex::new(None)),
            abonnent: Arc::new(Mutex::new(None)),
        }
    }

    pub fn adresse(&self) -> &str {
        &self.adresse
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("adresse", &self.adresse)
            .field("max_frame_size", &self.max_frame_size)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self) -> SessionResult<()> {
        let mut sink = self.sink.lock().await;
        if sink.is_some() {
            return Ok(());
        }

        let stream = TcpStream::connect(&self.adresse).await?;
        stream.set_nodelay(true)?;
        tracing::info!(adresse = %self.adresse, "Verbunden mit Chat-Server");

        let framed = Framed::new(stream, FrameCodec::with_max_size(self.max_frame_size));
        let (schreiber, leser) = framed.split();
        *sink = Some(schreiber);

        tokio::spawn(lese_schleife(
            leser,
            Arc::clone(&self.sink),
            Arc::clone(&self.abonnent),
        ));
        Ok(())
    }

    async fn send(&self, action: Action) -> SessionResult<()> {
        let envelope = action.into_envelope()?;
        let typ = envelope.kind.clone();

        let mut sink = self.sink.lock().await;
        let Some(schreiber) = sink.as_mut() else {
            return Err(SessionError::transport("nicht verbunden"));
        };
        // Der Sink wird nur vom Lese-Task verworfen, wenn die Verbindung endet
        schreiber.send(envelope).await?;
        tracing::trace!(typ = %typ, "Envelope gesendet");
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<TransportSignal> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.abonnent.lock() = Some(tx);
        rx
    }
}

async fn lese_schleife(
    mut leser: FrameStream,
    sink: Arc<tokio::sync::Mutex<Option<FrameSink>>>,
    abonnent: Abonnent,
) {
    let ende = loop {
        match leser.next().await {
            Some(Ok(envelope)) => {
                tracing::trace!(typ = %envelope.kind, "Envelope empfangen");
                melden(&abonnent, TransportSignal::Envelope(envelope));
            }
            Some(Err(e)) => {
                tracing::warn!(fehler = %e, "Frame-Lesefehler");
                break TransportSignal::Error(e.to_string());
            }
            None => {
                tracing::info!("Verbindung vom Server getrennt");
                break TransportSignal::Closed;
            }
        }
    };

    // Erst den Sink verwerfen, damit ein folgendes connect() neu verbindet
    *sink.lock().await = None;
    melden(&abonnent, ende);
}

fn melden(abonnent: &Abonnent, signal: TransportSignal) {
    if let Some(tx) = abonnent.lock().as_ref() {
        if tx.send(signal).is_err() {
            tracing::debug!("Kein Abonnent mehr fuer Transport-Signale");
        }
    }
}
