//! Session – Zustandsmaschine eines Kanals
//!
//! Die Session ist der einzige Verbraucher eingehender Ereignisse und der
//! einzige Erzeuger ausgehender Aktionen. Signale vom Transport, Intents der
//! Oberflaeche, Keepalive-Ticks und Zustellmeldungen laufen ueber eine
//! `tokio::select!`-Schleife (`run`) und werden strikt nacheinander
//! verarbeitet.
//!
//! ## Zustaende
//! ```text
//! Disconnected -> Connecting -> Joined --(Transportfehler)--> Disconnected
//!      ^                          |                                |
//!      |                       Leaving -> Connecting (neue Daten)  |
//!      +------------------ Keepalive-Tick <------------------------+
//! ```

use std::sync::Arc;

use saferchat_core::{
    ChannelCredential, ChatEvent, ChatEventKind, ConnectionPhase, Identity, Peer, PublicKey,
};
use saferchat_crypto::{derive_credential, CryptoProvider};
use saferchat_protocol::{
    Action, CommandRejectedEvent, Envelope, JoinRequest, MessageReceivedEvent, PeerInfo,
    PeerJoinedEvent, PeerLeftEvent, SendMessageRequest, ServerEvent,
};
use tokio::sync::mpsc;

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::keepalive::Keepalive;
use crate::log::MessageLog;
use crate::notify::{NotificationDispatcher, NotificationPlatform};
use crate::outbox::{DeliveryReport, DeliveryStatus, Outbox};
use crate::presenter::{CredentialPrompt, EditParams, Intent, Presenter};
use crate::roster::Roster;
use crate::transport::{Transport, TransportSignal};

/// Hinweis bei Transportfehlern
pub const SERVER_NICHT_ERREICHBAR: &str = "The server is not available, try again later";

/// Eine Kanal-Session
pub struct Session {
    config: SessionConfig,
    transport: Arc<dyn Transport>,
    crypto: Arc<dyn CryptoProvider>,
    presenter: Arc<dyn Presenter>,
    notifier: NotificationDispatcher,

    identity: Option<Identity>,
    credential: Option<ChannelCredential>,
    roster: Roster,
    log: MessageLog,
    phase: ConnectionPhase,
    /// Server hat die aktuellen Zugangsdaten abgelehnt
    credential_rejected: bool,
    generation: u64,

    keepalive: Option<Keepalive>,
    inbound: Option<mpsc::UnboundedReceiver<TransportSignal>>,
    outbox: Outbox,
}

impl Session {
    pub fn neu(
        config: SessionConfig,
        transport: Arc<dyn Transport>,
        crypto: Arc<dyn CryptoProvider>,
        presenter: Arc<dyn Presenter>,
        platform: Arc<dyn NotificationPlatform>,
    ) -> Self {
        Self {
            config,
            transport,
            crypto,
            presenter,
            notifier: NotificationDispatcher::neu(platform),
            identity: None,
            credential: None,
            roster: Roster::new(),
            log: MessageLog::new(),
            phase: ConnectionPhase::Disconnected,
            credential_rejected: false,
            generation: 0,
            keepalive: None,
            inbound: None,
            outbox: Outbox::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Zugriff
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn credential(&self) -> Option<&ChannelCredential> {
        self.credential.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ist_abgelehnt(&self) -> bool {
        self.credential_rejected
    }

    /// Zustellstatus der eigenen Nachricht mit diesem Log-Index
    pub fn delivery_status(&self, index: u64) -> Option<&DeliveryStatus> {
        self.outbox.status(index)
    }

    /// Wartet bis alle laufenden Zustellungen gemeldet haben
    pub async fn settle_deliveries(&mut self) {
        self.outbox.settle().await;
    }

    // -----------------------------------------------------------------------
    // Lebenszyklus
    // -----------------------------------------------------------------------

    /// Startet die Session: Roster setzen, verbinden, Keepalive starten, beitreten.
    ///
    /// Ohne (nicht-leere) Identitaet startet nichts. Ein fehlgeschlagener
    /// Verbindungsaufbau ist kein Fehler, der Keepalive versucht es erneut.
    pub async fn start(
        &mut self,
        identity: Option<Identity>,
        credential: ChannelCredential,
        initial_peers: Vec<Peer>,
    ) -> SessionResult<()> {
        let identity = identity
            .filter(|i| !i.ist_leer())
            .ok_or(SessionError::KeineIdentitaet)?;

        tracing::info!(
            name = %identity.display_name(),
            kanal = %credential.name(),
            peers = initial_peers.len(),
            "Session wird gestartet"
        );

        self.identity = Some(identity);
        self.credential = Some(credential);
        self.credential_rejected = false;
        self.roster = Roster::from_peers(initial_peers);
        self.inbound = Some(self.transport.subscribe());
        self.keepalive = Some(Keepalive::starten(self.config.keepalive_intervall));

        if let Err(e) = self.verbinden_und_beitreten().await {
            self.fehler_behandeln(e);
        }
        Ok(())
    }

    /// Beendet die Session: Keepalive stoppen, Abonnement loesen,
    /// laufende Zustellungen abkoppeln.
    pub fn teardown(&mut self) {
        if let Some(keepalive) = self.keepalive.take() {
            keepalive.cancel();
        }
        self.inbound = None;
        self.outbox.detach_all();
        self.neue_generation();
        self.phase_setzen(ConnectionPhase::Disconnected);
        tracing::info!("Session beendet");
    }

    /// Ereignisschleife bis `Intent::Shutdown` oder alle Handles weg sind
    pub async fn run(mut self, mut intents: mpsc::Receiver<Intent>) -> Self {
        loop {
            tokio::select! {
                signal = naechstes_signal(&mut self.inbound) => match signal {
                    Some(signal) => self.handle_transport_signal(signal).await,
                    None => {
                        tracing::debug!("Transport hat den Signal-Kanal geschlossen");
                        self.inbound = None;
                    }
                },

                intent = intents.recv() => match intent {
                    Some(Intent::SendMessage(text)) => {
                        self.send_message(&text);
                    }
                    Some(Intent::Edit(params)) => {
                        if let Err(e) = self.edit_identity_or_channel(params).await {
                            self.fehler_behandeln(e);
                        }
                    }
                    Some(Intent::Shutdown) | None => break,
                },

                _ = naechster_tick(&mut self.keepalive) => {
                    self.keepalive_tick().await;
                }

                Some(report) = self.outbox.next_report(), if !self.outbox.is_idle() => {
                    self.record_delivery(report);
                }
            }
        }

        self.teardown();
        self
    }

    // -----------------------------------------------------------------------
    // Eingehende Ereignisse
    // -----------------------------------------------------------------------

    /// Verarbeitet ein Signal des Transports
    pub async fn handle_transport_signal(&mut self, signal: TransportSignal) {
        match signal {
            TransportSignal::Envelope(envelope) => {
                if let Err(e) = self.handle_inbound(envelope).await {
                    self.fehler_behandeln(e);
                }
            }
            TransportSignal::Error(grund) => {
                self.fehler_behandeln(SessionError::Transport(grund));
            }
            TransportSignal::Closed => {
                tracing::info!("Verbindung beendet, baue neu auf");
                self.phase_setzen(ConnectionPhase::Disconnected);
                if let Err(e) = self.verbinden_und_beitreten().await {
                    self.fehler_behandeln(e);
                }
            }
        }
    }

    /// Verarbeitet ein Envelope vom Server
    pub async fn handle_inbound(&mut self, envelope: Envelope) -> SessionResult<()> {
        match ServerEvent::from_envelope(envelope)? {
            ServerEvent::PeerJoined(event) => self.peer_beigetreten(event),
            ServerEvent::MessageReceived(event) => self.nachricht_empfangen(event).await,
            ServerEvent::PeerLeft(event) => {
                self.peer_gegangen(event);
                Ok(())
            }
            ServerEvent::CommandRejected(event) => {
                self.abgelehnt(event);
                Ok(())
            }
        }
    }

    fn peer_beigetreten(&mut self, event: PeerJoinedEvent) -> SessionResult<()> {
        let PeerInfo { name, key } = event.who;
        // Ohne gueltigen Schluessel kein Roster-Eintrag und kein Log-Eintrag
        let public_key = self.crypto.decode_key(&key)?;
        let peer = Peer::new(name, public_key, key);

        if !self.roster.upsert(peer.clone()) {
            tracing::debug!(peer = %peer.display_name, "Bekannter Peer erneut beigetreten");
        }
        tracing::info!(peer = %peer.display_name, "Peer beigetreten");
        self.anhaengen(ChatEventKind::PeerJoined(peer));
        Ok(())
    }

    async fn nachricht_empfangen(&mut self, event: MessageReceivedEvent) -> SessionResult<()> {
        let Some(absender) = self.roster.get(&event.from.name).cloned() else {
            tracing::debug!(absender = %event.from.name, "Nachricht von unbekanntem Peer verworfen");
            return Ok(());
        };
        let text = self.crypto.decrypt(&event.message).await?;
        self.anhaengen(ChatEventKind::MessageReceived {
            from: absender,
            text,
        });
        Ok(())
    }

    fn peer_gegangen(&mut self, event: PeerLeftEvent) {
        match self.roster.remove(&event.who.name) {
            Some(peer) => {
                tracing::info!(peer = %peer.display_name, "Peer hat den Kanal verlassen");
                self.anhaengen(ChatEventKind::PeerLeft(peer));
            }
            None => {
                tracing::debug!(peer = %event.who.name, "Unbekannter Peer verlassen, ignoriert");
            }
        }
    }

    fn abgelehnt(&mut self, event: CommandRejectedEvent) {
        tracing::warn!(grund = %event.reason, "Server hat Beitritt abgelehnt");
        self.credential_rejected = true;
        self.phase_setzen(ConnectionPhase::Disconnected);
        self.presenter.notice(&event.reason);

        let prompt = CredentialPrompt {
            display_name: self
                .identity
                .as_ref()
                .map(|i| i.display_name().to_string())
                .unwrap_or_default(),
            channel: self
                .credential
                .as_ref()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
        };
        self.presenter.prompt_credentials(&prompt);
    }

    // -----------------------------------------------------------------------
    // Ausgehende Aktionen
    // -----------------------------------------------------------------------

    /// Sendet eine Nachricht an alle Peers im Roster.
    ///
    /// Das lokale Echo wird sofort angehaengt, danach laeuft pro Peer ein
    /// eigener Task (verschluesseln, senden). Gibt den Log-Index zurueck.
    pub fn send_message(&mut self, text: &str) -> Option<u64> {
        if text.is_empty() {
            return None;
        }

        let index = self.anhaengen(ChatEventKind::LocalSent(text.to_string()));
        self.outbox.register(index, self.roster.len());

        for peer in self.roster.iter() {
            let crypto = Arc::clone(&self.crypto);
            let transport = Arc::clone(&self.transport);
            let empfaenger = peer.display_name.clone();
            let schluessel = peer.public_key.clone();
            let text = text.to_string();
            let generation = self.generation;

            self.outbox.dispatch(async move {
                let outcome = zustellen(&*crypto, &*transport, &empfaenger, &schluessel, &text)
                    .await
                    .map_err(|e| e.to_string());
                DeliveryReport {
                    index,
                    generation,
                    recipient: empfaenger,
                    outcome,
                }
            });
        }

        tracing::debug!(index, empfaenger = self.roster.len(), "Nachricht verteilt");
        Some(index)
    }

    /// Tritt dem Kanal mit diesen Zugangsdaten bei
    pub async fn join_channel(&mut self, credential: ChannelCredential) -> SessionResult<()> {
        let identity = self.identity.as_ref().ok_or(SessionError::KeineIdentitaet)?;
        let request = JoinRequest {
            channel: credential.name().to_string(),
            hashed_secret: credential.hashed_secret().to_string(),
            name: PeerInfo {
                name: identity.display_name().to_string(),
                key: identity.encoded_public_key().to_string(),
            },
        };
        self.credential = Some(credential);
        self.credential_rejected = false;

        self.phase_setzen(ConnectionPhase::Connecting);
        tracing::info!(kanal = %request.channel, "Trete Kanal bei");
        self.transport.send(Action::Join(request)).await?;
        self.phase_setzen(ConnectionPhase::Joined);
        Ok(())
    }

    /// Verlaesst den Kanal (ohne auf Bestaetigung zu warten)
    pub async fn leave_channel(&mut self) -> SessionResult<()> {
        self.phase_setzen(ConnectionPhase::Leaving);
        self.transport.send(Action::Leave).await?;
        self.phase_setzen(ConnectionPhase::Disconnected);
        tracing::info!("Kanal verlassen");
        Ok(())
    }

    /// Ersetzt Identitaet und Zugangsdaten.
    ///
    /// Nur eine beigetretene Session sendet sofort `Leave` und `Join`. Nach
    /// einer Ablehnung wird mit den neuen Daten erneut beigetreten.
    pub async fn edit_identity_or_channel(&mut self, params: EditParams) -> SessionResult<()> {
        let identity = Identity::new(
            params.display_name.trim(),
            self.crypto.public_key(),
            self.crypto.encoded_public_key(),
        );
        if identity.ist_leer() {
            return Err(SessionError::ungueltig("Anzeigename ist leer"));
        }
        if params.channel.trim().is_empty() {
            return Err(SessionError::ungueltig("Kanal-Name ist leer"));
        }
        let credential =
            derive_credential(&*self.crypto, &params.channel, &params.secret).await?;

        let war_beigetreten = self.phase == ConnectionPhase::Joined;
        let erneut_versuchen = self.credential_rejected;
        let kanal_gewechselt = self
            .credential
            .as_ref()
            .map_or(true, |alt| alt.name() != credential.name());

        tracing::info!(
            name = %identity.display_name(),
            kanal = %credential.name(),
            kanal_gewechselt,
            "Identitaet/Kanal geaendert"
        );

        // Neue Daten gelten sofort, auch wenn Leave/Join am Transport scheitern
        self.neue_generation();
        self.identity = Some(identity);
        self.credential = Some(credential.clone());
        if kanal_gewechselt {
            self.roster.clear();
        }

        if war_beigetreten {
            self.leave_channel().await?;
            self.join_channel(credential).await
        } else if erneut_versuchen {
            self.credential_rejected = false;
            self.verbinden_und_beitreten().await
        } else {
            Ok(())
        }
    }

    /// Ein Keepalive-Tick: bei Bedarf neu verbinden, dann `Empty` senden
    pub async fn keepalive_tick(&mut self) {
        let verbunden = matches!(
            self.phase,
            ConnectionPhase::Joined | ConnectionPhase::Connecting
        );
        if !verbunden {
            tracing::debug!(phase = %self.phase, "Keepalive: Verbindung wird neu aufgebaut");
            if let Err(e) = self.verbinden_und_beitreten().await {
                self.fehler_behandeln(e);
                return;
            }
        }
        if let Err(e) = self.transport.send(Action::Empty).await {
            self.fehler_behandeln(e);
        }
    }

    // -----------------------------------------------------------------------
    // Interne Helfer
    // -----------------------------------------------------------------------

    /// Verbinden und (falls nicht abgelehnt) dem Kanal beitreten
    async fn verbinden_und_beitreten(&mut self) -> SessionResult<()> {
        if self.credential_rejected {
            // Phase bleibt Disconnected bis neue Zugangsdaten kommen
            self.transport.connect().await?;
            tracing::debug!("Zugangsdaten abgelehnt, kein automatischer Beitritt");
            return Ok(());
        }

        self.phase_setzen(ConnectionPhase::Connecting);
        self.transport.connect().await?;
        let credential = self.credential.clone().ok_or(SessionError::NichtGestartet)?;
        self.join_channel(credential).await
    }

    fn record_delivery(&mut self, report: DeliveryReport) {
        self.outbox.record(report);
    }

    fn anhaengen(&mut self, kind: ChatEventKind) -> u64 {
        let event: &ChatEvent = self.log.append(kind);
        self.presenter.event_appended(event);
        self.notifier.dispatch(&event.kind);
        event.index
    }

    fn phase_setzen(&mut self, phase: ConnectionPhase) {
        if self.phase != phase {
            tracing::debug!(von = %self.phase, nach = %phase, "Phasenwechsel");
            self.phase = phase;
            self.presenter.phase_changed(phase);
        }
    }

    fn neue_generation(&mut self) {
        self.generation += 1;
        self.outbox.neue_generation(self.generation);
    }

    fn fehler_behandeln(&mut self, fehler: SessionError) {
        if fehler.ist_wiederholbar() {
            tracing::warn!(fehler = %fehler, "Transportfehler");
            self.presenter.notice(SERVER_NICHT_ERREICHBAR);
            self.phase_setzen(ConnectionPhase::Disconnected);
        } else if fehler.ist_krypto() {
            tracing::warn!(fehler = %fehler, "Ereignis verworfen");
        } else if let SessionError::Protokoll(_) = fehler {
            tracing::debug!(fehler = %fehler, "Envelope ignoriert");
        } else if let SessionError::UngueltigeEingabe(_) = fehler {
            tracing::warn!(fehler = %fehler, "Eingabe abgelehnt");
            self.presenter.notice("Display name and channel must not be empty");
        } else {
            tracing::warn!(fehler = %fehler, "Aktion fehlgeschlagen");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("credential", &self.credential)
            .field("phase", &self.phase)
            .field("peers", &self.roster.len())
            .field("events", &self.log.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

async fn zustellen(
    crypto: &dyn CryptoProvider,
    transport: &dyn Transport,
    empfaenger: &str,
    schluessel: &PublicKey,
    text: &str,
) -> SessionResult<()> {
    let message = crypto.encrypt(text, schluessel).await?;
    transport
        .send(Action::SendMessage(SendMessageRequest {
            to: empfaenger.to_string(),
            message,
        }))
        .await
}

async fn naechstes_signal(
    inbound: &mut Option<mpsc::UnboundedReceiver<TransportSignal>>,
) -> Option<TransportSignal> {
    match inbound {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn naechster_tick(keepalive: &mut Option<Keepalive>) {
    match keepalive {
        Some(k) => k.tick().await,
        None => std::future::pending().await,
    }
}
