//! Test-Kollaborateure: Transport, Crypto, Plattform, Presenter

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use saferchat_core::{
    ChannelCredential, ChatEvent, ConnectionPhase, Identity, Peer, PublicKey,
};
use saferchat_crypto::{CryptoError, CryptoProvider, CryptoResult};
use saferchat_protocol::{Action, Envelope, ServerEvent};
use tokio::sync::mpsc;

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::notify::NotificationPlatform;
use crate::presenter::{CredentialPrompt, Presenter};
use crate::session::Session;
use crate::transport::{Transport, TransportSignal};

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockTransport {
    pub gesendet: Mutex<Vec<Action>>,
    pub verbindungen: AtomicUsize,
    pub connect_fehler: AtomicBool,
    pub send_fehler: AtomicBool,
    /// Empfaenger, an die das Senden fehlschlaegt
    pub fehler_fuer: Mutex<HashSet<String>>,
    /// Verzoegerung fuer `SendMessage`
    pub verzoegerung: Mutex<Option<Duration>>,
    abonnent: Mutex<Option<mpsc::UnboundedSender<TransportSignal>>>,
}

impl MockTransport {
    pub fn gesendet(&self) -> Vec<Action> {
        self.gesendet.lock().clone()
    }

    pub fn leeren(&self) {
        self.gesendet.lock().clear();
    }

    pub fn joins(&self) -> Vec<saferchat_protocol::JoinRequest> {
        self.gesendet()
            .into_iter()
            .filter_map(|a| match a {
                Action::Join(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    pub fn signal(&self, signal: TransportSignal) {
        if let Some(tx) = self.abonnent.lock().as_ref() {
            tx.send(signal).unwrap();
        }
    }

    pub fn ereignis(&self, event: ServerEvent) {
        self.signal(TransportSignal::Envelope(event.into_envelope().unwrap()));
    }

    pub fn hat_abonnent(&self) -> bool {
        self.abonnent
            .lock()
            .as_ref()
            .map_or(false, |tx| !tx.is_closed())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) -> SessionResult<()> {
        if self.connect_fehler.load(Ordering::SeqCst) {
            return Err(SessionError::transport("connection refused"));
        }
        self.verbindungen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, action: Action) -> SessionResult<()> {
        if let Action::SendMessage(req) = &action {
            let verzoegerung = *self.verzoegerung.lock();
            if let Some(dauer) = verzoegerung {
                tokio::time::sleep(dauer).await;
            }
            if self.fehler_fuer.lock().contains(&req.to) {
                return Err(SessionError::transport("peer unreachable"));
            }
        }
        if self.send_fehler.load(Ordering::SeqCst) {
            return Err(SessionError::transport("broken pipe"));
        }
        self.gesendet.lock().push(action);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<TransportSignal> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.abonnent.lock() = Some(tx);
        rx
    }
}

// ---------------------------------------------------------------------------
// Crypto
// ---------------------------------------------------------------------------

/// Deterministischer Provider: Schluessel sind UTF-8-Namen,
/// Chiffrat ist `enc[<schluessel>]<klartext>`.
pub struct MockCrypto {
    eigener_schluessel: String,
    pub encrypt_fehler_fuer: Mutex<HashSet<String>>,
}

impl MockCrypto {
    pub fn neu(eigener_schluessel: &str) -> Self {
        Self {
            eigener_schluessel: eigener_schluessel.into(),
            encrypt_fehler_fuer: Mutex::new(HashSet::new()),
        }
    }

    pub fn chiffrat(schluessel: &str, text: &str) -> String {
        format!("enc[{schluessel}]{text}")
    }
}

#[async_trait]
impl CryptoProvider for MockCrypto {
    fn decode_key(&self, encoded: &str) -> CryptoResult<PublicKey> {
        if encoded.starts_with("bad") {
            return Err(CryptoError::SchluesselDekodierung(encoded.into()));
        }
        Ok(PublicKey::new(encoded.as_bytes().to_vec()))
    }

    async fn encrypt(&self, plaintext: &str, recipient: &PublicKey) -> CryptoResult<String> {
        let schluessel = String::from_utf8_lossy(recipient.as_bytes()).to_string();
        if self.encrypt_fehler_fuer.lock().contains(&schluessel) {
            return Err(CryptoError::Verschluesselung(schluessel));
        }
        Ok(Self::chiffrat(&schluessel, plaintext))
    }

    async fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        let praefix = format!("enc[{}]", self.eigener_schluessel);
        ciphertext
            .strip_prefix(&praefix)
            .map(str::to_string)
            .ok_or_else(|| CryptoError::Entschluesselung("falscher Schluessel".into()))
    }

    async fn hash_secret(&self, secret: &str) -> CryptoResult<String> {
        Ok(format!("hash({secret})"))
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::new(self.eigener_schluessel.as_bytes().to_vec())
    }

    fn encoded_public_key(&self) -> String {
        self.eigener_schluessel.clone()
    }
}

// ---------------------------------------------------------------------------
// Plattform und Presenter
// ---------------------------------------------------------------------------

pub struct MockPlattform {
    pub fokus: AtomicBool,
    pub erlaubt: AtomicBool,
    pub angezeigt: Mutex<Vec<String>>,
}

impl Default for MockPlattform {
    fn default() -> Self {
        Self {
            fokus: AtomicBool::new(false),
            erlaubt: AtomicBool::new(true),
            angezeigt: Mutex::new(Vec::new()),
        }
    }
}

impl NotificationPlatform for MockPlattform {
    fn has_focus(&self) -> bool {
        self.fokus.load(Ordering::SeqCst)
    }

    fn permission_granted(&self) -> bool {
        self.erlaubt.load(Ordering::SeqCst)
    }

    fn display(&self, text: &str) {
        self.angezeigt.lock().push(text.to_string());
    }
}

#[derive(Default)]
pub struct MockPresenter {
    pub ereignisse: Mutex<Vec<ChatEvent>>,
    pub hinweise: Mutex<Vec<String>>,
    pub abfragen: Mutex<Vec<CredentialPrompt>>,
    pub phasen: Mutex<Vec<ConnectionPhase>>,
}

impl Presenter for MockPresenter {
    fn event_appended(&self, event: &ChatEvent) {
        self.ereignisse.lock().push(event.clone());
    }

    fn notice(&self, text: &str) {
        self.hinweise.lock().push(text.to_string());
    }

    fn prompt_credentials(&self, prompt: &CredentialPrompt) {
        self.abfragen.lock().push(prompt.clone());
    }

    fn phase_changed(&self, phase: ConnectionPhase) {
        self.phasen.lock().push(phase);
    }
}

// ---------------------------------------------------------------------------
// Aufbau
// ---------------------------------------------------------------------------

pub struct Umgebung {
    pub session: Session,
    pub transport: Arc<MockTransport>,
    pub crypto: Arc<MockCrypto>,
    pub plattform: Arc<MockPlattform>,
    pub presenter: Arc<MockPresenter>,
}

pub fn umgebung() -> Umgebung {
    umgebung_mit(SessionConfig::default())
}

pub fn umgebung_mit(config: SessionConfig) -> Umgebung {
    let transport = Arc::new(MockTransport::default());
    let crypto = Arc::new(MockCrypto::neu("alice-key"));
    let plattform = Arc::new(MockPlattform::default());
    let presenter = Arc::new(MockPresenter::default());
    let session = Session::neu(
        config,
        transport.clone(),
        crypto.clone(),
        presenter.clone(),
        plattform.clone(),
    );
    Umgebung {
        session,
        transport,
        crypto,
        plattform,
        presenter,
    }
}

pub fn alice() -> Identity {
    Identity::new("alice", PublicKey::new(b"alice-key".to_vec()), "alice-key")
}

pub fn zugang(kanal: &str, geheimnis: &str) -> ChannelCredential {
    ChannelCredential::from_parts(kanal, geheimnis, format!("hash({geheimnis})"))
}

pub fn peer(name: &str) -> Peer {
    let key = format!("{name}-key");
    Peer::new(name, PublicKey::new(key.as_bytes().to_vec()), key)
}

/// Gestartete Session im Kanal `lobby`, gesendete Aktionen geleert
pub async fn gestartet(peers: Vec<Peer>) -> Umgebung {
    let mut env = umgebung();
    env.session
        .start(Some(alice()), zugang("lobby", "geheim"), peers)
        .await
        .unwrap();
    env.transport.leeren();
    env
}

pub fn envelope(event: ServerEvent) -> Envelope {
    event.into_envelope().unwrap()
}
