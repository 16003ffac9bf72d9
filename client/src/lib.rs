//! saferchat-client – Bibliotheks-Root
//!
//! Verdrahtet Konfiguration, Crypto-Provider, TCP-Transport und Terminal
//! mit der Session-Engine.

pub mod config;
pub mod terminal;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::ClientConfig;
use saferchat_core::Identity;
use saferchat_crypto::{derive_credential, CryptoProvider, X25519Provider};
use saferchat_session::{Session, SessionError, SessionHandle, TcpTransport};
use terminal::{befehl_parsen, Befehl, Fokus, TerminalNotifier, TerminalPresenter, HILFE};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Haelt den Client zusammen
pub struct App {
    pub config: ClientConfig,
}

impl App {
    pub fn neu(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Startet die Session und laeuft bis `/quit`, EOF oder Ctrl-C
    pub async fn starten(self) -> Result<()> {
        let crypto = Arc::new(X25519Provider::generieren());

        let identity = self
            .config
            .identitaet
            .name
            .as_deref()
            .map(|name| {
                Identity::new(name.trim(), crypto.public_key(), crypto.encoded_public_key())
            });
        let credential = derive_credential(
            &*crypto,
            &self.config.identitaet.kanal,
            &self.config.identitaet.geheimnis,
        )
        .await
        .context("Kanal-Zugangsdaten ungueltig")?;

        let fokus = Fokus::neu(Duration::from_secs(self.config.benachrichtigungen.fokus_sek));
        let notifier = Arc::new(TerminalNotifier::neu(
            fokus.clone(),
            self.config.benachrichtigungen.aktiviert,
        ));
        let transport = Arc::new(TcpTransport::neu(
            self.config.server_adresse(),
            self.config.sitzung.max_frame_bytes,
        ));

        tracing::info!(
            server = %self.config.server_adresse(),
            kanal = %credential.name(),
            "Client startet"
        );

        let mut session = Session::neu(
            self.config.session_config(),
            transport,
            crypto,
            Arc::new(TerminalPresenter),
            notifier,
        );
        match session.start(identity, credential, Vec::new()).await {
            Ok(()) => {}
            Err(SessionError::KeineIdentitaet) => {
                anyhow::bail!(
                    "no display name configured: set [identitaet] name in the config file"
                );
            }
            Err(e) => return Err(e.into()),
        }

        let (handle, intents) = SessionHandle::kanal(32);
        let laeuft = tokio::spawn(session.run(intents));

        println!("{HILFE}");
        tokio::select! {
            ergebnis = eingabe_schleife(handle.clone(), fokus) => ergebnis?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl-C empfangen");
            }
        }

        // Schleife kann schon beendet sein (z.B. nach /quit)
        let _ = handle.shutdown().await;
        laeuft.await.context("Session-Task abgebrochen")?;
        Ok(())
    }
}

/// Liest stdin zeilenweise und leitet Intents an die Session
async fn eingabe_schleife(handle: SessionHandle, fokus: Fokus) -> Result<()> {
    let mut zeilen = BufReader::new(tokio::io::stdin()).lines();

    while let Some(zeile) = zeilen.next_line().await? {
        fokus.eingabe();
        match befehl_parsen(&zeile) {
            Befehl::Nachricht(text) => handle.send_message(text).await?,
            Befehl::Bearbeiten(params) => handle.edit(params).await?,
            Befehl::Hilfe => println!("{HILFE}"),
            Befehl::Beenden => break,
            Befehl::Leer => {}
            Befehl::Ungueltig(grund) => println!("! {grund}"),
        }
    }
    Ok(())
}
