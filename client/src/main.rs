//! saferchat – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Client.

use anyhow::Result;
use saferchat_client::{config::ClientConfig, App};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("SAFERCHAT_CONFIG").unwrap_or_else(|_| "saferchat.toml".into());

    let config = ClientConfig::laden(&config_pfad)?;

    saferchat_observability::logging_initialisieren(
        &config.logging.level,
        &config.logging.format,
    )?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "saferchat wird initialisiert"
    );

    App::neu(config).starten().await
}
