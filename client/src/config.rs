//! Client-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Client ohne Konfigurationsdatei
//! startet (ohne Anzeigenamen aber keine Session aufbaut).

use std::time::Duration;

use saferchat_session::SessionConfig;
use serde::{Deserialize, Serialize};

/// Vollstaendige Client-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Chat-Server
    pub server: ServerEinstellungen,
    /// Session-Einstellungen (Keepalive, Frames)
    pub sitzung: SitzungEinstellungen,
    /// Anzeigename und Kanal
    pub identitaet: IdentitaetEinstellungen,
    /// Benachrichtigungen
    pub benachrichtigungen: BenachrichtigungsEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    pub adresse: String,
    pub port: u16,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            adresse: "127.0.0.1".into(),
            port: 4000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitzungEinstellungen {
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Maximale Frame-Groesse in Bytes
    pub max_frame_bytes: usize,
}

impl Default for SitzungEinstellungen {
    fn default() -> Self {
        let standard = SessionConfig::default();
        Self {
            keepalive_sek: standard.keepalive_intervall.as_secs(),
            max_frame_bytes: standard.max_frame_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitaetEinstellungen {
    /// Anzeigename (ohne Namen startet keine Session)
    pub name: Option<String>,
    pub kanal: String,
    /// Kanal-Geheimnis im Klartext; auf dem Draht erscheint nur der Hash
    pub geheimnis: String,
}

impl Default for IdentitaetEinstellungen {
    fn default() -> Self {
        Self {
            name: None,
            kanal: "lobby".into(),
            geheimnis: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenachrichtigungsEinstellungen {
    /// Benachrichtigungen erlaubt
    pub aktiviert: bool,
    /// Sekunden ohne Eingabe, nach denen das Terminal als unfokussiert gilt
    pub fokus_sek: u64,
}

impl Default for BenachrichtigungsEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: true,
            fokus_sek: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level oder Filter-Direktive
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl ClientConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Adresse des Chat-Servers als `host:port`
    pub fn server_adresse(&self) -> String {
        format!("{}:{}", self.server.adresse, self.server.port)
    }

    /// Laufzeit-Konfiguration fuer die Session-Engine
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .mit_keepalive(Duration::from_secs(self.sitzung.keepalive_sek.max(1)))
            .mit_max_frame_size(self.sitzung.max_frame_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.sitzung.keepalive_sek, 60);
        assert_eq!(cfg.sitzung.max_frame_bytes, 1024 * 1024);
        assert_eq!(cfg.identitaet.kanal, "lobby");
        assert!(cfg.identitaet.name.is_none());
        assert!(cfg.benachrichtigungen.aktiviert);
    }

    #[test]
    fn server_adresse() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.server_adresse(), "127.0.0.1:4000");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            adresse = "chat.example.org"

            [identitaet]
            name = "alice"
            kanal = "general"
            geheimnis = "s3cret"

            [sitzung]
            keepalive_sek = 15
        "#;
        let cfg: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server.adresse, "chat.example.org");
        assert_eq!(cfg.identitaet.name.as_deref(), Some("alice"));
        assert_eq!(cfg.identitaet.kanal, "general");
        assert_eq!(
            cfg.session_config().keepalive_intervall,
            Duration::from_secs(15)
        );
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.logging.format, "text");
    }

    #[test]
    fn fehlende_datei_ergibt_standardwerte() {
        let cfg = ClientConfig::laden("/nicht/vorhanden/saferchat.toml").unwrap();
        assert_eq!(cfg.server.port, 4000);
    }

    #[test]
    fn keepalive_null_wird_angehoben() {
        let mut cfg = ClientConfig::default();
        cfg.sitzung.keepalive_sek = 0;
        assert_eq!(cfg.session_config().keepalive_intervall, Duration::from_secs(1));
    }
}
