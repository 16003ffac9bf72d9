//! Terminal-Oberflaeche: Ausgabe, Eingabe-Befehle, Benachrichtigungen
//!
//! Das Terminal hat keinen echten Fensterfokus. Es gilt als fokussiert,
//! solange die letzte Eingabe weniger als `fokus_sek` zurueckliegt.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use saferchat_core::{ChatEvent, ConnectionPhase};
use saferchat_session::{CredentialPrompt, EditParams, NotificationPlatform, Presenter};

pub const HILFE: &str = "\
Commands:
  <text>                          send a message to everyone in the channel
  /edit <name> <channel> <secret> change display name and/or channel
  /help                           show this help
  /quit                           leave";

// ---------------------------------------------------------------------------
// Eingabe
// ---------------------------------------------------------------------------

/// Eine gelesene Eingabezeile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Befehl {
    Nachricht(String),
    Bearbeiten(EditParams),
    Hilfe,
    Beenden,
    Leer,
    Ungueltig(String),
}

/// Zerlegt eine Eingabezeile
pub fn befehl_parsen(zeile: &str) -> Befehl {
    let zeile = zeile.trim_end_matches(&['\r', '\n'][..]);
    if zeile.is_empty() {
        return Befehl::Leer;
    }
    let Some(rest) = zeile.strip_prefix('/') else {
        return Befehl::Nachricht(zeile.to_string());
    };

    let mut teile = rest.split_whitespace();
    match teile.next() {
        Some("quit") | Some("exit") => Befehl::Beenden,
        Some("help") => Befehl::Hilfe,
        Some("edit") => {
            let (Some(name), Some(kanal)) = (teile.next(), teile.next()) else {
                return Befehl::Ungueltig("usage: /edit <name> <channel> <secret>".into());
            };
            // Das Geheimnis darf Leerzeichen enthalten
            let geheimnis = teile.collect::<Vec<_>>().join(" ");
            Befehl::Bearbeiten(EditParams {
                display_name: name.to_string(),
                channel: kanal.to_string(),
                secret: geheimnis,
            })
        }
        Some(anderer) => Befehl::Ungueltig(format!("unknown command: /{anderer}")),
        None => Befehl::Ungueltig("empty command".into()),
    }
}

// ---------------------------------------------------------------------------
// Fokus
// ---------------------------------------------------------------------------

/// Zeitpunkt der letzten Eingabe, geteilt zwischen Eingabe-Task und Notifier
#[derive(Debug, Clone)]
pub struct Fokus {
    letzte_eingabe: Arc<Mutex<Instant>>,
    schwelle: Duration,
}

impl Fokus {
    pub fn neu(schwelle: Duration) -> Self {
        Self {
            letzte_eingabe: Arc::new(Mutex::new(Instant::now())),
            schwelle,
        }
    }

    pub fn eingabe(&self) {
        *self.letzte_eingabe.lock() = Instant::now();
    }

    pub fn hat_fokus(&self) -> bool {
        self.letzte_eingabe.lock().elapsed() < self.schwelle
    }
}

// ---------------------------------------------------------------------------
// Presenter und Benachrichtigungen
// ---------------------------------------------------------------------------

/// Gibt das Log und Hinweise auf stdout aus
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    fn zeile(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        if writeln!(out, "{text}").and_then(|_| out.flush()).is_err() {
            tracing::debug!("stdout nicht beschreibbar");
        }
    }
}

impl Presenter for TerminalPresenter {
    fn event_appended(&self, event: &ChatEvent) {
        self.zeile(&event.to_string());
    }

    fn notice(&self, text: &str) {
        self.zeile(&format!("! {text}"));
    }

    fn prompt_credentials(&self, prompt: &CredentialPrompt) {
        self.zeile(&format!(
            "? enter new credentials: /edit {} {} <secret>",
            prompt.display_name, prompt.channel
        ));
    }

    fn phase_changed(&self, phase: ConnectionPhase) {
        tracing::info!(phase = %phase, "Verbindungsphase");
    }
}

/// Benachrichtigung per Terminal-Glocke
#[derive(Debug)]
pub struct TerminalNotifier {
    fokus: Fokus,
    aktiviert: bool,
}

impl TerminalNotifier {
    pub fn neu(fokus: Fokus, aktiviert: bool) -> Self {
        Self { fokus, aktiviert }
    }
}

impl NotificationPlatform for TerminalNotifier {
    fn has_focus(&self) -> bool {
        self.fokus.hat_fokus()
    }

    fn permission_granted(&self) -> bool {
        self.aktiviert
    }

    fn display(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        if writeln!(out, "\x07>> {text}").is_err() {
            tracing::debug!("Benachrichtigung nicht ausgegeben");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_ist_nachricht() {
        assert_eq!(befehl_parsen("hallo welt\n"), Befehl::Nachricht("hallo welt".into()));
    }

    #[test]
    fn leere_zeile() {
        assert_eq!(befehl_parsen("\r\n"), Befehl::Leer);
    }

    #[test]
    fn leerzeichen_sind_nachricht() {
        assert_eq!(befehl_parsen("   \n"), Befehl::Nachricht("   ".into()));
    }

    #[test]
    fn edit_mit_geheimnis_mit_leerzeichen() {
        assert_eq!(
            befehl_parsen("/edit alice general sehr geheim"),
            Befehl::Bearbeiten(EditParams {
                display_name: "alice".into(),
                channel: "general".into(),
                secret: "sehr geheim".into(),
            })
        );
    }

    #[test]
    fn edit_ohne_kanal() {
        assert!(matches!(befehl_parsen("/edit alice"), Befehl::Ungueltig(_)));
    }

    #[test]
    fn beenden_und_hilfe() {
        assert_eq!(befehl_parsen("/quit"), Befehl::Beenden);
        assert_eq!(befehl_parsen("/exit"), Befehl::Beenden);
        assert_eq!(befehl_parsen("/help"), Befehl::Hilfe);
    }

    #[test]
    fn unbekannter_befehl() {
        assert_eq!(
            befehl_parsen("/dance"),
            Befehl::Ungueltig("unknown command: /dance".into())
        );
    }

    #[test]
    fn fokus_nach_eingabe() {
        let fokus = Fokus::neu(Duration::from_secs(30));
        fokus.eingabe();
        assert!(fokus.hat_fokus());
    }

    #[test]
    fn ohne_schwelle_nie_fokussiert() {
        let fokus = Fokus::neu(Duration::ZERO);
        assert!(!fokus.hat_fokus());
    }

    #[test]
    fn notifier_meldet_berechtigung() {
        let notifier = TerminalNotifier::neu(Fokus::neu(Duration::ZERO), false);
        assert!(!notifier.permission_granted());
        assert!(!notifier.has_focus());
    }
}
