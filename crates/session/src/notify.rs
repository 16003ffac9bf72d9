//! Benachrichtigungen ausserhalb des Chat-Fensters
//!
//! Die Entscheidung ist reine Policy (`notification_text`). Die Plattform
//! liefert nur Fokus, Berechtigung und die eigentliche Anzeige.

use std::sync::Arc;

use saferchat_core::ChatEventKind;

/// Betriebssystem-Benachrichtigungen (Desktop, Terminal-Glocke, ...)
pub trait NotificationPlatform: Send + Sync {
    /// Hat das Chat-Fenster gerade den Fokus?
    fn has_focus(&self) -> bool;

    /// Darf die Plattform Benachrichtigungen anzeigen?
    fn permission_granted(&self) -> bool;

    /// Zeigt eine Benachrichtigung an. Darf nicht blockieren.
    fn display(&self, text: &str);
}

/// Text der Benachrichtigung fuer ein Ereignis, oder `None`
pub fn notification_text(kind: &ChatEventKind, has_focus: bool) -> Option<String> {
    if has_focus {
        return None;
    }
    match kind {
        ChatEventKind::PeerJoined(peer) => Some(format!("{} joined the channel", peer.display_name)),
        ChatEventKind::PeerLeft(peer) => Some(format!("{} left the channel", peer.display_name)),
        ChatEventKind::MessageReceived { from, .. } => {
            Some(format!("New message from {}", from.display_name))
        }
        ChatEventKind::LocalSent(_) => None,
    }
}

/// Wendet die Policy an und reicht an die Plattform weiter
#[derive(Clone)]
pub struct NotificationDispatcher {
    platform: Arc<dyn NotificationPlatform>,
}

impl NotificationDispatcher {
    pub fn neu(platform: Arc<dyn NotificationPlatform>) -> Self {
        Self { platform }
    }

    /// Gibt den angezeigten Text zurueck (falls angezeigt)
    pub fn dispatch(&self, kind: &ChatEventKind) -> Option<String> {
        let text = notification_text(kind, self.platform.has_focus())?;
        if !self.platform.permission_granted() {
            tracing::trace!("Benachrichtigung unterdrueckt: keine Berechtigung");
            return None;
        }
        self.platform.display(&text);
        Some(text)
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use saferchat_core::{Peer, PublicKey};

    fn bob() -> Peer {
        Peer::new("bob", PublicKey::new(vec![1]), "AQ==")
    }

    #[test]
    fn texte() {
        assert_eq!(
            notification_text(&ChatEventKind::PeerJoined(bob()), false).as_deref(),
            Some("bob joined the channel")
        );
        assert_eq!(
            notification_text(&ChatEventKind::PeerLeft(bob()), false).as_deref(),
            Some("bob left the channel")
        );
        let nachricht = ChatEventKind::MessageReceived {
            from: bob(),
            text: "hi".into(),
        };
        assert_eq!(
            notification_text(&nachricht, false).as_deref(),
            Some("New message from bob")
        );
    }

    #[test]
    fn mit_fokus_nie() {
        assert!(notification_text(&ChatEventKind::PeerJoined(bob()), true).is_none());
        assert!(notification_text(&ChatEventKind::PeerLeft(bob()), true).is_none());
    }

    #[test]
    fn eigene_nachricht_nie() {
        assert!(notification_text(&ChatEventKind::LocalSent("x".into()), false).is_none());
    }

    struct Plattform {
        fokus: bool,
        erlaubt: bool,
        angezeigt: Mutex<Vec<String>>,
    }

    impl NotificationPlatform for Plattform {
        fn has_focus(&self) -> bool {
            self.fokus
        }
        fn permission_granted(&self) -> bool {
            self.erlaubt
        }
        fn display(&self, text: &str) {
            self.angezeigt.lock().push(text.to_string());
        }
    }

    #[test]
    fn ohne_berechtigung_keine_anzeige() {
        let plattform = Arc::new(Plattform {
            fokus: false,
            erlaubt: false,
            angezeigt: Mutex::new(Vec::new()),
        });
        let dispatcher = NotificationDispatcher::neu(plattform.clone());
        assert!(dispatcher.dispatch(&ChatEventKind::PeerJoined(bob())).is_none());
        assert!(plattform.angezeigt.lock().is_empty());
    }

    #[test]
    fn mit_berechtigung_ohne_fokus() {
        let plattform = Arc::new(Plattform {
            fokus: false,
            erlaubt: true,
            angezeigt: Mutex::new(Vec::new()),
        });
        let dispatcher = NotificationDispatcher::neu(plattform.clone());
        dispatcher.dispatch(&ChatEventKind::PeerLeft(bob()));
        assert_eq!(*plattform.angezeigt.lock(), vec!["bob left the channel"]);
    }
}
