//! Laufzeit-Konfiguration der Session-Engine

use std::time::Duration;

use saferchat_protocol::wire::DEFAULT_MAX_FRAME_SIZE;

use crate::keepalive::MIN_KEEPALIVE;

/// Standard-Keepalive-Intervall (60 Sekunden)
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(60);

/// Konfiguration einer Session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Abstand zwischen zwei Keepalive-Ticks
    pub keepalive_intervall: Duration,
    /// Maximale Frame-Groesse fuer den TCP-Transport
    pub max_frame_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keepalive_intervall: DEFAULT_KEEPALIVE,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl SessionConfig {
    /// Setzt das Keepalive-Intervall (mindestens `MIN_KEEPALIVE`)
    pub fn mit_keepalive(mut self, intervall: Duration) -> Self {
        self.keepalive_intervall = intervall.max(MIN_KEEPALIVE);
        self
    }

    pub fn mit_max_frame_size(mut self, bytes: usize) -> Self {
        self.max_frame_size = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardwerte() {
        let config = SessionConfig::default();
        assert_eq!(config.keepalive_intervall, Duration::from_secs(60));
        assert_eq!(config.max_frame_size, 1024 * 1024);
    }

    #[test]
    fn builder_ueberschreibt() {
        let config = SessionConfig::default()
            .mit_keepalive(Duration::from_secs(5))
            .mit_max_frame_size(4096);
        assert_eq!(config.keepalive_intervall, Duration::from_secs(5));
        assert_eq!(config.max_frame_size, 4096);
    }

    #[test]
    fn keepalive_null_wird_angehoben() {
        let config = SessionConfig::default().mit_keepalive(Duration::ZERO);
        assert_eq!(config.keepalive_intervall, MIN_KEEPALIVE);
    }
}
