//! Keepalive-Timer
//!
//! Fester Takt fuer die Lebensdauer der Session. Der erste Tick kommt eine
//! Periode nach dem Start. Verpasste Ticks werden nicht nachgeholt.
//! Perioden unter `MIN_KEEPALIVE` werden angehoben.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Kleinste erlaubte Periode
pub const MIN_KEEPALIVE: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Keepalive {
    intervall: Interval,
    periode: Duration,
}

impl Keepalive {
    /// Startet den Timer
    pub fn starten(periode: Duration) -> Self {
        if periode < MIN_KEEPALIVE {
            tracing::warn!(
                periode_ms = periode.as_millis() as u64,
                "Keepalive-Periode zu klein, verwende Minimum"
            );
        }
        let periode = periode.max(MIN_KEEPALIVE);
        let mut intervall = interval_at(Instant::now() + periode, periode);
        intervall.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::debug!(periode_sek = periode.as_secs(), "Keepalive gestartet");
        Self { intervall, periode }
    }

    /// Wartet auf den naechsten Tick
    pub async fn tick(&mut self) {
        self.intervall.tick().await;
    }

    pub fn periode(&self) -> Duration {
        self.periode
    }

    /// Beendet den Timer. Verbraucht `self`, kann also nur einmal passieren.
    pub fn cancel(self) {
        tracing::debug!("Keepalive beendet");
    }
}
