//! Outbox – Zustellung pro Nachricht und Empfaenger
//!
//! Jede eigene Nachricht erzeugt einen Zustell-Eintrag (Schluessel: Index
//! des `LocalSent`-Ereignisses) und pro Empfaenger einen Task im `JoinSet`.
//! Jeder Task meldet `{index, generation, empfaenger, ergebnis}`. Meldungen
//! einer aelteren Generation werden verworfen, offene Eintraege dieser
//! Generation ebenso. Von abgeschlossenen Eintraegen bleiben nur die
//! letzten `MAX_ABGESCHLOSSEN`.

use std::collections::{HashMap, VecDeque};
use std::future::Future;

use tokio::task::JoinSet;

/// Anzahl abgeschlossener Zustell-Eintraege, die behalten werden
pub const MAX_ABGESCHLOSSEN: usize = 256;

/// Ergebnis eines Zustell-Tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub index: u64,
    pub generation: u64,
    pub recipient: String,
    pub outcome: Result<(), String>,
}

/// Zustellstatus einer Nachricht
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryStatus {
    pub total: usize,
    pub delivered: usize,
    pub failed: Vec<String>,
}

impl DeliveryStatus {
    /// Alle Empfaenger haben gemeldet
    pub fn ist_abgeschlossen(&self) -> bool {
        self.delivered + self.failed.len() >= self.total
    }
}

#[derive(Debug, Default)]
pub struct Outbox {
    tasks: JoinSet<DeliveryReport>,
    status: HashMap<u64, DeliveryStatus>,
    /// Abgeschlossene Indizes, aelteste zuerst
    abgeschlossen: VecDeque<u64>,
    generation: u64,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Neue Generation: laufende Tasks duerfen fertig werden, ihre
    /// Meldungen zaehlen aber nicht mehr. Offene Eintraege werden entfernt.
    pub fn neue_generation(&mut self, generation: u64) {
        self.generation = generation;
        let vorher = self.status.len();
        self.status.retain(|_, status| status.ist_abgeschlossen());
        let entfernt = vorher - self.status.len();
        if entfernt > 0 {
            tracing::debug!(entfernt, generation, "Offene Zustell-Eintraege verworfen");
        }
    }

    /// Legt den Zustell-Eintrag fuer eine Nachricht an
    pub fn register(&mut self, index: u64, total: usize) {
        self.status.insert(
            index,
            DeliveryStatus {
                total,
                ..Default::default()
            },
        );
        if total == 0 {
            self.abschliessen(index);
        }
    }

    /// Startet einen Zustell-Task
    pub fn dispatch<F>(&mut self, task: F)
    where
        F: Future<Output = DeliveryReport> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    /// Wartet auf die naechste Meldung. `None` wenn keine Tasks laufen.
    pub async fn next_report(&mut self) -> Option<DeliveryReport> {
        loop {
            match self.tasks.join_next().await? {
                Ok(report) => return Some(report),
                Err(e) => {
                    tracing::warn!(fehler = %e, "Zustell-Task abgebrochen");
                }
            }
        }
    }

    /// Verbucht eine Meldung. `false` wenn sie verworfen wurde.
    pub fn record(&mut self, report: DeliveryReport) -> bool {
        if report.generation != self.generation {
            tracing::debug!(
                index = report.index,
                generation = report.generation,
                aktuell = self.generation,
                "Zustellmeldung einer alten Generation verworfen"
            );
            return false;
        }
        let Some(status) = self.status.get_mut(&report.index) else {
            return false;
        };
        if status.ist_abgeschlossen() {
            return false;
        }
        match report.outcome {
            Ok(()) => status.delivered += 1,
            Err(fehler) => {
                tracing::warn!(
                    index = report.index,
                    empfaenger = %report.recipient,
                    fehler = %fehler,
                    "Zustellung fehlgeschlagen"
                );
                status.failed.push(report.recipient);
            }
        }
        if status.ist_abgeschlossen() {
            self.abschliessen(report.index);
        }
        true
    }

    fn abschliessen(&mut self, index: u64) {
        self.abgeschlossen.push_back(index);
        while self.abgeschlossen.len() > MAX_ABGESCHLOSSEN {
            if let Some(aeltester) = self.abgeschlossen.pop_front() {
                self.status.remove(&aeltester);
            }
        }
    }

    /// Wartet auf alle ausstehenden Meldungen und verbucht sie
    pub async fn settle(&mut self) {
        while let Some(report) = self.next_report().await {
            self.record(report);
        }
    }

    /// Loest alle laufenden Tasks ab; ihre Ergebnisse gehen verloren
    pub fn detach_all(&mut self) {
        self.tasks.detach_all();
    }

    pub fn status(&self, index: u64) -> Option<&DeliveryStatus> {
        self.status.get(&index)
    }

    /// Laufen noch Zustell-Tasks?
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }
}
