//! Peer-Roster – bekannte Teilnehmer in Ankunftsreihenfolge
//!
//! Schluessel ist der Anzeigename, pro Name gibt es hoechstens einen Peer.
//! Ein erneuter Beitritt unter bekanntem Namen ersetzt den Schluessel an
//! der bisherigen Position. Entfernen erhaelt die Reihenfolge der uebrigen.

use saferchat_core::Peer;

#[derive(Debug, Clone, Default)]
pub struct Roster {
    peers: Vec<Peer>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster aus einer extern gelieferten Anfangsliste (Duplikate zusammengefasst)
    pub fn from_peers(peers: impl IntoIterator<Item = Peer>) -> Self {
        let mut roster = Self::new();
        for peer in peers {
            roster.upsert(peer);
        }
        roster
    }

    /// Fuegt einen Peer hinten an oder ersetzt den gleichnamigen.
    ///
    /// Gibt `true` zurueck wenn der Name neu war.
    pub fn upsert(&mut self, peer: Peer) -> bool {
        match self
            .peers
            .iter_mut()
            .find(|p| p.display_name == peer.display_name)
        {
            Some(bestehend) => {
                *bestehend = peer;
                false
            }
            None => {
                self.peers.push(peer);
                true
            }
        }
    }

    /// Entfernt den Peer mit diesem Namen
    pub fn remove(&mut self, name: &str) -> Option<Peer> {
        let pos = self.peers.iter().position(|p| p.display_name == name)?;
        Some(self.peers.remove(pos))
    }

    pub fn get(&self, name: &str) -> Option<&Peer> {
        self.peers.iter().find(|p| p.display_name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.peers.iter().map(|p| p.display_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn clear(&mut self) {
        self.peers.clear();
    }
}
