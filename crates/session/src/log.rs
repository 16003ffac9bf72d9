//! Nachrichten-Log (nur Anhaengen)

use saferchat_core::{ChatEvent, ChatEventKind};

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    events: Vec<ChatEvent>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Haengt ein Ereignis mit dem naechsten Index an
    pub fn append(&mut self, kind: ChatEventKind) -> &ChatEvent {
        let index = self.events.len() as u64;
        self.events.push(ChatEvent::new(index, kind));
        &self.events[self.events.len() - 1]
    }

    pub fn get(&self, index: u64) -> Option<&ChatEvent> {
        usize::try_from(index).ok().and_then(|i| self.events.get(i))
    }

    pub fn last(&self) -> Option<&ChatEvent> {
        self.events.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
