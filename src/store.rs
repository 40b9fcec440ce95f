use crate::model::{Event, EventId};

/// Client-side mirror of the remote collection, in server order.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole list with a fresh server listing.
    pub fn replace_all(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Swaps the first record with the same id for `event`, keeping its index.
    /// Returns the index, or `None` when no record matched (the list is left as is).
    pub fn replace(&mut self, event: Event) -> Option<usize> {
        let idx = self.position(&event.id)?;
        self.events[idx] = event;
        Some(idx)
    }

    /// Removes the record with `id`. Relative order of the rest is kept.
    pub fn remove(&mut self, id: &EventId) -> Option<Event> {
        let idx = self.position(id)?;
        Some(self.events.remove(idx))
    }

    pub fn position(&self, id: &EventId) -> Option<usize> {
        self.events.iter().position(|e| e.id == *id)
    }

    pub fn get_index(&self, idx: usize) -> Option<&Event> {
        self.events.get(idx)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
