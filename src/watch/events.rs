// src/watch/events.rs

//! Raw watch events and per-window batches.

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;

/// Operation kind of a raw notification, reduced to what matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Write,
    Create,
    Remove,
    Rename,
    Chmod,
    Other,
}

impl From<&notify::EventKind> for EventKind {
    fn from(kind: &notify::EventKind) -> Self {
        match kind {
            notify::EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => EventKind::Write,
            notify::EventKind::Modify(ModifyKind::Metadata(_)) => EventKind::Chmod,
            notify::EventKind::Modify(ModifyKind::Name(_)) => EventKind::Rename,
            notify::EventKind::Create(_) => EventKind::Create,
            notify::EventKind::Remove(_) => EventKind::Remove,
            _ => EventKind::Other,
        }
    }
}

/// One `(kind, path)` pair. A `notify::Event` naming several paths yields one
/// `RawEvent` per path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub path: PathBuf,
}

impl RawEvent {
    pub fn new(kind: EventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn is_write(&self) -> bool {
        self.kind == EventKind::Write
    }

    /// Split a backend event into raw events, keeping path order.
    pub fn from_notify(event: notify::Event) -> Vec<RawEvent> {
        let kind = EventKind::from(&event.kind);
        event
            .paths
            .into_iter()
            .map(|path| RawEvent { kind, path })
            .collect()
    }
}

/// Write events collected during one aggregation window, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    events: Vec<RawEvent>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: RawEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.events.iter().map(|e| e.path.as_path())
    }

    /// Keep the first `max` events and return how many were discarded.
    pub fn truncate_to(&mut self, max: usize) -> usize {
        let dropped = self.events.len().saturating_sub(max);
        self.events.truncate(max);
        dropped
    }

    pub fn into_events(self) -> Vec<RawEvent> {
        self.events
    }
}

impl FromIterator<RawEvent> for Batch {
    fn from_iter<I: IntoIterator<Item = RawEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
