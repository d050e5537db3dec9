//! Append-only roast event log.

use crate::record::{EventKind, RoastEvent};

/// Ordered sequence of roast events.
///
/// Position is append order. Entries are never removed or reordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<RoastEvent>,
}

impl EventLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return it.
    pub fn record(
        &mut self,
        kind: EventKind,
        elapsed: u32,
        temperature: Option<f64>,
        ror: Option<f64>,
    ) -> &RoastEvent {
        debug_assert!(
            self.events.last().map_or(true, |last| last.elapsed <= elapsed),
            "events must be appended in time order"
        );
        self.events.push(RoastEvent {
            kind,
            elapsed,
            temperature,
            ror,
        });
        &self.events[self.events.len() - 1]
    }

    /// All events in append order.
    #[must_use]
    pub fn as_slice(&self) -> &[RoastEvent] {
        &self.events
    }

    /// Iterate in append order.
    pub fn iter(&self) -> std::slice::Iter<'_, RoastEvent> {
        self.events.iter()
    }

    /// The first event of a kind.
    #[must_use]
    pub fn first(&self, kind: EventKind) -> Option<&RoastEvent> {
        self.events.iter().find(|e| e.kind == kind)
    }

    /// Whether any event of a kind was recorded.
    #[must_use]
    pub fn contains(&self, kind: EventKind) -> bool {
        self.first(kind).is_some()
    }

    /// Number of events of a kind.
    #[must_use]
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take the events out of the log.
    #[must_use]
    pub fn into_vec(self) -> Vec<RoastEvent> {
        self.events
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a RoastEvent;
    type IntoIter = std::slice::Iter<'a, RoastEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
