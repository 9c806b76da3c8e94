//! Core data types for the Archipelago merge engine
//!
//! This module defines the records that flow through a merge pass:
//! - `Event`: A keyed, time-bounded input record
//! - `AnnotatedEvent`: An event plus the annotations computed while merging
//! - `MergedWindow`: The envelope of one island of events
//! - `BoundField`: Which field of an event a validation failure refers to

use serde::{Deserialize, Serialize};

/// A single keyed interval
///
/// `end >= start` is not required. Inverted events are merged as-is; only the
/// raw values are ever compared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Event<K, B> {
    /// Partition key
    pub key: K,
    /// Start bound
    pub start: B,
    /// End bound
    pub end: B,
}

impl<K, B> Event<K, B> {
    /// Create a new event
    pub fn new(key: K, start: B, end: B) -> Self {
        Self { key, start, end }
    }
}

impl<K, B: PartialOrd> Event<K, B> {
    /// Whether the bounds are inverted (`end < start`)
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

/// An event with the annotations computed during a merge pass
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnnotatedEvent<K, B> {
    /// The original event
    pub event: Event<K, B>,
    /// Maximum `end` among strictly preceding events in start order
    /// (`None` for the first event of a partition)
    pub running_max_end: Option<B>,
    /// Whether this event starts a new island
    pub is_new_group: bool,
    /// Running count of `is_new_group` flags up to and including this event
    pub group_id: u64,
}

/// The min-start/max-end envelope of one island
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MergedWindow<K, B> {
    /// Partition key shared by every constituent event
    pub key: K,
    /// Minimum `start` over the island
    pub window_start: B,
    /// Maximum `end` over the island
    pub window_end: B,
    /// Number of constituent events, duplicates included
    pub event_count: usize,
}

impl<K: Clone, B: Clone> MergedWindow<K, B> {
    /// Re-express this window as a single event spanning it
    pub fn to_event(&self) -> Event<K, B> {
        Event::new(
            self.key.clone(),
            self.window_start.clone(),
            self.window_end.clone(),
        )
    }
}

/// Field of an event, used when reporting contract violations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BoundField {
    Start,
    End,
}

impl std::fmt::Display for BoundField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundField::Start => write!(f, "start"),
            BoundField::End => write!(f, "end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = Event::new("H1", 1, 3);

        assert_eq!(event.key, "H1");
        assert_eq!(event.start, 1);
        assert_eq!(event.end, 3);
        assert!(!event.is_inverted());
        assert!(Event::new("H1", 5, 2).is_inverted());
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new("H1".to_string(), 10i64, 20i64);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"key":"H1","start":10,"end":20}"#);

        let restored: Event<String, i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, event);
    }

    #[test]
    fn test_window_to_event() {
        let window = MergedWindow {
            key: "H2",
            window_start: 4,
            window_end: 9,
            event_count: 3,
        };

        assert_eq!(window.to_event(), Event::new("H2", 4, 9));
    }

    #[test]
    fn test_bound_field_display() {
        assert_eq!(BoundField::Start.to_string(), "start");
        assert_eq!(BoundField::End.to_string(), "end");
    }
}
