//! Partitioner
//!
//! Groups events by key so each key can be merged independently. Order within
//! a partition is not significant here; the merger re-sorts.

use crate::merge::types::Event;
use std::collections::HashMap;
use std::hash::Hash;

/// Group events by key
///
/// Duplicates are preserved. Any key value is its own partition, including
/// `None` for `Option` keys.
pub fn partition<K, B, I>(events: I) -> HashMap<K, Vec<Event<K, B>>>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = Event<K, B>>,
{
    let mut partitions: HashMap<K, Vec<Event<K, B>>> = HashMap::new();

    for event in events {
        partitions.entry(event.key.clone()).or_default().push(event);
    }

    partitions
}
