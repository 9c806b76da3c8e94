//! Archipelago Merge Engine
//!
//! The engine orchestrates one full pass:
//! - Validate: every bound must be comparable (fail fast, no partial output)
//! - Partition: group events by key
//! - Merge: collapse each partition into islands, in parallel when worthwhile
//! - Order: sort windows for presentation (end, then key)
//!
//! Partitions share no state, so the parallel and sequential paths produce the
//! same windows; the final ordering makes the output independent of scheduling.

use crate::merge::error::{MergeError, MergeResult};
use crate::merge::merger::{self, compare_bounds};
use crate::merge::partition::partition;
use crate::merge::types::{BoundField, Event, MergedWindow};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Configuration for the merge engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Merge partitions on the rayon thread pool
    pub parallel: bool,
    /// Minimum number of partitions before going parallel (default: 16)
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 16,
        }
    }
}

impl EngineConfig {
    /// Configuration that always merges on the calling thread
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }
}

/// Statistics for a single merge pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Input events
    pub events: usize,
    /// Distinct keys
    pub partitions: usize,
    /// Windows emitted
    pub windows: usize,
    /// Events absorbed into an already open island
    pub folded_events: usize,
    /// Whether partitions were merged in parallel
    pub parallel: bool,
    /// Wall time of the pass
    pub elapsed_micros: u64,
}

impl std::fmt::Display for MergeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Events: {}, Partitions: {}, Windows: {}, Folded: {}, Parallel: {}, Time: {:.3} ms",
            self.events,
            self.partitions,
            self.windows,
            self.folded_events,
            self.parallel,
            self.elapsed_micros as f64 / 1000.0
        )
    }
}

/// Result of a merge pass
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutput<K, B> {
    /// Windows in presentation order
    pub windows: Vec<MergedWindow<K, B>>,
    /// Pass statistics
    pub stats: MergeStats,
}

/// Gaps-and-islands merge engine
#[derive(Debug, Clone, Default)]
pub struct IntervalEngine {
    config: EngineConfig,
}

impl IntervalEngine {
    /// Create a new engine
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Merge a collection of events into windows ordered for presentation
    pub fn run<K, B>(&self, events: Vec<Event<K, B>>) -> MergeResult<MergeOutput<K, B>>
    where
        K: Eq + Hash + Ord + Clone + Send + Debug,
        B: PartialOrd + Clone + Send,
    {
        let started = Instant::now();

        validate(&events)?;

        let event_count = events.len();
        let partitions: Vec<(K, Vec<Event<K, B>>)> = partition(events).into_iter().collect();
        let partition_count = partitions.len();
        let parallel =
            self.config.parallel && partition_count >= self.config.parallel_threshold.max(2);

        let mut windows: Vec<MergedWindow<K, B>> = if parallel {
            partitions
                .into_par_iter()
                .flat_map(|(key, events)| merge_partition(key, events))
                .collect()
        } else {
            partitions
                .into_iter()
                .flat_map(|(key, events)| merge_partition(key, events))
                .collect()
        };

        sort_for_output(&mut windows);

        let stats = MergeStats {
            events: event_count,
            partitions: partition_count,
            windows: windows.len(),
            folded_events: event_count - windows.len(),
            parallel,
            elapsed_micros: started.elapsed().as_micros() as u64,
        };

        tracing::info!("Merge complete: {}", stats);

        Ok(MergeOutput { windows, stats })
    }

    /// Merge and return only the windows
    pub fn merge<K, B>(&self, events: Vec<Event<K, B>>) -> MergeResult<Vec<MergedWindow<K, B>>>
    where
        K: Eq + Hash + Ord + Clone + Send + Debug,
        B: PartialOrd + Clone + Send,
    {
        self.run(events).map(|output| output.windows)
    }
}

fn merge_partition<K, B>(key: K, events: Vec<Event<K, B>>) -> Vec<MergedWindow<K, B>>
where
    K: Debug,
    B: PartialOrd + Clone,
{
    let event_count = events.len();
    let windows = merger::merge(events);

    tracing::debug!(
        key = ?key,
        events = event_count,
        windows = windows.len(),
        "Merged partition"
    );

    windows
}

/// Check that every bound supports the ordering the merge relies on
///
/// A bound must be comparable with itself, each event's start must be
/// comparable with its end, and both bounds must be comparable with the
/// previous event's bounds in input order. Float NaN fails the first checks;
/// bounds drawn from incomparable domains fail the last.
///
/// Comparability is assumed transitive: if consecutive events compare, all
/// events compare. A `PartialOrd` that breaks this is outside the contract
/// and its incomparable pairs sort as equal.
pub fn validate<K, B: PartialOrd>(events: &[Event<K, B>]) -> MergeResult<()> {
    let mut previous: Option<&Event<K, B>> = None;

    for (index, event) in events.iter().enumerate() {
        let field = if event.start.partial_cmp(&event.start).is_none() {
            Some(BoundField::Start)
        } else if event.end.partial_cmp(&event.end).is_none()
            || event.start.partial_cmp(&event.end).is_none()
        {
            Some(BoundField::End)
        } else {
            previous.and_then(|prev| {
                if event.start.partial_cmp(&prev.start).is_none() {
                    Some(BoundField::Start)
                } else if event.end.partial_cmp(&prev.end).is_none() {
                    Some(BoundField::End)
                } else {
                    None
                }
            })
        };

        if let Some(field) = field {
            tracing::warn!(index, %field, "Rejecting input with incomparable bound");
            return Err(MergeError::InvalidComparator { index, field });
        }

        previous = Some(event);
    }

    Ok(())
}

/// Sort windows for presentation: `window_end` ascending, then `key`
///
/// Remaining ties (same key and end) are broken by `window_start`.
pub fn sort_for_output<K: Ord, B: PartialOrd>(windows: &mut [MergedWindow<K, B>]) {
    windows.sort_by(|a, b| {
        compare_bounds(&a.window_end, &b.window_end)
            .then_with(|| a.key.cmp(&b.key))
            .then_with(|| compare_bounds(&a.window_start, &b.window_start))
    });
}
