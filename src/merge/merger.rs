//! Merger
//!
//! Collapses one partition's events into islands:
//!
//! ```text
//! sort by start → running max end → new-island flag → prefix count → envelope
//! ```
//!
//! A new island starts exactly when an event starts strictly after every
//! previously seen `end` in the partition. The comparison is against the
//! running maximum, not the previous event, so a long event can absorb later
//! events that start and end inside it.

use crate::merge::types::{AnnotatedEvent, Event, MergedWindow};
use std::cmp::Ordering;

/// Order two bounds, treating incomparable values as equal.
///
/// Callers validate bounds before merging, so the fallback is never taken on
/// engine input.
pub(crate) fn compare_bounds<B: PartialOrd>(a: &B, b: &B) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Sort a partition by start and annotate every event
///
/// The sort is stable, so events with equal starts keep their input order and
/// that order is fixed before the running maximum is computed.
pub fn annotate<K, B>(mut events: Vec<Event<K, B>>) -> Vec<AnnotatedEvent<K, B>>
where
    B: PartialOrd + Clone,
{
    events.sort_by(|a, b| compare_bounds(&a.start, &b.start));

    let mut running_max_end: Option<B> = None;
    let mut group_id = 0u64;

    events
        .into_iter()
        .map(|event| {
            let is_new_group = match &running_max_end {
                None => true,
                Some(max) => event.start > *max,
            };
            if is_new_group {
                group_id += 1;
            }

            // Updated after the comparison: an event's own end only affects
            // the events after it.
            let prior = running_max_end.take();
            running_max_end = match &prior {
                Some(max) if *max >= event.end => Some(max.clone()),
                _ => Some(event.end.clone()),
            };

            AnnotatedEvent {
                event,
                running_max_end: prior,
                is_new_group,
                group_id,
            }
        })
        .collect()
}

/// Reduce annotated events to one window per group id
///
/// Input must be in annotation order (group ids non-decreasing); windows are
/// returned in group id order.
pub fn reduce<K, B>(annotated: Vec<AnnotatedEvent<K, B>>) -> Vec<MergedWindow<K, B>>
where
    B: PartialOrd,
{
    let mut windows = Vec::new();
    let mut current: Option<(u64, MergedWindow<K, B>)> = None;

    for AnnotatedEvent {
        event, group_id, ..
    } in annotated
    {
        if let Some((id, window)) = current.as_mut() {
            if *id == group_id {
                if event.start < window.window_start {
                    window.window_start = event.start;
                }
                if event.end > window.window_end {
                    window.window_end = event.end;
                }
                window.event_count += 1;
                continue;
            }
        }

        let opened = MergedWindow {
            key: event.key,
            window_start: event.start,
            window_end: event.end,
            event_count: 1,
        };
        if let Some((_, closed)) = current.replace((group_id, opened)) {
            windows.push(closed);
        }
    }

    if let Some((_, last)) = current {
        windows.push(last);
    }

    windows
}

/// Merge one partition into its islands, in group id order
pub fn merge<K, B>(events: Vec<Event<K, B>>) -> Vec<MergedWindow<K, B>>
where
    B: PartialOrd + Clone,
{
    reduce(annotate(events))
}
