//! Property-based tests for the merge engine
//!
//! Uses proptest to check the merge invariants over generated inputs:
//! - Coverage: every event lands in exactly one window, with multiplicity
//! - Envelope: each window is the min start / max end of its own events
//! - Islands: windows of a key have increasing starts and never overlap
//! - Idempotence: merging the windows again changes nothing
//! - Ordering: output is sorted by (end, key)

use archipelago::merge::{annotate, merge, sort_for_output, Event, IntervalEngine, MergedWindow};
use proptest::prelude::*;
use std::collections::HashMap;

/// Well-formed events (`end >= start`) over a few keys
fn ordered_events() -> impl Strategy<Value = Vec<Event<u8, i32>>> {
    prop::collection::vec((0u8..4, -50i32..50, 0i32..20), 0..60).prop_map(|raw| {
        raw.into_iter()
            .map(|(key, start, len)| Event::new(key, start, start + len))
            .collect()
    })
}

/// Arbitrary events, inverted bounds included
fn any_events() -> impl Strategy<Value = Vec<Event<u8, i32>>> {
    prop::collection::vec((0u8..4, -50i32..50, -50i32..50), 0..60).prop_map(|raw| {
        raw.into_iter()
            .map(|(key, start, end)| Event::new(key, start, end))
            .collect()
    })
}

fn by_key(events: &[Event<u8, i32>]) -> HashMap<u8, Vec<Event<u8, i32>>> {
    let mut map: HashMap<u8, Vec<Event<u8, i32>>> = HashMap::new();
    for event in events {
        map.entry(event.key).or_default().push(event.clone());
    }
    map
}

proptest! {
    #[test]
    fn prop_coverage_and_envelope(events in any_events()) {
        for (_key, partition) in by_key(&events) {
            let annotated = annotate(partition.clone());
            prop_assert_eq!(annotated.len(), partition.len());

            let windows = merge(partition);
            let total: usize = windows.iter().map(|w| w.event_count).sum();
            prop_assert_eq!(total, annotated.len());

            // Group ids run 1..=windows.len() without gaps
            let last_id = annotated.last().map(|a| a.group_id).unwrap_or(0);
            prop_assert_eq!(last_id as usize, windows.len());

            for (idx, window) in windows.iter().enumerate() {
                let members: Vec<_> = annotated
                    .iter()
                    .filter(|a| a.group_id as usize == idx + 1)
                    .collect();
                prop_assert_eq!(members.len(), window.event_count);

                let min_start = members.iter().map(|a| a.event.start).min().unwrap();
                let max_end = members.iter().map(|a| a.event.end).max().unwrap();
                prop_assert_eq!(window.window_start, min_start);
                prop_assert_eq!(window.window_end, max_end);
            }
        }
    }

    #[test]
    fn prop_new_group_iff_start_after_running_max(events in any_events()) {
        for (_key, partition) in by_key(&events) {
            let annotated = annotate(partition);
            let mut running_max: Option<i32> = None;

            for a in &annotated {
                prop_assert_eq!(a.running_max_end, running_max);
                let expected = running_max.map_or(true, |max| a.event.start > max);
                prop_assert_eq!(a.is_new_group, expected);
                running_max = Some(running_max.map_or(a.event.end, |max| max.max(a.event.end)));
            }
        }
    }

    #[test]
    fn prop_islands_strictly_increasing_and_disjoint(events in ordered_events()) {
        for (_key, partition) in by_key(&events) {
            let windows = merge(partition);
            for pair in windows.windows(2) {
                prop_assert!(pair[0].window_start < pair[1].window_start);
                prop_assert!(pair[0].window_end < pair[1].window_start);
            }
        }
    }

    #[test]
    fn prop_island_starts_non_decreasing(events in any_events()) {
        for (_key, partition) in by_key(&events) {
            let windows = merge(partition);
            for pair in windows.windows(2) {
                prop_assert!(pair[0].window_start <= pair[1].window_start);
            }
        }
    }

    #[test]
    fn prop_idempotent(events in ordered_events()) {
        let engine = IntervalEngine::default();
        let windows = engine.merge(events).unwrap();

        let again = engine
            .merge(windows.iter().map(MergedWindow::to_event).collect())
            .unwrap();

        let spans = |ws: &[MergedWindow<u8, i32>]| -> Vec<(u8, i32, i32)> {
            ws.iter().map(|w| (w.key, w.window_start, w.window_end)).collect()
        };
        prop_assert_eq!(spans(&again), spans(&windows));
        prop_assert!(again.iter().all(|w| w.event_count == 1));
    }

    #[test]
    fn prop_output_ordered_and_complete(events in any_events()) {
        let count = events.len();
        let output = IntervalEngine::default().run(events).unwrap();

        let total: usize = output.windows.iter().map(|w| w.event_count).sum();
        prop_assert_eq!(total, count);
        prop_assert_eq!(output.stats.folded_events, count - output.windows.len());

        for pair in output.windows.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!((a.window_end, a.key) <= (b.window_end, b.key));
        }

        let mut resorted = output.windows.clone();
        sort_for_output(&mut resorted);
        prop_assert_eq!(resorted, output.windows);
    }

    #[test]
    fn prop_input_order_irrelevant(events in ordered_events()) {
        let engine = IntervalEngine::default();
        let forward = engine.merge(events.clone()).unwrap();

        let mut reversed = events;
        reversed.reverse();
        let backward = engine.merge(reversed).unwrap();

        prop_assert_eq!(forward, backward);
    }
}

#[test]
fn empty_and_singleton() {
    let engine = IntervalEngine::default();

    assert!(engine.merge(Vec::<Event<u8, i32>>::new()).unwrap().is_empty());

    let windows = engine.merge(vec![Event::new(7u8, 3, 9)]).unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].to_event(), Event::new(7u8, 3, 9));
}
