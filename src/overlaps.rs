use rustc_hash::FxHashSet;

use crate::duplex_structs::{Interval, OverlapPair};
use crate::sorts;

/// Returns every pair of distinct overlapping intervals in one collection,
/// each pair once with `idx < idx2`, sorted by `(idx, idx2)`.
/// This uses a line-sweep / active-set approach.
///
/// Algorithm steps:
///   1. Build a list of events (start & end) for each interval.
///   2. Sort events by coordinate. Where coordinates tie, put start before end.
///   3. Maintain an active set. For a start event, record an overlap with
///      every active interval, then insert it. Remove it on its end event.
///   4. Return the list of all overlaps.
pub fn sweep_line_self_overlaps(intervals: &[Interval]) -> Vec<OverlapPair> {
    let mut overlaps = Vec::new();

    if intervals.is_empty() {
        return overlaps;
    };

    let events = sorts::build_sorted_events_single_collection(intervals);

    let mut active: FxHashSet<usize> = FxHashSet::default();

    for e in events {
        if e.is_start {
            for &other in active.iter() {
                overlaps.push(OverlapPair {
                    idx: other.min(e.idx),
                    idx2: other.max(e.idx),
                });
            }
            active.insert(e.idx);
        } else {
            active.remove(&e.idx);
        }
    }

    sorts::sort_overlap_pairs(&mut overlaps);
    overlaps
}
