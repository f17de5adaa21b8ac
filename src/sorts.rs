use radsort::sort_by_key;

use crate::duplex_structs::{Event, Interval, OverlapPair, WeightedEdge};

/// Start and end events of one collection, sorted for an inclusive sweep.
///
/// Inverted intervals have no well-defined span and produce no events.
pub fn build_sorted_events_single_collection(intervals: &[Interval]) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::with_capacity(2 * intervals.len());

    for (idx, iv) in intervals.iter().enumerate() {
        if iv.is_inverted() {
            continue;
        }
        events.push(Event {
            pos: iv.start,
            is_start: true,
            idx,
        });
        events.push(Event {
            pos: iv.end,
            is_start: false,
            idx,
        });
    }

    // Sort events by:
    // 1. pos (ascending)
    // 2. start before end if pos ties, since coordinates are inclusive
    sort_by_key(&mut events, |e| !e.is_start);
    sort_by_key(&mut events, |e| e.pos);

    events
}

pub fn sort_overlap_pairs(pairs: &mut [OverlapPair]) {
    sort_by_key(pairs, |p| p.idx2);
    sort_by_key(pairs, |p| p.idx);
}

pub fn sort_edges(edges: &mut [WeightedEdge]) {
    sort_by_key(edges, |e| e.idx2);
    sort_by_key(edges, |e| e.idx);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_sort_before_ends_at_same_position() {
        let ivs = vec![Interval::new(5, 9), Interval::new(1, 5)];
        let events = build_sorted_events_single_collection(&ivs);
        let order: Vec<(i64, bool, usize)> =
            events.iter().map(|e| (e.pos, e.is_start, e.idx)).collect();
        assert_eq!(
            order,
            vec![(1, true, 1), (5, true, 0), (5, false, 1), (9, false, 0)]
        );
    }

    #[test]
    fn test_inverted_intervals_are_skipped() {
        let ivs = vec![Interval::new(9, 5), Interval::new(1, 2)];
        let events = build_sorted_events_single_collection(&ivs);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.idx == 1));
    }
}
