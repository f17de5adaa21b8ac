use std::fmt;

/// A 1-based, inclusive interval on the reference sequence.
///
/// `start <= end` is expected but not enforced; an interval with
/// `end < start` is "inverted" and has a width of zero or less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn new(start: i64, end: i64) -> Self {
        Interval { start, end }
    }

    /// Number of positions covered. Zero or negative when inverted.
    #[inline]
    pub fn width(&self) -> i64 {
        self.end - self.start + 1
    }

    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Length of the shared span, 0 when the intervals are disjoint.
    #[inline]
    pub fn intersection_width(&self, other: &Interval) -> i64 {
        let lo = self.start.max(other.start);
        let hi = self.end.min(other.end);
        (hi - lo + 1).max(0)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One half of a chimeric read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub name: String,
    pub aux: [String; 2],
    pub start: i64,
    pub end: i64,
    pub score: String,
}

impl Segment {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// A duplex read as it comes out of the chimera detector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChimericRecord {
    pub id: String,
    pub aux: [String; 2],
    pub seg_a: Segment,
    pub seg_b: Segment,
}

/// A record with its segments placed in fixed slots.
///
/// `swapped` is true when `seg_b` of the source record became `left`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalRecord {
    pub id: String,
    pub aux: [String; 2],
    pub left: Segment,
    pub right: Segment,
    pub swapped: bool,
}

impl CanonicalRecord {
    pub fn from_record(record: &ChimericRecord, swap: bool) -> Self {
        let (left, right) = if swap {
            (record.seg_b.clone(), record.seg_a.clone())
        } else {
            (record.seg_a.clone(), record.seg_b.clone())
        };
        CanonicalRecord {
            id: record.id.clone(),
            aux: record.aux.clone(),
            left,
            right,
            swapped: swap,
        }
    }

    /// Span between the end of the left arm and the start of the right arm.
    pub fn gap(&self) -> Interval {
        Interval::new(self.left.end, self.right.start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(pub String);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SampleId {
    fn from(s: &str) -> Self {
        SampleId(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: SampleId,
    pub records: Vec<ChimericRecord>,
}

impl Sample {
    pub fn new(id: SampleId, records: Vec<ChimericRecord>) -> Self {
        Sample { id, records }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSample {
    pub id: SampleId,
    pub records: Vec<CanonicalRecord>,
}

impl CanonicalSample {
    pub fn new(id: SampleId, records: Vec<CanonicalRecord>) -> Self {
        CanonicalSample { id, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fails with `EmptySubset` when no record survived `stage`.
    pub fn require_records(self, stage: &'static str) -> crate::error::Result<Self> {
        if self.records.is_empty() {
            return Err(crate::error::Error::EmptySubset {
                sample: self.id,
                stage,
            });
        }
        Ok(self)
    }
}

/// Ordered intervals, index-aligned with the records they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalCollection {
    pub name: String,
    pub intervals: Vec<Interval>,
}

impl IntervalCollection {
    pub fn new(name: impl Into<String>, intervals: Vec<Interval>) -> Self {
        IntervalCollection {
            name: name.into(),
            intervals,
        }
    }

    pub fn from_slices(name: impl Into<String>, starts: &[i64], ends: &[i64]) -> Self {
        let intervals = starts
            .iter()
            .zip(ends.iter())
            .map(|(&s, &e)| Interval::new(s, e))
            .collect();
        IntervalCollection::new(name, intervals)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Interval> {
        self.intervals.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    /// Widest interval in the collection, 0 for an empty collection.
    pub fn max_width(&self) -> i64 {
        self.intervals.iter().map(Interval::width).max().unwrap_or(0).max(0)
    }
}

/// The three collections derived from one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplexIntervals {
    pub left: IntervalCollection,
    pub right: IntervalCollection,
    pub gap: IntervalCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// An "event" in the sweep line:
/// - `pos`: the coordinate (start or end of an interval)
/// - `is_start`: true if it's a start event, false if it's an end event
/// - `idx`: the interval's index in its collection
#[derive(Debug, Clone, Hash)]
pub struct Event {
    pub pos: i64,
    pub is_start: bool,
    pub idx: usize,
}

/// Two overlapping intervals, `idx < idx2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlapPair {
    pub idx: usize,
    pub idx2: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEdge {
    pub idx: usize,
    pub idx2: usize,
    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_width_and_intersection() {
        let a = Interval::new(100, 110);
        let b = Interval::new(105, 115);
        assert_eq!(a.width(), 11);
        assert!(a.overlaps(&b));
        assert_eq!(a.intersection_width(&b), 6);

        let c = Interval::new(200, 210);
        assert!(!a.overlaps(&c));
        assert_eq!(a.intersection_width(&c), 0);
    }

    #[test]
    fn test_touching_intervals_overlap() {
        // inclusive coordinates: a shared endpoint is one shared base
        let a = Interval::new(1, 5);
        let b = Interval::new(5, 9);
        assert!(a.overlaps(&b));
        assert_eq!(a.intersection_width(&b), 1);
    }

    #[test]
    fn test_inverted_interval() {
        let iv = Interval::new(20, 10);
        assert!(iv.is_inverted());
        assert!(iv.width() <= 0);
    }

    #[test]
    fn test_max_width_ignores_inverted() {
        let coll = IntervalCollection::from_slices("rna", &[0, 50, 0], &[19, 40, 1]);
        assert_eq!(coll.max_width(), 20);
        assert_eq!(IntervalCollection::new("rna", vec![]).max_width(), 0);
    }
}
