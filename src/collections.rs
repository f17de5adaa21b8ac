use log::warn;

use crate::duplex_structs::{CanonicalSample, DuplexIntervals, Interval, IntervalCollection};
use crate::error::{Error, Result};

/// Derive the `left`, `right` and `gap` collections of one sample.
///
/// With `strict`, an inverted arm or gap is an error. Otherwise inverted
/// gaps are passed through as they are and counted in a warning.
pub fn build_interval_collections(
    sample: &CanonicalSample,
    reference: &str,
    strict: bool,
) -> Result<DuplexIntervals> {
    let n = sample.records.len();
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    let mut gap = Vec::with_capacity(n);
    let mut inverted_gaps = 0_usize;

    for record in &sample.records {
        let l = record.left.interval();
        let r = record.right.interval();
        let g = record.gap();

        if strict {
            check_interval(sample, &record.id, "left arm", l)?;
            check_interval(sample, &record.id, "right arm", r)?;
            check_interval(sample, &record.id, "gap", g)?;
        } else if g.is_inverted() {
            inverted_gaps += 1;
        }

        left.push(l);
        right.push(r);
        gap.push(g);
    }

    if inverted_gaps > 0 {
        warn!(
            "sample {}: {} of {} gap intervals are inverted (right arm starts before left arm ends)",
            sample.id, inverted_gaps, n
        );
    }

    Ok(DuplexIntervals {
        left: IntervalCollection::new(reference, left),
        right: IntervalCollection::new(reference, right),
        gap: IntervalCollection::new(reference, gap),
    })
}

fn check_interval(
    sample: &CanonicalSample,
    record: &str,
    what: &str,
    iv: Interval,
) -> Result<()> {
    if iv.is_inverted() {
        return Err(Error::coordinate(
            &sample.id,
            record,
            format!("{what} {iv} is inverted"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonicalize::canonicalize_sample;
    use crate::canonicalize::tests::{record, segment};
    use crate::config::OrderPolicy;
    use crate::duplex_structs::{Sample, SampleId};

    fn sample() -> CanonicalSample {
        let raw = Sample::new(
            SampleId::from("s1"),
            vec![
                record("r1", segment("RNA1", 10, 20), segment("RNA1", 40, 55)),
                record("r2", segment("RNA1", 90, 99), segment("RNA1", 30, 38)),
                // right arm starts inside the left arm
                record("r3", segment("RNA1", 60, 80), segment("RNA1", 70, 95)),
            ],
        );
        canonicalize_sample(&raw, "RNA1", OrderPolicy::Position)
    }

    #[test]
    fn test_gap_is_between_arms() {
        let iv = build_interval_collections(&sample(), "RNA1", false).unwrap();
        assert_eq!(iv.left.len(), 3);
        assert_eq!(iv.gap.name, "RNA1");
        for i in 0..iv.gap.len() {
            assert_eq!(iv.gap.intervals[i].start, iv.left.intervals[i].end);
            assert_eq!(iv.gap.intervals[i].end, iv.right.intervals[i].start);
        }
        assert_eq!(iv.gap.intervals[1], Interval::new(38, 90));
    }

    #[test]
    fn test_inverted_gap_passes_through_when_lenient() {
        let iv = build_interval_collections(&sample(), "RNA1", false).unwrap();
        assert_eq!(iv.gap.intervals[2], Interval::new(80, 70));
    }

    #[test]
    fn test_inverted_gap_fails_when_strict() {
        let err = build_interval_collections(&sample(), "RNA1", true).unwrap_err();
        match err {
            Error::Coordinate { sample, record, .. } => {
                assert_eq!(sample, SampleId::from("s1"));
                assert_eq!(record, "r3");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
