use rayon::prelude::*;

use crate::duplex_structs::{CanonicalSample, Interval};
use crate::error::{Error, Result};

/// An arm hits a window when one of its endpoints lies strictly inside the
/// window or when the arm spans the whole window. `window` must not be
/// inverted; see [`check_window`].
#[inline]
pub fn arm_hits_window(arm: Interval, window: Interval) -> bool {
    let inside = |p: i64| window.start < p && p < window.end;
    inside(arm.start) || inside(arm.end) || (arm.start <= window.start && arm.end >= window.end)
}

/// Reject a window whose end lies before its start.
pub fn check_window(what: &str, window: Interval) -> Result<()> {
    if window.is_inverted() {
        return Err(Error::Parameter(format!(
            "{what} window {window} is inverted"
        )));
    }
    Ok(())
}

/// Per-pair hit mask over parallel left and right arm lists.
pub fn region_mask(
    left: &[Interval],
    right: &[Interval],
    left_window: Interval,
    right_window: Interval,
) -> Result<Vec<bool>> {
    check_window("left", left_window)?;
    check_window("right", right_window)?;
    if left.len() != right.len() {
        return Err(Error::Parameter(format!(
            "{} left arms but {} right arms",
            left.len(),
            right.len()
        )));
    }
    Ok(left
        .iter()
        .zip(right)
        .map(|(&l, &r)| arm_hits_window(l, left_window) && arm_hits_window(r, right_window))
        .collect())
}

pub fn region_query_sample(
    sample: &CanonicalSample,
    left_window: Interval,
    right_window: Interval,
) -> Result<CanonicalSample> {
    check_window("left", left_window)?;
    check_window("right", right_window)?;
    let records = sample
        .records
        .iter()
        .filter(|r| {
            arm_hits_window(r.left.interval(), left_window)
                && arm_hits_window(r.right.interval(), right_window)
        })
        .cloned()
        .collect();
    Ok(CanonicalSample::new(sample.id.clone(), records))
}

/// Records of each sample whose left arm hits `left_window` and right arm
/// hits `right_window`. One output sample per input sample, same order.
pub fn region_query(
    samples: &[CanonicalSample],
    left_window: Interval,
    right_window: Interval,
) -> Result<Vec<CanonicalSample>> {
    check_window("left", left_window)?;
    check_window("right", right_window)?;
    samples
        .par_iter()
        .map(|s| region_query_sample(s, left_window, right_window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonicalize::canonicalize;
    use crate::canonicalize::tests::{record, segment};
    use crate::config::OrderPolicy;
    use crate::duplex_structs::{Sample, SampleId};

    #[test]
    fn test_endpoint_inside_or_spanning() {
        let w = Interval::new(0, 55);
        assert!(arm_hits_window(Interval::new(50, 60), w));
        assert!(arm_hits_window(Interval::new(-10, 100), w));
        assert!(arm_hits_window(Interval::new(10, 20), w));
        // endpoints on the window boundary do not count
        assert!(!arm_hits_window(Interval::new(55, 70), w));
        assert!(!arm_hits_window(Interval::new(60, 70), w));
    }

    fn samples() -> Vec<CanonicalSample> {
        let raw = vec![
            Sample::new(
                SampleId::from("a"),
                vec![
                    record("hit", segment("RNA1", 50, 60), segment("RNA1", 200, 210)),
                    record("miss", segment("RNA1", 50, 60), segment("RNA1", 400, 410)),
                ],
            ),
            Sample::new(
                SampleId::from("b"),
                vec![record("far", segment("RNA1", 900, 950), segment("RNA1", 1000, 1010))],
            ),
        ];
        canonicalize(&raw, "RNA1", OrderPolicy::Position)
    }

    #[test]
    fn test_region_query_keeps_sample_structure() {
        let out = region_query(&samples(), Interval::new(0, 55), Interval::new(190, 220)).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].records.len(), 1);
        assert_eq!(out[0].records[0].id, "hit");
        assert_eq!(out[1].id, SampleId::from("b"));
        assert!(out[1].is_empty());
    }

    #[test]
    fn test_region_query_is_idempotent() {
        let lw = Interval::new(0, 55);
        let rw = Interval::new(190, 220);
        let once = region_query(&samples(), lw, rw).unwrap();
        let twice = region_query(&once, lw, rw).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_region_mask() {
        let left = [Interval::new(50, 60), Interval::new(60, 70)];
        let right = [Interval::new(200, 210), Interval::new(200, 210)];
        let mask =
            region_mask(&left, &right, Interval::new(0, 55), Interval::new(190, 220)).unwrap();
        assert_eq!(mask, vec![true, false]);
    }

    #[test]
    fn test_region_mask_needs_paired_arms() {
        let left = [Interval::new(50, 60), Interval::new(60, 70)];
        let right = [Interval::new(200, 210)];
        let err = region_mask(&left, &right, Interval::new(0, 55), Interval::new(190, 220))
            .unwrap_err();
        assert!(matches!(err, Error::Parameter(_)), "{err}");
        assert!(region_mask(&left[..1], &right, Interval::new(55, 0), Interval::new(190, 220))
            .is_err());
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let err = region_query(&samples(), Interval::new(55, 0), Interval::new(190, 220))
            .unwrap_err();
        assert!(matches!(err, Error::Parameter(_)), "{err}");
        assert!(err.to_string().contains("left window 55-0"), "{err}");

        let err = region_query_sample(&samples()[0], Interval::new(0, 55), Interval::new(220, 190))
            .unwrap_err();
        assert!(err.to_string().contains("right window"), "{err}");
    }
}
