use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use crate::config::OrderPolicy;
use crate::duplex_structs::{CanonicalRecord, CanonicalSample, ChimericRecord, Sample};

/// Place the segments of one record into left/right slots.
///
/// Returns `None` when the record is not kept under `policy`.
pub fn canonicalize_record(
    record: &ChimericRecord,
    reference: &str,
    policy: OrderPolicy,
) -> Option<CanonicalRecord> {
    let a_on_ref = record.seg_a.name == reference;
    let b_on_ref = record.seg_b.name == reference;

    let keep = match policy {
        OrderPolicy::Position | OrderPolicy::Identity => a_on_ref || b_on_ref,
        OrderPolicy::PositionBoth => a_on_ref && b_on_ref,
    };
    if !keep {
        return None;
    }

    let swap = match policy {
        // ties keep seg_a on the left
        OrderPolicy::Position | OrderPolicy::PositionBoth => {
            record.seg_b.start < record.seg_a.start
        }
        // both on the reference: first slot wins
        OrderPolicy::Identity => !a_on_ref,
    };

    Some(CanonicalRecord::from_record(record, swap))
}

pub fn canonicalize_sample(
    sample: &Sample,
    reference: &str,
    policy: OrderPolicy,
) -> CanonicalSample {
    let records: Vec<CanonicalRecord> = sample
        .records
        .iter()
        .filter_map(|r| canonicalize_record(r, reference, policy))
        .collect();

    debug!(
        "sample {}: kept {} of {} records under {} ordering",
        sample.id,
        records.len(),
        sample.records.len(),
        policy
    );

    CanonicalSample::new(sample.id.clone(), records)
}

/// Canonicalize every sample in parallel. Output order follows input order.
pub fn canonicalize(
    samples: &[Sample],
    reference: &str,
    policy: OrderPolicy,
) -> Vec<CanonicalSample> {
    let start = Instant::now();
    let out: Vec<CanonicalSample> = samples
        .par_iter()
        .map(|s| canonicalize_sample(s, reference, policy))
        .collect();
    debug!("Time elapsed canonicalizing: {:?}", start.elapsed());
    out
}
