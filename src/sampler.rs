use log::info;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::duplex_structs::Sample;
use crate::error::{Error, Result};

/// Draw `n` records of `sample` without replacement, keeping their original
/// order. The same seed always draws the same records.
pub fn subsample(sample: &Sample, n: usize, seed: u64) -> Result<Sample> {
    let available = sample.records.len();
    if n > available {
        return Err(Error::SampleSize {
            sample: sample.id.clone(),
            requested: n,
            available,
        });
    }

    // reservoir over record indices
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    let mut picked: Vec<usize> = (0..n).collect();
    for seen in n..available {
        let j = rng.gen_range(0..=seen);
        if j < n {
            picked[j] = seen;
        }
    }
    radsort::sort(&mut picked);

    let records = picked.into_iter().map(|i| sample.records[i].clone()).collect();
    Ok(Sample::new(sample.id.clone(), records))
}

/// Subsample every sample down to the size of the smallest one.
pub fn equalize(samples: &[Sample], seed: u64) -> Result<Vec<Sample>> {
    let Some(n) = samples.iter().map(|s| s.records.len()).min() else {
        return Ok(Vec::new());
    };
    info!("subsampling {} samples to {} records each", samples.len(), n);
    samples.iter().map(|s| subsample(s, n, seed)).collect()
}
