//! Rasterization of duplex arm pairs into a contact-count matrix.
//!
//! Each arm pair is drawn as a line, not a filled rectangle: the left arm is
//! walked upwards while the right arm is walked downwards and the two walks
//! are paired position by position. When the arms differ in length, pairing
//! stops at the end of the shorter arm and the remaining positions of the
//! longer arm are not drawn.
//!
//! A dense matrix costs `M * M` cells for a maximum coordinate `M`, which
//! for long transcripts quickly dominates memory. `MatrixConfig` bounds the
//! dense allocation and switches to a sparse map above the limit.

use std::time::Instant;

use log::{debug, info};
use ndarray::Array2;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{MatrixConfig, MatrixLayout};
use crate::duplex_structs::{CanonicalRecord, CanonicalSample, Interval};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
enum Cells {
    Dense(Array2<u32>),
    Sparse(FxHashMap<(usize, usize), u32>),
}

/// Square count matrix addressed with 1-based genomic coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMatrix {
    size: usize,
    cells: Cells,
}

impl ContactMatrix {
    pub fn new(size: usize, dense: bool) -> Self {
        let cells = if dense {
            Cells::Dense(Array2::zeros((size, size)))
        } else {
            Cells::Sparse(FxHashMap::default())
        };
        ContactMatrix { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.cells, Cells::Sparse(_))
    }

    /// Count at genomic position `x` on the left arm and `y` on the right
    /// arm. Positions outside `1..=size` read as 0.
    pub fn get(&self, x: usize, y: usize) -> u32 {
        if x == 0 || y == 0 || x > self.size || y > self.size {
            return 0;
        }
        match &self.cells {
            Cells::Dense(m) => m[[x - 1, y - 1]],
            Cells::Sparse(m) => m.get(&(x, y)).copied().unwrap_or(0),
        }
    }

    fn increment(&mut self, x: usize, y: usize) {
        match &mut self.cells {
            Cells::Dense(m) => m[[x - 1, y - 1]] += 1,
            Cells::Sparse(m) => *m.entry((x, y)).or_insert(0) += 1,
        }
    }

    pub fn total(&self) -> u64 {
        match &self.cells {
            Cells::Dense(m) => m.iter().map(|&c| c as u64).sum(),
            Cells::Sparse(m) => m.values().map(|&c| c as u64).sum(),
        }
    }

    /// Non-zero cells as `(x, y, count)`, sorted by `x` then `y`.
    pub fn nonzero(&self) -> Vec<(usize, usize, u32)> {
        let mut out: Vec<(usize, usize, u32)> = match &self.cells {
            Cells::Dense(m) => m
                .indexed_iter()
                .filter(|&(_, &c)| c > 0)
                .map(|((i, j), &c)| (i + 1, j + 1, c))
                .collect(),
            Cells::Sparse(m) => m.iter().map(|(&(x, y), &c)| (x, y, c)).collect(),
        };
        radsort::sort_by_key(&mut out, |c| c.1);
        radsort::sort_by_key(&mut out, |c| c.0);
        out
    }

    /// Dense copy of the matrix, row `x - 1`, column `y - 1`.
    pub fn to_dense(&self, config: &MatrixConfig) -> Result<Array2<u32>> {
        match &self.cells {
            Cells::Dense(m) => Ok(m.clone()),
            Cells::Sparse(m) => {
                MatrixConfig::new(MatrixLayout::Dense, config.dense_byte_limit)
                    .use_dense::<u32>("contact matrix", self.size)?;
                let mut out = Array2::zeros((self.size, self.size));
                for (&(x, y), &c) in m {
                    out[[x - 1, y - 1]] = c;
                }
                Ok(out)
            }
        }
    }
}

/// The positions a single arm pair contributes: left ascending, right
/// descending, paired until the shorter arm runs out.
pub fn contact_path(left: Interval, right: Interval) -> impl Iterator<Item = (i64, i64)> {
    (left.start..=left.end).zip((right.start..=right.end).rev())
}

/// Pair up parallel left and right arm lists.
pub fn pair_arms(left: &[Interval], right: &[Interval]) -> Result<Vec<(Interval, Interval)>> {
    if left.len() != right.len() {
        return Err(Error::Parameter(format!(
            "{} left arms but {} right arms",
            left.len(),
            right.len()
        )));
    }
    Ok(left.iter().copied().zip(right.iter().copied()).collect())
}

/// Rasterize plain `(left, right)` arm pairs.
pub fn rasterize_arms(
    arms: &[(Interval, Interval)],
    config: &MatrixConfig,
) -> Result<ContactMatrix> {
    if let Some((i, (l, r))) = arms
        .iter()
        .enumerate()
        .find(|(_, (l, r))| l.is_inverted() || r.is_inverted() || l.start < 1 || r.start < 1)
    {
        return Err(Error::Parameter(format!(
            "arm pair {i} ({l}, {r}) is inverted or starts before position 1"
        )));
    }

    let size = arms
        .iter()
        .map(|(l, r)| l.start.max(l.end).max(r.start).max(r.end))
        .max()
        .unwrap_or(0)
        .max(0) as usize;

    let dense = config.use_dense::<u32>("contact matrix", size)?;
    let mut matrix = ContactMatrix::new(size, dense);

    let mut truncated: i64 = 0;
    for &(l, r) in arms {
        truncated += (l.width() - r.width()).abs();
        for (x, y) in contact_path(l, r) {
            matrix.increment(x as usize, y as usize);
        }
    }

    if truncated > 0 {
        debug!(
            "{} arm positions left undrawn where paired arms differ in length",
            truncated
        );
    }

    Ok(matrix)
}

/// Build the contact matrix of `rna` for one sample.
///
/// Only records with both arms on `rna` are drawn, and exact duplicate
/// records are drawn once.
pub fn build_contact_matrix(
    sample: &CanonicalSample,
    rna: &str,
    config: &MatrixConfig,
) -> Result<ContactMatrix> {
    let start = Instant::now();

    let mut seen: FxHashSet<&CanonicalRecord> = FxHashSet::default();
    let mut arms = Vec::new();
    for record in &sample.records {
        if record.left.name != rna || record.right.name != rna {
            continue;
        }
        if !seen.insert(record) {
            continue;
        }
        let l = record.left.interval();
        let r = record.right.interval();
        for (what, iv) in [("left arm", l), ("right arm", r)] {
            if iv.is_inverted() {
                return Err(Error::coordinate(
                    &sample.id,
                    &record.id,
                    format!("{what} {iv} is inverted"),
                ));
            }
            if iv.start < 1 {
                return Err(Error::coordinate(
                    &sample.id,
                    &record.id,
                    format!("{what} {iv} starts before position 1"),
                ));
            }
        }
        arms.push((l, r));
    }

    if arms.is_empty() {
        return Err(Error::EmptySubset {
            sample: sample.id.clone(),
            stage: "contact matrix selection",
        });
    }

    let matrix = rasterize_arms(&arms, config)?;
    info!(
        "sample {}: {}x{} {} contact matrix of {} from {} duplexes",
        sample.id,
        matrix.size(),
        matrix.size(),
        if matrix.is_sparse() { "sparse" } else { "dense" },
        rna,
        arms.len()
    );
    debug!("Time elapsed building contact matrix: {:?}", start.elapsed());

    Ok(matrix)
}
