use std::time::Instant;

use log::{debug, info, warn};
use ndarray::Array2;
use rustc_hash::FxHashMap;

use crate::config::{AdjacencyMode, MatrixConfig, MatrixLayout};
use crate::duplex_structs::{IntervalCollection, WeightedEdge};
use crate::error::{Error, Result};
use crate::overlaps::sweep_line_self_overlaps;
use crate::sorts;

#[derive(Debug, Clone, PartialEq)]
enum Cells {
    Dense(Array2<f64>),
    Sparse(FxHashMap<(usize, usize), f64>),
}

/// Weighted graph over the indices of one interval collection.
///
/// `edges` keeps every retained entry, including those whose weight is 0,
/// which a plain matrix cannot tell apart from a missing edge. Cells are
/// stored dense only under [`MatrixLayout::Dense`]; `auto` keeps them
/// sparse, since clustering and output read the edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyMatrix {
    size: usize,
    cells: Cells,
    edges: Vec<WeightedEdge>,
}

impl AdjacencyMatrix {
    fn from_edges(size: usize, edges: Vec<WeightedEdge>, config: &MatrixConfig) -> Result<Self> {
        let dense = match config.layout {
            MatrixLayout::Dense => config.use_dense::<f64>("adjacency matrix", size)?,
            MatrixLayout::Auto | MatrixLayout::Sparse => false,
        };
        let mut cells = if dense {
            Cells::Dense(Array2::zeros((size, size)))
        } else {
            Cells::Sparse(FxHashMap::default())
        };
        for e in &edges {
            match &mut cells {
                Cells::Dense(m) => m[[e.idx, e.idx2]] = e.weight,
                Cells::Sparse(m) => {
                    m.insert((e.idx, e.idx2), e.weight);
                }
            }
        }
        Ok(AdjacencyMatrix { size, cells, edges })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.cells, Cells::Sparse(_))
    }

    /// Weight of the entry `(i, j)`, 0 when absent.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        match &self.cells {
            Cells::Dense(m) => m.get((i, j)).copied().unwrap_or(0.0),
            Cells::Sparse(m) => m.get(&(i, j)).copied().unwrap_or(0.0),
        }
    }

    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    /// Dense copy of the matrix, bounded by `config.dense_byte_limit`.
    pub fn to_dense(&self, config: &MatrixConfig) -> Result<Array2<f64>> {
        match &self.cells {
            Cells::Dense(m) => Ok(m.clone()),
            Cells::Sparse(m) => {
                MatrixConfig::new(MatrixLayout::Dense, config.dense_byte_limit)
                    .use_dense::<f64>("adjacency matrix", self.size)?;
                let mut out = Array2::zeros((self.size, self.size));
                for (&(i, j), &w) in m {
                    out[[i, j]] = w;
                }
                Ok(out)
            }
        }
    }
}

/// Outcome of an adjacency build. `Empty` means no pair qualified.
#[derive(Debug, Clone, PartialEq)]
pub enum AdjacencyResult {
    Matrix(AdjacencyMatrix),
    Empty,
}

impl AdjacencyResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, AdjacencyResult::Empty)
    }

    pub fn matrix(&self) -> Option<&AdjacencyMatrix> {
        match self {
            AdjacencyResult::Matrix(m) => Some(m),
            AdjacencyResult::Empty => None,
        }
    }
}

/// Weigh the overlapping pairs of `collection` and keep those that pass
/// `cutoff` under `mode`. Edges come out sorted by `(idx, idx2)`.
///
/// - `None`: weight 1 for every overlap, entered in both directions.
/// - `Nucleotide`: `cutoff - (max(len_i, len_j) - len(i ∩ j))`, kept when
///   it lies in `0..=cutoff`.
/// - `Perc`: `1 - len(i ∩ j) / W`, kept when at least `cutoff`, where `W`
///   is the widest interval of the whole collection rather than of the pair.
pub fn score_overlaps(
    collection: &IntervalCollection,
    mode: AdjacencyMode,
    cutoff: f64,
) -> Vec<WeightedEdge> {
    let ivs = &collection.intervals;
    let inverted = ivs.iter().filter(|iv| iv.is_inverted()).count();
    if inverted > 0 {
        warn!(
            "{} inverted intervals of {} take no part in the overlap graph",
            inverted, collection.name
        );
    }
    let pairs = sweep_line_self_overlaps(ivs);
    let global_max = collection.max_width() as f64;

    let mut edges = Vec::with_capacity(pairs.len());
    for p in pairs {
        let (a, b) = (ivs[p.idx], ivs[p.idx2]);
        let shared = a.intersection_width(&b) as f64;
        match mode {
            AdjacencyMode::None => {
                edges.push(WeightedEdge {
                    idx: p.idx,
                    idx2: p.idx2,
                    weight: 1.0,
                });
                edges.push(WeightedEdge {
                    idx: p.idx2,
                    idx2: p.idx,
                    weight: 1.0,
                });
            }
            AdjacencyMode::Nucleotide => {
                let widest = a.width().max(b.width()) as f64;
                let weight = cutoff - (widest - shared);
                if (0.0..=cutoff).contains(&weight) {
                    edges.push(WeightedEdge {
                        idx: p.idx,
                        idx2: p.idx2,
                        weight,
                    });
                }
            }
            AdjacencyMode::Perc => {
                let weight = 1.0 - shared / global_max;
                if weight >= cutoff {
                    edges.push(WeightedEdge {
                        idx: p.idx,
                        idx2: p.idx2,
                        weight,
                    });
                }
            }
        }
    }

    sorts::sort_edges(&mut edges);
    edges
}

/// Build the similarity graph of one collection.
pub fn build_adjacency(
    collection: &IntervalCollection,
    mode: AdjacencyMode,
    cutoff: f64,
    config: &MatrixConfig,
) -> Result<AdjacencyResult> {
    if !cutoff.is_finite() {
        return Err(Error::Parameter(format!("cutoff {cutoff} is not finite")));
    }
    let start = Instant::now();

    let edges = score_overlaps(collection, mode, cutoff);
    debug!("Time elapsed scoring overlaps: {:?}", start.elapsed());

    if edges.is_empty() {
        info!(
            "no interval pair of {} qualifies under {} mode with cutoff {}",
            collection.name, mode, cutoff
        );
        return Ok(AdjacencyResult::Empty);
    }

    info!(
        "{} retained edges over {} intervals of {} ({} mode, cutoff {})",
        edges.len(),
        collection.len(),
        collection.name,
        mode,
        cutoff
    );
    let matrix = AdjacencyMatrix::from_edges(collection.len(), edges, config)?;
    Ok(AdjacencyResult::Matrix(matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatrixLayout;
    use crate::duplex_structs::Interval;

    fn coll(ivs: &[(i64, i64)]) -> IntervalCollection {
        IntervalCollection::new(
            "gap",
            ivs.iter().map(|&(s, e)| Interval::new(s, e)).collect(),
        )
    }

    #[test]
    fn test_nucleotide_boundary_weight_zero_is_kept() {
        let c = coll(&[(100, 110), (105, 115)]);
        let res = build_adjacency(&c, AdjacencyMode::Nucleotide, 5.0, &MatrixConfig::default())
            .unwrap();
        let m = res.matrix().unwrap();
        assert_eq!(m.edges().len(), 1);
        assert_eq!(m.edges()[0].weight, 0.0);
        assert_eq!((m.edges()[0].idx, m.edges()[0].idx2), (0, 1));
    }

    #[test]
    fn test_nucleotide_rejects_distant_pairs() {
        // 21 wide vs 11 shared: 5 - 10 < 0
        let c = coll(&[(100, 120), (110, 120)]);
        let res = build_adjacency(&c, AdjacencyMode::Nucleotide, 5.0, &MatrixConfig::default())
            .unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn test_perc_uses_global_maximum() {
        let c = coll(&[(0, 19), (0, 1)]);
        let res =
            build_adjacency(&c, AdjacencyMode::Perc, 0.9, &MatrixConfig::default()).unwrap();
        let m = res.matrix().unwrap();
        assert_eq!(m.edges().len(), 1);
        assert_eq!(m.get(0, 1), 0.9);
        assert_eq!(m.get(1, 0), 0.0);

        // an unrelated wide interval changes the normalizer
        let c = coll(&[(0, 19), (0, 1), (1000, 1039)]);
        let edges = score_overlaps(&c, AdjacencyMode::Perc, 0.9);
        assert_eq!(edges.len(), 1);
        assert!((edges[0].weight - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_perc_with_nothing_qualifying_is_empty() {
        let c = coll(&[(0, 19), (0, 19)]);
        let res =
            build_adjacency(&c, AdjacencyMode::Perc, 0.5, &MatrixConfig::default()).unwrap();
        assert_eq!(res, AdjacencyResult::Empty);
    }

    #[test]
    fn test_none_mode_is_symmetric() {
        let c = coll(&[(1, 10), (5, 20), (30, 40)]);
        let res =
            build_adjacency(&c, AdjacencyMode::None, 0.0, &MatrixConfig::default()).unwrap();
        let m = res.matrix().unwrap();
        assert_eq!(m.size(), 3);
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(1, 0), 1.0);
        assert_eq!(m.get(0, 2), 0.0);
        assert_eq!(m.get(2, 2), 0.0);
    }

    #[test]
    fn test_sparse_layout_agrees_with_dense() {
        let c = coll(&[(1, 10), (5, 20), (8, 12), (30, 40)]);
        let limit = MatrixConfig::default();
        let dense = build_adjacency(
            &c,
            AdjacencyMode::None,
            0.0,
            &MatrixConfig::new(MatrixLayout::Dense, limit.dense_byte_limit),
        )
        .unwrap();
        let sparse = build_adjacency(
            &c,
            AdjacencyMode::None,
            0.0,
            &MatrixConfig::new(MatrixLayout::Sparse, 0),
        )
        .unwrap();
        let (dense, sparse) = (dense.matrix().unwrap(), sparse.matrix().unwrap());
        assert!(!dense.is_sparse());
        assert!(sparse.is_sparse());
        assert_eq!(dense.to_dense(&limit).unwrap(), sparse.to_dense(&limit).unwrap());
        assert_eq!(dense.edges(), sparse.edges());
    }

    #[test]
    fn test_auto_layout_keeps_weights_sparse() {
        let c = coll(&[(1, 10), (5, 20)]);
        let res =
            build_adjacency(&c, AdjacencyMode::None, 0.0, &MatrixConfig::default()).unwrap();
        assert!(res.matrix().unwrap().is_sparse());
    }

    #[test]
    fn test_dense_weights_respect_byte_limit() {
        // 4 x 4 f64 weights are 128 bytes
        let c = coll(&[(1, 10), (5, 20), (8, 12), (30, 40)]);
        let tight = MatrixConfig::new(MatrixLayout::Dense, 100);
        assert!(matches!(
            build_adjacency(&c, AdjacencyMode::None, 0.0, &tight),
            Err(Error::MatrixTooLarge { bytes: 128, .. })
        ));

        let res = build_adjacency(&c, AdjacencyMode::None, 0.0, &MatrixConfig::default()).unwrap();
        assert!(matches!(
            res.matrix().unwrap().to_dense(&tight),
            Err(Error::MatrixTooLarge { bytes: 128, .. })
        ));
        let roomy = MatrixConfig::new(MatrixLayout::Auto, 128);
        assert_eq!(res.matrix().unwrap().to_dense(&roomy).unwrap()[[1, 0]], 1.0);
    }
}
