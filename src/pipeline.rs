use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use crate::adjacency::{build_adjacency, AdjacencyResult};
use crate::canonicalize::canonicalize_sample;
use crate::cluster::{extract_clusters, ClusterIntervals, Clusterer};
use crate::collections::build_interval_collections;
use crate::config::AnalysisConfig;
use crate::contact_matrix::{build_contact_matrix, ContactMatrix};
use crate::duplex_structs::{CanonicalSample, DuplexIntervals, Sample, SampleId};
use crate::error::Result;

/// Everything derived from one sample on the graph path.
#[derive(Debug, Clone)]
pub struct SampleAnalysis {
    pub canonical: CanonicalSample,
    pub intervals: DuplexIntervals,
    pub adjacency: AdjacencyResult,
}

impl SampleAnalysis {
    pub fn id(&self) -> &SampleId {
        &self.canonical.id
    }

    /// Cluster the gap graph and extract the `top` largest clusters.
    /// Returns `None` when the graph has no edges.
    pub fn top_clusters<C: Clusterer>(
        &self,
        clusterer: &C,
        top: usize,
    ) -> Result<Option<ClusterIntervals>> {
        let Some(matrix) = self.adjacency.matrix() else {
            return Ok(None);
        };
        let membership = clusterer.cluster(matrix);
        let ids = membership.largest(top);
        extract_clusters(&self.intervals, &membership, &ids).map(Some)
    }
}

pub fn analyze_sample(sample: &Sample, config: &AnalysisConfig) -> Result<SampleAnalysis> {
    let mut canonical = canonicalize_sample(sample, &config.reference, config.policy);
    if config.require_records {
        canonical = canonical.require_records("canonicalization")?;
    }
    let intervals = build_interval_collections(&canonical, &config.reference, config.strict)?;
    let adjacency = build_adjacency(&intervals.gap, config.mode, config.cutoff, &config.matrix)?;
    if adjacency.is_empty() {
        warn!("sample {}: gap graph has no edges", sample.id);
    }
    Ok(SampleAnalysis {
        canonical,
        intervals,
        adjacency,
    })
}

/// Run the graph path on every sample in parallel. Fails on the first error.
pub fn analyze(samples: &[Sample], config: &AnalysisConfig) -> Result<Vec<SampleAnalysis>> {
    config.validate()?;
    let start = Instant::now();
    let out = samples
        .par_iter()
        .map(|s| analyze_sample(s, config))
        .collect::<Result<Vec<_>>>()?;
    info!(
        "analyzed {} samples in {:?}",
        out.len(),
        start.elapsed()
    );
    Ok(out)
}

/// Contact matrix of `rna` for every sample. Records are canonicalized
/// with `config.policy` anchored on `rna`, so any RNA of the table can be
/// drawn, not only `config.reference`.
pub fn contact_matrices(
    samples: &[Sample],
    rna: &str,
    config: &AnalysisConfig,
) -> Result<Vec<(SampleId, ContactMatrix)>> {
    config.validate()?;
    samples
        .par_iter()
        .map(|s| {
            let canonical = canonicalize_sample(s, rna, config.policy);
            let matrix = build_contact_matrix(&canonical, rna, &config.matrix)?;
            Ok((s.id.clone(), matrix))
        })
        .collect()
}
