use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::info;
use polars::prelude::*;

use crate::adjacency::AdjacencyMatrix;
use crate::cluster::ClusterIntervals;
use crate::contact_matrix::ContactMatrix;
use crate::duplex_structs::{CanonicalRecord, CanonicalSample};
use crate::error::{Error, Result};

fn write_tsv(df: &mut DataFrame, path: &Path, header: bool) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(e, path))?;
    let mut writer = BufWriter::new(file);
    CsvWriter::new(&mut writer)
        .include_header(header)
        .with_separator(b'\t')
        .finish(df)?;
    info!("wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Non-zero cells as `x  y  count`.
pub fn contacts_frame(matrix: &ContactMatrix) -> Result<DataFrame> {
    let cells = matrix.nonzero();
    let df = df!(
        "x" => cells.iter().map(|c| c.0 as u64).collect::<Vec<_>>(),
        "y" => cells.iter().map(|c| c.1 as u64).collect::<Vec<_>>(),
        "count" => cells.iter().map(|c| c.2).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

pub fn write_contacts(matrix: &ContactMatrix, path: &Path) -> Result<()> {
    write_tsv(&mut contacts_frame(matrix)?, path, true)
}

/// Retained edges as `idx  idx2  weight`.
pub fn edges_frame(matrix: &AdjacencyMatrix) -> Result<DataFrame> {
    let edges = matrix.edges();
    let df = df!(
        "idx" => edges.iter().map(|e| e.idx as u64).collect::<Vec<_>>(),
        "idx2" => edges.iter().map(|e| e.idx2 as u64).collect::<Vec<_>>(),
        "weight" => edges.iter().map(|e| e.weight).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

pub fn write_edges(matrix: &AdjacencyMatrix, path: &Path) -> Result<()> {
    write_tsv(&mut edges_frame(matrix)?, path, true)
}

pub fn clusters_frame(clusters: &ClusterIntervals) -> Result<DataFrame> {
    let ivs = &clusters.intervals;
    let df = df!(
        "name" => ivs.iter().map(|_| clusters.name.as_str()).collect::<Vec<_>>(),
        "cluster" => ivs.iter().map(|t| t.cluster as u64).collect::<Vec<_>>(),
        "side" => ivs.iter().map(|t| t.side.to_string()).collect::<Vec<_>>(),
        "idx" => ivs.iter().map(|t| t.idx as u64).collect::<Vec<_>>(),
        "start" => ivs.iter().map(|t| t.interval.start).collect::<Vec<_>>(),
        "end" => ivs.iter().map(|t| t.interval.end).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

pub fn write_clusters(clusters: &ClusterIntervals, path: &Path) -> Result<()> {
    write_tsv(&mut clusters_frame(clusters)?, path, true)
}

fn text_column<'a>(
    records: &'a [CanonicalRecord],
    f: impl Fn(&'a CanonicalRecord) -> &'a str,
) -> Vec<&'a str> {
    records.iter().map(f).collect()
}

/// Records in the input layout, with the left arm in the first segment
/// columns and the right arm in the second. No header, so the output can
/// be read back as input.
pub fn records_frame(sample: &CanonicalSample) -> Result<DataFrame> {
    let rs = &sample.records;
    let df = df!(
        "read_id" => text_column(rs, |r| r.id.as_str()),
        "aux_1" => text_column(rs, |r| r.aux[0].as_str()),
        "aux_2" => text_column(rs, |r| r.aux[1].as_str()),
        "a_name" => text_column(rs, |r| r.left.name.as_str()),
        "a_aux_1" => text_column(rs, |r| r.left.aux[0].as_str()),
        "a_aux_2" => text_column(rs, |r| r.left.aux[1].as_str()),
        "a_start" => rs.iter().map(|r| r.left.start).collect::<Vec<_>>(),
        "a_end" => rs.iter().map(|r| r.left.end).collect::<Vec<_>>(),
        "a_score" => text_column(rs, |r| r.left.score.as_str()),
        "b_name" => text_column(rs, |r| r.right.name.as_str()),
        "b_aux_1" => text_column(rs, |r| r.right.aux[0].as_str()),
        "b_aux_2" => text_column(rs, |r| r.right.aux[1].as_str()),
        "b_start" => rs.iter().map(|r| r.right.start).collect::<Vec<_>>(),
        "b_end" => rs.iter().map(|r| r.right.end).collect::<Vec<_>>(),
        "b_score" => text_column(rs, |r| r.right.score.as_str()),
    )?;
    Ok(df)
}

pub fn write_records(sample: &CanonicalSample, path: &Path) -> Result<()> {
    write_tsv(&mut records_frame(sample)?, path, false)
}
