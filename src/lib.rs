pub mod adjacency;
pub mod canonicalize;
pub mod cluster;
pub mod collections;
pub mod config;
pub mod contact_matrix;
pub mod duplex_structs;
pub mod error;
pub mod output;
pub mod overlaps;
pub mod pipeline;
pub mod reader;
pub mod region;
pub mod sampler;
pub mod sorts;

#[cfg(feature = "python")]
mod numpy_bindings;

pub use crate::adjacency::{AdjacencyMatrix, AdjacencyResult};
pub use crate::cluster::{ClusterMembership, Clusterer, ConnectedComponents};
pub use crate::config::{AdjacencyMode, AnalysisConfig, MatrixConfig, MatrixLayout, OrderPolicy};
pub use crate::contact_matrix::ContactMatrix;
pub use crate::duplex_structs::{
    CanonicalRecord, CanonicalSample, ChimericRecord, DuplexIntervals, Interval,
    IntervalCollection, Sample, SampleId, Segment, Side,
};
pub use crate::error::{Error, Result};
