use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use duplexranges::cluster::ConnectedComponents;
use duplexranges::config::{
    AdjacencyMode, AnalysisConfig, MatrixConfig, MatrixLayout, OrderPolicy,
    DEFAULT_DENSE_BYTE_LIMIT,
};
use duplexranges::duplex_structs::{Interval, Sample, SampleId};
use duplexranges::{canonicalize, output, pipeline, reader, region, sampler};

/// Contact maps, gap graphs and region queries over RNA duplex reads.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct Common {
    /// Chimeric-read table of one sample, as NAME=PATH (repeatable)
    #[arg(short, long = "sample", value_parser = parse_sample, required = true)]
    samples: Vec<(SampleId, PathBuf)>,

    /// Reference RNA the duplexes are anchored on
    #[arg(short, long)]
    reference: String,

    /// Segment ordering: position, position-both or identity
    #[arg(long, default_value_t = OrderPolicy::Position)]
    policy: OrderPolicy,

    /// Output prefix; one file per sample is written as PREFIX.SAMPLE.*.tsv
    #[arg(short, long)]
    output: PathBuf,

    /// Number of threads
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Draw this many records from every sample before analysis
    #[arg(long, conflicts_with = "equalize")]
    subsample: Option<usize>,

    /// Subsample every sample down to the smallest sample
    #[arg(long)]
    equalize: bool,

    /// Seed for subsampling
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Matrix storage: auto, dense or sparse
    #[arg(long, default_value_t = MatrixLayout::Auto)]
    layout: MatrixLayout,

    /// Largest matrix, in bytes, that is stored dense
    #[arg(long, default_value_t = DEFAULT_DENSE_BYTE_LIMIT)]
    dense_byte_limit: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize intra-molecular duplexes into a contact matrix
    Matrix {
        #[command(flatten)]
        common: Common,

        /// RNA whose contact map is drawn; records are anchored on it (defaults to the reference)
        #[arg(long)]
        rna: Option<String>,
    },
    /// Build the gap overlap graph and report its largest clusters
    Graph {
        #[command(flatten)]
        common: Common,

        /// Edge weighting: none, nucleotide or perc
        #[arg(short, long, default_value_t = AdjacencyMode::Nucleotide)]
        mode: AdjacencyMode,

        /// Weight cutoff for the chosen mode
        #[arg(short, long, default_value_t = 5.0)]
        cutoff: f64,

        /// Fail on inverted arms or gaps
        #[arg(long)]
        strict: bool,

        /// Number of clusters to report per sample
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Keep duplexes whose arms fall into two windows
    Region {
        #[command(flatten)]
        common: Common,

        /// Left-arm window as START:END
        #[arg(long, value_parser = parse_window)]
        left: Interval,

        /// Right-arm window as START:END
        #[arg(long, value_parser = parse_window)]
        right: Interval,

        /// Fail when a sample has no record in the windows
        #[arg(long)]
        require_hits: bool,
    },
}

fn parse_sample(s: &str) -> Result<(SampleId, PathBuf), String> {
    let (name, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{s}'"))?;
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=PATH, got '{s}'"));
    }
    Ok((SampleId(name.to_string()), PathBuf::from(path)))
}

fn parse_window(s: &str) -> Result<Interval, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{s}'"))?;
    let start: i64 = start.trim().parse().map_err(|e| format!("bad window start: {e}"))?;
    let end: i64 = end.trim().parse().map_err(|e| format!("bad window end: {e}"))?;
    let window = Interval::new(start, end);
    if window.is_inverted() {
        return Err(format!("window {window} ends before it starts"));
    }
    Ok(window)
}

fn sample_path(prefix: &Path, sample: &SampleId, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}.{}", prefix.display(), sample, suffix))
}

fn load(common: &Common) -> anyhow::Result<Vec<Sample>> {
    let samples = reader::read_samples(&common.samples).context("loading samples")?;
    let samples = if common.equalize {
        sampler::equalize(&samples, common.seed)?
    } else if let Some(n) = common.subsample {
        samples
            .iter()
            .map(|s| sampler::subsample(s, n, common.seed))
            .collect::<duplexranges::Result<Vec<_>>>()?
    } else {
        samples
    };
    Ok(samples)
}

fn analysis_config(common: &Common) -> AnalysisConfig {
    let mut config = AnalysisConfig::new(common.reference.clone());
    config.policy = common.policy;
    config.matrix = MatrixConfig::new(common.layout, common.dense_byte_limit);
    config
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Matrix { common, rna } => {
            let samples = load(&common)?;
            let config = analysis_config(&common);
            let rna = rna.unwrap_or_else(|| config.reference.clone());
            for (id, matrix) in pipeline::contact_matrices(&samples, &rna, &config)? {
                output::write_contacts(&matrix, &sample_path(&common.output, &id, "contacts.tsv"))?;
            }
        }
        Command::Graph {
            common,
            mode,
            cutoff,
            strict,
            top,
        } => {
            let samples = load(&common)?;
            let mut config = analysis_config(&common);
            config.mode = mode;
            config.cutoff = cutoff;
            config.strict = strict;
            for analysis in pipeline::analyze(&samples, &config)? {
                let Some(matrix) = analysis.adjacency.matrix() else {
                    info!("sample {}: no qualifying pairs, nothing to cluster", analysis.id());
                    continue;
                };
                output::write_edges(matrix, &sample_path(&common.output, analysis.id(), "edges.tsv"))?;
                if let Some(clusters) = analysis.top_clusters(&ConnectedComponents, top)? {
                    output::write_clusters(
                        &clusters,
                        &sample_path(&common.output, analysis.id(), "clusters.tsv"),
                    )?;
                }
            }
        }
        Command::Region {
            common,
            left,
            right,
            require_hits,
        } => {
            let samples = load(&common)?;
            let canonical = canonicalize::canonicalize(&samples, &common.reference, common.policy);
            for hits in region::region_query(&canonical, left, right)? {
                let hits = if require_hits {
                    hits.require_records("region query")?
                } else {
                    hits
                };
                output::write_records(&hits, &sample_path(&common.output, &hits.id, "region.tsv"))?;
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let threads = match &args.command {
        Command::Matrix { common, .. }
        | Command::Graph { common, .. }
        | Command::Region { common, .. } => common.threads,
    };

    // Set up Rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;

    let start = Instant::now();
    run(args)?;
    info!("Done in {:?}", start.elapsed());
    Ok(())
}
