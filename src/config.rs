use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Ordering policy
// ---------------------------------------------------------------------------

/// How segments are assigned to the left and right slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderPolicy {
    /// Either segment on the reference; smaller start goes left.
    #[default]
    Position,
    /// Both segments on the reference; smaller start goes left.
    PositionBoth,
    /// Either segment on the reference; the reference segment goes left.
    Identity,
}

impl std::str::FromStr for OrderPolicy {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "position" => Ok(Self::Position),
            "position-both" => Ok(Self::PositionBoth),
            "identity" => Ok(Self::Identity),
            _ => Err(format!(
                "unknown ordering policy '{s}'; expected 'position', 'position-both' or 'identity'"
            )),
        }
    }
}

impl std::fmt::Display for OrderPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::PositionBoth => write!(f, "position-both"),
            Self::Identity => write!(f, "identity"),
        }
    }
}

// ---------------------------------------------------------------------------
// Adjacency scoring mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdjacencyMode {
    /// Every overlap is an edge of weight 1.
    None,
    /// Weight from the number of non-shared bases, bounded by the cutoff.
    #[default]
    Nucleotide,
    /// Weight from the shared fraction of the widest interval in the collection.
    Perc,
}

impl std::str::FromStr for AdjacencyMode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "nucleotide" => Ok(Self::Nucleotide),
            "perc" => Ok(Self::Perc),
            _ => Err(format!(
                "unknown adjacency mode '{s}'; expected 'none', 'nucleotide' or 'perc'"
            )),
        }
    }
}

impl std::fmt::Display for AdjacencyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Nucleotide => write!(f, "nucleotide"),
            Self::Perc => write!(f, "perc"),
        }
    }
}

// ---------------------------------------------------------------------------
// Matrix storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixLayout {
    /// Dense within `dense_byte_limit`, sparse above.
    #[default]
    Auto,
    /// Always dense; refuses to allocate above `dense_byte_limit`.
    Dense,
    Sparse,
}

impl std::str::FromStr for MatrixLayout {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "dense" => Ok(Self::Dense),
            "sparse" => Ok(Self::Sparse),
            _ => Err(format!(
                "unknown matrix layout '{s}'; expected 'auto', 'dense' or 'sparse'"
            )),
        }
    }
}

impl std::fmt::Display for MatrixLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Dense => write!(f, "dense"),
            Self::Sparse => write!(f, "sparse"),
        }
    }
}

/// 1 GiB: 2^28 `u32` contact counts or 2^27 `f64` weights.
pub const DEFAULT_DENSE_BYTE_LIMIT: u64 = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixConfig {
    pub layout: MatrixLayout,
    /// Largest dense allocation, in bytes, for a single matrix.
    pub dense_byte_limit: u64,
}

impl MatrixConfig {
    pub fn new(layout: MatrixLayout, dense_byte_limit: u64) -> Self {
        Self {
            layout,
            dense_byte_limit,
        }
    }

    /// Decide whether a `size x size` matrix of `T` is stored dense.
    pub fn use_dense<T>(&self, what: &'static str, size: usize) -> Result<bool> {
        let bytes = (size as u128) * (size as u128) * std::mem::size_of::<T>() as u128;
        let fits = bytes <= self.dense_byte_limit as u128;
        match self.layout {
            MatrixLayout::Sparse => Ok(false),
            MatrixLayout::Auto => Ok(fits),
            MatrixLayout::Dense if fits => Ok(true),
            MatrixLayout::Dense => Err(Error::MatrixTooLarge {
                what,
                bytes,
                limit: self.dense_byte_limit,
            }),
        }
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self::new(MatrixLayout::Auto, DEFAULT_DENSE_BYTE_LIMIT)
    }
}

// ---------------------------------------------------------------------------
// Whole analysis
// ---------------------------------------------------------------------------

/// Settings shared by every sample of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub reference: String,
    pub policy: OrderPolicy,
    /// Fail on inverted arms or gaps instead of passing them through.
    pub strict: bool,
    pub mode: AdjacencyMode,
    pub cutoff: f64,
    pub matrix: MatrixConfig,
    /// Fail when a sample has no record left after canonicalization.
    pub require_records: bool,
}

impl AnalysisConfig {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            policy: OrderPolicy::default(),
            strict: false,
            mode: AdjacencyMode::default(),
            cutoff: 5.0,
            matrix: MatrixConfig::default(),
            require_records: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.reference.is_empty() {
            return Err(Error::Parameter("reference name must not be empty".into()));
        }
        if !self.cutoff.is_finite() {
            return Err(Error::Parameter(format!("cutoff {} is not finite", self.cutoff)));
        }
        match self.mode {
            AdjacencyMode::Perc if !(0.0..=1.0).contains(&self.cutoff) => Err(Error::Parameter(
                format!("perc cutoff must lie in [0, 1], got {}", self.cutoff),
            )),
            AdjacencyMode::Nucleotide if self.cutoff < 0.0 => Err(Error::Parameter(format!(
                "nucleotide cutoff must be non-negative, got {}",
                self.cutoff
            ))),
            _ => Ok(()),
        }
    }
}
