use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No feasible layout on any sheet size (attempted: {})", attempted.join(", "))]
    NoFeasibleLayout { attempted: Vec<String> },
    #[error("No resolvable paper price for paper type(s): {}", paper_type_ids.join(", "))]
    AmbiguousPaperPrice { paper_type_ids: Vec<String> },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// How the tile sits on the machine sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    /// Tile width runs along the sheet width
    #[default]
    Normal,
    /// Tile turned 90°
    Rotated,
}

impl Orientation {
    /// Apply the orientation to a (width, height) pair
    pub fn apply(self, width: f64, height: f64) -> (f64, f64) {
        match self {
            Orientation::Normal => (width, height),
            Orientation::Rotated => (height, width),
        }
    }
}

/// Production technology used to print a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProductionMethod {
    /// Click-charged digital press, sheets fed directly
    Digital,
    /// Plate-based offset press, parent sheets cut to machine sheets
    Offset,
}

impl ProductionMethod {
    pub fn label(self) -> &'static str {
        match self {
            ProductionMethod::Digital => "digital",
            ProductionMethod::Offset => "offset",
        }
    }
}

/// Parent sheet category as stocked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SheetCategory {
    QuarterSheet,
    HalfSheet,
    FullSheet,
}

/// How a finishing operation is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PricingType {
    /// Cost × quantity
    PerPiece,
    /// Cost × total machine sheets printed
    PerSheet,
    /// Flat cost per job
    Fixed,
    /// Cost × folds per unit × quantity
    PerFold,
    /// Cost × cuts per unit × quantity
    PerCut,
}

/// Warning severity, ordered `Info < Warning < Danger`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

/// What a quality warning is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WarningKind {
    SmallText,
    LowImageResolution,
    ExcessiveShrink,
    ShrinkExhausted,
    LowUtilization,
    MarginalOffsetVolume,
    PaperPriceUnresolved,
    SheetExcluded,
}

/// Advisory annotation on an option or on the whole result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualityWarning {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
}

impl QualityWarning {
    pub fn new(kind: WarningKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
        }
    }
}

/// Which method the engine recommends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RecommendedMethod {
    Digital,
    Offset,
    /// Cheapest options of both methods are within the near-tie tolerance
    Both,
}

impl From<ProductionMethod> for RecommendedMethod {
    fn from(method: ProductionMethod) -> Self {
        match method {
            ProductionMethod::Digital => RecommendedMethod::Digital,
            ProductionMethod::Offset => RecommendedMethod::Offset,
        }
    }
}
