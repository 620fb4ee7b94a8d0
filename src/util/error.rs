// JobPulse - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Load errors are returned as data next to an (empty) table rather than
// propagated; field-level failures never leave the normaliser.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for JobPulse operations that do propagate.
#[derive(Debug)]
pub enum JobPulseError {
    /// Dataset could not be loaded.
    Load(LoadError),

    /// Filter construction failed.
    Filter(FilterError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for JobPulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for JobPulseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Table-level failures of a dataset load.
///
/// Both variants are recovered by the loader: the caller receives an empty
/// table together with the descriptor and decides how to present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The named input could not be located.
    SourceNotFound { path: PathBuf },

    /// The input exists but could not be decoded into a table.
    /// `cause` is the text of the underlying I/O, CSV or encoding error.
    LoadFailure { path: PathBuf, cause: String },
}

impl LoadError {
    /// Path of the source the failed load referred to.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::SourceNotFound { path } | Self::LoadFailure { path, .. } => path,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotFound { path } => {
                write!(f, "CSV file '{}' was not found", path.display())
            }
            Self::LoadFailure { path, cause } => write!(
                f,
                "Failed to load or process data from CSV '{}': {cause}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<LoadError> for JobPulseError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Structural failures turning CSV bytes into a raw table.
/// The loader reports these as `LoadError::LoadFailure`.
#[derive(Debug)]
pub enum DecodeError {
    /// CSV tokenising or UTF-8 decoding failed.
    Csv(csv::Error),

    /// The input has no header row.
    NoColumns,

    /// A data row has more fields than the header.
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(e) => write!(f, "{e}"),
            Self::NoColumns => f.write_str("No columns to parse from file"),
            Self::TooManyFields {
                line,
                expected,
                found,
            } => write!(
                f,
                "Error tokenizing data: expected {expected} fields in line {line}, saw {found}"
            ),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for DecodeError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

// ---------------------------------------------------------------------------
// Field parse failures
// ---------------------------------------------------------------------------

/// A single optional field that degraded to absent/empty during normalisation.
///
/// These are diagnostics only. They are never escalated to a table-level error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldParseFailure {
    /// Date/time text that matched none of the accepted formats.
    Timestamp { row: usize, raw: String },

    /// Numeric column text that is not an in-range integer.
    Numeric {
        row: usize,
        column: &'static str,
        raw: String,
    },

    /// JSON-list column text that is malformed or not list-shaped.
    JsonList {
        row: usize,
        column: &'static str,
        raw: String,
    },
}

impl fmt::Display for FieldParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp { row, raw } => {
                write!(f, "row {row}: cannot parse timestamp '{raw}'")
            }
            Self::Numeric { row, column, raw } => {
                write!(f, "row {row}: '{column}' value '{raw}' is not an integer")
            }
            Self::JsonList { row, column, raw } => {
                write!(f, "row {row}: '{column}' value '{raw}' is not a JSON list")
            }
        }
    }
}

impl std::error::Error for FieldParseFailure {}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to filter construction.
#[derive(Debug)]
pub enum FilterError {
    /// User-provided title regex is invalid.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    /// Experience range with min greater than max.
    InvertedRange { min: i64, max: i64 },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex { pattern, source } => {
                write!(f, "Invalid title regex '{pattern}': {source}")
            }
            Self::InvertedRange { min, max } => {
                write!(f, "Experience range {min}..={max} is inverted")
            }
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            Self::InvertedRange { .. } => None,
        }
    }
}

impl From<FilterError> for JobPulseError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Export would exceed maximum row count.
    TooManyRows { count: usize, max: usize },

    /// Export path has an extension other than .csv or .json.
    UnsupportedFormat { path: PathBuf },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::TooManyRows { count, max } => write!(
                f,
                "Export of {count} rows exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
            Self::UnsupportedFormat { path } => write!(
                f,
                "Cannot export to '{}': expected a .csv or .json extension",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for JobPulseError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for JobPulseError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for JobPulse results.
pub type Result<T> = std::result::Result<T, JobPulseError>;
