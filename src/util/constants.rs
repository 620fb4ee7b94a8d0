// JobPulse - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "JobPulse";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "JobPulse";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Dataset source
// =============================================================================

/// CSV file loaded when neither the CLI nor config.toml names one.
pub const DEFAULT_DATA_CSV_PATH: &str = "data_cleaned.csv";

/// Source tag of the first upstream site. Its rows take skills from
/// `skills_list_json_vnw` only.
pub const SOURCE_VIETNAMWORKS: &str = "VietnamWorks";

/// Source tag of the second upstream site. Its rows fall back to
/// `job_tags_list_json_cv` when no skills were produced.
pub const SOURCE_CAREERVIET: &str = "CareerViet";

// =============================================================================
// Column names
// =============================================================================

pub const COL_POSTED_DATETIME_STR: &str = "posted_datetime_str";
pub const COL_SALARY_MIN: &str = "salary_min_vnd";
pub const COL_SALARY_MAX: &str = "salary_max_vnd";
pub const COL_DAYS_TO_DEADLINE: &str = "days_to_deadline";
pub const COL_EXPERIENCE_YEARS: &str = "experience_years_min_numeric";
pub const COL_VIEWS_COUNT: &str = "views_count";
pub const COL_SOURCE_WEBSITE: &str = "source_website";
pub const COL_SKILLS_VNW: &str = "skills_list_json_vnw";
pub const COL_TAGS_CV: &str = "job_tags_list_json_cv";
pub const COL_JOB_TITLE: &str = "job_title";
pub const COL_JOB_ROLE_GROUP: &str = "job_role_group";
pub const COL_LOCATION: &str = "location_primary";
pub const COL_BENEFITS: &str = "benefits_text";
pub const COL_URL: &str = "url";
pub const COL_PROCESS_TIMESTAMP: &str = "process_timestamp";
pub const COL_SALARY_NEGOTIABLE: &str = "salary_negotiable";

/// Columns coerced to integer-or-missing during normalisation.
pub const NUMERIC_COLUMNS: &[&str] = &[
    COL_SALARY_MIN,
    COL_SALARY_MAX,
    COL_DAYS_TO_DEADLINE,
    COL_EXPERIENCE_YEARS,
    COL_VIEWS_COUNT,
];

/// Columns consumed into typed fields of `NormalizedRecord`. Every other
/// column is carried through verbatim.
pub const TYPED_COLUMNS: &[&str] = &[
    COL_POSTED_DATETIME_STR,
    COL_SALARY_MIN,
    COL_SALARY_MAX,
    COL_DAYS_TO_DEADLINE,
    COL_EXPERIENCE_YEARS,
    COL_VIEWS_COUNT,
    COL_SOURCE_WEBSITE,
    COL_SKILLS_VNW,
    COL_TAGS_CV,
    COL_JOB_TITLE,
    COL_JOB_ROLE_GROUP,
    COL_LOCATION,
    COL_BENEFITS,
    COL_URL,
    COL_PROCESS_TIMESTAMP,
    COL_SALARY_NEGOTIABLE,
];

/// Cell values treated as "absent". Matched exactly, without trimming.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// =============================================================================
// Normalisation limits
// =============================================================================

/// Maximum number of field-level parse failures retained per load for
/// diagnostics. Counts keep going past this; only the detail is dropped.
pub const MAX_FIELD_FAILURES_TRACKED: usize = 1_000;

/// Maximum characters of a raw cell quoted in a field failure message.
pub const DEBUG_MAX_CELL_PREVIEW: usize = 80;

// =============================================================================
// Summary defaults
// =============================================================================

/// Number of locations shown in the location ranking.
pub const DEFAULT_TOP_LOCATIONS: usize = 7;

/// Number of skills/tags shown in the skill ranking.
pub const DEFAULT_TOP_SKILLS: usize = 10;

/// Number of benefits shown in the benefit ranking.
pub const DEFAULT_TOP_BENEFITS: usize = 10;

/// Number of rows printed by the sample-data toggle.
pub const DEFAULT_SAMPLE_ROWS: usize = 10;

/// Upper bound accepted for any configured top-N / sample size.
pub const MAX_TOP_N: usize = 1_000;

/// Experience slider bounds used when no row carries an experience value.
pub const DEFAULT_EXPERIENCE_MIN: i64 = 0;
pub const DEFAULT_EXPERIENCE_MAX: i64 = 20;

/// Benefit marker meaning "no information"; never counted as a benefit.
pub const BENEFIT_NO_INFO_MARKER: &str = "không có thông tin";

/// Separator between individual benefits inside `benefits_text`.
pub const BENEFIT_SEPARATOR: char = ';';

/// Display format of the latest process timestamp.
pub const LATEST_UPDATE_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Files
// =============================================================================

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum number of rows accepted by a single export.
pub const MAX_EXPORT_ROWS: usize = 5_000_000;
