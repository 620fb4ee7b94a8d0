// JobPulse - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::core::classify::{classify_role, group_experience};
use crate::core::normalizer::NormalizeStats;
use crate::util::constants;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

// =============================================================================
// Raw table (input of normalisation)
// =============================================================================

/// One row of the unprocessed input table, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    values: Vec<String>,
}

impl RawRecord {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Cell at `column`, or `None` when the column is missing from the table,
    /// the row is short, or the cell holds a missing-value token.
    pub fn get(&self, column: Option<usize>) -> Option<&str> {
        let value = self.values.get(column?)?;
        if is_missing(value) {
            None
        } else {
            Some(value.as_str())
        }
    }

    /// Raw cell text without missing-value interpretation.
    pub fn raw(&self, column: usize) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// Returns true if a cell's text is one of the recognised missing-value tokens.
pub fn is_missing(value: &str) -> bool {
    constants::NA_TOKENS.contains(&value)
}

/// Loosely typed table as read from the CSV source.
///
/// Column order is not significant; lookups go through `column_index`.
/// When a header name repeats, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self {
            headers,
            index,
            rows: Vec::new(),
        }
    }

    /// Append a row. Rows shorter than the header are padded with empty
    /// (missing) cells.
    pub fn push_row(&mut self, mut values: Vec<String>) {
        if values.len() < self.headers.len() {
            values.resize(self.headers.len(), String::new());
        }
        self.rows.push(RawRecord::new(values));
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

// =============================================================================
// Source
// =============================================================================

/// Upstream job-listing site a posting was collected from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum Source {
    VietnamWorks,
    CareerViet,
    /// Any tag outside the recognised set, kept verbatim.
    Other(String),
}

impl Source {
    /// Exact, case-sensitive match against the recognised source tags.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            constants::SOURCE_VIETNAMWORKS => Source::VietnamWorks,
            constants::SOURCE_CAREERVIET => Source::CareerViet,
            other => Source::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Source::VietnamWorks => constants::SOURCE_VIETNAMWORKS,
            Source::CareerViet => constants::SOURCE_CAREERVIET,
            Source::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.tag().to_string()
    }
}

// =============================================================================
// Year-month bucket
// =============================================================================

/// Calendar-month period key derived from a posting timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Month of the timestamp's date in its own timezone.
    pub fn of<Tz: TimeZone>(ts: &DateTime<Tz>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// The calendar month immediately after this one.
    pub fn succ(self) -> Self {
        if self.month >= 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

// =============================================================================
// Role and experience labels
// =============================================================================

/// Job-role category derived from a posting title.
///
/// Declaration order is the classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RoleLabel {
    #[serde(rename = "HR Data Analyst")]
    HrDataAnalyst,
    #[serde(rename = "Data Analyst")]
    DataAnalyst,
    #[serde(rename = "Business Analyst")]
    BusinessAnalyst,
    #[serde(rename = "Product Owner")]
    ProductOwner,
    #[serde(rename = "Product Manager")]
    ProductManager,
    Other,
}

impl RoleLabel {
    pub fn all() -> &'static [RoleLabel] {
        &[
            RoleLabel::HrDataAnalyst,
            RoleLabel::DataAnalyst,
            RoleLabel::BusinessAnalyst,
            RoleLabel::ProductOwner,
            RoleLabel::ProductManager,
            RoleLabel::Other,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoleLabel::HrDataAnalyst => "HR Data Analyst",
            RoleLabel::DataAnalyst => "Data Analyst",
            RoleLabel::BusinessAnalyst => "Business Analyst",
            RoleLabel::ProductOwner => "Product Owner",
            RoleLabel::ProductManager => "Product Manager",
            RoleLabel::Other => "Other",
        }
    }

    /// Case-insensitive lookup by display label.
    pub fn from_label(text: &str) -> Option<Self> {
        let wanted = text.trim();
        Self::all()
            .iter()
            .copied()
            .find(|r| r.label().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for RoleLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum-experience bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ExperienceGroup {
    Unknown,
    #[serde(rename = "0 (entry-level)")]
    EntryLevel,
    #[serde(rename = "1–2 years")]
    OneToTwo,
    #[serde(rename = "3–5 years")]
    ThreeToFive,
    #[serde(rename = ">5 years")]
    MoreThanFive,
}

impl ExperienceGroup {
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceGroup::Unknown => "Unknown",
            ExperienceGroup::EntryLevel => "0 (entry-level)",
            ExperienceGroup::OneToTwo => "1–2 years",
            ExperienceGroup::ThreeToFive => "3–5 years",
            ExperienceGroup::MoreThanFive => ">5 years",
        }
    }
}

impl std::fmt::Display for ExperienceGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Normalised record
// =============================================================================

/// One row after type coercion and tag unification.
///
/// `None` always means "absent" and is distinct from zero or an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedRecord {
    /// Parsed posting time, `None` when missing or unparseable.
    pub posted_datetime: Option<DateTime<Utc>>,

    /// Month bucket of `posted_datetime`.
    pub posted_year_month: Option<YearMonth>,

    pub salary_min_vnd: Option<i64>,
    pub salary_max_vnd: Option<i64>,
    pub days_to_deadline: Option<i64>,
    pub experience_years_min_numeric: Option<i64>,
    pub views_count: Option<i64>,

    #[serde(rename = "source_website")]
    pub source: Option<Source>,

    /// Lower-cased skills or tags from the source-specific JSON list.
    pub skills_or_tags: Vec<String>,

    pub job_title: Option<String>,
    pub location_primary: Option<String>,
    pub benefits_text: Option<String>,
    pub url: Option<String>,
    pub process_timestamp: Option<String>,
    pub salary_negotiable: Option<bool>,

    /// Columns not consumed into typed fields, keyed by header name.
    /// Missing cells are omitted.
    pub passthrough: BTreeMap<String, String>,
}

impl NormalizedRecord {
    /// Numeric field by column name, for the columns in `NUMERIC_COLUMNS`.
    pub fn numeric(&self, column: &str) -> Option<i64> {
        match column {
            constants::COL_SALARY_MIN => self.salary_min_vnd,
            constants::COL_SALARY_MAX => self.salary_max_vnd,
            constants::COL_DAYS_TO_DEADLINE => self.days_to_deadline,
            constants::COL_EXPERIENCE_YEARS => self.experience_years_min_numeric,
            constants::COL_VIEWS_COUNT => self.views_count,
            _ => None,
        }
    }

    pub(crate) fn numeric_mut(&mut self, column: &str) -> Option<&mut Option<i64>> {
        match column {
            constants::COL_SALARY_MIN => Some(&mut self.salary_min_vnd),
            constants::COL_SALARY_MAX => Some(&mut self.salary_max_vnd),
            constants::COL_DAYS_TO_DEADLINE => Some(&mut self.days_to_deadline),
            constants::COL_EXPERIENCE_YEARS => Some(&mut self.experience_years_min_numeric),
            constants::COL_VIEWS_COUNT => Some(&mut self.views_count),
            _ => None,
        }
    }
}

// =============================================================================
// Column presence
// =============================================================================

/// Derived column: parsed posting timestamp.
pub const DERIVED_POSTED_DATETIME: &str = "posted_datetime";
/// Derived column: month bucket of the posting timestamp.
pub const DERIVED_POSTED_YEAR_MONTH: &str = "posted_year_month";
/// Derived column: unified skill/tag sequence.
pub const DERIVED_SKILLS_OR_TAGS: &str = "skills_or_tags";
/// Derived column: job-role category.
pub const DERIVED_JOB_ROLE_GROUP: &str = "job_role_group";
/// Derived column: experience bucket.
pub const DERIVED_EXPERIENCE_GROUP: &str = "experience_group";

/// Which input columns were present and which derived columns exist as a
/// result. Decided once at normalisation time; downstream code asks this
/// instead of re-probing records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPresence {
    flags: BTreeMap<String, bool>,
}

impl ColumnPresence {
    pub fn set(&mut self, column: &str, present: bool) {
        self.flags.insert(column.to_string(), present);
    }

    /// True if the named input or derived column exists. Unknown names are absent.
    pub fn has(&self, column: &str) -> bool {
        self.flags.get(column).copied().unwrap_or(false)
    }

    /// All columns known to the schema with their presence flags.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// =============================================================================
// Normalised table
// =============================================================================

/// Analysis-ready record set. Immutable once built; filtering produces index
/// views and derived label columns are computed on first use and cached.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTable {
    records: Vec<NormalizedRecord>,
    schema: ColumnPresence,
    passthrough_columns: Vec<String>,
    precomputed_roles: Option<Vec<Option<RoleLabel>>>,
    role_cache: OnceLock<Vec<Option<RoleLabel>>>,
    experience_cache: OnceLock<Vec<ExperienceGroup>>,
    stats: NormalizeStats,
}

impl NormalizedTable {
    pub(crate) fn new(
        records: Vec<NormalizedRecord>,
        schema: ColumnPresence,
        passthrough_columns: Vec<String>,
        precomputed_roles: Option<Vec<Option<RoleLabel>>>,
        stats: NormalizeStats,
    ) -> Self {
        Self {
            records,
            schema,
            passthrough_columns,
            precomputed_roles,
            role_cache: OnceLock::new(),
            experience_cache: OnceLock::new(),
            stats,
        }
    }

    /// A table with no rows and no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn schema(&self) -> &ColumnPresence {
        &self.schema
    }

    /// Header names of the passthrough columns, in input order.
    pub fn passthrough_columns(&self) -> &[String] {
        &self.passthrough_columns
    }

    pub fn stats(&self) -> &NormalizeStats {
        &self.stats
    }

    /// Role label for every row, or `None` when the table has neither a
    /// `job_role_group` nor a `job_title` column.
    ///
    /// Uses the input's own `job_role_group` values when that column exists;
    /// otherwise classifies each title once and caches the result.
    pub fn role_groups(&self) -> Option<&[Option<RoleLabel>]> {
        if let Some(ref pre) = self.precomputed_roles {
            return Some(pre.as_slice());
        }
        if !self.schema.has(constants::COL_JOB_TITLE) {
            return None;
        }
        let roles = self.role_cache.get_or_init(|| {
            tracing::debug!(rows = self.records.len(), "Deriving job role groups");
            self.records
                .iter()
                .map(|r| Some(classify_role(r.job_title.as_deref().unwrap_or_default())))
                .collect()
        });
        Some(roles.as_slice())
    }

    pub fn role_group(&self, row: usize) -> Option<RoleLabel> {
        self.role_groups()?.get(row).copied().flatten()
    }

    /// Experience bucket for every row, or `None` when the table has no
    /// experience column.
    pub fn experience_groups(&self) -> Option<&[ExperienceGroup]> {
        if !self.schema.has(constants::COL_EXPERIENCE_YEARS) {
            return None;
        }
        let groups = self.experience_cache.get_or_init(|| {
            self.records
                .iter()
                .map(|r| group_experience(r.experience_years_min_numeric))
                .collect()
        });
        Some(groups.as_slice())
    }

    pub fn experience_group(&self, row: usize) -> Option<ExperienceGroup> {
        self.experience_groups()?.get(row).copied()
    }
}
