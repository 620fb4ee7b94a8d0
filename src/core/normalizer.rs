// JobPulse - core/normalizer.rs
//
// Converts a RawTable into an analysis-ready NormalizedTable.
// Core layer: pure, never fails. Every malformed optional field degrades
// to absent/empty for that field only; no row is ever dropped.

use crate::core::model::{
    ColumnPresence, NormalizedRecord, NormalizedTable, RawRecord, RawTable, RoleLabel, Source,
    YearMonth, DERIVED_EXPERIENCE_GROUP, DERIVED_JOB_ROLE_GROUP, DERIVED_POSTED_DATETIME,
    DERIVED_POSTED_YEAR_MONTH, DERIVED_SKILLS_OR_TAGS,
};
use crate::util::constants::{self, *};
use crate::util::error::FieldParseFailure;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;

/// Configuration for normalisation.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Read ambiguous `a/b/yyyy` dates as day-first instead of month-first.
    pub day_first: bool,
    /// Field failures retained in `NormalizeStats::failures`.
    pub max_field_failures: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            day_first: false,
            max_field_failures: constants::MAX_FIELD_FAILURES_TRACKED,
        }
    }
}

/// Per-load diagnostics of field-level degradations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeStats {
    /// Rows normalised (always equal to the input row count).
    pub rows: usize,
    /// Timestamps that parsed.
    pub timestamps_parsed: usize,
    /// Non-missing timestamp cells that did not parse.
    pub timestamps_failed: usize,
    /// Non-missing numeric cells that did not coerce, by column.
    pub numeric_failed: BTreeMap<&'static str, usize>,
    /// Non-missing JSON-list cells that were malformed or not lists.
    pub json_lists_rejected: usize,
    /// Detail of the first failures, capped at `max_field_failures`.
    pub failures: Vec<FieldParseFailure>,
    /// Failures seen beyond the cap.
    pub failures_dropped: usize,
}

impl NormalizeStats {
    fn record(&mut self, failure: FieldParseFailure, cap: usize) {
        tracing::trace!(%failure, "Field degraded to absent");
        if self.failures.len() < cap {
            self.failures.push(failure);
        } else {
            self.failures_dropped += 1;
        }
    }

    /// Total field failures, including those beyond the cap.
    pub fn total_failures(&self) -> usize {
        self.failures.len() + self.failures_dropped
    }
}

/// Column indices resolved once per table.
struct Columns {
    posted: Option<usize>,
    numeric: Vec<(&'static str, Option<usize>)>,
    source: Option<usize>,
    skills_vnw: Option<usize>,
    tags_cv: Option<usize>,
    title: Option<usize>,
    role_group: Option<usize>,
    location: Option<usize>,
    benefits: Option<usize>,
    url: Option<usize>,
    process_ts: Option<usize>,
    negotiable: Option<usize>,
    passthrough: Vec<(String, usize)>,
}

impl Columns {
    fn resolve(raw: &RawTable) -> Self {
        let mut passthrough = Vec::new();
        for (i, name) in raw.headers().iter().enumerate() {
            if TYPED_COLUMNS.contains(&name.as_str()) {
                continue;
            }
            // Duplicate headers resolve to their first occurrence.
            if raw.column_index(name) == Some(i) {
                passthrough.push((name.clone(), i));
            }
        }
        Self {
            posted: raw.column_index(COL_POSTED_DATETIME_STR),
            numeric: NUMERIC_COLUMNS
                .iter()
                .map(|c| (*c, raw.column_index(c)))
                .collect(),
            source: raw.column_index(COL_SOURCE_WEBSITE),
            skills_vnw: raw.column_index(COL_SKILLS_VNW),
            tags_cv: raw.column_index(COL_TAGS_CV),
            title: raw.column_index(COL_JOB_TITLE),
            role_group: raw.column_index(COL_JOB_ROLE_GROUP),
            location: raw.column_index(COL_LOCATION),
            benefits: raw.column_index(COL_BENEFITS),
            url: raw.column_index(COL_URL),
            process_ts: raw.column_index(COL_PROCESS_TIMESTAMP),
            negotiable: raw.column_index(COL_SALARY_NEGOTIABLE),
            passthrough,
        }
    }
}

/// Normalise a raw table.
///
/// Produces exactly one `NormalizedRecord` per input row, in input order.
/// The raw table is not modified.
pub fn normalize(raw: &RawTable, config: &NormalizeConfig) -> NormalizedTable {
    let cols = Columns::resolve(raw);
    let mut stats = NormalizeStats {
        rows: raw.len(),
        ..Default::default()
    };

    let mut records = Vec::with_capacity(raw.len());
    for (row_idx, row) in raw.rows().iter().enumerate() {
        records.push(normalize_row(row_idx, row, &cols, config, &mut stats));
    }

    // Month buckets exist only when at least one timestamp parsed.
    let has_year_month = stats.timestamps_parsed > 0;

    let precomputed_roles = cols.role_group.map(|idx| {
        raw.rows()
            .iter()
            .map(|row| row.get(Some(idx)).map(role_from_precomputed))
            .collect::<Vec<_>>()
    });

    let mut schema = ColumnPresence::default();
    for name in TYPED_COLUMNS {
        schema.set(name, raw.has_column(name));
    }
    for (name, _) in &cols.passthrough {
        schema.set(name, true);
    }
    schema.set(DERIVED_POSTED_DATETIME, cols.posted.is_some());
    schema.set(DERIVED_POSTED_YEAR_MONTH, has_year_month);
    schema.set(DERIVED_SKILLS_OR_TAGS, true);
    schema.set(
        DERIVED_JOB_ROLE_GROUP,
        cols.role_group.is_some() || cols.title.is_some(),
    );
    schema.set(
        DERIVED_EXPERIENCE_GROUP,
        raw.has_column(COL_EXPERIENCE_YEARS),
    );

    if stats.total_failures() > 0 {
        tracing::debug!(
            timestamps_failed = stats.timestamps_failed,
            numeric_failed = ?stats.numeric_failed,
            json_lists_rejected = stats.json_lists_rejected,
            "Normalisation degraded some fields to absent"
        );
    }

    let passthrough_columns = cols.passthrough.into_iter().map(|(name, _)| name).collect();
    NormalizedTable::new(records, schema, passthrough_columns, precomputed_roles, stats)
}

fn normalize_row(
    row_idx: usize,
    row: &RawRecord,
    cols: &Columns,
    config: &NormalizeConfig,
    stats: &mut NormalizeStats,
) -> NormalizedRecord {
    let cap = config.max_field_failures;
    let mut record = NormalizedRecord::default();

    // Timestamp
    if let Some(raw_ts) = row.get(cols.posted) {
        match parse_datetime_local(raw_ts, config.day_first) {
            Some(local) => {
                // Month bucket follows the wall-clock date written in the text.
                record.posted_year_month = Some(YearMonth::of(&local));
                record.posted_datetime = Some(local.with_timezone(&Utc));
                stats.timestamps_parsed += 1;
            }
            None => {
                stats.timestamps_failed += 1;
                stats.record(
                    FieldParseFailure::Timestamp {
                        row: row_idx,
                        raw: preview(raw_ts),
                    },
                    cap,
                );
            }
        }
    }

    // Numeric coercion
    for &(column, idx) in &cols.numeric {
        let Some(text) = row.get(idx) else {
            continue;
        };
        let value = coerce_integer(Some(text));
        if value.is_none() {
            *stats.numeric_failed.entry(column).or_insert(0) += 1;
            stats.record(
                FieldParseFailure::Numeric {
                    row: row_idx,
                    column,
                    raw: preview(text),
                },
                cap,
            );
        }
        if let Some(slot) = record.numeric_mut(column) {
            *slot = value;
        }
    }

    // Skill/tag unification
    record.source = row.get(cols.source).map(Source::from_tag);
    let mut tags: Vec<String> = Vec::new();
    if record.source == Some(Source::VietnamWorks) && cols.skills_vnw.is_some() {
        tags = parse_list_column(row, cols.skills_vnw, COL_SKILLS_VNW, row_idx, cap, stats);
    }
    if record.source == Some(Source::CareerViet) && cols.tags_cv.is_some() && tags.is_empty() {
        tags = parse_list_column(row, cols.tags_cv, COL_TAGS_CV, row_idx, cap, stats);
    }
    record.skills_or_tags = tags.iter().filter_map(|t| normalize_tag(t)).collect();

    // Passthrough descriptive fields
    let owned = |idx: Option<usize>| row.get(idx).map(str::to_string);
    record.job_title = owned(cols.title);
    record.location_primary = owned(cols.location);
    record.benefits_text = owned(cols.benefits);
    record.url = owned(cols.url);
    record.process_timestamp = owned(cols.process_ts);
    record.salary_negotiable = row.get(cols.negotiable).and_then(parse_bool);
    for (name, idx) in &cols.passthrough {
        if let Some(value) = row.get(Some(*idx)) {
            record.passthrough.insert(name.clone(), value.to_string());
        }
    }

    record
}

fn parse_list_column(
    row: &RawRecord,
    idx: Option<usize>,
    column: &'static str,
    row_idx: usize,
    cap: usize,
    stats: &mut NormalizeStats,
) -> Vec<String> {
    let Some(text) = row.get(idx) else {
        return Vec::new();
    };
    match try_parse_json_list(text) {
        Some(items) => items,
        None => {
            stats.json_lists_rejected += 1;
            stats.record(
                FieldParseFailure::JsonList {
                    row: row_idx,
                    column,
                    raw: preview(text),
                },
                cap,
            );
            Vec::new()
        }
    }
}

fn role_from_precomputed(text: &str) -> RoleLabel {
    RoleLabel::from_label(text).unwrap_or(RoleLabel::Other)
}

fn preview(text: &str) -> String {
    text.chars().take(DEBUG_MAX_CELL_PREVIEW).collect()
}

// =============================================================================
// Field parsers
// =============================================================================

/// Safe JSON-list parser.
///
/// Total: returns the list's elements verbatim for a JSON array, and the
/// empty sequence for absent input, `[]`, malformed JSON, or any non-array
/// JSON value. String elements are returned as-is; numbers and booleans as
/// their JSON text; null and nested values are skipped.
pub fn parse_json_list_safe(value: Option<&str>) -> Vec<String> {
    value.and_then(try_parse_json_list).unwrap_or_default()
}

/// `None` means the text was rejected (malformed or not list-shaped).
fn try_parse_json_list(text: &str) -> Option<Vec<String>> {
    if text.trim() == "[]" {
        return Some(Vec::new());
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    serde_json::Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Lower-case and trim a tag; blank tags are dropped.
fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Coerce numeric text to an integer.
///
/// Returns `None` ("missing") for absent, empty, non-numeric, fractional,
/// non-finite, or out-of-range input. Integral decimals such as `"3.0"` are
/// accepted. `"0"` yields `Some(0)`, which is distinct from missing.
pub fn coerce_integer(value: Option<&str>) -> Option<i64> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    let f: f64 = text.parse().ok()?;
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Parse a boolean cell: `True`/`False` in any case, or `1`/`0`.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Naive date-time formats tried in order. `%.f` accepts an optional
/// fractional-seconds suffix.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Offset-carrying formats other than strict RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const MONTH_FIRST_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M", "%m/%d/%Y"];
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M", "%d/%m/%Y"];

/// Parse free-form posting date/time text into UTC.
///
/// Accepts RFC 3339, ISO date-times with `T` or space separators (seconds
/// and fractional seconds optional), bare ISO dates, slash-separated ISO
/// dates, and `a/b/yyyy` dates. Those are read month-first unless
/// `day_first`, falling back to the other order when the preferred one
/// cannot be a valid date. Naive values are taken as UTC. Returns `None`
/// rather than failing.
pub fn parse_datetime(raw: &str, day_first: bool) -> Option<DateTime<Utc>> {
    parse_datetime_local(raw, day_first).map(|dt| dt.with_timezone(&Utc))
}

/// Like `parse_datetime`, but keeps the offset written in the text so the
/// local wall-clock date stays available. Naive values get a zero offset.
pub fn parse_datetime_local(raw: &str, day_first: bool) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    parse_naive(trimmed, day_first).map(|ndt| ndt.and_utc().fixed_offset())
}

fn parse_naive(trimmed: &str, day_first: bool) -> Option<NaiveDateTime> {
    if let Some(ndt) = parse_naive_iso(trimmed) {
        return Some(ndt);
    }

    // Slash-separated ISO: "2024/01/15 14:30:22" -> "2024-01-15 14:30:22"
    if trimmed.len() >= 5 && trimmed.as_bytes()[4] == b'/' {
        let normalised = trimmed.replace('/', "-");
        if let Some(ndt) = parse_naive_iso(&normalised) {
            return Some(ndt);
        }
    }

    let (preferred, fallback) = if day_first {
        (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS)
    } else {
        (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS)
    };
    preferred
        .iter()
        .chain(fallback.iter())
        .find_map(|fmt| parse_naive_with(trimmed, fmt))
}

fn parse_naive_iso(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| parse_naive_with(text, "%Y-%m-%d"))
}

/// Try `fmt` as a date-time, then as a date at midnight.
fn parse_naive_with(text: &str, fmt: &str) -> Option<NaiveDateTime> {
    if let Ok(ndt) = NaiveDateTime::parse_from_str(text, fmt) {
        return Some(ndt);
    }
    NaiveDate::parse_from_str(text, fmt)
        .ok()
        .and_then(|nd| nd.and_hms_opt(0, 0, 0))
}
