// JobPulse - app/report.rs
//
// Plain-text dashboard report for one filtered view: overview figures,
// ranked lists, salary medians, the monthly trend and optional sample rows.

use crate::app::state::AppState;
use crate::core::model::NormalizedRecord;
use crate::core::summary::{Summary, SummaryConfig};
use crate::util::constants;
use std::io::{self, Write};

/// Report layout options.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub title: String,
    pub show_sample: bool,
    pub sample_rows: usize,
    pub summary: SummaryConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: format!("{} {}", constants::APP_NAME, constants::APP_VERSION),
            show_sample: false,
            sample_rows: constants::DEFAULT_SAMPLE_ROWS,
            summary: SummaryConfig::default(),
        }
    }
}

const SALARY_UNIT_VND: f64 = 1_000_000.0;

/// Printed instead of the sections when the filters exclude every row.
pub const NO_MATCH_MESSAGE: &str = "No data matches the current filters.";

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

fn ranked<W: Write, T: std::fmt::Display>(out: &mut W, items: &[(T, usize)]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "  (no data)");
    }
    for (value, count) in items {
        writeln!(out, "  {count:>6}  {value}")?;
    }
    Ok(())
}

/// Format a VND amount in millions, e.g. `25.0 Tr`.
pub fn format_salary(vnd: f64) -> String {
    format!("{:.1} Tr", vnd / SALARY_UNIT_VND)
}

/// Render the report for the state's current view.
pub fn render_report<W: Write>(out: &mut W, state: &AppState, config: &ReportConfig) -> io::Result<()> {
    let summary = state.summary(&config.summary);
    writeln!(out, "{}", config.title)?;
    writeln!(out, "{}", "=".repeat(config.title.chars().count()))?;

    if let Some(ref err) = state.load_error {
        writeln!(out, "Load error: {err}")?;
        return Ok(());
    }
    if state.filtered_indices.is_empty() && !state.table.is_empty() {
        writeln!(out, "{NO_MATCH_MESSAGE}")?;
        return Ok(());
    }

    render_overview(out, &summary, state.table.len())?;

    section(out, "Top locations")?;
    ranked(out, &summary.top_locations)?;

    section(out, "Roles")?;
    ranked(out, &summary.role_counts)?;

    section(out, "Experience groups")?;
    ranked(out, &summary.experience_group_counts)?;

    section(out, "Top skills")?;
    ranked(out, &summary.top_skills)?;

    if let Some(ref salary) = summary.salary {
        section(out, "Median minimum salary by role")?;
        writeln!(out, "  Rows with a fixed salary: {}", salary.rows_with_salary)?;
        for (role, median) in &salary.median_min_by_role {
            writeln!(out, "  {:>10}  {role}", format_salary(*median))?;
        }
    }

    section(out, "Top benefits")?;
    ranked(out, &summary.top_benefits)?;

    if let Some(ref trend) = summary.monthly_trend {
        section(out, "Monthly postings")?;
        ranked(out, trend)?;
    }

    if config.show_sample {
        section(out, "Sample rows")?;
        let rows = state
            .filtered_indices
            .iter()
            .take(config.sample_rows)
            .filter_map(|&i| state.table.records().get(i).map(|r| (i, r)));
        for (i, record) in rows {
            render_sample_row(out, state, i, record)?;
        }
    }

    Ok(())
}

fn render_overview<W: Write>(out: &mut W, summary: &Summary, total_rows: usize) -> io::Result<()> {
    section(out, "Overview")?;
    writeln!(out, "  Total jobs:        {} of {total_rows}", summary.total_jobs)?;
    match summary.median_experience {
        Some(years) => writeln!(out, "  Median experience: {years:.1} years")?,
        None => writeln!(out, "  Median experience: --")?,
    }
    match summary.latest_update {
        Some(ts) => writeln!(
            out,
            "  Latest update:     {}",
            ts.format(constants::LATEST_UPDATE_FORMAT)
        ),
        None => writeln!(out, "  Latest update:     --"),
    }
}

fn render_sample_row<W: Write>(
    out: &mut W,
    state: &AppState,
    row: usize,
    record: &NormalizedRecord,
) -> io::Result<()> {
    let dash = "--";
    writeln!(
        out,
        "  [{row}] {} | {} | {} | {} | exp {}",
        record.job_title.as_deref().unwrap_or(dash),
        record.source.as_ref().map(|s| s.tag()).unwrap_or(dash),
        record.location_primary.as_deref().unwrap_or(dash),
        state.table.role_group(row).map(|r| r.label()).unwrap_or(dash),
        record
            .experience_years_min_numeric
            .map(|y| y.to_string())
            .unwrap_or_else(|| dash.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::loader::LoadOutcome;
    use crate::core::filter::FilterState;
    use crate::core::model::{NormalizedTable, RawTable};
    use crate::core::normalizer::{normalize, NormalizeConfig};
    use crate::util::error::LoadError;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn state() -> AppState {
        let mut raw = RawTable::new(
            [
                "job_title",
                "location_primary",
                "salary_min_vnd",
                "salary_negotiable",
                "process_timestamp",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        raw.push_row(
            ["Data Analyst", "Hà Nội", "25000000", "False", "2024-05-03 21:15:00"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        raw.push_row(
            ["Product Manager", "Hà Nội", "", "True", ""]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let outcome = LoadOutcome {
            table: Arc::new(normalize(&raw, &NormalizeConfig::default())),
            error: None,
        };
        AppState::new(outcome)
    }

    fn render(state: &AppState, config: &ReportConfig) -> String {
        let mut buf = Vec::new();
        render_report(&mut buf, state, config).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_salary() {
        assert_eq!(format_salary(25_000_000.0), "25.0 Tr");
        assert_eq!(format_salary(12_340_000.0), "12.3 Tr");
    }

    #[test]
    fn test_report_sections() {
        let text = render(&state(), &ReportConfig::default());
        assert!(text.contains("Total jobs:        2 of 2"));
        assert!(text.contains("Latest update:     21:15:00 03/05/2024"));
        assert!(text.contains("     2  Hà Nội"));
        assert!(text.contains("25.0 Tr  Data Analyst"));
        assert!(text.contains("Median experience: --"));
        assert!(!text.contains("Sample rows"));
        assert!(!text.contains("Monthly postings"));
    }

    #[test]
    fn test_report_sample_rows() {
        let config = ReportConfig {
            show_sample: true,
            sample_rows: 1,
            ..Default::default()
        };
        let text = render(&state(), &config);
        assert!(text.contains("Sample rows"));
        assert!(text.contains("[0] Data Analyst | -- | Hà Nội | Data Analyst | exp --"));
        assert!(!text.contains("[1] Product Manager"));
    }

    #[test]
    fn test_report_load_error() {
        let failed = LoadOutcome {
            table: Arc::new(NormalizedTable::empty()),
            error: Some(LoadError::SourceNotFound {
                path: PathBuf::from("missing.csv"),
            }),
        };
        let text = render(&AppState::new(failed), &ReportConfig::default());
        assert!(text.contains("Load error:"));
        assert!(!text.contains("Overview"));
    }

    #[test]
    fn test_report_filters_excluding_every_row() {
        let mut state = state();
        state.set_filter(FilterState {
            location: Some("Đà Nẵng".into()),
            ..Default::default()
        });
        let text = render(&state, &ReportConfig::default());
        assert_eq!(text.matches(NO_MATCH_MESSAGE).count(), 1);
        assert!(!text.contains("Total jobs"));
        assert!(!text.contains("(no data)"));
    }

    #[test]
    fn test_report_empty_table_keeps_sections() {
        let empty = LoadOutcome {
            table: Arc::new(NormalizedTable::empty()),
            error: None,
        };
        let text = render(&AppState::new(empty), &ReportConfig::default());
        assert!(!text.contains(NO_MATCH_MESSAGE));
        assert!(text.contains("Total jobs:        0 of 0"));
    }
}
