// JobPulse - tests/e2e_normalize.rs
//
// End-to-end tests for the load, normalise, filter and summarise pipeline.
//
// These tests read a real CSV fixture from disk through the same loader and
// cache the binary uses; nothing is mocked.

use jobpulse::app::loader::{load_dataset, DatasetCache};
use jobpulse::core::filter::{apply_filters, FilterOptions, FilterState};
use jobpulse::core::model::{ExperienceGroup, RoleLabel, Source};
use jobpulse::core::normalizer::NormalizeConfig;
use jobpulse::core::summary::{Summary, SummaryConfig};
use jobpulse::util::error::LoadError;
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture() -> Arc<jobpulse::core::model::NormalizedTable> {
    let outcome = load_dataset(&fixture("data_cleaned.csv"), &NormalizeConfig::default());
    assert!(outcome.error.is_none(), "unexpected error: {:?}", outcome.error);
    outcome.table
}

// =============================================================================
// Loading
// =============================================================================

/// Every data row of the fixture becomes one normalised record.
#[test]
fn e2e_row_count_matches_input() {
    let table = load_fixture();
    assert_eq!(table.len(), 5);
    assert_eq!(table.stats().rows, 5);
}

/// A path that does not exist yields an empty table and SourceNotFound.
#[test]
fn e2e_missing_source_is_reported_as_data() {
    let path = fixture("does_not_exist.csv");
    let outcome = load_dataset(&path, &NormalizeConfig::default());
    assert!(outcome.table.is_empty());
    assert_eq!(outcome.error, Some(LoadError::SourceNotFound { path }));
}

/// Unknown columns pass through untouched.
#[test]
fn e2e_unknown_columns_pass_through() {
    let table = load_fixture();
    assert_eq!(table.passthrough_columns(), ["company_name".to_string()]);
    assert_eq!(
        table.records()[0].passthrough.get("company_name").map(String::as_str),
        Some("Acme")
    );
    assert!(table.records()[2].passthrough.get("company_name").is_none());
}

// =============================================================================
// Field normalisation
// =============================================================================

/// Parseable timestamps get a month bucket; the garbage one does not.
#[test]
fn e2e_timestamps_and_month_buckets() {
    let table = load_fixture();
    let months: Vec<Option<String>> = table
        .records()
        .iter()
        .map(|r| r.posted_year_month.map(|ym| ym.to_string()))
        .collect();
    assert_eq!(
        months,
        vec![
            Some("2024-03".to_string()),
            Some("2024-03".to_string()),
            Some("2024-05".to_string()),
            None,
            Some("2024-05".to_string()),
        ]
    );
    assert_eq!(table.stats().timestamps_parsed, 4);
    assert_eq!(table.stats().timestamps_failed, 1);
}

/// Missing and unparseable numbers are absent; a literal zero stays zero.
#[test]
fn e2e_numeric_missing_distinct_from_zero() {
    let table = load_fixture();
    let records = table.records();
    assert_eq!(records[0].salary_min_vnd, Some(20_000_000));
    assert_eq!(records[1].salary_min_vnd, None);
    assert_eq!(records[4].salary_min_vnd, None);
    assert_eq!(records[4].views_count, Some(0));
    assert_eq!(records[2].views_count, None);
    assert_eq!(records[4].days_to_deadline, Some(-2));
}

/// Tags come from the source-specific column and are lower-cased.
#[test]
fn e2e_tags_unified_per_source() {
    let table = load_fixture();
    let records = table.records();
    assert_eq!(records[0].source, Some(Source::VietnamWorks));
    assert_eq!(records[0].skills_or_tags, vec!["sql", "power bi"]);
    assert_eq!(records[1].skills_or_tags, vec!["excel", "sql"]);
    assert!(records[2].skills_or_tags.is_empty(), "invalid JSON yields no tags");
    assert!(records[3].skills_or_tags.is_empty());
    assert_eq!(records[4].skills_or_tags, vec!["communication"]);
}

/// Derived labels follow the keyword priority and experience buckets.
#[test]
fn e2e_derived_labels() {
    let table = load_fixture();
    let roles: Vec<Option<RoleLabel>> = (0..table.len()).map(|i| table.role_group(i)).collect();
    assert_eq!(
        roles,
        vec![
            Some(RoleLabel::DataAnalyst),
            Some(RoleLabel::BusinessAnalyst),
            Some(RoleLabel::HrDataAnalyst),
            Some(RoleLabel::ProductOwner),
            Some(RoleLabel::Other),
        ]
    );
    let groups: Vec<Option<ExperienceGroup>> =
        (0..table.len()).map(|i| table.experience_group(i)).collect();
    assert_eq!(
        groups,
        vec![
            Some(ExperienceGroup::ThreeToFive),
            Some(ExperienceGroup::OneToTwo),
            Some(ExperienceGroup::EntryLevel),
            Some(ExperienceGroup::MoreThanFive),
            Some(ExperienceGroup::Unknown),
        ]
    );
}

// =============================================================================
// Filtering and summaries
// =============================================================================

/// Filters combine and never modify the table.
#[test]
fn e2e_filtered_view() {
    let table = load_fixture();
    let mut filter = FilterState {
        source: Some("CareerViet".to_string()),
        ..Default::default()
    };
    filter.set_experience_range(0, 1).unwrap();
    assert_eq!(apply_filters(&table, &filter), vec![1, 2]);

    filter.set_title_pattern("^hr").unwrap();
    assert_eq!(apply_filters(&table, &filter), vec![2]);
    assert_eq!(table.len(), 5);

    let options = FilterOptions::from_table(&table);
    assert_eq!(options.sources, vec!["CareerViet", "VietnamWorks"]);
    assert_eq!(options.experience_bounds, (0, 6));
}

/// Summary over the whole fixture.
#[test]
fn e2e_summary() {
    let table = load_fixture();
    let all: Vec<usize> = (0..table.len()).collect();
    let summary = Summary::compute(&table, &all, &SummaryConfig::default());

    assert_eq!(summary.total_jobs, 5);
    assert_eq!(summary.top_skills[0], ("sql".to_string(), 2));
    assert_eq!(summary.top_locations[0], ("Hà Nội".to_string(), 3));
    assert_eq!(summary.top_benefits[0], ("bảo hiểm".to_string(), 2));

    let trend: Vec<(String, usize)> = summary
        .monthly_trend
        .unwrap()
        .into_iter()
        .map(|(ym, n)| (ym.to_string(), n))
        .collect();
    assert_eq!(
        trend,
        vec![
            ("2024-03".to_string(), 2),
            ("2024-04".to_string(), 0),
            ("2024-05".to_string(), 1),
        ]
    );

    let salary = summary.salary.unwrap();
    assert_eq!(salary.rows_with_salary, 3);
}

// =============================================================================
// Cache
// =============================================================================

/// A second load of an unchanged file is served from the cache.
#[test]
fn e2e_cache_reuses_table() {
    let mut cache = DatasetCache::new();
    let config = NormalizeConfig::default();
    let first = cache.load(&fixture("data_cleaned.csv"), &config);
    let second = cache.load(&fixture("data_cleaned.csv"), &config);
    assert!(Arc::ptr_eq(&first.table, &second.table));
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);
}
