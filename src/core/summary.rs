// JobPulse - core/summary.rs
//
// Read-only aggregations over a filtered view of a normalised table:
// headline figures, value-count rankings, salary medians and the monthly
// posting trend. Pure functions; presentation happens elsewhere.

use crate::core::model::{ExperienceGroup, NormalizedRecord, NormalizedTable, RoleLabel, YearMonth};
use crate::core::normalizer::parse_datetime;
use crate::util::constants;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Sizes of the ranked lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryConfig {
    pub top_locations: usize,
    pub top_skills: usize,
    pub top_benefits: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            top_locations: constants::DEFAULT_TOP_LOCATIONS,
            top_skills: constants::DEFAULT_TOP_SKILLS,
            top_benefits: constants::DEFAULT_TOP_BENEFITS,
        }
    }
}

/// Salary figures over rows with a concrete (non-negotiable) minimum salary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalarySummary {
    /// Rows with `salary_negotiable == false` and a present minimum salary.
    pub rows_with_salary: usize,
    /// Median minimum salary per role, highest first.
    pub median_min_by_role: Vec<(RoleLabel, f64)>,
}

/// Everything the presentation layer shows for one filtered view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total_jobs: usize,
    /// Median minimum experience in years, `None` when no row has a value.
    pub median_experience: Option<f64>,
    /// Latest parseable `process_timestamp`.
    pub latest_update: Option<DateTime<Utc>>,
    pub top_locations: Vec<(String, usize)>,
    pub role_counts: Vec<(RoleLabel, usize)>,
    pub experience_group_counts: Vec<(ExperienceGroup, usize)>,
    pub top_skills: Vec<(String, usize)>,
    /// `None` when the table lacks the salary columns.
    pub salary: Option<SalarySummary>,
    pub top_benefits: Vec<(String, usize)>,
    /// Postings per month over the continuous month range. `None` when the
    /// table has no month buckets.
    pub monthly_trend: Option<Vec<(YearMonth, usize)>>,
}

impl Summary {
    /// Compute the summary for the rows at `indices`.
    pub fn compute(table: &NormalizedTable, indices: &[usize], config: &SummaryConfig) -> Self {
        let rows: Vec<&NormalizedRecord> = indices
            .iter()
            .filter_map(|&i| table.records().get(i))
            .collect();

        let schema = table.schema();

        let top_locations = if schema.has(constants::COL_LOCATION) {
            value_counts(rows.iter().filter_map(|r| r.location_primary.clone()))
                .into_iter()
                .take(config.top_locations)
                .collect()
        } else {
            Vec::new()
        };

        let role_counts = match table.role_groups() {
            Some(roles) => value_counts(indices.iter().filter_map(|&i| roles.get(i).copied().flatten())),
            None => Vec::new(),
        };

        let experience_group_counts = match table.experience_groups() {
            Some(groups) => value_counts(indices.iter().filter_map(|&i| groups.get(i).copied())),
            None => Vec::new(),
        };

        let salary = if schema.has(constants::COL_SALARY_MIN)
            && schema.has(constants::COL_SALARY_NEGOTIABLE)
        {
            Some(salary_summary(table, indices))
        } else {
            None
        };

        let monthly_trend = if schema.has(crate::core::model::DERIVED_POSTED_YEAR_MONTH) {
            Some(monthly_trend(&rows))
        } else {
            None
        };

        Self {
            total_jobs: rows.len(),
            median_experience: median(
                rows.iter()
                    .filter_map(|r| r.experience_years_min_numeric)
                    .map(|v| v as f64)
                    .collect(),
            ),
            latest_update: rows
                .iter()
                .filter_map(|r| r.process_timestamp.as_deref())
                .filter_map(|ts| parse_datetime(ts, false))
                .max(),
            top_locations,
            role_counts,
            experience_group_counts,
            top_skills: top_skills(&rows, config.top_skills),
            salary,
            top_benefits: top_benefits(&rows, config.top_benefits),
            monthly_trend,
        }
    }
}

/// Count values, ordered by count descending; equal counts keep first-seen order.
pub fn value_counts<T, I>(values: I) -> Vec<(T, usize)>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut positions: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        match positions.get(&value) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }
    // Stable sort keeps first-seen order among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Median of the values, `None` when empty.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn top_skills(rows: &[&NormalizedRecord], n: usize) -> Vec<(String, usize)> {
    let skills = rows.iter().flat_map(|r| {
        r.skills_or_tags
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    });
    value_counts(skills).into_iter().take(n).collect()
}

fn top_benefits(rows: &[&NormalizedRecord], n: usize) -> Vec<(String, usize)> {
    let benefits = rows
        .iter()
        .filter_map(|r| r.benefits_text.as_deref())
        .flat_map(|text| text.split(constants::BENEFIT_SEPARATOR))
        .map(|b| b.trim().to_lowercase())
        .filter(|b| !b.is_empty() && b != constants::BENEFIT_NO_INFO_MARKER);
    value_counts(benefits).into_iter().take(n).collect()
}

fn salary_summary(table: &NormalizedTable, indices: &[usize]) -> SalarySummary {
    let mut by_role: BTreeMap<RoleLabel, Vec<f64>> = BTreeMap::new();
    let mut rows_with_salary = 0;

    for &i in indices {
        let Some(record) = table.records().get(i) else {
            continue;
        };
        let Some(min) = record.salary_min_vnd else {
            continue;
        };
        if record.salary_negotiable != Some(false) {
            continue;
        }
        rows_with_salary += 1;
        if let Some(role) = table.role_group(i) {
            by_role.entry(role).or_default().push(min as f64);
        }
    }

    let mut median_min_by_role: Vec<(RoleLabel, f64)> = by_role
        .into_iter()
        .filter_map(|(role, values)| median(values).map(|m| (role, m)))
        .collect();
    median_min_by_role.sort_by(|a, b| b.1.total_cmp(&a.1));

    SalarySummary {
        rows_with_salary,
        median_min_by_role,
    }
}

/// Count rows with a URL per month, filling gap months with zero.
fn monthly_trend(rows: &[&NormalizedRecord]) -> Vec<(YearMonth, usize)> {
    let mut counts: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for record in rows {
        if let Some(ym) = record.posted_year_month {
            let slot = counts.entry(ym).or_insert(0);
            if record.url.is_some() {
                *slot += 1;
            }
        }
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    let mut trend = Vec::new();
    let mut current = first;
    while current <= last {
        trend.push((current, counts.get(&current).copied().unwrap_or(0)));
        current = current.succ();
    }
    trend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::RawTable;
    use crate::core::normalizer::{normalize, NormalizeConfig};

    fn build(headers: &[&str], rows: &[&[&str]]) -> NormalizedTable {
        let mut raw = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            raw.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        normalize(&raw, &NormalizeConfig::default())
    }

    fn all(table: &NormalizedTable) -> Vec<usize> {
        (0..table.len()).collect()
    }

    #[test]
    fn test_value_counts_orders_by_count_then_first_seen() {
        let counts = value_counts(["b", "a", "a", "c", "b", "a"]);
        assert_eq!(counts, vec![("a", 3), ("b", 2), ("c", 1)]);
        let ties = value_counts(["x", "y"]);
        assert_eq!(ties, vec![("x", 1), ("y", 1)]);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![]), None);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_headline_figures() {
        let table = build(
            &["experience_years_min_numeric", "process_timestamp"],
            &[
                &["1", "2024-05-01 08:00:00"],
                &["3", "2024-05-03 21:15:00"],
                &["", "garbage"],
            ],
        );
        let summary = Summary::compute(&table, &all(&table), &SummaryConfig::default());
        assert_eq!(summary.total_jobs, 3);
        assert_eq!(summary.median_experience, Some(2.0));
        let latest = summary.latest_update.unwrap();
        assert_eq!(
            latest.format(constants::LATEST_UPDATE_FORMAT).to_string(),
            "21:15:00 03/05/2024"
        );
    }

    #[test]
    fn test_top_skills_across_sources() {
        let table = build(
            &["source_website", "skills_list_json_vnw", "job_tags_list_json_cv"],
            &[
                &["VietnamWorks", r#"["SQL","Python"]"#, ""],
                &["CareerViet", "", r#"["sql","Excel"]"#],
                &["CareerViet", "", r#"["excel","sql"]"#],
            ],
        );
        let config = SummaryConfig {
            top_skills: 2,
            ..Default::default()
        };
        let summary = Summary::compute(&table, &all(&table), &config);
        assert_eq!(
            summary.top_skills,
            vec![("sql".to_string(), 3), ("excel".to_string(), 2)]
        );
    }

    #[test]
    fn test_top_benefits_skip_no_info_marker() {
        let table = build(
            &["benefits_text"],
            &[
                &["Thưởng; Bảo hiểm ;"],
                &["bảo hiểm;Không có thông tin"],
            ],
        );
        let summary = Summary::compute(&table, &all(&table), &SummaryConfig::default());
        assert_eq!(
            summary.top_benefits,
            vec![("bảo hiểm".to_string(), 2), ("thưởng".to_string(), 1)]
        );
    }

    #[test]
    fn test_salary_only_non_negotiable_rows() {
        let table = build(
            &["job_title", "salary_min_vnd", "salary_negotiable"],
            &[
                &["Data Analyst", "20000000", "False"],
                &["Data Analyst", "30000000", "False"],
                &["Business Analyst", "50000000", "False"],
                &["Business Analyst", "90000000", "True"],
                &["Product Owner", "", "False"],
            ],
        );
        let summary = Summary::compute(&table, &all(&table), &SummaryConfig::default());
        let salary = summary.salary.unwrap();
        assert_eq!(salary.rows_with_salary, 3);
        assert_eq!(
            salary.median_min_by_role,
            vec![
                (RoleLabel::BusinessAnalyst, 50_000_000.0),
                (RoleLabel::DataAnalyst, 25_000_000.0)
            ]
        );
    }

    #[test]
    fn test_salary_absent_without_columns() {
        let table = build(&["salary_min_vnd"], &[&["1"]]);
        let summary = Summary::compute(&table, &all(&table), &SummaryConfig::default());
        assert!(summary.salary.is_none());
    }

    #[test]
    fn test_monthly_trend_fills_gaps() {
        let table = build(
            &["posted_datetime_str", "url"],
            &[
                &["2023-11-02", "u1"],
                &["2024-02-10", "u2"],
                &["2024-02-11", "u3"],
                &["2024-02-12", ""],
                &["bad", "u4"],
            ],
        );
        let summary = Summary::compute(&table, &all(&table), &SummaryConfig::default());
        let trend = summary.monthly_trend.unwrap();
        let labels: Vec<String> = trend.iter().map(|(ym, _)| ym.to_string()).collect();
        assert_eq!(labels, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
        let counts: Vec<usize> = trend.iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![1, 0, 0, 2]);
    }

    #[test]
    fn test_summary_over_filtered_view() {
        let table = build(
            &["location_primary", "experience_years_min_numeric"],
            &[&["Hà Nội", "0"], &["Hà Nội", "6"], &["Huế", "2"]],
        );
        let summary = Summary::compute(&table, &[0, 2], &SummaryConfig::default());
        assert_eq!(summary.total_jobs, 2);
        assert_eq!(
            summary.top_locations,
            vec![("Hà Nội".to_string(), 1), ("Huế".to_string(), 1)]
        );
        assert_eq!(
            summary.experience_group_counts,
            vec![
                (ExperienceGroup::EntryLevel, 1),
                (ExperienceGroup::OneToTwo, 1)
            ]
        );
        assert!(summary.monthly_trend.is_none());
    }
}
