// JobPulse - core/filter.rs
//
// Composable filter engine over a normalised table.
// All active filters are AND-combined. Results are index views; the table
// itself is never modified.

use crate::core::model::{NormalizedTable, RoleLabel};
use crate::util::constants;
use crate::util::error::FilterError;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

/// Complete filter state. All fields are AND-combined when applied.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Source tag to include (None = all).
    pub source: Option<String>,

    /// Primary location to include (None = all).
    pub location: Option<String>,

    /// Role category to include (None = all). Ignored when the table has no
    /// role column.
    pub role: Option<RoleLabel>,

    /// Inclusive minimum-experience range. Rows with missing experience are
    /// excluded while a range is set.
    pub experience_range: Option<(i64, i64)>,

    /// Case-insensitive regex matched against the job title. None = no filter.
    pub title_pattern: Option<Regex>,
}

impl FilterState {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.location.is_none()
            && self.role.is_none()
            && self.experience_range.is_none()
            && self.title_pattern.is_none()
    }

    /// Set the title search pattern, compiling it case-insensitively.
    /// An empty pattern clears the filter.
    pub fn set_title_pattern(&mut self, pattern: &str) -> Result<(), FilterError> {
        if pattern.is_empty() {
            self.title_pattern = None;
            return Ok(());
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| FilterError::InvalidRegex {
                pattern: pattern.to_string(),
                source: e,
            })?;
        self.title_pattern = Some(regex);
        Ok(())
    }

    /// Set the inclusive experience range.
    pub fn set_experience_range(&mut self, min: i64, max: i64) -> Result<(), FilterError> {
        if min > max {
            return Err(FilterError::InvertedRange { min, max });
        }
        self.experience_range = Some((min, max));
        Ok(())
    }
}

/// Apply filters to a table, returning indices of matching rows.
///
/// Returns indices into `table.records()` so callers can project views
/// without copying records.
pub fn apply_filters(table: &NormalizedTable, filter: &FilterState) -> Vec<usize> {
    if filter.is_empty() {
        return (0..table.len()).collect();
    }

    let roles = if filter.role.is_some() {
        table.role_groups()
    } else {
        None
    };
    let experience_applies =
        table.schema().has(constants::COL_EXPERIENCE_YEARS) && filter.experience_range.is_some();

    table
        .records()
        .iter()
        .enumerate()
        .filter(|(idx, record)| {
            if let Some(ref source) = filter.source {
                if record.source.as_ref().map(|s| s.tag()) != Some(source.as_str()) {
                    return false;
                }
            }

            if let Some(ref location) = filter.location {
                if record.location_primary.as_deref() != Some(location.as_str()) {
                    return false;
                }
            }

            if let (Some(role), Some(roles)) = (filter.role, roles) {
                if roles.get(*idx).copied().flatten() != Some(role) {
                    return false;
                }
            }

            if experience_applies {
                if let Some((min, max)) = filter.experience_range {
                    match record.experience_years_min_numeric {
                        Some(years) if (min..=max).contains(&years) => {}
                        _ => return false,
                    }
                }
            }

            if let Some(ref regex) = filter.title_pattern {
                match record.job_title.as_deref() {
                    Some(title) if regex.is_match(title) => {}
                    _ => return false,
                }
            }

            true
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Choices a filter UI can offer for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Distinct source tags, sorted.
    pub sources: Vec<String>,
    /// Distinct primary locations, sorted.
    pub locations: Vec<String>,
    /// Distinct role labels present, in priority order. Empty when the
    /// table has no role column.
    pub roles: Vec<RoleLabel>,
    /// Minimum and maximum experience values present.
    pub experience_bounds: (i64, i64),
}

impl FilterOptions {
    /// Collect filter choices from the full table.
    ///
    /// Experience bounds default to 0..=20 when no row carries a value; the
    /// upper bound is never below the lower.
    pub fn from_table(table: &NormalizedTable) -> Self {
        let mut sources = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut min_exp: Option<i64> = None;
        let mut max_exp: Option<i64> = None;

        for record in table.records() {
            if let Some(ref source) = record.source {
                sources.insert(source.tag().to_string());
            }
            if let Some(ref location) = record.location_primary {
                locations.insert(location.clone());
            }
            if let Some(years) = record.experience_years_min_numeric {
                min_exp = Some(min_exp.map_or(years, |m| m.min(years)));
                max_exp = Some(max_exp.map_or(years, |m| m.max(years)));
            }
        }

        let roles: BTreeSet<RoleLabel> = table
            .role_groups()
            .map(|roles| roles.iter().flatten().copied().collect())
            .unwrap_or_default();

        let lo = min_exp.unwrap_or(constants::DEFAULT_EXPERIENCE_MIN);
        let hi = max_exp.unwrap_or(constants::DEFAULT_EXPERIENCE_MAX).max(lo);

        Self {
            sources: sources.into_iter().collect(),
            locations: locations.into_iter().collect(),
            roles: roles.into_iter().collect(),
            experience_bounds: (lo, hi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::RawTable;
    use crate::core::normalizer::{normalize, NormalizeConfig};

    fn sample_table() -> NormalizedTable {
        let mut raw = RawTable::new(
            [
                "job_title",
                "source_website",
                "location_primary",
                "experience_years_min_numeric",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        for row in [
            ["Data Analyst", "VietnamWorks", "Hà Nội", "2"],
            ["Business Analyst", "CareerViet", "Hồ Chí Minh", "4"],
            ["Product Owner", "VietnamWorks", "Hồ Chí Minh", ""],
            ["Backend Engineer", "CareerViet", "Đà Nẵng", "0"],
        ] {
            raw.push_row(row.iter().map(|s| s.to_string()).collect());
        }
        normalize(&raw, &NormalizeConfig::default())
    }

    #[test]
    fn test_empty_filter_returns_all() {
        let table = sample_table();
        let result = apply_filters(&table, &FilterState::default());
        assert_eq!(result, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_source_filter() {
        let table = sample_table();
        let filter = FilterState {
            source: Some("CareerViet".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&table, &filter), vec![1, 3]);
    }

    #[test]
    fn test_role_filter_uses_derived_roles() {
        let table = sample_table();
        let filter = FilterState {
            role: Some(RoleLabel::ProductOwner),
            ..Default::default()
        };
        assert_eq!(apply_filters(&table, &filter), vec![2]);
    }

    #[test]
    fn test_experience_range_excludes_missing() {
        let table = sample_table();
        let mut filter = FilterState::default();
        filter.set_experience_range(0, 3).unwrap();
        assert_eq!(apply_filters(&table, &filter), vec![0, 3]);
    }

    #[test]
    fn test_combined_filters() {
        let table = sample_table();
        let mut filter = FilterState {
            location: Some("Hồ Chí Minh".to_string()),
            ..Default::default()
        };
        filter.set_title_pattern("analyst").unwrap();
        assert_eq!(apply_filters(&table, &filter), vec![1]);
    }

    #[test]
    fn test_invalid_regex() {
        let mut filter = FilterState::default();
        assert!(filter.set_title_pattern("[invalid").is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut filter = FilterState::default();
        assert!(matches!(
            filter.set_experience_range(5, 1),
            Err(FilterError::InvertedRange { min: 5, max: 1 })
        ));
    }

    #[test]
    fn test_filter_does_not_touch_table() {
        let table = sample_table();
        let before = table.records().to_vec();
        let filter = FilterState {
            source: Some("VietnamWorks".to_string()),
            ..Default::default()
        };
        let _ = apply_filters(&table, &filter);
        assert_eq!(table.records(), before.as_slice());
    }

    #[test]
    fn test_filter_options() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        assert_eq!(options.sources, vec!["CareerViet", "VietnamWorks"]);
        assert_eq!(options.locations.len(), 3);
        assert_eq!(options.experience_bounds, (0, 4));
        assert_eq!(
            options.roles,
            vec![
                RoleLabel::DataAnalyst,
                RoleLabel::BusinessAnalyst,
                RoleLabel::ProductOwner,
                RoleLabel::Other
            ]
        );
    }

    #[test]
    fn test_filter_options_default_experience_bounds() {
        let options = FilterOptions::from_table(&NormalizedTable::empty());
        assert_eq!(options.experience_bounds, (0, 20));
        assert!(options.roles.is_empty());
    }
}
