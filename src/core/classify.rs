// JobPulse - core/classify.rs
//
// Deterministic label derivations used by the presentation layer:
// job-role category from a title, experience bucket from years.
// Both are total functions.

use crate::core::model::{ExperienceGroup, RoleLabel};

/// Keyword sets in priority order. The first set with any keyword contained
/// in the lower-cased title decides the label.
const ROLE_KEYWORDS: &[(RoleLabel, &[&str])] = &[
    (RoleLabel::HrDataAnalyst, &["hr data analyst"]),
    (
        RoleLabel::DataAnalyst,
        &[
            "data analyst",
            "phân tích dữ liệu",
            "bi analyst",
            "business intelligence analyst",
            "insight analyst",
            "data analytics",
            "quantitative researcher",
        ],
    ),
    (
        RoleLabel::BusinessAnalyst,
        &[
            "business analyst",
            "phân tích kinh doanh",
            "phân tích nghiệp vụ",
            "it ba",
            "technical business analyst",
            "system analyst",
            "phân tích hệ thống",
            "process analyst",
        ],
    ),
    (RoleLabel::ProductOwner, &["product owner"]),
    (RoleLabel::ProductManager, &["product manager"]),
];

/// Classify a job title into a role category.
///
/// Matching is a case-insensitive substring test. "HR Data Analyst" is
/// checked before the broader data-analyst keywords so it is never shadowed.
/// Titles matching nothing are `Other`.
pub fn classify_role(title: &str) -> RoleLabel {
    let title_lower = title.to_lowercase();
    ROLE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| title_lower.contains(kw)))
        .map(|(role, _)| *role)
        .unwrap_or(RoleLabel::Other)
}

/// Bucket a minimum-experience value.
///
/// 0 is its own bucket, 1-2 and 3-5 are closed ranges, anything above 5 is
/// the top bucket. Absent and negative values are `Unknown`.
pub fn group_experience(years: Option<i64>) -> ExperienceGroup {
    match years {
        Some(0) => ExperienceGroup::EntryLevel,
        Some(1..=2) => ExperienceGroup::OneToTwo,
        Some(3..=5) => ExperienceGroup::ThreeToFive,
        Some(y) if y > 5 => ExperienceGroup::MoreThanFive,
        _ => ExperienceGroup::Unknown,
    }
}
