// JobPulse - core/export.rs
//
// CSV and JSON export of a filtered view of the normalised table.
// Core layer: writes to any Write trait object.

use crate::core::model::{NormalizedRecord, NormalizedTable};
use crate::util::constants;
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Fixed leading columns of a CSV export.
const CSV_COLUMNS: &[&str] = &[
    "posted_datetime",
    "posted_year_month",
    "source_website",
    "job_title",
    "job_role_group",
    "location_primary",
    "salary_min_vnd",
    "salary_max_vnd",
    "salary_negotiable",
    "days_to_deadline",
    "experience_years_min_numeric",
    "experience_group",
    "views_count",
    "skills_or_tags",
    "benefits_text",
    "url",
    "process_timestamp",
];

/// One exported row: the record plus its derived labels.
#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(flatten)]
    record: &'a NormalizedRecord,
    job_role_group: Option<&'static str>,
    experience_group: Option<&'static str>,
}

fn check_size(count: usize) -> Result<(), ExportError> {
    if count > constants::MAX_EXPORT_ROWS {
        return Err(ExportError::TooManyRows {
            count,
            max: constants::MAX_EXPORT_ROWS,
        });
    }
    Ok(())
}

fn opt_int(v: Option<i64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

/// Export the rows at `indices` as CSV.
///
/// Absent values are written as empty cells. Tag sequences are written as a
/// JSON array. Passthrough columns follow the fixed columns.
pub fn export_csv<W: Write>(
    table: &NormalizedTable,
    indices: &[usize],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(indices.len())?;
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = CSV_COLUMNS.to_vec();
    header.extend(table.passthrough_columns().iter().map(String::as_str));
    csv_writer.write_record(&header).map_err(csv_err)?;

    let mut count = 0;
    for &idx in indices {
        let Some(r) = table.records().get(idx) else {
            continue;
        };
        let tags = serde_json::to_string(&r.skills_or_tags).map_err(|e| ExportError::Json {
            path: export_path.to_path_buf(),
            source: e,
        })?;

        let mut row: Vec<String> = vec![
            r.posted_datetime.map(|t| t.to_rfc3339()).unwrap_or_default(),
            r.posted_year_month.map(|ym| ym.to_string()).unwrap_or_default(),
            r.source.as_ref().map(|s| s.tag().to_string()).unwrap_or_default(),
            r.job_title.clone().unwrap_or_default(),
            table
                .role_group(idx)
                .map(|g| g.label().to_string())
                .unwrap_or_default(),
            r.location_primary.clone().unwrap_or_default(),
            opt_int(r.salary_min_vnd),
            opt_int(r.salary_max_vnd),
            r.salary_negotiable.map(|b| b.to_string()).unwrap_or_default(),
            opt_int(r.days_to_deadline),
            opt_int(r.experience_years_min_numeric),
            table
                .experience_group(idx)
                .map(|g| g.label().to_string())
                .unwrap_or_default(),
            opt_int(r.views_count),
            tags,
            r.benefits_text.clone().unwrap_or_default(),
            r.url.clone().unwrap_or_default(),
            r.process_timestamp.clone().unwrap_or_default(),
        ];
        for column in table.passthrough_columns() {
            row.push(r.passthrough.get(column).cloned().unwrap_or_default());
        }

        csv_writer.write_record(&row).map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export the rows at `indices` as a pretty-printed JSON array of objects.
pub fn export_json<W: Write>(
    table: &NormalizedTable,
    indices: &[usize],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(indices.len())?;
    let rows: Vec<ExportRow<'_>> = indices
        .iter()
        .filter_map(|&idx| {
            table.records().get(idx).map(|record| ExportRow {
                record,
                job_role_group: table.role_group(idx).map(|g| g.label()),
                experience_group: table.experience_group(idx).map(|g| g.label()),
            })
        })
        .collect();

    serde_json::to_writer_pretty(writer, &rows).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(rows.len())
}
