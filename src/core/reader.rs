// JobPulse - core/reader.rs
//
// CSV decoding into a loosely typed RawTable.
// Core layer: accepts any Read, never touches the filesystem directly.

use crate::core::model::RawTable;
use crate::util::error::DecodeError;
use std::io::Read;

/// Decode CSV text with a header row into a `RawTable`.
///
/// Blank lines are skipped. Rows with fewer fields than the header are padded
/// with missing cells; rows with more fields are a structural error, as is
/// input with no header at all or bytes that are not valid UTF-8.
pub fn read_raw_table<R: Read>(reader: R) -> Result<RawTable, DecodeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(DecodeError::NoColumns);
    }

    let mut table = RawTable::new(headers);
    let expected = table.headers().len();

    for result in csv_reader.records() {
        let record = result?;
        if record.len() > expected {
            return Err(DecodeError::TooManyFields {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected,
                found: record.len(),
            });
        }
        table.push_row(record.iter().map(str::to_string).collect());
    }

    tracing::debug!(
        columns = expected,
        rows = table.len(),
        "CSV decoded into raw table"
    );

    Ok(table)
}
