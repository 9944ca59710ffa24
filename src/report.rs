use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::types::SnapRecord;

pub const CSV_HEADER: &str = "Domain,Final_URL,Screenshot_Path,Screenshot_Status";

/// Writes the domain-to-screenshot mapping, one row per record, in the
/// order the records were collected.
pub fn write_csv(path: &Path, records: &[SnapRecord]) -> Result<()> {
    let mut out = String::with_capacity(CSV_HEADER.len() + records.len() * 64);
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");
    for record in records {
        out.push_str(&csv_row(record));
        out.push_str("\r\n");
    }

    fs::write(path, out).context(format!("could not write csv mapping to {:?}", path))
}

fn csv_row(record: &SnapRecord) -> String {
    [
        record.domain.as_str(),
        record.final_url.as_str(),
        record.screenshot_path.as_str(),
        record.status.as_str(),
    ]
    .iter()
    .map(|field| escape_field(field))
    .collect::<Vec<String>>()
    .join(",")
}

fn escape_field(field: &str) -> String {
    if field
        .chars()
        .any(|c| matches!(c, ',' | '"' | '\n' | '\r'))
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
