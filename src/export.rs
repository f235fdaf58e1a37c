//! Export order item records to CSV.

use crate::error::{ExtractError, Result};
use crate::types::OrderItemRecord;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Column titles, in output order
pub const HEADER: [&str; 8] = [
    "Date & Time Received",
    "Name",
    "Item ID",
    "Quantity",
    "Tracking ID",
    "Ship To",
    "Mail ID",
    "To Email",
];

/// Columns dropped when message identifiers are turned off
const MESSAGE_ID_COLUMNS: usize = 2;

/// CSV layout options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// `strftime` format for the received column
    pub date_format: String,
    /// Write the `Mail ID` and `To Email` columns
    pub include_message_ids: bool,
    /// Prefix the file with a UTF-8 BOM for Excel
    pub bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            date_format: "%Y/%m/%d".to_string(),
            include_message_ids: true,
            bom: false,
        }
    }
}

/// Write a header row and one row per record.
pub fn write_csv<W: Write>(
    out: &mut W,
    records: &[OrderItemRecord],
    options: &CsvOptions,
) -> std::io::Result<()> {
    if options.bom {
        out.write_all(&[0xEF, 0xBB, 0xBF])?;
    }

    let columns = if options.include_message_ids {
        HEADER.len()
    } else {
        HEADER.len() - MESSAGE_ID_COLUMNS
    };

    write_row(out, &HEADER[..columns])?;

    for record in records {
        let received = record.received_display(&options.date_format);
        let row: [&str; 8] = [
            received.as_str(),
            &record.item_name,
            &record.item_id,
            &record.item_quantity,
            &record.tracking_id,
            &record.ship_to,
            record.message_id.as_str(),
            &record.recipient,
        ];
        write_row(out, &row[..columns])?;
    }

    Ok(())
}

/// Create (or truncate) `path` and write the records to it.
pub fn export_csv(path: &Path, records: &[OrderItemRecord], options: &CsvOptions) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| ExtractError::io(path, e))?;
    let mut out = BufWriter::new(file);
    write_csv(&mut out, records, options)
        .and_then(|()| out.flush())
        .map_err(|e| ExtractError::io(path, e))?;
    info!(path = %path.display(), records = records.len(), "Wrote CSV");
    Ok(())
}

fn write_row<W: Write>(out: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{line}")
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_escape_simple() {
        assert_eq!(csv_escape("hello"), "hello");
    }

    #[test]
    fn test_csv_escape_comma() {
        assert_eq!(csv_escape("Springfield, IL"), "\"Springfield, IL\"");
    }

    #[test]
    fn test_csv_escape_quotes() {
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_escape_newline() {
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }
}
