//! CSV serialization of export rows.
//!
//! Output is UTF-8 with a leading byte-order mark so spreadsheet tools detect
//! the encoding, `,` separated, `\n` terminated, with RFC 4180 quoting: a value
//! containing a comma, double quote, or line break is wrapped in quotes and
//! its quotes are doubled.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use sha2::Digest;

use listview_model::Record;

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One exported column: the record field to read and its header label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportColumn {
    pub key: String,
    pub label: String,
}

impl ExportColumn {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// A finished export ready to hand to the file saver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub row_count: usize,
    /// Lowercase hex SHA-256 of `bytes`.
    pub sha256: String,
}

impl ExportFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, row_count: usize) -> Self {
        let sha256 = sha256_hex(&bytes);
        Self {
            file_name: file_name.into(),
            bytes,
            row_count,
            sha256,
        }
    }
}

/// `<module>_export_<YYYY-MM-DD>.csv`
pub fn export_file_name(module_name: &str, date: NaiveDate) -> String {
    format!("{module_name}_export_{}.csv", date.format("%Y-%m-%d"))
}

/// Encode `rows` under `columns`. Missing and null fields become empty cells.
pub fn write_csv<R: Record>(rows: &[R], columns: &[ExportColumn]) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::with_capacity(UTF8_BOM.len() + rows.len() * columns.len() * 8);
    buffer.extend_from_slice(UTF8_BOM);
    {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .from_writer(&mut buffer);
        writer.write_record(columns.iter().map(|column| column.label.as_str()))?;
        for row in rows {
            writer.write_record(columns.iter().map(|column| {
                row.field(&column.key)
                    .map(|value| value.display_text())
                    .unwrap_or_default()
            }))?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listview_model::{DynRecord, FieldValue};

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name("leads", date), "leads_export_2024-03-09.csv");
    }

    #[test]
    fn output_starts_with_bom() {
        let bytes = write_csv::<DynRecord>(&[], &[ExportColumn::new("id", "ID")]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert_eq!(&bytes[UTF8_BOM.len()..], b"ID\n");
    }

    #[test]
    fn quotes_only_when_needed() {
        let rows = vec![
            DynRecord::new(1)
                .with("name", "Acme, Inc.")
                .with("note", "say \"hi\"")
                .with("city", FieldValue::Null),
        ];
        let columns = vec![
            ExportColumn::new("id", "ID"),
            ExportColumn::new("name", "Name"),
            ExportColumn::new("note", "Note"),
            ExportColumn::new("city", "City"),
        ];
        let bytes = write_csv(&rows, &columns).unwrap();
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(
            text,
            "ID,Name,Note,City\n1,\"Acme, Inc.\",\"say \"\"hi\"\"\",\n"
        );
    }

    #[test]
    fn digest_matches_content() {
        let file = ExportFile::new("x.csv", b"abc".to_vec(), 0);
        assert_eq!(
            file.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
