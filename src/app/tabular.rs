//! Header-keyed CSV row reading
//!
//! Data files are scanned row by row with each row exposed as a mapping
//! keyed by the header names from the first line. The pipeline only reads
//! the `period` column, but the reader stays generic about which columns
//! exist.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::errors::TabularResult;

/// One data row keyed by column header
pub type Row = BTreeMap<String, String>;

/// Streaming reader over the rows of a CSV file
pub struct RowReader {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<File>,
}

impl RowReader {
    /// Opens a CSV file and reads its header row
    pub fn open(path: &Path) -> TabularResult<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }

    /// Column headers from the first line
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for RowReader {
    type Item = TabularResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        let row = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = record.get(i).unwrap_or("").trim().to_string();
                (header.clone(), value)
            })
            .collect();
        Some(Ok(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_rows_are_keyed_by_header() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "forecast.csv",
            "isocode,period,forecast\nAFG,201001,0.42\nAFG,201002,0.43\n",
        );

        let reader = RowReader::open(&path).unwrap();
        assert_eq!(reader.headers(), ["isocode", "period", "forecast"]);

        let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["period"], "201001");
        assert_eq!(rows[1]["forecast"], "0.43");
    }

    #[test]
    fn test_short_rows_pad_with_empty_values() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "short.csv", "isocode,period\nAFG\n");

        let rows: Vec<Row> = RowReader::open(&path)
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows[0]["isocode"], "AFG");
        assert_eq!(rows[0]["period"], "");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(RowReader::open(&dir.path().join("absent.csv")).is_err());
    }
}
