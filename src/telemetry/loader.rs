//! Device-table loading and validation.
//!
//! Reads an exported telemetry table (plain, `.gz` or `.zst`) into typed
//! [`DeviceRecord`]s. The header is validated up front so a misnamed column
//! fails the run before any row parsing; extra columns are ignored.

use crate::error::AnalysisError;
use crate::telemetry::types::{DeviceRecord, REQUIRED_COLUMNS};
use crate::utils::reader::open_table;
use std::path::Path;

/// Loads every observation from a device table.
///
/// Fails fast: an unreadable file, a missing required column, or a
/// malformed row aborts the load with the offending path (and line)
/// attached.
pub fn load_device_table(path: impl AsRef<Path>) -> Result<Vec<DeviceRecord>, AnalysisError> {
    let path = path.as_ref();

    let reader = open_table(path).map_err(|source| AnalysisError::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| AnalysisError::InvalidRecord {
            path: path.to_path_buf(),
            line: 1,
            source,
        })?
        .clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(AnalysisError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize().enumerate() {
        // Line 1 is the header, so data row i sits on line i + 2
        let record: DeviceRecord = row.map_err(|source| AnalysisError::InvalidRecord {
            path: path.to_path_buf(),
            line: index as u64 + 2,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_table(contents: &str) -> NamedTempFile {
        let mut temp = NamedTempFile::with_suffix(".csv").unwrap();
        temp.write_all(contents.as_bytes()).unwrap();
        temp.flush().unwrap();
        temp
    }

    #[test]
    fn test_load_valid_table() {
        let temp = write_table(
            "imei,ip,subnet,screen_time,trade_freq,trade_amount,app_switches\n\
             860000000000001,192.168.1.10,192.168.1,22.5,150,45.2,480\n\
             860000000000002,192.168.1.11,192.168.1,3.1,8,12845.5,40\n",
        );

        let records = load_device_table(temp.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].imei, "860000000000001");
        assert_eq!(records[1].trade_amount, 12845.5);
    }

    #[test]
    fn test_load_tolerates_ground_truth_column() {
        let temp = write_table(
            "imei,ip,subnet,screen_time,trade_freq,trade_amount,app_switches,role\n\
             860000000000001,192.168.1.10,192.168.1,22.5,150,45.2,480,drone\n",
        );

        let records = load_device_table(temp.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].trade_freq, 150.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_device_table("/nonexistent/devices.csv").unwrap_err();
        assert!(matches!(err, AnalysisError::MissingInput { .. }));
    }

    #[test]
    fn test_load_missing_column() {
        // No subnet column
        let temp = write_table(
            "imei,ip,screen_time,trade_freq,trade_amount,app_switches\n\
             860000000000001,192.168.1.10,22.5,150,45.2,480\n",
        );

        let err = load_device_table(temp.path()).unwrap_err();
        match err {
            AnalysisError::MissingColumn { column, .. } => assert_eq!(column, "subnet"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_load_empty_table_reports_missing_column() {
        let temp = write_table("");
        let err = load_device_table(temp.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { .. }));
    }

    #[test]
    fn test_load_malformed_row_names_line() {
        let temp = write_table(
            "imei,ip,subnet,screen_time,trade_freq,trade_amount,app_switches\n\
             860000000000001,192.168.1.10,192.168.1,22.5,150,45.2,480\n\
             860000000000002,192.168.1.11,192.168.1,not-a-number,8,12845.5,40\n",
        );

        let err = load_device_table(temp.path()).unwrap_err();
        match err {
            AnalysisError::InvalidRecord { line, .. } => assert_eq!(line, 3),
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_load_gzip_table() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut temp = NamedTempFile::with_suffix(".csv.gz").unwrap();
        {
            let mut encoder = GzEncoder::new(&mut temp, Compression::default());
            encoder
                .write_all(
                    b"imei,ip,subnet,screen_time,trade_freq,trade_amount,app_switches\n\
                      860000000000009,10.0.0.4,10.0.0,5.0,12,9000.0,55\n",
                )
                .unwrap();
            encoder.finish().unwrap();
        }
        temp.flush().unwrap();

        let records = load_device_table(temp.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ip, "10.0.0.4");
    }
}
