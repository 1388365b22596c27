//! Device-table opening with transparent decompression.
//!
//! Exported telemetry tables are often archived compressed. This module
//! detects `.gz` and `.zst` tables by extension and wraps them in streaming
//! decoders, so the loader reads every table through one code path.
//!
//! # Supported Formats
//!
//! - Plain CSV tables
//! - Gzip compressed tables (.csv.gz)
//! - Zstandard compressed tables (.csv.zst)
//!
//! # Examples
//!
//! ```no_run
//! use farm_audit_tools::utils::reader::open_table;
//! use std::io::{BufRead, BufReader};
//!
//! // Automatically handles .gz, .zst, or plain CSV
//! let reader = open_table("devices.csv.gz").unwrap();
//! for line in BufReader::new(reader).lines() {
//!     let line = line.unwrap();
//!     // Process row...
//! }
//! ```

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Opens a device table with automatic decompression based on extension.
///
/// Returns a plain `io::Result` so callers decide how an unreadable table
/// surfaces; the loader folds open failures into its missing-input error.
pub fn open_table(path: impl AsRef<Path>) -> io::Result<Box<dyn Read + Send>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Ok(Box::new(GzDecoder::new(file))),
        Some("zst") => Ok(Box::new(zstd::Decoder::new(file)?)),
        _ => Ok(Box::new(file)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_plain_table() {
        let mut temp = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(temp, "imei,ip,subnet").unwrap();
        writeln!(temp, "860000000000001,192.168.1.10,192.168.1").unwrap();
        temp.flush().unwrap();

        let reader = open_table(temp.path()).unwrap();
        let lines: Vec<String> = BufReader::new(reader)
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "imei,ip,subnet");
    }

    #[test]
    fn test_gzip_table() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut temp = NamedTempFile::with_suffix(".csv.gz").unwrap();
        {
            let mut encoder = GzEncoder::new(&mut temp, Compression::default());
            writeln!(encoder, "imei,ip,subnet").unwrap();
            writeln!(encoder, "860000000000001,192.168.1.10,192.168.1").unwrap();
            encoder.finish().unwrap();
        }
        temp.flush().unwrap();

        let reader = open_table(temp.path()).unwrap();
        let lines: Vec<String> = BufReader::new(reader)
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "860000000000001,192.168.1.10,192.168.1");
    }

    #[test]
    fn test_zstd_table() {
        let mut temp = NamedTempFile::with_suffix(".csv.zst").unwrap();
        {
            let mut encoder = zstd::Encoder::new(&mut temp, 3).unwrap();
            writeln!(encoder, "imei,ip,subnet").unwrap();
            writeln!(encoder, "860000000000001,10.0.0.4,10.0.0").unwrap();
            encoder.finish().unwrap();
        }
        temp.flush().unwrap();

        let reader = open_table(temp.path()).unwrap();
        let lines: Vec<String> = BufReader::new(reader)
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "860000000000001,10.0.0.4,10.0.0");
    }

    #[test]
    fn test_missing_table_is_io_error() {
        let err = open_table("/nonexistent/devices.csv").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
