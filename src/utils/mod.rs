//! Utility functions and helpers.
//!
//! This module provides common functionality used across multiple commands:
//!
//! - [`format`] - Count and amount formatting for report output
//! - [`progress`] - Progress tracking and display utilities
//! - [`reader`] - Device-table reader with automatic decompression
//!
//! # Examples
//!
//! ## Formatting report numbers
//!
//! ```
//! use farm_audit_tools::utils::format::format_number;
//!
//! assert_eq!(format_number(1_000_000), "1,000,000");
//! ```
//!
//! ## Reading compressed tables
//!
//! ```no_run
//! use farm_audit_tools::utils::reader::open_table;
//! use std::io::{BufRead, BufReader};
//!
//! // Automatically decompresses .gz and .zst tables
//! let reader = open_table("devices.csv.zst").unwrap();
//! let buf_reader = BufReader::new(reader);
//! ```

pub mod format;
pub mod progress;
pub mod reader;
