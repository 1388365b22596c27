//! Device telemetry: typed rows, table loading, and result tables.
//!
//! Everything that touches bytes on disk lives here; the analysis layer
//! only sees typed [`types::DeviceRecord`]s and hands back typed result
//! rows for [`tables`] to persist.

pub mod loader;
pub mod tables;
pub mod types;
