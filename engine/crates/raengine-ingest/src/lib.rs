//! RAEngine Ingest - Offline data ingestion
//!
//! This crate builds and maintains the snapshot the scoring engine works on:
//! - Qualys scan report CSV exports
//! - VLAN range exports (CSV) or range data (JSON)
//! - Subnet assignment of hosts by CIDR containment
//! - Per-port connection counts summed over a trailing window
//! - JSON persistence of vulnerability, host and subnet data
//!
//! # Example
//!
//! ```no_run
//! use raengine_ingest::{formats, subnet, ConnectionWindow, SnapshotStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let import = formats::parse_report_file("report.csv", 5)?;
//!     let ranges = raengine_ingest::load_ranges("vlans.csv")?;
//!
//!     let mut snapshot = import.snapshot;
//!     let latest = chrono::Local::now().naive_local();
//!     let window = ConnectionWindow::load("data/connections", latest, 90, "%Y-%m-%d_%H-%M-%S")?;
//!     window.apply(&mut snapshot);
//!     subnet::assign_subnets(&mut snapshot, &ranges);
//!
//!     SnapshotStore::new("data/").save(&snapshot)?;
//!     Ok(())
//! }
//! ```

pub mod connections;
pub mod formats;
pub mod ranges;
pub mod store;
pub mod subnet;

pub use connections::ConnectionWindow;
pub use formats::{parse_report, parse_report_file, ReportImport};
pub use ranges::load_ranges;
pub use store::SnapshotStore;
pub use subnet::{assign_subnets, SubnetStats};

use serde::{Deserialize, Serialize};

/// Import statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Total records processed
    pub records_processed: u32,
    /// Records successfully imported
    pub records_imported: u32,
    /// Records skipped (short rows, missing identifiers)
    pub records_skipped: u32,
    /// Repeated detections of the same vulnerability on the same host
    pub records_duplicate: u32,
    /// Records the CSV reader could not decode
    pub records_errored: u32,
    /// Unique hosts
    pub unique_hosts: u32,
    /// Unique vulnerabilities
    pub unique_vulns: u32,
    /// Import duration in milliseconds
    pub duration_ms: u64,
}
