//! RAEngine Core - Record types, severity bands and error handling
//!
//! This crate provides the data model shared by ingestion and scoring:
//! - `Vulnerability` / `Analysis`: scanner findings and their computed scores
//! - `Host`: scanned assets with connection counts and subnet classification
//! - `RangeData`, `ServiceScores`, `SubnetIndex`: network reference data
//! - `Snapshot`: the owned vulnerability and host mappings a run works on

pub mod error;
pub mod host;
pub mod network;
pub mod severity;
pub mod snapshot;
pub mod vuln;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use host::{Host, NO_MATCH, NO_MATCH_CIDR};
pub use network::{RangeCategory, RangeData, ServiceScore, ServiceScores, SubnetIndex, SubnetRange};
pub use severity::{Classification, SeverityTier};
pub use snapshot::Snapshot;
pub use vuln::{parse_cvss, Analysis, Vulnerability};

/// Round to three decimal places, the precision every reported score uses
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
