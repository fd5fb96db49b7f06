//! Host records keyed by IP address

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Subnet category assigned to hosts outside every known range
pub const NO_MATCH: &str = "No Match";

/// CIDR recorded for hosts outside every known range
pub const NO_MATCH_CIDR: &str = "0.0.0.0";

/// A scanned host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    #[serde(skip)]
    pub ip: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub netbios: String,
    #[serde(default)]
    pub os: String,
    /// Destination port to connection count over the trailing window
    #[serde(default)]
    pub connections: BTreeMap<u16, u64>,
    #[serde(default)]
    pub vulns: BTreeSet<String>,
    /// Subnet category name, or [`NO_MATCH`]
    #[serde(default = "default_subnet")]
    pub subnet: String,
    #[serde(default = "default_cidr")]
    pub cidr: String,
    #[serde(default)]
    pub protection: f64,
    #[serde(default)]
    pub availability: f64,
}

fn default_subnet() -> String {
    NO_MATCH.to_string()
}

fn default_cidr() -> String {
    NO_MATCH_CIDR.to_string()
}

impl Host {
    /// Create an unclassified host with no observed connections
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            hostname: String::new(),
            netbios: String::new(),
            os: String::new(),
            connections: BTreeMap::new(),
            vulns: BTreeSet::new(),
            subnet: default_subnet(),
            cidr: default_cidr(),
            protection: 0.0,
            availability: 0.0,
        }
    }

    /// Sum of connection counts across all observed ports
    pub fn total_connections(&self) -> u64 {
        self.connections.values().sum()
    }

    /// Whether any connection was observed
    pub fn has_connections(&self) -> bool {
        !self.connections.is_empty()
    }

    /// Whether the host sits inside a known range
    pub fn is_matched(&self) -> bool {
        self.subnet != NO_MATCH
    }

    /// Record a subnet classification
    pub fn assign_subnet(&mut self, category: impl Into<String>, cidr: impl Into<String>) {
        self.subnet = category.into();
        self.cidr = cidr.into();
    }

    /// Reset to the unmatched sentinel
    pub fn clear_subnet(&mut self) {
        self.subnet = default_subnet();
        self.cidr = default_cidr();
    }
}
