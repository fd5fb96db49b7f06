//! Classification bands and scanner severity tiers

use serde::{Deserialize, Serialize};

/// Final classification band for a scored vulnerability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Below every configured band
    #[default]
    Low,
    /// Inside the medium range
    Medium,
    /// Inside the high range, or the gap below critical without a critical type
    High,
    /// Inside the critical range, or upgraded from the gap by a critical type
    Critical,
}

impl Classification {
    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Low => "low",
            Classification::Medium => "medium",
            Classification::High => "high",
            Classification::Critical => "critical",
        }
    }

    /// All bands, highest first
    pub fn all() -> [Classification; 4] {
        [
            Classification::Critical,
            Classification::High,
            Classification::Medium,
            Classification::Low,
        ]
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scanner-reported severity tier (1-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityTier(pub u8);

impl SeverityTier {
    /// Parse a tier from report text, tolerating surrounding whitespace
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u8>().ok().map(SeverityTier)
    }

    /// CVSS substitute used when the scanner reports no numeric score.
    ///
    /// Unknown tiers map to 10 so that missing data never lowers risk.
    pub fn fallback_cvss(&self) -> f64 {
        match self.0 {
            5 => 10.0,
            4 => 8.0,
            3 => 5.0,
            _ => 10.0,
        }
    }
}

impl Default for SeverityTier {
    fn default() -> Self {
        SeverityTier(1)
    }
}
