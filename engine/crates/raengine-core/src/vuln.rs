//! Vulnerability records and their computed analysis

use crate::severity::{Classification, SeverityTier};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// A scanner-reported vulnerability, shared by every host it affects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Scanner-assigned identifier (QID / plugin ID)
    #[serde(skip)]
    pub id: String,
    pub title: String,
    /// CVSS base score, reported or derived from the severity tier
    pub cvss: f64,
    #[serde(default)]
    pub severity: SeverityTier,
    /// `protocol/port` as reported
    #[serde(default)]
    pub port: String,
    #[serde(default, rename = "exploitability", deserialize_with = "de_exploitable")]
    pub exploitable: bool,
    #[serde(default)]
    pub first_seen: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub threat: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub solution: String,
    /// Affected host IPs
    #[serde(default)]
    pub hosts: BTreeSet<String>,
    #[serde(default)]
    pub analysis: Analysis,
}

impl Vulnerability {
    /// Create a vulnerability with empty text fields
    pub fn new(id: impl Into<String>, title: impl Into<String>, cvss: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            cvss,
            severity: SeverityTier::default(),
            port: String::new(),
            exploitable: false,
            first_seen: String::new(),
            category: String::new(),
            threat: String::new(),
            impact: String::new(),
            solution: String::new(),
            hosts: BTreeSet::new(),
            analysis: Analysis::default(),
        }
    }

    /// Threat and impact text, as matched by the keyword classifier and
    /// reported as the synopsis
    pub fn description(&self) -> String {
        format!("{}{}", self.threat, self.impact)
    }

    /// Number of affected hosts
    pub fn affected(&self) -> usize {
        self.hosts.len()
    }
}

/// Scores computed by the engine, overwritten on every run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    /// Matched attack types joined with ", ", or "No type found"
    pub types: String,
    pub sev_score: f64,
    pub risk_score: f64,
    /// Normalized to 0-10 across the snapshot
    pub attack_surface: f64,
    pub protection: f64,
    pub availability: f64,
    pub impact_score: f64,
    pub final_score: f64,
    pub class: Classification,
    pub outofband: bool,
}

/// Parse a reported CVSS cell, falling back to the severity tier when the
/// scanner left it blank.
///
/// Only the leading token is read, so `"7.5 (AV:N/AC:L/...)"` yields 7.5.
pub fn parse_cvss(vuln_id: &str, raw: &str, tier: SeverityTier) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(tier.fallback_cvss());
    }

    raw.split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|score| score.is_finite())
        .ok_or_else(|| Error::InvalidCvss {
            vuln_id: vuln_id.to_string(),
            value: raw.to_string(),
        })
}

/// Accepts booleans as well as the legacy "Yes"/"No" strings
fn de_exploitable<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s.trim().eq_ignore_ascii_case("yes") || s.trim() == "1",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cvss_with_vector() {
        let score = parse_cvss("1", "7.5 (AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H)", SeverityTier(3));
        assert_eq!(score.unwrap(), 7.5);
    }

    #[test]
    fn test_parse_cvss_fallback() {
        assert_eq!(parse_cvss("1", "", SeverityTier(4)).unwrap(), 8.0);
        assert_eq!(parse_cvss("1", "   ", SeverityTier(2)).unwrap(), 10.0);
    }

    #[test]
    fn test_parse_cvss_invalid() {
        let err = parse_cvss("42", "n/a", SeverityTier(5)).unwrap_err();
        assert!(matches!(err, Error::InvalidCvss { .. }));
    }

    #[test]
    fn test_legacy_exploitability() {
        let json = r#"{"title": "t", "cvss": 5.0, "exploitability": "Yes", "hosts": ["10.0.0.1"]}"#;
        let vuln: Vulnerability = serde_json::from_str(json).unwrap();
        assert!(vuln.exploitable);
        assert_eq!(vuln.affected(), 1);

        let json = r#"{"title": "t", "cvss": 5.0, "exploitability": false}"#;
        let vuln: Vulnerability = serde_json::from_str(json).unwrap();
        assert!(!vuln.exploitable);
    }

    #[test]
    fn test_description_concatenates() {
        let mut vuln = Vulnerability::new("1", "t", 5.0);
        vuln.threat = "Remote ".into();
        vuln.impact = "code execution".into();
        assert_eq!(vuln.description(), "Remote code execution");
    }
}
