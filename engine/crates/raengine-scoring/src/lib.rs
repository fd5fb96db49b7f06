//! RAEngine Scoring - Risk, impact and classification of scanner findings
//!
//! This crate turns an ingested snapshot into scored vulnerabilities:
//! - Classifies descriptions against the attack-type taxonomy
//! - Calculates Risk from CVSS and aggregated type severity
//! - Calculates host Protection/Availability and vulnerability Impact
//! - Classifies the final score into critical/high/medium/low bands
//! - Writes the analysis and host impact CSV reports

pub mod classify;
pub mod engine;
pub mod host_impact;
pub mod impact;
pub mod keyword;
pub mod report;
pub mod risk;
pub mod severity;
pub mod surface;

pub use classify::{FinalClassifier, Verdict};
pub use engine::{RunSummary, ScoringEngine};
pub use host_impact::{ConnBounds, HostImpact, HostImpactScorer};
pub use impact::{ImpactAggregator, ImpactScore};
pub use keyword::{KeywordClassifier, TypeMatches};
pub use report::{
    write_analysis_csv, write_analysis_file, write_host_impact_csv, write_host_impact_file,
};
pub use risk::{RiskAssessment, RiskBreakdown, RiskScorer};
pub use severity::{SeverityAggregator, SeverityScore, NO_TYPE_FOUND};
pub use surface::AttackSurfaceEstimator;
