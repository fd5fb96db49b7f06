//! Risk scorer
//!
//! Risk blends two views of how bad a vulnerability is:
//! - the scanner's CVSS base score
//! - the severity of the attack types its description matches

use crate::keyword::KeywordClassifier;
use crate::severity::{SeverityAggregator, SeverityScore};
use raengine_common::config::RiskWeights;
use raengine_common::AttackTable;
use raengine_core::{round3, Vulnerability};
use serde::{Deserialize, Serialize};

/// Risk scorer
pub struct RiskScorer {
    /// Weight for CVSS score
    cvss_weight: f64,
    /// Weight for aggregated type severity
    sev_weight: f64,
    classifier: KeywordClassifier,
    aggregator: SeverityAggregator,
}

impl RiskScorer {
    /// Create a scorer from configured weights and attack taxonomy.
    ///
    /// Weights are used as given; they are meant to sum to 1.0 but this is
    /// not enforced.
    pub fn new(weights: RiskWeights, attack_table: AttackTable) -> Self {
        Self {
            cvss_weight: weights.cvss,
            sev_weight: weights.sev,
            classifier: KeywordClassifier::new(attack_table),
            aggregator: SeverityAggregator::new(),
        }
    }

    /// Weighted blend of CVSS and severity, rounded to three decimals
    pub fn calculate(&self, cvss: f64, severity: f64) -> f64 {
        round3(self.cvss_weight * cvss + self.sev_weight * severity)
    }

    /// Classify a vulnerability's description and compute its risk
    pub fn assess(&self, vuln: &Vulnerability) -> RiskAssessment {
        let matches = self.classifier.classify(&vuln.description());
        let SeverityScore { score, label } = self.aggregator.aggregate(&matches);

        RiskAssessment {
            types: label,
            sev_score: score,
            risk_score: self.calculate(vuln.cvss, score),
            breakdown: RiskBreakdown {
                cvss_contribution: self.cvss_weight * vuln.cvss,
                sev_contribution: self.sev_weight * score,
            },
        }
    }
}

/// Risk of one vulnerability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Matched type label
    pub types: String,
    pub sev_score: f64,
    pub risk_score: f64,
    pub breakdown: RiskBreakdown,
}

/// Score breakdown by contributing factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub cvss_contribution: f64,
    pub sev_contribution: f64,
}
