//! Final classifier - overall score, band and out-of-band flag

use raengine_common::config::OverallWeights;
use raengine_common::{BandRange, KeywordList, Thresholds};
use raengine_core::{round3, Classification, Vulnerability};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of classifying one vulnerability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub final_score: f64,
    pub class: Classification,
    pub outofband: bool,
    /// Critical-type keyword that lifted a near-critical score, if any
    pub upgraded_by: Option<String>,
}

pub struct FinalClassifier {
    risk_weight: f64,
    impact_weight: f64,
    critical: BandRange,
    high: BandRange,
    medium: BandRange,
    critical_types: KeywordList,
    outofband_types: KeywordList,
}

impl FinalClassifier {
    pub fn new(weights: OverallWeights, thresholds: Thresholds) -> Self {
        Self {
            risk_weight: weights.risk,
            impact_weight: weights.impact,
            critical: thresholds.critical,
            high: thresholds.high,
            medium: thresholds.medium,
            critical_types: thresholds.critical_types,
            outofband_types: thresholds.outofband_types,
        }
    }

    pub fn final_score(&self, risk_score: f64, impact_score: f64) -> f64 {
        round3(self.risk_weight * risk_score + self.impact_weight * impact_score)
    }

    /// Band for a final score.
    ///
    /// Scores between the top of the high band and the bottom of the
    /// critical band are high unless the type label names a critical type.
    pub fn band<'a>(&'a self, score: f64, types: &str) -> (Classification, Option<&'a str>) {
        if self.critical.contains(score) {
            return (Classification::Critical, None);
        }
        if (self.high.upper..=self.critical.lower).contains(&score) {
            return match self.critical_types.first_in(types) {
                Some(kw) => (Classification::Critical, Some(kw)),
                None => (Classification::High, None),
            };
        }
        if self.high.contains(score) {
            (Classification::High, None)
        } else if self.medium.contains(score) {
            (Classification::Medium, None)
        } else {
            (Classification::Low, None)
        }
    }

    /// Critical and exploitable vulnerabilities of an out-of-band type
    pub fn is_outofband(&self, class: Classification, types: &str, exploitable: bool) -> bool {
        class == Classification::Critical
            && exploitable
            && self.outofband_types.first_in(types).is_some()
    }

    /// Classify a vulnerability whose risk and impact scores are set
    pub fn assess(&self, vuln: &Vulnerability) -> Verdict {
        let analysis = &vuln.analysis;
        let final_score = self.final_score(analysis.risk_score, analysis.impact_score);
        let (class, upgraded_by) = self.band(final_score, &analysis.types);
        let outofband = self.is_outofband(class, &analysis.types, vuln.exploitable);

        if let Some(kw) = upgraded_by {
            debug!(vuln_id = %vuln.id, keyword = kw, final_score, "Upgraded to critical");
        }

        Verdict {
            final_score,
            class,
            outofband,
            upgraded_by: upgraded_by.map(str::to_string),
        }
    }
}
