//! Severity aggregator - folds weighted type matches into one score
//!
//! Matches are ranked by base score. The best match sets the integer part and
//! each following match adds one more decimal place, so every match stays
//! visible without outweighing the ones above it.

use crate::keyword::TypeMatches;
use raengine_core::round3;

/// Label used when no attack type matched
pub const NO_TYPE_FOUND: &str = "No type found";

/// Severity score assigned when no attack type matched
pub const UNMATCHED_SEVERITY: f64 = 10.0;

/// Aggregated severity of a vulnerability
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityScore {
    /// Rounded to three decimals
    pub score: f64,
    /// Matched type names joined with ", ", or [`NO_TYPE_FOUND`]
    pub label: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeverityAggregator;

impl SeverityAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, matches: &TypeMatches) -> SeverityScore {
        if matches.is_empty() {
            return SeverityScore {
                score: UNMATCHED_SEVERITY,
                label: NO_TYPE_FOUND.to_string(),
            };
        }

        let mut ranked: Vec<f64> = matches.scores().collect();
        ranked.sort_by(|a, b| b.total_cmp(a));

        let mut score = 0.0;
        let mut divider = 1.0;
        for base in ranked {
            score += Self::tier(base) / divider;
            divider *= 10.0;
        }

        SeverityScore {
            score: round3(score),
            label: matches.names().collect::<Vec<_>>().join(", "),
        }
    }

    /// Digit contributed by one match: `floor(base * 0.9)`, or 0.5 when that
    /// floors to zero so weak matches still register
    fn tier(base: f64) -> f64 {
        let tier = (base * 9.0 / 10.0).floor();
        if tier == 0.0 {
            0.5
        } else {
            tier
        }
    }
}
