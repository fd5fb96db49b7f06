//! Attack-surface estimator
//!
//! Exposure grows logarithmically with both the number of affected hosts and
//! the connection volume those hosts receive. Raw values are rescaled so the
//! most exposed vulnerability of the snapshot scores 10.

use raengine_core::{round3, Result, Snapshot, Vulnerability};
use std::collections::BTreeMap;
use tracing::debug;

/// Scale applied to the log terms
const LOG_SCALE: f64 = 2.2;

/// Value used when the log terms are undefined
pub const DOMAIN_FALLBACK: f64 = 10.0;

/// Upper bound of the normalized scale
const NORMALIZED_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct AttackSurfaceEstimator;

impl AttackSurfaceEstimator {
    pub fn new() -> Self {
        Self
    }

    /// `2.2 * (ln(total_connections + 1) + ln(affected))`, or the fallback
    /// when `affected` is zero
    pub fn raw(&self, affected: usize, total_connections: u64) -> f64 {
        if affected == 0 {
            return DOMAIN_FALLBACK;
        }
        let value = LOG_SCALE * ((total_connections as f64 + 1.0).ln() + (affected as f64).ln());
        if value.is_finite() {
            value
        } else {
            DOMAIN_FALLBACK
        }
    }

    /// Raw surface of one vulnerability, summing connections over every
    /// affected host
    pub fn estimate(&self, snapshot: &Snapshot, vuln: &Vulnerability) -> Result<f64> {
        let total: u64 = snapshot
            .affected_hosts(vuln)?
            .map(|host| host.total_connections())
            .sum();

        let raw = self.raw(vuln.affected(), total);
        debug!(
            vuln_id = %vuln.id,
            affected = vuln.affected(),
            connections = total,
            raw,
            "Estimated attack surface"
        );
        Ok(raw)
    }

    /// Rescale raw values to 0-10 against the largest one, rounded to three
    /// decimals.
    ///
    /// When the largest value is not positive every entry is at the maximum
    /// and maps to 10.
    pub fn normalize(&self, raw: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        let max = raw.values().copied().fold(f64::NEG_INFINITY, f64::max);

        raw.iter()
            .map(|(id, value)| {
                let scaled = if max > 0.0 {
                    round3(value / max * NORMALIZED_MAX)
                } else {
                    NORMALIZED_MAX
                };
                (id.clone(), scaled)
            })
            .collect()
    }
}
