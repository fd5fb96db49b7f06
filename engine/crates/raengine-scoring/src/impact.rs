//! Impact aggregator - combines exposure with the hosts a vulnerability sits on

use raengine_common::config::ImpactWeights;
use raengine_core::{round3, Result, Snapshot, Vulnerability};

/// Averaged host scores and the weighted impact of one vulnerability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactScore {
    pub protection: f64,
    pub availability: f64,
    pub impact_score: f64,
}

pub struct ImpactAggregator {
    surface_weight: f64,
    protection_weight: f64,
    availability_weight: f64,
}

impl ImpactAggregator {
    pub fn new(weights: &ImpactWeights) -> Self {
        Self {
            surface_weight: weights.attack_surface.total,
            protection_weight: weights.protection.total,
            availability_weight: weights.availability.total,
        }
    }

    /// Mean protection/availability over the affected hosts, then the
    /// weighted blend with the normalized attack surface.
    ///
    /// Host scores must already be computed.
    pub fn aggregate(
        &self,
        snapshot: &Snapshot,
        vuln: &Vulnerability,
        attack_surface: f64,
    ) -> Result<ImpactScore> {
        let mut count = 0usize;
        let mut protection = 0.0;
        let mut availability = 0.0;
        for host in snapshot.affected_hosts(vuln)? {
            protection += host.protection;
            availability += host.availability;
            count += 1;
        }

        // validation guarantees at least one host
        let count = count.max(1) as f64;
        let protection = round3(protection / count);
        let availability = round3(availability / count);

        Ok(ImpactScore {
            protection,
            availability,
            impact_score: self.calculate(attack_surface, protection, availability),
        })
    }

    pub fn calculate(&self, attack_surface: f64, protection: f64, availability: f64) -> f64 {
        round3(
            self.surface_weight * attack_surface
                + self.protection_weight * protection
                + self.availability_weight * availability,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raengine_common::config::{AttackSurfaceWeights, AvailabilityWeights, ProtectionWeights};
    use raengine_core::Host;

    fn aggregator() -> ImpactAggregator {
        ImpactAggregator::new(&ImpactWeights {
            attack_surface: AttackSurfaceWeights { total: 0.4 },
            protection: ProtectionWeights {
                total: 0.3,
                identity: 0.5,
                role: 0.5,
            },
            availability: AvailabilityWeights {
                total: 0.3,
                service: 0.5,
                network_density: 0.5,
            },
        })
    }

    #[test]
    fn test_means_over_affected_hosts() {
        let mut snapshot = Snapshot::new();
        let vuln = Vulnerability::new("1", "t", 5.0);
        for (ip, p, a) in [("10.0.0.1", 4.0, 2.0), ("10.0.0.2", 5.0, 7.0)] {
            let mut host = Host::new(ip);
            host.protection = p;
            host.availability = a;
            snapshot.record_detection(vuln.clone(), host);
        }

        let score = aggregator()
            .aggregate(&snapshot, &snapshot.vulns["1"], 10.0)
            .unwrap();
        assert_eq!(score.protection, 4.5);
        assert_eq!(score.availability, 4.5);
        // 4.0 + 1.35 + 1.35
        assert_eq!(score.impact_score, 6.7);
    }

    #[test]
    fn test_means_are_rounded() {
        let mut snapshot = Snapshot::new();
        let vuln = Vulnerability::new("1", "t", 5.0);
        for (ip, p) in [("10.0.0.1", 1.0), ("10.0.0.2", 1.0), ("10.0.0.3", 2.0)] {
            let mut host = Host::new(ip);
            host.protection = p;
            snapshot.record_detection(vuln.clone(), host);
        }

        let score = aggregator()
            .aggregate(&snapshot, &snapshot.vulns["1"], 0.0)
            .unwrap();
        assert_eq!(score.protection, 1.333);
    }

    #[test]
    fn test_unknown_host_is_error() {
        let snapshot = Snapshot::new();
        let mut vuln = Vulnerability::new("1", "t", 5.0);
        vuln.hosts.insert("10.0.0.9".into());
        assert!(aggregator().aggregate(&snapshot, &vuln, 1.0).is_err());
    }
}
