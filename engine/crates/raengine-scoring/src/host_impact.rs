//! Host impact scorer - Protection and Availability per host
//!
//! Protection combines the trust tier of the host's subnet with the most
//! sensitive service it exposes. Availability combines the most critical
//! service with how busy the host is relative to its subnet.

use raengine_common::config::ImpactWeights;
use raengine_core::{Host, RangeData, ServiceScores, Snapshot, SubnetIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Subnet tier assumed for hosts outside every known range
const UNMATCHED_TIER: u8 = 5;

/// Role score for hosts that expose ports but none listed in the service table
const UNLISTED_ROLE: f64 = 3.0;

/// Role and service score for hosts with no observed connections
const CLIENT_SCORE: f64 = 5.0;

/// Density assigned when a host is busier than every subnet peer bound allows
const DENSITY_CEILING: f64 = 10.0;

const DENSITY_SCALE: f64 = 2.2;

/// Connection totals across one subnet category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnBounds {
    pub max: u64,
    pub min: u64,
}

impl ConnBounds {
    /// Starting bounds before any host is observed
    const EMPTY: ConnBounds = ConnBounds {
        max: 0,
        min: 1_000_000,
    };

    fn observe(&mut self, total: u64) {
        self.max = self.max.max(total);
        self.min = self.min.min(total);
    }
}

/// Protection and availability of one host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostImpact {
    pub protection: f64,
    pub availability: f64,
}

/// Computes P/A scores from subnet trust, service role and connection density
pub struct HostImpactScorer {
    identity_weight: f64,
    role_weight: f64,
    service_weight: f64,
    density_weight: f64,
    services: ServiceScores,
}

impl HostImpactScorer {
    pub fn new(weights: &ImpactWeights, services: ServiceScores) -> Self {
        Self {
            identity_weight: weights.protection.identity,
            role_weight: weights.protection.role,
            service_weight: weights.availability.service,
            density_weight: weights.availability.network_density,
            services,
        }
    }

    /// Max/min connection totals over every host in a subnet category
    pub fn conn_bounds(
        &self,
        category: &str,
        index: &SubnetIndex,
        hosts: &BTreeMap<String, Host>,
    ) -> ConnBounds {
        let mut bounds = ConnBounds::EMPTY;
        for ip in index.hosts_in(category) {
            if let Some(host) = hosts.get(ip) {
                bounds.observe(host.total_connections());
            }
        }
        bounds
    }

    /// Score every host of the snapshot in place
    pub fn score_all(&self, snapshot: &mut Snapshot, ranges: &RangeData) -> usize {
        info!("Calculating host protection and availability");

        let index = snapshot.subnet_index();
        let bounds: BTreeMap<String, ConnBounds> = index
            .categories
            .keys()
            .map(|category| {
                (
                    category.clone(),
                    self.conn_bounds(category, &index, &snapshot.hosts),
                )
            })
            .collect();

        let mut scored = 0;
        for host in snapshot.hosts.values_mut() {
            let host_bounds = bounds
                .get(&host.subnet)
                .copied()
                .unwrap_or(ConnBounds::EMPTY);
            let impact = self.score(host, ranges, host_bounds);
            host.protection = impact.protection;
            host.availability = impact.availability;
            scored += 1;
        }

        info!("Scored {} hosts", scored);
        scored
    }

    /// Score one host given the connection bounds of its subnet
    pub fn score(&self, host: &Host, ranges: &RangeData, bounds: ConnBounds) -> HostImpact {
        let tier = self.subnet_tier(host, ranges);
        let protection =
            f64::from(tier) * self.identity_weight + self.role_score(host) * self.role_weight;

        let availability = self.service_availability(host) * self.service_weight
            + self.density(host, bounds) * self.density_weight;

        debug!(
            ip = %host.ip,
            subnet = %host.subnet,
            tier,
            protection,
            availability,
            "Scored host"
        );

        HostImpact {
            protection,
            availability,
        }
    }

    fn subnet_tier(&self, host: &Host, ranges: &RangeData) -> u8 {
        if !host.is_matched() {
            return UNMATCHED_TIER;
        }
        match ranges.lookup(&host.subnet, &host.cidr) {
            Some(range) => range.protection,
            None => {
                warn!(
                    ip = %host.ip,
                    subnet = %host.subnet,
                    cidr = %host.cidr,
                    "Subnet missing from range data, assuming tier {}",
                    UNMATCHED_TIER
                );
                UNMATCHED_TIER
            }
        }
    }

    fn role_score(&self, host: &Host) -> f64 {
        if !host.has_connections() {
            return CLIENT_SCORE;
        }
        self.services
            .matching(&host.connections)
            .map(|s| s.protection)
            .reduce(f64::max)
            .unwrap_or(UNLISTED_ROLE)
    }

    fn service_availability(&self, host: &Host) -> f64 {
        if !host.has_connections() {
            return CLIENT_SCORE;
        }
        self.services
            .matching(&host.connections)
            .map(|s| s.availability)
            .fold(0.0, f64::max)
    }

    fn density(&self, host: &Host, bounds: ConnBounds) -> f64 {
        let total = host.total_connections().max(1);
        let density = DENSITY_SCALE * (total as f64).ln() + bounds.min as f64;
        if density > bounds.max as f64 {
            DENSITY_CEILING
        } else {
            density
        }
    }
}
