//! Subnet assignment by CIDR containment

use ipnetwork::IpNetwork;
use raengine_core::{RangeData, Snapshot};
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// Outcome of a subnet assignment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubnetStats {
    pub matched: usize,
    pub unmatched: usize,
    /// Range entries whose CIDR could not be parsed
    pub invalid_ranges: usize,
}

/// Assign every host of the snapshot to the first range containing it.
///
/// Categories are tried in reverse name order and ranges within a category
/// in CIDR order. Hosts outside every range are reset to "No Match".
pub fn assign_subnets(snapshot: &mut Snapshot, ranges: &RangeData) -> SubnetStats {
    let mut stats = SubnetStats::default();
    let networks = parse_networks(ranges, &mut stats);

    for host in snapshot.hosts.values_mut() {
        let addr: Option<IpAddr> = host.ip.parse().ok();
        if addr.is_none() {
            warn!(ip = %host.ip, "Host address is not an IP, leaving unmatched");
        }

        let found = addr.and_then(|addr| {
            networks
                .iter()
                .find(|(_, _, net)| net.contains(addr))
                .map(|(category, cidr, _)| (*category, *cidr))
        });

        match found {
            Some((category, cidr)) => {
                debug!(ip = %host.ip, category, cidr, "Assigned subnet");
                host.assign_subnet(category, cidr);
                stats.matched += 1;
            }
            None => {
                host.clear_subnet();
                stats.unmatched += 1;
            }
        }
    }

    info!(
        "Subnet assignment: {} matched, {} unmatched",
        stats.matched, stats.unmatched
    );
    stats
}

fn parse_networks<'a>(
    ranges: &'a RangeData,
    stats: &mut SubnetStats,
) -> Vec<(&'a str, &'a str, IpNetwork)> {
    let mut networks = Vec::new();
    for (category, entry) in ranges.categories.iter().rev() {
        for cidr in entry.subnets.keys() {
            match cidr.parse::<IpNetwork>() {
                Ok(net) => networks.push((category.as_str(), cidr.as_str(), net)),
                Err(e) => {
                    warn!(category = %category, cidr = %cidr, "Skipping invalid range: {}", e);
                    stats.invalid_ranges += 1;
                }
            }
        }
    }
    networks
}
