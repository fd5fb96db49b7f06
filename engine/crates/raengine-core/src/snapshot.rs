//! In-memory vulnerability and host mappings

use crate::host::Host;
use crate::network::SubnetIndex;
use crate::vuln::Vulnerability;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// The full set of records a scoring run operates on.
///
/// Maps are ordered by identifier so reports and reruns are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub vulns: BTreeMap<String, Vulnerability>,
    pub hosts: BTreeMap<String, Host>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted mappings, restoring record identifiers from
    /// their map keys
    pub fn from_maps(
        mut vulns: BTreeMap<String, Vulnerability>,
        mut hosts: BTreeMap<String, Host>,
    ) -> Self {
        for (id, vuln) in vulns.iter_mut() {
            vuln.id = id.clone();
        }
        for (ip, host) in hosts.iter_mut() {
            host.ip = ip.clone();
        }
        Self { vulns, hosts }
    }

    /// Record that `vuln` was detected on `host`, inserting either record if
    /// it is new and linking both sides without duplicates
    pub fn record_detection(&mut self, vuln: Vulnerability, host: Host) {
        let vuln_id = vuln.id.clone();
        let ip = host.ip.clone();

        self.vulns
            .entry(vuln_id.clone())
            .or_insert(vuln)
            .hosts
            .insert(ip.clone());
        self.hosts.entry(ip).or_insert(host).vulns.insert(vuln_id);
    }

    /// Additively merge another snapshot into this one.
    ///
    /// New records are inserted; for records present in both, the host and
    /// vulnerability sets are unioned and the existing metadata kept.
    pub fn merge(&mut self, other: Snapshot) {
        for (id, vuln) in other.vulns {
            match self.vulns.get_mut(&id) {
                Some(existing) => existing.hosts.extend(vuln.hosts),
                None => {
                    self.vulns.insert(id, vuln);
                }
            }
        }

        for (ip, host) in other.hosts {
            match self.hosts.get_mut(&ip) {
                Some(existing) => {
                    existing.vulns.extend(host.vulns);
                    if existing.connections.is_empty() {
                        existing.connections = host.connections;
                    }
                }
                None => {
                    self.hosts.insert(ip, host);
                }
            }
        }
    }

    /// Check the invariants every scoring pass relies on
    pub fn validate(&self) -> Result<()> {
        for (id, vuln) in &self.vulns {
            if vuln.hosts.is_empty() {
                return Err(Error::UnaffectedVulnerability {
                    vuln_id: id.clone(),
                });
            }
            if let Some(ip) = vuln.hosts.iter().find(|ip| !self.hosts.contains_key(*ip)) {
                return Err(Error::UnknownHost {
                    vuln_id: id.clone(),
                    ip: ip.clone(),
                });
            }
        }
        Ok(())
    }

    /// Group host IPs by their subnet classification
    pub fn subnet_index(&self) -> SubnetIndex {
        SubnetIndex::from_hosts(self.hosts.values())
    }

    /// Hosts affected by a vulnerability
    pub fn affected_hosts<'a>(
        &'a self,
        vuln: &'a Vulnerability,
    ) -> Result<impl Iterator<Item = &'a Host> + 'a> {
        if let Some(ip) = vuln.hosts.iter().find(|ip| !self.hosts.contains_key(*ip)) {
            return Err(Error::UnknownHost {
                vuln_id: vuln.id.clone(),
                ip: ip.clone(),
            });
        }
        Ok(vuln.hosts.iter().filter_map(move |ip| self.hosts.get(ip)))
    }

    pub fn is_empty(&self) -> bool {
        self.vulns.is_empty() && self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(qid: &str, ip: &str) -> (Vulnerability, Host) {
        let mut vuln = Vulnerability::new(qid, format!("Vuln {}", qid), 5.0);
        vuln.threat = "threat".into();
        (vuln, Host::new(ip))
    }

    #[test]
    fn test_record_detection_deduplicates() {
        let mut snapshot = Snapshot::new();
        let (v, h) = detection("100", "10.0.0.1");
        snapshot.record_detection(v, h);
        let (v, h) = detection("100", "10.0.0.1");
        snapshot.record_detection(v, h);
        let (v, h) = detection("100", "10.0.0.2");
        snapshot.record_detection(v, h);

        assert_eq!(snapshot.vulns["100"].affected(), 2);
        assert_eq!(snapshot.hosts["10.0.0.1"].vulns.len(), 1);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_merge_is_additive() {
        let mut prior = Snapshot::new();
        let (v, h) = detection("100", "10.0.0.1");
        prior.record_detection(v, h);

        let mut fresh = Snapshot::new();
        let (v, h) = detection("100", "10.0.0.2");
        fresh.record_detection(v, h);
        let (v, h) = detection("200", "10.0.0.1");
        fresh.record_detection(v, h);

        prior.merge(fresh);
        assert_eq!(prior.vulns.len(), 2);
        assert_eq!(prior.vulns["100"].affected(), 2);
        assert_eq!(prior.hosts["10.0.0.1"].vulns.len(), 2);
        assert_eq!(prior.hosts.len(), 2);
    }

    #[test]
    fn test_validate_rejects_unaffected() {
        let mut snapshot = Snapshot::new();
        snapshot
            .vulns
            .insert("1".into(), Vulnerability::new("1", "orphan", 5.0));

        let err = snapshot.validate().unwrap_err();
        assert!(matches!(err, Error::UnaffectedVulnerability { .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_host() {
        let mut snapshot = Snapshot::new();
        let mut vuln = Vulnerability::new("1", "dangling", 5.0);
        vuln.hosts.insert("10.9.9.9".into());
        snapshot.vulns.insert("1".into(), vuln);

        let err = snapshot.validate().unwrap_err();
        assert!(matches!(err, Error::UnknownHost { ref ip, .. } if ip == "10.9.9.9"));
    }

    #[test]
    fn test_from_maps_restores_ids() {
        let json = r#"{"38170": {"title": "SSL", "cvss": 5.0, "hosts": ["10.0.0.1"]}}"#;
        let vulns: BTreeMap<String, Vulnerability> = serde_json::from_str(json).unwrap();
        let hosts: BTreeMap<String, Host> =
            serde_json::from_str(r#"{"10.0.0.1": {"hostname": "a"}}"#).unwrap();

        let snapshot = Snapshot::from_maps(vulns, hosts);
        assert_eq!(snapshot.vulns["38170"].id, "38170");
        assert_eq!(snapshot.hosts["10.0.0.1"].ip, "10.0.0.1");
    }
}
