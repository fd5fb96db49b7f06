//! Network reference data: subnet ranges, service weights and the
//! subnet-to-hosts index

use crate::host::Host;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

/// Columns of a VLAN export row
const VLAN_COLUMNS: usize = 5;

/// Subnet categories keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeData {
    pub categories: BTreeMap<String, RangeCategory>,
}

/// A named group of subnets sharing a department
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeCategory {
    #[serde(default)]
    pub department: String,
    /// CIDR to range definition
    #[serde(default)]
    pub subnets: BTreeMap<String, SubnetRange>,
}

/// A single CIDR with its inherent trust tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetRange {
    #[serde(default)]
    pub name: String,
    pub cidr: String,
    /// Protection tier (1-5)
    pub protection: u8,
    /// Availability tier (1-5)
    pub availability: u8,
    #[serde(default)]
    pub comment: String,
}

impl SubnetRange {
    /// Tier assigned when the directory export carries none
    pub const DEFAULT_TIER: u8 = 5;

    pub fn new(cidr: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            cidr: cidr.into(),
            protection: Self::DEFAULT_TIER,
            availability: Self::DEFAULT_TIER,
            comment: String::new(),
        }
    }
}

impl RangeData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a range under a category, creating the category on first use
    pub fn insert(&mut self, category: &str, department: &str, range: SubnetRange) {
        let entry = self
            .categories
            .entry(category.to_string())
            .or_insert_with(|| RangeCategory {
                department: department.to_string(),
                subnets: BTreeMap::new(),
            });
        entry.subnets.insert(range.cidr.clone(), range);
    }

    /// Look up the range a host was classified into
    pub fn lookup(&self, category: &str, cidr: &str) -> Option<&SubnetRange> {
        self.categories.get(category)?.subnets.get(cidr)
    }

    /// Parse a VLAN export: a header row, then
    /// `cidr, comment, name, category, department` per row.
    ///
    /// The export carries no trust tiers, so every range gets the default.
    pub fn from_vlan_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut ranges = Self::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            if record.len() < VLAN_COLUMNS {
                return Err(Error::Parse(format!(
                    "VLAN row {} has {} columns, expected {}",
                    row + 2,
                    record.len(),
                    VLAN_COLUMNS
                )));
            }

            let mut range = SubnetRange::new(&record[0]);
            range.comment = record[1].to_string();
            range.name = record[2].to_string();
            ranges.insert(&record[3], &record[4], range);
        }
        Ok(ranges)
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(|c| c.subnets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Protection/availability weight of an exposed service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceScore {
    pub protection: f64,
    pub availability: f64,
}

/// Service criticality keyed by port number (as string)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceScores {
    pub ports: BTreeMap<String, ServiceScore>,
}

impl ServiceScores {
    pub fn get(&self, port: u16) -> Option<&ServiceScore> {
        self.ports.get(&port.to_string())
    }

    /// Entries matching any observed destination port
    pub fn matching<'a>(
        &'a self,
        connections: &'a BTreeMap<u16, u64>,
    ) -> impl Iterator<Item = &'a ServiceScore> + 'a {
        connections.keys().filter_map(move |port| self.get(*port))
    }
}

/// Host IPs grouped by subnet category and CIDR
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubnetIndex {
    pub categories: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl SubnetIndex {
    /// Build the index from host classifications. Unmatched hosts are grouped
    /// under the "No Match" category.
    pub fn from_hosts<'a>(hosts: impl IntoIterator<Item = &'a Host>) -> Self {
        let mut index = Self::default();
        for host in hosts {
            index.add(&host.subnet, &host.cidr, &host.ip);
        }
        index
    }

    pub fn add(&mut self, category: &str, cidr: &str, ip: &str) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .entry(cidr.to_string())
            .or_default()
            .insert(ip.to_string());
    }

    /// Every host IP in a category, across all of its CIDRs
    pub fn hosts_in(&self, category: &str) -> impl Iterator<Item = &String> {
        self.categories
            .get(category)
            .into_iter()
            .flat_map(|cidrs| cidrs.values())
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NO_MATCH;

    #[test]
    fn test_range_lookup() {
        let mut ranges = RangeData::new();
        let mut range = SubnetRange::new("10.1.0.0/16");
        range.protection = 2;
        ranges.insert("Servers", "IT", range);

        assert_eq!(ranges.lookup("Servers", "10.1.0.0/16").unwrap().protection, 2);
        assert!(ranges.lookup("Servers", "10.2.0.0/16").is_none());
        assert!(ranges.lookup("Clients", "10.1.0.0/16").is_none());
        assert_eq!(ranges.len(), 1);
    }

    #[test]
    fn test_range_json_shape() {
        let json = r#"{
            "Servers": {
                "department": "IT",
                "subnets": {
                    "10.1.0.0/16": {"name": "dc", "cidr": "10.1.0.0/16", "protection": 3, "availability": 4, "comment": "core"}
                }
            }
        }"#;
        let ranges: RangeData = serde_json::from_str(json).unwrap();
        let range = ranges.lookup("Servers", "10.1.0.0/16").unwrap();
        assert_eq!(range.availability, 4);
        assert_eq!(ranges.categories["Servers"].department, "IT");
    }

    #[test]
    fn test_from_vlan_csv() {
        let csv = "CIDR,Comment,Name,Category,Department
10.1.0.0/16,core,dc,Servers,IT
10.2.0.0/16,,web,Servers,IT
192.168.0.0/16,office,wifi,Clients,Facilities
";
        let ranges = RangeData::from_vlan_csv(csv.as_bytes()).unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges.categories["Clients"].department, "Facilities");

        let dc = ranges.lookup("Servers", "10.1.0.0/16").unwrap();
        assert_eq!(dc.name, "dc");
        assert_eq!(dc.comment, "core");
        assert_eq!(dc.protection, SubnetRange::DEFAULT_TIER);
        assert_eq!(dc.availability, SubnetRange::DEFAULT_TIER);
    }

    #[test]
    fn test_from_vlan_csv_short_row() {
        let csv = "CIDR,Comment,Name,Category,Department\n10.1.0.0/16,core\n";
        let err = RangeData::from_vlan_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_service_scores_matching() {
        let json = r#"{"443": {"protection": 4, "availability": 5}, "22": {"protection": 5, "availability": 2}}"#;
        let scores: ServiceScores = serde_json::from_str(json).unwrap();
        let connections = BTreeMap::from([(22u16, 4u64), (8080, 9)]);
        let matched: Vec<_> = scores.matching(&connections).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].protection, 5.0);
    }

    #[test]
    fn test_subnet_index_groups_unmatched() {
        let mut a = Host::new("10.1.0.5");
        a.assign_subnet("Servers", "10.1.0.0/16");
        let b = Host::new("192.168.9.9");

        let index = SubnetIndex::from_hosts([&a, &b]);
        assert_eq!(index.hosts_in("Servers").count(), 1);
        assert_eq!(index.hosts_in(NO_MATCH).count(), 1);
        assert_eq!(index.hosts_in("Clients").count(), 0);
    }
}
