//! Snapshot persistence as JSON documents in the data directory

use anyhow::Context;
use raengine_core::{Host, RangeData, Snapshot, SubnetIndex, Vulnerability};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const VULN_FILE: &str = "vuln_data.json";
pub const HOST_FILE: &str = "host_data.json";
pub const SUBNET_FILE: &str = "subnet_data.json";
pub const RANGE_FILE: &str = "range_data.json";

/// Reads and writes the snapshot documents under one directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether vulnerability and host documents are both present
    pub fn exists(&self) -> bool {
        self.dir.join(VULN_FILE).exists() && self.dir.join(HOST_FILE).exists()
    }

    /// Write vulnerabilities, hosts and the subnet-to-hosts index
    pub fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating data directory {}", self.dir.display()))?;

        self.write(VULN_FILE, &snapshot.vulns)?;
        self.write(HOST_FILE, &snapshot.hosts)?;
        self.write(SUBNET_FILE, &snapshot.subnet_index())?;

        info!(
            "Saved {} vulnerabilities and {} hosts to {}",
            snapshot.vulns.len(),
            snapshot.hosts.len(),
            self.dir.display()
        );
        Ok(())
    }

    pub fn load(&self) -> anyhow::Result<Snapshot> {
        let vulns: BTreeMap<String, Vulnerability> = self.read(VULN_FILE)?;
        let hosts: BTreeMap<String, Host> = self.read(HOST_FILE)?;
        let snapshot = Snapshot::from_maps(vulns, hosts);

        info!(
            "Loaded {} vulnerabilities and {} hosts from {}",
            snapshot.vulns.len(),
            snapshot.hosts.len(),
            self.dir.display()
        );
        Ok(snapshot)
    }

    pub fn load_subnets(&self) -> anyhow::Result<SubnetIndex> {
        self.read(SUBNET_FILE)
    }

    pub fn save_ranges(&self, ranges: &RangeData) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating data directory {}", self.dir.display()))?;
        self.write(RANGE_FILE, ranges)
    }

    /// Saved range data, or empty when none was saved
    pub fn load_ranges(&self) -> anyhow::Result<RangeData> {
        if !self.dir.join(RANGE_FILE).exists() {
            return Ok(RangeData::new());
        }
        self.read(RANGE_FILE)
    }

    fn write<T: Serialize>(&self, name: &str, value: &T) -> anyhow::Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let path = self.dir.join(name);
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}
