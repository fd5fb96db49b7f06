//! Connection window - per-port connection counts over a trailing period
//!
//! Connection logs are stored as one JSON file per export, named by the
//! export timestamp (`<datestr>.json`) and shaped `{ip: {port: count}}`.

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use raengine_core::Snapshot;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Destination port to connection count, per host IP
pub type HostConnections = BTreeMap<String, BTreeMap<u16, u64>>;

/// Connection counts summed over every export inside the window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionWindow {
    pub hosts: HostConnections,
    /// Number of export files summed
    pub files: usize,
}

impl ConnectionWindow {
    /// Sum the exports in `dir` stamped within `[latest - days, latest]`.
    ///
    /// Files whose name does not parse with `datestr` are ignored. A missing
    /// directory yields an empty window.
    pub fn load(
        dir: impl AsRef<Path>,
        latest: NaiveDateTime,
        days: u32,
        datestr: &str,
    ) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let mut window = Self::default();

        if !dir.exists() {
            warn!("Connections directory {} not found", dir.display());
            return Ok(window);
        }

        let earliest = latest - Duration::days(i64::from(days));
        let entries = fs::read_dir(dir)
            .with_context(|| format!("listing connections directory {}", dir.display()))?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        for path in paths {
            let Some(stamp) = file_stamp(&path, datestr) else {
                debug!("Ignoring {}", path.display());
                continue;
            };
            if stamp < earliest || stamp > latest {
                continue;
            }

            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading connections {}", path.display()))?;
            let export: HostConnections = serde_json::from_str(&content)
                .with_context(|| format!("parsing connections {}", path.display()))?;
            window.add(export);
            window.files += 1;
        }

        info!(
            "Loaded connections for {} hosts from {} files ({} days to {})",
            window.hosts.len(),
            window.files,
            days,
            latest
        );
        Ok(window)
    }

    /// Add one export's counts to the window
    pub fn add(&mut self, export: HostConnections) {
        for (ip, ports) in export {
            let entry = self.hosts.entry(ip).or_default();
            for (port, count) in ports {
                *entry.entry(port).or_insert(0) += count;
            }
        }
    }

    /// Replace the connections of every known host that appears in the
    /// window. Returns the number of hosts updated.
    pub fn apply(&self, snapshot: &mut Snapshot) -> usize {
        let mut updated = 0;
        for (ip, ports) in &self.hosts {
            if let Some(host) = snapshot.hosts.get_mut(ip) {
                host.connections = ports.clone();
                updated += 1;
            }
        }
        info!("Updated connections on {} hosts", updated);
        updated
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Timestamp encoded in a file name up to its first '.'
fn file_stamp(path: &Path, datestr: &str) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    NaiveDateTime::parse_from_str(stem, datestr)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(stem, datestr)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use raengine_core::Host;
    use tempfile::TempDir;

    const DATESTR: &str = "%Y-%m-%d_%H-%M-%S";

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATESTR).unwrap()
    }

    fn write(dir: &TempDir, stamp: &str, json: &str) {
        fs::write(dir.path().join(format!("{}.json", stamp)), json).unwrap();
    }

    #[test]
    fn test_window_sums_files_in_range() {
        let dir = TempDir::new().unwrap();
        write(&dir, "2024-03-01_00-00-00", r#"{"10.0.0.1": {"443": 10, "22": 1}}"#);
        write(&dir, "2024-03-20_12-00-00", r#"{"10.0.0.1": {"443": 5}, "10.0.0.2": {"80": 7}}"#);
        // outside the window
        write(&dir, "2023-01-01_00-00-00", r#"{"10.0.0.1": {"443": 1000}}"#);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let window =
            ConnectionWindow::load(dir.path(), at("2024-03-31_00-00-00"), 90, DATESTR).unwrap();
        assert_eq!(window.files, 2);
        assert_eq!(window.hosts["10.0.0.1"][&443], 15);
        assert_eq!(window.hosts["10.0.0.1"][&22], 1);
        assert_eq!(window.hosts["10.0.0.2"][&80], 7);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let window = ConnectionWindow::load(
            dir.path().join("absent"),
            at("2024-03-31_00-00-00"),
            90,
            DATESTR,
        )
        .unwrap();
        assert!(window.is_empty());
    }

    #[test]
    fn test_apply_replaces_known_hosts_only() {
        let mut snapshot = Snapshot::new();
        let mut host = Host::new("10.0.0.1");
        host.connections.insert(8080, 99);
        snapshot.hosts.insert("10.0.0.1".into(), host);

        let mut window = ConnectionWindow::default();
        window.add(BTreeMap::from([
            ("10.0.0.1".to_string(), BTreeMap::from([(443u16, 3u64)])),
            ("10.0.0.9".to_string(), BTreeMap::from([(22u16, 1u64)])),
        ]));

        assert_eq!(window.apply(&mut snapshot), 1);
        assert_eq!(snapshot.hosts["10.0.0.1"].connections, BTreeMap::from([(443, 3)]));
        assert!(!snapshot.hosts.contains_key("10.0.0.9"));
    }

    #[test]
    fn test_date_only_format() {
        let stamp = file_stamp(Path::new("2024-03-01.json"), "%Y-%m-%d").unwrap();
        assert_eq!(stamp, at("2024-03-01_00-00-00"));
    }
}
