//! CSV reports for scored snapshots

use raengine_core::{Result, Snapshot};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Column headers of the analysis report
pub const ANALYSIS_HEADERS: [&str; 16] = [
    "Plugin ID",
    "Name",
    "# Affected",
    "First Seen",
    "CVSS Score",
    "sevScore",
    "Risk Score",
    "Attack Surface",
    "Protection",
    "Availability",
    "Impact Score",
    "Final Score",
    "Class",
    "Out of Band",
    "Synopsis",
    "Comments",
];

pub const HOST_IMPACT_HEADERS: [&str; 5] = ["IP", "Subnet", "CIDR", "Protection", "Availability"];

/// One row per vulnerability, in identifier order
pub fn write_analysis_csv<W: Write>(snapshot: &Snapshot, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(ANALYSIS_HEADERS)?;

    for (id, vuln) in &snapshot.vulns {
        let a = &vuln.analysis;
        wtr.write_record([
            id.clone(),
            vuln.title.clone(),
            vuln.affected().to_string(),
            vuln.first_seen.clone(),
            score(vuln.cvss),
            score(a.sev_score),
            score(a.risk_score),
            score(a.attack_surface),
            score(a.protection),
            score(a.availability),
            score(a.impact_score),
            score(a.final_score),
            a.class.to_string(),
            yes_no(a.outofband).to_string(),
            vuln.description(),
            String::new(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// One row per host, in address order
pub fn write_host_impact_csv<W: Write>(snapshot: &Snapshot, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HOST_IMPACT_HEADERS)?;

    for (ip, host) in &snapshot.hosts {
        wtr.write_record([
            ip.clone(),
            host.subnet.clone(),
            host.cidr.clone(),
            score(host.protection),
            score(host.availability),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_analysis_file(snapshot: &Snapshot, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = create(path)?;
    write_analysis_csv(snapshot, file)?;
    info!("Wrote {} vulnerabilities to {}", snapshot.vulns.len(), path.display());
    Ok(())
}

pub fn write_host_impact_file(snapshot: &Snapshot, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = create(path)?;
    write_host_impact_csv(snapshot, file)?;
    info!("Wrote {} hosts to {}", snapshot.hosts.len(), path.display());
    Ok(())
}

fn create(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(fs::File::create(path)?)
}

/// Scores always carry a decimal point, `7` is written `7.0`
fn score(value: f64) -> String {
    format!("{:?}", value)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
