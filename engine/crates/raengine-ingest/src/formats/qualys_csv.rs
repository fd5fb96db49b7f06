//! Qualys scan report CSV parser

use crate::formats::ReportColumns;
use crate::IngestStats;
use anyhow::Context;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use raengine_core::{parse_cvss, Host, SeverityTier, Snapshot, Vulnerability};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of importing one scan report
#[derive(Debug, Clone)]
pub struct ReportImport {
    /// Import timestamp
    pub imported_at: DateTime<Utc>,
    pub snapshot: Snapshot,
    pub stats: IngestStats,
}

/// Parse a Qualys scan report export file
pub fn parse_report_file(
    path: impl AsRef<Path>,
    preamble_rows: usize,
) -> anyhow::Result<ReportImport> {
    let path = path.as_ref();
    info!("Parsing scan report: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading scan report {}", path.display()))?;
    parse_report(&content, preamble_rows)
}

/// Parse report content, skipping the export's preamble rows
pub fn parse_report(content: &str, preamble_rows: usize) -> anyhow::Result<ReportImport> {
    let start = Instant::now();
    let columns = ReportColumns::default();

    // Cells are kept as exported: threat and impact text is concatenated
    // later and surrounding whitespace is significant there.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut snapshot = Snapshot::new();
    let mut stats = IngestStats::default();

    for result in reader.records().skip(preamble_rows) {
        stats.records_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Error parsing report row {}: {}", stats.records_processed, e);
                stats.records_errored += 1;
                continue;
            }
        };

        if record.len() < columns.width() {
            debug!(
                row = stats.records_processed,
                width = record.len(),
                "Skipping short report row"
            );
            stats.records_skipped += 1;
            continue;
        }

        let ip = record[columns.ip].trim();
        let qid = record[columns.qid].trim();
        if ip.is_empty() || qid.is_empty() {
            stats.records_skipped += 1;
            continue;
        }

        if snapshot
            .vulns
            .get(qid)
            .is_some_and(|vuln| vuln.hosts.contains(ip))
        {
            stats.records_duplicate += 1;
            continue;
        }

        let vuln = vulnerability(&record, &columns, qid)
            .with_context(|| format!("report row {}", stats.records_processed))?;
        let host = host(&record, &columns, ip);
        snapshot.record_detection(vuln, host);
        stats.records_imported += 1;
    }

    stats.unique_hosts = snapshot.hosts.len() as u32;
    stats.unique_vulns = snapshot.vulns.len() as u32;
    stats.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Report parse complete: {} vulnerabilities, {} hosts from {} rows ({} skipped) in {}ms",
        stats.unique_vulns,
        stats.unique_hosts,
        stats.records_processed,
        stats.records_skipped,
        stats.duration_ms
    );

    Ok(ReportImport {
        imported_at: Utc::now(),
        snapshot,
        stats,
    })
}

fn vulnerability(
    record: &StringRecord,
    columns: &ReportColumns,
    qid: &str,
) -> raengine_core::Result<Vulnerability> {
    let severity = SeverityTier::parse(&record[columns.severity]).unwrap_or_default();
    let cvss = parse_cvss(qid, &record[columns.cvss3], severity)?;

    let mut vuln = Vulnerability::new(qid, &record[columns.title], cvss);
    vuln.severity = severity;
    vuln.port = format!("{}/{}", &record[columns.protocol], &record[columns.port]);
    vuln.exploitable = !record[columns.exploitability].is_empty();
    vuln.first_seen = record[columns.first_detected].to_string();
    vuln.category = record[columns.category].to_string();
    vuln.threat = record[columns.threat].to_string();
    vuln.impact = record[columns.impact].to_string();
    vuln.solution = record[columns.solution].to_string();
    Ok(vuln)
}

fn host(record: &StringRecord, columns: &ReportColumns, ip: &str) -> Host {
    let mut host = Host::new(ip);
    host.hostname = record[columns.dns].to_string();
    host.netbios = record[columns.netbios].to_string();
    host.os = record[columns.os].to_string();
    host
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // four preamble rows; the column header row makes the fifth
    const PREAMBLE: &str =
        "\"Scan Report\"\n\"Org\",\"Acme\"\n\"Generated\",\"2024-01-02\"\n\"Hosts\",\"2\"\n";

    fn row(ip: &str, qid: &str, severity: &str, cvss: &str, threat: &str, exploit: &str) -> String {
        let mut cells = vec![String::new(); 44];
        cells[0] = ip.into();
        cells[1] = format!("{}.example.com", ip.replace('.', "-"));
        cells[2] = "HOST".into();
        cells[6] = "Linux".into();
        cells[8] = qid.into();
        cells[9] = format!("Vuln {}", qid);
        cells[12] = severity.into();
        cells[13] = "443".into();
        cells[14] = "tcp".into();
        cells[17] = "01/02/2024".into();
        cells[32] = cvss.into();
        cells[34] = threat.into();
        cells[35] = " leads to compromise".into();
        cells[36] = "Patch".into();
        cells[37] = exploit.into();
        cells[43] = "General".into();
        cells
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn report(rows: &[String]) -> String {
        let header = row("IP", "QID", "Severity", "CVSS3", "Threat", "Exploitability");
        let mut content = format!("{}{}\n", PREAMBLE, header);
        for r in rows {
            content.push_str(r);
            content.push('\n');
        }
        content
    }

    #[test]
    fn test_parse_report() {
        let content = report(&[
            row("10.0.0.1", "38170", "4", "7.5 (AV:N/AC:L)", "Buffer overflow", "Metasploit"),
            row("10.0.0.2", "38170", "4", "7.5", "Buffer overflow", "Metasploit"),
            row("10.0.0.1", "90001", "3", "", "Weak cipher", ""),
        ]);

        let import = parse_report(&content, 5).unwrap();
        let snapshot = import.snapshot;
        assert_eq!(import.stats.records_imported, 3);
        assert_eq!(import.stats.unique_vulns, 2);
        assert_eq!(import.stats.unique_hosts, 2);

        let overflow = &snapshot.vulns["38170"];
        assert_eq!(overflow.cvss, 7.5);
        assert_eq!(overflow.port, "tcp/443");
        assert!(overflow.exploitable);
        assert_eq!(overflow.affected(), 2);
        assert_eq!(overflow.description(), "Buffer overflow leads to compromise");

        let cipher = &snapshot.vulns["90001"];
        // blank CVSS falls back to the severity tier
        assert_eq!(cipher.cvss, 5.0);
        assert!(!cipher.exploitable);

        let host = &snapshot.hosts["10.0.0.1"];
        assert_eq!(host.os, "Linux");
        assert_eq!(host.vulns.len(), 2);
    }

    #[test]
    fn test_duplicates_and_short_rows() {
        let content = report(&[
            row("10.0.0.1", "1", "5", "9.8", "rce", "x"),
            row("10.0.0.1", "1", "5", "9.8", "rce", "x"),
            "\"10.0.0.3\",\"truncated\"".to_string(),
        ]);

        let import = parse_report(&content, 5).unwrap();
        assert_eq!(import.stats.records_imported, 1);
        assert_eq!(import.stats.records_duplicate, 1);
        assert_eq!(import.stats.records_skipped, 1);
        assert_eq!(import.snapshot.vulns["1"].affected(), 1);
    }

    #[test]
    fn test_invalid_cvss_is_fatal() {
        let content = report(&[row("10.0.0.1", "1", "5", "n/a", "rce", "")]);
        assert!(parse_report(&content, 5).is_err());
    }

    #[test]
    fn test_parse_report_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(report(&[row("10.0.0.9", "7", "2", "3.1", "info", "")]).as_bytes())
            .unwrap();

        let import = parse_report_file(file.path(), 5).unwrap();
        assert!(import.snapshot.hosts.contains_key("10.0.0.9"));
    }
}
