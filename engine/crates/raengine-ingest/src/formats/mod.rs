//! File format parsers for scan report import

pub mod qualys_csv;

pub use qualys_csv::{parse_report, parse_report_file, ReportImport};

/// Column positions of a Qualys scan report export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportColumns {
    pub ip: usize,
    pub dns: usize,
    pub netbios: usize,
    pub os: usize,
    pub qid: usize,
    pub title: usize,
    pub severity: usize,
    pub port: usize,
    pub protocol: usize,
    pub first_detected: usize,
    pub cvss3: usize,
    pub threat: usize,
    pub impact: usize,
    pub solution: usize,
    pub exploitability: usize,
    pub category: usize,
}

impl Default for ReportColumns {
    fn default() -> Self {
        Self {
            ip: 0,
            dns: 1,
            netbios: 2,
            os: 6,
            qid: 8,
            title: 9,
            severity: 12,
            port: 13,
            protocol: 14,
            first_detected: 17,
            cvss3: 32,
            threat: 34,
            impact: 35,
            solution: 36,
            exploitability: 37,
            category: 43,
        }
    }
}

impl ReportColumns {
    /// Minimum row width for every mapped column to be present
    pub fn width(&self) -> usize {
        [
            self.ip,
            self.dns,
            self.netbios,
            self.os,
            self.qid,
            self.title,
            self.severity,
            self.port,
            self.protocol,
            self.first_detected,
            self.cvss3,
            self.threat,
            self.impact,
            self.solution,
            self.exploitability,
            self.category,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}
