//! Scoring engine - runs every pass over a snapshot in order

use crate::classify::FinalClassifier;
use crate::host_impact::HostImpactScorer;
use crate::impact::ImpactAggregator;
use crate::risk::RiskScorer;
use crate::surface::AttackSurfaceEstimator;
use raengine_common::Config;
use raengine_core::{Classification, RangeData, Result, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Counts produced by one scoring run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub vulns: usize,
    pub hosts: usize,
    pub by_class: BTreeMap<Classification, usize>,
    pub outofband: usize,
}

impl RunSummary {
    pub fn count(&self, class: Classification) -> usize {
        self.by_class.get(&class).copied().unwrap_or(0)
    }
}

/// Scores a snapshot in place.
///
/// The engine is built once from a validated configuration and can be reused
/// across snapshots. Every pass overwrites its outputs, so scoring the same
/// inputs twice gives the same results.
pub struct ScoringEngine {
    hosts: HostImpactScorer,
    risk: RiskScorer,
    surface: AttackSurfaceEstimator,
    impact: ImpactAggregator,
    classifier: FinalClassifier,
}

impl ScoringEngine {
    pub fn new(config: &Config) -> Self {
        let weights = config.settings.weights;
        Self {
            hosts: HostImpactScorer::new(&weights.impact, config.service_pa_scores.clone()),
            risk: RiskScorer::new(weights.risk, config.attack_table.clone()),
            surface: AttackSurfaceEstimator::new(),
            impact: ImpactAggregator::new(&weights.impact),
            classifier: FinalClassifier::new(
                weights.overall,
                config.settings.thresholds.clone(),
            ),
        }
    }

    pub fn run(&self, snapshot: &mut Snapshot, ranges: &RangeData) -> Result<RunSummary> {
        snapshot.validate()?;
        info!(
            "Scoring {} vulnerabilities across {} hosts",
            snapshot.vulns.len(),
            snapshot.hosts.len()
        );

        self.hosts.score_all(snapshot, ranges);
        self.risk_pass(snapshot);
        self.impact_pass(snapshot)?;
        let summary = self.final_pass(snapshot);

        info!(
            critical = summary.count(Classification::Critical),
            high = summary.count(Classification::High),
            medium = summary.count(Classification::Medium),
            low = summary.count(Classification::Low),
            outofband = summary.outofband,
            "Scoring complete"
        );
        Ok(summary)
    }

    fn risk_pass(&self, snapshot: &mut Snapshot) {
        info!("Calculating risk scores");
        for vuln in snapshot.vulns.values_mut() {
            let risk = self.risk.assess(vuln);
            vuln.analysis.types = risk.types;
            vuln.analysis.sev_score = risk.sev_score;
            vuln.analysis.risk_score = risk.risk_score;
        }
    }

    fn impact_pass(&self, snapshot: &mut Snapshot) -> Result<()> {
        info!("Calculating attack surface and impact scores");

        let mut raw = BTreeMap::new();
        for (id, vuln) in &snapshot.vulns {
            raw.insert(id.clone(), self.surface.estimate(snapshot, vuln)?);
        }
        let normalized = self.surface.normalize(&raw);

        let mut scores = BTreeMap::new();
        for (id, vuln) in &snapshot.vulns {
            let surface = normalized.get(id).copied().unwrap_or_default();
            let impact = self.impact.aggregate(snapshot, vuln, surface)?;
            scores.insert(id.clone(), (surface, impact));
        }

        for (id, (surface, impact)) in scores {
            if let Some(vuln) = snapshot.vulns.get_mut(&id) {
                vuln.analysis.attack_surface = surface;
                vuln.analysis.protection = impact.protection;
                vuln.analysis.availability = impact.availability;
                vuln.analysis.impact_score = impact.impact_score;
            }
        }
        Ok(())
    }

    fn final_pass(&self, snapshot: &mut Snapshot) -> RunSummary {
        info!("Classifying vulnerabilities");

        let mut summary = RunSummary {
            vulns: snapshot.vulns.len(),
            hosts: snapshot.hosts.len(),
            ..Default::default()
        };
        for vuln in snapshot.vulns.values_mut() {
            let verdict = self.classifier.assess(vuln);
            vuln.analysis.final_score = verdict.final_score;
            vuln.analysis.class = verdict.class;
            vuln.analysis.outofband = verdict.outofband;

            *summary.by_class.entry(verdict.class).or_insert(0) += 1;
            if verdict.outofband {
                summary.outofband += 1;
            }
        }
        summary
    }
}
