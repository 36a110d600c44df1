//! Threat matrix: one roster against a whole library of targets
//!
//! Targets are independent, so large libraries are resolved in parallel.

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::engine::aggregate::{calculate, UnitMetric};
use crate::profiles::library::TargetLibrary;
use crate::profiles::target::TargetProfile;
use crate::profiles::weapon::WeaponProfile;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Roster-wide totals against one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationSummary {
    pub total_points: f64,
    pub total_kills: f64,
    pub avg_cpk: f64,
}

impl CalculationSummary {
    pub fn from_metrics(metrics: &[UnitMetric], target_points: f64, config: &EngineConfig) -> Self {
        let total_points: f64 = metrics.iter().map(|m| m.points).sum();
        let total_kills: f64 = metrics.iter().map(|m| m.kills).sum();

        let avg_cpk = if total_kills > 0.0 && target_points > 0.0 {
            total_points / (total_kills * target_points)
        } else {
            config.ineffective_sentinel
        };

        Self {
            total_points,
            total_kills,
            avg_cpk,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationReport {
    pub target_name: String,
    pub metrics: Vec<UnitMetric>,
    pub summary: CalculationSummary,
}

/// Run the full pipeline against one target and summarise it
pub fn calculate_report(
    rows: &[WeaponProfile],
    target: &TargetProfile,
    config: &EngineConfig,
) -> Result<CalculationReport> {
    let metrics = calculate(rows, target, config)?;
    let summary = CalculationSummary::from_metrics(&metrics, target.points.unwrap_or(0.0), config);

    Ok(CalculationReport {
        target_name: target.name.clone(),
        metrics,
        summary,
    })
}

/// Result against one library entry
#[derive(Debug)]
pub struct ThreatRow {
    pub key: String,
    pub report: Result<CalculationReport>,
}

/// Results in library order; invalid targets fail on their own row only
#[derive(Debug)]
pub struct ThreatMatrix {
    pub rows: Vec<ThreatRow>,
}

impl ThreatMatrix {
    pub fn get(&self, key: &str) -> Option<&ThreatRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// Successful reports only
    pub fn reports(&self) -> impl Iterator<Item = (&str, &CalculationReport)> {
        self.rows
            .iter()
            .filter_map(|row| row.report.as_ref().ok().map(|r| (row.key.as_str(), r)))
    }
}

pub fn threat_matrix(
    rows: &[WeaponProfile],
    library: &TargetLibrary,
    config: &EngineConfig,
) -> ThreatMatrix {
    let evaluate = |(key, target): &(String, TargetProfile)| {
        let report = calculate_report(rows, target, config);
        if let Err(e) = &report {
            tracing::warn!("Skipping target '{}': {}", key, e);
        }
        ThreatRow {
            key: key.clone(),
            report,
        }
    };

    let entries = library.entries();
    let results: Vec<ThreatRow> = if entries.len() >= config.parallel_threshold {
        entries.par_iter().map(evaluate).collect()
    } else {
        entries.iter().map(evaluate).collect()
    };

    ThreatMatrix { rows: results }
}
