//! Letter grades for cost-per-kill values

use crate::core::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Efficiency tier, S best to F worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    const ORDER: [Grade; 6] = [Grade::S, Grade::A, Grade::B, Grade::C, Grade::D, Grade::E];

    pub fn letter(self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Grade::S => "Elite - removes similarly costed units in one interaction",
            Grade::A => "Excellent trade efficiency",
            Grade::B => "Good trade efficiency",
            Grade::C => "Average - roughly neutral trades",
            Grade::D => "Below average - unfavorable trades",
            Grade::E => "Poor - very unfavorable trades",
            Grade::F => "Ineffective - minimal game impact",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Grade a CPK value against the configured thresholds
///
/// Non-positive, non-finite values and anything at or above the configured
/// ineffective sentinel are always F.
pub fn grade(cpk: f64, config: &EngineConfig) -> Grade {
    if !cpk.is_finite() || cpk <= 0.0 || cpk >= config.ineffective_sentinel {
        return Grade::F;
    }

    config
        .grades
        .ordered()
        .iter()
        .zip(Grade::ORDER)
        .find(|(limit, _)| cpk <= **limit)
        .map(|(_, grade)| grade)
        .unwrap_or(Grade::F)
}

/// "1.70 (B-tier)", optionally with the grade description
pub fn format_cpk(cpk: f64, config: &EngineConfig, describe: bool) -> String {
    let g = grade(cpk, config);
    if describe {
        format!("{:.2} ({}-tier: {})", cpk, g, g.description())
    } else {
        format!("{:.2} ({}-tier)", cpk, g)
    }
}
