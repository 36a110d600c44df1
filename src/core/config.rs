//! Engine configuration with documented defaults
//!
//! Every engagement assumption the engine makes is collected here and passed
//! explicitly into each calculation. Nothing is read from global state, so
//! several configurations can be evaluated side by side.

use serde::{Deserialize, Serialize};

/// Sentinel reported for CPK and TTK when a unit scores no kills
pub const INEFFECTIVE: f64 = 999.0;

/// Engagement assumptions for one calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === ENGAGEMENT ===
    /// Treat every range-conditional weapon as firing at half range
    ///
    /// When set, Melta and Rapid Fire bonuses always apply, no close/far
    /// variants are produced, and Stealth on the target is ignored.
    pub assume_half_range: bool,

    /// Target benefits from cover (+1 to its armor save, never better than 2+)
    pub assume_cover: bool,

    // === AGGREGATION ===
    /// Report per-unit efficiency instead of army-wide totals
    ///
    /// When false, rows with different quantities are grouped separately and
    /// their kills, damage and cost are multiplied by quantity.
    pub deduplicate: bool,

    /// Value reported for CPK and TTK when expected kills are zero
    pub ineffective_sentinel: f64,

    /// CPK bounds for the letter grades
    pub grades: GradeThresholds,

    // === PARALLELIZATION ===
    /// Minimum number of targets before the threat matrix goes parallel
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assume_half_range: false,
            assume_cover: false,
            deduplicate: true,
            ineffective_sentinel: INEFFECTIVE,
            grades: GradeThresholds::default(),
            parallel_threshold: 4,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_half_range(mut self, assume_half_range: bool) -> Self {
        self.assume_half_range = assume_half_range;
        self
    }

    pub fn with_cover(mut self, assume_cover: bool) -> Self {
        self.assume_cover = assume_cover;
        self
    }

    pub fn with_deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if !(self.ineffective_sentinel.is_finite() && self.ineffective_sentinel > 0.0) {
            return Err(format!(
                "ineffective_sentinel ({}) must be a positive number",
                self.ineffective_sentinel
            ));
        }

        if self.parallel_threshold == 0 {
            return Err("parallel_threshold must be at least 1".into());
        }

        self.grades.validate()
    }
}

/// Upper CPK bound for each letter grade
///
/// Based on game-length analysis: a median list trades at roughly 2.5 CPK
/// over five turns. Anything above `e` is graded F.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    /// Removes a similarly costed unit in a single interaction
    pub s: f64,
    pub a: f64,
    pub b: f64,
    /// Median: roughly neutral trades
    pub c: f64,
    pub d: f64,
    pub e: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            s: 1.0,
            a: 1.5,
            b: 2.0,
            c: 2.5,
            d: 3.0,
            e: 3.5,
        }
    }
}

impl GradeThresholds {
    /// Thresholds in grade order, best first
    pub fn ordered(&self) -> [f64; 6] {
        [self.s, self.a, self.b, self.c, self.d, self.e]
    }

    /// Thresholds must be positive and strictly increasing
    pub fn validate(&self) -> Result<(), String> {
        let ordered = self.ordered();

        if ordered[0] <= 0.0 {
            return Err(format!("S threshold ({}) must be positive", ordered[0]));
        }

        for pair in ordered.windows(2) {
            if pair[1] <= pair[0] {
                return Err(format!(
                    "grade thresholds must increase ({} is not above {})",
                    pair[1], pair[0]
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(GradeThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_sentinel() {
        let config = EngineConfig {
            ineffective_sentinel: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let thresholds = GradeThresholds {
            b: 1.2,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());
    }
}
