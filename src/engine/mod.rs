//! Resolution and aggregation engine
//!
//! Stages run strictly in order: range expansion, per-row resolution,
//! exclusive-mode selection, unit aggregation, grading. Every stage is a
//! pure function of its inputs.

pub mod aggregate;
pub mod dice;
pub mod exclusivity;
pub mod grading;
pub mod matrix;
pub mod range;
pub mod resolution;

pub use aggregate::{aggregate, calculate, UnitMetric};
pub use dice::{expected_value, Characteristic};
pub use exclusivity::resolve_exclusivity;
pub use grading::{format_cpk, grade, Grade};
pub use matrix::{
    calculate_report, threat_matrix, CalculationReport, CalculationSummary, ThreatMatrix,
    ThreatRow,
};
pub use range::{expand, expand_all};
pub use resolution::{resolve, PhaseProbabilities, ResolvedRow};
