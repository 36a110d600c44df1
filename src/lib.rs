//! CPK Engine - closed-form combat efficiency for dice-based wargames
//!
//! Given attacker weapon rows and a defensive target profile, computes the
//! expected dead models, cost per kill (CPK) and time to kill (TTK) of each
//! unit. All results are expectations; nothing is simulated.

pub mod core;
pub mod engine;
pub mod profiles;
pub mod rules;

pub use crate::core::{CpkError, EngineConfig, GradeThresholds, Result};
pub use crate::engine::{calculate, threat_matrix, Grade, UnitMetric};
pub use crate::profiles::{TargetLibrary, TargetProfile, WeaponProfile};
