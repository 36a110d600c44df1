pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, GradeThresholds, INEFFECTIVE};
pub use error::{CpkError, Result};
pub use types::{Flag, Magnitude, RerollMode, Threshold};
