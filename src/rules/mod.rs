//! Runtime configuration loaded from TOML

mod loader;

pub use loader::{
    load_engine_config, load_target_library, parse_engine_config, parse_grade_thresholds,
    parse_target_library,
};
