//! Load target libraries and engine settings from TOML files

use crate::core::config::{EngineConfig, GradeThresholds};
use crate::core::error::{CpkError, Result};
use crate::profiles::library::TargetLibrary;
use crate::profiles::target::TargetProfile;
use std::fs;
use std::path::Path;

/// Load a target library from a `[[target]]` TOML file
pub fn load_target_library(path: &Path) -> Result<TargetLibrary> {
    let content = fs::read_to_string(path)?;
    parse_target_library(&content)
}

/// Parse `[[target]]` entries; invalid profiles are skipped with a warning
pub fn parse_target_library(content: &str) -> Result<TargetLibrary> {
    let toml: toml::Value = content.parse()?;

    let entries = toml
        .get("target")
        .and_then(|v| v.as_array())
        .ok_or_else(|| CpkError::Config("no [[target]] entries found".into()))?;

    let mut library = TargetLibrary::new();

    for entry in entries {
        let target: TargetProfile = entry.clone().try_into()?;

        let key = entry
            .get("key")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| target.name.clone());
        if key.is_empty() {
            return Err(CpkError::Config("target entry needs a key or a name".into()));
        }

        if let Err(e) = target.validate() {
            tracing::warn!("Skipping invalid target '{}': {}", key, e);
            continue;
        }

        library.insert(&key, target);
    }

    Ok(library)
}

/// Load engine settings from a TOML file with `[engine]` and `[grades]` tables
pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path)?;
    parse_engine_config(&content)
}

/// Parse engine settings; absent tables and keys keep their defaults
pub fn parse_engine_config(content: &str) -> Result<EngineConfig> {
    let toml: toml::Value = content.parse()?;

    let mut config: EngineConfig = match toml.get("engine") {
        Some(table) => table.clone().try_into()?,
        None => EngineConfig::default(),
    };

    if toml.get("grades").is_some() {
        config.grades = parse_grade_thresholds(content)?;
    }

    config.validate().map_err(CpkError::Config)?;
    Ok(config)
}

/// Parse the `[grades]` table
pub fn parse_grade_thresholds(content: &str) -> Result<GradeThresholds> {
    let toml: toml::Value = content.parse()?;

    let thresholds: GradeThresholds = match toml.get("grades") {
        Some(table) => table.clone().try_into()?,
        None => GradeThresholds::default(),
    };

    thresholds.validate().map_err(CpkError::Config)?;
    Ok(thresholds)
}
