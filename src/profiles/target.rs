//! Defensive target profiles
//!
//! `TargetProfile` is the loosely typed record callers supply. `Defender` is
//! the validated view the resolver works with: every required stat present,
//! engagement assumptions (cover, stealth) already folded in.

use crate::core::config::EngineConfig;
use crate::core::error::{CpkError, Result};
use crate::core::types::{Flag, Threshold};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetProfile {
    #[serde(default, alias = "Name")]
    pub name: String,

    /// Point cost per model
    #[serde(default, alias = "Pts")]
    pub points: Option<f64>,

    #[serde(default, alias = "T")]
    pub toughness: Option<u32>,

    /// Wounds per model
    #[serde(default, alias = "W")]
    pub wounds: Option<u32>,

    /// Armor save; `"7+"` or `"N"` means no save, but the field must be given
    #[serde(default, alias = "Sv")]
    pub save: Option<Threshold>,

    #[serde(default, alias = "Inv", alias = "Invuln")]
    pub invuln: Threshold,

    #[serde(default, alias = "FNP")]
    pub fnp: Threshold,

    #[serde(default, alias = "Stealth")]
    pub stealth: Flag,

    /// Models in the unit
    #[serde(default, alias = "UnitSize")]
    pub unit_size: Option<u32>,
}

impl TargetProfile {
    pub fn new(
        name: &str,
        toughness: u32,
        wounds: u32,
        save: &str,
        unit_size: u32,
        points: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            points: Some(points),
            toughness: Some(toughness),
            wounds: Some(wounds),
            save: Some(Threshold::parse(save)),
            unit_size: Some(unit_size),
            ..Default::default()
        }
    }

    pub fn with_invuln(mut self, invuln: &str) -> Self {
        self.invuln = Threshold::parse(invuln);
        self
    }

    pub fn with_fnp(mut self, fnp: &str) -> Self {
        self.fnp = Threshold::parse(fnp);
        self
    }

    pub fn with_stealth(mut self, stealth: bool) -> Self {
        self.stealth = Flag(stealth);
        self
    }

    /// Check required fields and produce the resolver's view
    pub fn validate(&self) -> Result<Defender> {
        let toughness = require_positive(&self.name, "toughness", self.toughness)?;
        let wounds = require_positive(&self.name, "wounds", self.wounds)?;
        let unit_size = require_positive(&self.name, "unit_size", self.unit_size)?;

        let points = self
            .points
            .ok_or_else(|| CpkError::invalid_target(&self.name, "missing required field: points"))?;
        if !(points.is_finite() && points > 0.0) {
            return Err(CpkError::invalid_target(&self.name, "points must be positive"));
        }

        let save = self
            .save
            .ok_or_else(|| CpkError::invalid_target(&self.name, "missing required field: save"))?;
        if let Some(v) = save.0 {
            if !(2..=7).contains(&v) {
                return Err(CpkError::invalid_target(
                    &self.name,
                    format!("invalid save value: {}+", v),
                ));
            }
        }

        Ok(Defender {
            name: self.name.clone(),
            toughness,
            wounds: wounds as f64,
            save: save.roll().unwrap_or(7),
            invuln: self.invuln.roll(),
            fnp: self.fnp.roll(),
            stealth: self.stealth.is_set(),
            in_cover: false,
            unit_size: unit_size as f64,
            points,
        })
    }

    /// Validate and apply the engagement assumptions of `config`
    pub fn engage(&self, config: &EngineConfig) -> Result<Defender> {
        let mut defender = self.validate()?;
        defender.in_cover = config.assume_cover;
        if config.assume_half_range {
            defender.stealth = false;
        }
        Ok(defender)
    }
}

fn require_positive(name: &str, field: &str, value: Option<u32>) -> Result<u32> {
    match value {
        None => Err(CpkError::invalid_target(
            name,
            format!("missing required field: {}", field),
        )),
        Some(0) => Err(CpkError::invalid_target(
            name,
            format!("{} must be positive", field),
        )),
        Some(v) => Ok(v),
    }
}

/// A validated target as seen by the weapon resolver
#[derive(Debug, Clone, PartialEq)]
pub struct Defender {
    pub name: String,
    pub toughness: u32,
    pub wounds: f64,
    /// Armor save roll; 7 means no save
    pub save: u8,
    pub invuln: Option<u8>,
    pub fnp: Option<u8>,
    /// Stealth is in effect (-1 to hit)
    pub stealth: bool,
    /// Target claims cover (+1 armor save against weapons that respect it)
    pub in_cover: bool,
    pub unit_size: f64,
    pub points: f64,
}

impl Defender {
    /// Armor save against a weapon, with cover applied when it counts
    pub fn armor_save(&self, ignores_cover: bool) -> u8 {
        if self.in_cover && !ignores_cover && self.save > 2 {
            self.save - 1
        } else {
            self.save
        }
    }
}
