//! Weapon profiles: one row is one weapon (or firing mode) on one unit

use crate::core::types::{Flag, Magnitude, RawCell, RerollMode, Threshold};
use crate::engine::dice::Characteristic;
use serde::{Deserialize, Deserializer, Serialize};

/// Attacker row as supplied by roster editors and the API layer
///
/// Field aliases match the roster sheet column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    // === IDENTITY ===
    #[serde(alias = "Name")]
    pub name: String,

    #[serde(
        default = "default_group",
        alias = "Loadout Group",
        alias = "LoadoutGroup",
        deserialize_with = "text_cell"
    )]
    pub loadout_group: String,

    /// Exclusivity tag. Empty means the row is always counted.
    #[serde(
        default,
        alias = "Profile ID",
        alias = "ProfileID",
        deserialize_with = "text_cell"
    )]
    pub profile_id: String,

    #[serde(alias = "Weapon")]
    pub weapon: String,

    #[serde(default = "default_qty", alias = "Qty", deserialize_with = "qty_cell")]
    pub qty: u32,

    /// Per-model point cost
    #[serde(alias = "Pts", deserialize_with = "number_cell")]
    pub points: f64,

    #[serde(default, alias = "Range", deserialize_with = "text_cell")]
    pub range: String,

    // === COMBAT STATS ===
    #[serde(default, alias = "A")]
    pub attacks: Characteristic,

    /// Ballistic or weapon skill (`3` or `"3+"`)
    #[serde(default, alias = "BS", alias = "WS")]
    pub skill: Threshold,

    #[serde(default, alias = "S", deserialize_with = "count_cell")]
    pub strength: u32,

    /// Armor penetration magnitude. `-2` and `2` both mean AP-2.
    #[serde(default, alias = "AP", deserialize_with = "ap_cell")]
    pub ap: u32,

    #[serde(default, alias = "D")]
    pub damage: Characteristic,

    // === KEYWORDS ===
    #[serde(default, alias = "Sustained")]
    pub sustained: Magnitude,

    #[serde(default, alias = "Lethal")]
    pub lethal: Flag,

    #[serde(default, alias = "Dev")]
    pub devastating: Flag,

    #[serde(default, alias = "Torrent")]
    pub torrent: Flag,

    #[serde(default, alias = "TwinLinked")]
    pub twin_linked: Flag,

    #[serde(default, alias = "Blast")]
    pub blast: Flag,

    #[serde(default, alias = "IgnoresCover")]
    pub ignores_cover: Flag,

    #[serde(default = "default_crit", alias = "CritHit", deserialize_with = "crit_cell")]
    pub crit_hit: u8,

    #[serde(
        default = "default_crit",
        alias = "CritWound",
        deserialize_with = "crit_cell"
    )]
    pub crit_wound: u8,

    #[serde(default, alias = "Melta")]
    pub melta: Magnitude,

    #[serde(default, alias = "RapidFire")]
    pub rapid_fire: Magnitude,

    #[serde(default, alias = "RR_H")]
    pub reroll_hits: RerollMode,

    #[serde(default, alias = "RR_W")]
    pub reroll_wounds: RerollMode,
}

fn default_group() -> String {
    "Default".to_string()
}

fn default_qty() -> u32 {
    1
}

fn default_crit() -> u8 {
    6
}

fn text_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let text = match RawCell::decode(deserializer)? {
        Some(RawCell::Text(s)) => s.trim().to_string(),
        Some(RawCell::Int(n)) => n.to_string(),
        Some(RawCell::Float(f)) => f.to_string(),
        Some(RawCell::Bool(_)) | None => String::new(),
    };
    Ok(text)
}

fn cell_number(cell: Option<RawCell>) -> f64 {
    let value = match cell {
        Some(RawCell::Int(n)) => n as f64,
        Some(RawCell::Float(f)) => f,
        Some(RawCell::Text(s)) => s.trim().parse::<f64>().unwrap_or_else(|_| {
            tracing::debug!("Treating numeric cell '{}' as 0", s);
            0.0
        }),
        Some(RawCell::Bool(_)) | None => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn number_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    RawCell::decode(deserializer).map(cell_number)
}

fn count_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    number_cell(deserializer).map(|v| v.max(0.0).round() as u32)
}

fn qty_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let qty = match RawCell::decode(deserializer)? {
        None => default_qty(),
        cell => cell_number(cell).max(0.0).round() as u32,
    };
    Ok(qty)
}

fn ap_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    number_cell(deserializer).map(|v| v.abs().round() as u32)
}

fn crit_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    count_cell(deserializer).map(|v| if v == 0 { 6 } else { v.clamp(2, 6) as u8 })
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            loadout_group: default_group(),
            profile_id: String::new(),
            weapon: String::new(),
            qty: 1,
            points: 0.0,
            range: String::new(),
            attacks: Characteristic::default(),
            skill: Threshold::new(4),
            strength: 4,
            ap: 0,
            damage: Characteristic::default(),
            sustained: Magnitude::Off,
            lethal: Flag::OFF,
            devastating: Flag::OFF,
            torrent: Flag::OFF,
            twin_linked: Flag::OFF,
            blast: Flag::OFF,
            ignores_cover: Flag::OFF,
            crit_hit: 6,
            crit_wound: 6,
            melta: Magnitude::Off,
            rapid_fire: Magnitude::Off,
            reroll_hits: RerollMode::None,
            reroll_wounds: RerollMode::None,
        }
    }
}

impl WeaponProfile {
    /// A weapon row with the core profile set and every keyword off
    ///
    /// Attacks and damage accept dice notation; malformed notation counts as 0.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        weapon: &str,
        points: f64,
        attacks: &str,
        skill: u8,
        strength: u32,
        ap: u32,
        damage: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            weapon: weapon.to_string(),
            points,
            attacks: Characteristic::parse_or_zero(attacks),
            skill: Threshold::new(skill),
            strength,
            ap,
            damage: Characteristic::parse_or_zero(damage),
            ..Default::default()
        }
    }

    /// Required roll to hit; 7 when the weapon cannot hit normally
    pub fn skill_roll(&self) -> u8 {
        self.skill.roll().map(|s| s.max(2)).unwrap_or(7)
    }

    pub fn is_exclusive(&self) -> bool {
        !self.profile_id.is_empty()
    }

    /// Carries a bonus that only applies at half range
    pub fn is_range_conditional(&self) -> bool {
        self.melta.is_active() || self.rapid_fire.is_active()
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.loadout_group = group.to_string();
        self
    }

    pub fn with_profile_id(mut self, profile_id: &str) -> Self {
        self.profile_id = profile_id.to_string();
        self
    }

    pub fn with_qty(mut self, qty: u32) -> Self {
        self.qty = qty;
        self
    }
}
