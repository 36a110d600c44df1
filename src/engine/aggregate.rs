//! Unit aggregation: many weapon rows in, one efficiency metric per unit out

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::engine::exclusivity::resolve_exclusivity;
use crate::engine::grading::{grade, Grade};
use crate::engine::range::expand_all;
use crate::engine::resolution::{resolve, ResolvedRow};
use crate::profiles::target::{Defender, TargetProfile};
use crate::profiles::weapon::WeaponProfile;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Efficiency of one unit (or loadout group) against one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitMetric {
    pub unit: String,
    pub group: String,
    pub qty: u32,
    /// Cost basis used for CPK
    pub points: f64,
    /// Expected dead models, capped at the target unit size
    pub kills: f64,
    pub damage: f64,
    /// Cost per kill; lower is better
    pub cpk: f64,
    /// Activations to wipe the target unit
    pub ttk: f64,
    pub grade: Grade,
    /// Weapons (or winning modes) that contributed
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    unit: String,
    group: String,
    qty: Option<u32>,
}

#[derive(Debug)]
struct GroupTotals {
    key: GroupKey,
    qty: u32,
    kills: f64,
    damage: f64,
    max_points: f64,
    modes: Vec<String>,
}

/// Group resolved rows by unit and loadout group
///
/// With `deduplicate` the metric describes one unit. Without it, rows are
/// further split by quantity and scaled up to army-wide totals. Groups come
/// out in order of first appearance.
pub fn aggregate(rows: &[ResolvedRow], defender: &Defender, config: &EngineConfig) -> Vec<UnitMetric> {
    let mut index: AHashMap<GroupKey, usize> = AHashMap::new();
    let mut groups: Vec<GroupTotals> = Vec::new();

    for row in rows {
        let weapon = &row.weapon;
        let key = GroupKey {
            unit: weapon.name.clone(),
            group: weapon.loadout_group.clone(),
            qty: (!config.deduplicate).then_some(weapon.qty),
        };

        let idx = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(GroupTotals {
                key,
                qty: weapon.qty,
                kills: 0.0,
                damage: 0.0,
                max_points: 0.0,
                modes: Vec::new(),
            });
            groups.len() - 1
        });

        let totals = &mut groups[idx];
        totals.kills += row.dead_models;
        totals.damage += row.raw_damage;
        // An exclusive weapon set belongs to one model: never sum costs
        totals.max_points = totals.max_points.max(weapon.points);
        if !totals.modes.contains(&weapon.weapon) {
            totals.modes.push(weapon.weapon.clone());
        }
    }

    groups
        .into_iter()
        .map(|totals| finish(totals, defender, config))
        .collect()
}

fn finish(totals: GroupTotals, defender: &Defender, config: &EngineConfig) -> UnitMetric {
    let scale = if config.deduplicate {
        1.0
    } else {
        totals.qty as f64
    };

    let points = totals.max_points * scale;
    let kills = (totals.kills * scale).min(defender.unit_size);
    let damage = totals.damage * scale;

    let (cpk, ttk, grade) = if kills > 0.0 {
        let cpk = points / (kills * defender.points);
        (cpk, defender.unit_size / kills, grade(cpk, config))
    } else {
        (
            config.ineffective_sentinel,
            config.ineffective_sentinel,
            Grade::F,
        )
    };

    UnitMetric {
        unit: totals.key.unit,
        group: totals.key.group,
        qty: totals.qty,
        points,
        kills,
        damage,
        cpk,
        ttk,
        grade,
        mode: totals.modes.join(", "),
    }
}

/// Full pipeline for one target: expand, resolve, pick modes, aggregate
///
/// Fails only when the target itself is structurally invalid.
pub fn calculate(
    rows: &[WeaponProfile],
    target: &TargetProfile,
    config: &EngineConfig,
) -> Result<Vec<UnitMetric>> {
    let defender = target.engage(config)?;

    let resolved: Vec<ResolvedRow> = expand_all(rows, config.assume_half_range)
        .iter()
        .map(|row| resolve(row, &defender))
        .collect();

    let selected = resolve_exclusivity(resolved);
    Ok(aggregate(&selected, &defender, config))
}
