//! Weapon resolution: hit, wound, save, Feel No Pain, damage allocation
//!
//! Closed-form expectation over one weapon row against one defender. No dice
//! are rolled and no errors escape: bad input has already been reduced to
//! neutral values by the time a row reaches here.

use crate::core::types::RerollMode;
use crate::engine::dice::Characteristic;
use crate::profiles::target::Defender;
use crate::profiles::weapon::WeaponProfile;

/// Probability of passing a D6 roll needing `target`+
pub fn roll_probability(target: u8) -> f64 {
    ((7.0 - target as f64) / 6.0).clamp(0.0, 1.0)
}

/// Wound roll needed for strength against toughness; `None` if it cannot wound
pub fn wound_requirement(strength: u32, toughness: u32) -> Option<u8> {
    if strength == 0 {
        return None;
    }
    let (strength, toughness) = (u64::from(strength), u64::from(toughness));
    let req = if strength >= 2 * toughness {
        2
    } else if strength > toughness {
        3
    } else if strength == toughness {
        4
    } else if 2 * strength > toughness {
        5
    } else {
        6
    };
    Some(req)
}

/// Attack count after Blast scaling
///
/// Six to ten models take the minimum roll, eleven or more the maximum.
pub fn blast_attacks(attacks: &Characteristic, blast: bool, unit_size: f64) -> f64 {
    if !blast || attacks.is_fixed() || unit_size <= 5.0 {
        attacks.mean()
    } else if unit_size <= 10.0 {
        attacks.minimum()
    } else {
        attacks.maximum()
    }
}

/// Per-attack probabilities for each phase
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhaseProbabilities {
    /// Any hit, critical included
    pub hit: f64,
    pub crit_hit: f64,
    /// Any wound, critical included
    pub wound: f64,
    pub crit_wound: f64,
    /// Chance a saving throw is failed
    pub save_fail: f64,
    /// Fraction of damage that gets through Feel No Pain
    pub fnp_pass: f64,
}

impl PhaseProbabilities {
    pub fn for_matchup(row: &WeaponProfile, defender: &Defender) -> Self {
        let (hit, crit_hit) = hit_probabilities(row, defender);
        let (wound, crit_wound) = wound_probabilities(row, defender);
        Self {
            hit,
            crit_hit,
            wound,
            crit_wound,
            save_fail: save_fail_probability(row, defender),
            fnp_pass: fnp_pass_fraction(defender),
        }
    }
}

fn hit_probabilities(row: &WeaponProfile, defender: &Defender) -> (f64, f64) {
    if row.torrent.is_set() {
        return (1.0, 0.0);
    }

    let skill = row.skill_roll();
    let modified = (skill + defender.stealth as u8).min(7);
    // An unmodified critical always hits, so its threshold never drops below skill
    let crit_threshold = row.crit_hit.clamp(2, 6).max(skill.min(6));

    let base_hit = roll_probability(modified);
    let base_crit = roll_probability(crit_threshold);

    let mode = row.reroll_hits;
    let crit = mode.apply_critical(base_crit, base_hit);
    let hit = mode.apply(base_hit).max(crit);
    (hit, crit)
}

fn wound_probabilities(row: &WeaponProfile, defender: &Defender) -> (f64, f64) {
    let Some(standard) = wound_requirement(row.strength, defender.toughness) else {
        return (0.0, 0.0);
    };

    let crit_threshold = row.crit_wound.clamp(2, 6);
    // Anti-X: a lower critical threshold also lowers the wound roll
    let required = standard.min(crit_threshold);

    let mode = if row.twin_linked.is_set() {
        row.reroll_wounds.max(RerollMode::Failed)
    } else {
        row.reroll_wounds
    };

    let base_wound = roll_probability(required);
    let crit = mode.apply_critical(roll_probability(crit_threshold), base_wound);
    let wound = mode.apply(base_wound).max(crit);
    (wound, crit)
}

fn save_fail_probability(row: &WeaponProfile, defender: &Defender) -> f64 {
    let armor =
        u32::from(defender.armor_save(row.ignores_cover.is_set())).saturating_add(row.ap);
    let invuln = defender.invuln.map(u32::from).unwrap_or(u32::MAX);
    let effective = armor.min(invuln);

    if effective > 6 {
        return 1.0;
    }
    // Saves are never better than 2+
    1.0 - roll_probability(effective.max(2) as u8)
}

fn fnp_pass_fraction(defender: &Defender) -> f64 {
    match defender.fnp {
        Some(fnp) => 1.0 - roll_probability(fnp.max(2)),
        None => 1.0,
    }
}

/// Expected outcome of one weapon row against one defender
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    pub weapon: WeaponProfile,
    pub attacks: f64,
    /// Hits going on to the wound roll (Sustained extras included)
    pub hits: f64,
    /// Wounds going on to the save roll (Lethal auto-wounds included)
    pub wounds: f64,
    /// Failed saves after Feel No Pain
    pub unsaved: f64,
    /// Devastating wounds after Feel No Pain
    pub mortal_events: f64,
    pub dead_models: f64,
    pub raw_damage: f64,
}

/// Resolve one weapon row against one defender
pub fn resolve(row: &WeaponProfile, defender: &Defender) -> ResolvedRow {
    let p = PhaseProbabilities::for_matchup(row, defender);
    let attacks = blast_attacks(&row.attacks, row.blast.is_set(), defender.unit_size).max(0.0);

    // === HIT ===
    let standard_hits = attacks * (p.hit - p.crit_hit).max(0.0);
    let crit_hits = attacks * p.crit_hit;
    let sustained_hits = crit_hits * row.sustained.value() as f64;
    let (auto_wounds, crits_rolling) = if row.lethal.is_set() {
        (crit_hits, 0.0)
    } else {
        (0.0, crit_hits)
    };
    let hits = standard_hits + crits_rolling + sustained_hits;

    // === WOUND ===
    let crit_wounds = hits * p.crit_wound;
    let standard_wounds = hits * (p.wound - p.crit_wound).max(0.0);
    let (mortal_wounds, crits_saving) = if row.devastating.is_set() {
        (crit_wounds, 0.0)
    } else {
        (0.0, crit_wounds)
    };
    let wounds = standard_wounds + auto_wounds + crits_saving;

    // === SAVE + FEEL NO PAIN ===
    let unsaved = wounds * p.save_fail * p.fnp_pass;
    let mortal_events = mortal_wounds * p.fnp_pass;

    // === ALLOCATION ===
    let per_model = defender.wounds.max(1.0);
    let capped_damage = row.damage.capped_mean(per_model);
    let kill_efficiency = (capped_damage / per_model).min(1.0);
    let dead_models = (unsaved * kill_efficiency + mortal_events * capped_damage / per_model)
        .clamp(0.0, defender.unit_size);
    let raw_damage = (unsaved + mortal_events) * row.damage.mean();

    tracing::trace!(
        "{} / {} vs {}: {:.3} dead, {:.3} damage",
        row.name,
        row.weapon,
        defender.name,
        dead_models,
        raw_damage
    );

    ResolvedRow {
        weapon: row.clone(),
        attacks,
        hits,
        wounds,
        unsaved,
        mortal_events,
        dead_models,
        raw_damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Flag, Magnitude, RerollMode, Threshold};
    use crate::profiles::target::TargetProfile;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn meq() -> Defender {
        TargetProfile::new("MEQ", 4, 2, "3+", 10, 18.0)
            .validate()
            .unwrap()
    }

    fn bolter() -> WeaponProfile {
        WeaponProfile::new("Squad", "Bolter", 100.0, "10", 3, 4, 0, "1")
    }

    #[test]
    fn test_wound_table() {
        assert_eq!(wound_requirement(8, 4), Some(2));
        assert_eq!(wound_requirement(5, 4), Some(3));
        assert_eq!(wound_requirement(4, 4), Some(4));
        assert_eq!(wound_requirement(3, 4), Some(5));
        assert_eq!(wound_requirement(2, 4), Some(6));
        assert_eq!(wound_requirement(3, 7), Some(6));
        assert_eq!(wound_requirement(0, 4), None);
    }

    #[test]
    fn test_extreme_stats_do_not_overflow() {
        assert_eq!(wound_requirement(4, 3_000_000_000), Some(6));
        assert_eq!(wound_requirement(u32::MAX, 3_000_000_000), Some(3));
        assert_eq!(wound_requirement(u32::MAX, u32::MAX), Some(4));

        let wall = TargetProfile::new("Wall", 3_000_000_000, 2, "3+", 10, 18.0)
            .validate()
            .unwrap();
        let result = resolve(&bolter(), &wall);
        assert!(result.dead_models > 0.0);

        let mut row = bolter();
        row.ap = u32::MAX;
        let p = PhaseProbabilities::for_matchup(&row, &meq());
        assert_eq!(p.save_fail, 1.0);
    }

    #[test]
    fn test_basic_bolter_vs_marines() {
        // 10 * 4/6 hits * 3/6 wounds * 2/6 failed saves, D1 into W2
        let result = resolve(&bolter(), &meq());
        let unsaved = 10.0 * (4.0 / 6.0) * 0.5 * (2.0 / 6.0);

        assert!(approx(result.unsaved, unsaved));
        assert!(approx(result.dead_models, unsaved * 0.5));
        assert!(approx(result.raw_damage, unsaved));
    }

    #[test]
    fn test_torrent_always_hits() {
        let mut row = bolter();
        row.torrent = Flag::ON;
        row.skill = Threshold::new(6);
        let stealthy = TargetProfile::new("MEQ", 4, 2, "3+", 10, 18.0)
            .with_stealth(true)
            .validate()
            .unwrap();

        let p = PhaseProbabilities::for_matchup(&row, &stealthy);
        assert_eq!(p.hit, 1.0);
        assert_eq!(p.crit_hit, 0.0);
    }

    #[test]
    fn test_stealth_is_minus_one_to_hit() {
        let plain = PhaseProbabilities::for_matchup(&bolter(), &meq());
        let mut defender = meq();
        defender.stealth = true;
        let stealthy = PhaseProbabilities::for_matchup(&bolter(), &defender);

        assert!(approx(plain.hit, 4.0 / 6.0));
        assert!(approx(stealthy.hit, 3.0 / 6.0));
        assert!(approx(stealthy.crit_hit, 1.0 / 6.0));
    }

    #[test]
    fn test_sustained_and_lethal_hits() {
        let mut sustained = bolter();
        sustained.sustained = Magnitude::Value(1);
        let plain = resolve(&bolter(), &meq());
        let with_sustained = resolve(&sustained, &meq());
        // One extra hit per critical
        assert!(approx(with_sustained.hits - plain.hits, 10.0 / 6.0));

        let mut lethal = bolter();
        lethal.lethal = Flag::ON;
        let with_lethal = resolve(&lethal, &meq());
        // Criticals skip the wound roll: 10/6 auto-wounds vs 10/6 * 1/2
        assert!(approx(with_lethal.wounds - plain.wounds, 10.0 / 6.0 * 0.5));
    }

    #[test]
    fn test_devastating_wounds_skip_saves() {
        let terminators = TargetProfile::new("TEQ", 5, 3, "2+", 5, 38.0)
            .with_invuln("4+")
            .validate()
            .unwrap();
        let mut row = WeaponProfile::new("Squad", "Gun", 100.0, "6", 3, 5, 0, "3");
        let plain = resolve(&row, &terminators);
        row.devastating = Flag::ON;
        let dev = resolve(&row, &terminators);

        assert!(dev.mortal_events > 0.0);
        assert!(dev.dead_models > plain.dead_models);
    }

    #[test]
    fn test_invulnerable_save_ignores_ap() {
        let mut row = bolter();
        row.ap = 4;
        let terminators = TargetProfile::new("TEQ", 5, 3, "2+", 5, 38.0)
            .with_invuln("4+")
            .validate()
            .unwrap();

        let p = PhaseProbabilities::for_matchup(&row, &terminators);
        assert!(approx(p.save_fail, 0.5));
    }

    #[test]
    fn test_save_never_better_than_two_up() {
        let mut defender = meq();
        defender.save = 2;
        defender.in_cover = true;

        let p = PhaseProbabilities::for_matchup(&bolter(), &defender);
        assert!(approx(p.save_fail, 1.0 / 6.0));
    }

    #[test]
    fn test_feel_no_pain_scales_all_damage() {
        let mut row = bolter();
        row.devastating = Flag::ON;
        let plain = resolve(&row, &meq());
        let mut defender = meq();
        defender.fnp = Some(5);
        let fnp = resolve(&row, &defender);

        let pass = 4.0 / 6.0;
        assert!(approx(fnp.unsaved, plain.unsaved * pass));
        assert!(approx(fnp.mortal_events, plain.mortal_events * pass));
    }

    #[test]
    fn test_twin_linked_rerolls_wounds() {
        let mut row = bolter();
        row.twin_linked = Flag::ON;
        let p = PhaseProbabilities::for_matchup(&row, &meq());

        assert!(approx(p.wound, 0.75));
        assert_eq!(row.reroll_wounds, RerollMode::None);
    }

    #[test]
    fn test_anti_lowers_wound_roll() {
        let mut row = WeaponProfile::new("Squad", "Anti-Infantry", 50.0, "1", 3, 1, 0, "1");
        row.crit_wound = 4;
        let p = PhaseProbabilities::for_matchup(&row, &meq());

        assert!(approx(p.wound, 0.5));
        assert!(approx(p.crit_wound, 0.5));
    }

    #[test]
    fn test_blast_scaling() {
        let d6 = Characteristic::dice(1, 6, 0);
        assert_eq!(blast_attacks(&d6, true, 5.0), 3.5);
        assert_eq!(blast_attacks(&d6, true, 6.0), 1.0);
        assert_eq!(blast_attacks(&d6, true, 8.0), 1.0);
        assert_eq!(blast_attacks(&d6, true, 10.0), 1.0);
        assert_eq!(blast_attacks(&d6, true, 11.0), 6.0);
        assert_eq!(blast_attacks(&d6, true, 15.0), 6.0);
        assert_eq!(blast_attacks(&Characteristic::dice(1, 6, 3), true, 20.0), 9.0);
        assert_eq!(blast_attacks(&Characteristic::dice(2, 6, 0), true, 12.0), 12.0);
        assert_eq!(blast_attacks(&Characteristic::dice(2, 6, 0), true, 7.0), 2.0);
        assert_eq!(blast_attacks(&d6, false, 20.0), 3.5);
        assert_eq!(blast_attacks(&Characteristic::Fixed(6.0), true, 20.0), 6.0);
    }

    #[test]
    fn test_damage_capped_at_model_wounds() {
        let row = WeaponProfile::new("Squad", "Lascannon", 100.0, "1", 2, 12, 3, "D6+1");
        let geq = TargetProfile::new("GEQ", 3, 1, "5+", 20, 6.0)
            .validate()
            .unwrap();
        let result = resolve(&row, &geq);

        // Each unsaved wound kills exactly one model, no more
        assert!(approx(result.dead_models, result.unsaved));
    }

    #[test]
    fn test_single_row_never_exceeds_unit_size() {
        let row = WeaponProfile::new("Horde", "Flamers", 100.0, "400", 2, 8, 3, "3");
        let result = resolve(&row, &meq());

        assert_eq!(result.dead_models, 10.0);
    }

    #[test]
    fn test_zero_attacks_or_strength_kill_nothing() {
        let no_attacks = WeaponProfile::new("Squad", "Nothing", 100.0, "0", 3, 4, 0, "1");
        let no_strength = WeaponProfile::new("Squad", "Feather", 100.0, "5", 3, 0, 0, "1");

        assert_eq!(resolve(&no_attacks, &meq()).dead_models, 0.0);
        assert_eq!(resolve(&no_strength, &meq()).dead_models, 0.0);
    }
}
