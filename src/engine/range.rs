//! Range-variant expansion for Melta and Rapid Fire weapons
//!
//! A range-conditional weapon is either at half range (bonuses apply) or not.
//! Without a fixed half-range assumption both states are produced as sibling
//! rows that compete for the same exclusivity slot, so only the better one
//! is counted.

use crate::core::types::Magnitude;
use crate::profiles::weapon::WeaponProfile;

pub const CLOSE_SUFFIX: &str = " (close)";
pub const FAR_SUFFIX: &str = " (far)";

/// Expand one row into its engagement states
pub fn expand(row: &WeaponProfile, assume_half_range: bool) -> Vec<WeaponProfile> {
    if !row.is_range_conditional() {
        return vec![row.clone()];
    }

    if assume_half_range {
        return vec![close_variant(row)];
    }

    let tag = if row.is_exclusive() {
        row.profile_id.clone()
    } else {
        format!("Range:{}", row.weapon)
    };

    let mut close = close_variant(row);
    close.weapon.push_str(CLOSE_SUFFIX);
    close.profile_id = tag.clone();

    let mut far = far_variant(row);
    far.weapon.push_str(FAR_SUFFIX);
    far.profile_id = tag;

    vec![close, far]
}

/// Expand every row, preserving input order
pub fn expand_all(rows: &[WeaponProfile], assume_half_range: bool) -> Vec<WeaponProfile> {
    rows.iter()
        .flat_map(|row| expand(row, assume_half_range))
        .collect()
}

/// Half range: Rapid Fire adds attacks, Melta adds flat damage
fn close_variant(row: &WeaponProfile) -> WeaponProfile {
    let mut close = far_variant(row);

    close.attacks = match row.rapid_fire {
        Magnitude::Off => row.attacks,
        // Legacy "Y" doubled the attacks outright
        Magnitude::Legacy => row.attacks.times(2),
        Magnitude::Value(n) => row.attacks.plus(n),
    };

    if row.melta.is_active() {
        close.damage = row.damage.plus(row.melta.value());
    }

    close
}

fn far_variant(row: &WeaponProfile) -> WeaponProfile {
    let mut far = row.clone();
    far.melta = Magnitude::Off;
    far.rapid_fire = Magnitude::Off;
    far
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dice::Characteristic;

    fn bolter() -> WeaponProfile {
        WeaponProfile::new("Tactical Squad", "Bolter", 100.0, "2", 3, 4, 0, "1")
    }

    #[test]
    fn test_plain_weapon_passes_through() {
        let row = bolter();
        let expanded = expand(&row, false);

        assert_eq!(expanded, vec![row]);
    }

    #[test]
    fn test_rapid_fire_splits_close_and_far() {
        let mut row = bolter();
        row.rapid_fire = Magnitude::Value(2);

        let expanded = expand(&row, false);
        assert_eq!(expanded.len(), 2);

        let (close, far) = (&expanded[0], &expanded[1]);
        assert_eq!(close.weapon, "Bolter (close)");
        assert_eq!(far.weapon, "Bolter (far)");
        assert_eq!(close.attacks, Characteristic::Fixed(4.0));
        assert_eq!(far.attacks, Characteristic::Fixed(2.0));
        assert_eq!(close.profile_id, far.profile_id);
        assert!(!close.is_range_conditional());
    }

    #[test]
    fn test_siblings_inherit_existing_tag() {
        let mut row = bolter().with_profile_id("Combi");
        row.melta = Magnitude::Value(2);

        for variant in expand(&row, false) {
            assert_eq!(variant.profile_id, "Combi");
        }
    }

    #[test]
    fn test_half_range_produces_single_unsuffixed_row() {
        let mut row = bolter();
        row.rapid_fire = Magnitude::Value(2);

        let expanded = expand(&row, true);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].weapon, "Bolter");
        assert_eq!(expanded[0].attacks, Characteristic::Fixed(4.0));
        assert!(expanded[0].profile_id.is_empty());
    }

    #[test]
    fn test_legacy_encodings() {
        let mut rapid = bolter();
        rapid.attacks = Characteristic::dice(1, 6, 0);
        rapid.rapid_fire = Magnitude::Legacy;
        assert_eq!(expand(&rapid, true)[0].attacks, Characteristic::dice(2, 6, 0));

        let mut melta = WeaponProfile::new("Squad", "Meltagun", 90.0, "1", 3, 9, 4, "D6");
        melta.melta = Magnitude::Legacy;
        assert_eq!(expand(&melta, true)[0].damage, Characteristic::dice(1, 6, 1));
    }
}
