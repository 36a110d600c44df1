//! Small value types shared by weapon and target profiles
//!
//! Roster sheets encode keyword toggles as `"Y"`/`"N"`, magnitudes as
//! integers (with a legacy `"Y"`), and thresholds as `"3+"`. These types
//! decode every accepted spelling and fall back to "off" on anything else.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A loosely typed cell as it arrives from a roster or target sheet
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawCell {
    /// Decode a cell, reading `null` as an empty cell
    pub(crate) fn decode<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Self>, D::Error> {
        Option::<RawCell>::deserialize(deserializer)
    }

    fn is_yes(text: &str) -> bool {
        matches!(
            text.trim().to_ascii_uppercase().as_str(),
            "Y" | "YES" | "TRUE"
        )
    }
}

/// Boolean keyword toggle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flag(pub bool);

impl Flag {
    pub const ON: Flag = Flag(true);
    pub const OFF: Flag = Flag(false);

    pub fn is_set(self) -> bool {
        self.0
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag(value)
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let set = match RawCell::decode(deserializer)? {
            Some(RawCell::Bool(b)) => b,
            Some(RawCell::Int(n)) => n != 0,
            Some(RawCell::Float(f)) => f != 0.0,
            Some(RawCell::Text(s)) => RawCell::is_yes(&s),
            None => false,
        };
        Ok(Flag(set))
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if self.0 { "Y" } else { "N" })
    }
}

/// Keyword magnitude such as Sustained Hits 2 or Melta 4
///
/// `Legacy` is the old boolean encoding (`"Y"` without a number). Each keyword
/// decides what a bare `"Y"` means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Magnitude {
    #[default]
    Off,
    Legacy,
    Value(u32),
}

impl Magnitude {
    pub fn is_active(self) -> bool {
        !matches!(self, Magnitude::Off | Magnitude::Value(0))
    }

    /// Numeric magnitude, counting the legacy encoding as 1
    pub fn value(self) -> u32 {
        match self {
            Magnitude::Off => 0,
            Magnitude::Legacy => 1,
            Magnitude::Value(n) => n,
        }
    }
}

impl From<u32> for Magnitude {
    fn from(value: u32) -> Self {
        if value == 0 {
            Magnitude::Off
        } else {
            Magnitude::Value(value)
        }
    }
}

impl<'de> Deserialize<'de> for Magnitude {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let magnitude = match RawCell::decode(deserializer)? {
            None | Some(RawCell::Bool(false)) => Magnitude::Off,
            Some(RawCell::Bool(true)) => Magnitude::Legacy,
            Some(RawCell::Int(n)) => Magnitude::from(u32::try_from(n.max(0)).unwrap_or(u32::MAX)),
            Some(RawCell::Float(f)) => Magnitude::from(f.max(0.0) as u32),
            Some(RawCell::Text(s)) => {
                if RawCell::is_yes(&s) {
                    Magnitude::Legacy
                } else {
                    s.trim()
                        .parse::<u32>()
                        .map(Magnitude::from)
                        .unwrap_or(Magnitude::Off)
                }
            }
        };
        Ok(magnitude)
    }
}

impl Serialize for Magnitude {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Magnitude::Legacy => serializer.serialize_str("Y"),
            other => serializer.serialize_u32(other.value()),
        }
    }
}

/// Which dice of a roll may be rerolled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RerollMode {
    #[default]
    None,
    Ones,
    Failed,
}

impl RerollMode {
    /// Success probability after rerolling
    pub fn apply(self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match self {
            RerollMode::None => p,
            RerollMode::Ones => p + p / 6.0,
            RerollMode::Failed => p + (1.0 - p) * p,
        }
        .min(1.0)
    }

    /// Critical probability after rerolling, given the roll's success chance
    ///
    /// Rerolled dice come from the failed pool, so a critical can be scored
    /// on the reroll as well as on the first roll.
    pub fn apply_critical(self, p_crit: f64, p_success: f64) -> f64 {
        let p_crit = p_crit.clamp(0.0, 1.0);
        let p_success = p_success.clamp(0.0, 1.0);
        match self {
            RerollMode::None => p_crit,
            RerollMode::Ones => p_crit + p_crit / 6.0,
            RerollMode::Failed => p_crit + (1.0 - p_success) * p_crit,
        }
        .min(1.0)
    }
}

impl<'de> Deserialize<'de> for RerollMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mode = match RawCell::decode(deserializer)? {
            Some(RawCell::Bool(true)) => RerollMode::Failed,
            Some(RawCell::Int(1)) => RerollMode::Ones,
            Some(RawCell::Text(s)) => match s.trim().to_ascii_uppercase().as_str() {
                "1" | "ONES" => RerollMode::Ones,
                "F" | "Y" | "FAILED" | "ALL" => RerollMode::Failed,
                _ => RerollMode::None,
            },
            _ => RerollMode::None,
        };
        Ok(mode)
    }
}

impl Serialize for RerollMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            RerollMode::None => "N",
            RerollMode::Ones => "1",
            RerollMode::Failed => "F",
        })
    }
}

/// A D6 roll target such as a save of `"3+"`
///
/// `None` means the roll is absent (no invulnerable save, no Feel No Pain).
/// Values above 6 can never be rolled and are treated as absent too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Threshold(pub Option<u8>);

impl Threshold {
    pub const NONE: Threshold = Threshold(None);

    pub fn new(value: u8) -> Self {
        Threshold(Some(value))
    }

    /// The roll needed, if it can be made on a D6
    pub fn roll(self) -> Option<u8> {
        self.0.filter(|v| (1..=6).contains(v))
    }

    /// Parse `"3+"`, `"3"`, or a "none" marker (`""`, `"N"`, `"-"`)
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim().trim_end_matches('+');
        Threshold(trimmed.parse::<u8>().ok().filter(|v| *v > 0))
    }
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let threshold = match RawCell::decode(deserializer)? {
            Some(RawCell::Int(n)) if (1..=u8::MAX as i64).contains(&n) => Threshold::new(n as u8),
            Some(RawCell::Float(f)) if f >= 1.0 && f <= u8::MAX as f64 => Threshold::new(f as u8),
            Some(RawCell::Text(s)) => Threshold::parse(&s),
            _ => Threshold::NONE,
        };
        Ok(threshold)
    }
}

impl Serialize for Threshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(v) => serializer.serialize_str(&format!("{}+", v)),
            None => serializer.serialize_str(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_accepts_sheet_spellings() {
        let flags: Vec<Flag> = serde_json::from_str(r#"["Y", "N", true, "yes", "", 1]"#).unwrap();
        let set: Vec<bool> = flags.iter().map(|f| f.is_set()).collect();
        assert_eq!(set, vec![true, false, true, true, false, true]);
    }

    #[test]
    fn test_magnitude_legacy_yes() {
        let m: Vec<Magnitude> = serde_json::from_str(r#"["Y", "N", 2, "3", 0]"#).unwrap();
        assert_eq!(
            m,
            vec![
                Magnitude::Legacy,
                Magnitude::Off,
                Magnitude::Value(2),
                Magnitude::Value(3),
                Magnitude::Off
            ]
        );
        assert_eq!(Magnitude::Legacy.value(), 1);
    }

    #[test]
    fn test_null_cells_are_neutral() {
        let flags: Vec<Flag> = serde_json::from_str("[null]").unwrap();
        let magnitudes: Vec<Magnitude> = serde_json::from_str("[null]").unwrap();
        let modes: Vec<RerollMode> = serde_json::from_str("[null]").unwrap();
        let thresholds: Vec<Threshold> = serde_json::from_str("[null]").unwrap();

        assert_eq!(flags, vec![Flag::OFF]);
        assert_eq!(magnitudes, vec![Magnitude::Off]);
        assert_eq!(modes, vec![RerollMode::None]);
        assert_eq!(thresholds, vec![Threshold::NONE]);
    }

    #[test]
    fn test_reroll_failed_transform() {
        let p = 0.5;
        assert!((RerollMode::Failed.apply(p) - 0.75).abs() < 1e-9);
        assert!((RerollMode::Ones.apply(p) - 0.5 * 7.0 / 6.0).abs() < 1e-9);
        assert_eq!(RerollMode::None.apply(1.5), 1.0);
    }

    #[test]
    fn test_threshold_parsing() {
        assert_eq!(Threshold::parse("3+").roll(), Some(3));
        assert_eq!(Threshold::parse("5").roll(), Some(5));
        assert_eq!(Threshold::parse("N").roll(), None);
        assert_eq!(Threshold::parse("").roll(), None);
        assert_eq!(Threshold::parse("7+").roll(), None);
    }
}
