//! Expected values of numeric-or-dice characteristics
//!
//! Parses notation like "3", "D6", "2D6+1", "D3-1" and reduces it to a
//! deterministic expectation. Nothing is ever rolled.

use crate::core::types::RawCell;
use nom::character::complete::{digit1, one_of};
use nom::combinator::{all_consuming, map_res, opt};
use nom::{IResult, Parser};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest die enumerated exactly by `capped_mean`
pub const MAX_EXACT_FACES: u32 = 20;

/// A weapon characteristic: either a fixed number or a dice expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Characteristic {
    Fixed(f64),
    Dice { count: u32, faces: u32, modifier: i32 },
}

impl Default for Characteristic {
    fn default() -> Self {
        Characteristic::Fixed(1.0)
    }
}

impl Characteristic {
    pub fn dice(count: u32, faces: u32, modifier: i32) -> Self {
        Characteristic::Dice {
            count,
            faces,
            modifier,
        }
    }

    /// Arithmetic mean, never negative
    pub fn mean(&self) -> f64 {
        match *self {
            Characteristic::Fixed(v) => v.max(0.0),
            Characteristic::Dice {
                count,
                faces,
                modifier,
            } => (count as f64 * (faces as f64 + 1.0) / 2.0 + modifier as f64).max(0.0),
        }
    }

    /// Mean of `min(roll, cap)`
    ///
    /// One and two dice of up to `MAX_EXACT_FACES` faces are enumerated
    /// exactly. Anything larger uses the capped linear mean.
    pub fn capped_mean(&self, cap: f64) -> f64 {
        let cap = cap.max(0.0);
        match *self {
            Characteristic::Fixed(v) => v.max(0.0).min(cap),
            Characteristic::Dice {
                count,
                faces,
                modifier,
            } => match (count, faces) {
                (0, _) | (_, 0) => (modifier as f64).max(0.0).min(cap),
                (_, f) if f > MAX_EXACT_FACES => self.mean().min(cap),
                (1, _) => {
                    let total: f64 = (1..=faces)
                        .map(|r| clamp_roll(r as i64 + modifier as i64, cap))
                        .sum();
                    total / faces as f64
                }
                (2, _) => {
                    let mut total = 0.0;
                    for r1 in 1..=faces {
                        for r2 in 1..=faces {
                            total += clamp_roll(r1 as i64 + r2 as i64 + modifier as i64, cap);
                        }
                    }
                    total / (faces as f64 * faces as f64)
                }
                _ => self.mean().min(cap),
            },
        }
    }

    /// Lowest possible roll
    pub fn minimum(&self) -> f64 {
        match *self {
            Characteristic::Fixed(v) => v.max(0.0),
            Characteristic::Dice {
                count, modifier, ..
            } => (count as i64 + modifier as i64).max(0) as f64,
        }
    }

    /// Highest possible roll
    pub fn maximum(&self) -> f64 {
        match *self {
            Characteristic::Fixed(v) => v.max(0.0),
            Characteristic::Dice {
                count,
                faces,
                modifier,
            } => (count as i64 * faces as i64 + modifier as i64).max(0) as f64,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Characteristic::Fixed(_))
    }

    /// Add a flat bonus (Melta damage, Rapid Fire attacks)
    pub fn plus(&self, bonus: u32) -> Self {
        match *self {
            Characteristic::Fixed(v) => Characteristic::Fixed(v + bonus as f64),
            Characteristic::Dice {
                count,
                faces,
                modifier,
            } => Characteristic::Dice {
                count,
                faces,
                modifier: modifier.saturating_add(i32::try_from(bonus).unwrap_or(i32::MAX)),
            },
        }
    }

    /// Multiply the whole expression, e.g. legacy Rapid Fire doubling
    pub fn times(&self, factor: u32) -> Self {
        match *self {
            Characteristic::Fixed(v) => Characteristic::Fixed(v * factor as f64),
            Characteristic::Dice {
                count,
                faces,
                modifier,
            } => Characteristic::Dice {
                count: count.saturating_mul(factor),
                faces,
                modifier: modifier.saturating_mul(factor as i32),
            },
        }
    }

    /// Parse leniently: malformed notation becomes zero
    pub fn parse_or_zero(text: &str) -> Self {
        text.parse().unwrap_or_else(|e| {
            tracing::debug!("Treating characteristic '{}' as 0: {}", text, e);
            Characteristic::Fixed(0.0)
        })
    }
}

fn clamp_roll(roll: i64, cap: f64) -> f64 {
    (roll.max(0) as f64).min(cap)
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>).parse(input)
}

fn dice_notation(input: &str) -> IResult<&str, Characteristic> {
    let (rest, (count, _, faces, modifier)) =
        (opt(number), one_of("dD"), number, opt((one_of("+-"), number))).parse(input)?;

    let modifier = match modifier {
        Some(('-', m)) => -(m as i32),
        Some((_, m)) => m as i32,
        None => 0,
    };

    Ok((rest, Characteristic::dice(count.unwrap_or(1), faces, modifier)))
}

impl FromStr for Characteristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        if compact.is_empty() {
            return Err("Empty characteristic".to_string());
        }

        if let Ok(value) = compact.parse::<f64>() {
            if value.is_finite() {
                return Ok(Characteristic::Fixed(value));
            }
            return Err(format!("Non-finite value: {}", s));
        }

        let (_, parsed) = all_consuming(dice_notation)
            .parse(compact.as_str())
            .map_err(|_| format!("Invalid dice notation: {}", s))?;

        match parsed {
            Characteristic::Dice { count: 0, .. } => Err("Dice count must be at least 1".to_string()),
            Characteristic::Dice { faces: 0, .. } => Err("Die faces must be at least 1".to_string()),
            ok => Ok(ok),
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Characteristic::Fixed(v) => write!(f, "{}", v),
            Characteristic::Dice {
                count,
                faces,
                modifier,
            } => {
                if count != 1 {
                    write!(f, "{}", count)?;
                }
                write!(f, "D{}", faces)?;
                if modifier > 0 {
                    write!(f, "+{}", modifier)
                } else if modifier < 0 {
                    write!(f, "{}", modifier)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Characteristic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let characteristic = match RawCell::decode(deserializer)? {
            Some(RawCell::Int(n)) => Characteristic::Fixed(n as f64),
            Some(RawCell::Float(f)) if f.is_finite() => Characteristic::Fixed(f),
            Some(RawCell::Text(s)) => Characteristic::parse_or_zero(&s),
            Some(RawCell::Float(_)) | Some(RawCell::Bool(_)) => Characteristic::Fixed(0.0),
            None => Characteristic::default(),
        };
        Ok(characteristic)
    }
}

impl Serialize for Characteristic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Characteristic::Fixed(v) => serializer.serialize_f64(v),
            dice => serializer.serialize_str(&dice.to_string()),
        }
    }
}

/// Expected value of a characteristic string, optionally capped
///
/// Malformed input yields 0.
pub fn expected_value(characteristic: &str, cap: Option<f64>) -> f64 {
    let parsed = Characteristic::parse_or_zero(characteristic);
    match cap {
        Some(cap) => parsed.capped_mean(cap),
        None => parsed.mean(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fixed_values() {
        assert!(approx(expected_value("3", None), 3.0));
        assert!(approx(expected_value("2.5", None), 2.5));
        assert!(approx(expected_value("6", Some(2.0)), 2.0));
    }

    #[test]
    fn test_dice_means() {
        assert!(approx(expected_value("D6", None), 3.5));
        assert!(approx(expected_value("D3", None), 2.0));
        assert!(approx(expected_value("2D6", None), 7.0));
        assert!(approx(expected_value("2D6+1", None), 8.0));
        assert!(approx(expected_value("d6+2", None), 5.5));
        assert!(approx(expected_value("D3-1", None), 1.0));
    }

    #[test]
    fn test_single_die_capped_exactly() {
        // min(r, 2) over 1..=6 = 1 + 2 * 5 = 11
        assert!(approx(expected_value("D6", Some(2.0)), 11.0 / 6.0));
        // min(r + 2, 3) over 1..=6 = 3 * 6
        assert!(approx(expected_value("D6+2", Some(3.0)), 3.0));
    }

    #[test]
    fn test_two_dice_capped_exactly() {
        // Only a double one (1/36) totals below 3
        let expected = (2.0 + 35.0 * 3.0) / 36.0;
        assert!(approx(expected_value("2D6", Some(3.0)), expected));
    }

    #[test]
    fn test_many_dice_capped_linear() {
        assert!(approx(expected_value("3D6", Some(12.0)), 10.5));
        assert!(approx(expected_value("3D6", Some(8.0)), 8.0));
    }

    #[test]
    fn test_oversized_dice_use_linear_mean() {
        // 2D40000 would be 1.6 billion outcomes to enumerate
        assert!(approx(expected_value("2D40000", Some(2.0)), 2.0));
        assert!(approx(expected_value("D1000000", Some(3.0)), 3.0));
        assert!(approx(expected_value("2D1000000", None), 1_000_001.0));
        // D20 is still exact: min(r, 2) over 1..=20 = 1 + 2 * 19
        assert!(approx(expected_value("D20", Some(2.0)), 39.0 / 20.0));
    }

    #[test]
    fn test_malformed_is_zero() {
        assert_eq!(expected_value("banana", None), 0.0);
        assert_eq!(expected_value("D", None), 0.0);
        assert_eq!(expected_value("2D6+", Some(3.0)), 0.0);
        assert_eq!(expected_value("", None), 0.0);
        assert_eq!(expected_value("0D6", None), 0.0);
    }

    #[test]
    fn test_min_max_and_bonus() {
        let d6_plus_3: Characteristic = "D6+3".parse().unwrap();
        assert_eq!(d6_plus_3.minimum(), 4.0);
        assert_eq!(d6_plus_3.maximum(), 9.0);
        assert_eq!(d6_plus_3.plus(2).to_string(), "D6+5");
        assert_eq!(
            "2D6".parse::<Characteristic>().unwrap().times(2).to_string(),
            "4D6"
        );
    }
}
