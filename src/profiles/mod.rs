//! Attacker and defender input records

pub mod library;
pub mod target;
pub mod weapon;

pub use library::TargetLibrary;
pub use target::{Defender, TargetProfile};
pub use weapon::WeaponProfile;
