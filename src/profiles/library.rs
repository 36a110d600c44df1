//! Named, ordered collections of target profiles

use crate::profiles::target::TargetProfile;
use ahash::AHashMap;

/// An ordered list of targets addressable by short key ("MEQ", "TEQ", ...)
#[derive(Debug, Clone, Default)]
pub struct TargetLibrary {
    entries: Vec<(String, TargetProfile)>,
    index: AHashMap<String, usize>,
}

impl TargetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference profiles covering the common defensive archetypes
    pub fn builtin() -> Self {
        let mut library = Self::new();
        library.insert("GEQ", TargetProfile::new("Guardsmen (T3 1W)", 3, 1, "5+", 20, 6.0));
        library.insert("MEQ", TargetProfile::new("Marines (T4 2W)", 4, 2, "3+", 10, 18.0));
        library.insert(
            "TEQ",
            TargetProfile::new("Terminators (T5 3W)", 5, 3, "2+", 5, 38.0).with_invuln("4+"),
        );
        library.insert(
            "CUST",
            TargetProfile::new("Custodes (T6 3W)", 6, 3, "2+", 5, 50.0)
                .with_invuln("4+")
                .with_fnp("4+"),
        );
        library.insert("GRAV", TargetProfile::new("Gravis (T6 3W)", 6, 3, "3+", 6, 37.0));
        library.insert(
            "DG-PM",
            TargetProfile::new("Plague Marine (T5 2W)", 5, 2, "3+", 10, 18.0).with_fnp("6+"),
        );
        library.insert(
            "CTAN",
            TargetProfile::new("C'tan Shard (T11 12W)", 11, 12, "4+", 1, 255.0)
                .with_invuln("4+")
                .with_fnp("5+"),
        );
        library.insert("VEQ-L", TargetProfile::new("Rhino (T9 10W)", 9, 10, "3+", 1, 75.0));
        library.insert(
            "VEQ-H",
            TargetProfile::new("Land Raider (T12 16W)", 12, 16, "2+", 1, 240.0),
        );
        library.insert(
            "KEQ",
            TargetProfile::new("Knight (T12 22W)", 12, 22, "3+", 1, 425.0)
                .with_invuln("5+")
                .with_fnp("6+"),
        );
        library
    }

    /// Insert or replace a target, keeping the original position on replace
    pub fn insert(&mut self, key: &str, target: TargetProfile) {
        match self.index.get(key) {
            Some(&idx) => self.entries[idx].1 = target,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), target));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&TargetProfile> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetProfile)> {
        self.entries.iter().map(|(k, t)| (k.as_str(), t))
    }

    pub fn entries(&self) -> &[(String, TargetProfile)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
