//! Exercise catalog - backend entries plus built-in workout presets

use serde::{Deserialize, Serialize};

/// Rest between sets when nothing else is specified
pub const DEFAULT_REST_SECS: u32 = 120;

/// Muscle group of entries the backend did not classify
pub const UNKNOWN_GROUP: &str = "Unknown";

/// One exercise from the backend catalog (`GET /exercises`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "unknown_group")]
    pub muscle_group: String,
}

fn unknown_group() -> String {
    UNKNOWN_GROUP.to_string()
}

impl CatalogEntry {
    /// Stand-in used when the catalog has no entry for `id`
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            name: format!("Exercise #{}", id),
            description: None,
            muscle_group: unknown_group(),
        }
    }
}

/// Fetched catalog with lookup helpers
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: i64) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Lookup that never fails: unknown ids resolve to a placeholder
    pub fn resolve(&self, id: i64) -> CatalogEntry {
        self.find(id)
            .cloned()
            .unwrap_or_else(|| CatalogEntry::placeholder(id))
    }

    /// Entries whose muscle group matches `group` (case-insensitive)
    pub fn by_muscle_group(&self, group: &str) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.muscle_group.eq_ignore_ascii_case(group))
            .collect()
    }
}

/// Built-in workout preset, usable without the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Push,
    Pull,
    Legs,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Push => "Push",
            Preset::Pull => "Pull",
            Preset::Legs => "Legs",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Push => "Pushing movements: chest, shoulders and triceps",
            Preset::Pull => "Pulling movements: back and biceps",
            Preset::Legs => "Quads, hamstrings and calves",
        }
    }

    pub fn exercises(&self) -> &'static [PresetExercise] {
        match self {
            Preset::Push => PUSH,
            Preset::Pull => PULL,
            Preset::Legs => LEGS,
        }
    }

    pub fn all() -> &'static [Preset] {
        &[Preset::Push, Preset::Pull, Preset::Legs]
    }

    pub fn parse(s: &str) -> Option<Preset> {
        Preset::all()
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Debug, Clone)]
pub struct PresetExercise {
    pub id: i64,
    pub name: &'static str,
    pub muscle_group: &'static str,
    pub sets: u32,
}

impl PresetExercise {
    pub fn to_entry(&self) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            name: self.name.to_string(),
            description: None,
            muscle_group: self.muscle_group.to_string(),
        }
    }
}

const PUSH: &[PresetExercise] = &[
    PresetExercise { id: 1, name: "Chest Press", muscle_group: "Chest", sets: 3 },
    PresetExercise { id: 4, name: "Incline Bench Press", muscle_group: "Chest", sets: 3 },
    PresetExercise { id: 15, name: "Overhead Press", muscle_group: "Shoulders", sets: 3 },
];

const PULL: &[PresetExercise] = &[
    PresetExercise { id: 10, name: "Pull-Up", muscle_group: "Back", sets: 3 },
    PresetExercise { id: 11, name: "Lat Pulldown", muscle_group: "Back", sets: 3 },
    PresetExercise { id: 13, name: "Barbell Row", muscle_group: "Back", sets: 3 },
];

const LEGS: &[PresetExercise] = &[
    PresetExercise { id: 2, name: "Squats", muscle_group: "Legs", sets: 3 },
    PresetExercise { id: 6, name: "Leg Press", muscle_group: "Legs", sets: 3 },
    PresetExercise { id: 7, name: "Lunges", muscle_group: "Legs", sets: 3 },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, name: &str, group: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            name: name.to_string(),
            description: None,
            muscle_group: group.to_string(),
        }
    }

    #[test]
    fn test_catalog_entry_decodes_backend_shape() {
        let json = r#"{"id": 3, "name": "Deadlift", "description": "Hinge", "muscle_group": "Back"}"#;
        let e: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(e.id, 3);
        assert_eq!(e.muscle_group, "Back");
        assert_eq!(e.description.as_deref(), Some("Hinge"));
    }

    #[test]
    fn test_catalog_entry_missing_group_is_unknown() {
        let e: CatalogEntry = serde_json::from_str(r#"{"id": 9, "name": "Plank"}"#).unwrap();
        assert_eq!(e.muscle_group, "Unknown");
        assert!(e.description.is_none());
    }

    #[test]
    fn test_resolve_unknown_id_gives_placeholder() {
        let catalog = Catalog::new(vec![entry(1, "Squat", "Legs")]);
        assert_eq!(catalog.resolve(1).name, "Squat");
        let missing = catalog.resolve(42);
        assert_eq!(missing.name, "Exercise #42");
        assert_eq!(missing.muscle_group, "Unknown");
    }

    #[test]
    fn test_by_muscle_group_case_insensitive() {
        let catalog = Catalog::new(vec![
            entry(1, "Squat", "Legs"),
            entry(2, "Row", "Back"),
            entry(3, "Lunge", "legs"),
        ]);
        let legs = catalog.by_muscle_group("LEGS");
        assert_eq!(legs.len(), 2);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(Preset::parse("push"), Some(Preset::Push));
        assert_eq!(Preset::parse(" Legs "), Some(Preset::Legs));
        assert_eq!(Preset::parse("arms"), None);
    }

    #[test]
    fn test_presets_have_unique_ids() {
        for preset in Preset::all() {
            let mut ids: Vec<_> = preset.exercises().iter().map(|e| e.id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), preset.exercises().len(), "{:?}", preset);
        }
    }
}
