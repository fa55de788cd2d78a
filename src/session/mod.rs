//! Workout session - exercises, sets and set-completion events
//!
//! The session is the single owner of the exercise/set list for the
//! workout being built or performed. Completing a set yields a
//! [`CompletionEvent`] that the caller hands to the rest timer.
//!
//! Indexing: exercises are addressed by position (0-based), sets by their
//! 1-based `index`. Out-of-range indices are caller bugs and panic.

pub mod payload;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::exercises::{Catalog, CatalogEntry, DEFAULT_REST_SECS, Preset, UNKNOWN_GROUP};
pub use payload::{
    ExercisePerformance, PerformanceData, SavePayload, SetPerformance, TemplateExercise,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("exercise {id} is already in this workout")]
    DuplicateExercise { id: i64 },
    #[error("no sets to remove")]
    NoSetsToRemove,
}

/// One block of reps within an exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Set {
    pub index: u32,
    pub weight: u32,
    pub reps: u32,
    pub completed: bool,
    pub rest_duration_secs: u32,
}

impl Set {
    fn new(index: u32, rest_duration_secs: u32) -> Self {
        Self {
            index,
            weight: 0,
            reps: 0,
            completed: false,
            rest_duration_secs,
        }
    }

    pub fn volume(&self) -> u64 {
        u64::from(self.weight) * u64::from(self.reps)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub muscle_group: String,
    pub default_rest_secs: u32,
    pub sets: Vec<Set>,
}

impl Exercise {
    fn from_entry(entry: &CatalogEntry, default_rest_secs: u32) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            muscle_group: entry.muscle_group.clone(),
            default_rest_secs,
            sets: Vec::new(),
        }
    }

    fn push_set(&mut self) -> &mut Set {
        let index = self.sets.len() as u32 + 1;
        self.sets.push(Set::new(index, self.default_rest_secs));
        let last = self.sets.len() - 1;
        &mut self.sets[last]
    }
}

/// Which field of a set an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Weight,
    Reps,
    Completed,
    Rest,
}

/// Single-field edit of a set
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetUpdate {
    Weight(f64),
    Reps(f64),
    Completed(bool),
    /// Rest after the set, in seconds; never below one second
    Rest(f64),
}

impl SetUpdate {
    /// Build an update from raw text input. Unparseable numbers become 0.
    /// Rest accepts plain seconds or `M:SS`.
    pub fn parse(field: SetField, raw: &str) -> Self {
        let raw = raw.trim();
        match field {
            SetField::Rest => SetUpdate::Rest(parse_duration(raw)),
            SetField::Weight => SetUpdate::Weight(raw.parse().unwrap_or(0.0)),
            SetField::Reps => SetUpdate::Reps(raw.parse().unwrap_or(0.0)),
            SetField::Completed => SetUpdate::Completed(matches!(
                raw.to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "y"
            )),
        }
    }
}

fn parse_duration(raw: &str) -> f64 {
    match raw.split_once(':') {
        Some((mins, secs)) => {
            let mins: f64 = mins.trim().parse().unwrap_or(0.0);
            let secs: f64 = secs.trim().parse().unwrap_or(0.0);
            mins.max(0.0) * 60.0 + secs.max(0.0)
        }
        None => raw.parse().unwrap_or(0.0),
    }
}

/// Clamp a numeric input to a non-negative integer
pub fn coerce_count(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX
    value.floor() as u32
}

fn template_entry(row: &TemplateExercise, catalog: &Catalog) -> CatalogEntry {
    let missing_name = row.name.trim().is_empty();
    let missing_group = row.musclegroup.trim().is_empty() || row.musclegroup == UNKNOWN_GROUP;
    let mut entry = CatalogEntry {
        id: row.exerciseid,
        name: row.name.clone(),
        description: row.description.clone(),
        muscle_group: row.musclegroup.clone(),
    };
    if missing_name || missing_group {
        let resolved = catalog.resolve(row.exerciseid);
        if missing_name {
            entry.name = resolved.name;
        }
        if missing_group {
            entry.muscle_group = resolved.muscle_group;
        }
        entry.description = entry.description.or(resolved.description);
    }
    entry
}

/// Emitted when a set goes from incomplete to complete
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionEvent {
    pub exercise_id: i64,
    pub exercise_name: String,
    pub set_index: u32,
    pub rest_duration_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    name: String,
    description: String,
    workout_id: Option<i64>,
    exercises: Vec<Exercise>,
}

impl Default for WorkoutSession {
    fn default() -> Self {
        Self::empty()
    }
}

impl WorkoutSession {
    pub fn empty() -> Self {
        Self {
            name: "Workout".to_string(),
            description: String::new(),
            workout_id: None,
            exercises: Vec::new(),
        }
    }

    /// Seed from backend template rows: `sets` sets per row (at least one),
    /// reps preset from the row. Rows missing a name or muscle group are
    /// filled in from `catalog`; a repeated exercise id is skipped.
    pub fn from_template(rows: &[TemplateExercise], catalog: &Catalog) -> Self {
        let mut session = Self::empty();
        for row in rows {
            if session.exercises.iter().any(|e| e.id == row.exerciseid) {
                warn!(id = row.exerciseid, "duplicate template row skipped");
                continue;
            }
            let rest = if row.resttime > 0 { row.resttime } else { DEFAULT_REST_SECS };
            let mut exercise = Exercise::from_entry(&template_entry(row, catalog), rest);
            for _ in 0..row.sets.max(1) {
                exercise.push_set().reps = row.reps;
            }
            session.exercises.push(exercise);
        }
        session
    }

    pub fn from_preset(preset: Preset) -> Self {
        let mut session = Self::empty().with_name(preset.name(), preset.description());
        for ex in preset.exercises() {
            let mut exercise = Exercise::from_entry(&ex.to_entry(), DEFAULT_REST_SECS);
            for _ in 0..ex.sets {
                exercise.push_set();
            }
            session.exercises.push(exercise);
        }
        session
    }

    pub fn with_workout_id(mut self, id: i64) -> Self {
        self.workout_id = Some(id);
        self
    }

    pub fn with_name(mut self, name: &str, description: &str) -> Self {
        self.name = name.to_string();
        self.description = description.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workout_id(&self) -> Option<i64> {
        self.workout_id
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn exercise(&self, exercise_idx: usize) -> &Exercise {
        self.check_exercise(exercise_idx);
        &self.exercises[exercise_idx]
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn completed_sets(&self) -> usize {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .count()
    }

    /// Sum of weight x reps over completed sets
    pub fn total_volume(&self) -> u64 {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .map(Set::volume)
            .sum()
    }

    /// Append an exercise with one default set
    pub fn add_exercise(&mut self, entry: &CatalogEntry) -> Result<(), SessionError> {
        if self.exercises.iter().any(|e| e.id == entry.id) {
            return Err(SessionError::DuplicateExercise { id: entry.id });
        }
        let mut exercise = Exercise::from_entry(entry, DEFAULT_REST_SECS);
        exercise.push_set();
        debug!(id = entry.id, name = %entry.name, "exercise added");
        self.exercises.push(exercise);
        Ok(())
    }

    /// Append a fresh set; returns its 1-based index
    pub fn add_set(&mut self, exercise_idx: usize) -> u32 {
        self.exercise_mut(exercise_idx).push_set().index
    }

    /// Apply `update` to one set. Returns an event only on incomplete -> complete.
    pub fn update_set(
        &mut self,
        exercise_idx: usize,
        set_index: u32,
        update: SetUpdate,
    ) -> Option<CompletionEvent> {
        let set = self.set_mut(exercise_idx, set_index);
        match update {
            SetUpdate::Weight(v) => set.weight = coerce_count(v),
            SetUpdate::Reps(v) => set.reps = coerce_count(v),
            SetUpdate::Rest(v) => set.rest_duration_secs = coerce_count(v).max(1),
            SetUpdate::Completed(done) => {
                let was_done = set.completed;
                set.completed = done;
                if done && !was_done {
                    return Some(self.to_completion_event(exercise_idx, set_index));
                }
            }
        }
        None
    }

    /// Remove the last set. An exercise always keeps at least one set.
    pub fn remove_set(&mut self, exercise_idx: usize) -> Result<Set, SessionError> {
        let exercise = self.exercise_mut(exercise_idx);
        if exercise.sets.len() <= 1 {
            return Err(SessionError::NoSetsToRemove);
        }
        exercise.sets.pop().ok_or(SessionError::NoSetsToRemove)
    }

    pub fn remove_exercise(&mut self, exercise_idx: usize) -> Exercise {
        self.check_exercise(exercise_idx);
        self.exercises.remove(exercise_idx)
    }

    pub fn to_completion_event(&self, exercise_idx: usize, set_index: u32) -> CompletionEvent {
        let exercise = self.exercise(exercise_idx);
        let set = Self::find_set(exercise, set_index);
        CompletionEvent {
            exercise_id: exercise.id,
            exercise_name: exercise.name.clone(),
            set_index: set.index,
            rest_duration_secs: set.rest_duration_secs,
        }
    }

    /// Payload for `POST /saveworkout`
    pub fn serialize(&self, user_id: i64) -> SavePayload {
        SavePayload {
            name: self.name.clone(),
            description: self.description.clone(),
            user_id,
            exercises: self
                .exercises
                .iter()
                .map(|e| ExercisePerformance {
                    exercise_id: e.id,
                    performance_data: PerformanceData {
                        sets: e
                            .sets
                            .iter()
                            .map(|s| SetPerformance {
                                set: s.index,
                                reps: s.reps,
                                weight: s.weight,
                                time: s.rest_duration_secs,
                            })
                            .collect(),
                    },
                })
                .collect(),
        }
    }

    fn check_exercise(&self, exercise_idx: usize) {
        assert!(
            exercise_idx < self.exercises.len(),
            "exercise index {} out of range ({} exercises)",
            exercise_idx,
            self.exercises.len()
        );
    }

    fn exercise_mut(&mut self, exercise_idx: usize) -> &mut Exercise {
        self.check_exercise(exercise_idx);
        &mut self.exercises[exercise_idx]
    }

    fn find_set(exercise: &Exercise, set_index: u32) -> &Set {
        assert!(
            set_index >= 1 && (set_index as usize) <= exercise.sets.len(),
            "set {} out of range for {} ({} sets)",
            set_index,
            exercise.name,
            exercise.sets.len()
        );
        &exercise.sets[set_index as usize - 1]
    }

    fn set_mut(&mut self, exercise_idx: usize, set_index: u32) -> &mut Set {
        let exercise = self.exercise_mut(exercise_idx);
        assert!(
            set_index >= 1 && (set_index as usize) <= exercise.sets.len(),
            "set {} out of range for {} ({} sets)",
            set_index,
            exercise.name,
            exercise.sets.len()
        );
        &mut exercise.sets[set_index as usize - 1]
    }
}
