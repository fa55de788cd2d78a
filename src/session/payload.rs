//! Wire shapes exchanged with the backend for templates and saves

use serde::{Deserialize, Serialize};

/// Row of `GET /workout{id}/exerciseData`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateExercise {
    pub exerciseid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "unknown_group")]
    pub musclegroup: String,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub resttime: u32,
}

fn unknown_group() -> String {
    crate::exercises::UNKNOWN_GROUP.to_string()
}

/// Body of `POST /saveworkout`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavePayload {
    pub name: String,
    pub description: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub exercises: Vec<ExercisePerformance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExercisePerformance {
    pub exercise_id: i64,
    #[serde(rename = "performanceData")]
    pub performance_data: PerformanceData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceData {
    pub sets: Vec<SetPerformance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetPerformance {
    pub set: u32,
    pub reps: u32,
    pub weight: u32,
    /// Rest taken after the set, seconds
    pub time: u32,
}
