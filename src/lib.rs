//! vigil - Workout session tracker
//!
//! Sets and reps, a rest countdown after each completed set, trivia while resting.

pub mod api;
pub mod config;
pub mod db;
pub mod exercises;
pub mod logging;
pub mod session;
pub mod timer;
pub mod trivia;
pub mod tui;

pub use db::Database;
pub use session::WorkoutSession;
pub use timer::{RestTimer, TimerDriver};
