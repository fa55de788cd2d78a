//! In-progress session kept between runs

use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};
use crate::session::WorkoutSession;

pub const EXERCISES_KEY: &str = "exercises";
pub const WORKOUT_ID_KEY: &str = "currentWorkoutId";

pub fn save_draft(store: &mut dyn KeyValueStore, session: &WorkoutSession) -> Result<(), StorageError> {
    let json = serde_json::to_string(session)?;
    store.set(EXERCISES_KEY, &json)?;
    match session.workout_id() {
        Some(id) => store.set(WORKOUT_ID_KEY, &id.to_string())?,
        None => store.remove(WORKOUT_ID_KEY)?,
    }
    debug!(exercises = session.len(), "draft stored");
    Ok(())
}

/// Stored draft, if any. A draft that no longer decodes is dropped.
pub fn load_draft(store: &mut dyn KeyValueStore) -> Result<Option<WorkoutSession>, StorageError> {
    let Some(json) = store.get(EXERCISES_KEY)? else {
        return Ok(None);
    };
    let session: WorkoutSession = match serde_json::from_str(&json) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "discarding unreadable draft");
            clear_draft(store)?;
            return Ok(None);
        }
    };

    let stored_id = store
        .get(WORKOUT_ID_KEY)?
        .and_then(|v| v.trim().parse::<i64>().ok());
    Ok(Some(match stored_id {
        Some(id) if session.workout_id().is_none() => session.with_workout_id(id),
        _ => session,
    }))
}

pub fn clear_draft(store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
    store.remove(EXERCISES_KEY)?;
    store.remove(WORKOUT_ID_KEY)
}

/// Settle the draft after the workout screen closes: a saved session no
/// longer needs one, anything else is kept for the next run.
pub fn store_outcome(
    store: &mut dyn KeyValueStore,
    session: &WorkoutSession,
    saved: bool,
) -> Result<(), StorageError> {
    if saved {
        clear_draft(store)
    } else {
        save_draft(store, session)
    }
}
