//! Workout submission.
//!
//! Turns the draft into a `WorkoutLog`, stores it through the gateway and
//! clears the draft once the backend has accepted it.

use crate::draft::DraftStore;
use crate::gateway::Gateway;
use crate::storage::DraftStorage;
use crate::types::WorkoutLog;
use crate::{Error, Result};
use chrono::{DateTime, Utc};

pub const WORKOUT_LOG_TABLE: &str = "workout_logs";

/// Submit the current draft as a workout named `name`
///
/// The draft is left untouched when the gateway call fails so the user can
/// retry.
pub fn submit_workout<S, G>(
    store: &mut DraftStore<S>,
    gateway: &G,
    name: &str,
    now: DateTime<Utc>,
) -> Result<WorkoutLog>
where
    S: DraftStorage,
    G: Gateway + ?Sized,
{
    if store.is_empty() {
        return Err(Error::InvalidInput("the workout draft is empty".into()));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("a workout needs a name".into()));
    }

    let log = store.to_workout_log(name, now);
    let row = serde_json::to_value(&log)?;

    if let Err(e) = gateway.insert(WORKOUT_LOG_TABLE, row).into_result() {
        tracing::warn!("Workout submission failed: {}", e);
        return Err(e);
    }

    tracing::info!(
        "Submitted workout {} with {} exercises",
        log.id,
        log.exercises.len()
    );
    store.clear_draft();
    Ok(log)
}
