//! Workout draft store.
//!
//! Holds the exercises and sets a user is assembling before a workout is
//! logged. Every mutation writes the whole draft back through the injected
//! `DraftStorage`. Storage failures are logged and swallowed: the draft is a
//! disposable working copy, not a system of record.
//!
//! Operations that name an unknown draft exercise or set are silent no-ops.

use crate::storage::DraftStorage;
use crate::types::{
    DraftExercise, DraftSet, DraftState, Exercise, LoggedExercise, LoggedSet, SetField,
    WorkoutLog,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const DEFAULT_SET_COUNT: u32 = 1;
pub const DEFAULT_REST_TIME: u32 = 90;

/// Draft container bound to one storage namespace
pub struct DraftStore<S: DraftStorage> {
    storage: S,
    namespace: String,
    state: DraftState,
}

impl<S: DraftStorage> DraftStore<S> {
    /// Open the draft saved under `namespace`
    ///
    /// Missing, unreadable or corrupted state yields an empty draft.
    pub fn open(storage: S, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let state = match storage.load(&namespace) {
            Ok(Some(contents)) => match serde_json::from_str::<DraftState>(&contents) {
                Ok(state) => {
                    tracing::debug!(
                        "Restored draft {:?} with {} exercises",
                        namespace,
                        state.exercises.len()
                    );
                    state
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse draft {:?}: {}. Starting empty.",
                        namespace,
                        e
                    );
                    DraftState::default()
                }
            },
            Ok(None) => DraftState::default(),
            Err(e) => {
                tracing::warn!(
                    "Unable to load draft {:?}: {}. Starting empty.",
                    namespace,
                    e
                );
                DraftState::default()
            }
        };

        Self {
            storage,
            namespace,
            state,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn exercises(&self) -> &[DraftExercise] {
        &self.state.exercises
    }

    /// Draft exercise by draft id
    pub fn get(&self, id: &str) -> Option<&DraftExercise> {
        self.state.exercises.iter().find(|e| e.id == id)
    }

    /// Draft exercise by catalog exercise id
    pub fn find_by_exercise_id(&self, exercise_id: &str) -> Option<&DraftExercise> {
        self.state
            .exercises
            .iter()
            .find(|e| e.exercise_id == exercise_id)
    }

    pub fn exercise_count(&self) -> usize {
        self.state.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.exercises.is_empty()
    }

    pub fn completed_set_count(&self) -> usize {
        self.state
            .exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .count()
    }

    /// Sum of weight × reps over completed sets
    pub fn total_volume(&self) -> f64 {
        self.state
            .exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .map(|s| s.weight * f64::from(s.reps))
            .sum()
    }

    /// Add an exercise with `set_count` empty sets
    ///
    /// Adding an exercise that is already in the draft does nothing.
    pub fn add_exercise(&mut self, exercise: Exercise, set_count: u32, rest_time: u32) {
        if self.find_by_exercise_id(&exercise.id).is_some() {
            tracing::debug!("Exercise {} already in draft", exercise.id);
            return;
        }

        let sets = (0..set_count).map(|_| DraftSet::new()).collect();
        self.state.exercises.push(DraftExercise {
            id: Uuid::new_v4().to_string(),
            exercise_id: exercise.id.clone(),
            exercise,
            sets,
            rest_time,
        });
        self.persist();
    }

    /// Add an exercise with the default set count and rest time
    pub fn add_exercise_default(&mut self, exercise: Exercise) {
        self.add_exercise(exercise, DEFAULT_SET_COUNT, DEFAULT_REST_TIME);
    }

    pub fn remove_exercise(&mut self, id: &str) {
        let before = self.state.exercises.len();
        self.state.exercises.retain(|e| e.id != id);
        if self.state.exercises.len() != before {
            self.persist();
        }
    }

    /// Set `weight` or `reps` on one set
    ///
    /// Negative values are clamped to zero and reps are rounded. Non-finite
    /// values are ignored.
    pub fn update_set(&mut self, exercise_id: &str, set_id: &str, field: SetField, value: f64) {
        if !value.is_finite() {
            tracing::debug!("Ignoring non-finite {:?} value", field);
            return;
        }
        let value = value.max(0.0);

        let Some(set) = self.set_mut(exercise_id, set_id) else {
            return;
        };
        match field {
            SetField::Weight => set.weight = value,
            SetField::Reps => set.reps = value.round() as u32,
        }
        self.persist();
    }

    pub fn toggle_set_completion(&mut self, exercise_id: &str, set_id: &str) {
        let Some(set) = self.set_mut(exercise_id, set_id) else {
            return;
        };
        set.completed = !set.completed;
        self.persist();
    }

    /// Append an empty set to an exercise
    pub fn add_set(&mut self, exercise_id: &str) {
        let Some(exercise) = self.exercise_mut(exercise_id) else {
            return;
        };
        exercise.sets.push(DraftSet::new());
        self.persist();
    }

    pub fn remove_set(&mut self, exercise_id: &str, set_id: &str) {
        let Some(exercise) = self.exercise_mut(exercise_id) else {
            return;
        };
        let before = exercise.sets.len();
        exercise.sets.retain(|s| s.id != set_id);
        if exercise.sets.len() != before {
            self.persist();
        }
    }

    /// Empty the draft and drop its stored copy
    pub fn clear_draft(&mut self) {
        self.state.exercises.clear();
        if let Err(e) = self.storage.remove(&self.namespace) {
            tracing::warn!("Failed to clear stored draft {:?}: {}", self.namespace, e);
        }
    }

    /// Build the log that gets submitted to the backend
    pub fn to_workout_log(
        &self,
        name: impl Into<String>,
        performed_at: DateTime<Utc>,
    ) -> WorkoutLog {
        let exercises = self
            .state
            .exercises
            .iter()
            .map(|e| LoggedExercise {
                exercise_id: e.exercise_id.clone(),
                name: e.exercise.name.clone(),
                rest_time: e.rest_time,
                sets: e
                    .sets
                    .iter()
                    .zip(1..)
                    .map(|(s, set_number)| LoggedSet {
                        set_number,
                        weight: s.weight,
                        reps: s.reps,
                        completed: s.completed,
                    })
                    .collect(),
            })
            .collect();

        WorkoutLog {
            id: Uuid::new_v4(),
            name: name.into(),
            performed_at,
            exercises,
        }
    }

    fn exercise_mut(&mut self, exercise_id: &str) -> Option<&mut DraftExercise> {
        self.state.exercises.iter_mut().find(|e| e.id == exercise_id)
    }

    fn set_mut(&mut self, exercise_id: &str, set_id: &str) -> Option<&mut DraftSet> {
        self.exercise_mut(exercise_id)?
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
    }

    /// Write the draft back; failures are logged, not returned
    fn persist(&mut self) {
        let contents = match serde_json::to_string(&self.state) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Failed to serialize draft: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.save(&self.namespace, &contents) {
            tracing::warn!("Failed to persist draft {:?}: {}", self.namespace, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use crate::{Error, Result};
    use proptest::prelude::*;

    const NS: &str = "workout-draft";

    fn bench() -> Exercise {
        Exercise::custom("bench_press", "Bench Press")
    }

    fn squat() -> Exercise {
        Exercise::custom("back_squat", "Back Squat")
    }

    fn store() -> DraftStore<MemoryStorage> {
        crate::logging::init_test();
        DraftStore::open(MemoryStorage::new(), NS)
    }

    /// Storage whose writes always fail
    struct BrokenStorage;

    impl DraftStorage for BrokenStorage {
        fn load(&self, _namespace: &str) -> Result<Option<String>> {
            Err(Error::Storage("disk on fire".into()))
        }

        fn save(&mut self, _namespace: &str, _contents: &str) -> Result<()> {
            Err(Error::Storage("disk on fire".into()))
        }

        fn remove(&mut self, _namespace: &str) -> Result<()> {
            Err(Error::Storage("disk on fire".into()))
        }
    }

    #[test]
    fn test_add_exercise_creates_default_sets() {
        let mut draft = store();
        draft.add_exercise(bench(), 3, 120);

        assert_eq!(draft.exercise_count(), 1);
        let exercise = &draft.exercises()[0];
        assert_eq!(exercise.exercise_id, "bench_press");
        assert_eq!(exercise.exercise.name, "Bench Press");
        assert_eq!(exercise.rest_time, 120);
        assert_eq!(exercise.sets.len(), 3);
        assert!(exercise
            .sets
            .iter()
            .all(|s| s.weight == 0.0 && s.reps == 0 && !s.completed));
    }

    #[test]
    fn test_add_exercise_defaults() {
        let mut draft = store();
        draft.add_exercise_default(bench());

        let exercise = &draft.exercises()[0];
        assert_eq!(exercise.sets.len(), 1);
        assert_eq!(exercise.rest_time, 90);
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let mut draft = store();
        draft.add_exercise(bench(), 1, 90);
        let first_id = draft.exercises()[0].id.clone();

        draft.add_exercise(bench(), 5, 30);

        assert_eq!(draft.exercise_count(), 1);
        assert_eq!(draft.exercises()[0].id, first_id);
        assert_eq!(draft.exercises()[0].sets.len(), 1);
    }

    #[test]
    fn test_remove_exercise() {
        let mut draft = store();
        draft.add_exercise_default(bench());
        draft.add_exercise_default(squat());
        let id = draft.exercises()[0].id.clone();

        draft.remove_exercise("missing");
        assert_eq!(draft.exercise_count(), 2);

        draft.remove_exercise(&id);
        assert_eq!(draft.exercise_count(), 1);
        assert_eq!(draft.exercises()[0].exercise_id, "back_squat");
    }

    #[test]
    fn test_update_set_fields() {
        let mut draft = store();
        draft.add_exercise_default(bench());
        let exercise_id = draft.exercises()[0].id.clone();
        let set_id = draft.exercises()[0].sets[0].id.clone();

        draft.update_set(&exercise_id, &set_id, SetField::Weight, 82.5);
        draft.update_set(&exercise_id, &set_id, SetField::Reps, 7.6);

        let set = &draft.get(&exercise_id).unwrap().sets[0];
        assert_eq!(set.weight, 82.5);
        assert_eq!(set.reps, 8);
    }

    #[test]
    fn test_update_set_clamps_and_ignores_bad_values() {
        let mut draft = store();
        draft.add_exercise_default(bench());
        let exercise_id = draft.exercises()[0].id.clone();
        let set_id = draft.exercises()[0].sets[0].id.clone();

        draft.update_set(&exercise_id, &set_id, SetField::Weight, 40.0);
        draft.update_set(&exercise_id, &set_id, SetField::Weight, f64::NAN);
        assert_eq!(draft.get(&exercise_id).unwrap().sets[0].weight, 40.0);

        draft.update_set(&exercise_id, &set_id, SetField::Reps, -3.0);
        assert_eq!(draft.get(&exercise_id).unwrap().sets[0].reps, 0);
    }

    #[test]
    fn test_update_set_unknown_ids_is_noop() {
        let mut draft = store();
        draft.add_exercise_default(bench());
        let before = draft.exercises().to_vec();
        let exercise_id = before[0].id.clone();

        draft.update_set("missing", &before[0].sets[0].id, SetField::Weight, 10.0);
        draft.update_set(&exercise_id, "missing", SetField::Reps, 10.0);

        assert_eq!(draft.exercises(), before.as_slice());
    }

    #[test]
    fn test_toggle_set_completion() {
        let mut draft = store();
        draft.add_exercise_default(bench());
        let exercise_id = draft.exercises()[0].id.clone();
        let set_id = draft.exercises()[0].sets[0].id.clone();

        draft.toggle_set_completion(&exercise_id, &set_id);
        assert!(draft.get(&exercise_id).unwrap().sets[0].completed);
        assert_eq!(draft.completed_set_count(), 1);

        draft.toggle_set_completion(&exercise_id, &set_id);
        assert!(!draft.get(&exercise_id).unwrap().sets[0].completed);
        assert_eq!(draft.completed_set_count(), 0);
    }

    #[test]
    fn test_add_and_remove_sets() {
        let mut draft = store();
        draft.add_exercise(bench(), 2, 90);
        let exercise_id = draft.exercises()[0].id.clone();

        draft.add_set(&exercise_id);
        assert_eq!(draft.get(&exercise_id).unwrap().sets.len(), 3);

        let set_id = draft.get(&exercise_id).unwrap().sets[1].id.clone();
        draft.remove_set(&exercise_id, &set_id);
        let sets = &draft.get(&exercise_id).unwrap().sets;
        assert_eq!(sets.len(), 2);
        assert!(sets.iter().all(|s| s.id != set_id));

        draft.add_set("missing");
        assert_eq!(draft.get(&exercise_id).unwrap().sets.len(), 2);
    }

    #[test]
    fn test_remove_unknown_set_keeps_length() {
        let mut draft = store();
        draft.add_exercise(bench(), 3, 90);
        let exercise_id = draft.exercises()[0].id.clone();

        draft.remove_set(&exercise_id, "missing");
        draft.remove_set("missing", "missing");

        assert_eq!(draft.get(&exercise_id).unwrap().sets.len(), 3);
    }

    #[test]
    fn test_clear_draft() {
        let mut draft = store();
        draft.add_exercise_default(bench());
        draft.add_exercise_default(squat());

        draft.clear_draft();

        assert_eq!(draft.exercise_count(), 0);
        assert!(draft.storage().get(NS).is_none());
    }

    #[test]
    fn test_total_volume_counts_completed_sets_only() {
        let mut draft = store();
        draft.add_exercise(bench(), 2, 90);
        let exercise_id = draft.exercises()[0].id.clone();
        let sets: Vec<String> = draft.exercises()[0].sets.iter().map(|s| s.id.clone()).collect();

        for set_id in &sets {
            draft.update_set(&exercise_id, set_id, SetField::Weight, 100.0);
            draft.update_set(&exercise_id, set_id, SetField::Reps, 5.0);
        }
        draft.toggle_set_completion(&exercise_id, &sets[0]);

        assert_eq!(draft.total_volume(), 500.0);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut draft = store();
        draft.add_exercise_default(bench());
        let exercise_id = draft.exercises()[0].id.clone();
        let set_id = draft.exercises()[0].sets[0].id.clone();
        draft.update_set(&exercise_id, &set_id, SetField::Weight, 60.0);

        let stored: DraftState = serde_json::from_str(draft.storage().get(NS).unwrap()).unwrap();
        assert_eq!(stored.exercises.len(), 1);
        assert_eq!(stored.exercises[0].sets[0].weight, 60.0);
    }

    #[test]
    fn test_draft_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();

        {
            let mut draft = DraftStore::open(FileStorage::new(temp_dir.path()), NS);
            draft.add_exercise(bench(), 2, 60);
            draft.add_exercise(squat(), 1, 180);
        }

        let draft = DraftStore::open(FileStorage::new(temp_dir.path()), NS);
        assert_eq!(draft.exercise_count(), 2);
        assert_eq!(draft.exercises()[0].exercise_id, "bench_press");
        assert_eq!(draft.exercises()[0].sets.len(), 2);
        assert_eq!(draft.exercises()[1].rest_time, 180);
    }

    #[test]
    fn test_corrupted_draft_starts_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("workout-draft.json"), "{ invalid json }").unwrap();

        let draft = DraftStore::open(FileStorage::new(temp_dir.path()), NS);
        assert!(draft.is_empty());
    }

    #[test]
    fn test_storage_failures_do_not_surface() {
        crate::logging::init_test();
        let mut draft = DraftStore::open(BrokenStorage, NS);

        draft.add_exercise_default(bench());
        assert_eq!(draft.exercise_count(), 1);

        draft.clear_draft();
        assert_eq!(draft.exercise_count(), 0);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut a = DraftStore::open(FileStorage::new(temp_dir.path()), "draft-a");
        a.add_exercise_default(bench());

        let b = DraftStore::open(FileStorage::new(temp_dir.path()), "draft-b");
        assert!(b.is_empty());
    }

    #[test]
    fn test_to_workout_log_numbers_sets() {
        let mut draft = store();
        draft.add_exercise(bench(), 3, 90);
        let exercise_id = draft.exercises()[0].id.clone();
        let set_id = draft.exercises()[0].sets[2].id.clone();
        draft.update_set(&exercise_id, &set_id, SetField::Reps, 12.0);

        let log = draft.to_workout_log("Push day", Utc::now());

        assert_eq!(log.name, "Push day");
        assert_eq!(log.exercises.len(), 1);
        let sets = &log.exercises[0].sets;
        assert_eq!(sets.iter().map(|s| s.set_number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(sets[2].reps, 12);
        assert_eq!(log.exercises[0].name, "Bench Press");
    }

    proptest! {
        #[test]
        fn prop_duplicate_adds_keep_one_entry(
            id in "[a-z_]{1,16}",
            adds in 1usize..5,
            set_count in 0u32..6,
        ) {
            let mut draft = DraftStore::open(MemoryStorage::new(), NS);
            for _ in 0..adds {
                draft.add_exercise(Exercise::custom(id.clone(), "Lift"), set_count, 90);
            }
            let matching = draft.exercises().iter().filter(|e| e.exercise_id == id).count();
            prop_assert_eq!(matching, 1);
        }

        #[test]
        fn prop_clear_always_empties(ids in proptest::collection::vec("[a-z]{1,8}", 0..10)) {
            let mut draft = DraftStore::open(MemoryStorage::new(), NS);
            for id in ids {
                draft.add_exercise_default(Exercise::custom(id, "Lift"));
            }
            draft.clear_draft();
            prop_assert_eq!(draft.exercise_count(), 0);
        }
    }
}
