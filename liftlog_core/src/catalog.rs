//! Built-in catalog of common exercises.
//!
//! The hosted backend owns the full exercise table; this catalog lets the
//! CLI add well-known exercises to a draft without a network round trip.

use crate::types::Exercise;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Exercises keyed by id
#[derive(Clone, Debug, Default)]
pub struct ExerciseCatalog {
    pub exercises: BTreeMap<String, Exercise>,
}

impl ExerciseCatalog {
    /// Look up an exercise by id
    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.get(id)
    }

    /// Exercises whose name or muscle group contains `needle` (case-insensitive)
    pub fn search(&self, needle: &str) -> Vec<&Exercise> {
        let needle = needle.to_lowercase();
        self.exercises
            .values()
            .filter(|e| {
                e.name.to_lowercase().contains(&needle)
                    || e
                        .muscle_group
                        .as_deref()
                        .is_some_and(|m| m.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    fn insert(&mut self, id: &str, name: &str, muscle_group: &str, equipment: &str) {
        self.exercises.insert(
            id.into(),
            Exercise {
                id: id.into(),
                name: name.into(),
                muscle_group: Some(muscle_group.into()),
                equipment: Some(equipment.into()),
                image_url: None,
            },
        );
    }
}

/// Cached default catalog - built once and reused
static DEFAULT_CATALOG: Lazy<ExerciseCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static ExerciseCatalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// Prefer `get_default_catalog()` outside of tests.
pub fn build_default_catalog() -> ExerciseCatalog {
    let mut catalog = ExerciseCatalog::default();

    // Barbell
    catalog.insert("bench_press", "Bench Press", "chest", "barbell");
    catalog.insert("back_squat", "Back Squat", "legs", "barbell");
    catalog.insert("deadlift", "Deadlift", "back", "barbell");
    catalog.insert("overhead_press", "Overhead Press", "shoulders", "barbell");
    catalog.insert("barbell_row", "Barbell Row", "back", "barbell");

    // Dumbbell
    catalog.insert("dumbbell_curl", "Dumbbell Curl", "arms", "dumbbell");
    catalog.insert("lateral_raise", "Lateral Raise", "shoulders", "dumbbell");

    // Machines
    catalog.insert("leg_press", "Leg Press", "legs", "machine");
    catalog.insert("lat_pulldown", "Lat Pulldown", "back", "machine");
    catalog.insert("cable_row", "Seated Cable Row", "back", "machine");
    catalog.insert("leg_curl", "Leg Curl", "legs", "machine");

    // Bodyweight
    catalog.insert("pullup", "Pull-up", "back", "bodyweight");
    catalog.insert("dip", "Dip", "chest", "bodyweight");
    catalog.insert("plank", "Plank", "core", "bodyweight");

    catalog
}
