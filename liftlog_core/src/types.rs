//! Core domain types for Liftlog.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise snapshots from the catalog
//! - Draft exercises and sets assembled before a workout is logged
//! - Submitted workout logs
//! - Logged food entries, macro totals and normalized food products

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// An exercise as shown in the catalog or on a machine page
///
/// Drafts keep a denormalized copy so they render without a catalog lookup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Exercise {
    /// Snapshot for an exercise that is not in the catalog
    pub fn custom(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            muscle_group: None,
            equipment: None,
            image_url: None,
        }
    }
}

// ============================================================================
// Draft Types
// ============================================================================

/// One set inside a draft exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DraftSet {
    pub id: String,
    pub weight: f64,
    pub reps: u32,
    pub completed: bool,
}

impl DraftSet {
    /// A fresh set with zero weight and reps
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            weight: 0.0,
            reps: 0,
            completed: false,
        }
    }
}

impl Default for DraftSet {
    fn default() -> Self {
        Self::new()
    }
}

/// An exercise being assembled in the workout draft
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DraftExercise {
    pub id: String,
    pub exercise_id: String,
    pub exercise: Exercise,
    pub sets: Vec<DraftSet>,
    /// Rest between sets, in seconds
    pub rest_time: u32,
}

/// Editable numeric field of a draft set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetField {
    Weight,
    Reps,
}

/// Persisted form of the whole draft collection
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct DraftState {
    #[serde(default)]
    pub exercises: Vec<DraftExercise>,
}

// ============================================================================
// Workout Log Types
// ============================================================================

/// A set as stored in a submitted workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedSet {
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub completed: bool,
}

/// An exercise as stored in a submitted workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedExercise {
    pub exercise_id: String,
    pub name: String,
    pub rest_time: u32,
    pub sets: Vec<LoggedSet>,
}

/// A workout ready to be persisted by the backend
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub name: String,
    pub performed_at: DateTime<Utc>,
    pub exercises: Vec<LoggedExercise>,
}

// ============================================================================
// Nutrition Types
// ============================================================================

/// Meal a food entry was logged under
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];
}

/// A food row logged by the user
///
/// Nutrient values are for the logged amount, not per 100 g.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FoodEntry {
    pub id: String,
    pub logged_on: NaiveDate,
    pub meal: MealType,
    pub name: String,
    #[serde(default)]
    pub amount_grams: f64,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub sugar: f64,
}

/// Summed nutrients over a set of food entries
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: f64,
}

impl MacroTotals {
    /// Add one entry's nutrients
    pub fn add(&mut self, entry: &FoodEntry) {
        self.calories += entry.calories;
        self.protein += entry.protein;
        self.fat += entry.fat;
        self.carbs += entry.carbs;
        self.sugar += entry.sugar;
    }
}

/// Normalized product returned by the food proxy, values per 100 g
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FoodProduct {
    pub name: String,
    pub brand: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: f64,
    pub image_url: Option<String>,
}
