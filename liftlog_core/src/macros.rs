//! Daily calorie and macro targets from body metrics.
//!
//! BMR uses the Mifflin-St Jeor equation, scaled by an activity factor and a
//! goal adjustment. Protein is fixed at 2 g per kg bodyweight, fat covers 25%
//! of calories and carbohydrates fill the remainder.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const WEIGHT_RANGE_KG: std::ops::RangeInclusive<f64> = 20.0..=400.0;
const HEIGHT_RANGE_CM: std::ops::RangeInclusive<f64> = 100.0..=250.0;
const AGE_RANGE: std::ops::RangeInclusive<u32> = 13..=120;

const PROTEIN_G_PER_KG: f64 = 2.0;
const FAT_CALORIE_SHARE: f64 = 0.25;
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Weekly training frequency
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    Maintain,
    BuildMuscle,
}

impl Gender {
    fn bmr_offset(self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female | Gender::Other => -161.0,
        }
    }
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::High,
        ActivityLevel::VeryHigh,
    ];

    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::High => 1.725,
            ActivityLevel::VeryHigh => 1.9,
        }
    }

    /// Label shown in the app
    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Stillasittande",
            ActivityLevel::Light => "Lätt (1-2 pass/vecka)",
            ActivityLevel::Moderate => "Medel (3-4 pass/vecka)",
            ActivityLevel::High => "Hög (5-6 pass/vecka)",
            ActivityLevel::VeryHigh => "Mycket hög (dagligen)",
        }
    }
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::LoseWeight, Goal::Maintain, Goal::BuildMuscle];

    pub fn adjustment(self) -> f64 {
        match self {
            Goal::LoseWeight => 0.8,
            Goal::Maintain => 1.0,
            Goal::BuildMuscle => 1.1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Goal::LoseWeight => "Gå ner i vikt",
            Goal::Maintain => "Behålla vikt",
            Goal::BuildMuscle => "Bygga muskler",
        }
    }
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Man",
            Gender::Female => "Kvinna",
            Gender::Other => "Annat",
        }
    }
}

/// Parse either the display label or the snake_case key
fn parse_labelled<T: Copy>(
    s: &str,
    all: &[T],
    label: fn(T) -> &'static str,
    key: fn(T) -> String,
    what: &str,
) -> Result<T> {
    let needle = s.trim();
    all.iter()
        .copied()
        .find(|v| label(*v).eq_ignore_ascii_case(needle) || key(*v) == needle.to_lowercase())
        .ok_or_else(|| Error::InvalidInput(format!("unknown {}: {:?}", what, s)))
}

fn snake_key<T: Serialize>(v: T) -> String {
    serde_json::to_value(v)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_labelled(
            s,
            &[Gender::Male, Gender::Female, Gender::Other],
            Gender::label,
            snake_key,
            "gender",
        )
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_labelled(s, &ActivityLevel::ALL, ActivityLevel::label, snake_key, "activity level")
    }
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_labelled(s, &Goal::ALL, Goal::label, snake_key, "goal")
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs to the macro calculation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BodyMetrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity: ActivityLevel,
    pub goal: Goal,
}

impl BodyMetrics {
    pub fn validate(&self) -> Result<()> {
        if !WEIGHT_RANGE_KG.contains(&self.weight_kg) {
            return Err(Error::InvalidInput(format!(
                "weight must be between {} and {} kg, got {}",
                WEIGHT_RANGE_KG.start(),
                WEIGHT_RANGE_KG.end(),
                self.weight_kg
            )));
        }
        if !HEIGHT_RANGE_CM.contains(&self.height_cm) {
            return Err(Error::InvalidInput(format!(
                "height must be between {} and {} cm, got {}",
                HEIGHT_RANGE_CM.start(),
                HEIGHT_RANGE_CM.end(),
                self.height_cm
            )));
        }
        if !AGE_RANGE.contains(&self.age) {
            return Err(Error::InvalidInput(format!(
                "age must be between {} and {}, got {}",
                AGE_RANGE.start(),
                AGE_RANGE.end(),
                self.age
            )));
        }
        Ok(())
    }
}

/// Daily targets, all rounded to whole numbers
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MacroTargets {
    pub bmr: u32,
    pub calories: u32,
    pub protein: u32,
    pub fat: u32,
    pub carbs: u32,
}

/// Compute daily calorie and macro targets
///
/// Rounding happens once, on the outputs; intermediate values keep full
/// precision.
pub fn calculate_macros(metrics: &BodyMetrics) -> Result<MacroTargets> {
    metrics.validate()?;

    let bmr = 10.0 * metrics.weight_kg + 6.25 * metrics.height_cm - 5.0 * f64::from(metrics.age)
        + metrics.gender.bmr_offset();
    let calories = bmr * metrics.activity.factor() * metrics.goal.adjustment();

    let protein = PROTEIN_G_PER_KG * metrics.weight_kg;
    let fat = calories * FAT_CALORIE_SHARE / KCAL_PER_G_FAT;
    let carbs = ((calories - protein * KCAL_PER_G_PROTEIN - fat * KCAL_PER_G_FAT)
        / KCAL_PER_G_CARBS)
        .max(0.0);

    Ok(MacroTargets {
        bmr: bmr.round() as u32,
        calories: calories.round() as u32,
        protein: protein.round() as u32,
        fat: fat.round() as u32,
        carbs: carbs.round() as u32,
    })
}
