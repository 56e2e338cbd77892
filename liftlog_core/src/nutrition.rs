//! Nutrition aggregation over logged food entries.
//!
//! Totals are computed per day and per meal. Entries are fetched through the
//! gateway from the `food_logs` table.

use crate::gateway::{Gateway, Query};
use crate::macros::MacroTargets;
use crate::types::{FoodEntry, MacroTotals, MealType};
use crate::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

pub const FOOD_LOG_TABLE: &str = "food_logs";

/// Target minus consumed; negative when over target
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Remaining {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

/// Sum every entry logged on `date`
pub fn daily_totals(entries: &[FoodEntry], date: NaiveDate) -> MacroTotals {
    entries
        .iter()
        .filter(|e| e.logged_on == date)
        .fold(MacroTotals::default(), |mut totals, entry| {
            totals.add(entry);
            totals
        })
}

/// Per-meal sums for `date`; every meal is present, empty meals are zero
pub fn totals_by_meal(entries: &[FoodEntry], date: NaiveDate) -> BTreeMap<MealType, MacroTotals> {
    let mut by_meal: BTreeMap<MealType, MacroTotals> = MealType::ALL
        .iter()
        .map(|meal| (*meal, MacroTotals::default()))
        .collect();

    for entry in entries.iter().filter(|e| e.logged_on == date) {
        by_meal.entry(entry.meal).or_default().add(entry);
    }
    by_meal
}

pub fn remaining(targets: &MacroTargets, totals: &MacroTotals) -> Remaining {
    Remaining {
        calories: f64::from(targets.calories) - totals.calories,
        protein: f64::from(targets.protein) - totals.protein,
        fat: f64::from(targets.fat) - totals.fat,
        carbs: f64::from(targets.carbs) - totals.carbs,
    }
}

/// Fetch the food entries logged on `date`
///
/// Rows that do not decode are skipped with a warning.
pub fn fetch_day<G: Gateway + ?Sized>(gateway: &G, date: NaiveDate) -> Result<Vec<FoodEntry>> {
    let query = Query::new().eq("logged_on", date.to_string());
    let rows = gateway.select(FOOD_LOG_TABLE, &query).into_result()?;

    let mut entries = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<FoodEntry>(row) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping food log row {}: {}", index, e);
            }
        }
    }

    tracing::debug!("Fetched {} food entries for {}", entries.len(), date);
    Ok(entries)
}
