#![forbid(unsafe_code)]

//! Core domain model and business logic for Liftlog.
//!
//! This crate provides:
//! - Domain types (exercises, draft sets, workout logs, food entries)
//! - The workout draft store and its storage adapters
//! - Macro target calculation
//! - Nutrition aggregation
//! - The remote data gateway and the food-database proxy

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod storage;
pub mod draft;
pub mod macros;
pub mod nutrition;
pub mod gateway;
pub mod submit;
pub mod food;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use storage::{DraftStorage, FileStorage, MemoryStorage};
pub use draft::DraftStore;
pub use macros::{calculate_macros, ActivityLevel, BodyMetrics, Gender, Goal, MacroTargets};
pub use nutrition::{daily_totals, remaining, totals_by_meal};
pub use gateway::{Gateway, GatewayError, GatewayResponse, Query, RestGateway};
pub use submit::submit_workout;
pub use food::{FoodSource, OpenFoodFactsClient, ProxyRequest, ProxyResponse};
