//! Core library for the `weatherset` CLI.
//!
//! This crate defines:
//! - The record and status-registry abstractions
//! - Search, filter and nearest-match queries over observation sets
//! - Configuration of custom status-code tables
//!
//! It is used by `weatherset-cli`, but can also be reused by other binaries or services.

pub mod analysis;
pub mod config;
pub mod model;
pub mod registry;

pub use analysis::{
    NotFoundError, any_status_is, coverage, filter_by_matching_statuses, filter_by_status,
    find_closest_weather, is_in_coverage, status_is, status_matches_any,
};
pub use config::Config;
pub use model::{Observation, WeatherCode, WeatherRecord};
pub use registry::{CodeRange, LookupError, StatusCodeRegistry, WeatherCodeRegistry};
