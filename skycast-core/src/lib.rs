//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - City validation strategies (static list, live probe)
//! - The OpenWeather client and response normalization
//! - Shared domain models (weather records, unit systems)
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
mod normalize;
pub mod openweather;
pub mod units;
pub mod validate;

pub use config::Config;
pub use error::Error;
pub use model::{ForecastPoint, Units, WeatherRecord, WindDirection};
pub use openweather::OpenWeatherClient;
pub use validate::{CityValidator, ProbeValidator, StaticListValidator};
