//! Unit conversions applied at the provider boundary.

use crate::model::Units;

const METERS_PER_MILE: f64 = 1609.344;

/// OpenWeather reports wind in m/s for metric requests but already in mph
/// for imperial ones. Metric output is km/h, so only the metric path
/// converts. This asymmetry is a provider quirk and is kept as-is.
pub fn wind_speed(raw: f64, units: Units) -> f64 {
    match units {
        Units::Metric => raw * 3.6,
        Units::Imperial => raw,
    }
}

/// Visibility arrives in meters regardless of unit system. Output is km or
/// miles, rounded to one decimal place.
pub fn visibility(meters: f64, units: Units) -> f64 {
    let converted = match units {
        Units::Metric => meters / 1000.0,
        Units::Imperial => meters / METERS_PER_MILE,
    };
    round1(converted)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
