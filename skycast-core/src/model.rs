use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Unit system requested by the user. Controls the `units` query parameter
/// sent to the provider and the units of every numeric field on the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_speed_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "km/h",
            Units::Imperial => "mph",
        }
    }

    pub fn visibility_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "km",
            Units::Imperial => "mi",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported values: metric, imperial."
            )),
        }
    }
}

/// Eight-point compass rose, in the order used for degree bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl WindDirection {
    pub const fn compass() -> &'static [WindDirection; 8] {
        use WindDirection::*;
        &[N, NE, E, SE, S, SW, W, NW]
    }

    /// Bucket meteorological degrees (0 = north, clockwise) into the rose.
    /// Values outside [0, 360) wrap.
    pub fn from_degrees(deg: f64) -> Self {
        let ix = (((deg + 22.5) / 45.0).floor() as i64).rem_euclid(8) as usize;
        Self::compass()[ix]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindDirection::N => "N",
            WindDirection::NE => "NE",
            WindDirection::E => "E",
            WindDirection::SE => "SE",
            WindDirection::S => "S",
            WindDirection::SW => "SW",
            WindDirection::W => "W",
            WindDirection::NW => "NW",
        }
    }
}

impl std::fmt::Display for WindDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized current conditions, built once at the provider boundary.
///
/// Timestamps are naive local datetimes of the queried place, computed from
/// the provider's UTC seconds plus its timezone offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    /// ISO-2 country code, or empty when the provider omits it.
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: String,
    /// Provider iconography key, e.g. "10d".
    pub icon_code: String,
    pub humidity: u8,
    /// hPa.
    pub pressure: u32,
    /// km or miles per the unit system, one decimal place.
    pub visibility: f64,
    /// km/h or mph per the unit system.
    pub wind_speed: f64,
    pub wind_direction: WindDirection,
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
    pub observed_at: NaiveDateTime,
    /// Best-effort AQI badge value, one of {25, 50, 100, 150, 200}.
    pub air_quality_index: Option<u16>,
    pub units: Units,
}

/// One entry of the daily forecast strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// "Today" or a weekday abbreviation such as "Tue".
    pub label: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub icon_code: String,
    /// Probability of precipitation in [0, 1].
    pub precipitation_probability: f64,
}
