//! HTTP client for the OpenWeather API.
//!
//! Performs the current-conditions, forecast and air-pollution requests and
//! hands the parsed bodies to [`crate::normalize`] to build domain records.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::Error;
use crate::model::{ForecastPoint, Units, WeatherRecord};
use crate::normalize;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherClient {
    /// Build a client with an explicit request timeout so no call can hang
    /// indefinitely.
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Provider(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different host. Used by tests against a mock
    /// server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch and normalize current conditions for a city.
    ///
    /// The air-quality sub-lookup is best effort: its failure leaves
    /// `air_quality_index` absent but never fails this call.
    pub async fn fetch_current(&self, city: &str, units: Units) -> Result<WeatherRecord, Error> {
        let body = self
            .get_success_body(
                "weather",
                &[("q", city), ("appid", &self.api_key), ("units", units.as_str())],
                "current conditions",
            )
            .await?;

        let parsed: CurrentResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("current conditions JSON: {e}")))?;

        let aqi = self.fetch_air_quality(parsed.coord.lat, parsed.coord.lon).await;

        normalize::current_record(parsed, city, units, aqi)
    }

    /// Fetch the 3-hourly forecast and collapse it into a daily strip.
    pub async fn fetch_forecast(
        &self,
        city: &str,
        units: Units,
    ) -> Result<Vec<ForecastPoint>, Error> {
        let body = self
            .get_success_body(
                "forecast",
                &[("q", city), ("appid", &self.api_key), ("units", units.as_str())],
                "forecast",
            )
            .await?;

        let parsed: ForecastResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("forecast JSON: {e}")))?;

        let today = chrono::Local::now().date_naive();
        normalize::daily_strip(&parsed, today)
    }

    /// Minimal current-conditions request used by the live-probe validator:
    /// a success status means the city resolves, anything else means it
    /// does not.
    pub async fn probe(&self, city: &str) -> bool {
        let url = format!("{}/weather", self.base_url);

        match self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(res) => res.status().is_success(),
            Err(e) => {
                debug!(error = %e, city, "probe request failed");
                false
            }
        }
    }

    async fn fetch_air_quality(&self, lat: f64, lon: f64) -> Option<u16> {
        let lat = lat.to_string();
        let lon = lon.to_string();

        let body = match self
            .get_success_body(
                "air_pollution",
                &[("lat", &lat), ("lon", &lon), ("appid", &self.api_key)],
                "air quality",
            )
            .await
        {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "air quality lookup failed, omitting AQI");
                return None;
            }
        };

        let parsed: AirPollutionResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "air quality response unusable, omitting AQI");
                return None;
            }
        };

        parsed
            .list
            .first()
            .and_then(|entry| normalize::bucket_aqi(entry.main.aqi))
    }

    async fn get_success_body(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<String, Error> {
        let url = format!("{}/{path}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("failed to send {what} request: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| Error::Provider(format!("failed to read {what} response body: {e}")))?;

        if !status.is_success() {
            return Err(Error::Provider(format!(
                "{what} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        Ok(body)
    }
}

// Raw provider shapes. Fields the normalizer treats as required are plain;
// everything else defaults instead of failing the whole response.

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwMain {
    #[serde(default)]
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub pressure: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwWeather {
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    "01d".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwWind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwSys {
    #[serde(default)]
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    #[serde(default)]
    pub name: Option<String>,
    pub dt: i64,
    pub timezone: i64,
    pub coord: OwCoord,
    pub sys: OwSys,
    #[serde(default)]
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    #[serde(default)]
    pub wind: OwWind,
    #[serde(default)]
    pub visibility: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwForecastCity {
    pub timezone: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwForecastSample {
    pub dt: i64,
    #[serde(default)]
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    /// Probability of precipitation in [0, 1].
    #[serde(default)]
    pub pop: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub city: OwForecastCity,
    #[serde(default)]
    pub list: Vec<OwForecastSample>,
}

#[derive(Debug, Deserialize)]
struct OwAqiMain {
    aqi: i64,
}

#[derive(Debug, Deserialize)]
struct OwAqiEntry {
    main: OwAqiMain,
}

#[derive(Debug, Deserialize)]
struct AirPollutionResponse {
    #[serde(default)]
    list: Vec<OwAqiEntry>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // Walk back to a char boundary so slicing cannot panic on multibyte
    // bodies.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
