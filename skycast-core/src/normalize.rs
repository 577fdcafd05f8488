//! Mapping from raw OpenWeather payloads to domain records.
//!
//! Everything here is pure so the per-field policies (required vs.
//! defaulted, unit handling, noon selection) can be tested without a
//! network.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::Error;
use crate::model::{ForecastPoint, Units, WeatherRecord, WindDirection};
use crate::openweather::{CurrentResponse, ForecastResponse};
use crate::units;

/// Provider timestamps are UTC seconds. Adding the place's offset and
/// reading the result as naive yields the place's wall-clock time, not the
/// caller's. `None` when the sum is outside the representable range.
pub(crate) fn to_local(ts_utc: i64, tz_offset_s: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp(ts_utc.checked_add(tz_offset_s)?, 0).map(|dt| dt.naive_utc())
}

fn bad_timestamp(field: &str) -> Error {
    Error::MalformedResponse(format!("{field} timestamp out of range"))
}

/// OpenWeather's air-pollution scale is 1..=5; the badge shows a coarse
/// AQI-style number instead. Anything outside the scale yields no badge.
pub(crate) fn bucket_aqi(raw: i64) -> Option<u16> {
    match raw {
        1 => Some(25),
        2 => Some(50),
        3 => Some(100),
        4 => Some(150),
        5 => Some(200),
        _ => None,
    }
}

/// Build the normalized record for a successful current-conditions
/// response. `queried_city` backs the city name when the provider omits
/// `name`. Unrepresentable timestamps fail as [`Error::MalformedResponse`].
pub(crate) fn current_record(
    raw: CurrentResponse,
    queried_city: &str,
    units_system: Units,
    air_quality_index: Option<u16>,
) -> Result<WeatherRecord, Error> {
    let tz = raw.timezone;

    let sunrise = to_local(raw.sys.sunrise, tz).ok_or_else(|| bad_timestamp("sys.sunrise"))?;
    let sunset = to_local(raw.sys.sunset, tz).ok_or_else(|| bad_timestamp("sys.sunset"))?;
    let observed_at = to_local(raw.dt, tz).ok_or_else(|| bad_timestamp("dt"))?;

    let (condition, icon_code) = raw
        .weather
        .into_iter()
        .next()
        .map_or_else(|| (String::new(), "01d".to_string()), |w| (w.description, w.icon));

    Ok(WeatherRecord {
        city: raw.name.unwrap_or_else(|| queried_city.trim().to_string()),
        country: raw.sys.country,
        temperature: raw.main.temp,
        feels_like: raw.main.feels_like,
        temp_min: raw.main.temp_min,
        temp_max: raw.main.temp_max,
        condition,
        icon_code,
        humidity: raw.main.humidity,
        pressure: raw.main.pressure,
        visibility: units::visibility(raw.visibility, units_system),
        wind_speed: units::wind_speed(raw.wind.speed, units_system),
        wind_direction: WindDirection::from_degrees(raw.wind.deg),
        sunrise,
        sunset,
        observed_at,
        air_quality_index,
        units: units_system,
    })
}

/// Collapse the 3-hourly forecast into at most one point per local calendar
/// day: the sample whose local hour is closest to noon wins, ties going to
/// the earlier sample so input order does not matter. Output ascends by
/// date; the point matching `today` is labelled "Today", the rest get
/// weekday abbreviations.
pub(crate) fn daily_strip(
    raw: &ForecastResponse,
    today: NaiveDate,
) -> Result<Vec<ForecastPoint>, Error> {
    let tz = raw.city.timezone;

    let mut best: BTreeMap<NaiveDate, (i64, NaiveDateTime, usize)> = BTreeMap::new();
    for (ix, sample) in raw.list.iter().enumerate() {
        let local = to_local(sample.dt, tz).ok_or_else(|| bad_timestamp("forecast sample dt"))?;
        let distance = (i64::from(local.hour()) - 12).abs();

        best.entry(local.date())
            .and_modify(|slot| {
                if (distance, local) < (slot.0, slot.1) {
                    *slot = (distance, local, ix);
                }
            })
            .or_insert((distance, local, ix));
    }

    let strip = best
        .into_values()
        .map(|(_, local, ix)| {
            let sample = &raw.list[ix];
            let label = if local.date() == today {
                "Today".to_string()
            } else {
                local.format("%a").to_string()
            };

            ForecastPoint {
                label,
                timestamp: local,
                temperature: sample.main.temp,
                icon_code: sample
                    .weather
                    .first()
                    .map_or_else(|| "01d".to_string(), |w| w.icon.clone()),
                precipitation_probability: sample.pop,
            }
        })
        .collect();

    Ok(strip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use serde_json::json;

    fn current_from_json(value: serde_json::Value) -> CurrentResponse {
        serde_json::from_value(value).expect("current response should parse")
    }

    fn forecast_from_json(value: serde_json::Value) -> ForecastResponse {
        serde_json::from_value(value).expect("forecast response should parse")
    }

    fn london_current() -> serde_json::Value {
        json!({
            "coord": {"lat": 51.5073, "lon": -0.1276},
            "weather": [{"description": "light rain", "icon": "10d"}],
            "main": {
                "temp": 15.0,
                "feels_like": 14.0,
                "temp_min": 13.2,
                "temp_max": 16.1,
                "pressure": 1012,
                "humidity": 72
            },
            "visibility": 10000,
            "wind": {"speed": 5.0, "deg": 90},
            "dt": 1700000000,
            "sys": {"country": "GB", "sunrise": 1699946760, "sunset": 1699979580},
            "timezone": 0,
            "name": "London"
        })
    }

    #[test]
    fn london_metric_record() {
        let raw = current_from_json(london_current());
        let record = current_record(raw, "London", Units::Metric, None).expect("record builds");

        assert_eq!(record.city, "London");
        assert_eq!(record.country, "GB");
        assert_eq!(record.temperature, 15.0);
        assert_eq!(record.wind_speed, 18.0);
        assert_eq!(record.wind_direction, WindDirection::E);
        assert_eq!(record.visibility, 10.0);
        assert_eq!(record.condition, "light rain");
        assert_eq!(record.icon_code, "10d");
        assert_eq!(record.humidity, 72);
        assert_eq!(record.pressure, 1012);
        assert!(record.air_quality_index.is_none());
        // dt=1700000000 at offset 0 is 2023-11-14 22:13:20.
        assert_eq!(
            record.observed_at,
            NaiveDate::from_ymd_opt(2023, 11, 14).unwrap().and_hms_opt(22, 13, 20).unwrap()
        );
    }

    #[test]
    fn imperial_wind_and_visibility() {
        let raw = current_from_json(london_current());
        let record = current_record(raw, "London", Units::Imperial, None).expect("record builds");

        // Imperial responses already carry mph.
        assert_eq!(record.wind_speed, 5.0);
        assert_eq!(record.visibility, 6.2);
    }

    #[test]
    fn optional_fields_default_instead_of_failing() {
        let raw = current_from_json(json!({
            "coord": {"lat": 0.0, "lon": 0.0},
            "dt": 1700000000,
            "sys": {"sunrise": 1699946760, "sunset": 1699979580},
            "timezone": 3600
        }));
        let record = current_record(raw, "  Nowhere  ", Units::Metric, None).expect("record builds");

        assert_eq!(record.city, "Nowhere");
        assert_eq!(record.country, "");
        assert_eq!(record.temperature, 0.0);
        assert_eq!(record.condition, "");
        assert_eq!(record.icon_code, "01d");
        assert_eq!(record.humidity, 0);
        assert_eq!(record.visibility, 0.0);
        assert_eq!(record.wind_direction, WindDirection::N);
    }

    #[test]
    fn required_fields_fail_the_parse() {
        // No `sys` block at all: the response structure is unusable.
        let result: Result<CurrentResponse, _> = serde_json::from_value(json!({
            "coord": {"lat": 0.0, "lon": 0.0},
            "dt": 1700000000,
            "timezone": 0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn timestamps_use_the_place_offset() {
        let raw = current_from_json(json!({
            "coord": {"lat": 35.68, "lon": 139.69},
            "dt": 1700000000,
            "sys": {"sunrise": 1699999200, "sunset": 1700036400},
            "timezone": 32400
        }));
        let record = current_record(raw, "Tokyo", Units::Metric, None).expect("record builds");

        // 22:13:20 UTC + 9h.
        assert_eq!(
            record.observed_at,
            NaiveDate::from_ymd_opt(2023, 11, 15).unwrap().and_hms_opt(7, 13, 20).unwrap()
        );
    }

    #[test]
    fn out_of_range_timestamp_is_a_malformed_response() {
        let raw = current_from_json(json!({
            "coord": {"lat": 0.0, "lon": 0.0},
            "dt": i64::MAX,
            "sys": {"sunrise": 1699946760, "sunset": 1699979580},
            "timezone": 0
        }));
        let err = current_record(raw, "Nowhere", Units::Metric, None)
            .expect_err("unrepresentable dt must fail");

        assert!(matches!(err, Error::MalformedResponse(_)));
        assert!(err.to_string().contains("dt timestamp out of range"));
    }

    #[test]
    fn out_of_range_forecast_sample_is_a_malformed_response() {
        let raw = forecast_from_json(json!({
            "city": {"timezone": 0},
            "list": [sample(i64::MIN, 0.0, "01d", 0.0)]
        }));
        let err = daily_strip(&raw, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
            .expect_err("unrepresentable sample dt must fail");

        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn aqi_scale_maps_to_badge_values() {
        assert_eq!(bucket_aqi(1), Some(25));
        assert_eq!(bucket_aqi(3), Some(100));
        assert_eq!(bucket_aqi(5), Some(200));
        assert_eq!(bucket_aqi(0), None);
        assert_eq!(bucket_aqi(6), None);
        assert_eq!(bucket_aqi(-3), None);
    }

    // 2023-11-15 00:00 UTC.
    const DAY_START: i64 = 1_700_006_400;

    fn sample(dt: i64, temp: f64, icon: &str, pop: f64) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": {"temp": temp},
            "weather": [{"icon": icon}],
            "pop": pop
        })
    }

    #[test]
    fn picks_sample_closest_to_noon() {
        let raw = forecast_from_json(json!({
            "city": {"timezone": 0},
            "list": [
                sample(DAY_START + 9 * 3600, 10.0, "04d", 0.1),
                sample(DAY_START + 13 * 3600, 12.0, "10d", 0.4),
            ]
        }));
        let strip = daily_strip(&raw, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).expect("strip builds");

        assert_eq!(strip.len(), 1);
        // |13 - 12| beats |9 - 12|.
        assert_eq!(strip[0].temperature, 12.0);
        assert_eq!(strip[0].icon_code, "10d");
        assert_eq!(strip[0].precipitation_probability, 0.4);
        assert_eq!(strip[0].label, "Wed");
    }

    #[test]
    fn equidistant_samples_prefer_the_earlier_hour() {
        for reversed in [false, true] {
            let mut list = vec![
                sample(DAY_START + 9 * 3600, 9.0, "01d", 0.0),
                sample(DAY_START + 15 * 3600, 15.0, "01d", 0.0),
            ];
            if reversed {
                list.reverse();
            }
            let raw = forecast_from_json(json!({"city": {"timezone": 0}, "list": list}));
            let strip = daily_strip(&raw, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).expect("strip builds");

            assert_eq!(strip.len(), 1);
            assert_eq!(strip[0].temperature, 9.0);
        }
    }

    #[test]
    fn grouping_is_order_invariant() {
        let samples = vec![
            sample(DAY_START + 6 * 3600, 6.0, "01d", 0.0),
            sample(DAY_START + 12 * 3600, 12.0, "02d", 0.2),
            sample(DAY_START + 18 * 3600, 18.0, "03d", 0.3),
            sample(DAY_START + 36 * 3600, 36.0, "10d", 0.9),
            sample(DAY_START + 30 * 3600, 30.0, "04d", 0.5),
        ];

        let forward = forecast_from_json(json!({"city": {"timezone": 0}, "list": samples.clone()}));
        let mut shuffled = samples;
        shuffled.reverse();
        shuffled.swap(0, 2);
        let backward = forecast_from_json(json!({"city": {"timezone": 0}, "list": shuffled}));

        let today = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let a = daily_strip(&forward, today).expect("strip builds");
        let b = daily_strip(&backward, today).expect("strip builds");

        assert_eq!(a.len(), 2);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.timestamp, y.timestamp);
            assert_eq!(x.temperature, y.temperature);
            assert_eq!(x.label, y.label);
        }
        // Ascending by date, noon picked on both days.
        assert_eq!(a[0].temperature, 12.0);
        assert_eq!(a[1].temperature, 36.0);
        assert!(a[0].timestamp < a[1].timestamp);
    }

    #[test]
    fn grouping_respects_the_place_offset() {
        // 23:00 UTC on day one is 08:00 the next local day at UTC+9.
        let raw = forecast_from_json(json!({
            "city": {"timezone": 32400},
            "list": [sample(DAY_START + 23 * 3600, 5.0, "01n", 0.0)]
        }));
        let strip = daily_strip(&raw, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).expect("strip builds");

        assert_eq!(strip.len(), 1);
        assert_eq!(strip[0].timestamp.date(), NaiveDate::from_ymd_opt(2023, 11, 16).unwrap());
        assert_eq!(strip[0].timestamp.hour(), 8);
    }

    #[test]
    fn today_gets_the_today_label() {
        let raw = forecast_from_json(json!({
            "city": {"timezone": 0},
            "list": [
                sample(DAY_START + 12 * 3600, 12.0, "01d", 0.0),
                sample(DAY_START + 36 * 3600, 13.0, "01d", 0.0),
            ]
        }));
        let today = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        let strip = daily_strip(&raw, today).expect("strip builds");

        assert_eq!(strip[0].label, "Today");
        assert_eq!(strip[1].label, strip[1].timestamp.format("%a").to_string());
        assert_eq!(strip[1].timestamp.weekday().to_string(), "Thu");
    }

    #[test]
    fn empty_forecast_yields_empty_strip() {
        let raw = forecast_from_json(json!({"city": {"timezone": 0}, "list": []}));
        assert!(daily_strip(&raw, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).expect("strip builds").is_empty());
    }
}
