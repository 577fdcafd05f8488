//! Terminal rendering of weather records.

use chrono::NaiveDateTime;
use skycast_core::{ForecastPoint, WeatherRecord};

/// Number of days shown on the forecast strip.
const STRIP_DAYS: usize = 7;

/// 12-hour clock without a leading zero, e.g. "6:45 AM".
fn clock(dt: &NaiveDateTime) -> String {
    dt.format("%l:%M %p").to_string().trim_start().to_string()
}

fn feels_note(record: &WeatherRecord) -> Option<String> {
    let delta = record.feels_like - record.temperature;
    if delta.abs() < 1.0 {
        return None;
    }
    let label = if delta > 0.0 { "warmer" } else { "cooler" };
    Some(format!(
        "feels {label} by {:.0}{}",
        delta.abs(),
        record.units.temperature_suffix()
    ))
}

pub fn current_card(record: &WeatherRecord) {
    let place = if record.country.is_empty() {
        record.city.clone()
    } else {
        format!("{}, {}", record.city, record.country)
    };

    println!("{place}  (updated {})", record.observed_at.format("%b %d, %I:%M %p"));
    println!();
    println!(
        "  {:.0}{}  {}",
        record.temperature,
        record.units.temperature_suffix(),
        record.condition
    );

    let mut badges: Vec<String> = Vec::new();
    if let Some(note) = feels_note(record) {
        badges.push(note);
    }
    if let Some(aqi) = record.air_quality_index {
        badges.push(format!("AQI {aqi}"));
    }
    if !badges.is_empty() {
        println!("  [{}]", badges.join("] ["));
    }

    println!();
    println!("  Feels like   {:.0}°", record.feels_like);
    println!("  Low / High   {:.0}° / {:.0}°", record.temp_min, record.temp_max);
    println!("  Humidity     {}%", record.humidity);
    println!(
        "  Wind         {:.0} {} {}",
        record.wind_speed,
        record.units.wind_speed_suffix(),
        record.wind_direction
    );
    println!("  Pressure     {} hPa", record.pressure);
    println!(
        "  Visibility   {:.1} {}",
        record.visibility,
        record.units.visibility_suffix()
    );
    println!("  Sunrise      {}", clock(&record.sunrise));
    println!("  Sunset       {}", clock(&record.sunset));
}

pub fn forecast_strip(points: &[ForecastPoint]) {
    if points.is_empty() {
        return;
    }

    println!();
    println!("Forecast");
    for point in points.iter().take(STRIP_DAYS) {
        let rain = (point.precipitation_probability * 100.0).round() as u32;
        println!(
            "  {:<6} {:>4.0}°   {rain}% rain",
            point.label, point.temperature
        );
    }
}
