//! City validation strategies.
//!
//! The static list is the primary strategy; the live probe exists for
//! setups without a reference dataset and costs one extra provider call
//! per search.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::warn;

use crate::openweather::OpenWeatherClient;

#[async_trait]
pub trait CityValidator: Send + Sync {
    /// Decide whether `city` is worth querying the provider for.
    /// Empty or whitespace-only input is never valid.
    async fn is_valid(&self, city: &str) -> bool;
}

/// Case-insensitive membership check against a preloaded set of city names.
///
/// When the dataset cannot be loaded the validator degrades to the
/// "non-empty after trimming" rule instead of failing every search.
#[derive(Debug, Default)]
pub struct StaticListValidator {
    cities: Option<HashSet<String>>,
}

impl StaticListValidator {
    pub fn from_csv(path: &Path) -> Self {
        match load_city_set(path) {
            Ok(cities) => Self { cities: Some(cities) },
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "city dataset unavailable, falling back to non-empty check"
                );
                Self { cities: None }
            }
        }
    }

    #[cfg(test)]
    fn from_names<I: IntoIterator<Item = S>, S: Into<String>>(names: I) -> Self {
        Self {
            cities: Some(names.into_iter().map(|n| n.into().to_lowercase()).collect()),
        }
    }
}

#[async_trait]
impl CityValidator for StaticListValidator {
    async fn is_valid(&self, city: &str) -> bool {
        let trimmed = city.trim();
        if trimmed.is_empty() {
            return false;
        }

        match &self.cities {
            Some(cities) => cities.contains(&trimmed.to_lowercase()),
            None => true,
        }
    }
}

fn load_city_set(path: &Path) -> Result<HashSet<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open city dataset: {}", path.display()))?;

    let headers = reader.headers().context("Failed to read city dataset headers")?.clone();
    let city_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("city"))
        .with_context(|| format!("No 'city' column in {}", path.display()))?;

    let mut cities = HashSet::new();
    for record in reader.records() {
        let record = record.context("Failed to read city dataset row")?;
        if let Some(name) = record.get(city_col) {
            if !name.is_empty() {
                cities.insert(name.to_lowercase());
            }
        }
    }

    Ok(cities)
}

/// Asks the provider directly: a success status for a minimal
/// current-conditions request means the city resolves.
#[derive(Debug, Clone)]
pub struct ProbeValidator {
    client: OpenWeatherClient,
}

impl ProbeValidator {
    pub fn new(client: OpenWeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CityValidator for ProbeValidator {
    async fn is_valid(&self, city: &str) -> bool {
        let trimmed = city.trim();
        if trimmed.is_empty() {
            return false;
        }

        self.client.probe(trimmed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_dataset(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("skycast-{}-{name}.csv", std::process::id()));
        fs::write(&path, contents).expect("temp dataset should be writable");
        path
    }

    #[tokio::test]
    async fn membership_is_trimmed_and_case_folded() {
        let v = StaticListValidator::from_names(["Paris", "London"]);

        assert!(v.is_valid("  paris ").await);
        assert!(v.is_valid("LONDON").await);
        assert!(!v.is_valid("Atlantis").await);
    }

    #[tokio::test]
    async fn empty_input_is_invalid() {
        let v = StaticListValidator::from_names(["Paris"]);

        assert!(!v.is_valid("").await);
        assert!(!v.is_valid("   ").await);
    }

    #[tokio::test]
    async fn loads_city_column_from_csv() {
        let path = write_dataset(
            "ok",
            "city,lat,lng,country\nParis,48.86,2.35,France\n\"Rio de Janeiro\",-22.91,-43.20,Brazil\n",
        );
        let v = StaticListValidator::from_csv(&path);

        assert!(v.is_valid("paris").await);
        assert!(v.is_valid("rio de janeiro").await);
        assert!(!v.is_valid("Berlin").await);

        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn missing_dataset_degrades_to_non_empty_rule() {
        let v = StaticListValidator::from_csv(Path::new("/definitely/not/here.csv"));

        assert!(v.is_valid("Anywhere").await);
        assert!(!v.is_valid("  ").await);
    }

    #[tokio::test]
    async fn dataset_without_city_column_degrades() {
        let path = write_dataset("nocol", "town,population\nParis,2100000\n");
        let v = StaticListValidator::from_csv(&path);

        assert!(v.is_valid("Anywhere").await);

        let _ = fs::remove_file(path);
    }
}
