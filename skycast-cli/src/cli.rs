use clap::{Parser, Subcommand};

use crate::render;
use skycast_core::{
    CityValidator, Config, Error, OpenWeatherClient, ProbeValidator, StaticListValidator, Units,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "City weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default unit system.
    Configure,

    /// Show current conditions and the daily forecast for a city.
    Show {
        /// City name, e.g. "London".
        city: String,

        /// Unit system for this lookup: "metric" or "imperial".
        /// Falls back to the configured default.
        #[arg(long)]
        units: Option<String>,

        /// Skip the multi-day forecast strip.
        #[arg(long)]
        no_forecast: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, units, no_forecast } => {
                show(&city, units.as_deref(), no_forecast).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    config.set_api_key(api_key);

    let units = inquire::Select::new(
        "Default unit system:",
        Units::all().iter().map(Units::as_str).collect(),
    )
    .prompt()?;
    config.units = Some(units.to_string());

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(city: &str, units: Option<&str>, no_forecast: bool) -> anyhow::Result<()> {
    let config = Config::load()?;

    let units = match units {
        Some(s) => Units::try_from(s)?,
        None => config.default_units()?,
    };

    let client = OpenWeatherClient::new(config.api_key()?.to_owned(), config.timeout())?;

    let city = city.trim();
    let valid = match config.cities_file.as_deref() {
        Some(path) => StaticListValidator::from_csv(path).is_valid(city).await,
        None => ProbeValidator::new(client.clone()).is_valid(city).await,
    };
    if !valid {
        return Err(Error::InvalidCity(city.to_string()).into());
    }

    let record = client.fetch_current(city, units).await?;
    render::current_card(&record);

    if !no_forecast {
        let strip = client.fetch_forecast(city, units).await?;
        render::forecast_strip(&strip);
    }

    Ok(())
}
