use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use serde::Serialize;
use weather_core::{
    Config, CycleOutcome, DayBucketMap, LocationResolver, OpenWeatherClient, PermissionPolicy,
    Units, WeatherAggregator, WeatherReport, WeatherSession,
};

use crate::{prompt::InquirePrompt, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key, units and location permission.
    Configure,

    /// Show weather for a city, or for this device's location when no city is given.
    Show {
        /// City name, e.g. "Helsinki" or "Paris,FR".
        city: Option<String>,

        /// Unit system; defaults to the configured one.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,

        /// Show the 3-hour entries of a day (yyyy-MM-dd). Repeat to expand several days.
        #[arg(long, value_name = "DAY")]
        expand: Vec<String>,

        /// Show the 3-hour entries of every day.
        #[arg(long, conflicts_with = "expand")]
        all: bool,

        /// Print the report and day buckets as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn parse_units(value: &str) -> Result<Units, String> {
    Units::try_from(value).map_err(|e| e.to_string())
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    report: &'a WeatherReport,
    days: DayBucketMap,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, units, expand, all, json } => {
                show(city.as_deref(), units, &expand, all, json).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(starting_cursor(Units::all(), &config.units))
        .prompt()
        .context("Failed to read units")?;

    let policies = vec![PermissionPolicy::Ask, PermissionPolicy::Granted, PermissionPolicy::Denied];
    let cursor = starting_cursor(&policies, &config.location_permission);
    config.location_permission = Select::new("Use this device's location:", policies)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read location permission")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Index of the stored value, so a `Select` opens on the current choice.
fn starting_cursor<T: PartialEq>(options: &[T], current: &T) -> usize {
    options.iter().position(|o| o == current).unwrap_or(0)
}

async fn show(
    city: Option<&str>,
    units: Option<Units>,
    expand: &[String],
    all: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let units = units.unwrap_or(config.units);

    let client = OpenWeatherClient::from_config(&config)?;
    let prompt = InquirePrompt;
    let resolver = LocationResolver::new(
        Box::new(client.clone()),
        config.position_service(Some(Box::new(prompt))),
    );
    let aggregator = WeatherAggregator::new(Box::new(client));

    let mut session = WeatherSession::new();

    if session.run_cycle(&resolver, &aggregator, city, units).await != CycleOutcome::Updated {
        bail!("{}", session.error().unwrap_or("Unable to get weather data"));
    }

    let Some(report) = session.report() else {
        bail!("Unable to get weather data");
    };
    let days = session.day_buckets();

    if json {
        let out = JsonOutput { report, days };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let expanded = |day: &str| all || expand.iter().any(|d| d == day);
    let mut text = String::new();
    render::current(&report.current, report.units, &mut text)?;
    text.push('\n');
    render::forecast(&report.forecast.city_name, &days, report.units, expanded, &mut text)?;
    print!("{text}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weather_core::{CurrentConditions, ForecastEntry, ForecastSet, bucket_by_day};

    fn sample_report() -> WeatherReport {
        WeatherReport {
            current: CurrentConditions {
                location_name: "Helsinki".into(),
                temperature: -3.4,
                feels_like: -8.1,
                temp_min: -4.0,
                temp_max: -2.9,
                humidity_pct: 86,
                pressure_hpa: 1021,
                wind_speed: 4.63,
            },
            forecast: ForecastSet {
                city_name: "Helsinki".into(),
                entries: vec![
                    ForecastEntry::new("2024-01-02 00:00:00", 5.0),
                    ForecastEntry::new("2024-01-01 00:00:00", 10.0),
                    ForecastEntry::new("2024-01-01 12:00:00", 20.0),
                ],
            },
            units: Units::Metric,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn json_output_carries_report_and_ordered_days() {
        let report = sample_report();
        let out = JsonOutput { report: &report, days: bucket_by_day(&report.forecast) };

        let json = serde_json::to_string_pretty(&out).expect("serializable");
        let later = json.find("\"2024-01-02\":").expect("later day key");
        let earlier = json.find("\"2024-01-01\":").expect("earlier day key");
        assert!(later < earlier, "{json}");

        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["report"]["current"]["location_name"], "Helsinki");
        assert_eq!(value["report"]["current"]["pressure_hpa"], 1021);
        assert_eq!(value["report"]["units"], "metric");
        assert_eq!(value["report"]["forecast"]["entries"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["days"]["2024-01-01"]["avg_temp"], 15.0);
        assert_eq!(value["days"]["2024-01-01"]["min_temp"], 10.0);
        assert_eq!(value["days"]["2024-01-01"]["max_temp"], 20.0);
        assert_eq!(value["days"]["2024-01-02"]["avg_temp"], 5.0);
    }

    #[test]
    fn selects_open_on_the_stored_choice() {
        let policies = [PermissionPolicy::Ask, PermissionPolicy::Granted, PermissionPolicy::Denied];
        assert_eq!(starting_cursor(&policies, &PermissionPolicy::Denied), 2);
        assert_eq!(starting_cursor(&policies, &PermissionPolicy::Ask), 0);
        assert_eq!(starting_cursor(Units::all(), &Units::Standard), 2);
        assert_eq!(starting_cursor(&[Units::Metric], &Units::Imperial), 0);
    }

    #[test]
    fn show_without_city_uses_device_location() {
        let cli = Cli::try_parse_from(["weather", "show"]).expect("valid args");
        match cli.command {
            Command::Show { city, units, expand, all, json } => {
                assert!(city.is_none());
                assert!(units.is_none());
                assert!(expand.is_empty());
                assert!(!all && !json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn show_parses_units_and_expanded_days() {
        let cli = Cli::try_parse_from([
            "weather",
            "show",
            "Helsinki",
            "--units",
            "imperial",
            "--expand",
            "2024-01-01",
            "--expand",
            "2024-01-02",
        ])
        .expect("valid args");

        match cli.command {
            Command::Show { city, units, expand, .. } => {
                assert_eq!(city.as_deref(), Some("Helsinki"));
                assert_eq!(units, Some(Units::Imperial));
                assert_eq!(expand, vec!["2024-01-01", "2024-01-02"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_units_are_rejected() {
        let err = Cli::try_parse_from(["weather", "show", "--units", "furlongs"]).unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn all_conflicts_with_expand() {
        assert!(
            Cli::try_parse_from(["weather", "show", "--all", "--expand", "2024-01-01"]).is_err()
        );
    }
}
