use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use weathermap_core::geocode::nominatim::NominatimGeocoder;
use weathermap_core::weather::weatherapi::WeatherApiProvider;
use weathermap_core::{Config, Coordinate, Selection, SelectionOrchestrator, SelectionState};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathermap", version, about = "Map-point weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com credential.
    Configure,

    /// Show weather for a coordinate, like clicking a point on the map.
    At {
        /// Latitude in decimal degrees, -90 to 90.
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        /// Longitude in decimal degrees, -180 to 180.
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Search for a place by name and show its weather.
    Search {
        /// Place name, e.g. "Yunlin, Taiwan".
        query: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::At { latitude, longitude } => {
                let coordinate = Coordinate::new(latitude, longitude)?;
                let orchestrator = build_orchestrator()?;

                orchestrator.select_by_coordinate(coordinate).await?;
                print_state(&orchestrator.current());
                Ok(())
            }
            Command::Search { query } => {
                let orchestrator = build_orchestrator()?;

                match orchestrator.select_by_place_name(&query).await? {
                    Some(coordinate) => {
                        // The coordinate a map view would recenter on.
                        println!("Found {coordinate}");
                        print_state(&orchestrator.current());
                        Ok(())
                    }
                    None => Err(anyhow!("Nothing to search for: the query is empty.")),
                }
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("WeatherAPI.com API key:")
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key cannot be empty."));
    }

    config.set_weather_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_orchestrator() -> Result<SelectionOrchestrator> {
    let config = Config::load()?;
    let api_key = config.require_weather_api_key()?.to_owned();

    Ok(SelectionOrchestrator::new(
        Arc::new(NominatimGeocoder::new()),
        Arc::new(WeatherApiProvider::new(api_key)),
    ))
}

fn print_state(state: &SelectionState) {
    match state {
        SelectionState::Ready(selection) => print!("{}", render_selection(selection)),
        // The select calls only return Ok once the state is ready; anything
        // else here means a bug upstream, not a user mistake.
        other => eprintln!("No data to show (state: {other:?})"),
    }
}

/// Info panel plus the past-week table, oldest day first.
fn render_selection(selection: &Selection) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", selection.place_name);
    let _ = writeln!(out, "  Latitude:  {:.4}", selection.coordinate.latitude);
    let _ = writeln!(out, "  Longitude: {:.4}", selection.coordinate.longitude);
    let _ = writeln!(
        out,
        "  Current:   {:.1}\u{b0}C, {}",
        selection.current.temperature_c, selection.current.condition
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "  Past week:");
    for sample in &selection.history {
        let _ = writeln!(out, "    {}  {:5.1}\u{b0}C", sample.date, sample.avg_temperature_c);
    }

    out
}
