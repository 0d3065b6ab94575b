//! CLI commands for pace-api.
//!
//! Supports API server mode, analysis of a race JSON file, and live
//! analysis of races fetched from Yahoo! sports keiba.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::pace::analyze;
use crate::report::print_table;
use crate::scraper::{extract_race_id, meeting_race_id, RaceCardFetcher};
use crate::types::{PaceRequest, PaceResponse};

#[derive(Parser)]
#[command(name = "pace-api")]
#[command(version, about = "Pace formation forecasts for horse races", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyse a race JSON file
    Analyze {
        /// Path to race JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Fetch and analyse races of a meeting
    Live {
        /// Race card URL or 10-digit race id
        #[arg(value_name = "URL|ID")]
        target: String,

        /// Race numbers at the same meeting (default: the given race)
        #[arg(short, long, value_delimiter = ',')]
        races: Vec<u32>,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Ignore cached race cards
        #[arg(long)]
        no_cache: bool,
    },
}

fn print_response(response: &PaceResponse, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(response)?),
        _ => print_table(response),
    }
    Ok(())
}

/// Run analysis on a race file.
pub async fn run_analyze(input: PathBuf, format: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let input_json = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let req: PaceRequest = serde_json::from_str(&input_json)?;

    tracing::info!("Analysing {} runners from {}", req.horses.len(), input.display());

    let analysis = analyze(&req.context(), &req.horses, &config.pace)?;
    print_response(&PaceResponse::new(req.race_id, analysis), &format)
}

/// Race ids to fetch for a `live` invocation
fn target_race_ids(target: &str, races: &[u32]) -> anyhow::Result<Vec<String>> {
    let race_id = extract_race_id(target)
        .ok_or_else(|| anyhow!("No 10-digit race id found in {}", target))?;

    if races.is_empty() {
        return Ok(vec![race_id]);
    }

    let mut numbers = races.to_vec();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
        .into_iter()
        .map(|n| meeting_race_id(&race_id, n))
        .collect()
}

/// Fetch, parse and analyse one or more races.
pub async fn run_live(
    target: String,
    races: Vec<u32>,
    format: String,
    no_cache: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let race_ids = target_race_ids(&target, &races)?;

    let mut fetcher = RaceCardFetcher::new(config.scraper.clone(), !no_cache)?;
    let mut responses = Vec::new();

    for race_id in &race_ids {
        // One bad race should not stop the rest of the meeting
        let card = match fetcher.fetch(race_id).await {
            Ok(card) => card,
            Err(e) => {
                tracing::warn!("Skipping race {}: {:#}", race_id, e);
                continue;
            }
        };

        match analyze(&card.context(), &card.horses, &config.pace) {
            Ok(analysis) => responses.push(PaceResponse::new(Some(race_id.clone()), analysis)),
            Err(e) => tracing::warn!("Skipping race {}: {}", race_id, e),
        }
    }

    fetcher.close().await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&responses)?);
    } else {
        for response in &responses {
            print_table(response);
        }
    }

    if responses.is_empty() {
        return Err(anyhow!("No race could be analysed"));
    }
    Ok(())
}
