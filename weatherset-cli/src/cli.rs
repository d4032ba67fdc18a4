use anyhow::{Context, Result, anyhow};
use chrono::DateTime;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use weatherset_core::{
    CodeRange, Config, Observation, analysis, model::read_observations,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherset", version, about = "Query sets of weather observations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Source {
    /// JSON file holding an array of observations.
    #[arg(long, short)]
    pub file: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a weather code range to a status label.
    Configure {
        /// Status label, e.g. "drizzle".
        label: String,

        /// Code range such as "300-321"; prompted for when absent.
        #[arg(long)]
        range: Option<String>,
    },

    /// Check observations against a status label.
    Status {
        #[command(flatten)]
        source: Source,

        /// Lowercase status label, e.g. "rain".
        status: String,

        /// List every matching observation instead of a yes/no answer.
        #[arg(long)]
        all: bool,
    },

    /// Show observations whose description contains any keyword.
    Filter {
        #[command(flatten)]
        source: Source,

        #[arg(required = true)]
        keywords: Vec<String>,
    },

    /// Show the time span of the observations.
    Coverage {
        #[command(flatten)]
        source: Source,

        /// Check whether this time (UNIX seconds or RFC 3339) is covered.
        #[arg(long, value_parser = parse_time)]
        at: Option<i64>,
    },

    /// Show the observation closest to a time.
    Closest {
        #[command(flatten)]
        source: Source,

        /// UNIX seconds or RFC 3339.
        #[arg(long, value_parser = parse_time)]
        at: i64,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { label, range } => {
                let raw = match range {
                    Some(r) => r,
                    None => inquire::Text::new(&format!("Code range for '{label}':"))
                        .with_help_message("a single code like 800 or a span like 500-531")
                        .prompt()
                        .context("Failed to read code range")?,
                };
                let range: CodeRange = raw.parse()?;

                let mut cfg = Config::load()?;
                cfg.upsert_status_range(&label, range)?;
                cfg.save()?;

                println!(
                    "Added {range} to '{}' in {}",
                    label.trim().to_lowercase(),
                    Config::config_file_path()?.display()
                );
            }
            Command::Status { source, status, all } => {
                let observations = read_observations(&source.file)?;
                let registry = Config::load()?.registry();

                if all {
                    let matching = analysis::filter_by_status(&observations, &status, &registry)?;
                    print_observations(&matching);
                } else {
                    let found = analysis::any_status_is(&observations, &status, &registry)?;
                    println!("{}", if found { "yes" } else { "no" });
                }
            }
            Command::Filter { source, keywords } => {
                let observations = read_observations(&source.file)?;
                let matching = analysis::filter_by_matching_statuses(&keywords, &observations);
                print_observations(&matching);
            }
            Command::Coverage { source, at } => {
                let observations = read_observations(&source.file)?;
                match at {
                    Some(ts) => {
                        let covered = analysis::is_in_coverage(ts, &observations);
                        println!("{}", if covered { "yes" } else { "no" });
                    }
                    None => match analysis::coverage(&observations) {
                        Some((min, max)) => {
                            println!("{} .. {}", format_time(min), format_time(max))
                        }
                        None => println!("No observations."),
                    },
                }
            }
            Command::Closest { source, at } => {
                let observations = read_observations(&source.file)?;
                match analysis::find_closest_weather(&observations, at)? {
                    Some(obs) => println!("{}", format_observation(obs)),
                    None => println!("No observations."),
                }
            }
        }

        Ok(())
    }
}

/// Accepts UNIX seconds or an RFC 3339 datetime.
pub fn parse_time(s: &str) -> Result<i64> {
    if let Ok(ts) = s.trim().parse::<i64>() {
        return Ok(ts);
    }

    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.timestamp())
        .map_err(|_| anyhow!("Invalid time '{s}'. Use UNIX seconds or RFC 3339, e.g. 2024-05-01T12:00:00Z"))
}

fn format_time(ts: i64) -> String {
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => format!("{} ({ts})", dt.format("%Y-%m-%d %H:%M UTC")),
        None => ts.to_string(),
    }
}

fn format_observation(obs: &Observation) -> String {
    let mut line = format!(
        "{}  [{}] {}",
        format_time(obs.reference_time),
        obs.weather_code,
        obs.detailed_status
    );
    if let Some(t) = obs.temperature_c {
        line.push_str(&format!(", {t:.1}°C"));
    }
    if let Some(h) = obs.humidity_pct {
        line.push_str(&format!(", {h}%"));
    }
    if let Some(w) = obs.wind_speed_mps {
        line.push_str(&format!(", {w:.1} m/s"));
    }
    line
}

fn print_observations(observations: &[&Observation]) {
    if observations.is_empty() {
        println!("No matching observations.");
        return;
    }
    for obs in observations {
        println!("{}", format_observation(obs));
    }
}
