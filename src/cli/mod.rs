//! Command-line parsing for the NYT COVID-19 chart tool.
//!
//! The goal of this module is to keep **argument parsing** and **prompting**
//! separate from fetching and rendering.
//!
//! Every setting can also come from the environment (or a `.env` file, loaded
//! before parsing); an explicit flag wins.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_TIMEOUT_SECS, Granularity, MetricKey};

pub mod menu;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "covid",
    version,
    about = "COVID-19 bar charts from The New York Times live data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive text menu (the default when no subcommand is given).
    Menu(RenderArgs),
    /// Create/update charts for all U.S. states.
    States(RenderArgs),
    /// Create/update charts for the counties of one state.
    Counties(CountyArgs),
    /// Delete previously rendered chart files.
    Clean(CleanArgs),
}

/// Options shared by every command that fetches and renders.
#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Directory the SVG charts are written to.
    #[arg(short = 'o', long, env = "NYT_COVID_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Metrics to chart (repeatable). Defaults to all of them.
    #[arg(short = 'm', long = "metric", value_enum)]
    pub metrics: Vec<MetricKey>,

    /// HTTP timeout in seconds for the CSV download.
    #[arg(long, env = "NYT_COVID_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// State-level CSV location.
    #[arg(long, env = "NYT_COVID_STATES_URL", default_value_t = Granularity::State.default_url())]
    pub states_url: String,

    /// County-level CSV location.
    #[arg(long, env = "NYT_COVID_COUNTIES_URL", default_value_t = Granularity::County.default_url())]
    pub counties_url: String,

    /// Rows of each chart to print in the terminal.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

/// Options for county-level charts.
#[derive(Debug, Args, Clone)]
pub struct CountyArgs {
    /// State whose counties are charted (case-insensitive, e.g. "new york").
    #[arg(short = 's', long)]
    pub state: String,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// Options for deleting rendered charts.
#[derive(Debug, Args, Clone)]
pub struct CleanArgs {
    /// Directory to clean.
    #[arg(short = 'o', long, env = "NYT_COVID_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,
}
