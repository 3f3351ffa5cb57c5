//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the text menu or a single subcommand
//! - fetches data, writes charts and prints summaries

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::chart::build_chart_spec;
use crate::cli::menu::{self, MAIN_MENU, MENU_TITLE, MenuAction};
use crate::cli::{CleanArgs, Command, RenderArgs};
use crate::data::NytClient;
use crate::domain::{AppConfig, ChartStyle, MetricKey};
use crate::error::AppError;
use crate::report::{format_chart_table, format_fetch_summary};

pub mod pipeline;

use pipeline::ChartRun;

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    // Settings may come from a `.env` file; clap reads them through `env = ...`.
    dotenvy::dotenv().ok();
    init_tracing();

    // `covid` and `covid -o charts` behave like `covid menu ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Menu(args) => handle_menu(&args),
        Command::States(args) => handle_charts(&args, None),
        Command::Counties(args) => {
            let state = menu::validate_state_name(&args.state)
                .ok_or_else(|| AppError::new(2, format!("'{}' is not a valid U.S. State.", args.state)))?;
            handle_charts(&args.render, Some(state))
        }
        Command::Clean(args) => handle_clean(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_charts(args: &RenderArgs, scope: Option<&str>) -> Result<(), AppError> {
    let config = app_config_from_args(args);
    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create output directory '{}': {e}", config.output_dir.display()),
        )
    })?;

    let client = NytClient::new(config.timeout)?;
    let run = pipeline::run_charts(&client, &config, scope)?;

    print!("{}", run_report(&run, &config.style, args.top));
    Ok(())
}

/// Terminal report for one run: the fetch summary, then per chart its top
/// `top` rows (out of everything drawn) and the file written.
fn run_report(run: &ChartRun, style: &ChartStyle, top: usize) -> String {
    let mut out = format_fetch_summary(run.granularity, run.scope.as_deref(), &run.records, run.retrieved_at);
    out.push('\n');
    for (metric, path) in &run.charts {
        let drawn = build_chart_spec(&run.records, *metric, run.scope.as_deref(), style.max_bars);
        out.push_str(&format_chart_table(&drawn, top));
        out.push('\n');
        out.push_str(&format!("Created chart: {}\n\n", path.display()));
    }
    out
}

fn handle_clean(args: &CleanArgs) -> Result<(), AppError> {
    remove_charts(&args.output_dir)
}

fn remove_charts(dir: &Path) -> Result<(), AppError> {
    let removed = crate::io::remove_chart_files(dir)?;
    for path in &removed {
        println!("Deleted: {}", path.display());
    }
    println!("Deleted {} chart file(s) from {}.", removed.len(), dir.display());
    Ok(())
}

/// The text menu. Pipeline errors are reported and the menu is shown again,
/// so the user can decide whether to retry.
fn handle_menu(args: &RenderArgs) -> Result<(), AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    loop {
        let Some(choice) = menu::num_menu(&mut input, &mut output, MENU_TITLE, &MAIN_MENU)? else {
            break;
        };

        let result = match MenuAction::from_choice(choice) {
            Some(MenuAction::States) => handle_charts(args, None),
            Some(MenuAction::Counties) => match menu::prompt_state(&mut input, &mut output)? {
                Some(state) => handle_charts(args, Some(state)),
                None => break,
            },
            Some(MenuAction::Clean) => remove_charts(&args.output_dir),
            Some(MenuAction::Exit) | None => break,
        };

        if let Err(err) = result {
            println!("ERROR: {err}");
        }
        output
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write output: {e}")))?;
    }

    println!("Exiting Program. Thank you!");
    Ok(())
}

pub fn app_config_from_args(args: &RenderArgs) -> AppConfig {
    let mut metrics: Vec<MetricKey> = Vec::new();
    for &metric in &args.metrics {
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    if metrics.is_empty() {
        metrics = MetricKey::ALL.to_vec();
    }

    AppConfig {
        states_url: args.states_url.clone(),
        counties_url: args.counties_url.clone(),
        timeout: Duration::from_secs(args.timeout_secs.max(1)),
        output_dir: args.output_dir.clone(),
        metrics,
        style: ChartStyle::default(),
    }
}

/// Rewrite argv so `covid` defaults to `covid menu`.
///
/// Rules:
/// - `covid`                      -> `covid menu`
/// - `covid -o charts ...`        -> `covid menu -o charts ...`
/// - `covid --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("menu".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "menu" | "states" | "counties" | "clean");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "menu flags".
    if arg1.starts_with('-') {
        argv.insert(1, "menu".to_string());
        return argv;
    }

    argv
}
