// JobPulse - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Dataset loading through the cache
// 4. Filtering, the text report and optional export

use jobpulse::app;
use jobpulse::core::export;
use jobpulse::core::filter::FilterState;
use jobpulse::core::model::RoleLabel;
use jobpulse::core::normalizer::NormalizeConfig;
use jobpulse::core::summary::SummaryConfig;
use jobpulse::platform;
use jobpulse::util;
use jobpulse::util::error::{ExportError, JobPulseError};

use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

/// JobPulse - job-market dashboard for cleaned job-posting data.
///
/// Loads a cleaned job-postings CSV, normalises it, and prints a summary of
/// the filtered view.
#[derive(Parser, Debug)]
#[command(name = "jobpulse", version, about)]
struct Cli {
    /// Cleaned CSV dataset (defaults to the configured path).
    csv: Option<PathBuf>,

    /// Only rows from this source (e.g. VietnamWorks, CareerViet).
    #[arg(short = 's', long = "source")]
    source: Option<String>,

    /// Only rows with this primary location.
    #[arg(short = 'l', long = "location")]
    location: Option<String>,

    /// Only rows in this role group (e.g. "Data Analyst").
    #[arg(short = 'r', long = "role", value_parser = parse_role)]
    role: Option<RoleLabel>,

    /// Lower bound of minimum experience in years.
    #[arg(long = "exp-min")]
    exp_min: Option<i64>,

    /// Upper bound of minimum experience in years.
    #[arg(long = "exp-max")]
    exp_max: Option<i64>,

    /// Case-insensitive regex matched against job titles.
    #[arg(short = 't', long = "title")]
    title: Option<String>,

    /// Print sample rows of the filtered view.
    #[arg(long = "sample")]
    sample: bool,

    /// Write the filtered view to a .csv or .json file.
    #[arg(short = 'o', long = "export")]
    export: Option<PathBuf>,

    /// Config file (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_role(text: &str) -> Result<RoleLabel, String> {
    RoleLabel::from_label(text).ok_or_else(|| {
        let valid: Vec<&str> = RoleLabel::all().iter().map(|r| r.label()).collect();
        format!("unknown role '{text}'. Valid roles: {}", valid.join(", "))
    })
}

fn build_filter(cli: &Cli) -> Result<FilterState, JobPulseError> {
    let mut filter = FilterState {
        source: cli.source.clone(),
        location: cli.location.clone(),
        role: cli.role,
        ..Default::default()
    };
    if cli.exp_min.is_some() || cli.exp_max.is_some() {
        filter.set_experience_range(
            cli.exp_min.unwrap_or(util::constants::DEFAULT_EXPERIENCE_MIN),
            cli.exp_max.unwrap_or(util::constants::DEFAULT_EXPERIENCE_MAX),
        )?;
    }
    if let Some(ref pattern) = cli.title {
        filter.set_title_pattern(pattern)?;
    }
    Ok(filter)
}

fn export_view(state: &app::state::AppState, path: &Path) -> Result<usize, ExportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let write_json = match extension.as_deref() {
        Some("csv") => false,
        Some("json") => true,
        _ => {
            return Err(ExportError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    let file = platform::fs::create_for_write(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let writer = std::io::BufWriter::new(file);
    if write_json {
        export::export_json(&state.table, &state.filtered_indices, writer, path)
    } else {
        export::export_csv(&state.table, &state.filtered_indices, writer, path)
    }
}

fn main() {
    let cli = Cli::parse();

    // Config first so its logging section can shape the subscriber.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_file());
    let (config, config_warnings) = platform::config::load_config(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref(), config.log_file.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "JobPulse starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let filter = match build_filter(&cli) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let csv_path = cli.csv.clone().unwrap_or_else(|| config.csv_path.clone());
    let normalize_config = NormalizeConfig {
        day_first: config.day_first,
        ..Default::default()
    };
    let mut cache = app::loader::DatasetCache::new();
    let outcome = cache.load(&csv_path, &normalize_config);

    let mut state = app::state::AppState::new(outcome);

    if let Some(ref err) = state.load_error {
        tracing::error!(error = %err, "Dataset load failed");
        eprintln!("{}", JobPulseError::from(err.clone()));
        std::process::exit(1);
    }
    if state.table.is_empty() {
        tracing::warn!(path = %csv_path.display(), "Dataset contains no rows");
        eprintln!("Warning: '{}' contains no rows.", csv_path.display());
    }

    state.set_filter(filter);

    let report_config = app::report::ReportConfig {
        show_sample: cli.sample,
        sample_rows: config.sample_rows,
        summary: SummaryConfig {
            top_locations: config.top_locations,
            top_skills: config.top_skills,
            top_benefits: config.top_benefits,
        },
        ..Default::default()
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = app::report::render_report(&mut out, &state, &report_config) {
        tracing::error!(error = %e, "Failed to write report");
        std::process::exit(1);
    }
    let _ = out.flush();

    if let Some(ref path) = cli.export {
        match export_view(&state, path) {
            Ok(count) => {
                tracing::info!(path = %path.display(), rows = count, "Export complete");
                eprintln!("Exported {count} rows to {}", path.display());
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("{}", JobPulseError::from(e));
                std::process::exit(1);
            }
        }
    }
}
