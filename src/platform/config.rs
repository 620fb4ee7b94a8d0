// JobPulse - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for JobPulse configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/jobpulse/ or %APPDATA%\JobPulse\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[data]` section.
    pub data: DataSection,
    /// `[summary]` section.
    pub summary: SummarySection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[data]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Path of the cleaned CSV dataset.
    pub csv_path: Option<String>,
    /// Read ambiguous `a/b/yyyy` dates day-first.
    pub day_first: Option<bool>,
}

/// `[summary]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SummarySection {
    pub top_locations: Option<usize>,
    pub top_skills: Option<usize>,
    pub top_benefits: Option<usize>,
    pub sample_rows: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Data --
    pub csv_path: PathBuf,
    pub day_first: bool,

    // -- Summary --
    pub top_locations: usize,
    pub top_skills: usize,
    pub top_benefits: usize,
    pub sample_rows: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(constants::DEFAULT_DATA_CSV_PATH),
            day_first: false,
            top_locations: constants::DEFAULT_TOP_LOCATIONS,
            top_skills: constants::DEFAULT_TOP_SKILLS,
            top_benefits: constants::DEFAULT_TOP_BENEFITS,
            sample_rows: constants::DEFAULT_SAMPLE_ROWS,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults and a warning;
/// the application still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let (config, parse_warnings) = parse_config(&content, config_path);
    warnings.extend(parse_warnings);
    if warnings.is_empty() {
        tracing::info!(path = %config_path.display(), "Loaded config.toml");
    }
    (config, warnings)
}

/// Parse and validate config.toml text. `origin` is used in messages only.
pub fn parse_config(content: &str, origin: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let raw: RawConfig = match toml::from_str(content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: origin.to_path_buf(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let mut config = AppConfig::default();

    // -- Data --
    if let Some(ref path) = raw.data.csv_path {
        if path.trim().is_empty() {
            warnings.push(format!(
                "[data] csv_path is empty. Using default ({}).",
                constants::DEFAULT_DATA_CSV_PATH
            ));
        } else {
            config.csv_path = PathBuf::from(path);
        }
    }
    if let Some(day_first) = raw.data.day_first {
        config.day_first = day_first;
    }

    // -- Summary sizes --
    let sizes: [(&str, Option<usize>, &mut usize); 4] = [
        ("top_locations", raw.summary.top_locations, &mut config.top_locations),
        ("top_skills", raw.summary.top_skills, &mut config.top_skills),
        ("top_benefits", raw.summary.top_benefits, &mut config.top_benefits),
        ("sample_rows", raw.summary.sample_rows, &mut config.sample_rows),
    ];
    for (field, value, slot) in sizes {
        if let Some(n) = value {
            if (1..=constants::MAX_TOP_N).contains(&n) {
                *slot = n;
            } else {
                let err = ConfigError::ValueOutOfRange {
                    field: format!("summary.{field}"),
                    value: n.to_string(),
                    expected: format!("1-{}", constants::MAX_TOP_N),
                };
                warnings.push(format!("{err}. Using default ({}).", *slot));
            }
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (AppConfig, Vec<String>) {
        parse_config(text, Path::new("config.toml"))
    }

    #[test]
    fn test_empty_config_is_default() {
        let (config, warnings) = parse("");
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_applied() {
        let (config, warnings) = parse(
            r#"
            [data]
            csv_path = "exports/jobs.csv"
            day_first = true

            [summary]
            top_skills = 25

            [logging]
            level = "DEBUG"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.csv_path, PathBuf::from("exports/jobs.csv"));
        assert!(config.day_first);
        assert_eq!(config.top_skills, 25);
        assert_eq!(config.top_locations, constants::DEFAULT_TOP_LOCATIONS);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_default() {
        let (config, warnings) = parse(
            r#"
            [summary]
            top_locations = 0
            sample_rows = 5000

            [logging]
            level = "loud"
            "#,
        );
        assert_eq!(warnings.len(), 3);
        assert_eq!(config.top_locations, constants::DEFAULT_TOP_LOCATIONS);
        assert_eq!(config.sample_rows, constants::DEFAULT_SAMPLE_ROWS);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (_, warnings) = parse("[ui]\ntheme = \"dark\"\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_malformed_toml_falls_back() {
        let (config, warnings) = parse("[data\ncsv_path = ");
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[summary]\ntop_benefits = 3\n").unwrap();
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty());
        assert_eq!(config.top_benefits, 3);
    }
}
