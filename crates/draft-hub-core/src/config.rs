// Configuration loading and parsing (hub.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::board::BoardFilters;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "hub.toml";

#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataPaths,
    pub board: BoardDefaults,
}

/// Raw deserialization target for hub.toml.
#[derive(Debug, Clone, Deserialize)]
struct HubFile {
    data: DataPaths,
    #[serde(default)]
    board: BoardDefaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// JSON bundle with bios, rankings, measurements and logs.
    pub bundle: String,
    /// Optional CSV export of season logs, appended to the bundle's rows.
    #[serde(default)]
    pub season_csv: Option<String>,
}

/// Filters applied to the board when none are given on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardDefaults {
    #[serde(default)]
    pub home_country: Option<String>,
    #[serde(default)]
    pub home_state: Option<String>,
    #[serde(default)]
    pub high_school: Option<String>,
}

impl BoardDefaults {
    pub fn filters(&self) -> BoardFilters {
        BoardFilters {
            home_country: self.home_country.clone(),
            home_state: self.home_state.clone(),
            high_school: self.high_school.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/hub.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let file: HubFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        data: file.data,
        board: file.board,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let mut src =
                    std::fs::File::open(&path).map_err(|e| ConfigError::DefaultsCopyError {
                        message: format!("failed to read {}: {e}", path.display()),
                    })?;
                std::io::copy(&mut src, &mut dest).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                })?;
                copied.push(target);
            }
            // Already present in config/; the user's copy wins.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Loads config relative to the current working directory, copying
/// defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.bundle.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.bundle".into(),
            message: "must not be empty".into(),
        });
    }

    if let Some(csv) = &config.data.season_csv {
        if csv.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "data.season_csv".into(),
                message: "must be omitted or non-empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Fresh scratch directory under the system temp dir.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("draft_hub_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_config(base: &Path, body: &str) {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(CONFIG_FILE), body).unwrap();
    }

    #[test]
    fn loads_minimal_config() {
        let tmp = scratch("config_minimal");
        write_config(&tmp, "[data]\nbundle = \"data/bundle.json\"\n");

        let config = load_config_from(&tmp).expect("should load");
        assert_eq!(config.data.bundle, "data/bundle.json");
        assert!(config.data.season_csv.is_none());
        assert!(config.board.filters().is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn loads_board_defaults() {
        let tmp = scratch("config_board");
        write_config(
            &tmp,
            "[data]\nbundle = \"b.json\"\nseason_csv = \"s.csv\"\n\n[board]\nhome_country = \"USA\"\n",
        );

        let config = load_config_from(&tmp).expect("should load");
        assert_eq!(config.data.season_csv.as_deref(), Some("s.csv"));
        let filters = config.board.filters();
        assert_eq!(filters.home_country.as_deref(), Some("USA"));
        assert!(filters.home_state.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_bundle_path() {
        let tmp = scratch("config_empty_bundle");
        write_config(&tmp, "[data]\nbundle = \"  \"\n");

        let err = load_config_from(&tmp).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "data.bundle"),
            other => panic!("expected ValidationError, got {other:?}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_blank_season_csv() {
        let tmp = scratch("config_blank_csv");
        write_config(&tmp, "[data]\nbundle = \"b.json\"\nseason_csv = \"\"\n");

        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "data.season_csv"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = scratch("config_missing");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = scratch("config_invalid");
        write_config(&tmp, "[data\nbundle = ");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_and_skips_examples() {
        let tmp = scratch("config_copy");
        let defaults = tmp.join("defaults");
        fs::create_dir_all(&defaults).unwrap();
        fs::write(defaults.join(CONFIG_FILE), "[data]\nbundle = \"b.json\"\n").unwrap();
        fs::write(defaults.join("hub.toml.example"), "# sample\n").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, vec![tmp.join("config").join(CONFIG_FILE)]);
        assert!(!tmp.join("config/hub.toml.example").exists());

        let again = ensure_config_files(&tmp).unwrap();
        assert!(again.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_keeps_existing() {
        let tmp = scratch("config_keep");
        let defaults = tmp.join("defaults");
        fs::create_dir_all(&defaults).unwrap();
        fs::write(defaults.join(CONFIG_FILE), "[data]\nbundle = \"default.json\"\n").unwrap();
        write_config(&tmp, "[data]\nbundle = \"mine.json\"\n");

        let copied = ensure_config_files(&tmp).unwrap();
        assert!(copied.is_empty());
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.data.bundle, "mine.json");
        assert_eq!(
            fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap(),
            "[data]\nbundle = \"mine.json\"\n"
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = scratch("config_nothing");
        let err = ensure_config_files(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }
}
