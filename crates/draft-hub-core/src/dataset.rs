// Data snapshot loading: JSON bundle plus optional CSV season-log export.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::board::BigBoard;
use crate::config::{Config, DataPaths};
use crate::game_log::GameLogRow;
use crate::player::{Measurements, Player, PlayerId};
use crate::ranking::ScoutRanking;
use crate::season::SeasonLogRow;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything the hub displays, loaded once and then only read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub player_bio: Vec<Player>,
    #[serde(default)]
    pub scout_rankings: Vec<ScoutRanking>,
    #[serde(default)]
    pub measurements: Vec<Measurements>,
    #[serde(default, deserialize_with = "game_log_rows")]
    pub game_logs: Vec<GameLogRow>,
    #[serde(default, deserialize_with = "season_log_rows")]
    pub season_logs: Vec<SeasonLogRow>,
}

impl Dataset {
    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.player_bio.iter().find(|p| p.player_id == player_id)
    }

    pub fn ranking_for(&self, player_id: PlayerId) -> Option<&ScoutRanking> {
        self.scout_rankings.iter().find(|r| r.player_id == player_id)
    }

    pub fn measurements_for(&self, player_id: PlayerId) -> Option<&Measurements> {
        self.measurements
            .iter()
            .find(|m| m.player_id == Some(player_id))
    }

    pub fn season_logs_for(&self, player_id: PlayerId) -> impl Iterator<Item = &SeasonLogRow> + '_ {
        self.season_logs
            .iter()
            .filter(move |row| row.player_id == player_id)
    }

    pub fn board(&self) -> BigBoard {
        BigBoard::build(&self.player_bio, &self.scout_rankings)
    }
}

// ---------------------------------------------------------------------------
// Row-tolerant arrays
// ---------------------------------------------------------------------------

/// Deserialize an array element by element, dropping rows that do not fit
/// `T` (a game date that will not parse, a missing id) with a warning.
fn tolerant_rows<'de, D, T>(deserializer: D, what: &str) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let mut rows = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("skipping malformed {} row {}: {}", what, index, e);
            }
        }
    }
    Ok(rows)
}

fn game_log_rows<'de, D>(deserializer: D) -> Result<Vec<GameLogRow>, D::Error>
where
    D: Deserializer<'de>,
{
    tolerant_rows(deserializer, "game log")
}

fn season_log_rows<'de, D>(deserializer: D) -> Result<Vec<SeasonLogRow>, D::Error>
where
    D: Deserializer<'de>,
{
    tolerant_rows(deserializer, "season log")
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, testable without temp files)
// ---------------------------------------------------------------------------

fn load_bundle_from_reader<R: Read>(rdr: R) -> Result<Dataset, serde_json::Error> {
    serde_json::from_reader(rdr)
}

fn load_season_logs_from_reader<R: Read>(rdr: R) -> Result<Vec<SeasonLogRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<SeasonLogRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("skipping malformed season log row: {}", e);
            }
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load a JSON bundle (`playerBio`, `scoutRankings`, `measurements`,
/// `gameLogs`, `seasonLogs`). Missing arrays load as empty.
pub fn load_bundle(path: &Path) -> Result<Dataset, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_bundle_from_reader(std::io::BufReader::new(file)).map_err(|e| DatasetError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load season logs from a CSV export with a header row.
pub fn load_season_logs_csv(path: &Path) -> Result<Vec<SeasonLogRow>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_season_logs_from_reader(file).map_err(|e| DatasetError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the snapshot named by the config.
pub fn load_all(config: &Config) -> Result<Dataset, DatasetError> {
    load_all_from_paths(&config.data)
}

/// Load the snapshot from explicit paths. The CSV season logs, when given,
/// are appended after the bundle's own season rows.
pub fn load_all_from_paths(paths: &DataPaths) -> Result<Dataset, DatasetError> {
    let mut dataset = load_bundle(Path::new(&paths.bundle))?;

    if let Some(csv_path) = &paths.season_csv {
        let rows = load_season_logs_csv(Path::new(csv_path))?;
        info!("Loaded {} season log rows from {}", rows.len(), csv_path);
        dataset.season_logs.extend(rows);
    }

    if dataset.player_bio.is_empty() {
        return Err(DatasetError::Validation(
            "bundle contains no player bios".into(),
        ));
    }

    info!(
        "Dataset ready: {} players, {} rank records, {} game logs, {} season rows",
        dataset.player_bio.len(),
        dataset.scout_rankings.len(),
        dataset.game_logs.len(),
        dataset.season_logs.len()
    );

    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
