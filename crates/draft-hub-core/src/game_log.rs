// Per-game box score rows and per-player selection.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::player::PlayerId;

/// Columns that identify a game rather than describe a performance.
const NON_STAT_COLUMNS: &[&str] = &[
    "teamId",
    "opponentId",
    "isHome",
    "homeTeamAPTS",
    "visitorTeamAPTS",
];

/// One player's box score line for one game.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawGameLogRow")]
pub struct GameLogRow {
    pub player_id: PlayerId,
    pub game_id: Option<u64>,
    pub date: NaiveDateTime,
    pub team: Option<String>,
    pub opponent: Option<String>,
    pub stats: BTreeMap<String, f64>,
}

impl GameLogRow {
    pub fn new(player_id: PlayerId, date: NaiveDateTime) -> Self {
        GameLogRow {
            player_id,
            game_id: None,
            date,
            team: None,
            opponent: None,
            stats: BTreeMap::new(),
        }
    }

    pub fn with_game_id(mut self, game_id: u64) -> Self {
        self.game_id = Some(game_id);
        self
    }

    pub fn with_stat(mut self, name: impl Into<String>, value: f64) -> Self {
        self.stats.insert(name.into(), value);
        self
    }

    /// Numeric columns worth showing, identifier-like columns excluded.
    pub fn display_stats(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.stats
            .iter()
            .filter(|(key, _)| !NON_STAT_COLUMNS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), *value))
    }

    /// "TEAM vs OPP (YYYY-MM-DD)" label for a game picker.
    pub fn matchup_label(&self) -> String {
        format!(
            "{} vs {} ({})",
            self.team.as_deref().unwrap_or("?"),
            self.opponent.as_deref().unwrap_or("?"),
            self.date.date()
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized game date '{0}'")]
pub struct GameDateError(String);

#[derive(Debug, Deserialize)]
struct RawGameLogRow {
    #[serde(rename = "playerId")]
    player_id: PlayerId,
    #[serde(rename = "gameId", default)]
    game_id: Option<u64>,
    date: String,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    opponent: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<RawGameLogRow> for GameLogRow {
    type Error = GameDateError;

    fn try_from(raw: RawGameLogRow) -> Result<Self, Self::Error> {
        let date = parse_game_date(&raw.date).ok_or_else(|| GameDateError(raw.date.clone()))?;
        let stats = raw
            .extra
            .into_iter()
            .filter_map(|(key, value)| value.as_f64().map(|v| (key, v)))
            .collect();
        Ok(GameLogRow {
            player_id: raw.player_id,
            game_id: raw.game_id,
            date,
            team: raw.team,
            opponent: raw.opponent,
            stats,
        })
    }
}

/// Parse a game date. Accepts a bare date (midnight is assumed) or a
/// date-time separated by a space or `T`, with an optional trailing `Z`.
pub fn parse_game_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim().trim_end_matches('Z');
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// One player's games, most recent first.
///
/// Returns a fresh vector; `all_logs` is only read. Games on the same date
/// come back in no particular relative order. An unknown id yields an empty
/// vector.
pub fn logs_for_player(player_id: PlayerId, all_logs: &[GameLogRow]) -> Vec<GameLogRow> {
    let mut logs: Vec<GameLogRow> = all_logs
        .iter()
        .filter(|log| log.player_id == player_id)
        .cloned()
        .collect();
    logs.sort_unstable_by(|a, b| b.date.cmp(&a.date));
    logs
}
