// Per-player profile assembled from a dataset snapshot.

use chrono::NaiveDate;
use tracing::debug;

use crate::dataset::Dataset;
use crate::game_log::{logs_for_player, GameLogRow};
use crate::player::{MeasurementReading, Player, PlayerId};
use crate::ranking::{average_rank, scout_breakdown, ScoutOpinion};
use crate::report::ReportNotebook;
use crate::season::{aggregate_seasons, SeasonTotals};

/// Everything the profile view shows for one prospect.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProfile {
    pub player: Player,
    pub age: Option<i32>,
    /// `None` without a rank record; infinite when the record has no ranks.
    pub average_rank: Option<f64>,
    pub scouts: Vec<ScoutOpinion>,
    pub measurements: Vec<MeasurementReading>,
    /// Most recent game first.
    pub game_logs: Vec<GameLogRow>,
    pub season_totals: SeasonTotals,
    /// Starts empty for every profile visit.
    pub reports: ReportNotebook,
}

impl PlayerProfile {
    /// Build the profile for `player_id`, with ages computed as of `today`.
    ///
    /// Returns `None` for an unknown player. Related records that are
    /// missing leave their part of the profile empty.
    pub fn assemble(dataset: &Dataset, player_id: PlayerId, today: NaiveDate) -> Option<Self> {
        let player = dataset.player(player_id)?.clone();
        let ranking = dataset.ranking_for(player_id);

        let profile = PlayerProfile {
            age: player.age_on(today),
            average_rank: ranking.map(average_rank),
            scouts: ranking.map(scout_breakdown).unwrap_or_default(),
            measurements: dataset
                .measurements_for(player_id)
                .map(|m| m.readings())
                .unwrap_or_default(),
            game_logs: logs_for_player(player_id, &dataset.game_logs),
            season_totals: aggregate_seasons(dataset.season_logs_for(player_id)),
            reports: ReportNotebook::new(),
            player,
        };

        debug!(
            "Assembled profile for player {}: {} games, {} seasons",
            player_id,
            profile.game_logs.len(),
            profile.season_totals.len()
        );

        Some(profile)
    }

    /// The game with `game_id`, if the player has one.
    pub fn game(&self, game_id: u64) -> Option<&GameLogRow> {
        self.game_logs.iter().find(|g| g.game_id == Some(game_id))
    }
}
