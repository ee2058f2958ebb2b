// Command-line definition and plain-text rendering of hub views.

use std::fmt::Write;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use draft_hub_core::board::BoardFilters;
use draft_hub_core::config::Config;
use draft_hub_core::dataset::Dataset;
use draft_hub_core::game_log::{logs_for_player, GameLogRow};
use draft_hub_core::player::PlayerId;
use draft_hub_core::profile::PlayerProfile;
use draft_hub_core::ranking::RankTone;
use draft_hub_core::season::{aggregate_seasons, SeasonTotals};
use tracing::{info, warn};

/// Number of recent games shown on a profile.
const PROFILE_GAMES: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "draft-hub")]
#[command(about = "Draft scouting hub: big board, prospect profiles and stat lines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Big board, best consensus rank first
    Board {
        /// Only prospects from this home country
        #[arg(long)]
        country: Option<String>,
        /// Only prospects from this home state
        #[arg(long)]
        state: Option<String>,
        /// Only prospects from this high school
        #[arg(long)]
        school: Option<String>,
    },
    /// Full prospect profile
    Profile {
        player_id: PlayerId,
        /// Compute ages as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Season totals across leagues
    Seasons { player_id: PlayerId },
    /// Game logs, newest first
    Games { player_id: PlayerId },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(
    command: &Command,
    data: &Dataset,
    config: &Config,
    today: NaiveDate,
) -> anyhow::Result<String> {
    let output = match command {
        Command::Board {
            country,
            state,
            school,
        } => {
            let mut filters = config.board.filters();
            if country.is_some() {
                filters.home_country = country.clone();
            }
            if state.is_some() {
                filters.home_state = state.clone();
            }
            if school.is_some() {
                filters.high_school = school.clone();
            }
            render_board(data, &filters)?
        }
        Command::Profile {
            player_id,
            today: today_override,
        } => {
            let as_of = today_override.unwrap_or(today);
            let profile = PlayerProfile::assemble(data, *player_id, as_of)
                .ok_or_else(|| anyhow!("no player with id {player_id}"))?;
            render_profile(&profile)?
        }
        Command::Seasons { player_id } => {
            let totals = aggregate_seasons(data.season_logs_for(*player_id));
            render_seasons(&totals)?
        }
        Command::Games { player_id } => {
            let logs = logs_for_player(*player_id, &data.game_logs);
            render_games(&logs)?
        }
    };
    Ok(output)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn format_rank(rank: f64) -> String {
    if rank.is_finite() {
        format!("{rank:.2}")
    } else {
        "N/A".to_string()
    }
}

/// Whole numbers print without decimals; everything else with one.
fn format_stat(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn render_board(data: &Dataset, filters: &BoardFilters) -> Result<String, std::fmt::Error> {
    let board = data.board();
    let outcome = board.apply(filters);
    let mut out = String::new();

    if outcome.was_reset() {
        warn!("Board filters matched nobody; showing the full board");
        writeln!(out, "No players match the selected filters. Filters have been reset.\n")?;
    }

    writeln!(out, "{:>3}  {:<28} {:>8}  Hometown", "#", "Player", "Avg Rank")?;
    for (slot, entry) in outcome.entries().iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<28} {:>8}  {}",
            slot + 1,
            entry.player.display_name(),
            format_rank(entry.average_rank),
            entry.player.hometown_line()
        )?;
    }

    info!("Rendered board with {} of {} players", outcome.entries().len(), board.len());
    Ok(out)
}

fn render_profile(profile: &PlayerProfile) -> Result<String, std::fmt::Error> {
    let player = &profile.player;
    let mut out = String::new();

    writeln!(out, "{}", player.display_name())?;
    if let Some(position) = &player.position {
        writeln!(out, "  Position:   {position}")?;
    }
    if let Some(team) = &player.team {
        writeln!(out, "  Team:       {team}")?;
    }
    if let Some(age) = profile.age {
        writeln!(out, "  Age:        {age}")?;
    }
    if let Some(height) = player.height {
        writeln!(out, "  Height:     {}\"", format_stat(height))?;
    }
    if let Some(weight) = player.weight {
        writeln!(out, "  Weight:     {} lbs", format_stat(weight))?;
    }
    let hometown = player.hometown_line();
    if !hometown.is_empty() {
        writeln!(out, "  Hometown:   {hometown}")?;
    }
    if let Some(school) = &player.high_school {
        writeln!(out, "  School:     {school}")?;
    }
    if let Some(nationality) = &player.nationality {
        writeln!(out, "  Nationality: {nationality}")?;
    }

    if let Some(rank) = profile.average_rank {
        writeln!(out, "\nScout Rankings (avg {})", format_rank(rank))?;
        for opinion in &profile.scouts {
            let marker = match opinion.tone {
                RankTone::Favorable => "+",
                RankTone::Unfavorable => "-",
                RankTone::Neutral => " ",
            };
            let rank = opinion
                .rank
                .map(format_stat)
                .unwrap_or_else(|| "N/A".to_string());
            writeln!(out, "  {marker} {:<28} {rank:>6}", opinion.scout)?;
        }
    }

    if !profile.measurements.is_empty() {
        writeln!(out, "\nMeasurements")?;
        for reading in &profile.measurements {
            writeln!(
                out,
                "  {:<20} {} {}",
                reading.label,
                format_stat(reading.value),
                reading.unit
            )?;
        }
    }

    if !profile.game_logs.is_empty() {
        writeln!(out, "\nRecent Games")?;
        for game in profile.game_logs.iter().take(PROFILE_GAMES) {
            writeln!(out, "  {}", game.matchup_label())?;
        }
    }

    if !profile.season_totals.is_empty() {
        writeln!(out)?;
        out.push_str(&render_seasons(&profile.season_totals)?);
    }

    Ok(out)
}

fn render_seasons(totals: &SeasonTotals) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    if totals.is_empty() {
        writeln!(out, "No season logs.")?;
        return Ok(out);
    }
    for total in totals {
        writeln!(out, "Season: {}", total.season)?;
        let leagues: Vec<&str> = total.leagues.iter().map(String::as_str).collect();
        writeln!(out, "  Leagues: {}", leagues.join(", "))?;
        for (name, value) in &total.stats {
            writeln!(out, "  {:<8} {}", name, format_stat(*value))?;
        }
    }
    Ok(out)
}

fn render_games(logs: &[GameLogRow]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    if logs.is_empty() {
        writeln!(out, "No game logs.")?;
        return Ok(out);
    }
    for game in logs {
        writeln!(out, "{}", game.matchup_label())?;
        let line: Vec<String> = game
            .display_stats()
            .map(|(name, value)| format!("{}: {}", name.to_uppercase(), format_stat(value)))
            .collect();
        writeln!(out, "  {}", line.join("  "))?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use draft_hub_core::config::{BoardDefaults, DataPaths};
    use draft_hub_core::game_log::parse_game_date;
    use draft_hub_core::player::Player;
    use draft_hub_core::ranking::ScoutRanking;
    use draft_hub_core::season::SeasonLogRow;

    fn parse(list: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("draft-hub").chain(list.iter().copied()))
            .map(|cli| cli.command)
    }

    fn config() -> Config {
        Config {
            data: DataPaths {
                bundle: "unused.json".into(),
                season_csv: None,
            },
            board: BoardDefaults::default(),
        }
    }

    fn data() -> Dataset {
        let mut first = Player::new(1);
        first.name = Some("Dylan Harper".into());
        first.home_country = Some("USA".into());
        let mut second = Player::new(2);
        second.name = Some("Egor Demin".into());
        second.home_country = Some("Russia".into());

        Dataset {
            player_bio: vec![first, second],
            scout_rankings: vec![
                ScoutRanking::new(1).with_rank("A", Some(2.0)).with_rank("B", Some(2.5)),
                ScoutRanking::new(2).with_rank("A", Some(9.0)).with_rank("B", None),
            ],
            measurements: vec![],
            game_logs: vec![GameLogRow::new(1, parse_game_date("2025-01-04").unwrap())
                .with_stat("pts", 24.0)
                .with_stat("teamId", 3.0)],
            season_logs: vec![SeasonLogRow::new(1, 2025)
                .in_league("NCAA")
                .with_stat("FGM", 7.0)
                .with_stat("FGA", 16.0)],
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_board_flags() {
        let command = parse(&["board", "--country", "USA", "--school=IMG"]).unwrap();
        assert_eq!(
            command,
            Command::Board {
                country: Some("USA".into()),
                state: None,
                school: Some("IMG".into()),
            }
        );
    }

    #[test]
    fn parses_profile_with_today() {
        let command = parse(&["profile", "12", "--today", "2025-06-25"]).unwrap();
        assert_eq!(
            command,
            Command::Profile {
                player_id: 12,
                today: NaiveDate::from_ymd_opt(2025, 6, 25),
            }
        );
        assert_eq!(
            parse(&["profile", "12"]).unwrap(),
            Command::Profile {
                player_id: 12,
                today: None,
            }
        );
    }

    #[test]
    fn help_is_a_display_request() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["draft"]).is_err());
        assert!(parse(&["games", "seven"]).is_err());
        assert!(parse(&["games", "7", "8"]).is_err());
        assert!(parse(&["board", "--country"]).is_err());
        assert!(parse(&["profile", "1", "--today", "tomorrow"]).is_err());
    }

    #[test]
    fn board_output_lists_best_rank_first() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let command = Command::Board {
            country: None,
            state: None,
            school: None,
        };
        let out = run(&command, &data(), &config(), today).unwrap();
        let harper = out.find("Dylan Harper").unwrap();
        let demin = out.find("Egor Demin").unwrap();
        assert!(harper < demin);
        assert!(out.contains("2.25"));
        assert!(!out.contains("reset"));
    }

    #[test]
    fn board_reset_is_reported() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let command = Command::Board {
            country: Some("Brazil".into()),
            state: None,
            school: None,
        };
        let out = run(&command, &data(), &config(), today).unwrap();
        assert!(out.contains("Filters have been reset"));
        assert!(out.contains("Egor Demin"));
    }

    #[test]
    fn seasons_output_shows_recomputed_percentage() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let out = run(&Command::Seasons { player_id: 1 }, &data(), &config(), today).unwrap();
        assert!(out.contains("Season: 2025"));
        assert!(out.contains("Leagues: NCAA"));
        assert!(out.contains("43.8"));
    }

    #[test]
    fn games_output_hides_identifier_columns() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let out = run(&Command::Games { player_id: 1 }, &data(), &config(), today).unwrap();
        assert!(out.contains("PTS: 24"));
        assert!(!out.contains("TEAMID"));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let command = Command::Profile {
            player_id: 77,
            today: None,
        };
        assert!(run(&command, &data(), &config(), today).is_err());
    }
}
