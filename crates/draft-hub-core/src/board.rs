// Big Board: prospects ordered by consensus scout rank, with hometown filters.

use std::collections::HashMap;

use crate::player::{non_blank, Player};
use crate::ranking::{average_rank, ScoutRanking};
use crate::season::InsertionSet;

/// A prospect on the board together with the rank record behind its slot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardEntry {
    pub player: Player,
    pub ranking: ScoutRanking,
    /// `f64::INFINITY` when no scout ranked the player.
    pub average_rank: f64,
}

impl BoardEntry {
    pub fn is_ranked(&self) -> bool {
        self.average_rank.is_finite()
    }
}

/// Hometown criteria. An unset or blank criterion matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilters {
    pub home_country: Option<String>,
    pub home_state: Option<String>,
    pub high_school: Option<String>,
}

impl BoardFilters {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.home_country).is_none()
            && non_blank(&self.home_state).is_none()
            && non_blank(&self.high_school).is_none()
    }

    pub fn matches(&self, player: &Player) -> bool {
        criterion_matches(&self.home_country, &player.home_country)
            && criterion_matches(&self.home_state, &player.home_state)
            && criterion_matches(&self.high_school, &player.high_school)
    }
}

fn criterion_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match non_blank(wanted) {
        None => true,
        Some(wanted) => actual.as_deref().map(str::trim) == Some(wanted),
    }
}

/// Distinct, non-blank values available for each filter, in board order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub home_countries: Vec<String>,
    pub home_states: Vec<String>,
    pub high_schools: Vec<String>,
}

/// Result of applying filters to the board.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome<'a> {
    /// At least one prospect matched.
    Applied(Vec<&'a BoardEntry>),
    /// Nothing matched; the filters were cleared and the full board is
    /// returned so the caller can tell the user.
    Reset(Vec<&'a BoardEntry>),
}

impl<'a> FilterOutcome<'a> {
    pub fn entries(&self) -> &[&'a BoardEntry] {
        match self {
            FilterOutcome::Applied(entries) | FilterOutcome::Reset(entries) => entries,
        }
    }

    pub fn was_reset(&self) -> bool {
        matches!(self, FilterOutcome::Reset(_))
    }
}

/// Prospects sorted by average scout rank, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BigBoard {
    entries: Vec<BoardEntry>,
}

impl BigBoard {
    /// Join bios with rank records and order them.
    ///
    /// Players without a rank record are left off the board. When a player
    /// has several records the first one wins. Ties keep bio order and
    /// unranked players (infinite average) sink to the bottom.
    pub fn build(players: &[Player], rankings: &[ScoutRanking]) -> Self {
        let mut by_id: HashMap<_, &ScoutRanking> = HashMap::new();
        for ranking in rankings {
            by_id.entry(ranking.player_id).or_insert(ranking);
        }

        let mut entries: Vec<BoardEntry> = players
            .iter()
            .filter_map(|player| {
                by_id.get(&player.player_id).map(|ranking| BoardEntry {
                    player: player.clone(),
                    ranking: (*ranking).clone(),
                    average_rank: average_rank(ranking),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.average_rank.total_cmp(&b.average_rank));

        BigBoard { entries }
    }

    pub fn entries(&self) -> &[BoardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            home_countries: distinct_values(&self.entries, |p| &p.home_country),
            home_states: distinct_values(&self.entries, |p| &p.home_state),
            high_schools: distinct_values(&self.entries, |p| &p.high_school),
        }
    }

    /// Entries matching `filters`, in board order.
    pub fn matching(&self, filters: &BoardFilters) -> Vec<&BoardEntry> {
        self.entries.iter().filter(|e| filters.matches(&e.player)).collect()
    }

    /// Apply `filters`, falling back to the whole board when nothing matches.
    pub fn apply(&self, filters: &BoardFilters) -> FilterOutcome<'_> {
        let matched = self.matching(filters);
        if matched.is_empty() && !self.entries.is_empty() {
            FilterOutcome::Reset(self.entries.iter().collect())
        } else {
            FilterOutcome::Applied(matched)
        }
    }
}

fn distinct_values(
    entries: &[BoardEntry],
    pick: impl Fn(&Player) -> &Option<String>,
) -> Vec<String> {
    entries
        .iter()
        .filter_map(|e| non_blank(pick(&e.player)).map(str::to_string))
        .collect::<InsertionSet<String>>()
        .into_vec()
}
