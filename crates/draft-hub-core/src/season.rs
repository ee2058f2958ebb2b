// Season log aggregation: per-league rows folded into season totals with
// shooting percentages recomputed from summed makes and attempts.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::player::PlayerId;

/// Season identifier as it appears in the logs (e.g. 2025).
pub type Season = i32;

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

/// One player's line for one season in one league.
///
/// Contextual columns are typed; every other numeric column lands in `stats`
/// under its source name (`PTS`, `FGM`, `3PA`, `FG%`, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSeasonLogRow")]
pub struct SeasonLogRow {
    pub player_id: PlayerId,
    pub season: Season,
    pub league: Option<String>,
    pub team: Option<String>,
    pub age: Option<String>,
    pub stats: BTreeMap<String, f64>,
}

impl SeasonLogRow {
    pub fn new(player_id: PlayerId, season: Season) -> Self {
        SeasonLogRow {
            player_id,
            season,
            league: None,
            team: None,
            age: None,
            stats: BTreeMap::new(),
        }
    }

    /// Builder-style league label, mostly for fixtures.
    pub fn in_league(mut self, league: impl Into<String>) -> Self {
        self.league = Some(league.into());
        self
    }

    /// Builder-style stat value, mostly for fixtures.
    pub fn with_stat(mut self, name: impl Into<String>, value: f64) -> Self {
        self.stats.insert(name.into(), value);
        self
    }
}

/// Wire shape shared by the JSON bundle and CSV exports. Unknown columns
/// are absorbed by `extra`; only numeric ones survive into `stats`.
#[derive(Debug, Deserialize)]
struct RawSeasonLogRow {
    #[serde(rename = "playerId")]
    player_id: PlayerId,
    #[serde(rename = "Season")]
    season: Season,
    #[serde(rename = "League", default)]
    league: Option<String>,
    #[serde(rename = "Team", default)]
    team: Option<String>,
    #[serde(default)]
    age: Option<serde_json::Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl From<RawSeasonLogRow> for SeasonLogRow {
    fn from(raw: RawSeasonLogRow) -> Self {
        let stats = raw
            .extra
            .into_iter()
            .filter_map(|(key, value)| value.as_f64().map(|v| (key, v)))
            .collect();
        SeasonLogRow {
            player_id: raw.player_id,
            season: raw.season,
            league: raw.league.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            team: raw.team.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            age: raw.age.and_then(|v| match v {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
            stats,
        }
    }
}

// ---------------------------------------------------------------------------
// Insertion-ordered set
// ---------------------------------------------------------------------------

/// A small set that remembers first-insertion order. Lookups are linear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionSet<T> {
    items: Vec<T>,
}

impl<T> Default for InsertionSet<T> {
    fn default() -> Self {
        InsertionSet { items: Vec::new() }
    }
}

impl<T: PartialEq> InsertionSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` unless an equal item is already present. Returns whether
    /// it was added.
    pub fn insert(&mut self, item: T) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: PartialEq> FromIterator<T> for InsertionSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = InsertionSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Percentage rules
// ---------------------------------------------------------------------------

/// A percentage column and the make/attempt columns it is derived from.
#[derive(Debug, Clone, Copy)]
pub struct ShootingSplit {
    pub percentage: &'static str,
    pub made: &'static str,
    pub attempted: &'static str,
}

pub const FIELD_GOALS: ShootingSplit = ShootingSplit {
    percentage: "FG%",
    made: "FGM",
    attempted: "FGA",
};

pub const THREE_POINTERS: ShootingSplit = ShootingSplit {
    percentage: "3P%",
    made: "3PM",
    attempted: "3PA",
};

pub const FREE_THROWS: ShootingSplit = ShootingSplit {
    percentage: "FTP",
    made: "FT",
    attempted: "FTA",
};

pub const TWO_POINTERS: ShootingSplit = ShootingSplit {
    percentage: "FG2%",
    made: "FG2M",
    attempted: "FG2A",
};

pub const SHOOTING_SPLITS: [ShootingSplit; 4] =
    [FIELD_GOALS, THREE_POINTERS, FREE_THROWS, TWO_POINTERS];

/// Effective field goal percentage column (threes weighted 1.5x). Derived
/// only when `FGM`, `FGA` and `3PM` are all present.
pub const EFFECTIVE_FG: &str = "eFG%";

/// Columns that hold a ratio and therefore must never be summed.
fn is_percentage_field(key: &str) -> bool {
    key.contains('%') || key == FREE_THROWS.percentage
}

/// `made / attempted` as a percentage rounded to one decimal place, or
/// `None` when there were no attempts.
fn shooting_percentage(made: f64, attempted: f64) -> Option<f64> {
    if attempted > 0.0 {
        Some(round_one_decimal(made / attempted * 100.0))
    } else {
        None
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Replace summed ratio columns with values derived from summed counts.
/// Ratios with no attempts, and ratio columns without a derivation rule,
/// are dropped.
fn recompute_percentages(stats: &mut BTreeMap<String, f64>) {
    stats.retain(|key, _| !is_percentage_field(key));

    let mut derived: Vec<(&'static str, f64)> = Vec::new();
    for split in SHOOTING_SPLITS {
        if let (Some(&made), Some(&attempted)) = (stats.get(split.made), stats.get(split.attempted)) {
            if let Some(pct) = shooting_percentage(made, attempted) {
                derived.push((split.percentage, pct));
            }
        }
    }

    if let (Some(&fgm), Some(&fga), Some(&threes)) = (
        stats.get(FIELD_GOALS.made),
        stats.get(FIELD_GOALS.attempted),
        stats.get(THREE_POINTERS.made),
    ) {
        if let Some(pct) = shooting_percentage(fgm + 0.5 * threes, fga) {
            derived.push((EFFECTIVE_FG, pct));
        }
    }

    for (key, value) in derived {
        stats.insert(key.to_string(), value);
    }
}

// ---------------------------------------------------------------------------
// Season totals
// ---------------------------------------------------------------------------

/// Summed line for one season across every league the player appeared in.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonTotal {
    pub season: Season,
    pub leagues: InsertionSet<String>,
    pub stats: BTreeMap<String, f64>,
}

impl SeasonTotal {
    fn new(season: Season) -> Self {
        SeasonTotal {
            season,
            leagues: InsertionSet::new(),
            stats: BTreeMap::new(),
        }
    }

    pub fn stat(&self, name: &str) -> Option<f64> {
        self.stats.get(name).copied()
    }
}

/// Season totals in order of each season's first appearance in the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonTotals {
    entries: Vec<SeasonTotal>,
}

impl SeasonTotals {
    pub fn get(&self, season: Season) -> Option<&SeasonTotal> {
        self.entries.iter().find(|t| t.season == season)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeasonTotal> {
        self.entries.iter()
    }

    pub fn seasons(&self) -> Vec<Season> {
        self.entries.iter().map(|t| t.season).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a SeasonTotals {
    type Item = &'a SeasonTotal;
    type IntoIter = std::slice::Iter<'a, SeasonTotal>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Fold season log rows into per-season totals.
///
/// Rows sharing a season are summed column by column; league labels are
/// collected once each in first-seen order. Player id, age, team and season
/// are contextual and never summed. Afterwards every percentage column is
/// rebuilt from the summed makes and attempts (see [`SHOOTING_SPLITS`] and
/// [`EFFECTIVE_FG`]); a percentage whose attempts total zero is omitted.
///
/// The caller is expected to pass one player's rows. Input is only read.
pub fn aggregate_seasons<'a, I>(rows: I) -> SeasonTotals
where
    I: IntoIterator<Item = &'a SeasonLogRow>,
{
    let mut entries: Vec<SeasonTotal> = Vec::new();
    let mut index: HashMap<Season, usize> = HashMap::new();
    let mut row_count = 0usize;

    for row in rows {
        row_count += 1;
        let slot = *index.entry(row.season).or_insert_with(|| {
            entries.push(SeasonTotal::new(row.season));
            entries.len() - 1
        });
        let total = &mut entries[slot];

        if let Some(league) = &row.league {
            total.leagues.insert(league.clone());
        }
        for (key, value) in &row.stats {
            *total.stats.entry(key.clone()).or_insert(0.0) += value;
        }
    }

    for total in &mut entries {
        recompute_percentages(&mut total.stats);
    }

    debug!(
        "aggregated {} season rows into {} season totals",
        row_count,
        entries.len()
    );

    SeasonTotals { entries }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row(season: Season, league: &str) -> SeasonLogRow {
        SeasonLogRow::new(1, season).in_league(league)
    }

    #[test]
    fn same_league_rows_sum_and_dedupe() {
        let rows = vec![
            row(2023, "NCAA").with_stat("FGM", 5.0).with_stat("FGA", 10.0),
            row(2023, "NCAA").with_stat("FGM", 3.0).with_stat("FGA", 10.0),
        ];
        let totals = aggregate_seasons(&rows);
        assert_eq!(totals.len(), 1);

        let t = totals.get(2023).unwrap();
        assert_eq!(t.stat("FGM"), Some(8.0));
        assert_eq!(t.stat("FGA"), Some(20.0));
        assert_eq!(t.stat("FG%"), Some(40.0));
        assert_eq!(t.leagues.as_slice(), ["NCAA".to_string()]);
    }

    #[test]
    fn two_leagues_in_one_season() {
        let rows = vec![
            row(2024, "G League").with_stat("PTS", 120.0).with_stat("GP", 8.0),
            row(2024, "NBA").with_stat("PTS", 30.0).with_stat("GP", 4.0),
            row(2024, "G League").with_stat("PTS", 10.0).with_stat("GP", 1.0),
        ];
        let totals = aggregate_seasons(&rows);
        let t = totals.get(2024).unwrap();
        assert_eq!(t.leagues.as_slice(), ["G League".to_string(), "NBA".to_string()]);
        assert_eq!(t.stat("PTS"), Some(160.0));
        assert_eq!(t.stat("GP"), Some(13.0));
    }

    #[test]
    fn naive_percentage_sums_are_replaced() {
        let rows = vec![
            row(2023, "NCAA")
                .with_stat("3PM", 2.0)
                .with_stat("3PA", 5.0)
                .with_stat("3P%", 40.0)
                .with_stat("FT", 9.0)
                .with_stat("FTA", 10.0)
                .with_stat("FTP", 90.0),
            row(2023, "NCAA")
                .with_stat("3PM", 1.0)
                .with_stat("3PA", 5.0)
                .with_stat("3P%", 20.0)
                .with_stat("FT", 6.0)
                .with_stat("FTA", 10.0)
                .with_stat("FTP", 60.0),
        ];
        let totals = aggregate_seasons(&rows);
        let t = totals.get(2023).unwrap();
        assert_eq!(t.stat("3P%"), Some(30.0));
        assert_eq!(t.stat("FTP"), Some(75.0));
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        let rows = vec![row(2023, "NCAA").with_stat("FGM", 1.0).with_stat("FGA", 3.0)];
        let totals = aggregate_seasons(&rows);
        assert_eq!(totals.get(2023).unwrap().stat("FG%"), Some(33.3));

        let rows = vec![row(2023, "NCAA").with_stat("FGM", 2.0).with_stat("FGA", 3.0)];
        let totals = aggregate_seasons(&rows);
        assert_eq!(totals.get(2023).unwrap().stat("FG%"), Some(66.7));
    }

    #[test]
    fn zero_attempts_omit_percentage() {
        let rows = vec![row(2023, "NCAA")
            .with_stat("3PM", 0.0)
            .with_stat("3PA", 0.0)
            .with_stat("3P%", 0.0)
            .with_stat("FT", 0.0)
            .with_stat("FTA", 0.0)];
        let totals = aggregate_seasons(&rows);
        let t = totals.get(2023).unwrap();
        assert_eq!(t.stat("3P%"), None);
        assert_eq!(t.stat("FTP"), None);
        assert_eq!(t.stat("3PA"), Some(0.0));
    }

    #[test]
    fn two_point_and_effective_percentages() {
        let rows = vec![row(2023, "NCAA")
            .with_stat("FGM", 10.0)
            .with_stat("FGA", 20.0)
            .with_stat("3PM", 4.0)
            .with_stat("FG2M", 6.0)
            .with_stat("FG2A", 8.0)
            .with_stat("eFG%", 999.0)];
        let totals = aggregate_seasons(&rows);
        let t = totals.get(2023).unwrap();
        assert_eq!(t.stat("FG2%"), Some(75.0));
        assert_eq!(t.stat("eFG%"), Some(60.0));
    }

    #[test]
    fn effective_fg_needs_three_point_makes() {
        let rows = vec![row(2023, "NCAA")
            .with_stat("FGM", 5.0)
            .with_stat("FGA", 10.0)
            .with_stat("eFG%", 55.0)];
        let totals = aggregate_seasons(&rows);
        let t = totals.get(2023).unwrap();
        assert_eq!(t.stat("FG%"), Some(50.0));
        assert_eq!(t.stat("eFG%"), None);

        let rows = vec![row(2023, "NCAA")
            .with_stat("FGM", 5.0)
            .with_stat("FGA", 10.0)
            .with_stat("3PM", 0.0)];
        let totals = aggregate_seasons(&rows);
        assert_eq!(totals.get(2023).unwrap().stat("eFG%"), Some(50.0));
    }

    #[test]
    fn underivable_percentage_columns_are_dropped() {
        let rows = vec![row(2023, "NCAA").with_stat("TS%", 55.0).with_stat("PTS", 10.0)];
        let totals = aggregate_seasons(&rows);
        let t = totals.get(2023).unwrap();
        assert_eq!(t.stat("TS%"), None);
        assert_eq!(t.stat("PTS"), Some(10.0));
    }

    #[test]
    fn seasons_keep_first_seen_order() {
        let rows = vec![row(2024, "NBA"), row(2023, "NCAA"), row(2024, "NBA")];
        let totals = aggregate_seasons(&rows);
        assert_eq!(totals.seasons(), vec![2024, 2023]);
    }

    #[test]
    fn order_does_not_change_sums() {
        let rows = vec![
            row(2023, "NCAA").with_stat("FGM", 5.0).with_stat("FGA", 11.0),
            row(2024, "NBA").with_stat("FGM", 2.0).with_stat("FGA", 7.0),
            row(2023, "NCAA").with_stat("FGM", 4.0).with_stat("FGA", 9.0),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let forward = aggregate_seasons(&rows);
        let backward = aggregate_seasons(&reversed);
        for season in [2023, 2024] {
            assert_eq!(forward.get(season).unwrap().stats, backward.get(season).unwrap().stats);
        }
    }

    #[test]
    fn empty_input_gives_empty_totals() {
        let totals = aggregate_seasons(&Vec::<SeasonLogRow>::new());
        assert!(totals.is_empty());
    }

    #[test]
    fn rows_without_league_add_no_label() {
        let rows = vec![SeasonLogRow::new(1, 2023).with_stat("PTS", 4.0)];
        let totals = aggregate_seasons(&rows);
        assert!(totals.get(2023).unwrap().leagues.is_empty());
    }

    #[test]
    fn idempotent_and_input_untouched() {
        let rows = vec![row(2023, "NCAA").with_stat("FGM", 5.0).with_stat("FGA", 10.0)];
        let snapshot = rows.clone();
        assert_eq!(aggregate_seasons(&rows), aggregate_seasons(&rows));
        assert_eq!(rows, snapshot);
    }

    #[test]
    fn contextual_columns_are_not_stats() {
        let json = r#"{
            "playerId": 3, "Season": 2025, "League": "NCAA", "Team": "Duke",
            "age": "18.2", "GP": 30, "PTS": 600, "FG%": 48.1, "note": "text"
        }"#;
        let parsed: SeasonLogRow = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.player_id, 3);
        assert_eq!(parsed.season, 2025);
        assert_eq!(parsed.team.as_deref(), Some("Duke"));
        assert_eq!(parsed.age.as_deref(), Some("18.2"));
        let keys: Vec<&str> = parsed.stats.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["FG%", "GP", "PTS"]);
    }

    #[test]
    fn insertion_set_dedupes_in_order() {
        let set: InsertionSet<&str> = ["b", "a", "b", "c", "a"].into_iter().collect();
        assert_eq!(set.as_slice(), ["b", "a", "c"]);
        assert!(set.contains(&"c"));
        assert_eq!(set.len(), 3);
    }
}
