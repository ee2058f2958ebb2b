// Scout rank aggregation: consensus rank and per-scout deviation.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::player::{LenientNumber, PlayerId};

// ---------------------------------------------------------------------------
// Rank record
// ---------------------------------------------------------------------------

/// Every scout's rank for one player.
///
/// The scout names are open-ended (whatever columns the ranking source
/// provides), so they live in a map next to the typed identifier. A `None`
/// rank means that scout did not evaluate the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutRanking {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub ranks: ScoutRanks,
}

impl ScoutRanking {
    pub fn new(player_id: PlayerId) -> Self {
        ScoutRanking {
            player_id,
            ranks: ScoutRanks::default(),
        }
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with_rank(mut self, scout: impl Into<String>, rank: Option<f64>) -> Self {
        self.ranks.insert(scout, rank);
        self
    }

    /// The scout's rank, if that scout ranked the player.
    pub fn rank_of(&self, scout: &str) -> Option<f64> {
        self.ranks.get(scout).flatten()
    }

    /// All ranks that are present, in column order.
    pub fn present_ranks(&self) -> impl Iterator<Item = f64> + '_ {
        self.ranks.iter().filter_map(|(_, rank)| rank)
    }
}

/// Scout name to rank, kept in the order the columns arrived.
///
/// Ranks sent as text (`"3"`) are read as numbers; text that is not a
/// number counts as no rank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoutRanks {
    entries: Vec<(String, Option<f64>)>,
}

impl ScoutRanks {
    /// Set a scout's rank. A repeated scout keeps its original position.
    pub fn insert(&mut self, scout: impl Into<String>, rank: Option<f64>) {
        let scout = scout.into();
        match self.entries.iter_mut().find(|(name, _)| *name == scout) {
            Some(slot) => slot.1 = rank,
            None => self.entries.push((scout, rank)),
        }
    }

    /// `Some(rank)` when the scout has a column, even a null one.
    pub fn get(&self, scout: &str) -> Option<Option<f64>> {
        self.entries
            .iter()
            .find(|(name, _)| name == scout)
            .map(|(_, rank)| *rank)
    }

    pub fn contains_key(&self, scout: &str) -> bool {
        self.get(scout).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.entries.iter().map(|(name, rank)| (name.as_str(), *rank))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ScoutRanks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (scout, rank) in &self.entries {
            map.serialize_entry(scout, rank)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoutRanks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RanksVisitor;

        impl<'de> Visitor<'de> for RanksVisitor {
            type Value = ScoutRanks;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of scout names to ranks")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ScoutRanks, A::Error> {
                let mut ranks = ScoutRanks::default();
                while let Some((scout, rank)) = access.next_entry::<String, LenientNumber>()? {
                    ranks.insert(scout, rank.0);
                }
                Ok(ranks)
            }
        }

        deserializer.deserialize_map(RanksVisitor)
    }
}

// ---------------------------------------------------------------------------
// Consensus statistics
// ---------------------------------------------------------------------------

/// Mean and population standard deviation of the present ranks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSpread {
    pub mean: f64,
    pub stdev: f64,
    pub count: usize,
}

/// Compute the spread of a ranking's present ranks.
///
/// Returns `None` when no scout ranked the player. The standard deviation
/// is the population one (N denominator).
pub fn rank_spread(ranking: &ScoutRanking) -> Option<RankSpread> {
    let ranks: Vec<f64> = ranking.present_ranks().collect();
    if ranks.is_empty() {
        return None;
    }
    let n = ranks.len() as f64;
    let mean = ranks.iter().sum::<f64>() / n;
    let variance = ranks.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    Some(RankSpread {
        mean,
        stdev: variance.sqrt(),
        count: ranks.len(),
    })
}

/// Arithmetic mean of every present rank.
///
/// Returns `f64::INFINITY` when nobody ranked the player, so unranked
/// prospects sort after everyone else. Callers must read infinity as
/// "no rank", not as a number to display.
pub fn average_rank(ranking: &ScoutRanking) -> f64 {
    rank_spread(ranking).map_or(f64::INFINITY, |s| s.mean)
}

/// Whether one scout sits a standard deviation or more away from consensus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankDeviation {
    /// Rank at least one stdev better (numerically lower) than the mean.
    pub is_high: bool,
    /// Rank at least one stdev worse (numerically higher) than the mean.
    pub is_low: bool,
}

/// Classify `scout`'s rank against the panel.
///
/// A scout with no rank gets neither flag. Both comparisons are inclusive,
/// so a rank exactly one stdev away is flagged. With a single ranking scout
/// the stdev is zero and the rank equals the mean, which sets both flags.
pub fn rank_deviation(ranking: &ScoutRanking, scout: &str) -> RankDeviation {
    let Some(rank) = ranking.rank_of(scout) else {
        return RankDeviation::default();
    };
    let Some(spread) = rank_spread(ranking) else {
        return RankDeviation::default();
    };
    RankDeviation {
        is_high: rank <= spread.mean - spread.stdev,
        is_low: rank >= spread.mean + spread.stdev,
    }
}

// ---------------------------------------------------------------------------
// Per-scout breakdown
// ---------------------------------------------------------------------------

/// How a scout's opinion compares with the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankTone {
    Favorable,
    Unfavorable,
    Neutral,
}

impl RankTone {
    fn from_deviation(dev: RankDeviation) -> Self {
        if dev.is_high {
            RankTone::Favorable
        } else if dev.is_low {
            RankTone::Unfavorable
        } else {
            RankTone::Neutral
        }
    }
}

/// One row of a scout ranking table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutOpinion {
    pub scout: String,
    pub rank: Option<f64>,
    pub tone: RankTone,
}

/// One row per scout on the record, unranked scouts included, in column
/// order.
///
/// Favorable wins when both flags are set (the single-scout case).
pub fn scout_breakdown(ranking: &ScoutRanking) -> Vec<ScoutOpinion> {
    ranking
        .ranks
        .iter()
        .map(|(scout, rank)| ScoutOpinion {
            scout: scout.to_string(),
            rank,
            tone: RankTone::from_deviation(rank_deviation(ranking, scout)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
