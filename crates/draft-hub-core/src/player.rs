// Player bio and combine measurement records.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::age;

/// Identifier shared by every record that belongs to one prospect.
pub type PlayerId = u32;

// ---------------------------------------------------------------------------
// Bio
// ---------------------------------------------------------------------------

/// Bio record for one prospect. Every descriptive field is optional because
/// the source data leaves gaps for international and late-added players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub age: Option<f64>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, alias = "currentTeam")]
    pub team: Option<String>,
    /// Height in inches.
    #[serde(default, deserialize_with = "number_or_text")]
    pub height: Option<f64>,
    /// Weight in pounds.
    #[serde(default, deserialize_with = "number_or_text")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub high_school: Option<String>,
    #[serde(default)]
    pub home_town: Option<String>,
    #[serde(default)]
    pub home_state: Option<String>,
    #[serde(default)]
    pub home_country: Option<String>,
}

impl Player {
    /// A bare record with only the identifier set.
    pub fn new(player_id: PlayerId) -> Self {
        Player {
            player_id,
            name: None,
            age: None,
            position: None,
            team: None,
            height: None,
            weight: None,
            photo_url: None,
            birth_date: None,
            nationality: None,
            high_school: None,
            home_town: None,
            home_state: None,
            home_country: None,
        }
    }

    /// Name for display, falling back to the identifier.
    pub fn display_name(&self) -> String {
        match non_blank(&self.name) {
            Some(name) => name.to_string(),
            None => format!("Player #{}", self.player_id),
        }
    }

    /// "Town, State, Country" with blank parts skipped.
    pub fn hometown_line(&self) -> String {
        [&self.home_town, &self.home_state, &self.home_country]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Age in whole years as of `today`.
    ///
    /// Derived from the birth date when it parses; otherwise the stored age
    /// (truncated) is used. `None` when neither is available.
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        if let Some(birth) = self.birth_date.as_deref().and_then(age::parse_birth_date) {
            return Some(age::age(birth, today));
        }
        self.age.filter(|a| a.is_finite()).map(|a| a.trunc() as i32)
    }
}

/// Returns the trimmed string when it is present and not blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// Combine measurements. Lengths are inches, weight pounds, times seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub height_no_shoes: Option<f64>,
    #[serde(default)]
    pub height_shoes: Option<f64>,
    #[serde(default)]
    pub wingspan: Option<f64>,
    #[serde(default)]
    pub reach: Option<f64>,
    #[serde(default)]
    pub max_vertical: Option<f64>,
    #[serde(default)]
    pub no_step_vertical: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub body_fat: Option<f64>,
    #[serde(default)]
    pub hand_length: Option<f64>,
    #[serde(default)]
    pub hand_width: Option<f64>,
    #[serde(default)]
    pub agility: Option<f64>,
    #[serde(default)]
    pub sprint: Option<f64>,
    #[serde(default)]
    pub shuttle_left: Option<f64>,
    #[serde(default)]
    pub shuttle_right: Option<f64>,
    #[serde(default)]
    pub shuttle_best: Option<f64>,
}

/// One measured value ready for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementReading {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl Measurements {
    /// Readings that were actually recorded, in a fixed display order.
    /// Missing values are left out rather than shown as zero.
    pub fn readings(&self) -> Vec<MeasurementReading> {
        let all: [(&'static str, Option<f64>, &'static str); 15] = [
            ("Height (no shoes)", self.height_no_shoes, "in"),
            ("Height (shoes)", self.height_shoes, "in"),
            ("Wingspan", self.wingspan, "in"),
            ("Standing reach", self.reach, "in"),
            ("Max vertical", self.max_vertical, "in"),
            ("No-step vertical", self.no_step_vertical, "in"),
            ("Weight", self.weight, "lbs"),
            ("Body fat", self.body_fat, "%"),
            ("Hand length", self.hand_length, "in"),
            ("Hand width", self.hand_width, "in"),
            ("Lane agility", self.agility, "s"),
            ("Sprint", self.sprint, "s"),
            ("Shuttle (left)", self.shuttle_left, "s"),
            ("Shuttle (right)", self.shuttle_right, "s"),
            ("Shuttle (best)", self.shuttle_best, "s"),
        ];
        all.into_iter()
            .filter_map(|(label, value, unit)| {
                value.map(|value| MeasurementReading { label, value, unit })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// A number that may arrive as JSON text (`"81"`) or null. Unparseable
/// text maps to `None` so one odd cell does not reject the whole record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LenientNumber(pub(crate) Option<f64>);

impl<'de> Deserialize<'de> for LenientNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Lenient {
            Number(f64),
            Text(String),
        }

        Ok(LenientNumber(match Option::<Lenient>::deserialize(deserializer)? {
            None => None,
            Some(Lenient::Number(n)) => Some(n),
            Some(Lenient::Text(s)) => s.trim().parse().ok(),
        }))
    }
}

fn number_or_text<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    LenientNumber::deserialize(deserializer).map(|n| n.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
