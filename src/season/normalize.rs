//! Canonical "current season" record.
//!
//! Providers answer the current-season question in different shapes: NFL
//! returns a bare year, the other leagues a structured object. Everything
//! downstream works on [`CanonicalSeason`], which always carries all eight
//! fields (explicit `null` when the provider had nothing).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::Record;

/// Provider key names, in persisted order.
pub const CANONICAL_KEYS: [&str; 8] = [
    "Season",
    "StartYear",
    "EndYear",
    "Description",
    "RegularSeasonStartDate",
    "PostSeasonStartDate",
    "SeasonType",
    "ApiSeason",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CanonicalSeason {
    #[serde(default)]
    pub season: Value,
    #[serde(default)]
    pub start_year: Value,
    #[serde(default)]
    pub end_year: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub regular_season_start_date: Value,
    #[serde(default)]
    pub post_season_start_date: Value,
    #[serde(default)]
    pub season_type: Value,
    #[serde(default)]
    pub api_season: Value,
}

impl CanonicalSeason {
    /// Record form, used when the season is tagged for combined output.
    pub fn to_record(&self) -> Record {
        CANONICAL_KEYS
            .iter()
            .map(|k| (k.to_string(), self.field(k).clone()))
            .collect()
    }

    fn field(&self, key: &str) -> &Value {
        match key {
            "Season" => &self.season,
            "StartYear" => &self.start_year,
            "EndYear" => &self.end_year,
            "Description" => &self.description,
            "RegularSeasonStartDate" => &self.regular_season_start_date,
            "PostSeasonStartDate" => &self.post_season_start_date,
            "SeasonType" => &self.season_type,
            _ => &self.api_season,
        }
    }

    fn field_mut(&mut self, key: &str) -> &mut Value {
        match key {
            "Season" => &mut self.season,
            "StartYear" => &mut self.start_year,
            "EndYear" => &mut self.end_year,
            "Description" => &mut self.description,
            "RegularSeasonStartDate" => &mut self.regular_season_start_date,
            "PostSeasonStartDate" => &mut self.post_season_start_date,
            "SeasonType" => &mut self.season_type,
            _ => &mut self.api_season,
        }
    }

    /// Best human label for run summaries.
    pub fn label(&self) -> String {
        [&self.description, &self.api_season, &self.season]
            .into_iter()
            .find(|v| !v.is_null())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "—".to_string())
    }
}

/// Normalize any raw season payload. Total: unrecognized shapes yield the
/// all-null record.
pub fn normalize(raw: &Value) -> CanonicalSeason {
    let mut out = CanonicalSeason::default();
    match raw {
        Value::Number(_) => {
            out.season = raw.clone();
            out.api_season = raw.clone();
        }
        Value::Object(map) => {
            for key in CANONICAL_KEYS {
                if let Some(v) = map.get(key) {
                    *out.field_mut(key) = v.clone();
                }
            }
        }
        _ => {}
    }
    out
}

/// Whether a persisted season already has the canonical shape.
pub fn is_canonical(raw: &Value) -> bool {
    raw.as_object()
        .is_some_and(|map| CANONICAL_KEYS.iter().all(|k| map.contains_key(*k)))
}
