pub mod sportsdata;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;
use crate::league::League;

/// A provider record: free-form JSON object, key order preserved.
pub type Record = serde_json::Map<String, Value>;

/// Synthetic provenance field added to combined outputs.
pub const LEAGUE_FIELD: &str = "league";

/// Everything the pipeline asks of the upstream provider.
///
/// Implementations return raw JSON; interpreting shapes (bare object vs
/// list, `null`) is the caller's job.
#[async_trait]
pub trait EntityFetcher: Send + Sync {
    async fn get_season(&self, league: League) -> Result<Value>;

    async fn get_teams(&self, league: League) -> Result<Value>;

    async fn get_stadiums(&self, league: League) -> Result<Value>;

    async fn get_players(&self, league: League, team_key: &str) -> Result<Value>;

    async fn get_standings(&self, league: League, season_token: &str) -> Result<Value>;

    async fn get_transactions_by_date(&self, league: League, date: NaiveDate) -> Result<Value>;
}

/// Coerce a list-or-object-or-null response into records. A bare object
/// becomes a one-element list; non-object list entries are dropped.
pub fn into_records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}

/// Like [`into_records`], but only a JSON array counts as a list; a bare
/// object yields nothing. Stadium responses follow this stricter rule.
pub fn array_records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(_) => into_records(value),
        _ => Vec::new(),
    }
}

/// JavaScript-style truthiness, used where the provider signals "absent"
/// with empty strings or zeros as well as `null`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether a record identifies a player: non-null `PlayerID` or `Name`.
pub fn has_player_identity(record: &Record) -> bool {
    ["PlayerID", "Name"]
        .iter()
        .any(|k| record.get(*k).is_some_and(|v| !v.is_null()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_records_shapes() {
        assert_eq!(into_records(json!([{ "a": 1 }, { "b": 2 }])).len(), 2);
        assert_eq!(into_records(json!({ "a": 1 })).len(), 1);
        assert!(into_records(Value::Null).is_empty());
        assert!(into_records(json!("nope")).is_empty());
        assert_eq!(into_records(json!([{ "a": 1 }, 3, null])).len(), 1);
    }

    #[test]
    fn test_array_records_rejects_bare_object() {
        assert_eq!(array_records(json!([{ "StadiumID": 1 }, { "StadiumID": 2 }])).len(), 2);
        assert!(array_records(json!({ "StadiumID": 1 })).is_empty());
        assert!(array_records(Value::Null).is_empty());
    }

    #[test]
    fn test_player_identity() {
        let with_id = into_records(json!({ "PlayerID": 7 })).remove(0);
        let with_name = into_records(json!({ "Name": "A. Player" })).remove(0);
        let null_id = into_records(json!({ "PlayerID": null, "Team": "BOS" })).remove(0);
        assert!(has_player_identity(&with_id));
        assert!(has_player_identity(&with_name));
        assert!(!has_player_identity(&null_id));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!("BOS")));
    }
}
