//! Skip-if-cached gate.
//!
//! A league whose `teams.json` and `rosters.json` both exist is not fetched
//! again; its persisted files are replayed into the combined outputs
//! instead. Delete either file to force a refresh.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::data::Record;
use crate::league::League;
use crate::pipeline::aggregate::LeagueOutputs;
use crate::store::{
    DataStore, CURRENT_SEASON_FILE, ROSTERS_FILE, STADIUMS_FILE, STANDINGS_FILE,
    STANDINGS_META_FILE, STANDINGS_POST_FILE, STANDINGS_REG_FILE, TEAMS_FILE, TRANSACTIONS_FILE,
};

/// Everything previously persisted for one league.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedLeague {
    pub outputs: LeagueOutputs,
    pub transactions: Vec<Record>,
}

pub struct CacheGate<'a> {
    store: &'a DataStore,
}

impl<'a> CacheGate<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    pub fn should_fetch(&self, league: League) -> bool {
        let teams = self.store.league_file(league, TEAMS_FILE);
        let rosters = self.store.league_file(league, ROSTERS_FILE);
        !(teams.exists() && rosters.exists())
    }

    /// Read back every per-league file. Missing, unparsable, or wrongly
    /// shaped files contribute nothing for that entity only.
    pub fn replay(&self, league: League) -> CachedLeague {
        let list = |name: &str| self.read_list(&self.store.league_file(league, name));
        let object = |name: &str| self.read_object(&self.store.league_file(league, name));

        CachedLeague {
            outputs: LeagueOutputs {
                season: object(CURRENT_SEASON_FILE),
                teams: list(TEAMS_FILE),
                stadiums: list(STADIUMS_FILE),
                rosters: list(ROSTERS_FILE),
                standings_reg: list(STANDINGS_REG_FILE),
                standings_post: list(STANDINGS_POST_FILE),
                standings: list(STANDINGS_FILE),
                meta: object(STANDINGS_META_FILE),
            },
            transactions: list(TRANSACTIONS_FILE),
        }
    }

    /// Persisted transactions alone; used when the sweep is disabled.
    pub fn replay_transactions(&self, league: League) -> Vec<Record> {
        self.read_list(&self.store.league_file(league, TRANSACTIONS_FILE))
    }

    fn read_value(&self, path: &Path) -> Option<Value> {
        match self.store.read_json::<Value>(path) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "Cached file unavailable, treating as empty");
                None
            }
        }
    }

    fn read_list(&self, path: &Path) -> Vec<Record> {
        match self.read_value(path) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn read_object(&self, path: &Path) -> Option<Record> {
        match self.read_value(path) {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded_store() -> (tempfile::TempDir, DataStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_fetch_needed_until_both_files_exist() {
        let (_dir, store) = seeded_store();
        let gate = CacheGate::new(&store);
        assert!(gate.should_fetch(League::Nba));

        store
            .write_json(&store.league_file(League::Nba, TEAMS_FILE), &json!([]))
            .unwrap();
        assert!(gate.should_fetch(League::Nba));

        store
            .write_json(&store.league_file(League::Nba, ROSTERS_FILE), &json!([]))
            .unwrap();
        assert!(!gate.should_fetch(League::Nba));
        assert!(gate.should_fetch(League::Nhl));
    }

    #[test]
    fn test_replay_tolerates_missing_and_broken_files() {
        let (_dir, store) = seeded_store();
        let file = |name: &str| store.league_file(League::Mlb, name);
        store
            .write_json(&file(TEAMS_FILE), &json!([{ "Key": "NYY" }, { "Key": "BOS" }]))
            .unwrap();
        store
            .write_json(&file(ROSTERS_FILE), &json!([{ "PlayerID": 1, "Team": "NYY" }]))
            .unwrap();
        std::fs::write(file(STANDINGS_REG_FILE), "[{ broken").unwrap();
        store
            .write_json(&file(STANDINGS_POST_FILE), &json!({ "not": "a list" }))
            .unwrap();
        store
            .write_json(&file(STANDINGS_META_FILE), &json!({ "defaultView": "reg" }))
            .unwrap();

        let cached = CacheGate::new(&store).replay(League::Mlb);
        assert_eq!(cached.outputs.teams.len(), 2);
        assert_eq!(cached.outputs.rosters.len(), 1);
        assert!(cached.outputs.standings_reg.is_empty());
        assert!(cached.outputs.standings_post.is_empty());
        assert!(cached.outputs.stadiums.is_empty());
        assert!(cached.outputs.season.is_none());
        assert_eq!(cached.outputs.meta.unwrap()["defaultView"], json!("reg"));
        assert!(cached.transactions.is_empty());
    }
}
