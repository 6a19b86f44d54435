//! On-disk JSON layout.
//!
//! `data/{league}/*.json` holds per-league outputs without the `league`
//! field; `data/*.json` holds the combined, league-tagged outputs.

pub mod cache;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::data::Record;
use crate::error::{Result, SyncError};
use crate::league::League;
use crate::pipeline::aggregate::{CombinedCollections, LeagueOutputs};

pub const CURRENT_SEASON_FILE: &str = "current_season.json";
pub const CURRENT_SEASONS_FILE: &str = "current_seasons.json";
pub const TEAMS_FILE: &str = "teams.json";
pub const STADIUMS_FILE: &str = "stadiums.json";
pub const ROSTERS_FILE: &str = "rosters.json";
pub const STANDINGS_REG_FILE: &str = "standings_reg.json";
pub const STANDINGS_POST_FILE: &str = "standings_post.json";
pub const STANDINGS_META_FILE: &str = "standings_meta.json";
pub const STANDINGS_FILE: &str = "standings.json";
pub const TRANSACTIONS_FILE: &str = "transactions.json";

#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn league_dir(&self, league: League) -> PathBuf {
        self.root.join(league.as_str())
    }

    pub fn league_file(&self, league: League, name: &str) -> PathBuf {
        self.league_dir(league).join(name)
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let contents = fs::read_to_string(path).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SyncError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pretty-printed, two-space indent, parent directories created.
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SyncError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(value).map_err(|source| SyncError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist one league's untagged outputs (everything but transactions,
    /// which the sweep writes on its own schedule).
    pub fn write_league(&self, league: League, outputs: &LeagueOutputs) -> Result<()> {
        let file = |name: &str| self.league_file(league, name);
        if let Some(season) = &outputs.season {
            self.write_json(&file(CURRENT_SEASON_FILE), season)?;
        }
        self.write_json(&file(TEAMS_FILE), &outputs.teams)?;
        self.write_json(&file(STADIUMS_FILE), &outputs.stadiums)?;
        self.write_json(&file(ROSTERS_FILE), &outputs.rosters)?;
        self.write_standings(league, outputs)
    }

    /// The four standings files alone; used by the standings-only refresh.
    pub fn write_standings(&self, league: League, outputs: &LeagueOutputs) -> Result<()> {
        let file = |name: &str| self.league_file(league, name);
        self.write_json(&file(STANDINGS_REG_FILE), &outputs.standings_reg)?;
        self.write_json(&file(STANDINGS_POST_FILE), &outputs.standings_post)?;
        if let Some(meta) = &outputs.meta {
            self.write_json(&file(STANDINGS_META_FILE), meta)?;
        }
        self.write_json(&file(STANDINGS_FILE), &outputs.standings)
    }

    pub fn write_combined(&self, combined: &CombinedCollections) -> Result<()> {
        let entries: [(&str, &[Record], &str); 9] = [
            (TEAMS_FILE, &combined.teams, "teams"),
            (ROSTERS_FILE, &combined.rosters, "players"),
            (STADIUMS_FILE, &combined.stadiums, "stadiums"),
            (STANDINGS_REG_FILE, &combined.standings_reg, "standings"),
            (STANDINGS_POST_FILE, &combined.standings_post, "standings"),
            (STANDINGS_FILE, &combined.standings, "standings"),
            (TRANSACTIONS_FILE, &combined.transactions, "transactions"),
            (CURRENT_SEASONS_FILE, &combined.seasons, "seasons"),
            (STANDINGS_META_FILE, &combined.meta, "metadata records"),
        ];
        for (name, records, noun) in entries {
            self.write_json(&self.root.join(name), records)?;
            info!(file = name, count = records.len(), "Wrote combined {noun}");
        }
        Ok(())
    }
}
