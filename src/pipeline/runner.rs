//! The sync pipeline.
//!
//! Leagues run one at a time in configured order; within a league every
//! request is sequential. The combined accumulator is owned by the run and
//! returned at the end. No failure below the run level escapes a league.

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::SyncConfig;
use crate::data::{array_records, into_records, EntityFetcher, Record};
use crate::error::Result;
use crate::league::League;
use crate::pipeline::aggregate::{
    default_standings, CombinedAccumulator, CombinedCollections, LeagueEntityBundle,
    LeagueOutputs, RosterPage, StandingsMeta, MISSING_SEASON_TOKEN,
};
use crate::pipeline::transactions::sweep_league;
use crate::season::normalize::{is_canonical, normalize};
use crate::season::window::{resolve, SeasonWindow};
use crate::store::cache::CacheGate;
use crate::store::{DataStore, CURRENT_SEASON_FILE, TRANSACTIONS_FILE};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Write `data/*.json` alongside the per-league files.
    pub write_combined: bool,
    /// Run the day-by-day sweep; otherwise replay persisted transactions.
    pub sweep_transactions: bool,
    pub transaction_days: u32,
    /// Last day of the sweep window.
    pub today: NaiveDate,
}

impl SyncOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            write_combined: config.write_combined,
            sweep_transactions: config.sweep_transactions,
            transaction_days: config.transaction_days,
            today: Utc::now().date_naive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCounts {
    pub season: String,
    pub teams: usize,
    pub players: usize,
    pub stadiums: usize,
    pub standings_reg: usize,
    pub standings_post: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeagueOutcome {
    Fetched(FetchCounts),
    Cached { teams: usize, players: usize },
    StandingsRefreshed { standings_reg: usize, standings_post: usize },
    Skipped(String),
    Failed(String),
}

#[derive(Debug)]
pub struct RunReport {
    pub leagues: Vec<(League, LeagueOutcome)>,
    pub transactions: Vec<(League, usize)>,
    pub combined: CombinedCollections,
}

impl RunReport {
    pub fn outcome(&self, league: League) -> Option<&LeagueOutcome> {
        self.leagues
            .iter()
            .find(|(l, _)| *l == league)
            .map(|(_, outcome)| outcome)
    }
}

pub struct Pipeline {
    fetcher: Box<dyn EntityFetcher>,
    store: DataStore,
    leagues: Vec<League>,
}

impl Pipeline {
    pub fn new(fetcher: Box<dyn EntityFetcher>, store: DataStore, leagues: Vec<League>) -> Self {
        Self {
            fetcher,
            store,
            leagues,
        }
    }

    /// Full run: entity fetch (or cache replay) per league, then the
    /// transaction sweep, then the combined outputs.
    pub async fn run(&self, options: &SyncOptions) -> Result<RunReport> {
        let gate = CacheGate::new(&self.store);
        let mut acc = CombinedAccumulator::new();
        let mut leagues = Vec::with_capacity(self.leagues.len());

        info!(leagues = ?self.leagues, "Fetching league data");
        for &league in &self.leagues {
            let outcome = if gate.should_fetch(league) {
                match self.sync_league(league).await {
                    Ok((outputs, season)) => {
                        let counts = fetch_counts(&outputs, season);
                        acc.absorb(league, &outputs);
                        info!(
                            league = %league,
                            season = %counts.season,
                            teams = counts.teams,
                            players = counts.players,
                            stadiums = counts.stadiums,
                            standings_reg = counts.standings_reg,
                            standings_post = counts.standings_post,
                            "League fetched"
                        );
                        LeagueOutcome::Fetched(counts)
                    }
                    Err(e) => {
                        error!(league = %league, error = %e, "League fetch failed");
                        LeagueOutcome::Failed(e.to_string())
                    }
                }
            } else {
                let cached = gate.replay(league);
                let teams = cached.outputs.teams.len();
                let players = cached.outputs.rosters.len();
                info!(
                    league = %league,
                    teams,
                    players,
                    "Skipping fetch, data already present (delete teams.json or rosters.json to refresh)"
                );
                acc.absorb(league, &cached.outputs);
                acc.set_transactions(league, cached.transactions);
                LeagueOutcome::Cached { teams, players }
            };
            leagues.push((league, outcome));
        }

        let mut transactions = Vec::with_capacity(self.leagues.len());
        for &league in &self.leagues {
            let records = if options.sweep_transactions {
                self.sweep_transactions(league, options).await
            } else {
                gate.replay_transactions(league)
            };
            info!(league = %league, count = records.len(), "Transactions collected");
            transactions.push((league, records.len()));
            acc.set_transactions(league, records);
        }

        let combined = acc.finish();
        if options.write_combined {
            self.store.write_combined(&combined)?;
        }

        Ok(RunReport {
            leagues,
            transactions,
            combined,
        })
    }

    /// Fetch and persist one league. Only the season and team calls can
    /// fail it; everything else degrades to empty.
    async fn sync_league(&self, league: League) -> Result<(LeagueOutputs, String)> {
        let bundle = self.fetch_bundle(league).await?;
        let season = bundle.season.label();
        let outputs = LeagueOutputs::from_bundle(bundle);
        self.store.write_league(league, &outputs)?;
        Ok((outputs, season))
    }

    #[instrument(skip(self))]
    pub async fn fetch_bundle(&self, league: League) -> Result<LeagueEntityBundle> {
        let raw_season = self.fetcher.get_season(league).await?;
        let season = normalize(&raw_season);
        let window = resolve(&season, league);
        if window.reg_param.is_none() {
            warn!(league = %league, "No regular-season token for league");
        }

        let teams = into_records(self.fetcher.get_teams(league).await?);

        let stadiums = match self.fetcher.get_stadiums(league).await {
            Ok(raw) => array_records(raw),
            Err(e) => {
                warn!(league = %league, error = %e, "Stadiums failed");
                Vec::new()
            }
        };

        let mut rosters = Vec::new();
        for team_key in team_keys(&teams) {
            match self.fetcher.get_players(league, &team_key).await {
                Ok(raw) => rosters.push(RosterPage {
                    team_key,
                    players: into_records(raw),
                }),
                Err(e) => {
                    warn!(league = %league, team = %team_key, error = %e, "Players failed");
                }
            }
        }

        let (standings_reg, standings_post) = self.fetch_standings(league, &window).await;

        Ok(LeagueEntityBundle {
            season,
            window,
            teams,
            stadiums,
            rosters,
            standings_reg,
            standings_post,
        })
    }

    /// Regular and post tables, each independently degrading to empty.
    async fn fetch_standings(
        &self,
        league: League,
        window: &SeasonWindow,
    ) -> (Vec<Record>, Vec<Record>) {
        let reg_token = window.reg_param.as_deref().unwrap_or(MISSING_SEASON_TOKEN);
        let reg = match self.fetcher.get_standings(league, reg_token).await {
            Ok(raw) => into_records(raw),
            Err(e) => {
                warn!(league = %league, token = reg_token, error = %e, "Reg standings failed");
                Vec::new()
            }
        };

        let post = match window.post_request() {
            Some(token) => match self.fetcher.get_standings(league, token).await {
                Ok(raw) => into_records(raw),
                Err(e) => {
                    warn!(league = %league, token, error = %e, "Post standings failed");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        (reg, post)
    }

    async fn sweep_transactions(&self, league: League, options: &SyncOptions) -> Vec<Record> {
        let records = sweep_league(
            self.fetcher.as_ref(),
            league,
            options.today,
            options.transaction_days,
        )
        .await;
        let path = self.store.league_file(league, TRANSACTIONS_FILE);
        if let Err(e) = self.store.write_json(&path, &records) {
            warn!(league = %league, error = %e, "Failed to persist transactions");
        }
        records
    }

    /// Refresh standings from each league's persisted season, leaving teams
    /// and rosters alone. Rewrites `current_season.json` in canonical form
    /// when it is not already.
    pub async fn refresh_standings(&self) -> Vec<(League, LeagueOutcome)> {
        let mut outcomes = Vec::with_capacity(self.leagues.len());
        for &league in &self.leagues {
            let outcome = self.refresh_league_standings(league).await;
            outcomes.push((league, outcome));
        }
        outcomes
    }

    async fn refresh_league_standings(&self, league: League) -> LeagueOutcome {
        let season_path = self.store.league_file(league, CURRENT_SEASON_FILE);
        if !season_path.exists() {
            warn!(league = %league, "No current_season.json, skipping standings refresh");
            return LeagueOutcome::Skipped("no current_season.json".to_string());
        }

        let raw: Value = match self.store.read_json(&season_path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(league = %league, error = %e, "Unreadable current_season.json");
                return LeagueOutcome::Failed(e.to_string());
            }
        };
        let season = normalize(&raw);
        if !is_canonical(&raw) {
            if let Err(e) = self.store.write_json(&season_path, &season) {
                warn!(league = %league, error = %e, "Failed to rewrite current_season.json");
            }
        }

        let window = resolve(&season, league);
        if window.reg_param.is_none() {
            warn!(league = %league, "No season in current_season.json, skipping");
            return LeagueOutcome::Skipped("no season in current_season.json".to_string());
        }

        let (standings_reg, standings_post) = self.fetch_standings(league, &window).await;
        let meta = StandingsMeta::from_window(&window);
        let outputs = LeagueOutputs {
            standings: default_standings(meta.default_view, &standings_reg, &standings_post),
            standings_reg,
            standings_post,
            meta: Some(meta.to_record()),
            ..LeagueOutputs::default()
        };
        if let Err(e) = self.store.write_standings(league, &outputs) {
            warn!(league = %league, error = %e, "Failed to persist standings");
            return LeagueOutcome::Failed(e.to_string());
        }

        info!(
            league = %league,
            standings_reg = outputs.standings_reg.len(),
            standings_post = outputs.standings_post.len(),
            default_view = ?meta.default_view,
            "Standings updated"
        );
        LeagueOutcome::StandingsRefreshed {
            standings_reg: outputs.standings_reg.len(),
            standings_post: outputs.standings_post.len(),
        }
    }
}

/// Rebuild the combined outputs purely from per-league files.
pub fn rebuild_combined(store: &DataStore, leagues: &[League]) -> CombinedCollections {
    let gate = CacheGate::new(store);
    let mut acc = CombinedAccumulator::new();
    for &league in leagues {
        let cached = gate.replay(league);
        acc.absorb(league, &cached.outputs);
        acc.set_transactions(league, cached.transactions);
    }
    acc.finish()
}

/// Distinct team keys in first-seen order: `Key`, else `Team`, when it is
/// a non-empty string.
pub fn team_keys(teams: &[Record]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for team in teams {
        let key = match team.get("Key") {
            Some(v) if !v.is_null() => Some(v),
            _ => team.get("Team"),
        };
        if let Some(Value::String(k)) = key {
            if !k.is_empty() && !keys.contains(k) {
                keys.push(k.clone());
            }
        }
    }
    keys
}

fn fetch_counts(outputs: &LeagueOutputs, season: String) -> FetchCounts {
    FetchCounts {
        season,
        teams: outputs.teams.len(),
        players: outputs.rosters.len(),
        stadiums: outputs.stadiums.len(),
        standings_reg: outputs.standings_reg.len(),
        standings_post: outputs.standings_post.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_team_keys_dedupe_in_first_seen_order() {
        let teams = into_records(json!([
            { "Key": "BOS" },
            { "Key": null, "Team": "NYY" },
            { "Key": "BOS" },
            { "Team": "" },
            { "Key": 12 },
            { "Key": "TOR" }
        ]));
        assert_eq!(team_keys(&teams), vec!["BOS", "NYY", "TOR"]);
    }

    #[test]
    fn test_rebuild_from_empty_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let combined = rebuild_combined(&store, &League::ALL);
        assert_eq!(combined, CombinedCollections::default());
    }
}
