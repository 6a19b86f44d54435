//! Per-league and combined output shapes.
//!
//! Pure functions over fetched or replayed records. Per-league outputs never
//! carry the `league` field; combined outputs always do.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::{has_player_identity, is_truthy, Record, LEAGUE_FIELD};
use crate::league::League;
use crate::season::normalize::CanonicalSeason;
use crate::season::window::{SeasonWindow, View};

/// Token recorded and requested when no regular-season token could be
/// derived. The provider rejects it, leaving the regular table empty.
pub const MISSING_SEASON_TOKEN: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsMeta {
    pub default_view: View,
    pub reg_season: String,
    pub post_season: Option<String>,
}

impl StandingsMeta {
    pub fn from_window(window: &SeasonWindow) -> Self {
        Self {
            default_view: window.default_view,
            reg_season: window
                .reg_param
                .clone()
                .unwrap_or_else(|| MISSING_SEASON_TOKEN.to_string()),
            post_season: window.post_param.clone(),
        }
    }

    pub fn to_record(&self) -> Record {
        let view = match self.default_view {
            View::Reg => "reg",
            View::Post => "post",
        };
        let mut record = Record::new();
        record.insert("defaultView".to_string(), Value::from(view));
        record.insert("regSeason".to_string(), Value::from(self.reg_season.clone()));
        record.insert(
            "postSeason".to_string(),
            self.post_season.clone().map_or(Value::Null, Value::from),
        );
        record
    }
}

/// One team's roster page, as requested.
#[derive(Debug, Clone)]
pub struct RosterPage {
    pub team_key: String,
    pub players: Vec<Record>,
}

/// Everything fetched for one league in one run.
#[derive(Debug, Clone)]
pub struct LeagueEntityBundle {
    pub season: CanonicalSeason,
    pub window: SeasonWindow,
    pub teams: Vec<Record>,
    pub stadiums: Vec<Record>,
    pub rosters: Vec<RosterPage>,
    pub standings_reg: Vec<Record>,
    pub standings_post: Vec<Record>,
}

/// Per-league output set, untagged. `season` and `meta` are optional so a
/// cache replay with missing files fits the same shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueOutputs {
    pub season: Option<Record>,
    pub teams: Vec<Record>,
    pub stadiums: Vec<Record>,
    pub rosters: Vec<Record>,
    pub standings_reg: Vec<Record>,
    pub standings_post: Vec<Record>,
    /// Default-view standings.
    pub standings: Vec<Record>,
    pub meta: Option<Record>,
}

impl LeagueOutputs {
    pub fn from_bundle(bundle: LeagueEntityBundle) -> Self {
        let meta = StandingsMeta::from_window(&bundle.window);
        let standings_reg = without_league(bundle.standings_reg);
        let standings_post = without_league(bundle.standings_post);
        let standings = default_standings(meta.default_view, &standings_reg, &standings_post);

        Self {
            season: Some(bundle.season.to_record()),
            teams: without_league(bundle.teams),
            stadiums: without_league(bundle.stadiums),
            rosters: without_league(roster_records(bundle.rosters)),
            standings_reg,
            standings_post,
            standings,
            meta: Some(meta.to_record()),
        }
    }
}

/// Flatten roster pages, keeping identified players and resolving `Team`:
/// the provider's `Team`, else its `TeamKey`, else the requested key.
pub fn roster_records(pages: Vec<RosterPage>) -> Vec<Record> {
    let mut out = Vec::new();
    for page in pages {
        for mut player in page.players {
            if !has_player_identity(&player) {
                continue;
            }
            let team = ["Team", "TeamKey"]
                .iter()
                .filter_map(|k| player.get(*k))
                .find(|v| is_truthy(v))
                .cloned()
                .unwrap_or_else(|| Value::from(page.team_key.clone()));
            player.insert("Team".to_string(), team);
            out.push(player);
        }
    }
    out
}

/// Post list when the post view is the default and it has rows; the
/// regular list otherwise.
pub fn default_standings(view: View, reg: &[Record], post: &[Record]) -> Vec<Record> {
    match view {
        View::Post if !post.is_empty() => post.to_vec(),
        _ => reg.to_vec(),
    }
}

pub fn without_league(records: Vec<Record>) -> Vec<Record> {
    records.into_iter().map(strip_league).collect()
}

fn strip_league(record: Record) -> Record {
    if !record.contains_key(LEAGUE_FIELD) {
        return record;
    }
    record.into_iter().filter(|(k, _)| k != LEAGUE_FIELD).collect()
}

/// Tag a record with its league; an existing `league` keeps its position.
pub fn tag(mut record: Record, league: League) -> Record {
    record.insert(LEAGUE_FIELD.to_string(), Value::from(league.as_str()));
    record
}

pub fn tagged(records: &[Record], league: League) -> Vec<Record> {
    records.iter().cloned().map(|r| tag(r, league)).collect()
}

/// Sort key for transactions: `Date`, else `Created`, else empty.
fn transaction_date(record: &Record) -> &str {
    ["Date", "Created"]
        .iter()
        .filter_map(|k| record.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// Newest first by plain string comparison of the date key. Stable, so
/// ties keep their concatenation order.
pub fn sort_transactions(records: &mut [Record]) {
    records.sort_by(|a, b| transaction_date(b).cmp(transaction_date(a)));
}

/// Cross-league collections, every record tagged with `league`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedCollections {
    pub teams: Vec<Record>,
    pub rosters: Vec<Record>,
    pub stadiums: Vec<Record>,
    pub standings_reg: Vec<Record>,
    pub standings_post: Vec<Record>,
    pub standings: Vec<Record>,
    pub transactions: Vec<Record>,
    pub seasons: Vec<Record>,
    pub meta: Vec<Record>,
}

/// Run-scoped accumulator threaded through the league loop.
///
/// Transactions are held per league so a fresh sweep can supersede a
/// league's replayed transactions without duplicating them.
#[derive(Debug, Default)]
pub struct CombinedAccumulator {
    combined: CombinedCollections,
    transactions: Vec<(League, Vec<Record>)>,
}

impl CombinedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, league: League, outputs: &LeagueOutputs) {
        let c = &mut self.combined;
        c.teams.extend(tagged(&outputs.teams, league));
        c.rosters.extend(tagged(&outputs.rosters, league));
        c.stadiums.extend(tagged(&outputs.stadiums, league));
        c.standings_reg.extend(tagged(&outputs.standings_reg, league));
        c.standings_post.extend(tagged(&outputs.standings_post, league));
        c.standings.extend(tagged(&outputs.standings, league));
        if let Some(season) = &outputs.season {
            c.seasons.push(tag(season.clone(), league));
        }
        if let Some(meta) = &outputs.meta {
            c.meta.push(tag(meta.clone(), league));
        }
    }

    /// Replace this league's transactions. Records without a player
    /// identity are dropped here as well as at fetch time.
    pub fn set_transactions(&mut self, league: League, records: Vec<Record>) {
        let records = records
            .into_iter()
            .filter(has_player_identity)
            .map(|r| tag(r, league))
            .collect();
        match self.transactions.iter_mut().find(|(l, _)| *l == league) {
            Some(slot) => slot.1 = records,
            None => self.transactions.push((league, records)),
        }
    }

    pub fn finish(self) -> CombinedCollections {
        let mut combined = self.combined;
        combined.transactions = self
            .transactions
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect();
        sort_transactions(&mut combined.transactions);
        combined
    }
}
