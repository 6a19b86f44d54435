//! Day-by-day transaction sweep.

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::data::{has_player_identity, into_records, EntityFetcher, Record};
use crate::league::League;
use crate::pipeline::aggregate::{sort_transactions, without_league};

/// The `days` calendar days ending at `today`, inclusive, newest first.
pub fn sweep_dates(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .filter_map(|i| today.checked_sub_days(Days::new(u64::from(i))))
        .collect()
}

/// One request per day, sequentially. A failed or malformed day counts as
/// zero transactions. Result is untagged and sorted newest first.
pub async fn sweep_league(
    fetcher: &dyn EntityFetcher,
    league: League,
    today: NaiveDate,
    days: u32,
) -> Vec<Record> {
    let mut all = Vec::new();
    for date in sweep_dates(today, days) {
        match fetcher.get_transactions_by_date(league, date).await {
            Ok(raw) => all.extend(into_records(raw).into_iter().filter(has_player_identity)),
            Err(e) => {
                debug!(league = %league, %date, error = %e, "No transactions for day");
            }
        }
    }
    let mut all = without_league(all);
    sort_transactions(&mut all);
    all
}
