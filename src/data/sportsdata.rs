//! SportsData.io client.
//!
//! Thin JSON-over-HTTP wrapper: one GET per call, paced by a client-side
//! rate limiter, never retried. The API key travels as a query parameter
//! and is kept out of every error and log line.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::{ProviderConfig, RateLimitConfig};
use crate::data::EntityFetcher;
use crate::error::{Result, SyncError};
use crate::league::{League, LeagueClass};

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub struct SportsDataClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    limiter: Arc<Limiter>,
}

impl SportsDataClient {
    pub fn new(
        provider: &ProviderConfig,
        rate_limit: &RateLimitConfig,
        api_key: SecretString,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("sportsdata-sync/0.1")
            .timeout(Duration::from_secs(provider.timeout_seconds))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key,
            limiter: create_rate_limiter(rate_limit),
        })
    }

    /// GET `{base}/{league}/scores/json/{path}` and decode the body.
    async fn get_json(&self, league: League, path: &str) -> Result<Value> {
        self.limiter.until_ready().await;

        let endpoint = format!("{league}/scores/json/{path}");
        let url = format!("{}/{endpoint}", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|source| SyncError::Transport {
                endpoint: endpoint.clone(),
                source: source.without_url(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SyncError::Upstream {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = resp.json::<Value>().await.map_err(|source| SyncError::Decode {
            endpoint: endpoint.clone(),
            source: source.without_url(),
        })?;
        debug!(endpoint = %endpoint, "Provider response decoded");
        Ok(body)
    }
}

#[async_trait]
impl EntityFetcher for SportsDataClient {
    #[instrument(skip(self))]
    async fn get_season(&self, league: League) -> Result<Value> {
        // The irregular league's CurrentSeason lags during its off-season;
        // UpcomingSeason answers with the in-progress or next season.
        if league.class() == LeagueClass::Irregular {
            match self.get_json(league, "UpcomingSeason").await {
                Ok(season) => return Ok(season),
                Err(e) => {
                    warn!(league = %league, error = %e, "UpcomingSeason failed, trying CurrentSeason");
                }
            }
        }
        self.get_json(league, "CurrentSeason").await
    }

    async fn get_teams(&self, league: League) -> Result<Value> {
        self.get_json(league, "teams").await
    }

    async fn get_stadiums(&self, league: League) -> Result<Value> {
        self.get_json(league, "Stadiums").await
    }

    async fn get_players(&self, league: League, team_key: &str) -> Result<Value> {
        let path = format!("Players/{}", urlencoding::encode(team_key));
        self.get_json(league, &path).await
    }

    async fn get_standings(&self, league: League, season_token: &str) -> Result<Value> {
        let path = format!("Standings/{}", urlencoding::encode(season_token));
        self.get_json(league, &path).await
    }

    async fn get_transactions_by_date(&self, league: League, date: NaiveDate) -> Result<Value> {
        let path = format!("TransactionsByDate/{}", date.format("%Y-%m-%d"));
        self.get_json(league, &path).await
    }
}

fn create_rate_limiter(config: &RateLimitConfig) -> Arc<Limiter> {
    let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(config.burst_size).unwrap_or(rps);

    let quota = Quota::per_second(rps).allow_burst(burst);
    Arc::new(RateLimiter::direct(quota))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_limit_falls_back_to_one_per_second() {
        let limiter = create_rate_limiter(&RateLimitConfig {
            requests_per_second: 0,
            burst_size: 0,
        });
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = SportsDataClient::new(
            &ProviderConfig {
                base_url: "https://example.test/v3/".to_string(),
                timeout_seconds: 5,
            },
            &RateLimitConfig {
                requests_per_second: 5,
                burst_size: 5,
            },
            SecretString::from("k".to_string()),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://example.test/v3");
    }
}
