//! Season-aware multi-league sync for SportsData.io.
//!
//! Fetches seasons, teams, rosters, stadiums, standings and transactions for
//! NBA, NHL, NFL and MLB, and persists per-league and combined JSON views.

pub mod config;
pub mod data;
pub mod error;
pub mod league;
pub mod monitoring;
pub mod pipeline;
pub mod season;
pub mod store;
