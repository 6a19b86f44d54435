pub mod aggregate;
pub mod runner;
pub mod transactions;

pub use runner::{rebuild_combined, LeagueOutcome, Pipeline, RunReport, SyncOptions};
