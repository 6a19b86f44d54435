use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use sportsdata_sync::config::{AppConfig, Secrets, DEFAULT_CONFIG_PATH};
use sportsdata_sync::data::sportsdata::SportsDataClient;
use sportsdata_sync::monitoring::logger;
use sportsdata_sync::pipeline::{rebuild_combined, LeagueOutcome, Pipeline, SyncOptions};
use sportsdata_sync::store::DataStore;

#[derive(Debug, Parser)]
#[command(name = "sportsdata-sync", version, about = "Sync SportsData.io league data to JSON")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch every league (skipping cached ones) and write all outputs.
    Fetch {
        /// Only write per-league files.
        #[arg(long)]
        no_combined: bool,
        /// Replay persisted transactions instead of sweeping the last days.
        #[arg(long)]
        skip_transactions: bool,
    },
    /// Refresh standings from each league's persisted current season.
    Standings,
    /// Rebuild combined files from per-league files, without network access.
    Rebuild,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, secrets) = AppConfig::load(&cli.config)?;

    logger::init_logging(&config.monitoring)?;

    tracing::info!(
        leagues = ?config.sync.leagues,
        data_dir = %config.storage.data_dir.display(),
        "sportsdata-sync starting"
    );

    let store = DataStore::new(&config.storage.data_dir);

    match cli.command {
        Command::Fetch {
            no_combined,
            skip_transactions,
        } => {
            let mut options = SyncOptions::from_config(&config.sync);
            options.write_combined &= !no_combined;
            options.sweep_transactions &= !skip_transactions;
            run_fetch(&config, &secrets, store, &options).await
        }
        Command::Standings => run_standings(&config, &secrets, store).await,
        Command::Rebuild => {
            let combined = rebuild_combined(&store, &config.sync.leagues);
            store.write_combined(&combined)?;
            tracing::info!("Combined data rebuilt from per-league files");
            Ok(())
        }
    }
}

fn pipeline(config: &AppConfig, secrets: &Secrets, store: DataStore) -> Result<Pipeline> {
    let api_key = secrets.require_api_key()?;
    let client = SportsDataClient::new(&config.provider, &config.rate_limit, api_key)?;
    Ok(Pipeline::new(
        Box::new(client),
        store,
        config.sync.leagues.clone(),
    ))
}

async fn run_fetch(
    config: &AppConfig,
    secrets: &Secrets,
    store: DataStore,
    options: &SyncOptions,
) -> Result<()> {
    let pipeline = pipeline(config, secrets, store)?;
    let report = pipeline.run(options).await?;

    let failed = report
        .leagues
        .iter()
        .filter(|(_, outcome)| matches!(outcome, LeagueOutcome::Failed(_)))
        .count();
    if failed > 0 {
        tracing::warn!(failed, "Run finished with failed leagues");
    } else {
        tracing::info!(
            teams = report.combined.teams.len(),
            players = report.combined.rosters.len(),
            transactions = report.combined.transactions.len(),
            "Run finished"
        );
    }
    Ok(())
}

async fn run_standings(config: &AppConfig, secrets: &Secrets, store: DataStore) -> Result<()> {
    let pipeline = pipeline(config, secrets, store.clone())?;
    let outcomes = pipeline.refresh_standings().await;
    tracing::info!(leagues = outcomes.len(), "Standings refresh finished");

    if config.sync.write_combined {
        let combined = rebuild_combined(&store, &config.sync.leagues);
        store.write_combined(&combined)?;
    }
    Ok(())
}
