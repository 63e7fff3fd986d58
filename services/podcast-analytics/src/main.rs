//! Podcast analytics CLI
//!
//! Loads cookies and settings, builds a connector for one podcast, runs a
//! single analytics query and prints the JSON payload on stdout. Logs go to
//! stderr as JSON.

mod cli;
mod config;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use futures::{StreamExt, TryStreamExt};
use serde_json::Value;
use spotify_connector::{Connector, Episode};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // JSON logs on stderr with LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = Config::resolve_path(cli.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");
    let config = Config::from_cli(cli.config.as_deref())
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let command = &cli.command;
    let podcast_id = cli
        .podcast
        .clone()
        .or_else(|| config.spotify.podcast_id.clone())
        .unwrap_or_default();
    if command.needs_podcast() && podcast_id.is_empty() {
        anyhow::bail!(
            "command {} needs a podcast id: pass --podcast, set SPOTIFY_PODCAST_ID or spotify.podcast_id",
            command.name()
        );
    }

    let options = config
        .connector_options(&podcast_id)
        .context("incomplete Spotify credentials")?;
    let connector = Connector::new(options).context("failed to build connector")?;

    info!(command = command.name(), podcast_id = %podcast_id, "running query");
    let payload = run(&connector, command, Utc::now().date_naive())
        .await
        .with_context(|| format!("{} query failed", command.name()))?;

    let rendered = serde_json::to_string_pretty(&payload).context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}

/// Dispatch one command. `today` anchors the default start date.
async fn run(connector: &Connector, command: &Command, today: NaiveDate) -> Result<Value> {
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);

    let payload = match command {
        Command::Me => connector.me().await?,
        Command::Catalog => connector.catalog().await?,
        Command::Metadata { episode } => connector.metadata(episode.as_deref()).await?,
        Command::Streams(args) => {
            connector
                .streams(args.range.start_or(yesterday), args.range.end, args.episode.as_deref())
                .await?
        }
        Command::Listeners(args) => {
            connector
                .listeners(args.range.start_or(yesterday), args.range.end, args.episode.as_deref())
                .await?
        }
        Command::Followers(range) => {
            connector
                .followers(range.start_or(yesterday), range.end)
                .await?
        }
        Command::Aggregate(args) => {
            connector
                .aggregate(args.range.start_or(yesterday), args.range.end, args.episode.as_deref())
                .await?
        }
        Command::Impressions(args) => {
            connector
                .impressions(args.kind, args.range.start, args.range.end)
                .await?
        }
        Command::Performance { episode } => connector.performance(episode).await?,
        Command::Episodes(args) => {
            let episodes = connector.episodes(args.query(args.range.start_or(yesterday)));
            let episodes: Vec<Episode> = match args.limit {
                Some(limit) => episodes.take(limit).try_collect().await?,
                None => episodes.try_collect().await?,
            };
            serde_json::to_value(episodes).context("failed to encode episodes")?
        }
    };
    Ok(payload)
}
