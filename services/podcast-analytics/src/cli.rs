//! Command-line definition

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use spotify_connector::{EpisodeQuery, ImpressionKind, SortOrder};

/// Query podcast analytics from the creators dashboard API.
#[derive(Debug, Parser)]
#[command(name = "podcast-analytics")]
#[command(version)]
#[command(about = "Query podcast analytics from the creators dashboard API")]
pub struct Cli {
    /// Config file (default: CONFIG_PATH, then podcast-analytics.toml).
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Podcast to query (default: SPOTIFY_PODCAST_ID, then spotify.podcast_id).
    #[arg(long, global = true)]
    pub podcast: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Logged-in user.
    Me,

    /// Shows visible to the user.
    Catalog,

    /// Show or episode metadata.
    Metadata {
        #[arg(long)]
        episode: Option<String>,
    },

    /// Detailed streams.
    Streams(ScopedRange),

    /// Listener counts.
    Listeners(ScopedRange),

    /// Follower counts.
    Followers(DateRange),

    /// Demographics (age, gender, country).
    Aggregate(ScopedRange),

    /// Impressions over a window of at most 30 days.
    Impressions(ImpressionArgs),

    /// Paged episode listing.
    Episodes(EpisodeArgs),

    /// Per-episode performance.
    Performance {
        #[arg(long)]
        episode: String,
    },
}

/// `--start`/`--end`, both `YYYY-MM-DD`.
#[derive(Debug, Clone, Args)]
pub struct DateRange {
    /// First day (default: yesterday, UTC).
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last day (default: same as start).
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Args)]
pub struct ScopedRange {
    #[command(flatten)]
    pub range: DateRange,

    /// Restrict to one episode instead of the whole show.
    #[arg(long)]
    pub episode: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ImpressionArgs {
    #[arg(long, default_value = "total", value_parser = parse_impression_kind)]
    pub kind: ImpressionKind,

    #[command(flatten)]
    pub range: DateRange,
}

#[derive(Debug, Clone, Args)]
pub struct EpisodeArgs {
    #[command(flatten)]
    pub range: DateRange,

    /// First page to fetch (1-based).
    #[arg(long)]
    pub page: Option<u32>,

    /// Episodes per page.
    #[arg(long)]
    pub size: Option<u32>,

    /// Stop after this many episodes; later pages are never requested.
    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long)]
    pub sort_by: Option<String>,

    #[arg(long, value_parser = parse_sort_order)]
    pub sort_order: Option<SortOrder>,

    #[arg(long)]
    pub filter: Option<String>,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Me => "me",
            Self::Catalog => "catalog",
            Self::Metadata { .. } => "metadata",
            Self::Streams(_) => "streams",
            Self::Listeners(_) => "listeners",
            Self::Followers(_) => "followers",
            Self::Aggregate(_) => "aggregate",
            Self::Impressions(_) => "impressions",
            Self::Episodes(_) => "episodes",
            Self::Performance { .. } => "performance",
        }
    }

    /// Whether the command addresses a show and so needs a podcast id.
    pub fn needs_podcast(&self) -> bool {
        !matches!(self, Self::Me | Self::Catalog | Self::Performance { .. })
    }
}

impl DateRange {
    pub fn start_or(&self, default: NaiveDate) -> NaiveDate {
        self.start.unwrap_or(default)
    }
}

impl EpisodeArgs {
    pub fn query(&self, start: NaiveDate) -> EpisodeQuery {
        let mut query = EpisodeQuery::new(start);
        if let Some(end) = self.range.end {
            query = query.end(end);
        }
        if let Some(page) = self.page {
            query = query.page(page);
        }
        if let Some(size) = self.size {
            query = query.size(size);
        }
        if self.sort_by.is_some() || self.sort_order.is_some() {
            let sort_by = self.sort_by.clone().unwrap_or_else(|| query.sort_by.clone());
            let order = self.sort_order.unwrap_or(query.sort_order);
            query = query.sort(sort_by, order);
        }
        if let Some(ref filter) = self.filter {
            query = query.filter(filter.as_str());
        }
        query
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_impression_kind(s: &str) -> Result<ImpressionKind, String> {
    s.parse()
}

fn parse_sort_order(s: &str) -> Result<SortOrder, String> {
    s.parse()
}
