//! One method per analytics endpoint, bound to a podcast
//!
//! Each method only builds the URL and query parameters and hands them to
//! the [`RequestExecutor`] (or the episode stream). Payloads come back as
//! plain JSON for exporters and reports to interpret.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use futures::stream::BoxStream;
use serde_json::Value;
use spotify_auth::{AuthEndpoints, Credentials, Session};
use tracing::info;

use crate::dates::{catalog_window, date_params, format_date, impressions_window};
use crate::error::Result;
use crate::executor::{RequestDescriptor, RequestExecutor};
use crate::paging::episode_stream;
use crate::retry::RetryPolicy;
use crate::types::{Episode, EpisodeQuery, ImpressionKind};

/// Analytics API root used by the creators dashboard.
pub const DEFAULT_BASE_URL: &str = "https://generic.wg.spotify.com/podcasters/v0";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to build a [`Connector`].
#[derive(Debug, Clone)]
pub struct ConnectorOptions {
    pub base_url: String,
    pub podcast_id: String,
    pub credentials: Credentials,
    pub auth_endpoints: AuthEndpoints,
    pub retry: RetryPolicy,
    /// Per-request transport timeout
    pub timeout: Duration,
}

impl ConnectorOptions {
    pub fn new(podcast_id: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            podcast_id: podcast_id.into(),
            credentials,
            auth_endpoints: AuthEndpoints::default(),
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Thin routing layer over the executor for one podcast.
#[derive(Clone)]
pub struct Connector {
    base_url: String,
    podcast_id: String,
    executor: RequestExecutor,
}

impl Connector {
    pub fn new(options: ConnectorOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;
        let session = Arc::new(Session::new(
            client.clone(),
            options.credentials,
            options.auth_endpoints,
        ));
        info!(
            podcast_id = %options.podcast_id,
            base_url = %options.base_url,
            "connector initialized"
        );
        Ok(Self::from_executor(
            options.base_url,
            options.podcast_id,
            RequestExecutor::new(client, session, options.retry),
        ))
    }

    pub fn from_executor(
        base_url: impl Into<String>,
        podcast_id: impl Into<String>,
        executor: RequestExecutor,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            podcast_id: podcast_id.into(),
            executor,
        }
    }

    /// Same session (and token), different podcast.
    pub fn for_podcast(&self, podcast_id: impl Into<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            podcast_id: podcast_id.into(),
            executor: self.executor.clone(),
        }
    }

    pub fn podcast_id(&self) -> &str {
        &self.podcast_id
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    fn url(&self, segments: &[&str]) -> String {
        format!("{}/{}", self.base_url, segments.join("/"))
    }

    /// `episodes/{episode}/{operation}` or `shows/{podcast}/{operation}`.
    fn scoped_url(&self, episode_id: Option<&str>, operation: &str) -> String {
        match episode_id {
            Some(episode) => self.url(&["episodes", episode, operation]),
            None => self.url(&["shows", &self.podcast_id, operation]),
        }
    }

    async fn dated(
        &self,
        url: String,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Value> {
        let request = RequestDescriptor::new(url).params(date_params(start, end.unwrap_or(start)));
        self.executor.execute(&request).await
    }

    pub async fn metadata(&self, episode_id: Option<&str>) -> Result<Value> {
        let request = RequestDescriptor::new(self.scoped_url(episode_id, "metadata"));
        self.executor.execute(&request).await
    }

    pub async fn streams(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        episode_id: Option<&str>,
    ) -> Result<Value> {
        self.dated(self.scoped_url(episode_id, "detailedStreams"), start, end)
            .await
    }

    pub async fn listeners(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        episode_id: Option<&str>,
    ) -> Result<Value> {
        self.dated(self.scoped_url(episode_id, "listeners"), start, end)
            .await
    }

    pub async fn followers(&self, start: NaiveDate, end: Option<NaiveDate>) -> Result<Value> {
        self.dated(self.scoped_url(None, "followers"), start, end)
            .await
    }

    /// Demographic breakdown (age, gender, country).
    pub async fn aggregate(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        episode_id: Option<&str>,
    ) -> Result<Value> {
        self.dated(self.scoped_url(episode_id, "aggregate"), start, end)
            .await
    }

    pub async fn impressions(
        &self,
        kind: ImpressionKind,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Value> {
        let today = Utc::now().date_naive();
        let (start, end) = impressions_window(kind, start, end, today);
        let url = self.url(&["shows", &self.podcast_id, "impressions", kind.as_str()]);
        self.dated(url, start, Some(end)).await
    }

    /// Lazily page through the show's episodes.
    pub fn episodes(&self, query: EpisodeQuery) -> BoxStream<'static, Result<Episode>> {
        episode_stream(
            self.executor.clone(),
            self.url(&["shows", &self.podcast_id, "episodes"]),
            query,
        )
    }

    /// Every show the logged-in user can see.
    pub async fn catalog(&self) -> Result<Value> {
        let (start, end) = catalog_window(Utc::now().date_naive());
        let request = RequestDescriptor::new(self.url(&["user", "shows"])).params([
            ("page", "1".to_string()),
            ("size", "200".to_string()),
            ("sortBy", "name".to_string()),
            ("sortOrder", "ascending".to_string()),
            ("start", format_date(start)),
            ("end", format_date(end)),
        ]);
        self.executor.execute(&request).await
    }

    pub async fn performance(&self, episode_id: &str) -> Result<Value> {
        let request = RequestDescriptor::new(self.url(&["episodes", episode_id, "performance"]));
        self.executor.execute(&request).await
    }

    /// Identity of the logged-in user.
    pub async fn me(&self) -> Result<Value> {
        let request = RequestDescriptor::new(self.url(&["user", "me"]));
        self.executor.execute(&request).await
    }
}
