//! Resilient connector for the Spotify for Podcasters analytics API
//!
//! Layers, top to bottom:
//! 1. `Connector`: one method per endpoint, bound to a podcast id
//! 2. `paging::episode_stream`: lazy, one-page-ahead episode listing
//! 3. `RequestExecutor`: retry/backoff, 401 re-authentication, error tagging
//! 4. `spotify_auth::Session`: cookie-to-bearer handshake behind one lock
//!
//! All connectors cloned from one another (or via `for_podcast`) share the
//! same session, so they share one token and one handshake at a time.

pub mod connector;
pub mod dates;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod paging;
pub mod retry;
pub mod types;

pub use connector::{Connector, ConnectorOptions, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use executor::{RequestDescriptor, RequestExecutor};
pub use retry::{RetryPolicy, StatusClass, classify_status};
pub use spotify_auth::{AuthEndpoints, Credentials};
pub use types::{Episode, EpisodeQuery, ImpressionKind, SortOrder};
