//! Spotify for Podcasters OAuth constants
//!
//! These identify the public web client used by the creators dashboard.
//! None of them are secrets; the secrets are the `sp_dc`/`sp_key` session
//! cookies and the bearer token minted from them.

/// Public client ID of the creators web dashboard
pub const DEFAULT_CLIENT_ID: &str = "05a1371ee5194c27860b3ff3ff3979d2";

/// Authorization endpoint (silent `prompt=none` flow)
pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/oauth2/v2/auth";

/// Token endpoint for the authorization code exchange
pub const TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";

/// Redirect URI registered for the dashboard client
pub const REDIRECT_URI: &str = "https://creators.spotify.com";

/// Scopes requested by the dashboard
pub const SCOPES: &str = "streaming ugc-image-upload user-read-email user-read-private";

/// Marker in the authorize page when the cookie session is no longer valid
pub const LOGIN_REQUIRED_MARKER: &str = "login_required";

/// Discriminant of a successful embedded authorization response
pub const AUTHORIZATION_RESPONSE_TYPE: &str = "authorization_response";

/// Re-authenticate when the bearer token expires within this many seconds
pub const REFRESH_MARGIN_SECS: u64 = 5 * 60;
