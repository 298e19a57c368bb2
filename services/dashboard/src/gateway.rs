//! Authenticated API gateway
//!
//! Binds one Spotify Web API call to a currently valid credential and
//! normalizes provider failures. The operation set is closed and typed —
//! every reachable provider call is a named method or a `PlayerCommand`
//! variant, so a typo is a compile error, not a runtime surprise.
//!
//! Each call obtains its bearer token from the credential manager (which may
//! refresh inline), issues exactly one request, and wraps any provider-side
//! failure as `ApiError::Upstream` carrying the provider's message.

use std::sync::Arc;

use serde::Deserialize;
use spotify_session::CredentialManager;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;

/// Spotify Web API base URL
pub const API_BASE: &str = "https://api.spotify.com/v1";

/// Top-item time window, as exposed on the HTTP surface (`term` query
/// parameter) and translated to the provider's enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    FourWeeks,
    SixMonths,
    Lifetime,
}

impl TimeRange {
    /// Parse the `term` query parameter; unknown or absent values fall back
    /// to the six-month default.
    pub fn from_term(term: Option<&str>) -> Self {
        match term {
            Some("4_weeks") => Self::FourWeeks,
            Some("lifetime") => Self::Lifetime,
            _ => Self::SixMonths,
        }
    }

    /// The provider's `time_range` value.
    pub fn provider_param(self) -> &'static str {
        match self {
            Self::FourWeeks => "short_term",
            Self::SixMonths => "medium_term",
            Self::Lifetime => "long_term",
        }
    }

    /// The canonical `term` query value (echoed into page links).
    pub fn term(self) -> &'static str {
        match self {
            Self::FourWeeks => "4_weeks",
            Self::SixMonths => "6_months",
            Self::Lifetime => "lifetime",
        }
    }
}

/// Playback transport operations — the full closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Next,
    Previous,
}

impl PlayerCommand {
    pub fn method(self) -> reqwest::Method {
        match self {
            Self::Play | Self::Pause => reqwest::Method::PUT,
            Self::Next | Self::Previous => reqwest::Method::POST,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Play => "/me/player/play",
            Self::Pause => "/me/player/pause",
            Self::Next => "/me/player/next",
            Self::Previous => "/me/player/previous",
        }
    }
}

/// Paged provider response — only the items are interesting here.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Deserialize)]
pub struct Playlist {
    pub name: String,
}

/// `/me/tracks` and `/me/player/recently-played` wrap each track one level
/// deeper than the top-item endpoints.
#[derive(Debug, Deserialize)]
pub struct TrackItem {
    pub track: Track,
}

/// Per-call wrapper around the Spotify Web API.
pub struct Gateway {
    manager: Arc<CredentialManager>,
    http: reqwest::Client,
    api_base: String,
}

impl Gateway {
    pub fn new(manager: Arc<CredentialManager>, http: reqwest::Client) -> Self {
        Self {
            manager,
            http,
            api_base: API_BASE.to_string(),
        }
    }

    /// Override the API base URL (tests point this at a mock server).
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    pub async fn profile(&self, session: Uuid) -> Result<Profile, ApiError> {
        self.get_typed(session, "/me", &[]).await
    }

    pub async fn playlists(&self, session: Uuid, limit: u32) -> Result<Page<Playlist>, ApiError> {
        self.get_typed(session, "/me/playlists", &[("limit", limit.to_string())])
            .await
    }

    pub async fn saved_tracks(
        &self,
        session: Uuid,
        limit: u32,
    ) -> Result<Page<TrackItem>, ApiError> {
        self.get_typed(session, "/me/tracks", &[("limit", limit.to_string())])
            .await
    }

    pub async fn top_artists(
        &self,
        session: Uuid,
        limit: u32,
        range: TimeRange,
    ) -> Result<Page<Artist>, ApiError> {
        self.get_typed(
            session,
            "/me/top/artists",
            &[
                ("limit", limit.to_string()),
                ("time_range", range.provider_param().to_string()),
            ],
        )
        .await
    }

    pub async fn top_tracks(
        &self,
        session: Uuid,
        limit: u32,
        range: TimeRange,
    ) -> Result<Page<Track>, ApiError> {
        self.get_typed(
            session,
            "/me/top/tracks",
            &[
                ("limit", limit.to_string()),
                ("time_range", range.provider_param().to_string()),
            ],
        )
        .await
    }

    pub async fn recently_played(
        &self,
        session: Uuid,
        limit: u32,
    ) -> Result<Page<TrackItem>, ApiError> {
        self.get_typed(
            session,
            "/me/player/recently-played",
            &[("limit", limit.to_string())],
        )
        .await
    }

    /// Raw passthrough of the provider's search response.
    pub async fn search(
        &self,
        session: Uuid,
        query: &str,
        kind: &str,
        limit: u32,
    ) -> Result<serde_json::Value, ApiError> {
        self.get_json(
            session,
            "/search",
            &[
                ("q", query.to_string()),
                ("type", kind.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Issue a playback transport command. Success responses carry no body.
    pub async fn player(&self, session: Uuid, command: PlayerCommand) -> Result<(), ApiError> {
        let token = self
            .manager
            .access_token(session)
            .await
            .map_err(ApiError::from_session)?;
        let url = format!("{}{}", self.api_base.trim_end_matches('/'), command.path());

        let response = self
            .http
            .request(command.method(), url)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_LENGTH, "0")
            .send()
            .await
            .map_err(|e| {
                crate::metrics::record_upstream_error("transport");
                ApiError::transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(command = ?command, status = %status, "player command rejected");
            crate::metrics::record_upstream_error("status");
            return Err(ApiError::upstream(status, &body));
        }
        Ok(())
    }

    /// One authenticated GET, returning the raw JSON body.
    async fn get_json(
        &self,
        session: Uuid,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ApiError> {
        let token = self
            .manager
            .access_token(session)
            .await
            .map_err(ApiError::from_session)?;
        let url = format!("{}{}", self.api_base.trim_end_matches('/'), path);

        let mut request = self.http.get(url).bearer_auth(&token);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| {
            crate::metrics::record_upstream_error("transport");
            ApiError::transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(path, status = %status, "provider rejected call");
            crate::metrics::record_upstream_error("status");
            return Err(ApiError::upstream(status, &body));
        }

        response.json().await.map_err(|e| ApiError::Upstream {
            status: None,
            message: format!("malformed provider response: {e}"),
        })
    }

    /// One authenticated GET, deserialized into a typed response.
    async fn get_typed<T: serde::de::DeserializeOwned>(
        &self,
        session: Uuid,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let value = self.get_json(session, path, query).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Upstream {
            status: None,
            message: format!("malformed provider response: {e}"),
        })
    }
}
