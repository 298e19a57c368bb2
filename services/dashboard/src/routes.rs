//! HTTP route handlers
//!
//! HTML flows (`/`, `/login`, `/callback`, `/logout`, `/overview`) answer
//! credential problems with a redirect back into the login flow; API flows
//! (`/search`, `/player/*`) answer with the JSON envelope. Neither ever
//! surfaces a raw error to the browser.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use spotify_auth::OAuthConfig;
use spotify_session::{CredentialManager, SessionStore};
use tracing::warn;
use uuid::Uuid;

use crate::cookies;
use crate::error::{ApiError, success_body};
use crate::gateway::{Gateway, PlayerCommand, TimeRange};
use crate::genres::genre_frequencies;
use crate::pages;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub manager: Arc<CredentialManager>,
    pub gateway: Arc<Gateway>,
    pub oauth: OAuthConfig,
    pub prometheus: PrometheusHandle,
    pub requests_total: Arc<AtomicU64>,
    pub started_at: Instant,
}

/// Build the axum router with all routes and shared state.
///
/// Applies a concurrency limit layer based on `max_connections` to bound
/// concurrent request handling.
pub fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", get(logout))
        .route("/overview", get(overview))
        .route("/search", get(search))
        .route("/player/play", post(player_play))
        .route("/player/pause", post(player_pause))
        .route("/player/next", post(player_next))
        .route("/player/previous", post(player_previous))
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            track_requests,
        ))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

/// Count every request and record its status/duration.
async fn track_requests(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    state.requests_total.fetch_add(1, Ordering::Relaxed);
    let method = request.method().clone();
    let started = Instant::now();
    let response = next.run(request).await;
    crate::metrics::record_request(
        response.status().as_u16(),
        method.as_str(),
        started.elapsed().as_secs_f64(),
    );
    response
}

/// 302 redirect (the OAuth dance and browser flows expect Found, not 303)
fn redirect(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = cookies::session_id(&headers, &state.store)
        && let Some(entry) = state.store.get(id).await
        && entry.authenticated().await
    {
        return redirect("/overview");
    }
    redirect("/login")
}

async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    // Reuse the session when the browser already carries a valid cookie, so
    // a re-login does not leak abandoned entries
    let (id, entry) = match cookies::session_id(&headers, &state.store) {
        Some(id) => match state.store.get(id).await {
            Some(entry) => (id, entry),
            None => state.store.create().await,
        },
        None => state.store.create().await,
    };

    let login_state = spotify_auth::generate_state();
    entry.set_login_state(login_state.clone()).await;
    let url = spotify_auth::authorize_url(&state.oauth, &login_state);
    let cookie = state.store.cookie_value(id);

    (
        StatusCode::FOUND,
        [
            (header::SET_COOKIE, cookies::set_session_cookie(&cookie)),
            (header::LOCATION, url),
        ],
    )
        .into_response()
}

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(session_id) = cookies::session_id(&headers, &state.store) else {
        return redirect("/login");
    };
    let Some(entry) = state.store.get(session_id).await else {
        return redirect("/login");
    };

    if let Some(error) = params.error {
        warn!(error, "authorization denied by provider");
        return (StatusCode::BAD_REQUEST, "Authorization failed").into_response();
    }
    let Some(code) = params.code else {
        return (StatusCode::BAD_REQUEST, "Authorization failed").into_response();
    };

    // The stashed state is single-use; a mismatch or replay aborts the login
    let expected = entry.take_login_state().await;
    if expected.is_none() || expected != params.state {
        warn!(session_id = %session_id.simple(), "state mismatch in OAuth callback");
        return (StatusCode::BAD_REQUEST, "State mismatch").into_response();
    }

    match state.manager.complete_login(session_id, &code).await {
        Ok(()) => redirect("/overview"),
        Err(e) => {
            warn!(error = %e, "code exchange failed, restarting login");
            redirect("/login")
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = cookies::session_id(&headers, &state.store) {
        state.manager.logout(id).await;
        state.store.remove(id).await;
    }
    (
        StatusCode::FOUND,
        [
            (header::SET_COOKIE, cookies::clear_session_cookie()),
            (header::LOCATION, "/login".to_string()),
        ],
    )
        .into_response()
}

#[derive(Deserialize)]
struct OverviewParams {
    term: Option<String>,
}

async fn overview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<OverviewParams>,
) -> Response {
    let Some(session_id) = cookies::session_id(&headers, &state.store) else {
        return redirect("/login");
    };
    let range = TimeRange::from_term(params.term.as_deref());

    match render_overview(&state, session_id, range).await {
        Ok(html) => Html(html).into_response(),
        Err(ApiError::Unauthenticated) => redirect("/login"),
        Err(e) => (e.status_code(), Html(pages::error_page(&e.to_string()))).into_response(),
    }
}

async fn render_overview(
    state: &AppState,
    session_id: Uuid,
    range: TimeRange,
) -> Result<String, ApiError> {
    let gateway = &state.gateway;
    let profile = gateway.profile(session_id).await?;
    let playlists = gateway.playlists(session_id, 15).await?;
    let top_artists = gateway.top_artists(session_id, 10, range).await?;
    let top_tracks = gateway.top_tracks(session_id, 10, range).await?;
    let saved_tracks = gateway.saved_tracks(session_id, 5).await?;
    let recently_played = gateway.recently_played(session_id, 5).await?;
    let genres = genre_frequencies(&top_artists.items);

    Ok(pages::overview(
        &profile,
        &playlists,
        &top_artists,
        &genres,
        &top_tracks,
        &saved_tracks,
        &recently_played,
        range.term(),
    ))
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(session_id) = cookies::session_id(&headers, &state.store) else {
        return ApiError::Unauthenticated.into_response();
    };
    let Some(query) = params.q.filter(|q| !q.is_empty()) else {
        return ApiError::BadRequest("Query parameter 'q' is required.".into()).into_response();
    };
    let kind = params.kind.unwrap_or_else(|| "track".to_string());

    match state.gateway.search(session_id, &query, &kind, 10).await {
        Ok(results) => Json(success_body(results)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn player_play(state: State<AppState>, headers: HeaderMap) -> Response {
    player(state, headers, PlayerCommand::Play).await
}

async fn player_pause(state: State<AppState>, headers: HeaderMap) -> Response {
    player(state, headers, PlayerCommand::Pause).await
}

async fn player_next(state: State<AppState>, headers: HeaderMap) -> Response {
    player(state, headers, PlayerCommand::Next).await
}

async fn player_previous(state: State<AppState>, headers: HeaderMap) -> Response {
    player(state, headers, PlayerCommand::Previous).await
}

async fn player(
    State(state): State<AppState>,
    headers: HeaderMap,
    command: PlayerCommand,
) -> Response {
    let Some(session_id) = cookies::session_id(&headers, &state.store) else {
        return ApiError::Unauthenticated.into_response();
    };
    match state.gateway.player(session_id, command).await {
        Ok(()) => Json(serde_json::json!({"success": true})).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Liveness endpoint: status, uptime, request count, live session count.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "requests_served": state.requests_total.load(Ordering::Relaxed),
        "sessions": state.store.len().await,
    });
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint — text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}
