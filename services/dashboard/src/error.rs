//! Route-level error taxonomy and response mapping
//!
//! Credential-layer errors never reach the browser as raw errors: API routes
//! answer with the JSON envelope below, HTML routes map `Unauthenticated` to
//! a redirect before this type ever renders. Upstream failures pass the
//! provider's status through where known, 500 otherwise.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors surfaced by route handlers and the API gateway.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable credential — the route layer redirects to login (HTML) or
    /// answers 401 (API), never 500.
    #[error("Authentication required.")]
    Unauthenticated,

    #[error("{0}")]
    BadRequest(String),

    /// Authenticated call rejected by the provider for a reason other than
    /// credential validity (not-found, rate-limited, bad request).
    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
}

impl ApiError {
    /// Map a credential-layer error into the route taxonomy.
    pub fn from_session(err: spotify_session::Error) -> Self {
        match err {
            spotify_session::Error::Unauthenticated => Self::Unauthenticated,
            spotify_session::Error::Exchange(message) => Self::Upstream {
                status: None,
                message,
            },
        }
    }

    /// Wrap a provider error response, extracting the provider's message
    /// from the `{"error":{"message":...}}` body shape when present.
    pub fn upstream(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    format!("provider returned {status}")
                } else {
                    body.to_string()
                }
            });
        Self::Upstream {
            status: Some(status.as_u16()),
            message,
        }
    }

    /// Wrap a transport failure (connect error, timeout).
    pub fn transport(err: reqwest::Error) -> Self {
        Self::Upstream {
            status: None,
            message: format!("provider request failed: {err}"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream {
                status: Some(status),
                ..
            } => StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Upstream { status: None, .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `{"success":false,"error":{"message":...}}`
pub fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": { "message": message }
    })
}

/// `{"success":true,"data":...}`
pub fn success_body(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": data
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(error_body(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_extracts_provider_message() {
        let err = ApiError::upstream(
            StatusCode::NOT_FOUND,
            r#"{"error":{"status":404,"message":"No active device found"}}"#,
        );
        assert_eq!(err.to_string(), "No active device found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_falls_back_to_raw_body() {
        let err = ApiError::upstream(StatusCode::BAD_GATEWAY, "gateway exploded");
        assert_eq!(err.to_string(), "gateway exploded");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn upstream_empty_body_names_the_status() {
        let err = ApiError::upstream(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn unauthenticated_maps_to_401() {
        assert_eq!(
            ApiError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn upstream_without_status_maps_to_500() {
        let err = ApiError::Upstream {
            status: None,
            message: "connection refused".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn session_errors_collapse_into_taxonomy() {
        let err = ApiError::from_session(spotify_session::Error::Unauthenticated);
        assert!(matches!(err, ApiError::Unauthenticated));

        let err = ApiError::from_session(spotify_session::Error::Exchange("boom".into()));
        assert!(matches!(err, ApiError::Upstream { status: None, .. }));
    }

    #[test]
    fn error_body_matches_wire_shape() {
        let body = error_body("Query parameter 'q' is required.");
        assert_eq!(
            body.to_string(),
            r#"{"error":{"message":"Query parameter 'q' is required."},"success":false}"#
        );
    }
}
