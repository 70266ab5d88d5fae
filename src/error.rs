use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::access::Capability;
use crate::constants::{
    MSG_MISSING_CREDENTIAL, MSG_MISSING_DESTINATION, MSG_MISSING_DISTANCE, MSG_ROUTES_API_ERROR,
    MSG_SERVER_ERROR,
};

#[derive(Error, Debug)]
pub enum ShowsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Invalid show: {0}")]
    Validation(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing or invalid session")]
    Unauthorized,

    #[error("Role is not allowed to {0}")]
    Forbidden(Capability),

    #[error("No profile exists for this user")]
    MissingProfile,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, ShowsError>;

impl ShowsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShowsError::Validation(_) | ShowsError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ShowsError::Unauthorized => StatusCode::UNAUTHORIZED,
            ShowsError::Forbidden(_) | ShowsError::MissingProfile => StatusCode::FORBIDDEN,
            ShowsError::NotFound(_) => StatusCode::NOT_FOUND,
            ShowsError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ShowsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ShowsError::Backend { status: upstream, message } => json!({
                "error": "Backend error",
                "details": message,
                "status": upstream,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ShowsError {
    fn from(rejection: JsonRejection) -> Self {
        ShowsError::InvalidBody(rejection.body_text())
    }
}

/// Failures of a single distance lookup. Every variant is terminal for
/// the invocation; nothing is retried.
#[derive(Error, Debug)]
pub enum DistanceError {
    #[error("Falta GOOGLE_MAPS_API_KEY en .env.local")]
    MissingCredential,

    #[error("Manda destinationPlaceId o destinationAddress")]
    MissingDestination,

    #[error("Google Routes API error ({status})")]
    NoRouteFound { status: u16, details: Value },

    #[error("No llegó distanceMeters")]
    MalformedResponse { details: Value },

    #[error("Server error: {0}")]
    ServerError(String),
}

impl DistanceError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DistanceError::MissingCredential => "missing_credential",
            DistanceError::MissingDestination => "missing_destination",
            DistanceError::NoRouteFound { .. } => "no_route_found",
            DistanceError::MalformedResponse { .. } => "malformed_response",
            DistanceError::ServerError(_) => "server_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DistanceError::MissingDestination => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body returned to callers of the distance endpoint.
    pub fn to_body(&self) -> Value {
        match self {
            DistanceError::MissingCredential => json!({ "error": MSG_MISSING_CREDENTIAL }),
            DistanceError::MissingDestination => json!({ "error": MSG_MISSING_DESTINATION }),
            DistanceError::NoRouteFound { status, details } => json!({
                "error": MSG_ROUTES_API_ERROR,
                "details": details,
                "status": status,
            }),
            DistanceError::MalformedResponse { details } => json!({
                "error": MSG_MISSING_DISTANCE,
                "details": details,
            }),
            DistanceError::ServerError(message) => json!({
                "error": MSG_SERVER_ERROR,
                "details": message,
            }),
        }
    }

    /// Most specific human-readable message, preferring the provider's own
    /// error text when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            DistanceError::NoRouteFound { details, .. } => details
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| MSG_ROUTES_API_ERROR.to_string()),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for DistanceError {
    fn from(e: reqwest::Error) -> Self {
        DistanceError::ServerError(e.to_string())
    }
}

impl From<serde_json::Error> for DistanceError {
    fn from(e: serde_json::Error) -> Self {
        DistanceError::ServerError(e.to_string())
    }
}

impl IntoResponse for DistanceError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_errors_map_to_documented_statuses() {
        assert_eq!(DistanceError::MissingDestination.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            DistanceError::MissingCredential.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DistanceError::ServerError("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn no_route_body_carries_upstream_payload_and_status() {
        let err = DistanceError::NoRouteFound {
            status: 403,
            details: json!({ "error": { "message": "API key not valid" } }),
        };
        let body = err.to_body();
        assert_eq!(body["error"], MSG_ROUTES_API_ERROR);
        assert_eq!(body["status"], 403);
        assert_eq!(body["details"]["error"]["message"], "API key not valid");
        assert_eq!(err.user_message(), "API key not valid");
    }

    #[test]
    fn server_error_body_keeps_original_message() {
        let body = DistanceError::ServerError("connection reset".into()).to_body();
        assert_eq!(body, json!({ "error": "Server error", "details": "connection reset" }));
    }

    #[test]
    fn shows_error_statuses() {
        assert_eq!(ShowsError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ShowsError::Forbidden(Capability::CreateShow).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ShowsError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ShowsError::InvalidBody("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ShowsError::Backend { status: 409, message: "dup".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
