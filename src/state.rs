use crate::access::Session;
use crate::distance::DistanceNormalizer;
use crate::error::{Result, ShowsError};
use crate::readiness::ReadinessWatch;
use crate::storage::ShowStore;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ShowStore>,
    pub distance: DistanceNormalizer,
    pub backend_ready: ReadinessWatch,
    pub readiness_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ShowStore>,
        distance: DistanceNormalizer,
        backend_ready: ReadinessWatch,
        readiness_timeout: Duration,
    ) -> Self {
        Self { store, distance, backend_ready, readiness_timeout }
    }

    /// Fails with `Unavailable` when the backend never came up.
    pub async fn wait_for_backend(&self) -> Result<()> {
        self.backend_ready.wait(self.readiness_timeout).await
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ShowsError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let access_token = bearer_token(parts).ok_or(ShowsError::Unauthorized)?.to_string();
        state.wait_for_backend().await?;

        let user_id = state.store.current_user(&access_token).await?;
        let profile = state
            .store
            .fetch_profile(&access_token, &user_id)
            .await?
            .ok_or(ShowsError::MissingProfile)?;
        debug!(user_id = %user_id, role = ?profile.role, "Session resolved");

        Ok(Session { user_id, access_token, profile })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn reads_bearer_tokens_only() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }
}
