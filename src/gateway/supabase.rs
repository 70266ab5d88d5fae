use crate::access::{Profile, ShowSource};
use crate::config::BackendConfig;
use crate::constants::{PROFILES_TABLE, PROFILE_COLUMNS, SHOWS_TABLE, SHOW_MONEY_COLUMNS, SHOW_PUBLIC_COLUMNS};
use crate::error::{Result, ShowsError};
use crate::observability::metrics;
use crate::shows::{ShowPayload, ShowRecord};
use crate::storage::{AuthSession, ShowStore};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Supabase-backed store: GoTrue for identities, PostgREST for rows.
///
/// Config via [`BackendConfig`]:
/// - `url` (e.g., https://xyzcompany.supabase.co)
/// - `anon_key` (public anon key; row access comes from the caller's token)
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserResponse,
}

#[derive(Deserialize)]
struct UserResponse {
    id: String,
}

impl SupabaseStore {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn with_token(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
    }

    fn select_columns(source: ShowSource) -> String {
        if source.includes_money() {
            format!("{},{}", SHOW_PUBLIC_COLUMNS, SHOW_MONEY_COLUMNS)
        } else {
            SHOW_PUBLIC_COLUMNS.to_string()
        }
    }

    /// Sends the request and turns non-2xx answers into `ShowsError::Backend`.
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            metrics::backend::success(operation);
            return Ok(resp);
        }

        metrics::backend::error(operation, status.as_u16());
        let body = resp.text().await.unwrap_or_default();
        warn!(operation, status = status.as_u16(), "Backend request failed: {}", body);
        if status == StatusCode::UNAUTHORIZED {
            return Err(ShowsError::Unauthorized);
        }
        Err(ShowsError::Backend { status: status.as_u16(), message: backend_message(&body) })
    }

    async fn send_json<T: DeserializeOwned>(&self, operation: &'static str, request: RequestBuilder) -> Result<T> {
        let resp = self.send(operation, request).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn single_row(&self, operation: &'static str, id: Uuid, request: RequestBuilder) -> Result<ShowRecord> {
        let rows: Vec<ShowRecord> = self.send_json(operation, request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ShowsError::NotFound(format!("show {}", id)))
    }
}

/// Best human-readable message in a GoTrue/PostgREST error body.
fn backend_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => ["message", "error_description", "msg", "error"]
            .iter()
            .find_map(|k| value.get(*k).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl ShowStore for SupabaseStore {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let request = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }));
        // GoTrue answers bad credentials with 400 invalid_grant
        let token: TokenResponse = self.send_json("sign_in", request).await.map_err(|e| match e {
            ShowsError::Backend { status: 400, .. } => ShowsError::Unauthorized,
            other => other,
        })?;
        Ok(AuthSession { access_token: token.access_token, user_id: token.user.id })
    }

    async fn current_user(&self, access_token: &str) -> Result<String> {
        let request = self.with_token(self.client.get(self.auth_url("user")), access_token);
        let user: UserResponse = self.send_json("current_user", request).await?;
        Ok(user.id)
    }

    async fn fetch_profile(&self, access_token: &str, user_id: &str) -> Result<Option<Profile>> {
        let request = self
            .with_token(self.client.get(self.rest_url(PROFILES_TABLE)), access_token)
            .query(&[("select", PROFILE_COLUMNS.to_string()), ("id", format!("eq.{}", user_id))]);
        let rows: Vec<Profile> = self.send_json("fetch_profile", request).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, access_token))]
    async fn list_shows(&self, access_token: &str, source: ShowSource) -> Result<Vec<ShowRecord>> {
        let request = self
            .with_token(self.client.get(self.rest_url(source.collection())), access_token)
            .query(&[
                ("select", Self::select_columns(source)),
                ("order", "show_date.asc".to_string()),
            ]);
        let rows: Vec<ShowRecord> = self.send_json("list_shows", request).await?;
        debug!("Loaded {} shows from {}", rows.len(), source.collection());
        Ok(rows)
    }

    async fn get_show(&self, access_token: &str, source: ShowSource, id: Uuid) -> Result<Option<ShowRecord>> {
        let request = self
            .with_token(self.client.get(self.rest_url(source.collection())), access_token)
            .query(&[("select", Self::select_columns(source)), ("id", format!("eq.{}", id))]);
        let rows: Vec<ShowRecord> = self.send_json("get_show", request).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, access_token, payload), fields(event = %payload.event_name))]
    async fn insert_show(&self, access_token: &str, payload: &ShowPayload) -> Result<ShowRecord> {
        let request = self
            .with_token(self.client.post(self.rest_url(SHOWS_TABLE)), access_token)
            .header("Prefer", "return=representation")
            .json(payload);
        let rows: Vec<ShowRecord> = self.send_json("insert_show", request).await?;
        rows.into_iter().next().ok_or_else(|| ShowsError::Backend {
            status: 200,
            message: "insert returned no row".to_string(),
        })
    }

    #[instrument(skip(self, access_token, payload))]
    async fn update_show(&self, access_token: &str, id: Uuid, payload: &ShowPayload) -> Result<ShowRecord> {
        let request = self
            .with_token(self.client.patch(self.rest_url(SHOWS_TABLE)), access_token)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(payload);
        self.single_row("update_show", id, request).await
    }

    #[instrument(skip(self, access_token))]
    async fn delete_show(&self, access_token: &str, id: Uuid) -> Result<()> {
        let request = self
            .with_token(self.client.delete(self.rest_url(SHOWS_TABLE)), access_token)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");
        self.single_row("delete_show", id, request).await.map(|_| ())
    }

    async fn probe(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ShowsError::Config("backend url is not configured".to_string()));
        }
        let request = self.client.get(self.auth_url("health")).header("apikey", &self.anon_key);
        self.send("probe", request).await.map(|_| ())
    }
}
