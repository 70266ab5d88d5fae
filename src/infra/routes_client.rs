use crate::app::ports::{RoutesPort, RoutesResponse};
use crate::constants::{ROUTES_API_KEY_HEADER, ROUTES_FIELD_MASK, ROUTES_FIELD_MASK_HEADER};
use crate::error::DistanceError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

/// Google Routes API `computeRoutes` over reqwest.
pub struct GoogleRoutesClient {
    client: reqwest::Client,
    url: String,
}

impl GoogleRoutesClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }
}

#[async_trait]
impl RoutesPort for GoogleRoutesClient {
    async fn compute_route(&self, api_key: &str, body: &Value) -> Result<RoutesResponse, DistanceError> {
        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ROUTES_API_KEY_HEADER, api_key)
            .header(ROUTES_FIELD_MASK_HEADER, ROUTES_FIELD_MASK)
            .json(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        // Error responses are JSON too; a non-JSON body is a ServerError.
        let body: Value = resp.json().await?;
        Ok(RoutesResponse { status, body })
    }
}
