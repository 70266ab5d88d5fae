use crate::error::DistanceError;
use async_trait::async_trait;
use serde_json::Value;

/// Outbound seam to the routing provider.
#[async_trait]
pub trait RoutesPort: Send + Sync {
    /// Sends one compute-route request and returns the provider's status and
    /// JSON payload. Transport and decoding failures are `ServerError`s.
    async fn compute_route(&self, api_key: &str, body: &Value) -> Result<RoutesResponse, DistanceError>;
}

#[derive(Clone, Debug)]
pub struct RoutesResponse {
    pub status: u16,
    pub body: Value,
}

impl RoutesResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
