//! Driving distance from the home base to a show's destination.
//!
//! One lookup is one provider call: no retries, no caching. The provider
//! reports meters; callers store and display kilometers rounded to two
//! decimals.

use crate::app::ports::RoutesPort;
use crate::config::Config;
use crate::constants::{TRAVEL_MODE_DRIVE, UNITS_METRIC};
use crate::error::DistanceError;
use crate::infra::GoogleRoutesClient;
use crate::observability::metrics;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Body of a distance lookup. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
}

impl DistanceRequest {
    pub fn place_id(id: impl Into<String>) -> Self {
        Self { destination_place_id: Some(id.into()), destination_address: None }
    }

    pub fn address(address: impl Into<String>) -> Self {
        Self { destination_place_id: None, destination_address: Some(address.into()) }
    }

    /// Resolves the destination, preferring the place id over the address.
    pub fn destination(&self) -> Result<Destination, DistanceError> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(id) = present(&self.destination_place_id) {
            Ok(Destination::PlaceId(id))
        } else if let Some(address) = present(&self.destination_address) {
            Ok(Destination::Address(address))
        } else {
            Err(DistanceError::MissingDestination)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    PlaceId(String),
    Address(String),
}

impl Destination {
    /// Waypoint JSON in the provider's format.
    pub fn waypoint(&self) -> Value {
        match self {
            Destination::PlaceId(id) => json!({ "placeId": id }),
            Destination::Address(address) => json!({ "address": address }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub km: f64,
    pub meters: u64,
}

impl Distance {
    pub fn from_meters(meters: u64) -> Self {
        Self { km: meters_to_km(meters), meters }
    }
}

/// `round(meters / 1000 * 100) / 100`, evaluated in that order in f64.
pub fn meters_to_km(meters: u64) -> f64 {
    ((meters as f64 / 1000.0) * 100.0).round() / 100.0
}

/// Request body for a driving, metric route from `origin_address`.
pub fn compute_routes_body(origin_address: &str, destination: &Destination) -> Value {
    json!({
        "origin": { "address": origin_address },
        "destination": destination.waypoint(),
        "travelMode": TRAVEL_MODE_DRIVE,
        "units": UNITS_METRIC,
    })
}

/// First route's `distanceMeters`, if it is a non-negative integer.
pub fn extract_meters(payload: &Value) -> Option<u64> {
    payload.pointer("/routes/0/distanceMeters").and_then(Value::as_u64)
}

#[derive(Clone)]
pub struct DistanceNormalizer {
    routes: Arc<dyn RoutesPort>,
    api_key: Option<String>,
    origin_address: String,
}

impl DistanceNormalizer {
    pub fn new(
        routes: Arc<dyn RoutesPort>,
        api_key: Option<String>,
        origin_address: impl Into<String>,
    ) -> Self {
        Self { routes, api_key, origin_address: origin_address.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        if config.maps_api_key.is_none() {
            warn!("GOOGLE_MAPS_API_KEY is not set; distance lookups will fail");
        }
        Self::new(
            Arc::new(GoogleRoutesClient::new(config.distance.routes_url.clone())),
            config.maps_api_key.clone(),
            config.distance.origin_address.clone(),
        )
    }

    pub fn origin_address(&self) -> &str {
        &self.origin_address
    }

    #[instrument(skip(self), fields(origin = %self.origin_address))]
    pub async fn normalize(&self, request: &DistanceRequest) -> Result<Distance, DistanceError> {
        let started = Instant::now();
        let result = self.lookup(request).await;
        metrics::distance::duration(started.elapsed().as_secs_f64());

        match &result {
            Ok(distance) => {
                metrics::distance::success();
                info!(km = distance.km, meters = distance.meters, "Distance computed");
            }
            Err(e) => {
                metrics::distance::error(e.kind());
                warn!(kind = e.kind(), "Distance lookup failed: {}", e);
            }
        }
        result
    }

    async fn lookup(&self, request: &DistanceRequest) -> Result<Distance, DistanceError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(DistanceError::MissingCredential)?;
        let destination = request.destination()?;
        debug!(?destination, "Requesting route");

        let body = compute_routes_body(&self.origin_address, &destination);
        let response = self.routes.compute_route(api_key, &body).await?;

        if !response.is_success() {
            return Err(DistanceError::NoRouteFound {
                status: response.status,
                details: response.body,
            });
        }

        let meters = extract_meters(&response.body)
            .ok_or(DistanceError::MalformedResponse { details: response.body })?;
        Ok(Distance::from_meters(meters))
    }
}
