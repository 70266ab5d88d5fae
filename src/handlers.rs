use crate::access::{Capability, Profile, Session};
use crate::distance::{Distance, DistanceRequest};
use crate::error::{DistanceError, Result, ShowsError};
use crate::observability::metrics;
use crate::shows::{PlaceSelection, ShowFilter, ShowForm, ShowListing, ShowRecord};
use crate::state::AppState;
use crate::storage::AuthSession;
use crate::summary::{local_today, Dashboard};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "fullbrand-shows",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn metrics_text() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render().unwrap_or_default(),
    )
}

/// `POST /api/distance`. Unauthenticated, independent of backend readiness.
pub async fn distance(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<Distance>, DistanceError> {
    // A `null` body carries no destination; anything unparseable is a server error
    let request = match serde_json::from_slice::<Value>(&body)? {
        Value::Null => DistanceRequest::default(),
        value => serde_json::from_value::<DistanceRequest>(value)?,
    };
    let distance = state.distance.normalize(&request).await?;
    Ok(Json(distance))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    request: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthSession>> {
    let Json(request) = request?;
    state.wait_for_backend().await?;
    let session = state.store.sign_in(request.email.trim(), &request.password).await?;
    info!(user_id = %session.user_id, "Signed in");
    Ok(Json(session))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub profile: Profile,
    pub capabilities: Vec<Capability>,
}

pub async fn me(session: Session) -> Json<MeResponse> {
    let capabilities = session.role().capabilities();
    Json(MeResponse { user_id: session.user_id, profile: session.profile, capabilities })
}

pub async fn dashboard(State(state): State<AppState>, session: Session) -> Result<Json<Dashboard>> {
    session.require(Capability::ViewShows)?;
    let records = state.store.list_shows(&session.access_token, session.show_source()).await?;
    Ok(Json(Dashboard::build(&records, local_today())))
}

pub async fn list_shows(
    State(state): State<AppState>,
    session: Session,
    Query(filter): Query<ShowFilter>,
) -> Result<Json<ShowListing>> {
    session.require(Capability::ViewShows)?;
    let records = state.store.list_shows(&session.access_token, session.show_source()).await?;
    Ok(Json(ShowListing::build(records, &filter, session.can(Capability::SeeMoney))))
}

#[derive(Debug, Serialize)]
pub struct ShowDetail {
    pub show: ShowRecord,
    /// Prefilled edit form.
    pub form: ShowForm,
}

pub async fn get_show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ShowDetail>> {
    session.require(Capability::ViewShows)?;
    let show = state
        .store
        .get_show(&session.access_token, session.show_source(), id)
        .await?
        .ok_or_else(|| ShowsError::NotFound(format!("show {}", id)))?;
    let form = ShowForm::from_record(&show);
    Ok(Json(ShowDetail { show, form }))
}

pub async fn create_show(
    State(state): State<AppState>,
    session: Session,
    form: std::result::Result<Json<ShowForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ShowRecord>)> {
    session.require(Capability::CreateShow)?;
    let Json(form) = form?;
    let payload = form.into_payload(session.can(Capability::SeeMoney))?;
    let record = state.store.insert_show(&session.access_token, &payload).await?;
    metrics::shows::created();
    info!(id = %record.id, event = %payload.event_name, "Show created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Money columns are left out of the update for roles that cannot see
/// them, so their stored values survive the edit.
pub async fn update_show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    form: std::result::Result<Json<ShowForm>, JsonRejection>,
) -> Result<Json<ShowRecord>> {
    session.require(Capability::EditShow)?;
    let Json(form) = form?;
    let payload = form.into_payload(session.can(Capability::SeeMoney))?;
    let record = state.store.update_show(&session.access_token, id, &payload).await?;
    metrics::shows::updated();
    info!(id = %id, "Show updated");
    Ok(Json(record))
}

pub async fn delete_show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    session.require(Capability::DeleteShow)?;
    state.store.delete_show(&session.access_token, id).await?;
    metrics::shows::deleted();
    info!(id = %id, "Show deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    #[serde(default)]
    pub form: ShowForm,
    pub selection: PlaceSelection,
}

#[derive(Debug, Serialize)]
pub struct PlaceResponse {
    pub form: ShowForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub km_error: Option<String>,
}

/// Merges an autocomplete pick into the form and recomputes `km_distance`.
/// A failed lookup still returns the merged form, with the error message.
pub async fn apply_place(
    State(state): State<AppState>,
    session: Session,
    request: std::result::Result<Json<PlaceRequest>, JsonRejection>,
) -> Result<Json<PlaceResponse>> {
    if !session.can(Capability::CreateShow) {
        session.require(Capability::EditShow)?;
    }
    let Json(request) = request?;

    let mut form = request.form;
    form.apply_place(&request.selection);

    let response = match state.distance.normalize(&form.distance_request()).await {
        Ok(distance) => {
            form.km_distance = distance.km.to_string();
            PlaceResponse { form, distance: Some(distance), km_error: None }
        }
        Err(e) => {
            warn!("Could not compute distance for selected place: {}", e);
            PlaceResponse { form, distance: None, km_error: Some(e.user_message()) }
        }
    };
    Ok(Json(response))
}
