use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header::AUTHORIZATION, header::CONTENT_TYPE, Request, StatusCode};
use chrono::NaiveDate;
use fullbrand_shows::access::{Profile, Role, ShowSource};
use fullbrand_shows::app::ports::{RoutesPort, RoutesResponse};
use fullbrand_shows::distance::DistanceNormalizer;
use fullbrand_shows::error::DistanceError;
use fullbrand_shows::readiness::{readiness, ReadinessWatch};
use fullbrand_shows::server::create_router;
use fullbrand_shows::shows::{Act, ShowRecord, ShowType};
use fullbrand_shows::state::AppState;
use fullbrand_shows::storage::{InMemoryStore, ShowStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

struct FixedRoutes {
    status: u16,
    body: Value,
}

#[async_trait]
impl RoutesPort for FixedRoutes {
    async fn compute_route(&self, _api_key: &str, _body: &Value) -> Result<RoutesResponse, DistanceError> {
        Ok(RoutesResponse { status: self.status, body: self.body.clone() })
    }
}

struct Fixture {
    store: Arc<InMemoryStore>,
    app: axum::Router,
    morro: Uuid,
    carnaval: Uuid,
}

fn profile(role: Role, scope: Option<Act>) -> Option<Profile> {
    Some(Profile { role, full_name: None, artist_scope: scope })
}

fn show(act: Act, date: &str, event: &str, venue: &str, cost: f64, km: f64) -> ShowRecord {
    ShowRecord {
        show_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        artist: Some(act),
        show_type: Some(ShowType::Showcase),
        event_name: Some(event.to_string()),
        venue_name: Some(venue.to_string()),
        km_distance: Some(km),
        show_cost: Some(cost),
        advance_paid: Some(cost / 2.0),
        viaticos_cobrados: Some(500.0),
        ..ShowRecord::default()
    }
}

fn fixture_with(routes: FixedRoutes, backend_ready: ReadinessWatch) -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    store.add_user("admin@fullbrand.mx", "admin-pw", "tok-admin", profile(Role::Admin, None));
    store.add_user("staff@fullbrand.mx", "staff-pw", "tok-staff", profile(Role::Staff, None));
    store.add_user("gudi@fullbrand.mx", "gudi-pw", "tok-gudi", profile(Role::Artist, Some(Act::Elgudi)));
    store.add_user("ghost@fullbrand.mx", "ghost-pw", "tok-ghost", None);

    let morro = store.seed_show(show(Act::Jeyf, "2099-03-01", "Fiesta El Morro", "Playa Norte", 20000.0, 12.35));
    let carnaval = store.seed_show(show(Act::Elgudi, "2099-02-10", "Carnaval", "Malecón", 30000.0, 100.0));
    store.seed_show(show(Act::Elgudi, "2001-05-05", "Boda privada", "Hacienda", 10000.0, 0.0));

    let state = AppState::new(
        store.clone(),
        DistanceNormalizer::new(Arc::new(routes), Some("test-key".to_string()), "El Morro"),
        backend_ready,
        Duration::from_millis(50),
    );
    Fixture { store, app: create_router(state), morro, carnaval }
}

fn fixture() -> Fixture {
    let routes = FixedRoutes { status: 200, body: json!({ "routes": [{ "distanceMeters": 84210 }] }) };
    fixture_with(routes, ReadinessWatch::ready_now())
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

fn new_show_form() -> Value {
    json!({
        "show_date": "2099-07-20",
        "artist": "ELGUDI",
        "show_type": "SHOW_COMPLETO",
        "event_name": "  Feria de Tlacotalpan  ",
        "venue_name": "Plaza Zaragoza",
        "km_distance": "95.4",
        "show_cost": "45,000",
        "advance_paid": "",
        "viaticos_cobrados": "3000"
    })
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() -> Result<()> {
    let fx = fixture();
    let (status, _) = send(&fx.app, "GET", "/api/shows", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&fx.app, "GET", "/api/shows", Some("tok-unknown"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn user_without_profile_is_forbidden() -> Result<()> {
    let fx = fixture();
    let (status, _) = send(&fx.app, "GET", "/api/me", Some("tok-ghost"), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn login_exchanges_credentials_for_a_token() -> Result<()> {
    let fx = fixture();
    let (status, body) = send(
        &fx.app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": " staff@fullbrand.mx ", "password": "staff-pw" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "tok-staff");

    let (status, _) = send(
        &fx.app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "staff@fullbrand.mx", "password": "wrong" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn me_reports_role_and_capabilities() -> Result<()> {
    let fx = fixture();
    let (status, body) = send(&fx.app, "GET", "/api/me", Some("tok-staff"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "staff");
    assert_eq!(body["capabilities"], json!(["view_shows", "edit_show", "delete_show"]));

    let (_, body) = send(&fx.app, "GET", "/api/me", Some("tok-gudi"), None).await?;
    assert_eq!(body["artist_scope"], "ELGUDI");
    Ok(())
}

#[tokio::test]
async fn staff_listing_never_carries_money() -> Result<()> {
    let fx = fixture();
    let (status, body) = send(&fx.app, "GET", "/api/shows", Some("tok-staff"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert!(body["totals"].is_null());
    for show in body["shows"].as_array().into_iter().flatten() {
        assert!(show["show_cost"].is_null());
    }
    Ok(())
}

#[tokio::test]
async fn admin_listing_filters_and_totals() -> Result<()> {
    let fx = fixture();
    let (status, body) = send(&fx.app, "GET", "/api/shows?artist=ELGUDI", Some("tok-admin"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    // Ascending by date
    assert_eq!(body["shows"][0]["event_name"], "Boda privada");
    assert_eq!(body["totals"]["show_cost"], 40000.0);
    assert_eq!(body["totals"]["viaticos"], 1000.0);

    let (_, body) = send(&fx.app, "GET", "/api/shows?q=MALEC&month=2099-02", Some("tok-admin"), None).await?;
    assert_eq!(body["count"], 1);
    assert_eq!(body["shows"][0]["id"], fx.carnaval.to_string());
    Ok(())
}

#[tokio::test]
async fn dashboard_is_scoped_to_the_artist() -> Result<()> {
    let fx = fixture();
    let (status, body) = send(&fx.app, "GET", "/api/dashboard", Some("tok-gudi"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["all"]["totalShows"], 2);
    assert_eq!(body["all"]["upcoming"], 1);
    assert_eq!(body["all"]["ingresos"], 40000.0);
    // The 0 km show is left out of the average
    assert_eq!(body["all"]["kmAvg"], 100.0);
    assert_eq!(body["jeyf"]["totalShows"], 0);
    assert_eq!(body["upcoming"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn get_show_returns_record_and_prefilled_form() -> Result<()> {
    let fx = fixture();
    let uri = format!("/api/shows/{}", fx.morro);
    let (status, body) = send(&fx.app, "GET", &uri, Some("tok-admin"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["show"]["event_name"], "Fiesta El Morro");
    assert_eq!(body["form"]["show_date"], "2099-03-01");
    assert_eq!(body["form"]["km_distance"], "12.35");

    // Scoped artist cannot see the other act's show
    let (status, _) = send(&fx.app, "GET", &uri, Some("tok-gudi"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn only_admin_creates_shows() -> Result<()> {
    let fx = fixture();
    let (status, _) = send(&fx.app, "POST", "/api/shows", Some("tok-staff"), Some(new_show_form())).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(fx.store.show_count(), 3);

    let (status, body) = send(&fx.app, "POST", "/api/shows", Some("tok-admin"), Some(new_show_form())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["event_name"], "Feria de Tlacotalpan");
    assert_eq!(body["show_type"], "SHOW_COMPLETO");
    assert_eq!(body["show_cost"], 45000.0);
    assert!(body["advance_paid"].is_null());
    assert_eq!(fx.store.show_count(), 4);
    Ok(())
}

#[tokio::test]
async fn invalid_form_is_rejected() -> Result<()> {
    let fx = fixture();
    let mut form = new_show_form();
    form["event_name"] = json!(" x ");
    let (status, body) = send(&fx.app, "POST", "/api/shows", Some("tok-admin"), Some(form)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("event_name"));

    let mut form = new_show_form();
    form["show_cost"] = json!("-10");
    let (status, _) = send(&fx.app, "POST", "/api/shows", Some("tok-admin"), Some(form)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fx.store.show_count(), 3);
    Ok(())
}

#[tokio::test]
async fn unknown_act_is_a_json_bad_request() -> Result<()> {
    let fx = fixture();
    let mut form = new_show_form();
    form["artist"] = json!("OTRO");
    let (status, body) = send(&fx.app, "POST", "/api/shows", Some("tok-admin"), Some(form)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("OTRO"));

    let uri = format!("/api/shows/{}", fx.morro);
    let (status, body) = send(
        &fx.app,
        "PUT",
        &uri,
        Some("tok-staff"),
        Some(json!({ "show_date": "2099-03-01", "show_type": "CONCIERTO" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&fx.app, "POST", "/api/login", None, Some(json!({ "email": 7 }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(fx.store.show_count(), 3);
    Ok(())
}

#[tokio::test]
async fn staff_edit_keeps_stored_money() -> Result<()> {
    let fx = fixture();
    let uri = format!("/api/shows/{}", fx.morro);
    let (_, detail) = send(&fx.app, "GET", &uri, Some("tok-staff"), None).await?;

    let mut form = detail["form"].clone();
    form["venue_name"] = json!("Playa Sur");
    let (status, body) = send(&fx.app, "PUT", &uri, Some("tok-staff"), Some(form)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["venue_name"], "Playa Sur");

    let stored = fx
        .store
        .get_show("tok-admin", ShowSource::Full, fx.morro)
        .await?
        .expect("show still exists");
    assert_eq!(stored.venue_name.as_deref(), Some("Playa Sur"));
    assert_eq!(stored.show_cost, Some(20000.0));
    assert_eq!(stored.advance_paid, Some(10000.0));
    Ok(())
}

#[tokio::test]
async fn delete_show_and_unknown_ids() -> Result<()> {
    let fx = fixture();
    let uri = format!("/api/shows/{}", fx.carnaval);

    let (status, _) = send(&fx.app, "DELETE", &uri, Some("tok-gudi"), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&fx.app, "DELETE", &uri, Some("tok-staff"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    assert_eq!(fx.store.show_count(), 2);

    let (status, _) = send(&fx.app, "DELETE", &uri, Some("tok-staff"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn place_selection_fills_distance() -> Result<()> {
    let fx = fixture();
    let request = json!({
        "form": { "address_text": "typed by hand", "km_distance": "1" },
        "selection": {
            "formatted_address": "Xalapa-Enríquez, Ver., México",
            "place_id": "ChIJxalapa",
            "lat": 19.5438,
            "lng": -96.9102
        }
    });
    let (status, body) = send(&fx.app, "POST", "/api/shows/place", Some("tok-staff"), Some(request)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["address_text"], "Xalapa-Enríquez, Ver., México");
    assert_eq!(body["form"]["maps_place_id"], "ChIJxalapa");
    assert_eq!(body["form"]["km_distance"], "84.21");
    assert_eq!(body["distance"]["meters"], 84210);
    assert!(body.get("km_error").is_none());
    Ok(())
}

#[tokio::test]
async fn place_selection_reports_provider_message() -> Result<()> {
    let routes = FixedRoutes {
        status: 400,
        body: json!({ "error": { "message": "Invalid place id" } }),
    };
    let fx = fixture_with(routes, ReadinessWatch::ready_now());
    let request = json!({ "selection": { "place_id": "nope" } });

    let (status, body) = send(&fx.app, "POST", "/api/shows/place", Some("tok-admin"), Some(request)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["km_error"], "Invalid place id");
    assert_eq!(body["form"]["km_distance"], "");

    // Artists cannot edit, so they cannot pick places either
    let request = json!({ "selection": { "place_id": "nope" } });
    let (status, _) = send(&fx.app, "POST", "/api/shows/place", Some("tok-gudi"), Some(request)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn unavailable_backend_answers_503() -> Result<()> {
    let routes = FixedRoutes { status: 200, body: json!({}) };
    let (signal, watch) = readiness();
    signal.unavailable("backend probe failed");
    let fx = fixture_with(routes, watch);

    let (status, body) = send(&fx.app, "GET", "/api/shows", Some("tok-admin"), None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap_or_default().contains("backend probe failed"));
    Ok(())
}

#[tokio::test]
async fn pending_backend_times_out_to_503() -> Result<()> {
    let routes = FixedRoutes { status: 200, body: json!({}) };
    let (_signal, watch) = readiness();
    let fx = fixture_with(routes, watch);

    let (status, _) = send(&fx.app, "GET", "/api/dashboard", Some("tok-admin"), None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn health_and_metrics_are_public() -> Result<()> {
    let fx = fixture();
    let (status, body) = send(&fx.app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let response = fx
        .app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
