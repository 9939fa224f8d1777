use std::fmt::Write as _;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;
use waypoint_shared::{MapArtifact, MapSize, PlaceInput, TravelMode, links, staticmap};

use crate::services::composer::{CenterInput, ComposeParams};
use crate::services::geocoder::GoogleGeocoder;
use crate::services::{home, renderer};
use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

type BadRequest = (StatusCode, Json<serde_json::Value>);

fn bad_request(message: impl AsRef<str>) -> BadRequest {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.as_ref() })),
    )
}

/// The geocoder is constructed per request from the shared client. With no
/// credential configured the render boundary degrades before any resolve
/// call, so the placeholder key is never sent.
fn google_geocoder(state: &AppState) -> GoogleGeocoder {
    GoogleGeocoder::new(
        state.http_client.clone(),
        state.api_key.clone().unwrap_or_default(),
        Arc::clone(&state.observability),
    )
}

#[derive(Deserialize)]
pub struct ComposeMapBody {
    places: Vec<PlaceInput>,
    #[serde(default)]
    center: Option<CenterInput>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    zoom: Option<u8>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    colored_markers: bool,
}

pub async fn compose_map(
    State(state): State<AppState>,
    Json(body): Json<ComposeMapBody>,
) -> Result<Json<MapArtifact>, BadRequest> {
    if body.places.is_empty() {
        return Err(bad_request("at least one place is required"));
    }
    let size = match body.size.as_deref() {
        Some(raw) => raw.parse::<MapSize>().map_err(|e| bad_request(e))?,
        None => MapSize::default(),
    };
    let params = ComposeParams {
        places: body.places,
        center: body.center,
        region: body.region.filter(|region| !region.trim().is_empty()),
        zoom: body.zoom.unwrap_or(staticmap::DEFAULT_ZOOM),
        size,
        colored_markers: body.colored_markers,
    };

    let geocoder = google_geocoder(&state);
    let artifact = renderer::render(
        &geocoder,
        state.api_key.as_deref(),
        &state.budget,
        &state.observability,
        params,
    )
    .await;
    Ok(Json(artifact))
}

pub async fn home_map(State(state): State<AppState>) -> Result<Json<MapArtifact>, BadRequest> {
    if state.home_address.is_none() {
        return Err(bad_request(
            "no home address is configured; set HOME_ADDRESS",
        ));
    }
    if state.api_key.is_none() {
        return Ok(Json(MapArtifact::degraded(
            "No Google Maps API key is configured. Set MAPS_API_KEY to render maps.",
        )));
    }

    let geocoder = google_geocoder(&state);
    let artifact = match home::resolve_home(&state, &geocoder).await {
        Some(Ok((address, coordinates))) => {
            renderer::render_single(
                &geocoder,
                state.api_key.as_deref(),
                &state.budget,
                &state.observability,
                PlaceInput::Point {
                    lat: coordinates.lat,
                    lng: coordinates.lng,
                    name: Some(address),
                },
            )
            .await
        }
        Some(Err(e)) => MapArtifact::degraded(format!("could not resolve home address: {e}")),
        None => MapArtifact::degraded("no home address is configured"),
    };
    Ok(Json(artifact))
}

#[derive(Deserialize)]
pub struct SearchLinkQuery {
    query: String,
}

pub async fn search_link(
    Query(params): Query<SearchLinkQuery>,
) -> Result<Json<serde_json::Value>, BadRequest> {
    if params.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    Ok(Json(
        serde_json::json!({ "url": links::search_url(&params.query) }),
    ))
}

#[derive(Deserialize)]
pub struct DirectionsLinkQuery {
    #[serde(default)]
    origin: String,
    destination: String,
    #[serde(default)]
    mode: Option<String>,
}

pub async fn directions_link(
    State(state): State<AppState>,
    Query(params): Query<DirectionsLinkQuery>,
) -> Result<Json<serde_json::Value>, BadRequest> {
    if params.destination.trim().is_empty() {
        return Err(bad_request("destination must not be empty"));
    }
    let mode = match params.mode.as_deref() {
        Some(raw) => raw.parse::<TravelMode>().map_err(|e| bad_request(e))?,
        None => TravelMode::default(),
    };
    let url = links::directions_url(
        &params.origin,
        &params.destination,
        mode,
        state.home_address.as_deref(),
    );
    Ok(Json(serde_json::json!({ "url": url })))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "credential_configured": state.api_key.is_some(),
        "home_configured": state.home_address.is_some(),
        "observability": {
            "compositions_total": observability.compositions_total,
            "geocode_requests_total": observability.geocode_requests_total,
            "geocode_fallbacks_total": observability.geocode_fallbacks_total,
            "geocode_failures_total": observability.geocode_failures_total,
            "markers_truncated_total": observability.markers_truncated_total,
            "home_cache_hits_total": observability.home_cache_hits_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let credential_configured = state.api_key.is_some();
    let home_configured = state.home_address.is_some();
    let body = render_prometheus_metrics(
        credential_configured,
        home_configured,
        state.observability.snapshot(),
    );

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(
    credential_configured: bool,
    home_configured: bool,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "# HELP waypoint_credential_configured Whether a Maps API key is configured (1 or 0)."
    );
    let _ = writeln!(body, "# TYPE waypoint_credential_configured gauge");
    let _ = writeln!(
        body,
        "waypoint_credential_configured {}",
        u8::from(credential_configured)
    );

    let _ = writeln!(
        body,
        "# HELP waypoint_home_configured Whether a home address is configured (1 or 0)."
    );
    let _ = writeln!(body, "# TYPE waypoint_home_configured gauge");
    let _ = writeln!(
        body,
        "waypoint_home_configured {}",
        u8::from(home_configured)
    );

    let _ = writeln!(
        body,
        "# HELP waypoint_compositions_total Total map compositions attempted."
    );
    let _ = writeln!(body, "# TYPE waypoint_compositions_total counter");
    let _ = writeln!(
        body,
        "waypoint_compositions_total {}",
        observability.compositions_total
    );

    let _ = writeln!(
        body,
        "# HELP waypoint_geocode_requests_total Total place queries sent to the geocoder."
    );
    let _ = writeln!(body, "# TYPE waypoint_geocode_requests_total counter");
    let _ = writeln!(
        body,
        "waypoint_geocode_requests_total {}",
        observability.geocode_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP waypoint_geocode_fallbacks_total Geocode queries that fell back to text search."
    );
    let _ = writeln!(body, "# TYPE waypoint_geocode_fallbacks_total counter");
    let _ = writeln!(
        body,
        "waypoint_geocode_fallbacks_total {}",
        observability.geocode_fallbacks_total
    );

    let _ = writeln!(
        body,
        "# HELP waypoint_geocode_failures_total Place queries that produced no coordinates."
    );
    let _ = writeln!(body, "# TYPE waypoint_geocode_failures_total counter");
    let _ = writeln!(
        body,
        "waypoint_geocode_failures_total {}",
        observability.geocode_failures_total
    );

    let _ = writeln!(
        body,
        "# HELP waypoint_markers_truncated_total Markers dropped by URL-length budgeting."
    );
    let _ = writeln!(body, "# TYPE waypoint_markers_truncated_total counter");
    let _ = writeln!(
        body,
        "waypoint_markers_truncated_total {}",
        observability.markers_truncated_total
    );

    let _ = writeln!(
        body,
        "# HELP waypoint_home_cache_hits_total Home-address lookups served from cache."
    );
    let _ = writeln!(body, "# TYPE waypoint_home_cache_hits_total counter");
    let _ = writeln!(
        body,
        "waypoint_home_cache_hits_total {}",
        observability.home_cache_hits_total
    );

    body
}
