use std::sync::Arc;

use tracing::{debug, warn};
use waypoint_shared::{Bounds, Coordinates};

use crate::config::{BIAS_HALF_WIDTH_KM, BIAS_SEARCH_RADIUS_M, GEOCODE_URL, TEXT_SEARCH_URL};
use crate::error::GeocodeError;
use crate::state::ObservabilityCounters;

/// Advisory hint that prefers results near an area without excluding others.
#[derive(Debug, Clone, PartialEq)]
pub enum Bias {
    /// Coarse region filter from free text; only the first comma-delimited
    /// token is sent upstream.
    Region(String),
    /// Prefer matches near a point (a resolved center or an earlier place).
    Near(Coordinates),
}

impl Bias {
    fn region_token(text: &str) -> Option<&str> {
        text.split(',').next().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// The geocoding capability the composer consumes. Behind a trait so the
/// composition pipeline can be driven by a scripted stub in tests.
pub trait Geocode {
    fn resolve(
        &self,
        query: &str,
        bias: Option<&Bias>,
    ) -> impl Future<Output = Result<Coordinates, GeocodeError>> + Send;
}

/// Geocoder backed by the Google Geocoding and Places Text Search APIs.
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    geocode_url: String,
    text_search_url: String,
    observability: Arc<ObservabilityCounters>,
}

impl GoogleGeocoder {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        observability: Arc<ObservabilityCounters>,
    ) -> Self {
        Self {
            client,
            api_key,
            geocode_url: GEOCODE_URL.to_string(),
            text_search_url: TEXT_SEARCH_URL.to_string(),
            observability,
        }
    }

    /// Direct address geocoding. `Ok(None)` is the valid ZERO_RESULTS
    /// outcome, not an error.
    async fn geocode(
        &self,
        address: &str,
        bias: Option<&Bias>,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        let mut request = self
            .client
            .get(&self.geocode_url)
            .query(&[("address", address), ("key", self.api_key.as_str())]);
        match bias {
            Some(Bias::Region(text)) => {
                if let Some(token) = Bias::region_token(text) {
                    request = request.query(&[("region", token)]);
                }
            }
            Some(Bias::Near(center)) => {
                let bounds = Bounds::around(*center, BIAS_HALF_WIDTH_KM);
                request = request.query(&[("bounds", bounds.to_param().as_str())]);
            }
            None => {}
        }

        let payload = send_provider_request(request, "geocode").await?;
        interpret_provider_response(payload, "geocode")
    }

    /// Places text search, the fallback for queries the address geocoder
    /// cannot place (landmark names, business names).
    async fn text_search(
        &self,
        query: &str,
        bias: Option<&Bias>,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        let mut request = self
            .client
            .get(&self.text_search_url)
            .query(&[("query", query), ("key", self.api_key.as_str())]);
        match bias {
            Some(Bias::Region(text)) => {
                if let Some(token) = Bias::region_token(text) {
                    request = request.query(&[("region", token)]);
                }
            }
            Some(Bias::Near(center)) => {
                let radius = BIAS_SEARCH_RADIUS_M.to_string();
                request = request.query(&[
                    ("location", center.to_param().as_str()),
                    ("radius", radius.as_str()),
                ]);
            }
            None => {}
        }

        let payload = send_provider_request(request, "text search").await?;
        interpret_provider_response(payload, "text search")
    }
}

impl Geocode for GoogleGeocoder {
    async fn resolve(
        &self,
        query: &str,
        bias: Option<&Bias>,
    ) -> Result<Coordinates, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::MissingInput);
        }

        self.observability.record_geocode_request();
        if let Some(coords) = self.geocode(query, bias).await.inspect_err(|e| {
            self.observability.record_geocode_failure();
            warn!(%query, error = %e, "geocoding failed");
        })? {
            return Ok(coords);
        }

        self.observability.record_geocode_fallback();
        if let Some(coords) = self.text_search(query, bias).await.inspect_err(|e| {
            self.observability.record_geocode_failure();
            warn!(%query, error = %e, "text search fallback failed");
        })? {
            return Ok(coords);
        }

        self.observability.record_geocode_failure();
        debug!(%query, "no geocoding match");
        Err(GeocodeError::NotFound)
    }
}

// Wire shapes shared by both provider endpoints; only `status` and the first
// result's geometry are read.
#[derive(serde::Deserialize)]
struct ProviderResponse {
    status: String,
    #[serde(default)]
    results: Vec<ProviderResult>,
}

#[derive(serde::Deserialize)]
struct ProviderResult {
    geometry: ProviderGeometry,
}

#[derive(serde::Deserialize)]
struct ProviderGeometry {
    location: ProviderLocation,
}

#[derive(serde::Deserialize)]
struct ProviderLocation {
    lat: f64,
    lng: f64,
}

impl From<ProviderLocation> for Coordinates {
    fn from(value: ProviderLocation) -> Self {
        Coordinates::new(value.lat, value.lng)
    }
}

/// Map a provider payload onto the resolution outcome. `ZERO_RESULTS` is a
/// valid empty answer; any other non-OK status is a provider fault.
fn interpret_provider_response(
    payload: ProviderResponse,
    context: &str,
) -> Result<Option<Coordinates>, GeocodeError> {
    match payload.status.as_str() {
        "OK" => Ok(payload
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location.into())),
        "ZERO_RESULTS" => Ok(None),
        other => Err(GeocodeError::Provider(format!("{context} status {other}"))),
    }
}

async fn send_provider_request(
    request: reqwest::RequestBuilder,
    context: &str,
) -> Result<ProviderResponse, GeocodeError> {
    let response = request
        .send()
        .await
        .map_err(|e| GeocodeError::Provider(format!("{context} request failed: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        return Err(GeocodeError::Provider(format!(
            "{context} returned HTTP {status}"
        )));
    }
    response
        .json::<ProviderResponse>()
        .await
        .map_err(|e| GeocodeError::Provider(format!("{context} payload decode failed: {e}")))
}
