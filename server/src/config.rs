use std::time::Duration;

pub const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";

/// Half-width of the bounding box a coordinate bias expands into.
pub const BIAS_HALF_WIDTH_KM: f64 = 5.0;
/// Radius sent with a coordinate-biased text search, in meters.
pub const BIAS_SEARCH_RADIUS_M: u32 = 5_000;

// URL-length budget for the static map provider. Per-marker cost and safety
// margin are empirical; env-tunable, but the defaults match the provider's
// documented limits.
pub const DEFAULT_MAX_URL_LENGTH: usize = 16_384;
pub const DEFAULT_PER_MARKER_COST: usize = 100;
pub const DEFAULT_SAFETY_MARGIN: usize = 50;
pub const DEFAULT_MAX_MARKERS: usize = 10;

pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Google Maps API credential. Absence short-circuits composition before any
/// network call; the server still starts and serves degraded artifacts.
pub fn maps_api_key() -> Option<String> {
    std::env::var("MAPS_API_KEY")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Default origin for directions links and subject of the home-map route.
pub fn home_address() -> Option<String> {
    std::env::var("HOME_ADDRESS")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

/// Request-size budget for the static map provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub max_url_length: usize,
    pub per_marker_cost: usize,
    pub safety_margin: usize,
    pub max_markers: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_url_length: DEFAULT_MAX_URL_LENGTH,
            per_marker_cost: DEFAULT_PER_MARKER_COST,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            max_markers: DEFAULT_MAX_MARKERS,
        }
    }
}

impl Budget {
    pub fn from_env() -> Self {
        Self {
            max_url_length: env_usize("MAX_URL_LENGTH", DEFAULT_MAX_URL_LENGTH),
            per_marker_cost: env_usize("PER_MARKER_COST", DEFAULT_PER_MARKER_COST),
            safety_margin: env_usize("SAFETY_MARGIN", DEFAULT_SAFETY_MARGIN),
            max_markers: env_usize("MAX_MARKERS", DEFAULT_MAX_MARKERS),
        }
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
