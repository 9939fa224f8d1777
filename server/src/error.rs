use thiserror::Error;

/// Per-place resolution failures. `NotFound` and `Provider` are treated the
/// same by the composer (place not shown) but logged differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("place query is empty")]
    MissingInput,
    #[error("no match found")]
    NotFound,
    #[error("geocoding provider error: {0}")]
    Provider(String),
}

/// Failures that abort a composition before any place is attempted. Per-place
/// failures never surface here; they end up in the failed-places list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("at least one place is required")]
    EmptyPlaces,
    #[error("no Google Maps API key is configured")]
    MissingCredential,
}
