use tracing::debug;
use waypoint_shared::Coordinates;

use crate::error::GeocodeError;
use crate::services::geocoder::Geocode;
use crate::state::{AppState, HomeCache};

/// Resolve the configured home address, reusing the cached coordinate while
/// the address string is unchanged. Returns None when no home is configured.
pub async fn resolve_home<G: Geocode>(
    state: &AppState,
    geocoder: &G,
) -> Option<Result<(String, Coordinates), GeocodeError>> {
    let address = state.home_address.clone()?;

    {
        let cached = state.home_cache.read().await;
        if let Some(entry) = cached.as_ref()
            && entry.address == address
        {
            state.observability.record_home_cache_hit();
            return Some(Ok((address, entry.coordinates)));
        }
    }

    debug!(%address, "resolving home address");
    let coordinates = match geocoder.resolve(&address, None).await {
        Ok(coordinates) => coordinates,
        Err(e) => return Some(Err(e)),
    };

    let mut cached = state.home_cache.write().await;
    *cached = Some(HomeCache {
        address: address.clone(),
        coordinates,
    });
    Some(Ok((address, coordinates)))
}
