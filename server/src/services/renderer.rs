use chrono::Utc;
use tracing::warn;
use waypoint_shared::{MapArtifact, PlaceInput, ResolvedPlace, links};

use crate::config::Budget;
use crate::error::ComposeError;
use crate::services::composer::{ComposeParams, Composition, compose};
use crate::services::geocoder::Geocode;
use crate::state::ObservabilityCounters;

/// Compose and wrap into a presentation artifact. This boundary never fails:
/// any error becomes a degraded artifact with a readable message in place of
/// the image reference.
pub async fn render<G: Geocode>(
    geocoder: &G,
    api_key: Option<&str>,
    budget: &Budget,
    observability: &ObservabilityCounters,
    params: ComposeParams,
) -> MapArtifact {
    let Some(key) = api_key else {
        warn!(error = %ComposeError::MissingCredential, "map composition failed");
        return MapArtifact::degraded(format!(
            "{}. Set MAPS_API_KEY to render maps.",
            ComposeError::MissingCredential
        ));
    };

    let input_names: Vec<String> = params
        .places
        .iter()
        .map(PlaceInput::display_name)
        .collect();

    match compose(geocoder, key, budget, observability, params).await {
        Ok(composition) => artifact_from(key, composition, &input_names),
        Err(e) => {
            warn!(error = %e, "map composition failed");
            MapArtifact::degraded(e.to_string())
        }
    }
}

/// Single-location convenience used by the home-map route.
pub async fn render_single<G: Geocode>(
    geocoder: &G,
    api_key: Option<&str>,
    budget: &Budget,
    observability: &ObservabilityCounters,
    place: PlaceInput,
) -> MapArtifact {
    render(
        geocoder,
        api_key,
        budget,
        observability,
        ComposeParams {
            places: vec![place],
            ..ComposeParams::default()
        },
    )
    .await
}

fn artifact_from(key: &str, composition: Composition, input_names: &[String]) -> MapArtifact {
    let url = composition.request.to_url(Some(key));
    MapArtifact {
        image_reference: format!("![Map]({url})"),
        link_reference: Some(link_for(&composition.resolved, input_names)),
        resolved: composition.resolved,
        failed: composition.failed,
        generated_at: Utc::now(),
    }
}

/// A lone successful place links straight to its coordinates; zero or many
/// places get a combined name search.
fn link_for(resolved: &[ResolvedPlace], input_names: &[String]) -> String {
    match resolved {
        [only] => links::coordinate_url(only.coordinates),
        [] => links::search_url(&input_names.join(" and ")),
        many => {
            let names: Vec<&str> = many.iter().map(|place| place.name.as_str()).collect();
            links::search_url(&names.join(" and "))
        }
    }
}
