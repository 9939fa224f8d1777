use tracing::{debug, info};
use waypoint_shared::{
    Coordinates, MapRequest, MapSize, Marker, PlaceInput, ResolvedPlace, color_for_index,
    label_for_index,
};

use crate::config::Budget;
use crate::error::{ComposeError, GeocodeError};
use crate::services::geocoder::{Bias, Geocode};
use crate::state::ObservabilityCounters;

/// Map center requested by the caller: free text geocoded without bias, or a
/// coordinate pair used as-is.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum CenterInput {
    Point { lat: f64, lng: f64 },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposeParams {
    pub places: Vec<PlaceInput>,
    pub center: Option<CenterInput>,
    /// Free-text region preference, used as a geocoding bias only while no
    /// coordinate (center or first-success) bias is available.
    pub region: Option<String>,
    pub zoom: u8,
    pub size: MapSize,
    pub colored_markers: bool,
}

impl Default for ComposeParams {
    fn default() -> Self {
        Self {
            places: Vec::new(),
            center: None,
            region: None,
            zoom: waypoint_shared::staticmap::DEFAULT_ZOOM,
            size: MapSize::default(),
            colored_markers: false,
        }
    }
}

/// Result of one composition: a serializable request descriptor plus the
/// split of inputs into places that made it onto the map and places that
/// did not.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub request: MapRequest,
    pub resolved: Vec<ResolvedPlace>,
    pub failed: Vec<String>,
    /// Places dropped by budget enforcement; already counted in `failed`.
    pub truncated: usize,
}

/// Resolve every place, assemble markers and the visible region, then enforce
/// the provider's URL-length budget.
///
/// Places are geocoded strictly in input order. When no explicit center is
/// given, each later string place is biased toward the first successful
/// resolution, so the sequence must not be reordered or parallelized.
pub async fn compose<G: Geocode>(
    geocoder: &G,
    api_key: &str,
    budget: &Budget,
    observability: &ObservabilityCounters,
    params: ComposeParams,
) -> Result<Composition, ComposeError> {
    if params.places.is_empty() {
        return Err(ComposeError::EmptyPlaces);
    }
    observability.record_composition();

    let center = match params.center {
        Some(CenterInput::Point { lat, lng }) => Some(Coordinates::new(lat, lng)),
        Some(CenterInput::Text(text)) => match geocoder.resolve(&text, None).await {
            Ok(coords) => Some(coords),
            Err(e) => {
                debug!(center = %text, error = %e, "center did not resolve, relying on visible region");
                None
            }
        },
        None => None,
    };

    let mut request = MapRequest {
        size: params.size,
        zoom: params.zoom,
        center,
        ..MapRequest::default()
    };
    let mut resolved: Vec<ResolvedPlace> = Vec::new();
    let mut failed: Vec<String> = Vec::new();

    for (index, place) in params.places.into_iter().enumerate() {
        let name = place.display_name();
        if place.is_blank() {
            failed.push(name);
            continue;
        }
        let coords = match place.coordinates() {
            Some(coords) => Some(coords),
            None => {
                let bias = center
                    .or_else(|| resolved.first().map(|p| p.coordinates))
                    .map(Bias::Near)
                    .or_else(|| params.region.clone().map(Bias::Region));
                match geocoder.resolve(&name, bias.as_ref()).await {
                    Ok(coords) => Some(coords),
                    Err(GeocodeError::Provider(ref message)) => {
                        debug!(place = %name, %message, "provider error, place dropped");
                        None
                    }
                    Err(_) => None,
                }
            }
        };

        match coords {
            Some(coords) => {
                request.markers.push(Marker {
                    position: coords,
                    color: color_for_index(index, params.colored_markers),
                    label: label_for_index(index),
                });
                resolved.push(ResolvedPlace {
                    name,
                    coordinates: coords,
                    label: label_for_index(index),
                });
            }
            None => failed.push(name),
        }
    }

    request.visible = resolved.iter().map(|p| p.coordinates).collect();

    let truncated = enforce_budget(budget, api_key, &mut request, &mut resolved, &mut failed);
    if truncated > 0 {
        observability.record_markers_truncated(truncated as u64);
    }
    info!(
        resolved = resolved.len(),
        failed = failed.len(),
        truncated,
        "composed static map request"
    );

    Ok(Composition {
        request,
        resolved,
        failed,
        truncated,
    })
}

/// Drop markers until the serialized request fits the provider limit. The
/// largest admissible prefix is kept; everything past it is reclassified as
/// failed. Returns the number of places truncated.
fn enforce_budget(
    budget: &Budget,
    api_key: &str,
    request: &mut MapRequest,
    resolved: &mut Vec<ResolvedPlace>,
    failed: &mut Vec<String>,
) -> usize {
    if request.to_url(Some(api_key)).len() <= budget.max_url_length {
        return 0;
    }

    let base = MapRequest {
        markers: Vec::new(),
        visible: Vec::new(),
        ..request.clone()
    }
    .to_url(None)
    .len();
    let key_len = "&key=".len() + api_key.len();
    let available = budget
        .max_url_length
        .saturating_sub(base + key_len + budget.safety_margin);
    let allowed = (available / budget.per_marker_cost).min(budget.max_markers);

    if allowed >= resolved.len() {
        return 0;
    }

    let overflow = resolved.split_off(allowed);
    let truncated = overflow.len();
    failed.extend(overflow.into_iter().map(|place| place.name));
    request.markers.truncate(allowed);
    request.visible = resolved.iter().map(|p| p.coordinates).collect();
    truncated
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use waypoint_shared::{Coordinates, MapSize, PlaceInput};

    use super::{CenterInput, ComposeParams, compose};
    use crate::config::Budget;
    use crate::error::{ComposeError, GeocodeError};
    use crate::state::ObservabilityCounters;
    use crate::services::geocoder::{Bias, Geocode};

    /// Scripted geocoder: answers from a fixed table and records the bias
    /// passed with every call.
    struct StubGeocoder {
        answers: HashMap<String, Coordinates>,
        calls: Mutex<Vec<(String, Option<Bias>)>>,
    }

    impl StubGeocoder {
        fn new(answers: &[(&str, Coordinates)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(name, coords)| (name.to_string(), *coords))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Option<Bias>)> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl Geocode for StubGeocoder {
        async fn resolve(
            &self,
            query: &str,
            bias: Option<&Bias>,
        ) -> Result<Coordinates, GeocodeError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((query.to_string(), bias.cloned()));
            self.answers
                .get(query)
                .copied()
                .ok_or(GeocodeError::NotFound)
        }
    }

    fn text_places(names: &[&str]) -> Vec<PlaceInput> {
        names
            .iter()
            .map(|name| PlaceInput::Text(name.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn empty_place_list_is_an_error() {
        let geocoder = StubGeocoder::new(&[]);
        let result = compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams::default(),
        )
        .await;
        assert_eq!(result.unwrap_err(), ComposeError::EmptyPlaces);
    }

    #[tokio::test]
    async fn labels_stay_tied_to_input_index_across_failures() {
        let geocoder = StubGeocoder::new(&[
            ("A Street", Coordinates::new(1.0, 1.0)),
            ("C Ave", Coordinates::new(2.0, 2.0)),
        ]);
        let composition = compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams {
                places: text_places(&["A Street", "badquery", "C Ave"]),
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition succeeds");

        assert_eq!(composition.resolved.len(), 2);
        assert_eq!(composition.resolved[0].label, 'A');
        assert_eq!(composition.resolved[1].label, 'C');
        assert_eq!(composition.failed, vec!["badquery".to_string()]);
    }

    #[tokio::test]
    async fn later_places_are_biased_toward_the_first_success() {
        let first = Coordinates::new(48.137, 11.575);
        let geocoder = StubGeocoder::new(&[
            ("Marienplatz", first),
            ("Hofbräuhaus", Coordinates::new(48.138, 11.580)),
        ]);
        compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams {
                places: text_places(&["Marienplatz", "Hofbräuhaus"]),
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition succeeds");

        let calls = geocoder.calls();
        assert_eq!(calls[0], ("Marienplatz".to_string(), None));
        assert_eq!(
            calls[1],
            ("Hofbräuhaus".to_string(), Some(Bias::Near(first)))
        );
    }

    #[tokio::test]
    async fn explicit_center_bias_wins_over_chain_bias() {
        let center = Coordinates::new(52.52, 13.405);
        let geocoder = StubGeocoder::new(&[
            ("First", Coordinates::new(1.0, 1.0)),
            ("Second", Coordinates::new(2.0, 2.0)),
        ]);
        compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams {
                places: text_places(&["First", "Second"]),
                center: Some(CenterInput::Point {
                    lat: center.lat,
                    lng: center.lng,
                }),
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition succeeds");

        let calls = geocoder.calls();
        assert_eq!(calls[0].1, Some(Bias::Near(center)));
        assert_eq!(calls[1].1, Some(Bias::Near(center)));
    }

    #[tokio::test]
    async fn region_bias_applies_until_a_coordinate_bias_exists() {
        let hit = Coordinates::new(48.137, 11.575);
        let geocoder = StubGeocoder::new(&[
            ("Hit", hit),
            ("Tail", Coordinates::new(48.140, 11.580)),
        ]);
        compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams {
                places: text_places(&["miss", "Hit", "Tail"]),
                region: Some("Bavaria, Germany".into()),
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition succeeds");

        // Region carries the first calls; once a place resolves, the
        // coordinate chain bias takes over.
        let calls = geocoder.calls();
        let region = Some(Bias::Region("Bavaria, Germany".to_string()));
        assert_eq!(calls[0].1, region);
        assert_eq!(calls[1].1, region);
        assert_eq!(calls[2].1, Some(Bias::Near(hit)));
    }

    #[tokio::test]
    async fn unresolvable_center_is_dropped_not_fatal() {
        let geocoder = StubGeocoder::new(&[("Somewhere", Coordinates::new(3.0, 3.0))]);
        let composition = compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams {
                places: text_places(&["Somewhere"]),
                center: Some(CenterInput::Text("nowhere at all".into())),
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition succeeds");

        assert_eq!(composition.request.center, None);
        assert_eq!(composition.resolved.len(), 1);
    }

    #[tokio::test]
    async fn coordinate_inputs_skip_the_geocoder() {
        let geocoder = StubGeocoder::new(&[]);
        let composition = compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams {
                places: vec![PlaceInput::Point {
                    lat: 9.0,
                    lng: 8.0,
                    name: Some("Pinned".into()),
                }],
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition succeeds");

        assert!(geocoder.calls().is_empty());
        assert_eq!(composition.resolved[0].name, "Pinned");
        assert_eq!(composition.resolved[0].coordinates, Coordinates::new(9.0, 8.0));
    }

    #[tokio::test]
    async fn total_failure_degrades_to_center_and_zoom() {
        let geocoder = StubGeocoder::new(&[]);
        let composition = compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams {
                places: text_places(&["one", "two", "three"]),
                center: Some(CenterInput::Point { lat: 5.0, lng: 6.0 }),
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition still succeeds");

        assert!(composition.resolved.is_empty());
        assert_eq!(composition.failed.len(), 3);
        let url = composition.request.to_url(Some("key"));
        assert!(url.contains("center=5.000000%2C6.000000"));
        assert!(url.contains("zoom=15"));
        assert!(!url.contains("visible="));
    }

    #[tokio::test]
    async fn blank_places_never_reach_the_geocoder() {
        let geocoder = StubGeocoder::new(&[("Real place", Coordinates::new(1.0, 2.0))]);
        let composition = compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams {
                places: vec![
                    PlaceInput::Text("   ".into()),
                    PlaceInput::Text("Real place".into()),
                ],
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition succeeds");

        // The blank entry fails without a provider call; the real one keeps
        // the label of its own index.
        assert_eq!(geocoder.calls().len(), 1);
        assert_eq!(composition.resolved[0].label, 'B');
        assert_eq!(composition.failed, vec!["".to_string()]);
    }

    #[tokio::test]
    async fn budget_truncation_moves_overflow_to_failed() {
        let places: Vec<String> = (0..15).map(|i| format!("Place {i}")).collect();
        let answers: Vec<(String, Coordinates)> = places
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), Coordinates::new(i as f64, i as f64)))
            .collect();
        let answer_refs: Vec<(&str, Coordinates)> = answers
            .iter()
            .map(|(name, coords)| (name.as_str(), *coords))
            .collect();
        let geocoder = StubGeocoder::new(&answer_refs);

        // Tight budget: base + key + margin leave room for exactly 10 markers.
        let budget = Budget {
            max_url_length: 1_200,
            per_marker_cost: 100,
            safety_margin: 50,
            max_markers: 10,
        };
        let composition = compose(
            &geocoder,
            "key",
            &budget,
            &ObservabilityCounters::default(),
            ComposeParams {
                places: places.iter().map(|p| PlaceInput::Text(p.clone())).collect(),
                size: MapSize::default(),
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition succeeds");

        assert_eq!(composition.resolved.len(), 10);
        assert_eq!(composition.request.markers.len(), 10);
        assert_eq!(composition.request.visible.len(), 10);
        assert_eq!(composition.failed.len(), 5);
        assert_eq!(composition.truncated, 5);
        for i in 10..15 {
            assert!(composition.failed.contains(&format!("Place {i}")));
        }
    }

    #[tokio::test]
    async fn budget_is_a_no_op_for_requests_that_fit() {
        let geocoder = StubGeocoder::new(&[("Only", Coordinates::new(1.0, 1.0))]);
        let composition = compose(
            &geocoder,
            "key",
            &Budget::default(),
            &ObservabilityCounters::default(),
            ComposeParams {
                places: text_places(&["Only"]),
                ..ComposeParams::default()
            },
        )
        .await
        .expect("composition succeeds");
        assert_eq!(composition.resolved.len(), 1);
        assert!(composition.failed.is_empty());
    }
}
