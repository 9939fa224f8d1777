//! Google Maps deep-link builders. Pure string construction; every function
//! returns a well-formed URL for any input.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::coords::Coordinates;

const SEARCH_BASE: &str = "https://www.google.com/maps/search/";
const DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/";
const PLACE_BASE: &str = "https://www.google.com/maps/place/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

impl std::str::FromStr for TravelMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "driving" => Ok(Self::Driving),
            "walking" => Ok(Self::Walking),
            "bicycling" => Ok(Self::Bicycling),
            "transit" => Ok(Self::Transit),
            other => Err(format!("unknown travel mode: {other}")),
        }
    }
}

pub fn search_url(query: &str) -> String {
    let params = form_urlencoded::Serializer::new(String::new())
        .append_pair("api", "1")
        .append_pair("query", query.trim())
        .finish();
    format!("{SEARCH_BASE}?{params}")
}

/// Direct link to a coordinate pair, used when an exact point is known.
pub fn coordinate_url(coords: Coordinates) -> String {
    search_url(&coords.to_param())
}

/// Directions link. A blank origin falls back to `home` when one is
/// configured, otherwise the provider picks the user's current location.
pub fn directions_url(
    origin: &str,
    destination: &str,
    mode: TravelMode,
    home: Option<&str>,
) -> String {
    let origin = match origin.trim() {
        "" => home.unwrap_or("").trim(),
        trimmed => trimmed,
    };
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("api", "1");
    if !origin.is_empty() {
        params.append_pair("origin", origin);
    }
    params
        .append_pair("destination", destination.trim())
        .append_pair("travelmode", mode.as_param());
    format!("{DIRECTIONS_BASE}?{}", params.finish())
}

pub fn place_url(place_id: &str) -> String {
    let params = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", &format!("place_id:{}", place_id.trim()))
        .finish();
    format!("{PLACE_BASE}?{params}")
}

#[cfg(test)]
mod tests {
    use super::{TravelMode, coordinate_url, directions_url, place_url, search_url};
    use crate::coords::Coordinates;

    #[test]
    fn search_url_percent_encodes_the_query() {
        assert_eq!(
            search_url("Café Einstein, Berlin"),
            "https://www.google.com/maps/search/?api=1&query=Caf%C3%A9+Einstein%2C+Berlin"
        );
    }

    #[test]
    fn coordinate_url_uses_the_numeric_pair() {
        let url = coordinate_url(Coordinates::new(52.52, 13.405));
        assert_eq!(
            url,
            "https://www.google.com/maps/search/?api=1&query=52.520000%2C13.405000"
        );
    }

    #[test]
    fn blank_origin_falls_back_to_the_home_address() {
        let url = directions_url("  ", "Hamburg", TravelMode::Transit, Some("Berlin Hbf"));
        assert!(url.contains("origin=Berlin+Hbf"));
        assert!(url.contains("destination=Hamburg"));
        assert!(url.contains("travelmode=transit"));
    }

    #[test]
    fn blank_origin_without_home_is_omitted() {
        let url = directions_url("", "Hamburg", TravelMode::Driving, None);
        assert!(!url.contains("origin="));
        assert!(url.contains("destination=Hamburg"));
    }

    #[test]
    fn travel_mode_parses_leniently() {
        assert_eq!("".parse::<TravelMode>(), Ok(TravelMode::Driving));
        assert_eq!(" Walking ".parse::<TravelMode>(), Ok(TravelMode::Walking));
        assert!("teleport".parse::<TravelMode>().is_err());
    }

    #[test]
    fn place_url_carries_the_place_id() {
        assert_eq!(
            place_url("ChIJAVkDPzdOqEcRcDteW0YgIQQ"),
            "https://www.google.com/maps/place/?q=place_id%3AChIJAVkDPzdOqEcRcDteW0YgIQQ"
        );
    }
}
