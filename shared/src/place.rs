use serde::{Deserialize, Serialize};

use crate::coords::Coordinates;

/// Caller-supplied place reference: free text to be geocoded, or an already
/// resolved point with an optional display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceInput {
    Text(String),
    Point {
        lat: f64,
        lng: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl PlaceInput {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Text(_) => None,
            Self::Point { lat, lng, .. } => Some(Coordinates::new(*lat, *lng)),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Point { lat, lng, name } => name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| Coordinates::new(*lat, *lng).to_param()),
        }
    }

    /// Text inputs that are empty or whitespace-only must never reach the
    /// geocoding provider.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

/// A place that made it onto the map: geocoded (or caller-supplied)
/// coordinates plus the marker label tied to its original input index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub name: String,
    pub coordinates: Coordinates,
    pub label: char,
}
