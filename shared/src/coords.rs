use serde::{Deserialize, Serialize};

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `lat,lng` with six decimal places, the form Google URL parameters take.
    pub fn to_param(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

const KM_PER_DEGREE_LAT: f64 = 110.574;
const KM_PER_DEGREE_LNG_AT_EQUATOR: f64 = 111.320;

impl Bounds {
    /// Box extending `half_width_km` in every direction from `center`.
    /// The longitude span widens toward the poles so the box stays roughly
    /// square on the ground.
    pub fn around(center: Coordinates, half_width_km: f64) -> Self {
        let lat_delta = half_width_km / KM_PER_DEGREE_LAT;
        let clamped_lat = center.lat.clamp(-89.0, 89.0);
        let lng_delta =
            half_width_km / (KM_PER_DEGREE_LNG_AT_EQUATOR * clamped_lat.to_radians().cos());
        Self {
            south: center.lat - lat_delta,
            west: center.lng - lng_delta,
            north: center.lat + lat_delta,
            east: center.lng + lng_delta,
        }
    }

    /// `south,west|north,east`, the Geocoding API `bounds` parameter form.
    pub fn to_param(&self) -> String {
        format!(
            "{:.6},{:.6}|{:.6},{:.6}",
            self.south, self.west, self.north, self.east
        )
    }
}
