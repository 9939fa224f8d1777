use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::coords::Coordinates;
use crate::marker::Marker;

pub const STATIC_MAP_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

pub const DEFAULT_ZOOM: u8 = 15;
pub const DEFAULT_SCALE: u8 = 2;
pub const DEFAULT_FORMAT: &str = "png";
pub const DEFAULT_MAPTYPE: &str = "roadmap";

/// Image dimensions in pixels, serialized as `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub width: u32,
    pub height: u32,
}

impl Default for MapSize {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
        }
    }
}

impl std::fmt::Display for MapSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for MapSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (width, height) = value
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("size must be WxH, got: {value}"))?;
        let width = width
            .parse::<u32>()
            .map_err(|_| format!("invalid width: {width}"))?;
        let height = height
            .parse::<u32>()
            .map_err(|_| format!("invalid height: {height}"))?;
        if width == 0 || height == 0 {
            return Err(format!("size must be non-zero, got: {value}"));
        }
        Ok(Self { width, height })
    }
}

/// A fully assembled static map request, one serialization away from the
/// image provider. The visible region is preferred over center+zoom whenever
/// it is non-empty; center and zoom are only emitted for a map with no
/// resolved places.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    pub size: MapSize,
    pub zoom: u8,
    pub scale: u8,
    pub format: &'static str,
    pub maptype: &'static str,
    pub markers: Vec<Marker>,
    pub visible: Vec<Coordinates>,
    pub center: Option<Coordinates>,
}

impl Default for MapRequest {
    fn default() -> Self {
        Self {
            size: MapSize::default(),
            zoom: DEFAULT_ZOOM,
            scale: DEFAULT_SCALE,
            format: DEFAULT_FORMAT,
            maptype: DEFAULT_MAPTYPE,
            markers: Vec::new(),
            visible: Vec::new(),
            center: None,
        }
    }
}

impl MapRequest {
    /// Serialize to the provider URL. `key` is appended last so the base
    /// length of a keyless request can be measured for budgeting.
    pub fn to_url(&self, key: Option<&str>) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        params
            .append_pair("size", &self.size.to_string())
            .append_pair("scale", &self.scale.to_string())
            .append_pair("format", self.format)
            .append_pair("maptype", self.maptype);

        for marker in &self.markers {
            params.append_pair("markers", &marker.to_param());
        }

        if self.visible.is_empty() {
            if let Some(center) = self.center {
                params.append_pair("center", &center.to_param());
            }
            params.append_pair("zoom", &self.zoom.to_string());
        } else {
            let visible = self
                .visible
                .iter()
                .map(Coordinates::to_param)
                .collect::<Vec<_>>()
                .join("|");
            params.append_pair("visible", &visible);
        }

        if let Some(key) = key {
            params.append_pair("key", key);
        }

        format!("{STATIC_MAP_ENDPOINT}?{}", params.finish())
    }
}
