use serde::Serialize;
use serde_json::{json, Value};

use crate::{INITIAL_CENTER, INITIAL_ZOOM};

pub const OSM_TILES: &str = "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap Contributors";
pub const MAPBOX_STYLE: &str = "mapbox://styles/mapbox/dark-v11";

/// Source of the base map tiles. The route is drawn the same way on top of
/// either.
#[derive(Debug, Clone, PartialEq)]
pub enum MapStyle {
    /// Raster tiles, no token needed.
    OpenStreetMap { tiles: String },
    Mapbox {
        access_token: String,
        style_url: String,
    },
}

impl Default for MapStyle {
    fn default() -> Self {
        Self::OpenStreetMap {
            tiles: OSM_TILES.to_owned(),
        }
    }
}

/// Everything a front-end needs to set up the map.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub style: Value,
    pub access_token: Option<String>,
    pub center: [f64; 2],
    pub zoom: f64,
    pub route_layers: Vec<Value>,
}

impl MapStyle {
    pub fn mapbox<S: Into<String>>(access_token: S) -> Self {
        Self::Mapbox {
            access_token: access_token.into(),
            style_url: MAPBOX_STYLE.to_owned(),
        }
    }

    pub fn config(&self) -> MapConfig {
        let (style, access_token) = match self {
            Self::OpenStreetMap { tiles } => (
                json!({
                    "version": 8,
                    "sources": {
                        "osm": {
                            "type": "raster",
                            "tiles": [tiles],
                            "tileSize": 256,
                            "attribution": OSM_ATTRIBUTION,
                            "maxzoom": 19,
                        }
                    },
                    "layers": [
                        {"id": "osm", "type": "raster", "source": "osm"}
                    ],
                }),
                None,
            ),
            Self::Mapbox {
                access_token,
                style_url,
            } => (Value::String(style_url.clone()), Some(access_token.clone())),
        };
        MapConfig {
            style,
            access_token,
            center: INITIAL_CENTER.lon_lat(),
            zoom: INITIAL_ZOOM,
            route_layers: route_layers(),
        }
    }
}

/// A sharp line over a blurred glow, both fed by the `route` source.
fn route_layers() -> Vec<Value> {
    let layout = json!({"line-join": "round", "line-cap": "round"});
    vec![
        json!({
            "id": "route-glow",
            "type": "line",
            "source": "route",
            "layout": layout,
            "paint": {
                "line-color": "#4facfe",
                "line-width": 10,
                "line-opacity": 0.4,
                "line-blur": 10,
            },
        }),
        json!({
            "id": "route",
            "type": "line",
            "source": "route",
            "layout": layout,
            "paint": {
                "line-color": "#00f2fe",
                "line-width": 3,
                "line-opacity": 0.8,
            },
        }),
    ]
}
