use chrono::{DateTime, Utc};
use model::place::{Coordinate, Endpoint};
use serde::{Deserialize, Serialize};

pub mod geojson_surface;
pub mod recording;
pub mod style;

pub use geojson_surface::{GeoJsonSurface, MapFrame};
pub use style::MapStyle;

/// Where the map opens before any data is loaded.
pub const INITIAL_CENTER: Coordinate = Coordinate {
    latitude: 35.6895,
    longitude: 139.6917,
};
pub const INITIAL_ZOOM: f64 = 1.5;

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: Coordinate,
    pub zoom: f64,
    pub speed: Option<f64>,
}

impl Camera {
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            speed: None,
        }
    }

    pub fn initial() -> Self {
        Self::new(INITIAL_CENTER, INITIAL_ZOOM)
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub endpoint: Endpoint,
    pub coordinate: Coordinate,
    pub color: String,
    pub popup: Option<String>,
}

impl Marker {
    pub fn new(endpoint: Endpoint, coordinate: Coordinate) -> Self {
        let color = match endpoint {
            Endpoint::Start => "#00ff00",
            Endpoint::End => "#ff0000",
        };
        Self {
            endpoint,
            coordinate,
            color: color.to_owned(),
            popup: None,
        }
    }

    pub fn with_popup<S: Into<String>>(mut self, popup: S) -> Self {
        self.popup = Some(popup.into());
        self
    }
}

/// The display surface the playback controller renders into.
///
/// Implementations only hold what is currently visible; every call replaces
/// the previous state of the thing it names.
pub trait MapSurface: Send + Sync + 'static {
    /// Snapshot of the visible state handed to whoever presents it.
    type Frame: Clone + Send + Sync + 'static;

    /// Replaces the rendered path with `path`, given as `[lon, lat]` pairs.
    fn draw_path(&mut self, path: &[[f64; 2]]);

    fn fly_to(&mut self, camera: Camera);

    /// Places the marker for its endpoint, replacing an existing one.
    fn place_marker(&mut self, marker: Marker);

    fn remove_marker(&mut self, endpoint: Endpoint);

    fn set_date_label(&mut self, timestamp: &DateTime<Utc>);

    fn frame(&self) -> Self::Frame;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_colored_by_endpoint() {
        let at = Coordinate::new(1.0, 2.0);
        assert_eq!(Marker::new(Endpoint::Start, at).color, "#00ff00");
        assert_eq!(Marker::new(Endpoint::End, at).color, "#ff0000");
    }

    #[test]
    fn camera_skips_missing_speed() {
        let json = serde_json::to_value(Camera::initial()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "center": {"latitude": 35.6895, "longitude": 139.6917},
                "zoom": 1.5,
            })
        );
    }
}
