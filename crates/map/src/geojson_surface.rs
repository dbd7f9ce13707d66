use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Local, Utc};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, Value};
use model::place::Endpoint;
use serde::Serialize;

use crate::{Camera, MapSurface, Marker};

pub const DATE_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Keeps the visible map state as GeoJSON for a web front-end.
#[derive(Debug, Clone)]
pub struct GeoJsonSurface {
    time_zone: Option<FixedOffset>,
    route: Option<Vec<[f64; 2]>>,
    camera: Camera,
    markers: BTreeMap<Endpoint, Marker>,
    date_label: Option<String>,
    revision: u64,
}

/// What a front-end draws. `revision` changes whenever anything else does.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFrame {
    pub revision: u64,
    pub route: FeatureCollection,
    pub camera: Camera,
    pub markers: Vec<Marker>,
    pub date_label: Option<String>,
}

impl Default for GeoJsonSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoJsonSurface {
    /// Date labels are shown in the local time zone.
    pub fn new() -> Self {
        Self {
            time_zone: None,
            route: None,
            camera: Camera::initial(),
            markers: BTreeMap::new(),
            date_label: None,
            revision: 0,
        }
    }

    pub fn with_time_zone(mut self, time_zone: FixedOffset) -> Self {
        self.time_zone = Some(time_zone);
        self
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn route_collection(&self) -> FeatureCollection {
        let features = self
            .route
            .iter()
            .map(|path| {
                let line = path.iter().map(|position| position.to_vec()).collect();
                let mut feature = Feature::from(Geometry::new(Value::LineString(line)));
                feature.id = Some(Id::String("route".to_owned()));
                feature
            })
            .collect::<Vec<_>>();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

impl MapSurface for GeoJsonSurface {
    type Frame = MapFrame;

    fn draw_path(&mut self, path: &[[f64; 2]]) {
        self.route = Some(path.to_vec());
        self.touch();
    }

    fn fly_to(&mut self, camera: Camera) {
        self.camera = camera;
        self.touch();
    }

    fn place_marker(&mut self, marker: Marker) {
        self.markers.insert(marker.endpoint, marker);
        self.touch();
    }

    fn remove_marker(&mut self, endpoint: Endpoint) {
        if self.markers.remove(&endpoint).is_some() {
            self.touch();
        }
    }

    fn set_date_label(&mut self, timestamp: &DateTime<Utc>) {
        let label = match self.time_zone {
            Some(time_zone) => timestamp.with_timezone(&time_zone).format(DATE_LABEL_FORMAT),
            None => timestamp.with_timezone(&Local).format(DATE_LABEL_FORMAT),
        };
        self.date_label = Some(label.to_string());
        self.touch();
    }

    fn frame(&self) -> MapFrame {
        MapFrame {
            revision: self.revision,
            route: self.route_collection(),
            camera: self.camera,
            markers: self.markers.values().cloned().collect(),
            date_label: self.date_label.clone(),
        }
    }
}
