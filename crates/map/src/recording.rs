//! A surface that remembers every call, for driving the controller without a
//! real map.

use chrono::{DateTime, Utc};
use model::place::Endpoint;

use crate::{Camera, MapSurface, Marker};

#[derive(Debug, Clone, PartialEq)]
pub enum Draw {
    Path(Vec<[f64; 2]>),
    FlyTo(Camera),
    PlaceMarker(Marker),
    RemoveMarker(Endpoint),
    DateLabel(DateTime<Utc>),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub draws: Vec<Draw>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently drawn path.
    pub fn path(&self) -> Option<&[[f64; 2]]> {
        self.draws.iter().rev().find_map(|draw| match draw {
            Draw::Path(path) => Some(path.as_slice()),
            _ => None,
        })
    }

    pub fn date_label(&self) -> Option<&DateTime<Utc>> {
        self.draws.iter().rev().find_map(|draw| match draw {
            Draw::DateLabel(timestamp) => Some(timestamp),
            _ => None,
        })
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.draws.iter().rev().find_map(|draw| match draw {
            Draw::FlyTo(camera) => Some(camera),
            _ => None,
        })
    }

    /// Lengths of every path drawn so far, in order.
    pub fn path_lengths(&self) -> Vec<usize> {
        self.draws
            .iter()
            .filter_map(|draw| match draw {
                Draw::Path(path) => Some(path.len()),
                _ => None,
            })
            .collect()
    }

    pub fn markers(&self) -> Vec<&Marker> {
        let mut markers: Vec<&Marker> = Vec::new();
        for draw in &self.draws {
            match draw {
                Draw::PlaceMarker(marker) => {
                    markers.retain(|placed| placed.endpoint != marker.endpoint);
                    markers.push(marker);
                }
                Draw::RemoveMarker(endpoint) => {
                    markers.retain(|placed| placed.endpoint != *endpoint)
                }
                _ => {}
            }
        }
        markers
    }
}

impl MapSurface for RecordingSurface {
    type Frame = RecordingSurface;

    fn draw_path(&mut self, path: &[[f64; 2]]) {
        self.draws.push(Draw::Path(path.to_vec()));
    }

    fn fly_to(&mut self, camera: Camera) {
        self.draws.push(Draw::FlyTo(camera));
    }

    fn place_marker(&mut self, marker: Marker) {
        self.draws.push(Draw::PlaceMarker(marker));
    }

    fn remove_marker(&mut self, endpoint: Endpoint) {
        self.draws.push(Draw::RemoveMarker(endpoint));
    }

    fn set_date_label(&mut self, timestamp: &DateTime<Utc>) {
        self.draws.push(Draw::DateLabel(*timestamp));
    }

    fn frame(&self) -> RecordingSurface {
        self.clone()
    }
}
