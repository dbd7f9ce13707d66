use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utility::{geo::haversine_distance, serde::date_time};

use crate::place::Coordinate;

/// One recorded or synthesized position.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(
        serialize_with = "date_time::serialize_utc",
        deserialize_with = "date_time::deserialize_utc"
    )]
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub accuracy: Option<i32>,
    pub altitude: Option<i32>,
    pub heading: Option<i32>,
    pub velocity: Option<i32>,
}

impl LocationPoint {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            latitude,
            longitude,
            timestamp,
            source: None,
            accuracy: None,
            altitude: None,
            heading: None,
            velocity: None,
        }
    }

    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Position in GeoJSON axis order.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Points ordered by ascending timestamp.
///
/// The order is established once on construction and the sequence is never
/// mutated afterwards; a new load replaces it as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<LocationPoint>", into = "Vec<LocationPoint>")]
pub struct LocationSequence {
    points: Vec<LocationPoint>,
}

impl LocationSequence {
    pub fn new(mut points: Vec<LocationPoint>) -> Self {
        // stable, equal timestamps keep their received order
        points.sort_by_key(|point| point.timestamp);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.points.len().checked_sub(1)
    }

    pub fn get(&self, index: usize) -> Option<&LocationPoint> {
        self.points.get(index)
    }

    pub fn first(&self) -> Option<&LocationPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&LocationPoint> {
        self.points.last()
    }

    pub fn points(&self) -> &[LocationPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocationPoint> {
        self.points.iter()
    }

    /// Points `0..=last`, clamped to the sequence.
    pub fn prefix(&self, last: usize) -> &[LocationPoint] {
        let end = (last + 1).min(self.points.len());
        &self.points[..end]
    }

    /// `[lon, lat]` positions of `prefix(last)`.
    pub fn path(&self, last: usize) -> Vec<[f64; 2]> {
        self.prefix(last).iter().map(LocationPoint::lon_lat).collect()
    }

    /// Length of the path along consecutive points in kilometres.
    pub fn distance_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| {
                haversine_distance(
                    pair[0].latitude,
                    pair[0].longitude,
                    pair[1].latitude,
                    pair[1].longitude,
                )
            })
            .sum()
    }
}

impl From<Vec<LocationPoint>> for LocationSequence {
    fn from(points: Vec<LocationPoint>) -> Self {
        Self::new(points)
    }
}

impl From<LocationSequence> for Vec<LocationPoint> {
    fn from(sequence: LocationSequence) -> Self {
        sequence.points
    }
}

impl FromIterator<LocationPoint> for LocationSequence {
    fn from_iter<I: IntoIterator<Item = LocationPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LocationSequence {
    type Item = &'a LocationPoint;
    type IntoIter = std::slice::Iter<'a, LocationPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
