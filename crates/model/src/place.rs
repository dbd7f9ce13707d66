use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Position in GeoJSON axis order.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A coordinate with a human readable label, either typed coordinates or a
/// search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub coordinate: Coordinate,
}

impl Place {
    pub fn new<S: Into<String>>(name: S, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            coordinate,
        }
    }

    /// A place picked on the map, labelled with its own coordinates.
    pub fn picked(coordinate: Coordinate) -> Self {
        Self::new(coordinate.to_string(), coordinate)
    }
}

/// One end of a manually created trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::End => "End",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_place_is_labelled_with_four_decimals() {
        let place = Place::picked(Coordinate::new(35.689487, 139.691706));
        assert_eq!(place.name, "35.6895, 139.6917");
        assert_eq!(place.coordinate.lon_lat(), [139.691706, 35.689487]);
    }
}
