//! Synthetic paths: the demo tour and manually created trips.

use std::f64::consts::PI;

use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use model::{location::LocationPoint, place::Coordinate};
use rand::Rng;
use utility::geo;

pub const DEMO_STEPS_PER_SEGMENT: usize = 50;
/// Peak sideways offset in degrees, reached halfway through a segment.
pub const DEMO_NOISE: f64 = 0.05;
pub const DEMO_SOURCE: &str = "demo";

pub const TRIP_STEPS: usize = 50;
pub const TRIP_DURATION_MINUTES: i64 = 120;
/// Width of the uniform jitter in degrees, centred on the straight line.
pub const TRIP_JITTER: f64 = 0.001;
pub const TRIP_SOURCE: &str = "manual_entry";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub name: &'static str,
    pub coordinate: Coordinate,
}

const fn waypoint(name: &'static str, latitude: f64, longitude: f64) -> Waypoint {
    Waypoint {
        name,
        coordinate: Coordinate {
            latitude,
            longitude,
        },
    }
}

pub const DEMO_WAYPOINTS: [Waypoint; 5] = [
    waypoint("Tokyo", 35.6895, 139.6917),
    waypoint("Mt Fuji", 35.3606, 138.7274),
    waypoint("Nagoya", 35.1815, 136.9066),
    waypoint("Kyoto", 35.0116, 135.7681),
    waypoint("Osaka", 34.6937, 135.5023),
];

/// The demo tour starting at `start`, one hour between consecutive points.
pub fn demo_path(start: DateTime<Utc>) -> Vec<LocationPoint> {
    tour(&DEMO_WAYPOINTS, DEMO_STEPS_PER_SEGMENT, start)
}

/// Walks every consecutive pair of waypoints in `steps` steps, both ends
/// included, so segment boundaries appear twice.
pub fn tour(waypoints: &[Waypoint], steps: usize, start: DateTime<Utc>) -> Vec<LocationPoint> {
    waypoints
        .iter()
        .tuple_windows()
        .flat_map(|(from, to)| {
            (0..=steps).map(move |step| {
                let t = step as f64 / steps as f64;
                let noise = (t * PI).sin() * DEMO_NOISE;
                let (latitude, longitude) = geo::interpolate(
                    (from.coordinate.latitude, from.coordinate.longitude),
                    (to.coordinate.latitude, to.coordinate.longitude),
                    t,
                );
                (latitude + noise, longitude + noise)
            })
        })
        .enumerate()
        .map(|(index, (latitude, longitude))| {
            LocationPoint::new(latitude, longitude, start + Duration::hours(index as i64))
                .with_source(DEMO_SOURCE)
        })
        .collect()
}

/// A straight trip from `start` to `end` over two hours, slightly jittered so
/// it does not look ruled.
pub fn manual_trip<R: Rng>(
    start: Coordinate,
    end: Coordinate,
    departure: DateTime<Utc>,
    rng: &mut R,
) -> Vec<LocationPoint> {
    let duration = Duration::minutes(TRIP_DURATION_MINUTES);
    (0..=TRIP_STEPS)
        .map(|step| {
            let t = step as f64 / TRIP_STEPS as f64;
            let (latitude, longitude) = geo::interpolate(
                (start.latitude, start.longitude),
                (end.latitude, end.longitude),
                t,
            );
            let jitter_lat = (rng.gen::<f64>() - 0.5) * TRIP_JITTER;
            let jitter_lon = (rng.gen::<f64>() - 0.5) * TRIP_JITTER;
            let offset = Duration::milliseconds(
                (duration.num_milliseconds() as f64 * t).round() as i64,
            );
            LocationPoint::new(latitude + jitter_lat, longitude + jitter_lon, departure + offset)
                .with_source(TRIP_SOURCE)
        })
        .collect()
}
