pub const EARTH_RADIUS_KM: f64 = 6371.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Linear interpolation between `from` and `to`. `t` is not clamped.
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Interpolates a `(latitude, longitude)` pair on a straight line in degree
/// space. This is not a great circle; the paths we synthesize are short enough
/// for that not to matter.
pub fn interpolate(
    (latitude_1, longitude_1): (f64, f64),
    (latitude_2, longitude_2): (f64, f64),
    t: f64,
) -> (f64, f64) {
    (
        lerp(latitude_1, latitude_2, t),
        lerp(longitude_1, longitude_2, t),
    )
}

pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude_2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
