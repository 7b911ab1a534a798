/// Metres spanned by one degree of latitude on the local tangent plane.
/// Longitude spacing is this value scaled by cos(latitude).
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Metres spanned by one degree of longitude at the given latitude (degrees).
pub fn meters_per_degree_lon(latitude_deg: f64) -> f64 {
    METERS_PER_DEGREE_LAT * latitude_deg.to_radians().cos()
}

/// Rotate a local (x, y) pair around the vertical axis.
/// Z is untouched by data rotation so it is not part of the signature.
pub fn rotate_about_up(x: f64, y: f64, angle_rad: f64) -> (f64, f64) {
    let (sin, cos) = angle_rad.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}
