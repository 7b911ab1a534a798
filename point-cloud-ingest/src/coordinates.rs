/// Local tangent-plane projection of geodetic coordinates.
///
/// A flat-Earth approximation around the cloud's own centroid; valid for
/// extents of a few tens of kilometres. WGS84 lon/lat degrees are assumed.
use crate::bounds::GeodeticBounds;
use constants::coordinate_system::{METERS_PER_DEGREE_LAT, meters_per_degree_lon};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// East-west, north-south and vertical spans in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricExtent {
    pub east_west: f64,
    pub north_south: f64,
    pub up_down: f64,
}

/// Degree-to-metre factors (lon, lat) at the given center latitude.
pub fn meters_per_degree(center_lat: f64) -> (f64, f64) {
    (meters_per_degree_lon(center_lat), METERS_PER_DEGREE_LAT)
}

/// Mean of all points; the projection origin.
pub fn centroid(points: &[[f64; 3]]) -> [f64; 3] {
    if points.is_empty() {
        return [0.0; 3];
    }
    let sum = points
        .par_iter()
        .copied()
        .reduce(|| [0.0; 3], |a, b| [a[0] + b[0], a[1] + b[1], a[2] + b[2]]);
    let n = points.len() as f64;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

/// Project lon/lat/elevation to east/north/up metres relative to `center`.
pub fn project_to_enu(geodetic: &[[f64; 3]], center: [f64; 3]) -> Vec<f32> {
    let (lon_scale, lat_scale) = meters_per_degree(center[1]);
    let mut positions = vec![0.0f32; geodetic.len() * 3];

    positions
        .par_chunks_mut(3)
        .zip(geodetic.par_iter())
        .for_each(|(out, &[lon, lat, elevation])| {
            out[0] = ((lon - center[0]) * lon_scale) as f32;
            out[1] = ((lat - center[1]) * lat_scale) as f32;
            out[2] = (elevation - center[2]) as f32;
        });

    positions
}

/// Center already-metric coordinates without any degree scaling.
pub fn center_planar(points: &[[f64; 3]], center: [f64; 3]) -> Vec<f32> {
    let mut positions = vec![0.0f32; points.len() * 3];

    positions
        .par_chunks_mut(3)
        .zip(points.par_iter())
        .for_each(|(out, point)| {
            for axis in 0..3 {
                out[axis] = (point[axis] - center[axis]) as f32;
            }
        });

    positions
}

/// Metric spans of the bounds when projected around their own center.
pub fn metric_extent(bounds: &GeodeticBounds, is_geographic: bool) -> MetricExtent {
    let (lon_span, lat_span, up_down) = bounds.dimensions();
    let (lon_scale, lat_scale) = if is_geographic {
        meters_per_degree(bounds.center()[1])
    } else {
        (1.0, 1.0)
    };
    MetricExtent {
        east_west: lon_span * lon_scale,
        north_south: lat_span * lat_scale,
        up_down,
    }
}
