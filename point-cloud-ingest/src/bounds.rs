/// Geodetic bounds tracking over decoded points
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
}

impl Default for GeodeticBounds {
    fn default() -> Self {
        Self::new()
    }
}

impl GeodeticBounds {
    /// Create new bounds initialised to infinity values
    pub fn new() -> Self {
        Self {
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_elevation: f64::INFINITY,
            max_elevation: f64::NEG_INFINITY,
        }
    }

    /// Update bounds with a new point
    pub fn update(&mut self, lon: f64, lat: f64, elevation: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_elevation = self.min_elevation.min(elevation);
        self.max_elevation = self.max_elevation.max(elevation);
    }

    /// True until the first point is seen.
    pub fn is_empty(&self) -> bool {
        self.min_lon > self.max_lon
    }

    /// Midpoint of the box.
    pub fn center(&self) -> [f64; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [
            (self.min_lon + self.max_lon) * 0.5,
            (self.min_lat + self.max_lat) * 0.5,
            (self.min_elevation + self.max_elevation) * 0.5,
        ]
    }

    /// Spans in source units (degrees, degrees, metres)
    pub fn dimensions(&self) -> (f64, f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        (
            self.max_lon - self.min_lon,
            self.max_lat - self.min_lat,
            self.max_elevation - self.min_elevation,
        )
    }

    /// Normalise elevation to 0-1. A flat cloud maps everything onto `t = 0`.
    pub fn normalize_elevation(&self, elevation: f64) -> f32 {
        let mut range = self.max_elevation - self.min_elevation;
        if range == 0.0 || !range.is_finite() {
            range = 1.0;
        }
        ((elevation - self.min_elevation) / range) as f32
    }
}
