//! Geodesic distance on the WGS-84 ellipsoid.

use geo::{GeodesicDistance, Point};
use serde::{Deserialize, Serialize};

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn to_point(self) -> Point<f64> {
        // geo points are (x = longitude, y = latitude)
        Point::new(self.longitude, self.latitude)
    }
}

/// Distance in kilometres along the ellipsoid (Karney's method), which
/// converges for every pair of points including antipodes.
pub fn geodesic_km(from: Coordinates, to: Coordinates) -> f64 {
    from.to_point().geodesic_distance(&to.to_point()) / 1000.0
}
