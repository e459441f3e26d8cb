use serde::{Deserialize, Serialize};

/// A WGS84 coordinate, latitude first (the order wiki metadata stores `coord` in).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

pub fn latlng(lat: f64, lon: f64) -> LatLng {
    LatLng { lat, lon }
}

impl LatLng {
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// The minimal lat/lon rectangle containing a set of coordinates.
///
/// No antimeridian handling: a set straddling ±180° yields a box spanning the whole width, the
/// same as the map widget's own bounds type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn from_coord(c: LatLng) -> Self {
        Self {
            south: c.lat,
            west: c.lon,
            north: c.lat,
            east: c.lon,
        }
    }

    pub fn extend(&mut self, c: LatLng) {
        self.south = self.south.min(c.lat);
        self.west = self.west.min(c.lon);
        self.north = self.north.max(c.lat);
        self.east = self.east.max(c.lon);
    }

    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        GeoBounds {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }
}

/// Grows an optional accumulator; `None` means "no coordinates seen yet".
pub fn extend_bounds(acc: &mut Option<GeoBounds>, c: LatLng) {
    match acc {
        Some(b) => b.extend(c),
        None => *acc = Some(GeoBounds::from_coord(c)),
    }
}

pub fn union_bounds(a: Option<GeoBounds>, b: Option<GeoBounds>) -> Option<GeoBounds> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, None) => a,
        (None, b) => b,
    }
}
