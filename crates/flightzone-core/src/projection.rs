//! Local-tangent projection between geographic and planar coordinates.
//!
//! All metric geometry math runs in a flat equirectangular approximation
//! centered on a per-operation anchor (a shape center or reference corner).
//! The projection is re-derived for every operation, so precision never
//! degrades with distance from a fixed global origin.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude in the equirectangular model.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Meters per degree of longitude at the given latitude.
pub fn meters_per_degree_lon_at(lat_deg: f64) -> f64 {
    METERS_PER_DEGREE_LAT * lat_deg.to_radians().cos()
}

/// A geographic coordinate, serialized as a `[longitude, latitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Projects `point` into the local planar frame (meters, x east, y north)
    /// centered on `self`.
    pub fn to_local_xy(&self, point: LngLat) -> Vector2<f64> {
        Vector2::new(
            (point.lng - self.lng) * meters_per_degree_lon_at(self.lat),
            (point.lat - self.lat) * METERS_PER_DEGREE_LAT,
        )
    }

    /// Exact inverse of [`LngLat::to_local_xy`] for the same origin.
    pub fn from_local_xy(&self, offset: Vector2<f64>) -> LngLat {
        LngLat {
            lng: self.lng + offset.x / meters_per_degree_lon_at(self.lat),
            lat: self.lat + offset.y / METERS_PER_DEGREE_LAT,
        }
    }

    /// Planar distance in meters between two coordinates, measured in the
    /// local frame centered on `self`.
    pub fn distance_m(&self, other: LngLat) -> f64 {
        self.to_local_xy(other).norm()
    }

    /// Midpoint in geographic coordinates.
    pub fn midpoint(&self, other: LngLat) -> LngLat {
        LngLat {
            lng: (self.lng + other.lng) / 2.0,
            lat: (self.lat + other.lat) / 2.0,
        }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self { lng: v[0], lat: v[1] }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

/// Accumulates a geographic bounding box while overlays are rendered, so the
/// host viewport can be asked to fit the result.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoBounds {
    extent: Option<(LngLat, LngLat)>,
}

impl GeoBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.extent.is_none()
    }

    /// Grows the box to include `point`.
    pub fn extend(&mut self, point: LngLat) {
        self.extent = Some(match self.extent {
            None => (point, point),
            Some((sw, ne)) => (
                LngLat::new(sw.lng.min(point.lng), sw.lat.min(point.lat)),
                LngLat::new(ne.lng.max(point.lng), ne.lat.max(point.lat)),
            ),
        });
    }

    /// Grows the box to include every point of `path`.
    pub fn extend_path(&mut self, path: &[LngLat]) {
        for p in path {
            self.extend(*p);
        }
    }

    /// South-west / north-east corners, when at least one point was added.
    pub fn corners(&self) -> Option<(LngLat, LngLat)> {
        self.extent
    }
}
