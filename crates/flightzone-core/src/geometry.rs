//! The canonical Geometry aggregate and its persisted wire format.
//!
//! Field names mirror the persisted JSON records exactly (`takeoffArea`,
//! `radiusX_m`, `flightAltitude_Max_m`, ...): rectangles are 4-point open
//! loops, ellipses are center/radii/rotation, and every coordinate is a
//! `[longitude, latitude]` pair.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::error::{GeometryError, Result};
use crate::oriented::{self, OrientedRect};
use crate::projection::LngLat;
use crate::safety::{self, SafetyLookup, SafetyMode};

/// Clamps an optional index into `[0, len - 1]`, defaulting to 0.
pub fn clamp_index(len: usize, idx: Option<usize>) -> usize {
    match idx {
        Some(i) if len > 0 => i.min(len - 1),
        _ => 0,
    }
}

/// An oriented rectangle area stored as its four corner coordinates.
///
/// `referencePointIndex` designates the corner used for right/left edge
/// semantics and the directional arrow (take-off area only; the audience
/// area leaves it unset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "rectangle")]
pub struct RectangleGeom {
    pub coordinates: Vec<LngLat>,
    #[serde(
        rename = "referencePointIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_point_index: Option<usize>,
}

/// Right/left edge lengths seen from the reference corner, plus the raw
/// compass bearing of the right edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RightLeftEdges {
    pub right_m: f64,
    pub left_m: f64,
    /// Whether the right edge is the one toward the next corner index.
    pub right_is_next: bool,
    /// Bearing of the right edge from the reference corner (0 = north, cw).
    pub right_bearing_deg: f64,
}

impl RectangleGeom {
    pub fn new(coordinates: Vec<LngLat>) -> Self {
        Self {
            coordinates,
            reference_point_index: None,
        }
    }

    /// True when the rectangle has the four corners every operation needs.
    pub fn is_complete(&self) -> bool {
        self.coordinates.len() >= 4
    }

    /// The clamped reference-corner index.
    pub fn reference_index(&self) -> usize {
        clamp_index(self.coordinates.len(), self.reference_point_index)
    }

    /// The reference corner itself, if any coordinates exist.
    pub fn reference_corner(&self) -> Option<LngLat> {
        self.coordinates.get(self.reference_index()).copied()
    }

    /// Center/size/rotation parameters, or `None` when incomplete.
    pub fn params(&self) -> Option<OrientedRect> {
        OrientedRect::from_coords(&self.coordinates)
    }

    /// Geometric center (midpoint of corners 0 and 2).
    pub fn center(&self) -> Option<LngLat> {
        if self.is_complete() {
            Some(self.coordinates[0].midpoint(self.coordinates[2]))
        } else {
            None
        }
    }

    /// Classifies the two edges adjacent to the reference corner as right
    /// and left. With the local frame x=east / y=north, the right edge is
    /// the adjacent edge `e` with `cross(center - corner, e) < 0`.
    pub fn right_left_edges(&self) -> Option<RightLeftEdges> {
        if !self.is_complete() {
            return None;
        }
        let idx = self.reference_index();
        let center = self.center()?;

        let cur = center.to_local_xy(self.coordinates[idx]);
        let next = center.to_local_xy(self.coordinates[(idx + 1) % 4]);
        let prev = center.to_local_xy(self.coordinates[(idx + 3) % 4]);

        let toward_center = -cur;
        let e_next = next - cur;
        let e_prev = prev - cur;

        let right_is_next = oriented::cross(toward_center, e_next) < 0.0;
        let (right, left) = if right_is_next {
            (e_next, e_prev)
        } else {
            (e_prev, e_next)
        };

        Some(RightLeftEdges {
            right_m: right.norm(),
            left_m: left.norm(),
            right_is_next,
            right_bearing_deg: oriented::bearing_deg(right),
        })
    }
}

/// The flight area: an ellipse in the local planar frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "ellipse")]
pub struct EllipseGeom {
    pub center: LngLat,
    #[serde(rename = "radiusX_m")]
    pub radius_x_m: f64,
    #[serde(rename = "radiusY_m")]
    pub radius_y_m: f64,
    #[serde(rename = "rotation_deg", default)]
    pub rotation_deg: f64,
}

impl EllipseGeom {
    /// Samples the ellipse boundary as a closed polygon through the local
    /// projection centered on the ellipse center.
    pub fn sample_path(&self, segments: usize) -> Vec<LngLat> {
        self.sample_path_with_buffer(segments, 0.0)
    }

    /// Same as [`EllipseGeom::sample_path`], with `buffer_m` added to both
    /// radii (used for the safety ring).
    pub fn sample_path_with_buffer(&self, segments: usize, buffer_m: f64) -> Vec<LngLat> {
        let rx = (self.radius_x_m + buffer_m).max(0.0);
        let ry = (self.radius_y_m + buffer_m).max(0.0);
        let u = oriented::axis_u(self.rotation_deg);
        let v = oriented::axis_v(self.rotation_deg);

        let mut path = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            let t = std::f64::consts::TAU * i as f64 / segments as f64;
            let offset = u * (rx * t.cos()) + v * (ry * t.sin());
            path.push(self.center.from_local_xy(offset));
        }
        path
    }

    /// Position of a point `radius + gap` meters out along the rotated
    /// axis, used to place radius/rotation handles.
    pub fn point_on_axis(&self, axis: Vector2<f64>, distance_m: f64) -> LngLat {
        self.center.from_local_xy(axis * distance_m)
    }
}

/// The safety area: an ellipse ring derived from the flight ellipse by
/// adding `buffer_m` to both radii. Never carries its own center/rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "ellipse")]
pub struct SafetyArea {
    #[serde(rename = "buffer_m")]
    pub buffer_m: f64,
    #[serde(default)]
    pub mode: SafetyMode,
}

/// The aggregate persisted per schedule: up to three areas plus the flight
/// altitude band and the audience-distance annotation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "takeoffArea", default, skip_serializing_if = "Option::is_none")]
    pub takeoff_area: Option<RectangleGeom>,
    #[serde(rename = "flightArea", default, skip_serializing_if = "Option::is_none")]
    pub flight_area: Option<EllipseGeom>,
    #[serde(rename = "safetyArea", default, skip_serializing_if = "Option::is_none")]
    pub safety_area: Option<SafetyArea>,
    #[serde(rename = "audienceArea", default, skip_serializing_if = "Option::is_none")]
    pub audience_area: Option<RectangleGeom>,
    #[serde(
        rename = "flightAltitude_min_m",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flight_altitude_min_m: Option<u32>,
    #[serde(
        rename = "flightAltitude_Max_m",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flight_altitude_max_m: Option<u32>,
    #[serde(
        rename = "distance_from_viewers_m",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub distance_from_viewers_m: Option<f64>,
}

impl Geometry {
    /// Builds the default geometry set around a viewport center: flight
    /// ellipse at the center, take-off rectangle below it, audience
    /// rectangle above, buffer derived from the max altitude via the new
    /// table.
    pub fn default_at(viewport_center: LngLat) -> Geometry {
        let takeoff_center =
            viewport_center.from_local_xy(Vector2::new(0.0, defaults::TAKEOFF_OFFSET_Y_M));
        let audience_center =
            viewport_center.from_local_xy(Vector2::new(0.0, defaults::AUDIENCE_OFFSET_Y_M));

        let takeoff = OrientedRect {
            center: takeoff_center,
            w: defaults::TAKEOFF_W_M,
            h: defaults::TAKEOFF_H_M,
            rotation_deg: defaults::TAKEOFF_ROTATION_DEG,
        };
        let audience = OrientedRect {
            center: audience_center,
            w: defaults::AUDIENCE_W_M,
            h: defaults::AUDIENCE_H_M,
            rotation_deg: defaults::AUDIENCE_ROTATION_DEG,
        };

        let buffer_m = safety::safety_distance_new(defaults::FLIGHT_ALTITUDE_MAX_M as f64).dist_m;

        Geometry {
            takeoff_area: Some(RectangleGeom {
                coordinates: takeoff.corners().to_vec(),
                reference_point_index: Some(0),
            }),
            flight_area: Some(EllipseGeom {
                center: viewport_center,
                radius_x_m: defaults::FLIGHT_RADIUS_X_M,
                radius_y_m: defaults::FLIGHT_RADIUS_Y_M,
                rotation_deg: defaults::FLIGHT_ROTATION_DEG,
            }),
            safety_area: Some(SafetyArea {
                buffer_m,
                mode: SafetyMode::New,
            }),
            audience_area: Some(RectangleGeom::new(audience.corners().to_vec())),
            flight_altitude_min_m: Some(defaults::FLIGHT_ALTITUDE_MIN_M),
            flight_altitude_max_m: Some(defaults::FLIGHT_ALTITUDE_MAX_M),
            distance_from_viewers_m: None,
        }
    }

    /// The altitude driving safety-distance lookups: the maximum altitude,
    /// falling back to the minimum when Max is absent.
    pub fn safety_lookup_altitude_m(&self) -> Option<f64> {
        self.flight_altitude_max_m
            .or(self.flight_altitude_min_m)
            .map(f64::from)
    }

    /// Safety-table result for the current mode and altitude, when both are
    /// known and the mode is table-driven.
    pub fn safety_lookup(&self) -> Option<SafetyLookup> {
        let mode = self.safety_area.as_ref()?.mode;
        let alt = self.safety_lookup_altitude_m()?;
        safety::safety_distance_for_mode(mode, alt)
    }

    /// The concrete buffer in effect (0 when no safety area exists).
    pub fn buffer_m(&self) -> f64 {
        self.safety_area.as_ref().map_or(0.0, |s| s.buffer_m)
    }

    /// Planar distance between the flight center and the audience-rectangle
    /// center, when both areas exist.
    pub fn flight_to_audience_distance_m(&self) -> Option<f64> {
        let flight = self.flight_area.as_ref()?;
        let audience_center = self.audience_area.as_ref()?.center()?;
        Some(flight.center.distance_m(audience_center))
    }

    /// Parses a persisted record.
    pub fn from_json(json: &str) -> Result<Geometry> {
        let geom: Geometry = serde_json::from_str(json)?;
        geom.validate()?;
        Ok(geom)
    }

    /// Serializes to the persisted wire format.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Structural validation applied at the wire boundary. Interactive
    /// paths never call this; they no-op on partial geometry instead.
    pub fn validate(&self) -> Result<()> {
        for (area, rect) in [
            ("takeoffArea", &self.takeoff_area),
            ("audienceArea", &self.audience_area),
        ] {
            if let Some(rect) = rect {
                if !rect.is_complete() {
                    return Err(GeometryError::ShortRectangle {
                        area,
                        count: rect.coordinates.len(),
                    });
                }
            }
        }
        if let Some(flight) = &self.flight_area {
            for (field, v) in [
                ("radiusX_m", flight.radius_x_m),
                ("radiusY_m", flight.radius_y_m),
                ("rotation_deg", flight.rotation_deg),
            ] {
                if !v.is_finite() {
                    return Err(GeometryError::NonFinite { field });
                }
            }
        }
        if let Some(safety) = &self.safety_area {
            if !safety.buffer_m.is_finite() {
                return Err(GeometryError::NonFinite { field: "buffer_m" });
            }
        }
        Ok(())
    }
}
