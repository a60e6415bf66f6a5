//! Oriented-rectangle math: corners <-> center/size/rotation, angle
//! normalization, and compass bearings.
//!
//! The local frame follows the projection module: x east, y north, rotation
//! measured counter-clockwise from east in degrees. Bearings are the compass
//! convention, 0 = north, clockwise.

use nalgebra::Vector2;

use crate::projection::LngLat;

/// A rectangle described by center, two side lengths, and a rotation, as
/// opposed to four independent corner points. `w` runs along the rotated
/// local +X axis (U), `h` along local +Y (V).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub center: LngLat,
    pub w: f64,
    pub h: f64,
    pub rotation_deg: f64,
}

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn normalize_angle_deg(deg: f64) -> f64 {
    let a = deg % 360.0;
    if a < 0.0 {
        a + 360.0
    } else {
        a
    }
}

/// Normalizes a signed angular difference to `(-180, 180]`.
pub fn normalize_diff_deg(deg: f64) -> f64 {
    let mut a = deg % 360.0;
    if a <= -180.0 {
        a += 360.0;
    }
    if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Compass bearing of a local-frame vector (x east, y north): 0 = north,
/// clockwise, normalized to `[0, 360)`.
pub fn bearing_deg(v: Vector2<f64>) -> f64 {
    normalize_angle_deg(v.x.atan2(v.y).to_degrees())
}

/// Rounds a bearing to the given step (e.g. 5 degrees), renormalized.
pub fn round_bearing_deg(bearing: f64, step: f64) -> f64 {
    normalize_angle_deg((bearing / step).round() * step)
}

/// Unit vector of the rotated local +X axis (U).
pub fn axis_u(rotation_deg: f64) -> Vector2<f64> {
    let theta = rotation_deg.to_radians();
    Vector2::new(theta.cos(), theta.sin())
}

/// Unit vector of the rotated local +Y axis (V), perpendicular to U.
pub fn axis_v(rotation_deg: f64) -> Vector2<f64> {
    let theta = rotation_deg.to_radians();
    Vector2::new(-theta.sin(), theta.cos())
}

/// 2D cross product (z component of the 3D cross).
pub fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

impl OrientedRect {
    /// Recovers center/size/rotation from four corner coordinates.
    ///
    /// Center is the midpoint of corners 0 and 2; U is derived from edge
    /// 0 -> 1 and V from edge 1 -> 2. Returns `None` for fewer than four
    /// coordinates.
    pub fn from_coords(coords: &[LngLat]) -> Option<OrientedRect> {
        if coords.len() < 4 {
            return None;
        }
        let center = coords[0].midpoint(coords[2]);
        let a0 = center.to_local_xy(coords[0]);
        let a1 = center.to_local_xy(coords[1]);
        let a2 = center.to_local_xy(coords[2]);

        let e01 = a1 - a0;
        let e12 = a2 - a1;
        Some(OrientedRect {
            center,
            w: e01.norm(),
            h: e12.norm(),
            rotation_deg: normalize_angle_deg(e01.y.atan2(e01.x).to_degrees()),
        })
    }

    /// Reconstructs the four corners in canonical order:
    /// p0=(-U,-V), p1=(+U,-V), p2=(+U,+V), p3=(-U,+V).
    ///
    /// Round-tripping through [`OrientedRect::from_coords`] recovers `w`, `h`
    /// and `rotation_deg` up to the 180-degree U/V ambiguity inherent to a
    /// rectangle.
    pub fn corners(&self) -> [LngLat; 4] {
        let u = axis_u(self.rotation_deg);
        let v = axis_v(self.rotation_deg);
        let hw = self.w / 2.0;
        let hh = self.h / 2.0;

        let off = |s: f64, t: f64| self.center.from_local_xy(u * (s * hw) + v * (t * hh));
        [
            off(-1.0, -1.0),
            off(1.0, -1.0),
            off(1.0, 1.0),
            off(-1.0, 1.0),
        ]
    }
}
