//! Shared layout constants and default-geometry dimensions.

/// Gap in meters between a shape's edge and its rotation handle.
pub const ROTATE_HANDLE_GAP_M: f64 = 5.0;

/// Gap in meters between the flight ellipse and the "Front" label.
pub const FRONT_LABEL_OFFSET_M: f64 = 12.0;

/// Sample count for rendering an ellipse as a closed polygon.
pub const ELLIPSE_PATH_SEGMENTS: usize = 256;

/// Smallest edge length / radius a drag or panel edit can produce.
pub const MIN_EDGE_M: f64 = 0.1;

/// Bounded depth of the geometry undo stack.
pub const MAX_UNDO_DEPTH: usize = 50;

/// Padding in pixels requested when fitting the viewport to rendered bounds.
pub const FIT_PADDING_PX: f64 = 40.0;

/// Overlay z-order. Handles sit above every shape via [`MARKER_BASE`].
pub mod z {
    pub const SAFETY: i64 = 10;
    pub const TAKEOFF: i64 = 15;
    pub const AUDIENCE: i64 = 15;
    pub const FLIGHT: i64 = 20;
    pub const DIAMETER: i64 = 21;
    pub const ARROW: i64 = 999;

    pub const MARKER_BASE: i64 = 999_999;
    pub const CORNER: i64 = 0;
    pub const REFERENCE: i64 = 1;
    pub const ROTATE: i64 = 3;
    pub const SAFETY_RADIUS: i64 = 3;
    pub const CENTER: i64 = 4;
    pub const RADIUS: i64 = 4;
    pub const FRONT_LABEL: i64 = 5;
}

/// Dimensions used by the create-default-geometry factory, placed relative
/// to the current viewport center.
pub mod defaults {
    pub const FLIGHT_RADIUS_X_M: f64 = 150.0;
    pub const FLIGHT_RADIUS_Y_M: f64 = 100.0;
    pub const FLIGHT_ROTATION_DEG: f64 = 0.0;

    pub const TAKEOFF_W_M: f64 = 100.0;
    pub const TAKEOFF_H_M: f64 = 20.0;
    pub const TAKEOFF_ROTATION_DEG: f64 = 180.0;
    pub const TAKEOFF_OFFSET_Y_M: f64 = -180.0;

    pub const AUDIENCE_W_M: f64 = 100.0;
    pub const AUDIENCE_H_M: f64 = 20.0;
    pub const AUDIENCE_ROTATION_DEG: f64 = 0.0;
    pub const AUDIENCE_OFFSET_Y_M: f64 = 200.0;

    pub const FLIGHT_ALTITUDE_MIN_M: u32 = 30;
    pub const FLIGHT_ALTITUDE_MAX_M: u32 = 120;
}
