//! Rectangle/ellipse orientation comparison.
//!
//! The take-off rectangle and the flight ellipse each report a compass
//! bearing as they move. The tracker keeps the latest pair and, whenever
//! either side changes, emits a [`TurnReport`] describing how far and in
//! which direction the rectangle would have to turn to face the ellipse.

use flightzone_core::oriented::normalize_diff_deg;
use serde::Serialize;
use tracing::debug;

use crate::host::BearingSource;

/// Direction of the shorter turn from the ellipse bearing to the
/// rectangle bearing. `Aligned` extends the wire's cw/ccw pair for the
/// exact-zero case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Cw,
    Ccw,
    Aligned,
}

/// One orientation comparison, published whenever a tracked bearing moves.
/// Serialized field names follow the debug channel's camelCase payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurnReport {
    #[serde(rename = "rectBearing_deg")]
    pub rect_bearing_deg: f64,
    #[serde(rename = "ellipseBearing_deg")]
    pub ellipse_bearing_deg: f64,
    /// Signed rectangle-minus-ellipse difference in `(-180, 180]`.
    #[serde(rename = "rawDiff_deg")]
    pub raw_diff_deg: f64,
    /// Magnitude of the shorter turn.
    #[serde(rename = "turnAngle_deg")]
    pub turn_angle_deg: f64,
    #[serde(rename = "turnDirection")]
    pub turn_direction: TurnDirection,
}

/// Holds the last-seen bearings and derives reports from them.
#[derive(Debug, Default)]
pub struct OrientationTracker {
    rect_deg: Option<f64>,
    ellipse_deg: Option<f64>,
    last_report: Option<TurnReport>,
}

impl OrientationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates one side. Returns the fresh report when both bearings are
    /// known and the comparison changed.
    pub fn update(&mut self, source: BearingSource, bearing_deg: f64) -> Option<TurnReport> {
        match source {
            BearingSource::TakeoffRect => self.rect_deg = Some(bearing_deg),
            BearingSource::FlightEllipse => self.ellipse_deg = Some(bearing_deg),
        }

        let report = TurnReport::between(self.rect_deg?, self.ellipse_deg?);
        if self.last_report == Some(report) {
            return None;
        }
        self.last_report = Some(report);
        debug!(
            rect = report.rect_bearing_deg,
            ellipse = report.ellipse_bearing_deg,
            diff = report.raw_diff_deg,
            "orientation comparison changed"
        );
        Some(report)
    }

    pub fn last_report(&self) -> Option<TurnReport> {
        self.last_report
    }

    /// Forgets everything, e.g. when geometry is replaced or deleted.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl TurnReport {
    pub fn between(rect_bearing_deg: f64, ellipse_bearing_deg: f64) -> Self {
        let raw_diff_deg = normalize_diff_deg(rect_bearing_deg - ellipse_bearing_deg);
        let turn_direction = if raw_diff_deg == 0.0 {
            TurnDirection::Aligned
        } else if raw_diff_deg > 0.0 {
            TurnDirection::Cw
        } else {
            TurnDirection::Ccw
        };
        Self {
            rect_bearing_deg,
            ellipse_bearing_deg,
            raw_diff_deg,
            turn_angle_deg: raw_diff_deg.abs(),
            turn_direction,
        }
    }
}
