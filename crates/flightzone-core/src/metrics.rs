//! Read model published toward the metrics panel, and the write model the
//! panel sends back.
//!
//! Field spellings follow the persisted records (`rectWidth_m`,
//! `flightRotation_deg`, ...). Every field is optional: each editor
//! publishes only the slice it owns, and the panel merges slices as they
//! arrive.

use serde::{Deserialize, Serialize};

use crate::safety::SafetyMode;

/// Rounds to one decimal, the display precision for lengths.
pub fn round_len_m(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Rounds to whole meters, used for the audience rectangle.
pub fn round_whole_m(v: f64) -> f64 {
    v.round()
}

/// Partial snapshot of the displayed numbers. Publishers fill only the
/// fields their shape owns; `merge` overlays later slices onto earlier
/// ones. Never persisted, always recomputed from the geometry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryMetrics {
    /// Right-edge length seen from the take-off reference corner.
    #[serde(rename = "rectWidth_m", skip_serializing_if = "Option::is_none")]
    pub rect_width_m: Option<f64>,
    /// Left-edge length seen from the take-off reference corner.
    #[serde(rename = "rectDepth_m", skip_serializing_if = "Option::is_none")]
    pub rect_depth_m: Option<f64>,
    /// Bearing of the take-off right edge, rounded to 5 degrees.
    #[serde(rename = "rectRotation_deg", skip_serializing_if = "Option::is_none")]
    pub rect_rotation_deg: Option<f64>,

    /// Flight-ellipse width (2 x radiusX).
    #[serde(rename = "flightWidth_m", skip_serializing_if = "Option::is_none")]
    pub flight_width_m: Option<f64>,
    /// Flight-ellipse depth (2 x radiusY).
    #[serde(rename = "flightDepth_m", skip_serializing_if = "Option::is_none")]
    pub flight_depth_m: Option<f64>,
    /// Bearing of the X-radius axis, rounded to 1 degree.
    #[serde(rename = "flightRotation_deg", skip_serializing_if = "Option::is_none")]
    pub flight_rotation_deg: Option<f64>,

    #[serde(rename = "spectatorWidth_m", skip_serializing_if = "Option::is_none")]
    pub spectator_width_m: Option<f64>,
    #[serde(rename = "spectatorDepth_m", skip_serializing_if = "Option::is_none")]
    pub spectator_depth_m: Option<f64>,

    /// The "new"-table distance for the current altitude, shown in every
    /// mode.
    #[serde(rename = "safetyDistanceNew_m", skip_serializing_if = "Option::is_none")]
    pub safety_distance_new_m: Option<f64>,
    /// The "old"-table distance for the current altitude, shown in every
    /// mode.
    #[serde(rename = "safetyDistanceOld_m", skip_serializing_if = "Option::is_none")]
    pub safety_distance_old_m: Option<f64>,
    /// The buffer actually applied to the safety ring.
    #[serde(rename = "safetyDistance_m", skip_serializing_if = "Option::is_none")]
    pub safety_distance_m: Option<f64>,

    #[serde(
        rename = "flightToAudienceDistance_m",
        skip_serializing_if = "Option::is_none"
    )]
    pub flight_to_audience_distance_m: Option<f64>,
}

macro_rules! merge_fields {
    ($dst:expr, $src:expr, [$($field:ident),+ $(,)?]) => {
        $(if $src.$field.is_some() {
            $dst.$field = $src.$field;
        })+
    };
}

impl GeometryMetrics {
    /// Overlays `other` onto `self`: fields `other` carries win, fields it
    /// omits survive.
    pub fn merge(&mut self, other: &GeometryMetrics) {
        merge_fields!(
            self,
            other,
            [
                rect_width_m,
                rect_depth_m,
                rect_rotation_deg,
                flight_width_m,
                flight_depth_m,
                flight_rotation_deg,
                spectator_width_m,
                spectator_depth_m,
                safety_distance_new_m,
                safety_distance_old_m,
                safety_distance_m,
                flight_to_audience_distance_m,
            ]
        );
    }
}

/// An edit coming back from the metrics panel. Only the fields the user
/// actually changed are set; everything else stays untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsDelta {
    #[serde(rename = "rectWidth_m", default, skip_serializing_if = "Option::is_none")]
    pub rect_width_m: Option<f64>,
    #[serde(rename = "rectDepth_m", default, skip_serializing_if = "Option::is_none")]
    pub rect_depth_m: Option<f64>,
    #[serde(
        rename = "rectRotation_deg",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rect_rotation_deg: Option<f64>,

    #[serde(rename = "flightWidth_m", default, skip_serializing_if = "Option::is_none")]
    pub flight_width_m: Option<f64>,
    #[serde(rename = "flightDepth_m", default, skip_serializing_if = "Option::is_none")]
    pub flight_depth_m: Option<f64>,
    #[serde(
        rename = "flightRotation_deg",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flight_rotation_deg: Option<f64>,

    #[serde(
        rename = "spectatorWidth_m",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub spectator_width_m: Option<f64>,
    #[serde(
        rename = "spectatorDepth_m",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub spectator_depth_m: Option<f64>,
    #[serde(
        rename = "spectatorRotation_deg",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub spectator_rotation_deg: Option<f64>,

    #[serde(rename = "safetyMode", default, skip_serializing_if = "Option::is_none")]
    pub safety_mode: Option<SafetyMode>,
    /// Only honored while the safety mode is (or becomes) `custom`.
    #[serde(
        rename = "customBuffer_m",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_buffer_m: Option<f64>,

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
}

impl MetricsDelta {
    pub fn is_empty(&self) -> bool {
        *self == MetricsDelta::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_absent_fields() {
        let mut base = GeometryMetrics {
            rect_width_m: Some(10.0),
            flight_width_m: Some(300.0),
            ..GeometryMetrics::default()
        };
        let slice = GeometryMetrics {
            flight_width_m: Some(320.0),
            flight_rotation_deg: Some(30.0),
            ..GeometryMetrics::default()
        };
        base.merge(&slice);
        assert_eq!(base.rect_width_m, Some(10.0));
        assert_eq!(base.flight_width_m, Some(320.0));
        assert_eq!(base.flight_rotation_deg, Some(30.0));
    }

    #[test]
    fn metrics_serialize_with_record_field_names() {
        let m = GeometryMetrics {
            safety_distance_m: Some(27.5),
            safety_distance_new_m: Some(27.5),
            flight_to_audience_distance_m: Some(200.0),
            ..GeometryMetrics::default()
        };
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(
            json,
            concat!(
                "{\"safetyDistanceNew_m\":27.5,\"safetyDistance_m\":27.5,",
                "\"flightToAudienceDistance_m\":200.0}"
            )
        );
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round_len_m(16.74), 16.7);
        assert_eq!(round_len_m(16.75), 16.8);
        assert_eq!(round_whole_m(99.5), 100.0);
    }

    #[test]
    fn empty_delta_detection() {
        assert!(MetricsDelta::default().is_empty());
        let d = MetricsDelta {
            flight_rotation_deg: Some(5.0),
            ..MetricsDelta::default()
        };
        assert!(!d.is_empty());
    }

    #[test]
    fn delta_parses_sparse_panel_payloads() {
        let d: MetricsDelta =
            serde_json::from_str("{\"safetyMode\":\"custom\",\"customBuffer_m\":40.0}").unwrap();
        assert_eq!(d.safety_mode, Some(SafetyMode::Custom));
        assert_eq!(d.custom_buffer_m, Some(40.0));
        assert!(d.rect_width_m.is_none());
    }
}
