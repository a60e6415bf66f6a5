//! Altitude -> safety-distance lookup tables.
//!
//! Two fixed regulatory tables map flight altitude bands (10 m steps,
//! 10-360 m) to the maximum horizontal travel distance used as the safety
//! buffer around the flight ellipse. The "new" model is finer grained; the
//! "old" model is coarser and more conservative. In `custom` mode the buffer
//! is user-supplied, but both table lookups are still computed for display.

use serde::{Deserialize, Serialize};

/// How the safety buffer is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SafetyMode {
    /// Buffer follows [`DIST_TABLE_NEW`].
    #[default]
    New,
    /// Buffer follows [`DIST_TABLE_OLD`].
    Old,
    /// Buffer is a user-supplied number of meters.
    Custom,
}

/// New-model table: altitude [m] -> max travel distance [m].
pub const DIST_TABLE_NEW: [(u32, f64); 36] = [
    (10, 8.5),
    (20, 11.1),
    (30, 13.1),
    (40, 15.0),
    (50, 16.7),
    (60, 18.4),
    (70, 20.0),
    (80, 21.5),
    (90, 23.1),
    (100, 24.6),
    (110, 26.1),
    (120, 27.5),
    (130, 29.0),
    (140, 30.5),
    (150, 31.9),
    (160, 33.3),
    (170, 34.8),
    (180, 36.2),
    (190, 37.7),
    (200, 39.1),
    (210, 40.5),
    (220, 41.9),
    (230, 43.4),
    (240, 44.8),
    (250, 46.3),
    (260, 47.7),
    (270, 49.1),
    (280, 50.5),
    (290, 52.0),
    (300, 53.4),
    (310, 54.8),
    (320, 56.3),
    (330, 57.7),
    (340, 59.1),
    (350, 60.5),
    (360, 62.0),
];

/// Old-model table: coarser whole-meter distances over the same bands.
pub const DIST_TABLE_OLD: [(u32, f64); 36] = [
    (10, 24.0),
    (20, 26.0),
    (30, 28.0),
    (40, 30.0),
    (50, 31.0),
    (60, 33.0),
    (70, 35.0),
    (80, 37.0),
    (90, 38.0),
    (100, 40.0),
    (110, 42.0),
    (120, 44.0),
    (130, 45.0),
    (140, 47.0),
    (150, 49.0),
    (160, 51.0),
    (170, 52.0),
    (180, 54.0),
    (190, 56.0),
    (200, 58.0),
    (210, 59.0),
    (220, 61.0),
    (230, 63.0),
    (240, 65.0),
    (250, 66.0),
    (260, 68.0),
    (270, 70.0),
    (280, 72.0),
    (290, 73.0),
    (300, 75.0),
    (310, 77.0),
    (320, 79.0),
    (330, 80.0),
    (340, 82.0),
    (350, 84.0),
    (360, 85.0),
];

/// Result of a table lookup: the altitude row actually used (after
/// clamping and rounding up) and the distance it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyLookup {
    pub used_alt_m: u32,
    pub dist_m: f64,
}

fn clamp_alt_range(alt_m: f64) -> f64 {
    alt_m.clamp(10.0, 360.0)
}

fn ceil_10(alt_m: f64) -> u32 {
    ((alt_m / 10.0).ceil() * 10.0) as u32
}

fn lookup(table: &[(u32, f64)], alt_m: f64) -> SafetyLookup {
    let used_alt_m = ceil_10(clamp_alt_range(alt_m));
    let dist_m = table
        .iter()
        .find(|(h, _)| *h == used_alt_m)
        // The step guarantees an exact row; keep the terminal row as a net.
        .or_else(|| table.last())
        .map_or(0.0, |(_, d)| *d);
    SafetyLookup { used_alt_m, dist_m }
}

/// Safety distance under the new regulatory model.
pub fn safety_distance_new(alt_m: f64) -> SafetyLookup {
    let found = lookup(&DIST_TABLE_NEW, alt_m);
    tracing::debug!(
        alt_m,
        used_alt_m = found.used_alt_m,
        dist_m = found.dist_m,
        "safety distance (new table)"
    );
    found
}

/// Safety distance under the old regulatory model.
pub fn safety_distance_old(alt_m: f64) -> SafetyLookup {
    let found = lookup(&DIST_TABLE_OLD, alt_m);
    tracing::debug!(
        alt_m,
        used_alt_m = found.used_alt_m,
        dist_m = found.dist_m,
        "safety distance (old table)"
    );
    found
}

/// Safety distance for a non-custom mode. `Custom` has no table; callers
/// supply the buffer themselves and get `None` here.
pub fn safety_distance_for_mode(mode: SafetyMode, alt_m: f64) -> Option<SafetyLookup> {
    match mode {
        SafetyMode::New => Some(safety_distance_new(alt_m)),
        SafetyMode::Old => Some(safety_distance_old(alt_m)),
        SafetyMode::Custom => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altitude_47_rounds_up_to_the_50_row() {
        let got = safety_distance_new(47.0);
        assert_eq!(got.used_alt_m, 50);
        assert_eq!(got.dist_m, 16.7);
    }

    #[test]
    fn altitude_400_clamps_to_the_360_row_old_table() {
        let got = safety_distance_old(400.0);
        assert_eq!(got.used_alt_m, 360);
        assert_eq!(got.dist_m, 85.0);
    }

    #[test]
    fn out_of_range_lookups_are_clamped_not_rejected() {
        assert_eq!(safety_distance_new(10_000.0), safety_distance_new(360.0));
        assert_eq!(safety_distance_new(-5.0), safety_distance_new(10.0));
        assert_eq!(safety_distance_old(0.0).used_alt_m, 10);
    }

    #[test]
    fn exact_band_boundaries_use_their_own_row() {
        assert_eq!(safety_distance_new(120.0).dist_m, 27.5);
        assert_eq!(safety_distance_new(121.0).dist_m, 29.0);
    }

    #[test]
    fn both_tables_are_monotone_non_decreasing() {
        for table in [&DIST_TABLE_NEW, &DIST_TABLE_OLD] {
            for pair in table.windows(2) {
                assert!(pair[1].1 >= pair[0].1, "row {:?} -> {:?}", pair[0], pair[1]);
                assert_eq!(pair[1].0, pair[0].0 + 10);
            }
        }
    }

    #[test]
    fn custom_mode_has_no_table_value() {
        assert!(safety_distance_for_mode(SafetyMode::Custom, 100.0).is_none());
        assert!(safety_distance_for_mode(SafetyMode::New, 100.0).is_some());
    }
}
