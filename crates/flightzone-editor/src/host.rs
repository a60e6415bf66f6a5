//! Seams between the editors and their embedding.
//!
//! [`ShapeHost`] is the only surface an editor sees: the current geometry,
//! the overlay store, and a metrics sink. The controller implements it
//! internally; tests implement it with a plain struct.

use flightzone_core::{GeoBounds, Geometry, GeometryMetrics, LngLat};

use crate::overlay::{Cursor, OverlayStore};

/// Camera control for the embedding map widget.
pub trait MapViewport {
    fn center(&self) -> LngLat;
    fn zoom(&self) -> f64;
    fn pan_to(&mut self, center: LngLat);
    fn fit_bounds(&mut self, bounds: GeoBounds, padding_px: f64);
    fn set_cursor(&mut self, cursor: Option<Cursor>);
}

/// Receives partial metric slices as editors publish them.
pub trait MetricsSink {
    fn publish(&mut self, slice: &GeometryMetrics);
}

impl MetricsSink for GeometryMetrics {
    fn publish(&mut self, slice: &GeometryMetrics) {
        self.merge(slice);
    }
}

/// What an editor may touch while handling an event. Editors mutate the
/// geometry through this trait only; they never hold their own copy.
pub trait ShapeHost {
    fn geometry(&self) -> Option<&Geometry>;
    fn geometry_mut(&mut self) -> Option<&mut Geometry>;
    fn overlays(&mut self) -> &mut OverlayStore;
    fn publish_metrics(&mut self, slice: &GeometryMetrics);
    /// Bearing feedback for the rectangle/ellipse orientation comparison.
    fn report_bearing(&mut self, source: BearingSource, bearing_deg: f64);
    fn editable(&self) -> bool;
}

/// Which shape a bearing report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearingSource {
    TakeoffRect,
    FlightEllipse,
}

/// Lifecycle of a pointer drag on a single overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Start,
    Move,
    End,
}

/// A pointer event routed to an editor. `position` is the geographic point
/// under the cursor; for body drags it is the displaced position of the
/// shape's first vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: LngLat,
    pub shift: bool,
}

impl PointerEvent {
    pub fn at(position: LngLat) -> Self {
        Self {
            position,
            shift: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

#[cfg(test)]
pub(crate) mod test_host {
    use super::*;

    /// Plain-struct host used by the editor unit tests.
    pub struct TestHost {
        pub geometry: Option<Geometry>,
        pub store: OverlayStore,
        pub metrics: GeometryMetrics,
        pub bearings: Vec<(BearingSource, f64)>,
        pub editable: bool,
    }

    impl TestHost {
        pub fn new(geometry: Option<Geometry>) -> Self {
            Self {
                geometry,
                store: OverlayStore::new(),
                metrics: GeometryMetrics::default(),
                bearings: Vec::new(),
                editable: true,
            }
        }
    }

    impl ShapeHost for TestHost {
        fn geometry(&self) -> Option<&Geometry> {
            self.geometry.as_ref()
        }

        fn geometry_mut(&mut self) -> Option<&mut Geometry> {
            self.geometry.as_mut()
        }

        fn overlays(&mut self) -> &mut OverlayStore {
            &mut self.store
        }

        fn publish_metrics(&mut self, slice: &GeometryMetrics) {
            self.metrics.merge(slice);
        }

        fn report_bearing(&mut self, source: BearingSource, bearing_deg: f64) {
            self.bearings.push((source, bearing_deg));
        }

        fn editable(&self) -> bool {
            self.editable
        }
    }
}
