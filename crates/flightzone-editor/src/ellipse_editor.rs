//! Interactive editor for the flight ellipse and its safety ring.
//!
//! The flight area is an oriented ellipse rendered as a sampled polygon.
//! The safety ring is derived, never edited directly as a shape: its radii
//! are always flight radii plus the buffer. All redraws funnel through
//! [`EllipseEditor::update_overlays`] so the ring, the diameter lines, the
//! handles and the front label can never drift apart.

use flightzone_core::constants::{self, z, ELLIPSE_PATH_SEGMENTS};
use flightzone_core::metrics::round_len_m;
use flightzone_core::oriented::{self};
use flightzone_core::safety;
use flightzone_core::{EllipseGeom, GeometryMetrics, LngLat};

use crate::host::{BearingSource, DragPhase, PointerEvent, ShapeHost};
use crate::overlay::{Cursor, HandleRole, Overlay, OverlayId, ShapeKind};
use crate::rect_editor::constrain_to_axes;

/// Options for a single redraw pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedrawOptions {
    /// Leave the published metrics untouched (used mid-drag when the
    /// panel should not flicker).
    pub skip_metrics: bool,
    /// Draw the safety ring with this buffer instead of the stored one,
    /// without writing it back to the geometry.
    pub buffer_override: Option<f64>,
}

#[derive(Debug, Clone)]
enum EllipseDrag {
    /// Whole-shape translation; the event position tracks the displaced
    /// first vertex of the sampled boundary.
    Body {
        start: EllipseGeom,
        first_vertex: LngLat,
    },
    /// Center handle: moves the center only, radii and rotation untouched.
    Center,
    RadiusX,
    RadiusY,
    SafetyRadiusX,
    SafetyRadiusY,
    Rotate,
}

/// Editor for the flight ellipse plus the derived safety ring.
#[derive(Debug, Default)]
pub struct EllipseEditor {
    ids: Vec<OverlayId>,
    drag: Option<EllipseDrag>,
}

impl EllipseEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full rebuild from the current geometry.
    pub fn sync(&mut self, host: &mut dyn ShapeHost) {
        self.update_overlays(host, RedrawOptions::default());
    }

    /// The single redraw entry point: rebuilds the flight polygon, safety
    /// ring, diameter lines, handles and front label in one pass.
    pub fn update_overlays(&mut self, host: &mut dyn ShapeHost, opts: RedrawOptions) {
        let store = host.overlays();
        for id in self.ids.drain(..) {
            store.remove(id);
        }

        let Some(flight) = host.geometry().and_then(|g| g.flight_area.clone()) else {
            return;
        };
        let buffer = opts
            .buffer_override
            .unwrap_or_else(|| host.geometry().map_or(0.0, |g| g.buffer_m()));
        let editable = host.editable();

        let u = oriented::axis_u(flight.rotation_deg);
        let v = oriented::axis_v(flight.rotation_deg);
        let store = host.overlays();

        let ring = Overlay::polygon(
            flight.sample_path_with_buffer(ELLIPSE_PATH_SEGMENTS, buffer),
            z::SAFETY,
        );
        self.ids.push(store.insert(ring));

        let mut body = Overlay::polygon(flight.sample_path(ELLIPSE_PATH_SEGMENTS), z::FLIGHT)
            .with_role(HandleRole::Body(ShapeKind::Flight))
            .with_cursor(Cursor::Move);
        body.draggable = editable;
        self.ids.push(store.insert(body));

        // Diameter lines across the full width and depth.
        let width_line = vec![
            flight.point_on_axis(-u, flight.radius_x_m),
            flight.point_on_axis(u, flight.radius_x_m),
        ];
        let depth_line = vec![
            flight.point_on_axis(-v, flight.radius_y_m),
            flight.point_on_axis(v, flight.radius_y_m),
        ];
        self.ids.push(store.insert(Overlay::polyline(width_line, z::DIAMETER)));
        self.ids.push(store.insert(Overlay::polyline(depth_line, z::DIAMETER)));

        if editable {
            let front_pos =
                flight.point_on_axis(v, flight.radius_y_m + constants::FRONT_LABEL_OFFSET_M);
            self.ids.push(store.insert(Overlay::label(
                front_pos,
                "Front",
                z::MARKER_BASE + z::FRONT_LABEL,
            )));

            let handles = [
                (
                    flight.center,
                    HandleRole::Center,
                    z::CENTER,
                    Cursor::Move,
                ),
                (
                    flight.point_on_axis(u, flight.radius_x_m),
                    HandleRole::RadiusX,
                    z::RADIUS,
                    Cursor::Pointer,
                ),
                (
                    flight.point_on_axis(v, flight.radius_y_m),
                    HandleRole::RadiusY,
                    z::RADIUS,
                    Cursor::Pointer,
                ),
                (
                    flight.point_on_axis(u, flight.radius_x_m + buffer),
                    HandleRole::SafetyRadiusX,
                    z::SAFETY_RADIUS,
                    Cursor::Pointer,
                ),
                (
                    flight.point_on_axis(v, flight.radius_y_m + buffer),
                    HandleRole::SafetyRadiusY,
                    z::SAFETY_RADIUS,
                    Cursor::Pointer,
                ),
                (
                    // Sits just past the flight edge, inside the safety ring.
                    flight.point_on_axis(v, flight.radius_y_m + constants::ROTATE_HANDLE_GAP_M),
                    HandleRole::Rotate(ShapeKind::Flight),
                    z::ROTATE,
                    Cursor::Grab,
                ),
            ];
            for (pos, role, z_index, cursor) in handles {
                self.ids.push(store.insert(
                    Overlay::marker(pos, z::MARKER_BASE + z_index)
                        .with_role(role)
                        .with_cursor(cursor),
                ));
            }
        }

        if !opts.skip_metrics {
            self.publish(host, &flight, buffer);
        }
    }

    /// Routes one drag event. Returns true when the geometry changed.
    pub fn handle_drag(
        &mut self,
        host: &mut dyn ShapeHost,
        role: HandleRole,
        phase: DragPhase,
        event: PointerEvent,
    ) -> bool {
        if !host.editable() {
            return false;
        }
        match phase {
            DragPhase::Start => {
                self.begin_drag(host, role);
                false
            }
            DragPhase::Move => self.apply_drag(host, event, true),
            DragPhase::End => {
                let changed = self.apply_drag(host, event, false);
                self.drag = None;
                self.sync(host);
                changed
            }
        }
    }

    fn begin_drag(&mut self, host: &mut dyn ShapeHost, role: HandleRole) {
        self.drag = None;
        let Some(flight) = host.geometry().and_then(|g| g.flight_area.clone()) else {
            return;
        };
        self.drag = match role {
            HandleRole::Body(ShapeKind::Flight) => {
                let first_vertex = flight.sample_path(ELLIPSE_PATH_SEGMENTS)[0];
                Some(EllipseDrag::Body {
                    start: flight,
                    first_vertex,
                })
            }
            HandleRole::Center => Some(EllipseDrag::Center),
            HandleRole::RadiusX => Some(EllipseDrag::RadiusX),
            HandleRole::RadiusY => Some(EllipseDrag::RadiusY),
            HandleRole::SafetyRadiusX => Some(EllipseDrag::SafetyRadiusX),
            HandleRole::SafetyRadiusY => Some(EllipseDrag::SafetyRadiusY),
            HandleRole::Rotate(ShapeKind::Flight) => Some(EllipseDrag::Rotate),
            _ => None,
        };
    }

    fn apply_drag(&mut self, host: &mut dyn ShapeHost, event: PointerEvent, mid_drag: bool) -> bool {
        let Some(geom) = host.geometry() else {
            return false;
        };
        let Some(flight) = geom.flight_area.clone() else {
            return false;
        };
        let buffer = geom.buffer_m();
        // Shift-constrained moves align with the take-off rectangle's axes
        // so the two shapes stay co-oriented while repositioning.
        let constraint_rotation = geom
            .takeoff_area
            .as_ref()
            .and_then(|r| r.params())
            .map(|p| p.rotation_deg);
        let custom = geom
            .safety_area
            .as_ref()
            .is_some_and(|s| s.mode == flightzone_core::SafetyMode::Custom);

        let u = oriented::axis_u(flight.rotation_deg);
        let v = oriented::axis_v(flight.rotation_deg);
        // Translation suppresses the redraw mid-drag; the map moves the
        // polygon natively and a rebuild would fight it.
        let mut suppress_redraw = false;

        enum Patch {
            Flight(EllipseGeom),
            Buffer(f64),
        }

        let patch = match &self.drag {
            Some(EllipseDrag::Body { start, first_vertex }) => {
                let mut delta = first_vertex.to_local_xy(event.position);
                if event.shift {
                    let rot = constraint_rotation.unwrap_or(start.rotation_deg);
                    delta = constrain_to_axes(
                        delta,
                        oriented::axis_u(rot),
                        oriented::axis_v(rot),
                    );
                }
                suppress_redraw = mid_drag;
                Patch::Flight(EllipseGeom {
                    center: start.center.from_local_xy(delta),
                    ..start.clone()
                })
            }
            Some(EllipseDrag::Center) => Patch::Flight(EllipseGeom {
                center: event.position,
                ..flight.clone()
            }),
            Some(EllipseDrag::RadiusX) => {
                let d = flight.center.to_local_xy(event.position);
                Patch::Flight(EllipseGeom {
                    radius_x_m: d.dot(&u).abs().max(constants::MIN_EDGE_M),
                    ..flight.clone()
                })
            }
            Some(EllipseDrag::RadiusY) => {
                let d = flight.center.to_local_xy(event.position);
                Patch::Flight(EllipseGeom {
                    radius_y_m: d.dot(&v).abs().max(constants::MIN_EDGE_M),
                    ..flight.clone()
                })
            }
            Some(EllipseDrag::SafetyRadiusX) => {
                let reach = flight
                    .center
                    .to_local_xy(event.position)
                    .dot(&u)
                    .abs();
                if custom {
                    Patch::Buffer((reach - flight.radius_x_m).max(0.0))
                } else {
                    Patch::Flight(EllipseGeom {
                        radius_x_m: (reach - buffer).max(constants::MIN_EDGE_M),
                        ..flight.clone()
                    })
                }
            }
            Some(EllipseDrag::SafetyRadiusY) => {
                let reach = flight
                    .center
                    .to_local_xy(event.position)
                    .dot(&v)
                    .abs();
                if custom {
                    Patch::Buffer((reach - flight.radius_y_m).max(0.0))
                } else {
                    Patch::Flight(EllipseGeom {
                        radius_y_m: (reach - buffer).max(constants::MIN_EDGE_M),
                        ..flight.clone()
                    })
                }
            }
            Some(EllipseDrag::Rotate) => {
                let d = flight.center.to_local_xy(event.position);
                if d.norm() < f64::EPSILON {
                    return false;
                }
                // Point the +V axis at the handle.
                let rotation_deg = oriented::normalize_angle_deg((-d.x).atan2(d.y).to_degrees());
                Patch::Flight(EllipseGeom {
                    rotation_deg,
                    ..flight.clone()
                })
            }
            None => return false,
        };

        let Some(geom) = host.geometry_mut() else {
            return false;
        };
        match patch {
            Patch::Flight(updated) => geom.flight_area = Some(updated),
            Patch::Buffer(buffer_m) => {
                if let Some(safety) = geom.safety_area.as_mut() {
                    safety.buffer_m = buffer_m;
                }
            }
        }

        if !suppress_redraw {
            self.update_overlays(
                host,
                RedrawOptions {
                    skip_metrics: mid_drag,
                    buffer_override: None,
                },
            );
        }
        true
    }

    /// Writes panel-entered width/depth (full diameters) and rotation onto
    /// the flight ellipse.
    pub fn apply_panel(
        &mut self,
        host: &mut dyn ShapeHost,
        width_m: Option<f64>,
        depth_m: Option<f64>,
        rotation_deg: Option<f64>,
    ) -> bool {
        let Some(flight) = host.geometry_mut().and_then(|g| g.flight_area.as_mut()) else {
            return false;
        };
        if let Some(w) = width_m {
            flight.radius_x_m = (w / 2.0).max(constants::MIN_EDGE_M);
        }
        if let Some(d) = depth_m {
            flight.radius_y_m = (d / 2.0).max(constants::MIN_EDGE_M);
        }
        if let Some(bearing) = rotation_deg {
            // The published rotation is the compass bearing of the X-radius
            // axis; invert that mapping.
            flight.rotation_deg = oriented::normalize_angle_deg(90.0 - bearing);
        }
        self.sync(host);
        true
    }

    fn publish(&self, host: &mut dyn ShapeHost, flight: &EllipseGeom, buffer: f64) {
        let u = oriented::axis_u(flight.rotation_deg);
        let bearing = oriented::round_bearing_deg(oriented::bearing_deg(u), 1.0);
        // Both table distances are displayed in every mode, including
        // custom, so the user can compare against the applied buffer.
        let alt = host.geometry().and_then(|g| g.safety_lookup_altitude_m());
        let slice = GeometryMetrics {
            flight_width_m: Some(round_len_m(flight.radius_x_m * 2.0)),
            flight_depth_m: Some(round_len_m(flight.radius_y_m * 2.0)),
            flight_rotation_deg: Some(bearing),
            safety_distance_new_m: alt.map(|a| safety::safety_distance_new(a).dist_m),
            safety_distance_old_m: alt.map(|a| safety::safety_distance_old(a).dist_m),
            safety_distance_m: Some(round_len_m(buffer)),
            ..GeometryMetrics::default()
        };
        host.publish_metrics(&slice);
        host.report_bearing(BearingSource::FlightEllipse, bearing);
    }
}
