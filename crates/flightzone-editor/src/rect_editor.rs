//! Interactive editor for the take-off rectangle.
//!
//! The rectangle is stored as four corner coordinates with a reference
//! corner. Drags resize with the opposite corner fixed, rotate around the
//! center, or translate the whole loop; clicking the reference marker
//! advances it to the next corner. Every mutation goes back through the
//! host, never through editor-local state.

use nalgebra::Vector2;
use tracing::debug;

use flightzone_core::constants::{self, z};
use flightzone_core::oriented::{self, OrientedRect};
use flightzone_core::{GeometryMetrics, LngLat, RectangleGeom};

use crate::host::{BearingSource, DragPhase, PointerEvent, ShapeHost};
use crate::overlay::{Cursor, HandleRole, Overlay, OverlayId, OverlayStore, ShapeKind};

/// Keeps the drag delta on the dominant shape axis: the component with the
/// larger magnitude survives, the other is discarded.
pub(crate) fn constrain_to_axes(
    delta: Vector2<f64>,
    u: Vector2<f64>,
    v: Vector2<f64>,
) -> Vector2<f64> {
    let du = delta.dot(&u);
    let dv = delta.dot(&v);
    if du.abs() >= dv.abs() {
        u * du
    } else {
        v * dv
    }
}

#[derive(Debug, Clone)]
enum RectDrag {
    /// Whole-shape translation. `start` is the corner loop at drag start;
    /// the event position tracks the displaced first corner.
    Body { start: Vec<LngLat>, params: OrientedRect },
    /// Corner resize with the opposite corner pinned.
    Corner {
        anchor: LngLat,
        u_dir: Vector2<f64>,
        v_dir: Vector2<f64>,
        index: usize,
    },
    /// Rotation around the fixed center.
    Rotate { params: OrientedRect },
}

/// Editor for the take-off area rectangle.
#[derive(Debug, Default)]
pub struct RectEditor {
    ids: Vec<OverlayId>,
    drag: Option<RectDrag>,
}

impl RectEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds this shape's overlays from the current geometry and
    /// publishes its metric slice. Safe to call with partial geometry.
    pub fn sync(&mut self, host: &mut dyn ShapeHost) {
        let store = host.overlays();
        for id in self.ids.drain(..) {
            store.remove(id);
        }

        let Some(rect) = host.geometry().and_then(|g| g.takeoff_area.clone()) else {
            return;
        };
        let Some(params) = rect.params() else {
            return;
        };
        let editable = host.editable();
        let reference = rect.reference_index();

        let store = host.overlays();
        let mut body = Overlay::polygon(rect.coordinates.clone(), z::TAKEOFF)
            .with_role(HandleRole::Body(ShapeKind::Takeoff))
            .with_cursor(Cursor::Move);
        body.draggable = editable;
        self.ids.push(store.insert(body));

        if editable {
            for (i, corner) in rect.coordinates.iter().enumerate() {
                let z_index = if i == reference { z::REFERENCE } else { z::CORNER };
                let overlay = Overlay::marker(*corner, z::MARKER_BASE + z_index)
                    .with_role(HandleRole::Corner {
                        shape: ShapeKind::Takeoff,
                        index: i,
                    })
                    .with_cursor(Cursor::Pointer);
                self.ids.push(store.insert(overlay));
            }

            let rotate_pos = rotate_handle_position(&params);
            let overlay = Overlay::marker(rotate_pos, z::MARKER_BASE + z::ROTATE)
                .with_role(HandleRole::Rotate(ShapeKind::Takeoff))
                .with_cursor(Cursor::Grab);
            self.ids.push(store.insert(overlay));
        }

        self.publish(host, &rect);
    }

    /// Clicking a corner marker makes it the reference corner; clicking the
    /// marker that already is the reference advances to the next corner.
    /// Returns true when the geometry changed.
    pub fn handle_click(&mut self, host: &mut dyn ShapeHost, role: HandleRole) -> bool {
        if !host.editable() {
            return false;
        }
        let HandleRole::Corner { shape: ShapeKind::Takeoff, index } = role else {
            return false;
        };
        let Some(rect) = host.geometry_mut().and_then(|g| g.takeoff_area.as_mut()) else {
            return false;
        };
        let current = rect.reference_index();
        let next = if index == current {
            (index + 1) % rect.coordinates.len().max(1)
        } else {
            index
        };
        rect.reference_point_index = Some(next);
        let corner = rect.coordinates.get(next).copied();
        debug!(
            from = current,
            to = next,
            lng = corner.map(|c| c.lng),
            lat = corner.map(|c| c.lat),
            "reference corner changed"
        );
        self.sync(host);
        true
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
            DragPhase::Move => self.apply_drag(host, event),
            DragPhase::End => {
                let changed = self.apply_drag(host, event);
                self.drag = None;
                self.sync(host);
                changed
            }
        }
    }

    fn begin_drag(&mut self, host: &mut dyn ShapeHost, role: HandleRole) {
        self.drag = None;
        let Some(rect) = host.geometry().and_then(|g| g.takeoff_area.clone()) else {
            return;
        };
        let Some(params) = rect.params() else {
            return;
        };

        self.drag = match role {
            HandleRole::Body(ShapeKind::Takeoff) => Some(RectDrag::Body {
                start: rect.coordinates.clone(),
                params,
            }),
            HandleRole::Corner { shape: ShapeKind::Takeoff, index } => {
                let opp = (index + 2) % 4;
                let anchor = rect.coordinates[opp];
                let next = anchor.to_local_xy(rect.coordinates[(opp + 1) % 4]);
                let prev = anchor.to_local_xy(rect.coordinates[(opp + 3) % 4]);
                Some(RectDrag::Corner {
                    anchor,
                    u_dir: next.normalize(),
                    v_dir: prev.normalize(),
                    index,
                })
            }
            HandleRole::Rotate(ShapeKind::Takeoff) => Some(RectDrag::Rotate { params }),
            _ => None,
        };
    }

    fn apply_drag(&mut self, host: &mut dyn ShapeHost, event: PointerEvent) -> bool {
        let new_coords = match &self.drag {
            Some(RectDrag::Body { start, params }) => {
                let mut delta = start[0].to_local_xy(event.position);
                if event.shift {
                    delta = constrain_to_axes(
                        delta,
                        oriented::axis_u(params.rotation_deg),
                        oriented::axis_v(params.rotation_deg),
                    );
                }
                let moved = start[0].from_local_xy(delta);
                let dlng = moved.lng - start[0].lng;
                let dlat = moved.lat - start[0].lat;
                start
                    .iter()
                    .map(|c| LngLat::new(c.lng + dlng, c.lat + dlat))
                    .collect::<Vec<_>>()
            }
            Some(RectDrag::Corner {
                anchor,
                u_dir,
                v_dir,
                index,
            }) => {
                let d = anchor.to_local_xy(event.position);
                let du = d.dot(u_dir).max(constants::MIN_EDGE_M);
                let dv = d.dot(v_dir).max(constants::MIN_EDGE_M);

                let opp = (*index + 2) % 4;
                let mut coords = vec![LngLat::new(0.0, 0.0); 4];
                coords[opp] = *anchor;
                coords[(opp + 1) % 4] = anchor.from_local_xy(u_dir * du);
                coords[*index] = anchor.from_local_xy(u_dir * du + v_dir * dv);
                coords[(opp + 3) % 4] = anchor.from_local_xy(v_dir * dv);
                coords
            }
            Some(RectDrag::Rotate { params }) => {
                let v = params.center.to_local_xy(event.position);
                if v.norm() < f64::EPSILON {
                    return false;
                }
                // Point the +V axis at the handle.
                let rotation_deg = (-v.x).atan2(v.y).to_degrees();
                let rotated = OrientedRect {
                    rotation_deg: oriented::normalize_angle_deg(rotation_deg),
                    ..*params
                };
                rotated.corners().to_vec()
            }
            None => return false,
        };

        let Some(rect) = host.geometry_mut().and_then(|g| g.takeoff_area.as_mut()) else {
            return false;
        };
        rect.coordinates = new_coords;
        let rect = rect.clone();
        self.refresh_overlays(host, &rect);
        self.publish(host, &rect);
        true
    }

    /// Moves existing overlays into place mid-drag without a full rebuild.
    fn refresh_overlays(&self, host: &mut dyn ShapeHost, rect: &RectangleGeom) {
        let Some(params) = rect.params() else {
            return;
        };
        let rotate_pos = rotate_handle_position(&params);
        let store = host.overlays();
        for id in &self.ids {
            match store.role_of(*id) {
                Some(HandleRole::Body(ShapeKind::Takeoff)) => {
                    set_path(store, *id, rect.coordinates.clone());
                }
                Some(HandleRole::Corner { shape: ShapeKind::Takeoff, index }) => {
                    set_position(store, *id, rect.coordinates[index]);
                }
                Some(HandleRole::Rotate(ShapeKind::Takeoff)) => {
                    set_position(store, *id, rotate_pos);
                }
                _ => {}
            }
        }
    }

    fn publish(&self, host: &mut dyn ShapeHost, rect: &RectangleGeom) {
        let Some(edges) = rect.right_left_edges() else {
            return;
        };
        let bearing = oriented::round_bearing_deg(edges.right_bearing_deg, 5.0);
        let slice = GeometryMetrics {
            rect_width_m: Some(flightzone_core::metrics::round_len_m(edges.right_m)),
            rect_depth_m: Some(flightzone_core::metrics::round_len_m(edges.left_m)),
            rect_rotation_deg: Some(bearing),
            ..GeometryMetrics::default()
        };
        host.publish_metrics(&slice);
        host.report_bearing(BearingSource::TakeoffRect, bearing);
    }

    /// Writes panel-entered right/left lengths and rotation back onto the
    /// corner loop. Which stored axis the "right" length maps to depends on
    /// the reference corner's parity and which adjacent edge is right.
    pub fn apply_panel(
        &mut self,
        host: &mut dyn ShapeHost,
        right_m: Option<f64>,
        left_m: Option<f64>,
        rotation_deg: Option<f64>,
    ) -> bool {
        let Some(rect) = host.geometry().and_then(|g| g.takeoff_area.clone()) else {
            return false;
        };
        let (Some(mut params), Some(edges)) = (rect.params(), rect.right_left_edges()) else {
            return false;
        };

        let is_even = rect.reference_index() % 2 == 0;
        let right_axis_is_u = if edges.right_is_next { is_even } else { !is_even };

        let right = right_m.unwrap_or(edges.right_m).max(constants::MIN_EDGE_M);
        let left = left_m.unwrap_or(edges.left_m).max(constants::MIN_EDGE_M);
        if right_axis_is_u {
            params.w = right;
            params.h = left;
        } else {
            params.w = left;
            params.h = right;
        }

        if let Some(target) = rotation_deg {
            let delta = oriented::normalize_diff_deg(target - edges.right_bearing_deg);
            // Compass bearings grow clockwise, the math rotation grows
            // counter-clockwise.
            params.rotation_deg =
                oriented::normalize_angle_deg(params.rotation_deg - delta);
        }

        let Some(stored) = host.geometry_mut().and_then(|g| g.takeoff_area.as_mut()) else {
            return false;
        };
        stored.coordinates = params.corners().to_vec();
        self.sync(host);
        true
    }
}

fn rotate_handle_position(params: &OrientedRect) -> LngLat {
    let v = oriented::axis_v(params.rotation_deg);
    params
        .center
        .from_local_xy(v * (params.h / 2.0 + constants::ROTATE_HANDLE_GAP_M))
}

pub(crate) fn set_path(store: &mut OverlayStore, id: OverlayId, path: Vec<LngLat>) {
    if let Some(overlay) = store.get_mut(id) {
        match &mut overlay.kind {
            crate::overlay::OverlayKind::Polygon { path: p }
            | crate::overlay::OverlayKind::Polyline { path: p } => *p = path,
            _ => {}
        }
    }
}

pub(crate) fn set_position(store: &mut OverlayStore, id: OverlayId, position: LngLat) {
    if let Some(overlay) = store.get_mut(id) {
        match &mut overlay.kind {
            crate::overlay::OverlayKind::Marker { position: p }
            | crate::overlay::OverlayKind::Label { position: p, .. } => *p = position,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use flightzone_core::Geometry;

    use crate::host::test_host::TestHost;

    fn host_with_default() -> TestHost {
        TestHost::new(Some(Geometry::default_at(LngLat::new(139.7, 35.6))))
    }

    fn takeoff_params(host: &TestHost) -> OrientedRect {
        host.geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .params()
            .unwrap()
    }

    fn drag(
        editor: &mut RectEditor,
        host: &mut TestHost,
        role: HandleRole,
        to: LngLat,
        shift: bool,
    ) {
        let mut ev = PointerEvent::at(to);
        if shift {
            ev = ev.with_shift();
        }
        editor.handle_drag(host, role, DragPhase::Start, ev);
        editor.handle_drag(host, role, DragPhase::Move, ev);
        editor.handle_drag(host, role, DragPhase::End, ev);
    }

    #[test]
    fn corner_drag_keeps_opposite_corner_fixed() {
        let mut host = host_with_default();
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        let before = host
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .clone();
        let anchor = before.coordinates[2];
        // Pull corner 0 further out along both axes.
        let target = anchor.from_local_xy(
            anchor.to_local_xy(before.coordinates[0]) * 1.5,
        );
        drag(
            &mut editor,
            &mut host,
            HandleRole::Corner {
                shape: ShapeKind::Takeoff,
                index: 0,
            },
            target,
            false,
        );

        let after = host
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .clone();
        assert_relative_eq!(after.coordinates[2].lng, anchor.lng, epsilon = 1e-12);
        assert_relative_eq!(after.coordinates[2].lat, anchor.lat, epsilon = 1e-12);
        let p = after.params().unwrap();
        assert_relative_eq!(p.w, 150.0, epsilon = 1e-2);
        assert_relative_eq!(p.h, 30.0, epsilon = 1e-2);
    }

    #[test]
    fn corner_drag_clamps_to_minimum_edge() {
        let mut host = host_with_default();
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        // Drag corner 0 onto (and past) the anchor corner 2.
        let anchor = host
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .coordinates[2];
        drag(
            &mut editor,
            &mut host,
            HandleRole::Corner {
                shape: ShapeKind::Takeoff,
                index: 0,
            },
            anchor,
            false,
        );

        let p = takeoff_params(&host);
        assert_relative_eq!(p.w, constants::MIN_EDGE_M, epsilon = 1e-4);
        assert_relative_eq!(p.h, constants::MIN_EDGE_M, epsilon = 1e-4);
    }

    #[test]
    fn body_drag_translates_without_resize() {
        let mut host = host_with_default();
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        let before = takeoff_params(&host);
        let v0 = host
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .coordinates[0];
        let target = v0.from_local_xy(Vector2::new(40.0, 25.0));
        drag(
            &mut editor,
            &mut host,
            HandleRole::Body(ShapeKind::Takeoff),
            target,
            false,
        );

        let after = takeoff_params(&host);
        assert_relative_eq!(after.w, before.w, epsilon = 1e-3);
        assert_relative_eq!(after.h, before.h, epsilon = 1e-3);
        let moved = before.center.to_local_xy(after.center);
        assert_relative_eq!(moved.x, 40.0, epsilon = 0.01);
        assert_relative_eq!(moved.y, 25.0, epsilon = 0.01);
    }

    #[test]
    fn shift_body_drag_snaps_to_dominant_axis() {
        let mut host = host_with_default();
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        let before = takeoff_params(&host);
        let v0 = host
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .coordinates[0];
        // Mostly northward with a small east component: east is discarded.
        let target = v0.from_local_xy(Vector2::new(8.0, 30.0));
        drag(
            &mut editor,
            &mut host,
            HandleRole::Body(ShapeKind::Takeoff),
            target,
            true,
        );

        let after = takeoff_params(&host);
        let moved = before.center.to_local_xy(after.center);
        assert_relative_eq!(moved.x, 0.0, epsilon = 0.01);
        assert_relative_eq!(moved.y, 30.0, epsilon = 0.01);
    }

    #[test]
    fn rotate_drag_preserves_center_and_size() {
        let mut host = host_with_default();
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        let before = takeoff_params(&host);
        // Put the handle due east of the center: +V must point east.
        let target = before.center.from_local_xy(Vector2::new(50.0, 0.0));
        drag(
            &mut editor,
            &mut host,
            HandleRole::Rotate(ShapeKind::Takeoff),
            target,
            false,
        );

        let after = takeoff_params(&host);
        assert_relative_eq!(after.w, before.w, epsilon = 1e-6);
        assert_relative_eq!(after.h, before.h, epsilon = 1e-6);
        let c = before.center.to_local_xy(after.center);
        assert_relative_eq!(c.norm(), 0.0, epsilon = 1e-6);
        let front = oriented::axis_v(after.rotation_deg);
        assert_relative_eq!(oriented::bearing_deg(front), 90.0, epsilon = 1e-3);
    }

    #[test]
    fn reference_click_advances_and_swaps_published_sides() {
        let mut host = host_with_default();
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        let right0 = host.metrics.rect_width_m.unwrap();
        let left0 = host.metrics.rect_depth_m.unwrap();
        assert_ne!(right0, left0);

        let changed = editor.handle_click(
            &mut host,
            HandleRole::Corner {
                shape: ShapeKind::Takeoff,
                index: 0,
            },
        );
        assert!(changed);
        assert_eq!(
            host.geometry()
                .unwrap()
                .takeoff_area
                .as_ref()
                .unwrap()
                .reference_index(),
            1
        );
        assert_eq!(host.metrics.rect_width_m.unwrap(), left0);
        assert_eq!(host.metrics.rect_depth_m.unwrap(), right0);
    }

    #[test]
    fn clicking_another_corner_selects_it_as_reference() {
        let mut host = host_with_default();
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        let changed = editor.handle_click(
            &mut host,
            HandleRole::Corner {
                shape: ShapeKind::Takeoff,
                index: 2,
            },
        );
        assert!(changed);
        let rect = host.geometry().unwrap().takeoff_area.as_ref().unwrap();
        assert_eq!(rect.reference_index(), 2);
        // The announced reference carries the corner's coordinate.
        assert_eq!(rect.reference_corner().unwrap(), rect.coordinates[2]);
    }

    #[test]
    fn panel_apply_respects_reference_parity() {
        let mut host = host_with_default();
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        editor.apply_panel(&mut host, Some(60.0), Some(12.0), None);
        let edges = host
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .right_left_edges()
            .unwrap();
        assert_relative_eq!(edges.right_m, 60.0, epsilon = 1e-3);
        assert_relative_eq!(edges.left_m, 12.0, epsilon = 1e-3);

        // Same numbers applied from the next reference corner must land on
        // the other stored axis but still read back as entered.
        editor.handle_click(
            &mut host,
            HandleRole::Corner {
                shape: ShapeKind::Takeoff,
                index: 0,
            },
        );
        editor.apply_panel(&mut host, Some(10.0), Some(6.0), None);
        let edges = host
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .right_left_edges()
            .unwrap();
        assert_relative_eq!(edges.right_m, 10.0, epsilon = 1e-3);
        assert_relative_eq!(edges.left_m, 6.0, epsilon = 1e-3);
    }

    #[test]
    fn panel_rotation_targets_right_edge_bearing() {
        let mut host = host_with_default();
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        editor.apply_panel(&mut host, None, None, Some(45.0));
        let edges = host
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .right_left_edges()
            .unwrap();
        assert_relative_eq!(edges.right_bearing_deg, 45.0, epsilon = 1e-3);
    }

    #[test]
    fn drags_are_ignored_when_not_editable() {
        let mut host = host_with_default();
        host.editable = false;
        let mut editor = RectEditor::new();
        editor.sync(&mut host);

        let before = host.geometry().cloned();
        let target = LngLat::new(139.71, 35.61);
        drag(
            &mut editor,
            &mut host,
            HandleRole::Body(ShapeKind::Takeoff),
            target,
            false,
        );
        assert_eq!(host.geometry().cloned(), before);
    }
}
