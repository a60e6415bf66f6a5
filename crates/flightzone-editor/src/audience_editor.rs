//! Interactive editor for the audience rectangle.
//!
//! Same handle behavior as the take-off rectangle but without a reference
//! corner: corner drags pin the opposite corner, and the panel shows plain
//! width/depth in whole meters.

use nalgebra::Vector2;

use flightzone_core::constants::{self, z};
use flightzone_core::metrics::round_whole_m;
use flightzone_core::oriented::{self, OrientedRect};
use flightzone_core::{GeometryMetrics, LngLat, RectangleGeom};

use crate::host::{DragPhase, PointerEvent, ShapeHost};
use crate::overlay::{Cursor, HandleRole, Overlay, OverlayId, ShapeKind};
use crate::rect_editor::{constrain_to_axes, set_path, set_position};

#[derive(Debug, Clone)]
enum AudienceDrag {
    Body { start: Vec<LngLat>, params: OrientedRect },
    /// Corner resize with the opposite corner pinned.
    Corner {
        anchor: LngLat,
        u_dir: Vector2<f64>,
        v_dir: Vector2<f64>,
        index: usize,
    },
    Rotate { params: OrientedRect },
}

/// Editor for the audience area rectangle.
#[derive(Debug, Default)]
pub struct AudienceEditor {
    ids: Vec<OverlayId>,
    drag: Option<AudienceDrag>,
}

impl AudienceEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the audience overlays and publishes the metric slice.
    pub fn sync(&mut self, host: &mut dyn ShapeHost) {
        let store = host.overlays();
        for id in self.ids.drain(..) {
            store.remove(id);
        }

        let Some(rect) = host.geometry().and_then(|g| g.audience_area.clone()) else {
            return;
        };
        let Some(params) = rect.params() else {
            return;
        };
        let editable = host.editable();

        let store = host.overlays();
        let mut body = Overlay::polygon(rect.coordinates.clone(), z::AUDIENCE)
            .with_role(HandleRole::Body(ShapeKind::Audience))
            .with_cursor(Cursor::Move);
        body.draggable = editable;
        self.ids.push(store.insert(body));

        if editable {
            for (i, corner) in rect.coordinates.iter().enumerate() {
                let overlay = Overlay::marker(*corner, z::MARKER_BASE + z::CORNER)
                    .with_role(HandleRole::Corner {
                        shape: ShapeKind::Audience,
                        index: i,
                    })
                    .with_cursor(Cursor::Pointer);
                self.ids.push(store.insert(overlay));
            }

            let v = oriented::axis_v(params.rotation_deg);
            let rotate_pos = params
                .center
                .from_local_xy(v * (params.h / 2.0 + constants::ROTATE_HANDLE_GAP_M));
            let overlay = Overlay::marker(rotate_pos, z::MARKER_BASE + z::ROTATE)
                .with_role(HandleRole::Rotate(ShapeKind::Audience))
                .with_cursor(Cursor::Grab);
            self.ids.push(store.insert(overlay));
        }

        self.publish(host, &params);
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
        let Some(rect) = host.geometry().and_then(|g| g.audience_area.clone()) else {
            return;
        };
        let Some(params) = rect.params() else {
            return;
        };
        self.drag = match role {
            HandleRole::Body(ShapeKind::Audience) => Some(AudienceDrag::Body {
                start: rect.coordinates.clone(),
                params,
            }),
            HandleRole::Corner {
                shape: ShapeKind::Audience,
                index,
            } => {
                let opp = (index + 2) % 4;
                let anchor = rect.coordinates[opp];
                let next = anchor.to_local_xy(rect.coordinates[(opp + 1) % 4]);
                let prev = anchor.to_local_xy(rect.coordinates[(opp + 3) % 4]);
                Some(AudienceDrag::Corner {
                    anchor,
                    u_dir: next.normalize(),
                    v_dir: prev.normalize(),
                    index,
                })
            }
            HandleRole::Rotate(ShapeKind::Audience) => Some(AudienceDrag::Rotate { params }),
            _ => None,
        };
    }

    fn apply_drag(&mut self, host: &mut dyn ShapeHost, event: PointerEvent) -> bool {
        let new_coords = match &self.drag {
            Some(AudienceDrag::Body { start, params }) => {
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
            Some(AudienceDrag::Corner {
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
            Some(AudienceDrag::Rotate { params }) => {
                let d = params.center.to_local_xy(event.position);
                if d.norm() < f64::EPSILON {
                    return false;
                }
                let rotation_deg =
                    oriented::normalize_angle_deg((-d.x).atan2(d.y).to_degrees());
                OrientedRect {
                    rotation_deg,
                    ..*params
                }
                .corners()
                .to_vec()
            }
            None => return false,
        };

        let Some(rect) = host.geometry_mut().and_then(|g| g.audience_area.as_mut()) else {
            return false;
        };
        rect.coordinates = new_coords;
        let rect = rect.clone();
        self.refresh_overlays(host, &rect);
        self.publish_geom(host, &rect);
        true
    }

    fn refresh_overlays(&self, host: &mut dyn ShapeHost, rect: &RectangleGeom) {
        let Some(params) = rect.params() else {
            return;
        };
        let v = oriented::axis_v(params.rotation_deg);
        let rotate_pos = params
            .center
            .from_local_xy(v * (params.h / 2.0 + constants::ROTATE_HANDLE_GAP_M));
        let store = host.overlays();
        for id in &self.ids {
            match store.role_of(*id) {
                Some(HandleRole::Body(ShapeKind::Audience)) => {
                    set_path(store, *id, rect.coordinates.clone());
                }
                Some(HandleRole::Corner {
                    shape: ShapeKind::Audience,
                    index,
                }) => {
                    set_position(store, *id, rect.coordinates[index]);
                }
                Some(HandleRole::Rotate(ShapeKind::Audience)) => {
                    set_position(store, *id, rotate_pos);
                }
                _ => {}
            }
        }
    }

    /// Writes panel-entered width/depth/rotation back onto the loop.
    pub fn apply_panel(
        &mut self,
        host: &mut dyn ShapeHost,
        width_m: Option<f64>,
        depth_m: Option<f64>,
        rotation_deg: Option<f64>,
    ) -> bool {
        let Some(rect) = host.geometry().and_then(|g| g.audience_area.clone()) else {
            return false;
        };
        let Some(mut params) = rect.params() else {
            return false;
        };
        if let Some(w) = width_m {
            params.w = w.max(constants::MIN_EDGE_M);
        }
        if let Some(h) = depth_m {
            params.h = h.max(constants::MIN_EDGE_M);
        }
        if let Some(bearing) = rotation_deg {
            // Panel rotation is the compass bearing of the width axis.
            params.rotation_deg = oriented::normalize_angle_deg(90.0 - bearing);
        }
        let Some(stored) = host.geometry_mut().and_then(|g| g.audience_area.as_mut()) else {
            return false;
        };
        stored.coordinates = params.corners().to_vec();
        self.sync(host);
        true
    }

    fn publish_geom(&self, host: &mut dyn ShapeHost, rect: &RectangleGeom) {
        if let Some(params) = rect.params() {
            self.publish(host, &params);
        }
    }

    fn publish(&self, host: &mut dyn ShapeHost, params: &OrientedRect) {
        let slice = GeometryMetrics {
            spectator_width_m: Some(round_whole_m(params.w)),
            spectator_depth_m: Some(round_whole_m(params.h)),
            ..GeometryMetrics::default()
        };
        host.publish_metrics(&slice);
    }
}
