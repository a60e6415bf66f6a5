//! The geometry controller: single owner of the geometry, the overlay
//! store and the undo history.
//!
//! Editors never see the controller; they see a [`ShapeHost`] view built
//! from disjoint borrows of its fields. Pointer events arrive with an
//! overlay id, get resolved to a [`HandleRole`], and are routed to the
//! editor owning that shape. Every completed mutation records one undo
//! snapshot.

use tracing::{debug, info};
use uuid::Uuid;

use flightzone_core::constants::{self, z, ELLIPSE_PATH_SEGMENTS};
use flightzone_core::metrics::round_len_m;
use flightzone_core::oriented;
use flightzone_core::{GeoBounds, Geometry, GeometryMetrics, LngLat, MetricsDelta, SafetyMode};

use crate::audience_editor::AudienceEditor;
use crate::ellipse_editor::EllipseEditor;
use crate::history::{Snapshot, UndoHistory};
use crate::host::{DragPhase, MapViewport, MetricsSink, PointerEvent, ShapeHost};
use crate::orientation::{OrientationTracker, TurnReport};
use crate::overlay::{HandleRole, Overlay, OverlayId, OverlayStore, ShapeKind};
use crate::rect_editor::RectEditor;

/// How a full render behaves.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Fit the viewport to the rendered geometry.
    pub fit: bool,
    /// Drop the undo/redo stacks. On by default; undo/redo replays and
    /// re-renders within a session pass `false`.
    pub clear_history: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fit: false,
            clear_history: true,
        }
    }
}

/// The [`ShapeHost`] the editors actually receive: disjoint borrows of
/// controller fields, so an editor can mutate geometry and overlays while
/// the controller keeps ownership.
struct HostCtx<'a> {
    geometry: &'a mut Option<Geometry>,
    overlays: &'a mut OverlayStore,
    metrics: &'a mut GeometryMetrics,
    orientation: &'a mut OrientationTracker,
    editable: bool,
}

impl ShapeHost for HostCtx<'_> {
    fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    fn geometry_mut(&mut self) -> Option<&mut Geometry> {
        self.geometry.as_mut()
    }

    fn overlays(&mut self) -> &mut OverlayStore {
        self.overlays
    }

    fn publish_metrics(&mut self, slice: &GeometryMetrics) {
        self.metrics.publish(slice);
    }

    fn report_bearing(&mut self, source: crate::host::BearingSource, bearing_deg: f64) {
        let _ = self.orientation.update(source, bearing_deg);
    }

    fn editable(&self) -> bool {
        self.editable
    }
}

/// Owns the map-editing session for one geometry record.
pub struct GeometryController<V: MapViewport> {
    viewport: V,
    geometry: Option<Geometry>,
    overlays: OverlayStore,
    metrics: GeometryMetrics,
    orientation: OrientationTracker,
    history: UndoHistory,
    session: Option<Uuid>,
    editable: bool,
    measurement_mode: bool,
    deleted: bool,

    rect: RectEditor,
    ellipse: EllipseEditor,
    audience: AudienceEditor,

    arrow_ids: Vec<OverlayId>,
    pending_undo: Option<Snapshot>,
    drag_changed: bool,
}

macro_rules! host_ctx {
    ($self:expr) => {
        HostCtx {
            geometry: &mut $self.geometry,
            overlays: &mut $self.overlays,
            metrics: &mut $self.metrics,
            orientation: &mut $self.orientation,
            editable: $self.editable && !$self.measurement_mode,
        }
    };
}

impl<V: MapViewport> GeometryController<V> {
    pub fn new(viewport: V) -> Self {
        Self {
            viewport,
            geometry: None,
            overlays: OverlayStore::new(),
            metrics: GeometryMetrics::default(),
            orientation: OrientationTracker::new(),
            history: UndoHistory::new(),
            session: None,
            editable: true,
            measurement_mode: false,
            deleted: false,
            rect: RectEditor::new(),
            ellipse: EllipseEditor::new(),
            audience: AudienceEditor::new(),
            arrow_ids: Vec::new(),
            pending_undo: None,
            drag_changed: false,
        }
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn metrics(&self) -> &GeometryMetrics {
        &self.metrics
    }

    pub fn overlays(&self) -> &OverlayStore {
        &self.overlays
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn last_turn_report(&self) -> Option<TurnReport> {
        self.orientation.last_report()
    }

    pub fn can_undo(&self) -> bool {
        self.editable && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editable && self.history.can_redo()
    }

    pub fn session(&self) -> Option<Uuid> {
        self.session
    }

    /// Whether the current record is marked for deletion. The flag tracks
    /// through undo/redo of the delete itself.
    pub fn deleted(&self) -> bool {
        self.deleted
    }

    /// What the embedding should persist: the geometry and whether a
    /// pending delete should remove the record.
    pub fn save_state(&self) -> (Option<&Geometry>, bool) {
        (self.geometry.as_ref(), self.deleted)
    }

    /// Drops the undo/redo stacks without touching the rendered geometry,
    /// e.g. once the embedding has persisted the record.
    pub fn clear_undo_history(&mut self) {
        self.history.clear();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            geometry: self.geometry.clone(),
            deleted: self.deleted,
        }
    }

    /// Associates this controller with a schedule record. Switching to a
    /// different record drops the undo history of the old one.
    pub fn bind_session(&mut self, session: Uuid, geometry: Option<Geometry>) {
        if self.session != Some(session) {
            info!(%session, "binding geometry session");
            self.history.clear();
            self.session = Some(session);
        }
        self.render_geometry(geometry, RenderOptions { fit: true, clear_history: false });
    }

    /// Replaces the current geometry and redraws everything.
    pub fn render_geometry(&mut self, geometry: Option<Geometry>, opts: RenderOptions) {
        if opts.clear_history {
            self.history.clear();
        }
        self.geometry = geometry;
        self.deleted = false;
        self.orientation.reset();
        self.metrics = GeometryMetrics::default();
        self.full_redraw();

        if opts.fit {
            if let Some(bounds) = self.bounds() {
                self.viewport.fit_bounds(bounds, constants::FIT_PADDING_PX);
            }
        }
    }

    /// Creates the default geometry around the current viewport center.
    pub fn create_default_geometry(&mut self) {
        let before = self.snapshot();
        let geom = Geometry::default_at(self.viewport.center());
        self.render_geometry(
            Some(geom),
            RenderOptions {
                fit: false,
                clear_history: false,
            },
        );
        self.history.record(before);
    }

    /// Marks the geometry deleted. The record is only gone once the
    /// embedding persists it; until then undo brings it back.
    pub fn delete_current_geometry(&mut self) -> bool {
        if !self.editable || self.geometry.is_none() {
            return false;
        }
        let before = self.snapshot();
        self.geometry = None;
        self.deleted = true;
        debug!("geometry deleted (pending save)");
        self.history.record(before);
        self.orientation.reset();
        self.metrics = GeometryMetrics::default();
        self.overlays.clear();
        self.arrow_ids.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        if !self.editable {
            return false;
        }
        let Some(restored) = self.history.undo(self.snapshot()) else {
            return false;
        };
        self.restore(restored);
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.editable {
            return false;
        }
        let Some(restored) = self.history.redo(self.snapshot()) else {
            return false;
        };
        self.restore(restored);
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.render_geometry(
            snapshot.geometry,
            RenderOptions {
                fit: false,
                clear_history: false,
            },
        );
        self.deleted = snapshot.deleted;
    }

    /// Applies the editable flag and measurement mode in one step. While
    /// measuring, shapes stop capturing clicks so the measuring tool sees
    /// the map underneath.
    pub fn sync_interactivity(&mut self, editable: bool, measurement_mode: bool) {
        self.editable = editable;
        self.measurement_mode = measurement_mode;
        self.full_redraw();
        if measurement_mode {
            for (_, overlay) in self.overlays.iter_mut() {
                overlay.clickable = false;
                overlay.draggable = false;
                if matches!(overlay.kind, crate::overlay::OverlayKind::Polygon { .. }) {
                    overlay.cursor = Some(crate::overlay::Cursor::Crosshair);
                }
            }
        }
    }

    /// A click on an overlay (no drag). Currently only the reference
    /// corner marker reacts.
    pub fn pointer_click(&mut self, id: OverlayId) -> bool {
        let Some(role) = self.overlays.role_of(id) else {
            return false;
        };
        let before = self.snapshot();
        let changed = {
            let mut ctx = host_ctx!(self);
            self.rect.handle_click(&mut ctx, role)
        };
        if changed {
            self.history.record(before);
            self.after_mutation();
        }
        changed
    }

    /// A drag event on an overlay. One undo snapshot is recorded for the
    /// whole drag, when it actually changed anything.
    pub fn pointer_drag(&mut self, id: OverlayId, phase: DragPhase, event: PointerEvent) -> bool {
        let Some(role) = self.overlays.role_of(id) else {
            return false;
        };
        if phase == DragPhase::Start {
            self.pending_undo = Some(self.snapshot());
            self.drag_changed = false;
        }

        let changed = {
            let mut ctx = host_ctx!(self);
            match shape_of(role) {
                Some(ShapeKind::Takeoff) => self.rect.handle_drag(&mut ctx, role, phase, event),
                Some(ShapeKind::Flight) | Some(ShapeKind::Safety) => {
                    self.ellipse.handle_drag(&mut ctx, role, phase, event)
                }
                Some(ShapeKind::Audience) => {
                    self.audience.handle_drag(&mut ctx, role, phase, event)
                }
                None => false,
            }
        };
        self.drag_changed |= changed;

        if changed {
            self.after_mutation();
        }
        if phase == DragPhase::End {
            if let Some(before) = self.pending_undo.take() {
                if self.drag_changed {
                    self.history.record(before);
                }
            }
            self.drag_changed = false;
        }
        changed
    }

    /// Applies a panel edit. Safety buffers are only recomputed when the
    /// delta actually touches the mode or the altitudes, so a custom
    /// buffer survives unrelated edits.
    pub fn apply_metrics(&mut self, delta: &MetricsDelta) -> bool {
        if !self.editable || delta.is_empty() || self.geometry.is_none() {
            return false;
        }
        let before = self.snapshot();
        let mut changed = false;

        if delta.rect_width_m.is_some()
            || delta.rect_depth_m.is_some()
            || delta.rect_rotation_deg.is_some()
        {
            let mut ctx = host_ctx!(self);
            changed |= self.rect.apply_panel(
                &mut ctx,
                delta.rect_width_m,
                delta.rect_depth_m,
                delta.rect_rotation_deg,
            );
        }

        if delta.flight_width_m.is_some()
            || delta.flight_depth_m.is_some()
            || delta.flight_rotation_deg.is_some()
        {
            let mut ctx = host_ctx!(self);
            changed |= self.ellipse.apply_panel(
                &mut ctx,
                delta.flight_width_m,
                delta.flight_depth_m,
                delta.flight_rotation_deg,
            );
        }

        if delta.spectator_width_m.is_some()
            || delta.spectator_depth_m.is_some()
            || delta.spectator_rotation_deg.is_some()
        {
            let mut ctx = host_ctx!(self);
            changed |= self.audience.apply_panel(
                &mut ctx,
                delta.spectator_width_m,
                delta.spectator_depth_m,
                delta.spectator_rotation_deg,
            );
        }

        changed |= self.apply_safety_delta(delta);

        if changed {
            self.history.record(before);
            self.after_mutation();
        }
        changed
    }

    fn apply_safety_delta(&mut self, delta: &MetricsDelta) -> bool {
        let touches_safety = delta.safety_mode.is_some()
            || delta.custom_buffer_m.is_some()
            || delta.flight_altitude_min_m.is_some()
            || delta.flight_altitude_max_m.is_some();
        if !touches_safety {
            return false;
        }
        let Some(geom) = self.geometry.as_mut() else {
            return false;
        };

        if let Some(min) = delta.flight_altitude_min_m {
            geom.flight_altitude_min_m = Some(min);
        }
        if let Some(max) = delta.flight_altitude_max_m {
            geom.flight_altitude_max_m = Some(max);
        }
        if let Some(mode) = delta.safety_mode {
            if let Some(safety) = geom.safety_area.as_mut() {
                safety.mode = mode;
            }
        }

        let mode = geom.safety_area.as_ref().map(|s| s.mode);
        match mode {
            Some(SafetyMode::Custom) => {
                if let Some(buffer) = delta.custom_buffer_m {
                    if let Some(safety) = geom.safety_area.as_mut() {
                        safety.buffer_m = buffer.max(0.0);
                    }
                }
            }
            Some(_) => {
                if let Some(lookup) = geom.safety_lookup() {
                    if let Some(safety) = geom.safety_area.as_mut() {
                        debug!(
                            used_alt = lookup.used_alt_m,
                            dist = lookup.dist_m,
                            "safety buffer recomputed"
                        );
                        safety.buffer_m = lookup.dist_m;
                    }
                }
            }
            None => {}
        }

        let mut ctx = host_ctx!(self);
        self.ellipse.sync(&mut ctx);
        self.publish_aux_metrics();
        true
    }

    fn full_redraw(&mut self) {
        self.overlays.clear();
        self.arrow_ids.clear();
        self.rect = RectEditor::new();
        self.ellipse = EllipseEditor::new();
        self.audience = AudienceEditor::new();
        {
            let mut ctx = host_ctx!(self);
            self.ellipse.sync(&mut ctx);
            self.rect.sync(&mut ctx);
            self.audience.sync(&mut ctx);
        }
        self.redraw_arrow();
        self.publish_aux_metrics();
    }

    fn after_mutation(&mut self) {
        self.redraw_arrow();
        self.publish_aux_metrics();
    }

    /// The directional arrow from the take-off reference corner to the
    /// flight center: the straight connection, plus the same span split
    /// into two right-angled legs (first along the rectangle's depth axis)
    /// with a distance label on each leg.
    fn redraw_arrow(&mut self) {
        for id in self.arrow_ids.drain(..) {
            self.overlays.remove(id);
        }
        let Some(geom) = self.geometry.as_ref() else {
            return;
        };
        let (Some(rect), Some(flight)) = (geom.takeoff_area.as_ref(), geom.flight_area.as_ref())
        else {
            return;
        };
        let (Some(reference), Some(params)) = (rect.reference_corner(), rect.params()) else {
            return;
        };

        let d = reference.to_local_xy(flight.center);
        let v_dir = oriented::axis_v(params.rotation_deg);
        let leg1 = v_dir * d.dot(&v_dir);
        let corner = reference.from_local_xy(leg1);
        let leg2 = d - leg1;

        let direct = vec![reference, flight.center];
        self.arrow_ids
            .push(self.overlays.insert(Overlay::polyline(direct, z::ARROW)));
        let path = vec![reference, corner, flight.center];
        self.arrow_ids
            .push(self.overlays.insert(Overlay::polyline(path, z::ARROW)));

        let mid1 = reference.from_local_xy(leg1 / 2.0);
        let mid2 = reference.from_local_xy(leg1 + leg2 / 2.0);
        for (pos, len) in [(mid1, leg1.norm()), (mid2, leg2.norm())] {
            if len < 0.5 {
                continue;
            }
            let text = format!("{:.1} m", round_len_m(len));
            self.arrow_ids.push(
                self.overlays
                    .insert(Overlay::label(pos, text, z::MARKER_BASE + z::FRONT_LABEL)),
            );
        }
    }

    /// Metrics owned by the controller rather than a single editor.
    fn publish_aux_metrics(&mut self) {
        let Some(geom) = self.geometry.as_ref() else {
            return;
        };
        let distance = geom.flight_to_audience_distance_m().map(round_len_m);
        let slice = GeometryMetrics {
            flight_to_audience_distance_m: distance,
            ..GeometryMetrics::default()
        };
        self.metrics.merge(&slice);
    }

    fn bounds(&self) -> Option<GeoBounds> {
        let geom = self.geometry.as_ref()?;
        let mut bounds = GeoBounds::new();
        if let Some(rect) = &geom.takeoff_area {
            bounds.extend_path(&rect.coordinates);
        }
        if let Some(rect) = &geom.audience_area {
            bounds.extend_path(&rect.coordinates);
        }
        if let Some(flight) = &geom.flight_area {
            bounds.extend_path(
                &flight.sample_path_with_buffer(ELLIPSE_PATH_SEGMENTS, geom.buffer_m()),
            );
        }
        if bounds.is_empty() {
            None
        } else {
            Some(bounds)
        }
    }
}

fn shape_of(role: HandleRole) -> Option<ShapeKind> {
    match role {
        HandleRole::Body(s) | HandleRole::Rotate(s) => Some(s),
        HandleRole::Corner { shape, .. } => Some(shape),
        HandleRole::Center | HandleRole::RadiusX | HandleRole::RadiusY => Some(ShapeKind::Flight),
        HandleRole::SafetyRadiusX | HandleRole::SafetyRadiusY => Some(ShapeKind::Safety),
    }
}

/// A head-less viewport for embeddings without a live map (tests, the
/// command line renderer).
#[derive(Debug, Clone)]
pub struct FixedViewport {
    center: LngLat,
    zoom: f64,
    pub last_fit: Option<(LngLat, LngLat)>,
}

impl FixedViewport {
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            last_fit: None,
        }
    }
}

impl MapViewport for FixedViewport {
    fn center(&self) -> LngLat {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn pan_to(&mut self, center: LngLat) {
        self.center = center;
    }

    fn fit_bounds(&mut self, bounds: GeoBounds, _padding_px: f64) {
        if let Some((sw, ne)) = bounds.corners() {
            self.center = sw.midpoint(ne);
            self.last_fit = Some((sw, ne));
        }
    }

    fn set_cursor(&mut self, _cursor: Option<crate::overlay::Cursor>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller_with_default() -> GeometryController<FixedViewport> {
        let viewport = FixedViewport::new(LngLat::new(139.7, 35.6), 15.0);
        let mut c = GeometryController::new(viewport);
        c.create_default_geometry();
        c
    }

    fn body_overlay(c: &GeometryController<FixedViewport>, shape: ShapeKind) -> OverlayId {
        c.overlays().find_role(HandleRole::Body(shape)).unwrap()
    }

    #[test]
    fn default_creation_is_undoable() {
        let mut c = controller_with_default();
        assert!(c.geometry().is_some());
        assert!(c.can_undo());
        assert!(c.undo());
        assert!(c.geometry().is_none());
        assert!(c.redo());
        assert!(c.geometry().is_some());
    }

    #[test]
    fn drag_records_one_snapshot_for_the_whole_gesture() {
        let mut c = controller_with_default();
        let depth_before = c.history.undo_depth();
        let id = body_overlay(&c, ShapeKind::Takeoff);

        let v0 = c
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .coordinates[0];
        let step1 = v0.from_local_xy(nalgebra::Vector2::new(10.0, 0.0));
        let step2 = v0.from_local_xy(nalgebra::Vector2::new(20.0, 5.0));

        c.pointer_drag(id, DragPhase::Start, PointerEvent::at(v0));
        c.pointer_drag(id, DragPhase::Move, PointerEvent::at(step1));
        c.pointer_drag(id, DragPhase::Move, PointerEvent::at(step2));
        c.pointer_drag(id, DragPhase::End, PointerEvent::at(step2));

        assert_eq!(c.history.undo_depth(), depth_before + 1);

        // One undo unwinds the whole gesture.
        let center_after = c
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .params()
            .unwrap()
            .center;
        c.undo();
        let center_restored = c
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .params()
            .unwrap()
            .center;
        let moved = center_restored.to_local_xy(center_after);
        assert_relative_eq!(moved.x, 20.0, epsilon = 0.05);
        assert_relative_eq!(moved.y, 5.0, epsilon = 0.05);
    }

    #[test]
    fn delete_is_pending_and_undoable() {
        let mut c = controller_with_default();
        assert!(c.delete_current_geometry());
        assert!(c.geometry().is_none());
        assert!(c.overlays().is_empty());
        assert!(c.undo());
        assert!(c.geometry().is_some());
        assert!(!c.overlays().is_empty());
    }

    #[test]
    fn delete_flag_tracks_through_undo_redo() {
        let mut c = controller_with_default();
        assert!(!c.deleted());
        assert!(c.delete_current_geometry());
        let (geom, deleted) = c.save_state();
        assert!(geom.is_none());
        assert!(deleted);

        assert!(c.undo());
        assert!(c.geometry().is_some());
        assert!(!c.deleted());

        assert!(c.redo());
        assert!(c.geometry().is_none());
        assert!(c.deleted());

        // A fresh geometry clears the pending delete.
        c.create_default_geometry();
        assert!(!c.deleted());
    }

    #[test]
    fn clearing_history_keeps_the_rendered_geometry() {
        let mut c = controller_with_default();
        let delta = MetricsDelta {
            rect_width_m: Some(60.0),
            ..MetricsDelta::default()
        };
        assert!(c.apply_metrics(&delta));
        assert!(c.can_undo());

        c.clear_undo_history();
        assert!(!c.can_undo());
        assert!(!c.can_redo());
        // The rendered state survives the clear.
        let edges = c
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .right_left_edges()
            .unwrap();
        assert_relative_eq!(edges.right_m, 60.0, epsilon = 1e-3);
        assert!(!c.overlays().is_empty());
    }

    #[test]
    fn undo_redo_refused_when_not_editable() {
        let mut c = controller_with_default();
        c.sync_interactivity(false, false);
        assert!(!c.can_undo());
        assert!(!c.undo());
        assert!(!c.delete_current_geometry());
        assert!(c.geometry().is_some());
    }

    #[test]
    fn measurement_mode_disables_overlay_interaction() {
        let mut c = controller_with_default();
        c.sync_interactivity(true, true);
        for (_, overlay) in c.overlays.iter() {
            assert!(!overlay.clickable);
            assert!(!overlay.draggable);
        }
        // Leaving measurement mode restores the handles.
        c.sync_interactivity(true, false);
        let id = body_overlay(&c, ShapeKind::Flight);
        assert!(c.overlays().get(id).unwrap().draggable);
    }

    #[test]
    fn safety_mode_switch_recomputes_buffer_from_table() {
        let mut c = controller_with_default();
        // Default: new table at 120 m -> 27.5.
        assert_eq!(c.geometry().unwrap().buffer_m(), 27.5);

        let delta = MetricsDelta {
            safety_mode: Some(SafetyMode::Old),
            ..MetricsDelta::default()
        };
        assert!(c.apply_metrics(&delta));
        let old_buffer = c.geometry().unwrap().buffer_m();
        assert_ne!(old_buffer, 27.5);

        // Raising the max altitude re-reads the table.
        let delta = MetricsDelta {
            flight_altitude_max_m: Some(150),
            ..MetricsDelta::default()
        };
        assert!(c.apply_metrics(&delta));
        assert!(c.geometry().unwrap().buffer_m() > old_buffer);
    }

    #[test]
    fn custom_buffer_survives_unrelated_edits() {
        let mut c = controller_with_default();
        let delta = MetricsDelta {
            safety_mode: Some(SafetyMode::Custom),
            custom_buffer_m: Some(42.0),
            ..MetricsDelta::default()
        };
        assert!(c.apply_metrics(&delta));
        assert_eq!(c.geometry().unwrap().buffer_m(), 42.0);

        // Editing only the flight width must not touch the buffer.
        let delta = MetricsDelta {
            flight_width_m: Some(350.0),
            ..MetricsDelta::default()
        };
        assert!(c.apply_metrics(&delta));
        assert_eq!(c.geometry().unwrap().buffer_m(), 42.0);
    }

    #[test]
    fn empty_delta_is_a_no_op() {
        let mut c = controller_with_default();
        let depth = c.history.undo_depth();
        assert!(!c.apply_metrics(&MetricsDelta::default()));
        assert_eq!(c.history.undo_depth(), depth);
    }

    #[test]
    fn arrow_legs_meet_at_a_right_angle() {
        let mut c = controller_with_default();
        // Rotate the take-off rectangle so the depth axis is oblique.
        let delta = MetricsDelta {
            rect_rotation_deg: Some(120.0),
            ..MetricsDelta::default()
        };
        c.apply_metrics(&delta);

        let arrow = c
            .overlays()
            .iter()
            .find_map(|(_, o)| match &o.kind {
                crate::overlay::OverlayKind::Polyline { path }
                    if o.z_index == z::ARROW && path.len() == 3 =>
                {
                    Some(path.clone())
                }
                _ => None,
            })
            .unwrap();

        let a = arrow[0].to_local_xy(arrow[1]);
        let b = arrow[1].to_local_xy(arrow[2]);
        if a.norm() > 1.0 && b.norm() > 1.0 {
            let cos = a.dot(&b) / (a.norm() * b.norm());
            assert!(cos.abs() < 1e-3, "legs not perpendicular: cos={cos}");
        }
        // The arrow ends at the flight center.
        let flight_center = c.geometry().unwrap().flight_area.as_ref().unwrap().center;
        assert_relative_eq!(arrow[2].lng, flight_center.lng, epsilon = 1e-9);
        assert_relative_eq!(arrow[2].lat, flight_center.lat, epsilon = 1e-9);
    }

    #[test]
    fn reference_click_moves_the_arrow_origin() {
        let mut c = controller_with_default();
        let rect = c.geometry().unwrap().takeoff_area.as_ref().unwrap().clone();
        let old_reference = rect.reference_corner().unwrap();

        let marker = c
            .overlays()
            .find_role(HandleRole::Corner {
                shape: ShapeKind::Takeoff,
                index: rect.reference_index(),
            })
            .unwrap();
        assert!(c.pointer_click(marker));

        let arrow = c
            .overlays()
            .iter()
            .find_map(|(_, o)| match &o.kind {
                crate::overlay::OverlayKind::Polyline { path } if o.z_index == z::ARROW => {
                    Some(path.clone())
                }
                _ => None,
            })
            .unwrap();
        let new_reference = c
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .reference_corner()
            .unwrap();
        assert_eq!(arrow[0], new_reference);
        assert_ne!(arrow[0], old_reference);
    }

    #[test]
    fn session_switch_clears_history() {
        let mut c = controller_with_default();
        assert!(c.can_undo());
        let other = Uuid::new_v4();
        c.bind_session(other, Some(Geometry::default_at(LngLat::new(140.0, 36.0))));
        assert!(!c.can_undo());
        assert_eq!(c.session(), Some(other));

        // Re-binding the same session keeps whatever history accrued.
        c.delete_current_geometry();
        assert!(c.can_undo());
        c.bind_session(other, None);
        assert!(c.can_undo());
    }

    #[test]
    fn fit_covers_the_safety_ring() {
        let viewport = FixedViewport::new(LngLat::new(139.7, 35.6), 15.0);
        let mut c = GeometryController::new(viewport);
        let geom = Geometry::default_at(LngLat::new(139.7, 35.6));
        c.render_geometry(Some(geom.clone()), RenderOptions { fit: true, clear_history: false });

        let (sw, ne) = c.viewport().last_fit.unwrap();
        let flight = geom.flight_area.as_ref().unwrap();
        let reach = flight.radius_x_m + geom.buffer_m();
        let east = flight.center.to_local_xy(LngLat::new(ne.lng, flight.center.lat));
        assert!(east.x >= reach - 0.5);
        let west = flight.center.to_local_xy(LngLat::new(sw.lng, flight.center.lat));
        assert!(west.x <= -(reach - 0.5));
    }

    #[test]
    fn metrics_include_distance_and_both_table_rows() {
        let c = controller_with_default();
        let m = c.metrics();
        assert_relative_eq!(
            m.flight_to_audience_distance_m.unwrap(),
            200.0,
            epsilon = 0.1
        );
        // Default max altitude 120 m.
        assert_eq!(m.safety_distance_new_m, Some(27.5));
        assert_eq!(m.safety_distance_old_m, Some(44.0));
        assert_eq!(m.safety_distance_m, Some(27.5));
    }

    #[test]
    fn rotating_both_shapes_updates_the_turn_report() {
        let mut c = controller_with_default();
        let report = c.last_turn_report().unwrap();
        // Default rectangle and ellipse both face a known direction, the
        // comparison exists right after render.
        assert!(report.turn_angle_deg <= 180.0);

        let delta = MetricsDelta {
            flight_rotation_deg: Some(90.0),
            ..MetricsDelta::default()
        };
        c.apply_metrics(&delta);
        let after = c.last_turn_report().unwrap();
        assert_eq!(after.ellipse_bearing_deg, 90.0);
    }

    #[test]
    fn takeoff_resize_via_panel_round_trips() {
        let mut c = controller_with_default();
        let delta = MetricsDelta {
            rect_width_m: Some(55.0),
            rect_depth_m: Some(14.0),
            ..MetricsDelta::default()
        };
        assert!(c.apply_metrics(&delta));
        let edges = c
            .geometry()
            .unwrap()
            .takeoff_area
            .as_ref()
            .unwrap()
            .right_left_edges()
            .unwrap();
        assert_relative_eq!(edges.right_m, 55.0, epsilon = 1e-3);
        assert_relative_eq!(edges.left_m, 14.0, epsilon = 1e-3);
    }
}
