//! Map-agnostic overlay store.
//!
//! Editors never talk to a concrete map SDK. They emit overlays (polygons,
//! polylines, markers, labels) into an [`OverlayStore`], and the embedding
//! layer mirrors the store onto whatever map it runs on. Each interactive
//! overlay carries a [`HandleRole`] so pointer events can be routed back
//! without string matching.

use std::collections::BTreeMap;

use flightzone_core::LngLat;

pub type OverlayId = u64;

/// Which of the four areas an overlay belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Takeoff,
    Flight,
    Safety,
    Audience,
}

/// The interactive meaning of an overlay. Non-interactive overlays (the
/// safety ring, labels, the directional arrow) carry no role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleRole {
    /// The shape body itself; dragging it translates the shape.
    Body(ShapeKind),
    /// A rectangle corner marker.
    Corner { shape: ShapeKind, index: usize },
    /// The rotation handle floating off the shape edge.
    Rotate(ShapeKind),
    /// The ellipse center marker.
    Center,
    /// Flight-ellipse radius handle on the rotated X axis.
    RadiusX,
    /// Flight-ellipse radius handle on the rotated Y axis.
    RadiusY,
    /// Safety-ring radius handle on the rotated X axis.
    SafetyRadiusX,
    /// Safety-ring radius handle on the rotated Y axis.
    SafetyRadiusY,
}

/// Pointer cursor requested while hovering an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Pointer,
    Grab,
    Move,
    Crosshair,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayKind {
    Polygon { path: Vec<LngLat> },
    Polyline { path: Vec<LngLat> },
    Marker { position: LngLat },
    Label { position: LngLat, text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub role: Option<HandleRole>,
    pub z_index: i64,
    pub draggable: bool,
    pub clickable: bool,
    pub visible: bool,
    pub cursor: Option<Cursor>,
}

impl Overlay {
    pub fn polygon(path: Vec<LngLat>, z_index: i64) -> Self {
        Self {
            kind: OverlayKind::Polygon { path },
            role: None,
            z_index,
            draggable: false,
            clickable: false,
            visible: true,
            cursor: None,
        }
    }

    pub fn polyline(path: Vec<LngLat>, z_index: i64) -> Self {
        Self {
            kind: OverlayKind::Polyline { path },
            ..Self::polygon(Vec::new(), z_index)
        }
    }

    pub fn marker(position: LngLat, z_index: i64) -> Self {
        Self {
            kind: OverlayKind::Marker { position },
            ..Self::polygon(Vec::new(), z_index)
        }
    }

    pub fn label(position: LngLat, text: impl Into<String>, z_index: i64) -> Self {
        Self {
            kind: OverlayKind::Label {
                position,
                text: text.into(),
            },
            ..Self::polygon(Vec::new(), z_index)
        }
    }

    pub fn with_role(mut self, role: HandleRole) -> Self {
        self.role = Some(role);
        self.draggable = true;
        self.clickable = true;
        self
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Id-keyed overlay collection with stable iteration order.
#[derive(Debug, Default)]
pub struct OverlayStore {
    next_id: OverlayId,
    overlays: BTreeMap<OverlayId, Overlay>,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, overlay: Overlay) -> OverlayId {
        let id = self.next_id;
        self.next_id += 1;
        self.overlays.insert(id, overlay);
        id
    }

    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }

    pub fn get_mut(&mut self, id: OverlayId) -> Option<&mut Overlay> {
        self.overlays.get_mut(&id)
    }

    pub fn remove(&mut self, id: OverlayId) -> Option<Overlay> {
        self.overlays.remove(&id)
    }

    pub fn clear(&mut self) {
        self.overlays.clear();
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverlayId, &Overlay)> {
        self.overlays.iter().map(|(id, o)| (*id, o))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (OverlayId, &mut Overlay)> {
        self.overlays.iter_mut().map(|(id, o)| (*id, o))
    }

    /// The interactive role attached to an overlay, if any.
    pub fn role_of(&self, id: OverlayId) -> Option<HandleRole> {
        self.overlays.get(&id).and_then(|o| o.role)
    }

    /// First overlay carrying the given role.
    pub fn find_role(&self, role: HandleRole) -> Option<OverlayId> {
        self.overlays
            .iter()
            .find(|(_, o)| o.role == Some(role))
            .map(|(id, _)| *id)
    }

    /// Removes every overlay whose role (or lack of one) matches `pred`.
    pub fn retain(&mut self, mut pred: impl FnMut(&Overlay) -> bool) {
        self.overlays.retain(|_, o| pred(o));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut store = OverlayStore::new();
        let a = store.insert(Overlay::marker(LngLat::new(0.0, 0.0), 0));
        let b = store.insert(Overlay::marker(LngLat::new(1.0, 1.0), 0));
        assert!(b > a);
        store.remove(a);
        let c = store.insert(Overlay::marker(LngLat::new(2.0, 2.0), 0));
        assert!(c > b);
    }

    #[test]
    fn role_lookup_round_trips() {
        let mut store = OverlayStore::new();
        let role = HandleRole::Corner {
            shape: ShapeKind::Takeoff,
            index: 2,
        };
        let id = store.insert(Overlay::marker(LngLat::new(0.0, 0.0), 1).with_role(role));
        assert_eq!(store.role_of(id), Some(role));
        assert_eq!(store.find_role(role), Some(id));
        assert_eq!(store.find_role(HandleRole::Center), None);
    }

    #[test]
    fn with_role_makes_overlay_interactive() {
        let o = Overlay::marker(LngLat::new(0.0, 0.0), 1).with_role(HandleRole::RadiusX);
        assert!(o.draggable);
        assert!(o.clickable);
    }
}
