//! # Flightzone Editor
//!
//! Interactive editing of operating-area geometry on a map. The crate is
//! map-SDK agnostic: editors render into an overlay store and receive
//! pointer events back by overlay id; the embedding mirrors the store onto
//! the actual map widget.
//!
//! ## Core Components
//!
//! - **Controller**: owns the geometry, routes events, records undo
//! - **Editors**: take-off rectangle, flight ellipse + safety ring,
//!   audience rectangle
//! - **Overlay store**: polygons, polylines, markers and labels with roles
//! - **History**: bounded snapshot-based undo/redo
//! - **Orientation**: rectangle/ellipse bearing comparison reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flightzone_editor::{FixedViewport, GeometryController};
//! use flightzone_core::LngLat;
//!
//! let viewport = FixedViewport::new(LngLat::new(139.7454, 35.6586), 15.0);
//! let mut controller = GeometryController::new(viewport);
//! controller.create_default_geometry();
//! ```

pub mod audience_editor;
pub mod controller;
pub mod ellipse_editor;
pub mod history;
pub mod host;
pub mod orientation;
pub mod overlay;
pub mod rect_editor;

pub use audience_editor::AudienceEditor;
pub use controller::{FixedViewport, GeometryController, RenderOptions};
pub use ellipse_editor::{EllipseEditor, RedrawOptions};
pub use history::UndoHistory;
pub use host::{BearingSource, DragPhase, MapViewport, MetricsSink, PointerEvent, ShapeHost};
pub use orientation::{OrientationTracker, TurnDirection, TurnReport};
pub use overlay::{Cursor, HandleRole, Overlay, OverlayId, OverlayKind, OverlayStore, ShapeKind};
pub use rect_editor::RectEditor;
