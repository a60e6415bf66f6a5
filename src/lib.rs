//! # Flightzone
//!
//! Operating-area geometry for drone-show planning: an oriented flight
//! ellipse with a derived safety ring, a take-off rectangle with a
//! reference corner, and an audience rectangle, all editable on a map.
//!
//! ## Architecture
//!
//! The workspace is organized as:
//!
//! 1. **flightzone-core** - projection, oriented-shape math, the persisted
//!    `Geometry` aggregate, safety-distance tables, metrics models
//! 2. **flightzone-editor** - overlay store, the three shape editors, the
//!    geometry controller with undo/redo
//! 3. **flightzone** - this crate: re-exports plus the head-less renderer
//!    binary

pub use flightzone_core as core;
pub use flightzone_editor as editor;

pub use flightzone_core::{
    EllipseGeom, GeoBounds, Geometry, GeometryError, GeometryMetrics, LngLat, MetricsDelta,
    OrientedRect, RectangleGeom, Result, SafetyArea, SafetyLookup, SafetyMode,
};

pub use flightzone_editor::{
    DragPhase, FixedViewport, GeometryController, HandleRole, MapViewport, Overlay, OverlayStore,
    PointerEvent, RenderOptions, ShapeKind, TurnReport, UndoHistory,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
