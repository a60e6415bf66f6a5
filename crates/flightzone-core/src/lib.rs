//! # Flightzone Core
//!
//! Geometry model for drone-show operating areas. This crate holds the
//! map-independent pieces: the local planar projection, the oriented
//! rectangle/ellipse math, the persisted `Geometry` aggregate with its
//! JSON wire format, the safety-distance tables, and the metrics read
//! model shared with the panel.
//!
//! ## Core Components
//!
//! - **Projection**: equirectangular local-tangent frame, meters east/north
//! - **Oriented shapes**: center + size + rotation, corner loops
//! - **Geometry**: take-off / flight / safety / audience areas, altitudes
//! - **Safety tables**: altitude to ground-risk-buffer lookup, new and old
//! - **Metrics**: partial read/write models exchanged with the panel
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flightzone_core::{Geometry, LngLat};
//!
//! let geom = Geometry::default_at(LngLat::new(139.7454, 35.6586));
//! let json = geom.to_json()?;
//! ```

pub mod constants;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod oriented;
pub mod projection;
pub mod safety;

pub use error::{GeometryError, Result};
pub use geometry::{EllipseGeom, Geometry, RectangleGeom, RightLeftEdges, SafetyArea};
pub use metrics::{GeometryMetrics, MetricsDelta};
pub use oriented::OrientedRect;
pub use projection::{GeoBounds, LngLat};
pub use safety::{SafetyLookup, SafetyMode};
