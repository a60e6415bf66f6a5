//! Error types for the geometry wire format.
//!
//! The engine itself recovers locally from malformed geometry (short
//! coordinate arrays, non-finite radii) by no-oping or clamping; typed
//! errors only appear at the serialization boundary.

use thiserror::Error;

/// Errors raised when parsing or validating a persisted Geometry record.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// The record is not valid JSON or does not match the schema.
    #[error("invalid geometry JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A rectangle area carries fewer than the four required corners.
    #[error("{area} rectangle requires 4 coordinates, got {count}")]
    ShortRectangle {
        /// Which area the rectangle belongs to ("takeoffArea" / "audienceArea").
        area: &'static str,
        /// The number of coordinates actually present.
        count: usize,
    },

    /// A numeric field that must be finite is NaN or infinite.
    #[error("non-finite value in field {field}")]
    NonFinite {
        /// The offending field name, wire-format spelling.
        field: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, GeometryError>;
