#![warn(missing_docs)]

//! Sketch profiles for the bintab generator.
//!
//! A [`SketchProfile`] is a closed loop of line and arc segments on a
//! plane in 3D. Profiles are what a geometry backend extrudes into
//! solid bodies. The [`fillet`] module provides the analytic tangent-arc
//! construction used both for the tab's back fillet and for rounding
//! profile corners.
//!
//! # Example
//!
//! ```
//! use bintab_sketch::SketchProfile;
//! use bintab_math::{Point3, Vec3};
//!
//! let profile = SketchProfile::rectangle(
//!     Point3::origin(),
//!     Vec3::y(),
//!     Vec3::z(),
//!     10.0,
//!     5.0,
//! )
//! .unwrap();
//! assert!((profile.area() - 50.0).abs() < 1e-12);
//! ```

pub mod fillet;
mod profile;

pub use fillet::{tangent_arc, CornerFillet, FilletedProfile};
pub use profile::{SketchProfile, SketchSegment};

use thiserror::Error;

/// Errors from sketch construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SketchError {
    /// The profile is not closed (gap between consecutive segments).
    #[error("profile is not closed: gap of {0:.6}")]
    NotClosed(f64),

    /// A segment is degenerate (zero length).
    #[error("degenerate segment at index {0}")]
    DegenerateSegment(usize),

    /// Profile has no segments.
    #[error("profile has no segments")]
    EmptyProfile,

    /// Fillet radius is not a positive finite number.
    #[error("invalid fillet radius: {0}")]
    InvalidRadius(f64),

    /// The two legs of a corner are collinear or zero length.
    #[error("corner is degenerate (legs are collinear or empty)")]
    DegenerateCorner,

    /// The tangent points would fall outside the corner's legs.
    #[error("fillet radius {radius} needs tangent length {needed:.6}, only {available:.6} available")]
    FilletTooLarge {
        /// Requested radius.
        radius: f64,
        /// Distance from the corner to each tangent point.
        needed: f64,
        /// Length of the shorter leg.
        available: f64,
    },

    /// A profile vertex index is out of range.
    #[error("vertex {0} is out of range")]
    VertexOutOfRange(usize),

    /// A corner touches an arc; only line-line corners can be filleted.
    #[error("vertex {0} is not a corner between two line segments")]
    NotLineCorner(usize),
}

/// Result type for sketch operations.
pub type Result<T> = std::result::Result<T, SketchError>;
