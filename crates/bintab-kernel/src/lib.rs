#![warn(missing_docs)]

//! Geometry construction backend for the bintab generator.
//!
//! The tab synthesizer never talks to a modeling kernel directly. It drives
//! a [`GeometryBackend`]: create a profile plane, extrude a closed
//! [`SketchProfile`](bintab_sketch::SketchProfile) into a new body, list
//! that body's edges, and fillet selected edges.
//!
//! [`PrismKernel`] is a self-contained implementation for prismatic bodies
//! (a planar loop of lines and arcs swept along its normal), which is all a
//! label tab ever is.
//!
//! # Example
//!
//! ```
//! use bintab_kernel::{BasePlane, GeometryBackend, PrismKernel};
//! use bintab_sketch::SketchProfile;
//!
//! let mut kernel = PrismKernel::new();
//! let plane = kernel.offset_plane(BasePlane::YZ, 0.0).unwrap();
//! let profile = SketchProfile::rectangle(plane.origin, plane.x_dir, plane.y_dir, 2.0, 1.0).unwrap();
//! let body = kernel.extrude(&profile, 3.0, "block").unwrap();
//! assert!((kernel.volume(body).unwrap() - 6.0).abs() < 1e-12);
//! ```

mod backend;
mod prism;

pub use backend::{
    BasePlane, BodyEdge, BodyId, EdgeId, EdgeKind, Feature, FeatureKind, GeometryBackend,
    SketchPlane,
};
pub use prism::PrismKernel;

use bintab_sketch::SketchError;
use thiserror::Error;

/// Errors reported by a geometry backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// The body handle does not refer to a live body.
    #[error("unknown body")]
    UnknownBody,

    /// The edge does not belong to the body.
    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),

    /// Extrusion distance must be positive and finite.
    #[error("invalid extrusion distance: {0}")]
    InvalidDistance(f64),

    /// A fillet was requested without any edges.
    #[error("no edges selected")]
    NoEdges,

    /// The edge exists but this backend cannot fillet it.
    #[error("edge {0} cannot be filleted by this backend")]
    UnsupportedEdge(EdgeId),

    /// The fillet could not be constructed on the local geometry.
    #[error("fillet on edge {edge} failed: {source}")]
    FilletFailed {
        /// Edge being filleted.
        edge: EdgeId,
        /// Underlying construction failure.
        source: SketchError,
    },

    /// Host-specific refusal with a free-form reason.
    #[error("backend rejected operation: {0}")]
    Rejected(String),
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
