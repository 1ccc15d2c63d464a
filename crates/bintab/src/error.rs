//! Error types for tab generation.

use std::fmt;

use bintab_kernel::BackendError;
use bintab_sketch::SketchError;
use thiserror::Error;

/// The backend step a construction failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    /// Creating the profile plane.
    Plane,
    /// Extruding the profile into the tab body.
    Extrude,
    /// Listing the body's edges for tip classification.
    EdgeQuery,
    /// Fillet on the upper tip edge.
    FilletTop,
    /// Fillet on the lower tip edge.
    FilletBottom,
    /// Fillet on a single, sharp tip edge.
    FilletTip,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildStep::Plane => "profile plane",
            BuildStep::Extrude => "extrusion",
            BuildStep::EdgeQuery => "edge query",
            BuildStep::FilletTop => "top tip fillet",
            BuildStep::FilletBottom => "bottom tip fillet",
            BuildStep::FilletTip => "tip fillet",
        };
        f.write_str(s)
    }
}

/// Coarse classification of a [`TabError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input; retrying with the same parameters cannot succeed.
    InvalidParameter,
    /// The geometry could not be built from otherwise valid input.
    GeometryConstructionFailure,
}

/// Errors from [`create_tab_body`](crate::create_tab_body) and parameter validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TabError {
    /// A parameter is out of range or incompatible with the chosen profile.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        parameter: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The overhang line does not make the requested angle with the root line.
    #[error("overhang angle mismatch: expected {expected:.9} rad, constructed {actual:.9} rad")]
    AngleMismatch {
        /// Requested overhang angle.
        expected: f64,
        /// Angle measured on the constructed profile.
        actual: f64,
    },

    /// The assembled loop is not a valid closed profile.
    #[error("profile construction failed: {0}")]
    Profile(#[from] SketchError),

    /// The backend refused a construction step.
    #[error("{step} failed: {source}")]
    Construction {
        /// Step that failed.
        step: BuildStep,
        /// Backend error, unchanged.
        source: BackendError,
    },
}

impl TabError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        TabError::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TabError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            TabError::AngleMismatch { .. }
            | TabError::Profile(_)
            | TabError::Construction { .. } => ErrorKind::GeometryConstructionFailure,
        }
    }
}

/// Result type for tab generation.
pub type Result<T> = std::result::Result<T, TabError>;
