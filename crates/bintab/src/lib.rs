#![warn(missing_docs)]

//! bintab - label-tab synthesizer for storage bins.
//!
//! A label tab is a small ledge on the inside of a bin wall that carries a
//! printed label. Given a [`TabParameters`] value, [`create_tab_body`]
//! derives the tab's cross-section, closes it into a profile loop, extrudes
//! it through a [`GeometryBackend`], and fillets the free tip.
//!
//! Two profile methods exist:
//!
//! - [`TabMethod::Angle`]: a right triangle whose underside makes a given
//!   overhang angle with the wall, sized so that the rounded tip still
//!   reaches the requested width.
//! - [`TabMethod::Dimensions`]: a quadrilateral with explicit thickness at
//!   the wall and at the tip, optionally blended into the wall with a back
//!   fillet.
//!
//! # Example
//!
//! ```
//! use bintab::{create_tab_body, TabParameters};
//! use bintab_kernel::{GeometryBackend, PrismKernel};
//! use bintab_math::Point3;
//!
//! let params = TabParameters::builder()
//!     .origin(Point3::new(0.0, 0.0, 4.2))
//!     .width(1.2)
//!     .length(4.2)
//!     .dimensions(0.14, 0.14)
//!     .build()
//!     .unwrap();
//!
//! let mut kernel = PrismKernel::new();
//! let tab = create_tab_body(&params, &mut kernel).unwrap();
//! let bbox = kernel.bounding_box(tab.body).unwrap();
//! assert!((bbox.extent().y - 1.2).abs() < 1e-9);
//! ```

pub mod config;
mod edges;
mod error;
mod generator;
mod loops;
mod params;
mod points;

pub use bintab_kernel::GeometryBackend;
pub use config::{ConfigError, FilletConfig, MethodConfig, TabConfig};
pub use edges::{classify_tip_edges, TipEdges};
pub use error::{BuildStep, ErrorKind, Result, TabError};
pub use generator::{
    create_tab_body, FilletFeature, TabBody, BODY_NAME, FILLET_BOTTOM_NAME, FILLET_TIP_NAME,
    FILLET_TOP_NAME,
};
pub use loops::{assemble_loop, BackFillet, TabLoop};
pub use params::{
    fillet_enabled, TabFillets, TabMethod, TabParameters, TabParametersBuilder, ANGLE_TOLERANCE,
    AXIS_TOLERANCE, DEFAULT_FILLET_BACK, DEFAULT_LABEL_ANGLE, DEFAULT_OVERHANG_ANGLE,
    DEFAULT_ROOT_THICKNESS, DEFAULT_TIP_THICKNESS, EDGE_FILLET_RADIUS, FILLET_EPSILON,
    TIP_TOLERANCE, WALL_EPSILON, WALL_EXTENSION_FACTOR, WALL_EXTENSION_MARGIN,
};
pub use points::{derive_points, verify_overhang_angle, AngleTriangle, DimensionQuad, TabPoints};
