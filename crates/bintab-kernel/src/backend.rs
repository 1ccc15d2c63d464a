//! The backend contract and the handle/record types it exchanges.

use std::fmt;

use bintab_math::{BoundingBox3, Point3, Vec3};
use bintab_sketch::SketchProfile;
use slotmap::new_key_type;

use crate::Result;

new_key_type! {
    /// Handle to a solid body owned by a backend.
    pub struct BodyId;
}

/// Identifier of a body edge. Stable for as long as the edge survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// The three principal construction planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasePlane {
    /// Spanned by X and Y, normal +Z.
    XY,
    /// Spanned by Y and Z, normal +X.
    YZ,
    /// Spanned by X and Z, normal −Y.
    XZ,
}

impl BasePlane {
    /// Local (x, y) axes of the plane in model space.
    pub fn axes(self) -> (Vec3, Vec3) {
        match self {
            BasePlane::XY => (Vec3::x(), Vec3::y()),
            BasePlane::YZ => (Vec3::y(), Vec3::z()),
            BasePlane::XZ => (Vec3::x(), Vec3::z()),
        }
    }
}

/// A construction plane a profile can be sketched on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchPlane {
    /// Sketch origin in model space.
    pub origin: Point3,
    /// Model direction of the sketch X axis.
    pub x_dir: Vec3,
    /// Model direction of the sketch Y axis.
    pub y_dir: Vec3,
}

impl SketchPlane {
    /// Plane parallel to `base`, shifted by `offset` along its normal.
    pub fn offset_from(base: BasePlane, offset: f64) -> Self {
        let (x_dir, y_dir) = base.axes();
        let normal = x_dir.cross(&y_dir);
        Self {
            origin: Point3::origin() + normal * offset,
            x_dir,
            y_dir,
        }
    }

    /// Unit normal (x_dir × y_dir); positive extrusion direction.
    pub fn normal(&self) -> Vec3 {
        self.x_dir.cross(&self.y_dir).normalize()
    }
}

/// Geometry of a body edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeKind {
    /// Straight edge.
    Line,
    /// Circular edge.
    Arc {
        /// Center of the circle.
        center: Point3,
        /// Radius of the circle.
        radius: f64,
    },
}

/// An edge of a body as reported by [`GeometryBackend::body_edges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyEdge {
    /// Edge identifier, valid for [`GeometryBackend::fillet`].
    pub id: EdgeId,
    /// Line or arc.
    pub kind: EdgeKind,
    /// Start point.
    pub start: Point3,
    /// End point.
    pub end: Point3,
    /// Axis-aligned bounds of the edge.
    pub bounding_box: BoundingBox3,
}

impl BodyEdge {
    /// Vector from start to end.
    pub fn chord(&self) -> Vec3 {
        self.end - self.start
    }

    /// True for a straight edge whose direction is parallel to `axis`,
    /// measured as the sine of the angle between them.
    pub fn is_parallel_to(&self, axis: &Vec3, tolerance: f64) -> bool {
        if !matches!(self.kind, EdgeKind::Line) {
            return false;
        }
        let chord = self.chord();
        let (len, axis_len) = (chord.norm(), axis.norm());
        if len == 0.0 || axis_len == 0.0 {
            return false;
        }
        chord.cross(axis).norm() / (len * axis_len) < tolerance
    }
}

/// A modeling operation recorded in a backend's history.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Feature name as given by the caller.
    pub name: String,
    /// What the feature did.
    pub kind: FeatureKind,
}

/// Kind and parameters of a recorded feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureKind {
    /// Construction plane offset from a base plane.
    Plane {
        /// Base plane.
        base: BasePlane,
        /// Offset along the base normal.
        offset: f64,
    },
    /// New body by linear extrusion.
    Extrude {
        /// Created body.
        body: BodyId,
        /// Extrusion distance.
        distance: f64,
    },
    /// Constant-radius fillet.
    Fillet {
        /// Modified body.
        body: BodyId,
        /// Filleted edges.
        edges: Vec<EdgeId>,
        /// Fillet radius.
        radius: f64,
    },
}

/// Geometry construction capabilities the tab generator depends on.
///
/// Calls are strictly sequential; every later step depends on the body
/// produced by the previous one. Constraint bookkeeping is not part of the
/// contract because profiles arrive with all points already resolved.
pub trait GeometryBackend {
    /// Create a construction plane offset from `base` by `offset`.
    fn offset_plane(&mut self, base: BasePlane, offset: f64) -> Result<SketchPlane>;

    /// Extrude the profile's region by `distance` along its normal into a
    /// new, unmerged body.
    fn extrude(&mut self, profile: &SketchProfile, distance: f64, name: &str) -> Result<BodyId>;

    /// All edges of `body`.
    fn body_edges(&self, body: BodyId) -> Result<Vec<BodyEdge>>;

    /// Apply one constant-radius fillet feature to `edges` of `body`.
    fn fillet(&mut self, body: BodyId, edges: &[EdgeId], radius: f64, name: &str) -> Result<()>;

    /// Axis-aligned bounds of `body`.
    fn bounding_box(&self, body: BodyId) -> Result<BoundingBox3>;

    /// Enclosed volume of `body`.
    fn volume(&self, body: BodyId) -> Result<f64>;
}
