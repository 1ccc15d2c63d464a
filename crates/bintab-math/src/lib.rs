#![warn(missing_docs)]

//! Math types for the bintab label-tab generator.
//!
//! Thin wrappers around nalgebra providing the point, vector and
//! direction types used by sketches and bodies, plus tolerance
//! constants and an axis-aligned bounding box.

use nalgebra::{Unit, Vector2, Vector3};

/// A point in 3D model space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D sketch space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default CAD tolerances (1e-6 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two sketch points are coincident within tolerance.
    pub fn points2_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Unsigned angle between two 2D vectors, in `[0, π]`.
///
/// Uses `atan2(|a × b|, a · b)`, which stays accurate for nearly
/// parallel vectors where `acos` loses precision.
pub fn angle_between(a: &Vec2, b: &Vec2) -> f64 {
    let cross = a.x * b.y - a.y * b.x;
    cross.abs().atan2(a.dot(b))
}

/// 2D cross product (z component of the 3D cross product).
pub fn cross2(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl BoundingBox3 {
    /// Create a bounding box from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) box suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing all `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.include_point(p);
        }
        bbox
    }

    /// True if no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this box to include another box.
    pub fn include_box(&mut self, other: &BoundingBox3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// This box translated by `offset`.
    pub fn translated(&self, offset: &Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::zeros();
        }
        self.max - self.min
    }
}
