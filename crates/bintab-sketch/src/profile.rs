//! 2D sketch profile types.

use std::f64::consts::{FRAC_PI_2, TAU};

use bintab_math::{cross2, Dir3, Point2, Point3, Tolerance, Vec2, Vec3};

use crate::{Result, SketchError};

/// A segment of a 2D sketch profile.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchSegment {
    /// A line segment from start to end.
    Line {
        /// Start point in 2D sketch coordinates.
        start: Point2,
        /// End point in 2D sketch coordinates.
        end: Point2,
    },
    /// A circular arc from start to end around a center.
    Arc {
        /// Start point in 2D sketch coordinates.
        start: Point2,
        /// End point in 2D sketch coordinates.
        end: Point2,
        /// Center of the arc in 2D sketch coordinates.
        center: Point2,
        /// If true, arc goes counter-clockwise from start to end.
        ccw: bool,
    },
}

impl SketchSegment {
    /// Line segment between two points.
    pub fn line(start: Point2, end: Point2) -> Self {
        SketchSegment::Line { start, end }
    }

    /// Get the start point of this segment.
    pub fn start(&self) -> Point2 {
        match self {
            SketchSegment::Line { start, .. } => *start,
            SketchSegment::Arc { start, .. } => *start,
        }
    }

    /// Get the end point of this segment.
    pub fn end(&self) -> Point2 {
        match self {
            SketchSegment::Line { end, .. } => *end,
            SketchSegment::Arc { end, .. } => *end,
        }
    }

    /// Check if this segment is degenerate (zero length).
    pub fn is_degenerate(&self) -> bool {
        let tol = Tolerance::DEFAULT;
        match self {
            SketchSegment::Line { start, end } => (end - start).norm() < tol.linear,
            SketchSegment::Arc {
                start, end, center, ..
            } => {
                let r1 = (start - center).norm();
                let r2 = (end - center).norm();
                r1 < tol.linear || r2 < tol.linear || (end - start).norm() < tol.linear
            }
        }
    }

    /// The same segment shifted by `offset`.
    pub fn translated(&self, offset: &Vec2) -> Self {
        match self {
            SketchSegment::Line { start, end } => SketchSegment::Line {
                start: start + offset,
                end: end + offset,
            },
            SketchSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => SketchSegment::Arc {
                start: start + offset,
                end: end + offset,
                center: center + offset,
                ccw: *ccw,
            },
        }
    }

    /// Radius of an arc segment, `None` for lines.
    pub fn radius(&self) -> Option<f64> {
        match self {
            SketchSegment::Line { .. } => None,
            SketchSegment::Arc { start, center, .. } => Some((start - center).norm()),
        }
    }

    /// Get the length of this segment.
    pub fn length(&self) -> f64 {
        match self {
            SketchSegment::Line { start, end } => (end - start).norm(),
            SketchSegment::Arc { start, center, .. } => {
                (start - center).norm() * self.sweep().abs()
            }
        }
    }

    /// Signed sweep angle of an arc (positive = counter-clockwise).
    ///
    /// Always zero for lines.
    pub fn sweep(&self) -> f64 {
        match self {
            SketchSegment::Line { .. } => 0.0,
            SketchSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => {
                let d_start = start - center;
                let d_end = end - center;
                let mut angle = d_end.y.atan2(d_end.x) - d_start.y.atan2(d_start.x);
                if *ccw {
                    if angle < 0.0 {
                        angle += TAU;
                    }
                } else if angle > 0.0 {
                    angle -= TAU;
                }
                angle
            }
        }
    }

    /// Unit tangent at the start point, in the direction of travel.
    pub fn start_tangent(&self) -> Vec2 {
        match self {
            SketchSegment::Line { start, end } => (end - start).normalize(),
            SketchSegment::Arc {
                start, center, ccw, ..
            } => arc_tangent(start - center, *ccw),
        }
    }

    /// Unit tangent at the end point, in the direction of travel.
    pub fn end_tangent(&self) -> Vec2 {
        match self {
            SketchSegment::Line { start, end } => (end - start).normalize(),
            SketchSegment::Arc {
                end, center, ccw, ..
            } => arc_tangent(end - center, *ccw),
        }
    }

    /// Contribution of this segment to the loop's signed area
    /// (`½∮ x dy − y dx`, Green's theorem).
    pub fn area_contribution(&self) -> f64 {
        match self {
            SketchSegment::Line { start, end } => 0.5 * cross2(&start.coords, &end.coords),
            SketchSegment::Arc {
                start, end, center, ..
            } => {
                let r = (start - center).norm();
                0.5 * (cross2(&center.coords, &(end - start)) + r * r * self.sweep())
            }
        }
    }

    /// 2D bounding rectangle `(min, max)`, including arc extremes.
    pub fn bounds(&self) -> (Point2, Point2) {
        let (s, e) = (self.start(), self.end());
        let mut min = Point2::new(s.x.min(e.x), s.y.min(e.y));
        let mut max = Point2::new(s.x.max(e.x), s.y.max(e.y));

        if let SketchSegment::Arc { center, .. } = self {
            let r = (s - center).norm();
            let start_angle = (s.y - center.y).atan2(s.x - center.x);
            let sweep = self.sweep();
            for k in 0..4 {
                let theta = k as f64 * FRAC_PI_2;
                let offset = if sweep >= 0.0 {
                    (theta - start_angle).rem_euclid(TAU)
                } else {
                    (start_angle - theta).rem_euclid(TAU)
                };
                if offset <= sweep.abs() {
                    let p = center + r * Vec2::new(theta.cos(), theta.sin());
                    min = Point2::new(min.x.min(p.x), min.y.min(p.y));
                    max = Point2::new(max.x.max(p.x), max.y.max(p.y));
                }
            }
        }

        (min, max)
    }
}

fn arc_tangent(radial: Vec2, ccw: bool) -> Vec2 {
    let t = Vec2::new(-radial.y, radial.x).normalize();
    if ccw {
        t
    } else {
        -t
    }
}

/// A closed 2D profile on a sketch plane.
///
/// The profile is defined in a local 2D coordinate system with an origin
/// point in 3D and two orthogonal direction vectors (x_dir, y_dir).
#[derive(Debug, Clone)]
pub struct SketchProfile {
    /// Origin point of the sketch plane in 3D.
    pub origin: Point3,
    /// Unit vector along the local X axis.
    pub x_dir: Dir3,
    /// Unit vector along the local Y axis.
    pub y_dir: Dir3,
    /// Unit normal to the sketch plane (x_dir × y_dir).
    pub normal: Dir3,
    /// The segments forming the closed profile.
    pub segments: Vec<SketchSegment>,
}

impl SketchProfile {
    /// Create a new sketch profile.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The profile has no segments
    /// - Any segment is degenerate
    /// - The profile is not closed (start of first segment != end of last segment)
    pub fn new(
        origin: Point3,
        x_dir: Vec3,
        y_dir: Vec3,
        segments: Vec<SketchSegment>,
    ) -> Result<Self> {
        let (first, last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SketchError::EmptyProfile),
        };

        for (i, seg) in segments.iter().enumerate() {
            if seg.is_degenerate() {
                return Err(SketchError::DegenerateSegment(i));
            }
        }

        let tol = Tolerance::DEFAULT;
        let gap = (last.end() - first.start()).norm();
        if gap > tol.linear {
            return Err(SketchError::NotClosed(gap));
        }

        for pair in segments.windows(2) {
            let continuity_gap = (pair[1].start() - pair[0].end()).norm();
            if continuity_gap > tol.linear {
                return Err(SketchError::NotClosed(continuity_gap));
            }
        }

        let x = Dir3::new_normalize(x_dir);
        let y = Dir3::new_normalize(y_dir);
        let n = Dir3::new_normalize(x_dir.cross(&y_dir));

        Ok(Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal: n,
            segments,
        })
    }

    /// Create a closed polygon through `points` (last point joins the first).
    pub fn polygon(origin: Point3, x_dir: Vec3, y_dir: Vec3, points: &[Point2]) -> Result<Self> {
        let n = points.len();
        let segments = (0..n)
            .map(|i| SketchSegment::line(points[i], points[(i + 1) % n]))
            .collect();
        Self::new(origin, x_dir, y_dir, segments)
    }

    /// Create a rectangular profile.
    ///
    /// The rectangle has corners at:
    /// - `(0, 0)`, `(width, 0)`, `(width, height)`, `(0, height)` in local coords
    ///
    /// Segments go counter-clockwise when viewed from the +normal direction.
    pub fn rectangle(
        origin: Point3,
        x_dir: Vec3,
        y_dir: Vec3,
        width: f64,
        height: f64,
    ) -> Result<Self> {
        Self::polygon(
            origin,
            x_dir,
            y_dir,
            &[
                Point2::new(0.0, 0.0),
                Point2::new(width, 0.0),
                Point2::new(width, height),
                Point2::new(0.0, height),
            ],
        )
    }

    /// Map a 2D point in sketch coordinates to 3D.
    pub fn to_3d(&self, p: Point2) -> Point3 {
        self.origin + p.x * self.x_dir.as_ref() + p.y * self.y_dir.as_ref()
    }

    /// Signed enclosed area (positive when the loop runs counter-clockwise).
    pub fn signed_area(&self) -> f64 {
        self.segments.iter().map(|s| s.area_contribution()).sum()
    }

    /// Enclosed area, independent of loop direction.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// 2D bounding rectangle `(min, max)` of the whole loop.
    pub fn bounds_2d(&self) -> (Point2, Point2) {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for seg in &self.segments {
            let (lo, hi) = seg.bounds();
            min = Point2::new(min.x.min(lo.x), min.y.min(lo.y));
            max = Point2::new(max.x.max(hi.x), max.y.max(hi.y));
        }
        (min, max)
    }

    /// The arc segments of the profile.
    pub fn arcs(&self) -> impl Iterator<Item = &SketchSegment> {
        self.segments
            .iter()
            .filter(|s| matches!(s, SketchSegment::Arc { .. }))
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the profile is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
