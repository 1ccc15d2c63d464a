//! Loop assembly: connect derived corners into one closed profile loop.
//!
//! An ANGLE-mode triangle and a DIMENSIONS-mode quad without back fillet
//! close with straight edges only. With a back fillet the bottom/back
//! corner is replaced by a tangent arc that blends the underside into the
//! wall below the tab:
//!
//! ```text
//!   top_back ●───────────────● top_front
//!            │               │
//!            │               ● bottom_front
//!  (wall)    │        ______/
//!            │   ____/ bottom
//!            │  /
//!            │ (  arc
//!            ●  wall tangent point
//! ```

use bintab_math::Point2;
use bintab_sketch::{tangent_arc, CornerFillet, SketchSegment};
use tracing::debug;

use crate::error::{Result, TabError};
use crate::params::{WALL_EPSILON, WALL_EXTENSION_FACTOR, WALL_EXTENSION_MARGIN};
use crate::points::{AngleTriangle, DimensionQuad, TabPoints};

/// A closed loop of profile segments in `(depth, height)` coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TabLoop {
    /// Segments in loop order; each ends where the next starts.
    pub segments: Vec<SketchSegment>,
    /// The back fillet, when one was built.
    pub back_fillet: Option<BackFillet>,
}

/// Construction record of a back fillet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackFillet {
    /// Far end of the temporary wall extension the arc was fitted against.
    pub wall_extension_end: Point2,
    /// Arc from the underside tangent point to the wall tangent point.
    pub fillet: CornerFillet,
    /// Where the back edge leaves the arc towards `top_back`.
    pub wall_tangent: Point2,
}

/// Assemble the closed loop for `points`.
///
/// `fillet_back` is only consulted for a [`TabPoints::Quad`]; pass `None`
/// for a sharp back corner.
///
/// # Errors
///
/// [`TabError::InvalidParameter`] on `fillet_back` when the arc does not fit
/// between the underside and the wall extension.
pub fn assemble_loop(points: &TabPoints, fillet_back: Option<f64>) -> Result<TabLoop> {
    match points {
        TabPoints::Triangle(t) => Ok(TabLoop {
            segments: triangle_loop(t),
            back_fillet: None,
        }),
        TabPoints::Quad(q) => match fillet_back {
            None => Ok(TabLoop {
                segments: vec![
                    SketchSegment::line(q.top_back, q.top_front),
                    SketchSegment::line(q.top_front, q.bottom_front),
                    SketchSegment::line(q.bottom_front, q.bottom_back),
                    SketchSegment::line(q.bottom_back, q.top_back),
                ],
                back_fillet: None,
            }),
            Some(radius) => filleted_quad_loop(q, radius),
        },
    }
}

fn triangle_loop(t: &AngleTriangle) -> Vec<SketchSegment> {
    vec![
        SketchSegment::line(t.root_top, t.root_bottom),
        SketchSegment::line(t.root_bottom, t.tip),
        SketchSegment::line(t.tip, t.root_top),
    ]
}

fn filleted_quad_loop(q: &DimensionQuad, radius: f64) -> Result<TabLoop> {
    let extension = WALL_EXTENSION_FACTOR * radius + WALL_EXTENSION_MARGIN;
    let wall_extension_end = Point2::new(
        q.bottom_back.x - WALL_EPSILON,
        q.bottom_back.y - extension,
    );

    let fillet = tangent_arc(q.bottom_back, q.bottom_front, wall_extension_end, radius)
        .map_err(|e| TabError::invalid("fillet_back", e.to_string()))?;

    // The wall-side tangent point is the one nearer the wall (larger depth).
    let arc = if fillet.end.x >= fillet.start.x {
        fillet.arc()
    } else {
        SketchSegment::Arc {
            start: fillet.end,
            end: fillet.start,
            center: fillet.center,
            ccw: !fillet.ccw,
        }
    };
    let (bottom_tangent, wall_tangent) = (arc.start(), arc.end());

    debug!(
        radius,
        tangent_length = fillet.tangent_length,
        wall_tangent_height = wall_tangent.y,
        "built back fillet"
    );

    Ok(TabLoop {
        segments: vec![
            SketchSegment::line(q.top_back, q.top_front),
            SketchSegment::line(q.top_front, q.bottom_front),
            SketchSegment::line(q.bottom_front, bottom_tangent),
            arc,
            SketchSegment::line(wall_tangent, q.top_back),
        ],
        back_fillet: Some(BackFillet {
            wall_extension_end,
            fillet,
            wall_tangent,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bintab_math::{angle_between, Point3, Vec2, Vec3};
    use bintab_sketch::SketchProfile;
    use std::f64::consts::PI;

    use crate::params::TabParameters;
    use crate::points::derive_points;

    fn quad(root: f64, tip: f64) -> TabPoints {
        let params = TabParameters::builder()
            .origin(Point3::new(0.0, 0.0, 1.0))
            .width(1.2)
            .length(4.2)
            .dimensions(root, tip)
            .build()
            .unwrap();
        derive_points(&params).unwrap()
    }

    fn close(segments: Vec<SketchSegment>) -> SketchProfile {
        SketchProfile::new(Point3::origin(), Vec3::y(), Vec3::z(), segments).unwrap()
    }

    #[test]
    fn test_equal_thickness_is_rectangle() {
        let tab_loop = assemble_loop(&quad(0.14, 0.14), None).unwrap();
        assert!(tab_loop.back_fillet.is_none());
        let profile = close(tab_loop.segments.clone());
        assert_eq!(profile.len(), 4);

        let top = &tab_loop.segments[0];
        assert_relative_eq!(top.length(), 1.2, epsilon = 1e-12);

        let back = &tab_loop.segments[3];
        assert_relative_eq!(back.start().x, back.end().x);
        assert_relative_eq!(back.end().y - back.start().y, 0.14, epsilon = 1e-12);
        assert_relative_eq!(profile.area(), 1.2 * 0.14, epsilon = 1e-12);
    }

    #[test]
    fn test_tapered_quad() {
        let tab_loop = assemble_loop(&quad(0.3, 0.1), None).unwrap();
        let profile = close(tab_loop.segments);
        assert_relative_eq!(profile.area(), 1.2 * (0.3 + 0.1) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_back_fillet_arc() {
        let points = quad(0.2, 0.1);
        let q = match points {
            TabPoints::Quad(q) => q,
            _ => unreachable!(),
        };
        let tab_loop = assemble_loop(&points, Some(0.15)).unwrap();
        let back = tab_loop.back_fillet.unwrap();
        assert_eq!(tab_loop.segments.len(), 5);

        let arc = &tab_loop.segments[3];
        assert!((arc.radius().unwrap() - 0.15).abs() < 1e-4);

        // The wall tangent point sits on the wall extension: below the root
        // of the underside, above the extension's far end, at the wall.
        let p = back.wall_tangent;
        assert!(p.y < q.bottom_back.y && p.y > back.wall_extension_end.y);
        assert!(p.y < q.top_back.y);
        assert!(p.x <= q.bottom_back.x && q.bottom_back.x - p.x < WALL_EPSILON);

        // Back edge runs from the tangent point up to top_back along the
        // arc's tangent line; the arc arrives heading down the wall.
        let back_edge = &tab_loop.segments[4];
        assert_relative_eq!(back_edge.start(), p);
        assert_relative_eq!(back_edge.end(), q.top_back);
        let deviation = PI - angle_between(&arc.end_tangent(), &back_edge.start_tangent());
        assert!(deviation < 1e-3, "deviation {deviation}");

        // Underside is tangent to the arc at its start.
        let bottom = &tab_loop.segments[2];
        assert!(angle_between(&bottom.end_tangent(), &arc.start_tangent()) < 1e-9);

        // Adds material below the tab.
        let filleted = close(tab_loop.segments).area();
        assert!(filleted > 1.2 * (0.2 + 0.1) / 2.0);
    }

    #[test]
    fn test_back_fillet_under_thickening_tab() {
        // Tip thicker than root: the underside rises towards the wall, so the
        // corner against the wall extension is acute.
        let points = quad(0.1, 0.3);
        let q = match points {
            TabPoints::Quad(q) => q,
            _ => unreachable!(),
        };
        let tab_loop = assemble_loop(&points, Some(0.2)).unwrap();
        let back = tab_loop.back_fillet.unwrap();
        assert_eq!(tab_loop.segments.len(), 5);

        let underside = q.bottom_front - q.bottom_back;
        let phi = angle_between(&underside, &Vec2::new(0.0, -1.0));
        assert!(phi < PI / 2.0);
        assert_relative_eq!(
            back.fillet.tangent_length,
            0.2 / (phi / 2.0).tan(),
            epsilon = 1e-4
        );

        let arc = &tab_loop.segments[3];
        assert!((arc.radius().unwrap() - 0.2).abs() < 1e-4);
        let p = back.wall_tangent;
        assert!(p.y < q.bottom_back.y && p.y > back.wall_extension_end.y);
        assert!((q.bottom_back.y - p.y - back.fillet.tangent_length).abs() < 1e-4);

        let bottom = &tab_loop.segments[2];
        assert!(angle_between(&bottom.end_tangent(), &arc.start_tangent()) < 1e-9);
        let back_edge = &tab_loop.segments[4];
        let deviation = PI - angle_between(&arc.end_tangent(), &back_edge.start_tangent());
        assert!(deviation < 1e-3, "deviation {deviation}");

        let filleted = close(tab_loop.segments).area();
        assert!(filleted > 1.2 * (0.1 + 0.3) / 2.0);
    }

    #[test]
    fn test_back_fillet_too_large() {
        let err = assemble_loop(&quad(0.2, 0.1), Some(5.0)).unwrap_err();
        match err {
            TabError::InvalidParameter { parameter, .. } => assert_eq!(parameter, "fillet_back"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_triangle_loop_closes() {
        let params = TabParameters::builder()
            .width(1.2)
            .length(4.2)
            .angle_degrees(45.0, 0.0)
            .build()
            .unwrap();
        let points = derive_points(&params).unwrap();
        let tab_loop = assemble_loop(&points, Some(0.5)).unwrap();
        assert!(tab_loop.back_fillet.is_none());
        let profile = close(tab_loop.segments);
        assert_eq!(profile.len(), 3);
    }
}
