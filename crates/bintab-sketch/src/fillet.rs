//! Tangent-arc construction between two straight legs meeting at a corner.
//!
//! Given a corner point and one point along each leg, the fillet arc of
//! radius `r` touches both legs at distance `t = r / tan(φ/2)` from the
//! corner, where `φ` is the angle between the legs. Its center lies on
//! the angle bisector at distance `r / sin(φ/2)`.

use bintab_math::{angle_between, cross2, Point2, Tolerance};

use crate::{Result, SketchError, SketchProfile, SketchSegment};

/// A tangent arc filling the corner between two legs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerFillet {
    /// Tangent point on the first leg (arc start).
    pub start: Point2,
    /// Tangent point on the second leg (arc end).
    pub end: Point2,
    /// Arc center.
    pub center: Point2,
    /// Arc radius.
    pub radius: f64,
    /// Direction of travel from `start` to `end`.
    pub ccw: bool,
    /// Distance from the corner to either tangent point.
    pub tangent_length: f64,
}

impl CornerFillet {
    /// The arc as a sketch segment running from `start` to `end`.
    pub fn arc(&self) -> SketchSegment {
        SketchSegment::Arc {
            start: self.start,
            end: self.end,
            center: self.center,
            ccw: self.ccw,
        }
    }
}

/// Compute the fillet arc of `radius` at `corner`, between the leg towards
/// `leg_a` and the leg towards `leg_b`.
///
/// # Errors
///
/// - [`SketchError::InvalidRadius`] for a non-positive or non-finite radius
/// - [`SketchError::DegenerateCorner`] if a leg is empty or the legs are collinear
/// - [`SketchError::FilletTooLarge`] if a tangent point would fall beyond a leg's end
pub fn tangent_arc(
    corner: Point2,
    leg_a: Point2,
    leg_b: Point2,
    radius: f64,
) -> Result<CornerFillet> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(SketchError::InvalidRadius(radius));
    }

    let tol = Tolerance::DEFAULT;
    let a = leg_a - corner;
    let b = leg_b - corner;
    let (len_a, len_b) = (a.norm(), b.norm());
    if len_a < tol.linear || len_b < tol.linear {
        return Err(SketchError::DegenerateCorner);
    }

    let (ua, ub) = (a / len_a, b / len_b);
    let phi = angle_between(&ua, &ub);
    if phi < tol.angular || (std::f64::consts::PI - phi) < tol.angular {
        return Err(SketchError::DegenerateCorner);
    }

    let half = phi / 2.0;
    let t = radius / half.tan();
    let available = len_a.min(len_b);
    if t > available + tol.linear {
        return Err(SketchError::FilletTooLarge {
            radius,
            needed: t,
            available,
        });
    }

    let start = corner + ua * t.min(len_a);
    let end = corner + ub * t.min(len_b);
    let bisector = (ua + ub).normalize();
    let center = corner + bisector * (radius / half.sin());
    let ccw = cross2(&(start - center), &(end - center)) > 0.0;

    Ok(CornerFillet {
        start,
        end,
        center,
        radius,
        ccw,
        tangent_length: t,
    })
}

/// Result of rounding one corner of a profile.
#[derive(Debug, Clone)]
pub struct FilletedProfile {
    /// The profile with the corner replaced by an arc.
    pub profile: SketchProfile,
    /// Index of the new arc in `profile.segments`.
    pub arc_index: usize,
    /// False if the incoming segment was consumed entirely by the fillet.
    pub kept_prev: bool,
    /// False if the outgoing segment was consumed entirely by the fillet.
    pub kept_next: bool,
    /// The arc construction.
    pub fillet: CornerFillet,
}

impl SketchProfile {
    /// Round the corner at `vertex` (the start point of segment `vertex`)
    /// with an arc of `radius`.
    ///
    /// Both segments meeting at the vertex must be lines. A segment whose
    /// whole length is used up by the tangent distance is dropped, so a
    /// short edge can be rounded from both ends into a full half-round.
    pub fn fillet_corner(&self, vertex: usize, radius: f64) -> Result<FilletedProfile> {
        let n = self.segments.len();
        if vertex >= n || n < 3 {
            return Err(SketchError::VertexOutOfRange(vertex));
        }
        let p = (vertex + n - 1) % n;
        let (prev, next) = (&self.segments[p], &self.segments[vertex]);
        if !matches!(prev, SketchSegment::Line { .. }) || !matches!(next, SketchSegment::Line { .. })
        {
            return Err(SketchError::NotLineCorner(vertex));
        }

        let fillet = tangent_arc(next.start(), prev.start(), next.end(), radius)?;

        let tol = Tolerance::DEFAULT;
        let kept_prev = !tol.points2_equal(&fillet.start, &prev.start());
        let kept_next = !tol.points2_equal(&fillet.end, &next.end());
        let arc = SketchSegment::Arc {
            start: if kept_prev { fillet.start } else { prev.start() },
            end: if kept_next { fillet.end } else { next.end() },
            center: fillet.center,
            ccw: fillet.ccw,
        };

        let mut segments = Vec::with_capacity(n + 1);
        let mut arc_index = 0;
        for (j, seg) in self.segments.iter().enumerate() {
            if j == p {
                if kept_prev {
                    segments.push(SketchSegment::line(prev.start(), fillet.start));
                }
                arc_index = segments.len();
                segments.push(arc.clone());
            } else if j == vertex {
                if kept_next {
                    segments.push(SketchSegment::line(fillet.end, next.end()));
                }
            } else {
                segments.push(seg.clone());
            }
        }

        let profile = SketchProfile::new(
            self.origin,
            *self.x_dir.as_ref(),
            *self.y_dir.as_ref(),
            segments,
        )?;

        Ok(FilletedProfile {
            profile,
            arc_index,
            kept_prev,
            kept_next,
            fillet,
        })
    }
}
