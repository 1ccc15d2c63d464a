//! Profile point derivation.
//!
//! Points are `(depth, height)` pairs in model Y/Z. Depth 0 is the wall at
//! `origin.y`; the tab grows towards negative depth.

use bintab_math::{angle_between, Point2};
use tracing::debug;

use crate::error::{Result, TabError};
use crate::params::{TabMethod, TabParameters, ANGLE_TOLERANCE, EDGE_FILLET_RADIUS};

/// Corners of an ANGLE-mode tab: a right triangle against the wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleTriangle {
    /// Top of the root line, on the wall.
    pub root_top: Point2,
    /// Bottom of the root line, on the wall.
    pub root_bottom: Point2,
    /// Free tip, level with the top edge.
    pub tip: Point2,
    /// Footprint widened to absorb the tip rounding.
    pub actual_width: f64,
    /// Vertical rise of the overhang.
    pub actual_height: f64,
}

impl AngleTriangle {
    /// Angle between the root line and the overhang line, at `root_bottom`.
    pub fn overhang_angle(&self) -> f64 {
        angle_between(
            &(self.root_top - self.root_bottom),
            &(self.tip - self.root_bottom),
        )
    }
}

/// Corners of a DIMENSIONS-mode tab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionQuad {
    /// Wall end of the top edge.
    pub top_back: Point2,
    /// Tip end of the top edge.
    pub top_front: Point2,
    /// Tip end of the underside.
    pub bottom_front: Point2,
    /// Wall end of the underside.
    pub bottom_back: Point2,
}

/// Derived profile corners, one shape per [`TabMethod`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TabPoints {
    /// ANGLE mode.
    Triangle(AngleTriangle),
    /// DIMENSIONS mode.
    Quad(DimensionQuad),
}

/// Compute the profile corners for `params`.
///
/// # Errors
///
/// [`TabError::AngleMismatch`] if the constructed overhang does not
/// reproduce the requested angle within [`ANGLE_TOLERANCE`].
pub fn derive_points(params: &TabParameters) -> Result<TabPoints> {
    let origin = params.origin();
    let wall = origin.y;
    let top = params.top_edge_height();

    match params.method() {
        TabMethod::Angle { overhang_angle, .. } => {
            let triangle = angle_triangle(wall, top, params.width(), overhang_angle)?;
            Ok(TabPoints::Triangle(triangle))
        }
        TabMethod::Dimensions {
            root_thickness,
            tip_thickness,
        } => {
            let front = wall - params.width();
            Ok(TabPoints::Quad(DimensionQuad {
                top_back: Point2::new(wall, top),
                top_front: Point2::new(front, top),
                bottom_front: Point2::new(front, top - tip_thickness),
                bottom_back: Point2::new(wall, top - root_thickness),
            }))
        }
    }
}

fn angle_triangle(wall: f64, top: f64, width: f64, theta: f64) -> Result<AngleTriangle> {
    // Rounding the tip trims `r / tan((90° - θ)/2)` off the top edge.
    let tip_angle = std::f64::consts::FRAC_PI_2 - theta;
    let actual_width = width + EDGE_FILLET_RADIUS / (tip_angle / 2.0).tan();
    let actual_height = actual_width / theta.tan();
    if !(actual_width.is_finite() && actual_height.is_finite() && actual_height > 0.0) {
        return Err(TabError::invalid(
            "overhang_angle",
            format!("{:.4}° yields no finite overhang", theta.to_degrees()),
        ));
    }

    let triangle = AngleTriangle {
        root_top: Point2::new(wall, top),
        root_bottom: Point2::new(wall, top - actual_height),
        tip: Point2::new(wall - actual_width, top),
        actual_width,
        actual_height,
    };
    verify_overhang_angle(&triangle, theta)?;

    debug!(actual_width, actual_height, "derived angle profile");
    Ok(triangle)
}

/// Check that the overhang line makes angle `theta` with the root line.
pub fn verify_overhang_angle(triangle: &AngleTriangle, theta: f64) -> Result<()> {
    let actual = triangle.overhang_angle();
    if (actual - theta).abs() > ANGLE_TOLERANCE {
        return Err(TabError::AngleMismatch {
            expected: theta,
            actual,
        });
    }
    Ok(())
}
