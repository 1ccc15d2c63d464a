//! Tab parameters and the tolerances the generator works with.

use std::f64::consts::FRAC_PI_2;

use bintab_math::Point3;

use crate::error::{Result, TabError};

/// Radii at or below this are treated as "no fillet".
pub const FILLET_EPSILON: f64 = 0.001;

/// Shift of the back-fillet wall extension into the tab material.
pub const WALL_EPSILON: f64 = 1e-4;

/// Wall extension length is `WALL_EXTENSION_FACTOR · r + WALL_EXTENSION_MARGIN`.
pub const WALL_EXTENSION_FACTOR: f64 = 10.0;

/// See [`WALL_EXTENSION_FACTOR`].
pub const WALL_EXTENSION_MARGIN: f64 = 1.0;

/// Depth tolerance when collecting edges at the tip.
pub const TIP_TOLERANCE: f64 = 1e-3;

/// Maximum sine of the angle between an edge and the extrusion axis for the
/// edge to count as axis-parallel.
pub const AXIS_TOLERANCE: f64 = 1e-6;

/// Allowed deviation of the constructed overhang angle, in radians.
pub const ANGLE_TOLERANCE: f64 = 1e-6;

/// Cosmetic fillet on the tip of an ANGLE-mode tab.
pub const EDGE_FILLET_RADIUS: f64 = 0.04;

/// Default overhang angle (45°).
pub const DEFAULT_OVERHANG_ANGLE: f64 = std::f64::consts::FRAC_PI_4;

/// Default label angle.
pub const DEFAULT_LABEL_ANGLE: f64 = 0.0;

/// Default thickness at the wall.
pub const DEFAULT_ROOT_THICKNESS: f64 = 0.14;

/// Default thickness at the free tip.
pub const DEFAULT_TIP_THICKNESS: f64 = 0.14;

/// Default back fillet (disabled).
pub const DEFAULT_FILLET_BACK: f64 = 0.0;

/// How the tab cross-section is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TabMethod {
    /// Right triangle whose underside makes `overhang_angle` with the wall.
    Angle {
        /// Underside angle from vertical, radians, in (0, π/2).
        overhang_angle: f64,
        /// Tilt of the label face, radians. Not used by the geometry.
        label_angle: f64,
    },
    /// Quadrilateral with explicit thickness at each end.
    Dimensions {
        /// Thickness at the wall.
        root_thickness: f64,
        /// Thickness at the free tip.
        tip_thickness: f64,
    },
}

impl TabMethod {
    /// Short name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            TabMethod::Angle { .. } => "angle",
            TabMethod::Dimensions { .. } => "dimensions",
        }
    }
}

impl Default for TabMethod {
    fn default() -> Self {
        TabMethod::Angle {
            overhang_angle: DEFAULT_OVERHANG_ANGLE,
            label_angle: DEFAULT_LABEL_ANGLE,
        }
    }
}

/// Fillet radii. A radius ≤ [`FILLET_EPSILON`] disables that fillet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabFillets {
    /// Upper tip edge.
    pub top: f64,
    /// Lower tip edge.
    pub bottom: f64,
    /// Root-bottom corner blending into the wall (DIMENSIONS mode).
    pub back: f64,
}

impl Default for TabFillets {
    fn default() -> Self {
        Self {
            top: DEFAULT_TIP_THICKNESS / 2.0,
            bottom: DEFAULT_TIP_THICKNESS / 2.0,
            back: DEFAULT_FILLET_BACK,
        }
    }
}

/// True if `radius` is large enough to produce a fillet.
pub fn fillet_enabled(radius: f64) -> bool {
    radius > FILLET_EPSILON
}

/// Validated, immutable input to [`create_tab_body`](crate::create_tab_body).
///
/// Only obtainable through [`TabParameters::builder`], so every value in
/// circulation has passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabParameters {
    origin: Point3,
    top_clearance: f64,
    width: f64,
    length: f64,
    method: TabMethod,
    fillets: TabFillets,
}

impl TabParameters {
    /// Start building a parameter set.
    pub fn builder() -> TabParametersBuilder {
        TabParametersBuilder::default()
    }

    /// Reference corner the profile is built relative to.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Drop from `origin.z` to the tab's top edge.
    pub fn top_clearance(&self) -> f64 {
        self.top_clearance
    }

    /// Tab depth, wall to tip.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Extrusion distance.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Profile derivation strategy.
    pub fn method(&self) -> TabMethod {
        self.method
    }

    /// Fillet radii.
    pub fn fillets(&self) -> TabFillets {
        self.fillets
    }

    /// Height of the tab's top edge.
    pub fn top_edge_height(&self) -> f64 {
        self.origin.z - self.top_clearance
    }

    /// Radius for a tip that collapses to a single edge.
    pub fn single_tip_radius(&self) -> f64 {
        match self.method {
            TabMethod::Angle { .. } => EDGE_FILLET_RADIUS,
            TabMethod::Dimensions { .. } => self.fillets.top,
        }
    }

    /// Back fillet radius, if the method uses one and it is enabled.
    pub fn back_fillet(&self) -> Option<f64> {
        match self.method {
            TabMethod::Dimensions { .. } if fillet_enabled(self.fillets.back) => {
                Some(self.fillets.back)
            }
            _ => None,
        }
    }
}

/// Builder for [`TabParameters`].
#[derive(Debug, Clone)]
pub struct TabParametersBuilder {
    origin: Point3,
    top_clearance: f64,
    width: Option<f64>,
    length: Option<f64>,
    method: TabMethod,
    fillets: TabFillets,
}

impl Default for TabParametersBuilder {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            top_clearance: 0.0,
            width: None,
            length: None,
            method: TabMethod::default(),
            fillets: TabFillets::default(),
        }
    }
}

impl TabParametersBuilder {
    /// Reference corner (default: model origin).
    pub fn origin(mut self, origin: Point3) -> Self {
        self.origin = origin;
        self
    }

    /// Drop from `origin.z` to the top edge (default: 0).
    pub fn top_clearance(mut self, top_clearance: f64) -> Self {
        self.top_clearance = top_clearance;
        self
    }

    /// Tab depth. Required.
    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Extrusion distance. Required.
    pub fn length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    /// Profile derivation strategy (default: 45° angle).
    pub fn method(mut self, method: TabMethod) -> Self {
        self.method = method;
        self
    }

    /// ANGLE mode with angles given in degrees.
    pub fn angle_degrees(self, overhang_deg: f64, label_deg: f64) -> Self {
        self.method(TabMethod::Angle {
            overhang_angle: overhang_deg.to_radians(),
            label_angle: label_deg.to_radians(),
        })
    }

    /// DIMENSIONS mode.
    pub fn dimensions(self, root_thickness: f64, tip_thickness: f64) -> Self {
        self.method(TabMethod::Dimensions {
            root_thickness,
            tip_thickness,
        })
    }

    /// All fillet radii at once.
    pub fn fillets(mut self, fillets: TabFillets) -> Self {
        self.fillets = fillets;
        self
    }

    /// Upper tip fillet radius.
    pub fn fillet_top(mut self, radius: f64) -> Self {
        self.fillets.top = radius;
        self
    }

    /// Lower tip fillet radius.
    pub fn fillet_bottom(mut self, radius: f64) -> Self {
        self.fillets.bottom = radius;
        self
    }

    /// Back fillet radius.
    pub fn fillet_back(mut self, radius: f64) -> Self {
        self.fillets.back = radius;
        self
    }

    /// Validate and freeze the parameters.
    ///
    /// # Errors
    ///
    /// [`TabError::InvalidParameter`] naming the first offending field.
    pub fn build(self) -> Result<TabParameters> {
        let origin = self.origin;
        if !(origin.x.is_finite() && origin.y.is_finite() && origin.z.is_finite()) {
            return Err(TabError::invalid("origin", "coordinates must be finite"));
        }
        non_negative("top_clearance", self.top_clearance)?;
        let width = positive("width", self.width)?;
        let length = positive("length", self.length)?;

        match self.method {
            TabMethod::Angle {
                overhang_angle,
                label_angle,
            } => {
                if !(overhang_angle > 0.0 && overhang_angle < FRAC_PI_2) {
                    return Err(TabError::invalid(
                        "overhang_angle",
                        format!(
                            "must lie strictly between 0° and 90°, got {:.4}°",
                            overhang_angle.to_degrees()
                        ),
                    ));
                }
                if !label_angle.is_finite() {
                    return Err(TabError::invalid("label_angle", "must be finite"));
                }
            }
            TabMethod::Dimensions {
                root_thickness,
                tip_thickness,
            } => {
                positive("root_thickness", Some(root_thickness))?;
                positive("tip_thickness", Some(tip_thickness))?;
            }
        }

        non_negative("fillet_top", self.fillets.top)?;
        non_negative("fillet_bottom", self.fillets.bottom)?;
        non_negative("fillet_back", self.fillets.back)?;

        Ok(TabParameters {
            origin,
            top_clearance: self.top_clearance,
            width,
            length,
            method: self.method,
            fillets: self.fillets,
        })
    }
}

fn positive(parameter: &'static str, value: Option<f64>) -> Result<f64> {
    match value {
        None => Err(TabError::invalid(parameter, "is required")),
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(v) => Err(TabError::invalid(
            parameter,
            format!("must be positive, got {v}"),
        )),
    }
}

fn non_negative(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(TabError::invalid(
            parameter,
            format!("must be zero or positive, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TabParametersBuilder {
        TabParameters::builder().width(1.2).length(4.2)
    }

    fn rejected_field(result: Result<TabParameters>) -> &'static str {
        match result {
            Err(TabError::InvalidParameter { parameter, .. }) => parameter,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let params = base().build().unwrap();
        assert_eq!(params.method(), TabMethod::default());
        assert_eq!(params.fillets(), TabFillets::default());
        assert_eq!(params.fillets().top, 0.07);
        assert_eq!(params.top_edge_height(), 0.0);
        assert_eq!(params.single_tip_radius(), EDGE_FILLET_RADIUS);
        assert_eq!(params.back_fillet(), None);
    }

    #[test]
    fn test_required_and_positive_sizes() {
        assert_eq!(rejected_field(TabParameters::builder().length(1.0).build()), "width");
        assert_eq!(rejected_field(TabParameters::builder().width(1.0).build()), "length");
        assert_eq!(rejected_field(base().width(0.0).build()), "width");
        assert_eq!(rejected_field(base().length(-3.0).build()), "length");
        assert_eq!(rejected_field(base().width(f64::NAN).build()), "width");
        assert_eq!(rejected_field(base().top_clearance(-0.1).build()), "top_clearance");
    }

    #[test]
    fn test_overhang_angle_range() {
        for deg in [0.0, 90.0, 120.0, -10.0, f64::NAN] {
            assert_eq!(
                rejected_field(base().angle_degrees(deg, 0.0).build()),
                "overhang_angle",
                "angle {deg}"
            );
        }
        assert!(base().angle_degrees(0.5, 0.0).build().is_ok());
        assert!(base().angle_degrees(89.5, 0.0).build().is_ok());
        assert_eq!(
            rejected_field(base().angle_degrees(45.0, f64::INFINITY).build()),
            "label_angle"
        );
    }

    #[test]
    fn test_dimensions_thickness() {
        assert_eq!(rejected_field(base().dimensions(0.0, 0.1).build()), "root_thickness");
        assert_eq!(rejected_field(base().dimensions(0.1, -0.1).build()), "tip_thickness");
        let params = base().dimensions(0.3, 0.1).fillet_back(0.2).build().unwrap();
        assert_eq!(params.back_fillet(), Some(0.2));
    }

    #[test]
    fn test_fillet_radii() {
        assert_eq!(rejected_field(base().fillet_top(-0.01).build()), "fillet_top");
        assert_eq!(rejected_field(base().fillet_bottom(f64::NAN).build()), "fillet_bottom");
        assert_eq!(rejected_field(base().fillet_back(-1.0).build()), "fillet_back");

        // Back fillet is ignored outside DIMENSIONS mode and below epsilon.
        assert_eq!(base().fillet_back(0.5).build().unwrap().back_fillet(), None);
        let params = base().dimensions(0.2, 0.2).fillet_back(0.001).build().unwrap();
        assert_eq!(params.back_fillet(), None);
    }

    #[test]
    fn test_fillet_threshold() {
        assert!(!fillet_enabled(0.0005));
        assert!(!fillet_enabled(FILLET_EPSILON));
        assert!(fillet_enabled(0.0011));
    }
}
