//! Tab body construction against a [`GeometryBackend`].

use bintab_kernel::{BasePlane, BodyEdge, BodyId, EdgeId, GeometryBackend, SketchPlane};
use bintab_math::Vec2;
use bintab_sketch::{SketchProfile, SketchSegment};
use tracing::{debug, info, info_span, warn};

use crate::edges::{classify_tip_edges, TipEdges};
use crate::error::{BuildStep, Result, TabError};
use crate::loops::{assemble_loop, BackFillet};
use crate::params::{fillet_enabled, TabParameters};
use crate::points::derive_points;

/// Name of the extruded body.
pub const BODY_NAME: &str = "label tab";

/// Feature name of the upper tip fillet.
pub const FILLET_TOP_NAME: &str = "label tab fillet top";

/// Feature name of the lower tip fillet.
pub const FILLET_BOTTOM_NAME: &str = "label tab fillet bottom";

/// Feature name of the fillet on a single tip edge.
pub const FILLET_TIP_NAME: &str = "label tab fillet";

/// A fillet feature applied to the tab.
#[derive(Debug, Clone, PartialEq)]
pub struct FilletFeature {
    /// Feature name passed to the backend.
    pub name: &'static str,
    /// The filleted edge, as reported before filleting.
    pub edge: EdgeId,
    /// Fillet radius.
    pub radius: f64,
}

/// A finished tab.
#[derive(Debug, Clone)]
pub struct TabBody {
    /// Backend handle of the tab solid.
    pub body: BodyId,
    /// Plane the profile was sketched on.
    pub plane: SketchPlane,
    /// The extruded profile, before tip fillets.
    pub profile: SketchProfile,
    /// Tip edges found right after extrusion.
    pub tip_edges: TipEdges,
    /// Fillets applied, in order.
    pub fillets: Vec<FilletFeature>,
    /// Back fillet construction, if the profile has one.
    pub back_fillet: Option<BackFillet>,
}

struct PlannedFillet {
    step: BuildStep,
    name: &'static str,
    edge: BodyEdge,
    radius: f64,
}

/// Build the label tab described by `params` with `backend`.
///
/// Profile points and the closed loop are computed before the first backend
/// call, so parameter errors leave the backend untouched. Construction then
/// runs in order: profile plane, extrusion, edge query, tip fillets.
///
/// Tip fillets are independent features. Each one is attempted even if an
/// earlier one failed; the first failure is returned.
///
/// # Errors
///
/// - [`TabError::InvalidParameter`] for a back fillet that does not fit
/// - [`TabError::AngleMismatch`] or [`TabError::Profile`] for a bad profile
/// - [`TabError::Construction`] when the backend refuses a step
pub fn create_tab_body<B>(params: &TabParameters, backend: &mut B) -> Result<TabBody>
where
    B: GeometryBackend + ?Sized,
{
    let span = info_span!("create_tab_body", method = params.method().name());
    let _guard = span.enter();

    let points = derive_points(params)?;
    let tab_loop = assemble_loop(&points, params.back_fillet())?;

    let origin = params.origin();
    let plane = backend
        .offset_plane(BasePlane::YZ, origin.x)
        .map_err(|source| TabError::Construction {
            step: BuildStep::Plane,
            source,
        })?;

    // Loop points are absolute model (Y, Z); shift them into plane-local coordinates.
    let shift = -Vec2::new(
        plane.origin.coords.dot(&plane.x_dir),
        plane.origin.coords.dot(&plane.y_dir),
    );
    let segments: Vec<SketchSegment> = tab_loop
        .segments
        .iter()
        .map(|s| s.translated(&shift))
        .collect();
    let profile = SketchProfile::new(plane.origin, plane.x_dir, plane.y_dir, segments)?;

    let body = backend
        .extrude(&profile, params.length(), BODY_NAME)
        .map_err(|source| TabError::Construction {
            step: BuildStep::Extrude,
            source,
        })?;
    info!(
        segments = profile.len(),
        length = params.length(),
        "extruded tab body"
    );

    let edges = backend
        .body_edges(body)
        .map_err(|source| TabError::Construction {
            step: BuildStep::EdgeQuery,
            source,
        })?;
    let tip_edges = classify_tip_edges(&edges, &plane);
    debug!(tip_edges = tip_edges.len(), "classified tip edges");

    let mut fillets = Vec::new();
    let mut first_error = None;
    for planned in plan_fillets(params, &tip_edges) {
        match backend.fillet(body, &[planned.edge.id], planned.radius, planned.name) {
            Ok(()) => {
                info!(
                    name = planned.name,
                    radius = planned.radius,
                    edge = %planned.edge.id,
                    "applied fillet"
                );
                fillets.push(FilletFeature {
                    name: planned.name,
                    edge: planned.edge.id,
                    radius: planned.radius,
                });
            }
            Err(source) => {
                warn!(
                    name = planned.name,
                    radius = planned.radius,
                    error = %source,
                    "fillet failed"
                );
                first_error.get_or_insert(TabError::Construction {
                    step: planned.step,
                    source,
                });
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    Ok(TabBody {
        body,
        plane,
        profile,
        tip_edges,
        fillets,
        back_fillet: tab_loop.back_fillet,
    })
}

fn plan_fillets(params: &TabParameters, tip_edges: &TipEdges) -> Vec<PlannedFillet> {
    let fillets = params.fillets();
    let candidates = match *tip_edges {
        TipEdges::None => vec![],
        TipEdges::Single(edge) => vec![(
            BuildStep::FilletTip,
            FILLET_TIP_NAME,
            edge,
            params.single_tip_radius(),
        )],
        TipEdges::Pair { top, bottom } => vec![
            (BuildStep::FilletTop, FILLET_TOP_NAME, top, fillets.top),
            (BuildStep::FilletBottom, FILLET_BOTTOM_NAME, bottom, fillets.bottom),
        ],
    };

    candidates
        .into_iter()
        .filter_map(|(step, name, edge, radius)| {
            if fillet_enabled(radius) {
                Some(PlannedFillet {
                    step,
                    name,
                    edge,
                    radius,
                })
            } else {
                debug!(name, radius, "fillet below threshold, skipped");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bintab_kernel::{BackendError, EdgeKind, FeatureKind, PrismKernel};
    use bintab_math::{BoundingBox3, Point3};

    use crate::error::ErrorKind;
    use crate::params::EDGE_FILLET_RADIUS;

    fn dimensions(width: f64, root: f64, tip: f64) -> crate::params::TabParametersBuilder {
        TabParameters::builder()
            .origin(Point3::new(0.0, 0.0, 2.0))
            .width(width)
            .length(4.2)
            .dimensions(root, tip)
    }

    fn feature_names(kernel: &PrismKernel) -> Vec<&str> {
        kernel.features().iter().map(|f| f.name.as_str()).collect()
    }

    /// Arc cap edges on the bottom cap, as (center, radius).
    fn bottom_arcs(kernel: &PrismKernel, body: BodyId) -> Vec<(Point3, f64)> {
        kernel
            .body_edges(body)
            .unwrap()
            .into_iter()
            .filter_map(|e| match e.kind {
                EdgeKind::Arc { center, radius } if center.x.abs() < 1e-9 => Some((center, radius)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_fillets_follow_edge_height() {
        let params = dimensions(1.2, 0.3, 0.2)
            .fillet_top(0.05)
            .fillet_bottom(0.08)
            .build()
            .unwrap();
        let mut kernel = PrismKernel::new();
        let tab = create_tab_body(&params, &mut kernel).unwrap();

        let (top, bottom) = match tab.tip_edges {
            TipEdges::Pair { top, bottom } => (top, bottom),
            other => panic!("expected pair, got {other:?}"),
        };
        assert_relative_eq!(top.start.z, 2.0, epsilon = 1e-12);
        assert_relative_eq!(bottom.start.z, 1.8, epsilon = 1e-12);

        let arcs = bottom_arcs(&kernel, tab.body);
        assert_eq!(arcs.len(), 2);
        let top_arc = arcs.iter().find(|(c, _)| c.z > 1.9).unwrap();
        let bottom_arc = arcs.iter().find(|(c, _)| c.z < 1.9).unwrap();
        assert_relative_eq!(top_arc.1, 0.05, epsilon = 1e-12);
        assert_relative_eq!(top_arc.0.y, -1.2 + 0.05, epsilon = 1e-12);
        assert_relative_eq!(top_arc.0.z, 2.0 - 0.05, epsilon = 1e-12);
        assert_relative_eq!(bottom_arc.1, 0.08, epsilon = 1e-12);
        assert_relative_eq!(bottom_arc.0.y, -1.2 + 0.08, epsilon = 1e-12);

        assert_eq!(
            tab.fillets.iter().map(|f| f.name).collect::<Vec<_>>(),
            vec![FILLET_TOP_NAME, FILLET_BOTTOM_NAME]
        );
        assert_eq!(tab.fillets[0].edge, top.id);
        assert_eq!(tab.fillets[1].edge, bottom.id);
    }

    #[test]
    fn test_independent_builds_are_congruent() {
        let params = dimensions(1.2, 0.3, 0.14).fillet_back(0.1).build().unwrap();
        let mut first = PrismKernel::new();
        let mut second = PrismKernel::new();
        let a = create_tab_body(&params, &mut first).unwrap();
        let b = create_tab_body(&params, &mut second).unwrap();

        let (box_a, box_b) = (
            first.bounding_box(a.body).unwrap(),
            second.bounding_box(b.body).unwrap(),
        );
        assert_relative_eq!(box_a.min, box_b.min, epsilon = 1e-6);
        assert_relative_eq!(box_a.max, box_b.max, epsilon = 1e-6);
        assert_relative_eq!(
            first.volume(a.body).unwrap(),
            second.volume(b.body).unwrap(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_tiny_top_fillet_is_skipped() {
        let params = dimensions(1.2, 0.14, 0.14)
            .fillet_top(0.0005)
            .build()
            .unwrap();
        let mut kernel = PrismKernel::new();
        let tab = create_tab_body(&params, &mut kernel).unwrap();

        let names = feature_names(&kernel);
        assert!(!names.contains(&FILLET_TOP_NAME));
        assert!(names.contains(&FILLET_BOTTOM_NAME));
        assert_eq!(tab.fillets.len(), 1);
        assert_eq!(bottom_arcs(&kernel, tab.body).len(), 1);
    }

    #[test]
    fn test_full_size_tab_extents() {
        let params = TabParameters::builder()
            .width(12.0)
            .length(42.0)
            .dimensions(0.14, 0.14)
            .fillet_back(0.0)
            .top_clearance(0.0)
            .build()
            .unwrap();
        let mut kernel = PrismKernel::new();
        let tab = create_tab_body(&params, &mut kernel).unwrap();

        let bbox: BoundingBox3 = kernel.bounding_box(tab.body).unwrap();
        let extent = bbox.extent();
        assert!((extent.y - 12.0).abs() < 1e-4, "depth {}", extent.y);
        assert!((extent.x - 42.0).abs() < 1e-4, "length {}", extent.x);
        assert!((extent.z - 0.14).abs() < 1e-4, "height {}", extent.z);

        // Default tip fillets round the 0.14 front into a half-round.
        assert_eq!(tab.fillets.len(), 2);
        let profile = kernel.body_profile(tab.body).unwrap();
        assert_eq!(profile.arcs().count(), 2);
        assert_eq!(profile.len(), 5);
    }

    #[test]
    fn test_angle_tip_keeps_nominal_width() {
        let params = TabParameters::builder()
            .origin(Point3::new(0.5, 1.0, 3.0))
            .width(1.2)
            .length(4.2)
            .angle_degrees(45.0, 0.0)
            .build()
            .unwrap();
        let mut kernel = PrismKernel::new();
        let tab = create_tab_body(&params, &mut kernel).unwrap();

        assert!(matches!(tab.tip_edges, TipEdges::Single(_)));
        assert_eq!(tab.fillets.len(), 1);
        assert_eq!(tab.fillets[0].name, FILLET_TIP_NAME);
        assert_relative_eq!(tab.fillets[0].radius, EDGE_FILLET_RADIUS);

        // After rounding the tip, the flat top is exactly `width` deep.
        let profile = kernel.body_profile(tab.body).unwrap();
        let top_line = profile
            .segments
            .iter()
            .find(|s| {
                matches!(s, SketchSegment::Line { .. })
                    && (s.start().y - 3.0).abs() < 1e-12
                    && (s.end().y - 3.0).abs() < 1e-12
            })
            .unwrap();
        assert_relative_eq!(top_line.length(), 1.2, epsilon = 1e-9);

        let bbox = kernel.bounding_box(tab.body).unwrap();
        assert_relative_eq!(bbox.min.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(bbox.max.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(bbox.max.z, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_back_fillet_reaches_backend() {
        let params = dimensions(1.2, 0.3, 0.14).fillet_back(0.1).build().unwrap();
        let mut kernel = PrismKernel::new();
        let tab = create_tab_body(&params, &mut kernel).unwrap();

        let back = tab.back_fillet.unwrap();
        assert_relative_eq!(back.fillet.radius, 0.1);
        let radii: Vec<f64> = bottom_arcs(&kernel, tab.body).iter().map(|a| a.1).collect();
        assert_eq!(radii.len(), 3);
        assert!(radii.iter().any(|r| (r - 0.1).abs() < 1e-4));
        assert!(matches!(tab.tip_edges, TipEdges::Pair { .. }));
    }

    #[test]
    fn test_back_fillet_with_thicker_tip() {
        let params = dimensions(1.2, 0.1, 0.3).fillet_back(0.2).build().unwrap();
        let mut kernel = PrismKernel::new();
        let tab = create_tab_body(&params, &mut kernel).unwrap();

        let back = tab.back_fillet.unwrap();
        assert_eq!(tab.fillets.len(), 2);
        assert_eq!(bottom_arcs(&kernel, tab.body).len(), 3);

        // The fillet reaches below the root, down to the wall tangent point.
        let bbox = kernel.bounding_box(tab.body).unwrap();
        assert_relative_eq!(bbox.min.z, back.wall_tangent.y, epsilon = 1e-9);
        assert!((bbox.min.z - 1.6639).abs() < 1e-3, "min z {}", bbox.min.z);
        assert_relative_eq!(bbox.max.z, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_oversized_back_fillet_touches_nothing() {
        let params = dimensions(1.2, 0.3, 0.14).fillet_back(5.0).build().unwrap();
        let mut kernel = PrismKernel::new();
        let err = create_tab_body(&params, &mut kernel).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(kernel.features().is_empty());
        assert_eq!(kernel.body_count(), 0);
    }

    #[test]
    fn test_oversized_tip_fillet_is_construction_failure() {
        let params = dimensions(1.2, 0.14, 0.14)
            .fillet_top(0.5)
            .build()
            .unwrap();
        let mut kernel = PrismKernel::new();
        let err = create_tab_body(&params, &mut kernel).unwrap_err();
        assert!(matches!(
            err,
            TabError::Construction {
                step: BuildStep::FilletTop,
                source: BackendError::FilletFailed { .. }
            }
        ));
        assert_eq!(err.kind(), ErrorKind::GeometryConstructionFailure);
        // The bottom fillet was still applied as its own feature.
        assert_eq!(
            kernel
                .features()
                .iter()
                .filter(|f| matches!(f.kind, FeatureKind::Fillet { .. }))
                .count(),
            1
        );
    }

    fn tab_arcs(kernel: &PrismKernel) -> usize {
        let body = kernel
            .features()
            .iter()
            .find_map(|f| match f.kind {
                FeatureKind::Extrude { body, .. } => Some(body),
                _ => None,
            })
            .unwrap();
        kernel.body_profile(body).unwrap().arcs().count()
    }

    /// Delegates to a [`PrismKernel`] and refuses selected operations.
    struct Refusing {
        inner: PrismKernel,
        refuse_extrude: bool,
        refuse_fillet: Option<&'static str>,
        attempted: Vec<String>,
    }

    impl Refusing {
        fn new() -> Self {
            Self {
                inner: PrismKernel::new(),
                refuse_extrude: false,
                refuse_fillet: None,
                attempted: Vec::new(),
            }
        }
    }

    impl GeometryBackend for Refusing {
        fn offset_plane(
            &mut self,
            base: BasePlane,
            offset: f64,
        ) -> bintab_kernel::Result<SketchPlane> {
            self.inner.offset_plane(base, offset)
        }

        fn extrude(
            &mut self,
            profile: &SketchProfile,
            distance: f64,
            name: &str,
        ) -> bintab_kernel::Result<BodyId> {
            if self.refuse_extrude {
                return Err(BackendError::Rejected("no solids today".into()));
            }
            self.inner.extrude(profile, distance, name)
        }

        fn body_edges(&self, body: BodyId) -> bintab_kernel::Result<Vec<BodyEdge>> {
            self.inner.body_edges(body)
        }

        fn fillet(
            &mut self,
            body: BodyId,
            edges: &[EdgeId],
            radius: f64,
            name: &str,
        ) -> bintab_kernel::Result<()> {
            self.attempted.push(name.to_string());
            if self.refuse_fillet == Some(name) {
                return Err(BackendError::Rejected(format!("{name} refused")));
            }
            self.inner.fillet(body, edges, radius, name)
        }

        fn bounding_box(&self, body: BodyId) -> bintab_kernel::Result<BoundingBox3> {
            self.inner.bounding_box(body)
        }

        fn volume(&self, body: BodyId) -> bintab_kernel::Result<f64> {
            self.inner.volume(body)
        }
    }

    #[test]
    fn test_extrude_failure_is_propagated() {
        let params = dimensions(1.2, 0.14, 0.14).build().unwrap();
        let mut backend = Refusing::new();
        backend.refuse_extrude = true;
        let err = create_tab_body(&params, &mut backend).unwrap_err();
        assert_eq!(
            err,
            TabError::Construction {
                step: BuildStep::Extrude,
                source: BackendError::Rejected("no solids today".into()),
            }
        );
        assert_eq!(
            err.to_string(),
            "extrusion failed: backend rejected operation: no solids today"
        );
        assert!(backend.attempted.is_empty());
    }

    #[test]
    fn test_failed_top_fillet_does_not_block_bottom() {
        let params = dimensions(1.2, 0.14, 0.14).build().unwrap();
        let mut backend = Refusing::new();
        backend.refuse_fillet = Some(FILLET_TOP_NAME);
        let err = create_tab_body(&params, &mut backend).unwrap_err();
        assert!(matches!(
            err,
            TabError::Construction {
                step: BuildStep::FilletTop,
                ..
            }
        ));
        assert_eq!(backend.attempted, vec![FILLET_TOP_NAME, FILLET_BOTTOM_NAME]);
        assert_eq!(tab_arcs(&backend.inner), 1);
    }

    #[test]
    fn test_works_through_trait_object() {
        let params = dimensions(1.2, 0.14, 0.14).build().unwrap();
        let mut kernel = PrismKernel::new();
        let backend: &mut dyn GeometryBackend = &mut kernel;
        let tab = create_tab_body(&params, backend).unwrap();
        assert_eq!(tab.profile.len(), 4);
        assert_eq!(tab.tip_edges.len(), 2);
    }
}
