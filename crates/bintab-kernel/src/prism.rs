//! Prismatic reference kernel.
//!
//! A prism is a closed sketch profile swept along its plane normal. Every
//! profile vertex yields one lateral edge parallel to the sweep, and every
//! profile segment yields a bottom and a top cap edge. Filleting a lateral
//! edge is exactly rounding the matching profile corner, so the body stays
//! a prism after any number of such fillets.

use bintab_math::{BoundingBox3, Point2, Vec3};
use bintab_sketch::{SketchProfile, SketchSegment};
use slotmap::SlotMap;
use tracing::debug;

use crate::backend::{
    BasePlane, BodyEdge, BodyId, EdgeId, EdgeKind, Feature, FeatureKind, GeometryBackend,
    SketchPlane,
};
use crate::{BackendError, Result};

#[derive(Debug, Clone)]
struct Prism {
    name: String,
    profile: SketchProfile,
    direction: Vec3,
    /// Lateral edge at the start vertex of each segment.
    lateral: Vec<EdgeId>,
    /// Bottom and top cap edge of each segment.
    caps: Vec<[EdgeId; 2]>,
}

impl Prism {
    fn bounding_box(&self) -> BoundingBox3 {
        let (min, max) = self.profile.bounds_2d();
        let bottom = rect_box(&self.profile, min, max);
        let mut bbox = bottom;
        bbox.include_box(&bottom.translated(&self.direction));
        bbox
    }

    fn edges(&self) -> Vec<BodyEdge> {
        let mut edges = Vec::with_capacity(self.profile.len() * 3);
        for (i, seg) in self.profile.segments.iter().enumerate() {
            let p = self.profile.to_3d(seg.start());
            let q = p + self.direction;
            edges.push(BodyEdge {
                id: self.lateral[i],
                kind: EdgeKind::Line,
                start: p,
                end: q,
                bounding_box: BoundingBox3::from_points(&[p, q]),
            });

            let bottom = cap_edge(&self.profile, seg, self.caps[i][0]);
            let offset = self.direction;
            let top = BodyEdge {
                id: self.caps[i][1],
                kind: match bottom.kind {
                    EdgeKind::Line => EdgeKind::Line,
                    EdgeKind::Arc { center, radius } => EdgeKind::Arc {
                        center: center + offset,
                        radius,
                    },
                },
                start: bottom.start + offset,
                end: bottom.end + offset,
                bounding_box: bottom.bounding_box.translated(&offset),
            };
            edges.push(bottom);
            edges.push(top);
        }
        edges
    }
}

fn rect_box(profile: &SketchProfile, min: Point2, max: Point2) -> BoundingBox3 {
    let corners = [
        profile.to_3d(min),
        profile.to_3d(Point2::new(max.x, min.y)),
        profile.to_3d(max),
        profile.to_3d(Point2::new(min.x, max.y)),
    ];
    BoundingBox3::from_points(&corners)
}

fn cap_edge(profile: &SketchProfile, seg: &SketchSegment, id: EdgeId) -> BodyEdge {
    let (min, max) = seg.bounds();
    let kind = match seg {
        SketchSegment::Line { .. } => EdgeKind::Line,
        SketchSegment::Arc { center, .. } => EdgeKind::Arc {
            center: profile.to_3d(*center),
            radius: seg.radius().unwrap_or_default(),
        },
    };
    BodyEdge {
        id,
        kind,
        start: profile.to_3d(seg.start()),
        end: profile.to_3d(seg.end()),
        bounding_box: rect_box(profile, min, max),
    }
}

/// In-memory backend producing prismatic bodies.
///
/// Supports fillets on lateral (sweep-parallel) edges whose two adjacent
/// profile segments are lines. Every operation is appended to a feature
/// log, which tests use to observe exactly which features were invoked.
#[derive(Debug, Default)]
pub struct PrismKernel {
    bodies: SlotMap<BodyId, Prism>,
    features: Vec<Feature>,
    next_edge: u64,
}

impl PrismKernel {
    /// Create an empty kernel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Features applied so far, in order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Name a body was created with.
    pub fn body_name(&self, body: BodyId) -> Result<&str> {
        Ok(&self.body(body)?.name)
    }

    /// Current profile of a body.
    pub fn body_profile(&self, body: BodyId) -> Result<&SketchProfile> {
        Ok(&self.body(body)?.profile)
    }

    /// Delete a body, e.g. to clean up after a failed build.
    pub fn remove_body(&mut self, body: BodyId) -> Result<()> {
        self.bodies
            .remove(body)
            .map(|_| ())
            .ok_or(BackendError::UnknownBody)
    }

    fn body(&self, body: BodyId) -> Result<&Prism> {
        self.bodies.get(body).ok_or(BackendError::UnknownBody)
    }

    fn fresh_edge(&mut self) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        id
    }

    /// Round the profile corner under lateral edge `edge` of `prism`.
    fn fillet_lateral(&mut self, prism: &Prism, edge: EdgeId, radius: f64) -> Result<Prism> {
        let vertex = match prism.lateral.iter().position(|&e| e == edge) {
            Some(v) => v,
            None if prism.caps.iter().any(|c| c.contains(&edge)) => {
                return Err(BackendError::UnsupportedEdge(edge))
            }
            None => return Err(BackendError::UnknownEdge(edge)),
        };

        let rounded = prism
            .profile
            .fillet_corner(vertex, radius)
            .map_err(|source| BackendError::FilletFailed { edge, source })?;

        let n = prism.profile.len();
        let prev = (vertex + n - 1) % n;
        let mut lateral = Vec::with_capacity(n + 1);
        let mut caps = Vec::with_capacity(n + 1);
        for j in 0..n {
            if j == prev {
                let arc_start = if rounded.kept_prev {
                    lateral.push(prism.lateral[j]);
                    caps.push(prism.caps[j]);
                    self.fresh_edge()
                } else {
                    prism.lateral[j]
                };
                lateral.push(arc_start);
                caps.push([self.fresh_edge(), self.fresh_edge()]);
            } else if j == vertex {
                if rounded.kept_next {
                    lateral.push(self.fresh_edge());
                    caps.push(prism.caps[j]);
                }
            } else {
                lateral.push(prism.lateral[j]);
                caps.push(prism.caps[j]);
            }
        }

        debug!(
            %edge,
            radius,
            tangent_length = rounded.fillet.tangent_length,
            "rounded prism corner"
        );

        Ok(Prism {
            name: prism.name.clone(),
            profile: rounded.profile,
            direction: prism.direction,
            lateral,
            caps,
        })
    }
}

impl GeometryBackend for PrismKernel {
    fn offset_plane(&mut self, base: BasePlane, offset: f64) -> Result<SketchPlane> {
        if !offset.is_finite() {
            return Err(BackendError::Rejected(format!(
                "plane offset must be finite, got {offset}"
            )));
        }
        self.features.push(Feature {
            name: format!("{base:?} offset"),
            kind: FeatureKind::Plane { base, offset },
        });
        Ok(SketchPlane::offset_from(base, offset))
    }

    fn extrude(&mut self, profile: &SketchProfile, distance: f64, name: &str) -> Result<BodyId> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(BackendError::InvalidDistance(distance));
        }

        let n = profile.len();
        let lateral = (0..n).map(|_| self.fresh_edge()).collect();
        let caps = (0..n)
            .map(|_| [self.fresh_edge(), self.fresh_edge()])
            .collect();
        let prism = Prism {
            name: name.to_string(),
            profile: profile.clone(),
            direction: profile.normal.as_ref() * distance,
            lateral,
            caps,
        };

        let body = self.bodies.insert(prism);
        self.features.push(Feature {
            name: name.to_string(),
            kind: FeatureKind::Extrude { body, distance },
        });
        debug!(name, segments = n, distance, "extruded prism");
        Ok(body)
    }

    fn body_edges(&self, body: BodyId) -> Result<Vec<BodyEdge>> {
        Ok(self.body(body)?.edges())
    }

    fn fillet(&mut self, body: BodyId, edges: &[EdgeId], radius: f64, name: &str) -> Result<()> {
        if edges.is_empty() {
            return Err(BackendError::NoEdges);
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(BackendError::Rejected(format!(
                "fillet radius must be positive, got {radius}"
            )));
        }

        // Work on a copy so a failing edge leaves the body untouched.
        let mut prism = self.body(body)?.clone();
        for &edge in edges {
            prism = self.fillet_lateral(&prism, edge, radius)?;
        }
        self.bodies[body] = prism;

        self.features.push(Feature {
            name: name.to_string(),
            kind: FeatureKind::Fillet {
                body,
                edges: edges.to_vec(),
                radius,
            },
        });
        Ok(())
    }

    fn bounding_box(&self, body: BodyId) -> Result<BoundingBox3> {
        Ok(self.body(body)?.bounding_box())
    }

    fn volume(&self, body: BodyId) -> Result<f64> {
        let prism = self.body(body)?;
        Ok(prism.profile.area() * prism.direction.norm())
    }
}
