//! Locating the tip edges of an extruded tab.

use bintab_kernel::{BodyEdge, SketchPlane};
use tracing::{trace, warn};

use crate::params::{AXIS_TOLERANCE, TIP_TOLERANCE};

/// Tip edges found on a tab body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TipEdges {
    /// No lateral edge found at the tip.
    None,
    /// A single edge: the tip of a triangular profile.
    Single(BodyEdge),
    /// Upper and lower tip edges of a quadrilateral profile.
    Pair {
        /// Edge where the top meets the front.
        top: BodyEdge,
        /// Edge where the front meets the underside.
        bottom: BodyEdge,
    },
}

impl TipEdges {
    /// Number of edges found.
    pub fn len(&self) -> usize {
        match self {
            TipEdges::None => 0,
            TipEdges::Single(_) => 1,
            TipEdges::Pair { .. } => 2,
        }
    }

    /// True when no tip edge was found.
    pub fn is_empty(&self) -> bool {
        matches!(self, TipEdges::None)
    }
}

/// Pick the tip edges out of `edges`.
///
/// Candidates are straight edges parallel to the extrusion direction (the
/// plane normal). Of those, the ones farthest from the wall, within
/// [`TIP_TOLERANCE`] of the minimum depth, form the tip. Two or more are
/// ordered by height, highest first; the first two become the top and bottom
/// edge and any further ones are ignored.
pub fn classify_tip_edges(edges: &[BodyEdge], plane: &SketchPlane) -> TipEdges {
    let normal = plane.normal();
    let project = |e: &BodyEdge| {
        let rel = e.start - plane.origin;
        (rel.dot(&plane.x_dir), rel.dot(&plane.y_dir))
    };

    let lateral: Vec<(BodyEdge, f64, f64)> = edges
        .iter()
        .filter(|e| e.is_parallel_to(&normal, AXIS_TOLERANCE))
        .map(|e| {
            let (depth, height) = project(e);
            (*e, depth, height)
        })
        .collect();

    let Some(min_depth) = lateral.iter().map(|&(_, d, _)| d).reduce(f64::min) else {
        warn!(edges = edges.len(), "no lateral edges on tab body");
        return TipEdges::None;
    };

    let mut tip: Vec<(BodyEdge, f64)> = lateral
        .into_iter()
        .filter(|&(_, d, _)| d - min_depth <= TIP_TOLERANCE)
        .map(|(e, _, h)| (e, h))
        .collect();
    tip.sort_by(|a, b| b.1.total_cmp(&a.1));
    trace!(min_depth, candidates = tip.len(), "tip edge candidates");

    match tip.as_slice() {
        [] => TipEdges::None,
        [(only, _)] => TipEdges::Single(*only),
        [(top, _), (bottom, _), rest @ ..] => {
            if !rest.is_empty() {
                warn!(
                    count = tip.len(),
                    "more than two tip edges, using the two highest"
                );
            }
            TipEdges::Pair {
                top: *top,
                bottom: *bottom,
            }
        }
    }
}
