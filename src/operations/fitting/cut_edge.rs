use crate::error::{OperationError, Result, TopologyError};
use crate::geometry::Curve;
use crate::math::minimize::{nelder_mead, MinimizeConfig};
use crate::math::{cross_2d, vector_angle, Point2, TOLERANCE};
use crate::stitching::Interface;
use crate::topology::{EdgeId, EdgeSequence, PatternStore, VertexId};

/// Weight of the asymmetry penalty around the requested offset.
const SYMMETRY_WEIGHT: f64 = 0.1;

/// Parameters closer than this to an edge end do not split it.
const PARAM_EPS: f64 = 1e-9;

/// Result of [`CutIntoEdge`].
#[derive(Debug, Clone)]
pub struct EdgeCut {
    /// Replacement run for the base edge: leading piece, inserted shape,
    /// trailing piece.
    pub edges: EdgeSequence,
    /// The inserted shape.
    pub inserted: EdgeSequence,
    /// What is left of the base edge, in order.
    pub leftovers: EdgeSequence,
}

impl EdgeCut {
    /// Replaces `base` by the cut run inside a boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not part of `seq`.
    pub fn splice_into(&self, seq: &mut EdgeSequence, base: EdgeId) -> Result<usize> {
        seq.substitute(base, &self.edges)
    }

    /// Replaces `base` by the leftover pieces inside an interface.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not part of the interface.
    pub fn update_interface(&self, interface: &mut Interface, base: EdgeId) -> Result<()> {
        let at = interface.edges().index_of(base).ok_or_else(|| {
            OperationError::InvalidInput("base edge is not part of the interface".into())
        })?;
        if interface.needs_flipping(at) {
            let reversed: EdgeSequence = self.leftovers.iter().rev().copied().collect();
            interface.substitute(base, &reversed)
        } else {
            interface.substitute(base, &self.leftovers)
        }
    }
}

/// Inserts a shape, such as a dart, into an edge.
///
/// The opening of the shape is its shortcut. Two points on the base edge
/// around the arc-length `offset` are fitted so that their distance equals
/// the opening width, the shape is moved between them and the base edge
/// part in between is dropped. With `right` the shape ends up on the right
/// of the base edge direction.
pub struct CutIntoEdge {
    target: EdgeSequence,
    base_edge: EdgeId,
    offset: f64,
    right: bool,
    tol: f64,
}

impl CutIntoEdge {
    /// Creates a new `CutIntoEdge` operation.
    #[must_use]
    pub fn new(target: EdgeSequence, base_edge: EdgeId, offset: f64, right: bool, tol: f64) -> Self {
        Self {
            target,
            base_edge,
            offset,
            right,
            tol,
        }
    }

    /// Executes the operation.
    ///
    /// The shape edges are moved in place and keep their ids. The base edge
    /// is left in the store; use [`EdgeCut::splice_into`] to replace it.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::OffsetOutOfBounds`] if the opening does not
    /// fit around the offset, and [`OperationError::FitFailed`] if no pair
    /// of points matches the opening width within `tol`.
    pub fn execute(&self, store: &mut PatternStore) -> Result<EdgeCut> {
        let opening = self.target.shortcut_vector(store)?;
        let width = opening.norm();
        if width < TOLERANCE {
            return Err(OperationError::InvalidInput("shape to insert has no opening".into()).into());
        }

        let curve = store.as_curve(self.base_edge)?;
        let length = curve.length();
        let (min, max) = (width / 2.0 - self.tol, length - width / 2.0 + self.tol);
        if self.offset < min || self.offset > max {
            return Err(OperationError::OffsetOutOfBounds {
                offset: self.offset,
                min,
                max,
            }
            .into());
        }

        let t0 = curve.param_at_length(self.offset.clamp(0.0, length));
        let gap = |s: &[f64]| {
            let t1 = (t0 - s[0]).clamp(0.0, 1.0);
            let t2 = (t0 + s[1]).clamp(0.0, 1.0);
            (curve.evaluate(t1) - curve.evaluate(t2)).norm() - width
        };
        let objective = |s: &[f64]| {
            let g = gap(s);
            g * g + SYMMETRY_WEIGHT * (s[0] - s[1]).powi(2)
        };
        let half = width / (2.0 * length);
        let config = MinimizeConfig {
            initial_step: (half / 2.0).max(1e-4),
            ..MinimizeConfig::default()
        };
        let bounds = [(0.0, t0), (0.0, 1.0 - t0)];
        let result = nelder_mead(objective, &[half.min(t0), half.min(1.0 - t0)], Some(&bounds[..]), &config)?;

        let residual = gap(&result.x).abs();
        tracing::debug!(residual, iterations = result.iterations, "edge cut fit");
        if residual > self.tol {
            return Err(OperationError::FitFailed { residual }.into());
        }
        if !result.converged {
            tracing::warn!(residual, "edge cut fit did not converge");
        }

        let t1 = (t0 - result.x[0]).clamp(0.0, 1.0);
        let t2 = (t0 + result.x[1]).clamp(0.0, 1.0);
        let (p1, p2) = (curve.evaluate(t1), curve.evaluate(t2));
        self.place_target(store, &p1, &p2)?;

        let (leading, middle, trailing) = split_around(store, self.base_edge, t1, t2)?;
        let (mid_start, mid_end) = {
            let m = store.edge(middle)?;
            (m.start, m.end)
        };
        store.remove_edge(middle);
        attach(store, &self.target, mid_start, mid_end)?;

        let leftovers: EdgeSequence = leading.into_iter().chain(trailing).collect();
        let edges: EdgeSequence = leading
            .into_iter()
            .chain(self.target.iter().copied())
            .chain(trailing)
            .collect();
        Ok(EdgeCut {
            edges,
            inserted: self.target.clone(),
            leftovers,
        })
    }

    /// Rotates the shape onto `p1 -> p2` and mirrors it to the requested side.
    fn place_target(&self, store: &mut PatternStore, p1: &Point2, p2: &Point2) -> Result<()> {
        let (start, _) = self.target.shortcut(store)?;
        let angle = vector_angle(&self.target.shortcut_vector(store)?, &(p2 - p1));
        self.target.rotate(store, angle, &start)?;
        self.target.snap_to(store, p1)?;

        let points = self.target.points(store)?;
        let count = points.len().max(1) as f64;
        let centroid = points.iter().fold(Point2::origin(), |acc, p| acc + p.coords / count);
        let side = cross_2d(&(p2 - p1), &(centroid - p1));
        if side.abs() > TOLERANCE && (side < 0.0) != self.right {
            self.target.reflect(store, p1, p2)?;
        }
        Ok(())
    }
}

/// Splits an edge at two parameters, skipping splits at its ends.
///
/// Returns the leading piece, the middle piece and the trailing piece.
pub(super) fn split_around(
    store: &mut PatternStore,
    edge: EdgeId,
    t1: f64,
    t2: f64,
) -> Result<(Option<EdgeId>, EdgeId, Option<EdgeId>)> {
    let lead = t1 > PARAM_EPS;
    let trail = t2 < 1.0 - PARAM_EPS;
    let mut breaks = vec![0.0];
    if lead {
        breaks.push(t1);
    }
    if trail {
        breaks.push(t2);
    }
    breaks.push(1.0);
    let fractions: Vec<f64> = breaks.windows(2).map(|w| w[1] - w[0]).collect();
    let pieces = store.subdivide_edge(edge, &fractions, false)?;

    let mut iter = pieces.iter().copied();
    let leading = if lead { iter.next() } else { None };
    let middle = iter
        .next()
        .ok_or_else(|| TopologyError::InvalidTopology("edge split produced no pieces".into()))?;
    let trailing = if trail { iter.next() } else { None };
    Ok((leading, middle, trailing))
}

/// Joins the ends of a chained shape to the given vertices, dropping the
/// shape's own end vertices.
pub(super) fn attach(
    store: &mut PatternStore,
    shape: &EdgeSequence,
    start: VertexId,
    end: VertexId,
) -> Result<()> {
    let (Some(first), Some(last)) = (shape.first(), shape.last()) else {
        return Err(OperationError::InvalidInput("empty shape".into()).into());
    };
    let old_start = std::mem::replace(&mut store.edge_mut(first)?.start, start);
    let old_end = std::mem::replace(&mut store.edge_mut(last)?.end, end);
    store.remove_vertex(old_start);
    store.remove_vertex(old_end);
    Ok(())
}
