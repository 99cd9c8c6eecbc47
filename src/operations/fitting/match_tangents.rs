use crate::error::{GeometryError, OperationError, Result};
use crate::geometry::{CubicBezier, Curve, EdgeCurve};
use crate::math::minimize::{nelder_mead, MinimizeConfig};
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::operations::creation::EdgeFactory;
use crate::topology::{Curvature, EdgeId, PatternStore};

/// Samples used to find the largest curvature along the candidate.
const CURVATURE_SAMPLES: usize = 70;

/// Weight of the largest-curvature penalty.
const CURVATURE_WEIGHT: f64 = 0.01;

/// Weight of the end slide penalty, per squared chord fraction.
const SLIDE_WEIGHT: f64 = 1e-3;

/// Objective value of a candidate whose end tangent vanishes.
const DEGENERATE_PENALTY: f64 = 1e3;

/// Reshapes a cubic edge to leave and enter along given directions while
/// keeping a target length.
///
/// Both control points move freely and the end point may slide along the
/// chord. The result is a new edge on fresh vertices; the input edge is not
/// modified.
pub struct CurveMatchTangents {
    edge: EdgeId,
    tan0: Vector2,
    tan1: Vector2,
    target_len: f64,
}

impl CurveMatchTangents {
    /// Creates a new `CurveMatchTangents` operation.
    #[must_use]
    pub fn new(edge: EdgeId, tan0: Vector2, tan1: Vector2, target_len: f64) -> Self {
        Self {
            edge,
            tan0,
            tan1,
            target_len,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the edge is not a cubic
    /// Bezier or the target length is not positive, and
    /// [`GeometryError::ZeroVector`] for a zero target tangent.
    pub fn execute(&self, store: &mut PatternStore) -> Result<EdgeId> {
        let data = store.edge(self.edge)?;
        if !matches!(data.curvature, Curvature::Cubic { .. }) {
            return Err(OperationError::InvalidInput(format!(
                "tangent matching needs a cubic edge, got {}",
                data.curvature.kind()
            ))
            .into());
        }
        let label = data.label.clone();
        if self.target_len <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "target length {} must be positive",
                self.target_len
            ))
            .into());
        }
        let (n0, n1) = (unit(&self.tan0)?, unit(&self.tan1)?);

        let EdgeCurve::Cubic(initial) = store.as_curve(self.edge)? else {
            return Err(OperationError::Failed("cubic edge did not evaluate to a cubic".into()).into());
        };
        let [start, c1, c2, end] = initial.points;
        let chord = end - start;
        let chord_len = chord.norm();
        let dir = chord / chord_len;

        let candidate = |x: &[f64]| {
            CubicBezier::new([
                start,
                Point2::new(x[0], x[1]),
                Point2::new(x[2], x[3]),
                end + dir * x[4],
            ])
        };
        let objective = |x: &[f64]| {
            let curve = candidate(x);
            let length = curve.length() - self.target_len;
            let (Ok(t0), Ok(t1)) = (curve.tangent(0.0), curve.tangent(1.0)) else {
                return DEGENERATE_PENALTY;
            };
            length * length
                + (t0 - n0).norm_squared()
                + (t1 - n1).norm_squared()
                + CURVATURE_WEIGHT * curve.max_curvature(CURVATURE_SAMPLES)
                + SLIDE_WEIGHT * (x[4] / chord_len).powi(2)
        };

        let x0 = [c1.x, c1.y, c2.x, c2.y, 0.0];
        let config = MinimizeConfig {
            initial_step: 0.05 * chord_len,
            ..MinimizeConfig::default()
        };
        let result = nelder_mead(objective, &x0, None, &config)?;
        tracing::debug!(
            value = result.value,
            iterations = result.iterations,
            "tangent matching fit"
        );
        if !result.converged {
            tracing::warn!(value = result.value, "tangent matching did not converge");
        }

        let [s, c1, c2, e] = candidate(&result.x).points;
        let id = EdgeFactory::cubic(store, s, c1, c2, e)?;
        store.edge_mut(id)?.label = label;
        Ok(id)
    }
}

fn unit(v: &Vector2) -> Result<Vector2> {
    let len = v.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(v / len)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reshaped_curve_follows_tangents() {
        let mut store = PatternStore::new();
        let edge = EdgeFactory::cubic(
            &mut store,
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 2.0),
            Point2::new(7.0, 2.0),
            Point2::new(10.0, 0.0),
        )
        .unwrap();
        let target_len = store.edge_length(edge).unwrap();
        let tan0 = Vector2::new(1.0, 1.0);
        let tan1 = Vector2::new(1.0, -1.0);

        let fitted = CurveMatchTangents::new(edge, tan0, tan1, target_len)
            .execute(&mut store)
            .unwrap();
        assert_ne!(fitted, edge);
        let curve = store.as_curve(fitted).unwrap();
        assert_relative_eq!(curve.length(), target_len, epsilon = 0.1);
        assert!(curve.tangent(0.0).unwrap().dot(&tan0.normalize()) > 0.99);
        assert!(curve.tangent(1.0).unwrap().dot(&tan1.normalize()) > 0.99);
        let (s, _) = store.edge_points(fitted).unwrap();
        assert_relative_eq!(s, Point2::new(0.0, 0.0), epsilon = 1e-12);

        // The source edge is left as it was.
        assert_relative_eq!(store.edge_length(edge).unwrap(), target_len, epsilon = 1e-12);
    }

    #[test]
    fn only_cubics_are_matched() {
        let mut store = PatternStore::new();
        let line = EdgeFactory::line(&mut store, Point2::origin(), Point2::new(1.0, 0.0)).unwrap();
        let op = CurveMatchTangents::new(line, Vector2::x(), Vector2::x(), 1.0);
        assert!(op.execute(&mut store).is_err());

        let cubic = EdgeFactory::cubic(
            &mut store,
            Point2::origin(),
            Point2::new(0.3, 0.2),
            Point2::new(0.7, 0.2),
            Point2::new(1.0, 0.0),
        )
        .unwrap();
        let op = CurveMatchTangents::new(cubic, Vector2::zeros(), Vector2::x(), 1.0);
        assert!(op.execute(&mut store).is_err());
    }
}
