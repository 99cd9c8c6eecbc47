use crate::error::{GeometryError, OperationError, Result};
use crate::math::intersect_2d::line_line_intersect_2d;
use crate::math::{abs_to_rel, Point2, Vector2, TOLERANCE};
use crate::topology::{Curvature, EdgeId, PatternStore};

/// Builds single edges from absolute geometric constraints.
pub struct EdgeFactory;

fn to_rel(start: &Point2, end: &Point2, p: &Point2) -> Result<Point2> {
    abs_to_rel(start, end, p)
        .ok_or_else(|| GeometryError::Degenerate("edge endpoints coincide".into()).into())
}

impl EdgeFactory {
    /// Inserts an edge between two new vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide.
    pub fn with_curvature(
        store: &mut PatternStore,
        start: Point2,
        end: Point2,
        curvature: Curvature,
    ) -> Result<EdgeId> {
        let s = store.add_point(start);
        let e = store.add_point(end);
        store.add_edge(s, e, curvature)
    }

    /// A straight edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide.
    pub fn line(store: &mut PatternStore, start: Point2, end: Point2) -> Result<EdgeId> {
        Self::with_curvature(store, start, end, Curvature::Straight)
    }

    /// A quadratic Bezier from an absolute control point.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide.
    pub fn quadratic(
        store: &mut PatternStore,
        start: Point2,
        control: Point2,
        end: Point2,
    ) -> Result<EdgeId> {
        let control = to_rel(&start, &end, &control)?;
        Self::with_curvature(store, start, end, Curvature::Quadratic { control })
    }

    /// A cubic Bezier from absolute control points.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide.
    pub fn cubic(
        store: &mut PatternStore,
        start: Point2,
        c1: Point2,
        c2: Point2,
        end: Point2,
    ) -> Result<EdgeId> {
        let controls = [to_rel(&start, &end, &c1)?, to_rel(&start, &end, &c2)?];
        Self::with_curvature(store, start, end, Curvature::Cubic { controls })
    }

    /// A quadratic Bezier passing through `target`.
    ///
    /// The curve parameter at `target` is its projection onto the chord, so
    /// the target has to project strictly inside the chord.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the target projects
    /// outside of the chord.
    pub fn curve_3_points(
        store: &mut PatternStore,
        start: Point2,
        end: Point2,
        target: Point2,
    ) -> Result<EdgeId> {
        let rel = to_rel(&start, &end, &target)?;
        let t = rel.x;
        if t <= 0.0 || t >= 1.0 {
            return Err(OperationError::InvalidInput(format!(
                "target projects at {t} along the chord, expected a value in (0, 1)"
            ))
            .into());
        }
        // B(t) = 2t(1-t) c + t^2 (1, 0) in the chord frame.
        let w = 2.0 * t * (1.0 - t);
        let control = Point2::new((rel.x - t * t) / w, rel.y / w);
        Self::with_curvature(store, start, end, Curvature::Quadratic { control })
    }

    /// A curve leaving `start` along `tan0` and arriving at `end` along `tan1`.
    ///
    /// With both tangents the control point of a quadratic sits where the
    /// tangent lines meet. When they do not meet ahead of both ends a cubic
    /// is used instead. With one tangent the quadratic control sits where
    /// that tangent crosses the perpendicular bisector of the chord.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if no tangent is given or a
    /// single tangent runs parallel to the bisector.
    pub fn curve_from_tangents(
        store: &mut PatternStore,
        start: Point2,
        end: Point2,
        tan0: Option<Vector2>,
        tan1: Option<Vector2>,
    ) -> Result<EdgeId> {
        let chord = end - start;
        let len = chord.norm();
        if len < TOLERANCE {
            return Err(GeometryError::Degenerate("edge endpoints coincide".into()).into());
        }
        let mid = start + chord * 0.5;
        let bisector = Vector2::new(-chord.y, chord.x);

        match (tan0, tan1) {
            (Some(t0), Some(t1)) => {
                match line_line_intersect_2d(&start, &t0, &end, &t1) {
                    Some((u, v)) if u > TOLERANCE && v < -TOLERANCE => {
                        Self::quadratic(store, start, start + t0 * u, end)
                    }
                    _ => {
                        let (d0, d1) = (t0.normalize(), t1.normalize());
                        let c1 = start + d0 * (len / 3.0);
                        let c2 = end - d1 * (len / 3.0);
                        Self::cubic(store, start, c1, c2, end)
                    }
                }
            }
            (Some(t0), None) => {
                let (u, _) = line_line_intersect_2d(&start, &t0, &mid, &bisector)
                    .ok_or_else(|| OperationError::InvalidInput("tangent runs along the bisector".into()))?;
                Self::quadratic(store, start, start + t0 * u, end)
            }
            (None, Some(t1)) => {
                let (v, _) = line_line_intersect_2d(&end, &t1, &mid, &bisector)
                    .ok_or_else(|| OperationError::InvalidInput("tangent runs along the bisector".into()))?;
                Self::quadratic(store, start, end + t1 * v, end)
            }
            (None, None) => Err(OperationError::InvalidInput(
                "at least one tangent is required".into(),
            )
            .into()),
        }
    }
}
