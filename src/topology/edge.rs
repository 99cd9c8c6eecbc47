use crate::error::{GeometryError, Result};
use crate::geometry::curve::{
    CircularArc, CubicBezier, Curve, EdgeCurve, QuadBezier, Segment,
};
use crate::math::arc_2d::{cy_from_radius, rel_center_height, rel_radius, signed_sweep};
use crate::math::{abs_to_rel, rel_to_abs, Point2, Vector2, TOLERANCE};
use crate::serialization::{CurvatureRecord, EdgeProperties};

use super::sequence::EdgeSequence;
use super::vertex::VertexId;
use super::PatternStore;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the pattern store.
    pub struct EdgeId;
}

/// Shape of an edge between its two vertices.
///
/// Control points live in the chord frame of the edge (see
/// [`rel_to_abs`]), so the shape follows the endpoints when they move.
#[derive(Debug, Clone, PartialEq)]
pub enum Curvature {
    /// A straight segment.
    Straight,
    /// A quadratic Bezier with one relative control point.
    Quadratic { control: Point2 },
    /// A cubic Bezier with two relative control points.
    Cubic { controls: [Point2; 2] },
    /// A circular arc through the relative point `(0.5, cy)`.
    Circle { cy: f64 },
}

/// Maps a relative control point to its position on the reversed chord.
fn flip_rel(p: Point2) -> Point2 {
    Point2::new(1.0 - p.x, -p.y)
}

fn mirror_rel(p: Point2) -> Point2 {
    Point2::new(p.x, -p.y)
}

fn relative(start: &Point2, end: &Point2, abs: &Point2) -> Result<Point2> {
    abs_to_rel(start, end, abs)
        .ok_or_else(|| GeometryError::Degenerate("edge endpoints coincide".into()).into())
}

fn flag(v: bool) -> f64 {
    if v {
        1.0
    } else {
        0.0
    }
}

impl Curvature {
    /// Bezier curvature from zero, one or two relative control points.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::UnsupportedDegree`] for more than two controls.
    pub fn from_controls(controls: &[Point2]) -> Result<Self> {
        match *controls {
            [] => Ok(Self::Straight),
            [control] => Ok(Self::Quadratic { control }),
            [c1, c2] => Ok(Self::Cubic { controls: [c1, c2] }),
            _ => Err(GeometryError::UnsupportedDegree(controls.len()).into()),
        }
    }

    /// Short name used in serialized records.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Straight => "line",
            Self::Quadratic { .. } => "quadratic",
            Self::Cubic { .. } => "cubic",
            Self::Circle { .. } => "circle",
        }
    }

    /// The same shape seen from the opposite end of the chord.
    #[must_use]
    pub fn reversed(&self) -> Self {
        match *self {
            Self::Straight => Self::Straight,
            Self::Quadratic { control } => Self::Quadratic {
                control: flip_rel(control),
            },
            Self::Cubic { controls: [c1, c2] } => Self::Cubic {
                controls: [flip_rel(c2), flip_rel(c1)],
            },
            Self::Circle { cy } => Self::Circle { cy: -cy },
        }
    }

    /// The shape mirrored across its own chord.
    #[must_use]
    pub fn reflected(&self) -> Self {
        match *self {
            Self::Straight => Self::Straight,
            Self::Quadratic { control } => Self::Quadratic {
                control: mirror_rel(control),
            },
            Self::Cubic { controls: [c1, c2] } => Self::Cubic {
                controls: [mirror_rel(c1), mirror_rel(c2)],
            },
            Self::Circle { cy } => Self::Circle { cy: -cy },
        }
    }

    /// Absolute curve between `start` and `end`.
    #[must_use]
    pub fn to_absolute(&self, start: &Point2, end: &Point2) -> EdgeCurve {
        match self {
            Self::Straight => EdgeCurve::Line(Segment::new(*start, *end)),
            Self::Quadratic { control } => EdgeCurve::Quadratic(QuadBezier::new([
                *start,
                rel_to_abs(start, end, control),
                *end,
            ])),
            Self::Cubic { controls } => EdgeCurve::Cubic(CubicBezier::new([
                *start,
                rel_to_abs(start, end, &controls[0]),
                rel_to_abs(start, end, &controls[1]),
                *end,
            ])),
            Self::Circle { cy } => {
                let chord = (end - start).norm();
                let center = rel_to_abs(start, end, &Point2::new(0.5, rel_center_height(*cy)));
                let d = start - center;
                EdgeCurve::Arc(CircularArc::new(
                    center,
                    rel_radius(*cy) * chord,
                    d.y.atan2(d.x),
                    signed_sweep(*cy),
                ))
            }
        }
    }

    /// Relative curvature of an absolute curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve endpoints coincide.
    pub fn from_absolute(curve: &EdgeCurve) -> Result<Self> {
        let (start, end) = (curve.start(), curve.end());
        match curve {
            EdgeCurve::Line(_) => Ok(Self::Straight),
            EdgeCurve::Quadratic(q) => Ok(Self::Quadratic {
                control: relative(&start, &end, &q.points[1])?,
            }),
            EdgeCurve::Cubic(c) => Ok(Self::Cubic {
                controls: [
                    relative(&start, &end, &c.points[1])?,
                    relative(&start, &end, &c.points[2])?,
                ],
            }),
            EdgeCurve::Arc(a) => Ok(Self::Circle {
                cy: relative(&start, &end, &a.evaluate(0.5))?.y,
            }),
        }
    }

    /// Serialized form for an edge with the given chord length.
    ///
    /// Straight edges have no record.
    #[must_use]
    pub fn to_record(&self, chord: f64) -> Option<CurvatureRecord> {
        match *self {
            Self::Straight => None,
            Self::Quadratic { control } => Some(CurvatureRecord::Quadratic(vec![[
                control.x, control.y,
            ]])),
            Self::Cubic { controls: [c1, c2] } => {
                Some(CurvatureRecord::Cubic(vec![[c1.x, c1.y], [c2.x, c2.y]]))
            }
            Self::Circle { cy } => Some(CurvatureRecord::Circle([
                rel_radius(cy) * chord,
                flag(cy.abs() > 0.5),
                flag(cy < 0.0),
            ])),
        }
    }

    /// Rebuilds curvature from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns an error for more than two control points, or for an arc
    /// radius too small to span the chord.
    pub fn from_record(record: Option<&CurvatureRecord>, chord: f64) -> Result<Self> {
        match record {
            None | Some(CurvatureRecord::Line) => Ok(Self::Straight),
            Some(CurvatureRecord::Quadratic(points) | CurvatureRecord::Cubic(points)) => {
                let controls: Vec<Point2> =
                    points.iter().map(|p| Point2::new(p[0], p[1])).collect();
                Self::from_controls(&controls)
            }
            Some(CurvatureRecord::Circle([radius, large, right])) => {
                let rel = if chord > TOLERANCE { radius / chord } else { 0.0 };
                let cy = cy_from_radius(rel, *large > 0.5, *right > 0.5).ok_or_else(|| {
                    GeometryError::Degenerate(format!(
                        "arc radius {radius} cannot span a chord of {chord}"
                    ))
                })?;
                Ok(Self::Circle { cy })
            }
        }
    }
}

/// Data associated with a pattern edge.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
    /// Shape of the edge, relative to its chord.
    pub curvature: Curvature,
    /// Semantic tag carried into the serialized pattern.
    pub label: Option<String>,
    /// Position of the edge in its panel's loop, set by panel assembly.
    pub geometric_id: Option<usize>,
}

impl EdgeData {
    /// Creates an unlabeled edge.
    #[must_use]
    pub fn new(start: VertexId, end: VertexId, curvature: Curvature) -> Self {
        Self {
            start,
            end,
            curvature,
            label: None,
            geometric_id: None,
        }
    }
}

impl PatternStore {
    /// Inserts an edge between two existing vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the endpoints are the same
    /// vertex or sit at the same position, or if an arc is flat.
    pub fn add_edge(&mut self, start: VertexId, end: VertexId, curvature: Curvature) -> Result<EdgeId> {
        if start == end {
            return Err(GeometryError::Degenerate("edge starts and ends at the same vertex".into()).into());
        }
        let (p0, p1) = (self.point(start)?, self.point(end)?);
        if (p1 - p0).norm() < TOLERANCE {
            return Err(GeometryError::Degenerate(format!(
                "edge endpoints coincide at ({}, {})",
                p0.x, p0.y
            ))
            .into());
        }
        if let Curvature::Circle { cy } = curvature {
            if cy.abs() < TOLERANCE {
                return Err(GeometryError::Degenerate("arc with zero height".into()).into());
            }
        }
        Ok(self.edges.insert(EdgeData::new(start, end, curvature)))
    }

    /// Inserts a straight edge.
    ///
    /// # Errors
    ///
    /// See [`PatternStore::add_edge`].
    pub fn add_line(&mut self, start: VertexId, end: VertexId) -> Result<EdgeId> {
        self.add_edge(start, end, Curvature::Straight)
    }

    /// Positions of the start and end vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn edge_points(&self, id: EdgeId) -> Result<(Point2, Point2)> {
        let e = self.edge(id)?;
        Ok((self.point(e.start)?, self.point(e.end)?))
    }

    /// Absolute curve of the edge, rebuilt from the current vertex positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn as_curve(&self, id: EdgeId) -> Result<EdgeCurve> {
        let (p0, p1) = self.edge_points(id)?;
        Ok(self.edge(id)?.curvature.to_absolute(&p0, &p1))
    }

    /// Arc length of the edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn edge_length(&self, id: EdgeId) -> Result<f64> {
        Ok(self.as_curve(id)?.length())
    }

    /// Whether the edge is a straight segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn is_straight(&self, id: EdgeId) -> Result<bool> {
        Ok(matches!(self.edge(id)?.curvature, Curvature::Straight))
    }

    /// Center and radius of a circular edge, `None` for other shapes.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn arc_center_radius(&self, id: EdgeId) -> Result<Option<(Point2, f64)>> {
        Ok(match self.as_curve(id)? {
            EdgeCurve::Arc(arc) => Some((*arc.center(), arc.radius())),
            _ => None,
        })
    }

    /// Walks the edge in the opposite direction without changing its shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn reverse_edge(&mut self, id: EdgeId) -> Result<()> {
        let e = self.edge_mut(id)?;
        std::mem::swap(&mut e.start, &mut e.end);
        e.curvature = e.curvature.reversed();
        Ok(())
    }

    /// Mirrors the shape of the edge across its chord, keeping the endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn reflect_features(&mut self, id: EdgeId) -> Result<()> {
        let e = self.edge_mut(id)?;
        e.curvature = e.curvature.reflected();
        Ok(())
    }

    /// Moves both endpoints of the edge.
    ///
    /// Neighbouring edges sharing a vertex move with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn translate_edge(&mut self, id: EdgeId, by: &Vector2) -> Result<()> {
        let (start, end) = {
            let e = self.edge(id)?;
            (e.start, e.end)
        };
        self.vertex_mut(start)?.point += by;
        self.vertex_mut(end)?.point += by;
        Ok(())
    }

    /// Splits an edge into consecutive pieces sized by `fractions`.
    ///
    /// Fractions are measured in arc length when `by_length` is set and in
    /// curve parameter otherwise; the two agree for lines and arcs. The first
    /// piece starts at the original start vertex, the last one ends at the
    /// original end vertex and consecutive pieces share new vertices. The
    /// original edge is left in the store untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidFractions`] unless every fraction lies
    /// in `(0, 1]` and they sum to 1 within `1e-4`.
    pub fn subdivide_edge(
        &mut self,
        id: EdgeId,
        fractions: &[f64],
        by_length: bool,
    ) -> Result<EdgeSequence> {
        let sum: f64 = fractions.iter().sum();
        if fractions.is_empty()
            || (sum - 1.0).abs() > 1e-4
            || fractions.iter().any(|f| *f <= 0.0 || *f > 1.0)
        {
            return Err(GeometryError::InvalidFractions { sum }.into());
        }

        let (start, end, label) = {
            let e = self.edge(id)?;
            (e.start, e.end, e.label.clone())
        };
        let curve = self.as_curve(id)?;
        let bezier = matches!(curve, EdgeCurve::Quadratic(_) | EdgeCurve::Cubic(_));
        let total = curve.length();

        let mut params = Vec::with_capacity(fractions.len() + 1);
        params.push(0.0);
        let mut acc = 0.0;
        for f in &fractions[..fractions.len() - 1] {
            acc += f;
            params.push(if by_length && bezier {
                curve.param_at_length(acc * total)
            } else {
                acc
            });
        }
        params.push(1.0);

        let mut pieces = EdgeSequence::new();
        let mut prev = start;
        for (i, w) in params.windows(2).enumerate() {
            let next = if i + 2 == params.len() {
                end
            } else {
                self.add_point(curve.evaluate(w[1]))
            };
            let piece = curve.subsegment(w[0], w[1]);
            let eid = self.add_edge(prev, next, Curvature::from_absolute(&piece)?)?;
            self.edge_mut(eid)?.label.clone_from(&label);
            pieces.append(eid);
            prev = next;
        }
        Ok(pieces)
    }

    /// Points along the edge with `n` interior samples, endpoints included.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn edge_samples(&self, id: EdgeId, n: usize) -> Result<Vec<Point2>> {
        let curve = self.as_curve(id)?;
        Ok(match curve {
            EdgeCurve::Line(seg) => vec![seg.start, seg.end],
            curve => curve.sample(n),
        })
    }

    /// Replaces the edge by a straight polyline through `n` interior samples.
    ///
    /// Returns the new chain. It shares the original endpoints; the original
    /// edge stays in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn linearize_edge(&mut self, id: EdgeId, n: usize) -> Result<EdgeSequence> {
        let (start, end) = {
            let e = self.edge(id)?;
            (e.start, e.end)
        };
        let points = self.edge_samples(id, n)?;
        let mut seq = EdgeSequence::new();
        let mut prev = start;
        for (i, p) in points.iter().enumerate().skip(1) {
            let next = if i + 1 == points.len() {
                end
            } else {
                self.add_point(*p)
            };
            seq.append(self.add_line(prev, next)?);
            prev = next;
        }
        Ok(seq)
    }

    /// Endpoint positions plus serialized properties of the edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn edge_assembly(&self, id: EdgeId) -> Result<([Point2; 2], EdgeProperties)> {
        let (p0, p1) = self.edge_points(id)?;
        let e = self.edge(id)?;
        Ok((
            [p0, p1],
            EdgeProperties {
                label: e.label.clone(),
                curvature: e.curvature.to_record((p1 - p0).norm()),
            },
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn store_with_edge(curvature: Curvature) -> (PatternStore, EdgeId) {
        let mut store = PatternStore::new();
        let a = store.add_point(Point2::new(0.0, 0.0));
        let b = store.add_point(Point2::new(2.0, 0.0));
        let e = store.add_edge(a, b, curvature).unwrap();
        (store, e)
    }

    fn shapes() -> Vec<Curvature> {
        vec![
            Curvature::Straight,
            Curvature::Quadratic {
                control: Point2::new(0.3, 0.4),
            },
            Curvature::Cubic {
                controls: [Point2::new(0.2, 0.3), Point2::new(0.7, -0.2)],
            },
            Curvature::Circle { cy: 0.3 },
            Curvature::Circle { cy: -0.8 },
        ]
    }

    #[test]
    fn rejects_degenerate_edges() {
        let mut store = PatternStore::new();
        let a = store.add_point(Point2::new(1.0, 1.0));
        let b = store.add_point(Point2::new(1.0, 1.0));
        assert!(store.add_line(a, a).is_err());
        assert!(store.add_line(a, b).is_err());
        let c = store.add_point(Point2::new(2.0, 1.0));
        assert!(store.add_edge(a, c, Curvature::Circle { cy: 0.0 }).is_err());
    }

    #[test]
    fn too_many_controls() {
        let pts = [Point2::origin(); 3];
        assert!(matches!(
            Curvature::from_controls(&pts),
            Err(crate::error::SeamlineError::Geometry(GeometryError::UnsupportedDegree(3)))
        ));
    }

    #[test]
    fn double_reverse_restores_edge() {
        for shape in shapes() {
            let (mut store, e) = store_with_edge(shape.clone());
            let before = store.as_curve(e).unwrap();
            let start = store.edge(e).unwrap().start;

            store.reverse_edge(e).unwrap();
            let reversed = store.as_curve(e).unwrap();
            assert_relative_eq!(reversed.length(), before.length(), epsilon = 1e-9);
            assert_relative_eq!(reversed.evaluate(0.25), before.evaluate(0.75), epsilon = 1e-9);

            store.reverse_edge(e).unwrap();
            assert_eq!(store.edge(e).unwrap().start, start);
            assert_eq!(store.edge(e).unwrap().curvature.kind(), shape.kind());
            let after = store.as_curve(e).unwrap();
            assert_relative_eq!(after.evaluate(0.4), before.evaluate(0.4), epsilon = 1e-12);
        }
    }

    #[test]
    fn reflect_mirrors_across_chord() {
        let (mut store, e) = store_with_edge(Curvature::Quadratic {
            control: Point2::new(0.5, 0.5),
        });
        let mid = store.as_curve(e).unwrap().evaluate(0.5);
        store.reflect_features(e).unwrap();
        let mirrored = store.as_curve(e).unwrap().evaluate(0.5);
        assert_relative_eq!(mirrored.x, mid.x, epsilon = 1e-12);
        assert_relative_eq!(mirrored.y, -mid.y, epsilon = 1e-12);
    }

    #[test]
    fn arc_midpoint_matches_cy() {
        let (store, e) = store_with_edge(Curvature::Circle { cy: 0.5 });
        let curve = store.as_curve(e).unwrap();
        let mid = curve.evaluate(0.5);
        assert_relative_eq!(mid.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(mid.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(store.edge_length(e).unwrap(), PI, epsilon = 1e-12);
        let (center, radius) = store.arc_center_radius(e).unwrap().unwrap();
        assert_relative_eq!(center, Point2::new(1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(radius, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn subdivide_preserves_length_and_chain() {
        for shape in shapes() {
            let (mut store, e) = store_with_edge(shape);
            let total = store.edge_length(e).unwrap();
            let (start, end) = {
                let d = store.edge(e).unwrap();
                (d.start, d.end)
            };
            let pieces = store.subdivide_edge(e, &[0.3, 0.7], true).unwrap();
            assert_eq!(pieces.len(), 2);
            assert!(pieces.is_chained(&store));
            assert_eq!(store.edge(pieces[0]).unwrap().start, start);
            assert_eq!(store.edge(pieces[1]).unwrap().end, end);
            assert_relative_eq!(pieces.length(&store).unwrap(), total, max_relative = 1e-6);
            assert_relative_eq!(
                store.edge_length(pieces[0]).unwrap(),
                0.3 * total,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn subdivide_by_parameter_on_cubic() {
        let (mut store, e) = store_with_edge(Curvature::Cubic {
            controls: [Point2::new(0.1, 0.6), Point2::new(0.4, 0.6)],
        });
        let split = store.as_curve(e).unwrap().evaluate(0.5);
        let pieces = store.subdivide_edge(e, &[0.5, 0.5], false).unwrap();
        let joint = store.edge(pieces[0]).unwrap().end;
        assert_relative_eq!(store.point(joint).unwrap(), split, epsilon = 1e-12);
    }

    #[test]
    fn subdivide_validates_fractions() {
        let (mut store, e) = store_with_edge(Curvature::Straight);
        assert!(store.subdivide_edge(e, &[0.3, 0.3], true).is_err());
        assert!(store.subdivide_edge(e, &[1.5, -0.5], true).is_err());
        assert!(store.subdivide_edge(e, &[], true).is_err());
        assert!(store.subdivide_edge(e, &[0.5, 0.50005], true).is_ok());
    }

    #[test]
    fn labels_propagate_to_pieces() {
        let (mut store, e) = store_with_edge(Curvature::Circle { cy: 0.2 });
        store.edge_mut(e).unwrap().label = Some("hem".into());
        let pieces = store.subdivide_edge(e, &[0.25, 0.25, 0.5], true).unwrap();
        for id in pieces.iter() {
            assert_eq!(store.edge(*id).unwrap().label.as_deref(), Some("hem"));
            assert!(matches!(store.edge(*id).unwrap().curvature, Curvature::Circle { .. }));
        }
    }

    #[test]
    fn linearize_shares_endpoints() {
        let (mut store, e) = store_with_edge(Curvature::Circle { cy: 0.5 });
        let lin = store.linearize_edge(e, 5).unwrap();
        assert_eq!(lin.len(), 6);
        assert!(lin.is_chained(&store));
        assert_eq!(store.edge(lin[0]).unwrap().start, store.edge(e).unwrap().start);
        assert!(lin.length(&store).unwrap() < PI);
        assert!(lin.length(&store).unwrap() > 0.95 * PI);
    }

    #[test]
    fn arc_record_roundtrip() {
        for cy in [0.2, -0.2, 0.9, -1.4] {
            let shape = Curvature::Circle { cy };
            let record = shape.to_record(2.0);
            let back = Curvature::from_record(record.as_ref(), 2.0).unwrap();
            match back {
                Curvature::Circle { cy: back } => assert_relative_eq!(back, cy, epsilon = 1e-9),
                other => panic!("unexpected curvature {other:?}"),
            }
        }
    }

    #[test]
    fn assembly_reports_arc_flags() {
        let (store, e) = store_with_edge(Curvature::Circle { cy: -0.5 });
        let (points, props) = store.edge_assembly(e).unwrap();
        assert_relative_eq!(points[1], Point2::new(2.0, 0.0));
        match props.curvature {
            Some(CurvatureRecord::Circle([r, large, right])) => {
                assert_relative_eq!(r, 1.0, epsilon = 1e-12);
                assert_relative_eq!(large, 0.0);
                assert_relative_eq!(right, 1.0);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }
}
