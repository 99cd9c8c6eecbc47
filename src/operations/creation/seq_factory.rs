use crate::error::{GeometryError, OperationError, Result, TopologyError};
use crate::math::{close_enough, Point2};
use crate::serialization::PanelRecord;
use crate::topology::{Curvature, EdgeSequence, PatternStore, VertexId};

/// Builds chained edge sequences.
pub struct EdgeSeqFactory;

impl EdgeSeqFactory {
    /// Straight edges through `points`, sharing vertices.
    ///
    /// With `close_loop` a last edge returns to the first vertex.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for fewer than two points and
    /// propagates errors for coincident consecutive points.
    pub fn from_verts(
        store: &mut PatternStore,
        points: &[Point2],
        close_loop: bool,
    ) -> Result<EdgeSequence> {
        if points.len() < 2 {
            return Err(OperationError::InvalidInput(format!(
                "need at least two points, got {}",
                points.len()
            ))
            .into());
        }
        let verts: Vec<VertexId> = points.iter().map(|p| store.add_point(*p)).collect();
        let mut seq = EdgeSequence::new();
        for w in verts.windows(2) {
            seq.append(store.add_line(w[0], w[1])?);
        }
        if close_loop {
            if let (Some(&last), Some(&first)) = (verts.last(), verts.first()) {
                seq.append(store.add_line(last, first)?);
            }
        }
        Ok(seq)
    }

    /// Straight run from `start` to `end` broken at the given length
    /// fractions.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidFractions`] unless the fractions are
    /// positive and sum to 1.
    pub fn from_fractions(
        store: &mut PatternStore,
        start: Point2,
        end: Point2,
        fractions: &[f64],
    ) -> Result<EdgeSequence> {
        let sum: f64 = fractions.iter().sum();
        if fractions.is_empty()
            || !close_enough(sum, 1.0, 1e-4)
            || fractions.iter().any(|f| *f <= 0.0)
        {
            return Err(GeometryError::InvalidFractions { sum }.into());
        }
        let chord = end - start;
        let mut points = vec![start];
        let mut acc = 0.0;
        for f in &fractions[..fractions.len() - 1] {
            acc += f;
            points.push(start + chord * acc);
        }
        points.push(end);
        Self::from_verts(store, &points, false)
    }

    /// Straight side with extra vertices `start_cut` and `end_cut` chord
    /// fractions away from its ends.
    ///
    /// Lets a stitch cover only the middle part of a long side. A zero cut
    /// adds no vertex.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the cuts overlap.
    pub fn side_with_cut(
        store: &mut PatternStore,
        start: Point2,
        end: Point2,
        start_cut: f64,
        end_cut: f64,
    ) -> Result<EdgeSequence> {
        if start_cut < 0.0 || end_cut < 0.0 || start_cut + end_cut >= 1.0 {
            return Err(OperationError::InvalidInput(format!(
                "cuts {start_cut} and {end_cut} do not fit on one side"
            ))
            .into());
        }
        let chord = end - start;
        let mut points = vec![start];
        if start_cut > 0.0 {
            points.push(start + chord * start_cut);
        }
        if end_cut > 0.0 {
            points.push(end - chord * end_cut);
        }
        points.push(end);
        Self::from_verts(store, &points, false)
    }

    /// Two equal sides of a dart opening of `width`, tip pointing to -y.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the sides are too short
    /// to span the opening.
    pub fn dart_shape(store: &mut PatternStore, width: f64, side_len: f64) -> Result<EdgeSequence> {
        let half = width / 2.0;
        if width <= 0.0 || half > side_len {
            return Err(OperationError::InvalidInput(format!(
                "dart sides of {side_len} cannot span an opening of {width}"
            ))
            .into());
        }
        let depth = (side_len * side_len - half * half).max(0.0).sqrt();
        Self::from_verts(
            store,
            &[
                Point2::origin(),
                Point2::new(half, -depth),
                Point2::new(width, 0.0),
            ],
            false,
        )
    }

    /// Boundary edges of a serialized panel.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::EntityNotFound`] for out-of-range vertex
    /// indices and propagates curvature conversion errors.
    pub fn from_record(store: &mut PatternStore, record: &PanelRecord) -> Result<EdgeSequence> {
        let verts: Vec<VertexId> = record
            .vertices
            .iter()
            .map(|[x, y]| store.add_point(Point2::new(*x, *y)))
            .collect();
        let mut seq = EdgeSequence::new();
        for (i, e) in record.edges.iter().enumerate() {
            let [s, t] = e.endpoints;
            let (Some(&start), Some(&end)) = (verts.get(s), verts.get(t)) else {
                return Err(TopologyError::EntityNotFound(format!(
                    "vertex {s} or {t} of edge {i}"
                ))
                .into());
            };
            let chord = (store.point(end)? - store.point(start)?).norm();
            let curvature = Curvature::from_record(e.properties.curvature.as_ref(), chord)?;
            let id = store.add_edge(start, end, curvature)?;
            store.edge_mut(id)?.label.clone_from(&e.properties.label);
            seq.append(id);
        }
        Ok(seq)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn verts_share_vertices() {
        let mut store = PatternStore::new();
        let pts = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)];
        let seq = EdgeSeqFactory::from_verts(&mut store, &pts, false).unwrap();
        assert_eq!(seq.len(), 2);
        assert!(seq.is_chained(&store));
        assert!(!seq.is_loop(&store));
        for l in seq.lengths(&store).unwrap() {
            assert_relative_eq!(l, 1.0, epsilon = 1e-12);
        }
        assert!(store.is_straight(seq[0]).unwrap());
        assert_eq!(store.vertex_count(), 3);

        let closed = EdgeSeqFactory::from_verts(&mut store, &pts, true).unwrap();
        assert_eq!(closed.len(), 3);
        assert!(closed.is_loop(&store));

        assert!(EdgeSeqFactory::from_verts(&mut store, &pts[..1], false).is_err());
    }

    #[test]
    fn fractions_split_chord() {
        let mut store = PatternStore::new();
        let seq = EdgeSeqFactory::from_fractions(
            &mut store,
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            &[0.2, 0.3, 0.5],
        )
        .unwrap();
        let lengths = seq.lengths(&store).unwrap();
        assert_relative_eq!(lengths[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(lengths[1], 3.0, epsilon = 1e-12);
        assert_relative_eq!(lengths[2], 5.0, epsilon = 1e-12);

        assert!(matches!(
            EdgeSeqFactory::from_fractions(&mut store, Point2::origin(), Point2::new(1.0, 0.0), &[0.5, 0.6]),
            Err(crate::error::SeamlineError::Geometry(GeometryError::InvalidFractions { .. }))
        ));
    }

    #[test]
    fn side_cuts() {
        let mut store = PatternStore::new();
        let start = Point2::origin();
        let end = Point2::new(10.0, 0.0);
        let seq = EdgeSeqFactory::side_with_cut(&mut store, start, end, 0.1, 0.2).unwrap();
        let lengths = seq.lengths(&store).unwrap();
        assert_eq!(lengths.len(), 3);
        assert_relative_eq!(lengths[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(lengths[2], 2.0, epsilon = 1e-12);

        let plain = EdgeSeqFactory::side_with_cut(&mut store, start, end, 0.0, 0.3).unwrap();
        assert_eq!(plain.len(), 2);
        assert!(EdgeSeqFactory::side_with_cut(&mut store, start, end, 0.6, 0.5).is_err());
    }

    #[test]
    fn dart_sides_have_requested_length() {
        let mut store = PatternStore::new();
        let dart = EdgeSeqFactory::dart_shape(&mut store, 2.0, 3.0).unwrap();
        assert_eq!(dart.len(), 2);
        for l in dart.lengths(&store).unwrap() {
            assert_relative_eq!(l, 3.0, epsilon = 1e-12);
        }
        let (s, e) = dart.shortcut(&store).unwrap();
        assert_relative_eq!((e - s).norm(), 2.0, epsilon = 1e-12);
        assert!(EdgeSeqFactory::dart_shape(&mut store, 8.0, 3.0).is_err());

        // Sides exactly half the opening give a flat dart.
        let flat = EdgeSeqFactory::dart_shape(&mut store, 6.0, 3.0).unwrap();
        assert_eq!(flat.len(), 2);
        assert!(flat.is_chained(&store));
        assert_relative_eq!(store.edge_points(flat[0]).unwrap().1, Point2::new(3.0, 0.0));
    }

    #[test]
    fn record_round_trip_keeps_curvature() {
        let mut store = PatternStore::new();
        let seq = EdgeSeqFactory::from_verts(
            &mut store,
            &[Point2::new(0.0, 0.0), Point2::new(4.0, 0.0), Point2::new(2.0, 3.0)],
            true,
        )
        .unwrap();
        store.edge_mut(seq[0]).unwrap().curvature = Curvature::Circle { cy: -0.3 };
        store.edge_mut(seq[1]).unwrap().label = Some("hem".into());
        let panel = store.add_panel(crate::topology::PanelData::new("p", seq.clone()));
        let record = store.assemble_panel(panel).unwrap();

        let rebuilt = EdgeSeqFactory::from_record(&mut store, &record).unwrap();
        assert_eq!(rebuilt.len(), 3);
        assert!(rebuilt.is_loop(&store));
        assert_relative_eq!(
            rebuilt.length(&store).unwrap(),
            seq.length(&store).unwrap(),
            epsilon = 1e-9
        );
        assert_eq!(store.edge(rebuilt[1]).unwrap().label.as_deref(), Some("hem"));

        let mut broken = record;
        broken.edges[0].endpoints = [0, 9];
        assert!(EdgeSeqFactory::from_record(&mut store, &broken).is_err());
    }
}
