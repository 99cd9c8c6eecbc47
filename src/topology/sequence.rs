use std::collections::{HashMap, HashSet};
use std::ops::{Index, Range};

use crate::error::{GeometryError, Result, TopologyError};
use crate::math::intersect_2d::polyline_self_intersects;
use crate::math::{reflect_across, rotate_about, Point2, Vector2, TOLERANCE};

use super::edge::{EdgeData, EdgeId};
use super::vertex::VertexId;
use super::PatternStore;

/// Sampling density used when curved edges are replaced by polylines.
#[derive(Debug, Clone, Copy)]
pub struct LinearizeParams {
    /// Interior samples per curved edge.
    pub samples: usize,
}

impl Default for LinearizeParams {
    fn default() -> Self {
        Self { samples: 20 }
    }
}

/// Axis-aligned bounds of an edge sequence.
#[derive(Debug, Clone)]
pub struct SequenceBounds {
    pub min: Point2,
    pub max: Point2,
    /// Sequence vertices lying on one of the four sides of the box.
    pub extremes: Vec<VertexId>,
}

impl SequenceBounds {
    #[must_use]
    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }
}

/// An ordered list of edges, usually chained end to start.
///
/// The sequence holds edge IDs only; geometry lives in the [`PatternStore`].
/// Two sequences may list the same edge, and substituting an edge in one of
/// them leaves the other untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSequence {
    edges: Vec<EdgeId>,
}

impl EdgeSequence {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_edges(edges: Vec<EdgeId>) -> Self {
        Self { edges }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EdgeId> {
        self.edges.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[EdgeId] {
        &self.edges
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<EdgeId> {
        self.edges.get(index).copied()
    }

    #[must_use]
    pub fn first(&self) -> Option<EdgeId> {
        self.edges.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<EdgeId> {
        self.edges.last().copied()
    }

    pub fn append(&mut self, edge: EdgeId) {
        self.edges.push(edge);
    }

    pub fn append_seq(&mut self, other: &EdgeSequence) {
        self.edges.extend_from_slice(&other.edges);
    }

    /// Inserts an edge at `index`, clamped to the end of the sequence.
    pub fn insert(&mut self, index: usize, edge: EdgeId) {
        self.edges.insert(index.min(self.edges.len()), edge);
    }

    /// Inserts all edges of `other` starting at `index`.
    pub fn insert_seq(&mut self, index: usize, other: &EdgeSequence) {
        let at = index.min(self.edges.len());
        self.edges.splice(at..at, other.edges.iter().copied());
    }

    pub fn pop(&mut self) -> Option<EdgeId> {
        self.edges.pop()
    }

    /// Removes the edge at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<EdgeId> {
        (index < self.edges.len()).then(|| self.edges.remove(index))
    }

    #[must_use]
    pub fn index_of(&self, edge: EdgeId) -> Option<usize> {
        self.edges.iter().position(|e| *e == edge)
    }

    #[must_use]
    pub fn contains(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    /// Replaces `target` by the edges of `replacement`, in place.
    ///
    /// Returns the index where the replacement starts.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::EntityNotFound`] if `target` is not listed.
    pub fn substitute(&mut self, target: EdgeId, replacement: &EdgeSequence) -> Result<usize> {
        let index = self
            .index_of(target)
            .ok_or_else(|| TopologyError::EntityNotFound("edge in sequence".into()))?;
        self.edges
            .splice(index..=index, replacement.edges.iter().copied());
        Ok(index)
    }

    /// A new sequence listing the edges in `range`.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> EdgeSequence {
        let end = range.end.min(self.edges.len());
        let start = range.start.min(end);
        Self::from_edges(self.edges[start..end].to_vec())
    }

    // --- Topology queries ---

    fn data<'a>(&self, store: &'a PatternStore) -> Result<Vec<&'a EdgeData>> {
        self.edges
            .iter()
            .map(|id| store.edge(*id).map_err(Into::into))
            .collect()
    }

    /// Whether each edge starts at the very vertex the previous one ends at.
    #[must_use]
    pub fn is_chained(&self, store: &PatternStore) -> bool {
        let Ok(data) = self.data(store) else {
            return false;
        };
        data.windows(2).all(|w| w[0].end == w[1].start)
    }

    /// Whether the sequence is chained and returns to its first vertex.
    #[must_use]
    pub fn is_loop(&self, store: &PatternStore) -> bool {
        if !self.is_chained(store) {
            return false;
        }
        match (self.first(), self.last()) {
            (Some(f), Some(l)) => match (store.edge(f), store.edge(l)) {
                (Ok(f), Ok(l)) => l.end == f.start,
                _ => false,
            },
            _ => false,
        }
    }

    /// Distinct vertices in traversal order.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn verts(&self, store: &PatternStore) -> Result<Vec<VertexId>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for e in self.data(store)? {
            for v in [e.start, e.end] {
                if seen.insert(v) {
                    out.push(v);
                }
            }
        }
        Ok(out)
    }

    /// Positions of [`EdgeSequence::verts`].
    ///
    /// # Errors
    ///
    /// Returns an error if an edge or vertex is missing from the store.
    pub fn points(&self, store: &PatternStore) -> Result<Vec<Point2>> {
        self.verts(store)?
            .into_iter()
            .map(|v| store.point(v).map_err(Into::into))
            .collect()
    }

    /// Length of each edge.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn lengths(&self, store: &PatternStore) -> Result<Vec<f64>> {
        self.edges.iter().map(|e| store.edge_length(*e)).collect()
    }

    /// Total length.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn length(&self, store: &PatternStore) -> Result<f64> {
        Ok(self.lengths(store)?.iter().sum())
    }

    /// Length of each edge as a fraction of the total.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing or the total length is zero.
    pub fn fractions(&self, store: &PatternStore) -> Result<Vec<f64>> {
        let lengths = self.lengths(store)?;
        let total: f64 = lengths.iter().sum();
        if total < TOLERANCE {
            return Err(GeometryError::Degenerate("edge sequence has zero length".into()).into());
        }
        Ok(lengths.into_iter().map(|l| l / total).collect())
    }

    /// First and last vertex positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is empty.
    pub fn shortcut(&self, store: &PatternStore) -> Result<(Point2, Point2)> {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Err(TopologyError::InvalidTopology("empty edge sequence".into()).into());
        };
        Ok((store.edge_points(first)?.0, store.edge_points(last)?.1))
    }

    /// Vector from the first to the last vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is empty.
    pub fn shortcut_vector(&self, store: &PatternStore) -> Result<Vector2> {
        let (s, e) = self.shortcut(store)?;
        Ok(e - s)
    }

    // --- Transformations ---

    /// Reverses the order of the edges and the direction of each edge.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn reverse(&mut self, store: &mut PatternStore) -> Result<()> {
        self.edges.reverse();
        for e in &self.edges {
            store.reverse_edge(*e)?;
        }
        Ok(())
    }

    /// Moves every distinct vertex once.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge or vertex is missing from the store.
    pub fn translate_by(&self, store: &mut PatternStore, by: &Vector2) -> Result<()> {
        for v in self.verts(store)? {
            store.vertex_mut(v)?.point += by;
        }
        Ok(())
    }

    /// Translates the sequence so that its first vertex lands on `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is empty.
    pub fn snap_to(&self, store: &mut PatternStore, point: &Point2) -> Result<()> {
        let (start, _) = self.shortcut(store)?;
        self.translate_by(store, &(point - start))
    }

    /// Rotates around `pivot` by `angle` radians, counter-clockwise.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge or vertex is missing from the store.
    pub fn rotate(&self, store: &mut PatternStore, angle: f64, pivot: &Point2) -> Result<()> {
        for v in self.verts(store)? {
            let p = store.vertex_mut(v)?;
            p.point = rotate_about(&p.point, pivot, angle);
        }
        Ok(())
    }

    /// Mirrors the sequence across the line through `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge or vertex is missing from the store.
    pub fn reflect(&self, store: &mut PatternStore, a: &Point2, b: &Point2) -> Result<()> {
        for v in self.verts(store)? {
            let p = store.vertex_mut(v)?;
            p.point = reflect_across(&p.point, a, b);
        }
        for e in &self.edges {
            store.reflect_features(*e)?;
        }
        Ok(())
    }

    /// Stretches the sequence along its shortcut by `factor`.
    ///
    /// Every vertex is moved along the shortcut direction so that its
    /// projection onto the shortcut is scaled by `factor` around the first
    /// vertex. The perpendicular profile is kept.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the first and last vertex
    /// coincide.
    pub fn extend(&self, store: &mut PatternStore, factor: f64) -> Result<()> {
        let (s, e) = self.shortcut(store)?;
        let axis = e - s;
        let len = axis.norm();
        if len < TOLERANCE {
            return Err(GeometryError::Degenerate("cannot extend a closed edge run".into()).into());
        }
        let dir = axis / len;
        for v in self.verts(store)? {
            let p = store.vertex_mut(v)?;
            let along = (p.point - s).dot(&dir);
            p.point += dir * (along * (factor - 1.0));
        }
        Ok(())
    }

    /// Bounds of the linearized sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is empty or an entity is missing.
    pub fn bbox(&self, store: &PatternStore, params: &LinearizeParams) -> Result<SequenceBounds> {
        if self.is_empty() {
            return Err(TopologyError::InvalidTopology("empty edge sequence".into()).into());
        }
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for e in &self.edges {
            for p in store.edge_samples(*e, params.samples)? {
                min = min.inf(&p);
                max = max.sup(&p);
            }
        }
        let tol = 1e-6 * (max - min).norm().max(1.0);
        let mut extremes = Vec::new();
        for v in self.verts(store)? {
            let p = store.point(v)?;
            if (p.x - min.x).abs() < tol
                || (p.x - max.x).abs() < tol
                || (p.y - min.y).abs() < tol
                || (p.y - max.y).abs() < tol
            {
                extremes.push(v);
            }
        }
        Ok(SequenceBounds { min, max, extremes })
    }

    /// Polyline approximation sharing the original vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn linearize(&self, store: &mut PatternStore, n: usize) -> Result<EdgeSequence> {
        let mut out = EdgeSequence::new();
        for e in &self.edges {
            out.append_seq(&store.linearize_edge(*e, n)?);
        }
        Ok(out)
    }

    /// Whether the linearized boundary crosses itself.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn is_self_intersecting(
        &self,
        store: &PatternStore,
        params: &LinearizeParams,
    ) -> Result<bool> {
        let closed = self.is_loop(store);
        let mut points: Vec<Point2> = Vec::new();
        for e in &self.edges {
            let samples = store.edge_samples(*e, params.samples)?;
            let skip = usize::from(!points.is_empty());
            points.extend(samples.into_iter().skip(skip));
        }
        if closed {
            points.pop();
        }
        Ok(polyline_self_intersects(&points, closed, 1e-9))
    }

    /// Deep copy with fresh edges and vertices.
    ///
    /// Vertices shared inside the sequence are shared in the copy as well, so
    /// chained joints and loop closure survive.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge or vertex is missing from the store.
    pub fn copy(&self, store: &mut PatternStore) -> Result<EdgeSequence> {
        let mut remap: HashMap<VertexId, VertexId> = HashMap::new();
        let mut out = EdgeSequence::new();
        for e in &self.edges {
            let data = store.edge(*e)?.clone();
            let mut fresh = |v: VertexId, store: &mut PatternStore| -> Result<VertexId> {
                if let Some(n) = remap.get(&v) {
                    return Ok(*n);
                }
                let data = store.vertex(v)?.clone();
                let n = store.add_vertex(data);
                remap.insert(v, n);
                Ok(n)
            };
            let start = fresh(data.start, store)?;
            let end = fresh(data.end, store)?;
            out.append(store.edges.insert(EdgeData {
                start,
                end,
                ..data
            }));
        }
        Ok(out)
    }

    /// Best-effort repair of a chain whose edges were reversed individually.
    ///
    /// Each edge is compared with the one before it and flipped when it
    /// touches the previous end with its own end. The first edge is flipped
    /// when only its start touches the second edge. Edges that touch nothing
    /// are left alone, so disconnected or branching input stays unchained.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn chained_order(&self, store: &mut PatternStore) -> Result<()> {
        if self.edges.len() < 2 {
            return Ok(());
        }
        {
            let first = store.edge(self.edges[0])?;
            let second = store.edge(self.edges[1])?;
            let (fs, fe, ss, se) = (first.start, first.end, second.start, second.end);
            if fe != ss && fe != se && (fs == ss || fs == se) {
                store.reverse_edge(self.edges[0])?;
            }
        }
        for w in self.edges.windows(2) {
            let prev_end = store.edge(w[0])?.end;
            let cur = store.edge(w[1])?;
            if cur.start != prev_end && cur.end == prev_end {
                store.reverse_edge(w[1])?;
            }
        }
        if !self.is_chained(store) {
            tracing::warn!("edge sequence could not be chained");
        }
        Ok(())
    }

    /// Appends a straight edge back to the first vertex unless already closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is empty or the closing edge would be
    /// degenerate.
    pub fn close_loop(&mut self, store: &mut PatternStore) -> Result<()> {
        if self.is_loop(store) {
            return Ok(());
        }
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Err(TopologyError::InvalidTopology("empty edge sequence".into()).into());
        };
        let start = store.edge(last)?.end;
        let end = store.edge(first)?.start;
        let closing = store.add_line(start, end)?;
        self.append(closing);
        Ok(())
    }

    /// Removes the edges from the store, together with vertices no other
    /// edge uses. Meant for temporary copies.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn discard(self, store: &mut PatternStore) -> Result<()> {
        let verts = self.verts(store)?;
        for e in &self.edges {
            store.remove_edge(*e);
        }
        let used: HashSet<VertexId> = store
            .edges
            .values()
            .flat_map(|e| [e.start, e.end])
            .collect();
        for v in verts {
            if !used.contains(&v) {
                store.remove_vertex(v);
            }
        }
        Ok(())
    }
}

impl Index<usize> for EdgeSequence {
    type Output = EdgeId;

    fn index(&self, index: usize) -> &EdgeId {
        &self.edges[index]
    }
}

impl<'a> IntoIterator for &'a EdgeSequence {
    type Item = &'a EdgeId;
    type IntoIter = std::slice::Iter<'a, EdgeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

impl FromIterator<EdgeId> for EdgeSequence {
    fn from_iter<I: IntoIterator<Item = EdgeId>>(iter: I) -> Self {
        Self::from_edges(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Curve;
    use crate::topology::Curvature;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn polyline(store: &mut PatternStore, pts: &[(f64, f64)], closed: bool) -> EdgeSequence {
        let verts: Vec<VertexId> = pts
            .iter()
            .map(|(x, y)| store.add_point(Point2::new(*x, *y)))
            .collect();
        let mut seq = EdgeSequence::new();
        for w in verts.windows(2) {
            seq.append(store.add_line(w[0], w[1]).unwrap());
        }
        if closed {
            seq.close_loop(store).unwrap();
        }
        seq
    }

    fn square(store: &mut PatternStore) -> EdgeSequence {
        polyline(store, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], true)
    }

    #[test]
    fn loop_and_chain_checks() {
        let mut store = PatternStore::new();
        let sq = square(&mut store);
        assert!(sq.is_chained(&store));
        assert!(sq.is_loop(&store));
        assert_eq!(sq.verts(&store).unwrap().len(), 4);
        assert_relative_eq!(sq.length(&store).unwrap(), 4.0);

        let open = polyline(&mut store, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], false);
        assert!(open.is_chained(&store));
        assert!(!open.is_loop(&store));
    }

    #[test]
    fn translate_moves_shared_vertices_once() {
        let mut store = PatternStore::new();
        let sq = square(&mut store);
        sq.translate_by(&mut store, &Vector2::new(2.0, 3.0)).unwrap();
        let pts = sq.points(&store).unwrap();
        assert_relative_eq!(pts[0], Point2::new(2.0, 3.0));
        assert_relative_eq!(pts[2], Point2::new(3.0, 4.0));
    }

    #[test]
    fn substitute_keeps_chain_and_length() {
        let mut store = PatternStore::new();
        let mut sq = square(&mut store);
        let target = sq[1];
        let pieces = store.subdivide_edge(target, &[0.3, 0.7], true).unwrap();
        let at = sq.substitute(target, &pieces).unwrap();
        assert_eq!(at, 1);
        assert_eq!(sq.len(), 5);
        assert!(sq.is_loop(&store));
        assert_relative_eq!(sq.length(&store).unwrap(), 4.0, max_relative = 1e-6);
        assert!(sq.substitute(target, &pieces).is_err());
    }

    #[test]
    fn reverse_composes_edge_reversal() {
        let mut store = PatternStore::new();
        let mut open = polyline(&mut store, &[(0.0, 0.0), (1.0, 0.0), (1.0, 2.0)], false);
        open.reverse(&mut store).unwrap();
        assert!(open.is_chained(&store));
        let (s, e) = open.shortcut(&store).unwrap();
        assert_relative_eq!(s, Point2::new(1.0, 2.0));
        assert_relative_eq!(e, Point2::origin());
    }

    #[test]
    fn rotate_and_snap() {
        let mut store = PatternStore::new();
        let open = polyline(&mut store, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], false);
        open.rotate(&mut store, FRAC_PI_2, &Point2::origin()).unwrap();
        let (_, e) = open.shortcut(&store).unwrap();
        assert_relative_eq!(e, Point2::new(0.0, 2.0), epsilon = 1e-12);
        open.snap_to(&mut store, &Point2::new(5.0, 5.0)).unwrap();
        let (s, e) = open.shortcut(&store).unwrap();
        assert_relative_eq!(s, Point2::new(5.0, 5.0), epsilon = 1e-12);
        assert_relative_eq!(e, Point2::new(5.0, 7.0), epsilon = 1e-12);
    }

    #[test]
    fn reflect_flips_curvature() {
        let mut store = PatternStore::new();
        let a = store.add_point(Point2::new(0.0, 0.0));
        let b = store.add_point(Point2::new(2.0, 0.0));
        let e = store.add_edge(a, b, Curvature::Circle { cy: 0.3 }).unwrap();
        let seq = EdgeSequence::from_edges(vec![e]);
        let mid = store.as_curve(e).unwrap().evaluate(0.5);
        seq.reflect(&mut store, &Point2::new(0.0, 0.0), &Point2::new(0.0, 1.0))
            .unwrap();
        let mirrored = store.as_curve(e).unwrap().evaluate(0.5);
        assert_relative_eq!(mirrored.x, -mid.x, epsilon = 1e-12);
        assert_relative_eq!(mirrored.y, mid.y, epsilon = 1e-12);
    }

    #[test]
    fn extend_scales_along_shortcut() {
        let mut store = PatternStore::new();
        let zig = polyline(&mut store, &[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], false);
        zig.extend(&mut store, 1.5).unwrap();
        let pts = zig.points(&store).unwrap();
        assert_relative_eq!(pts[1], Point2::new(1.5, 1.0), epsilon = 1e-12);
        assert_relative_eq!(pts[2], Point2::new(3.0, 0.0), epsilon = 1e-12);

        let sq = square(&mut store);
        assert!(sq.extend(&mut store, 2.0).is_err());
    }

    #[test]
    fn bbox_accounts_for_curvature() {
        let mut store = PatternStore::new();
        let a = store.add_point(Point2::new(0.0, 0.0));
        let b = store.add_point(Point2::new(2.0, 0.0));
        let e = store.add_edge(a, b, Curvature::Circle { cy: 0.5 }).unwrap();
        let seq = EdgeSequence::from_edges(vec![e]);
        let bounds = seq.bbox(&store, &LinearizeParams { samples: 21 }).unwrap();
        assert_relative_eq!(bounds.max.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.min.x, 0.0, epsilon = 1e-12);
        assert_eq!(bounds.extremes.len(), 2);
    }

    #[test]
    fn copy_reshares_joints() {
        let mut store = PatternStore::new();
        let sq = square(&mut store);
        let dup = sq.copy(&mut store).unwrap();
        assert!(dup.is_loop(&store));
        assert!(dup.iter().all(|e| !sq.contains(*e)));
        dup.translate_by(&mut store, &Vector2::new(10.0, 0.0)).unwrap();
        assert_relative_eq!(sq.points(&store).unwrap()[0], Point2::origin());

        let vertices = store.vertex_count();
        dup.discard(&mut store).unwrap();
        assert_eq!(store.vertex_count(), vertices - 4);
        assert!(sq.is_loop(&store));
    }

    #[test]
    fn chained_order_repairs_flipped_edges() {
        let mut store = PatternStore::new();
        let open = polyline(&mut store, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (2.0, 1.0)], false);
        store.reverse_edge(open[0]).unwrap();
        store.reverse_edge(open[2]).unwrap();
        assert!(!open.is_chained(&store));
        open.chained_order(&mut store).unwrap();
        assert!(open.is_chained(&store));
        let (s, e) = open.shortcut(&store).unwrap();
        assert_relative_eq!(s, Point2::origin());
        assert_relative_eq!(e, Point2::new(2.0, 1.0));
    }

    #[test]
    fn self_intersection() {
        let mut store = PatternStore::new();
        let sq = square(&mut store);
        assert!(!sq.is_self_intersecting(&store, &LinearizeParams::default()).unwrap());
        let bow = polyline(&mut store, &[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)], true);
        assert!(bow.is_self_intersecting(&store, &LinearizeParams::default()).unwrap());
    }

    #[test]
    fn list_operations() {
        let mut store = PatternStore::new();
        let sq = square(&mut store);
        let mut seq = sq.slice(1..3);
        assert_eq!(seq.as_slice(), &sq.as_slice()[1..3]);
        seq.insert(0, sq[0]);
        seq.append(sq[3]);
        assert_eq!(seq, sq);
        assert_eq!(seq.remove(0), Some(sq[0]));
        assert_eq!(seq.remove(10), None);
        assert_eq!(seq.pop(), Some(sq[3]));
        assert_eq!(seq.index_of(sq[2]), Some(1));
        let mut other = EdgeSequence::new();
        other.insert_seq(0, &seq);
        other.insert_seq(0, &sq.slice(0..1));
        assert_eq!(other.len(), 3);
    }
}
