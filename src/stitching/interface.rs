use std::ops::Range;

use crate::error::{OperationError, Result};
use crate::math::close_enough;
use crate::topology::{EdgeId, EdgeSequence, PanelId, PatternStore};

/// A run of interface edges sharing one gather coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuffleSection {
    /// First edge index of the section.
    pub start: usize,
    /// One past the last edge index.
    pub end: usize,
    /// Gather ratio. `1.0` means flat; above one the stitched partner is
    /// proportionally shorter.
    pub coeff: f64,
}

impl RuffleSection {
    #[must_use]
    pub fn new(start: usize, end: usize, coeff: f64) -> Self {
        Self { start, end, coeff }
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    fn is_flat(&self) -> bool {
        close_enough(self.coeff, 1.0, 1e-3)
    }
}

/// Part of one or more panel boundaries offered for stitching.
///
/// Per edge the interface records the owning panel, whether the edge runs
/// against the interface direction and whether it should be stitched right
/// side to wrong side. Ruffle sections partition the edge indices.
#[derive(Debug, Clone)]
pub struct Interface {
    edges: EdgeSequence,
    panels: Vec<PanelId>,
    flipped: Vec<bool>,
    right_wrong: Vec<bool>,
    ruffle: Vec<RuffleSection>,
}

impl Interface {
    /// Interface over `edges` of `panel`, flat and right side to right side.
    ///
    /// Edges connected to their neighbours end to end are marked as flipped
    /// so that [`Interface::oriented_edges`] walks a consistent direction.
    #[must_use]
    pub fn new(store: &PatternStore, panel: PanelId, edges: EdgeSequence) -> Self {
        let n = edges.len();
        let flipped = detect_flipping(store, &edges);
        Self {
            edges,
            panels: vec![panel; n],
            flipped,
            right_wrong: vec![false; n],
            ruffle: vec![RuffleSection::new(0, n, 1.0)],
        }
    }

    /// Sets a single gather coefficient for the whole interface.
    #[must_use]
    pub fn with_ruffle(mut self, coeff: f64) -> Self {
        self.ruffle = vec![RuffleSection::new(0, self.edges.len(), coeff)];
        self
    }

    /// Sets per-section gather coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] unless the sections cover
    /// all edges contiguously, in order, with positive coefficients.
    pub fn with_ruffle_sections(mut self, sections: Vec<RuffleSection>) -> Result<Self> {
        let mut next = 0;
        for s in &sections {
            if s.start != next || s.end <= s.start || s.coeff <= 0.0 {
                return Err(OperationError::InvalidInput(format!(
                    "ruffle section {}..{} (coeff {}) breaks the partition",
                    s.start, s.end, s.coeff
                ))
                .into());
            }
            next = s.end;
        }
        if next != self.edges.len() {
            return Err(OperationError::InvalidInput(format!(
                "ruffle sections cover {next} of {} edges",
                self.edges.len()
            ))
            .into());
        }
        self.ruffle = sections;
        Ok(self)
    }

    #[must_use]
    pub fn with_right_wrong(mut self, right_wrong: bool) -> Self {
        self.right_wrong = vec![right_wrong; self.edges.len()];
        self
    }

    /// Concatenates interfaces, possibly from different panels.
    #[must_use]
    pub fn from_multiple(parts: &[&Interface]) -> Self {
        let mut out = Self {
            edges: EdgeSequence::new(),
            panels: Vec::new(),
            flipped: Vec::new(),
            right_wrong: Vec::new(),
            ruffle: Vec::new(),
        };
        for part in parts {
            let offset = out.edges.len();
            out.edges.append_seq(&part.edges);
            out.panels.extend_from_slice(&part.panels);
            out.flipped.extend_from_slice(&part.flipped);
            out.right_wrong.extend_from_slice(&part.right_wrong);
            out.ruffle.extend(
                part.ruffle
                    .iter()
                    .map(|r| RuffleSection::new(r.start + offset, r.end + offset, r.coeff)),
            );
        }
        out
    }

    #[must_use]
    pub fn edges(&self) -> &EdgeSequence {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn panel(&self, i: usize) -> Option<PanelId> {
        self.panels.get(i).copied()
    }

    #[must_use]
    pub fn panels(&self) -> &[PanelId] {
        &self.panels
    }

    #[must_use]
    pub fn ruffle(&self) -> &[RuffleSection] {
        &self.ruffle
    }

    /// Whether edge `i` runs against the interface direction.
    #[must_use]
    pub fn needs_flipping(&self, i: usize) -> bool {
        self.flipped.get(i).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn right_wrong(&self, i: usize) -> bool {
        self.right_wrong.get(i).copied().unwrap_or(false)
    }

    /// Reverses the interface direction.
    ///
    /// With `with_edge_dir_reverse` the flip flags are inverted too, for
    /// when the edges themselves keep their direction. Without it the caller
    /// is expected to have reversed the edges in the store.
    pub fn reverse(&mut self, with_edge_dir_reverse: bool) {
        let n = self.edges.len();
        self.edges = self.edges.iter().rev().copied().collect();
        self.panels.reverse();
        self.flipped.reverse();
        self.right_wrong.reverse();
        if with_edge_dir_reverse {
            for f in &mut self.flipped {
                *f = !*f;
            }
        }
        self.ruffle = self
            .ruffle
            .iter()
            .rev()
            .map(|r| RuffleSection::new(n - r.end, n - r.start, r.coeff))
            .collect();
    }

    /// Replaces `target` by `replacement`, listed in interface order.
    ///
    /// The new edges inherit the panel, flip and side flags of the edge they
    /// replace and stay in its ruffle section.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not part of the interface.
    pub fn substitute(&mut self, target: EdgeId, replacement: &EdgeSequence) -> Result<()> {
        let at = self.edges.substitute(target, replacement)?;
        let k = replacement.len();
        let (panel, flipped, rw) = (self.panels[at], self.flipped[at], self.right_wrong[at]);
        self.panels.splice(at..=at, std::iter::repeat(panel).take(k));
        self.flipped.splice(at..=at, std::iter::repeat(flipped).take(k));
        self.right_wrong.splice(at..=at, std::iter::repeat(rw).take(k));

        for r in &mut self.ruffle {
            if r.start > at {
                r.start = r.start + k - 1;
            }
            if r.end > at {
                r.end = r.end + k - 1;
            }
        }
        Ok(())
    }

    /// Drops `target` from the interface. Ruffle sections left empty are
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not part of the interface.
    pub fn remove(&mut self, target: EdgeId) -> Result<()> {
        let at = self.edges.index_of(target).ok_or_else(|| {
            OperationError::InvalidInput("edge is not part of the interface".into())
        })?;
        self.edges.remove(at);
        self.panels.remove(at);
        self.flipped.remove(at);
        self.right_wrong.remove(at);
        for r in &mut self.ruffle {
            if r.start > at {
                r.start -= 1;
            }
            if r.end > at {
                r.end -= 1;
            }
        }
        self.ruffle.retain(|r| r.end > r.start);
        Ok(())
    }

    /// Working copy of the edges, each walked in the interface direction.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn oriented_edges(&self, store: &mut PatternStore) -> Result<EdgeSequence> {
        let oriented = self.edges.copy(store)?;
        for (i, e) in oriented.iter().enumerate() {
            if self.needs_flipping(i) {
                store.reverse_edge(*e)?;
            }
        }
        Ok(oriented)
    }

    /// Working copy of the edges with every gathered section stretched to
    /// its flat length.
    ///
    /// Sections are stretched one at a time along their own shortcut. The
    /// edges after a stretched section are detached from it, moved onto its
    /// new end and joined again, so later sections keep their shape. The
    /// copy should be discarded by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing or a gathered section starts
    /// and ends at the same point.
    pub fn projecting_edges(
        &self,
        store: &mut PatternStore,
        on_oriented: bool,
    ) -> Result<EdgeSequence> {
        let projected = if on_oriented {
            self.oriented_edges(store)?
        } else {
            self.edges.copy(store)?
        };

        for r in self.ruffle.iter().filter(|r| !r.is_flat()) {
            let section = projected.slice(r.range());
            let trailing = projected.slice(r.end..projected.len());
            let joint = match (section.last(), trailing.first()) {
                (Some(last), Some(next)) => {
                    let shared = store.edge(last)?.end;
                    (store.edge(next)?.start == shared).then_some((shared, next))
                }
                _ => None,
            };

            let detached = match joint {
                Some((shared, next)) => {
                    let at = store.point(shared)?;
                    let copy = store.add_point(at);
                    store.edge_mut(next)?.start = copy;
                    Some((shared, copy, next))
                }
                None => None,
            };

            section.extend(store, 1.0 / r.coeff)?;

            if let Some((shared, copy, next)) = detached {
                let shift = store.point(shared)? - store.point(copy)?;
                trailing.translate_by(store, &shift)?;
                store.edge_mut(next)?.start = shared;
                store.remove_vertex(copy);
            }
        }
        Ok(projected)
    }

    /// Desired stitch length of every edge: its length divided by the gather
    /// coefficient of its section.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn projecting_lengths(&self, store: &PatternStore) -> Result<Vec<f64>> {
        let mut lengths = self.edges.lengths(store)?;
        for r in &self.ruffle {
            for l in &mut lengths[r.range()] {
                *l /= r.coeff;
            }
        }
        Ok(lengths)
    }

    /// [`Interface::projecting_lengths`] normalized to sum to one.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing or the interface has no length.
    pub fn projecting_fractions(&self, store: &PatternStore) -> Result<Vec<f64>> {
        let lengths = self.projecting_lengths(store)?;
        let total: f64 = lengths.iter().sum();
        if total <= 0.0 {
            return Err(OperationError::InvalidInput("interface has zero length".into()).into());
        }
        Ok(lengths.into_iter().map(|l| l / total).collect())
    }

    /// Geometric length of the interface edges.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn length(&self, store: &PatternStore) -> Result<f64> {
        self.edges.length(store)
    }
}

/// Marks edges that meet their neighbours end to end.
fn detect_flipping(store: &PatternStore, edges: &EdgeSequence) -> Vec<bool> {
    let ends: Vec<_> = edges
        .iter()
        .map(|e| store.edge(*e).map(|d| (d.start, d.end)).ok())
        .collect();
    let mut flipped = vec![false; ends.len()];
    if ends.len() < 2 {
        return flipped;
    }
    if let (Some((s0, e0)), Some((s1, e1))) = (ends[0], ends[1]) {
        flipped[0] = e0 != s1 && e0 != e1 && (s0 == s1 || s0 == e1);
    }
    for i in 1..ends.len() {
        let (Some(prev), Some((s, e))) = (ends[i - 1], ends[i]) else {
            continue;
        };
        let prev_end = if flipped[i - 1] { prev.0 } else { prev.1 };
        flipped[i] = s != prev_end && e == prev_end;
    }
    flipped
}
