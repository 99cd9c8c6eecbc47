use std::collections::BTreeMap;

use crate::error::{OperationError, Result, TopologyError};
use crate::math::Point3;
use crate::serialization::{PatternRecord, StitchEnd, StitchRecord};
use crate::topology::{EdgeId, PanelId, PatternStore};

use super::interface::Interface;
use super::matching::{is_matching, match_interfaces, MatchParams};

/// A connection between two interfaces.
///
/// Construction re-partitions both sides so that their edges pair up
/// positionally.
#[derive(Debug, Clone)]
pub struct StitchingRule {
    a: Interface,
    b: Interface,
}

impl StitchingRule {
    /// Connects two interfaces, splitting edges where their partitions differ.
    ///
    /// # Errors
    ///
    /// Returns an error if matching cannot place all breakpoints.
    pub fn new(store: &mut PatternStore, mut a: Interface, mut b: Interface) -> Result<Self> {
        let params = MatchParams::default();
        if !is_matching(store, &a, &b, &params)? {
            match_interfaces(store, &mut a, &mut b)?;
            if !is_matching(store, &a, &b, &params)? {
                tracing::warn!(
                    sides = ?(a.len(), b.len()),
                    "stitched interfaces still differ after matching"
                );
            }
        }
        Ok(Self { a, b })
    }

    #[must_use]
    pub fn sides(&self) -> (&Interface, &Interface) {
        (&self.a, &self.b)
    }

    /// Whether both sides pair up within the default tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn is_matching(&self, store: &PatternStore) -> Result<bool> {
        is_matching(store, &self.a, &self.b, &MatchParams::default())
    }

    /// Whether both sides run in the same direction once placed in 3D.
    ///
    /// Compares the distance between the matching ends of the two sides with
    /// the distance between crossed ends. Informational only.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge or panel is missing from the store.
    pub fn is_traversal_matching(&self, store: &PatternStore) -> Result<bool> {
        let (a0, a1) = world_ends(store, &self.a)?;
        let (b0, b1) = world_ends(store, &self.b)?;
        let straight = (a0 - b0).norm() + (a1 - b1).norm();
        let crossed = (a0 - b1).norm() + (a1 - b0).norm();
        Ok(straight <= crossed)
    }

    /// Stitch records pairing the edges of both sides.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NotAssembled`] if a panel involved has not
    /// been serialized yet.
    pub fn assembly(&self, store: &PatternStore) -> Result<Vec<StitchRecord>> {
        if self.a.len() != self.b.len() {
            return Err(OperationError::Failed(format!(
                "cannot pair {} edges with {}",
                self.a.len(),
                self.b.len()
            ))
            .into());
        }
        (0..self.a.len())
            .map(|i| -> Result<StitchRecord> {
                Ok(StitchRecord {
                    ends: [stitch_end(store, &self.a, i)?, stitch_end(store, &self.b, i)?],
                    right_wrong: self.a.right_wrong(i) || self.b.right_wrong(i),
                })
            })
            .collect()
    }
}

fn side_edge(inter: &Interface, i: usize) -> Result<(EdgeId, PanelId)> {
    match (inter.edges().get(i), inter.panel(i)) {
        (Some(e), Some(p)) => Ok((e, p)),
        _ => Err(TopologyError::EntityNotFound(format!("interface edge {i}")).into()),
    }
}

fn stitch_end(store: &PatternStore, inter: &Interface, i: usize) -> Result<StitchEnd> {
    let (edge, panel) = side_edge(inter, i)?;
    let name = &store.panel(panel)?.name;
    let id = store.edge(edge)?.geometric_id.ok_or_else(|| TopologyError::NotAssembled {
        panel: name.clone(),
    })?;
    Ok(StitchEnd::new(name.clone(), id))
}

/// First and last point of an interface in world space, in interface order.
fn world_ends(store: &PatternStore, inter: &Interface) -> Result<(Point3, Point3)> {
    let last = inter.len().checked_sub(1).ok_or_else(|| {
        OperationError::InvalidInput("empty interface".into())
    })?;
    let point = |i: usize, at_end: bool| -> Result<Point3> {
        let (edge, panel) = side_edge(inter, i)?;
        let (s, e) = store.edge_points(edge)?;
        let p = if at_end != inter.needs_flipping(i) { e } else { s };
        Ok(store.panel(panel)?.point_to_3d(&p))
    };
    Ok((point(0, false)?, point(last, true)?))
}

/// The stitching rules of a garment.
#[derive(Debug, Clone, Default)]
pub struct Stitches {
    rules: Vec<StitchingRule>,
}

impl Stitches {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, rule: StitchingRule) {
        self.rules.push(rule);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StitchingRule> {
        self.rules.iter()
    }

    /// Records of all rules, in order.
    ///
    /// # Errors
    ///
    /// See [`StitchingRule::assembly`].
    pub fn assembly(&self, store: &PatternStore) -> Result<Vec<StitchRecord>> {
        let mut out = Vec::new();
        for rule in &self.rules {
            out.extend(rule.assembly(store)?);
        }
        Ok(out)
    }
}

impl FromIterator<StitchingRule> for Stitches {
    fn from_iter<I: IntoIterator<Item = StitchingRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Serializes panels and their stitches into one pattern.
///
/// Panels are assembled first since stitch records refer to the edge
/// numbering panel assembly produces.
pub struct AssemblePattern<'a> {
    panels: Vec<PanelId>,
    stitches: &'a Stitches,
}

impl<'a> AssemblePattern<'a> {
    /// Creates a new `AssemblePattern` operation.
    #[must_use]
    pub fn new(panels: Vec<PanelId>, stitches: &'a Stitches) -> Self {
        Self { panels, stitches }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for duplicate panel names and
    /// propagates panel and stitch assembly errors.
    pub fn execute(&self, store: &mut PatternStore) -> Result<PatternRecord> {
        let mut panels = BTreeMap::new();
        for id in &self.panels {
            let record = store.assemble_panel(*id)?;
            let name = store.panel(*id)?.name.clone();
            if panels.insert(name.clone(), record).is_some() {
                return Err(OperationError::InvalidInput(format!("duplicate panel name '{name}'")).into());
            }
        }
        for (i, rule) in self.stitches.iter().enumerate() {
            if !rule.is_matching(store)? {
                tracing::warn!(rule = i, "stitch sides do not match in length");
            }
        }
        Ok(PatternRecord {
            panels,
            stitches: self.stitches.assembly(store)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Vector3};
    use crate::operations::creation::EdgeSeqFactory;
    use crate::topology::{EdgeSequence, PanelData};

    fn rect(store: &mut PatternStore, name: &str, w: f64, h: f64) -> (PanelId, EdgeSequence) {
        let pts = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)].map(|(x, y)| Point2::new(x, y));
        let seq = EdgeSeqFactory::from_verts(store, &pts, true).unwrap();
        let id = store.add_panel(PanelData::new(name, seq.clone()));
        (id, seq)
    }

    fn front_back(store: &mut PatternStore) -> (PanelId, PanelId, StitchingRule) {
        let (front, fs) = rect(store, "front", 2.0, 3.0);
        let (back, bs) = rect(store, "back", 2.0, 3.0);
        // Split the back side so that the rule has to re-partition the front.
        let pieces = store.subdivide_edge(bs[1], &[0.5, 0.5], true).unwrap();
        let mut boundary = bs.clone();
        boundary.substitute(bs[1], &pieces).unwrap();
        store.panel_mut(back).unwrap().edges = boundary;

        let a = Interface::new(store, front, fs.slice(1..2));
        let b = Interface::new(store, back, pieces).with_right_wrong(true);
        let rule = StitchingRule::new(store, a, b).unwrap();
        (front, back, rule)
    }

    #[test]
    fn rule_matches_on_construction() {
        let mut store = PatternStore::new();
        let (front, _, rule) = front_back(&mut store);
        assert!(rule.is_matching(&store).unwrap());
        assert_eq!(rule.sides().0.len(), 2);
        assert_eq!(store.panel(front).unwrap().edges.len(), 5);
    }

    #[test]
    fn assembly_requires_assembled_panels() {
        let mut store = PatternStore::new();
        let (_, _, rule) = front_back(&mut store);
        assert!(matches!(
            rule.assembly(&store),
            Err(crate::error::SeamlineError::Topology(TopologyError::NotAssembled { .. }))
        ));
    }

    #[test]
    fn pattern_assembly_pairs_geometric_ids() {
        let mut store = PatternStore::new();
        let (front, back, rule) = front_back(&mut store);
        let stitches: Stitches = std::iter::once(rule).collect();
        let pattern = AssemblePattern::new(vec![front, back], &stitches)
            .execute(&mut store)
            .unwrap();
        assert_eq!(pattern.panels.len(), 2);
        assert_eq!(pattern.stitches.len(), 2);
        let first = &pattern.stitches[0];
        assert_eq!(first.ends[0], StitchEnd::new("front", 1));
        assert_eq!(first.ends[1], StitchEnd::new("back", 1));
        assert!(first.right_wrong);
        assert_eq!(pattern.stitches[1].ends[0], StitchEnd::new("front", 2));

        let text = pattern.to_json().unwrap();
        assert!(text.contains("right_wrong"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut store = PatternStore::new();
        let (a, _) = rect(&mut store, "same", 1.0, 1.0);
        let (b, _) = rect(&mut store, "same", 1.0, 1.0);
        let stitches = Stitches::new();
        assert!(AssemblePattern::new(vec![a, b], &stitches)
            .execute(&mut store)
            .is_err());
    }

    #[test]
    fn traversal_direction_in_world_space() {
        let mut store = PatternStore::new();
        let (front, fs) = rect(&mut store, "front", 2.0, 3.0);
        let (back, bs) = rect(&mut store, "back", 2.0, 3.0);
        store.panel_mut(back).unwrap().translate_by(&Vector3::new(0.0, 0.0, -1.0));

        let a = Interface::new(&store, front, fs.slice(0..1));
        let same = Interface::new(&store, back, bs.slice(0..1));
        let rule = StitchingRule::new(&mut store, a.clone(), same.clone()).unwrap();
        assert!(rule.is_traversal_matching(&store).unwrap());

        let mut reversed = same;
        reversed.reverse(true);
        let rule = StitchingRule::new(&mut store, a, reversed).unwrap();
        assert!(!rule.is_traversal_matching(&store).unwrap());
    }
}
