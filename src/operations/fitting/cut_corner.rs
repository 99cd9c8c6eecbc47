use crate::error::{OperationError, Result};
use crate::geometry::Curve;
use crate::math::minimize::{nelder_mead, MinimizeConfig};
use crate::math::{vector_angle, TOLERANCE};
use crate::stitching::Interface;
use crate::topology::{EdgeId, EdgeSequence, PanelId, PatternStore, VertexId};

use super::cut_edge::attach;

/// Parameters closer than this to an edge end keep or drop the whole edge.
const PARAM_EPS: f64 = 1e-9;

/// Result of [`CutCorner`].
#[derive(Debug, Clone)]
pub struct CornerCut {
    /// The inserted shape.
    pub inserted: EdgeSequence,
    /// Interface over the inserted shape.
    pub interface: Interface,
}

/// Replaces the corner between two consecutive boundary edges by a shape.
///
/// The corner is given as a two-edge interface on its panel, listing the
/// edges that meet there in either order. Points on both edges
/// are fitted so that the vector between them matches the shape's
/// shortcut. Both edges are trimmed there and the shape is spliced in
/// between, rotated onto the fitted points. The shape is not mirrored.
pub struct CutCorner {
    target: EdgeSequence,
    corner: Interface,
    register_as: Option<String>,
}

impl CutCorner {
    /// Creates a new `CutCorner` operation.
    #[must_use]
    pub fn new(target: EdgeSequence, corner: Interface) -> Self {
        Self {
            target,
            corner,
            register_as: None,
        }
    }

    /// Registers the interface over the inserted shape on the panel.
    #[must_use]
    pub fn register_as(mut self, name: impl Into<String>) -> Self {
        self.register_as = Some(name.into());
        self
    }

    /// Executes the operation.
    ///
    /// The panel boundary and the panel's registered interfaces are updated.
    /// Interfaces held elsewhere, such as in stitching rules, keep the
    /// original edges.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] unless the corner consists of
    /// two chained edges of one panel, or if the fit collapses onto the
    /// corner vertex.
    pub fn execute(&self, store: &mut PatternStore) -> Result<CornerCut> {
        let (panel, e1, e2) = self.corner_edges(store)?;
        let shortcut = self.target.shortcut_vector(store)?;
        if shortcut.norm() < TOLERANCE {
            return Err(OperationError::InvalidInput("shape to insert has no opening".into()).into());
        }

        let (c1, c2) = (store.as_curve(e1)?, store.as_curve(e2)?);
        let objective = |t: &[f64]| (c2.evaluate(t[1]) - c1.evaluate(t[0]) - shortcut).norm_squared();
        let bounds = [(0.0, 1.0), (0.0, 1.0)];
        let result = nelder_mead(objective, &[0.5, 0.5], Some(&bounds[..]), &MinimizeConfig::default())?;
        tracing::debug!(
            residual = result.value.sqrt(),
            iterations = result.iterations,
            "corner cut fit"
        );
        if !result.converged {
            tracing::warn!(residual = result.value.sqrt(), "corner cut fit did not converge");
        }
        let (t1, t2) = (result.x[0], result.x[1]);

        let (keep1, join1) = trim_leading(store, e1, t1)?;
        let (keep2, join2) = trim_trailing(store, e2, t2)?;
        if join1 == join2 {
            return Err(OperationError::InvalidInput("corner cut collapses onto the corner".into()).into());
        }

        let (p1, p2) = (store.point(join1)?, store.point(join2)?);
        let (start, _) = self.target.shortcut(store)?;
        self.target.rotate(store, vector_angle(&shortcut, &(p2 - p1)), &start)?;
        self.target.snap_to(store, &p1)?;
        attach(store, &self.target, join1, join2)?;

        let replacement: EdgeSequence = keep1
            .into_iter()
            .chain(self.target.iter().copied())
            .chain(keep2)
            .collect();
        Self::update_panel(store, panel, (e1, keep1), (e2, keep2), &replacement)?;

        let interface = Interface::new(store, panel, self.target.clone());
        if let Some(name) = &self.register_as {
            store
                .panel_mut(panel)?
                .interfaces
                .insert(name.clone(), interface.clone());
        }
        Ok(CornerCut {
            inserted: self.target.clone(),
            interface,
        })
    }

    fn corner_edges(&self, store: &PatternStore) -> Result<(PanelId, EdgeId, EdgeId)> {
        let edges = self.corner.edges();
        let (Some(e1), Some(e2), Some(panel)) = (edges.first(), edges.get(1), self.corner.panel(0)) else {
            return Err(OperationError::InvalidInput("corner needs two edges".into()).into());
        };
        if edges.len() != 2 || self.corner.panel(1) != Some(panel) {
            return Err(OperationError::InvalidInput(
                "corner must be two edges of one panel".into(),
            )
            .into());
        }
        let (first, second) = (store.edge(e1)?, store.edge(e2)?);
        if first.end == second.start {
            Ok((panel, e1, e2))
        } else if second.end == first.start {
            Ok((panel, e2, e1))
        } else {
            Err(OperationError::InvalidInput("corner edges must be chained".into()).into())
        }
    }

    fn update_panel(
        store: &mut PatternStore,
        panel: PanelId,
        (e1, keep1): (EdgeId, Option<EdgeId>),
        (e2, keep2): (EdgeId, Option<EdgeId>),
        replacement: &EdgeSequence,
    ) -> Result<()> {
        let data = store.panel_mut(panel)?;
        data.edges.substitute(e1, replacement)?;
        if let Some(at) = data.edges.index_of(e2) {
            data.edges.remove(at);
        }
        for interface in data.interfaces.values_mut() {
            for (old, kept) in [(e1, keep1), (e2, keep2)] {
                if !interface.edges().contains(old) {
                    continue;
                }
                match kept {
                    Some(k) if k != old => interface.substitute(old, &EdgeSequence::from_edges(vec![k]))?,
                    Some(_) => {}
                    None => interface.remove(old)?,
                }
            }
        }
        Ok(())
    }
}

/// Keeps the part of `edge` before `t`. Returns the kept edge and the vertex
/// the shape joins.
fn trim_leading(store: &mut PatternStore, edge: EdgeId, t: f64) -> Result<(Option<EdgeId>, VertexId)> {
    let data = store.edge(edge)?;
    if t <= PARAM_EPS {
        return Ok((None, data.start));
    }
    if t >= 1.0 - PARAM_EPS {
        return Ok((Some(edge), data.end));
    }
    let pieces = store.subdivide_edge(edge, &[t, 1.0 - t], false)?;
    let (keep, rest) = (pieces[0], pieces[1]);
    let join = store.edge(keep)?.end;
    store.remove_edge(rest);
    Ok((Some(keep), join))
}

/// Keeps the part of `edge` after `t`.
fn trim_trailing(store: &mut PatternStore, edge: EdgeId, t: f64) -> Result<(Option<EdgeId>, VertexId)> {
    let data = store.edge(edge)?;
    if t >= 1.0 - PARAM_EPS {
        return Ok((None, data.end));
    }
    if t <= PARAM_EPS {
        return Ok((Some(edge), data.start));
    }
    let pieces = store.subdivide_edge(edge, &[t, 1.0 - t], false)?;
    let (rest, keep) = (pieces[0], pieces[1]);
    let join = store.edge(keep)?.start;
    store.remove_edge(rest);
    Ok((Some(keep), join))
}
