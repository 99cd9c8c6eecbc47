//! Re-partitioning of two interfaces so their edges pair up one to one.
//!
//! Both interfaces are described by the fractions of their projecting
//! lengths. Every breakpoint of one side that the other side lacks is added
//! by splitting the edge it falls into.

use crate::error::{OperationError, Result};
use crate::math::close_enough;
use crate::topology::{EdgeSequence, PatternStore};

use super::interface::Interface;

/// Tolerance of [`is_matching`].
#[derive(Debug, Clone, Copy)]
pub struct MatchParams {
    /// Largest accepted difference between paired projecting fractions.
    pub tol: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self { tol: 0.05 }
    }
}

/// Whether two interfaces already pair up edge by edge.
///
/// # Errors
///
/// Returns an error if an edge is missing or an interface has no length.
pub fn is_matching(
    store: &PatternStore,
    a: &Interface,
    b: &Interface,
    params: &MatchParams,
) -> Result<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    let fa = a.projecting_fractions(store)?;
    let fb = b.projecting_fractions(store)?;
    Ok(fa
        .iter()
        .zip(fb.iter())
        .all(|(x, y)| close_enough(*x, *y, params.tol)))
}

/// Splits edges of both interfaces until their breakpoints coincide.
///
/// Split edges are replaced in the boundary of the panel that owns them and
/// in the interface. Other interfaces listing a split edge keep the original
/// edge, so the original stays in the store. Once nothing refers to it any
/// more it can be dropped with [`PatternStore::remove_edge`].
///
/// # Errors
///
/// Returns [`OperationError::ProjectionMismatch`] if the breakpoints of one
/// side cannot all be placed on the other, and propagates store errors.
pub fn match_interfaces(store: &mut PatternStore, a: &mut Interface, b: &mut Interface) -> Result<()> {
    let frac_a = a.projecting_fractions(store)?;
    let frac_b = b.projecting_fractions(store)?;
    let min_frac = frac_a
        .iter()
        .chain(frac_b.iter())
        .copied()
        .fold(f64::INFINITY, f64::min);
    let tol = (min_frac / 2.0).min(1e-2);

    match_to_fractions(store, a, &frac_b, tol)?;
    match_to_fractions(store, b, &frac_a, tol)?;
    Ok(())
}

/// Inserts the breakpoints described by `to_add` into `inter`.
fn match_to_fractions(
    store: &mut PatternStore,
    inter: &mut Interface,
    to_add: &[f64],
    tol: f64,
) -> Result<()> {
    let total: f64 = inter.projecting_lengths(store)?.iter().sum();
    let (mut in_id, mut add_id) = (0, 0);
    let (mut covered_init, mut covered_added) = (0.0, 0.0);

    while in_id < inter.len() && add_id < to_add.len() {
        let frac_init = inter.projecting_lengths(store)?[in_id] / total;
        let next_init = covered_init + frac_init;
        let next_added = covered_added + to_add[add_id];

        if close_enough(next_init, next_added, tol) {
            in_id += 1;
            add_id += 1;
            covered_init = next_init;
            covered_added = next_added;
        } else if next_init < next_added {
            in_id += 1;
            covered_init = next_init;
        } else {
            let mut split = (next_added - covered_init) / frac_init;
            let flipped = inter.needs_flipping(in_id);
            if flipped {
                split = 1.0 - split;
            }
            let base = inter.edges()[in_id];
            let pieces = store.subdivide_edge(base, &[split, 1.0 - split], true)?;
            tracing::debug!(edge = in_id, split, "splitting interface edge");

            if let Some(panel) = inter.panel(in_id) {
                let mut boundary = store.panel(panel)?.edges.clone();
                boundary.substitute(base, &pieces)?;
                store.panel_mut(panel)?.edges = boundary;
            }
            let in_order: EdgeSequence = if flipped {
                pieces.iter().rev().copied().collect()
            } else {
                pieces
            };
            inter.substitute(base, &in_order)?;

            in_id += 1;
            add_id += 1;
            covered_init = next_added;
            covered_added = next_added;
        }
    }

    if add_id != to_add.len() {
        return Err(OperationError::ProjectionMismatch {
            consumed: add_id,
            expected: to_add.len(),
        }
        .into());
    }
    Ok(())
}
