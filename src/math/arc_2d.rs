/// 2D circular-arc math in the chord frame.
///
/// An arc between two endpoints is encoded by `cy`, the height of the arc
/// midpoint above the chord measured in chord lengths (see
/// [`rel_to_abs`](super::rel_to_abs)). With the chord normalized to `(0,0) -> (1,0)`:
/// - `cy > 0`: the arc bulges to the left of the chord (clockwise sweep)
/// - `cy < 0`: the arc bulges to the right of the chord (counter-clockwise sweep)
/// - `|cy| = 0.5`: semicircle
/// - `|cy| > 0.5`: large arc (more than half a circle)
use std::f64::consts::{PI, TAU};

use super::TOLERANCE;

/// Radius of the arc in chord lengths.
///
/// The circle passes through `(0,0)`, `(1,0)` and `(0.5, cy)`.
#[must_use]
pub fn rel_radius(cy: f64) -> f64 {
    (cy * cy + 0.25) / (2.0 * cy.abs())
}

/// Height of the circle center above the chord, in chord lengths.
#[must_use]
pub fn rel_center_height(cy: f64) -> f64 {
    (cy * cy - 0.25) / (2.0 * cy)
}

/// Unsigned angle swept by the arc, in `(0, 2π)`.
///
/// The `asin` argument is clamped so that floating-point drift on
/// semicircles cannot leave its domain.
#[must_use]
pub fn arc_angle(cy: f64) -> f64 {
    let r = rel_radius(cy);
    let half = (0.5 / r).clamp(-1.0, 1.0).asin();
    if cy.abs() > 0.5 {
        TAU - 2.0 * half
    } else {
        2.0 * half
    }
}

/// Recovers `cy` from a radius given in chord lengths.
///
/// Returns `None` if the radius is too small to span the chord.
#[must_use]
pub fn cy_from_radius(rel_radius: f64, large_arc: bool, right: bool) -> Option<f64> {
    if rel_radius < 0.5 - TOLERANCE {
        return None;
    }
    let h = (rel_radius * rel_radius - 0.25).max(0.0).sqrt();
    let height = if large_arc { rel_radius + h } else { rel_radius - h };
    Some(if right { -height } else { height })
}

/// Recovers `cy` from the unsigned swept angle.
///
/// Returns `None` for angles outside `(0, 2π)`.
#[must_use]
pub fn cy_from_angle(angle: f64, right: bool) -> Option<f64> {
    if angle <= TOLERANCE || angle >= TAU - TOLERANCE {
        return None;
    }
    let r = 0.5 / (angle / 2.0).sin();
    cy_from_radius(r, angle > PI, right)
}

/// Signed sweep of the arc as seen in a standard (y-up) frame.
#[must_use]
pub fn signed_sweep(cy: f64) -> f64 {
    -cy.signum() * arc_angle(cy)
}

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(
    center_x: f64,
    center_y: f64,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    t: f64,
) -> (f64, f64) {
    let angle = start_angle + sweep * t;
    (center_x + radius * angle.cos(), center_y + radius * angle.sin())
}

/// Unit tangent direction of an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_tangent_at(start_angle: f64, sweep: f64, t: f64) -> (f64, f64) {
    let angle = start_angle + sweep * t;
    let sign = sweep.signum();
    (-sign * angle.sin(), sign * angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn semicircle_parameters() {
        assert!((rel_radius(0.5) - 0.5).abs() < TOL);
        assert!((arc_angle(0.5) - PI).abs() < 1e-6);
        assert!(rel_center_height(0.5).abs() < TOL);
    }

    #[test]
    fn small_and_large_arcs_complement() {
        let small = arc_angle(0.2);
        let r = rel_radius(0.2);
        let large_cy = cy_from_radius(r, true, false).unwrap_or(0.0);
        assert!(large_cy > 0.5);
        assert!((small + arc_angle(large_cy) - TAU).abs() < 1e-9);
    }

    #[test]
    fn radius_roundtrip() {
        for &cy in &[-1.2, -0.5, -0.1, 0.05, 0.3, 0.9] {
            let r = rel_radius(cy);
            let back = cy_from_radius(r, cy.abs() > 0.5, cy < 0.0).unwrap_or(f64::NAN);
            assert!((back - cy).abs() < 1e-9, "cy={cy} back={back}");
        }
    }

    #[test]
    fn angle_roundtrip() {
        for &angle in &[0.3, 1.0, PI, 4.0, 6.0] {
            let cy = cy_from_angle(angle, true).unwrap_or(f64::NAN);
            assert!(cy < 0.0);
            assert!((arc_angle(cy) - angle).abs() < 1e-9, "angle={angle}");
        }
    }

    #[test]
    fn radius_too_small() {
        assert!(cy_from_radius(0.4, false, false).is_none());
        assert!(cy_from_angle(0.0, false).is_none());
    }

    #[test]
    fn sweep_sign_follows_bulge_side() {
        assert!(signed_sweep(0.3) < 0.0);
        assert!(signed_sweep(-0.3) > 0.0);
    }

    #[test]
    fn quarter_circle_point() {
        let (x, y) = arc_point_at(0.0, 0.0, 1.0, 0.0, PI / 2.0, 0.5);
        let expected = (PI / 4.0).cos();
        assert!((x - expected).abs() < TOL);
        assert!((y - expected).abs() < TOL);
        let (tx, ty) = arc_tangent_at(0.0, PI / 2.0, 0.0);
        assert!(tx.abs() < TOL);
        assert!((ty - 1.0).abs() < TOL);
    }
}
