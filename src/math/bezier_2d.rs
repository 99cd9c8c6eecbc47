//! Bernstein-form evaluation and de Casteljau splitting for planar Beziers.

use super::{Point2, Vector2};

/// Evaluates a quadratic Bezier at `t`.
#[must_use]
pub fn quad_point(p: &[Point2; 3], t: f64) -> Point2 {
    let mt = 1.0 - t;
    Point2::from(p[0].coords * (mt * mt) + p[1].coords * (2.0 * mt * t) + p[2].coords * (t * t))
}

/// First derivative of a quadratic Bezier at `t`.
#[must_use]
pub fn quad_derivative(p: &[Point2; 3], t: f64) -> Vector2 {
    (p[1] - p[0]) * (2.0 * (1.0 - t)) + (p[2] - p[1]) * (2.0 * t)
}

/// Second derivative of a quadratic Bezier (constant).
#[must_use]
pub fn quad_second_derivative(p: &[Point2; 3]) -> Vector2 {
    (p[2].coords - p[1].coords * 2.0 + p[0].coords) * 2.0
}

/// Evaluates a cubic Bezier at `t`.
#[must_use]
pub fn cubic_point(p: &[Point2; 4], t: f64) -> Point2 {
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let t2 = t * t;
    Point2::from(
        p[0].coords * (mt2 * mt)
            + p[1].coords * (3.0 * mt2 * t)
            + p[2].coords * (3.0 * mt * t2)
            + p[3].coords * (t2 * t),
    )
}

/// First derivative of a cubic Bezier at `t`.
#[must_use]
pub fn cubic_derivative(p: &[Point2; 4], t: f64) -> Vector2 {
    let mt = 1.0 - t;
    (p[1] - p[0]) * (3.0 * mt * mt) + (p[2] - p[1]) * (6.0 * mt * t) + (p[3] - p[2]) * (3.0 * t * t)
}

/// Second derivative of a cubic Bezier at `t`.
#[must_use]
pub fn cubic_second_derivative(p: &[Point2; 4], t: f64) -> Vector2 {
    let a = p[2].coords - p[1].coords * 2.0 + p[0].coords;
    let b = p[3].coords - p[2].coords * 2.0 + p[1].coords;
    (a * (1.0 - t) + b * t) * 6.0
}

fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    a + (b - a) * t
}

/// Splits a quadratic Bezier at `t` into its left and right halves.
#[must_use]
pub fn quad_split(p: &[Point2; 3], t: f64) -> ([Point2; 3], [Point2; 3]) {
    let q0 = lerp(&p[0], &p[1], t);
    let q1 = lerp(&p[1], &p[2], t);
    let mid = lerp(&q0, &q1, t);
    ([p[0], q0, mid], [mid, q1, p[2]])
}

/// Splits a cubic Bezier at `t` into its left and right halves.
#[must_use]
pub fn cubic_split(p: &[Point2; 4], t: f64) -> ([Point2; 4], [Point2; 4]) {
    let q0 = lerp(&p[0], &p[1], t);
    let q1 = lerp(&p[1], &p[2], t);
    let q2 = lerp(&p[2], &p[3], t);
    let r0 = lerp(&q0, &q1, t);
    let r1 = lerp(&q1, &q2, t);
    let mid = lerp(&r0, &r1, t);
    ([p[0], q0, r0, mid], [mid, r1, q2, p[3]])
}

/// Extracts the portion of a quadratic Bezier between `t0 < t1`.
#[must_use]
pub fn quad_subsegment(p: &[Point2; 3], t0: f64, t1: f64) -> [Point2; 3] {
    let (left, _) = quad_split(p, t1);
    if t1 <= 0.0 {
        return left;
    }
    let (_, right) = quad_split(&left, t0 / t1);
    right
}

/// Extracts the portion of a cubic Bezier between `t0 < t1`.
#[must_use]
pub fn cubic_subsegment(p: &[Point2; 4], t0: f64, t1: f64) -> [Point2; 4] {
    let (left, _) = cubic_split(p, t1);
    if t1 <= 0.0 {
        return left;
    }
    let (_, right) = cubic_split(&left, t0 / t1);
    right
}
