pub mod arc_2d;
pub mod bezier_2d;
pub mod intersect_2d;
pub mod minimize;
pub mod quadrature;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Rotates a vector by +90 degrees, keeping its length.
#[must_use]
pub fn perp(v: &Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Z component of the 3D cross product of two planar vectors.
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Signed angle that rotates `from` onto `to`, in `(-π, π]`.
#[must_use]
pub fn vector_angle(from: &Vector2, to: &Vector2) -> f64 {
    cross_2d(from, to).atan2(from.dot(to))
}

/// Rotates `p` around `pivot` by `angle` radians (counter-clockwise).
#[must_use]
pub fn rotate_about(p: &Point2, pivot: &Point2, angle: f64) -> Point2 {
    let (s, c) = angle.sin_cos();
    let d = p - pivot;
    pivot + Vector2::new(c * d.x - s * d.y, s * d.x + c * d.y)
}

/// Mirrors `p` across the infinite line through `a` and `b`.
///
/// Returns `p` unchanged when `a` and `b` coincide.
#[must_use]
pub fn reflect_across(p: &Point2, a: &Point2, b: &Point2) -> Point2 {
    let axis = b - a;
    let len_sq = axis.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return *p;
    }
    let d = p - a;
    let along = axis * (d.dot(&axis) / len_sq);
    a + along * 2.0 - d
}

/// Converts a point from the chord frame of `start -> end` to absolute coordinates.
///
/// The frame is `(start, e, perp(e))` with `e = end - start`, so `(0, 0)` is the
/// start, `(1, 0)` is the end and the second coordinate measures the height
/// above the chord in chord lengths.
#[must_use]
pub fn rel_to_abs(start: &Point2, end: &Point2, rel: &Point2) -> Point2 {
    let e = end - start;
    start + e * rel.x + perp(&e) * rel.y
}

/// Inverse of [`rel_to_abs`].
///
/// Returns `None` when `start` and `end` coincide.
#[must_use]
pub fn abs_to_rel(start: &Point2, end: &Point2, abs: &Point2) -> Option<Point2> {
    let e = end - start;
    let len_sq = e.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return None;
    }
    let d = abs - start;
    Some(Point2::new(d.dot(&e) / len_sq, d.dot(&perp(&e)) / len_sq))
}

/// Approximate equality with an absolute tolerance.
#[must_use]
pub fn close_enough(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}
