use super::{cross_2d, Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = cross_2d(d1, d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let dp = p2 - p1;
    let t = cross_2d(&dp, d2) / cross;
    let u = cross_2d(&dp, d1) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((a0 + da * t_clamped, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Checks whether a polyline crosses itself.
///
/// Adjacent segments share an endpoint and are not tested against each
/// other; for closed polylines the last and first segments count as adjacent.
/// Contacts within `eps` of a segment end are ignored.
#[must_use]
pub fn polyline_self_intersects(points: &[Point2], closed: bool, eps: f64) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    let seg_count = if closed { n } else { n - 1 };
    let seg = |i: usize| (points[i], points[(i + 1) % n]);

    for i in 0..seg_count {
        for j in (i + 2)..seg_count {
            if closed && i == 0 && j == seg_count - 1 {
                continue;
            }
            let (a0, a1) = seg(i);
            let (b0, b1) = seg(j);
            if let Some((_, t, u)) = segment_segment_intersect_2d(&a0, &a1, &b0, &b1) {
                let interior = |s: f64| s > eps && s < 1.0 - eps;
                if interior(t) || interior(u) {
                    return true;
                }
            }
        }
    }
    false
}
