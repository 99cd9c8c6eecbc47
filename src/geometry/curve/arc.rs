use std::f64::consts::TAU;

use crate::math::arc_2d::{arc_point_at, arc_tangent_at};
use crate::math::{Point2, Vector2};

use super::Curve;

/// A circular arc in the panel plane.
///
/// Sweeps from `start_angle` by the signed angle `sweep` (positive is
/// counter-clockwise) around `center`.
#[derive(Debug, Clone)]
pub struct CircularArc {
    center: Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
}

impl CircularArc {
    /// Creates a new arc.
    #[must_use]
    pub fn new(center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            sweep,
        }
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Signed swept angle in radians.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    /// Whether the arc covers more than half a circle.
    #[must_use]
    pub fn is_large(&self) -> bool {
        self.sweep.abs() > TAU / 2.0
    }

    /// Portion between parameters `t0` and `t1`.
    #[must_use]
    pub fn subsegment(&self, t0: f64, t1: f64) -> Self {
        Self::new(
            self.center,
            self.radius,
            self.start_angle + self.sweep * t0,
            self.sweep * (t1 - t0),
        )
    }

    /// The same arc walked from end to start.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(
            self.center,
            self.radius,
            self.start_angle + self.sweep,
            -self.sweep,
        )
    }
}

impl Curve for CircularArc {
    fn evaluate(&self, t: f64) -> Point2 {
        let (x, y) = arc_point_at(
            self.center.x,
            self.center.y,
            self.radius,
            self.start_angle,
            self.sweep,
            t,
        );
        Point2::new(x, y)
    }

    fn derivative(&self, t: f64) -> Vector2 {
        let (tx, ty) = arc_tangent_at(self.start_angle, self.sweep, t);
        Vector2::new(tx, ty) * (self.radius * self.sweep.abs())
    }

    fn second_derivative(&self, t: f64) -> Vector2 {
        let angle = self.start_angle + self.sweep * t;
        -Vector2::new(angle.cos(), angle.sin()) * (self.radius * self.sweep * self.sweep)
    }

    fn length_between(&self, t0: f64, t1: f64) -> f64 {
        self.radius * self.sweep.abs() * (t1 - t0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn half_circle_length_and_curvature() {
        let arc = CircularArc::new(Point2::new(1.0, 0.0), 1.0, PI, -PI);
        assert!((arc.length() - PI).abs() < 1e-12);
        assert!((arc.curvature(0.3) - 1.0).abs() < 1e-9);
        let top = arc.evaluate(0.5);
        assert!((top.x - 1.0).abs() < 1e-12);
        assert!((top.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reversed_walks_backwards() {
        let arc = CircularArc::new(Point2::origin(), 2.0, 0.0, PI / 2.0);
        let rev = arc.reversed();
        let a = arc.evaluate(0.25);
        let b = rev.evaluate(0.75);
        assert!((a - b).norm() < 1e-12);
    }
}
