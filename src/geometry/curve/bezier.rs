use crate::math::bezier_2d::{
    cubic_derivative, cubic_point, cubic_second_derivative, cubic_subsegment, quad_derivative,
    quad_point, quad_second_derivative, quad_subsegment,
};
use crate::math::{Point2, Vector2};

use super::Curve;

/// A quadratic Bezier curve in absolute coordinates.
#[derive(Debug, Clone)]
pub struct QuadBezier {
    /// Start, control and end points.
    pub points: [Point2; 3],
}

impl QuadBezier {
    /// Creates a new quadratic Bezier.
    #[must_use]
    pub fn new(points: [Point2; 3]) -> Self {
        Self { points }
    }

    /// Portion between parameters `t0` and `t1`.
    #[must_use]
    pub fn subsegment(&self, t0: f64, t1: f64) -> Self {
        Self::new(quad_subsegment(&self.points, t0, t1))
    }
}

impl Curve for QuadBezier {
    fn evaluate(&self, t: f64) -> Point2 {
        quad_point(&self.points, t)
    }

    fn derivative(&self, t: f64) -> Vector2 {
        quad_derivative(&self.points, t)
    }

    fn second_derivative(&self, _t: f64) -> Vector2 {
        quad_second_derivative(&self.points)
    }
}

/// A cubic Bezier curve in absolute coordinates.
#[derive(Debug, Clone)]
pub struct CubicBezier {
    /// Start, first control, second control and end points.
    pub points: [Point2; 4],
}

impl CubicBezier {
    /// Creates a new cubic Bezier.
    #[must_use]
    pub fn new(points: [Point2; 4]) -> Self {
        Self { points }
    }

    /// Portion between parameters `t0` and `t1`.
    #[must_use]
    pub fn subsegment(&self, t0: f64, t1: f64) -> Self {
        Self::new(cubic_subsegment(&self.points, t0, t1))
    }

    /// Largest curvature over `samples` evenly spaced parameters.
    #[must_use]
    pub fn max_curvature(&self, samples: usize) -> f64 {
        let steps = samples.max(2) - 1;
        (0..=steps)
            .map(|i| self.curvature(i as f64 / steps as f64))
            .fold(0.0, f64::max)
    }
}

impl Curve for CubicBezier {
    fn evaluate(&self, t: f64) -> Point2 {
        cubic_point(&self.points, t)
    }

    fn derivative(&self, t: f64) -> Vector2 {
        cubic_derivative(&self.points, t)
    }

    fn second_derivative(&self, t: f64) -> Vector2 {
        cubic_second_derivative(&self.points, t)
    }
}
