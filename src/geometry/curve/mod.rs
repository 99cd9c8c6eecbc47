mod arc;
mod bezier;
mod line;

pub use arc::CircularArc;
pub use bezier::{CubicBezier, QuadBezier};
pub use line::Segment;

use crate::error::{GeometryError, Result};
use crate::math::quadrature::integrate;
use crate::math::{cross_2d, Point2, Vector2, TOLERANCE};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }
}

/// Trait for bounded parametric curves in the panel plane.
///
/// All edge curves are parametrized over `[0, 1]`, `t = 0` at the start vertex
/// and `t = 1` at the end vertex.
pub trait Curve {
    /// Evaluates the curve at parameter `t`.
    fn evaluate(&self, t: f64) -> Point2;

    /// First derivative with respect to `t`.
    fn derivative(&self, t: f64) -> Vector2;

    /// Second derivative with respect to `t`.
    fn second_derivative(&self, t: f64) -> Vector2;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, 1.0)
    }

    /// Arc length between two parameters.
    fn length_between(&self, t0: f64, t1: f64) -> f64 {
        integrate(|t| self.derivative(t).norm(), t0, t1)
    }

    /// Total arc length.
    fn length(&self) -> f64 {
        self.length_between(0.0, 1.0)
    }

    /// Unit tangent at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the derivative vanishes at `t`.
    fn tangent(&self, t: f64) -> Result<Vector2> {
        let d = self.derivative(t);
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    /// Unsigned curvature at parameter `t`; zero where the speed vanishes.
    fn curvature(&self, t: f64) -> f64 {
        let d1 = self.derivative(t);
        let speed = d1.norm();
        if speed < TOLERANCE {
            return 0.0;
        }
        cross_2d(&d1, &self.second_derivative(t)).abs() / (speed * speed * speed)
    }

    /// Parameter at which the arc length measured from the start equals `s`.
    ///
    /// Values of `s` outside `[0, length]` clamp to the endpoints.
    fn param_at_length(&self, s: f64) -> f64 {
        let total = self.length();
        if s <= 0.0 || total < TOLERANCE {
            return 0.0;
        }
        if s >= total {
            return 1.0;
        }
        // Newton iterations on L(t) - s, safeguarded by a shrinking bracket.
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut t = s / total;
        for _ in 0..60 {
            let err = self.length_between(0.0, t) - s;
            if err.abs() < 1e-12 * total.max(1.0) {
                break;
            }
            if err > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            let speed = self.derivative(t).norm();
            let newton = if speed > TOLERANCE { t - err / speed } else { f64::NAN };
            t = if newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
        }
        t
    }

    /// Samples the curve at `n + 2` evenly spaced parameters, endpoints included.
    fn sample(&self, n: usize) -> Vec<Point2> {
        let steps = n + 1;
        (0..=steps)
            .map(|i| self.evaluate(i as f64 / steps as f64))
            .collect()
    }
}

/// An absolute-coordinate curve, the canonical shape of an edge.
#[derive(Debug, Clone)]
pub enum EdgeCurve {
    /// A straight segment.
    Line(Segment),
    /// A quadratic Bezier.
    Quadratic(QuadBezier),
    /// A cubic Bezier.
    Cubic(CubicBezier),
    /// A circular arc.
    Arc(CircularArc),
}

impl EdgeCurve {
    /// Start point of the curve.
    #[must_use]
    pub fn start(&self) -> Point2 {
        self.evaluate(0.0)
    }

    /// End point of the curve.
    #[must_use]
    pub fn end(&self) -> Point2 {
        self.evaluate(1.0)
    }

    /// Portion of the curve between parameters `t0 < t1`, re-parametrized over `[0, 1]`.
    #[must_use]
    pub fn subsegment(&self, t0: f64, t1: f64) -> Self {
        match self {
            Self::Line(c) => Self::Line(c.subsegment(t0, t1)),
            Self::Quadratic(c) => Self::Quadratic(c.subsegment(t0, t1)),
            Self::Cubic(c) => Self::Cubic(c.subsegment(t0, t1)),
            Self::Arc(c) => Self::Arc(c.subsegment(t0, t1)),
        }
    }

    /// The same point set walked in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::Line(c) => Self::Line(Segment::new(c.end, c.start)),
            Self::Quadratic(c) => {
                let [p0, p1, p2] = c.points;
                Self::Quadratic(QuadBezier::new([p2, p1, p0]))
            }
            Self::Cubic(c) => {
                let [p0, p1, p2, p3] = c.points;
                Self::Cubic(CubicBezier::new([p3, p2, p1, p0]))
            }
            Self::Arc(c) => Self::Arc(c.reversed()),
        }
    }

    fn as_dyn(&self) -> &dyn Curve {
        match self {
            Self::Line(c) => c,
            Self::Quadratic(c) => c,
            Self::Cubic(c) => c,
            Self::Arc(c) => c,
        }
    }
}

impl Curve for EdgeCurve {
    fn evaluate(&self, t: f64) -> Point2 {
        self.as_dyn().evaluate(t)
    }

    fn derivative(&self, t: f64) -> Vector2 {
        self.as_dyn().derivative(t)
    }

    fn second_derivative(&self, t: f64) -> Vector2 {
        self.as_dyn().second_derivative(t)
    }

    fn length_between(&self, t0: f64, t1: f64) -> f64 {
        self.as_dyn().length_between(t0, t1)
    }

    fn length(&self) -> f64 {
        self.as_dyn().length()
    }
}
