use crate::math::{Point2, Vector2};

use super::Curve;

/// A bounded straight segment.
///
/// The parametric form is: `P(t) = start + t * (end - start)`.
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
}

impl Segment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Portion between parameters `t0` and `t1`.
    #[must_use]
    pub fn subsegment(&self, t0: f64, t1: f64) -> Self {
        Self::new(self.evaluate(t0), self.evaluate(t1))
    }
}

impl Curve for Segment {
    fn evaluate(&self, t: f64) -> Point2 {
        self.start + (self.end - self.start) * t
    }

    fn derivative(&self, _t: f64) -> Vector2 {
        self.end - self.start
    }

    fn second_derivative(&self, _t: f64) -> Vector2 {
        Vector2::zeros()
    }

    fn length_between(&self, t0: f64, t1: f64) -> f64 {
        (self.end - self.start).norm() * (t1 - t0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_length_3_4_5() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert!((s.length() - 5.0).abs() < 1e-10);
        assert!((s.param_at_length(2.5) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn subsegment_endpoints() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let sub = s.subsegment(0.25, 0.5);
        assert!((sub.start.x - 1.0).abs() < 1e-12);
        assert!((sub.end.x - 2.0).abs() < 1e-12);
    }
}
