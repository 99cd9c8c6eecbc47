pub mod curve;

pub use curve::{CircularArc, CubicBezier, Curve, CurveDomain, EdgeCurve, QuadBezier, Segment};
