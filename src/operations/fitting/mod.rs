//! Operators fitting a shape onto an existing boundary.

mod cut_corner;
mod cut_edge;
mod match_tangents;

pub use cut_corner::{CornerCut, CutCorner};
pub use cut_edge::{CutIntoEdge, EdgeCut};
pub use match_tangents::CurveMatchTangents;
