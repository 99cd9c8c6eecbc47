use crate::math::Point2;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the pattern store.
    ///
    /// Two edges are chained when they hold the same `VertexId`; equal
    /// coordinates alone do not connect edges.
    pub struct VertexId;
}

/// Data associated with a pattern vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 2D position of the vertex in its panel's local frame.
    pub point: Point2,
}

impl VertexData {
    /// Creates a new vertex at the given point.
    #[must_use]
    pub fn new(point: Point2) -> Self {
        Self { point }
    }
}
