pub mod edge;
pub mod panel;
pub mod sequence;
pub mod vertex;

pub use edge::{Curvature, EdgeData, EdgeId};
pub use panel::{PanelData, PanelId};
pub use sequence::{EdgeSequence, LinearizeParams, SequenceBounds};
pub use vertex::{VertexData, VertexId};

use crate::error::TopologyError;
use crate::math::Point2;
use slotmap::SlotMap;

/// Central arena that owns all vertices, edges and panels of a pattern.
///
/// Entities reference each other via typed IDs (generational indices).
/// A vertex shared by two edges is a single entry here, so moving it moves
/// both edges, and copying a chain is a remap of IDs.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    panels: SlotMap<PanelId, PanelData>,
}

impl PatternStore {
    /// Creates a new, empty pattern store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Inserts a vertex at `point` and returns its ID.
    pub fn add_point(&mut self, point: Point2) -> VertexId {
        self.add_vertex(VertexData::new(point))
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn point(&self, id: VertexId) -> Result<Point2, TopologyError> {
        Ok(self.vertex(id)?.point)
    }

    /// Removes a vertex. Edges still referencing it become dangling.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<VertexData> {
        self.vertices.remove(id)
    }

    // --- Edge operations ---

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Returns a mutable reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData, TopologyError> {
        self.edges
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Removes an edge, leaving its vertices in place.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<EdgeData> {
        self.edges.remove(id)
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Panel operations ---

    /// Inserts a panel and returns its ID.
    pub fn add_panel(&mut self, data: PanelData) -> PanelId {
        self.panels.insert(data)
    }

    /// Returns a reference to the panel data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn panel(&self, id: PanelId) -> Result<&PanelData, TopologyError> {
        self.panels
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("panel".into()))
    }

    /// Returns a mutable reference to the panel data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn panel_mut(&mut self, id: PanelId) -> Result<&mut PanelData, TopologyError> {
        self.panels
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("panel".into()))
    }

    /// Iterates over all panels.
    pub fn panels(&self) -> impl Iterator<Item = (PanelId, &PanelData)> {
        self.panels.iter()
    }
}
