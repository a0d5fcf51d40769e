// Graph Model - sparse vertex/edge representation used while editing

use std::collections::HashSet;

use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::matrix::{self, DenseForm};

pub type VertexId = u32;
pub type EdgeId = u32;

/// Weight given to edges created by clicking two vertices.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

// ------------------------------------------------------------------
// Vertices
// ------------------------------------------------------------------

/// Position and heading of a waypoint in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Heading in radians.
    #[serde(default)]
    pub yaw: f64,
}

impl Pose {
    /// Pose for a click on the viewport plane.
    ///
    /// The viewport's horizontal axis is the map's negative y axis and its
    /// vertical axis is the map's x axis, so `pose.x = click_y` and
    /// `pose.y = -click_x`.
    pub fn from_scene_click(click_x: f64, click_y: f64) -> Self {
        Self {
            x: click_y,
            y: -click_x,
            z: 0.0,
            yaw: 0.0,
        }
    }

    /// Inverse of [`Pose::from_scene_click`] on the viewport plane.
    pub fn scene_xy(&self) -> [f64; 2] {
        [-self.y, self.x]
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum VertexStatus {
    #[default]
    Active,
    Inactive,
}

impl VertexStatus {
    pub fn label(self) -> &'static str {
        match self {
            VertexStatus::Active => "ACTIVE",
            VertexStatus::Inactive => "INACTIVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub pose: Pose,
    #[serde(default)]
    pub status: VertexStatus,
}

// ------------------------------------------------------------------
// Edges
// ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub start_id: VertexId,
    pub end_id: VertexId,
    pub weight: f64,
}

/// What [`TopologyGraph::toggle_edge`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeToggle {
    Added(Edge),
    Removed(Edge),
}

// ------------------------------------------------------------------
// Graph
// ------------------------------------------------------------------

/// Vertices and directed edges of a topology map.
///
/// Vertex order is display order only; it becomes meaningful when the
/// graph is encoded, since the dense form indexes vertices by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyGraph {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from externally supplied parts, checking id
    /// uniqueness and that every edge references an existing vertex.
    pub fn from_parts(
        vertices: Vec<Vertex>,
        edges: Vec<Edge>,
    ) -> Result<Self, GraphError> {
        let mut vertex_ids = HashSet::new();
        for vertex in &vertices {
            if !vertex_ids.insert(vertex.id) {
                return Err(GraphError::DuplicateVertexId(vertex.id));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &edges {
            if !edge_ids.insert(edge.id) {
                return Err(GraphError::DuplicateEdgeId(edge.id));
            }
            for vertex_id in [edge.start_id, edge.end_id] {
                if !vertex_ids.contains(&vertex_id) {
                    return Err(GraphError::DanglingEdge {
                        edge_id: edge.id,
                        vertex_id,
                    });
                }
            }
        }

        Ok(Self { vertices, edges })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }

    /// Current index of a vertex in display order.
    pub fn position_of(&self, id: VertexId) -> Option<usize> {
        self.vertices.iter().position(|v| v.id == id)
    }

    /// The edge going from `start_id` to `end_id`, in that order.
    pub fn find_edge(
        &self,
        start_id: VertexId,
        end_id: VertexId,
    ) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.start_id == start_id && e.end_id == end_id)
    }

    pub fn next_vertex_id(&self) -> VertexId {
        self.vertices
            .iter()
            .map(|v| v.id)
            .max()
            .map_or(0, |id| id + 1)
    }

    pub fn next_edge_id(&self) -> EdgeId {
        self.edges.iter().map(|e| e.id).max().map_or(0, |id| id + 1)
    }

    // --------------------------------------------------------------
    // Mutations
    // --------------------------------------------------------------

    /// Append an active vertex with a fresh id.
    pub fn add_vertex(&mut self, pose: Pose) -> Vertex {
        let vertex = Vertex {
            id: self.next_vertex_id(),
            pose,
            status: VertexStatus::Active,
        };
        self.vertices.push(vertex);
        vertex
    }

    /// Remove a vertex and every edge that starts or ends at it.
    ///
    /// Returns the vertex together with the edges removed by the cascade.
    pub fn delete_vertex(
        &mut self,
        id: VertexId,
    ) -> Result<(Vertex, Vec<Edge>), GraphError> {
        let position = self
            .position_of(id)
            .ok_or(GraphError::VertexNotFound(id))?;
        let vertex = self.vertices.remove(position);

        let (removed, kept): (Vec<Edge>, Vec<Edge>) = self
            .edges
            .iter()
            .copied()
            .partition(|e| e.start_id == id || e.end_id == id);
        self.edges = kept;

        Ok((vertex, removed))
    }

    pub fn set_vertex_status(
        &mut self,
        id: VertexId,
        status: VertexStatus,
    ) -> Result<(), GraphError> {
        let vertex = self
            .vertices
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(GraphError::VertexNotFound(id))?;
        vertex.status = status;
        Ok(())
    }

    /// Add a directed edge with a fresh id.
    pub fn add_edge(
        &mut self,
        start_id: VertexId,
        end_id: VertexId,
        weight: f64,
    ) -> Result<Edge, GraphError> {
        for id in [start_id, end_id] {
            if !self.contains_vertex(id) {
                return Err(GraphError::VertexNotFound(id));
            }
        }
        if self.find_edge(start_id, end_id).is_some() {
            return Err(GraphError::DuplicateEdge { start_id, end_id });
        }

        let edge = Edge {
            id: self.next_edge_id(),
            start_id,
            end_id,
            weight,
        };
        self.edges.push(edge);
        Ok(edge)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, GraphError> {
        let position = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or(GraphError::EdgeNotFound(id))?;
        Ok(self.edges.remove(position))
    }

    pub fn set_edge_weight(
        &mut self,
        id: EdgeId,
        weight: f64,
    ) -> Result<(), GraphError> {
        let edge = self
            .edges
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(GraphError::EdgeNotFound(id))?;
        edge.weight = weight;
        Ok(())
    }

    /// Remove the edge `start_id -> end_id` if present, otherwise add it.
    ///
    /// Only the exact ordered pair is looked up: the reverse edge is a
    /// different edge.
    pub fn toggle_edge(
        &mut self,
        start_id: VertexId,
        end_id: VertexId,
        weight: f64,
    ) -> Result<EdgeToggle, GraphError> {
        match self.find_edge(start_id, end_id).map(|e| e.id) {
            Some(edge_id) => {
                self.remove_edge(edge_id).map(EdgeToggle::Removed)
            }
            None => self
                .add_edge(start_id, end_id, weight)
                .map(EdgeToggle::Added),
        }
    }

    /// Set the weight between two vertices the way a matrix cell edit
    /// does: a weight of zero or less removes the edge, otherwise the
    /// edge is updated or created.
    pub fn set_connection_weight(
        &mut self,
        start_id: VertexId,
        end_id: VertexId,
        weight: f64,
    ) -> Result<Option<Edge>, GraphError> {
        let existing = self.find_edge(start_id, end_id).map(|e| e.id);
        match existing {
            Some(edge_id) if weight <= 0.0 => {
                self.remove_edge(edge_id)?;
                Ok(None)
            }
            Some(edge_id) => {
                self.set_edge_weight(edge_id, weight)?;
                Ok(self.edge(edge_id).copied())
            }
            None if weight <= 0.0 => Ok(None),
            None => self.add_edge(start_id, end_id, weight).map(Some),
        }
    }

    // --------------------------------------------------------------
    // Conversions
    // --------------------------------------------------------------

    pub fn to_matrix(&self) -> DenseForm {
        matrix::encode(self)
    }

    pub fn from_matrix(dense: DenseForm) -> Self {
        matrix::decode(dense)
    }

    /// Adjacency view keyed by vertex id, for neighbourhood queries.
    pub fn to_digraph(&self) -> DiGraphMap<VertexId, f64> {
        let mut g = DiGraphMap::with_capacity(
            self.vertices.len(),
            self.edges.len(),
        );
        for vertex in &self.vertices {
            g.add_node(vertex.id);
        }
        for edge in &self.edges {
            g.add_edge(edge.start_id, edge.end_id, edge.weight);
        }
        g
    }
}
