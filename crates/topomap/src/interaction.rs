// Interaction state machine - turns click sequences into graph mutations

use crate::error::GraphError;
use crate::graph::{
    Edge, EdgeToggle, Pose, TopologyGraph, Vertex, VertexId,
    DEFAULT_EDGE_WEIGHT,
};

/// Vertices staged for connection.
///
/// At most one vertex is ever pending: staging a second one immediately
/// toggles the edge between them and returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    OnePending(VertexId),
}

/// Result of staging a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectStep {
    Staged(VertexId),
    Deselected(VertexId),
    Connect { start_id: VertexId, end_id: VertexId },
}

impl Selection {
    pub fn pending(&self) -> Option<VertexId> {
        match self {
            Selection::Idle => None,
            Selection::OnePending(id) => Some(*id),
        }
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.pending() == Some(id)
    }

    pub fn len(&self) -> usize {
        usize::from(self.pending().is_some())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Idle)
    }

    pub fn clear(&mut self) {
        *self = Selection::Idle;
    }

    /// Advance the machine by one vertex click. Selection behaves like a
    /// set: clicking the staged vertex again removes it.
    pub fn select(&mut self, id: VertexId) -> SelectStep {
        match *self {
            Selection::Idle => {
                *self = Selection::OnePending(id);
                SelectStep::Staged(id)
            }
            Selection::OnePending(staged) if staged == id => {
                *self = Selection::Idle;
                SelectStep::Deselected(id)
            }
            Selection::OnePending(staged) => {
                *self = Selection::Idle;
                SelectStep::Connect {
                    start_id: staged,
                    end_id: id,
                }
            }
        }
    }
}

/// Raw events reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    /// Click on empty space, in scene coordinates.
    PointClicked { x: f64, y: f64 },
    VertexClicked(VertexId),
    VertexRightClicked(VertexId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    VertexAdded(Vertex),
    VertexDeleted { vertex: Vertex, removed_edges: Vec<Edge> },
    Staged(VertexId),
    Deselected(VertexId),
    EdgeAdded(Edge),
    EdgeRemoved(Edge),
}

/// Apply one interaction event to the graph and the selection.
///
/// Structural edits (adding or deleting a vertex) clear the selection.
/// Events naming an unknown vertex fail without changing anything.
pub fn apply(
    graph: &mut TopologyGraph,
    selection: &mut Selection,
    event: InteractionEvent,
) -> Result<InteractionOutcome, GraphError> {
    match event {
        InteractionEvent::PointClicked { x, y } => {
            let vertex = graph.add_vertex(Pose::from_scene_click(x, y));
            selection.clear();
            Ok(InteractionOutcome::VertexAdded(vertex))
        }
        InteractionEvent::VertexRightClicked(id) => {
            let (vertex, removed_edges) = graph.delete_vertex(id)?;
            selection.clear();
            Ok(InteractionOutcome::VertexDeleted {
                vertex,
                removed_edges,
            })
        }
        InteractionEvent::VertexClicked(id) => {
            if !graph.contains_vertex(id) {
                return Err(GraphError::VertexNotFound(id));
            }
            if let Some(staged) = selection.pending() {
                if !graph.contains_vertex(staged) {
                    selection.clear();
                }
            }

            // Stage on a copy so a failed toggle leaves the selection as is.
            let mut next = *selection;
            let outcome = match next.select(id) {
                SelectStep::Staged(id) => InteractionOutcome::Staged(id),
                SelectStep::Deselected(id) => {
                    InteractionOutcome::Deselected(id)
                }
                SelectStep::Connect { start_id, end_id } => {
                    match graph.toggle_edge(
                        start_id,
                        end_id,
                        DEFAULT_EDGE_WEIGHT,
                    )? {
                        EdgeToggle::Added(edge) => {
                            InteractionOutcome::EdgeAdded(edge)
                        }
                        EdgeToggle::Removed(edge) => {
                            InteractionOutcome::EdgeRemoved(edge)
                        }
                    }
                }
            };
            *selection = next;
            Ok(outcome)
        }
    }
}
