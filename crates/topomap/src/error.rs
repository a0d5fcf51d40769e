use std::path::PathBuf;

use crate::graph::{EdgeId, VertexId};

/// Errors raised by Graph Model operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("vertex {0} does not exist")]
    VertexNotFound(VertexId),
    #[error("edge {0} does not exist")]
    EdgeNotFound(EdgeId),
    #[error("edge {start_id} -> {end_id} already exists")]
    DuplicateEdge { start_id: VertexId, end_id: VertexId },
    #[error("vertex id {0} is used more than once")]
    DuplicateVertexId(VertexId),
    #[error("edge id {0} is used more than once")]
    DuplicateEdgeId(EdgeId),
    #[error("edge {edge_id} references missing vertex {vertex_id}")]
    DanglingEdge { edge_id: EdgeId, vertex_id: VertexId },
}

/// Errors raised while building the dense form.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("edge array has {len} entries, expected {vertices}x{vertices}")]
    ShapeMismatch { len: usize, vertices: usize },
    #[error("edge weight at index {index} is not finite ({value})")]
    NonFiniteWeight { index: usize, value: f64 },
}

/// Errors raised at the file boundary.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed topology map: {0}")]
    Matrix(#[from] MatrixError),
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FormatError {
    /// True when the input itself is bad, as opposed to the file system.
    pub fn is_malformed_input(&self) -> bool {
        !matches!(self, FormatError::Io { .. })
    }
}
