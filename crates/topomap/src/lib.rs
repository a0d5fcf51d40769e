pub mod error;
pub mod format;
pub mod graph;
pub mod interaction;
pub mod matrix;

pub use error::{FormatError, GraphError, MatrixError};
pub use format::FileFormat;
pub use graph::{
    Edge, EdgeId, EdgeToggle, Pose, TopologyGraph, Vertex, VertexId,
    VertexStatus, DEFAULT_EDGE_WEIGHT,
};
pub use interaction::{
    InteractionEvent, InteractionOutcome, SelectStep, Selection,
};
pub use matrix::DenseForm;
