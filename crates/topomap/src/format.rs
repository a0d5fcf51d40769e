use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::FormatError;
use crate::graph::{Pose, TopologyGraph, Vertex, VertexStatus};
use crate::matrix::DenseForm;

// ------------------------------------------------------------------
// Serialization structures
// ------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableVertex {
    /// Written on save, skipped on load: vertices are renumbered by
    /// position, so any value is accepted there.
    #[serde(skip_deserializing)]
    pub id: i64,
    pub pose: Pose,
    #[serde(default)]
    pub status: VertexStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableTopologyMap {
    pub vertexs: Vec<SerializableVertex>,
    /// Row-major `N * N` weight matrix.
    pub edges: Vec<f64>,
}

/// Top-level document, `topology_map: { vertexs, edges }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableDocument {
    pub topology_map: SerializableTopologyMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// `.json` files are JSON, everything else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileFormat::Yaml => &["yaml", "yml"],
            FileFormat::Json => &["json"],
        }
    }
}

// ------------------------------------------------------------------
// Conversion functions
// ------------------------------------------------------------------

pub fn graph_to_serializable(graph: &TopologyGraph) -> SerializableDocument {
    let dense = graph.to_matrix();
    let edges = dense.flat();
    let vertexs = dense
        .vertices
        .into_iter()
        .map(|v| SerializableVertex {
            id: i64::from(v.id),
            pose: v.pose,
            status: v.status,
        })
        .collect();

    SerializableDocument {
        topology_map: SerializableTopologyMap { vertexs, edges },
    }
}

pub fn serializable_to_graph(
    document: SerializableDocument,
) -> Result<TopologyGraph, FormatError> {
    let map = document.topology_map;
    let vertices = map
        .vertexs
        .into_iter()
        .enumerate()
        .map(|(position, v)| Vertex {
            id: position as u32,
            pose: v.pose,
            status: v.status,
        })
        .collect();

    let dense = DenseForm::from_flat(vertices, map.edges)?;
    Ok(TopologyGraph::from_matrix(dense))
}

// ------------------------------------------------------------------
// Text encoding
// ------------------------------------------------------------------

pub fn parse(
    text: &str,
    format: FileFormat,
) -> Result<TopologyGraph, FormatError> {
    let document: SerializableDocument = match format {
        FileFormat::Yaml => serde_yaml::from_str(text)?,
        FileFormat::Json => serde_json::from_str(text)?,
    };
    serializable_to_graph(document)
}

pub fn render(
    graph: &TopologyGraph,
    format: FileFormat,
) -> Result<String, FormatError> {
    let document = graph_to_serializable(graph);
    let text = match format {
        FileFormat::Yaml => serde_yaml::to_string(&document)?,
        FileFormat::Json => serde_json::to_string_pretty(&document)?,
    };
    Ok(text)
}

// ------------------------------------------------------------------
// File I/O operations
// ------------------------------------------------------------------

pub fn save_to_file(
    graph: &TopologyGraph,
    path: &Path,
) -> Result<(), FormatError> {
    let text = render(graph, FileFormat::from_path(path))?;
    std::fs::write(path, text).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "saved {} vertices and {} edges to {}",
        graph.vertex_count(),
        graph.edge_count(),
        path.display()
    );
    Ok(())
}

pub fn load_from_file(path: &Path) -> Result<TopologyGraph, FormatError> {
    let text =
        std::fs::read_to_string(path).map_err(|source| FormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let graph = parse(&text, FileFormat::from_path(path))?;
    log::info!(
        "loaded {} vertices and {} edges from {}",
        graph.vertex_count(),
        graph.edge_count(),
        path.display()
    );
    Ok(graph)
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatrixError;

    const SAMPLE: &str = "\
topology_map:
  vertexs:
    - id: 12
      pose:
        x: 1.5
        y: -2.0
        z: 0.0
        yaw: 1.57
      status: ACTIVE
    - id: 40
      pose: { x: 3.0, y: 4.0 }
      status: INACTIVE
    - pose: { x: 0.0, y: 0.0, z: 1.0, yaw: 0.0 }
  edges: [0, 3, 0,
          0, 0, 2.5,
          1, 0, 0]
";

    fn triples(graph: &TopologyGraph) -> Vec<(u32, u32, f64)> {
        graph
            .edges()
            .iter()
            .map(|e| (e.start_id, e.end_id, e.weight))
            .collect()
    }

    #[test]
    fn test_parse_sample_yaml() {
        let graph = parse(SAMPLE, FileFormat::Yaml).unwrap();

        let ids: Vec<_> = graph.vertices().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        let first = graph.vertex(0).unwrap();
        assert!((first.pose.x - 1.5).abs() < 1e-9);
        assert!((first.pose.yaw - 1.57).abs() < 1e-9);

        let second = graph.vertex(1).unwrap();
        assert_eq!(second.status, VertexStatus::Inactive);
        assert_eq!(second.pose.z, 0.0);

        assert_eq!(graph.vertex(2).unwrap().status, VertexStatus::Active);

        assert_eq!(
            triples(&graph),
            vec![(0, 1, 3.0), (1, 2, 2.5), (2, 0, 1.0)]
        );
        let edge_ids: Vec<_> = graph.edges().iter().map(|e| e.id).collect();
        assert_eq!(edge_ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_render_then_parse_keeps_matrix() {
        let graph = parse(SAMPLE, FileFormat::Yaml).unwrap();
        for format in [FileFormat::Yaml, FileFormat::Json] {
            let text = render(&graph, format).unwrap();
            let reparsed = parse(&text, format).unwrap();
            assert_eq!(reparsed, graph);
        }
    }

    #[test]
    fn test_render_uses_positional_ids() {
        let mut graph = parse(SAMPLE, FileFormat::Yaml).unwrap();
        graph.delete_vertex(0).unwrap();

        let document = graph_to_serializable(&graph);
        let ids: Vec<_> =
            document.topology_map.vertexs.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(document.topology_map.edges, vec![0.0, 2.5, 0.0, 0.0]);

        let text = render(&graph, FileFormat::Yaml).unwrap();
        assert!(text.starts_with("topology_map:"));
        assert!(text.contains("status: INACTIVE"));
    }

    #[test]
    fn test_shape_mismatch_is_malformed_input() {
        let text = "\
topology_map:
  vertexs:
    - { id: 0, pose: { x: 0, y: 0 }, status: ACTIVE }
    - { id: 1, pose: { x: 1, y: 0 }, status: ACTIVE }
  edges: [0, 1, 0]
";
        let err = parse(text, FileFormat::Yaml).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(matches!(
            err,
            FormatError::Matrix(MatrixError::ShapeMismatch {
                len: 3,
                vertices: 2
            })
        ));
    }

    #[test]
    fn test_schema_violations_are_rejected() {
        let cases = [
            "not: [a, topology map",
            "topology_map:\n  edges: []\n",
            "topology_map:\n  vertexs: []\n",
            "topology_map:\n  vertexs:\n    - { pose: { x: 0 } }\n  edges: [0]\n",
            "topology_map:\n  vertexs:\n    - { pose: { x: 0, y: 0 }, status: PARKED }\n  edges: [0]\n",
            "topology_map:\n  vertexs:\n    - { pose: { x: 0, y: 0 } }\n  edges: [heavy]\n",
            "topology_map:\n  vertexs:\n    - { pose: { x: 0, y: 0 } }\n  edges: [.nan]\n",
        ];
        for text in cases {
            let result = parse(text, FileFormat::Yaml);
            assert!(result.is_err(), "accepted malformed input: {text}");
            assert!(result.unwrap_err().is_malformed_input());
        }
    }

    #[test]
    fn test_input_vertex_ids_of_any_type_are_ignored() {
        let text = "\
topology_map:
  vertexs:
    - { id: 1.0, pose: { x: 0, y: 0 } }
    - { id: dock, pose: { x: 1, y: 0 } }
    - { id: [3], pose: { x: 2, y: 0 } }
  edges: [0, 1, 0, 0, 0, 1, 0, 0, 0]
";
        let graph = parse(text, FileFormat::Yaml).unwrap();
        let ids: Vec<_> = graph.vertices().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(graph.edge_count(), 2);

        let json = r#"{"topology_map": {"vertexs": [
            {"id": "a", "pose": {"x": 0, "y": 0}}], "edges": [0]}}"#;
        assert_eq!(parse(json, FileFormat::Json).unwrap().vertex_count(), 1);
    }

    #[test]
    fn test_empty_map() {
        let graph = parse(
            "topology_map:\n  vertexs: []\n  edges: []\n",
            FileFormat::Yaml,
        )
        .unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("map.json")),
            FileFormat::Json
        );
        assert_eq!(
            FileFormat::from_path(Path::new("map.JSON")),
            FileFormat::Json
        );
        assert_eq!(
            FileFormat::from_path(Path::new("map.yml")),
            FileFormat::Yaml
        );
        assert_eq!(
            FileFormat::from_path(Path::new("topology_map")),
            FileFormat::Yaml
        );
    }

    #[test]
    fn test_file_round_trip() {
        let graph = parse(SAMPLE, FileFormat::Yaml).unwrap();

        for name in ["topomap_test.yaml", "topomap_test.json"] {
            let temp_file = std::env::temp_dir().join(name);
            save_to_file(&graph, &temp_file).expect("Failed to save file");
            let loaded =
                load_from_file(&temp_file).expect("Failed to load file");
            assert_eq!(loaded, graph);
            std::fs::remove_file(&temp_file).ok();
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("topomap_missing_file.yaml");
        std::fs::remove_file(&path).ok();
        let err = load_from_file(&path).unwrap_err();
        assert!(!err.is_malformed_input());
    }
}
