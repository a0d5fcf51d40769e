use std::collections::HashMap;

use ndarray::Array2;

use crate::error::MatrixError;
use crate::graph::{Edge, TopologyGraph, Vertex, VertexId};

/// Dense form of a topology map: vertices in order plus a square weight
/// matrix where `weights[[row, col]]` is the weight of the edge from the
/// vertex at position `row` to the vertex at position `col` (0 = no edge).
#[derive(Debug, Clone, PartialEq)]
pub struct DenseForm {
    pub vertices: Vec<Vertex>,
    pub weights: Array2<f64>,
}

impl DenseForm {
    /// Reshape a row-major flat weight array of length `N * N`.
    pub fn from_flat(
        vertices: Vec<Vertex>,
        flat: Vec<f64>,
    ) -> Result<Self, MatrixError> {
        let n = vertices.len();
        if flat.len() != n * n {
            return Err(MatrixError::ShapeMismatch {
                len: flat.len(),
                vertices: n,
            });
        }
        if let Some((index, &value)) =
            flat.iter().enumerate().find(|(_, w)| !w.is_finite())
        {
            return Err(MatrixError::NonFiniteWeight { index, value });
        }

        let weights = Array2::from_shape_vec((n, n), flat).map_err(|_| {
            MatrixError::ShapeMismatch {
                len: n * n,
                vertices: n,
            }
        })?;

        Ok(Self { vertices, weights })
    }

    /// Number of vertices, which is also the side of the matrix.
    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    /// Weights in row-major order.
    pub fn flat(&self) -> Vec<f64> {
        self.weights.iter().copied().collect()
    }

    pub fn weight(&self, row: usize, col: usize) -> Option<f64> {
        self.weights.get((row, col)).copied()
    }
}

/// Id -> position lookup over the current vertex order.
struct PositionIndex {
    position_of: HashMap<VertexId, usize>,
}

impl PositionIndex {
    fn new(vertices: &[Vertex]) -> Self {
        let position_of = vertices
            .iter()
            .enumerate()
            .map(|(position, v)| (v.id, position))
            .collect();
        Self { position_of }
    }

    fn get(&self, id: VertexId) -> Option<usize> {
        self.position_of.get(&id).copied()
    }
}

fn renumber(vertices: &[Vertex]) -> Vec<Vertex> {
    vertices
        .iter()
        .enumerate()
        .map(|(position, v)| Vertex {
            id: position as VertexId,
            ..*v
        })
        .collect()
}

// ------------------------------------------------------------------
// Decode / encode
// ------------------------------------------------------------------

/// Dense -> sparse.
///
/// Vertex ids become their positions. Every strictly positive cell
/// becomes an edge; edge ids are assigned sequentially in row-major order.
pub fn decode(dense: DenseForm) -> TopologyGraph {
    let vertices = renumber(&dense.vertices);

    let edges = dense
        .weights
        .indexed_iter()
        .filter(|(_, &w)| w > 0.0)
        .enumerate()
        .map(|(id, ((row, col), &weight))| Edge {
            id: id as u32,
            start_id: row as VertexId,
            end_id: col as VertexId,
            weight,
        })
        .collect();

    TopologyGraph { vertices, edges }
}

/// Sparse -> dense.
///
/// Edge endpoints are resolved to the current position of their vertex,
/// never to the stored id. Edges whose endpoints cannot be resolved are
/// skipped.
pub fn encode(graph: &TopologyGraph) -> DenseForm {
    let n = graph.vertices.len();
    let index = PositionIndex::new(&graph.vertices);
    let mut weights = Array2::zeros((n, n));

    for edge in &graph.edges {
        match (index.get(edge.start_id), index.get(edge.end_id)) {
            (Some(row), Some(col)) => weights[[row, col]] = edge.weight,
            _ => log::warn!(
                "skipping edge {} ({} -> {}): endpoint not in graph",
                edge.id,
                edge.start_id,
                edge.end_id
            ),
        }
    }

    DenseForm {
        vertices: renumber(&graph.vertices),
        weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Pose, VertexStatus};

    fn vertices(n: usize) -> Vec<Vertex> {
        (0..n)
            .map(|i| Vertex {
                id: (i * 10 + 7) as VertexId,
                pose: Pose {
                    x: i as f64,
                    y: -(i as f64),
                    z: 0.5,
                    yaw: 0.1,
                },
                status: if i % 2 == 0 {
                    VertexStatus::Active
                } else {
                    VertexStatus::Inactive
                },
            })
            .collect()
    }

    fn triples(graph: &TopologyGraph) -> Vec<(u32, u32, f64)> {
        let mut t: Vec<_> = graph
            .edges()
            .iter()
            .map(|e| (e.start_id, e.end_id, e.weight))
            .collect();
        t.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        t
    }

    #[test]
    fn test_decode_two_by_two_example() {
        let dense =
            DenseForm::from_flat(vertices(2), vec![0.0, 3.0, 0.0, 0.0])
                .unwrap();
        let graph = decode(dense);

        assert_eq!(graph.edges().len(), 1);
        let edge = graph.edges()[0];
        assert_eq!(edge.id, 0);
        assert_eq!((edge.start_id, edge.end_id), (0, 1));
        assert!((edge.weight - 3.0).abs() < 1e-9);

        assert_eq!(encode(&graph).flat(), vec![0.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_decode_renumbers_vertices_and_keeps_attributes() {
        let original = vertices(3);
        let dense =
            DenseForm::from_flat(original.clone(), vec![0.0; 9]).unwrap();
        let graph = decode(dense);

        for (position, (decoded, source)) in
            graph.vertices().iter().zip(&original).enumerate()
        {
            assert_eq!(decoded.id, position as VertexId);
            assert_eq!(decoded.pose, source.pose);
            assert_eq!(decoded.status, source.status);
        }
    }

    #[test]
    fn test_decode_skips_non_positive_cells() {
        let flat = vec![0.0, -2.0, 1.5, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0];
        let graph =
            decode(DenseForm::from_flat(vertices(3), flat).unwrap());
        assert_eq!(triples(&graph), vec![(0, 2, 1.5), (2, 0, 4.0)]);
        let ids: Vec<_> = graph.edges().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_decode_then_encode_reproduces_matrix() {
        for n in 0..6 {
            let flat: Vec<f64> = (0..n * n)
                .map(|k| if k % 3 == 0 { 0.0 } else { (k % 7) as f64 + 0.25 })
                .collect();
            let dense =
                DenseForm::from_flat(vertices(n), flat.clone()).unwrap();
            let encoded = encode(&decode(dense));
            assert_eq!(encoded.size(), n);
            assert_eq!(encoded.flat(), flat);
        }
    }

    #[test]
    fn test_encode_then_decode_renumbers_edge_ids() {
        let mut graph = TopologyGraph::new();
        for v in vertices(4) {
            graph.add_vertex(v.pose);
        }
        graph.add_edge(3, 0, 2.0).unwrap();
        graph.add_edge(1, 2, 1.0).unwrap();
        graph.add_edge(0, 3, 7.0).unwrap();
        graph.remove_edge(1).unwrap();
        graph.add_edge(2, 1, 5.0).unwrap();
        // Delete the first vertex so positions no longer match ids.
        graph.delete_vertex(0).unwrap();

        let decoded = decode(encode(&graph));
        assert_eq!(decoded.vertex_count(), graph.vertex_count());

        // Stored ids 1, 2, 3 now sit at positions 0, 1, 2.
        assert_eq!(triples(&decoded), vec![(1, 0, 5.0)]);
        let ids: Vec<_> = decoded.edges().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0]);
    }

    #[test]
    fn test_encode_resolves_positions_not_ids() {
        let mut graph = TopologyGraph::new();
        for v in vertices(3) {
            graph.add_vertex(v.pose);
        }
        graph.add_edge(2, 1, 3.0).unwrap();
        graph.delete_vertex(0).unwrap();

        let dense = encode(&graph);
        assert_eq!(dense.size(), 2);
        assert_eq!(dense.weight(1, 0), Some(3.0));
        let ids: Vec<_> = dense.vertices.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_encode_skips_dangling_edges() {
        let graph = TopologyGraph {
            vertices: vertices(2),
            edges: vec![
                Edge {
                    id: 0,
                    start_id: 7,
                    end_id: 17,
                    weight: 2.0,
                },
                Edge {
                    id: 1,
                    start_id: 7,
                    end_id: 99,
                    weight: 5.0,
                },
            ],
        };
        let dense = encode(&graph);
        assert_eq!(dense.flat(), vec![0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_flat_rejects_bad_shapes() {
        assert_eq!(
            DenseForm::from_flat(vertices(2), vec![0.0; 3]),
            Err(MatrixError::ShapeMismatch {
                len: 3,
                vertices: 2
            })
        );
        assert_eq!(
            DenseForm::from_flat(vertices(0), vec![1.0]),
            Err(MatrixError::ShapeMismatch {
                len: 1,
                vertices: 0
            })
        );
        assert!(matches!(
            DenseForm::from_flat(vertices(1), vec![f64::NAN]),
            Err(MatrixError::NonFiniteWeight { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_graph_round_trip() {
        let dense = DenseForm::from_flat(Vec::new(), Vec::new()).unwrap();
        let graph = decode(dense);
        assert!(graph.is_empty());
        assert!(encode(&graph).flat().is_empty());
    }
}
