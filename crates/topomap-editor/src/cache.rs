use crate::heatmap::HeatmapData;
use crate::store::Store;
use crate::versioned::Memoized;
use petgraph::graphmap::DiGraphMap;
use topomap::VertexId;

/// Views derived from the map, rebuilt only when the graph version moves.
pub struct Cache {
    pub preview: Memoized<Store, u64, String>,
    pub heatmap: Memoized<Store, u64, HeatmapData>,
    pub sorted_weights: Memoized<Store, u64, Vec<f64>>,
    pub digraph: Memoized<Store, u64, DiGraphMap<VertexId, f64>>,
}

impl Cache {
    pub fn new() -> Self {
        Self {
            preview: Memoized::new(
                |s: &Store| s.graph.version(),
                |s: &Store| s.preview_uncached(),
            ),
            heatmap: Memoized::new(
                |s: &Store| s.graph.version(),
                |s: &Store| s.heatmap_uncached(),
            ),
            sorted_weights: Memoized::new(
                |s: &Store| s.graph.version(),
                |s: &Store| s.sorted_weights_uncached(),
            ),
            digraph: Memoized::new(
                |s: &Store| s.graph.version(),
                |s: &Store| s.digraph_uncached(),
            ),
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
