use crate::heatmap::HeatmapData;
use crate::settings::EditorSettings;
use crate::versioned::Versioned;
use crate::viewport::Viewport;
use petgraph::graphmap::DiGraphMap;
use std::path::{Path, PathBuf};
use topomap::format::{self, FileFormat};
use topomap::{FormatError, Selection, TopologyGraph, VertexId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveTab {
    Vertices,
    Edges,
    Matrix,
}

/// Everything the editor owns. Mutated only by `actions::update` and
/// `effects::run`.
pub struct Store {
    pub graph: Versioned<TopologyGraph>,
    pub selection: Selection,
    pub settings: EditorSettings,
    pub active_tab: ActiveTab,
    pub show_preview: bool,
    pub show_settings: bool,
    pub viewport: Viewport,
    pub heatmap_hovered_cell: Option<(usize, usize)>,
    pub heatmap_editing_cell: Option<(usize, usize)>,
    pub heatmap_edit_buffer: String,
    /// File the map was last loaded from or saved to.
    pub current_path: Option<PathBuf>,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
}

impl Store {
    pub fn new(settings: EditorSettings) -> Self {
        let viewport = Viewport::new(settings.default_zoom);
        Self {
            graph: Versioned::new(TopologyGraph::new()),
            selection: Selection::Idle,
            settings,
            active_tab: ActiveTab::Vertices,
            show_preview: false,
            show_settings: false,
            viewport,
            heatmap_hovered_cell: None,
            heatmap_editing_cell: None,
            heatmap_edit_buffer: String::new(),
            current_path: None,
            error_message: None,
            status_message: None,
        }
    }

    /// Swap in a whole new map. Any staged vertex refers to the old map,
    /// so the selection and matrix editing state are dropped.
    pub fn replace_graph(&mut self, graph: TopologyGraph) {
        self.graph.set(graph);
        self.selection.clear();
        self.heatmap_hovered_cell = None;
        self.heatmap_editing_cell = None;
        self.heatmap_edit_buffer.clear();
    }

    /// Name offered by the save dialog.
    pub fn export_file_name(&self) -> String {
        self.current_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.settings.export_file_name.clone())
    }

    // ------------------------------------------------------------------
    // File operations
    // ------------------------------------------------------------------

    pub fn save_to_file(&mut self, path: &Path) -> Result<(), FormatError> {
        format::save_to_file(self.graph.get(), path)?;
        self.current_path = Some(path.to_path_buf());
        self.status_message = Some(format!("Saved {}", path.display()));
        Ok(())
    }

    /// Load a map from disk. On failure the current map is left untouched.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), FormatError> {
        let graph = format::load_from_file(path)?;
        self.replace_graph(graph);
        self.current_path = Some(path.to_path_buf());
        self.status_message = Some(format!("Loaded {}", path.display()));
        Ok(())
    }

    pub fn load_from_text(
        &mut self,
        text: &str,
        file_format: FileFormat,
        source_name: &str,
    ) -> Result<(), FormatError> {
        let graph = format::parse(text, file_format)?;
        log::info!(
            "loaded {} vertices and {} edges from {}",
            graph.vertex_count(),
            graph.edge_count(),
            source_name
        );
        self.replace_graph(graph);
        self.current_path = Some(PathBuf::from(source_name));
        self.status_message = Some(format!("Loaded {source_name}"));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived data, memoized in `Cache`
    // ------------------------------------------------------------------

    pub fn preview_uncached(&self) -> String {
        format::render(self.graph.get(), FileFormat::Yaml)
            .unwrap_or_else(|e| format!("# failed to render map: {e}"))
    }

    /// Dense matrix laid out for the heatmap: rows are start vertices,
    /// columns end vertices, both in vertex order.
    ///
    /// The dense form renumbers vertices by position, so rows are labelled
    /// and addressed with the ids of the live graph instead.
    pub fn heatmap_uncached(&self) -> HeatmapData {
        let graph = self.graph.get();
        let dense = graph.to_matrix();
        let n = dense.size();
        let ids: Vec<VertexId> = graph.vertices().iter().map(|v| v.id).collect();
        let labels = ids.iter().map(|id| id.to_string()).collect();
        let matrix = (0..n)
            .map(|row| {
                (0..n)
                    .map(|col| dense.weight(row, col).filter(|w| *w > 0.0))
                    .collect()
            })
            .collect();
        HeatmapData {
            labels,
            ids,
            matrix,
        }
    }

    /// Positive edge weights in ascending order, used for colouring.
    pub fn sorted_weights_uncached(&self) -> Vec<f64> {
        let mut weights: Vec<f64> = self
            .graph
            .get()
            .edges()
            .iter()
            .map(|e| e.weight)
            .filter(|w| *w > 0.0)
            .collect();
        weights.sort_by(f64::total_cmp);
        weights
    }

    pub fn digraph_uncached(&self) -> DiGraphMap<VertexId, f64> {
        self.graph.get().to_digraph()
    }
}
