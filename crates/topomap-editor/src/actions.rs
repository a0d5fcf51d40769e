use crate::effects::Effect;
use crate::settings::EditorSettings;
use crate::store::{ActiveTab, Store};
use crate::viewport::Viewport;
use eframe::egui;
use std::path::PathBuf;
use topomap::format::FileFormat;
use topomap::interaction::{self, InteractionEvent, InteractionOutcome};
use topomap::{EdgeId, TopologyGraph, VertexId, VertexStatus};

/// Actions that can be dispatched to modify the editor state
#[derive(Debug, Clone)]
pub enum Action {
    // Canvas interaction
    /// Empty canvas clicked at scene coordinates
    PointClicked { x: f64, y: f64 },
    /// Vertex clicked with the primary button
    VertexClicked { id: VertexId },
    /// Vertex clicked with the secondary button
    VertexRightClicked { id: VertexId },
    /// Drop any staged vertex
    ClearSelection,

    // Side panel edits
    /// Delete a vertex and every edge touching it
    DeleteVertex { id: VertexId },
    SetVertexStatus { id: VertexId, status: VertexStatus },
    SetEdgeWeight { edge_id: EdgeId, weight: f64 },
    RemoveEdge { edge_id: EdgeId },
    /// Matrix cell edit; a weight of zero or less removes the edge
    SetMatrixWeight {
        start_id: VertexId,
        end_id: VertexId,
        weight: f64,
    },

    // UI state
    SetActiveTab { tab: ActiveTab },
    SetShowLabels { show: bool },
    SetShowPreview { show: bool },
    SetShowSettings { show: bool },
    SetSettings { settings: EditorSettings },
    SetHeatmapHoveredCell { cell: Option<(usize, usize)> },
    SetHeatmapEditingCell { cell: Option<(usize, usize)> },
    SetHeatmapEditBuffer { buffer: String },
    PanViewport { delta: egui::Vec2 },
    /// Zoom by `factor` around `anchor`, relative to the canvas centre
    ZoomViewport { factor: f32, anchor: egui::Vec2 },
    ResetViewport,

    // File operations
    /// Start over with an empty map
    NewMap,
    SaveToFile { path: PathBuf },
    LoadFromFile { path: PathBuf },
    /// Map text read by the browser file picker
    LoadFromText {
        text: String,
        format: FileFormat,
        source_name: String,
    },
    /// Offer the rendered map as a browser download
    #[cfg(target_arch = "wasm32")]
    DownloadMap,
    ReportError { message: String },
    ClearErrorMessage,
}

/// Apply a single action to modify the store state
pub fn update(store: &mut Store, action: Action) -> Vec<Effect> {
    match action {
        // Canvas interaction
        Action::PointClicked { x, y } => {
            interact(store, InteractionEvent::PointClicked { x, y });
            vec![]
        }
        Action::VertexClicked { id } => {
            interact(store, InteractionEvent::VertexClicked(id));
            vec![]
        }
        Action::VertexRightClicked { id } => {
            interact(store, InteractionEvent::VertexRightClicked(id));
            vec![]
        }
        Action::ClearSelection => {
            store.selection.clear();
            vec![]
        }

        // Side panel edits
        Action::DeleteVertex { id } => {
            edit_graph(store, |graph| {
                graph.delete_vertex(id).map(|(vertex, removed)| {
                    log::debug!(
                        "deleted vertex {} with {} edges",
                        vertex.id,
                        removed.len()
                    );
                })
            });
            store.selection.clear();
            vec![]
        }
        Action::SetVertexStatus { id, status } => {
            edit_graph(store, |graph| graph.set_vertex_status(id, status));
            vec![]
        }
        Action::SetEdgeWeight { edge_id, weight } => {
            edit_graph(store, |graph| graph.set_edge_weight(edge_id, weight));
            vec![]
        }
        Action::RemoveEdge { edge_id } => {
            edit_graph(store, |graph| graph.remove_edge(edge_id).map(|_| ()));
            vec![]
        }
        Action::SetMatrixWeight {
            start_id,
            end_id,
            weight,
        } => {
            edit_graph(store, |graph| {
                graph
                    .set_connection_weight(start_id, end_id, weight)
                    .map(|_| ())
            });
            vec![]
        }

        // UI state
        Action::SetActiveTab { tab } => {
            store.active_tab = tab;
            vec![]
        }
        Action::SetShowLabels { show } => {
            store.settings.show_labels = show;
            vec![]
        }
        Action::SetShowPreview { show } => {
            store.show_preview = show;
            vec![]
        }
        Action::SetShowSettings { show } => {
            store.show_settings = show;
            vec![]
        }
        Action::SetSettings { settings } => {
            store.settings = settings.clamped();
            vec![]
        }
        Action::SetHeatmapHoveredCell { cell } => {
            store.heatmap_hovered_cell = cell;
            vec![]
        }
        Action::SetHeatmapEditingCell { cell } => {
            store.heatmap_editing_cell = cell;
            vec![]
        }
        Action::SetHeatmapEditBuffer { buffer } => {
            store.heatmap_edit_buffer = buffer;
            vec![]
        }
        Action::PanViewport { delta } => {
            store.viewport.pan_by(delta);
            vec![]
        }
        Action::ZoomViewport { factor, anchor } => {
            store.viewport.zoom_at(factor, anchor);
            vec![]
        }
        Action::ResetViewport => {
            store.viewport = Viewport::new(store.settings.default_zoom);
            vec![]
        }

        // File operations
        Action::NewMap => {
            store.replace_graph(TopologyGraph::new());
            store.current_path = None;
            store.status_message = Some(String::from("New map"));
            vec![]
        }
        Action::SaveToFile { path } => {
            vec![Effect::SaveToFile { path }]
        }
        Action::LoadFromFile { path } => {
            vec![Effect::LoadFromFile { path }]
        }
        Action::LoadFromText {
            text,
            format,
            source_name,
        } => {
            if let Err(e) = store.load_from_text(&text, format, &source_name) {
                log::error!("failed to load {source_name}: {e}");
                store.error_message = Some(format!("Failed to load {source_name}: {e}"));
            }
            vec![]
        }
        #[cfg(target_arch = "wasm32")]
        Action::DownloadMap => {
            vec![Effect::DownloadMap {
                file_name: store.export_file_name(),
            }]
        }
        Action::ReportError { message } => {
            log::error!("{message}");
            store.error_message = Some(message);
            vec![]
        }
        Action::ClearErrorMessage => {
            store.error_message = None;
            vec![]
        }
    }
}

/// Feed a canvas event through the interaction state machine. Events that
/// name a vertex that no longer exists are ignored.
fn interact(store: &mut Store, event: InteractionEvent) {
    let mut graph = store.graph.get().clone();
    match interaction::apply(&mut graph, &mut store.selection, event) {
        Ok(outcome) => {
            log::debug!("{outcome:?}");
            let changed = !matches!(
                outcome,
                InteractionOutcome::Staged(_) | InteractionOutcome::Deselected(_)
            );
            if changed {
                store.graph.set(graph);
            }
        }
        Err(e) => log::debug!("ignored {event:?}: {e}"),
    }
}

/// Run a fallible edit on a copy of the graph and keep it only on success,
/// so caches keyed on the graph version stay valid after a rejected edit.
fn edit_graph(
    store: &mut Store,
    edit: impl FnOnce(&mut TopologyGraph) -> Result<(), topomap::GraphError>,
) {
    let mut graph = store.graph.get().clone();
    match edit(&mut graph) {
        Ok(()) => store.graph.set(graph),
        Err(e) => log::debug!("ignored graph edit: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topomap::Pose;

    fn store_with_vertices(count: usize) -> Store {
        let mut store = Store::new(EditorSettings::default());
        for i in 0..count {
            update(
                &mut store,
                Action::PointClicked {
                    x: i as f64,
                    y: 0.0,
                },
            );
        }
        store
    }

    fn edge_triples(store: &Store) -> Vec<(VertexId, VertexId, f64)> {
        store
            .graph
            .get()
            .edges()
            .iter()
            .map(|e| (e.start_id, e.end_id, e.weight))
            .collect()
    }

    #[test]
    fn test_point_click_adds_vertex_at_mapped_pose() {
        let mut store = Store::new(EditorSettings::default());
        update(&mut store, Action::PointClicked { x: 2.0, y: 5.0 });

        let graph = store.graph.get();
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(
            graph.vertices()[0].pose,
            Pose {
                x: 5.0,
                y: -2.0,
                z: 0.0,
                yaw: 0.0
            }
        );
    }

    #[test]
    fn test_two_clicks_toggle_an_edge() {
        let mut store = store_with_vertices(2);

        update(&mut store, Action::VertexClicked { id: 0 });
        assert!(store.selection.contains(0));
        update(&mut store, Action::VertexClicked { id: 1 });
        assert_eq!(edge_triples(&store), vec![(0, 1, 1.0)]);
        assert!(store.selection.is_empty());

        update(&mut store, Action::VertexClicked { id: 0 });
        update(&mut store, Action::VertexClicked { id: 1 });
        assert!(edge_triples(&store).is_empty());
    }

    #[test]
    fn test_staging_does_not_bump_graph_version() {
        let mut store = store_with_vertices(1);
        let version = store.graph.version();
        update(&mut store, Action::VertexClicked { id: 0 });
        update(&mut store, Action::VertexClicked { id: 0 });
        assert_eq!(store.graph.version(), version);
        assert!(store.selection.is_empty());
    }

    #[test]
    fn test_right_click_cascades() {
        let mut store = store_with_vertices(3);
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            update(&mut store, Action::VertexClicked { id: a });
            update(&mut store, Action::VertexClicked { id: b });
        }

        update(&mut store, Action::VertexRightClicked { id: 1 });

        assert_eq!(store.graph.get().vertex_count(), 2);
        assert_eq!(edge_triples(&store), vec![(2, 0, 1.0)]);
    }

    #[test]
    fn test_panel_delete_cascades_and_clears_staged_vertex() {
        let mut store = store_with_vertices(2);
        update(&mut store, Action::VertexClicked { id: 0 });
        update(&mut store, Action::VertexClicked { id: 1 });
        update(&mut store, Action::VertexClicked { id: 1 });

        update(&mut store, Action::DeleteVertex { id: 1 });

        assert!(edge_triples(&store).is_empty());
        assert!(store.selection.is_empty());
    }

    #[test]
    fn test_panel_delete_clears_any_staged_vertex() {
        let mut store = store_with_vertices(3);
        update(&mut store, Action::VertexClicked { id: 0 });
        assert!(store.selection.contains(0));

        update(&mut store, Action::DeleteVertex { id: 2 });

        assert!(store.selection.is_empty());
        assert_eq!(store.graph.get().vertex_count(), 2);
    }

    #[test]
    fn test_stale_ids_are_ignored() {
        let mut store = store_with_vertices(1);
        let version = store.graph.version();

        update(&mut store, Action::VertexClicked { id: 9 });
        update(&mut store, Action::VertexRightClicked { id: 9 });
        update(&mut store, Action::DeleteVertex { id: 9 });
        update(&mut store, Action::RemoveEdge { edge_id: 3 });

        assert_eq!(store.graph.version(), version);
        assert_eq!(store.graph.get().vertex_count(), 1);
        assert!(store.error_message.is_none());
    }

    #[test]
    fn test_matrix_weight_edits() {
        let mut store = store_with_vertices(2);

        update(
            &mut store,
            Action::SetMatrixWeight {
                start_id: 1,
                end_id: 0,
                weight: 2.5,
            },
        );
        assert_eq!(edge_triples(&store), vec![(1, 0, 2.5)]);

        update(
            &mut store,
            Action::SetMatrixWeight {
                start_id: 1,
                end_id: 0,
                weight: 4.0,
            },
        );
        assert_eq!(edge_triples(&store), vec![(1, 0, 4.0)]);

        update(
            &mut store,
            Action::SetMatrixWeight {
                start_id: 1,
                end_id: 0,
                weight: 0.0,
            },
        );
        assert!(edge_triples(&store).is_empty());
    }

    #[test]
    fn test_panel_edge_edits() {
        let mut store = store_with_vertices(2);
        update(&mut store, Action::VertexClicked { id: 0 });
        update(&mut store, Action::VertexClicked { id: 1 });
        let edge_id = store.graph.get().edges()[0].id;

        update(&mut store, Action::SetEdgeWeight { edge_id, weight: 7.0 });
        assert_eq!(edge_triples(&store), vec![(0, 1, 7.0)]);

        update(&mut store, Action::RemoveEdge { edge_id });
        assert!(edge_triples(&store).is_empty());
    }

    #[test]
    fn test_set_vertex_status() {
        let mut store = store_with_vertices(1);
        update(
            &mut store,
            Action::SetVertexStatus {
                id: 0,
                status: VertexStatus::Inactive,
            },
        );
        assert_eq!(store.graph.get().vertices()[0].status, VertexStatus::Inactive);
    }

    #[test]
    fn test_load_from_text_replaces_graph() {
        let mut store = store_with_vertices(3);
        update(&mut store, Action::VertexClicked { id: 2 });

        update(
            &mut store,
            Action::LoadFromText {
                text: String::from(
                    "topology_map:\n  vertexs:\n    - { pose: { x: 0, y: 0 } }\n    - { pose: { x: 1, y: 0 } }\n  edges: [0, 3, 0, 0]\n",
                ),
                format: FileFormat::Yaml,
                source_name: String::from("map.yaml"),
            },
        );

        assert_eq!(store.graph.get().vertex_count(), 2);
        assert_eq!(edge_triples(&store), vec![(0, 1, 3.0)]);
        assert!(store.selection.is_empty());
        assert_eq!(store.current_path, Some(PathBuf::from("map.yaml")));
    }

    #[test]
    fn test_malformed_text_reports_error_and_keeps_graph() {
        let mut store = store_with_vertices(2);
        let before = store.graph.get().clone();

        update(
            &mut store,
            Action::LoadFromText {
                text: String::from("topology_map: [oops"),
                format: FileFormat::Yaml,
                source_name: String::from("bad.yaml"),
            },
        );

        assert_eq!(store.graph.get(), &before);
        assert!(store.error_message.is_some());
        update(&mut store, Action::ClearErrorMessage);
        assert!(store.error_message.is_none());
    }

    #[test]
    fn test_file_actions_become_effects() {
        let mut store = Store::new(EditorSettings::default());
        let path = PathBuf::from("map.yaml");

        let effects = update(&mut store, Action::SaveToFile { path: path.clone() });
        assert!(matches!(effects.as_slice(), [Effect::SaveToFile { path: p }] if *p == path));

        let effects = update(&mut store, Action::LoadFromFile { path: path.clone() });
        assert!(matches!(effects.as_slice(), [Effect::LoadFromFile { path: p }] if *p == path));
    }

    #[test]
    fn test_new_map_resets_graph_and_path() {
        let mut store = store_with_vertices(2);
        store.current_path = Some(PathBuf::from("old.yaml"));
        update(&mut store, Action::NewMap);
        assert!(store.graph.get().is_empty());
        assert_eq!(store.current_path, None);
    }

    #[test]
    fn test_viewport_actions() {
        let mut store = Store::new(EditorSettings::default());
        update(
            &mut store,
            Action::PanViewport {
                delta: egui::vec2(10.0, 5.0),
            },
        );
        update(
            &mut store,
            Action::ZoomViewport {
                factor: 2.0,
                anchor: egui::Vec2::ZERO,
            },
        );
        assert_eq!(store.viewport.pan, egui::vec2(20.0, 10.0));
        assert_eq!(store.viewport.zoom, 40.0);

        update(&mut store, Action::ResetViewport);
        assert_eq!(store.viewport, Viewport::new(20.0));
    }

    #[test]
    fn test_settings_are_clamped() {
        let mut store = Store::new(EditorSettings::default());
        let settings = EditorSettings {
            vertex_radius: 100.0,
            ..EditorSettings::default()
        };
        update(&mut store, Action::SetSettings { settings });
        assert_eq!(
            store.settings.vertex_radius,
            crate::settings::VERTEX_RADIUS_RANGE.max
        );
    }
}
