use crate::actions::Action;
use crate::cache::Cache;
use crate::heatmap::{self, EditingState};
use crate::settings::{self, EditorSettings, SliderRange};
use crate::store::{ActiveTab, Store};
use crate::viewport;
use eframe::egui;
use petgraph::Direction;
use topomap::{Vertex, VertexId, VertexStatus};

/// Menu entries that need a platform file dialog, handled by the app.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuCommand {
    Load,
    Save,
}

pub fn menu_bar(
    ctx: &egui::Context,
    store: &Store,
    actions: &mut Vec<Action>,
    commands: &mut Vec<MenuCommand>,
) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New").clicked() {
                    ui.close();
                    actions.push(Action::NewMap);
                }
                if ui.button("Load…").clicked() {
                    ui.close();
                    commands.push(MenuCommand::Load);
                }
                if ui.button("Save…").clicked() {
                    ui.close();
                    commands.push(MenuCommand::Save);
                }
                ui.separator();
                if ui.button("Preview").clicked() {
                    ui.close();
                    actions.push(Action::SetShowPreview { show: true });
                }
            });
            ui.menu_button("View", |ui| {
                let mut show_labels = store.settings.show_labels;
                if ui.checkbox(&mut show_labels, "Vertex labels").changed() {
                    actions.push(Action::SetShowLabels { show: show_labels });
                }
                if ui.button("Reset view").clicked() {
                    ui.close();
                    actions.push(Action::ResetViewport);
                }
                if ui.button("Settings").clicked() {
                    ui.close();
                    actions.push(Action::SetShowSettings { show: true });
                }
            });
        });
    });
}

pub fn status_bar(ctx: &egui::Context, store: &Store) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let graph = store.graph.get();
            ui.label(format!(
                "{} vertices, {} edges",
                graph.vertex_count(),
                graph.edge_count()
            ));
            if let Some(id) = store.selection.pending() {
                ui.separator();
                ui.label(format!("vertex {id} staged"));
            }
            if let Some(message) = &store.status_message {
                ui.separator();
                ui.label(message);
            }
        });
    });
}

pub fn side_panel(
    ctx: &egui::Context,
    store: &Store,
    cache: &mut Cache,
    actions: &mut Vec<Action>,
) {
    egui::SidePanel::right("inspector")
        .resizable(true)
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (tab, name) in [
                    (ActiveTab::Vertices, "Vertices"),
                    (ActiveTab::Edges, "Edges"),
                    (ActiveTab::Matrix, "Matrix"),
                ] {
                    if ui.selectable_label(store.active_tab == tab, name).clicked() {
                        actions.push(Action::SetActiveTab { tab });
                    }
                }
            });
            ui.separator();

            match store.active_tab {
                ActiveTab::Vertices => vertices_tab(ui, store, cache, actions),
                ActiveTab::Edges => edges_tab(ui, store, actions),
                ActiveTab::Matrix => matrix_tab(ui, store, cache, actions),
            }
        });
}

fn vertices_tab(ui: &mut egui::Ui, store: &Store, cache: &mut Cache, actions: &mut Vec<Action>) {
    let graph = store.graph.get();
    if graph.is_empty() {
        ui.label("Click on the map to add a vertex.");
        return;
    }
    let digraph = cache.digraph.get(store);
    let neighbours = |id: VertexId, direction: Direction| -> String {
        let ids: Vec<String> = digraph
            .neighbors_directed(id, direction)
            .map(|n| n.to_string())
            .collect();
        if ids.is_empty() {
            String::from("none")
        } else {
            ids.join(", ")
        }
    };

    egui::ScrollArea::vertical().show(ui, |ui| {
        for vertex in graph.vertices() {
            let staged = store.selection.contains(vertex.id);
            let title = if staged {
                egui::RichText::new(format!("Vertex {}", vertex.id)).strong()
            } else {
                egui::RichText::new(format!("Vertex {}", vertex.id))
            };
            egui::CollapsingHeader::new(title)
                .id_salt(("vertex", vertex.id))
                .default_open(staged)
                .show(ui, |ui| {
                    pose_grid(ui, vertex);

                    let mut status = vertex.status;
                    egui::ComboBox::from_id_salt(("status", vertex.id))
                        .selected_text(status.label())
                        .show_ui(ui, |ui| {
                            for option in [VertexStatus::Active, VertexStatus::Inactive] {
                                ui.selectable_value(&mut status, option, option.label());
                            }
                        });
                    if status != vertex.status {
                        actions.push(Action::SetVertexStatus {
                            id: vertex.id,
                            status,
                        });
                    }

                    ui.label(format!(
                        "Incoming: {}",
                        neighbours(vertex.id, Direction::Incoming)
                    ));
                    ui.label(format!(
                        "Outgoing: {}",
                        neighbours(vertex.id, Direction::Outgoing)
                    ));

                    if ui.button("Delete").clicked() {
                        actions.push(Action::DeleteVertex { id: vertex.id });
                    }
                });
        }
    });
}

fn pose_grid(ui: &mut egui::Ui, vertex: &Vertex) {
    egui::Grid::new(("pose", vertex.id))
        .num_columns(2)
        .show(ui, |ui| {
            for (name, value) in [
                ("x", vertex.pose.x),
                ("y", vertex.pose.y),
                ("z", vertex.pose.z),
                ("yaw", vertex.pose.yaw),
            ] {
                ui.label(name);
                ui.monospace(format!("{value:.3}"));
                ui.end_row();
            }
        });
}

fn edges_tab(ui: &mut egui::Ui, store: &Store, actions: &mut Vec<Action>) {
    let graph = store.graph.get();
    if graph.edge_count() == 0 {
        ui.label("Click two vertices to connect them.");
        return;
    }
    let position = |id: VertexId| {
        graph
            .vertex(id)
            .map(|v| format!("({:.2}, {:.2})", v.pose.x, v.pose.y))
            .unwrap_or_else(|| String::from("(missing)"))
    };

    egui::ScrollArea::vertical().show(ui, |ui| {
        for edge in graph.edges() {
            ui.group(|ui| {
                ui.label(format!(
                    "Edge {}: {} → {}",
                    edge.id, edge.start_id, edge.end_id
                ));
                ui.label(format!(
                    "{} → {}",
                    position(edge.start_id),
                    position(edge.end_id)
                ));
                ui.horizontal(|ui| {
                    ui.label("Weight");
                    let mut weight = edge.weight;
                    let response = ui.add(
                        egui::DragValue::new(&mut weight)
                            .speed(0.05)
                            .range(0.01..=1.0e6)
                            .clamp_existing_to_range(false),
                    );
                    if response.changed() {
                        actions.push(Action::SetEdgeWeight {
                            edge_id: edge.id,
                            weight,
                        });
                    }
                    if ui.button("Remove").clicked() {
                        actions.push(Action::RemoveEdge { edge_id: edge.id });
                    }
                });
            });
        }
    });
}

fn matrix_tab(ui: &mut egui::Ui, store: &Store, cache: &mut Cache, actions: &mut Vec<Action>) {
    let data = cache.heatmap.get(store);
    let editing = EditingState {
        editing_cell: store.heatmap_editing_cell,
        edit_buffer: store.heatmap_edit_buffer.clone(),
    };
    let (hovered, editing, change) =
        heatmap::show_heatmap(ui, data, store.heatmap_hovered_cell, editing);

    if hovered != store.heatmap_hovered_cell {
        actions.push(Action::SetHeatmapHoveredCell { cell: hovered });
    }
    if editing.editing_cell != store.heatmap_editing_cell {
        actions.push(Action::SetHeatmapEditingCell {
            cell: editing.editing_cell,
        });
    }
    if editing.edit_buffer != store.heatmap_edit_buffer {
        actions.push(Action::SetHeatmapEditBuffer {
            buffer: editing.edit_buffer,
        });
    }
    if let Some(change) = change {
        actions.push(Action::SetMatrixWeight {
            start_id: change.start_id,
            end_id: change.end_id,
            weight: change.weight,
        });
    }
}

pub fn canvas(ctx: &egui::Context, store: &Store, cache: &mut Cache, actions: &mut Vec<Action>) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let sorted_weights = cache.sorted_weights.get(store);
        actions.extend(viewport::show(ui, store, sorted_weights));

        let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
        if escape && store.heatmap_editing_cell.is_none() && !store.selection.is_empty() {
            actions.push(Action::ClearSelection);
        }
    });
}

pub fn preview_window(
    ctx: &egui::Context,
    store: &Store,
    cache: &mut Cache,
    actions: &mut Vec<Action>,
    commands: &mut Vec<MenuCommand>,
) {
    if !store.show_preview {
        return;
    }
    let mut open = true;
    egui::Window::new("Preview")
        .open(&mut open)
        .default_size([420.0, 480.0])
        .show(ctx, |ui| {
            if ui.button("Save to File").clicked() {
                commands.push(MenuCommand::Save);
            }
            ui.separator();
            let text = cache.preview.get(store);
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut text.as_str())
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });
        });
    if !open {
        actions.push(Action::SetShowPreview { show: false });
    }
}

fn slider(ui: &mut egui::Ui, value: &mut f32, range: SliderRange, text: &str) -> bool {
    ui.add(
        egui::Slider::new(value, range.min..=range.max)
            .step_by(f64::from(range.step))
            .text(text),
    )
    .changed()
}

pub fn settings_window(ctx: &egui::Context, store: &Store, actions: &mut Vec<Action>) {
    if !store.show_settings {
        return;
    }
    let mut open = true;
    let mut edited = store.settings.clone();
    let mut changed = false;
    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Map");
            changed |= slider(ui, &mut edited.vertex_radius, settings::VERTEX_RADIUS_RANGE, "Vertex radius (m)");
            changed |= slider(ui, &mut edited.edge_width, settings::EDGE_WIDTH_RANGE, "Edge width (m)");
            changed |= slider(ui, &mut edited.edge_offset, settings::EDGE_OFFSET_RANGE, "Edge offset (m)");
            changed |= slider(ui, &mut edited.arrow_size, settings::ARROW_SIZE_RANGE, "Arrow size (m)");
            changed |= slider(ui, &mut edited.grid_spacing, settings::GRID_SPACING_RANGE, "Grid spacing (m)");
            changed |= slider(ui, &mut edited.grid_extent, settings::GRID_EXTENT_RANGE, "Grid extent (m)");

            ui.heading("Screen");
            changed |= slider(ui, &mut edited.default_zoom, settings::ZOOM_RANGE, "Default zoom (px/m)");
            changed |= slider(ui, &mut edited.label_font_size, settings::LABEL_FONT_RANGE, "Label size");
            changed |= ui.checkbox(&mut edited.show_labels, "Vertex labels").changed();

            ui.horizontal(|ui| {
                ui.label("Export file name");
                changed |= ui.text_edit_singleline(&mut edited.export_file_name).changed();
            });

            ui.separator();
            if ui.button("Restore defaults").clicked() {
                edited = EditorSettings::default();
                changed = true;
            }
        });

    if changed {
        actions.push(Action::SetSettings { settings: edited });
    }
    if !open {
        actions.push(Action::SetShowSettings { show: false });
    }
}

pub fn error_window(ctx: &egui::Context, store: &Store, actions: &mut Vec<Action>) {
    let Some(error) = &store.error_message else {
        return;
    };
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(error);
            if ui.button("OK").clicked() {
                actions.push(Action::ClearErrorMessage);
            }
        });
}
