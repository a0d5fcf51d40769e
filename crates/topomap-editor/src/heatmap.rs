use eframe::egui;
use topomap::VertexId;

/// Dense weights laid out for display. `matrix[row][col]` is the weight of
/// `ids[row] -> ids[col]`, `None` where there is no edge.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapData {
    pub labels: Vec<String>,
    pub ids: Vec<VertexId>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

const COLOR_SCALE_MESH_POINTS: usize = 10;
const COLOR_SCALE_HEIGHT: f32 = 20.0;
const COLOR_SCALE_LABEL_HEIGHT: f32 = 15.0;
const LABEL_WIDTH: f32 = 40.0;
const LABEL_HEIGHT: f32 = 20.0;
const MIN_CELL_SIZE: f32 = 14.0;
const MAX_CELL_SIZE: f32 = 48.0;
const WEIGHT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightChange {
    pub start_id: VertexId,
    pub end_id: VertexId,
    pub weight: f64,
}

/// Cell being edited, as `(col, row)`, and its text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditingState {
    pub editing_cell: Option<(usize, usize)>,
    pub edit_buffer: String,
}

fn viridis(t: f64) -> egui::Color32 {
    let c = colorous::VIRIDIS.eval_continuous(t.clamp(0.0, 1.0));
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

/// Black on light backgrounds, white on dark ones.
fn contrasting_text_color(bg: egui::Color32) -> egui::Color32 {
    let luminance = 0.299 * f64::from(bg.r())
        + 0.587 * f64::from(bg.g())
        + 0.114 * f64::from(bg.b());
    if luminance > 127.5 {
        egui::Color32::BLACK
    } else {
        egui::Color32::WHITE
    }
}

/// Position of `weight` in `sorted_weights`, scaled to `[0, 1]`.
///
/// Ranks rather than raw values drive the colour so a single large weight
/// does not wash out the rest. Repeated weights take the middle of their
/// run; weights between two entries are interpolated.
pub fn calculate_color_position(weight: f64, sorted_weights: &[f64]) -> f64 {
    if sorted_weights.len() < 2 {
        return 0.5;
    }
    let last = (sorted_weights.len() - 1) as f64;

    let first = sorted_weights.partition_point(|w| *w < weight - WEIGHT_EPSILON);
    if first == 0 {
        return 0.0;
    }
    if first == sorted_weights.len() {
        return 1.0;
    }

    let end = sorted_weights.partition_point(|w| *w <= weight + WEIGHT_EPSILON);
    if end > first {
        return ((first + end - 1) / 2) as f64 / last;
    }

    let lower = sorted_weights[first - 1];
    let upper = sorted_weights[first];
    let ratio = (weight - lower) / (upper - lower);
    ((first - 1) as f64 + ratio) / last
}

/// Colour for an edge weight among the map's sorted weights.
pub fn weight_color(weight: f64, sorted_weights: &[f64]) -> egui::Color32 {
    viridis(calculate_color_position(weight, sorted_weights))
}

/// Next cell in row-major order, wrapping to the top-left corner.
fn next_cell((col, row): (usize, usize), size: usize) -> (usize, usize) {
    if col + 1 < size {
        (col + 1, row)
    } else if row + 1 < size {
        (0, row + 1)
    } else {
        (0, 0)
    }
}

fn cell_text(weight: Option<f64>) -> String {
    weight.map(|w| w.to_string()).unwrap_or_default()
}

fn render_color_scale(ui: &mut egui::Ui, sorted_weights: &[f64], scale_width: f32) {
    let (Some(&min_weight), Some(&max_weight)) =
        (sorted_weights.first(), sorted_weights.last())
    else {
        return;
    };
    if (max_weight - min_weight).abs() < WEIGHT_EPSILON {
        return;
    }

    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(scale_width, COLOR_SCALE_HEIGHT + COLOR_SCALE_LABEL_HEIGHT),
        egui::Sense::hover(),
    );
    let painter = ui.painter();

    let mut mesh = egui::Mesh::default();
    for i in 0..COLOR_SCALE_MESH_POINTS {
        let t = i as f32 / (COLOR_SCALE_MESH_POINTS - 1) as f32;
        let x = rect.min.x + t * scale_width;
        let weight = min_weight + f64::from(t) * (max_weight - min_weight);
        let color = weight_color(weight, sorted_weights);
        mesh.colored_vertex(egui::pos2(x, rect.min.y), color);
        mesh.colored_vertex(egui::pos2(x, rect.min.y + COLOR_SCALE_HEIGHT), color);
    }
    for i in 0..(COLOR_SCALE_MESH_POINTS - 1) {
        let base = (i * 2) as u32;
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base + 1, base + 3, base + 2);
    }
    painter.add(egui::Shape::mesh(mesh));

    for pos in [0.0_f32, 0.25, 0.5, 0.75, 1.0] {
        let x = rect.min.x + pos * scale_width;
        let weight = min_weight + f64::from(pos) * (max_weight - min_weight);
        let tick_top = rect.min.y + COLOR_SCALE_HEIGHT;
        painter.line_segment(
            [egui::pos2(x, tick_top), egui::pos2(x, tick_top + 4.0)],
            egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
        );
        painter.text(
            egui::pos2(x, tick_top + 5.0),
            egui::Align2::CENTER_TOP,
            format!("{weight:.1}"),
            egui::FontId::proportional(9.0),
            egui::Color32::GRAY,
        );
    }
}

/// Draw the dense matrix as a heatmap with inline cell editing.
///
/// Clicking a cell starts editing it. Enter commits, Tab commits and moves
/// to the next cell, Escape or focus loss cancels. Returns the hovered
/// cell, the new editing state and the committed weight, if any.
pub fn show_heatmap(
    ui: &mut egui::Ui,
    data: &HeatmapData,
    prev_hovered_cell: Option<(usize, usize)>,
    editing_state: EditingState,
) -> (Option<(usize, usize)>, EditingState, Option<WeightChange>) {
    let size = data.ids.len();
    if size == 0 {
        ui.label("No vertices to display");
        return (None, editing_state, None);
    }

    // Zero heads the list so empty cells take the darkest colour.
    let mut sorted_weights: Vec<f64> = data
        .matrix
        .iter()
        .flatten()
        .filter_map(|w| *w)
        .filter(|w| *w > 0.0)
        .collect();
    sorted_weights.sort_by(f64::total_cmp);
    sorted_weights.insert(0, 0.0);

    let available = ui.available_width() - LABEL_WIDTH;
    let cell_size = (available / size as f32).clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);

    let mut hovered = None;
    let EditingState {
        mut editing_cell,
        mut edit_buffer,
    } = editing_state;
    let mut weight_change = None;

    egui::ScrollArea::both().show(ui, |ui| {
        ui.spacing_mut().item_spacing = egui::Vec2::ZERO;

        ui.horizontal(|ui| {
            ui.add_space(LABEL_WIDTH);
            for (col, label) in data.labels.iter().enumerate() {
                let highlighted = prev_hovered_cell.is_some_and(|(c, _)| c == col);
                let text = axis_label(ui, label, highlighted);
                ui.add_sized([cell_size, LABEL_HEIGHT], egui::Label::new(text));
            }
        });

        for (row, weights) in data.matrix.iter().enumerate() {
            ui.horizontal(|ui| {
                let highlighted = prev_hovered_cell.is_some_and(|(_, r)| r == row);
                let text = axis_label(ui, &data.labels[row], highlighted);
                ui.add_sized([LABEL_WIDTH, cell_size], egui::Label::new(text));

                for (col, weight) in weights.iter().enumerate() {
                    let cell_color =
                        viridis(calculate_color_position(weight.unwrap_or(0.0), &sorted_weights));
                    let (rect, response) = ui.allocate_exact_size(
                        egui::vec2(cell_size, cell_size),
                        egui::Sense::click(),
                    );

                    if editing_cell == Some((col, row)) {
                        ui.painter().rect_filled(rect, 0.0, cell_color);
                        let mut child_ui = ui.new_child(
                            egui::UiBuilder::new()
                                .max_rect(rect.shrink(2.0))
                                .layout(egui::Layout::centered_and_justified(
                                    egui::Direction::TopDown,
                                )),
                        );
                        let visuals = &mut child_ui.style_mut().visuals;
                        visuals.extreme_bg_color = egui::Color32::TRANSPARENT;
                        visuals.override_text_color = Some(contrasting_text_color(cell_color));

                        let te_response = child_ui.add(
                            egui::TextEdit::singleline(&mut edit_buffer)
                                .font(egui::FontId::proportional(10.0))
                                .horizontal_align(egui::Align::Center)
                                .frame(false),
                        );
                        te_response.request_focus();

                        let (enter, tab, escape) = ui.input(|i| {
                            (
                                i.key_pressed(egui::Key::Enter),
                                i.key_pressed(egui::Key::Tab),
                                i.key_pressed(egui::Key::Escape),
                            )
                        });
                        let commit = || {
                            edit_buffer.trim().parse::<f64>().ok().filter(|w| w.is_finite()).map(
                                |weight| WeightChange {
                                    start_id: data.ids[row],
                                    end_id: data.ids[col],
                                    weight,
                                },
                            )
                        };

                        if enter {
                            weight_change = commit();
                            editing_cell = None;
                            edit_buffer.clear();
                        } else if tab {
                            weight_change = commit();
                            let (next_col, next_row) = next_cell((col, row), size);
                            editing_cell = Some((next_col, next_row));
                            edit_buffer = cell_text(data.matrix[next_row][next_col]);
                        } else if escape || te_response.lost_focus() {
                            editing_cell = None;
                            edit_buffer.clear();
                        }
                        continue;
                    }

                    if response.hovered() {
                        hovered = Some((col, row));
                    }
                    if response.clicked() {
                        editing_cell = Some((col, row));
                        edit_buffer = cell_text(*weight);
                    }

                    let fill = if response.hovered() {
                        egui::Color32::from_rgb(
                            cell_color.r().saturating_add(40),
                            cell_color.g().saturating_add(40),
                            cell_color.b().saturating_add(40),
                        )
                    } else {
                        cell_color
                    };
                    ui.painter().rect_filled(rect, 0.0, fill);
                    ui.painter().rect_stroke(
                        rect,
                        0.0,
                        egui::Stroke::new(0.5, egui::Color32::from_gray(40)),
                        egui::epaint::StrokeKind::Inside,
                    );
                    if let Some(w) = weight {
                        ui.painter().text(
                            rect.center(),
                            egui::Align2::CENTER_CENTER,
                            format!("{w:.1}"),
                            egui::FontId::proportional(9.0),
                            contrasting_text_color(cell_color),
                        );
                    }
                }
            });
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            ui.add_space(LABEL_WIDTH);
            render_color_scale(ui, &sorted_weights, cell_size * size as f32);
        });
    });

    (
        hovered,
        EditingState {
            editing_cell,
            edit_buffer,
        },
        weight_change,
    )
}

fn axis_label(ui: &egui::Ui, label: &str, highlighted: bool) -> egui::RichText {
    let color = if highlighted {
        ui.visuals().strong_text_color()
    } else {
        ui.visuals().weak_text_color()
    };
    egui::RichText::new(label).color(color).size(10.0)
}
