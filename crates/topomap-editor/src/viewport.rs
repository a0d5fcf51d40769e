use crate::actions::Action;
use crate::heatmap::weight_color;
use crate::settings::{EditorSettings, ZOOM_RANGE};
use crate::store::Store;
use eframe::egui;
use topomap::{Edge, Pose, TopologyGraph, VertexId, VertexStatus};

const ACTIVE_COLOR: egui::Color32 = egui::Color32::from_rgb(70, 130, 220);
const INACTIVE_COLOR: egui::Color32 = egui::Color32::from_rgb(150, 150, 150);
const GRID_COLOR: egui::Color32 = egui::Color32::from_gray(45);
const AXIS_COLOR: egui::Color32 = egui::Color32::from_gray(90);
const SCROLL_ZOOM_SPEED: f32 = 0.002;

/// Pan and zoom of the map canvas.
///
/// Scene x points right and scene y points up. `pan` is the screen offset
/// of the scene origin from the canvas centre, `zoom` is pixels per meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: egui::Vec2,
    pub zoom: f32,
}

impl Viewport {
    pub fn new(zoom: f32) -> Self {
        Self {
            pan: egui::Vec2::ZERO,
            zoom: ZOOM_RANGE.clamp(zoom),
        }
    }

    pub fn scene_to_screen(&self, center: egui::Pos2, scene: [f64; 2]) -> egui::Pos2 {
        center
            + self.pan
            + egui::vec2(scene[0] as f32 * self.zoom, -(scene[1] as f32) * self.zoom)
    }

    pub fn screen_to_scene(&self, center: egui::Pos2, pos: egui::Pos2) -> [f64; 2] {
        let offset = pos - center - self.pan;
        [
            f64::from(offset.x / self.zoom),
            f64::from(-offset.y / self.zoom),
        ]
    }

    pub fn pose_to_screen(&self, center: egui::Pos2, pose: &Pose) -> egui::Pos2 {
        self.scene_to_screen(center, pose.scene_xy())
    }

    pub fn pan_by(&mut self, delta: egui::Vec2) {
        self.pan += delta;
    }

    /// Scale by `factor`, keeping the scene point under `anchor` fixed.
    /// `anchor` is relative to the canvas centre.
    pub fn zoom_at(&mut self, factor: f32, anchor: egui::Vec2) {
        let zoom = ZOOM_RANGE.clamp(self.zoom * factor);
        let applied = zoom / self.zoom;
        self.pan = anchor - (anchor - self.pan) * applied;
        self.zoom = zoom;
    }

    /// Vertex closest to `pos` within `radius` meters, if any.
    pub fn hit_test(
        &self,
        graph: &TopologyGraph,
        center: egui::Pos2,
        pos: egui::Pos2,
        radius: f32,
    ) -> Option<VertexId> {
        let reach = radius * self.zoom;
        graph
            .vertices()
            .iter()
            .map(|v| (v.id, self.pose_to_screen(center, &v.pose).distance(pos)))
            .filter(|(_, d)| *d <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}

/// Draw the map and translate pointer input into actions.
///
/// A primary drag pans and never counts as a click.
pub fn show(ui: &mut egui::Ui, store: &Store, sorted_weights: &[f64]) -> Vec<Action> {
    let mut actions = Vec::new();
    let (rect, response) =
        ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    let center = rect.center();
    let viewport = &store.viewport;
    let graph = store.graph.get();
    let settings = &store.settings;

    if response.dragged_by(egui::PointerButton::Primary) {
        actions.push(Action::PanViewport {
            delta: response.drag_delta(),
        });
    }

    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0
            && let Some(pointer) = response.hover_pos()
        {
            actions.push(Action::ZoomViewport {
                factor: (scroll * SCROLL_ZOOM_SPEED).exp(),
                anchor: pointer - center,
            });
        }
    }

    if response.clicked()
        && let Some(pos) = response.interact_pointer_pos()
    {
        match viewport.hit_test(graph, center, pos, settings.vertex_radius) {
            Some(id) => actions.push(Action::VertexClicked { id }),
            None => {
                let [x, y] = viewport.screen_to_scene(center, pos);
                actions.push(Action::PointClicked { x, y });
            }
        }
    }

    if response.secondary_clicked()
        && let Some(pos) = response.interact_pointer_pos()
        && let Some(id) = viewport.hit_test(graph, center, pos, settings.vertex_radius)
    {
        actions.push(Action::VertexRightClicked { id });
    }

    draw_grid(&painter, viewport, center, settings);
    for edge in graph.edges() {
        draw_edge(&painter, viewport, center, graph, edge, settings, sorted_weights);
    }
    for vertex in graph.vertices() {
        let pos = viewport.pose_to_screen(center, &vertex.pose);
        let base = match vertex.status {
            VertexStatus::Active => ACTIVE_COLOR,
            VertexStatus::Inactive => INACTIVE_COLOR,
        };
        let fill = if store.selection.contains(vertex.id) {
            base
        } else {
            base.gamma_multiply(0.5)
        };
        painter.circle_filled(pos, settings.vertex_radius * viewport.zoom, fill);
        if settings.show_labels {
            painter.text(
                pos,
                egui::Align2::CENTER_CENTER,
                vertex.id.to_string(),
                egui::FontId::proportional(settings.label_font_size),
                egui::Color32::WHITE,
            );
        }
    }

    if let Some(pointer) = response.hover_pos() {
        let [x, y] = viewport.screen_to_scene(center, pointer);
        let pose = Pose::from_scene_click(x, y);
        painter.text(
            rect.left_bottom() + egui::vec2(6.0, -6.0),
            egui::Align2::LEFT_BOTTOM,
            format!("x: {:.2}  y: {:.2}", pose.x, pose.y),
            egui::FontId::monospace(11.0),
            egui::Color32::GRAY,
        );
    }

    actions
}

fn draw_grid(
    painter: &egui::Painter,
    viewport: &Viewport,
    center: egui::Pos2,
    settings: &EditorSettings,
) {
    let spacing = f64::from(settings.grid_spacing);
    let extent = f64::from(settings.grid_extent);
    // Skip lines that would be closer than a few pixels apart.
    if settings.grid_spacing * viewport.zoom < 4.0 {
        return;
    }
    let steps = (extent / spacing).floor() as i64;
    for i in -steps..=steps {
        let offset = i as f64 * spacing;
        let color = if i == 0 { AXIS_COLOR } else { GRID_COLOR };
        let stroke = egui::Stroke::new(1.0, color);
        painter.line_segment(
            [
                viewport.scene_to_screen(center, [offset, -extent]),
                viewport.scene_to_screen(center, [offset, extent]),
            ],
            stroke,
        );
        painter.line_segment(
            [
                viewport.scene_to_screen(center, [-extent, offset]),
                viewport.scene_to_screen(center, [extent, offset]),
            ],
            stroke,
        );
    }
}

fn draw_edge(
    painter: &egui::Painter,
    viewport: &Viewport,
    center: egui::Pos2,
    graph: &TopologyGraph,
    edge: &Edge,
    settings: &EditorSettings,
    sorted_weights: &[f64],
) {
    let (Some(start), Some(end)) = (graph.vertex(edge.start_id), graph.vertex(edge.end_id))
    else {
        return;
    };
    let from = viewport.pose_to_screen(center, &start.pose);
    let to = viewport.pose_to_screen(center, &end.pose);
    let Some((from, to)) = edge_segment(
        from,
        to,
        settings.edge_offset * viewport.zoom,
        settings.vertex_radius * viewport.zoom,
    ) else {
        return;
    };

    let color = weight_color(edge.weight, sorted_weights);
    let width = (settings.edge_width * viewport.zoom).max(1.0);
    painter.line_segment([from, to], egui::Stroke::new(width, color));

    let dir = (to - from).normalized();
    let normal = egui::vec2(-dir.y, dir.x);
    let size = settings.arrow_size * viewport.zoom;
    let base = to - dir * size;
    painter.add(egui::Shape::convex_polygon(
        vec![to, base + normal * size * 0.5, base - normal * size * 0.5],
        color,
        egui::Stroke::NONE,
    ));
}

/// Screen segment for a directed edge, shifted to its right by `offset`
/// and trimmed by `radius` at both ends. `None` when the endpoints overlap.
fn edge_segment(
    from: egui::Pos2,
    to: egui::Pos2,
    offset: f32,
    radius: f32,
) -> Option<(egui::Pos2, egui::Pos2)> {
    let delta = to - from;
    let length = delta.length();
    if length <= 2.0 * radius {
        return None;
    }
    let dir = delta / length;
    // Right-hand side on screen, where y grows downwards.
    let shift = egui::vec2(-dir.y, dir.x) * offset;
    Some((from + dir * radius + shift, to - dir * radius + shift))
}
