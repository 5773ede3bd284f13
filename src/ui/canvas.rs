// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the camera frame and its zones.
//!
//! The frame is scaled to fit the available space. Zones are kept in frame
//! pixel coordinates, so every pointer position is mapped from screen space
//! back onto the frame before it is reported.

use crate::app::Tool;
use crate::editor::EditorView;
use crate::models::frame::FrameSize;
use crate::models::zone::{PixelPoint, Zone};
use crate::util::geometry;

/// Grab radius around a vertex, in screen points.
const VERTEX_GRAB_RADIUS: f32 = 8.0;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    AddVertex(PixelPoint),
    FinishZone,
    SelectZone(usize),
    DeselectZone,
    StartDraggingVertex(usize, usize),
    DragVertex(PixelPoint),
    StopDragging,
}

/// Maps between screen positions and frame pixels.
struct FrameMapping {
    rect: egui::Rect,
    size: FrameSize,
}

impl FrameMapping {
    fn to_pixel(&self, pos: egui::Pos2) -> PixelPoint {
        PixelPoint::new(
            ((pos.x - self.rect.min.x) / self.rect.width()) as f64 * self.size.width as f64,
            ((pos.y - self.rect.min.y) / self.rect.height()) as f64 * self.size.height as f64,
        )
    }

    fn to_screen(&self, point: &PixelPoint) -> egui::Pos2 {
        egui::pos2(
            self.rect.min.x + (point.x / self.size.width as f64) as f32 * self.rect.width(),
            self.rect.min.y + (point.y / self.size.height as f64) as f32 * self.rect.height(),
        )
    }
}

/// Display the main canvas area and handle mouse interactions.
#[allow(clippy::too_many_arguments)]
pub fn show(
    ui: &mut egui::Ui,
    zones: &[Zone],
    view: EditorView,
    current_tool: Tool,
    frame_texture: &Option<egui::TextureHandle>,
    frame_size: Option<FrameSize>,
    in_progress_zone: &Option<Zone>,
    selected_zone: Option<usize>,
    dragging_vertex: Option<(usize, usize)>,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        match (view, frame_texture, frame_size) {
            (EditorView::Map, Some(texture), Some(size)) => {
                // Fit the frame into the available space, keeping its aspect
                let available = ui.available_size();
                let img_aspect = size.width as f32 / size.height as f32;
                let available_aspect = available.x / available.y;

                let (display_width, display_height) = if img_aspect > available_aspect {
                    (available.x, available.x / img_aspect)
                } else {
                    (available.y * img_aspect, available.y)
                };

                let x_offset = (available.x - display_width) / 2.0;
                let y_offset = (available.y - display_height) / 2.0;

                let image_rect = egui::Rect::from_min_size(
                    ui.min_rect().min + egui::vec2(x_offset, y_offset),
                    egui::vec2(display_width, display_height),
                );
                let mapping = FrameMapping { rect: image_rect, size };

                ui.painter().image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
                action = handle_pointer(&response, &mapping, zones, current_tool, selected_zone, dragging_vertex);

                let painter = ui.painter();
                for (idx, zone) in zones.iter().enumerate() {
                    let color = if selected_zone == Some(idx) {
                        egui::Color32::from_rgb(255, 140, 0)
                    } else {
                        egui::Color32::from_rgb(151, 0, 156)
                    };
                    draw_zone(painter, zone, &mapping, color, false);
                }
                if let Some(zone) = in_progress_zone {
                    draw_zone(painter, zone, &mapping, egui::Color32::LIGHT_BLUE, true);
                }
            }
            (EditorView::Map, _, _) => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Loading frame...").color(egui::Color32::WHITE));
                });
            }
            (EditorView::TextField, _, _) => {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.heading(
                            egui::RichText::new("No camera frame")
                                .size(24.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new("Select a camera, or edit the zone string in the side panel")
                                .color(egui::Color32::from_gray(160)),
                        );
                    });
                });
            }
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        ui.label(format!("Current tool: {:?}", current_tool));
        ui.separator();
        match frame_size {
            Some(size) => ui.label(format!("Frame {}x{}, {} zones", size.width, size.height, zones.len())),
            None => ui.label("No frame"),
        };
    });

    action
}

fn handle_pointer(
    response: &egui::Response,
    mapping: &FrameMapping,
    zones: &[Zone],
    current_tool: Tool,
    selected_zone: Option<usize>,
    dragging_vertex: Option<(usize, usize)>,
) -> CanvasAction {
    let pointer = response.interact_pointer_pos();

    match current_tool {
        Tool::Polygon => {
            if response.double_clicked() {
                return CanvasAction::FinishZone;
            }
            if response.clicked() {
                if let Some(pos) = pointer.filter(|p| mapping.rect.contains(*p)) {
                    return CanvasAction::AddVertex(mapping.to_pixel(pos));
                }
            }
            CanvasAction::None
        }
        Tool::Select => {
            if dragging_vertex.is_some() {
                if response.drag_stopped() {
                    return CanvasAction::StopDragging;
                }
                if response.dragged() {
                    if let Some(pos) = pointer {
                        return CanvasAction::DragVertex(mapping.to_pixel(mapping.rect.clamp(pos)));
                    }
                }
                return CanvasAction::None;
            }

            if response.drag_started() {
                if let Some((zone, vertex)) = pointer.and_then(|pos| find_vertex(pos, mapping, zones, selected_zone)) {
                    return CanvasAction::StartDraggingVertex(zone, vertex);
                }
            }

            if response.clicked() {
                if let Some(pos) = pointer {
                    let point = mapping.to_pixel(pos);
                    // Topmost zone wins
                    return match zones.iter().rposition(|z| geometry::polygon_contains(&z.vertices, point)) {
                        Some(idx) => CanvasAction::SelectZone(idx),
                        None => CanvasAction::DeselectZone,
                    };
                }
            }
            CanvasAction::None
        }
    }
}

/// Find the vertex under `pos`, preferring the selected zone.
fn find_vertex(
    pos: egui::Pos2,
    mapping: &FrameMapping,
    zones: &[Zone],
    selected_zone: Option<usize>,
) -> Option<(usize, usize)> {
    let hit = |zone_idx: usize| {
        zones.get(zone_idx).and_then(|zone| {
            zone.vertices
                .iter()
                .position(|v| mapping.to_screen(v).distance(pos) <= VERTEX_GRAB_RADIUS)
                .map(|vertex_idx| (zone_idx, vertex_idx))
        })
    };

    selected_zone
        .and_then(hit)
        .or_else(|| (0..zones.len()).rev().find_map(hit))
}

/// Draw a zone on the canvas.
fn draw_zone(
    painter: &egui::Painter,
    zone: &Zone,
    mapping: &FrameMapping,
    color: egui::Color32,
    is_in_progress: bool,
) {
    if zone.vertices.is_empty() {
        return;
    }

    let screen_points: Vec<egui::Pos2> = zone.vertices.iter().map(|p| mapping.to_screen(p)).collect();
    let stroke = egui::Stroke::new(2.0, color);

    if is_in_progress {
        // Still open: don't connect the last vertex back to the first
        for pair in screen_points.windows(2) {
            painter.line_segment([pair[0], pair[1]], stroke);
        }
    } else {
        painter.add(egui::Shape::closed_line(screen_points.clone(), stroke));
        painter.text(
            screen_points[0] + egui::vec2(6.0, -6.0),
            egui::Align2::LEFT_BOTTOM,
            &zone.name,
            egui::FontId::proportional(13.0),
            color,
        );
    }

    let vertex_color = if is_in_progress {
        egui::Color32::WHITE
    } else {
        color
    };

    for point in &screen_points {
        painter.circle_filled(*point, 4.0, vertex_color);
        painter.circle_stroke(*point, 4.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
    }
}
