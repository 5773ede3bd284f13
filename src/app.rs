// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the zone editor and the processor form,
//! runs frame fetches in the background and turns UI actions into editor
//! operations.

use crate::config::{Args, Settings};
use crate::editor::{EditorShell, FetchTicket, FrameOutcome};
use crate::io::media::{self, FetchError, FetchMessage, FetchedFrame, FrameSource, HttpFrameSource};
use crate::io::{preview, serialization};
use crate::models::processor::ProcessorForm;
use crate::models::zone::{PixelPoint, Zone};
use crate::ui::{canvas, properties, toolbar};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Polygon,
}

/// Main application state.
pub struct CamZonesApp {
    settings: Settings,

    /// Currently selected drawing tool
    current_tool: Tool,

    /// Zone editor state (camera, frame size, zones, zone string)
    editor: EditorShell,

    /// Processor form being edited
    form: ProcessorForm,

    /// Where the form was loaded from / will be saved to
    form_path: Option<PathBuf>,

    /// Index of currently selected zone
    selected_zone: Option<usize>,

    /// Frame texture for display
    frame_texture: Option<egui::TextureHandle>,

    /// Zone being drawn
    in_progress_zone: Option<Zone>,

    /// Currently dragged vertex (zone_index, vertex_index)
    dragging_vertex: Option<(usize, usize)>,

    /// Frame source for camera fetches; `None` if the HTTP client failed
    frame_source: Option<Arc<dyn FrameSource>>,

    /// Background fetch results
    fetch_sender: Sender<FetchMessage>,
    fetch_receiver: Receiver<FetchMessage>,

    /// Loading state message
    loading_message: Option<String>,
}

impl CamZonesApp {
    /// Create the application from settings and command-line arguments.
    pub fn new(settings: Settings, args: &Args) -> Self {
        let mut form = match args.form {
            Some(ref path) => match serialization::import_form(path) {
                Ok(form) => {
                    log::info!("Loaded processor form from {}", path.display());
                    form
                }
                Err(e) => {
                    log::error!("Failed to load form {}: {}", path.display(), e);
                    ProcessorForm::default()
                }
            },
            None => ProcessorForm::new(args.processor),
        };
        if args.processor.is_some() {
            form.id = args.processor;
        }

        let frame_source: Option<Arc<dyn FrameSource>> = match HttpFrameSource::new(&settings.server_url) {
            Ok(source) => Some(Arc::new(source)),
            Err(e) => {
                log::error!("Failed to create HTTP client for {}: {}", settings.server_url, e);
                None
            }
        };

        let (fetch_sender, fetch_receiver) = channel();
        let editor = EditorShell::new(form.zones_str.clone(), settings.history_size);

        let mut app = Self {
            settings,
            current_tool: Tool::Select,
            editor,
            form,
            form_path: args.form.clone(),
            selected_zone: None,
            frame_texture: None,
            in_progress_zone: None,
            dragging_vertex: None,
            frame_source,
            fetch_sender,
            fetch_receiver,
            loading_message: None,
        };

        if let Some(ref path) = args.frame {
            app.load_frame_file(path.clone());
        } else if let Some(camera_id) = app.form.camera_id {
            app.select_camera(camera_id);
        }
        app
    }

    fn start_fetch(&mut self, ticket: FetchTicket) {
        match self.frame_source {
            Some(ref source) => {
                self.loading_message = Some("Fetching camera frame...".to_string());
                media::spawn_fetch(source.clone(), ticket, self.fetch_sender.clone());
            }
            None => {
                // The editor already moved to the new camera; fall back to the
                // text field instead of editing on the previous frame.
                let err = FetchError::Server("no frame source available".to_string());
                self.editor.apply_frame(ticket, Err(&err));
                self.frame_texture = None;
                self.loading_message = None;
            }
        }
    }

    /// Camera selection changed in the picker.
    fn select_camera(&mut self, camera_id: u32) {
        if let Some(ticket) = self.editor.select_camera(camera_id) {
            self.form.camera_id = Some(camera_id);
            self.reset_interaction();
            self.start_fetch(ticket);
        }
    }

    fn refresh_frame(&mut self) {
        if let Some(ticket) = self.editor.refresh() {
            self.reset_interaction();
            self.start_fetch(ticket);
        }
    }

    /// Load a frame from an image file (asynchronously).
    fn load_frame_file(&mut self, path: PathBuf) {
        let ticket = self.editor.begin_local_frame();
        self.reset_interaction();
        self.loading_message = Some("Loading frame image...".to_string());
        media::spawn_load(path, ticket, self.fetch_sender.clone());
    }

    fn reset_interaction(&mut self) {
        self.selected_zone = None;
        self.in_progress_zone = None;
        self.dragging_vertex = None;
    }

    /// Apply finished fetches; stale ones are dropped by the editor.
    fn poll_fetches(&mut self, ctx: &egui::Context) {
        while let Ok((ticket, result)) = self.fetch_receiver.try_recv() {
            let outcome = self.editor.apply_frame(ticket, result.as_ref().map(|f| f.size));
            match (outcome, result) {
                (FrameOutcome::Stale, _) => continue,
                (FrameOutcome::Shown, Ok(frame)) => {
                    self.frame_texture = Some(upload_texture(ctx, &frame));
                }
                _ => {
                    self.frame_texture = None;
                }
            }
            self.loading_message = None;
            self.reset_interaction();
        }
    }

    /// Start a zone or add a vertex to the one being drawn.
    fn add_vertex(&mut self, point: PixelPoint) {
        let zone = self
            .in_progress_zone
            .get_or_insert_with(|| Zone::new(self.editor.next_zone_name()));
        zone.add_vertex(point);
        log::debug!("Added vertex at ({:.1}, {:.1}), total vertices: {}",
            point.x, point.y, zone.vertex_count());
    }

    fn finish_zone(&mut self) {
        if let Some(zone) = self.in_progress_zone.take() {
            self.editor.create_zone(zone);
        }
    }

    fn delete_zone(&mut self, idx: usize) {
        if self.editor.delete_zone(idx) {
            self.selected_zone = None;
        }
    }

    fn undo(&mut self) {
        if self.editor.undo() {
            self.selected_zone = None;
            log::info!("Undo");
        }
    }

    fn redo(&mut self) {
        if self.editor.redo() {
            self.selected_zone = None;
            log::info!("Redo");
        }
    }

    fn open_form(&mut self, path: PathBuf) {
        match serialization::import_form(&path) {
            Ok(form) => {
                log::info!("Loaded processor form from {}", path.display());
                let camera_id = form.camera_id;
                self.editor.load_zone_string(form.zones_str.clone());
                self.form = form;
                self.form_path = Some(path);
                self.reset_interaction();
                if let Some(camera_id) = camera_id {
                    self.select_camera(camera_id);
                }
            }
            Err(e) => log::error!("Failed to load form {}: {}", path.display(), e),
        }
    }

    fn save_form(&mut self, path: PathBuf) {
        if let Err(e) = self.form.validate() {
            log::error!("Not saving invalid form: {}", e);
            return;
        }
        match serialization::export_form(&self.form, &path) {
            Ok(()) => {
                log::info!("Saved processor form to {}", path.display());
                self.form_path = Some(path);
            }
            Err(e) => log::error!("Failed to save form: {}", e),
        }
    }

    fn save_form_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Processor form", &["yaml", "yml", "json"])
            .set_file_name("processor.yaml")
            .save_file()
        {
            self.save_form(path);
        }
    }

    fn launch_preview(&self) {
        let Some(id) = self.form.id else {
            log::warn!("Preview needs a processor id");
            return;
        };
        let url = preview::manifest_url(&self.settings.server_url, id);
        if let Err(e) = preview::launch(&url, &self.settings.player) {
            log::error!("Failed to launch preview: {}", e);
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.in_progress_zone = None;
            self.selected_zone = None;
        }

        // Ignore shortcuts while a text field has focus
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Enter)) && self.current_tool == Tool::Polygon {
            self.finish_zone();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            if let Some(idx) = self.selected_zone {
                self.delete_zone(idx);
            }
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.undo();
        }

        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.redo();
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Form...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Processor form", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.open_form(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Save Form").clicked() {
                        match self.form_path.clone() {
                            Some(path) => self.save_form(path),
                            None => self.save_form_as(),
                        }
                        ui.close_menu();
                    }
                    if ui.button("Save Form As...").clicked() {
                        self.save_form_as();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Open Frame Image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp"])
                            .pick_file()
                        {
                            self.load_frame_file(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.add_enabled(self.editor.can_undo(), egui::Button::new("Undo (Ctrl+Z)")).clicked() {
                        self.undo();
                        ui.close_menu();
                    }
                    if ui.add_enabled(self.editor.can_redo(), egui::Button::new("Redo (Ctrl+Shift+Z)")).clicked() {
                        self.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add_enabled(self.selected_zone.is_some(), egui::Button::new("Delete Selected")).clicked() {
                        if let Some(idx) = self.selected_zone {
                            self.delete_zone(idx);
                        }
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.add_enabled(self.editor.camera_id().is_some(), egui::Button::new("Refresh Frame")).clicked() {
                        self.refresh_frame();
                        ui.close_menu();
                    }
                    let can_preview = self.form.output_hls && self.form.id.is_some();
                    if ui.add_enabled(can_preview, egui::Button::new("Preview Stream")).clicked() {
                        self.launch_preview();
                        ui.close_menu();
                    }
                });
            });
        });
    }
}

fn upload_texture(ctx: &egui::Context, frame: &FetchedFrame) -> egui::TextureHandle {
    let size = [frame.size.width as usize, frame.size.height as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);
    ctx.load_texture("camera_frame", color_image, egui::TextureOptions::LINEAR)
}

impl eframe::App for CamZonesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_fetches(ctx);

        // Keep polling while a fetch is outstanding
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        self.menu_bar(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            toolbar::show(ui, &mut self.current_tool);
        });

        let properties_action = egui::SidePanel::right("properties")
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .show(ui, |ui| {
                        properties::show(ui, &self.settings.cameras, &mut self.form, &self.editor, self.selected_zone)
                    })
                    .inner
            })
            .inner;

        match properties_action {
            properties::PropertiesAction::SelectCamera(id) => self.select_camera(id),
            properties::PropertiesAction::RefreshFrame => self.refresh_frame(),
            properties::PropertiesAction::SelectZone(idx) => self.selected_zone = Some(idx),
            properties::PropertiesAction::DeleteZone(idx) => self.delete_zone(idx),
            properties::PropertiesAction::EditZoneString(text) => self.editor.set_zone_string(text),
            properties::PropertiesAction::LaunchPreview => self.launch_preview(),
            properties::PropertiesAction::None => {}
        }

        self.handle_keyboard(ctx);

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    canvas::CanvasAction::None
                } else {
                    canvas::show(
                        ui,
                        self.editor.zones(),
                        self.editor.view(),
                        self.current_tool,
                        &self.frame_texture,
                        self.editor.frame_size(),
                        &self.in_progress_zone,
                        self.selected_zone,
                        self.dragging_vertex,
                    )
                }
            })
            .inner;

        match canvas_action {
            canvas::CanvasAction::AddVertex(point) => self.add_vertex(point),
            canvas::CanvasAction::FinishZone => self.finish_zone(),
            canvas::CanvasAction::SelectZone(idx) => {
                self.selected_zone = Some(idx);
                log::debug!("Selected zone {}", idx);
            }
            canvas::CanvasAction::DeselectZone => self.selected_zone = None,
            canvas::CanvasAction::StartDraggingVertex(zone_idx, vertex_idx) => {
                self.editor.begin_vertex_drag();
                self.dragging_vertex = Some((zone_idx, vertex_idx));
                self.selected_zone = Some(zone_idx);
            }
            canvas::CanvasAction::DragVertex(point) => {
                if let Some((zone_idx, vertex_idx)) = self.dragging_vertex {
                    self.editor.move_vertex(zone_idx, vertex_idx, point);
                }
            }
            canvas::CanvasAction::StopDragging => {
                self.editor.finish_vertex_drag();
                self.dragging_vertex = None;
            }
            canvas::CanvasAction::None => {}
        }

        // The form always carries the current zone string
        if self.form.zones_str != self.editor.zone_string() {
            self.form.zones_str = self.editor.zone_string().to_string();
        }
    }
}
