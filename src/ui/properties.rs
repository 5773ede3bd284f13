// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Processor properties panel.
//!
//! This module provides the side panel with the camera picker, the
//! processor form fields, the zone list and the raw zone string.

use crate::editor::{EditorShell, EditorView};
use crate::models::frame::Camera;
use crate::models::processor::ProcessorForm;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    SelectCamera(u32),
    RefreshFrame,
    SelectZone(usize),
    DeleteZone(usize),
    EditZoneString(String),
    LaunchPreview,
}

/// Display the properties panel.
pub fn show(
    ui: &mut egui::Ui,
    cameras: &[Camera],
    form: &mut ProcessorForm,
    editor: &EditorShell,
    selected_zone: Option<usize>,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Processor");
    if let Some(id) = form.id {
        ui.label(format!("id {}", id));
    }
    ui.separator();

    // Camera picker
    let current_name = editor
        .camera_id()
        .and_then(|id| cameras.iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "(none)".to_string());

    ui.horizontal(|ui| {
        egui::ComboBox::from_label("Camera")
            .selected_text(current_name)
            .show_ui(ui, |ui| {
                for camera in cameras {
                    let selected = editor.camera_id() == Some(camera.id);
                    if ui.selectable_label(selected, &camera.name).clicked() {
                        action = PropertiesAction::SelectCamera(camera.id);
                    }
                }
            });
        if ui
            .add_enabled(editor.camera_id().is_some(), egui::Button::new("⟳"))
            .on_hover_text("Fetch a new frame")
            .clicked()
        {
            action = PropertiesAction::RefreshFrame;
        }
    });

    ui.add(egui::Slider::new(&mut form.threshold, 0.0..=1.0).text("Threshold"));
    ui.checkbox(&mut form.enabled, "Enabled");
    ui.horizontal(|ui| {
        ui.checkbox(&mut form.output_hls, "Processed stream");
        if form.output_hls && form.id.is_some() && ui.button("▶ Preview").clicked() {
            action = PropertiesAction::LaunchPreview;
        }
    });

    ui.separator();
    ui.heading("Zones");

    if editor.zones().is_empty() {
        ui.label(egui::RichText::new("No zones").weak());
    }
    for (idx, zone) in editor.zones().iter().enumerate() {
        ui.horizontal(|ui| {
            if ui
                .selectable_label(selected_zone == Some(idx), format!("{} ({} vertices)", zone.name, zone.vertex_count()))
                .clicked()
            {
                action = PropertiesAction::SelectZone(idx);
            }
            if ui.small_button("🗑").on_hover_text("Delete zone").clicked() {
                action = PropertiesAction::DeleteZone(idx);
            }
        });
    }

    ui.separator();
    ui.label("Zone string");

    // Only editable by hand when there is no frame to draw on
    let editable = editor.view() == EditorView::TextField;
    let mut text = editor.zone_string().to_string();
    let response = ui.add(
        egui::TextEdit::multiline(&mut text)
            .code_editor()
            .desired_rows(4)
            .desired_width(f32::INFINITY)
            .interactive(editable),
    );
    if editable && response.changed() {
        action = PropertiesAction::EditZoneString(text);
    }

    if let Err(e) = form.validate() {
        ui.colored_label(egui::Color32::from_rgb(220, 80, 80), e.to_string());
    }

    action
}
