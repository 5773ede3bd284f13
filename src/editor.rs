// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone editor state.
//!
//! `EditorShell` owns everything the zone editor needs between UI events:
//! the selected camera, the dimensions of the displayed frame, the zones
//! drawn on it and the zone string they serialize to. Each camera selection
//! bumps a generation counter and frame fetches are tagged with it, so a
//! slow response for an old camera can never overwrite a newer one.

use crate::io::media::FetchError;
use crate::io::serialization;
use crate::models::frame::FrameSize;
use crate::models::zone::{PixelPoint, PixelPolygon, Zone, ZoneSet};
use crate::util::geometry;

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_SIZE: usize = 50;

/// History system for undo/redo functionality.
struct History {
    /// Undo stack (past states)
    undo_stack: Vec<Vec<Zone>>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<Vec<Zone>>,
    /// Maximum history size
    max_size: usize,
}

impl History {
    fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Save current state before making a change
    fn push(&mut self, zones: Vec<Zone>) {
        self.undo_stack.push(zones);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // A new action invalidates anything that was undone
        self.redo_stack.clear();
    }

    /// Undo: restore previous state
    fn undo(&mut self, current: Vec<Zone>) -> Option<Vec<Zone>> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Redo: restore next state
    fn redo(&mut self, current: Vec<Zone>) -> Option<Vec<Zone>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Identifies one frame request. Only the ticket with the latest generation
/// is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Camera the frame was requested for; `None` for a local image file
    pub camera_id: Option<u32>,
    pub generation: u64,
}

/// Which representation of the zones is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorView {
    /// Frame with drawn zones
    Map,
    /// Raw zone string, used when no frame is available
    TextField,
}

/// What `apply_frame` did with a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A newer request superseded this one; nothing changed
    Stale,
    /// The frame is displayed and zones were drawn on it
    Shown,
    /// The fetch failed and the text field is shown instead
    Failed,
}

/// State of the zone editor for one processor form.
pub struct EditorShell {
    camera_id: Option<u32>,
    generation: u64,
    frame_size: Option<FrameSize>,
    zones: Vec<Zone>,
    zone_string: String,
    view: EditorView,
    history: History,
    /// Zones as they were when the current vertex drag started
    drag_snapshot: Option<Vec<Zone>>,
    zone_counter: usize,
}

impl EditorShell {
    /// Create an editor for a stored zone string.
    pub fn new(zone_string: String, history_size: usize) -> Self {
        Self {
            camera_id: None,
            generation: 0,
            frame_size: None,
            zones: Vec::new(),
            zone_string,
            view: EditorView::TextField,
            history: History::new(history_size),
            drag_snapshot: None,
            zone_counter: 0,
        }
    }

    pub fn camera_id(&self) -> Option<u32> {
        self.camera_id
    }

    pub fn frame_size(&self) -> Option<FrameSize> {
        self.frame_size
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone_string(&self) -> &str {
        &self.zone_string
    }

    pub fn view(&self) -> EditorView {
        self.view
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Name for the next zone drawn by the operator.
    pub fn next_zone_name(&self) -> String {
        format!("zone {}", self.zone_counter + 1)
    }

    fn next_ticket(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            camera_id: self.camera_id,
            generation: self.generation,
        }
    }

    /// Handle a camera selection change. Returns the ticket for the frame
    /// request, or `None` if the camera did not actually change.
    pub fn select_camera(&mut self, camera_id: u32) -> Option<FetchTicket> {
        if self.camera_id == Some(camera_id) {
            return None;
        }
        self.camera_id = Some(camera_id);
        let ticket = self.next_ticket();
        log::info!("Camera {} selected, requesting frame (generation {})",
            camera_id, ticket.generation);
        Some(ticket)
    }

    /// Request the current camera's frame again.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.camera_id?;
        Some(self.next_ticket())
    }

    /// Start loading a frame from a local image instead of a camera.
    pub fn begin_local_frame(&mut self) -> FetchTicket {
        self.camera_id = None;
        self.next_ticket()
    }

    /// Apply the result of a frame request.
    pub fn apply_frame(
        &mut self,
        ticket: FetchTicket,
        result: Result<FrameSize, &FetchError>,
    ) -> FrameOutcome {
        if ticket.generation != self.generation {
            log::debug!("Discarding stale frame (generation {}, current {})",
                ticket.generation, self.generation);
            return FrameOutcome::Stale;
        }

        match result {
            Ok(size) if size.is_valid() => {
                self.clean_map();
                self.frame_size = Some(size);
                self.view = EditorView::Map;
                self.draw_zone_string();
                log::info!("Showing {}x{} frame with {} zones",
                    size.width, size.height, self.zones.len());
                FrameOutcome::Shown
            }
            Ok(size) => {
                log::error!("Frame has unusable dimensions {}x{}", size.width, size.height);
                self.show_text_field();
                FrameOutcome::Failed
            }
            Err(e) => {
                log::error!("Failed to get frame: {}", e);
                self.show_text_field();
                FrameOutcome::Failed
            }
        }
    }

    fn show_text_field(&mut self) {
        self.clean_map();
        self.view = EditorView::TextField;
    }

    /// Remove the frame and every drawn zone. The zone string is kept.
    pub fn clean_map(&mut self) {
        self.frame_size = None;
        self.zones.clear();
        self.history.clear();
        self.drag_snapshot = None;
        self.zone_counter = 0;
    }

    /// Replace drawn zones with the ones stored in the zone string.
    fn draw_zone_string(&mut self) {
        let Some(size) = self.frame_size else {
            return;
        };
        let stored = serialization::deserialize_zones_or_empty(&self.zone_string);
        if stored.is_empty() {
            log::debug!("No stored zones to draw");
        }
        self.zones = stored
            .iter()
            .enumerate()
            .map(|(i, polygon)| {
                // Closed rings repeat the first vertex at the end
                let ring = match polygon.as_slice() {
                    [first, .., last] if first == last => &polygon[..polygon.len() - 1],
                    _ => polygon.as_slice(),
                };
                Zone::with_vertices(
                    format!("zone {}", i + 1),
                    geometry::to_pixel_polygon(ring, size.width, size.height),
                )
            })
            .collect();
        self.zone_counter = self.zones.len();
    }

    /// Rewrite the zone string from the drawn zones.
    fn update_zone_string(&mut self) {
        let Some(size) = self.frame_size else {
            log::warn!("No frame dimensions, zone string left unchanged");
            return;
        };
        let zones = ZoneSet::new(
            self.zones
                .iter()
                .map(|z| geometry::to_normalized(&z.vertices, size.width, size.height))
                .collect(),
        );
        self.zone_string = serialization::serialize_zones(&zones);
    }

    /// Replace the raw zone string, as typed in the text field.
    pub fn set_zone_string(&mut self, text: String) {
        self.zone_string = text;
    }

    /// Load a zone string from outside (e.g. an imported form) and redraw
    /// it if a frame is displayed.
    pub fn load_zone_string(&mut self, text: String) {
        self.zone_string = text;
        if self.frame_size.is_some() {
            self.history.clear();
            self.draw_zone_string();
        }
    }

    /// Add a newly drawn zone. Polygons with fewer than three vertices
    /// are rejected.
    pub fn create_zone(&mut self, zone: Zone) -> bool {
        if self.frame_size.is_none() {
            log::warn!("Cannot add a zone without a frame");
            return false;
        }
        if !zone.is_complete() {
            log::info!("Discarding {} with {} vertices", zone.name, zone.vertex_count());
            return false;
        }
        self.history.push(self.zones.clone());
        self.zones.push(zone);
        self.zone_counter += 1;
        self.update_zone_string();
        log::info!("Added zone, total: {}", self.zones.len());
        true
    }

    /// Replace the vertices of an existing zone.
    pub fn edit_zone(&mut self, index: usize, vertices: PixelPolygon) -> bool {
        if index >= self.zones.len() {
            return false;
        }
        self.history.push(self.zones.clone());
        self.zones[index].vertices = vertices;
        self.update_zone_string();
        true
    }

    /// Snapshot the zones before a vertex drag starts.
    pub fn begin_vertex_drag(&mut self) {
        self.drag_snapshot = Some(self.zones.clone());
    }

    /// Move one vertex while dragging.
    pub fn move_vertex(&mut self, zone: usize, vertex: usize, point: PixelPoint) {
        if let Some(z) = self.zones.get_mut(zone) {
            z.update_vertex(vertex, point);
        }
    }

    /// Finish a vertex drag and store the result. A drag that moved nothing
    /// leaves no undo step.
    pub fn finish_vertex_drag(&mut self) {
        match self.drag_snapshot.take() {
            Some(before) if before == self.zones => {
                log::debug!("Vertex drag left zones unchanged");
            }
            Some(before) => {
                self.history.push(before);
                self.update_zone_string();
            }
            None => self.update_zone_string(),
        }
    }

    /// Delete a zone.
    pub fn delete_zone(&mut self, index: usize) -> bool {
        if index >= self.zones.len() {
            return false;
        }
        self.history.push(self.zones.clone());
        self.zones.remove(index);
        self.update_zone_string();
        log::info!("Deleted zone, total: {}", self.zones.len());
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.zones.clone()) {
            Some(previous) => {
                self.zones = previous;
                self.update_zone_string();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.zones.clone()) {
            Some(next) => {
                self.zones = next;
                self.update_zone_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORED: &str = "[[[0,1],[1,1],[1,0]]]";

    fn px(x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    fn triangle(name: &str) -> Zone {
        Zone::with_vertices(name.to_string(), vec![px(0.0, 0.0), px(50.0, 0.0), px(50.0, 25.0)])
    }

    /// Editor showing a 100x50 frame for camera 1.
    fn shown_editor(zone_string: &str) -> EditorShell {
        let mut editor = EditorShell::new(zone_string.to_string(), DEFAULT_HISTORY_SIZE);
        let ticket = editor.select_camera(1).unwrap();
        assert_eq!(editor.apply_frame(ticket, Ok(FrameSize::new(100, 50))), FrameOutcome::Shown);
        editor
    }

    #[test]
    fn test_frame_draws_stored_zones() {
        let editor = shown_editor(STORED);
        assert_eq!(editor.view(), EditorView::Map);
        assert_eq!(editor.zones().len(), 1);
        assert_eq!(editor.zones()[0].vertices, vec![px(0.0, 0.0), px(100.0, 0.0), px(100.0, 50.0)]);
        // Loading does not rewrite the stored string
        assert_eq!(editor.zone_string(), STORED);
    }

    #[test]
    fn test_same_camera_is_ignored() {
        let mut editor = shown_editor(STORED);
        assert!(editor.select_camera(1).is_none());
        assert!(editor.select_camera(2).is_some());
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut editor = EditorShell::new(STORED.to_string(), DEFAULT_HISTORY_SIZE);
        let first = editor.select_camera(1).unwrap();
        let second = editor.select_camera(2).unwrap();

        assert_eq!(editor.apply_frame(first, Ok(FrameSize::new(640, 480))), FrameOutcome::Stale);
        assert_eq!(editor.frame_size(), None);
        assert_eq!(editor.view(), EditorView::TextField);

        assert_eq!(editor.apply_frame(second, Ok(FrameSize::new(100, 50))), FrameOutcome::Shown);
        assert_eq!(editor.frame_size(), Some(FrameSize::new(100, 50)));
        assert_eq!(editor.camera_id(), Some(2));
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let mut editor = shown_editor(STORED);
        let zones = editor.zones().to_vec();
        let first = editor.select_camera(2).unwrap();
        let second = editor.select_camera(3).unwrap();
        let err = FetchError::Server("Camera does not respond".to_string());

        assert_eq!(editor.apply_frame(first, Err(&err)), FrameOutcome::Stale);
        assert_eq!(editor.view(), EditorView::Map);
        assert_eq!(editor.zones(), zones.as_slice());
        assert_eq!(editor.frame_size(), Some(FrameSize::new(100, 50)));
        assert_eq!(editor.zone_string(), STORED);

        assert_eq!(editor.apply_frame(second, Err(&err)), FrameOutcome::Failed);
        assert_eq!(editor.view(), EditorView::TextField);
    }

    #[test]
    fn test_missing_frame_source_blocks_edits_on_old_frame() {
        let mut editor = shown_editor("[]");
        let ticket = editor.select_camera(2).unwrap();
        let err = FetchError::Server("no frame source available".to_string());

        assert_eq!(editor.apply_frame(ticket, Err(&err)), FrameOutcome::Failed);
        assert_eq!(editor.camera_id(), Some(2));
        assert_eq!(editor.view(), EditorView::TextField);
        assert_eq!(editor.frame_size(), None);
        assert!(!editor.create_zone(triangle("zone 1")));
        assert_eq!(editor.zone_string(), "[]");
    }

    #[test]
    fn test_failed_fetch_shows_text_field() {
        let mut editor = shown_editor(STORED);
        let ticket = editor.select_camera(2).unwrap();
        let err = FetchError::Server("Camera does not respond".to_string());

        assert_eq!(editor.apply_frame(ticket, Err(&err)), FrameOutcome::Failed);
        assert_eq!(editor.view(), EditorView::TextField);
        assert!(editor.zones().is_empty());
        assert_eq!(editor.frame_size(), None);
        assert_eq!(editor.zone_string(), STORED);
    }

    #[test]
    fn test_zero_sized_frame_fails() {
        let mut editor = EditorShell::new(STORED.to_string(), DEFAULT_HISTORY_SIZE);
        let ticket = editor.select_camera(1).unwrap();
        assert_eq!(editor.apply_frame(ticket, Ok(FrameSize::new(0, 50))), FrameOutcome::Failed);
        assert_eq!(editor.view(), EditorView::TextField);
    }

    #[test]
    fn test_malformed_string_gives_empty_map() {
        let mut editor = shown_editor("not json");
        assert!(editor.zones().is_empty());
        assert!(editor.create_zone(triangle("zone 1")));
        assert_eq!(editor.zone_string(), "[[[0,1],[0.5,1],[0.5,0.5]]]");
    }

    #[test]
    fn test_create_edit_delete_rewrite_string() {
        let mut editor = shown_editor("[]");

        assert!(editor.create_zone(triangle("zone 1")));
        assert_eq!(editor.zone_string(), "[[[0,1],[0.5,1],[0.5,0.5]]]");

        assert!(editor.edit_zone(0, vec![px(0.0, 50.0), px(100.0, 50.0), px(100.0, 0.0)]));
        assert_eq!(editor.zone_string(), "[[[0,0],[1,0],[1,1]]]");

        editor.begin_vertex_drag();
        editor.move_vertex(0, 2, px(150.0, -10.0));
        editor.finish_vertex_drag();
        assert_eq!(editor.zone_string(), "[[[0,0],[1,0],[1,1]]]");

        editor.begin_vertex_drag();
        editor.move_vertex(0, 0, px(25.0, 25.0));
        editor.finish_vertex_drag();
        assert_eq!(editor.zone_string(), "[[[0.25,0.5],[1,0],[1,1]]]");

        assert!(editor.delete_zone(0));
        assert_eq!(editor.zone_string(), "[]");
        assert!(!editor.delete_zone(0));
    }

    #[test]
    fn test_drag_without_change_leaves_no_undo_step() {
        let mut editor = shown_editor(STORED);
        assert!(!editor.can_undo());

        editor.begin_vertex_drag();
        editor.finish_vertex_drag();
        assert!(!editor.can_undo());

        editor.begin_vertex_drag();
        editor.move_vertex(0, 1, px(100.0, 0.0));
        editor.finish_vertex_drag();
        assert!(!editor.can_undo());
        assert_eq!(editor.zone_string(), STORED);

        editor.begin_vertex_drag();
        editor.move_vertex(0, 1, px(50.0, 0.0));
        editor.finish_vertex_drag();
        assert!(editor.can_undo());
        assert_eq!(editor.zone_string(), "[[[0,1],[0.5,1],[1,0]]]");

        assert!(editor.undo());
        assert_eq!(editor.zone_string(), "[[[0,1],[1,1],[1,0]]]");
    }

    #[test]
    fn test_closed_ring_drops_repeated_vertex() {
        let closed = "[[[0,1],[1,1],[1,0],[0,1]]]";
        let mut editor = shown_editor(closed);
        assert_eq!(editor.zones()[0].vertices, vec![px(0.0, 0.0), px(100.0, 0.0), px(100.0, 50.0)]);
        assert_eq!(editor.zone_string(), closed);

        editor.begin_vertex_drag();
        editor.move_vertex(0, 0, px(10.0, 0.0));
        editor.finish_vertex_drag();
        assert_eq!(editor.zones()[0].vertex_count(), 3);
        assert_eq!(editor.zone_string(), "[[[0.1,1],[1,1],[1,0]]]");
    }

    #[test]
    fn test_incomplete_zone_is_rejected() {
        let mut editor = shown_editor("[]");
        let mut zone = Zone::new(editor.next_zone_name());
        zone.add_vertex(px(1.0, 1.0));
        zone.add_vertex(px(2.0, 2.0));
        assert!(!editor.create_zone(zone));
        assert_eq!(editor.zone_string(), "[]");
    }

    #[test]
    fn test_edits_need_a_frame() {
        let mut editor = EditorShell::new("[]".to_string(), DEFAULT_HISTORY_SIZE);
        assert!(!editor.create_zone(triangle("zone 1")));
        assert_eq!(editor.zone_string(), "[]");
    }

    #[test]
    fn test_undo_redo() {
        let mut editor = shown_editor("[]");
        editor.create_zone(triangle("zone 1"));
        editor.create_zone(triangle("zone 2"));
        let two_zones = editor.zone_string().to_string();

        assert!(editor.undo());
        assert_eq!(editor.zones().len(), 1);
        assert_eq!(editor.zone_string(), "[[[0,1],[0.5,1],[0.5,0.5]]]");

        assert!(editor.redo());
        assert_eq!(editor.zone_string(), two_zones);
        assert!(!editor.redo());

        assert!(editor.undo());
        assert!(editor.undo());
        assert!(!editor.undo());
        assert_eq!(editor.zone_string(), "[]");
    }

    #[test]
    fn test_history_is_bounded() {
        let mut editor = EditorShell::new("[]".to_string(), 2);
        let ticket = editor.select_camera(1).unwrap();
        editor.apply_frame(ticket, Ok(FrameSize::new(100, 50)));
        for i in 0..4 {
            editor.create_zone(triangle(&format!("zone {}", i + 1)));
        }
        assert!(editor.undo());
        assert!(editor.undo());
        assert!(!editor.undo());
        assert_eq!(editor.zones().len(), 2);
    }

    #[test]
    fn test_resolution_change_rescales_zones() {
        let mut editor = shown_editor("[[[0.5,0.5],[1,0.5],[1,0]]]");
        let ticket = editor.refresh().unwrap();
        editor.apply_frame(ticket, Ok(FrameSize::new(200, 100)));
        assert_eq!(editor.zones()[0].vertices, vec![px(100.0, 50.0), px(200.0, 50.0), px(200.0, 100.0)]);
    }

    #[test]
    fn test_local_frame_supersedes_camera_fetch() {
        let mut editor = EditorShell::new(STORED.to_string(), DEFAULT_HISTORY_SIZE);
        let camera = editor.select_camera(3).unwrap();
        let local = editor.begin_local_frame();

        assert_eq!(editor.apply_frame(camera, Ok(FrameSize::new(640, 480))), FrameOutcome::Stale);
        assert_eq!(editor.apply_frame(local, Ok(FrameSize::new(100, 50))), FrameOutcome::Shown);
        assert_eq!(editor.camera_id(), None);
        assert!(editor.refresh().is_none());
    }

    #[test]
    fn test_load_zone_string_redraws() {
        let mut editor = shown_editor("[]");
        editor.load_zone_string(STORED.to_string());
        assert_eq!(editor.zones().len(), 1);
        assert_eq!(editor.next_zone_name(), "zone 2");
    }
}
