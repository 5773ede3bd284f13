// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Camera frame loading.
//!
//! Frames come either from the analytics server, which grabs one still from
//! the camera on request, or from an image file on disk. Both paths decode
//! to RGBA pixels suitable for display in egui.

use crate::editor::FetchTicket;
use crate::models::frame::FrameSize;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("server error: {0}")]
    Server(String),
    #[error("frame response is missing {0}")]
    Incomplete(&'static str),
    #[error("frame has unusable dimensions {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode frame: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded frame ready to become a texture.
pub struct FetchedFrame {
    pub size: FrameSize,
    /// RGBA8, row-major, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

/// Result of a background fetch, tagged with the ticket that started it.
pub type FetchMessage = (FetchTicket, Result<FetchedFrame, FetchError>);

/// Anything that can produce a still frame for a camera.
pub trait FrameSource: Send + Sync {
    fn fetch(&self, camera_id: u32) -> Result<FetchedFrame, FetchError>;
}

#[derive(Serialize)]
struct FrameRequest {
    camera_id: u32,
}

/// Reply of `POST /getFrame`.
#[derive(Debug, Deserialize)]
pub struct FrameResponse {
    #[serde(default)]
    pub err: bool,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Location and size of a frame the server has saved for us.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub path: String,
    pub size: FrameSize,
}

impl FrameResponse {
    pub fn into_frame_info(self) -> Result<FrameInfo, FetchError> {
        if self.err {
            return Err(FetchError::Server(
                self.msg.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        let path = self.path.ok_or(FetchError::Incomplete("path"))?;
        let width = self.width.ok_or(FetchError::Incomplete("width"))?;
        let height = self.height.ok_or(FetchError::Incomplete("height"))?;
        let size = FrameSize::new(width, height);
        if !size.is_valid() {
            return Err(FetchError::InvalidSize { width, height });
        }
        Ok(FrameInfo { path, size })
    }
}

/// Fetches frames from the analytics server over HTTP.
pub struct HttpFrameSource {
    server: String,
    client: Client,
}

impl HttpFrameSource {
    pub fn new(server: &str) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            server: server.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.server, path.trim_start_matches('/'))
        }
    }
}

impl FrameSource for HttpFrameSource {
    fn fetch(&self, camera_id: u32) -> Result<FetchedFrame, FetchError> {
        let response: FrameResponse = self
            .client
            .post(self.url("getFrame"))
            .json(&FrameRequest { camera_id })
            .send()?
            .error_for_status()?
            .json()?;
        let info = response.into_frame_info()?;
        log::debug!("Camera {} frame saved at {} ({}x{})",
            camera_id, info.path, info.size.width, info.size.height);

        let bytes = self
            .client
            .get(self.url(&info.path))
            .send()?
            .error_for_status()?
            .bytes()?;
        let frame = decode_frame(&bytes)?;
        if frame.size != info.size {
            log::warn!("Camera {} reported {}x{} but the image is {}x{}",
                camera_id, info.size.width, info.size.height, frame.size.width, frame.size.height);
        }
        Ok(frame)
    }
}

fn into_frame(img: image::DynamicImage) -> Result<FetchedFrame, FetchError> {
    let rgba = img.to_rgba8();
    let size = FrameSize::new(rgba.width(), rgba.height());
    if !size.is_valid() {
        return Err(FetchError::InvalidSize {
            width: size.width,
            height: size.height,
        });
    }
    Ok(FetchedFrame {
        size,
        pixels: rgba.into_raw(),
    })
}

/// Decode an encoded image (JPEG, PNG, ...) held in memory.
pub fn decode_frame(bytes: &[u8]) -> Result<FetchedFrame, FetchError> {
    into_frame(image::load_from_memory(bytes)?)
}

/// Load a frame from an image file on disk.
pub fn load_image(path: &Path) -> Result<FetchedFrame, FetchError> {
    into_frame(image::open(path)?)
}

/// Run `source.fetch` on a background thread and report over `sender`.
pub fn spawn_fetch(source: Arc<dyn FrameSource>, ticket: FetchTicket, sender: Sender<FetchMessage>) {
    let Some(camera_id) = ticket.camera_id else {
        log::error!("Fetch ticket {} has no camera", ticket.generation);
        return;
    };
    let spawned = thread::Builder::new()
        .name(format!("frame-fetch-{}", ticket.generation))
        .spawn(move || {
            let result = source.fetch(camera_id);
            // The receiver is gone when the window has closed
            let _ = sender.send((ticket, result));
        });
    if let Err(e) = spawned {
        log::error!("Failed to spawn frame fetch thread: {}", e);
    }
}

/// Load an image file on a background thread and report over `sender`.
pub fn spawn_load(path: std::path::PathBuf, ticket: FetchTicket, sender: Sender<FetchMessage>) {
    let spawned = thread::Builder::new()
        .name(format!("frame-load-{}", ticket.generation))
        .spawn(move || {
            let result = load_image(&path);
            if result.is_ok() {
                log::info!("Loaded frame image: {}", path.display());
            }
            let _ = sender.send((ticket, result));
        });
    if let Err(e) = spawned {
        log::error!("Failed to spawn frame load thread: {}", e);
    }
}
