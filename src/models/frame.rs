// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Cameras and the frames fetched from them.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of a camera still frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-sized frame cannot be used for normalization.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A selectable camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    pub id: u32,
    pub name: String,
}

impl Camera {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Parse a command-line camera spec of the form `ID` or `ID=NAME`.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let (id, name) = match spec.split_once('=') {
            Some((id, name)) => (id.trim(), name.trim().to_string()),
            None => (spec.trim(), String::new()),
        };
        let id: u32 = id
            .parse()
            .map_err(|_| format!("invalid camera id in {:?}", spec))?;
        let name = if name.is_empty() {
            format!("camera {}", id)
        } else {
            name
        };
        Ok(Self::new(id, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_validity() {
        assert!(FrameSize::new(640, 480).is_valid());
        assert!(!FrameSize::new(0, 480).is_valid());
        assert!(!FrameSize::new(640, 0).is_valid());
    }

    #[test]
    fn test_camera_parse() {
        assert_eq!(Camera::parse("3=Entrance").unwrap(), Camera::new(3, "Entrance"));
        assert_eq!(Camera::parse("7").unwrap(), Camera::new(7, "camera 7"));
        assert!(Camera::parse("lobby").is_err());
    }
}
