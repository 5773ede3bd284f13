// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command-line arguments and persistent settings.
//!
//! Settings are read from `settings.yaml` in the user config directory (or
//! a path given with `--settings`). Anything given on the command line wins
//! over the file.

use crate::editor::DEFAULT_HISTORY_SIZE;
use crate::models::frame::Camera;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_PLAYER: &str = "ffplay -loglevel error";

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the analytics server
    #[arg(long, env = "CAMZONES_SERVER")]
    pub server: Option<String>,

    /// Selectable camera as ID or ID=NAME (repeatable)
    #[arg(long = "camera", value_parser = Camera::parse)]
    pub cameras: Vec<Camera>,

    /// Processor id, used for the HLS preview
    #[arg(long)]
    pub processor: Option<u32>,

    /// Processor form to open (YAML or JSON)
    #[arg(long)]
    pub form: Option<PathBuf>,

    /// Draw on a local image instead of fetching a camera frame
    #[arg(long)]
    pub frame: Option<PathBuf>,

    /// Settings file to use instead of the default location
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

/// User settings that persist across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the analytics server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Cameras offered in the camera picker
    #[serde(default)]
    pub cameras: Vec<Camera>,

    /// Command used to play the HLS preview; the URL is appended
    #[serde(default = "default_player")]
    pub player: String,

    /// Number of undo steps kept
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_player() -> String {
    DEFAULT_PLAYER.to_string()
}

fn default_history_size() -> usize {
    DEFAULT_HISTORY_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            cameras: Vec::new(),
            player: default_player(),
            history_size: default_history_size(),
        }
    }
}

impl Settings {
    /// Default settings location.
    /// On Linux: ~/.config/camzones/settings.yaml
    pub fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("camzones").join("settings.yaml")
    }

    /// Load settings from a YAML file, falling back to defaults if the file
    /// is missing or unreadable.
    pub fn load(custom_path: Option<&Path>) -> Self {
        let path = custom_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::settings_path);

        if !path.exists() {
            log::info!("Settings file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_yaml::from_str::<Settings>(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {:?}", path);
                    log::debug!("Settings: server={}, cameras={}, player={:?}",
                        settings.server_url, settings.cameras.len(), settings.player);
                    settings
                }
                Err(e) => {
                    log::error!("Failed to parse settings file at {:?}: {}", path, e);
                    log::warn!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                log::error!("Failed to read settings file at {:?}: {}", path, e);
                log::warn!("Using default settings");
                Self::default()
            }
        }
    }

    /// Override settings with values given on the command line.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref server) = args.server {
            self.server_url = server.clone();
        }
        if !args.cameras.is_empty() {
            self.cameras = args.cameras.clone();
        }
        self.history_size = self.history_size.max(1);
    }
}
