// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HLS preview of a processor's output stream.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// URL of the processed HLS stream for a processor.
pub fn manifest_url(server: &str, processor_id: u32) -> String {
    format!(
        "{}/videos/{}/processed_stream.m3u8",
        server.trim_end_matches('/'),
        processor_id
    )
}

/// Split a player command line such as `"ffplay -loglevel error"` into a
/// program and its arguments.
pub fn player_command(player: &str, url: &str) -> Option<Command> {
    let mut parts = player.split_whitespace();
    let program = parts.next()?;
    let mut cmd = Command::new(program);
    cmd.args(parts)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    Some(cmd)
}

/// Open the stream in the configured player, falling back to the system
/// URL handler when the player cannot be started.
pub fn launch(url: &str, player: &str) -> Result<()> {
    if let Some(mut cmd) = player_command(player, url) {
        match cmd.spawn() {
            Ok(child) => {
                log::info!("Started preview player (pid {}) for {}", child.id(), url);
                return Ok(());
            }
            Err(e) => log::warn!("Failed to start player {:?}: {}", player, e),
        }
    }
    webbrowser::open(url).with_context(|| format!("Failed to open {}", url))?;
    log::info!("Opened preview {} with the system handler", url);
    Ok(())
}
