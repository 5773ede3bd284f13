// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! camzones - camera zone editor
//!
//! A desktop editor for the detection zones of a video-analytics processor.
//! It fetches a still frame from the selected camera, lets the operator
//! draw polygon zones on it and stores them as a normalized coordinate
//! string in the processor form.

mod app;
mod config;
mod editor;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::CamZonesApp;
use clap::Parser;
use config::{Args, Settings};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::init();

    let mut settings = Settings::load(args.settings.as_deref());
    settings.apply_args(&args);
    log::info!("Using server {} with {} cameras", settings.server_url, settings.cameras.len());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("camzones - Camera Zone Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "camzones",
        options,
        Box::new(move |_cc| Ok(Box::new(CamZonesApp::new(settings, &args)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
