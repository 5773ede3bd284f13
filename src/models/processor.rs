// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Processor form state.
//!
//! A processor is an analytics job bound to one camera. Its form carries the
//! detection threshold, the on/off switches and the zone string produced by
//! the editor.

use super::zone::ZoneError;
use crate::io::serialization::{self, ParseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a processor form cannot be saved.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),
    #[error(transparent)]
    Zones(#[from] ParseError),
    #[error("invalid zone: {0}")]
    InvalidZone(#[from] ZoneError),
}

/// Complete processor form for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorForm {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub camera_id: Option<u32>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub output_hls: bool,
    #[serde(default)]
    pub zones_str: String,
}

fn default_threshold() -> f64 {
    0.5
}

impl Default for ProcessorForm {
    fn default() -> Self {
        Self {
            id: None,
            camera_id: None,
            threshold: default_threshold(),
            enabled: true,
            output_hls: false,
            zones_str: String::new(),
        }
    }
}

impl ProcessorForm {
    /// Create a form for the given processor id.
    pub fn new(id: Option<u32>) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Check the form the way the admin page does before accepting it.
    pub fn validate(&self) -> Result<(), FormError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(FormError::ThresholdOutOfRange(self.threshold));
        }
        let zones = serialization::deserialize_zones(&self.zones_str)?;
        zones.validate()?;
        Ok(())
    }
}
