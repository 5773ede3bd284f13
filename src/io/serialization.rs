// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone string and processor form serialization.
//!
//! The zone string is compact JSON, `[[[u, v], ...], ...]`. Processor forms
//! can be exported and imported in YAML and JSON formats.

use crate::models::processor::ProcessorForm;
use crate::models::zone::ZoneSet;
use anyhow::Result;
use std::path::Path;
use thiserror::Error;

/// The stored zone string could not be parsed.
#[derive(Debug, Error)]
#[error("badly formatted zone string: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// Encode a zone set as a compact JSON string.
pub fn serialize_zones(zones: &ZoneSet) -> String {
    match serde_json::to_string(zones) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Failed to serialize {} zones: {}", zones.len(), e);
            "[]".to_string()
        }
    }
}

/// Parse a zone string. Blank input is an empty zone set.
pub fn deserialize_zones(text: &str) -> Result<ZoneSet, ParseError> {
    if text.trim().is_empty() {
        return Ok(ZoneSet::default());
    }
    Ok(serde_json::from_str(text)?)
}

/// Parse a zone string, logging and discarding it if it is malformed.
pub fn deserialize_zones_or_empty(text: &str) -> ZoneSet {
    deserialize_zones(text).unwrap_or_else(|e| {
        log::warn!("{}; continuing with no zones", e);
        ZoneSet::default()
    })
}

/// Export a processor form to YAML format.
pub fn export_yaml(form: &ProcessorForm, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(form)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export a processor form to JSON format.
pub fn export_json(form: &ProcessorForm, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(form)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import a processor form from YAML format.
pub fn import_yaml(path: &Path) -> Result<ProcessorForm> {
    let yaml = std::fs::read_to_string(path)?;
    let form = serde_yaml::from_str(&yaml)?;
    Ok(form)
}

/// Import a processor form from JSON format.
pub fn import_json(path: &Path) -> Result<ProcessorForm> {
    let json = std::fs::read_to_string(path)?;
    let form = serde_json::from_str(&json)?;
    Ok(form)
}

/// Export a form, picking the format from the file extension.
pub fn export_form(form: &ProcessorForm, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(form, path),
        Some("json") => export_json(form, path),
        other => anyhow::bail!("Unsupported file extension: {:?}", other),
    }
}

/// Import a form, picking the format from the file extension.
pub fn import_form(path: &Path) -> Result<ProcessorForm> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => anyhow::bail!("Unsupported file extension: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::zone::NormPoint;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("camzones-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_serialize_whole_numbers_compactly() {
        let zones = ZoneSet::new(vec![vec![
            NormPoint::new(0.0, 0.0),
            NormPoint::new(1.0, 0.0),
            NormPoint::new(1.0, 1.0),
        ]]);
        assert_eq!(serialize_zones(&zones), "[[[0,0],[1,0],[1,1]]]");
    }

    #[test]
    fn test_serialize_preserves_order_and_decimals() {
        let zones = ZoneSet::new(vec![
            vec![NormPoint::new(0.33, 0.48), NormPoint::new(0.5, 1.0)],
            vec![NormPoint::new(0.1, 0.2)],
        ]);
        assert_eq!(serialize_zones(&zones), "[[[0.33,0.48],[0.5,1]],[[0.1,0.2]]]");
        assert_eq!(serialize_zones(&ZoneSet::default()), "[]");
    }

    #[test]
    fn test_deserialize_stored_string() {
        let zones = deserialize_zones("[[[0.1, 0.2], [0.3, 0.4], [0.5, 1]], []]").unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones.polygons[0][2], NormPoint::new(0.5, 1.0));
        assert!(zones.polygons[1].is_empty());
    }

    #[test]
    fn test_deserialize_malformed_is_recoverable() {
        assert!(deserialize_zones("not json").is_err());
        assert!(deserialize_zones("[[[0.1]]]").is_err());
        assert!(deserialize_zones_or_empty("not json").is_empty());
    }

    #[test]
    fn test_blank_string_is_empty_set() {
        assert!(deserialize_zones("").unwrap().is_empty());
        assert!(deserialize_zones("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_form_file_roundtrip() {
        let form = ProcessorForm {
            camera_id: Some(3),
            output_hls: true,
            zones_str: "[[[0,0],[1,0],[1,1]]]".to_string(),
            ..ProcessorForm::new(Some(12))
        };

        for name in ["form.yaml", "form.json"] {
            let path = temp_path(name);
            export_form(&form, &path).unwrap();
            let loaded = import_form(&path).unwrap();
            let _ = std::fs::remove_file(&path);
            assert_eq!(loaded, form);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let path = temp_path("form.txt");
        assert!(export_form(&ProcessorForm::default(), &path).is_err());
        assert!(import_form(&path).is_err());
    }
}
