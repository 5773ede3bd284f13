// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone data structures.
//!
//! Zones live in two coordinate spaces. While the operator edits them they
//! are pixel polygons on the displayed frame (origin top-left, y down). When
//! they are stored they become normalized polygons (origin bottom-left,
//! y up, both axes in `[0, 1]`) so they survive a change of camera resolution.

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Minimum number of vertices for a polygon to count as a zone.
pub const MIN_ZONE_VERTICES: usize = 3;

/// A point on the displayed frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A resolution-independent point. Stored as a `[u, v]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct NormPoint {
    pub u: f64,
    pub v: f64,
}

impl NormPoint {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

impl From<[f64; 2]> for NormPoint {
    fn from([u, v]: [f64; 2]) -> Self {
        Self::new(u, v)
    }
}

impl Serialize for NormPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&Coord(self.u))?;
        pair.serialize_element(&Coord(self.v))?;
        pair.end()
    }
}

/// Writes whole numbers without a fractional part (`1`, not `1.0`), matching
/// the zone strings the server already stores.
struct Coord(f64);

impl Serialize for Coord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

pub type PixelPolygon = Vec<PixelPoint>;
pub type NormPolygon = Vec<NormPoint>;

/// Structural problem with a stored zone set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    #[error("zone {zone} has {points} points, at least {min} are required", min = MIN_ZONE_VERTICES)]
    TooFewPoints { zone: usize, points: usize },
    #[error("zone {zone} point {point} has coordinate {value} outside [0, 1]")]
    OutOfRange { zone: usize, point: usize, value: f64 },
}

/// Ordered set of normalized polygons, serialized as `[[[u, v], ...], ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneSet {
    pub polygons: Vec<NormPolygon>,
}

impl ZoneSet {
    pub fn new(polygons: Vec<NormPolygon>) -> Self {
        Self { polygons }
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormPolygon> {
        self.polygons.iter()
    }

    /// Check that every polygon is a usable zone: enough vertices and all
    /// coordinates inside the unit square.
    pub fn validate(&self) -> Result<(), ZoneError> {
        for (zone, polygon) in self.polygons.iter().enumerate() {
            if polygon.len() < MIN_ZONE_VERTICES {
                return Err(ZoneError::TooFewPoints {
                    zone,
                    points: polygon.len(),
                });
            }
            for (point, p) in polygon.iter().enumerate() {
                for value in [p.u, p.v] {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(ZoneError::OutOfRange { zone, point, value });
                    }
                }
            }
        }
        Ok(())
    }
}

/// A zone as edited on the canvas, in pixel coordinates of the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub vertices: PixelPolygon,
}

impl Zone {
    /// Create an empty zone with the given display name.
    pub fn new(name: String) -> Self {
        Self {
            name,
            vertices: Vec::new(),
        }
    }

    pub fn with_vertices(name: String, vertices: PixelPolygon) -> Self {
        Self { name, vertices }
    }

    /// Add a vertex to the zone.
    pub fn add_vertex(&mut self, point: PixelPoint) {
        self.vertices.push(point);
    }

    /// Move an existing vertex. Out-of-range indices are ignored.
    pub fn update_vertex(&mut self, index: usize, point: PixelPoint) {
        if let Some(vertex) = self.vertices.get_mut(index) {
            *vertex = point;
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the zone has enough vertices to be committed.
    pub fn is_complete(&self) -> bool {
        self.vertices.len() >= MIN_ZONE_VERTICES
    }
}
