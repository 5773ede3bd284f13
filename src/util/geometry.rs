// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between pixel
//! coordinates on a frame and the normalized coordinates that are stored.
//! Normalized coordinates have their origin at the bottom-left corner, so
//! the vertical axis is flipped relative to the frame.

use crate::models::zone::{NormPoint, NormPolygon, PixelPoint};

/// Decimal places kept in normalized coordinates.
pub const NORM_PRECISION: i32 = 2;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Convert a pixel point to normalized coordinates, clamped to `[0, 1]` and
/// then rounded. The caller guarantees non-zero dimensions.
pub fn normalize_point(point: &PixelPoint, width: u32, height: u32) -> NormPoint {
    let width = width as f64;
    let height = height as f64;
    let u = (point.x / width).clamp(0.0, 1.0);
    let v = ((height - point.y) / height).clamp(0.0, 1.0);
    NormPoint {
        u: round_to(u, NORM_PRECISION),
        v: round_to(v, NORM_PRECISION),
    }
}

/// Convert a pixel polygon to normalized coordinates.
///
/// Returns an empty polygon for a zero-sized frame.
pub fn to_normalized(polygon: &[PixelPoint], width: u32, height: u32) -> NormPolygon {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    polygon
        .iter()
        .map(|p| normalize_point(p, width, height))
        .collect()
}

/// Convert a normalized point back to pixel coordinates.
///
/// Out-of-range input is passed through without clamping.
pub fn to_pixel(point: &NormPoint, width: u32, height: u32) -> PixelPoint {
    PixelPoint {
        x: point.u * width as f64,
        y: height as f64 * (1.0 - point.v),
    }
}

/// Convert a normalized polygon back to pixel coordinates.
pub fn to_pixel_polygon(polygon: &[NormPoint], width: u32, height: u32) -> Vec<PixelPoint> {
    polygon.iter().map(|p| to_pixel(p, width, height)).collect()
}

/// Even-odd point-in-polygon test, used for picking zones on the canvas.
pub fn polygon_contains(polygon: &[PixelPoint], point: PixelPoint) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    fn norm_one(x: f64, y: f64, width: u32, height: u32) -> NormPoint {
        to_normalized(&[px(x, y)], width, height)[0]
    }

    #[test]
    fn test_normalize_denormalize_roundtrip() {
        let (width, height) = (1920, 1080);
        let tol_x = 0.005 * width as f64 + 1e-9;
        let tol_y = 0.005 * height as f64 + 1e-9;

        for x in (0..=1920).step_by(37) {
            for y in (0..=1080).step_by(29) {
                let original = px(x as f64, y as f64);
                let normalized = normalize_point(&original, width, height);
                let back = to_pixel(&normalized, width, height);
                assert!((back.x - original.x).abs() <= tol_x, "x drift at {:?}", original);
                assert!((back.y - original.y).abs() <= tol_y, "y drift at {:?}", original);
            }
        }
    }

    #[test]
    fn test_normalize_corners() {
        // Top-left of the frame is the top of the normalized square
        assert_eq!(norm_one(0.0, 0.0, 100, 50), NormPoint::new(0.0, 1.0));
        // Bottom-right corner
        assert_eq!(norm_one(100.0, 50.0, 100, 50), NormPoint::new(1.0, 0.0));
        // Center
        assert_eq!(norm_one(50.0, 25.0, 100, 50), NormPoint::new(0.5, 0.5));
    }

    #[test]
    fn test_out_of_bounds_is_clamped() {
        assert_eq!(norm_one(150.0, 50.0, 100, 50), NormPoint::new(1.0, 0.0));
        assert_eq!(norm_one(-5.0, 60.0, 100, 50), NormPoint::new(0.0, 0.0));
        assert_eq!(norm_one(105.0, -2.5, 100, 50), NormPoint::new(1.0, 1.0));
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let p = norm_one(33.0, 17.0, 101, 33);
        assert_eq!(p.u, 0.33);
        assert_eq!(p.v, 0.48);
        for value in [p.u, p.v] {
            let scaled = value * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(-0.125, 2), -0.13);
        assert_eq!(round_to(0.994, 2), 0.99);
    }

    #[test]
    fn test_zero_sized_frame_is_noop() {
        let polygon = [px(1.0, 1.0), px(2.0, 2.0), px(3.0, 1.0)];
        assert!(to_normalized(&polygon, 0, 50).is_empty());
        assert!(to_normalized(&polygon, 100, 0).is_empty());
    }

    #[test]
    fn test_to_pixel_does_not_clamp() {
        let p = to_pixel(&NormPoint::new(1.5, -0.5), 100, 50);
        assert_eq!(p, px(150.0, 75.0));
    }

    #[test]
    fn test_different_dimensions_rescale() {
        let normalized = to_normalized(&[px(50.0, 25.0), px(100.0, 0.0)], 100, 50);
        let rescaled = to_pixel_polygon(&normalized, 200, 100);
        assert_eq!(rescaled, vec![px(100.0, 50.0), px(200.0, 0.0)]);
    }

    #[test]
    fn test_polygon_contains() {
        let square = [px(0.0, 0.0), px(10.0, 0.0), px(10.0, 10.0), px(0.0, 10.0)];
        assert!(polygon_contains(&square, px(5.0, 5.0)));
        assert!(!polygon_contains(&square, px(15.0, 5.0)));
        assert!(!polygon_contains(&[], px(0.0, 0.0)));
    }
}
