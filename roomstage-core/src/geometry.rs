//! Resolution-independent geometry
//!
//! All coordinates crossing the pipeline boundary are floats in [0, 1]
//! with a top-left origin. Pixel-space conversions require the target
//! raster dimensions.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tolerance applied when checking the unit-square invariant on outputs.
pub const UNIT_EPSILON: f32 = 1e-6;

/// A point in normalized [0, 1] coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &NormalizedPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Convert to pixel coordinates, clamped to the raster bounds
    pub fn to_pixels(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (0, 0);
        }
        let px = (self.x.clamp(0.0, 1.0) * width as f32) as u32;
        let py = (self.y.clamp(0.0, 1.0) * height as f32) as u32;
        (px.min(width - 1), py.min(height - 1))
    }

    pub fn from_pixels(x: u32, y: u32, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self { x: 0.0, y: 0.0 };
        }
        Self {
            x: x as f32 / width as f32,
            y: y as f32 / height as f32,
        }
    }

    pub fn is_unit(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.x >= -UNIT_EPSILON
            && self.y >= -UNIT_EPSILON
            && self.x <= 1.0 + UNIT_EPSILON
            && self.y <= 1.0 + UNIT_EPSILON
    }
}

/// An axis-aligned box in normalized [0, 1] coordinates, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedBox {
    /// Create a box, validating the unit-square invariant
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self> {
        let b = Self { x, y, width, height };
        if !b.is_unit() {
            return Err(Error::InvalidGeometry(format!(
                "box {{x: {x}, y: {y}, width: {width}, height: {height}}} exceeds unit square"
            )));
        }
        Ok(b)
    }

    /// Create a box, clamping it into the unit square
    pub fn clamped(x: f32, y: f32, width: f32, height: f32) -> Self {
        let x = x.clamp(0.0, 1.0);
        let y = y.clamp(0.0, 1.0);
        let width = width.clamp(0.0, 1.0 - x);
        let height = height.clamp(0.0, 1.0 - y);
        Self { x, y, width, height }
    }

    pub fn center(&self) -> NormalizedPoint {
        NormalizedPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Width-over-height ratio; infinite for degenerate height
    pub fn aspect_ratio(&self) -> f32 {
        if self.height <= 0.0 {
            return f32::INFINITY;
        }
        self.width / self.height
    }

    /// Rectangular intersection area with another box
    pub fn intersection_area(&self, other: &NormalizedBox) -> f32 {
        if !self.is_finite() || !other.is_finite() {
            return 0.0;
        }
        let x_min = self.x.max(other.x);
        let y_min = self.y.max(other.y);
        let x_max = (self.x + self.width).min(other.x + other.width);
        let y_max = (self.y + self.height).min(other.y + other.height);
        if x_max <= x_min || y_max <= y_min {
            return 0.0;
        }
        (x_max - x_min) * (y_max - y_min)
    }

    /// Smallest box covering both
    pub fn union(&self, other: &NormalizedBox) -> NormalizedBox {
        let x_min = self.x.min(other.x);
        let y_min = self.y.min(other.y);
        let x_max = (self.x + self.width).max(other.x + other.width);
        let y_max = (self.y + self.height).max(other.y + other.height);
        NormalizedBox::clamped(x_min, y_min, x_max - x_min, y_max - y_min)
    }

    /// Expand each side by `ratio` of the box's own size, clamped back
    /// into the unit square
    pub fn expand(&self, ratio: f32) -> NormalizedBox {
        let dx = self.width * ratio;
        let dy = self.height * ratio;
        NormalizedBox::clamped(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }

    /// Convert to a pixel rect on a raster of the given dimensions
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> PixelRect {
        let x = (self.x.clamp(0.0, 1.0) * width as f32).round() as u32;
        let y = (self.y.clamp(0.0, 1.0) * height as f32).round() as u32;
        let right = ((self.x + self.width).clamp(0.0, 1.0) * width as f32).round() as u32;
        let bottom = ((self.y + self.height).clamp(0.0, 1.0) * height as f32).round() as u32;
        PixelRect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }

    pub fn from_pixel_rect(rect: PixelRect, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };
        }
        NormalizedBox::clamped(
            rect.x as f32 / width as f32,
            rect.y as f32 / height as f32,
            rect.width as f32 / width as f32,
            rect.height as f32 / height as f32,
        )
    }

    pub fn is_unit(&self) -> bool {
        self.is_finite()
            && self.x >= -UNIT_EPSILON
            && self.y >= -UNIT_EPSILON
            && self.width >= 0.0
            && self.height >= 0.0
            && self.x + self.width <= 1.0 + UNIT_EPSILON
            && self.y + self.height <= 1.0 + UNIT_EPSILON
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Integer rectangle in raster space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Grow by `padding` pixels per side, clamped to the raster bounds
    pub fn pad(&self, padding: u32, bound_width: u32, bound_height: u32) -> PixelRect {
        let x = self.x.saturating_sub(padding);
        let y = self.y.saturating_sub(padding);
        let right = (self.right() + padding).min(bound_width);
        let bottom = (self.bottom() + padding).min(bound_height);
        PixelRect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = NormalizedPoint::new(0.0, 0.0);
        let b = NormalizedPoint::new(0.3, 0.4);
        assert!((a.distance(&b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_point_to_pixels_clamps() {
        let p = NormalizedPoint::new(1.0, 1.5);
        assert_eq!(p.to_pixels(100, 100), (99, 99));
        let q = NormalizedPoint::new(-0.2, 0.5);
        assert_eq!(q.to_pixels(100, 100), (0, 50));
    }

    #[test]
    fn test_box_new_rejects_out_of_unit() {
        assert!(NormalizedBox::new(0.8, 0.0, 0.5, 0.5).is_err());
        assert!(NormalizedBox::new(0.0, 0.0, f32::NAN, 0.5).is_err());
        assert!(NormalizedBox::new(0.1, 0.1, 0.5, 0.5).is_ok());
    }

    #[test]
    fn test_box_center() {
        let b = NormalizedBox::new(0.2, 0.4, 0.4, 0.2).unwrap();
        let c = b.center();
        assert!((c.x - 0.4).abs() < 1e-6);
        assert!((c.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_intersection_area_overlap() {
        let a = NormalizedBox::new(0.0, 0.0, 0.5, 0.5).unwrap();
        let b = NormalizedBox::new(0.25, 0.25, 0.5, 0.5).unwrap();
        assert!((a.intersection_area(&b) - 0.0625).abs() < 1e-6);
    }

    #[test]
    fn test_intersection_area_disjoint() {
        let a = NormalizedBox::new(0.0, 0.0, 0.2, 0.2).unwrap();
        let b = NormalizedBox::new(0.5, 0.5, 0.2, 0.2).unwrap();
        assert_eq!(a.intersection_area(&b), 0.0);
    }

    #[test]
    fn test_union_covers_both() {
        let a = NormalizedBox::new(0.0, 0.0, 0.2, 0.2).unwrap();
        let b = NormalizedBox::new(0.5, 0.5, 0.3, 0.3).unwrap();
        let u = a.union(&b);
        assert!(u.x <= 0.0 + UNIT_EPSILON);
        assert!((u.x + u.width - 0.8).abs() < 1e-6);
        assert!((u.y + u.height - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_expand_stays_unit() {
        let b = NormalizedBox::new(0.0, 0.4, 0.5, 0.5).unwrap();
        let e = b.expand(0.1);
        assert!(e.is_unit());
        assert_eq!(e.x, 0.0); // clamped at the left edge
        assert!(e.width > b.width);
    }

    #[test]
    fn test_expand_two_percent() {
        let b = NormalizedBox::new(0.4, 0.4, 0.2, 0.2).unwrap();
        let e = b.expand(0.02);
        assert!((e.x - 0.396).abs() < 1e-5);
        assert!((e.width - 0.208).abs() < 1e-5);
    }

    #[test]
    fn test_pixel_rect_round_trip() {
        let b = NormalizedBox::new(0.25, 0.25, 0.5, 0.5).unwrap();
        let r = b.to_pixel_rect(512, 512);
        assert_eq!(r, PixelRect::new(128, 128, 256, 256));
        let back = NormalizedBox::from_pixel_rect(r, 512, 512);
        assert!((back.x - 0.25).abs() < 1e-3);
        assert!((back.width - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_pixel_rect_pad_clamps() {
        let r = PixelRect::new(2, 2, 10, 10);
        let p = r.pad(5, 100, 100);
        assert_eq!(p, PixelRect::new(0, 0, 17, 17));
        let edge = PixelRect::new(90, 90, 10, 10);
        let pe = edge.pad(5, 100, 100);
        assert_eq!(pe.right(), 100);
        assert_eq!(pe.bottom(), 100);
    }

    #[test]
    fn test_box_serde_round_trip() {
        let b = NormalizedBox::new(0.25, 0.5, 0.3, 0.2).unwrap();
        let json = serde_json::to_string(&b).unwrap();
        let back: NormalizedBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
        assert!(back.is_unit());
    }

    #[test]
    fn test_aspect_ratio_degenerate() {
        let b = NormalizedBox { x: 0.0, y: 0.0, width: 0.5, height: 0.0 };
        assert!(b.aspect_ratio().is_infinite());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clamped_is_always_unit(
                x in -2.0f32..2.0,
                y in -2.0f32..2.0,
                w in 0.0f32..2.0,
                h in 0.0f32..2.0,
            ) {
                let b = NormalizedBox::clamped(x, y, w, h);
                prop_assert!(b.is_unit());
            }

            #[test]
            fn expand_preserves_unit(
                x in 0.0f32..1.0,
                y in 0.0f32..1.0,
                ratio in 0.0f32..0.5,
            ) {
                let b = NormalizedBox::clamped(x, y, 1.0 - x, 1.0 - y);
                prop_assert!(b.expand(ratio).is_unit());
            }

            #[test]
            fn intersection_bounded_by_smaller_area(
                ax in 0.0f32..0.5, ay in 0.0f32..0.5,
                bx in 0.0f32..0.5, by in 0.0f32..0.5,
            ) {
                let a = NormalizedBox::clamped(ax, ay, 0.4, 0.4);
                let b = NormalizedBox::clamped(bx, by, 0.4, 0.4);
                let inter = a.intersection_area(&b);
                prop_assert!(inter <= a.area() + UNIT_EPSILON);
                prop_assert!(inter <= b.area() + UNIT_EPSILON);
            }
        }
    }
}
