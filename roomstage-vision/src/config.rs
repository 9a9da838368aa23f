//! Configuration for the staging engine
//!
//! Every heuristic constant the pipeline depends on lives here rather
//! than in the code paths that use it: the combined-mask decomposition
//! in particular is a best-effort heuristic whose exclusion bounds need
//! tuning per segmentation backend.

use serde::{Deserialize, Serialize};

/// Staging engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Fixed working canvas edge; all masks are resolved at this size
    pub canvas_size: u32,
    /// Mask binarization threshold (values >= threshold become 255)
    pub binarize_threshold: u8,
    /// Combined-mask colors with channel sum below this are background
    pub color_sum_min: u32,
    /// Combined-mask colors with channel sum above this are background
    pub color_sum_max: u32,
    /// Minimum pixel count for a decomposed segment (anti-aliasing noise)
    pub min_segment_area_px: usize,
    /// Minimum area fraction for a segment to survive filtering
    pub min_area_percent: f32,
    /// Minimum confidence for a segment to survive filtering
    pub stability_threshold: f32,
    /// Center-distance bound for matcher eligibility
    pub match_distance_threshold: f32,
    /// Box expansion per side when masking an item to replace (tight)
    pub replace_padding: f32,
    /// Box expansion per side when masking a region to add into (loose)
    pub add_padding: f32,
    /// Padding per axis applied by the dimension-estimate tier
    pub dimension_padding: f32,
    /// Assumed room width in inches for the pixel-scale baseline
    pub room_width_inches: f32,
    /// Perspective multiplier for foreground items
    pub foreground_scale: f32,
    /// Perspective multiplier for background items
    pub background_scale: f32,
    /// Vertical compression applied to estimated heights (camera angle)
    pub vertical_compression: f32,
    /// Per-axis clamp bounds for the dimension-estimate footprint,
    /// as fractions of the canvas
    pub footprint_min_frac: f32,
    pub footprint_max_frac: f32,
    /// Vertical placement of an estimated footprint (floor-level bias)
    pub floor_bias: f32,
    /// Pixels of padding around a point-prompt selection
    pub click_padding_px: u32,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            canvas_size: 512,
            binarize_threshold: 128,
            color_sum_min: 30,
            color_sum_max: 700,
            min_segment_area_px: 500,
            min_area_percent: 0.005,
            stability_threshold: 0.0,
            match_distance_threshold: 0.3,
            replace_padding: 0.02,
            add_padding: 0.10,
            dimension_padding: 0.10,
            room_width_inches: 144.0,
            foreground_scale: 1.3,
            background_scale: 0.7,
            vertical_compression: 0.7,
            footprint_min_frac: 0.10,
            footprint_max_frac: 0.45,
            floor_bias: 0.6,
            click_padding_px: 5,
        }
    }
}

impl StagingConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.canvas_size < 64 || self.canvas_size > 4096 {
            return Err("Canvas size must be between 64 and 4096".to_string());
        }
        if self.color_sum_min >= self.color_sum_max {
            return Err("Color sum exclusion bounds must be ordered".to_string());
        }
        if self.color_sum_max > 765 {
            return Err("Color sum bound cannot exceed 3 * 255".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_area_percent) {
            return Err("min_area_percent must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.stability_threshold) {
            return Err("stability_threshold must be in [0, 1]".to_string());
        }
        if self.match_distance_threshold <= 0.0 || self.match_distance_threshold > 2.0 {
            return Err("match_distance_threshold must be in (0, 2]".to_string());
        }
        for (name, value) in [
            ("replace_padding", self.replace_padding),
            ("add_padding", self.add_padding),
            ("dimension_padding", self.dimension_padding),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be in [0, 1]"));
            }
        }
        if self.room_width_inches <= 0.0 {
            return Err("room_width_inches must be positive".to_string());
        }
        if self.foreground_scale <= 0.0 || self.background_scale <= 0.0 {
            return Err("Perspective multipliers must be positive".to_string());
        }
        if self.vertical_compression <= 0.0 || self.vertical_compression > 1.0 {
            return Err("vertical_compression must be in (0, 1]".to_string());
        }
        if self.footprint_min_frac <= 0.0
            || self.footprint_max_frac > 1.0
            || self.footprint_min_frac >= self.footprint_max_frac
        {
            return Err("Footprint clamp bounds must satisfy 0 < min < max <= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.floor_bias) {
            return Err("floor_bias must be in [0, 1]".to_string());
        }
        Ok(())
    }

    /// Pixels per inch under the room-width baseline
    pub fn pixel_scale(&self) -> f32 {
        self.canvas_size as f32 / self.room_width_inches
    }
}
