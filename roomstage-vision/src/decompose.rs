//! Combined-mask decomposition
//!
//! The automatic segmenter renders every detected object as a distinct
//! flat RGB color in one combined image. Unique-color extraction is a
//! best-effort heuristic: it trusts the oracle never to reuse a color
//! across objects, and relies on the configured exclusion bounds to
//! drop near-black/near-white background and anti-aliasing noise.

use std::collections::HashMap;

use roomstage_core::{BinaryMask, NormalizedBox, RasterImage};
use tracing::debug;

use crate::config::StagingConfig;
use crate::oracles::RawSegment;
use crate::types::Segment;

/// Split a combined color-coded mask image into discrete segments,
/// largest first. Output segments are disjoint in source color by
/// construction, though their bounding boxes may overlap.
pub fn decompose_combined(image: &RasterImage, config: &StagingConfig) -> Vec<Segment> {
    let (width, height) = image.dimensions();
    let mut by_color: HashMap<[u8; 3], Vec<(u32, u32)>> = HashMap::new();

    for (x, y, px) in image.as_rgba().enumerate_pixels() {
        let color = [px[0], px[1], px[2]];
        let sum = color.iter().map(|&c| c as u32).sum::<u32>();
        if sum < config.color_sum_min || sum > config.color_sum_max {
            continue;
        }
        by_color.entry(color).or_default().push((x, y));
    }

    let color_count = by_color.len();
    let mut masks: Vec<([u8; 3], BinaryMask, usize)> = by_color
        .into_iter()
        .filter(|(_, pixels)| pixels.len() >= config.min_segment_area_px)
        .map(|(color, pixels)| {
            let mut mask = BinaryMask::new(width, height);
            for &(x, y) in &pixels {
                mask.set(x, y, true);
            }
            let count = pixels.len();
            (color, mask, count)
        })
        .collect();

    // Largest first: furniture tends to dominate the frame. Equal areas
    // order by color so the output does not depend on map iteration.
    masks.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    let segments: Vec<Segment> = masks
        .into_iter()
        .enumerate()
        .filter_map(|(id, (_, mask, _))| build_segment(id as u32, mask, 1.0, None, width, height))
        .collect();

    debug!(
        "decomposed {} candidate colors into {} segments",
        color_count,
        segments.len()
    );
    segments
}

/// Convert pre-split oracle masks into segments, largest first.
/// Masks are normalized to the working canvas before area filtering.
pub fn segments_from_raw(raw: Vec<RawSegment>, config: &StagingConfig) -> Vec<Segment> {
    let canvas = config.canvas_size;
    let mut candidates: Vec<(BinaryMask, f32, Option<String>, usize)> = raw
        .into_iter()
        .filter_map(|r| {
            let mask = BinaryMask::binarize(&r.mask, config.binarize_threshold)
                .resize_to(canvas, canvas);
            let count = mask.pixel_count();
            if count < config.min_segment_area_px {
                return None;
            }
            Some((mask, r.confidence, r.label, count))
        })
        .collect();

    candidates.sort_by(|a, b| b.3.cmp(&a.3));

    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(id, (mask, confidence, label, _))| {
            let (width, height) = (mask.width(), mask.height());
            build_segment(id as u32, mask, confidence, label, width, height)
        })
        .collect()
}

fn build_segment(
    id: u32,
    mask: BinaryMask,
    confidence: f32,
    label: Option<String>,
    width: u32,
    height: u32,
) -> Option<Segment> {
    let rect = mask.bounding_box()?;
    let bbox = NormalizedBox::from_pixel_rect(rect, width, height);
    let area_fraction = mask.area_fraction();
    Some(Segment {
        id,
        center: bbox.center(),
        bbox,
        area_fraction,
        confidence,
        label,
        mask,
    })
}
