//! Furniture filtering heuristics
//!
//! Rejects segments that are almost certainly structural surfaces
//! (walls, floor, ceiling) rather than furniture. Pure predicate:
//! order-preserving, never renumbers ids.

use tracing::debug;

use crate::config::StagingConfig;
use crate::types::Segment;

/// Maximum area fraction before a segment reads as a structural surface
const SURFACE_AREA_FRACTION: f32 = 0.5;
/// Segments centered above this line are ceiling fixtures
const CEILING_CENTER_Y: f32 = 0.2;
/// Wide-and-flat bounds marking floor trim
const TRIM_ASPECT: f32 = 8.0;
const TRIM_HEIGHT_FRACTION: f32 = 0.1;
/// Tall-and-thin bounds marking a wall edge
const WALL_ASPECT: f32 = 0.15;
const WALL_EDGE_MARGIN: f32 = 0.05;

/// Whether a segment plausibly depicts furniture
pub fn is_furniture(segment: &Segment, config: &StagingConfig) -> bool {
    if segment.area_fraction > SURFACE_AREA_FRACTION {
        return false;
    }
    if segment.center.y < CEILING_CENTER_Y {
        return false;
    }
    let aspect = segment.bbox.aspect_ratio();
    if aspect > TRIM_ASPECT && segment.bbox.height < TRIM_HEIGHT_FRACTION {
        return false;
    }
    if aspect < WALL_ASPECT
        && (segment.bbox.x < WALL_EDGE_MARGIN
            || segment.bbox.x + segment.bbox.width > 1.0 - WALL_EDGE_MARGIN)
    {
        return false;
    }
    if segment.area_fraction < config.min_area_percent {
        return false;
    }
    if segment.confidence < config.stability_threshold {
        return false;
    }
    true
}

/// Drop non-furniture segments, preserving order and ids
pub fn furniture_filter(segments: Vec<Segment>, config: &StagingConfig) -> Vec<Segment> {
    let before = segments.len();
    let kept: Vec<Segment> = segments
        .into_iter()
        .filter(|s| is_furniture(s, config))
        .collect();
    debug!("furniture filter kept {}/{} segments", kept.len(), before);
    kept
}
