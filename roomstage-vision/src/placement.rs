//! Placement mask resolution
//!
//! Produces exactly one canvas-sized placement mask per target through a
//! three-tier fallback chain: pixel-accurate oracle segmentation, then a
//! rasterized detected bounding box, then a dimension-derived footprint
//! estimate. The last tier cannot fail, so neither can resolution.

use roomstage_core::{BinaryMask, NormalizedBox, NormalizedPoint, PixelRect, RasterImage};
use tracing::debug;

use crate::config::StagingConfig;
use crate::dimensions::typical_dimensions;
use crate::error::{Result, StagingError};
use crate::oracles::OracleSet;
use crate::types::{
    DepthPosition, MaskProvenance, PlacementAction, PlacementMask, ProductRef,
};

/// Bounding boxes carried by a product list, in order
pub fn boxes_of(products: &[ProductRef]) -> Vec<NormalizedBox> {
    products.iter().filter_map(|p| p.bbox).collect()
}

pub struct PlacementResolver {
    oracles: OracleSet,
    config: StagingConfig,
}

impl PlacementResolver {
    pub fn new(oracles: OracleSet, config: StagingConfig) -> Self {
        Self { oracles, config }
    }

    /// Resolve the placement mask for one target.
    ///
    /// For replace actions the tier-1 label is the outgoing item's
    /// category (the same mask both erases and later fills) and the
    /// tier-2 box comes from the outgoing items; for add, the label is
    /// the incoming product's own category and tier 2 uses the
    /// product's proposed box when the vision oracle supplied one.
    pub async fn resolve(
        &self,
        image: &RasterImage,
        target: &ProductRef,
        action: PlacementAction,
        existing: &[ProductRef],
    ) -> PlacementMask {
        let (label, boxes, padding) = match action {
            PlacementAction::Add => (
                target.category.as_str(),
                target.bbox.into_iter().collect::<Vec<_>>(),
                self.config.add_padding,
            ),
            PlacementAction::ReplaceOne | PlacementAction::ReplaceAll => (
                existing
                    .first()
                    .map(|p| p.category.as_str())
                    .unwrap_or(target.category.as_str()),
                boxes_of(existing),
                self.config.replace_padding,
            ),
        };

        match self.ai_tier(image, label).await {
            Ok(mask) => {
                return PlacementMask {
                    mask,
                    provenance: MaskProvenance::AiSegmentation,
                }
            }
            Err(e) => debug!("ai-segmentation tier unavailable ({e}); falling through"),
        }

        let union_all = action == PlacementAction::ReplaceAll;
        match self.box_tier(&boxes, union_all, padding) {
            Ok(mask) => {
                return PlacementMask {
                    mask,
                    provenance: MaskProvenance::BoundingBox,
                }
            }
            Err(e) => debug!("bounding-box tier unusable ({e}); falling through"),
        }

        let hint = self.box_center_hint(&boxes, union_all);
        PlacementMask {
            mask: self.dimension_tier(target, hint),
            provenance: MaskProvenance::DimensionEstimate,
        }
    }

    /// Removal-order resolution for the replace pipeline's first pass:
    /// the outgoing item's detected box is authoritative, so the
    /// bounding-box tier runs first.
    pub async fn resolve_removal(
        &self,
        image: &RasterImage,
        existing: &[ProductRef],
        replace_all: bool,
    ) -> PlacementMask {
        let boxes = boxes_of(existing);
        match self.box_tier(&boxes, replace_all, self.config.replace_padding) {
            Ok(mask) => {
                return PlacementMask {
                    mask,
                    provenance: MaskProvenance::BoundingBox,
                }
            }
            Err(e) => debug!("bounding-box tier unusable for removal ({e}); falling through"),
        }

        let label = existing
            .first()
            .map(|p| p.category.as_str())
            .unwrap_or("furniture");
        match self.ai_tier(image, label).await {
            Ok(mask) => {
                return PlacementMask {
                    mask,
                    provenance: MaskProvenance::AiSegmentation,
                }
            }
            Err(e) => debug!("ai-segmentation tier unavailable for removal ({e}); falling through"),
        }

        let fallback_target = existing.first().cloned().unwrap_or_else(|| {
            ProductRef::new("removal-target", "Removal target", label)
        });
        let hint = self.box_center_hint(&boxes, replace_all);
        PlacementMask {
            mask: self.dimension_tier(&fallback_target, hint),
            provenance: MaskProvenance::DimensionEstimate,
        }
    }

    /// Second-pass resolution: the incoming product's own category and
    /// dimensions; the outgoing box contributes only a center hint.
    pub async fn resolve_placement_for(
        &self,
        image: &RasterImage,
        incoming: &ProductRef,
        center_hint: Option<NormalizedPoint>,
    ) -> PlacementMask {
        match self.ai_tier(image, &incoming.category).await {
            Ok(mask) => {
                return PlacementMask {
                    mask,
                    provenance: MaskProvenance::AiSegmentation,
                }
            }
            Err(e) => debug!("ai-segmentation tier unavailable for placement ({e}); falling through"),
        }
        PlacementMask {
            mask: self.dimension_tier(incoming, center_hint),
            provenance: MaskProvenance::DimensionEstimate,
        }
    }

    /// Center of the tier-2 box a resolution would have used
    pub fn box_center_hint(
        &self,
        boxes: &[NormalizedBox],
        union_all: bool,
    ) -> Option<NormalizedPoint> {
        let target_box = if union_all {
            boxes
                .iter()
                .copied()
                .reduce(|acc, b| acc.union(&b))?
        } else {
            *boxes.first()?
        };
        Some(target_box.center())
    }

    async fn ai_tier(&self, image: &RasterImage, label: &str) -> Result<BinaryMask> {
        let canvas = self.config.canvas_size;
        let gray = self
            .oracles
            .auto_segmenter
            .segment_category(image, label)
            .await?;
        let mask =
            BinaryMask::binarize(&gray, self.config.binarize_threshold).resize_to(canvas, canvas);
        if mask.is_empty() {
            return Err(StagingError::OracleEmptyResult(format!(
                "segmentation found no '{label}' region"
            )));
        }
        Ok(mask)
    }

    fn box_tier(
        &self,
        boxes: &[NormalizedBox],
        union_all: bool,
        padding: f32,
    ) -> Result<BinaryMask> {
        let target_box = if union_all {
            boxes.iter().copied().reduce(|acc, b| acc.union(&b))
        } else {
            boxes.first().copied()
        }
        .ok_or_else(|| StagingError::InvalidGeometry("no detected boxes".to_string()))?;

        let canvas = self.config.canvas_size;
        let rect = target_box.expand(padding).to_pixel_rect(canvas, canvas);
        if rect.is_empty() {
            return Err(StagingError::InvalidGeometry(format!(
                "degenerate detected box {target_box:?}"
            )));
        }
        let mut mask = BinaryMask::new(canvas, canvas);
        mask.fill_rect(rect);
        Ok(mask)
    }

    /// Dimension-derived footprint estimate. Infallible: every category
    /// resolves to some dimensions and the result is clamped into the
    /// configured footprint bounds.
    pub fn dimension_tier(
        &self,
        target: &ProductRef,
        center_hint: Option<NormalizedPoint>,
    ) -> BinaryMask {
        let canvas = self.config.canvas_size;
        let dims = target
            .dimensions
            .unwrap_or_else(|| typical_dimensions(&target.category));

        let perspective = match target.depth_position {
            Some(DepthPosition::Foreground) => self.config.foreground_scale,
            Some(DepthPosition::Background) => self.config.background_scale,
            Some(DepthPosition::Center) | None => 1.0,
        };

        let scale = self.config.pixel_scale();
        let pad = 1.0 + self.config.dimension_padding;
        let raw_width = dims.width * scale * perspective * pad;
        let raw_height =
            dims.height * scale * perspective * self.config.vertical_compression * pad;

        let min_px = self.config.footprint_min_frac * canvas as f32;
        let max_px = self.config.footprint_max_frac * canvas as f32;
        let width_px = raw_width.clamp(min_px, max_px).round() as u32;
        let height_px = raw_height.clamp(min_px, max_px).round() as u32;

        let center = center_hint
            .unwrap_or_else(|| NormalizedPoint::new(0.5, self.config.floor_bias));
        let cx = center.x.clamp(0.0, 1.0) * canvas as f32;
        let cy = center.y.clamp(0.0, 1.0) * canvas as f32;
        let x = (cx - width_px as f32 / 2.0)
            .round()
            .clamp(0.0, (canvas - width_px.min(canvas)) as f32) as u32;
        let y = (cy - height_px as f32 / 2.0)
            .round()
            .clamp(0.0, (canvas - height_px.min(canvas)) as f32) as u32;

        debug!(
            "dimension estimate for '{}': {}x{}px at ({}, {})",
            target.category, width_px, height_px, x, y
        );
        let mut mask = BinaryMask::new(canvas, canvas);
        mask.fill_rect(PixelRect::new(x, y, width_px, height_px));
        mask
    }
}
