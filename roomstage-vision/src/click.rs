//! Point-prompt segmentation
//!
//! Interactive click-to-select: one combined oracle call for all
//! points, independent of the automatic pipeline. An empty result is
//! surfaced directly — an explicit user click that found nothing has
//! no fallback tier.

use std::sync::Arc;

use roomstage_core::{BinaryMask, NormalizedBox, NormalizedPoint, RasterImage};
use tracing::debug;

use crate::config::StagingConfig;
use crate::error::{Result, StagingError};
use crate::oracles::PointSegmenter;
use crate::types::ClickSelection;

pub struct PointPromptSegmenter {
    segmenter: Arc<dyn PointSegmenter>,
    config: StagingConfig,
}

impl PointPromptSegmenter {
    pub fn new(segmenter: Arc<dyn PointSegmenter>, config: StagingConfig) -> Self {
        Self { segmenter, config }
    }

    /// Resolve the object under the given points into an RGBA cutout
    /// plus its mask and padded bounding box
    pub async fn segment_click(
        &self,
        image: &RasterImage,
        points: &[NormalizedPoint],
    ) -> Result<ClickSelection> {
        if points.is_empty() {
            return Err(StagingError::InvalidGeometry(
                "at least one prompt point is required".to_string(),
            ));
        }
        let (width, height) = image.dimensions();
        let pixel_points: Vec<(u32, u32)> =
            points.iter().map(|p| p.to_pixels(width, height)).collect();
        debug!("point-prompt segmentation with {} points", pixel_points.len());

        let gray = self
            .segmenter
            .segment_at_points(image, &pixel_points)
            .await?;
        let mask = BinaryMask::binarize(&gray, self.config.binarize_threshold)
            .resize_to(width, height);

        let rect = mask.bounding_box().ok_or(StagingError::EmptyMask)?;
        let padded = rect.pad(self.config.click_padding_px, width, height);

        let cutout = image.apply_alpha_mask(&mask)?.crop(padded)?;
        let mask = mask.crop(padded)?;
        let bbox = NormalizedBox::from_pixel_rect(padded, width, height);
        Ok(ClickSelection { cutout, mask, bbox })
    }
}
