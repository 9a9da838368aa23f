//! Staging engine facade
//!
//! The single entry point the surrounding application talks to. All
//! operations are request-scoped computations over immutable inputs;
//! the engine holds no per-request state, only its injected oracles
//! and configuration.

use roomstage_core::{BinaryMask, NormalizedPoint, RasterImage};
use tracing::{debug, info, warn};

use crate::click::PointPromptSegmenter;
use crate::config::StagingConfig;
use crate::decompose::{decompose_combined, segments_from_raw};
use crate::error::{Result, StagingError};
use crate::filter::furniture_filter;
use crate::matcher::match_products;
use crate::oracles::{AutoSegmentation, OracleSet};
use crate::placement::PlacementResolver;
use crate::replace::ReplaceOrchestrator;
use crate::types::{
    ClickSelection, MaskProvenance, PlacementAction, PlacementMask, ProductRef,
    ReplaceOutcome, SceneLayer, SceneLayers, Segment,
};

pub struct StagingEngine {
    config: StagingConfig,
    oracles: OracleSet,
    resolver: PlacementResolver,
    orchestrator: ReplaceOrchestrator,
    clicker: PointPromptSegmenter,
}

impl StagingEngine {
    /// Create an engine over the given oracle capabilities
    pub fn new(oracles: OracleSet, config: StagingConfig) -> Result<Self> {
        config.validate().map_err(StagingError::Config)?;
        Ok(Self {
            resolver: PlacementResolver::new(oracles.clone(), config.clone()),
            orchestrator: ReplaceOrchestrator::new(oracles.clone(), config.clone()),
            clicker: PointPromptSegmenter::new(oracles.point_segmenter.clone(), config.clone()),
            oracles,
            config,
        })
    }

    /// Split a room photograph into a background plus one layer per
    /// detected furniture object, pairing layers with catalog products
    /// where the matcher finds an assignment.
    pub async fn extract_layers(
        &self,
        image: &RasterImage,
        products: &[ProductRef],
    ) -> Result<SceneLayers> {
        let canvas = self.config.canvas_size;
        let working = image.resize_to(canvas, canvas);

        // Segmentation and box detection are independent round trips;
        // run them as siblings.
        let needs_detection = products.iter().any(|p| p.bbox.is_none());
        let (auto, detected) = tokio::join!(
            self.oracles.auto_segmenter.segment_auto(&working),
            async {
                if needs_detection && !products.is_empty() {
                    self.oracles
                        .box_detector
                        .detect_product_boxes(&working, products)
                        .await
                } else {
                    Ok(Vec::new())
                }
            }
        );

        let segments = match auto? {
            AutoSegmentation::CombinedMask(combined) => {
                let combined = combined.resize_nearest(canvas, canvas);
                decompose_combined(&combined, &self.config)
            }
            AutoSegmentation::Segments(raw) => segments_from_raw(raw, &self.config),
        };
        let segments = furniture_filter(segments, &self.config);

        // A detection failure only costs unmatched products their boxes
        let mut enriched = products.to_vec();
        match detected {
            Ok(boxes) => {
                for found in boxes {
                    if let Some(product) = enriched
                        .iter_mut()
                        .find(|p| p.id == found.product_id && p.bbox.is_none())
                    {
                        product.bbox = Some(found.bbox);
                    }
                }
            }
            Err(e) => warn!("box detection unavailable ({}); matching without it", e),
        }

        let assignments = match_products(&enriched, &segments, &self.config);
        let any_matched = assignments.iter().any(|a| a.segment_id.is_some());

        let mut layers = Vec::new();
        let mut exposed = BinaryMask::new(canvas, canvas);

        if any_matched {
            for assignment in &assignments {
                if let Some(segment_id) = assignment.segment_id {
                    let Some(segment) = segments.iter().find(|s| s.id == segment_id) else {
                        continue;
                    };
                    layers.push(self.segment_layer(
                        &working,
                        segment,
                        Some(assignment.product_id.clone()),
                        &mut exposed,
                    )?);
                } else if let Some(product) =
                    enriched.iter().find(|p| p.id == assignment.product_id)
                {
                    // No eligible segment: degrade to a rectangular,
                    // non-segmented cutout of the proposed box
                    if let Some(layer) =
                        self.box_crop_layer(&working, product, &mut exposed)?
                    {
                        layers.push(layer);
                    }
                }
            }
        } else if !segments.is_empty() {
            // No product linkage at all: expose every surviving segment
            // as an unlabeled generic layer
            debug!("no assignments; exposing {} generic layers", segments.len());
            for segment in &segments {
                layers.push(self.segment_layer(&working, segment, None, &mut exposed)?);
            }
        }

        let background = working.clear_masked(&exposed)?;
        info!(
            "extracted {} layers from {} segments for {} products",
            layers.len(),
            segments.len(),
            products.len()
        );
        Ok(SceneLayers {
            background,
            layers,
            assignments,
        })
    }

    /// Resolve the placement mask for one target. Cannot fail: the
    /// dimension-estimate tier always produces a mask.
    pub async fn resolve_placement_mask(
        &self,
        image: &RasterImage,
        target: &ProductRef,
        action: PlacementAction,
        existing: &[ProductRef],
    ) -> PlacementMask {
        let canvas = self.config.canvas_size;
        let working = image.resize_to(canvas, canvas);
        self.resolver.resolve(&working, target, action, existing).await
    }

    /// Two-pass replace: erase the outgoing item(s), then fill the
    /// incoming product. Inspect `phase_reached` on the outcome.
    pub async fn replace_item(
        &self,
        image: &RasterImage,
        incoming: &ProductRef,
        existing: &[ProductRef],
        replace_all: bool,
    ) -> ReplaceOutcome {
        self.orchestrator
            .replace(image, incoming, existing, replace_all)
            .await
    }

    /// Single-pass add against the unmodified image
    pub async fn add_item(
        &self,
        image: &RasterImage,
        product: &ProductRef,
    ) -> Result<RasterImage> {
        let canvas = self.config.canvas_size;
        let working = image.resize_to(canvas, canvas);
        let placement = self
            .resolver
            .resolve(&working, product, PlacementAction::Add, &[])
            .await;
        let prompt = self.orchestrator.placement_prompt(product).await;
        let filled = self
            .oracles
            .inpainter
            .inpaint(&working, &placement.mask, &prompt, crate::replace::PLACEMENT_NEGATIVE)
            .await?;
        info!("added '{}' via {:?} mask", product.id, placement.provenance);
        Ok(filled.resize_to(canvas, canvas))
    }

    /// Single-pass removal of existing item(s)
    pub async fn remove_item(
        &self,
        image: &RasterImage,
        existing: &[ProductRef],
        remove_all: bool,
    ) -> Result<RasterImage> {
        let canvas = self.config.canvas_size;
        let working = image.resize_to(canvas, canvas);
        let removal = self
            .resolver
            .resolve_removal(&working, existing, remove_all)
            .await;
        let cleaned = self
            .oracles
            .inpainter
            .inpaint(
                &working,
                &removal.mask,
                crate::replace::REMOVAL_PROMPT,
                crate::replace::REMOVAL_NEGATIVE,
            )
            .await?;
        info!("removed {} item(s) via {:?} mask", existing.len(), removal.provenance);
        Ok(cleaned.resize_to(canvas, canvas))
    }

    /// Resolve the object under one or more click points
    pub async fn segment_click(
        &self,
        image: &RasterImage,
        points: &[NormalizedPoint],
    ) -> Result<ClickSelection> {
        self.clicker.segment_click(image, points).await
    }

    fn segment_layer(
        &self,
        working: &RasterImage,
        segment: &Segment,
        product_id: Option<String>,
        exposed: &mut BinaryMask,
    ) -> Result<SceneLayer> {
        let rect = segment
            .mask
            .bounding_box()
            .ok_or_else(|| StagingError::InvalidGeometry("empty segment mask".to_string()))?;
        let cutout = working.apply_alpha_mask(&segment.mask)?.crop(rect)?;
        let mask = segment.mask.crop(rect)?;
        exposed.union_with(&segment.mask)?;
        Ok(SceneLayer {
            product_id,
            cutout,
            mask,
            bbox: segment.bbox,
            center: segment.center,
            area_fraction: segment.area_fraction,
            provenance: MaskProvenance::AiSegmentation,
        })
    }

    fn box_crop_layer(
        &self,
        working: &RasterImage,
        product: &ProductRef,
        exposed: &mut BinaryMask,
    ) -> Result<Option<SceneLayer>> {
        let Some(bbox) = product.bbox else {
            return Ok(None);
        };
        let canvas = self.config.canvas_size;
        let rect = bbox.to_pixel_rect(canvas, canvas);
        if rect.is_empty() {
            return Ok(None);
        }
        let cutout = working.crop(rect)?;
        let mut mask = BinaryMask::new(rect.width, rect.height);
        mask.fill_rect(roomstage_core::PixelRect::new(0, 0, rect.width, rect.height));
        exposed.fill_rect(rect);
        let area_fraction = rect.area() as f32 / (canvas as f32 * canvas as f32);
        Ok(Some(SceneLayer {
            product_id: Some(product.id.clone()),
            cutout,
            mask,
            bbox,
            center: bbox.center(),
            area_fraction,
            provenance: MaskProvenance::BoundingBox,
        }))
    }
}
