//! End-to-end demo over stub oracles
//!
//! Builds a synthetic room scene, extracts its layers, resolves a
//! placement mask, and runs a replace. Swap the stubs for real oracle
//! clients to drive actual models.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use roomstage_core::{BinaryMask, NormalizedBox, RasterImage};
use roomstage_vision::error::StagingError;
use roomstage_vision::oracles::{
    AutoSegmentation, AutoSegmenter, BoxDetector, DetectedBox, Inpainter, OracleSet,
    PointSegmenter,
};
use roomstage_vision::types::{PlacementAction, ProductDimensions, ProductRef};
use roomstage_vision::{StagingConfig, StagingEngine};

struct DemoSegmenter;

#[async_trait]
impl AutoSegmenter for DemoSegmenter {
    async fn segment_auto(
        &self,
        _image: &RasterImage,
    ) -> roomstage_vision::Result<AutoSegmentation> {
        // A red sofa-shaped block and a green chair-shaped block on a
        // black background, the way a combined mask comes back
        let mut img = RgbaImage::from_pixel(512, 512, Rgba([0, 0, 0, 255]));
        for y in 250..380 {
            for x in 60..260 {
                img.put_pixel(x, y, Rgba([200, 60, 60, 255]));
            }
        }
        for y in 280..380 {
            for x in 330..430 {
                img.put_pixel(x, y, Rgba([60, 200, 60, 255]));
            }
        }
        Ok(AutoSegmentation::CombinedMask(RasterImage::from_rgba(img)))
    }

    async fn segment_category(
        &self,
        _image: &RasterImage,
        _category: &str,
    ) -> roomstage_vision::Result<GrayImage> {
        // Pretend the labeled segmentation backend is down so the demo
        // exercises the fallback tiers
        Err(StagingError::OracleUnavailable(
            "labeled segmentation not wired in this demo".to_string(),
        ))
    }
}

struct DemoPointSegmenter;

#[async_trait]
impl PointSegmenter for DemoPointSegmenter {
    async fn segment_at_points(
        &self,
        _image: &RasterImage,
        _points: &[(u32, u32)],
    ) -> roomstage_vision::Result<GrayImage> {
        let mut gray = GrayImage::new(512, 512);
        for y in 250..380 {
            for x in 60..260 {
                gray.put_pixel(x, y, Luma([255]));
            }
        }
        Ok(gray)
    }
}

struct DemoDetector;

#[async_trait]
impl BoxDetector for DemoDetector {
    async fn detect_product_boxes(
        &self,
        _image: &RasterImage,
        products: &[ProductRef],
    ) -> roomstage_vision::Result<Vec<DetectedBox>> {
        // Put every boxless product over the red block
        Ok(products
            .iter()
            .filter(|p| p.bbox.is_none())
            .map(|p| DetectedBox {
                product_id: p.id.clone(),
                bbox: NormalizedBox::clamped(0.12, 0.49, 0.39, 0.25),
            })
            .collect())
    }
}

struct DemoInpainter;

#[async_trait]
impl Inpainter for DemoInpainter {
    async fn inpaint(
        &self,
        image: &RasterImage,
        mask: &BinaryMask,
        prompt: &str,
        _negative_prompt: &str,
    ) -> roomstage_vision::Result<RasterImage> {
        println!(
            "  inpaint over {} px: \"{}\"",
            mask.pixel_count(),
            prompt
        );
        Ok(image.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomstage_vision=debug".into()),
        )
        .init();

    let oracles = OracleSet::new(
        Arc::new(DemoSegmenter),
        Arc::new(DemoPointSegmenter),
        Arc::new(DemoDetector),
        Arc::new(DemoInpainter),
    );
    let engine = StagingEngine::new(oracles, StagingConfig::default())?;
    let room = RasterImage::new(512, 512);

    let mut sofa = ProductRef::new("sku-sofa", "Linen Sofa", "sofa");
    sofa.dimensions = Some(ProductDimensions::new(84.0, 36.0, 30.0));

    println!("extracting layers...");
    let scene = engine.extract_layers(&room, &[sofa.clone()]).await?;
    println!(
        "  {} layer(s), background {}x{}",
        scene.layers.len(),
        scene.background.width(),
        scene.background.height()
    );
    for layer in &scene.layers {
        println!(
            "  layer {:?}: {}x{} cutout, provenance {:?}",
            layer.product_id,
            layer.cutout.width(),
            layer.cutout.height(),
            layer.provenance
        );
    }

    println!("resolving a placement mask for an add...");
    let placement = engine
        .resolve_placement_mask(&room, &sofa, PlacementAction::Add, &[])
        .await;
    println!(
        "  {} px via {:?}",
        placement.mask.pixel_count(),
        placement.provenance
    );

    println!("replacing the detected sofa...");
    let existing = vec![{
        let mut p = ProductRef::new("old-sofa", "Old Sofa", "sofa");
        p.bbox = Some(NormalizedBox::clamped(0.12, 0.49, 0.39, 0.25));
        p
    }];
    let outcome = engine.replace_item(&room, &sofa, &existing, false).await;
    println!("  phase reached: {:?}", outcome.phase_reached);

    Ok(())
}
