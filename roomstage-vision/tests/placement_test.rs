//! Placement mask resolution through the public engine API

mod common;

use std::sync::Arc;

use common::*;
use roomstage_core::{NormalizedBox, RasterImage};
use roomstage_vision::oracles::OracleSet;
use roomstage_vision::types::{DepthPosition, MaskProvenance, PlacementAction, ProductDimensions};
use roomstage_vision::{StagingConfig, StagingEngine};

fn offline_engine() -> StagingEngine {
    StagingEngine::new(offline_oracles(), StagingConfig::default()).unwrap()
}

#[tokio::test]
async fn test_ai_tier_preferred_when_available() {
    let oracles = OracleSet::new(
        Arc::new(StubAutoSegmenter {
            auto: None,
            category_mask: Some(rect_mask(512, 512, 100, 200, 300, 150)),
        }),
        Arc::new(StubPointSegmenter { mask: None }),
        Arc::new(StubBoxDetector { boxes: Vec::new() }),
        Arc::new(RecordingInpainter::ok()),
    );
    let engine = StagingEngine::new(oracles, StagingConfig::default()).unwrap();
    let image = RasterImage::new(512, 512);

    let placement = engine
        .resolve_placement_mask(&image, &sofa_product("sofa-1"), PlacementAction::Add, &[])
        .await;
    assert_eq!(placement.provenance, MaskProvenance::AiSegmentation);
    assert_eq!(placement.mask.pixel_count(), 300 * 150);
}

#[tokio::test]
async fn test_replace_one_uses_first_existing_box() {
    let engine = offline_engine();
    let image = RasterImage::new(512, 512);
    let existing = vec![
        product_with_box("old-sofa", "sofa", NormalizedBox::new(0.0, 0.4, 0.5, 0.5).unwrap()),
        product_with_box("old-chair", "chair", NormalizedBox::new(0.7, 0.6, 0.2, 0.2).unwrap()),
    ];

    let placement = engine
        .resolve_placement_mask(
            &image,
            &sofa_product("new-sofa"),
            PlacementAction::ReplaceOne,
            &existing,
        )
        .await;
    assert_eq!(placement.provenance, MaskProvenance::BoundingBox);
    let expected = NormalizedBox::new(0.0, 0.4, 0.5, 0.5)
        .unwrap()
        .expand(0.02)
        .to_pixel_rect(512, 512);
    assert_eq!(placement.mask.bounding_box().unwrap(), expected);
}

#[tokio::test]
async fn test_replace_all_unions_existing_boxes() {
    let engine = offline_engine();
    let image = RasterImage::new(512, 512);
    let existing = vec![
        product_with_box("a", "chair", NormalizedBox::new(0.1, 0.5, 0.2, 0.2).unwrap()),
        product_with_box("b", "chair", NormalizedBox::new(0.6, 0.55, 0.2, 0.2).unwrap()),
    ];

    let placement = engine
        .resolve_placement_mask(
            &image,
            &sofa_product("new-sofa"),
            PlacementAction::ReplaceAll,
            &existing,
        )
        .await;
    assert_eq!(placement.provenance, MaskProvenance::BoundingBox);
    let union = NormalizedBox::new(0.1, 0.5, 0.7, 0.25)
        .unwrap()
        .expand(0.02)
        .to_pixel_rect(512, 512);
    assert_eq!(placement.mask.bounding_box().unwrap(), union);
}

#[tokio::test]
async fn test_add_without_boxes_reaches_dimension_tier() {
    let engine = offline_engine();
    let image = RasterImage::new(512, 512);

    let placement = engine
        .resolve_placement_mask(&image, &sofa_product("sofa-1"), PlacementAction::Add, &[])
        .await;
    assert_eq!(placement.provenance, MaskProvenance::DimensionEstimate);
    let rect = placement.mask.bounding_box().unwrap();
    // Clamped into [10%, 45%] of the canvas per axis
    assert!(rect.width >= 51 && rect.width <= 231);
    assert!(rect.height >= 51 && rect.height <= 231);
    assert!(placement.mask.pixel_count() > 0);
}

#[tokio::test]
async fn test_dimension_tier_perspective_scaling() {
    // 84in-wide foreground product: 84 * (512/144) * 1.3 = 388px before
    // padding and clamping; the 45% canvas clamp caps it at 230px
    let engine = offline_engine();
    let image = RasterImage::new(512, 512);
    let mut product = sofa_product("sofa-1");
    product.dimensions = Some(ProductDimensions::new(84.0, 36.0, 30.0));
    product.depth_position = Some(DepthPosition::Foreground);

    let placement = engine
        .resolve_placement_mask(&image, &product, PlacementAction::Add, &[])
        .await;
    assert_eq!(placement.provenance, MaskProvenance::DimensionEstimate);
    assert_eq!(placement.mask.bounding_box().unwrap().width, 230);
}

#[tokio::test]
async fn test_background_item_smaller_than_foreground() {
    let engine = offline_engine();
    let image = RasterImage::new(512, 512);
    let mut near = small_armchair("near");
    near.depth_position = Some(DepthPosition::Foreground);
    let mut far = small_armchair("far");
    far.depth_position = Some(DepthPosition::Background);

    let near_mask = engine
        .resolve_placement_mask(&image, &near, PlacementAction::Add, &[])
        .await;
    let far_mask = engine
        .resolve_placement_mask(&image, &far, PlacementAction::Add, &[])
        .await;
    let near_rect = near_mask.mask.bounding_box().unwrap();
    let far_rect = far_mask.mask.bounding_box().unwrap();
    assert!(near_rect.width > far_rect.width);
}

fn small_armchair(id: &str) -> roomstage_vision::ProductRef {
    let mut product = roomstage_vision::ProductRef::new(id, id, "armchair");
    product.dimensions = Some(ProductDimensions::new(32.0, 34.0, 34.0));
    product
}

#[tokio::test]
async fn test_degenerate_existing_box_falls_through() {
    let engine = offline_engine();
    let image = RasterImage::new(512, 512);
    let existing = vec![product_with_box(
        "old",
        "sofa",
        NormalizedBox::new(0.5, 0.5, 0.0, 0.0).unwrap(),
    )];

    let placement = engine
        .resolve_placement_mask(
            &image,
            &sofa_product("new"),
            PlacementAction::ReplaceOne,
            &existing,
        )
        .await;
    // Zero-area box cannot rasterize; the dimension tier takes over
    assert_eq!(placement.provenance, MaskProvenance::DimensionEstimate);
    assert!(placement.mask.pixel_count() > 0);
}
