//! Shared oracle test doubles
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use roomstage_core::{BinaryMask, NormalizedBox, RasterImage};
use roomstage_vision::error::{Result, StagingError};
use roomstage_vision::oracles::{
    AutoSegmentation, AutoSegmenter, BoxDetector, DetectedBox, Inpainter, OracleSet,
    PointSegmenter, ProductDescriber,
};
use roomstage_vision::types::{ProductDimensions, ProductRef};

/// Automatic segmenter returning canned results; `None` simulates an
/// unavailable oracle
pub struct StubAutoSegmenter {
    pub auto: Option<AutoSegmentation>,
    pub category_mask: Option<GrayImage>,
}

impl StubAutoSegmenter {
    pub fn offline() -> Self {
        Self { auto: None, category_mask: None }
    }
}

#[async_trait]
impl AutoSegmenter for StubAutoSegmenter {
    async fn segment_auto(&self, _image: &RasterImage) -> Result<AutoSegmentation> {
        self.auto
            .clone()
            .ok_or_else(|| StagingError::OracleUnavailable("segmentation offline".to_string()))
    }

    async fn segment_category(
        &self,
        _image: &RasterImage,
        _category: &str,
    ) -> Result<GrayImage> {
        self.category_mask
            .clone()
            .ok_or_else(|| StagingError::OracleUnavailable("segmentation offline".to_string()))
    }
}

pub struct StubPointSegmenter {
    pub mask: Option<GrayImage>,
}

#[async_trait]
impl PointSegmenter for StubPointSegmenter {
    async fn segment_at_points(
        &self,
        _image: &RasterImage,
        _points: &[(u32, u32)],
    ) -> Result<GrayImage> {
        self.mask
            .clone()
            .ok_or_else(|| StagingError::OracleUnavailable("point segmentation offline".to_string()))
    }
}

pub struct StubBoxDetector {
    pub boxes: Vec<DetectedBox>,
}

#[async_trait]
impl BoxDetector for StubBoxDetector {
    async fn detect_product_boxes(
        &self,
        _image: &RasterImage,
        _products: &[ProductRef],
    ) -> Result<Vec<DetectedBox>> {
        Ok(self.boxes.clone())
    }
}

/// One recorded inpaint invocation
pub struct InpaintCall {
    pub mask: BinaryMask,
    pub prompt: String,
    pub negative_prompt: String,
}

/// Inpainter that records every call and echoes the input image back
pub struct RecordingInpainter {
    pub calls: Mutex<Vec<InpaintCall>>,
    /// Fail only the first call (the removal pass of a replace)
    pub fail_first: bool,
    pub fail_all: bool,
}

impl RecordingInpainter {
    pub fn ok() -> Self {
        Self { calls: Mutex::new(Vec::new()), fail_first: false, fail_all: false }
    }

    pub fn failing_first() -> Self {
        Self { calls: Mutex::new(Vec::new()), fail_first: true, fail_all: false }
    }

    pub fn failing_all() -> Self {
        Self { calls: Mutex::new(Vec::new()), fail_first: false, fail_all: true }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Inpainter for RecordingInpainter {
    async fn inpaint(
        &self,
        image: &RasterImage,
        mask: &BinaryMask,
        prompt: &str,
        negative_prompt: &str,
    ) -> Result<RasterImage> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(InpaintCall {
            mask: mask.clone(),
            prompt: prompt.to_string(),
            negative_prompt: negative_prompt.to_string(),
        });
        let index = calls.len();
        if self.fail_all || (self.fail_first && index == 1) {
            return Err(StagingError::OracleUnavailable("inpainting offline".to_string()));
        }
        Ok(image.clone())
    }
}

pub struct StubDescriber {
    pub description: String,
}

#[async_trait]
impl ProductDescriber for StubDescriber {
    async fn describe_product(&self, _image_url: &str) -> Result<String> {
        Ok(self.description.clone())
    }
}

/// Oracle set where every capability is unavailable
pub fn offline_oracles() -> OracleSet {
    OracleSet::new(
        Arc::new(StubAutoSegmenter::offline()),
        Arc::new(StubPointSegmenter { mask: None }),
        Arc::new(StubBoxDetector { boxes: Vec::new() }),
        Arc::new(RecordingInpainter::ok()),
    )
}

/// A 512x512 combined mask image: a red sofa-sized block and a green
/// chair-sized block on a black background
pub fn combined_scene() -> RasterImage {
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
    RasterImage::from_rgba(img)
}

/// Gray mask with one filled rectangle
pub fn rect_mask(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> GrayImage {
    let mut gray = GrayImage::new(width, height);
    for y in y0..(y0 + h).min(height) {
        for x in x0..(x0 + w).min(width) {
            gray.put_pixel(x, y, Luma([255]));
        }
    }
    gray
}

pub fn sofa_product(id: &str) -> ProductRef {
    let mut product = ProductRef::new(id, "Linen Sofa", "sofa");
    product.dimensions = Some(ProductDimensions::new(84.0, 36.0, 30.0));
    product
}

pub fn product_with_box(id: &str, category: &str, bbox: NormalizedBox) -> ProductRef {
    let mut product = ProductRef::new(id, id, category);
    product.bbox = Some(bbox);
    product
}
