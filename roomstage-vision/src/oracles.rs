//! Oracle capability traits
//!
//! Every external model the engine consumes is a capability behind one of
//! these traits: injected at construction, substitutable with a test
//! double. The engine performs no retries and holds no client state;
//! timeout enforcement belongs to the implementations.

use async_trait::async_trait;
use image::GrayImage;
use roomstage_core::{BinaryMask, NormalizedBox, RasterImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::types::ProductRef;

/// One pre-split segment as returned by the automatic segmenter
#[derive(Debug, Clone)]
pub struct RawSegment {
    pub mask: GrayImage,
    pub confidence: f32,
    pub label: Option<String>,
}

/// Result of one automatic segmentation pass
#[derive(Debug, Clone)]
pub enum AutoSegmentation {
    /// A single combined image, each object rendered as a distinct flat
    /// color against a near-black or near-white background
    CombinedMask(RasterImage),
    /// Pre-split per-object masks
    Segments(Vec<RawSegment>),
}

/// A product bounding box proposed by the detection oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedBox {
    pub product_id: String,
    pub bbox: NormalizedBox,
}

/// Automatic pixel segmentation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AutoSegmenter: Send + Sync {
    /// Segment every object in the image in one pass
    async fn segment_auto(&self, image: &RasterImage) -> Result<AutoSegmentation>;

    /// Segment the region matching a furniture-category text label
    async fn segment_category(&self, image: &RasterImage, category: &str) -> Result<GrayImage>;
}

/// Point-prompted segmentation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointSegmenter: Send + Sync {
    /// Resolve one mask from one or more pixel-space click points,
    /// in a single combined call
    async fn segment_at_points(
        &self,
        image: &RasterImage,
        points: &[(u32, u32)],
    ) -> Result<GrayImage>;
}

/// Vision-based product localization
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoxDetector: Send + Sync {
    async fn detect_product_boxes(
        &self,
        image: &RasterImage,
        products: &[ProductRef],
    ) -> Result<Vec<DetectedBox>>;
}

/// Generative region fill
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Inpainter: Send + Sync {
    async fn inpaint(
        &self,
        image: &RasterImage,
        mask: &BinaryMask,
        prompt: &str,
        negative_prompt: &str,
    ) -> Result<RasterImage>;
}

/// Optional product description enrichment for placement prompts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductDescriber: Send + Sync {
    async fn describe_product(&self, image_url: &str) -> Result<String>;
}

/// Bundle of oracle capabilities injected into the engine
#[derive(Clone)]
pub struct OracleSet {
    pub auto_segmenter: Arc<dyn AutoSegmenter>,
    pub point_segmenter: Arc<dyn PointSegmenter>,
    pub box_detector: Arc<dyn BoxDetector>,
    pub inpainter: Arc<dyn Inpainter>,
    pub describer: Option<Arc<dyn ProductDescriber>>,
}

impl OracleSet {
    pub fn new(
        auto_segmenter: Arc<dyn AutoSegmenter>,
        point_segmenter: Arc<dyn PointSegmenter>,
        box_detector: Arc<dyn BoxDetector>,
        inpainter: Arc<dyn Inpainter>,
    ) -> Self {
        Self {
            auto_segmenter,
            point_segmenter,
            box_detector,
            inpainter,
            describer: None,
        }
    }

    pub fn with_describer(mut self, describer: Arc<dyn ProductDescriber>) -> Self {
        self.describer = Some(describer);
        self
    }
}
