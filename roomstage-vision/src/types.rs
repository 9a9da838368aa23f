//! Domain types for the staging engine

use chrono::{DateTime, Utc};
use roomstage_core::{BinaryMask, NormalizedBox, NormalizedPoint, RasterImage};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One discrete detected object: a binary mask plus derived geometry.
/// Request-scoped and immutable once built.
#[derive(Debug, Clone)]
pub struct Segment {
    pub id: u32,
    pub mask: BinaryMask,
    pub bbox: NormalizedBox,
    pub center: NormalizedPoint,
    pub area_fraction: f32,
    pub confidence: f32,
    pub label: Option<String>,
}

/// Real-world product dimensions in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductDimensions {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
}

impl ProductDimensions {
    pub fn new(width: f32, depth: f32, height: f32) -> Self {
        Self { width, depth, height }
    }
}

/// Qualitative depth position of an item within the room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthPosition {
    Foreground,
    Center,
    Background,
}

/// Catalog product reference with optional oracle-proposed localization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    pub name: String,
    pub category: String,
    pub bbox: Option<NormalizedBox>,
    pub dimensions: Option<ProductDimensions>,
    pub depth_position: Option<DepthPosition>,
    pub image_url: Option<String>,
}

impl ProductRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            bbox: None,
            dimensions: None,
            depth_position: None,
            image_url: None,
        }
    }
}

/// Pairing of one product to at most one segment.
/// Across a matcher run the mapping is a partial injective function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchAssignment {
    pub product_id: String,
    pub segment_id: Option<u32>,
    pub distance: Option<f32>,
}

/// Which resolution tier produced a placement mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskProvenance {
    AiSegmentation,
    BoundingBox,
    DimensionEstimate,
}

/// A canvas-sized binary mask plus the tier that produced it
#[derive(Debug, Clone)]
pub struct PlacementMask {
    pub mask: BinaryMask,
    pub provenance: MaskProvenance,
}

/// Mask-resolution intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementAction {
    Add,
    ReplaceOne,
    ReplaceAll,
}

/// Replace pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplacePhase {
    Pending,
    Removed,
    Placed,
    RemovalFailed,
    PlacementFailed,
}

/// Transient per-request replace state machine; discarded after the
/// response is produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub phase: ReplacePhase,
}

impl ReplaceSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            phase: ReplacePhase::Pending,
        }
    }

    pub(crate) fn advance(&mut self, phase: ReplacePhase) {
        self.phase = phase;
    }
}

impl Default for ReplaceSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a two-pass replace
#[derive(Debug, Clone)]
pub struct ReplaceOutcome {
    pub image: RasterImage,
    pub phase_reached: ReplacePhase,
    pub session: ReplaceSession,
}

/// One extracted scene layer
#[derive(Debug, Clone)]
pub struct SceneLayer {
    pub product_id: Option<String>,
    pub cutout: RasterImage,
    pub mask: BinaryMask,
    pub bbox: NormalizedBox,
    pub center: NormalizedPoint,
    pub area_fraction: f32,
    pub provenance: MaskProvenance,
}

/// Full layer extraction result
#[derive(Debug, Clone)]
pub struct SceneLayers {
    /// Source image with every extracted layer's pixels cleared
    pub background: RasterImage,
    pub layers: Vec<SceneLayer>,
    pub assignments: Vec<MatchAssignment>,
}

/// Point-prompt selection result
#[derive(Debug, Clone)]
pub struct ClickSelection {
    pub cutout: RasterImage,
    pub mask: BinaryMask,
    pub bbox: NormalizedBox,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_session_starts_pending() {
        let session = ReplaceSession::new();
        assert_eq!(session.phase, ReplacePhase::Pending);
    }

    #[test]
    fn test_replace_session_advances() {
        let mut session = ReplaceSession::new();
        session.advance(ReplacePhase::Removed);
        assert_eq!(session.phase, ReplacePhase::Removed);
        session.advance(ReplacePhase::Placed);
        assert_eq!(session.phase, ReplacePhase::Placed);
    }

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(ReplaceSession::new().id, ReplaceSession::new().id);
    }

    #[test]
    fn test_provenance_serde_tags() {
        let json = serde_json::to_string(&MaskProvenance::AiSegmentation).unwrap();
        assert_eq!(json, "\"ai-segmentation\"");
        let json = serde_json::to_string(&MaskProvenance::DimensionEstimate).unwrap();
        assert_eq!(json, "\"dimension-estimate\"");
    }

    #[test]
    fn test_depth_position_serde_tags() {
        let json = serde_json::to_string(&DepthPosition::Foreground).unwrap();
        assert_eq!(json, "\"foreground\"");
        let back: DepthPosition = serde_json::from_str("\"background\"").unwrap();
        assert_eq!(back, DepthPosition::Background);
    }

    #[test]
    fn test_product_ref_serde_round_trip() {
        let mut product = ProductRef::new("sku-1", "Linen Sofa", "sofa");
        product.dimensions = Some(ProductDimensions::new(84.0, 36.0, 30.0));
        product.depth_position = Some(DepthPosition::Foreground);
        let json = serde_json::to_string(&product).unwrap();
        let back: ProductRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "sku-1");
        assert_eq!(back.dimensions.unwrap().width, 84.0);
    }
}
