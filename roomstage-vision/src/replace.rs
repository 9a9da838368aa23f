//! Two-pass replace orchestration
//!
//! Replace is two dependent passes over the working image: erase the
//! outgoing item, then fill the incoming product into the cleaned
//! scene. A failed removal degrades silently (the original image keeps
//! serving as the working image); only a failed placement is surfaced
//! to the caller, via the phase it reached.

use roomstage_core::RasterImage;
use tracing::{debug, info, warn};

use crate::config::StagingConfig;
use crate::oracles::OracleSet;
use crate::placement::{boxes_of, PlacementResolver};
use crate::types::{ProductRef, ReplaceOutcome, ReplacePhase, ReplaceSession};

/// Steers the removal fill toward plausible empty background
pub(crate) const REMOVAL_PROMPT: &str =
    "empty room interior, bare floor and walls continuing naturally, consistent lighting";
/// Discourages the fill from regenerating furniture in the hole
pub(crate) const REMOVAL_NEGATIVE: &str =
    "furniture, sofa, chair, table, shelf, lamp, rug, decor, objects, clutter";
pub(crate) const PLACEMENT_NEGATIVE: &str =
    "distorted proportions, floating furniture, duplicate items, artifacts";

pub struct ReplaceOrchestrator {
    oracles: OracleSet,
    config: StagingConfig,
    resolver: PlacementResolver,
}

impl ReplaceOrchestrator {
    pub fn new(oracles: OracleSet, config: StagingConfig) -> Self {
        let resolver = PlacementResolver::new(oracles.clone(), config.clone());
        Self {
            oracles,
            config,
            resolver,
        }
    }

    /// Run both passes. Never hard-fails: the outcome carries the phase
    /// reached and the best image available at that point.
    pub async fn replace(
        &self,
        image: &RasterImage,
        incoming: &ProductRef,
        existing: &[ProductRef],
        replace_all: bool,
    ) -> ReplaceOutcome {
        let mut session = ReplaceSession::new();
        let canvas = self.config.canvas_size;
        let mut working = image.resize_to(canvas, canvas);
        info!("replace session {} started for '{}'", session.id, incoming.id);

        // Phase A: erase the outgoing item(s)
        let removal = self
            .resolver
            .resolve_removal(&working, existing, replace_all)
            .await;
        match self
            .oracles
            .inpainter
            .inpaint(&working, &removal.mask, REMOVAL_PROMPT, REMOVAL_NEGATIVE)
            .await
        {
            Ok(cleaned) => {
                working = cleaned.resize_to(canvas, canvas);
                session.advance(ReplacePhase::Removed);
                info!(
                    "session {}: removal pass complete via {:?} mask",
                    session.id, removal.provenance
                );
            }
            Err(e) => {
                warn!(
                    "session {}: removal pass failed ({}); continuing with original image",
                    session.id, e
                );
                session.advance(ReplacePhase::RemovalFailed);
            }
        }

        // Phase B: fill the incoming product into the working image.
        // Sized from the product itself; the outgoing box only anchors
        // the center.
        let hint = self
            .resolver
            .box_center_hint(&boxes_of(existing), replace_all);
        let placement = self
            .resolver
            .resolve_placement_for(&working, incoming, hint)
            .await;
        let prompt = self.placement_prompt(incoming).await;
        match self
            .oracles
            .inpainter
            .inpaint(&working, &placement.mask, &prompt, PLACEMENT_NEGATIVE)
            .await
        {
            Ok(out) => {
                session.advance(ReplacePhase::Placed);
                info!(
                    "session {}: placement pass complete via {:?} mask",
                    session.id, placement.provenance
                );
                ReplaceOutcome {
                    image: out.resize_to(canvas, canvas),
                    phase_reached: session.phase,
                    session,
                }
            }
            Err(e) => {
                warn!("session {}: placement pass failed ({})", session.id, e);
                session.advance(ReplacePhase::PlacementFailed);
                ReplaceOutcome {
                    image: working,
                    phase_reached: session.phase,
                    session,
                }
            }
        }
    }

    /// Descriptive fill prompt, enriched by the describer when one is
    /// configured and the product has an image to describe
    pub(crate) async fn placement_prompt(&self, product: &ProductRef) -> String {
        let mut prompt = format!(
            "a {}, {} placed naturally in the room, matching the scene's lighting and perspective",
            product.name, product.category
        );
        if let (Some(describer), Some(url)) = (&self.oracles.describer, &product.image_url) {
            match describer.describe_product(url).await {
                Ok(description) => prompt = format!("{prompt}. {description}"),
                Err(e) => debug!("describer unavailable ({e}); using base prompt"),
            }
        }
        prompt
    }
}
