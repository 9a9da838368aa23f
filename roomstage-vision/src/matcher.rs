//! Greedy product-to-segment matching
//!
//! Products are processed strictly in input order; the first listed
//! product wins a contested segment. This is deliberately not a global
//! assignment optimization: downstream consumers depend on
//! first-listed-product-wins tie-breaking.

use tracing::debug;

use crate::config::StagingConfig;
use crate::types::{MatchAssignment, ProductRef, Segment};

/// Pair catalog products with detected segments.
///
/// A segment is eligible for a product when their boxes intersect or
/// their centers lie within the configured distance bound; among
/// eligible segments the closest wins, ties breaking toward
/// decomposition order (largest segment first). Each segment is
/// assigned at most once.
pub fn match_products(
    products: &[ProductRef],
    segments: &[Segment],
    config: &StagingConfig,
) -> Vec<MatchAssignment> {
    let mut used = vec![false; segments.len()];
    let mut assignments = Vec::with_capacity(products.len());

    for product in products {
        let Some(pbox) = product.bbox else {
            assignments.push(MatchAssignment {
                product_id: product.id.clone(),
                segment_id: None,
                distance: None,
            });
            continue;
        };
        let pcenter = pbox.center();

        let mut best: Option<(usize, f32)> = None;
        for (idx, segment) in segments.iter().enumerate() {
            if used[idx] {
                continue;
            }
            let distance = pcenter.distance(&segment.center);
            let overlap = pbox.intersection_area(&segment.bbox);
            if overlap <= 0.0 && distance >= config.match_distance_threshold {
                continue;
            }
            // Strict < keeps the earlier (larger) segment on equal distance
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((idx, distance)),
            }
        }

        match best {
            Some((idx, distance)) => {
                used[idx] = true;
                assignments.push(MatchAssignment {
                    product_id: product.id.clone(),
                    segment_id: Some(segments[idx].id),
                    distance: Some(distance),
                });
            }
            None => {
                debug!("no eligible segment for product {}", product.id);
                assignments.push(MatchAssignment {
                    product_id: product.id.clone(),
                    segment_id: None,
                    distance: None,
                });
            }
        }
    }

    let matched = assignments.iter().filter(|a| a.segment_id.is_some()).count();
    debug!("matched {}/{} products", matched, products.len());
    assignments
}
