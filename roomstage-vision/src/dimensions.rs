//! Typical real-world furniture dimensions
//!
//! The dimension-estimate tier falls back to this table when a product
//! carries no measured dimensions. Matching is a first-wins substring
//! scan over the lowercased category, so compound names must precede
//! their generic suffix ("coffee table" before "table").

use crate::types::ProductDimensions;

/// Fallback when no category entry matches
pub const DEFAULT_DIMENSIONS: ProductDimensions = ProductDimensions {
    width: 36.0,
    depth: 24.0,
    height: 30.0,
};

const CATEGORY_TABLE: &[(&str, ProductDimensions)] = &[
    ("sectional", ProductDimensions { width: 110.0, depth: 90.0, height: 30.0 }),
    ("loveseat", ProductDimensions { width: 60.0, depth: 35.0, height: 30.0 }),
    ("sofa", ProductDimensions { width: 84.0, depth: 36.0, height: 30.0 }),
    ("couch", ProductDimensions { width: 84.0, depth: 36.0, height: 30.0 }),
    ("coffee table", ProductDimensions { width: 48.0, depth: 24.0, height: 18.0 }),
    ("dining table", ProductDimensions { width: 72.0, depth: 40.0, height: 30.0 }),
    ("side table", ProductDimensions { width: 22.0, depth: 22.0, height: 24.0 }),
    ("end table", ProductDimensions { width: 22.0, depth: 22.0, height: 24.0 }),
    ("nightstand", ProductDimensions { width: 24.0, depth: 18.0, height: 26.0 }),
    ("console", ProductDimensions { width: 65.0, depth: 16.0, height: 30.0 }),
    ("table", ProductDimensions { width: 48.0, depth: 30.0, height: 30.0 }),
    ("armchair", ProductDimensions { width: 32.0, depth: 34.0, height: 34.0 }),
    ("recliner", ProductDimensions { width: 35.0, depth: 40.0, height: 40.0 }),
    ("stool", ProductDimensions { width: 18.0, depth: 18.0, height: 26.0 }),
    ("chair", ProductDimensions { width: 22.0, depth: 24.0, height: 34.0 }),
    ("ottoman", ProductDimensions { width: 30.0, depth: 30.0, height: 18.0 }),
    ("bench", ProductDimensions { width: 48.0, depth: 18.0, height: 18.0 }),
    ("bed", ProductDimensions { width: 80.0, depth: 60.0, height: 45.0 }),
    ("dresser", ProductDimensions { width: 60.0, depth: 20.0, height: 32.0 }),
    ("wardrobe", ProductDimensions { width: 40.0, depth: 24.0, height: 72.0 }),
    ("bookshelf", ProductDimensions { width: 36.0, depth: 12.0, height: 72.0 }),
    ("bookcase", ProductDimensions { width: 36.0, depth: 12.0, height: 72.0 }),
    ("shelf", ProductDimensions { width: 36.0, depth: 12.0, height: 48.0 }),
    ("desk", ProductDimensions { width: 55.0, depth: 28.0, height: 30.0 }),
    ("rug", ProductDimensions { width: 96.0, depth: 60.0, height: 1.0 }),
    ("floor lamp", ProductDimensions { width: 12.0, depth: 12.0, height: 60.0 }),
    ("lamp", ProductDimensions { width: 14.0, depth: 14.0, height: 26.0 }),
    ("mirror", ProductDimensions { width: 30.0, depth: 2.0, height: 40.0 }),
    ("plant", ProductDimensions { width: 18.0, depth: 18.0, height: 48.0 }),
];

/// Typical dimensions for a furniture category
pub fn typical_dimensions(category: &str) -> ProductDimensions {
    let needle = category.to_lowercase();
    for (key, dims) in CATEGORY_TABLE {
        if needle.contains(key) {
            return *dims;
        }
    }
    DEFAULT_DIMENSIONS
}
