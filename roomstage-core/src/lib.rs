//! roomstage-core: shared kernel for the RoomStage staging pipeline
//!
//! Resolution-independent geometry plus raster and binary-mask primitives.
//! Everything here is a plain value type: images and masks are immutable
//! once built, and every derived image is a new value.

pub mod error;
pub mod geometry;
pub mod raster;

pub use error::{Error, Result};
pub use geometry::{NormalizedBox, NormalizedPoint, PixelRect};
pub use raster::{BinaryMask, RasterImage, DEFAULT_BINARIZE_THRESHOLD};
