//! roomstage-vision: furniture staging engine for RoomStage
//!
//! Locates individual furniture objects inside a room photograph,
//! associates them with catalog products, and resolves pixel-accurate
//! placement masks so the external generation oracles can add, remove,
//! or replace items convincingly.
//!
//! The segmentation, detection, inpainting, and description models are
//! external oracles, injected as capability traits and substitutable
//! with test doubles. The engine itself is pure, request-scoped
//! computation over immutable rasters.

pub mod click;
pub mod config;
pub mod decompose;
pub mod dimensions;
pub mod engine;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod oracles;
pub mod placement;
pub mod replace;
pub mod types;

pub use config::StagingConfig;
pub use engine::StagingEngine;
pub use error::{Result, StagingError};
pub use oracles::OracleSet;
pub use types::{PlacementAction, PlacementMask, ProductRef, ReplacePhase};
