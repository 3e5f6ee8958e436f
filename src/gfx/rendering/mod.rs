//! Core rendering functionality
//!
//! Handles render pipelines, shadow map caching and frame rendering.

pub mod pipeline_manager;
pub mod render_engine;
pub mod shadow_cache;

pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::RenderEngine;
pub use shadow_cache::ShadowCache;
