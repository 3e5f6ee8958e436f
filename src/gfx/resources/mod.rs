//! GPU resource management
//!
//! Handles materials, textures, and the global bind group.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent};
pub use material::{Material, MaterialDesc, MaterialId, MaterialManager};
pub use texture_resource::TextureResource;
