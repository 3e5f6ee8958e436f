//! # Texture assets
//!
//! Textures are requested while the scene is assembled and arrive over the
//! following frames. Until then surfaces render with their base colour.

pub mod loader;
pub mod request;
pub mod texture;

pub use loader::{AssetLoader, LoadEvent, LoadId, PumpReport, DEFAULT_CHUNK_SIZE};
pub use request::{TextureRequest, TextureTarget};
pub use texture::TextureImage;
