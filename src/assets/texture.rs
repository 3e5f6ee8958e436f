use std::{fmt, path::Path, path::PathBuf};

use crate::error::{Result, SceneError};

/// Decoded RGBA8 image, ready for upload
#[derive(Clone, PartialEq)]
pub struct TextureImage {
    /// File the pixels were read from
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn new(source: impl Into<PathBuf>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            width,
            height,
            pixels,
        }
    }

    /// Decodes any format supported by `image` into RGBA8
    pub fn decode(source: &Path, bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).map_err(|e| SceneError::asset(source, e))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(SceneError::asset(source, "image has no pixels"));
        }
        Ok(Self::new(source, width, height, rgba.into_raw()))
    }

    /// Opaque 1x1 white texel bound while a real texture is loading
    pub fn placeholder() -> Self {
        Self::new("<placeholder>", 1, 1, vec![255; 4])
    }
}

impl fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureImage")
            .field("source", &self.source)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
