use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_TEXTURE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureError {
    #[error("failed to load texture '{path}': {reason}")]
    NotFound { path: String, reason: String },
    #[error("texture cache full ({capacity} entries), cannot load '{path}'")]
    CacheFull { path: String, capacity: usize },
    #[error("invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    PixelDataMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("file_open_failed:{0}")]
    Open(String),
    #[error("decode_failed:{0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Source pixels overwrite the frame.
    None,
    /// Source alpha blends over the frame.
    Alpha,
}

/// CPU-side RGBA8 texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    blend_mode: BlendMode,
}

impl Texture {
    pub fn from_rgba(
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        blend_mode: BlendMode,
    ) -> Result<Self, TextureError> {
        let expected = rgba_len(width, height)?;
        if rgba.len() != expected {
            return Err(TextureError::PixelDataMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
            blend_mode,
        })
    }

    /// Opaque single-colour texture, used where an asset could not be loaded.
    pub fn solid(width: u32, height: u32, color: [u8; 3]) -> Result<Self, TextureError> {
        let len = rgba_len(width, height)?;
        let mut rgba = Vec::with_capacity(len);
        for _ in 0..len / 4 {
            rgba.extend_from_slice(&[color[0], color[1], color[2], 255]);
        }
        Ok(Self {
            width,
            height,
            rgba,
            blend_mode: BlendMode::None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.blend_mode = blend_mode;
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }
}

fn rgba_len(width: u32, height: u32) -> Result<usize, TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(TextureError::InvalidDimensions { width, height })
}

pub fn create_solid(width: u32, height: u32, color: [u8; 3]) -> Result<Texture, TextureError> {
    Texture::solid(width, height, color)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Turns an asset path into RGBA pixels.
pub trait ImageDecoder {
    fn decode(&mut self, path: &str) -> Result<DecodedImage, DecodeError>;
}

/// Decodes image files relative to an asset root with the `image` crate.
#[derive(Debug, Clone)]
pub struct FsImageDecoder {
    root: PathBuf,
}

impl FsImageDecoder {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ImageDecoder for FsImageDecoder {
    fn decode(&mut self, path: &str) -> Result<DecodedImage, DecodeError> {
        let resolved = self.resolve(path);
        let reader =
            ImageReader::open(&resolved).map_err(|error| DecodeError::Open(error.to_string()))?;
        let decoded = reader
            .decode()
            .map_err(|error| DecodeError::Decode(error.to_string()))?;
        let image = decoded.to_rgba8();
        Ok(DecodedImage {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        })
    }
}

/// Stable reference to a cached texture. Handles from before a teardown no
/// longer resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    slot: u32,
    epoch: u32,
}

struct TextureEntry {
    path: String,
    texture: Texture,
}

/// Path-keyed texture cache with a fixed number of entries.
pub struct TextureCache {
    entries: Vec<TextureEntry>,
    capacity: usize,
    epoch: u32,
    decoder: Box<dyn ImageDecoder>,
}

impl TextureCache {
    pub fn new(decoder: Box<dyn ImageDecoder>, capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            epoch: 0,
            decoder,
        }
    }

    /// Returns the cached texture for `path`, decoding it on first use.
    ///
    /// A full cache refuses new paths without calling the decoder. Decode
    /// failures are not cached, so a later call retries.
    pub fn load(&mut self, path: &str) -> Result<TextureHandle, TextureError> {
        if let Some(handle) = self.get(path) {
            return Ok(handle);
        }

        if self.entries.len() >= self.capacity {
            warn!(path, capacity = self.capacity, "texture_cache_full");
            return Err(TextureError::CacheFull {
                path: path.to_string(),
                capacity: self.capacity,
            });
        }

        let decoded = self.decoder.decode(path).map_err(|error| {
            warn!(path, reason = %error, "texture_load_failed");
            TextureError::NotFound {
                path: path.to_string(),
                reason: error.to_string(),
            }
        })?;
        let texture = Texture::from_rgba(
            decoded.width,
            decoded.height,
            decoded.rgba,
            BlendMode::Alpha,
        )
        .map_err(|error| {
            warn!(path, reason = %error, "texture_load_failed");
            TextureError::NotFound {
                path: path.to_string(),
                reason: error.to_string(),
            }
        })?;

        info!(
            path,
            width = texture.width(),
            height = texture.height(),
            "texture_loaded"
        );
        let slot = self.entries.len() as u32;
        self.entries.push(TextureEntry {
            path: path.to_string(),
            texture,
        });
        Ok(TextureHandle {
            slot,
            epoch: self.epoch,
        })
    }

    pub fn get(&self, path: &str) -> Option<TextureHandle> {
        self.entries
            .iter()
            .position(|entry| entry.path == path)
            .map(|slot| TextureHandle {
                slot: slot as u32,
                epoch: self.epoch,
            })
    }

    pub fn get_size(&self, path: &str) -> Option<(u32, u32)> {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| entry.texture.size())
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        if handle.epoch != self.epoch {
            return None;
        }
        self.entries
            .get(handle.slot as usize)
            .map(|entry| &entry.texture)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Releases every cached texture. Returns how many were released.
    pub fn teardown(&mut self) -> usize {
        let released = self.entries.len();
        if released > 0 {
            self.entries.clear();
            self.epoch = self.epoch.wrapping_add(1);
            info!(released, "texture_cache_torn_down");
        }
        released
    }
}
