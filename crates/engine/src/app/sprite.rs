use thiserror::Error;

use super::rendering::{Texture, TextureCache, TextureHandle};
use super::Vec2;

pub const DEFAULT_SPRITE_CAPACITY: usize = 256;
pub const Z_INDEX_MIN: u8 = 0;
pub const Z_INDEX_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpriteStoreError {
    #[error("sprite store full ({capacity} sprites)")]
    Full { capacity: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    pub const NONE: Flip = Flip {
        horizontal: false,
        vertical: false,
    };

    pub fn any(self) -> bool {
        self.horizontal || self.vertical
    }
}

/// Where a sprite's pixels come from.
///
/// `Cached` textures belong to the [`TextureCache`] and are released by its
/// teardown. `Owned` textures are released with the sprite.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SpriteTexture {
    #[default]
    None,
    Cached(TextureHandle),
    Owned(Texture),
}

impl SpriteTexture {
    pub fn resolve<'a>(&'a self, cache: &'a TextureCache) -> Option<&'a Texture> {
        match self {
            SpriteTexture::None => None,
            SpriteTexture::Cached(handle) => cache.texture(*handle),
            SpriteTexture::Owned(texture) => Some(texture),
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, SpriteTexture::Owned(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: u32,
    pub height: u32,
    z_index: u8,
    pub angle_degrees: f64,
    pub flip: Flip,
    pub tint: [u8; 3],
    pub texture: SpriteTexture,
    pub show_debug_bounds: bool,
    pub debug_color: [u8; 3],
}

impl Sprite {
    pub fn new(position: Vec2, width: u32, height: u32, texture: SpriteTexture) -> Self {
        Self {
            position,
            velocity: Vec2::default(),
            width,
            height,
            z_index: Z_INDEX_MIN,
            angle_degrees: 0.0,
            flip: Flip::NONE,
            tint: [255, 255, 255],
            texture,
            show_debug_bounds: false,
            debug_color: [255, 255, 255],
        }
    }

    pub fn with_z_index(mut self, z_index: u8) -> Self {
        self.set_z_index(z_index);
        self
    }

    pub fn with_angle(mut self, angle_degrees: f64) -> Self {
        self.angle_degrees = angle_degrees;
        self
    }

    pub fn with_debug_bounds(mut self, color: [u8; 3]) -> Self {
        self.show_debug_bounds = true;
        self.debug_color = color;
        self
    }

    pub fn z_index(&self) -> u8 {
        self.z_index
    }

    /// Values above the top layer are clamped to it.
    pub fn set_z_index(&mut self, z_index: u8) {
        self.z_index = z_index.min(Z_INDEX_MAX);
    }

    /// Rotated or flipped sprites take the extended draw path.
    pub fn needs_extended_draw(&self) -> bool {
        self.angle_degrees != 0.0 || self.flip.any()
    }

    pub fn size(&self) -> Vec2 {
        Vec2 {
            x: self.width as f32,
            y: self.height as f32,
        }
    }
}

/// Fixed-capacity sprite list. Ids are insertion indices; pushing past
/// capacity fails instead of growing.
#[derive(Debug, Clone)]
pub struct SpriteStore {
    sprites: Vec<Sprite>,
    capacity: usize,
}

impl Default for SpriteStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SPRITE_CAPACITY)
    }
}

impl SpriteStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sprites: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sprite: Sprite) -> Result<SpriteId, SpriteStoreError> {
        if self.sprites.len() >= self.capacity {
            return Err(SpriteStoreError::Full {
                capacity: self.capacity,
            });
        }
        self.sprites.push(sprite);
        Ok(SpriteId(self.sprites.len() - 1))
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id.0)
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.sprites.len())
    }

    pub fn as_slice(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.sprites
            .iter()
            .enumerate()
            .map(|(index, sprite)| (SpriteId(index), sprite))
    }

    pub fn range_mut(&mut self, start: usize) -> &mut [Sprite] {
        let start = start.min(self.sprites.len());
        &mut self.sprites[start..]
    }

    /// Drops every sprite at or after `len`. Returns how many owned textures
    /// were released with them.
    pub fn truncate(&mut self, len: usize) -> usize {
        if len >= self.sprites.len() {
            return 0;
        }
        self.sprites
            .drain(len..)
            .filter(|sprite| sprite.texture.is_owned())
            .count()
    }

    pub fn clear(&mut self) -> usize {
        self.truncate(0)
    }

    pub fn owned_texture_count(&self) -> usize {
        self.sprites
            .iter()
            .filter(|sprite| sprite.texture.is_owned())
            .count()
    }
}
