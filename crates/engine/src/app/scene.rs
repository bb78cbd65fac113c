use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{info, warn};

use super::input::ActionInput;
use super::rendering::{
    create_solid, ImageDecoder, TextureCache, TextureError, Viewport, DEFAULT_TEXTURE_CAPACITY,
};
use super::sprite::{Sprite, SpriteId, SpriteStore, SpriteTexture, DEFAULT_SPRITE_CAPACITY};
use super::tools::{StressTest, StressToggle};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// World-space offset of the viewport's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to create solid texture for {what}: {source}")]
    SolidTexture {
        what: &'static str,
        #[source]
        source: TextureError,
    },
    #[error("sprite store full, cannot add {what}")]
    SpriteStoreFull { what: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSettings {
    pub viewport: Viewport,
    pub texture_capacity: usize,
    pub sprite_capacity: usize,
    pub clear_color: [u8; 3],
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            viewport: Viewport {
                width: 800,
                height: 600,
            },
            texture_capacity: DEFAULT_TEXTURE_CAPACITY,
            sprite_capacity: DEFAULT_SPRITE_CAPACITY,
            clear_color: [34, 139, 34],
        }
    }
}

/// The single owned engine context. Built once at startup, threaded through
/// input, update and render by mutable borrow, torn down once at shutdown.
pub struct SceneWorld {
    camera: Camera2D,
    viewport: Viewport,
    clear_color: [u8; 3],
    textures: TextureCache,
    sprites: SpriteStore,
    player: Option<SpriteId>,
    background: SpriteTexture,
    debug_enabled: bool,
    stress_test: StressTest,
    rng: StdRng,
}

impl SceneWorld {
    pub fn new(settings: WorldSettings, decoder: Box<dyn ImageDecoder>) -> Self {
        Self::with_rng(settings, decoder, StdRng::from_entropy())
    }

    pub fn with_seed(settings: WorldSettings, decoder: Box<dyn ImageDecoder>, seed: u64) -> Self {
        Self::with_rng(settings, decoder, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: WorldSettings, decoder: Box<dyn ImageDecoder>, rng: StdRng) -> Self {
        Self {
            camera: Camera2D::default(),
            viewport: settings.viewport,
            clear_color: settings.clear_color,
            textures: TextureCache::new(decoder, settings.texture_capacity),
            sprites: SpriteStore::with_capacity(settings.sprite_capacity),
            player: None,
            background: SpriteTexture::None,
            debug_enabled: false,
            stress_test: StressTest::default(),
            rng,
        }
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clear_color(&self) -> [u8; 3] {
        self.clear_color
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureCache {
        &mut self.textures
    }

    pub fn sprites(&self) -> &SpriteStore {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut SpriteStore {
        &mut self.sprites
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn add_sprite(
        &mut self,
        sprite: Sprite,
        what: &'static str,
    ) -> Result<SpriteId, SceneError> {
        self.sprites.push(sprite).map_err(|error| {
            warn!(what, error = %error, "sprite_store_full");
            SceneError::SpriteStoreFull { what }
        })
    }

    pub fn player_id(&self) -> Option<SpriteId> {
        self.player
    }

    pub fn set_player(&mut self, id: SpriteId) {
        self.player = Some(id);
    }

    pub fn player(&self) -> Option<&Sprite> {
        self.player.and_then(|id| self.sprites.get(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Sprite> {
        let id = self.player?;
        self.sprites.get_mut(id)
    }

    pub fn background(&self) -> &SpriteTexture {
        &self.background
    }

    pub fn set_background(&mut self, background: SpriteTexture) {
        self.background = background;
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.debug_enabled = !self.debug_enabled;
        info!(enabled = self.debug_enabled, "debug_mode_toggled");
        self.debug_enabled
    }

    pub fn stress_test(&self) -> &StressTest {
        &self.stress_test
    }

    pub fn toggle_stress_test(&mut self) -> StressToggle {
        self.stress_test.toggle(&mut self.sprites, &mut self.rng, self.viewport)
    }

    pub fn step_stress_test(&mut self, dt_seconds: f32) {
        self.stress_test.step(&mut self.sprites, dt_seconds, self.viewport);
    }

    /// Loads `path` through the cache, falling back to a solid `color` fill of
    /// `width` x `height` that the caller owns. Only a failure to build the
    /// fallback is an error.
    pub fn load_texture_or_solid(
        &mut self,
        what: &'static str,
        path: &str,
        width: u32,
        height: u32,
        color: [u8; 3],
    ) -> Result<SpriteTexture, SceneError> {
        match self.textures.load(path) {
            Ok(handle) => Ok(SpriteTexture::Cached(handle)),
            Err(error) => {
                warn!(what, path, error = %error, "fallback_texture_in_use");
                Self::solid_texture(what, width, height, color)
            }
        }
    }

    /// A caller-owned solid fill, released with the sprite that holds it.
    pub fn solid_texture(
        what: &'static str,
        width: u32,
        height: u32,
        color: [u8; 3],
    ) -> Result<SpriteTexture, SceneError> {
        create_solid(width, height, color)
            .map(SpriteTexture::Owned)
            .map_err(|source| SceneError::SolidTexture { what, source })
    }

    /// Drops every sprite and the background, then releases the texture
    /// cache. Safe to call more than once.
    pub fn teardown(&mut self) {
        let released_owned = self.sprites.clear();
        let background_owned = self.background.is_owned();
        self.background = SpriteTexture::None;
        self.player = None;
        self.stress_test = StressTest::default();
        let released_cached = self.textures.teardown();
        if released_owned > 0 || background_owned || released_cached > 0 {
            info!(
                released_owned = released_owned + usize::from(background_owned),
                released_cached, "scene_world_torn_down"
            );
        }
    }
}

/// Game-side behaviour driven by the engine loop.
///
/// Per real frame the loop calls `apply_frame_input` once, then `update`
/// zero or more times with the fixed timestep.
pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld) -> Result<(), SceneError>;
    fn apply_frame_input(&mut self, input: &ActionInput<'_>, world: &mut SceneWorld);
    fn update(&mut self, fixed_dt_seconds: f32, input: &ActionInput<'_>, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
}
