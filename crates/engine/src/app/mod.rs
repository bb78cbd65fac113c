mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod sprite;
mod tile;
mod tools;

pub use input::{
    ActionInput, InputAction, Key, KeyBindings, KeyboardState, PlatformEvent, KEY_COUNT,
};
pub use loop_runner::{
    plan_sim_steps, run_app, AppError, EngineCore, FixedTimestep, FrameReport, LoopConfig,
    LoopState, ShutdownReason, StepPlan, SLOW_FRAME_ENV_VAR,
};
pub use metrics::{FrameStats, LoopMetricsSnapshot};
pub use rendering::{
    blit_ex, blit_stretched, clear, create_solid, draw_line, draw_polygon_outline,
    draw_rect_outline, fill_rect, render_scene, rotated_rect_corners, screen_to_world,
    sprite_draw_order, world_to_screen, BlendMode, DecodeError, DecodedImage, FsImageDecoder,
    ImageDecoder, Renderer, ScreenRect, Texture, TextureCache, TextureError, TextureHandle,
    Viewport, DEFAULT_TEXTURE_CAPACITY,
};
pub use scene::{Camera2D, Scene, SceneError, SceneWorld, Vec2, WorldSettings};
pub use sprite::{
    Flip, Sprite, SpriteId, SpriteStore, SpriteStoreError, SpriteTexture,
    DEFAULT_SPRITE_CAPACITY, Z_INDEX_MAX, Z_INDEX_MIN,
};
pub use tile::{
    Tile, TileDef, TileDefId, TileLayer, TileSet, TileSetError, MAX_TILE_DEFINITIONS,
    TILE_NAME_MAX_LEN, TILE_SIZE,
};
pub use tools::{
    StressTest, StressToggle, STRESS_ANGULAR_SPEED_DEG_PER_SEC, STRESS_SPRITE_COUNT,
    STRESS_SPRITE_SIZE,
};
