use knight_engine::{
    ActionInput, Camera2D, InputAction, Scene, SceneError, SceneWorld, Sprite, Vec2, Viewport,
};
use tracing::info;

pub(crate) const WINDOW_WIDTH: u32 = 800;
pub(crate) const WINDOW_HEIGHT: u32 = 600;
const SPRITE_WIDTH: u32 = 64;
const SPRITE_HEIGHT: u32 = 64;
const SPRITE_SPEED: f32 = 300.0;
const CAMERA_SPEED: f32 = 200.0;
const PLAYER_START: Vec2 = Vec2::new(
    (WINDOW_WIDTH - SPRITE_WIDTH) as f32 / 2.0,
    (WINDOW_HEIGHT - SPRITE_HEIGHT) as f32 / 2.0,
);
const PLAYER_COLOR: [u8; 3] = [65, 105, 225];
const PLAYER_Z_INDEX: u8 = 50;
const DEMO_COLOR: [u8; 3] = [255, 100, 100];
const DEMO_POSITION: Vec2 = Vec2::new(100.0, 100.0);
const DEMO_Z_INDEX: u8 = 40;
const DEMO_ANGLE_DEGREES: f64 = 45.0;
const PLAYER_DEBUG_COLOR: [u8; 3] = [0, 255, 0];
const DEMO_DEBUG_COLOR: [u8; 3] = [255, 255, 0];
const PLAYER_TEXTURE_PATH: &str = "assets/player.png";
const BACKGROUND_TEXTURE_PATH: &str = "assets/background.png";

/// A keyboard-driven player, one rotated demo sprite and a background.
#[derive(Debug, Default)]
struct DemoScene;

impl Scene for DemoScene {
    fn load(&mut self, world: &mut SceneWorld) -> Result<(), SceneError> {
        let player_texture = world.load_texture_or_solid(
            "player",
            PLAYER_TEXTURE_PATH,
            SPRITE_WIDTH,
            SPRITE_HEIGHT,
            PLAYER_COLOR,
        )?;
        let player = world.add_sprite(
            Sprite::new(PLAYER_START, SPRITE_WIDTH, SPRITE_HEIGHT, player_texture)
                .with_z_index(PLAYER_Z_INDEX)
                .with_debug_bounds(PLAYER_DEBUG_COLOR),
            "player",
        )?;
        world.set_player(player);

        let demo_texture =
            SceneWorld::solid_texture("demo", SPRITE_WIDTH, SPRITE_HEIGHT, DEMO_COLOR)?;
        world.add_sprite(
            Sprite::new(DEMO_POSITION, SPRITE_WIDTH, SPRITE_HEIGHT, demo_texture)
                .with_z_index(DEMO_Z_INDEX)
                .with_angle(DEMO_ANGLE_DEGREES)
                .with_debug_bounds(DEMO_DEBUG_COLOR),
            "demo",
        )?;

        let viewport = world.viewport();
        let clear_color = world.clear_color();
        let background = world.load_texture_or_solid(
            "background",
            BACKGROUND_TEXTURE_PATH,
            viewport.width,
            viewport.height,
            clear_color,
        )?;
        world.set_background(background);

        info!(sprite_count = world.sprite_count(), "demo_scene_loaded");
        Ok(())
    }

    fn apply_frame_input(&mut self, input: &ActionInput<'_>, world: &mut SceneWorld) {
        let Some(player) = world.player_mut() else {
            return;
        };
        player.velocity = movement_velocity(input);
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &ActionInput<'_>, world: &mut SceneWorld) {
        pan_camera(world.camera_mut(), input, fixed_dt_seconds);

        if let Some(player) = world.player_mut() {
            player.position.x += player.velocity.x * fixed_dt_seconds;
            player.position.y += player.velocity.y * fixed_dt_seconds;
        }

        world.step_stress_test(fixed_dt_seconds);

        let camera = world.camera().position;
        let viewport = world.viewport();
        if let Some(player) = world.player_mut() {
            player.position =
                clamp_to_visible_region(player.position, player.size(), camera, viewport);
        }
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        info!(sprite_count = world.sprite_count(), "demo_scene_unloaded");
    }
}

pub(crate) fn build_scene() -> Box<dyn Scene> {
    Box::new(DemoScene)
}

/// Down and right win over up and left when both are held.
fn movement_velocity(input: &ActionInput<'_>) -> Vec2 {
    let mut velocity = Vec2::default();
    if input.is_down(InputAction::MoveUp) {
        velocity.y = -SPRITE_SPEED;
    }
    if input.is_down(InputAction::MoveDown) {
        velocity.y = SPRITE_SPEED;
    }
    if input.is_down(InputAction::MoveLeft) {
        velocity.x = -SPRITE_SPEED;
    }
    if input.is_down(InputAction::MoveRight) {
        velocity.x = SPRITE_SPEED;
    }
    velocity
}

fn pan_camera(camera: &mut Camera2D, input: &ActionInput<'_>, dt_seconds: f32) {
    let step = CAMERA_SPEED * dt_seconds;
    if input.is_down(InputAction::CameraUp) {
        camera.position.y -= step;
    }
    if input.is_down(InputAction::CameraDown) {
        camera.position.y += step;
    }
    if input.is_down(InputAction::CameraLeft) {
        camera.position.x -= step;
    }
    if input.is_down(InputAction::CameraRight) {
        camera.position.x += step;
    }
}

/// Keeps a sprite of `size` inside the area the camera currently shows.
/// The lower bound is applied first, so a sprite larger than the viewport
/// ends up pinned to the far edge.
fn clamp_to_visible_region(position: Vec2, size: Vec2, camera: Vec2, viewport: Viewport) -> Vec2 {
    let view = viewport.size_f32();
    let x = position.x.max(camera.x).min(camera.x + view.x - size.x);
    let y = position.y.max(camera.y).min(camera.y + view.y - size.y);
    Vec2::new(x, y)
}
