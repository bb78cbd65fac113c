use rand::Rng;
use tracing::{info, warn};

use crate::app::rendering::{create_solid, Viewport};
use crate::app::sprite::{Sprite, SpriteStore, SpriteTexture};
use crate::app::Vec2;

pub const STRESS_SPRITE_COUNT: usize = 150;
pub const STRESS_SPRITE_SIZE: u32 = 32;
pub const STRESS_ANGULAR_SPEED_DEG_PER_SEC: f64 = 90.0;

const STRESS_Z_MIN: u8 = 30;
const STRESS_Z_SPAN: u8 = 20;
const STRESS_SPEED_SPAN: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressToggle {
    Enabled { spawned: usize, total: usize },
    Disabled { released: usize, total: usize },
}

/// Batch of throwaway sprites appended after the scene's own sprites.
///
/// While active, every store index at or above `base_index` belongs to the
/// batch. Toggling is synchronous; no partial state is observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StressTest {
    active: bool,
    base_index: usize,
}

impl StressTest {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn base_index(&self) -> usize {
        self.base_index
    }

    pub fn toggle<R: Rng>(
        &mut self,
        sprites: &mut SpriteStore,
        rng: &mut R,
        viewport: Viewport,
    ) -> StressToggle {
        if self.active {
            self.disable(sprites)
        } else {
            self.enable(sprites, rng, viewport)
        }
    }

    fn enable<R: Rng>(
        &mut self,
        sprites: &mut SpriteStore,
        rng: &mut R,
        viewport: Viewport,
    ) -> StressToggle {
        let width = viewport.width.max(1) as i32;
        let height = viewport.height.max(1) as i32;
        self.base_index = sprites.len();
        let mut spawned = 0;
        for _ in 0..STRESS_SPRITE_COUNT {
            let color = [rng.gen(), rng.gen(), rng.gen()];
            let texture = match create_solid(STRESS_SPRITE_SIZE, STRESS_SPRITE_SIZE, color) {
                Ok(texture) => texture,
                Err(error) => {
                    warn!(error = %error, "stress_texture_failed");
                    break;
                }
            };
            // Scattered over twice the viewport area, centred on it.
            let x = (rng.gen_range(0..width * 2) - width / 2) as f32;
            let y = (rng.gen_range(0..height * 2) - height / 2) as f32;
            let mut sprite = Sprite::new(
                Vec2::new(x, y),
                STRESS_SPRITE_SIZE,
                STRESS_SPRITE_SIZE,
                SpriteTexture::Owned(texture),
            )
            .with_z_index(STRESS_Z_MIN + rng.gen_range(0..STRESS_Z_SPAN))
            .with_angle(rng.gen_range(0..360) as f64);
            sprite.velocity = Vec2::new(
                (rng.gen_range(0..STRESS_SPEED_SPAN) - STRESS_SPEED_SPAN / 2) as f32,
                (rng.gen_range(0..STRESS_SPEED_SPAN) - STRESS_SPEED_SPAN / 2) as f32,
            );

            if let Err(error) = sprites.push(sprite) {
                warn!(spawned, error = %error, "stress_spawn_stopped");
                break;
            }
            spawned += 1;
        }

        self.active = true;
        let total = sprites.len();
        info!(spawned, total, "stress_test_enabled");
        StressToggle::Enabled { spawned, total }
    }

    fn disable(&mut self, sprites: &mut SpriteStore) -> StressToggle {
        let released = sprites.truncate(self.base_index);
        self.active = false;
        let total = sprites.len();
        info!(released, total, "stress_test_disabled");
        StressToggle::Disabled { released, total }
    }

    /// Advances every batch sprite by one fixed tick. Sprites bounce once they
    /// leave the area one viewport beyond the visible one on either side.
    pub fn step(&self, sprites: &mut SpriteStore, dt_seconds: f32, viewport: Viewport) {
        if !self.active {
            return;
        }
        let size = viewport.size_f32();
        for sprite in sprites.range_mut(self.base_index) {
            sprite.position.x += sprite.velocity.x * dt_seconds;
            sprite.position.y += sprite.velocity.y * dt_seconds;
            sprite.angle_degrees += STRESS_ANGULAR_SPEED_DEG_PER_SEC * f64::from(dt_seconds);

            if sprite.position.x < -size.x || sprite.position.x > size.x * 2.0 {
                sprite.velocity.x = -sprite.velocity.x;
            }
            if sprite.position.y < -size.y || sprite.position.y > size.y * 2.0 {
                sprite.velocity.y = -sprite.velocity.y;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    fn store_with_scene_sprites(capacity: usize, count: usize) -> SpriteStore {
        let mut store = SpriteStore::with_capacity(capacity);
        for _ in 0..count {
            store
                .push(Sprite::new(Vec2::default(), 64, 64, SpriteTexture::None))
                .expect("push");
        }
        store
    }

    #[test]
    fn toggle_round_trip_restores_count_and_releases_textures() {
        let mut store = store_with_scene_sprites(256, 2);
        let mut rng = StdRng::seed_from_u64(42);
        let mut stress = StressTest::default();

        let enabled = stress.toggle(&mut store, &mut rng, VIEWPORT);
        assert_eq!(
            enabled,
            StressToggle::Enabled {
                spawned: STRESS_SPRITE_COUNT,
                total: 2 + STRESS_SPRITE_COUNT
            }
        );
        assert!(stress.is_active());
        assert_eq!(stress.base_index(), 2);
        assert_eq!(store.owned_texture_count(), STRESS_SPRITE_COUNT);

        let disabled = stress.toggle(&mut store, &mut rng, VIEWPORT);
        assert_eq!(
            disabled,
            StressToggle::Disabled {
                released: STRESS_SPRITE_COUNT,
                total: 2
            }
        );
        assert!(!stress.is_active());
        assert_eq!(store.len(), 2);
        assert_eq!(store.owned_texture_count(), 0);
    }

    #[test]
    fn spawn_stops_silently_at_capacity() {
        let mut store = store_with_scene_sprites(256, 200);
        let mut rng = StdRng::seed_from_u64(3);
        let mut stress = StressTest::default();

        let result = stress.toggle(&mut store, &mut rng, VIEWPORT);
        assert_eq!(
            result,
            StressToggle::Enabled {
                spawned: 56,
                total: 256
            }
        );
        assert_eq!(store.remaining_capacity(), 0);

        stress.toggle(&mut store, &mut rng, VIEWPORT);
        assert_eq!(store.len(), 200);
    }

    #[test]
    fn spawned_sprites_stay_in_configured_ranges() {
        let mut store = SpriteStore::with_capacity(256);
        let mut rng = StdRng::seed_from_u64(99);
        let mut stress = StressTest::default();
        stress.toggle(&mut store, &mut rng, VIEWPORT);

        for (_, sprite) in store.iter() {
            assert!((30..50).contains(&sprite.z_index()));
            assert!((-400.0..1200.0).contains(&sprite.position.x));
            assert!((-300.0..900.0).contains(&sprite.position.y));
            assert!((-50.0..50.0).contains(&sprite.velocity.x));
            assert!((-50.0..50.0).contains(&sprite.velocity.y));
            assert!((0.0..360.0).contains(&sprite.angle_degrees));
            assert!(!sprite.show_debug_bounds);
            assert_eq!((sprite.width, sprite.height), (32, 32));
        }
    }

    #[test]
    fn step_rotates_and_bounces_only_batch_sprites() {
        let mut store = store_with_scene_sprites(8, 1);
        let mut stress = StressTest {
            active: true,
            base_index: 1,
        };
        let mut sprite = Sprite::new(Vec2::new(1599.0, 0.0), 32, 32, SpriteTexture::None);
        sprite.velocity = Vec2::new(120.0, 0.0);
        store.push(sprite).expect("push");

        stress.step(&mut store, 0.5, VIEWPORT);

        let scene_sprite = store.get(crate::app::SpriteId(0)).expect("scene sprite");
        assert_eq!(scene_sprite.position, Vec2::default());

        let batch = store.get(crate::app::SpriteId(1)).expect("batch sprite");
        assert_eq!(batch.position.x, 1659.0);
        assert_eq!(batch.velocity.x, -120.0);
        assert_eq!(batch.angle_degrees, 45.0);

        stress.active = false;
        stress.step(&mut store, 0.5, VIEWPORT);
        let batch = store.get(crate::app::SpriteId(1)).expect("batch sprite");
        assert_eq!(batch.position.x, 1659.0);
    }
}
