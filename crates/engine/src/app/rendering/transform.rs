use crate::app::{Camera2D, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn size_f32(&self) -> Vec2 {
        Vec2 {
            x: self.width as f32,
            y: self.height as f32,
        }
    }
}

/// Screen pixel of a world point. Rounds toward negative infinity on both
/// axes so sprites left of or above the camera do not snap toward it.
pub fn world_to_screen(camera: &Camera2D, world: Vec2) -> (i32, i32) {
    let x = (world.x - camera.position.x).floor();
    let y = (world.y - camera.position.y).floor();
    (x as i32, y as i32)
}

pub fn screen_to_world(camera: &Camera2D, screen_x: i32, screen_y: i32) -> Vec2 {
    Vec2 {
        x: screen_x as f32 + camera.position.x,
        y: screen_y as f32 + camera.position.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_camera_is_identity() {
        let camera = Camera2D::default();
        assert_eq!(world_to_screen(&camera, Vec2 { x: 12.0, y: 7.0 }), (12, 7));
    }

    #[test]
    fn camera_offset_shifts_screen_position() {
        let camera = Camera2D {
            position: Vec2 { x: 50.0, y: 20.0 },
        };
        let (x, y) = world_to_screen(&camera, Vec2 { x: 100.0, y: 80.0 });
        assert_eq!((x, y), (50, 60));
    }

    #[test]
    fn sub_pixel_positions_floor_on_both_sides_of_camera() {
        let camera = Camera2D::default();
        assert_eq!(world_to_screen(&camera, Vec2 { x: 3.7, y: 0.2 }), (3, 0));
        assert_eq!(world_to_screen(&camera, Vec2 { x: -0.5, y: -3.2 }), (-1, -4));
    }

    #[test]
    fn screen_to_world_inverts_integral_positions() {
        let camera = Camera2D {
            position: Vec2 { x: -40.0, y: 15.0 },
        };
        let world = screen_to_world(&camera, 10, 10);
        assert_eq!(world_to_screen(&camera, world), (10, 10));
    }
}
