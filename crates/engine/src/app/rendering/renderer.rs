use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::sprite::{Flip, Sprite, SpriteId, SpriteStore, Z_INDEX_MAX, Z_INDEX_MIN};
use crate::app::{Camera2D, SceneWorld, Vec2};

use super::texture::{BlendMode, Texture};
use super::{world_to_screen, Viewport};

const NEUTRAL_TINT: [u8; 3] = [255, 255, 255];

/// Window surface backed by a `pixels` frame of fixed logical size. The
/// surface follows the window's physical size and `pixels` scales the frame
/// onto it. `render_world` presents once per call.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height, viewport)?;
        Ok(Self {
            window,
            pixels,
            viewport,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height, self.viewport)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        surface_width: u32,
        surface_height: u32,
        viewport: Viewport,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(viewport.width, viewport.height, surface)
    }

    pub fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        let Viewport { width, height } = self.viewport;
        render_scene(self.pixels.frame_mut(), width, height, world);
        self.pixels.render()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Draws one full frame of `world` into an RGBA frame of `width` x `height`.
pub fn render_scene(frame: &mut [u8], width: u32, height: u32, world: &SceneWorld) {
    clear(frame, world.clear_color());
    if width == 0 || height == 0 {
        return;
    }

    if let Some(background) = world.background().resolve(world.textures()) {
        let full = ScreenRect {
            x: 0,
            y: 0,
            width,
            height,
        };
        blit_stretched(frame, width, height, background, full);
    }

    let camera = world.camera();
    for id in sprite_draw_order(world.sprites()) {
        let Some(sprite) = world.sprites().get(id) else {
            continue;
        };
        if let Some(texture) = sprite.texture.resolve(world.textures()) {
            draw_sprite(frame, width, height, camera, sprite, texture);
        }
        if world.debug_enabled() && sprite.show_debug_bounds {
            let corners = rotated_rect_corners(
                camera,
                sprite.position,
                sprite.width,
                sprite.height,
                sprite.angle_degrees,
            );
            draw_polygon_outline(frame, width, height, &corners, rgba(sprite.debug_color));
        }
    }
}

/// Draw sequence for the store: every z from lowest to highest, and within a
/// z the store's insertion order.
pub fn sprite_draw_order(sprites: &SpriteStore) -> Vec<SpriteId> {
    let mut order = Vec::with_capacity(sprites.len());
    for z in Z_INDEX_MIN..=Z_INDEX_MAX {
        order.extend(
            sprites
                .iter()
                .filter(|(_, sprite)| sprite.z_index() == z)
                .map(|(id, _)| id),
        );
    }
    order
}

fn draw_sprite(
    frame: &mut [u8],
    width: u32,
    height: u32,
    camera: &Camera2D,
    sprite: &Sprite,
    texture: &Texture,
) {
    let (x, y) = world_to_screen(camera, sprite.position);
    let dst = ScreenRect {
        x,
        y,
        width: sprite.width,
        height: sprite.height,
    };
    if sprite.needs_extended_draw() {
        blit_ex(
            frame,
            width,
            height,
            texture,
            dst,
            sprite.angle_degrees,
            sprite.flip,
            sprite.tint,
        );
    } else {
        blit_stretched(frame, width, height, texture, dst);
    }
}

pub fn clear(frame: &mut [u8], color: [u8; 3]) {
    let fill = rgba(color);
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&fill);
    }
}

/// Axis-aligned nearest-neighbour blit of the whole texture into `dst`.
pub fn blit_stretched(
    frame: &mut [u8],
    width: u32,
    height: u32,
    texture: &Texture,
    dst: ScreenRect,
) {
    if dst.width == 0 || dst.height == 0 {
        return;
    }
    let draw_left = dst.x.max(0);
    let draw_top = dst.y.max(0);
    let draw_right = dst.x.saturating_add(dst.width as i32).min(width as i32);
    let draw_bottom = dst.y.saturating_add(dst.height as i32).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let scale_x = texture.width() as f32 / dst.width as f32;
    let scale_y = texture.height() as f32 / dst.height as f32;
    let blend = texture.blend_mode();

    for out_y in draw_top..draw_bottom {
        let src_y = (((out_y - dst.y) as f32) * scale_y).floor() as u32;
        let src_y = src_y.min(texture.height() - 1);
        for out_x in draw_left..draw_right {
            let src_x = (((out_x - dst.x) as f32) * scale_x).floor() as u32;
            let src_x = src_x.min(texture.width() - 1);
            if let Some(src) = texture.pixel(src_x, src_y) {
                blend_pixel(frame, width, height, out_x, out_y, src, blend);
            }
        }
    }
}

/// Blit with rotation about the rectangle's centre (clockwise degrees), axis
/// flips and per-channel colour modulation. The modulation applies to this
/// draw only; nothing is stored on the texture.
#[allow(clippy::too_many_arguments)]
pub fn blit_ex(
    frame: &mut [u8],
    width: u32,
    height: u32,
    texture: &Texture,
    dst: ScreenRect,
    angle_degrees: f64,
    flip: Flip,
    tint: [u8; 3],
) {
    if dst.width == 0 || dst.height == 0 {
        return;
    }
    let half_w = dst.width as f32 / 2.0;
    let half_h = dst.height as f32 / 2.0;
    let center_x = dst.x as f32 + half_w;
    let center_y = dst.y as f32 + half_h;
    let radians = angle_degrees.to_radians();
    let (sin, cos) = (radians.sin() as f32, radians.cos() as f32);

    // Screen-space bounds of the rotated rectangle.
    let extent_x = half_w * cos.abs() + half_h * sin.abs();
    let extent_y = half_w * sin.abs() + half_h * cos.abs();
    let draw_left = ((center_x - extent_x).floor() as i32).max(0);
    let draw_top = ((center_y - extent_y).floor() as i32).max(0);
    let draw_right = ((center_x + extent_x).ceil() as i32).min(width as i32);
    let draw_bottom = ((center_y + extent_y).ceil() as i32).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let scale_x = texture.width() as f32 / dst.width as f32;
    let scale_y = texture.height() as f32 / dst.height as f32;
    let blend = texture.blend_mode();

    for out_y in draw_top..draw_bottom {
        let ry = out_y as f32 + 0.5 - center_y;
        for out_x in draw_left..draw_right {
            let rx = out_x as f32 + 0.5 - center_x;
            // Inverse rotation back into the unrotated rectangle.
            let local_x = rx * cos + ry * sin;
            let local_y = -rx * sin + ry * cos;
            if local_x < -half_w || local_x >= half_w || local_y < -half_h || local_y >= half_h {
                continue;
            }
            let mut u = local_x + half_w;
            let mut v = local_y + half_h;
            if flip.horizontal {
                u = dst.width as f32 - u;
            }
            if flip.vertical {
                v = dst.height as f32 - v;
            }
            let src_x = ((u * scale_x).floor().max(0.0) as u32).min(texture.width() - 1);
            let src_y = ((v * scale_y).floor().max(0.0) as u32).min(texture.height() - 1);
            if let Some(src) = texture.pixel(src_x, src_y) {
                let tinted = modulate(src, tint);
                blend_pixel(frame, width, height, out_x, out_y, tinted, blend);
            }
        }
    }
}

/// Corners of a `width` x `height` box at world `position`, rotated about its
/// centre and mapped to screen space. Order is top-left, top-right,
/// bottom-right, bottom-left before rotation.
pub fn rotated_rect_corners(
    camera: &Camera2D,
    position: Vec2,
    width: u32,
    height: u32,
    angle_degrees: f64,
) -> [(i32, i32); 4] {
    let (screen_x, screen_y) = world_to_screen(camera, position);
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;
    let center_x = screen_x as f32 + half_w;
    let center_y = screen_y as f32 + half_h;
    let radians = angle_degrees.to_radians();
    let (sin, cos) = (radians.sin() as f32, radians.cos() as f32);

    let offsets = [
        (-half_w, -half_h),
        (half_w, -half_h),
        (half_w, half_h),
        (-half_w, half_h),
    ];
    offsets.map(|(ox, oy)| {
        let rx = ox * cos - oy * sin;
        let ry = ox * sin + oy * cos;
        ((center_x + rx).floor() as i32, (center_y + ry).floor() as i32)
    })
}

pub fn draw_polygon_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    corners: &[(i32, i32)],
    color: [u8; 4],
) {
    for (index, &(x0, y0)) in corners.iter().enumerate() {
        let (x1, y1) = corners[(index + 1) % corners.len()];
        draw_line(frame, width, height, x0, y0, x1, y1, color);
    }
}

/// Bresenham line, clipped per pixel.
#[allow(clippy::too_many_arguments)]
pub fn draw_line(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: [u8; 4],
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let step_x = if x0 < x1 { 1 } else { -1 };
    let step_y = if y0 < y1 { 1 } else { -1 };
    let mut error = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        write_pixel_rgba_clipped(frame, width, height, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            y += step_y;
        }
    }
}

pub fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: ScreenRect,
    color: [u8; 4],
) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let right = rect.x + rect.width as i32 - 1;
    let bottom = rect.y + rect.height as i32 - 1;
    let corners = [(rect.x, rect.y), (right, rect.y), (right, bottom), (rect.x, bottom)];
    draw_polygon_outline(frame, width, height, &corners, color);
}

pub fn fill_rect(frame: &mut [u8], width: u32, height: u32, rect: ScreenRect, color: [u8; 4]) {
    let right = rect.x.saturating_add(rect.width as i32).min(width as i32);
    let bottom = rect.y.saturating_add(rect.height as i32).min(height as i32);
    for y in rect.y.max(0)..bottom {
        for x in rect.x.max(0)..right {
            blend_pixel(frame, width, height, x, y, color, BlendMode::Alpha);
        }
    }
}

fn blend_pixel(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    src: [u8; 4],
    blend: BlendMode,
) {
    match blend {
        BlendMode::None => write_pixel_rgba_clipped(frame, width, height, x, y, src),
        BlendMode::Alpha => {
            let alpha = src[3];
            if alpha == 0 {
                return;
            }
            if alpha == 255 {
                write_pixel_rgba_clipped(frame, width, height, x, y, src);
                return;
            }
            let Some(offset) = pixel_offset(frame, width, height, x, y) else {
                return;
            };
            let dst = &mut frame[offset..offset + 4];
            for channel in 0..3 {
                dst[channel] = mix(src[channel], dst[channel], alpha);
            }
            dst[3] = 255;
        }
    }
}

fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    if let Some(offset) = pixel_offset(frame, width, height, x, y) {
        frame[offset..offset + 4].copy_from_slice(&color);
    }
}

fn pixel_offset(frame: &[u8], width: u32, height: u32, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return None;
    }
    let pixel = (y as usize)
        .checked_mul(width as usize)?
        .checked_add(x as usize)?;
    let offset = pixel.checked_mul(4)?;
    (offset.checked_add(4)? <= frame.len()).then_some(offset)
}

fn mix(src: u8, dst: u8, alpha: u8) -> u8 {
    let alpha = u32::from(alpha);
    ((u32::from(src) * alpha + u32::from(dst) * (255 - alpha) + 127) / 255) as u8
}

fn modulate(src: [u8; 4], tint: [u8; 3]) -> [u8; 4] {
    if tint == NEUTRAL_TINT {
        return src;
    }
    let channel =
        |value: u8, factor: u8| ((u32::from(value) * u32::from(factor) + 127) / 255) as u8;
    [
        channel(src[0], tint[0]),
        channel(src[1], tint[1]),
        channel(src[2], tint[2]),
        src[3],
    ]
}

fn rgba(color: [u8; 3]) -> [u8; 4] {
    [color[0], color[1], color[2], 255]
}
