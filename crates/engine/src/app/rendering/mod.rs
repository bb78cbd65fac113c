mod renderer;
mod texture;
mod transform;

pub use renderer::{
    blit_ex, blit_stretched, clear, draw_line, draw_polygon_outline, draw_rect_outline, fill_rect,
    render_scene, rotated_rect_corners, sprite_draw_order, Renderer, ScreenRect,
};
pub use texture::{
    create_solid, BlendMode, DecodeError, DecodedImage, FsImageDecoder, ImageDecoder, Texture,
    TextureCache, TextureError, TextureHandle, DEFAULT_TEXTURE_CAPACITY,
};
pub use transform::{screen_to_world, world_to_screen, Viewport};
