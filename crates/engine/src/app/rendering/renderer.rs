use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{HudRect, SceneWorld, WorldSprite};

use super::{world_to_screen_px, Viewport};

const CLEAR_COLOR: [u8; 4] = [28, 24, 32, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    draw_order: Vec<usize>,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            draw_order: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let width = self.viewport.width;
        let height = self.viewport.height;
        let window_size = (width, height);
        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        sorted_draw_indices(world.sprites(), &mut self.draw_order);
        for &index in &self.draw_order {
            let sprite = &world.sprites()[index];
            let rect = sprite_screen_rect(world, window_size, sprite);
            fill_rect(frame, width, height, rect, sprite.color);
            if let Some(outline) = sprite.outline {
                draw_rect_outline(frame, width, height, rect, outline);
            }
        }

        for hud in world.hud() {
            fill_rect(frame, width, height, hud_screen_rect(hud), hud.color);
        }

        self.pixels.render()
    }
}

fn sorted_draw_indices(sprites: &[WorldSprite], out: &mut Vec<usize>) {
    out.clear();
    out.extend(0..sprites.len());
    out.sort_by_key(|&index| sprites[index].draw_order());
}

fn sprite_screen_rect(
    world: &SceneWorld,
    window_size: (u32, u32),
    sprite: &WorldSprite,
) -> ScreenRectPx {
    let min = sprite.bounds.min();
    let max = sprite.bounds.max();
    let (left, bottom) = world_to_screen_px(world.camera(), window_size, min);
    let (right, top) = world_to_screen_px(world.camera(), window_size, max);
    ScreenRectPx {
        left,
        right,
        top,
        bottom,
    }
}

fn hud_screen_rect(hud: &HudRect) -> ScreenRectPx {
    ScreenRectPx {
        left: hud.left,
        right: hud.left + hud.width.max(1) - 1,
        top: hud.top,
        bottom: hud.top + hud.height.max(1) - 1,
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    if x >= width {
        return;
    }
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    if color[3] == 255 {
        frame[byte_offset..end].copy_from_slice(&color);
        return;
    }
    let alpha = color[3] as u16;
    for channel in 0..3 {
        let dst = frame[byte_offset + channel] as u16;
        let src = color[channel] as u16;
        frame[byte_offset + channel] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
    }
}

fn fill_rect(frame: &mut [u8], width: u32, height: u32, rect: ScreenRectPx, color: [u8; 4]) {
    let left = rect.left.max(0);
    let right = rect.right.min(width as i32 - 1);
    let top = rect.top.max(0);
    let bottom = rect.bottom.min(height as i32 - 1);
    for y in top..=bottom {
        for x in left..=right {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    _height: u32,
    rect: ScreenRectPx,
    color: [u8; 4],
) {
    for x in rect.left..=rect.right {
        write_pixel_rgba_clipped(frame, width as usize, x, rect.top, color);
        write_pixel_rgba_clipped(frame, width as usize, x, rect.bottom, color);
    }
    for y in rect.top..=rect.bottom {
        write_pixel_rgba_clipped(frame, width as usize, rect.left, y, color);
        write_pixel_rgba_clipped(frame, width as usize, rect.right, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Aabb, DrawLayer, Vec2};

    fn sprite(layer: DrawLayer, foot_y: f32) -> WorldSprite {
        WorldSprite {
            bounds: Aabb::new(Vec2::new(0.0, foot_y + 0.5), Vec2::new(0.5, 0.5)),
            color: [255, 255, 255, 255],
            outline: None,
            layer,
            sort_offset: 0,
        }
    }

    #[test]
    fn draw_indices_sort_by_layer_then_foot() {
        let sprites = vec![
            sprite(DrawLayer::Props, -1.0),
            sprite(DrawLayer::Background, -3.0),
            sprite(DrawLayer::Props, 0.5),
        ];
        let mut order = Vec::new();
        sorted_draw_indices(&sprites, &mut order);
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn clipped_writes_ignore_out_of_bounds() {
        let mut tiny = vec![0u8; 4];
        write_pixel_rgba_clipped(&mut tiny, 1, -1, 0, [1, 2, 3, 255]);
        write_pixel_rgba_clipped(&mut tiny, 1, 1, 0, [1, 2, 3, 255]);
        write_pixel_rgba_clipped(&mut tiny, 1, 0, 5, [1, 2, 3, 255]);
        assert_eq!(tiny, vec![0, 0, 0, 0]);

        write_pixel_rgba_clipped(&mut tiny, 1, 0, 0, [1, 2, 3, 255]);
        assert_eq!(tiny, vec![1, 2, 3, 255]);
    }

    #[test]
    fn translucent_color_blends_with_frame() {
        let mut px = vec![0u8, 0, 0, 255];
        write_pixel_rgba_clipped(&mut px, 1, 0, 0, [255, 255, 255, 51]);
        assert_eq!(&px[..3], &[51, 51, 51]);
    }

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut frame = vec![0u8; 2 * 2 * 4];
        let rect = ScreenRectPx {
            left: -5,
            right: 10,
            top: 1,
            bottom: 10,
        };
        fill_rect(&mut frame, 2, 2, rect, [9, 9, 9, 255]);
        assert_eq!(&frame[0..8], &[0; 8]);
        assert_eq!(&frame[8..16], &[9, 9, 9, 255, 9, 9, 9, 255]);
    }

    #[test]
    fn hud_rect_uses_width_and_height() {
        let rect = hud_screen_rect(&HudRect {
            left: 4,
            top: 6,
            width: 10,
            height: -3,
            color: [0, 0, 0, 255],
        });
        assert_eq!(rect.right, 13);
        assert_eq!(rect.bottom, 6);
    }
}
