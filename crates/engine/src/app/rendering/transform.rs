use crate::app::{Camera2D, Vec2};

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub fn world_to_screen(
    world: Vec2,
    camera: &Camera2D,
    viewport: Viewport,
    pixels_per_world: f32,
) -> (i32, i32) {
    let x = (world.x - camera.position.x) * pixels_per_world + viewport.width as f32 * 0.5;
    let y = viewport.height as f32 * 0.5 - (world.y - camera.position.y) * pixels_per_world;
    (x.round() as i32, y.round() as i32)
}

pub fn world_to_screen_px(camera: &Camera2D, window_size: (u32, u32), world: Vec2) -> (i32, i32) {
    let viewport = Viewport {
        width: window_size.0,
        height: window_size.1,
    };
    world_to_screen(
        world,
        camera,
        viewport,
        camera.pixels_per_world(window_size.0),
    )
}

pub fn screen_to_world_px(camera: &Camera2D, window_size: (u32, u32), screen_px: Vec2) -> Vec2 {
    let pixels_per_world = camera.pixels_per_world(window_size.0);
    let x = (screen_px.x - window_size.0 as f32 * 0.5) / pixels_per_world + camera.position.x;
    let y = (window_size.1 as f32 * 0.5 - screen_px.y) / pixels_per_world + camera.position.y;
    Vec2 { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_viewport_center() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let camera = Camera2D::default();
        let (x, y) = world_to_screen(Vec2 { x: 0.0, y: 0.0 }, &camera, viewport, 32.0);
        assert_eq!(x, 400);
        assert_eq!(y, 300);
    }

    #[test]
    fn camera_offset_shifts_screen_position() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let camera = Camera2D {
            position: Vec2 { x: 10.0, y: -5.0 },
            view_width_world: 4.5,
        };
        let (x, y) = world_to_screen(Vec2 { x: 12.0, y: -4.0 }, &camera, viewport, 10.0);
        assert_eq!(x, 420);
        assert_eq!(y, 290);
    }

    #[test]
    fn view_width_spans_window() {
        let camera = Camera2D {
            position: Vec2::ZERO,
            view_width_world: 4.0,
        };
        let (left, _) = world_to_screen_px(&camera, (400, 800), Vec2 { x: -2.0, y: 0.0 });
        let (right, _) = world_to_screen_px(&camera, (400, 800), Vec2 { x: 2.0, y: 0.0 });
        assert_eq!(left, 0);
        assert_eq!(right, 400);
    }

    #[test]
    fn screen_to_world_inverts_world_to_screen() {
        let camera = Camera2D {
            position: Vec2 { x: 1.5, y: -0.5 },
            view_width_world: 4.5,
        };
        let world = screen_to_world_px(&camera, (540, 960), Vec2 { x: 100.0, y: 700.0 });
        let (x, y) = world_to_screen_px(&camera, (540, 960), world);
        assert_eq!((x, y), (100, 700));
    }
}
