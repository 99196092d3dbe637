use serde::{Deserialize, Serialize};

use super::input::{ActionStates, DragGesture, InputAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    tap_px: Option<Vec2>,
    drag: DragGesture,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        tap_px: Option<Vec2>,
        drag: DragGesture,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            tap_px,
            drag,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// True only on the frame the key went down.
    pub fn pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_tap_px(mut self, tap_px: Option<Vec2>) -> Self {
        self.tap_px = tap_px;
        self
    }

    pub fn with_drag(mut self, drag: DragGesture) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn tap_px(&self) -> Option<Vec2> {
        self.tap_px
    }

    pub fn drag(&self) -> DragGesture {
        self.drag
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Unit vector in the same direction; zero stays zero.
    pub fn normalized(self) -> Vec2 {
        let len_sq = self.x * self.x + self.y * self.y;
        if len_sq <= f32::EPSILON * f32::EPSILON || !len_sq.is_finite() {
            return Vec2::ZERO;
        }
        let inv_len = len_sq.sqrt().recip();
        Vec2 {
            x: self.x * inv_len,
            y: self.y * inv_len,
        }
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn scale(self, factor: f32) -> Vec2 {
        Vec2 {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Axis-aligned box stored as center + half extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub fn min(&self) -> Vec2 {
        Vec2 {
            x: self.center.x - self.half_extents.x,
            y: self.center.y - self.half_extents.y,
        }
    }

    pub fn max(&self) -> Vec2 {
        Vec2 {
            x: self.center.x + self.half_extents.x,
            y: self.center.y + self.half_extents.y,
        }
    }

    pub fn translated(&self, offset: Vec2) -> Aabb {
        Aabb {
            center: self.center.add(offset),
            half_extents: self.half_extents,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

pub const DEFAULT_VIEW_WIDTH_WORLD: f32 = 4.5;

#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    /// Horizontal world span shown across the window.
    pub view_width_world: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            view_width_world: DEFAULT_VIEW_WIDTH_WORLD,
        }
    }
}

impl Camera2D {
    pub fn pixels_per_world(&self, window_width: u32) -> f32 {
        let view_width = if self.view_width_world.is_finite() && self.view_width_world > 0.0 {
            self.view_width_world
        } else {
            DEFAULT_VIEW_WIDTH_WORLD
        };
        window_width.max(1) as f32 / view_width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DrawLayer {
    Background,
    Props,
    Foreground,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldSprite {
    pub bounds: Aabb,
    pub color: [u8; 4],
    pub outline: Option<[u8; 4]>,
    pub layer: DrawLayer,
    pub sort_offset: i32,
}

impl WorldSprite {
    /// Lower feet draw later; matches a y-sorted 2D stage.
    pub fn draw_order(&self) -> (DrawLayer, i32) {
        let foot_y = self.bounds.min().y;
        (self.layer, self.sort_offset - (foot_y * 100.0).round() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub color: [u8; 4],
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    camera: Camera2D,
    window_size: (u32, u32),
    sprites: Vec<WorldSprite>,
    hud: Vec<HudRect>,
}

impl SceneWorld {
    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    pub fn clear_draw_lists(&mut self) {
        self.sprites.clear();
        self.hud.clear();
    }

    pub fn push_sprite(&mut self, sprite: WorldSprite) {
        self.sprites.push(sprite);
    }

    pub fn push_hud(&mut self, rect: HudRect) {
        self.hud.push(rect);
    }

    pub fn sprites(&self) -> &[WorldSprite] {
        &self.sprites
    }

    pub fn hud(&self) -> &[HudRect] {
        &self.hud
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        frame_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite_at(layer: DrawLayer, center_y: f32, half_height: f32) -> WorldSprite {
        WorldSprite {
            bounds: Aabb::new(Vec2::new(0.0, center_y), Vec2::new(0.5, half_height)),
            color: [0, 0, 0, 255],
            outline: None,
            layer,
            sort_offset: 0,
        }
    }

    #[test]
    fn normalized_zero_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    }

    #[test]
    fn normalized_has_unit_length() {
        let v = Vec2::new(1.0, 0.3).normalized();
        assert!((v.length() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn aabb_contains_edges() {
        let b = Aabb::new(Vec2::new(1.0, 1.0), Vec2::new(0.5, 0.25));
        assert!(b.contains(Vec2::new(1.5, 1.25)));
        assert!(!b.contains(Vec2::new(1.51, 1.0)));
    }

    #[test]
    fn lower_feet_sort_after_higher_feet() {
        let back = sprite_at(DrawLayer::Props, 1.0, 0.2);
        let front = sprite_at(DrawLayer::Props, -1.0, 0.2);
        assert!(back.draw_order() < front.draw_order());
    }

    #[test]
    fn layer_dominates_foot_position() {
        let background = sprite_at(DrawLayer::Background, -5.0, 0.2);
        let prop = sprite_at(DrawLayer::Props, 5.0, 0.2);
        assert!(background.draw_order() < prop.draw_order());
    }

    #[test]
    fn pixels_per_world_falls_back_for_invalid_view_width() {
        let camera = Camera2D {
            position: Vec2::ZERO,
            view_width_world: 0.0,
        };
        let expected = 450.0 / DEFAULT_VIEW_WIDTH_WORLD;
        assert!((camera.pixels_per_world(450) - expected).abs() < 0.0001);
    }
}
