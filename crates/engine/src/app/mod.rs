mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{DragGesture, InputAction, DRAG_THRESHOLD_PX};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{screen_to_world_px, world_to_screen, world_to_screen_px, Renderer, Viewport};
pub use scene::{
    Aabb, Camera2D, DrawLayer, HudRect, InputSnapshot, Scene, SceneCommand, SceneWorld, Vec2,
    WorldSprite, DEFAULT_VIEW_WIDTH_WORLD,
};
