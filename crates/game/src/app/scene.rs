use pethouse_engine::{
    screen_to_world_px, Aabb, Camera2D, DrawLayer, HudRect, InputAction, InputSnapshot, Scene,
    SceneCommand, SceneWorld, Vec2, WorldSprite,
};
use tracing::info;

use super::habitat::{
    Habitat, Locomotion, ScrollHandle, SleepState, StatusKind, ViewportPhase, HEART_COUNT,
};

const ROOM_HALF_HEIGHT: f32 = 2.2;
const ROOM_COLORS: [[u8; 4]; 3] = [
    [214, 196, 170, 255],
    [188, 205, 178, 255],
    [176, 190, 214, 255],
];
const BACKDROP_TILE_WIDTH: f32 = 1.5;
const BACKDROP_CENTER_Y: f32 = 3.2;
const BACKDROP_HALF_HEIGHT: f32 = 1.0;
const BACKDROP_COLORS: [[u8; 4]; 2] = [[92, 104, 140, 255], [108, 122, 160, 255]];
const BACKDROP_SORT_OFFSET: i32 = -10_000;
const FURNITURE_COLOR: [u8; 4] = [120, 84, 58, 255];
const BED_COLOR: [u8; 4] = [170, 96, 120, 255];
const BED_HALF_EXTENTS: Vec2 = Vec2::new(0.6, 0.22);
const HITBOX_OUTLINE: [u8; 4] = [255, 236, 90, 255];
const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

const TRACK_HEIGHT_PX: i32 = 6;
const TRACK_BOTTOM_GAP_PX: i32 = 36;
const HANDLE_SIZE_PX: (i32, i32) = (28, 16);
const TRACK_COLOR: [u8; 4] = [70, 62, 80, 255];
const HANDLE_COLOR: [u8; 4] = [236, 228, 244, 255];

const HEART_SIZE_PX: i32 = 16;
const HEART_GAP_PX: i32 = 4;
const HEART_ROW_GAP_PX: i32 = 6;
const HEART_EMPTY_COLOR: [u8; 4] = [60, 48, 56, 255];

pub(crate) struct PetScene {
    habitat: Habitat,
}

impl PetScene {
    pub(crate) fn new(habitat: Habitat) -> Self {
        Self { habitat }
    }

    fn apply_input(&mut self, input: &InputSnapshot, camera: &Camera2D) {
        let drag = input.drag();
        if drag.began {
            self.habitat.begin_drag();
        }
        if drag.delta_x != 0.0 {
            self.habitat.drag(drag.delta_x);
        }
        if drag.ended {
            self.habitat.end_drag();
        }

        if let Some(tap_px) = input.tap_px() {
            let world_point = screen_to_world_px(camera, input.window_size(), tap_px);
            self.habitat.tap(world_point);
        }

        if input.pressed(InputAction::SleepCommand) {
            self.habitat.command_sleep();
        }
        if input.pressed(InputAction::Feed) {
            self.habitat.feed();
        }
        if input.pressed(InputAction::ForceMoveToBed) {
            self.habitat.force_move_to_bed();
        }
        if input.pressed(InputAction::WakeUpPlace) {
            self.habitat.wake_up_place();
        }
    }

    /// Striped backdrop over the whole room span, shifted by the parallax offset.
    fn push_backdrop(&self, world: &mut SceneWorld) {
        let viewport = self.habitat.viewport();
        let rooms = viewport.rooms().rooms();
        let (Some(first), Some(last)) = (rooms.first(), rooms.last()) else {
            return;
        };
        let left = first.center_x - first.width * 0.5;
        let right = last.center_x + last.width * 0.5;
        let tiles = ((right - left) / BACKDROP_TILE_WIDTH).ceil().max(1.0) as usize;
        for tile in 0..tiles {
            let center_x =
                left + (tile as f32 + 0.5) * BACKDROP_TILE_WIDTH + viewport.parallax_offset();
            world.push_sprite(WorldSprite {
                bounds: Aabb::new(
                    Vec2::new(center_x, BACKDROP_CENTER_Y),
                    Vec2::new(BACKDROP_TILE_WIDTH * 0.5, BACKDROP_HALF_HEIGHT),
                ),
                color: BACKDROP_COLORS[tile % BACKDROP_COLORS.len()],
                outline: None,
                layer: DrawLayer::Background,
                sort_offset: BACKDROP_SORT_OFFSET,
            });
        }
    }

    fn push_rooms(&self, world: &mut SceneWorld) {
        let viewport = self.habitat.viewport();
        for room in viewport.rooms().rooms() {
            world.push_sprite(WorldSprite {
                bounds: Aabb::new(
                    Vec2::new(room.center_x + viewport.offset(), 0.0),
                    Vec2::new(room.width * 0.5, ROOM_HALF_HEIGHT),
                ),
                color: ROOM_COLORS[room.index % ROOM_COLORS.len()],
                outline: None,
                layer: DrawLayer::Background,
                sort_offset: 0,
            });
        }
    }

    fn push_props(&self, world: &mut SceneWorld) {
        for surface in self.habitat.world_surfaces() {
            world.push_sprite(WorldSprite {
                bounds: surface.bounds,
                color: FURNITURE_COLOR,
                outline: None,
                layer: DrawLayer::Props,
                sort_offset: 0,
            });
        }
        if let Some(bed) = self.habitat.bed() {
            let center = Vec2::new(bed.x + self.habitat.viewport().offset(), bed.y);
            world.push_sprite(WorldSprite {
                bounds: Aabb::new(center, BED_HALF_EXTENTS),
                color: BED_COLOR,
                outline: None,
                layer: DrawLayer::Props,
                // Bed stays under a pet lying on it.
                sort_offset: -1_000,
            });
        }
    }

    fn push_agent(&self, world: &mut SceneWorld) {
        let agent = self.habitat.agent();
        world.push_sprite(WorldSprite {
            bounds: Aabb::new(
                self.habitat.agent_render_position(),
                agent.body_bounds().half_extents,
            ),
            color: agent_color(agent.sleep_state, agent.locomotion()),
            outline: None,
            layer: DrawLayer::Props,
            sort_offset: 0,
        });
        if let Some(hitbox) = self.habitat.agent_hitbox() {
            world.push_sprite(WorldSprite {
                bounds: hitbox,
                color: TRANSPARENT,
                outline: Some(HITBOX_OUTLINE),
                layer: DrawLayer::Foreground,
                sort_offset: 0,
            });
        }
    }

    fn push_scroll_handle(&self, world: &mut SceneWorld) {
        let viewport = self.habitat.viewport();
        let rects = scroll_handle_rects(
            world.window_size(),
            viewport.handle(),
            viewport.handle_range(),
        );
        for rect in rects {
            world.push_hud(rect);
        }
    }

    fn push_hearts(&self, world: &mut SceneWorld) {
        let statuses = self.habitat.statuses();
        for (row, kind) in statuses.kinds().enumerate() {
            let Some(fills) = statuses.heart_fills(kind) else {
                continue;
            };
            let top = HEART_ROW_GAP_PX + row as i32 * (HEART_SIZE_PX + HEART_ROW_GAP_PX);
            for (column, fill) in fills.iter().enumerate() {
                let left = HEART_GAP_PX + column as i32 * (HEART_SIZE_PX + HEART_GAP_PX);
                world.push_hud(HudRect {
                    left,
                    top,
                    width: HEART_SIZE_PX,
                    height: HEART_SIZE_PX,
                    color: HEART_EMPTY_COLOR,
                });
                let filled = (fill * HEART_SIZE_PX as f32).round() as i32;
                if filled > 0 {
                    world.push_hud(HudRect {
                        left,
                        top,
                        width: filled,
                        height: HEART_SIZE_PX,
                        color: status_color(kind),
                    });
                }
            }
        }
    }
}

impl Scene for PetScene {
    fn load(&mut self, world: &mut SceneWorld) {
        // The camera stays put; rooms scroll underneath it.
        world.camera_mut().position = Vec2::ZERO;
        info!(
            rooms = self.habitat.viewport().rooms().len(),
            active_room = self.habitat.viewport().active_room(),
            "scene_loaded"
        );
    }

    fn update(
        &mut self,
        frame_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() || input.pressed(InputAction::Quit) {
            return SceneCommand::Quit;
        }
        let camera = *world.camera();
        self.apply_input(input, &camera);
        self.habitat.tick(frame_dt_seconds);
        SceneCommand::None
    }

    fn render(&mut self, world: &mut SceneWorld) {
        self.push_backdrop(world);
        self.push_rooms(world);
        self.push_props(world);
        self.push_agent(world);
        self.push_scroll_handle(world);
        self.push_hearts(world);
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        info!(clock = self.habitat.clock(), "scene_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let viewport = self.habitat.viewport();
        let agent = self.habitat.agent();
        let phase = match viewport.phase() {
            ViewportPhase::Idle => "idle",
            ViewportPhase::Dragging => "drag",
            ViewportPhase::Snapping(_) => "snap",
        };
        let mut title = format!(
            "Pet House | room {}/{} {phase} | {:?}/{:?} | offset {:.2}",
            viewport.active_room() + 1,
            viewport.rooms().len(),
            agent.sleep_state,
            agent.locomotion(),
            viewport.offset(),
        );
        for kind in self.habitat.statuses().kinds() {
            if let Some(value) = self.habitat.statuses().value(kind) {
                title.push_str(&format!(" | {} {value:.0}", kind.as_str()));
            }
        }
        Some(title)
    }
}

/// Track and handle, with the handle range measured from the window's horizontal centre.
fn scroll_handle_rects(
    window_size: (u32, u32),
    handle: ScrollHandle,
    (min_x, max_x): (f32, f32),
) -> [HudRect; 2] {
    let center_x = window_size.0 as f32 * 0.5;
    let track_top = window_size.1 as i32 - TRACK_BOTTOM_GAP_PX;
    let track = HudRect {
        left: (center_x + min_x).round() as i32,
        top: track_top,
        width: ((max_x - min_x).round() as i32).max(1),
        height: TRACK_HEIGHT_PX,
        color: TRACK_COLOR,
    };
    let knob = HudRect {
        left: (center_x + handle.x).round() as i32 - HANDLE_SIZE_PX.0 / 2,
        top: track_top + TRACK_HEIGHT_PX / 2 - HANDLE_SIZE_PX.1 / 2,
        width: HANDLE_SIZE_PX.0,
        height: HANDLE_SIZE_PX.1,
        color: HANDLE_COLOR,
    };
    [track, knob]
}

fn agent_color(sleep_state: SleepState, locomotion: Locomotion) -> [u8; 4] {
    match (sleep_state, locomotion) {
        (SleepState::Awake, Locomotion::Idle) => [240, 170, 90, 255],
        (SleepState::Awake, Locomotion::Walking) => [250, 200, 110, 255],
        (SleepState::Sleeping, _) => [110, 120, 190, 255],
        (SleepState::Waking, _) => [170, 140, 210, 255],
    }
}

fn status_color(kind: StatusKind) -> [u8; 4] {
    match kind {
        StatusKind::Hunger => [226, 78, 92, 255],
        StatusKind::Fun => [246, 190, 60, 255],
        StatusKind::Lone => [120, 170, 240, 255],
    }
}
