mod agent;
mod animation;
mod collision;
mod pet;
mod rooms;
mod sleep;
mod status;
mod viewport;
mod wander;

use pethouse_engine::{Aabb, Vec2};
use rand::rngs::SmallRng;
use tracing::{debug, info};

pub(crate) use agent::{AgentTuning, Locomotion, SleepState};
pub(crate) use animation::{AnimationTuning, AnimatorSlot, ClipAnimator};
pub(crate) use collision::{BlockingSurface, CollisionProbe};
pub(crate) use rooms::{RoomLimitsTuning, RoomSpec};
pub(crate) use sleep::SleepTuning;
pub(crate) use status::{default_statuses, StatusConfig, StatusKind, HEART_COUNT};
pub(crate) use viewport::{ScrollHandle, ViewportPhase, ViewportTuning};
pub(crate) use wander::WanderTuning;

use self::agent::Agent;
use self::pet::Pet;
use self::rooms::{RoomBoundsManager, RoomSet};
use self::sleep::{SleepReason, SleepWakeController};
use self::status::StatusBoard;
use self::viewport::ViewportScrollController;
use self::wander::WanderController;
use super::tuning::PetTuning;

/// Scene geometry in background space, as read from the house definition.
#[derive(Debug, Clone, Default)]
pub(crate) struct HouseLayout {
    pub(crate) rooms: Vec<RoomSpec>,
    pub(crate) fallback_room_width: f32,
    pub(crate) furniture: Vec<BlockingSurface>,
    pub(crate) bed: Option<Vec2>,
}

/// Everything the pet scene simulates: the pet, the viewport and the status board.
#[derive(Debug)]
pub(crate) struct Habitat {
    clock: f64,
    pet: Pet,
    viewport: ViewportScrollController,
    statuses: StatusBoard,
    furniture: Vec<BlockingSurface>,
    world_surfaces: Vec<BlockingSurface>,
    bed: Option<Vec2>,
    bed_raise: f32,
    feed_amount: f32,
}

impl Habitat {
    pub(crate) fn new(
        tuning: &PetTuning,
        layout: HouseLayout,
        rng: SmallRng,
        animator: AnimatorSlot,
    ) -> Self {
        let rooms = RoomSet::from_specs(&layout.rooms, layout.fallback_room_width);
        let viewport = ViewportScrollController::new(tuning.viewport, rooms.clone());

        let mut bounds = RoomBoundsManager::new(tuning.room_limits, &rooms);
        let active = rooms.room(viewport.active_room());
        bounds.set_active_room(active.center_x + viewport.offset(), active.width);

        let mut agent = Agent::new(tuning.agent);
        agent.position = bounds.clamp(agent.position);

        let pet = Pet {
            agent,
            wander: WanderController::new(tuning.wander, rng),
            sleep: SleepWakeController::new(tuning.sleep.clone()),
            bounds,
            probe: tuning.probe.clone(),
            animator,
            camera_x: 0.0,
        };

        info!(
            rooms = rooms.len(),
            furniture = layout.furniture.len(),
            bed = layout.bed.is_some(),
            animator = pet.animator.is_present(),
            "habitat_ready"
        );

        let mut habitat = Self {
            clock: 0.0,
            pet,
            viewport,
            statuses: StatusBoard::new(&tuning.statuses),
            world_surfaces: Vec::with_capacity(layout.furniture.len()),
            furniture: layout.furniture,
            bed: layout.bed,
            bed_raise: tuning.bed_raise,
            feed_amount: tuning.feed_amount,
        };
        habitat.refresh_world_surfaces();
        habitat
    }

    pub(crate) fn clock(&self) -> f64 {
        self.clock
    }

    pub(crate) fn agent(&self) -> &Agent {
        &self.pet.agent
    }

    pub(crate) fn viewport(&self) -> &ViewportScrollController {
        &self.viewport
    }

    pub(crate) fn statuses(&self) -> &StatusBoard {
        &self.statuses
    }

    #[cfg(test)]
    pub(crate) fn furniture(&self) -> &[BlockingSurface] {
        &self.furniture
    }

    pub(crate) fn bed(&self) -> Option<Vec2> {
        self.bed
    }

    #[cfg(test)]
    pub(crate) fn room_limits(&self) -> (f32, f32, f32, f32) {
        self.pet.bounds.limits()
    }

    /// Where the agent is drawn: its position carried along with the background while attached.
    pub(crate) fn agent_render_position(&self) -> Vec2 {
        self.pet
            .agent
            .position
            .add(Vec2::new(self.viewport.attachment_offset(), 0.0))
    }

    pub(crate) fn agent_hitbox(&self) -> Option<Aabb> {
        self.pet.agent.active_hitbox()
    }

    pub(crate) fn begin_drag(&mut self) {
        self.pet.sleep.register_input(&mut self.pet.agent, self.clock);
        self.viewport.begin_drag(&mut self.pet);
    }

    pub(crate) fn drag(&mut self, delta_x_px: f32) {
        self.viewport.drag(delta_x_px);
    }

    pub(crate) fn end_drag(&mut self) {
        self.viewport.end_drag();
    }

    /// Returns true when the tap landed on the agent's active hitbox.
    pub(crate) fn tap(&mut self, world_point: Vec2) -> bool {
        let Some(hitbox) = self.pet.agent.active_hitbox() else {
            return false;
        };
        if !hitbox.contains(world_point) {
            return false;
        }
        self.pet.sleep.register_input(&mut self.pet.agent, self.clock);
        let waking = self
            .pet
            .sleep
            .request_wake(&mut self.pet.agent, &mut self.pet.animator);
        debug!(x = world_point.x, y = world_point.y, waking, "agent_tapped");
        true
    }

    pub(crate) fn command_sleep(&mut self) {
        self.pet
            .sleep
            .command_sleep(&mut self.pet.agent, &mut self.pet.animator, SleepReason::Command);
    }

    pub(crate) fn feed(&mut self) {
        self.statuses.feed(self.feed_amount);
    }

    #[cfg(test)]
    pub(crate) fn add_status(&mut self, kind: StatusKind, amount: f32) -> Option<f32> {
        self.statuses.add_status(kind, amount)
    }

    /// Animation event: lie down on the bed, if the house has one.
    pub(crate) fn force_move_to_bed(&mut self) {
        let Some(bed) = self.bed else {
            debug!("force_move_to_bed_without_bed");
            return;
        };
        let target = Vec2::new(bed.x + self.viewport.offset(), bed.y + self.bed_raise);
        self.pet.place_at(target);
        info!(x = target.x, y = target.y, "agent_moved_to_bed");
    }

    /// Animation event: stand at the rest point.
    pub(crate) fn wake_up_place(&mut self) {
        let target = self.pet.sleep.tuning().rest_point;
        self.pet.place_at(target);
        info!(x = target.x, y = target.y, "agent_wake_up_placed");
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += f64::from(dt);
        self.statuses.tick(dt);

        if let Some(room) = self.viewport.tick(dt, &mut self.pet) {
            debug!(room, "room_entered");
        }
        self.refresh_world_surfaces();
        self.pet.tick(self.clock, dt, &self.world_surfaces);
    }

    fn refresh_world_surfaces(&mut self) {
        let offset = self.viewport.offset();
        self.world_surfaces.clear();
        self.world_surfaces
            .extend(self.furniture.iter().map(|surface| surface.translated_x(offset)));
    }

    pub(crate) fn world_surfaces(&self) -> &[BlockingSurface] {
        &self.world_surfaces
    }
}
