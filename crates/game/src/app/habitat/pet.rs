use pethouse_engine::Vec2;
use tracing::debug;

use super::agent::{Agent, AgentControl};
use super::animation::AnimatorSlot;
use super::collision::{BlockingSurface, CollisionProbe};
use super::rooms::RoomBoundsManager;
use super::sleep::SleepWakeController;
use super::wander::{StepOutcome, WanderController};

/// The agent plus the controllers and references that drive it each frame.
#[derive(Debug)]
pub(crate) struct Pet {
    pub(crate) agent: Agent,
    pub(crate) wander: WanderController,
    pub(crate) sleep: SleepWakeController,
    pub(crate) bounds: RoomBoundsManager,
    pub(crate) probe: CollisionProbe,
    pub(crate) animator: AnimatorSlot,
    pub(crate) camera_x: f32,
}

impl Pet {
    pub(crate) fn tick(
        &mut self,
        clock: f64,
        dt: f32,
        surfaces: &[BlockingSurface],
    ) -> StepOutcome {
        self.sleep.tick(&mut self.agent, &mut self.animator, clock, dt);
        let outcome = self.wander.tick(
            &mut self.agent,
            &self.bounds,
            &self.probe,
            surfaces,
            &mut self.animator,
            dt,
        );
        self.animator.advance(dt);
        outcome
    }

    pub(crate) fn place_at(&mut self, position: Vec2) {
        self.agent.position = position;
    }
}

impl AgentControl for Pet {
    fn freeze(&mut self) {
        self.agent.freeze();
        self.animator.set_walking(false);
        self.animator.set_speed(0.0);
    }

    fn unfreeze(&mut self) {
        self.agent.unfreeze();
        self.animator.set_speed(1.0);
    }

    fn is_sleeping(&self) -> bool {
        self.agent.is_sleeping()
    }

    fn teleport_to_room(&mut self, room_index: usize) {
        let target = self.bounds.safe_point(room_index, self.camera_x, self.agent.position);
        self.agent.position = self.bounds.clamp(target);
        debug!(room = room_index, x = target.x, y = target.y, "agent_teleported");
    }

    fn set_room_limits(&mut self, center_x: f32, width: f32) {
        self.bounds.set_active_room(center_x, width);
    }
}
