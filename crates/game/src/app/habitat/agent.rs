use pethouse_engine::{Aabb, Vec2};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Locomotion {
    Idle,
    Walking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SleepState {
    Awake,
    Sleeping,
    Waking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColliderMode {
    Standing,
    Sleeping,
}

/// Hitbox shapes relative to the agent position.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AgentTuning {
    pub(crate) spawn: Vec2,
    pub(crate) body_half_extents: Vec2,
    pub(crate) foot_offset: Vec2,
    pub(crate) foot_half_extents: Vec2,
    pub(crate) click_half_extents: Vec2,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(0.0, -0.72),
            body_half_extents: Vec2::new(0.32, 0.4),
            foot_offset: Vec2::new(0.0, -0.34),
            foot_half_extents: Vec2::new(0.16, 0.06),
            click_half_extents: Vec2::new(0.5, 0.45),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hitboxes {
    pub(crate) foot: Option<Aabb>,
    pub(crate) click: Option<Aabb>,
}

#[derive(Debug, Clone)]
pub(crate) struct Agent {
    pub(crate) position: Vec2,
    direction: Vec2,
    locomotion: Locomotion,
    pub(crate) sleep_state: SleepState,
    collider_mode: ColliderMode,
    pub(crate) last_input_time: f64,
    movement_frozen: bool,
    shape: AgentTuning,
}

impl Agent {
    pub(crate) fn new(shape: AgentTuning) -> Self {
        Self {
            position: shape.spawn,
            direction: Vec2::ZERO,
            locomotion: Locomotion::Idle,
            sleep_state: SleepState::Awake,
            collider_mode: ColliderMode::Standing,
            last_input_time: 0.0,
            movement_frozen: false,
            shape,
        }
    }

    pub(crate) fn direction(&self) -> Vec2 {
        self.direction
    }

    pub(crate) fn locomotion(&self) -> Locomotion {
        self.locomotion
    }

    #[cfg(test)]
    pub(crate) fn collider_mode(&self) -> ColliderMode {
        self.collider_mode
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.movement_frozen
    }

    pub(crate) fn is_sleeping(&self) -> bool {
        self.sleep_state != SleepState::Awake
    }

    /// Walking iff the direction is non-zero.
    pub(crate) fn set_direction(&mut self, direction: Vec2) {
        self.direction = direction;
        self.locomotion = if direction.is_zero() {
            Locomotion::Idle
        } else {
            Locomotion::Walking
        };
    }

    pub(crate) fn set_collider_mode(&mut self, mode: ColliderMode) {
        self.collider_mode = mode;
    }

    pub(crate) fn freeze(&mut self) {
        self.movement_frozen = true;
        self.set_direction(Vec2::ZERO);
    }

    pub(crate) fn unfreeze(&mut self) {
        self.movement_frozen = false;
        self.collider_mode = if self.is_sleeping() {
            ColliderMode::Sleeping
        } else {
            ColliderMode::Standing
        };
    }

    pub(crate) fn body_bounds(&self) -> Aabb {
        Aabb::new(self.position, self.shape.body_half_extents)
    }

    /// Ground-contact box; the probe casts from here even when the hitbox is disabled.
    pub(crate) fn foot_bounds(&self) -> Aabb {
        Aabb::new(
            self.position.add(self.shape.foot_offset),
            self.shape.foot_half_extents,
        )
    }

    pub(crate) fn click_bounds(&self) -> Aabb {
        Aabb::new(self.position, self.shape.click_half_extents)
    }

    /// Enabled hitboxes: none while frozen, otherwise the pair matching the collider mode.
    pub(crate) fn hitboxes(&self) -> Hitboxes {
        if self.movement_frozen {
            return Hitboxes {
                foot: None,
                click: None,
            };
        }
        match self.collider_mode {
            ColliderMode::Standing => Hitboxes {
                foot: Some(self.foot_bounds()),
                click: None,
            },
            ColliderMode::Sleeping => Hitboxes {
                foot: None,
                click: Some(self.click_bounds()),
            },
        }
    }

    pub(crate) fn active_hitbox(&self) -> Option<Aabb> {
        let hitboxes = self.hitboxes();
        hitboxes.click.or(hitboxes.foot)
    }
}

/// What the viewport controller may do to the agent during room transitions.
pub(crate) trait AgentControl {
    fn freeze(&mut self);
    fn unfreeze(&mut self);
    fn is_sleeping(&self) -> bool;
    fn teleport_to_room(&mut self, room_index: usize);
    fn set_room_limits(&mut self, center_x: f32, width: f32);
}
