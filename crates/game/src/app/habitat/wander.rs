use pethouse_engine::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::Deserialize;

use super::agent::Agent;
use super::animation::AnimatorSlot;
use super::collision::{BlockingSurface, CollisionProbe};
use super::rooms::RoomBoundsManager;

const DIRECTION_CANDIDATES: [Vec2; 7] = [
    Vec2::new(-1.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.3),
    Vec2::new(1.0, 0.3),
    Vec2::new(-1.0, -0.3),
    Vec2::new(1.0, -0.3),
    Vec2::ZERO,
];

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WanderTuning {
    /// Sprite pixels per second.
    pub(crate) move_speed: f32,
    pub(crate) pixels_per_unit: f32,
    pub(crate) idle_seconds: [f32; 2],
    pub(crate) walk_seconds: [f32; 2],
    pub(crate) walk_scale: [f32; 2],
    pub(crate) keep_probability: f32,
    pub(crate) jitter_x: f32,
    pub(crate) jitter_y: f32,
    pub(crate) initial_decision_seconds: f32,
}

impl Default for WanderTuning {
    fn default() -> Self {
        Self {
            move_speed: 30.0,
            pixels_per_unit: 16.0,
            idle_seconds: [2.0, 3.0],
            walk_seconds: [3.0, 5.0],
            walk_scale: [1.3, 1.6],
            keep_probability: 0.7,
            jitter_x: 0.3,
            jitter_y: 0.1,
            initial_decision_seconds: 2.0,
        }
    }
}

impl WanderTuning {
    pub(crate) fn units_per_second(&self) -> f32 {
        self.move_speed / self.pixels_per_unit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// Frozen or not awake; nothing touched.
    Skipped,
    Idle,
    Blocked,
    Moved,
}

#[derive(Debug, Clone)]
pub(crate) struct WanderController {
    tuning: WanderTuning,
    timer: f32,
    decision_time: f32,
    rng: SmallRng,
}

impl WanderController {
    pub(crate) fn new(tuning: WanderTuning, rng: SmallRng) -> Self {
        Self {
            decision_time: tuning.initial_decision_seconds,
            tuning,
            timer: 0.0,
            rng,
        }
    }

    #[cfg(test)]
    pub(crate) fn decision_time(&self) -> f32 {
        self.decision_time
    }

    pub(crate) fn tick(
        &mut self,
        agent: &mut Agent,
        bounds: &RoomBoundsManager,
        probe: &CollisionProbe,
        surfaces: &[BlockingSurface],
        animator: &mut AnimatorSlot,
        dt: f32,
    ) -> StepOutcome {
        if agent.is_frozen() || agent.is_sleeping() {
            return StepOutcome::Skipped;
        }

        self.timer += dt;
        if self.timer >= self.decision_time {
            self.timer = 0.0;
            let next = self.decide(agent.direction());
            agent.set_direction(next);
            self.decision_time = self.sample_decision_time(next);
        }

        let direction = agent.direction();
        animator.set_walking(!direction.is_zero());
        if direction.is_zero() {
            return StepOutcome::Idle;
        }

        if probe.is_blocked(&agent.foot_bounds(), direction, surfaces) {
            // Wait for the next scheduled decision instead of re-deciding now.
            agent.set_direction(Vec2::ZERO);
            animator.set_walking(false);
            return StepOutcome::Blocked;
        }

        let step = direction
            .normalized()
            .scale(self.tuning.units_per_second() * dt);
        agent.position = bounds.clamp(agent.position.add(step));
        StepOutcome::Moved
    }

    /// Keep-and-jitter or a fresh pick from the candidate set; result is unit length or zero.
    /// Only a moving agent keeps its heading, so idle always re-picks from the candidates.
    pub(crate) fn decide(&mut self, current: Vec2) -> Vec2 {
        if !current.is_zero() && self.rng.random::<f32>() < self.tuning.keep_probability {
            let jitter = Vec2::new(
                sample_range(&mut self.rng, -self.tuning.jitter_x, self.tuning.jitter_x),
                sample_range(&mut self.rng, -self.tuning.jitter_y, self.tuning.jitter_y),
            );
            return current.add(jitter).normalized();
        }
        let pick = self.rng.random_range(0..DIRECTION_CANDIDATES.len());
        DIRECTION_CANDIDATES[pick].normalized()
    }

    fn sample_decision_time(&mut self, direction: Vec2) -> f32 {
        if direction.is_zero() {
            let [min, max] = self.tuning.idle_seconds;
            sample_range(&mut self.rng, min, max)
        } else {
            let [min, max] = self.tuning.walk_seconds;
            let [low_scale, high_scale] = self.tuning.walk_scale;
            sample_range(&mut self.rng, min * low_scale, max * high_scale)
        }
    }
}

fn sample_range(rng: &mut SmallRng, min: f32, max: f32) -> f32 {
    if min < max {
        rng.random_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use pethouse_engine::Aabb;
    use rand::SeedableRng;

    use super::*;
    use crate::app::habitat::agent::AgentTuning;
    use crate::app::habitat::collision::BLOCKING_LAYER;
    use crate::app::habitat::rooms::{RoomLimitsTuning, RoomSet, RoomSpec};

    fn controller(seed: u64) -> WanderController {
        WanderController::new(WanderTuning::default(), SmallRng::seed_from_u64(seed))
    }

    fn bounds() -> RoomBoundsManager {
        let rooms = RoomSet::from_specs(
            &[RoomSpec {
                width: 4.0,
                safe_y: None,
            }],
            4.0,
        );
        let mut bounds = RoomBoundsManager::new(RoomLimitsTuning::default(), &rooms);
        bounds.set_active_room(0.0, 4.0);
        bounds
    }

    #[test]
    fn decisions_never_exceed_unit_length() {
        let mut wander = controller(7);
        let mut current = Vec2::new(1.0, 0.0);
        for _ in 0..500 {
            current = wander.decide(current);
            assert!(current.length() <= 1.0 + 0.0001);
        }
    }

    #[test]
    fn idle_decisions_come_from_candidate_set() {
        let mut wander = controller(1);
        let draws = 10_000;
        let mut idle = 0;
        for _ in 0..draws {
            let next = wander.decide(Vec2::ZERO);
            if next.is_zero() {
                idle += 1;
                continue;
            }
            assert!((next.length() - 1.0).abs() < 0.0001);
            assert!(next.y.abs() <= 0.3 * next.x.abs() + 0.0001, "too steep: {next:?}");
        }
        let idle_share = idle as f32 / draws as f32;
        assert!((0.11..0.18).contains(&idle_share), "idle share {idle_share}");
    }

    #[test]
    fn same_seed_gives_same_decisions() {
        let mut a = controller(42);
        let mut b = controller(42);
        for _ in 0..50 {
            assert_eq!(a.decide(Vec2::new(-1.0, 0.0)), b.decide(Vec2::new(-1.0, 0.0)));
        }
    }

    #[test]
    fn decision_time_ranges_follow_direction() {
        let mut wander = controller(3);
        for _ in 0..200 {
            let idle = wander.sample_decision_time(Vec2::ZERO);
            assert!((2.0..3.0).contains(&idle));
            let walk = wander.sample_decision_time(Vec2::new(1.0, 0.0));
            assert!((3.9..8.0).contains(&walk));
        }
    }

    #[test]
    fn step_moves_at_configured_speed() {
        let mut wander = controller(1);
        let mut agent = Agent::new(AgentTuning::default());
        agent.position = Vec2::new(0.0, 0.0);
        agent.set_direction(Vec2::new(1.0, 0.0));
        let mut animator = AnimatorSlot::default();

        let outcome = wander.tick(
            &mut agent,
            &bounds(),
            &CollisionProbe::default(),
            &[],
            &mut animator,
            0.1,
        );

        assert_eq!(outcome, StepOutcome::Moved);
        assert!((agent.position.x - 30.0 / 16.0 * 0.1).abs() < 0.0001);
    }

    #[test]
    fn frozen_agent_does_not_move() {
        let mut wander = controller(9);
        let mut agent = Agent::new(AgentTuning::default());
        agent.set_direction(Vec2::new(1.0, 0.0));
        agent.freeze();
        let start = agent.position;
        let mut animator = AnimatorSlot::default();

        for _ in 0..300 {
            let outcome = wander.tick(
                &mut agent,
                &bounds(),
                &CollisionProbe::default(),
                &[],
                &mut animator,
                0.05,
            );
            assert_eq!(outcome, StepOutcome::Skipped);
            assert_eq!(agent.position, start);
            assert!(agent.direction().is_zero());
        }
    }

    #[test]
    fn blocked_step_leaves_position_and_zeroes_direction() {
        let mut wander = controller(5);
        let mut agent = Agent::new(AgentTuning::default());
        agent.position = Vec2::new(0.0, 0.0);
        agent.set_direction(Vec2::new(1.0, 0.0));
        let foot = agent.foot_bounds();
        let wall = BlockingSurface {
            name: "dresser".to_string(),
            layer: BLOCKING_LAYER.to_string(),
            bounds: Aabb::new(
                Vec2::new(foot.center.x + 0.4, foot.center.y),
                Vec2::new(0.3, 0.3),
            ),
        };
        let mut animator = AnimatorSlot::default();
        let before_decision = wander.decision_time();

        let outcome = wander.tick(
            &mut agent,
            &bounds(),
            &CollisionProbe::default(),
            &[wall],
            &mut animator,
            0.016,
        );

        assert_eq!(outcome, StepOutcome::Blocked);
        assert_eq!(agent.position, Vec2::new(0.0, 0.0));
        assert!(agent.direction().is_zero());
        assert!((wander.decision_time() - before_decision).abs() < f32::EPSILON);
    }

    #[test]
    fn position_stays_within_room_limits() {
        let mut wander = controller(11);
        let mut agent = Agent::new(AgentTuning::default());
        let bounds = bounds();
        let (left, right, bottom, top) = bounds.limits();
        let mut animator = AnimatorSlot::default();

        for _ in 0..5_000 {
            wander.tick(
                &mut agent,
                &bounds,
                &CollisionProbe::default(),
                &[],
                &mut animator,
                0.05,
            );
            assert!(agent.position.x >= left && agent.position.x <= right);
            assert!(agent.position.y >= bottom && agent.position.y <= top);
        }
    }
}
