use pethouse_engine::Vec2;
use serde::Deserialize;
use tracing::{debug, info};

use super::agent::{Agent, ColliderMode, SleepState};
use super::animation::{AnimTrigger, AnimatorSlot, ClipInfo, CLIP_WAKE_UP};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SleepTuning {
    pub(crate) sleep_after_seconds: f64,
    /// Where the agent stands once the wake clip has finished.
    pub(crate) rest_point: Vec2,
    pub(crate) wake_clip: String,
}

impl Default for SleepTuning {
    fn default() -> Self {
        Self {
            sleep_after_seconds: 5.0,
            rest_point: Vec2::new(0.0, -0.72),
            wake_clip: CLIP_WAKE_UP.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SleepReason {
    IdleTimeout,
    Command,
}

impl SleepReason {
    fn as_str(self) -> &'static str {
        match self {
            SleepReason::IdleTimeout => "idle_timeout",
            SleepReason::Command => "command",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitStatus {
    Pending,
    Done,
}

/// Frame-polled wait for the wake clip to show up and then play through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum WakeWait {
    AwaitingClip,
    Playing { elapsed: f32, length: f32 },
}

impl WakeWait {
    pub(crate) fn resume(
        &mut self,
        dt: f32,
        clip: Option<ClipInfo<'_>>,
        wake_clip: &str,
    ) -> WaitStatus {
        match *self {
            WakeWait::AwaitingClip => match clip {
                Some(clip) if clip.name == wake_clip => {
                    *self = WakeWait::Playing {
                        elapsed: 0.0,
                        length: clip.length.max(0.0),
                    };
                    WaitStatus::Pending
                }
                _ => WaitStatus::Pending,
            },
            WakeWait::Playing { elapsed, length } => {
                let elapsed = elapsed + dt;
                *self = WakeWait::Playing { elapsed, length };
                if elapsed >= length {
                    WaitStatus::Done
                } else {
                    WaitStatus::Pending
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SleepWakeController {
    tuning: SleepTuning,
    wait: Option<WakeWait>,
}

impl SleepWakeController {
    pub(crate) fn new(tuning: SleepTuning) -> Self {
        Self {
            tuning,
            wait: None,
        }
    }

    pub(crate) fn tuning(&self) -> &SleepTuning {
        &self.tuning
    }

    #[cfg(test)]
    pub(crate) fn wake_pending(&self) -> bool {
        self.wait.is_some()
    }

    pub(crate) fn register_input(&self, agent: &mut Agent, clock: f64) {
        agent.last_input_time = clock;
    }

    pub(crate) fn tick(
        &mut self,
        agent: &mut Agent,
        animator: &mut AnimatorSlot,
        clock: f64,
        dt: f32,
    ) {
        if agent.is_frozen() {
            return;
        }
        match agent.sleep_state {
            SleepState::Awake => {
                if clock - agent.last_input_time >= self.tuning.sleep_after_seconds {
                    self.enter_sleep(agent, animator, SleepReason::IdleTimeout);
                }
            }
            SleepState::Sleeping => {}
            SleepState::Waking => {
                if !animator.is_present() {
                    self.finish_wake(agent);
                    return;
                }
                let clip = animator.current_clip();
                let status = match self.wait.as_mut() {
                    Some(wait) => wait.resume(dt, clip, &self.tuning.wake_clip),
                    None => WaitStatus::Done,
                };
                if status == WaitStatus::Done {
                    self.finish_wake(agent);
                }
            }
        }
    }

    /// No-op while already sleeping or frozen; a pending wake is abandoned.
    pub(crate) fn command_sleep(
        &mut self,
        agent: &mut Agent,
        animator: &mut AnimatorSlot,
        reason: SleepReason,
    ) {
        if agent.is_frozen() {
            debug!(reason = reason.as_str(), "sleep_ignored_while_frozen");
            return;
        }
        match agent.sleep_state {
            SleepState::Sleeping => return,
            SleepState::Waking => {
                self.wait = None;
                info!("wake_aborted");
            }
            SleepState::Awake => {}
        }
        self.enter_sleep(agent, animator, reason);
    }

    /// Starts the wake sequence; returns false unless the agent was sleeping.
    pub(crate) fn request_wake(&mut self, agent: &mut Agent, animator: &mut AnimatorSlot) -> bool {
        if agent.sleep_state != SleepState::Sleeping {
            return false;
        }
        agent.sleep_state = SleepState::Waking;
        self.wait = Some(WakeWait::AwaitingClip);
        animator.trigger(AnimTrigger::Wake);
        info!("agent_waking");
        true
    }

    fn enter_sleep(&self, agent: &mut Agent, animator: &mut AnimatorSlot, reason: SleepReason) {
        agent.set_direction(Vec2::ZERO);
        agent.sleep_state = SleepState::Sleeping;
        agent.set_collider_mode(ColliderMode::Sleeping);
        animator.set_walking(false);
        animator.trigger(AnimTrigger::Sleep);
        info!(reason = reason.as_str(), "agent_sleep");
    }

    fn finish_wake(&mut self, agent: &mut Agent) {
        self.wait = None;
        agent.position = self.tuning.rest_point;
        agent.set_collider_mode(ColliderMode::Standing);
        agent.sleep_state = SleepState::Awake;
        info!(x = agent.position.x, y = agent.position.y, "agent_awake");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::habitat::agent::AgentTuning;

    #[test]
    fn wait_stays_pending_until_wake_clip_is_visible() {
        let mut wait = WakeWait::AwaitingClip;
        let idle = ClipInfo {
            name: "Idle",
            length: 1.0,
        };
        for _ in 0..10 {
            assert_eq!(wait.resume(1.0, Some(idle), CLIP_WAKE_UP), WaitStatus::Pending);
        }
        assert_eq!(wait, WakeWait::AwaitingClip);
    }

    #[test]
    fn wait_counts_clip_length_from_first_sighting() {
        let mut wait = WakeWait::AwaitingClip;
        let wake = ClipInfo {
            name: CLIP_WAKE_UP,
            length: 0.5,
        };
        assert_eq!(wait.resume(0.3, Some(wake), CLIP_WAKE_UP), WaitStatus::Pending);
        assert_eq!(wait.resume(0.3, Some(wake), CLIP_WAKE_UP), WaitStatus::Pending);
        assert_eq!(wait.resume(0.3, Some(wake), CLIP_WAKE_UP), WaitStatus::Done);
    }

    #[test]
    fn idle_timeout_puts_awake_agent_to_sleep() {
        let mut controller = SleepWakeController::new(SleepTuning::default());
        let mut agent = Agent::new(AgentTuning::default());
        let mut animator = AnimatorSlot::default();

        controller.tick(&mut agent, &mut animator, 4.9, 0.1);
        assert_eq!(agent.sleep_state, SleepState::Awake);

        controller.tick(&mut agent, &mut animator, 5.0, 0.1);
        assert_eq!(agent.sleep_state, SleepState::Sleeping);
        assert_eq!(agent.collider_mode(), ColliderMode::Sleeping);
        assert!(agent.direction().is_zero());
    }

    #[test]
    fn recognized_input_resets_idle_timer() {
        let mut controller = SleepWakeController::new(SleepTuning::default());
        let mut agent = Agent::new(AgentTuning::default());
        let mut animator = AnimatorSlot::default();

        controller.register_input(&mut agent, 4.0);
        controller.tick(&mut agent, &mut animator, 8.0, 0.1);
        assert_eq!(agent.sleep_state, SleepState::Awake);
        controller.tick(&mut agent, &mut animator, 9.0, 0.1);
        assert_eq!(agent.sleep_state, SleepState::Sleeping);
    }

    #[test]
    fn frozen_agent_does_not_time_out() {
        let mut controller = SleepWakeController::new(SleepTuning::default());
        let mut agent = Agent::new(AgentTuning::default());
        let mut animator = AnimatorSlot::default();
        agent.freeze();

        controller.tick(&mut agent, &mut animator, 60.0, 0.1);
        assert_eq!(agent.sleep_state, SleepState::Awake);
    }

    #[test]
    fn frozen_agent_ignores_sleep_command() {
        let mut controller = SleepWakeController::new(SleepTuning::default());
        let mut agent = Agent::new(AgentTuning::default());
        let mut animator = AnimatorSlot::default();
        agent.freeze();

        controller.command_sleep(&mut agent, &mut animator, SleepReason::Command);
        assert_eq!(agent.sleep_state, SleepState::Awake);

        agent.unfreeze();
        controller.command_sleep(&mut agent, &mut animator, SleepReason::Command);
        assert_eq!(agent.sleep_state, SleepState::Sleeping);
    }

    #[test]
    fn wake_without_animator_completes_on_next_tick() {
        let mut controller = SleepWakeController::new(SleepTuning::default());
        let mut agent = Agent::new(AgentTuning::default());
        let mut animator = AnimatorSlot::default();
        agent.position = Vec2::new(1.5, 0.4);
        controller.command_sleep(&mut agent, &mut animator, SleepReason::Command);

        assert!(controller.request_wake(&mut agent, &mut animator));
        assert_eq!(agent.sleep_state, SleepState::Waking);
        controller.register_input(&mut agent, 10.0);
        controller.tick(&mut agent, &mut animator, 10.0, 0.016);

        assert_eq!(agent.sleep_state, SleepState::Awake);
        assert_eq!(agent.position, Vec2::new(0.0, -0.72));
        assert_eq!(agent.collider_mode(), ColliderMode::Standing);
        assert!(!controller.wake_pending());
    }
}
