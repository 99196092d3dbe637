use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnimTrigger {
    Sleep,
    Wake,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ClipInfo<'a> {
    pub(crate) name: &'a str,
    pub(crate) length: f32,
}

/// The animator surface the habitat controllers are allowed to touch.
pub(crate) trait AnimationBoundary {
    fn set_trigger(&mut self, trigger: AnimTrigger);
    fn set_speed(&mut self, speed: f32);
    fn current_clip(&self) -> Option<ClipInfo<'_>>;

    fn set_walking(&mut self, _walking: bool) {}

    fn advance(&mut self, _dt: f32) {}
}

/// Optional animator; every call is skipped when empty.
#[derive(Default)]
pub(crate) struct AnimatorSlot(Option<Box<dyn AnimationBoundary>>);

impl AnimatorSlot {
    pub(crate) fn new(animator: Option<Box<dyn AnimationBoundary>>) -> Self {
        Self(animator)
    }

    pub(crate) fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub(crate) fn trigger(&mut self, trigger: AnimTrigger) {
        if let Some(animator) = self.0.as_deref_mut() {
            animator.set_trigger(trigger);
        }
    }

    pub(crate) fn set_speed(&mut self, speed: f32) {
        if let Some(animator) = self.0.as_deref_mut() {
            animator.set_speed(speed);
        }
    }

    pub(crate) fn set_walking(&mut self, walking: bool) {
        if let Some(animator) = self.0.as_deref_mut() {
            animator.set_walking(walking);
        }
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        if let Some(animator) = self.0.as_deref_mut() {
            animator.advance(dt);
        }
    }

    pub(crate) fn current_clip(&self) -> Option<ClipInfo<'_>> {
        self.0.as_deref().and_then(|animator| animator.current_clip())
    }
}

impl std::fmt::Debug for AnimatorSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AnimatorSlot")
            .field(&self.current_clip().map(|clip| clip.name))
            .finish()
    }
}

pub(crate) const CLIP_IDLE: &str = "Idle";
pub(crate) const CLIP_WALK: &str = "Walk";
pub(crate) const CLIP_SLEEP: &str = "Sleep";
pub(crate) const CLIP_WAKE_UP: &str = "WakeUp";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AnimationTuning {
    pub(crate) blend_latency_seconds: f32,
    pub(crate) idle_length: f32,
    pub(crate) walk_length: f32,
    pub(crate) sleep_length: f32,
    pub(crate) wake_up_length: f32,
}

impl Default for AnimationTuning {
    fn default() -> Self {
        Self {
            blend_latency_seconds: 0.1,
            idle_length: 1.0,
            walk_length: 0.8,
            sleep_length: 1.5,
            wake_up_length: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clip {
    Idle,
    Walk,
    Sleep,
    WakeUp,
}

/// Frame-driven stand-in for a sprite animator state machine.
#[derive(Debug, Clone)]
pub(crate) struct ClipAnimator {
    tuning: AnimationTuning,
    clip: Clip,
    clip_time: f32,
    speed: f32,
    walking: bool,
    pending: Option<(AnimTrigger, f32)>,
}

impl ClipAnimator {
    pub(crate) fn new(tuning: AnimationTuning) -> Self {
        Self {
            tuning,
            clip: Clip::Idle,
            clip_time: 0.0,
            speed: 1.0,
            walking: false,
            pending: None,
        }
    }

    fn clip_name(clip: Clip) -> &'static str {
        match clip {
            Clip::Idle => CLIP_IDLE,
            Clip::Walk => CLIP_WALK,
            Clip::Sleep => CLIP_SLEEP,
            Clip::WakeUp => CLIP_WAKE_UP,
        }
    }

    fn clip_length(&self, clip: Clip) -> f32 {
        match clip {
            Clip::Idle => self.tuning.idle_length,
            Clip::Walk => self.tuning.walk_length,
            Clip::Sleep => self.tuning.sleep_length,
            Clip::WakeUp => self.tuning.wake_up_length,
        }
    }

    fn locomotion_clip(&self) -> Clip {
        if self.walking {
            Clip::Walk
        } else {
            Clip::Idle
        }
    }

    fn enter(&mut self, clip: Clip) {
        self.clip = clip;
        self.clip_time = 0.0;
    }

    fn apply_trigger(&mut self, trigger: AnimTrigger) {
        match trigger {
            AnimTrigger::Sleep => self.enter(Clip::Sleep),
            AnimTrigger::Wake => self.enter(Clip::WakeUp),
        }
    }
}

impl AnimationBoundary for ClipAnimator {
    fn set_trigger(&mut self, trigger: AnimTrigger) {
        self.pending = Some((trigger, self.tuning.blend_latency_seconds.max(0.0)));
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn current_clip(&self) -> Option<ClipInfo<'_>> {
        Some(ClipInfo {
            name: Self::clip_name(self.clip),
            length: self.clip_length(self.clip),
        })
    }

    fn set_walking(&mut self, walking: bool) {
        self.walking = walking;
        if matches!(self.clip, Clip::Idle | Clip::Walk) && self.clip != self.locomotion_clip() {
            self.enter(self.locomotion_clip());
        }
    }

    fn advance(&mut self, dt: f32) {
        let scaled = dt * self.speed;
        if scaled <= 0.0 {
            return;
        }

        if let Some((trigger, remaining)) = self.pending {
            let remaining = remaining - scaled;
            if remaining <= 0.0 {
                self.pending = None;
                self.apply_trigger(trigger);
                self.clip_time = -remaining;
                return;
            }
            self.pending = Some((trigger, remaining));
        }

        self.clip_time += scaled;
        let length = self.clip_length(self.clip).max(f32::EPSILON);
        if self.clip_time < length {
            return;
        }
        if self.clip == Clip::WakeUp {
            let overflow = self.clip_time - length;
            self.enter(self.locomotion_clip());
            self.clip_time = overflow;
        } else {
            self.clip_time %= length;
        }
    }
}
