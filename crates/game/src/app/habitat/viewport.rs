use serde::Deserialize;
use tracing::{debug, info};

use super::agent::AgentControl;
use super::rooms::RoomSet;
use super::sleep::WaitStatus;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ViewportTuning {
    pub(crate) snap_speed: f32,
    /// World units of offset per window pixel of drag; negative moves toward later rooms.
    pub(crate) drag_sensitivity: f32,
    /// Handle travel in HUD pixels, relative to the window's horizontal centre.
    pub(crate) handle_min_x: f32,
    pub(crate) handle_max_x: f32,
    pub(crate) start_room: usize,
    /// Fraction of the room offset applied to the backdrop layer.
    pub(crate) parallax_ratio: f32,
}

impl Default for ViewportTuning {
    fn default() -> Self {
        Self {
            snap_speed: 7.0,
            drag_sensitivity: -0.01,
            handle_min_x: -190.0,
            handle_max_x: 190.0,
            start_room: 0,
            parallax_ratio: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScrollHandle {
    pub(crate) normalized: f32,
    pub(crate) x: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SnapAnimation {
    start: f32,
    target: f32,
    room: usize,
    progress: f32,
}

impl SnapAnimation {
    /// Advances progress and returns the offset for this frame.
    fn resume(&mut self, dt: f32, snap_speed: f32) -> (f32, WaitStatus) {
        self.progress += dt * snap_speed;
        if self.progress >= 1.0 {
            return (self.target, WaitStatus::Done);
        }
        (lerp(self.start, self.target, self.progress), WaitStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ViewportPhase {
    Idle,
    Dragging,
    Snapping(SnapAnimation),
}

#[derive(Debug, Clone)]
pub(crate) struct ViewportScrollController {
    tuning: ViewportTuning,
    rooms: RoomSet,
    offset: f32,
    active_room: usize,
    phase: ViewportPhase,
    attached_at: Option<f32>,
    handle: ScrollHandle,
}

impl ViewportScrollController {
    pub(crate) fn new(tuning: ViewportTuning, rooms: RoomSet) -> Self {
        let active_room = rooms.clamp_index(tuning.start_room);
        let offset = rooms.snap_target(active_room);
        let mut controller = Self {
            tuning,
            rooms,
            offset,
            active_room,
            phase: ViewportPhase::Idle,
            attached_at: None,
            handle: ScrollHandle {
                normalized: 0.0,
                x: tuning.handle_min_x,
            },
        };
        controller.place_handle(controller.canonical_position(active_room));
        controller
    }

    pub(crate) fn offset(&self) -> f32 {
        self.offset
    }

    /// Backdrop offset; follows the drag and the snap at a fraction of the room offset.
    pub(crate) fn parallax_offset(&self) -> f32 {
        self.offset * self.tuning.parallax_ratio
    }

    pub(crate) fn active_room(&self) -> usize {
        self.active_room
    }

    pub(crate) fn rooms(&self) -> &RoomSet {
        &self.rooms
    }

    pub(crate) fn phase(&self) -> ViewportPhase {
        self.phase
    }

    #[cfg(test)]
    pub(crate) fn is_snapping(&self) -> bool {
        matches!(self.phase, ViewportPhase::Snapping(_))
    }

    pub(crate) fn handle(&self) -> ScrollHandle {
        self.handle
    }

    pub(crate) fn handle_range(&self) -> (f32, f32) {
        (self.tuning.handle_min_x, self.tuning.handle_max_x)
    }

    /// Offset showing the first room; the upper end of the scroll range.
    pub(crate) fn max_offset(&self) -> f32 {
        self.rooms.snap_target(0)
    }

    pub(crate) fn min_offset(&self) -> f32 {
        self.rooms.snap_target(self.rooms.len().saturating_sub(1))
    }

    /// How far the background has moved since the agent was attached.
    pub(crate) fn attachment_offset(&self) -> f32 {
        self.attached_at.map_or(0.0, |attached_at| self.offset - attached_at)
    }

    pub(crate) fn canonical_position(&self, room: usize) -> f32 {
        let last = self.rooms.len().saturating_sub(1);
        if last == 0 {
            return 0.0;
        }
        self.rooms.clamp_index(room) as f32 / last as f32
    }

    /// Ties go to the lower index.
    pub(crate) fn nearest_room(&self, offset: f32) -> usize {
        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (index, target) in self.rooms.snap_targets().into_iter().enumerate() {
            let distance = (offset - target).abs();
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        best
    }

    pub(crate) fn begin_drag(&mut self, agent: &mut dyn AgentControl) {
        match self.phase {
            ViewportPhase::Dragging => return,
            ViewportPhase::Snapping(snap) => {
                info!(room = snap.room, progress = snap.progress, "snap_cancelled");
            }
            ViewportPhase::Idle => {}
        }
        self.phase = ViewportPhase::Dragging;

        let sleeping = agent.is_sleeping();
        if !sleeping && self.attached_at.is_none() {
            self.attached_at = Some(self.offset);
        }
        agent.freeze();
        info!(
            offset = self.offset,
            attached = self.attached_at.is_some(),
            sleeping,
            "drag_begin"
        );
    }

    pub(crate) fn drag(&mut self, delta_x_px: f32) {
        if self.phase != ViewportPhase::Dragging {
            return;
        }
        let next = self.offset + delta_x_px * self.tuning.drag_sensitivity;
        self.offset = next.clamp(self.min_offset(), self.max_offset());
        self.refresh_handle();
    }

    pub(crate) fn end_drag(&mut self) {
        if self.phase != ViewportPhase::Dragging {
            return;
        }
        let room = self.nearest_room(self.offset);
        self.start_snap(room);
    }

    /// Replaces any running snap.
    pub(crate) fn start_snap(&mut self, room: usize) {
        let room = self.rooms.clamp_index(room);
        let target = self.rooms.snap_target(room);
        self.phase = ViewportPhase::Snapping(SnapAnimation {
            start: self.offset,
            target,
            room,
            progress: 0.0,
        });
        info!(room, from = self.offset, to = target, "snap_started");
    }

    /// Returns the room index when a snap finishes this tick.
    pub(crate) fn tick(&mut self, dt: f32, agent: &mut dyn AgentControl) -> Option<usize> {
        let ViewportPhase::Snapping(mut snap) = self.phase else {
            return None;
        };
        let (offset, status) = snap.resume(dt, self.tuning.snap_speed);
        self.offset = offset;
        if status == WaitStatus::Pending {
            self.phase = ViewportPhase::Snapping(snap);
            self.refresh_handle();
            return None;
        }

        self.finish_snap(snap.room, agent);
        Some(snap.room)
    }

    fn finish_snap(&mut self, room_index: usize, agent: &mut dyn AgentControl) {
        self.phase = ViewportPhase::Idle;
        self.active_room = room_index;
        self.attached_at = None;

        if agent.is_sleeping() {
            agent.unfreeze();
        } else {
            let room = self.rooms.room(room_index);
            agent.set_room_limits(room.center_x + self.offset, room.width);
            agent.teleport_to_room(room_index);
            agent.unfreeze();
        }

        self.place_handle(self.canonical_position(room_index));
        info!(room = room_index, offset = self.offset, "snap_completed");
    }

    fn refresh_handle(&mut self) {
        let t = inverse_lerp(self.max_offset(), self.min_offset(), self.offset);
        self.place_handle(t);
        debug!(offset = self.offset, handle = self.handle.x, "scroll_handle_moved");
    }

    fn place_handle(&mut self, normalized: f32) {
        self.handle = ScrollHandle {
            normalized,
            x: lerp(self.tuning.handle_min_x, self.tuning.handle_max_x, normalized),
        };
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::habitat::rooms::RoomSpec;

    #[derive(Default)]
    struct RecordingAgent {
        sleeping: bool,
        frozen: bool,
        calls: Vec<String>,
    }

    impl AgentControl for RecordingAgent {
        fn freeze(&mut self) {
            self.frozen = true;
            self.calls.push("freeze".to_string());
        }

        fn unfreeze(&mut self) {
            self.frozen = false;
            self.calls.push("unfreeze".to_string());
        }

        fn is_sleeping(&self) -> bool {
            self.sleeping
        }

        fn teleport_to_room(&mut self, room_index: usize) {
            self.calls.push(format!("teleport:{room_index}"));
        }

        fn set_room_limits(&mut self, center_x: f32, width: f32) {
            self.calls.push(format!("limits:{center_x}:{width}"));
        }
    }

    fn three_rooms() -> ViewportScrollController {
        let specs = [RoomSpec {
            width: 4.0,
            safe_y: None,
        }; 3];
        ViewportScrollController::new(
            ViewportTuning::default(),
            RoomSet::from_specs(&specs, 4.0),
        )
    }

    fn drag_to(controller: &mut ViewportScrollController, agent: &mut RecordingAgent, offset: f32) {
        controller.begin_drag(agent);
        let delta_px = (offset - controller.offset()) / ViewportTuning::default().drag_sensitivity;
        controller.drag(delta_px);
    }

    fn run_snap(controller: &mut ViewportScrollController, agent: &mut RecordingAgent) -> usize {
        for _ in 0..1_000 {
            if let Some(room) = controller.tick(1.0 / 60.0, agent) {
                return room;
            }
        }
        panic!("snap did not finish");
    }

    #[test]
    fn nearest_room_prefers_smallest_distance_then_lower_index() {
        let controller = three_rooms();
        assert_eq!(controller.nearest_room(-5.5), 1);
        assert_eq!(controller.nearest_room(-2.0), 0);
        assert_eq!(controller.nearest_room(-6.0), 1);
        assert_eq!(controller.nearest_room(-100.0), 2);
    }

    #[test]
    fn drag_clamps_to_room_span() {
        let mut controller = three_rooms();
        let mut agent = RecordingAgent::default();
        controller.begin_drag(&mut agent);
        controller.drag(100_000.0);
        assert!((controller.offset() - controller.min_offset()).abs() < 0.0001);
        assert!((controller.handle().normalized - 1.0).abs() < 0.0001);
        controller.drag(-100_000.0);
        assert!(controller.offset().abs() < 0.0001);
        assert!((controller.handle().x + 190.0).abs() < 0.0001);
    }

    #[test]
    fn drag_ignored_outside_drag_session() {
        let mut controller = three_rooms();
        controller.drag(-300.0);
        controller.end_drag();
        assert!(controller.offset().abs() < f32::EPSILON);
        assert_eq!(controller.phase(), ViewportPhase::Idle);
    }

    #[test]
    fn snap_lands_exactly_on_target_and_handle_is_canonical() {
        let mut controller = three_rooms();
        let mut agent = RecordingAgent::default();
        drag_to(&mut controller, &mut agent, -5.5);
        assert!((controller.offset() + 5.5).abs() < 0.0001);

        controller.end_drag();
        assert!(controller.is_snapping());
        let room = run_snap(&mut controller, &mut agent);

        assert_eq!(room, 1);
        assert_eq!(controller.offset(), -4.0);
        assert_eq!(controller.active_room(), 1);
        assert!((controller.handle().normalized - 0.5).abs() < f32::EPSILON);
        assert!(controller.handle().x.abs() < 0.0001);
        assert!((controller.parallax_offset() + 1.6).abs() < 0.0001);
    }

    #[test]
    fn parallax_tracks_drag_and_snap_at_its_ratio() {
        let mut controller = three_rooms();
        let mut agent = RecordingAgent::default();
        assert!(controller.parallax_offset().abs() < f32::EPSILON);

        drag_to(&mut controller, &mut agent, -5.5);
        assert!((controller.parallax_offset() + 2.2).abs() < 0.0001);

        controller.end_drag();
        controller.tick(1.0 / 60.0, &mut agent);
        let mid_snap = controller.parallax_offset();
        assert!(mid_snap > -2.2 && mid_snap < -1.6);

        run_snap(&mut controller, &mut agent);
        assert!((controller.parallax_offset() + 1.6).abs() < 0.0001);
    }

    #[test]
    fn snap_takes_about_one_over_snap_speed_seconds() {
        let mut controller = three_rooms();
        let mut agent = RecordingAgent::default();
        drag_to(&mut controller, &mut agent, -5.5);
        controller.end_drag();

        assert!(controller.tick(0.1, &mut agent).is_none());
        let mid = controller.offset();
        assert!(mid > -5.5 && mid < -4.0);
        assert_eq!(controller.tick(0.05, &mut agent), Some(1));
    }

    #[test]
    fn awake_agent_is_attached_then_relocated() {
        let mut controller = three_rooms();
        let mut agent = RecordingAgent::default();
        drag_to(&mut controller, &mut agent, -3.0);
        assert!(agent.frozen);
        assert!((controller.attachment_offset() + 3.0).abs() < 0.0001);

        controller.end_drag();
        run_snap(&mut controller, &mut agent);

        assert_eq!(controller.attachment_offset(), 0.0);
        assert!(!agent.frozen);
        assert_eq!(
            agent.calls,
            vec![
                "freeze".to_string(),
                "limits:0:4".to_string(),
                "teleport:1".to_string(),
                "unfreeze".to_string(),
            ]
        );
    }

    #[test]
    fn sleeping_agent_is_only_frozen_and_resumed() {
        let mut controller = three_rooms();
        let mut agent = RecordingAgent {
            sleeping: true,
            ..RecordingAgent::default()
        };
        drag_to(&mut controller, &mut agent, -7.0);
        assert_eq!(controller.attachment_offset(), 0.0);

        controller.end_drag();
        assert_eq!(run_snap(&mut controller, &mut agent), 2);
        assert_eq!(
            agent.calls,
            vec!["freeze".to_string(), "unfreeze".to_string()]
        );
    }

    #[test]
    fn drag_begin_cancels_running_snap() {
        let mut controller = three_rooms();
        let mut agent = RecordingAgent::default();
        drag_to(&mut controller, &mut agent, -5.5);
        controller.end_drag();
        controller.tick(0.05, &mut agent);
        let attachment = controller.attachment_offset();

        controller.begin_drag(&mut agent);
        assert_eq!(controller.phase(), ViewportPhase::Dragging);
        assert!((controller.attachment_offset() - attachment).abs() < 0.0001);
        assert!(controller.tick(1.0, &mut agent).is_none());
    }

    #[test]
    fn single_room_has_zero_canonical_position() {
        let controller = ViewportScrollController::new(
            ViewportTuning::default(),
            RoomSet::from_specs(
                &[RoomSpec {
                    width: 4.0,
                    safe_y: None,
                }],
                4.0,
            ),
        );
        assert_eq!(controller.canonical_position(0), 0.0);
        assert_eq!(controller.min_offset(), controller.max_offset());
    }
}
