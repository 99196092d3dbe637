use super::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    SleepCommand,
    Feed,
    ForceMoveToBed,
    WakeUpPlace,
    Quit,
}

const ACTION_COUNT: usize = 5;

/// Per-tick pressed edges, one slot per action.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, pressed: bool) {
        self.pressed[action.index()] = pressed;
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::SleepCommand => 0,
            InputAction::Feed => 1,
            InputAction::ForceMoveToBed => 2,
            InputAction::WakeUpPlace => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Drag signals gathered over one frame. `delta_x` is in window pixels, positive = rightward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragGesture {
    pub began: bool,
    pub active: bool,
    pub delta_x: f32,
    pub ended: bool,
}

impl DragGesture {
    pub fn is_idle(&self) -> bool {
        !self.began && !self.active && !self.ended
    }
}

pub const DRAG_THRESHOLD_PX: f32 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum PointerPhase {
    #[default]
    Up,
    Pressed { origin: Vec2 },
    Dragging,
}

/// Turns raw press/move/release into drag gestures and taps.
#[derive(Debug, Default)]
pub(crate) struct PointerTracker {
    phase: PointerPhase,
    last_position: Option<Vec2>,
    frame_drag: DragGesture,
    frame_tap: Option<Vec2>,
}

impl PointerTracker {
    pub(crate) fn press(&mut self) {
        if let (PointerPhase::Up, Some(origin)) = (self.phase, self.last_position) {
            self.phase = PointerPhase::Pressed { origin };
        }
    }

    pub(crate) fn moved(&mut self, position: Vec2) {
        let previous = self.last_position.replace(position);
        match self.phase {
            PointerPhase::Up => {}
            PointerPhase::Pressed { origin } => {
                let dx = position.x - origin.x;
                let dy = position.y - origin.y;
                if (dx * dx + dy * dy).sqrt() > DRAG_THRESHOLD_PX {
                    self.phase = PointerPhase::Dragging;
                    self.frame_drag.began = true;
                    self.frame_drag.active = true;
                    self.frame_drag.delta_x += dx;
                }
            }
            PointerPhase::Dragging => {
                let from = previous.unwrap_or(position);
                self.frame_drag.active = true;
                self.frame_drag.delta_x += position.x - from.x;
            }
        }
    }

    pub(crate) fn release(&mut self) {
        match self.phase {
            PointerPhase::Up => {}
            PointerPhase::Pressed { origin } => {
                self.frame_tap = Some(self.last_position.unwrap_or(origin));
            }
            PointerPhase::Dragging => {
                self.frame_drag.ended = true;
                self.frame_drag.active = false;
            }
        }
        self.phase = PointerPhase::Up;
    }

    /// Cursor left the window: finish any drag, forget the press.
    pub(crate) fn cancel(&mut self) {
        if self.phase == PointerPhase::Dragging {
            self.frame_drag.ended = true;
            self.frame_drag.active = false;
        }
        self.phase = PointerPhase::Up;
        self.last_position = None;
    }

    pub(crate) fn take_frame(&mut self) -> (DragGesture, Option<Vec2>) {
        let drag = self.frame_drag;
        let tap = self.frame_tap.take();
        self.frame_drag = DragGesture {
            active: self.phase == PointerPhase::Dragging,
            ..DragGesture::default()
        };
        (drag, tap)
    }
}
