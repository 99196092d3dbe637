use pethouse_engine::Vec2;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Room {
    pub(crate) index: usize,
    /// Background-space centre; room 0 sits at x = 0.
    pub(crate) center_x: f32,
    pub(crate) width: f32,
    pub(crate) safe_y: Option<f32>,
}

/// Rooms laid out left to right, edge to edge. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RoomSet {
    rooms: Vec<Room>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RoomSpec {
    pub(crate) width: f32,
    pub(crate) safe_y: Option<f32>,
}

impl RoomSet {
    pub(crate) fn from_specs(specs: &[RoomSpec], fallback_width: f32) -> Self {
        let fallback_width = if fallback_width.is_finite() && fallback_width > 0.0 {
            fallback_width
        } else {
            4.0
        };
        if specs.is_empty() {
            warn!(fallback_width, "room_set_empty_using_fallback");
            return Self {
                rooms: vec![Room {
                    index: 0,
                    center_x: 0.0,
                    width: fallback_width,
                    safe_y: None,
                }],
            };
        }

        let mut rooms = Vec::with_capacity(specs.len());
        let mut left_edge = 0.0_f32;
        for (index, spec) in specs.iter().enumerate() {
            let width = if spec.width.is_finite() && spec.width > 0.0 {
                spec.width
            } else {
                warn!(room = index, width = spec.width, fallback_width, "room_width_fallback");
                fallback_width
            };
            if index == 0 {
                left_edge = -width * 0.5;
            }
            rooms.push(Room {
                index,
                center_x: left_edge + width * 0.5,
                width,
                safe_y: spec.safe_y,
            });
            left_edge += width;
        }
        Self { rooms }
    }

    pub(crate) fn len(&self) -> usize {
        self.rooms.len()
    }

    pub(crate) fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub(crate) fn clamp_index(&self, index: usize) -> usize {
        index.min(self.rooms.len().saturating_sub(1))
    }

    pub(crate) fn room(&self, index: usize) -> Room {
        self.rooms[self.clamp_index(index)]
    }

    /// Viewport offset that centres room `index`.
    pub(crate) fn snap_target(&self, index: usize) -> f32 {
        -self.room(index).center_x
    }

    pub(crate) fn snap_targets(&self) -> Vec<f32> {
        self.rooms.iter().map(|room| -room.center_x).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RoomLimitsTuning {
    pub(crate) left: f32,
    pub(crate) right: f32,
    pub(crate) bottom: f32,
    pub(crate) top: f32,
}

impl Default for RoomLimitsTuning {
    fn default() -> Self {
        Self {
            left: -3.0,
            right: 3.0,
            bottom: -1.5,
            top: 1.5,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RoomBoundsManager {
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    safe_ys: Vec<Option<f32>>,
}

impl RoomBoundsManager {
    pub(crate) fn new(limits: RoomLimitsTuning, rooms: &RoomSet) -> Self {
        Self {
            left: limits.left,
            right: limits.right,
            bottom: limits.bottom,
            top: limits.top,
            safe_ys: rooms.rooms().iter().map(|room| room.safe_y).collect(),
        }
    }

    pub(crate) fn set_active_room(&mut self, center_x: f32, width: f32) {
        let half = width * 0.5;
        self.left = center_x - half;
        self.right = center_x + half;
    }

    pub(crate) fn limits(&self) -> (f32, f32, f32, f32) {
        (self.left, self.right, self.bottom, self.top)
    }

    pub(crate) fn clamp(&self, position: Vec2) -> Vec2 {
        Vec2 {
            x: position.x.clamp(self.left.min(self.right), self.right.max(self.left)),
            y: position.y.clamp(self.bottom.min(self.top), self.top.max(self.bottom)),
        }
    }

    /// Teleport target: camera-relative X, the room's safe Y if it has one, else the current Y.
    pub(crate) fn safe_point(&self, room_index: usize, camera_x: f32, current: Vec2) -> Vec2 {
        let index = room_index.min(self.safe_ys.len().saturating_sub(1));
        let y = self
            .safe_ys
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(current.y);
        Vec2 { x: camera_x, y }
    }
}
