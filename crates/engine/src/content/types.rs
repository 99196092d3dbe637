use std::path::PathBuf;

use crate::app::Vec2;

/// Compiled `house.xml`, before room sprites are measured.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseDef {
    pub source_path: PathBuf,
    pub pixels_per_unit: f32,
    pub fallback_room_width: f32,
    pub rooms: Vec<RoomDef>,
    pub furniture: Vec<FurnitureDef>,
    pub bed: Option<BedDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomDef {
    pub sprite: String,
    pub width: Option<f32>,
    pub safe_y: Option<f32>,
}

/// Furniture positions are in background space: room 0 is centred on x = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureDef {
    pub name: String,
    pub layer: String,
    pub center: Vec2,
    pub half_extents: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BedDef {
    pub anchor: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomWidthSource {
    Explicit,
    Sprite,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomGeometry {
    pub sprite: String,
    pub width: f32,
    pub width_source: RoomWidthSource,
    pub safe_y: Option<f32>,
}
