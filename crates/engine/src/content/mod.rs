mod compiler;
mod measure;
mod types;

pub use compiler::{
    compile_house_def, HouseCompileError, HouseErrorCode, SourceLocation, HOUSE_FILE_NAME,
};
pub use measure::{resolve_room_geometry, sprite_image_path};
pub use types::{BedDef, FurnitureDef, HouseDef, RoomDef, RoomGeometry, RoomWidthSource};
