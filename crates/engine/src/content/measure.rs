use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::types::{HouseDef, RoomGeometry, RoomWidthSource};

pub fn sprite_image_path(sprites_dir: &Path, key: &str) -> PathBuf {
    let mut path = sprites_dir.to_path_buf();
    for segment in key.split('/') {
        path.push(segment);
    }
    path.set_extension("png");
    path
}

/// Resolves each room's width: explicit `<width>`, then sprite pixels / ppu, then the fallback.
pub fn resolve_room_geometry(house: &HouseDef, sprites_dir: &Path) -> Vec<RoomGeometry> {
    house
        .rooms
        .iter()
        .enumerate()
        .map(|(index, room)| {
            let (width, width_source) = match room.width {
                Some(width) => (width, RoomWidthSource::Explicit),
                None => measure_sprite_width(
                    index,
                    &room.sprite,
                    sprites_dir,
                    house.pixels_per_unit,
                    house.fallback_room_width,
                ),
            };
            RoomGeometry {
                sprite: room.sprite.clone(),
                width,
                width_source,
                safe_y: room.safe_y,
            }
        })
        .collect()
}

fn measure_sprite_width(
    index: usize,
    sprite: &str,
    sprites_dir: &Path,
    pixels_per_unit: f32,
    fallback_width: f32,
) -> (f32, RoomWidthSource) {
    let path = sprite_image_path(sprites_dir, sprite);
    match image::image_dimensions(&path) {
        Ok((width_px, height_px)) if width_px > 0 => {
            let width = width_px as f32 / pixels_per_unit;
            debug!(
                room = index,
                sprite,
                width_px,
                height_px,
                width,
                "room_sprite_measured"
            );
            (width, RoomWidthSource::Sprite)
        }
        Ok(_) => {
            warn!(
                room = index,
                sprite,
                path = %path.display(),
                reason = "zero width",
                fallback_width,
                "room_width_fallback"
            );
            (fallback_width, RoomWidthSource::Fallback)
        }
        Err(error) => {
            warn!(
                room = index,
                sprite,
                path = %path.display(),
                reason = %error,
                fallback_width,
                "room_width_fallback"
            );
            (fallback_width, RoomWidthSource::Fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::content::types::RoomDef;

    fn house_with_rooms(rooms: Vec<RoomDef>) -> HouseDef {
        HouseDef {
            source_path: PathBuf::from("house.xml"),
            pixels_per_unit: 16.0,
            fallback_room_width: 4.0,
            rooms,
            furniture: Vec::new(),
            bed: None,
        }
    }

    fn room(sprite: &str, width: Option<f32>) -> RoomDef {
        RoomDef {
            sprite: sprite.to_string(),
            width,
            safe_y: None,
        }
    }

    #[test]
    fn sprite_path_appends_png_extension() {
        let path = sprite_image_path(Path::new("sprites"), "rooms/living");
        assert_eq!(path, Path::new("sprites").join("rooms").join("living.png"));
    }

    #[test]
    fn explicit_width_wins() {
        let temp = TempDir::new().expect("temp");
        let house = house_with_rooms(vec![room("missing", Some(5.5))]);
        let rooms = resolve_room_geometry(&house, temp.path());
        assert_eq!(rooms[0].width_source, RoomWidthSource::Explicit);
        assert!((rooms[0].width - 5.5).abs() < f32::EPSILON);
    }

    #[test]
    fn sprite_width_is_divided_by_pixels_per_unit() {
        let temp = TempDir::new().expect("temp");
        let rooms_dir = temp.path().join("rooms");
        fs::create_dir_all(&rooms_dir).expect("mkdir");
        image::RgbaImage::new(64, 8)
            .save(rooms_dir.join("living.png"))
            .expect("save png");

        let house = house_with_rooms(vec![room("rooms/living", None)]);
        let rooms = resolve_room_geometry(&house, temp.path());
        assert_eq!(rooms[0].width_source, RoomWidthSource::Sprite);
        assert!((rooms[0].width - 4.0).abs() < 0.0001);
    }

    #[test]
    fn unreadable_sprite_falls_back() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join("broken.png"), b"not a png").expect("write");

        let house = house_with_rooms(vec![room("broken", None), room("absent", None)]);
        let rooms = resolve_room_geometry(&house, temp.path());
        for geometry in &rooms {
            assert_eq!(geometry.width_source, RoomWidthSource::Fallback);
            assert!((geometry.width - 4.0).abs() < f32::EPSILON);
        }
    }
}
