use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::app::Vec2;

use super::types::{BedDef, FurnitureDef, HouseDef, RoomDef};

pub const HOUSE_FILE_NAME: &str = "house.xml";
const DEFAULT_PIXELS_PER_UNIT: f32 = 100.0;
const DEFAULT_FALLBACK_ROOM_WIDTH: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HouseErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    NoRooms,
}

#[derive(Debug, Clone)]
pub struct HouseCompileError {
    pub code: HouseErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for HouseCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for HouseCompileError {}

pub fn compile_house_def(base_content_dir: &Path) -> Result<HouseDef, HouseCompileError> {
    let file_path = base_content_dir.join(HOUSE_FILE_NAME);
    let raw = fs::read_to_string(&file_path).map_err(|source| HouseCompileError {
        code: HouseErrorCode::ReadFile,
        message: format!("failed to read house definition: {source}"),
        file_path: file_path.clone(),
        location: None,
    })?;
    parse_house_document(&file_path, &raw)
}

pub(crate) fn parse_house_document(
    file_path: &Path,
    raw: &str,
) -> Result<HouseDef, HouseCompileError> {
    let doc = Document::parse(raw).map_err(|error| HouseCompileError {
        code: HouseErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let ctx = ParseCtx {
        file_path,
        doc: &doc,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "House" {
        return Err(ctx.error_at(
            HouseErrorCode::InvalidRoot,
            "root element must be <House>".to_string(),
            root,
        ));
    }

    let mut seen_scalars = HashSet::<&str>::new();
    let mut pixels_per_unit: Option<f32> = None;
    let mut fallback_room_width: Option<f32> = None;
    let mut rooms = Vec::<RoomDef>::new();
    let mut furniture = Vec::<FurnitureDef>::new();
    let mut bed: Option<BedDef> = None;

    for child in root.children().filter(|node| node.is_element()) {
        let name = child.tag_name().name();
        match name {
            "pixelsPerUnit" | "fallbackRoomWidth" | "Bed" => {
                if !seen_scalars.insert(name) {
                    return Err(ctx.error_at(
                        HouseErrorCode::DuplicateField,
                        format!("duplicate element <{name}> in <House>"),
                        child,
                    ));
                }
                match name {
                    "pixelsPerUnit" => {
                        pixels_per_unit = Some(ctx.positive_number(child, name)?);
                    }
                    "fallbackRoomWidth" => {
                        fallback_room_width = Some(ctx.positive_number(child, name)?);
                    }
                    _ => bed = Some(parse_bed(&ctx, child)?),
                }
            }
            "Room" => rooms.push(parse_room(&ctx, child)?),
            "Furniture" => furniture.push(parse_furniture(&ctx, child)?),
            _ => {
                return Err(ctx.error_at(
                    HouseErrorCode::UnknownElement,
                    format!(
                        "unsupported element <{name}>; allowed: pixelsPerUnit, fallbackRoomWidth, Room, Furniture, Bed"
                    ),
                    child,
                ))
            }
        }
    }

    if rooms.is_empty() {
        return Err(ctx.error_at(
            HouseErrorCode::NoRooms,
            "<House> must declare at least one <Room>".to_string(),
            root,
        ));
    }

    Ok(HouseDef {
        source_path: file_path.to_path_buf(),
        pixels_per_unit: pixels_per_unit.unwrap_or(DEFAULT_PIXELS_PER_UNIT),
        fallback_room_width: fallback_room_width.unwrap_or(DEFAULT_FALLBACK_ROOM_WIDTH),
        rooms,
        furniture,
        bed,
    })
}

fn parse_room(ctx: &ParseCtx<'_, '_>, node: Node<'_, '_>) -> Result<RoomDef, HouseCompileError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut sprite: Option<String> = None;
    let mut width: Option<f32> = None;
    let mut safe_y: Option<f32> = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = ctx.unique_field(&mut seen_fields, field, "Room")?;
        match field_name.as_str() {
            "sprite" => {
                let value = ctx.required_text(field, "sprite")?;
                if let Err(reason) = check_sprite_key(&value) {
                    return Err(ctx.error_at(
                        HouseErrorCode::InvalidValue,
                        format!("invalid sprite key '{value}': {reason}"),
                        field,
                    ));
                }
                sprite = Some(value);
            }
            "width" => width = Some(ctx.positive_number(field, "width")?),
            "safeY" => safe_y = Some(ctx.number(field, "safeY")?),
            _ => return Err(ctx.unknown_field(field, "Room")),
        }
    }

    let Some(sprite) = sprite else {
        return Err(ctx.missing_field(node, "sprite", "Room"));
    };
    Ok(RoomDef {
        sprite,
        width,
        safe_y,
    })
}

fn parse_furniture(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<FurnitureDef, HouseCompileError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut name: Option<String> = None;
    let mut layer: Option<String> = None;
    let mut x: Option<f32> = None;
    let mut y: Option<f32> = None;
    let mut half_width: Option<f32> = None;
    let mut half_height: Option<f32> = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = ctx.unique_field(&mut seen_fields, field, "Furniture")?;
        match field_name.as_str() {
            "name" => name = Some(ctx.required_text(field, "name")?),
            "layer" => layer = Some(ctx.required_text(field, "layer")?),
            "x" => x = Some(ctx.number(field, "x")?),
            "y" => y = Some(ctx.number(field, "y")?),
            "halfWidth" => half_width = Some(ctx.positive_number(field, "halfWidth")?),
            "halfHeight" => half_height = Some(ctx.positive_number(field, "halfHeight")?),
            _ => return Err(ctx.unknown_field(field, "Furniture")),
        }
    }

    let Some(name) = name else {
        return Err(ctx.missing_field(node, "name", "Furniture"));
    };
    let Some(layer) = layer else {
        return Err(ctx.missing_field(node, "layer", "Furniture"));
    };
    let Some(x) = x else {
        return Err(ctx.missing_field(node, "x", "Furniture"));
    };
    let Some(y) = y else {
        return Err(ctx.missing_field(node, "y", "Furniture"));
    };
    let Some(half_width) = half_width else {
        return Err(ctx.missing_field(node, "halfWidth", "Furniture"));
    };
    let Some(half_height) = half_height else {
        return Err(ctx.missing_field(node, "halfHeight", "Furniture"));
    };

    Ok(FurnitureDef {
        name,
        layer,
        center: Vec2 { x, y },
        half_extents: Vec2 {
            x: half_width,
            y: half_height,
        },
    })
}

fn parse_bed(ctx: &ParseCtx<'_, '_>, node: Node<'_, '_>) -> Result<BedDef, HouseCompileError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut x: Option<f32> = None;
    let mut y: Option<f32> = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = ctx.unique_field(&mut seen_fields, field, "Bed")?;
        match field_name.as_str() {
            "x" => x = Some(ctx.number(field, "x")?),
            "y" => y = Some(ctx.number(field, "y")?),
            _ => return Err(ctx.unknown_field(field, "Bed")),
        }
    }

    let Some(x) = x else {
        return Err(ctx.missing_field(node, "x", "Bed"));
    };
    let Some(y) = y else {
        return Err(ctx.missing_field(node, "y", "Bed"));
    };
    Ok(BedDef {
        anchor: Vec2 { x, y },
    })
}

/// Sprite keys name files under `assets/sprites` without the `.png` suffix.
pub(crate) fn check_sprite_key(key: &str) -> Result<(), &'static str> {
    if key.starts_with('/') || key.contains('\\') {
        return Err("must be a relative forward-slash path");
    }
    if key.contains("..") {
        return Err("must not contain '..'");
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-'))
    {
        return Err("allowed characters are a-z, 0-9, '_', '-' and '/'");
    }
    Ok(())
}

struct ParseCtx<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl ParseCtx<'_, '_> {
    fn error_at(
        &self,
        code: HouseErrorCode,
        message: String,
        node: Node<'_, '_>,
    ) -> HouseCompileError {
        let pos = self.doc.text_pos_at(node.range().start);
        HouseCompileError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }

    fn unique_field(
        &self,
        seen: &mut HashSet<String>,
        field: Node<'_, '_>,
        parent: &str,
    ) -> Result<String, HouseCompileError> {
        let field_name = field.tag_name().name().to_string();
        if !seen.insert(field_name.clone()) {
            return Err(self.error_at(
                HouseErrorCode::DuplicateField,
                format!("duplicate field <{field_name}> in <{parent}>"),
                field,
            ));
        }
        Ok(field_name)
    }

    fn unknown_field(&self, field: Node<'_, '_>, parent: &str) -> HouseCompileError {
        self.error_at(
            HouseErrorCode::UnknownField,
            format!("unknown field <{}> in <{parent}>", field.tag_name().name()),
            field,
        )
    }

    fn missing_field(&self, node: Node<'_, '_>, field_name: &str, parent: &str) -> HouseCompileError {
        self.error_at(
            HouseErrorCode::MissingField,
            format!("missing required field <{field_name}> in <{parent}>"),
            node,
        )
    }

    fn required_text(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
    ) -> Result<String, HouseCompileError> {
        let value = node.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(self.error_at(
                HouseErrorCode::MissingField,
                format!("field <{field_name}> must not be empty"),
                node,
            ));
        }
        Ok(value)
    }

    fn number(&self, node: Node<'_, '_>, field_name: &str) -> Result<f32, HouseCompileError> {
        let value = self.required_text(node, field_name)?;
        let parsed = value.parse::<f32>().map_err(|_| {
            self.error_at(
                HouseErrorCode::InvalidValue,
                format!("{field_name} '{value}' is not a valid number"),
                node,
            )
        })?;
        if !parsed.is_finite() {
            return Err(self.error_at(
                HouseErrorCode::InvalidValue,
                format!("{field_name} must be finite"),
                node,
            ));
        }
        Ok(parsed)
    }

    fn positive_number(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
    ) -> Result<f32, HouseCompileError> {
        let parsed = self.number(node, field_name)?;
        if parsed <= 0.0 {
            return Err(self.error_at(
                HouseErrorCode::InvalidValue,
                format!("{field_name} must be > 0"),
                node,
            ));
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_house(dir: &Path, content: &str) {
        fs::create_dir_all(dir).expect("mkdir");
        fs::write(dir.join(HOUSE_FILE_NAME), content).expect("write");
    }

    fn parse(raw: &str) -> Result<HouseDef, HouseCompileError> {
        parse_house_document(Path::new("house.xml"), raw)
    }

    #[test]
    fn valid_house_compiles_in_document_order() {
        let temp = TempDir::new().expect("temp");
        let base = temp.path().join("assets").join("base");
        write_house(
            &base,
            r#"<House>
                <pixelsPerUnit>16</pixelsPerUnit>
                <fallbackRoomWidth>3.5</fallbackRoomWidth>
                <Room><sprite>rooms/living</sprite><width>4</width><safeY>-0.5</safeY></Room>
                <Room><sprite>rooms/kitchen</sprite></Room>
                <Furniture><name>sofa</name><layer>Furniture</layer><x>1</x><y>-0.2</y><halfWidth>0.6</halfWidth><halfHeight>0.3</halfHeight></Furniture>
                <Bed><x>4</x><y>-1</y></Bed>
            </House>"#,
        );

        let house = compile_house_def(&base).expect("compile");
        assert!((house.pixels_per_unit - 16.0).abs() < f32::EPSILON);
        assert!((house.fallback_room_width - 3.5).abs() < f32::EPSILON);
        assert_eq!(house.rooms.len(), 2);
        assert_eq!(house.rooms[0].sprite, "rooms/living");
        assert_eq!(house.rooms[0].width, Some(4.0));
        assert_eq!(house.rooms[0].safe_y, Some(-0.5));
        assert_eq!(house.rooms[1].width, None);
        assert_eq!(house.furniture[0].name, "sofa");
        assert_eq!(house.furniture[0].half_extents, Vec2 { x: 0.6, y: 0.3 });
        assert_eq!(
            house.bed.map(|bed| bed.anchor),
            Some(Vec2 { x: 4.0, y: -1.0 })
        );
        assert!(house.source_path.ends_with(HOUSE_FILE_NAME));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let temp = TempDir::new().expect("temp");
        let err = compile_house_def(temp.path()).expect_err("err");
        assert_eq!(err.code, HouseErrorCode::ReadFile);
        assert!(err.location.is_none());
    }

    #[test]
    fn defaults_apply_when_scalars_missing() {
        let house = parse("<House><Room><sprite>a</sprite></Room></House>").expect("parse");
        assert!((house.pixels_per_unit - DEFAULT_PIXELS_PER_UNIT).abs() < f32::EPSILON);
        assert!((house.fallback_room_width - DEFAULT_FALLBACK_ROOM_WIDTH).abs() < f32::EPSILON);
        assert!(house.bed.is_none());
    }

    #[test]
    fn malformed_xml_reports_location() {
        let err = parse("<House><Room><sprite>a</sprite></House>").expect_err("err");
        assert_eq!(err.code, HouseErrorCode::XmlMalformed);
        assert!(err.location.is_some());
    }

    #[test]
    fn wrong_root_is_rejected() {
        let err = parse("<Defs/>").expect_err("err");
        assert_eq!(err.code, HouseErrorCode::InvalidRoot);
    }

    #[test]
    fn house_without_rooms_is_rejected() {
        let err = parse("<House><pixelsPerUnit>16</pixelsPerUnit></House>").expect_err("err");
        assert_eq!(err.code, HouseErrorCode::NoRooms);
    }

    #[test]
    fn unknown_element_and_field_are_distinguished() {
        let element = parse("<House><Garden/></House>").expect_err("err");
        assert_eq!(element.code, HouseErrorCode::UnknownElement);

        let field =
            parse("<House><Room><sprite>a</sprite><mood>x</mood></Room></House>").expect_err("err");
        assert_eq!(field.code, HouseErrorCode::UnknownField);
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let room = parse("<House><Room><sprite>a</sprite><sprite>b</sprite></Room></House>")
            .expect_err("err");
        assert_eq!(room.code, HouseErrorCode::DuplicateField);

        let house = parse(
            "<House><pixelsPerUnit>1</pixelsPerUnit><pixelsPerUnit>2</pixelsPerUnit><Room><sprite>a</sprite></Room></House>",
        )
        .expect_err("err");
        assert_eq!(house.code, HouseErrorCode::DuplicateField);
    }

    #[test]
    fn missing_required_field_reports_location() {
        let err = parse(
            "<House><Room><sprite>a</sprite></Room>\n<Furniture><name>desk</name><layer>Furniture</layer><x>0</x><y>0</y><halfWidth>1</halfWidth></Furniture></House>",
        )
        .expect_err("err");
        assert_eq!(err.code, HouseErrorCode::MissingField);
        assert!(err.message.contains("halfHeight"));
        assert_eq!(err.location.map(|loc| loc.line), Some(2));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        for raw in [
            "<House><Room><sprite>a</sprite><width>wide</width></Room></House>",
            "<House><Room><sprite>a</sprite><width>0</width></Room></House>",
            "<House><Room><sprite>a</sprite><safeY>NaN</safeY></Room></House>",
            "<House><pixelsPerUnit>-4</pixelsPerUnit><Room><sprite>a</sprite></Room></House>",
        ] {
            let err = parse(raw).expect_err("err");
            assert_eq!(err.code, HouseErrorCode::InvalidValue, "raw={raw}");
        }
    }

    #[test]
    fn sprite_keys_are_validated() {
        for key in ["rooms/living", "a-b/c_d", "room2"] {
            assert!(check_sprite_key(key).is_ok(), "key={key}");
        }
        for key in ["/a", "a/../b", r"a\b", "Rooms", "a.png"] {
            assert!(check_sprite_key(key).is_err(), "key={key}");
        }

        let err = parse("<House><Room><sprite>../etc</sprite></Room></House>").expect_err("err");
        assert_eq!(err.code, HouseErrorCode::InvalidValue);
    }

    #[test]
    fn display_includes_location() {
        let err = parse("<Defs/>").expect_err("err");
        let text = err.to_string();
        assert!(text.contains("InvalidRoot"));
        assert!(text.contains("line=1"));
    }
}
