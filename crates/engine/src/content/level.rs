use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::info;

use crate::sim::{AnimationTable, Vec2, Vec3, FRAMES_PER_DIRECTION};

use super::types::{ActorDef, ActorRole, AiState, LevelAssets, LevelDef, MapDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    TileCountMismatch,
    MissingPlayer,
}

#[derive(Debug, Clone)]
pub struct LevelLoadError {
    pub code: LevelErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for LevelLoadError {
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

impl std::error::Error for LevelLoadError {}

pub fn load_level(file_path: &Path) -> Result<LevelDef, LevelLoadError> {
    let raw = fs::read_to_string(file_path).map_err(|error| LevelLoadError {
        code: LevelErrorCode::ReadFile,
        message: format!("failed to read level file: {error}"),
        file_path: file_path.to_path_buf(),
        location: None,
    })?;
    let level = parse_level(file_path, &raw)?;
    info!(
        path = %file_path.display(),
        width = level.map.width,
        height = level.map.height,
        enemies = level.enemies().len(),
        "level_loaded"
    );
    Ok(level)
}

/// Parses a `<Level>` document. `file_path` is only used for error reports.
pub fn parse_level(file_path: &Path, raw: &str) -> Result<LevelDef, LevelLoadError> {
    let doc = Document::parse(raw).map_err(|error| LevelLoadError {
        code: LevelErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    LevelParser {
        file_path,
        doc: &doc,
    }
    .parse()
}

struct LevelParser<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl<'a, 'input> LevelParser<'a, 'input> {
    fn parse(&self) -> Result<LevelDef, LevelLoadError> {
        let root = self.doc.root_element();
        if root.tag_name().name() != "Level" {
            return Err(self.error_at(
                LevelErrorCode::InvalidRoot,
                "root element must be <Level>".to_string(),
                root,
            ));
        }

        let mut map = None;
        let mut assets = None;
        let mut player = None;
        let mut enemies = Vec::new();
        for child in root.children().filter(|child| child.is_element()) {
            match child.tag_name().name() {
                "Map" => {
                    if map.is_some() {
                        return Err(self.duplicate(child, "Level"));
                    }
                    map = Some(self.parse_map(child)?);
                }
                "Assets" => {
                    if assets.is_some() {
                        return Err(self.duplicate(child, "Level"));
                    }
                    assets = Some(self.parse_assets(child)?);
                }
                "Actor" => {
                    let actor = self.parse_actor(child)?;
                    if !actor.role.is_player() {
                        enemies.push(actor);
                    } else if player.is_some() {
                        return Err(self.error_at(
                            LevelErrorCode::InvalidValue,
                            "a level must have exactly one Player actor".to_string(),
                            child,
                        ));
                    } else {
                        player = Some(actor);
                    }
                }
                other => {
                    return Err(self.error_at(
                        LevelErrorCode::UnknownField,
                        format!("unknown element <{other}> in <Level>"),
                        child,
                    ))
                }
            }
        }

        let map = map.ok_or_else(|| self.missing(root, "Map", "Level"))?;
        let assets = assets.ok_or_else(|| self.missing(root, "Assets", "Level"))?;
        let Some(player) = player else {
            return Err(self.error_at(
                LevelErrorCode::MissingPlayer,
                "level has no <Actor> with role Player".to_string(),
                root,
            ));
        };

        let mut actors = Vec::with_capacity(enemies.len() + 1);
        actors.push(player);
        actors.extend(enemies);
        Ok(LevelDef::new(map, assets, actors))
    }

    fn parse_map(&self, node: Node<'a, 'input>) -> Result<MapDef, LevelLoadError> {
        let mut seen = HashSet::new();
        let mut width = None;
        let mut height = None;
        let mut tile_size = None;
        let mut tileset = None;
        let mut tileset_columns = None;
        let mut tileset_rows = None;
        let mut tiles = None;

        for field in node.children().filter(|child| child.is_element()) {
            let name = field.tag_name().name();
            if !seen.insert(name) {
                return Err(self.duplicate(field, "Map"));
            }
            match name {
                "width" => width = Some(self.positive_u32(field, name)?),
                "height" => height = Some(self.positive_u32(field, name)?),
                "tileSize" => tile_size = Some(self.positive_f32(field, name)?),
                "tileset" => tileset = Some(PathBuf::from(self.required_text(field, name)?)),
                "tilesetColumns" => tileset_columns = Some(self.positive_u32(field, name)?),
                "tilesetRows" => tileset_rows = Some(self.positive_u32(field, name)?),
                "tiles" => tiles = Some((self.u32_list(field, name)?, field)),
                _ => return Err(self.unknown(field, "Map")),
            }
        }

        let width = width.ok_or_else(|| self.missing(node, "width", "Map"))?;
        let height = height.ok_or_else(|| self.missing(node, "height", "Map"))?;
        let tile_size = tile_size.ok_or_else(|| self.missing(node, "tileSize", "Map"))?;
        let tileset = tileset.ok_or_else(|| self.missing(node, "tileset", "Map"))?;
        let tileset_columns =
            tileset_columns.ok_or_else(|| self.missing(node, "tilesetColumns", "Map"))?;
        let tileset_rows = tileset_rows.ok_or_else(|| self.missing(node, "tilesetRows", "Map"))?;
        let (tiles, tiles_node) = tiles.ok_or_else(|| self.missing(node, "tiles", "Map"))?;

        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(self.error_at(
                LevelErrorCode::TileCountMismatch,
                format!(
                    "<tiles> holds {} entries but the map is {width}x{height} ({expected})",
                    tiles.len()
                ),
                tiles_node,
            ));
        }

        Ok(MapDef {
            width,
            height,
            tile_size,
            tileset,
            tileset_columns,
            tileset_rows,
            tiles,
        })
    }

    fn parse_assets(&self, node: Node<'a, 'input>) -> Result<LevelAssets, LevelLoadError> {
        let mut seen = HashSet::new();
        let mut background = None;
        let mut font = None;
        let mut music = None;
        let mut jump_sound = None;

        for field in node.children().filter(|child| child.is_element()) {
            let name = field.tag_name().name();
            if !seen.insert(name) {
                return Err(self.duplicate(field, "Assets"));
            }
            let slot = match name {
                "background" => &mut background,
                "font" => &mut font,
                "music" => &mut music,
                "jumpSound" => &mut jump_sound,
                _ => return Err(self.unknown(field, "Assets")),
            };
            *slot = Some(PathBuf::from(self.required_text(field, name)?));
        }

        Ok(LevelAssets {
            background: background.ok_or_else(|| self.missing(node, "background", "Assets"))?,
            font: font.ok_or_else(|| self.missing(node, "font", "Assets"))?,
            music: music.ok_or_else(|| self.missing(node, "music", "Assets"))?,
            jump_sound: jump_sound.ok_or_else(|| self.missing(node, "jumpSound", "Assets"))?,
        })
    }

    fn parse_actor(&self, node: Node<'a, 'input>) -> Result<ActorDef, LevelLoadError> {
        let mut seen = HashSet::new();
        let mut role = None;
        let mut ai_state = AiState::default();
        let mut position = None;
        let mut speed = None;
        let mut acceleration = Vec3::ZERO;
        let mut jumping_power = 0.0;
        let mut half_extents = None;
        let mut scale = Vec2::new(1.0, 1.0);
        let mut texture = None;
        let mut sheet = (1, 1);
        let mut frames = None;

        for field in node.children().filter(|child| child.is_element()) {
            let name = field.tag_name().name();
            if !seen.insert(name) {
                return Err(self.duplicate(field, "Actor"));
            }
            match name {
                "role" => role = Some(self.parse_role(field)?),
                "aiState" => ai_state = self.parse_ai_state(field)?,
                "position" => {
                    let (x, y) = self.f32_pair(field, name)?;
                    position = Some(Vec3::xy(x, y));
                }
                "speed" => speed = Some(self.non_negative_f32(field, name)?),
                "acceleration" => {
                    let (x, y) = self.f32_pair(field, name)?;
                    acceleration = Vec3::xy(x, y);
                }
                "jumpingPower" => jumping_power = self.non_negative_f32(field, name)?,
                "halfExtents" => {
                    let (w, h) = self.f32_pair(field, name)?;
                    if !(w > 0.0 && h > 0.0) {
                        return Err(self.error_at(
                            LevelErrorCode::InvalidValue,
                            "halfExtents must both be > 0".to_string(),
                            field,
                        ));
                    }
                    half_extents = Some((w, h));
                }
                "scale" => {
                    let (x, y) = self.f32_pair(field, name)?;
                    scale = Vec2::new(x, y);
                }
                "texture" => texture = Some(PathBuf::from(self.required_text(field, name)?)),
                "sheet" => {
                    let values = self.u32_list(field, name)?;
                    match values.as_slice() {
                        [columns, rows] if *columns > 0 && *rows > 0 => sheet = (*columns, *rows),
                        _ => {
                            return Err(self.error_at(
                                LevelErrorCode::InvalidValue,
                                "sheet must be two positive integers: columns rows".to_string(),
                                field,
                            ))
                        }
                    }
                }
                "animation" => frames = Some(self.parse_frames(field)?),
                _ => return Err(self.unknown(field, "Actor")),
            }
        }

        let role = role.ok_or_else(|| self.missing(node, "role", "Actor"))?;
        let position = position.ok_or_else(|| self.missing(node, "position", "Actor"))?;
        let speed = speed.ok_or_else(|| self.missing(node, "speed", "Actor"))?;
        let (half_width, half_height) =
            half_extents.ok_or_else(|| self.missing(node, "halfExtents", "Actor"))?;
        let texture = texture.ok_or_else(|| self.missing(node, "texture", "Actor"))?;
        let animation = AnimationTable {
            frames: frames.unwrap_or([[0; FRAMES_PER_DIRECTION]; 4]),
            sheet_columns: sheet.0,
            sheet_rows: sheet.1,
        };

        Ok(ActorDef {
            role,
            ai_state,
            position,
            speed,
            acceleration,
            jumping_power,
            half_width,
            half_height,
            scale,
            texture,
            animation,
        })
    }

    fn parse_role(&self, field: Node<'a, 'input>) -> Result<ActorRole, LevelLoadError> {
        let value = self.required_text(field, "role")?;
        match value.as_str() {
            "Player" => Ok(ActorRole::Player),
            "Spinner" => Ok(ActorRole::Spinner),
            "VerticalMover" => Ok(ActorRole::VerticalMover),
            "Jumper" => Ok(ActorRole::Jumper),
            _ => Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!(
                    "invalid role '{value}'; allowed values: Player, Spinner, VerticalMover, Jumper"
                ),
                field,
            )),
        }
    }

    fn parse_ai_state(&self, field: Node<'a, 'input>) -> Result<AiState, LevelLoadError> {
        let value = self.required_text(field, "aiState")?;
        match value.as_str() {
            "Idle" => Ok(AiState::Idle),
            "Walking" => Ok(AiState::Walking),
            _ => Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!("invalid aiState '{value}'; allowed values: Idle, Walking"),
                field,
            )),
        }
    }

    /// Four rows (left, right, up, down) of four cell indices.
    fn parse_frames(
        &self,
        field: Node<'a, 'input>,
    ) -> Result<[[u32; FRAMES_PER_DIRECTION]; 4], LevelLoadError> {
        let values = self.u32_list(field, "animation")?;
        if values.len() != FRAMES_PER_DIRECTION * 4 {
            return Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!(
                    "animation must list {} cell indices, got {}",
                    FRAMES_PER_DIRECTION * 4,
                    values.len()
                ),
                field,
            ));
        }
        let mut frames = [[0; FRAMES_PER_DIRECTION]; 4];
        for (index, value) in values.into_iter().enumerate() {
            frames[index / FRAMES_PER_DIRECTION][index % FRAMES_PER_DIRECTION] = value;
        }
        Ok(frames)
    }

    fn required_text(
        &self,
        node: Node<'a, 'input>,
        field_name: &str,
    ) -> Result<String, LevelLoadError> {
        let value = node.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(self.error_at(
                LevelErrorCode::MissingField,
                format!("field <{field_name}> must not be empty"),
                node,
            ));
        }
        Ok(value)
    }

    fn f32_value(&self, node: Node<'a, 'input>, field_name: &str) -> Result<f32, LevelLoadError> {
        let value = self.required_text(node, field_name)?;
        match value.parse::<f32>() {
            Ok(parsed) if parsed.is_finite() => Ok(parsed),
            _ => Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!("{field_name} '{value}' is not a valid number"),
                node,
            )),
        }
    }

    fn positive_f32(
        &self,
        node: Node<'a, 'input>,
        field_name: &str,
    ) -> Result<f32, LevelLoadError> {
        let value = self.f32_value(node, field_name)?;
        if value <= 0.0 {
            return Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!("{field_name} must be > 0"),
                node,
            ));
        }
        Ok(value)
    }

    fn non_negative_f32(
        &self,
        node: Node<'a, 'input>,
        field_name: &str,
    ) -> Result<f32, LevelLoadError> {
        let value = self.f32_value(node, field_name)?;
        if value < 0.0 {
            return Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!("{field_name} must be >= 0"),
                node,
            ));
        }
        Ok(value)
    }

    fn positive_u32(
        &self,
        node: Node<'a, 'input>,
        field_name: &str,
    ) -> Result<u32, LevelLoadError> {
        let value = self.required_text(node, field_name)?;
        match value.parse::<u32>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!("{field_name} '{value}' must be a positive integer"),
                node,
            )),
        }
    }

    /// Two whitespace-separated numbers, e.g. `<position>1 -1</position>`.
    fn f32_pair(
        &self,
        node: Node<'a, 'input>,
        field_name: &str,
    ) -> Result<(f32, f32), LevelLoadError> {
        let value = self.required_text(node, field_name)?;
        let parsed = value
            .split_whitespace()
            .map(str::parse::<f32>)
            .collect::<Result<Vec<_>, _>>();
        match parsed.as_deref() {
            Ok([x, y]) if x.is_finite() && y.is_finite() => Ok((*x, *y)),
            _ => Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!("{field_name} '{value}' must be two numbers: x y"),
                node,
            )),
        }
    }

    /// Integers separated by whitespace and/or commas.
    fn u32_list(
        &self,
        node: Node<'a, 'input>,
        field_name: &str,
    ) -> Result<Vec<u32>, LevelLoadError> {
        let value = self.required_text(node, field_name)?;
        value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<u32>().map_err(|_| {
                    self.error_at(
                        LevelErrorCode::InvalidValue,
                        format!("{field_name} entry '{token}' is not a non-negative integer"),
                        node,
                    )
                })
            })
            .collect()
    }

    fn duplicate(&self, node: Node<'a, 'input>, parent: &str) -> LevelLoadError {
        self.error_at(
            LevelErrorCode::DuplicateField,
            format!("duplicate <{}> in <{parent}>", node.tag_name().name()),
            node,
        )
    }

    fn unknown(&self, node: Node<'a, 'input>, parent: &str) -> LevelLoadError {
        self.error_at(
            LevelErrorCode::UnknownField,
            format!("unknown field <{}> in <{parent}>", node.tag_name().name()),
            node,
        )
    }

    fn missing(&self, node: Node<'a, 'input>, field_name: &str, parent: &str) -> LevelLoadError {
        self.error_at(
            LevelErrorCode::MissingField,
            format!("missing required field <{field_name}> in <{parent}>"),
            node,
        )
    }

    fn error_at(
        &self,
        code: LevelErrorCode,
        message: String,
        node: Node<'a, 'input>,
    ) -> LevelLoadError {
        let pos = self.doc.text_pos_at(node.range().start);
        LevelLoadError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }
}
