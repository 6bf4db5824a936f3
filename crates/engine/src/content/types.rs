use std::path::PathBuf;

use crate::sim::{AnimationTable, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Player,
    Spinner,
    VerticalMover,
    Jumper,
}

impl ActorRole {
    pub fn is_player(self) -> bool {
        matches!(self, ActorRole::Player)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AiState {
    #[default]
    Idle,
    Walking,
}

/// One actor spawn. Paths are relative to the asset directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorDef {
    pub role: ActorRole,
    pub ai_state: AiState,
    pub position: Vec3,
    pub speed: f32,
    pub acceleration: Vec3,
    pub jumping_power: f32,
    pub half_width: f32,
    pub half_height: f32,
    pub scale: Vec2,
    pub texture: PathBuf,
    pub animation: AnimationTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapDef {
    pub width: u32,
    pub height: u32,
    pub tile_size: f32,
    pub tileset: PathBuf,
    pub tileset_columns: u32,
    pub tileset_rows: u32,
    /// Row-major, `width * height` entries, row 0 on top.
    pub tiles: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelAssets {
    pub background: PathBuf,
    pub font: PathBuf,
    pub music: PathBuf,
    pub jump_sound: PathBuf,
}

/// A validated level: the tile count matches the map size and there is
/// exactly one player, listed first.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDef {
    pub map: MapDef,
    pub assets: LevelAssets,
    actors: Vec<ActorDef>,
}

impl LevelDef {
    pub(crate) fn new(map: MapDef, assets: LevelAssets, actors: Vec<ActorDef>) -> Self {
        Self {
            map,
            assets,
            actors,
        }
    }

    pub fn actors(&self) -> &[ActorDef] {
        &self.actors
    }

    pub fn player(&self) -> &ActorDef {
        &self.actors[0]
    }

    pub fn enemies(&self) -> &[ActorDef] {
        &self.actors[1..]
    }
}
