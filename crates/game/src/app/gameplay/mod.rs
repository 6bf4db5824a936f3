use std::collections::HashMap;
use std::path::{Path, PathBuf};

use engine::app::{
    load_texture, sprite_quad, text_mesh, textured_rect, AudioBackend, AudioHandle, InputAction,
    InputSnapshot, Mesh, Outcome, RenderBackend, Scene, SceneLoadError, TextureHandle,
    TextureLoadError, Transform2D,
};
use engine::content::{load_level, ActorDef, ActorRole, AiState};
use engine::sim::{AnimationClock, AnimationTable, Facing, KinematicBody, TileGrid, Vec2, Vec3};
use engine::AppPaths;
use tracing::{debug, info};

const PLAYER_INDEX: usize = 0;
const ATTACK_RADIUS: f32 = 1.5;
const VERTICAL_MOVER_PERIOD_SECONDS: f32 = 2.0;
const BANNER_OFFSET_X: f32 = -2.5;
const BANNER_OFFSET_Y: f32 = 0.5;
const BANNER_FONT_SIZE: f32 = 0.9;
const BANNER_SPACING: f32 = 0.15;
const FONT_BANK_SIZE: u32 = 16;
const BACKGROUND_HALF_WIDTH: f32 = 6.0;
const BACKGROUND_HALF_HEIGHT: f32 = 4.0;

include!("types.rs");
include!("systems.rs");
include!("encounter.rs");
include!("scene_impl.rs");

pub(crate) fn build_scene(paths: AppPaths, level_path: PathBuf) -> Box<dyn Scene> {
    Box::new(PlatformerScene::new(paths, level_path))
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
