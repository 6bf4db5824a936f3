use thiserror::Error;

use super::audio::{AudioBackend, AudioError};
use super::input::InputSnapshot;
use super::rendering::{RenderBackend, TextureLoadError};
use super::run_state::Outcome;
use crate::content::LevelLoadError;
use crate::sim::TileGridError;

/// Everything that can stop a scene from loading. All of these are fatal
/// before the loop starts ticking.
#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error(transparent)]
    Level(#[from] LevelLoadError),
    #[error("invalid tile grid: {0}")]
    TileGrid(#[from] TileGridError),
    #[error(transparent)]
    Texture(#[from] TextureLoadError),
    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// A scene owns its simulation state. The loop calls `update` once per fixed
/// tick and `render` once per presented frame; `outcome` is sampled after
/// every render pass.
pub trait Scene {
    fn load(
        &mut self,
        renderer: &mut dyn RenderBackend,
        audio: &mut dyn AudioBackend,
    ) -> Result<(), SceneLoadError>;
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        audio: &mut dyn AudioBackend,
    );
    fn render(&mut self, renderer: &mut dyn RenderBackend);
    fn outcome(&self) -> Option<Outcome>;
    fn unload(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}
