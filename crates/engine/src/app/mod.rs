mod audio;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod run_state;
mod scene;
mod stepper;

pub use audio::{AudioBackend, AudioError, AudioHandle, LoggedAudio};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    load_texture, sheet_cell_uv, sprite_quad, text_mesh, textured_rect, view_to_screen, Mesh,
    Projection, Rasterizer, RenderBackend, Renderer, TextureHandle, TextureLoadError, Transform2D,
    Viewport,
};
pub use run_state::{Outcome, RunState, RunStatus};
pub use scene::{Scene, SceneLoadError};
pub use stepper::{FixedStepper, StepPlan};
