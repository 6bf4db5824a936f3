mod backend;
mod mesh;
mod renderer;
mod texture;
mod transform;

pub use backend::{RenderBackend, TextureHandle, Transform2D};
pub use mesh::{sheet_cell_uv, sprite_quad, text_mesh, textured_rect, Mesh};
pub use renderer::{Rasterizer, Renderer};
pub use texture::{load_texture, TextureLoadError};
pub use transform::{view_to_screen, Projection, Viewport};
