use crate::sim::Vec2;

/// Opaque handle to a texture owned by a render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Axis-aligned 2D transform: scale, then translate. Rotation is not
/// supported by the simulation and so is not representable here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub scale: Vec2,
    pub translation: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        scale: Vec2::new(1.0, 1.0),
        translation: Vec2::new(0.0, 0.0),
    };

    pub const fn translation(x: f32, y: f32) -> Self {
        Self {
            scale: Vec2::new(1.0, 1.0),
            translation: Vec2::new(x, y),
        }
    }

    pub const fn with_scale(mut self, x: f32, y: f32) -> Self {
        self.scale = Vec2::new(x, y);
        self
    }

    pub fn apply(&self, point: [f32; 2]) -> [f32; 2] {
        [
            point[0] * self.scale.x + self.translation.x,
            point[1] * self.scale.y + self.translation.y,
        ]
    }
}

/// Narrow drawing contract consumed by scenes. Geometry is a triangle list in
/// model space with one UV per vertex; the backend applies model, view and its
/// own projection.
pub trait RenderBackend {
    fn upload_texture(&mut self, rgba: &[u8], width: u32, height: u32) -> TextureHandle;
    fn set_model_transform(&mut self, transform: Transform2D);
    fn set_view_transform(&mut self, transform: Transform2D);
    fn draw_triangles(&mut self, positions: &[[f32; 2]], uvs: &[[f32; 2]], texture: TextureHandle);
}
