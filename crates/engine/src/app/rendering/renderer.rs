use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use super::backend::{RenderBackend, TextureHandle, Transform2D};
use super::transform::{view_to_screen, Projection, Viewport};

#[derive(Debug, Clone)]
struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    /// Nearest-neighbour sample with clamped addressing.
    fn sample(&self, u: f32, v: f32) -> [u8; 4] {
        let x = ((u * self.width as f32).floor() as i64).clamp(0, self.width as i64 - 1) as usize;
        let y = ((v * self.height as f32).floor() as i64).clamp(0, self.height as i64 - 1) as usize;
        let offset = (y * self.width as usize + x) * 4;
        [
            self.rgba[offset],
            self.rgba[offset + 1],
            self.rgba[offset + 2],
            self.rgba[offset + 3],
        ]
    }
}

/// CPU triangle rasterizer over an RGBA8 frame. Owns uploaded textures and
/// the current model and view transforms.
#[derive(Debug)]
pub struct Rasterizer {
    viewport: Viewport,
    projection: Projection,
    frame: Vec<u8>,
    textures: Vec<Texture>,
    model: Transform2D,
    view: Transform2D,
}

impl Rasterizer {
    pub fn new(width: u32, height: u32, projection: Projection) -> Self {
        Self {
            viewport: Viewport { width, height },
            projection,
            frame: vec![0; width as usize * height as usize * 4],
            textures: Vec::new(),
            model: Transform2D::IDENTITY,
            view: Transform2D::IDENTITY,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport { width, height };
        self.frame = vec![0; width as usize * height as usize * 4];
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }
        let offset = (y as usize * self.viewport.width as usize + x as usize) * 4;
        let px = &self.frame[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    fn to_screen(&self, point: [f32; 2]) -> [f32; 2] {
        let world = self.model.apply(point);
        let view = self.view.apply(world);
        view_to_screen(view, self.projection, self.viewport)
    }

    fn fill_triangle(&mut self, screen: [[f32; 2]; 3], uvs: [[f32; 2]; 3], texture: usize) {
        let [a, b, c] = screen;
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        let width = self.viewport.width as i64;
        let height = self.viewport.height as i64;
        let min_x = (a[0].min(b[0]).min(c[0]).floor() as i64).max(0);
        let max_x = (a[0].max(b[0]).max(c[0]).ceil() as i64).min(width - 1);
        let min_y = (a[1].min(b[1]).min(c[1]).floor() as i64).max(0);
        let max_y = (a[1].max(b[1]).max(c[1]).ceil() as i64).min(height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f32 + 0.5, y as f32 + 0.5];
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let u = w0 * uvs[0][0] + w1 * uvs[1][0] + w2 * uvs[2][0];
                let v = w0 * uvs[0][1] + w1 * uvs[1][1] + w2 * uvs[2][1];
                let src = self.textures[texture].sample(u, v);
                let offset = (y as usize * self.viewport.width as usize + x as usize) * 4;
                blend_over(&mut self.frame[offset..offset + 4], src);
            }
        }
    }
}

impl RenderBackend for Rasterizer {
    fn upload_texture(&mut self, rgba: &[u8], width: u32, height: u32) -> TextureHandle {
        let expected = width as usize * height as usize * 4;
        let texture = if width == 0 || height == 0 || rgba.len() != expected {
            warn!(
                width,
                height,
                bytes = rgba.len(),
                "renderer_texture_size_mismatch_using_placeholder"
            );
            Texture {
                width: 1,
                height: 1,
                rgba: vec![255, 0, 255, 255],
            }
        } else {
            Texture {
                width,
                height,
                rgba: rgba.to_vec(),
            }
        };
        self.textures.push(texture);
        TextureHandle(self.textures.len() as u32 - 1)
    }

    fn set_model_transform(&mut self, transform: Transform2D) {
        self.model = transform;
    }

    fn set_view_transform(&mut self, transform: Transform2D) {
        self.view = transform;
    }

    fn draw_triangles(&mut self, positions: &[[f32; 2]], uvs: &[[f32; 2]], texture: TextureHandle) {
        let index = texture.0 as usize;
        if index >= self.textures.len() {
            warn!(texture = texture.0, "renderer_unknown_texture");
            return;
        }
        if positions.len() != uvs.len() {
            warn!(
                positions = positions.len(),
                uvs = uvs.len(),
                "renderer_vertex_uv_mismatch"
            );
            return;
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return;
        }
        for (tri, tri_uvs) in positions.chunks_exact(3).zip(uvs.chunks_exact(3)) {
            let screen = [
                self.to_screen(tri[0]),
                self.to_screen(tri[1]),
                self.to_screen(tri[2]),
            ];
            self.fill_triangle(screen, [tri_uvs[0], tri_uvs[1], tri_uvs[2]], index);
        }
    }
}

fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

fn blend_over(dst: &mut [u8], src: [u8; 4]) {
    let alpha = u32::from(src[3]);
    if alpha == 0 {
        return;
    }
    let inverse = 255 - alpha;
    for channel in 0..3 {
        let blended =
            (u32::from(src[channel]) * alpha + u32::from(dst[channel]) * inverse + 127) / 255;
        dst[channel] = blended as u8;
    }
    dst[3] = 255;
}

/// Window-backed renderer: rasterizes on the CPU and presents through `pixels`.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    rasterizer: Rasterizer,
}

impl Renderer {
    pub fn new(window: Arc<Window>, projection: Projection) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            rasterizer: Rasterizer::new(size.width, size.height, projection),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.rasterizer.resize(width, height);
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn begin_frame(&mut self, clear_color: [u8; 4]) {
        self.rasterizer.clear(clear_color);
    }

    pub fn present(&mut self) -> Result<(), Error> {
        let frame = self.pixels.frame_mut();
        if frame.len() == self.rasterizer.frame().len() {
            frame.copy_from_slice(self.rasterizer.frame());
        }
        self.pixels.render()
    }
}

impl RenderBackend for Renderer {
    fn upload_texture(&mut self, rgba: &[u8], width: u32, height: u32) -> TextureHandle {
        self.rasterizer.upload_texture(rgba, width, height)
    }

    fn set_model_transform(&mut self, transform: Transform2D) {
        self.rasterizer.set_model_transform(transform);
    }

    fn set_view_transform(&mut self, transform: Transform2D) {
        self.rasterizer.set_view_transform(transform);
    }

    fn draw_triangles(&mut self, positions: &[[f32; 2]], uvs: &[[f32; 2]], texture: TextureHandle) {
        self.rasterizer.draw_triangles(positions, uvs, texture);
    }
}
