#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Orthographic projection centred on the view origin, expressed as the world
/// half-extents visible on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub half_width: f32,
    pub half_height: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            half_width: 5.0,
            half_height: 3.75,
        }
    }
}

/// Maps a view-space point to sub-pixel screen coordinates, y down.
pub fn view_to_screen(point: [f32; 2], projection: Projection, viewport: Viewport) -> [f32; 2] {
    let x = (point[0] / projection.half_width * 0.5 + 0.5) * viewport.width as f32;
    let y = (0.5 - point[1] / projection.half_height * 0.5) * viewport.height as f32;
    [x, y]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_viewport_center() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let [x, y] = view_to_screen([0.0, 0.0], Projection::default(), viewport);
        assert_eq!(x, 400.0);
        assert_eq!(y, 300.0);
    }

    #[test]
    fn projection_edges_map_to_viewport_corners() {
        let viewport = Viewport {
            width: 640,
            height: 480,
        };
        let projection = Projection::default();
        let top_left = view_to_screen([-5.0, 3.75], projection, viewport);
        let bottom_right = view_to_screen([5.0, -3.75], projection, viewport);
        assert_eq!(top_left, [0.0, 0.0]);
        assert_eq!(bottom_right, [640.0, 480.0]);
    }
}
