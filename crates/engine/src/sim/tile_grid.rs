use thiserror::Error;

use crate::app::{sheet_cell_uv, Mesh, TextureHandle};

use super::math::{Aabb, Vec2, Vec3};

/// Cell coordinate on the grid. Signed so that queries beyond the grid edges
/// can be expressed; such cells are never solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub col: i32,
    pub row: i32,
}

/// Grid origin convention:
/// - tile (col,row) has its top-left corner at `(col * tile_size, -row * tile_size)`.
/// - row 0 is the top row; rows grow downward in world space.
/// - tile id 0 is empty, any other id is solid and indexes the tileset.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<u32>,
    tile_size: f32,
    tileset_columns: u32,
    tileset_rows: u32,
    tileset_texture: TextureHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TileGridError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tile size must be finite and > 0, got {0}")]
    InvalidTileSize(f32),
    #[error("tileset must have at least one column and one row, got {columns}x{rows}")]
    EmptyTileset { columns: u32, rows: u32 },
}

impl TileGrid {
    pub fn new(
        width: u32,
        height: u32,
        tiles: Vec<u32>,
        tile_size: f32,
        tileset_columns: u32,
        tileset_rows: u32,
        tileset_texture: TextureHandle,
    ) -> Result<Self, TileGridError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TileGridError::TileCountMismatch { expected, actual });
        }
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(TileGridError::InvalidTileSize(tile_size));
        }
        if tileset_columns == 0 || tileset_rows == 0 {
            return Err(TileGridError::EmptyTileset {
                columns: tileset_columns,
                rows: tileset_rows,
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
            tile_size,
            tileset_columns,
            tileset_rows,
            tileset_texture,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn tileset_texture(&self) -> TextureHandle {
        self.tileset_texture
    }

    fn index_of(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    /// Tile id at a cell; `None` outside the grid.
    pub fn tile_at(&self, col: i32, row: i32) -> Option<u32> {
        self.index_of(col, row)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.tile_at(col, row).is_some_and(|id| id != 0)
    }

    pub fn cell_at_world(&self, position: Vec3) -> TileCoord {
        TileCoord {
            col: (position.x / self.tile_size).floor() as i32,
            row: (-position.y / self.tile_size).floor() as i32,
        }
    }

    /// Tile id occupying a world position; `None` outside the grid.
    pub fn tile_at_world(&self, position: Vec3) -> Option<u32> {
        let cell = self.cell_at_world(position);
        self.tile_at(cell.col, cell.row)
    }

    pub fn tile_world_bounds(&self, col: i32, row: i32) -> Aabb {
        let left = col as f32 * self.tile_size;
        let top = -(row as f32) * self.tile_size;
        Aabb {
            min: Vec2::new(left, top - self.tile_size),
            max: Vec2::new(left + self.tile_size, top),
        }
    }

    /// In-bounds cells whose rectangle strictly intersects `bounds`, row-major.
    pub fn query_overlapping_tiles(&self, bounds: &Aabb) -> Vec<TileCoord> {
        let col_min = ((bounds.min.x / self.tile_size).floor() as i32).max(0);
        let col_max = ((bounds.max.x / self.tile_size).ceil() as i32 - 1)
            .min(self.width as i32 - 1);
        let row_min = ((-bounds.max.y / self.tile_size).floor() as i32).max(0);
        let row_max = ((-bounds.min.y / self.tile_size).ceil() as i32 - 1)
            .min(self.height as i32 - 1);

        let mut cells = Vec::new();
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                cells.push(TileCoord { col, row });
            }
        }
        cells
    }

    /// One textured quad per solid tile, in world units.
    pub fn build_mesh(&self) -> Mesh {
        let mut mesh = Mesh::default();
        for row in 0..self.height as i32 {
            for col in 0..self.width as i32 {
                let Some(tile_id) = self.tile_at(col, row).filter(|id| *id != 0) else {
                    continue;
                };
                let bounds = self.tile_world_bounds(col, row);
                mesh.push_rect(
                    bounds.min.x,
                    bounds.max.y,
                    bounds.max.x,
                    bounds.min.y,
                    sheet_cell_uv(tile_id, self.tileset_columns, self.tileset_rows),
                );
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: u32, height: u32, tiles: Vec<u32>) -> TileGrid {
        TileGrid::new(width, height, tiles, 1.0, 2, 2, TextureHandle(0)).expect("grid")
    }

    #[test]
    fn rejects_mismatched_tile_count() {
        let err = TileGrid::new(3, 2, vec![0; 5], 1.0, 2, 2, TextureHandle(0)).expect_err("err");
        assert_eq!(
            err,
            TileGridError::TileCountMismatch {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn rejects_non_positive_tile_size() {
        let err = TileGrid::new(1, 1, vec![1], -1.0, 2, 2, TextureHandle(0)).expect_err("err");
        assert!(matches!(err, TileGridError::InvalidTileSize(_)));
    }

    #[test]
    fn out_of_bounds_and_empty_cells_are_not_solid() {
        let grid = grid(2, 2, vec![0, 1, 3, 0]);
        assert!(!grid.is_solid(0, 0));
        assert!(grid.is_solid(1, 0));
        assert!(grid.is_solid(0, 1));
        assert!(!grid.is_solid(-1, 0));
        assert!(!grid.is_solid(2, 0));
        assert!(!grid.is_solid(0, 7));
    }

    #[test]
    fn tile_bounds_follow_top_left_convention() {
        let grid = TileGrid::new(4, 4, vec![0; 16], 2.0, 1, 1, TextureHandle(0)).expect("grid");
        let bounds = grid.tile_world_bounds(1, 2);
        assert_eq!(bounds.min, Vec2::new(2.0, -6.0));
        assert_eq!(bounds.max, Vec2::new(4.0, -4.0));
    }

    #[test]
    fn tile_at_world_maps_into_cells() {
        let grid = grid(2, 2, vec![0, 1, 3, 0]);
        assert_eq!(grid.tile_at_world(Vec3::xy(1.5, -0.5)), Some(1));
        assert_eq!(grid.tile_at_world(Vec3::xy(0.2, -1.2)), Some(3));
        assert_eq!(grid.tile_at_world(Vec3::xy(-0.2, -0.5)), None);
        assert_eq!(grid.tile_at_world(Vec3::xy(0.5, 0.5)), None);
    }

    #[test]
    fn query_excludes_cells_that_only_touch() {
        let grid = grid(3, 3, vec![0; 9]);
        let exact = Aabb {
            min: Vec2::new(1.0, -2.0),
            max: Vec2::new(2.0, -1.0),
        };
        assert_eq!(
            grid.query_overlapping_tiles(&exact),
            vec![TileCoord { col: 1, row: 1 }]
        );

        let straddling = Aabb {
            min: Vec2::new(0.5, -1.5),
            max: Vec2::new(1.5, -0.5),
        };
        assert_eq!(grid.query_overlapping_tiles(&straddling).len(), 4);
    }

    #[test]
    fn query_clips_to_grid() {
        let grid = grid(2, 2, vec![1; 4]);
        let outside = Aabb {
            min: Vec2::new(-5.0, 1.0),
            max: Vec2::new(-4.0, 2.0),
        };
        assert!(grid.query_overlapping_tiles(&outside).is_empty());
    }

    #[test]
    fn mesh_has_one_quad_per_solid_tile() {
        let grid = grid(2, 2, vec![0, 1, 3, 0]);
        let mesh = grid.build_mesh();
        assert_eq!(mesh.positions.len(), 12);
        assert_eq!(mesh.uvs.len(), 12);
        // tile id 3 on a 2x2 sheet is the bottom-right cell
        assert_eq!(mesh.uvs[6], [0.5, 0.5]);
    }
}
