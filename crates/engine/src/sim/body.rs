use super::math::{Aabb, Vec3};
use super::tile_grid::TileGrid;

/// Probe boxes are shrunk by this much before querying the grid so that a body
/// resting flush against a tile face is not re-resolved on the other axis.
const CONTACT_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

/// Position/velocity integration with axis-separated resolution against a
/// [`TileGrid`]. Horizontal speed has no inertia: it is `movement.x * speed`
/// every tick. Vertical speed integrates `acceleration.y` unless a vertical
/// intent sets it.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBody {
    pub position: Vec3,
    movement: Vec3,
    pub velocity_y: f32,
    pub acceleration: Vec3,
    pub speed: f32,
    pub jumping_power: f32,
    /// Collision half-extents.
    pub half_width: f32,
    pub half_height: f32,
    contacts: Contacts,
    active: bool,
}

impl KinematicBody {
    pub fn new(position: Vec3, speed: f32, half_width: f32, half_height: f32) -> Self {
        Self {
            position,
            movement: Vec3::ZERO,
            velocity_y: 0.0,
            acceleration: Vec3::ZERO,
            speed,
            jumping_power: 0.0,
            half_width,
            half_height,
            contacts: Contacts::default(),
            active: true,
        }
    }

    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_jumping_power(mut self, jumping_power: f32) -> Self {
        self.jumping_power = jumping_power;
        self
    }

    pub fn movement(&self) -> Vec3 {
        self.movement
    }

    /// Sets the intent for the next step, rescaled to unit length when the
    /// combined axes exceed 1.
    pub fn set_movement(&mut self, movement: Vec3) {
        self.movement = if movement.length() > 1.0 {
            movement.normalized()
        } else {
            movement
        };
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// One-way; there is no way back to active. Position is left untouched.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn contacts(&self) -> Contacts {
        self.contacts
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_width, self.half_height)
    }

    /// Launches the body if it is standing on something. Returns whether the
    /// jump happened.
    pub fn jump(&mut self) -> bool {
        if !self.active || !self.contacts.bottom {
            return false;
        }
        self.velocity_y = self.jumping_power;
        self.contacts.bottom = false;
        true
    }

    /// Advances one fixed tick: vertical integrate + resolve, then horizontal
    /// integrate + resolve.
    ///
    /// A non-zero vertical intent replaces `velocity_y` with
    /// `movement.y * speed` before gravity is added, so gravity biases that
    /// tick but never accumulates against the intent.
    /// Inactive bodies do not move.
    pub fn step(&mut self, dt: f32, grid: &TileGrid) {
        if !self.active {
            return;
        }
        if self.movement.y != 0.0 {
            self.velocity_y = self.movement.y * self.speed;
        }
        self.velocity_y += self.acceleration.y * dt;
        let dy = self.velocity_y * dt;
        self.position.y += dy;
        self.resolve_vertical(dy, grid);

        let dx = self.movement.x * self.speed * dt;
        self.position.x += dx;
        self.resolve_horizontal(dx, grid);
    }

    fn resolve_vertical(&mut self, dy: f32, grid: &TileGrid) {
        self.contacts.top = false;
        self.contacts.bottom = false;
        if dy == 0.0 {
            return;
        }

        let bounds = self.bounds();
        let mut deepest: Option<(f32, f32)> = None;
        for cell in grid.query_overlapping_tiles(&bounds.shrunk(CONTACT_EPSILON)) {
            if !grid.is_solid(cell.col, cell.row) {
                continue;
            }
            let tile = grid.tile_world_bounds(cell.col, cell.row);
            let (penetration, snapped_y) = if dy < 0.0 {
                (tile.max.y - bounds.min.y, tile.max.y + self.half_height)
            } else {
                (bounds.max.y - tile.min.y, tile.min.y - self.half_height)
            };
            if deepest.map_or(true, |(depth, _)| penetration > depth) {
                deepest = Some((penetration, snapped_y));
            }
        }

        let Some((_, snapped_y)) = deepest else {
            return;
        };
        self.position.y = snapped_y;
        self.velocity_y = 0.0;
        if dy < 0.0 {
            self.contacts.bottom = true;
        } else {
            self.contacts.top = true;
        }
    }

    fn resolve_horizontal(&mut self, dx: f32, grid: &TileGrid) {
        self.contacts.left = false;
        self.contacts.right = false;
        if dx == 0.0 {
            return;
        }

        let bounds = self.bounds();
        let mut deepest: Option<(f32, f32)> = None;
        for cell in grid.query_overlapping_tiles(&bounds.shrunk(CONTACT_EPSILON)) {
            if !grid.is_solid(cell.col, cell.row) {
                continue;
            }
            let tile = grid.tile_world_bounds(cell.col, cell.row);
            let (penetration, snapped_x) = if dx > 0.0 {
                (bounds.max.x - tile.min.x, tile.min.x - self.half_width)
            } else {
                (tile.max.x - bounds.min.x, tile.max.x + self.half_width)
            };
            if deepest.map_or(true, |(depth, _)| penetration > depth) {
                deepest = Some((penetration, snapped_x));
            }
        }

        let Some((_, snapped_x)) = deepest else {
            return;
        };
        self.position.x = snapped_x;
        if dx > 0.0 {
            self.contacts.right = true;
        } else {
            self.contacts.left = true;
        }
    }
}
