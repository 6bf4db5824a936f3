mod animation;
mod body;
mod math;
mod tile_grid;

pub use animation::{
    AnimationClock, AnimationTable, Facing, DEFAULT_SECONDS_PER_FRAME, FRAMES_PER_DIRECTION,
};
pub use body::{Contacts, KinematicBody};
pub use math::{Aabb, Vec2, Vec3};
pub use tile_grid::{TileCoord, TileGrid, TileGridError};
