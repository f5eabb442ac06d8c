//! Grid-aligned terrain: tile kinds, their collision footprints and the
//! sparse map that stores them.

mod kind;
mod map;

pub use kind::TileKind;
pub use map::{GridPos, Tile, TileMap};

/// Edge length of one tile in world units.
pub const TILE_SIZE: f32 = 64.0;

pub const TERRAIN_SHEET: &str = "tiles/terrain";
pub const WATER_SHEET: &str = "tiles/water";
