use std::path::Path;

use engine::tiles::TileMap;
use tracing::warn;

/// Island used when no tile map file is configured, first line on top.
const STARTER_ISLAND: &str = r"~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
~^^^^^^^^^^^^^^^^^^^^^^^^^^^^~
~[===##============##=======]~
~[==========================]~
~[==========================]~
~[==========================]~
~[==========================]~
~[==========================]~
~[==========================]~
~[==/===================\===]~
~____________________________~
~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~";

pub(crate) fn starter_island() -> TileMap {
    let mut map = TileMap::new();
    map.load_from_text(STARTER_ISLAND);
    map
}

/// Loads the configured map, falling back to the starter island when the
/// file is missing or malformed.
pub(crate) fn load_tile_map(path: Option<&Path>) -> TileMap {
    let Some(path) = path else {
        return starter_island();
    };
    let mut map = starter_island();
    if let Err(err) = map.load_json(path) {
        warn!(path = %path.display(), error = %err, "tile_map_load_failed");
    }
    map
}

#[cfg(test)]
mod tests {
    use engine::tiles::{GridPos, TileKind, TILE_SIZE};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn starter_island_is_a_full_rectangle() {
        let map = starter_island();
        assert_eq!(map.len(), 30 * 12);
        assert_eq!(map.get_tile(GridPos::new(0, 11)).map(|tile| tile.kind()), Some(TileKind::Water));
        assert_eq!(map.get_tile(GridPos::new(5, 9)).map(|tile| tile.kind()), Some(TileKind::Wall));
        assert_eq!(
            map.get_tile(GridPos::new(4, 2)).map(|tile| tile.kind()),
            Some(TileKind::SlopeUpRight)
        );
    }

    #[test]
    fn open_floor_is_walkable_and_walls_block() {
        let map = starter_island();
        assert!(!map.check_collision(400.0, 300.0, 80.0, 80.0));
        let wall_center = 5.5 * TILE_SIZE;
        assert!(map.check_collision(wall_center, 9.5 * TILE_SIZE, 10.0, 10.0));
    }

    #[test]
    fn missing_map_file_falls_back_to_island() {
        let temp = TempDir::new().expect("temp");
        let map = load_tile_map(Some(&temp.path().join("absent.json")));
        assert_eq!(map.len(), 30 * 12);
    }
}
