use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::{Camera2D, Painter, SpriteFrame};
use crate::geometry::{Aabb, Vec2};
use crate::persist::{read_json, write_json, PersistError};

use super::{TileKind, TERRAIN_SHEET, TILE_SIZE, WATER_SHEET};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a world coordinate.
    pub fn containing(point: Vec2) -> Self {
        Self {
            x: (point.x / TILE_SIZE).floor() as i32,
            y: (point.y / TILE_SIZE).floor() as i32,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    kind: TileKind,
    grid: GridPos,
    floor_level: i32,
    anim_frame: f32,
}

impl Tile {
    pub fn new(kind: TileKind, grid: GridPos, floor_level: i32) -> Self {
        Self {
            kind,
            grid,
            floor_level,
            anim_frame: 0.0,
        }
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn grid(&self) -> GridPos {
        self.grid
    }

    pub fn floor_level(&self) -> i32 {
        self.floor_level
    }

    /// Bottom-left corner in world units.
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.grid.x as f32 * TILE_SIZE, self.grid.y as f32 * TILE_SIZE)
    }

    pub fn bounds(&self) -> Aabb {
        let origin = self.origin();
        Aabb::new(origin.x, origin.y, origin.x + TILE_SIZE, origin.y + TILE_SIZE)
    }

    /// Collision sub-rectangles in world units.
    pub fn collision_boxes(&self) -> impl Iterator<Item = Aabb> + '_ {
        let origin = self.origin();
        self.kind
            .collision_boxes()
            .iter()
            .map(move |rect| rect.translated(origin))
    }

    pub fn collides_with(&self, query: &Aabb) -> bool {
        self.collision_boxes().any(|rect| rect.overlaps(query))
    }

    pub fn update(&mut self, dt: f32) {
        if let Some((frames, fps)) = self.kind.animation() {
            self.anim_frame = (self.anim_frame + fps * dt) % frames as f32;
        }
    }

    pub fn draw(&self, painter: &mut dyn Painter, camera: &Camera2D) {
        let center = camera.apply(self.bounds().center());
        let frame = match self.kind {
            TileKind::Water => SpriteFrame::new(WATER_SHEET, self.anim_frame as u32, TILE_SIZE as u32),
            kind => SpriteFrame::new(TERRAIN_SHEET, u32::from(kind.code() - 1), TILE_SIZE as u32),
        };
        painter.draw_frame(frame, center);
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TileMapDocument {
    tiles: Vec<TileRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TileRecord {
    #[serde(rename = "type")]
    kind: i64,
    grid_x: i32,
    grid_y: i32,
    #[serde(default)]
    floor_level: i32,
}

/// Sparse terrain keyed by grid cell. Missing cells are passable void.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileMap {
    tiles: BTreeMap<GridPos, Tile>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Places a tile, replacing whatever occupied the cell.
    pub fn add_tile(&mut self, kind: TileKind, grid: GridPos, floor_level: i32) {
        self.tiles.insert(grid, Tile::new(kind, grid, floor_level));
    }

    pub fn get_tile(&self, grid: GridPos) -> Option<&Tile> {
        self.tiles.get(&grid)
    }

    pub fn remove_tile(&mut self, grid: GridPos) -> Option<Tile> {
        self.tiles.remove(&grid)
    }

    /// Builds a map from rows of tile codes, top row first.
    pub fn from_rows(rows: &[Vec<i64>]) -> Self {
        let mut map = Self::new();
        let height = rows.len() as i32;
        for (row_index, row) in rows.iter().enumerate() {
            let grid_y = height - 1 - row_index as i32;
            for (column, code) in row.iter().enumerate() {
                map.add_tile(
                    TileKind::from_code(*code),
                    GridPos::new(column as i32, grid_y),
                    0,
                );
            }
        }
        map
    }

    /// Replaces the contents with `rows` (top row first).
    pub fn load_from_array(&mut self, rows: &[Vec<i64>]) {
        *self = Self::from_rows(rows);
    }

    /// Replaces the contents with a character map, first line on top.
    pub fn load_from_text(&mut self, text: &str) {
        let lines: Vec<&str> = text.lines().collect();
        let height = lines.len() as i32;
        let mut map = Self::new();
        for (row_index, line) in lines.iter().enumerate() {
            let grid_y = height - 1 - row_index as i32;
            for (column, symbol) in line.chars().enumerate() {
                if let Some(kind) = TileKind::from_symbol(symbol) {
                    map.add_tile(kind, GridPos::new(column as i32, grid_y), 0);
                }
            }
        }
        *self = map;
    }

    /// True when any collidable footprint strictly overlaps the box
    /// centered on `(x, y)`.
    pub fn check_collision(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        let query = Aabb::from_center(Vec2::new(x, y), width, height);
        self.tiles_touching(&query)
            .any(|tile| tile.collides_with(&query))
    }

    /// Every tile whose footprint overlaps the query box, once each.
    pub fn colliding_tiles(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<&Tile> {
        let query = Aabb::from_center(Vec2::new(x, y), width, height);
        self.tiles_touching(&query)
            .filter(|tile| tile.collides_with(&query))
            .collect()
    }

    pub fn collides_rect(&self, rect: &Aabb) -> bool {
        let center = rect.center();
        self.check_collision(center.x, center.y, rect.width(), rect.height())
    }

    /// Tiles inside `view` padded by one cell on every side.
    pub fn visible_tiles(&self, view: &Aabb) -> Vec<&Tile> {
        self.tiles_touching(&view.expanded(TILE_SIZE)).collect()
    }

    pub fn update(&mut self, dt: f32) {
        for tile in self.tiles.values_mut() {
            tile.update(dt);
        }
    }

    pub fn draw(&self, painter: &mut dyn Painter, camera: &Camera2D) {
        for tile in self.visible_tiles(&camera.view_rect()) {
            tile.draw(painter, camera);
        }
    }

    pub fn save_json(&self, path: &Path) -> Result<(), PersistError> {
        let document = TileMapDocument {
            tiles: self
                .tiles
                .values()
                .map(|tile| TileRecord {
                    kind: i64::from(tile.kind.code()),
                    grid_x: tile.grid.x,
                    grid_y: tile.grid.y,
                    floor_level: tile.floor_level,
                })
                .collect(),
        };
        write_json(path, &document)?;
        info!(path = %path.display(), tile_count = self.len(), "tile_map_saved");
        Ok(())
    }

    /// Replaces the contents from a JSON document. On error the map is left
    /// untouched.
    pub fn load_json(&mut self, path: &Path) -> Result<(), PersistError> {
        let document: TileMapDocument = read_json(path)?;
        let mut map = Self::new();
        for record in document.tiles {
            map.add_tile(
                TileKind::from_code(record.kind),
                GridPos::new(record.grid_x, record.grid_y),
                record.floor_level,
            );
        }
        *self = map;
        info!(path = %path.display(), tile_count = self.len(), "tile_map_loaded");
        Ok(())
    }

    fn tiles_touching(&self, query: &Aabb) -> impl Iterator<Item = &Tile> {
        let min = GridPos::containing(Vec2::new(query.left, query.bottom));
        let max = GridPos::containing(Vec2::new(query.right, query.top));
        self.tiles
            .range(GridPos::new(min.x, i32::MIN)..=GridPos::new(max.x, i32::MAX))
            .filter(move |(grid, _)| grid.y >= min.y && grid.y <= max.y)
            .map(|(_, tile)| tile)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_map_never_collides() {
        let map = TileMap::new();
        assert!(!map.check_collision(0.0, 0.0, 1000.0, 1000.0));
        assert!(map.colliding_tiles(0.0, 0.0, 1000.0, 1000.0).is_empty());
    }

    #[test]
    fn array_rows_are_flipped_so_first_row_is_top() {
        let map = TileMap::from_rows(&[vec![8, 8, 8], vec![1, 1, 99]]);

        assert_eq!(map.len(), 6);
        assert_eq!(map.get_tile(GridPos::new(0, 1)).map(Tile::kind), Some(TileKind::Wall));
        assert_eq!(
            map.get_tile(GridPos::new(1, 0)).map(Tile::kind),
            Some(TileKind::FloorCenter)
        );
        assert_eq!(map.get_tile(GridPos::new(2, 0)).map(Tile::kind), Some(TileKind::Water));
        assert_eq!(map.get_tile(GridPos::new(1, 1)).map(Tile::origin), Some(Vec2::new(64.0, 64.0)));
    }

    #[test]
    fn text_map_skips_spaces_and_flips_rows() {
        let mut map = TileMap::new();
        map.add_tile(TileKind::Wall, GridPos::new(50, 50), 0);
        map.load_from_text("# \n[=]\n");

        assert_eq!(map.len(), 4);
        assert!(map.get_tile(GridPos::new(50, 50)).is_none());
        assert_eq!(map.get_tile(GridPos::new(0, 1)).map(Tile::kind), Some(TileKind::Wall));
        assert!(map.get_tile(GridPos::new(1, 1)).is_none());
        assert_eq!(
            map.get_tile(GridPos::new(2, 0)).map(Tile::kind),
            Some(TileKind::FloorEdgeRight)
        );
    }

    #[test]
    fn collision_uses_sub_rectangles() {
        let mut map = TileMap::new();
        map.add_tile(TileKind::FloorEdgeLeft, GridPos::new(0, 0), 0);
        map.add_tile(TileKind::FloorCenter, GridPos::new(1, 0), 0);

        // Left strip covers x in [0, 12].
        assert!(map.check_collision(6.0, 32.0, 4.0, 4.0));
        assert!(!map.check_collision(40.0, 32.0, 10.0, 10.0));
        // Floor centers never block.
        assert!(!map.check_collision(96.0, 32.0, 30.0, 30.0));
    }

    #[test]
    fn colliding_tiles_lists_each_tile_once() {
        let mut map = TileMap::new();
        map.add_tile(TileKind::SlopeUpRight, GridPos::new(0, 0), 0);
        map.add_tile(TileKind::Wall, GridPos::new(1, 0), 0);
        map.add_tile(TileKind::Wall, GridPos::new(5, 5), 0);

        let hits = map.colliding_tiles(64.0, 32.0, 100.0, 60.0);
        let grids: Vec<GridPos> = hits.iter().map(|tile| tile.grid()).collect();
        assert_eq!(grids, vec![GridPos::new(0, 0), GridPos::new(1, 0)]);
    }

    #[test]
    fn negative_coordinates_use_floor_division() {
        let mut map = TileMap::new();
        map.add_tile(TileKind::Wall, GridPos::new(-1, -1), 0);
        assert!(map.check_collision(-10.0, -10.0, 4.0, 4.0));
        assert!(!map.check_collision(10.0, 10.0, 4.0, 4.0));
    }

    #[test]
    fn visible_tiles_pad_view_by_one_cell() {
        let mut map = TileMap::new();
        for x in -3..10 {
            map.add_tile(TileKind::FloorCenter, GridPos::new(x, 0), 0);
        }
        let view = Aabb::new(0.0, 0.0, 256.0, 64.0);
        let xs: Vec<i32> = map.visible_tiles(&view).iter().map(|tile| tile.grid().x).collect();
        assert_eq!(xs, vec![-1, 0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn water_animation_wraps() {
        let mut tile = Tile::new(TileKind::Water, GridPos::new(0, 0), 0);
        for _ in 0..20 {
            tile.update(0.1);
        }
        assert!(tile.anim_frame < 12.0);
        let mut wall = Tile::new(TileKind::Wall, GridPos::new(0, 0), 0);
        wall.update(1.0);
        assert_eq!(wall.anim_frame, 0.0);
    }

    #[test]
    fn json_round_trip_and_failed_load_keeps_map() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("world.json");
        let mut map = TileMap::new();
        map.add_tile(TileKind::Wall, GridPos::new(2, 3), 1);
        map.add_tile(TileKind::SlopeUpLeft, GridPos::new(-4, 0), 0);
        map.save_json(&path).expect("save");

        let mut loaded = TileMap::new();
        loaded.load_json(&path).expect("load");
        assert_eq!(loaded, map);

        std::fs::write(&path, r#"{"tiles":[{"type":"wall"}]}"#).expect("corrupt");
        assert!(loaded.load_json(&path).is_err());
        assert_eq!(loaded, map);
    }

    #[test]
    fn floor_level_defaults_when_absent() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("world.json");
        std::fs::write(&path, r#"{"tiles":[{"type":8,"grid_x":1,"grid_y":2}]}"#).expect("write");

        let mut map = TileMap::new();
        map.load_json(&path).expect("load");
        let tile = map.get_tile(GridPos::new(1, 2)).expect("tile");
        assert_eq!(tile.kind(), TileKind::Wall);
        assert_eq!(tile.floor_level(), 0);
    }
}
