use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::geometry::{Aabb, Vec2};
use crate::persist::{read_json, write_json, PersistError};

/// Free-form rectangle stored by center and size. Fields are kept at `f64`
/// so values written by other tools survive a load/save cycle unchanged;
/// geometry queries narrow them to world `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionBlock {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CollisionBlock {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_rect(rect: &Aabb) -> Self {
        let center = rect.center();
        Self::new(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(rect.width()),
            f64::from(rect.height()),
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.center(), self.width as f32, self.height as f32)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.bounds().contains_point(point)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += f64::from(delta.x);
        self.y += f64::from(delta.y);
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BlockDocument {
    blocks: Vec<CollisionBlock>,
}

/// Outcome of [`BlockSet::load_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLoad {
    Loaded(usize),
    /// No file yet; the set was cleared.
    Missing,
}

/// Ordered list of collision blocks; later blocks win hit tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockSet {
    blocks: Vec<CollisionBlock>,
}

impl BlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionBlock> {
        self.blocks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CollisionBlock> {
        self.blocks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CollisionBlock> {
        self.blocks.get_mut(index)
    }

    /// Appends a block and returns its index.
    pub fn push(&mut self, block: CollisionBlock) -> usize {
        self.blocks.push(block);
        self.blocks.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<CollisionBlock> {
        (index < self.blocks.len()).then(|| self.blocks.remove(index))
    }

    /// Index of the most recently added block containing `point`.
    pub fn block_at(&self, point: Vec2) -> Option<usize> {
        self.blocks.iter().rposition(|block| block.contains_point(point))
    }

    pub fn check_collision(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        let query = Aabb::from_center(Vec2::new(x, y), width, height);
        self.collides_rect(&query)
    }

    pub fn collides_rect(&self, rect: &Aabb) -> bool {
        self.blocks.iter().any(|block| block.bounds().overlaps(rect))
    }

    pub fn colliding_blocks(&self, rect: &Aabb) -> Vec<&CollisionBlock> {
        self.blocks
            .iter()
            .filter(|block| block.bounds().overlaps(rect))
            .collect()
    }

    pub fn save_json(&self, path: &Path) -> Result<(), PersistError> {
        let document = BlockDocument {
            blocks: self.blocks.clone(),
        };
        write_json(path, &document)?;
        info!(path = %path.display(), block_count = self.len(), "collision_blocks_saved");
        Ok(())
    }

    /// Replaces the set from disk. A missing file yields an empty set; any
    /// other failure leaves the set untouched.
    pub fn load_json(&mut self, path: &Path) -> Result<BlockLoad, PersistError> {
        match read_json::<BlockDocument>(path) {
            Ok(document) => {
                self.blocks = document.blocks;
                info!(path = %path.display(), block_count = self.len(), "collision_blocks_loaded");
                Ok(BlockLoad::Loaded(self.len()))
            }
            Err(error) if error.is_not_found() => {
                self.blocks.clear();
                info!(path = %path.display(), "collision_blocks_file_missing");
                Ok(BlockLoad::Missing)
            }
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample() -> BlockSet {
        let mut set = BlockSet::new();
        set.push(CollisionBlock::new(100.0, 100.0, 50.0, 50.0));
        set.push(CollisionBlock::new(110.0, 110.0, 20.0, 20.0));
        set.push(CollisionBlock::new(-40.5, 300.25, 12.0, 80.0));
        set
    }

    #[test]
    fn hit_test_prefers_latest_block() {
        let set = sample();
        assert_eq!(set.block_at(Vec2::new(110.0, 110.0)), Some(1));
        assert_eq!(set.block_at(Vec2::new(80.0, 80.0)), Some(0));
        // Edge is inclusive.
        assert_eq!(set.block_at(Vec2::new(125.0, 100.0)), Some(0));
        assert_eq!(set.block_at(Vec2::new(500.0, 500.0)), None);
    }

    #[test]
    fn collision_queries_use_strict_overlap() {
        let set = sample();
        assert!(set.check_collision(60.0, 100.0, 40.0, 10.0));
        assert!(!set.check_collision(55.0, 100.0, 40.0, 10.0));
        let rect = Aabb::from_center(Vec2::new(115.0, 115.0), 4.0, 4.0);
        assert_eq!(set.colliding_blocks(&rect).len(), 2);
    }

    #[test]
    fn json_round_trip_preserves_blocks() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("collision_data.json");
        let set = sample();
        set.save_json(&path).expect("save");

        let mut loaded = BlockSet::new();
        assert_eq!(loaded.load_json(&path).expect("load"), BlockLoad::Loaded(3));
        assert_eq!(loaded, set);
    }

    #[test]
    fn save_keeps_authored_decimals() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("collision_data.json");
        std::fs::write(
            &path,
            r#"{"blocks":[{"x":0.1,"y":123.456789,"width":33.3,"height":0.7}]}"#,
        )
        .expect("write");

        let mut set = BlockSet::new();
        set.load_json(&path).expect("load");
        set.save_json(&path).expect("save");

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        let block = &saved["blocks"][0];
        assert_eq!(block["x"], serde_json::json!(0.1));
        assert_eq!(block["y"], serde_json::json!(123.456789));
        assert_eq!(block["width"], serde_json::json!(33.3));
        assert_eq!(block["height"], serde_json::json!(0.7));
    }

    #[test]
    fn missing_file_clears_and_malformed_file_keeps_blocks() {
        let temp = TempDir::new().expect("temp");
        let mut set = sample();

        let malformed = temp.path().join("bad.json");
        std::fs::write(&malformed, r#"{"blocks":[{"x":1}]}"#).expect("write");
        assert!(set.load_json(&malformed).is_err());
        assert_eq!(set.len(), 3);

        let missing = temp.path().join("absent.json");
        assert_eq!(set.load_json(&missing).expect("missing"), BlockLoad::Missing);
        assert!(set.is_empty());
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut set = sample();
        assert!(set.remove(7).is_none());
        assert_eq!(set.remove(0), Some(CollisionBlock::new(100.0, 100.0, 50.0, 50.0)));
        assert_eq!(set.len(), 2);
    }
}
