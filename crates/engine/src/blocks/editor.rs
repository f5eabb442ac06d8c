use tracing::debug;

use crate::app::{Camera2D, Key, MouseButton, Painter, Rgba};
use crate::geometry::{Aabb, Vec2};

use super::{BlockSet, CollisionBlock};

/// Smallest width/height a block can have, and the strict lower bound a
/// drag must exceed on both axes to create one.
pub const MIN_BLOCK_SIZE: f32 = 10.0;
pub const RESIZE_STEP: f32 = 10.0;

const BLOCK_COLOR: Rgba = [230, 60, 60, 255];
const SELECTED_COLOR: Rgba = [80, 230, 90, 255];
const PREVIEW_COLOR: Rgba = [250, 220, 70, 255];

/// Mouse/keyboard authoring of a [`BlockSet`]. Points are world units.
#[derive(Debug, Clone, Default)]
pub struct BlockEditor {
    active: bool,
    selected: Option<usize>,
    drag_anchor: Option<Vec2>,
    create_start: Option<Vec2>,
    cursor: Option<Vec2>,
}

impl BlockEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn is_creating(&self) -> bool {
        self.create_start.is_some()
    }

    /// Flips editor mode. Leaving it drops selection, drag and creation.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        if !self.active {
            self.selected = None;
            self.drag_anchor = None;
            self.create_start = None;
            self.cursor = None;
        }
        self.active
    }

    pub fn mouse_down(&mut self, blocks: &mut BlockSet, button: MouseButton, point: Vec2) {
        if !self.active {
            return;
        }
        self.cursor = Some(point);
        match button {
            MouseButton::Left => match blocks.block_at(point) {
                Some(index) => {
                    self.selected = Some(index);
                    self.drag_anchor = Some(point);
                }
                None => {
                    self.selected = None;
                    self.create_start = Some(point);
                }
            },
            MouseButton::Right => {
                if let Some(index) = blocks.block_at(point) {
                    self.remove_block(blocks, index);
                }
            }
        }
    }

    pub fn mouse_up(&mut self, blocks: &mut BlockSet, button: MouseButton, point: Vec2) {
        if !self.active || button != MouseButton::Left {
            return;
        }
        self.cursor = Some(point);
        self.drag_anchor = None;
        let Some(start) = self.create_start.take() else {
            return;
        };
        let rect = Aabb::from_corners(start, point);
        if rect.width() > MIN_BLOCK_SIZE && rect.height() > MIN_BLOCK_SIZE {
            let index = blocks.push(CollisionBlock::from_rect(&rect));
            self.selected = Some(index);
            debug!(index, width = rect.width(), height = rect.height(), "collision_block_created");
        }
    }

    pub fn mouse_motion(&mut self, blocks: &mut BlockSet, point: Vec2) {
        if !self.active {
            return;
        }
        self.cursor = Some(point);
        let (Some(anchor), Some(index)) = (self.drag_anchor, self.selected) else {
            return;
        };
        if let Some(block) = blocks.get_mut(index) {
            block.translate(point - anchor);
            self.drag_anchor = Some(point);
        }
    }

    /// Arrow keys resize the selection, Delete/Backspace removes it.
    /// Returns whether the key was consumed.
    pub fn key_down(&mut self, blocks: &mut BlockSet, key: Key) -> bool {
        if !self.active {
            return false;
        }
        let Some(index) = self.selected else {
            return false;
        };
        if matches!(key, Key::Delete | Key::Backspace) {
            self.remove_block(blocks, index);
            return true;
        }
        let Some(block) = blocks.get_mut(index) else {
            return false;
        };
        let (step, min) = (f64::from(RESIZE_STEP), f64::from(MIN_BLOCK_SIZE));
        match key {
            Key::Left => block.width = (block.width - step).max(min),
            Key::Right => block.width += step,
            Key::Up => block.height += step,
            Key::Down => block.height = (block.height - step).max(min),
            _ => return false,
        }
        true
    }

    /// Rubber band of a creation drag in progress.
    pub fn preview_rect(&self) -> Option<Aabb> {
        match (self.create_start, self.cursor) {
            (Some(start), Some(cursor)) => Some(Aabb::from_corners(start, cursor)),
            _ => None,
        }
    }

    /// Outlines every block; the selection and any creation preview are
    /// highlighted.
    pub fn draw(&self, blocks: &BlockSet, painter: &mut dyn Painter, camera: &Camera2D) {
        for (index, block) in blocks.iter().enumerate() {
            let color = if self.selected == Some(index) {
                SELECTED_COLOR
            } else {
                BLOCK_COLOR
            };
            painter.outline_rect(camera.apply_rect(&block.bounds()), color);
        }
        if let Some(rect) = self.preview_rect() {
            painter.outline_rect(camera.apply_rect(&rect), PREVIEW_COLOR);
        }
    }

    fn remove_block(&mut self, blocks: &mut BlockSet, index: usize) {
        if blocks.remove(index).is_none() {
            return;
        }
        self.drag_anchor = None;
        self.selected = match self.selected {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
        debug!(index, "collision_block_removed");
    }
}
