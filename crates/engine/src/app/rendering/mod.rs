mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{screen_rect_to_pixels, screen_to_pixel, PixelRect};

use crate::geometry::{Aabb, Vec2};

pub type Rgba = [u8; 4];

/// One cell of a horizontal sprite strip. `sheet` is an asset key such as
/// `"gnome/idle"`, resolved by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteFrame<'a> {
    pub sheet: &'a str,
    pub index: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub scale: f32,
    pub flipped: bool,
}

impl<'a> SpriteFrame<'a> {
    pub fn new(sheet: &'a str, index: u32, cell_size: u32) -> Self {
        Self {
            sheet,
            index,
            cell_width: cell_size,
            cell_height: cell_size,
            scale: 1.0,
            flipped: false,
        }
    }

    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Drawing surface handed to scenes. Coordinates are screen units with the
/// origin at the bottom-left, i.e. the output of `Camera2D::apply`.
pub trait Painter {
    fn draw_frame(&mut self, frame: SpriteFrame<'_>, center: Vec2);
    fn outline_rect(&mut self, rect: Aabb, color: Rgba);
    fn fill_rect(&mut self, rect: Aabb, color: Rgba);
}
