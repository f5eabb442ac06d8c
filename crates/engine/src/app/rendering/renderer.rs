use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageError, ImageReader};
use pixels::{Error, Pixels, SurfaceTexture};
use thiserror::Error as ThisError;
use tracing::warn;
use winit::window::Window;

use super::transform::{screen_rect_to_pixels, screen_to_pixel, PixelRect};
use super::{Painter, Rgba, SpriteFrame};
use crate::geometry::{Aabb, Vec2};

const CLEAR_COLOR: Rgba = [18, 44, 66, 255];

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

#[derive(Debug, ThisError)]
enum SpriteLoadError {
    #[error("sprite key must not be empty")]
    EmptyKey,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("failed to open sprite sheet: {0}")]
    Open(#[source] io::Error),
    #[error("failed to decode sprite sheet: {0}")]
    Decode(#[source] ImageError),
}

/// Sheets keyed by asset key. A sheet that fails to load is remembered as
/// absent and reported once.
struct SpriteCache {
    sprites_dir: PathBuf,
    entries: HashMap<String, Option<LoadedSprite>>,
    reported: HashSet<String>,
}

impl SpriteCache {
    fn new(assets_dir: &Path) -> Self {
        Self {
            sprites_dir: assets_dir.join("sprites"),
            entries: HashMap::new(),
            reported: HashSet::new(),
        }
    }

    fn get(&mut self, key: &str) -> Option<&LoadedSprite> {
        if !self.entries.contains_key(key) {
            let loaded = match self.load(key) {
                Ok(sprite) => Some(sprite),
                Err(error) => {
                    if self.reported.insert(key.to_string()) {
                        warn!(sprite_key = key, error = %error, "renderer_sprite_load_failed");
                    }
                    None
                }
            };
            self.entries.insert(key.to_string(), loaded);
        }
        self.entries.get(key).and_then(Option::as_ref)
    }

    fn load(&self, key: &str) -> Result<LoadedSprite, SpriteLoadError> {
        let path = self.path_for(key)?;
        let image = ImageReader::open(&path)
            .map_err(SpriteLoadError::Open)?
            .decode()
            .map_err(SpriteLoadError::Decode)?
            .to_rgba8();
        Ok(LoadedSprite {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        })
    }

    /// Keys are lowercase relative paths such as `gnome/idle`.
    fn path_for(&self, key: &str) -> Result<PathBuf, SpriteLoadError> {
        if key.is_empty() {
            return Err(SpriteLoadError::EmptyKey);
        }
        if key.contains("..") {
            return Err(SpriteLoadError::ParentTraversal);
        }
        if key.starts_with('/') {
            return Err(SpriteLoadError::InvalidCharacter('/'));
        }
        let allowed = |ch: char| ch.is_ascii_lowercase() || ch.is_ascii_digit() || "_/-".contains(ch);
        if let Some(ch) = key.chars().find(|ch| !allowed(*ch)) {
            return Err(SpriteLoadError::InvalidCharacter(ch));
        }
        Ok(self.sprites_dir.join(format!("{key}.png")))
    }
}

/// `pixels` framebuffer with lazily loaded sprite sheets.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    sprites: SpriteCache,
}

impl Renderer {
    pub fn new(window: Arc<Window>, assets_dir: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
            sprites: SpriteCache::new(&assets_dir),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(window: Arc<Window>, width: u32, height: u32) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn begin_frame(&mut self) {
        for pixel in self.pixels.frame_mut().chunks_exact_mut(4) {
            pixel.copy_from_slice(&CLEAR_COLOR);
        }
    }

    pub fn present(&mut self) -> Result<(), Error> {
        self.pixels.render()
    }
}

impl Painter for Renderer {
    fn draw_frame(&mut self, frame: SpriteFrame<'_>, center: Vec2) {
        let Some(sprite) = self.sprites.get(frame.sheet) else {
            return;
        };
        let center = screen_to_pixel(center, self.height);
        draw_sprite_cell(
            self.pixels.frame_mut(),
            self.width,
            self.height,
            sprite,
            frame,
            center,
        );
    }

    fn outline_rect(&mut self, rect: Aabb, color: Rgba) {
        let rect = screen_rect_to_pixels(&rect, self.height);
        draw_rect_outline(self.pixels.frame_mut(), self.width, rect, color);
    }

    fn fill_rect(&mut self, rect: Aabb, color: Rgba) {
        let rect = screen_rect_to_pixels(&rect, self.height);
        draw_rect_filled(self.pixels.frame_mut(), self.width, self.height, rect, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: Rgba) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let Some(byte_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
    else {
        return;
    };
    if let Some(target) = frame.get_mut(byte_offset..byte_offset + 4) {
        target.copy_from_slice(&color);
    }
}

fn draw_rect_outline(frame: &mut [u8], width: u32, rect: PixelRect, color: Rgba) {
    for x in rect.left..=rect.right {
        write_pixel_rgba_clipped(frame, width as usize, x, rect.top, color);
        write_pixel_rgba_clipped(frame, width as usize, x, rect.bottom, color);
    }
    for y in rect.top..=rect.bottom {
        write_pixel_rgba_clipped(frame, width as usize, rect.left, y, color);
        write_pixel_rgba_clipped(frame, width as usize, rect.right, y, color);
    }
}

fn draw_rect_filled(frame: &mut [u8], width: u32, height: u32, rect: PixelRect, color: Rgba) {
    let left = rect.left.max(0);
    let top = rect.top.max(0);
    let right = rect.right.min(width as i32 - 1);
    let bottom = rect.bottom.min(height as i32 - 1);
    for y in top..=bottom {
        for x in left..=right {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn normalized_sprite_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Blits one strip cell centered on `center`, nearest-neighbour scaled.
/// Cells are read from the bottom row of the sheet.
fn draw_sprite_cell(
    frame: &mut [u8],
    width: u32,
    height: u32,
    sprite: &LoadedSprite,
    cell: SpriteFrame<'_>,
    center: (i32, i32),
) {
    if cell.cell_width == 0 || cell.cell_height == 0 || width == 0 || height == 0 {
        return;
    }
    if sprite.rgba.len() < sprite.width as usize * sprite.height as usize * 4 {
        return;
    }
    let columns = (sprite.width / cell.cell_width).max(1);
    let src_left = (cell.index % columns) * cell.cell_width;
    let src_top = sprite.height.saturating_sub(cell.cell_height);
    let src_w = cell.cell_width.min(sprite.width.saturating_sub(src_left));
    let src_h = cell.cell_height.min(sprite.height - src_top);
    if src_w == 0 || src_h == 0 {
        return;
    }

    let scale = normalized_sprite_scale(cell.scale);
    let inv_scale = scale.recip();
    let out_w = (src_w as f32 * scale).round().max(1.0) as i32;
    let out_h = (src_h as f32 * scale).round().max(1.0) as i32;
    let left = center.0 - out_w / 2;
    let top = center.1 - out_h / 2;

    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = (left + out_w).min(width as i32);
    let draw_bottom = (top + out_h).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let sprite_width = sprite.width as usize;
    let frame_width = width as usize;
    for out_y in draw_top..draw_bottom {
        let dy = ((out_y - top) as f32 * inv_scale).floor() as u32;
        let src_y = (src_top + dy.min(src_h - 1)) as usize;
        for out_x in draw_left..draw_right {
            let dx = ((out_x - left) as f32 * inv_scale).floor() as u32;
            let dx = dx.min(src_w - 1);
            let dx = if cell.flipped { src_w - 1 - dx } else { dx };
            let src_offset = (src_y * sprite_width + (src_left + dx) as usize) * 4;
            let alpha = sprite.rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let dst_offset = (out_y as usize * frame_width + out_x as usize) * 4;
            frame[dst_offset..dst_offset + 4].copy_from_slice(&sprite.rgba[src_offset..src_offset + 4]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strip(cells: u32, cell: u32) -> LoadedSprite {
        let width = cells * cell;
        let mut rgba = Vec::with_capacity((width * cell * 4) as usize);
        for _y in 0..cell {
            for x in 0..width {
                rgba.extend_from_slice(&[(x / cell) as u8 * 10 + (x % cell) as u8, 0, 0, 255]);
            }
        }
        LoadedSprite {
            width,
            height: cell,
            rgba,
        }
    }

    fn pixel(frame: &[u8], width: u32, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * width as usize + x) * 4;
        [frame[offset], frame[offset + 1], frame[offset + 2], frame[offset + 3]]
    }

    #[test]
    fn sprite_keys_map_under_sprites_dir() {
        let cache = SpriteCache::new(Path::new("assets"));
        for key in ["warrior/idle", "tiles/water", "panda/attack-2"] {
            assert!(cache.path_for(key).is_ok(), "key={key}");
        }
        for key in ["", "/a", "a/../b", r"a\b", "Warrior", "a.png"] {
            assert!(cache.path_for(key).is_err(), "key={key}");
        }
        assert_eq!(
            cache.path_for("gnome/idle").expect("path"),
            Path::new("assets").join("sprites").join("gnome/idle.png")
        );
    }

    #[test]
    fn missing_sheet_is_cached_as_absent_and_reported_once() {
        let temp = TempDir::new().expect("temp");
        let mut cache = SpriteCache::new(temp.path());

        assert!(cache.get("gnome/idle").is_none());
        assert!(cache.get("gnome/idle").is_none());
        assert_eq!(cache.reported.len(), 1);
        assert_eq!(cache.entries.len(), 1);
    }

    #[test]
    fn sprite_cell_selects_strip_column() {
        let sprite = strip(3, 2);
        let (width, height) = (4u32, 4u32);
        let mut frame = vec![0u8; (width * height * 4) as usize];
        let cell = SpriteFrame::new("test", 2, 2);

        draw_sprite_cell(&mut frame, width, height, &sprite, cell, (2, 2));

        assert_eq!(pixel(&frame, width, 1, 1), [20, 0, 0, 255]);
        assert_eq!(pixel(&frame, width, 2, 1), [21, 0, 0, 255]);
        assert_eq!(pixel(&frame, width, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn flipped_cell_mirrors_columns() {
        let sprite = strip(1, 2);
        let (width, height) = (4u32, 4u32);
        let mut frame = vec![0u8; (width * height * 4) as usize];
        let cell = SpriteFrame::new("test", 0, 2).flipped(true);

        draw_sprite_cell(&mut frame, width, height, &sprite, cell, (2, 2));

        assert_eq!(pixel(&frame, width, 1, 1), [1, 0, 0, 255]);
        assert_eq!(pixel(&frame, width, 2, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn rect_drawing_clips_to_frame() {
        let (width, height) = (4u32, 4u32);
        let mut frame = vec![0u8; (width * height * 4) as usize];
        let rect = PixelRect {
            left: -3,
            top: -3,
            right: 1,
            bottom: 1,
        };
        draw_rect_filled(&mut frame, width, height, rect, [9, 9, 9, 255]);
        draw_rect_outline(&mut frame, width, rect, [1, 1, 1, 255]);

        assert_eq!(pixel(&frame, width, 0, 0), [9, 9, 9, 255]);
        assert_eq!(pixel(&frame, width, 1, 1), [1, 1, 1, 255]);
        assert_eq!(pixel(&frame, width, 2, 2), [0, 0, 0, 0]);
    }
}
