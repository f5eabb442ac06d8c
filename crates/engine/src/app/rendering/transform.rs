use crate::geometry::{Aabb, Vec2};

/// Inclusive framebuffer rectangle, rows counted from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

pub fn screen_to_pixel(screen: Vec2, framebuffer_height: u32) -> (i32, i32) {
    let x = screen.x.round() as i32;
    let y = (framebuffer_height as f32 - screen.y).round() as i32;
    (x, y)
}

pub fn screen_rect_to_pixels(rect: &Aabb, framebuffer_height: u32) -> PixelRect {
    let (left, top) = screen_to_pixel(Vec2::new(rect.left, rect.top), framebuffer_height);
    let (right, bottom) = screen_to_pixel(Vec2::new(rect.right, rect.bottom), framebuffer_height);
    PixelRect {
        left,
        top,
        right,
        bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_origin_maps_to_bottom_row() {
        assert_eq!(screen_to_pixel(Vec2::ZERO, 600), (0, 600));
        assert_eq!(screen_to_pixel(Vec2::new(400.0, 600.0), 600), (400, 0));
    }

    #[test]
    fn rect_flips_vertically() {
        let rect = Aabb::new(10.0, 20.0, 50.0, 100.0);
        let pixels = screen_rect_to_pixels(&rect, 600);
        assert_eq!(
            pixels,
            PixelRect {
                left: 10,
                top: 500,
                right: 50,
                bottom: 580,
            }
        );
    }
}
