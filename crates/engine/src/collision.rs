use crate::geometry::{Aabb, Vec2};

/// Moves a box of `size` from `from` toward `to`, sliding along whatever
/// `is_blocked` reports. Falls back to a single axis when the full move is
/// blocked, and to `from` when both axes are.
pub fn slide_move(from: Vec2, to: Vec2, size: Vec2, is_blocked: impl Fn(&Aabb) -> bool) -> Vec2 {
    let blocked_at = |point: Vec2| is_blocked(&Aabb::from_center(point, size.x, size.y));

    if from == to || !blocked_at(to) {
        return to;
    }

    let x_only = Vec2::new(to.x, from.y);
    let y_only = Vec2::new(from.x, to.y);
    let x_clear = to.x != from.x && !blocked_at(x_only);
    let y_clear = to.y != from.y && !blocked_at(y_only);

    match (x_clear, y_clear) {
        (true, true) if (to.y - from.y).abs() > (to.x - from.x).abs() => y_only,
        (true, _) => x_only,
        (false, true) => y_only,
        (false, false) => from,
    }
}
