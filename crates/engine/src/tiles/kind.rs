use crate::geometry::Aabb;

use super::TILE_SIZE;

const EDGE: f32 = 12.0;
const STEP: f32 = TILE_SIZE / 4.0;

const fn rect(left: f32, bottom: f32, right: f32, top: f32) -> Aabb {
    Aabb {
        left,
        bottom,
        right,
        top,
    }
}

const FULL: [Aabb; 1] = [rect(0.0, 0.0, TILE_SIZE, TILE_SIZE)];
const EDGE_LEFT: [Aabb; 1] = [rect(0.0, 0.0, EDGE, TILE_SIZE)];
const EDGE_RIGHT: [Aabb; 1] = [rect(TILE_SIZE - EDGE, 0.0, TILE_SIZE, TILE_SIZE)];
const EDGE_TOP: [Aabb; 1] = [rect(0.0, TILE_SIZE - EDGE, TILE_SIZE, TILE_SIZE)];
const EDGE_BOTTOM: [Aabb; 1] = [rect(0.0, 0.0, TILE_SIZE, EDGE)];
// Staircases approximating the diagonal; solid on the low side.
const STAIRS_UP_RIGHT: [Aabb; 4] = [
    rect(0.0, 0.0, TILE_SIZE, STEP),
    rect(STEP, STEP, TILE_SIZE, 2.0 * STEP),
    rect(2.0 * STEP, 2.0 * STEP, TILE_SIZE, 3.0 * STEP),
    rect(3.0 * STEP, 3.0 * STEP, TILE_SIZE, TILE_SIZE),
];
const STAIRS_UP_LEFT: [Aabb; 4] = [
    rect(0.0, 0.0, TILE_SIZE, STEP),
    rect(0.0, STEP, 3.0 * STEP, 2.0 * STEP),
    rect(0.0, 2.0 * STEP, 2.0 * STEP, 3.0 * STEP),
    rect(0.0, 3.0 * STEP, STEP, TILE_SIZE),
];

/// Terrain kinds with their persisted integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Water,
    FloorCenter,
    FloorEdgeLeft,
    FloorEdgeRight,
    FloorEdgeTop,
    FloorEdgeBottom,
    SlopeUpRight,
    SlopeUpLeft,
    Wall,
}

impl TileKind {
    pub const ALL: [TileKind; 9] = [
        TileKind::Water,
        TileKind::FloorCenter,
        TileKind::FloorEdgeLeft,
        TileKind::FloorEdgeRight,
        TileKind::FloorEdgeTop,
        TileKind::FloorEdgeBottom,
        TileKind::SlopeUpRight,
        TileKind::SlopeUpLeft,
        TileKind::Wall,
    ];

    /// Unknown codes decode to `Water`.
    pub fn from_code(code: i64) -> TileKind {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(TileKind::Water)
    }

    pub fn code(self) -> u8 {
        match self {
            TileKind::Water => 0,
            TileKind::FloorCenter => 1,
            TileKind::FloorEdgeLeft => 2,
            TileKind::FloorEdgeRight => 3,
            TileKind::FloorEdgeTop => 4,
            TileKind::FloorEdgeBottom => 5,
            TileKind::SlopeUpRight => 6,
            TileKind::SlopeUpLeft => 7,
            TileKind::Wall => 8,
        }
    }

    /// Text-map character. A space means no tile; anything unrecognized is
    /// water.
    pub fn from_symbol(symbol: char) -> Option<TileKind> {
        let kind = match symbol {
            ' ' => return None,
            '=' => TileKind::FloorCenter,
            '[' => TileKind::FloorEdgeLeft,
            ']' => TileKind::FloorEdgeRight,
            '^' => TileKind::FloorEdgeTop,
            '_' => TileKind::FloorEdgeBottom,
            '/' | 'H' => TileKind::SlopeUpRight,
            '\\' => TileKind::SlopeUpLeft,
            '#' => TileKind::Wall,
            _ => TileKind::Water,
        };
        Some(kind)
    }

    /// Collision footprint in tile-local units, origin at the bottom-left.
    pub fn collision_boxes(self) -> &'static [Aabb] {
        match self {
            TileKind::Water | TileKind::FloorCenter => &[],
            TileKind::FloorEdgeLeft => &EDGE_LEFT,
            TileKind::FloorEdgeRight => &EDGE_RIGHT,
            TileKind::FloorEdgeTop => &EDGE_TOP,
            TileKind::FloorEdgeBottom => &EDGE_BOTTOM,
            TileKind::SlopeUpRight => &STAIRS_UP_RIGHT,
            TileKind::SlopeUpLeft => &STAIRS_UP_LEFT,
            TileKind::Wall => &FULL,
        }
    }

    pub fn is_collidable(self) -> bool {
        !self.collision_boxes().is_empty()
    }

    /// `(frame_count, frames_per_second)` for animated kinds.
    pub fn animation(self) -> Option<(u32, f32)> {
        match self {
            TileKind::Water => Some((12, 8.0)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_and_unknown_is_water() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_code(kind.code() as i64), kind);
        }
        assert_eq!(TileKind::from_code(-1), TileKind::Water);
        assert_eq!(TileKind::from_code(42), TileKind::Water);
    }

    #[test]
    fn symbols_map_to_kinds() {
        assert_eq!(TileKind::from_symbol(' '), None);
        assert_eq!(TileKind::from_symbol('#'), Some(TileKind::Wall));
        assert_eq!(TileKind::from_symbol('H'), Some(TileKind::SlopeUpRight));
        assert_eq!(TileKind::from_symbol('\\'), Some(TileKind::SlopeUpLeft));
        assert_eq!(TileKind::from_symbol('?'), Some(TileKind::Water));
    }

    #[test]
    fn footprints_stay_inside_the_tile() {
        for kind in TileKind::ALL {
            for rect in kind.collision_boxes() {
                assert!(rect.left >= 0.0 && rect.bottom >= 0.0, "{kind:?}");
                assert!(rect.right <= TILE_SIZE && rect.top <= TILE_SIZE, "{kind:?}");
                assert!(rect.left < rect.right && rect.bottom < rect.top, "{kind:?}");
            }
        }
        assert!(!TileKind::Water.is_collidable());
        assert!(TileKind::Wall.is_collidable());
    }
}
