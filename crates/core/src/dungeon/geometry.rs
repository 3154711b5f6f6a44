//! Tile-space primitives shared by placement, carving and anchor search.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

/// Axis-aligned rectangle with half-open extents: `x..x + width`, `y..y + height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(self) -> i32 {
        self.y + self.height
    }

    pub fn center(self) -> Pos {
        Pos { y: self.y + self.height / 2, x: self.x + self.width / 2 }
    }

    pub fn contains(self, pos: Pos) -> bool {
        pos.x >= self.x && pos.x < self.right() && pos.y >= self.y && pos.y < self.bottom()
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The rectangle shrunk by one tile on every side.
    pub fn interior(self) -> Self {
        Self {
            x: self.x + 1,
            y: self.y + 1,
            width: (self.width - 2).max(0),
            height: (self.height - 2).max(0),
        }
    }

    /// Positions on the outermost ring, row by row.
    pub fn perimeter(self) -> impl Iterator<Item = Pos> {
        let interior = self.interior();
        self.positions().filter(move |&pos| !interior.contains(pos))
    }

    /// Every covered position, row by row.
    pub fn positions(self) -> impl Iterator<Item = Pos> {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| Pos { y, x }))
    }
}

pub(super) fn in_bounds(width: usize, height: usize, pos: Pos) -> bool {
    pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < width && (pos.y as usize) < height
}

pub(super) fn tile_index(pos: Pos, width: usize) -> usize {
    (pos.y as usize) * width + (pos.x as usize)
}
