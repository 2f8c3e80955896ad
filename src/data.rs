use std::fmt::{self, Display, Formatter};
use std::ops::Add;

/// Max rows or columns of a level, including the wall ring
pub const MAX_SIZE: usize = 255;

/// Interior grid coordinates - the implicit wall ring around the level is not part of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Pos {
        Pos { x, y }
    }

    /// Manhattan distance
    pub fn dist(self, other: Pos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dir {
    pub x: i32,
    pub y: i32,
}

pub const UP: Dir = Dir { x: 0, y: -1 };
pub const RIGHT: Dir = Dir { x: 1, y: 0 };
pub const DOWN: Dir = Dir { x: 0, y: 1 };
pub const LEFT: Dir = Dir { x: -1, y: 0 };
pub const DIRECTIONS: [Dir; 4] = [UP, RIGHT, DOWN, LEFT];

impl Add<Dir> for Pos {
    type Output = Pos;

    fn add(self, dir: Dir) -> Pos {
        Pos {
            x: self.x + dir.x,
            y: self.y + dir.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MapCell {
    Empty,
    Wall,
    Goal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Contents {
    Empty,
    Box,
    Robot,
}
