use std::ops::{Index, IndexMut};

use crate::data::Pos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Vec2d<T> {
    data: Vec<T>,
    width: i32,
    height: i32,
}

impl<T: Copy> Vec2d<T> {
    pub(crate) fn new(width: i32, height: i32, default: T) -> Self {
        assert!(width >= 0 && height >= 0);
        Vec2d {
            data: vec![default; (width * height) as usize],
            width,
            height,
        }
    }
}

impl<T> Vec2d<T> {
    pub(crate) fn contains(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index_of(&self, pos: Pos) -> usize {
        debug_assert!(self.contains(pos), "{} out of bounds", pos);
        (pos.y * self.width + pos.x) as usize
    }
}

impl<T> Index<Pos> for Vec2d<T> {
    type Output = T;

    fn index(&self, index: Pos) -> &Self::Output {
        &self.data[self.index_of(index)]
    }
}

impl<T> IndexMut<Pos> for Vec2d<T> {
    fn index_mut(&mut self, index: Pos) -> &mut Self::Output {
        let index = self.index_of(index);
        &mut self.data[index]
    }
}
