//! Array-backed binary min-heap.
//!
//! Slot 0 holds a sentinel whose key is smaller than any real key
//! so sifting up never has to check for the root explicitly.
//! Real elements live in `1..=size`.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Anything the heap can order - only the key matters, ties are left in heap order.
pub trait Keyed {
    type Key: Ord + Copy;

    fn key(&self) -> Self::Key;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapErr {
    Empty,
}

impl Display for HeapErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            HeapErr::Empty => write!(f, "Extracting from an empty heap"),
        }
    }
}

impl Error for HeapErr {}

#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    items: Vec<T>,
    size: usize,
}

impl<T: Keyed> MinHeap<T> {
    pub fn new(sentinel: T) -> Self {
        MinHeap {
            items: vec![sentinel],
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            Some(&self.items[1])
        }
    }

    /// Iterates in backing array order, not in key order.
    pub fn iter(&self) -> ::std::slice::Iter<'_, T> {
        self.items[1..].iter()
    }

    pub fn insert(&mut self, item: T) {
        debug_assert!(
            item.key() > self.items[0].key(),
            "Sentinel must be smaller than any element"
        );

        self.items.push(item);
        self.size += 1;

        let mut i = self.size;
        // the sentinel stops us at the root
        while self.items[i].key() < self.items[i / 2].key() {
            self.items.swap(i, i / 2);
            i /= 2;
        }
    }

    pub fn extract_min(&mut self) -> Result<T, HeapErr> {
        if self.is_empty() {
            return Err(HeapErr::Empty);
        }

        // moves the last element into the root
        let min = self.items.swap_remove(1);
        self.size -= 1;
        self.sift_down(1);
        Ok(min)
    }

    fn sift_down(&mut self, mut cur: usize) {
        loop {
            let left = 2 * cur;
            let right = left + 1;
            if left > self.size {
                return; // leaf
            }

            let smaller = if right <= self.size && self.items[right].key() < self.items[left].key() {
                right
            } else {
                left
            };

            if self.items[smaller].key() < self.items[cur].key() {
                self.items.swap(cur, smaller);
                cur = smaller;
            } else {
                return;
            }
        }
    }

    #[cfg(test)]
    fn is_valid(&self) -> bool {
        (2..=self.size).all(|i| self.items[i / 2].key() <= self.items[i].key())
            && self.items.len() == self.size + 1
    }
}
