use crate::data::{Pos, DOWN, LEFT, RIGHT, UP};
use crate::state::Puzzle;

/// Local deadlock test for a single box - true means the box can never reach any storage.
///
/// Only looks at the box's own surroundings, deadlocks caused by several boxes
/// blocking each other are not detected.
pub fn is_deadlocked<P: Puzzle>(box_pos: Pos, puzzle: &P) -> bool {
    if puzzle.is_storage(box_pos) {
        return false;
    }

    let max_x = puzzle.width() - 1;
    let max_y = puzzle.height() - 1;
    let on_left = box_pos.x == 0;
    let on_right = box_pos.x == max_x;
    let on_top = box_pos.y == 0;
    let on_bottom = box_pos.y == max_y;

    // can never be pushed again
    if (on_left || on_right) && (on_top || on_bottom) {
        return true;
    }

    // a box against the border can only move along it
    let storage = puzzle.storage();
    if on_left {
        return !storage.iter().any(|s| s.x == 0);
    }
    if on_right {
        return !storage.iter().any(|s| s.x == max_x);
    }
    if on_top {
        return !storage.iter().any(|s| s.y == 0);
    }
    if on_bottom {
        return !storage.iter().any(|s| s.y == max_y);
    }

    let blocked_vertically = puzzle.is_obstacle(box_pos + UP) || puzzle.is_obstacle(box_pos + DOWN);
    let blocked_horizontally =
        puzzle.is_obstacle(box_pos + LEFT) || puzzle.is_obstacle(box_pos + RIGHT);
    blocked_vertically && blocked_horizontally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SokobanState;

    fn state(boxes: &[Pos], storage: &[Pos], obstacles: &[Pos]) -> SokobanState {
        SokobanState::from_parts(5, 5, boxes, storage, &[], obstacles)
    }

    #[test]
    fn corners() {
        let storage = [Pos::new(3, 3)];
        for &corner in &[
            Pos::new(0, 0),
            Pos::new(4, 0),
            Pos::new(0, 4),
            Pos::new(4, 4),
        ] {
            let s = state(&[corner], &storage, &[]);
            assert!(is_deadlocked(corner, &s), "{}", corner);
        }
    }

    #[test]
    fn corner_on_storage() {
        let s = state(&[Pos::new(0, 0)], &[Pos::new(0, 0)], &[]);
        assert!(!is_deadlocked(Pos::new(0, 0), &s));
    }

    #[test]
    fn walls_without_storage() {
        let storage = [Pos::new(2, 2)];
        for &pos in &[
            Pos::new(0, 2),
            Pos::new(4, 2),
            Pos::new(2, 0),
            Pos::new(2, 4),
        ] {
            let s = state(&[pos], &storage, &[]);
            assert!(is_deadlocked(pos, &s), "{}", pos);
        }
    }

    #[test]
    fn walls_with_storage() {
        // every wall has a storage cell somewhere along it
        let storage = [
            Pos::new(0, 4),
            Pos::new(4, 0),
            Pos::new(3, 0),
            Pos::new(1, 4),
        ];
        for &pos in &[
            Pos::new(0, 2),
            Pos::new(4, 2),
            Pos::new(2, 0),
            Pos::new(2, 4),
        ] {
            let s = state(&[pos], &storage, &[]);
            assert!(!is_deadlocked(pos, &s), "{}", pos);
        }
    }

    #[test]
    fn pinned_by_obstacles() {
        let b = Pos::new(2, 2);
        let storage = [Pos::new(1, 1)];

        let s = state(&[b], &storage, &[Pos::new(2, 1), Pos::new(3, 2)]);
        assert!(is_deadlocked(b, &s));

        let s = state(&[b], &storage, &[Pos::new(2, 3), Pos::new(1, 2)]);
        assert!(is_deadlocked(b, &s));

        // obstacles on one axis only - can still be pushed along the other
        let s = state(&[b], &storage, &[Pos::new(2, 1), Pos::new(2, 3)]);
        assert!(!is_deadlocked(b, &s));

        let s = state(&[b], &storage, &[]);
        assert!(!is_deadlocked(b, &s));
    }

    #[test]
    fn pinned_on_storage() {
        let b = Pos::new(2, 2);
        let s = state(&[b], &[b], &[Pos::new(2, 1), Pos::new(3, 2)]);
        assert!(!is_deadlocked(b, &s));
    }
}
