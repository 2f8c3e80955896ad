use std::hash::{Hash, Hasher};
use std::rc::Rc;

use fnv::FnvHashSet;

use crate::config::Format;
use crate::data::{Pos, DIRECTIONS};
use crate::solver::a_star::SearchState;
use crate::state_formatter::StateFormatter;

/// Read-only view of a puzzle position - all the heuristics need.
pub trait Puzzle {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn boxes(&self) -> &[Pos];
    fn storage(&self) -> &[Pos];
    fn robots(&self) -> &[Pos];
    fn is_obstacle(&self, pos: Pos) -> bool;
    fn is_storage(&self, pos: Pos) -> bool;
}

/// The parts of a level that never change during search.
#[derive(Debug, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    storage: Vec<Pos>,
    obstacles: FnvHashSet<Pos>,
}

impl Board {
    pub fn new(width: i32, height: i32, mut storage: Vec<Pos>, obstacles: FnvHashSet<Pos>) -> Self {
        storage.sort();
        storage.dedup();
        Board {
            width,
            height,
            storage,
            obstacles,
        }
    }

    pub(crate) fn obstacles(&self) -> &FnvHashSet<Pos> {
        &self.obstacles
    }

    fn contains(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }
}

#[derive(Debug, Clone)]
pub struct SokobanState {
    board: Rc<Board>,
    // robots are distinguishable so they keep their order
    robots: Vec<Pos>,
    boxes: Vec<Pos>,
}

impl SokobanState {
    pub fn new(board: Rc<Board>, robots: Vec<Pos>, mut boxes: Vec<Pos>) -> Self {
        // sort to detect equal states when we reorder boxes
        boxes.sort();
        SokobanState {
            board,
            robots,
            boxes,
        }
    }

    /// Convenience constructor mostly for tests and small hand written problems.
    pub fn from_parts(
        width: i32,
        height: i32,
        boxes: &[Pos],
        storage: &[Pos],
        robots: &[Pos],
        obstacles: &[Pos],
    ) -> Self {
        let board = Board::new(
            width,
            height,
            storage.to_vec(),
            obstacles.iter().cloned().collect(),
        );
        SokobanState::new(Rc::new(board), robots.to_vec(), boxes.to_vec())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Every box is on a storage cell
    pub fn is_solved(&self) -> bool {
        self.boxes.iter().all(|&b| self.is_storage(b))
    }

    pub fn format(&self, format: Format) -> StateFormatter<'_> {
        StateFormatter::new(self, format)
    }

    fn is_box(&self, pos: Pos) -> bool {
        self.boxes.binary_search(&pos).is_ok()
    }

    fn is_robot(&self, pos: Pos) -> bool {
        self.robots.contains(&pos)
    }

    fn is_free(&self, pos: Pos) -> bool {
        self.board.contains(pos)
            && !self.board.obstacles.contains(&pos)
            && !self.is_box(pos)
            && !self.is_robot(pos)
    }
}

/// Goal test passed to the search engine.
pub fn sokoban_goal_state(state: &SokobanState) -> bool {
    state.is_solved()
}

impl PartialEq for SokobanState {
    fn eq(&self, other: &Self) -> bool {
        self.robots == other.robots && self.boxes == other.boxes
    }
}

impl Eq for SokobanState {}

impl Hash for SokobanState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.robots.hash(state);
        self.boxes.hash(state);
    }
}

impl Puzzle for SokobanState {
    fn width(&self) -> i32 {
        self.board.width
    }

    fn height(&self) -> i32 {
        self.board.height
    }

    fn boxes(&self) -> &[Pos] {
        &self.boxes
    }

    fn storage(&self) -> &[Pos] {
        &self.board.storage
    }

    fn robots(&self) -> &[Pos] {
        &self.robots
    }

    fn is_obstacle(&self, pos: Pos) -> bool {
        self.board.obstacles.contains(&pos)
    }

    fn is_storage(&self, pos: Pos) -> bool {
        self.board.storage.binary_search(&pos).is_ok()
    }
}

impl SearchState for SokobanState {
    /// One robot moves one cell, pushing at most one box.
    fn successors(&self) -> Vec<Self> {
        let mut new_states = Vec::new();

        for (i, &robot) in self.robots.iter().enumerate() {
            for &dir in &DIRECTIONS {
                let new_robot_pos = robot + dir;
                if !self.board.contains(new_robot_pos)
                    || self.board.obstacles.contains(&new_robot_pos)
                    || self.is_robot(new_robot_pos)
                {
                    continue;
                }

                let mut new_boxes = self.boxes.clone();
                if let Ok(box_index) = self.boxes.binary_search(&new_robot_pos) {
                    let push_dest = new_robot_pos + dir;
                    if !self.is_free(push_dest) {
                        continue;
                    }
                    new_boxes[box_index] = push_dest;
                }

                let mut new_robots = self.robots.clone();
                new_robots[i] = new_robot_pos;
                new_states.push(SokobanState::new(
                    Rc::clone(&self.board),
                    new_robots,
                    new_boxes,
                ));
            }
        }

        new_states
    }
}
