//! Estimates of the remaining cost to a goal.
//!
//! All heuristics share the `HeuristicFn` signature so the solver can switch between them.
//! An estimate of `f64::INFINITY` means the state can't be solved anymore.

pub mod deadlock;

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use fnv::FnvHashSet;

use crate::data::Pos;
use crate::heap::{HeapErr, Keyed, MinHeap};
use crate::state::Puzzle;

use self::deadlock::is_deadlocked;

/// Robots only tell us who can get to a box to push it, they count less than storage distances.
pub const ROBOT_DAMPING: f64 = 1.3;

pub type HeuristicFn<P> = fn(&P) -> Result<f64, HeuristicErr>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicErr {
    EmptyHeap,
    NoStorage,
    TooFewStorage { boxes: usize, storage: usize },
}

impl Display for HeuristicErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            HeuristicErr::EmptyHeap => write!(f, "Ran out of distances before every box was matched"),
            HeuristicErr::NoStorage => write!(f, "Boxes but no storage"),
            HeuristicErr::TooFewStorage { boxes, storage } => write!(
                f,
                "More boxes than storage cells ({} boxes, {} storage)",
                boxes, storage
            ),
        }
    }
}

impl Error for HeuristicErr {}

impl From<HeapErr> for HeuristicErr {
    fn from(err: HeapErr) -> Self {
        match err {
            HeapErr::Empty => HeuristicErr::EmptyHeap,
        }
    }
}

/// Distance from a box to a storage cell or a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceRecord {
    pub source: Pos,
    pub target: Pos,
    pub distance: i32,
}

impl DistanceRecord {
    pub fn new(source: Pos, target: Pos) -> Self {
        DistanceRecord {
            source,
            target,
            distance: source.dist(target),
        }
    }

    /// Smaller than any real record, occupies the unused slot of the heap.
    pub fn sentinel() -> Self {
        DistanceRecord {
            source: Pos::new(0, 0),
            target: Pos::new(0, 0),
            distance: -1,
        }
    }
}

impl Keyed for DistanceRecord {
    type Key = i32;

    fn key(&self) -> i32 {
        self.distance
    }
}

/// Uniform cost search
pub fn zero<P: Puzzle>(_puzzle: &P) -> Result<f64, HeuristicErr> {
    Ok(0.0)
}

/// Sum of distances from each box to its nearest storage.
pub fn manhattan_sum<P: Puzzle>(puzzle: &P) -> Result<f64, HeuristicErr> {
    let mut dist = 0;
    for &b in puzzle.boxes() {
        dist += puzzle
            .storage()
            .iter()
            .map(|&s| b.dist(s))
            .min()
            .ok_or(HeuristicErr::NoStorage)?;
    }
    Ok(f64::from(dist))
}

/// Deadlock check, then a greedy matching of boxes to storage
/// plus a damped greedy matching of boxes to robots.
///
/// The greedy matching only approximates the minimum cost assignment
/// so the result can overestimate.
pub fn greedy_matching<P: Puzzle>(puzzle: &P) -> Result<f64, HeuristicErr> {
    let boxes = puzzle.boxes();
    let storage = puzzle.storage();
    let robots = puzzle.robots();

    if boxes.len() > storage.len() {
        return Err(HeuristicErr::TooFewStorage {
            boxes: boxes.len(),
            storage: storage.len(),
        });
    }

    if boxes.iter().any(|&b| is_deadlocked(b, puzzle)) {
        return Ok(f64::INFINITY);
    }

    let mut storage_dists = MinHeap::new(DistanceRecord::sentinel());
    let mut robot_dists = MinHeap::new(DistanceRecord::sentinel());
    for &b in boxes {
        for &s in storage {
            storage_dists.insert(DistanceRecord::new(b, s));
        }
        for &r in robots {
            robot_dists.insert(DistanceRecord::new(b, r));
        }
    }

    let mut box_matching = Matching::new();

    // boxes against a wall can only end up on that wall
    let mut wall_records: Vec<_> = storage_dists
        .iter()
        .filter(|record| along_same_wall(puzzle, record.source, record.target))
        .cloned()
        .collect();
    wall_records.sort_by_key(|record| record.distance);
    for record in &wall_records {
        box_matching.try_add(record);
    }

    box_matching.extend_greedily(&mut storage_dists, boxes.len())?;

    let mut robot_matching = Matching::new();
    robot_matching.extend_greedily(&mut robot_dists, boxes.len().min(robots.len()))?;

    Ok(f64::from(box_matching.total) + f64::from(robot_matching.total) / ROBOT_DAMPING)
}

fn along_same_wall<P: Puzzle>(puzzle: &P, a: Pos, b: Pos) -> bool {
    let max_x = puzzle.width() - 1;
    let max_y = puzzle.height() - 1;
    (a.x == 0 && b.x == 0)
        || (a.y == 0 && b.y == 0)
        || (a.x == max_x && b.x == max_x)
        || (a.y == max_y && b.y == max_y)
}

/// Each source and each target used at most once.
#[derive(Debug)]
struct Matching {
    sources: FnvHashSet<Pos>,
    targets: FnvHashSet<Pos>,
    total: i32,
}

impl Matching {
    fn new() -> Self {
        Matching {
            sources: FnvHashSet::default(),
            targets: FnvHashSet::default(),
            total: 0,
        }
    }

    fn len(&self) -> usize {
        self.sources.len()
    }

    fn try_add(&mut self, record: &DistanceRecord) -> bool {
        if self.sources.contains(&record.source) || self.targets.contains(&record.target) {
            return false;
        }
        self.sources.insert(record.source);
        self.targets.insert(record.target);
        self.total += record.distance;
        true
    }

    /// Takes the closest remaining pairs until `wanted` sources are matched.
    fn extend_greedily(
        &mut self,
        dists: &mut MinHeap<DistanceRecord>,
        wanted: usize,
    ) -> Result<(), HeuristicErr> {
        while self.len() < wanted {
            let record = dists.extract_min()?;
            self.try_add(&record);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SokobanState;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn box_on_storage() {
        let s = SokobanState::from_parts(5, 5, &[Pos::new(2, 2)], &[Pos::new(2, 2)], &[], &[]);
        assert_eq!(manhattan_sum(&s).unwrap(), 0.0);
        assert_eq!(greedy_matching(&s).unwrap(), 0.0);
    }

    #[test]
    fn corner_box_is_infinite() {
        let s = SokobanState::from_parts(5, 5, &[Pos::new(0, 0)], &[Pos::new(3, 3)], &[], &[]);
        assert!(deadlock::is_deadlocked(Pos::new(0, 0), &s));
        assert_eq!(greedy_matching(&s).unwrap(), f64::INFINITY);
        // the baseline doesn't know about deadlocks
        assert_eq!(manhattan_sum(&s).unwrap(), 6.0);
    }

    #[test]
    fn coincident_boxes_not_cross_matched() {
        let boxes = [Pos::new(1, 1), Pos::new(4, 4)];
        let s = SokobanState::from_parts(5, 5, &boxes, &boxes, &[], &[]);
        assert_eq!(greedy_matching(&s).unwrap(), 0.0);
        assert_eq!(manhattan_sum(&s).unwrap(), 0.0);
    }

    #[test]
    fn greedy_is_not_optimal() {
        // optimal assignment costs 2 + 2 but greedy grabs the 1 first
        let s = SokobanState::from_parts(
            9,
            5,
            &[Pos::new(4, 2), Pos::new(7, 2)],
            &[Pos::new(5, 2), Pos::new(2, 2)],
            &[],
            &[],
        );
        assert_eq!(greedy_matching(&s).unwrap(), 6.0);
        assert_eq!(manhattan_sum(&s).unwrap(), 3.0);
    }

    #[test]
    fn wall_boxes_matched_first() {
        // without the wall pass the top box would take (3, 1) and leave (1, 0) to the other box
        let s = SokobanState::from_parts(
            6,
            5,
            &[Pos::new(3, 0), Pos::new(3, 3)],
            &[Pos::new(1, 0), Pos::new(3, 1)],
            &[],
            &[],
        );
        assert_eq!(greedy_matching(&s).unwrap(), 4.0);
    }

    #[test]
    fn robots_are_damped() {
        let s = SokobanState::from_parts(
            5,
            5,
            &[Pos::new(2, 2)],
            &[Pos::new(3, 2)],
            &[Pos::new(2, 4), Pos::new(1, 1)],
            &[],
        );
        // both robots are 2 away, only one of them gets matched
        assert!(approx_eq(greedy_matching(&s).unwrap(), 1.0 + 2.0 / ROBOT_DAMPING));
    }

    #[test]
    fn each_robot_used_once() {
        let s = SokobanState::from_parts(
            7,
            5,
            &[Pos::new(2, 2), Pos::new(4, 2)],
            &[Pos::new(2, 3), Pos::new(4, 3)],
            &[Pos::new(3, 2), Pos::new(3, 1)],
            &[],
        );
        // both boxes are next to robot (3, 2), the second box has to use (3, 1)
        assert!(approx_eq(
            greedy_matching(&s).unwrap(),
            2.0 + (1.0 + 2.0) / ROBOT_DAMPING
        ));
    }

    #[test]
    fn infinite_iff_deadlocked() {
        let storage = [Pos::new(2, 2), Pos::new(1, 3)];
        let obstacles = [Pos::new(1, 0), Pos::new(2, 1)];
        let candidates = [
            Pos::new(0, 0),
            Pos::new(1, 1),
            Pos::new(3, 3),
            Pos::new(0, 2),
            Pos::new(4, 2),
            Pos::new(2, 2),
            Pos::new(3, 1),
            Pos::new(1, 2),
        ];
        for &b in &candidates {
            let s = SokobanState::from_parts(5, 5, &[b], &storage, &[Pos::new(2, 3)], &obstacles);
            let h = greedy_matching(&s).unwrap();
            assert_eq!(h.is_infinite(), deadlock::is_deadlocked(b, &s), "{}", b);
            if !h.is_infinite() {
                assert!(h >= 0.0);
            }
            assert!(manhattan_sum(&s).unwrap() >= 0.0);
        }
    }

    #[test]
    fn baseline_grows_with_distance() {
        let storage = [Pos::new(1, 1)];
        let mut last = 0.0;
        for x in 1..6 {
            let s = SokobanState::from_parts(7, 3, &[Pos::new(x, 1)], &storage, &[], &[]);
            let h = manhattan_sum(&s).unwrap();
            assert!(h >= last);
            last = h;
        }
        assert_eq!(last, 4.0);
    }

    #[test]
    fn malformed_states() {
        let s = SokobanState::from_parts(
            5,
            5,
            &[Pos::new(1, 1), Pos::new(2, 2)],
            &[Pos::new(3, 3)],
            &[],
            &[],
        );
        assert_eq!(
            greedy_matching(&s).unwrap_err(),
            HeuristicErr::TooFewStorage {
                boxes: 2,
                storage: 1
            }
        );

        let s = SokobanState::from_parts(5, 5, &[Pos::new(1, 1)], &[], &[], &[]);
        assert_eq!(manhattan_sum(&s).unwrap_err(), HeuristicErr::NoStorage);
    }

    #[test]
    fn no_boxes() {
        let s = SokobanState::from_parts(5, 5, &[], &[Pos::new(1, 1)], &[Pos::new(2, 2)], &[]);
        assert_eq!(greedy_matching(&s).unwrap(), 0.0);
        assert_eq!(manhattan_sum(&s).unwrap(), 0.0);
        assert_eq!(zero(&s).unwrap(), 0.0);
    }
}
