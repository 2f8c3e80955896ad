//! Best-first search engine used by all the solvers.
//!
//! The open list, duplicate detection and predecessor map live in the engine
//! so calling `search` again resumes where the previous call stopped.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt::{self, Debug, Formatter};
use std::hash::Hash;
use std::time::{Duration, Instant};

use fnv::FnvHashMap;
use log::debug;
use typed_arena::Arena;

use crate::heuristic::{HeuristicErr, HeuristicFn};

use super::backtracking::backtrack_path;
use super::stats::Stats;

pub type Cost = u32;

pub type GoalFn<S> = fn(&S) -> bool;

/// The clock is only checked once every this many iterations of the search loop.
const CLOCK_CHECK_INTERVAL: u64 = 256;

pub trait SearchState: Clone + Eq + Hash + Debug {
    /// States reachable by a single unit cost action.
    fn successors(&self) -> Vec<Self>;
}

/// `g + weight * h`
pub fn fval_function(g: Cost, h: f64, weight: f64) -> f64 {
    f64::from(g) + weight * h
}

/// How nodes are ranked in the open list - lower is expanded first.
pub enum Strategy {
    /// Only h
    BestFirst,
    /// Any function of g and h
    Custom(Box<dyn Fn(Cost, f64) -> f64>),
}

impl Strategy {
    pub fn weighted(weight: f64) -> Self {
        Strategy::Custom(Box::new(move |g, h| fval_function(g, h, weight)))
    }

    fn fval(&self, g: Cost, h: f64) -> f64 {
        match *self {
            Strategy::BestFirst => h,
            Strategy::Custom(ref fval) => fval(g, h),
        }
    }
}

impl Debug for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Strategy::BestFirst => write!(f, "BestFirst"),
            Strategy::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Nodes with g, h or g + h above the respective limit are discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBound {
    pub g: f64,
    pub h: f64,
    pub g_plus_h: f64,
}

impl CostBound {
    pub fn new(g: f64, h: f64, g_plus_h: f64) -> Self {
        CostBound { g, h, g_plus_h }
    }

    pub fn unbounded() -> Self {
        CostBound::new(f64::INFINITY, f64::INFINITY, f64::INFINITY)
    }

    pub fn exceeded_by(&self, g: Cost, h: f64) -> bool {
        let g = f64::from(g);
        g > self.g || h > self.h || g + h > self.g_plus_h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Solved,
    TimedOut,
    /// Nothing left in the open list under the given bound
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution<S> {
    /// From the initial state to the goal, both included
    pub path: Vec<S>,
    pub cost: Cost,
}

impl<S> Solution<S> {
    pub fn goal(&self) -> &S {
        self.path.last().expect("Path always contains the initial state")
    }
}

#[derive(Debug)]
pub struct SearchResult<S> {
    pub status: SearchStatus,
    pub solution: Option<Solution<S>>,
    pub stats: Stats,
}

pub(crate) struct SearchNode<'a, S> {
    pub(crate) state: &'a S,
    pub(crate) prev: Option<&'a S>,
    pub(crate) dist: Cost,
    pub(crate) h: f64,
    pub(crate) cost: f64,
    /// Insertion order - earlier nodes win ties
    order: u64,
}

impl<S> PartialEq for SearchNode<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<S> Eq for SearchNode<'_, S> {}

impl<S> PartialOrd for SearchNode<'_, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for SearchNode<'_, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.h.total_cmp(&other.h))
            .then(self.order.cmp(&other.order))
    }
}

impl<S: Debug> Debug for SearchNode<'_, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SearchNode {{ dist: {}, h: {}, cost: {}, state: {:?} }}",
            self.dist, self.h, self.cost, self.state
        )
    }
}

pub struct SearchEngine<'a, S> {
    arena: &'a Arena<S>,
    goal_fn: GoalFn<S>,
    heur_fn: HeuristicFn<S>,
    strategy: Strategy,
    to_visit: BinaryHeap<Reverse<SearchNode<'a, S>>>,
    /// Lowest g each state has been reached with
    dists: FnvHashMap<&'a S, Cost>,
    prevs: FnvHashMap<&'a S, &'a S>,
    stats: Stats,
    next_order: u64,
}

impl<'a, S: SearchState> SearchEngine<'a, S> {
    /// Sets up a search from `initial_state`, nothing is expanded until `search` is called.
    pub fn init_search(
        arena: &'a Arena<S>,
        initial_state: S,
        goal_fn: GoalFn<S>,
        heur_fn: HeuristicFn<S>,
        strategy: Strategy,
    ) -> Result<Self, HeuristicErr> {
        let mut engine = SearchEngine {
            arena,
            goal_fn,
            heur_fn,
            strategy,
            to_visit: BinaryHeap::new(),
            dists: FnvHashMap::default(),
            prevs: FnvHashMap::default(),
            stats: Stats::new(),
            next_order: 0,
        };

        let h = (engine.heur_fn)(&initial_state)?;
        if h.is_infinite() {
            debug!("Initial state is a dead end");
            engine.stats.add_pruned(0);
        } else {
            let state: &'a S = arena.alloc(initial_state);
            engine.dists.insert(state, 0);
            engine.push(state, None, 0, h);
        }
        Ok(engine)
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Runs until a goal is found, `time_budget` runs out or no node within `bound` is left.
    pub fn search(
        &mut self,
        time_budget: Duration,
        bound: CostBound,
    ) -> Result<SearchResult<S>, HeuristicErr> {
        debug!("Search called with bound {:?}", bound);
        let started = Instant::now();
        let mut steps: u64 = 0;

        loop {
            if steps % CLOCK_CHECK_INTERVAL == 0 && started.elapsed() >= time_budget {
                debug!("Search timed out after {} steps", steps);
                return Ok(self.result(SearchStatus::TimedOut, None));
            }
            steps += 1;

            let cur_node = match self.to_visit.pop() {
                Some(Reverse(node)) => node,
                None => {
                    debug!("Open list exhausted after {} steps", steps);
                    return Ok(self.result(SearchStatus::Exhausted, None));
                }
            };

            // a cheaper path to this state was found after this node was queued
            if self.dists[cur_node.state] < cur_node.dist {
                self.stats.add_reached_duplicate(cur_node.dist);
                continue;
            }
            // the bound could have shrunk since the node was queued
            if bound.exceeded_by(cur_node.dist, cur_node.h) {
                self.stats.add_pruned(cur_node.dist);
                continue;
            }

            self.stats.add_expanded(cur_node.dist);
            if let Some(prev) = cur_node.prev {
                self.prevs.insert(cur_node.state, prev);
            }

            if (self.goal_fn)(cur_node.state) {
                debug!("Solved, backtracking path");
                let path = backtrack_path(&self.prevs, cur_node.state);
                let cost = (path.len() - 1) as Cost;
                let solution = Solution { path, cost };
                return Ok(self.result(SearchStatus::Solved, Some(solution)));
            }

            let new_dist = cur_node.dist + 1;
            for neighbor_state in cur_node.state.successors() {
                if let Some(&dist) = self.dists.get(&neighbor_state) {
                    if dist <= new_dist {
                        self.stats.add_reached_duplicate(new_dist);
                        continue;
                    }
                }

                let h = (self.heur_fn)(&neighbor_state)?;
                if h.is_infinite() || bound.exceeded_by(new_dist, h) {
                    self.stats.add_pruned(new_dist);
                    continue;
                }

                let arena: &'a Arena<S> = self.arena;
                let state: &'a S = arena.alloc(neighbor_state);
                self.dists.insert(state, new_dist);
                self.push(state, Some(cur_node.state), new_dist, h);
            }
        }
    }

    fn push(&mut self, state: &'a S, prev: Option<&'a S>, dist: Cost, h: f64) {
        let node = SearchNode {
            state,
            prev,
            dist,
            h,
            cost: self.strategy.fval(dist, h),
            order: self.next_order,
        };
        self.next_order += 1;
        self.stats.add_created(dist);
        self.to_visit.push(Reverse(node));
    }

    fn result(&self, status: SearchStatus, solution: Option<Solution<S>>) -> SearchResult<S> {
        SearchResult {
            status,
            solution,
            stats: self.stats.clone(),
        }
    }
}

impl<S> Debug for SearchEngine<'_, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SearchEngine {{ strategy: {:?}, open: {}, seen: {} }}",
            self.strategy,
            self.to_visit.len(),
            self.dists.len()
        )
    }
}
