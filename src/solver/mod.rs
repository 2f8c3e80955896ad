//! Anytime drivers - they call the search engine repeatedly with tighter bounds
//! and keep the best solution found before the deadline.

pub mod a_star;
mod backtracking;
pub mod stats;

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use typed_arena::Arena;

use crate::config::{Config, HeuristicKind, Method};
use crate::heuristic::{greedy_matching, manhattan_sum, zero, HeuristicErr, HeuristicFn};
use crate::state::{sokoban_goal_state, Puzzle, SokobanState};
use crate::Solve;

use self::a_star::{
    Cost, CostBound, GoalFn, SearchEngine, SearchState, SearchStatus, Solution, Strategy,
};
use self::stats::Stats;

/// Weight of the first iteration of `iterative_astar`, halved after every solution.
pub const INITIAL_WEIGHT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverErr {
    BoxesStorage,
    Heuristic(HeuristicErr),
}

impl Display for SolverErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            SolverErr::BoxesStorage => write!(f, "More boxes than storage cells"),
            SolverErr::Heuristic(err) => write!(f, "Heuristic failed: {}", err),
        }
    }
}

impl Error for SolverErr {}

impl From<HeuristicErr> for SolverErr {
    fn from(err: HeuristicErr) -> Self {
        SolverErr::Heuristic(err)
    }
}

pub struct SolverOk<S> {
    /// Best solution found, `None` if the time ran out or there is no solution.
    pub solution: Option<Solution<S>>,
    /// Stats of the run that found the best solution (or the last run if none was found)
    pub stats: Stats,
    /// Cost of every solution in the order they were found
    pub improvements: Vec<Cost>,
    pub iterations: usize,
    pub(crate) method: Method,
}

impl<S> SolverOk<S> {
    fn new(method: Method) -> Self {
        Self {
            solution: None,
            stats: Stats::new(),
            improvements: Vec::new(),
            iterations: 0,
            method,
        }
    }

    /// A later solution can't be worse than the one we already have.
    fn record(&mut self, solution: Solution<S>, stats: Stats) {
        if let Some(ref best) = self.solution {
            if solution.cost > best.cost {
                return;
            }
        }
        info!(
            "{}: found solution with cost {} in iteration {}",
            self.method, solution.cost, self.iterations
        );
        self.improvements.push(solution.cost);
        self.solution = Some(solution);
        self.stats = stats;
    }

    fn best_cost(&self) -> f64 {
        self.solution
            .as_ref()
            .map_or(f64::INFINITY, |s| f64::from(s.cost))
    }
}

impl<S> Debug for SolverOk<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.solution {
            None => writeln!(f, "No solution")?,
            Some(ref solution) => writeln!(f, "{}: {}", self.method, solution.cost)?,
        }
        writeln!(f, "Iterations: {}", self.iterations)?;
        write!(f, "{}", self.stats)
    }
}

impl Solve for SokobanState {
    fn solve(&self, config: &Config) -> Result<SolverOk<SokobanState>, SolverErr> {
        solve(self, config)
    }
}

pub fn solve(state: &SokobanState, config: &Config) -> Result<SolverOk<SokobanState>, SolverErr> {
    // more storage than boxes is fine, the other way around can never be solved
    if state.boxes().len() > state.storage().len() {
        return Err(SolverErr::BoxesStorage);
    }

    let heur_fn = heuristic_fn(config.heuristic);
    debug!(
        "Solving using {} with {} heuristic",
        config.method, config.heuristic
    );
    match config.method {
        Method::WeightedAStar => weighted_astar(
            state,
            sokoban_goal_state,
            heur_fn,
            config.weight,
            config.time_budget,
        ),
        Method::IterativeAStar => {
            iterative_astar(state, sokoban_goal_state, heur_fn, config.time_budget)
        }
        Method::IterativeGbfs => {
            iterative_gbfs(state, sokoban_goal_state, heur_fn, config.time_budget)
        }
    }
}

pub fn heuristic_fn<P: Puzzle>(kind: HeuristicKind) -> HeuristicFn<P> {
    match kind {
        HeuristicKind::Manhattan => manhattan_sum::<P>,
        HeuristicKind::Alternate => greedy_matching::<P>,
        HeuristicKind::Zero => zero::<P>,
    }
}

fn time_left(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| *left > Duration::from_secs(0))
}

/// One run of A* ranking nodes by `g + weight * h`.
pub fn weighted_astar<S: SearchState>(
    initial_state: &S,
    goal_fn: GoalFn<S>,
    heur_fn: HeuristicFn<S>,
    weight: f64,
    time_budget: Duration,
) -> Result<SolverOk<S>, SolverErr> {
    let mut solver_ok = SolverOk::new(Method::WeightedAStar);

    let arena = Arena::new();
    let mut engine = SearchEngine::init_search(
        &arena,
        initial_state.clone(),
        goal_fn,
        heur_fn,
        Strategy::weighted(weight),
    )?;
    let result = engine.search(time_budget, CostBound::unbounded())?;
    solver_ok.iterations = 1;

    match result.solution {
        Some(solution) => solver_ok.record(solution, result.stats),
        None => {
            if result.status == SearchStatus::TimedOut {
                warn!("Weighted A* (weight {}) ran out of time", weight);
            }
            solver_ok.stats = result.stats;
        }
    }
    Ok(solver_ok)
}

/// Restarts weighted A* with a halved weight after each solution,
/// only looking for solutions no worse than the best one so far.
///
/// Returns before the deadline once a run exhausts the bound, later runs would prune the same nodes.
pub fn iterative_astar<S: SearchState>(
    initial_state: &S,
    goal_fn: GoalFn<S>,
    heur_fn: HeuristicFn<S>,
    time_budget: Duration,
) -> Result<SolverOk<S>, SolverErr> {
    let deadline = Instant::now() + time_budget;
    let mut solver_ok = SolverOk::new(Method::IterativeAStar);
    let mut weight = INITIAL_WEIGHT;

    while let Some(remaining) = time_left(deadline) {
        solver_ok.iterations += 1;

        let best_cost = solver_ok.best_cost();
        let bound = CostBound::new(best_cost, best_cost / 2.0, best_cost);
        debug!(
            "Iteration {}: weight {}, bound {:?}",
            solver_ok.iterations, weight, bound
        );

        let arena = Arena::new();
        let mut engine = SearchEngine::init_search(
            &arena,
            initial_state.clone(),
            goal_fn,
            heur_fn,
            Strategy::weighted(weight),
        )?;
        let result = engine.search(remaining, bound)?;

        match result.solution {
            Some(solution) => {
                solver_ok.record(solution, result.stats);
                weight /= 2.0;
            }
            None => {
                if solver_ok.solution.is_none() {
                    solver_ok.stats = result.stats;
                }
                // the weight changes the order of expansion but not which nodes are within the bound
                if result.status == SearchStatus::Exhausted {
                    debug!("Nothing left within the bound");
                    break;
                }
            }
        }
    }

    if solver_ok.solution.is_none() {
        warn!("Iterative A* found no solution");
    }
    Ok(solver_ok)
}

/// Greedy best-first search resumed with a bound that only lets strictly cheaper solutions through.
///
/// Returns before the deadline once the open list has nothing left inside the bound.
pub fn iterative_gbfs<S: SearchState>(
    initial_state: &S,
    goal_fn: GoalFn<S>,
    heur_fn: HeuristicFn<S>,
    time_budget: Duration,
) -> Result<SolverOk<S>, SolverErr> {
    let deadline = Instant::now() + time_budget;
    let mut solver_ok = SolverOk::new(Method::IterativeGbfs);

    let arena = Arena::new();
    let mut engine = SearchEngine::init_search(
        &arena,
        initial_state.clone(),
        goal_fn,
        heur_fn,
        Strategy::BestFirst,
    )?;

    while let Some(remaining) = time_left(deadline) {
        solver_ok.iterations += 1;

        let bound = CostBound::new(solver_ok.best_cost() - 1.0, f64::INFINITY, f64::INFINITY);
        debug!("Iteration {}: bound {:?}", solver_ok.iterations, bound);
        let result = engine.search(remaining, bound)?;

        match result.solution {
            Some(solution) => solver_ok.record(solution, result.stats),
            None => {
                if solver_ok.solution.is_none() {
                    solver_ok.stats = result.stats;
                }
                if result.status == SearchStatus::Exhausted {
                    debug!("Nothing cheaper left to find");
                    break;
                }
            }
        }
    }

    if solver_ok.solution.is_none() {
        warn!("Iterative GBFS found no solution");
    }
    Ok(solver_ok)
}

/// Result of running `weighted_astar` once per weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSweep {
    /// In the order the weights were given
    pub runs: Vec<SweepRun>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRun {
    pub weight: f64,
    /// `None` if the run timed out or found nothing
    pub cost: Option<Cost>,
    pub expanded: usize,
}

impl WeightSweep {
    pub fn solved(&self) -> usize {
        self.runs.iter().filter(|run| run.cost.is_some()).count()
    }

    /// Between consecutive solved runs with decreasing weights, expansions never go down
    /// and costs never go up. False when nothing was solved.
    pub fn expands_more_as_weight_decreases(&self) -> bool {
        let solved: Vec<_> = self.runs.iter().filter(|run| run.cost.is_some()).collect();
        if solved.is_empty() {
            return false;
        }
        solved.windows(2).all(|pair| {
            pair[1].weight > pair[0].weight
                || (pair[1].expanded >= pair[0].expanded && pair[1].cost <= pair[0].cost)
        })
    }
}

/// Independent weighted A* runs, each with the full `time_budget`.
pub fn weight_sweep<S: SearchState>(
    initial_state: &S,
    goal_fn: GoalFn<S>,
    heur_fn: HeuristicFn<S>,
    weights: &[f64],
    time_budget: Duration,
) -> Result<WeightSweep, SolverErr> {
    let mut runs = Vec::with_capacity(weights.len());
    for &weight in weights {
        let solver_ok = weighted_astar(initial_state, goal_fn, heur_fn, weight, time_budget)?;
        let run = SweepRun {
            weight,
            cost: solver_ok.solution.map(|s| s.cost),
            expanded: solver_ok.stats.total_expanded(),
        };
        debug!("{:?}", run);
        runs.push(run);
    }
    Ok(WeightSweep { runs })
}
