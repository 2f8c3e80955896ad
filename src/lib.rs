// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
// Additional warnings that are allow by default (`rustc -W help`)
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused)]

pub mod config;
pub mod data;
pub mod fs;
pub mod heap;
pub mod heuristic;
pub mod parser;
pub mod solver;
pub mod state;
pub mod state_formatter;

mod vec2d;

use std::error::Error;

use crate::config::Config;
use crate::solver::{SolverErr, SolverOk};
use crate::state::SokobanState;

pub trait LoadLevel {
    fn load_level(&self) -> Result<SokobanState, Box<dyn Error>>;
}

pub trait Solve {
    fn solve(&self, config: &Config) -> Result<SolverOk<SokobanState>, SolverErr>;
}
