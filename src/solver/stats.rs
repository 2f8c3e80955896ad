use std::fmt::{self, Debug, Display, Formatter};

use separator::Separatable;

/// Counts per search depth (g).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Stats {
    created_states: Vec<usize>,
    visited_states: Vec<usize>,
    duplicate_states: Vec<usize>,
    pruned_states: Vec<usize>,
}

impl Stats {
    pub fn new() -> Self {
        Stats::default()
    }

    pub fn total_created(&self) -> usize {
        self.created_states.iter().sum()
    }

    /// States taken from the open list and expanded
    pub fn total_expanded(&self) -> usize {
        self.visited_states.iter().sum()
    }

    pub fn total_reached_duplicates(&self) -> usize {
        self.duplicate_states.iter().sum()
    }

    /// Dead ends and states outside the cost bound
    pub fn total_pruned(&self) -> usize {
        self.pruned_states.iter().sum()
    }

    pub(crate) fn add_created(&mut self, depth: u32) -> bool {
        Self::add(&mut self.created_states, depth)
    }

    /// Returns true when this is the first expanded state at this depth.
    pub(crate) fn add_expanded(&mut self, depth: u32) -> bool {
        Self::add(&mut self.visited_states, depth)
    }

    pub(crate) fn add_reached_duplicate(&mut self, depth: u32) -> bool {
        Self::add(&mut self.duplicate_states, depth)
    }

    pub(crate) fn add_pruned(&mut self, depth: u32) -> bool {
        Self::add(&mut self.pruned_states, depth)
    }

    fn add(counts: &mut Vec<usize>, depth: u32) -> bool {
        let depth = depth as usize;
        let mut ret = false;

        // while because some depths might be skipped
        while depth >= counts.len() {
            counts.push(0);
            ret = true;
        }
        counts[depth] += 1;
        ret
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "States created total: {}", self.total_created().separated_string())?;
        writeln!(f, "States expanded total: {}", self.total_expanded().separated_string())?;
        writeln!(
            f,
            "Reached duplicates total: {}",
            self.total_reached_duplicates().separated_string()
        )?;
        writeln!(f, "Pruned total: {}", self.total_pruned().separated_string())
    }
}

impl Debug for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "created by depth: {:?}", self.created_states)?;
        writeln!(f, "expanded by depth: {:?}", self.visited_states)?;
        writeln!(f, "reached duplicates by depth: {:?}", self.duplicate_states)?;
        writeln!(f, "pruned by depth: {:?}", self.pruned_states)?;
        write!(f, "{}", self)
    }
}
