use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Custom,
    Xsb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    WeightedAStar,
    IterativeAStar,
    IterativeGbfs,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Method::WeightedAStar => write!(f, "weighted"),
            Method::IterativeAStar => write!(f, "iterative-astar"),
            Method::IterativeGbfs => write!(f, "iterative-gbfs"),
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weighted" => Ok(Method::WeightedAStar),
            "iterative-astar" => Ok(Method::IterativeAStar),
            "iterative-gbfs" => Ok(Method::IterativeGbfs),
            _ => Err(format!("Unknown method: {}", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeuristicKind {
    /// Sum of distances from each box to its nearest storage
    Manhattan,
    /// Deadlock detection + greedy box/storage and box/robot matching
    Alternate,
    /// Turns A* into uniform cost search
    Zero,
}

impl Display for HeuristicKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            HeuristicKind::Manhattan => write!(f, "manhattan"),
            HeuristicKind::Alternate => write!(f, "alternate"),
            HeuristicKind::Zero => write!(f, "zero"),
        }
    }
}

impl FromStr for HeuristicKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manhattan" => Ok(HeuristicKind::Manhattan),
            "alternate" => Ok(HeuristicKind::Alternate),
            "zero" => Ok(HeuristicKind::Zero),
            _ => Err(format!("Unknown heuristic: {}", s)),
        }
    }
}

/// Everything needed to run one of the solvers on a problem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub method: Method,
    pub heuristic: HeuristicKind,
    /// Only used by `Method::WeightedAStar`, the iterative method picks its own weights.
    pub weight: f64,
    pub time_budget: Duration,
    pub format: Format,
    pub print_path: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            method: Method::IterativeGbfs,
            heuristic: HeuristicKind::Alternate,
            weight: 10.0,
            time_budget: Duration::from_secs(2),
            format: Format::Xsb,
            print_path: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_roundtrip() {
        for &method in &[
            Method::WeightedAStar,
            Method::IterativeAStar,
            Method::IterativeGbfs,
        ] {
            assert_eq!(method.to_string().parse::<Method>().unwrap(), method);
        }
        assert!("dfs".parse::<Method>().is_err());
    }

    #[test]
    fn heuristic_names() {
        assert_eq!("alternate".parse(), Ok(HeuristicKind::Alternate));
        assert_eq!("manhattan".parse(), Ok(HeuristicKind::Manhattan));
        assert_eq!(HeuristicKind::Zero.to_string(), "zero");
        assert!("euclid".parse::<HeuristicKind>().is_err());
    }
}
