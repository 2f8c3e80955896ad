use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;
use std::str::FromStr;

use fnv::FnvHashSet;

use crate::config::Format;
use crate::data::{Contents, MapCell, Pos, MAX_SIZE};
use crate::state::{Board, SokobanState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserErr {
    Pos(usize, usize),
    TooLarge,
    NoRobot,
    IncompleteBorder(usize, usize),
    Empty,
}

impl Display for ParserErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            ParserErr::Pos(r, c) => write!(f, "Invalid cell at pos: [{}, {}]", r, c),
            ParserErr::TooLarge => write!(f, "Map larger than {} rows/columns", MAX_SIZE),
            ParserErr::NoRobot => write!(f, "No robot"),
            ParserErr::IncompleteBorder(r, c) => {
                write!(f, "Level not enclosed by walls at pos: [{}, {}]", r, c)
            }
            ParserErr::Empty => write!(f, "Empty level"),
        }
    }
}

impl Error for ParserErr {}

impl FromStr for SokobanState {
    type Err = ParserErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

type Cell = (MapCell, Contents);

/// Guesses the format - only the custom one uses `<>` for walls.
pub fn parse(level: &str) -> Result<SokobanState, ParserErr> {
    if level.trim_start().contains('<') {
        parse_format(level, Format::Custom)
    } else {
        parse_format(level, Format::Xsb)
    }
}

pub fn parse_format(level: &str, format: Format) -> Result<SokobanState, ParserErr> {
    // trim so we can specify levels using raw strings more easily
    let level = level.trim_matches('\n').trim_end();
    if level.is_empty() {
        return Err(ParserErr::Empty);
    }

    let grid = match format {
        Format::Custom => parse_custom(level)?,
        Format::Xsb => parse_xsb(level)?,
    };
    build_state(&grid)
}

/// Parses my custom format
fn parse_custom(level: &str) -> Result<Vec<Vec<Cell>>, ParserErr> {
    let mut grid = Vec::new();

    for (r, line) in level.lines().enumerate() {
        if r >= MAX_SIZE {
            return Err(ParserErr::TooLarge);
        }
        let mut row = Vec::new();
        let mut chars = line.chars();
        while let Some(c1) = chars.next() {
            let c = row.len();
            if c >= MAX_SIZE {
                return Err(ParserErr::TooLarge);
            }
            let c2 = chars.next().ok_or(ParserErr::Pos(r, c))?;

            if c1 == '<' {
                if c2 != '>' {
                    return Err(ParserErr::Pos(r, c));
                }
                row.push((MapCell::Wall, Contents::Empty));
                continue;
            }

            let contents = match c1 {
                ' ' => Contents::Empty,
                'B' => Contents::Box,
                'P' => Contents::Robot,
                _ => return Err(ParserErr::Pos(r, c)),
            };
            let cell = match c2 {
                ' ' => MapCell::Empty,
                '_' => MapCell::Goal,
                _ => return Err(ParserErr::Pos(r, c)),
            };
            row.push((cell, contents));
        }
        grid.push(row);
    }

    Ok(grid)
}

/// Parses (a subset of) the format described [here](http://www.sokobano.de/wiki/index.php?title=Level_format)
fn parse_xsb(level: &str) -> Result<Vec<Vec<Cell>>, ParserErr> {
    let mut grid = Vec::new();

    for (r, line) in level.lines().enumerate() {
        if r >= MAX_SIZE {
            return Err(ParserErr::TooLarge);
        }
        let mut row = Vec::new();
        for (c, cur_char) in line.chars().enumerate() {
            if c >= MAX_SIZE {
                return Err(ParserErr::TooLarge);
            }

            let cell = match cur_char {
                '#' => (MapCell::Wall, Contents::Empty),
                'p' | '@' => (MapCell::Empty, Contents::Robot),
                'P' | '+' => (MapCell::Goal, Contents::Robot),
                'b' | '$' => (MapCell::Empty, Contents::Box),
                'B' | '*' => (MapCell::Goal, Contents::Box),
                '.' => (MapCell::Goal, Contents::Empty),
                ' ' | '-' | '_' => (MapCell::Empty, Contents::Empty),
                _ => return Err(ParserErr::Pos(r, c)),
            };
            row.push(cell);
        }
        grid.push(row);
    }

    Ok(grid)
}

/// Strips the outer ring so the interior starts at (0, 0).
/// Short rows are padded with walls, blank cells on the ring are outside the level.
fn build_state(grid: &[Vec<Cell>]) -> Result<SokobanState, ParserErr> {
    let rows = grid.len();
    let cols = grid.iter().map(Vec::len).max().unwrap_or(0);

    let mut storage = Vec::new();
    let mut obstacles = FnvHashSet::default();
    let mut boxes = Vec::new();
    let mut robots = Vec::new();

    for r in 0..rows {
        for c in 0..cols {
            let (cell, contents) = grid[r]
                .get(c)
                .cloned()
                .unwrap_or((MapCell::Wall, Contents::Empty));

            let on_ring = r == 0 || c == 0 || r == rows - 1 || c == cols - 1;
            if on_ring {
                if cell == MapCell::Goal || contents != Contents::Empty {
                    return Err(ParserErr::IncompleteBorder(r, c));
                }
                continue;
            }

            let pos = Pos::new(c as i32 - 1, r as i32 - 1);
            match cell {
                MapCell::Wall => {
                    obstacles.insert(pos);
                }
                MapCell::Goal => storage.push(pos),
                MapCell::Empty => {}
            }
            match contents {
                Contents::Box => boxes.push(pos),
                Contents::Robot => robots.push(pos),
                Contents::Empty => {}
            }
        }
    }

    if robots.is_empty() {
        return Err(ParserErr::NoRobot);
    }

    let board = Board::new(cols as i32 - 2, rows as i32 - 2, storage, obstacles);
    Ok(SokobanState::new(Rc::new(board), robots, boxes))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::state::Puzzle;

    #[test]
    fn fail_empty() {
        assert_failure("", ParserErr::Empty);
        assert_failure("\n\n", ParserErr::Empty);
    }

    #[test]
    fn custom_fail_no_robot() {
        let level = r"
<><><>
<>  <>
<><><>
";
        assert_failure(level, ParserErr::NoRobot);
    }

    #[test]
    fn custom_fail_pos() {
        let level = r"
<><><>
<>P <>
<>X <>
<><><>
";
        assert_failure(level, ParserErr::Pos(2, 1));
    }

    #[test]
    fn custom_goals() {
        let level = r"
<><><><><>
<> _B_<><>
<>B B <><>
<>  P_<><>
<><><><><>
";
        let state = assert_success_custom(level);
        assert_eq!(state.boxes().len(), 3);
        assert_eq!(state.storage().len(), 3);
        assert!(state.is_obstacle(Pos::new(2, 0)));
    }

    #[test]
    fn custom_multiple_robots() {
        let level = r"
<><><><><>
<>P B P _<>
<><><><><>
";
        let state = assert_success_custom(level);
        assert_eq!(state.robots(), &[Pos::new(0, 0), Pos::new(2, 0)]);
    }

    #[test]
    fn xsb_fail_pos() {
        let level = r"
#####
#@X.#
#####
";
        assert_failure(level, ParserErr::Pos(1, 2));
    }

    #[test]
    fn xsb_fail_border() {
        let level = r"
#####
#@$..
#####
";
        assert_failure(level, ParserErr::IncompleteBorder(1, 4));
    }

    #[test]
    fn xsb_simplest() {
        let level = r"
#####
#@$.#
#####
";
        let state = assert_success_xsb(level);
        assert_eq!((state.width(), state.height()), (3, 1));
        assert_eq!(state.robots(), &[Pos::new(0, 0)]);
        assert_eq!(state.boxes(), &[Pos::new(1, 0)]);
        assert_eq!(state.storage(), &[Pos::new(2, 0)]);
    }

    #[test]
    fn xsb_goals_under_things() {
        let level = r"
######
#+*$.#
######
";
        let state = assert_success_xsb(level);
        assert_eq!(state.storage(), &[Pos::new(0, 0), Pos::new(1, 0), Pos::new(3, 0)]);
        assert!(!state.is_solved());
    }

    #[test]
    fn xsb_original_1() {
        let level = r"
    #####
    #   #
    #$  #
  ###  $##
  #  $ $ #
### # ## #   ######
#   # ## #####  ..#
# $  $          ..#
##### ### #@##  ..#
    #     #########
    #######
";
        let state = level.parse::<SokobanState>().unwrap();
        assert_eq!((state.width(), state.height()), (17, 9));
        assert_eq!(state.boxes().len(), 6);
        assert_eq!(state.storage().len(), 6);
        assert_eq!(state.robots(), &[Pos::new(10, 7)]);
    }

    fn assert_failure(input_level: &str, expected_err: ParserErr) {
        // shared for XSB and custom because no need to print here
        assert_eq!(input_level.parse::<SokobanState>().unwrap_err(), expected_err);
    }

    fn assert_success_custom(input_level: &str) -> SokobanState {
        let state = parse_format(input_level, Format::Custom).unwrap();
        assert_eq!(
            state.format(Format::Custom).to_string(),
            input_level.trim_start_matches('\n')
        );
        state
    }

    fn assert_success_xsb(input_level: &str) -> SokobanState {
        let state = parse_format(input_level, Format::Xsb).unwrap();
        assert_eq!(
            state.format(Format::Xsb).to_string(),
            input_level.trim_start_matches('\n')
        );
        state
    }
}
