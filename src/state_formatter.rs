use std::fmt::{self, Debug, Display, Formatter};

use crate::config::Format;
use crate::data::{Contents, MapCell, Pos};
use crate::state::{Puzzle, SokobanState};
use crate::vec2d::Vec2d;

/// Draws a state in the same format levels are written in, including the wall ring.
pub struct StateFormatter<'a> {
    state: &'a SokobanState,
    format: Format,
}

impl<'a> StateFormatter<'a> {
    pub(crate) fn new(state: &'a SokobanState, format: Format) -> Self {
        Self { state, format }
    }

    fn write_to_formatter(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (width, height) = (self.state.width(), self.state.height());

        let mut cells = Vec2d::new(width, height, MapCell::Empty);
        for &pos in self.state.board().obstacles() {
            cells[pos] = MapCell::Wall;
        }
        for &pos in self.state.storage() {
            cells[pos] = MapCell::Goal;
        }

        let mut contents = Vec2d::new(width, height, Contents::Empty);
        for &b in self.state.boxes() {
            contents[b] = Contents::Box;
        }
        for &r in self.state.robots() {
            contents[r] = Contents::Robot;
        }

        // -1 and width/height are the wall ring
        for y in -1..=height {
            for x in -1..=width {
                let pos = Pos::new(x, y);
                let (cell, content) = if cells.contains(pos) {
                    (cells[pos], contents[pos])
                } else {
                    (MapCell::Wall, Contents::Empty)
                };

                match self.format {
                    Format::Custom => Self::write_cell_custom(cell, content, f)?,
                    Format::Xsb => Self::write_cell_xsb(cell, content, f)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_cell_custom(cell: MapCell, contents: Contents, f: &mut Formatter<'_>) -> fmt::Result {
        if cell == MapCell::Wall {
            write!(f, "<>")?;
        } else {
            match contents {
                Contents::Empty => write!(f, " ")?,
                Contents::Box => write!(f, "B")?,
                Contents::Robot => write!(f, "P")?,
            };
            match cell {
                MapCell::Empty => write!(f, " ")?,
                MapCell::Goal => write!(f, "_")?,
                MapCell::Wall => unreachable!("Wall again"),
            };
        }
        Ok(())
    }

    fn write_cell_xsb(cell: MapCell, contents: Contents, f: &mut Formatter<'_>) -> fmt::Result {
        match (cell, contents) {
            (MapCell::Empty, Contents::Empty) => write!(f, " "),
            (MapCell::Empty, Contents::Box) => write!(f, "$"),
            (MapCell::Empty, Contents::Robot) => write!(f, "@"),
            (MapCell::Wall, Contents::Empty) => write!(f, "#"),
            (MapCell::Wall, _) => unreachable!("Wall with non-empty contents"),
            (MapCell::Goal, Contents::Empty) => write!(f, "."),
            (MapCell::Goal, Contents::Box) => write!(f, "*"),
            (MapCell::Goal, Contents::Robot) => write!(f, "+"),
        }
    }
}

impl<'a> Display for StateFormatter<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_to_formatter(f)
    }
}

impl<'a> Debug for StateFormatter<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
