use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::config::Format;
use crate::parser;
use crate::state::SokobanState;
use crate::LoadLevel;

pub(crate) fn read_file<P: AsRef<Path>>(path: P) -> Result<String, Box<dyn Error>> {
    let mut file = File::open(path)?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Reads a level forcing the given format instead of guessing it.
pub fn load_level_format<P: AsRef<Path>>(
    path: P,
    format: Format,
) -> Result<SokobanState, Box<dyn Error>> {
    let text = read_file(path)?;
    Ok(parser::parse_format(&text, format)?)
}

impl LoadLevel for str {
    fn load_level(&self) -> Result<SokobanState, Box<dyn Error>> {
        let text = read_file(self)?;
        Ok(parser::parse(&text)?)
    }
}
