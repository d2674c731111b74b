//! Assembles one pattern line into relatively-placed tokens.

use crate::score::Meter;

use super::error::SyntaxError;
use super::token::{parse_token, ParsedToken};

/// A token placed at its step offset within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedToken {
    pub relative_start: u32,
    pub token: ParsedToken,
}

/// One assembled pattern line. `total_steps` always equals one bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledLine {
    pub placed: Vec<PlacedToken>,
    pub total_steps: u32,
}

/// Tokenize and place every token of `pattern`, then require the line to
/// fill one bar exactly.
pub fn assemble_line(
    track: &str,
    pattern: &str,
    meter: Meter,
) -> Result<AssembledLine, SyntaxError> {
    let mut placed = Vec::new();
    let mut offset = 0u32;

    for raw in pattern.split_whitespace() {
        let token = parse_token(raw, meter)?;
        placed.push(PlacedToken {
            relative_start: offset,
            token,
        });
        offset += token.length_steps;
    }

    let bar = meter.bar_steps();
    if offset != bar {
        return Err(SyntaxError::arithmetic(format!(
            "track '{track}': line holds {offset} steps, a bar is {bar}"
        )));
    }

    Ok(AssembledLine {
        placed,
        total_steps: offset,
    })
}
