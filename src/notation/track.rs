//! Per-track event accumulation across non-contiguous pattern lines.

use crate::score::{NoteEvent, Symbol, Track};

use super::line::AssembledLine;

/// Accumulates one track's events as its lines are encountered. A track's
/// lines need not be contiguous in the document; every line for the same
/// name lands in the same builder.
#[derive(Debug)]
pub struct TrackBuilder {
    name: String,
    events: Vec<NoteEvent>,
    /// Absolute step where the next line begins.
    offset: u32,
}

impl TrackBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
            offset: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps accumulated so far.
    pub fn total_steps(&self) -> u32 {
        self.offset
    }

    /// Append one assembled line. A rest that starts where the previous
    /// rest ended extends it in place, so silence spanning tokens or line
    /// boundaries stays a single event.
    pub fn push_line(&mut self, line: &AssembledLine) {
        for placed in &line.placed {
            let start = self.offset + placed.relative_start;
            let token = placed.token;

            if token.symbol == Symbol::Rest {
                if let Some(last) = self.events.last_mut() {
                    if last.symbol == Symbol::Rest && last.end_step() == start {
                        last.length_steps += token.length_steps;
                        continue;
                    }
                }
            }

            self.events.push(NoteEvent::new(
                start,
                token.length_steps,
                token.symbol,
                token.dynamic,
            ));
        }

        self.offset += line.total_steps;
    }

    pub fn finish(self) -> Track {
        Track::new(self.name, self.events)
    }
}
