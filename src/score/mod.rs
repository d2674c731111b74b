//! Score model and derived timing.

mod demo;
mod types;

pub use types::{
    Dynamic, Meter, NoteEvent, Score, Symbol, TimeSignature, Track, DEFAULT_TEMPO,
};
