//! Score model: step-accurate events, tracks, and timing metadata.
//!
//! All timing is integer steps at `pulses_per_beat` resolution. Conversion to
//! wall-clock time happens only at the playback/export boundary via
//! [`Score::step_duration`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::notation::{self, ParseError, SyntaxError};

/// Tempo used when a document has no `TEMPO=` header.
pub const DEFAULT_TEMPO: u32 = 120;

/// What a step holds: a strike marker or silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbol {
    /// Plain strike (`x`).
    #[serde(rename = "x")]
    Hit,
    /// Accented strike (`X`).
    #[serde(rename = "X")]
    Accent,
    /// Open strike (`o`).
    #[serde(rename = "o")]
    Open,
    /// Accented open strike (`O`).
    #[serde(rename = "O")]
    OpenAccent,
    #[serde(rename = "rest")]
    Rest,
}

impl Symbol {
    pub fn is_rest(self) -> bool {
        self == Symbol::Rest
    }

    /// The notation character for this symbol. Rests print as `-`.
    pub fn marker(self) -> char {
        match self {
            Symbol::Hit => 'x',
            Symbol::Accent => 'X',
            Symbol::Open => 'o',
            Symbol::OpenAccent => 'O',
            Symbol::Rest => '-',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// Loudness marking attached to an event. Unmarked events are mezzo-forte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dynamic {
    #[serde(rename = "pp")]
    Pianissimo,
    #[serde(rename = "p")]
    Piano,
    #[serde(rename = "mp")]
    MezzoPiano,
    #[default]
    #[serde(rename = "mf")]
    MezzoForte,
    #[serde(rename = "f")]
    Forte,
    #[serde(rename = "ff")]
    Fortissimo,
}

impl Dynamic {
    /// Parse a notation marking (`pp` through `ff`).
    pub fn from_marking(s: &str) -> Option<Self> {
        match s {
            "pp" => Some(Dynamic::Pianissimo),
            "p" => Some(Dynamic::Piano),
            "mp" => Some(Dynamic::MezzoPiano),
            "mf" => Some(Dynamic::MezzoForte),
            "f" => Some(Dynamic::Forte),
            "ff" => Some(Dynamic::Fortissimo),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dynamic::Pianissimo => "pp",
            Dynamic::Piano => "p",
            Dynamic::MezzoPiano => "mp",
            Dynamic::MezzoForte => "mf",
            Dynamic::Forte => "f",
            Dynamic::Fortissimo => "ff",
        }
    }

    /// Coarse loudness bucket used by playback and export: 1 soft, 2 medium,
    /// 3 loud.
    pub fn level(self) -> u8 {
        match self {
            Dynamic::Pianissimo | Dynamic::Piano => 1,
            Dynamic::MezzoPiano | Dynamic::MezzoForte => 2,
            Dynamic::Forte | Dynamic::Fortissimo => 3,
        }
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time signature such as `4/4` or `7/8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for TimeSignature {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            SyntaxError::structure(format!(
                "time signature '{s}' is not NUMERATOR/DENOMINATOR"
            ))
        };
        let (num, den) = s.split_once('/').ok_or_else(malformed)?;
        let numerator: u32 = num.trim().parse().map_err(|_| malformed())?;
        let denominator: u32 = den.trim().parse().map_err(|_| malformed())?;
        if numerator == 0 || denominator == 0 {
            return Err(malformed());
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

/// The step grid a document is read against: a time signature plus the
/// number of pulses (steps) per beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meter {
    pub signature: TimeSignature,
    pub pulses_per_beat: u32,
}

impl Meter {
    pub fn new(signature: TimeSignature, pulses_per_beat: u32) -> Self {
        Self {
            signature,
            pulses_per_beat,
        }
    }

    /// Steps in one bar.
    pub fn bar_steps(self) -> u32 {
        self.signature.numerator * self.pulses_per_beat
    }

    /// Steps in one whole note: the dividend for duration codes.
    pub fn steps_per_whole(self) -> u32 {
        self.pulses_per_beat * self.signature.denominator
    }
}

/// One event on a track's step grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub start_step: u32,
    pub length_steps: u32,
    pub symbol: Symbol,
    pub dynamic: Dynamic,
}

impl NoteEvent {
    pub fn new(start_step: u32, length_steps: u32, symbol: Symbol, dynamic: Dynamic) -> Self {
        Self {
            start_step,
            length_steps,
            symbol,
            dynamic,
        }
    }

    /// First step after this event.
    pub fn end_step(self) -> u32 {
        self.start_step + self.length_steps
    }

    pub fn is_rest(self) -> bool {
        self.symbol.is_rest()
    }
}

/// A named lane of events, sorted by start and covering every step of
/// `[0, total_steps())` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub events: Vec<NoteEvent>,
}

impl Track {
    pub fn new(name: impl Into<String>, events: Vec<NoteEvent>) -> Self {
        Self {
            name: name.into(),
            events,
        }
    }

    /// Total steps covered, i.e. the end of the last event.
    pub fn total_steps(&self) -> u32 {
        self.events.last().map_or(0, |e| e.end_step())
    }

    /// The event covering `step`, if any.
    pub fn event_at(&self, step: u32) -> Option<&NoteEvent> {
        let idx = self.events.partition_point(|e| e.end_step() <= step);
        self.events.get(idx).filter(|e| e.start_step <= step)
    }

    /// The strike starting exactly at `step`, if any. Playback loops call
    /// this once per step to decide whether to trigger a voice.
    pub fn strike_at(&self, step: u32) -> Option<&NoteEvent> {
        self.event_at(step)
            .filter(|e| e.start_step == step && !e.is_rest())
    }
}

/// A parsed percussion score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub title: Option<String>,
    pub tempo: u32,
    pub time_signature: TimeSignature,
    pub pulses_per_beat: u32,
    pub tracks: Vec<Track>,
}

impl Score {
    /// Parse and validate a notation document. See the crate docs for the
    /// format.
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        notation::parse(text)
    }

    /// The step grid this score was read against.
    pub fn meter(&self) -> Meter {
        Meter::new(self.time_signature, self.pulses_per_beat)
    }

    /// Steps in one bar.
    pub fn bar_steps(&self) -> u32 {
        self.meter().bar_steps()
    }

    /// Bars needed to hold the longest track, never less than one.
    pub fn bars(&self) -> u32 {
        let longest = self
            .tracks
            .iter()
            .map(Track::total_steps)
            .max()
            .unwrap_or(0);
        longest.div_ceil(self.bar_steps()).max(1)
    }

    /// Total steps across all bars.
    pub fn total_steps(&self) -> u32 {
        self.bars() * self.bar_steps()
    }

    /// Wall-clock duration of one step at this score's tempo.
    pub fn step_duration(&self) -> Duration {
        Duration::from_secs_f64(60.0 / (self.tempo as f64 * self.pulses_per_beat as f64))
    }

    /// Find a track by name.
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }
}
