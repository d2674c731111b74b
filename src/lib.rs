//! Rudiment — plain-text percussion notation parsed into a step-accurate score.
//!
//! A document names its grid (`TIME=`, `PULSES_PER_BEAT=`), lays out named
//! pattern lines one bar at a time, and ends with a `%%CHECK:` manifest of
//! expected per-track step totals. [`Score::from_text`] parses and validates
//! the whole document:
//!
//! ```
//! use rudiment::{Score, Symbol};
//!
//! let score = Score::from_text(
//!     "TIME=4/4\n\
//!      PULSES_PER_BEAT=4\n\
//!      HH: x8 x8 x8 x8 x8 x8 x8 x8\n\
//!      KD: x4 -4 x2\n\
//!      %%CHECK:\n\
//!      HH_Total = 16\n\
//!      KD_Total = 16\n\
//!      %%ENDCHECK\n",
//! )
//! .unwrap();
//!
//! assert_eq!(score.bars(), 1);
//! let kick = score.track("KD").unwrap();
//! assert_eq!(kick.strike_at(0).unwrap().symbol, Symbol::Hit);
//! assert!(kick.strike_at(4).is_none());
//! ```

pub mod notation;
pub mod score;

pub use notation::{ChecksumError, ErrorKind, ParseError, SyntaxError};
pub use score::{Dynamic, Meter, NoteEvent, Score, Symbol, TimeSignature, Track};
