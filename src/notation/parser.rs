//! Document parser: headers, pattern lines, and `%%CHECK` blocks.
//!
//! Documents are read line by line in a single pass. `#` starts a comment
//! that runs to the end of the line and is stripped before anything else;
//! blank lines are skipped. Everything left must be a recognized header,
//! a pattern line, or part of a check block.

use crate::score::{Meter, Score, TimeSignature, DEFAULT_TEMPO};

use super::check::{validate, CheckManifest};
use super::error::{ParseError, SyntaxError};
use super::line::assemble_line;
use super::track::TrackBuilder;

/// Parse a notation document into a validated [`Score`].
pub fn parse(text: &str) -> Result<Score, ParseError> {
    DocumentParser::new().parse(text)
}

struct DocumentParser {
    title: Option<String>,
    tempo: u32,
    signature: Option<TimeSignature>,
    pulses_per_beat: Option<u32>,
    builders: Vec<TrackBuilder>,
    manifest: CheckManifest,
    in_check_block: bool,
    seen_check_block: bool,
    /// Set once the first pattern line has been assembled; the grid is
    /// frozen from then on.
    seen_pattern: bool,
}

impl DocumentParser {
    fn new() -> Self {
        Self {
            title: None,
            tempo: DEFAULT_TEMPO,
            signature: None,
            pulses_per_beat: None,
            builders: Vec::new(),
            manifest: CheckManifest::new(),
            in_check_block: false,
            seen_check_block: false,
            seen_pattern: false,
        }
    }

    fn parse(mut self, text: &str) -> Result<Score, ParseError> {
        for (idx, raw) in text.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            self.dispatch(line).map_err(|e| e.at_line(idx + 1))?;
        }
        self.finish()
    }

    fn dispatch(&mut self, line: &str) -> Result<(), SyntaxError> {
        if self.in_check_block {
            if line.starts_with("%%ENDCHECK") {
                self.in_check_block = false;
                return Ok(());
            }
            return self.check_entry(line);
        }

        if line.starts_with("%%CHECK:") {
            self.in_check_block = true;
            self.seen_check_block = true;
            return Ok(());
        }
        if line.starts_with("%%ENDCHECK") {
            return Err(SyntaxError::structure(
                "%%ENDCHECK without an open %%CHECK: block",
            ));
        }

        if line.strip_prefix("FILENAME=").is_some() {
            // recognized for compatibility, the value is not used
            return Ok(());
        }
        if let Some(value) = line.strip_prefix("TITLE=") {
            self.title = Some(value.trim().to_string());
            return Ok(());
        }
        if let Some(value) = line.strip_prefix("TEMPO=") {
            self.tempo = parse_positive(value, "TEMPO")?;
            return Ok(());
        }
        if let Some(value) = line.strip_prefix("TIME=") {
            if self.seen_pattern {
                return Err(SyntaxError::structure(
                    "TIME= cannot change after pattern lines",
                ));
            }
            self.signature = Some(value.trim().parse()?);
            return Ok(());
        }
        if let Some(value) = line.strip_prefix("PULSES_PER_BEAT=") {
            if self.seen_pattern {
                return Err(SyntaxError::structure(
                    "PULSES_PER_BEAT= cannot change after pattern lines",
                ));
            }
            self.pulses_per_beat = Some(parse_positive(value, "PULSES_PER_BEAT")?);
            return Ok(());
        }

        if let Some((name, pattern)) = line.split_once(':') {
            return self.pattern_line(name.trim(), pattern);
        }

        Err(SyntaxError::structure(format!("unrecognized line '{line}'")))
    }

    fn pattern_line(&mut self, name: &str, pattern: &str) -> Result<(), SyntaxError> {
        if name.is_empty() {
            return Err(SyntaxError::structure("pattern line with an empty track name"));
        }

        let meter = self.meter_for(name)?;
        let line = assemble_line(name, pattern, meter)?;
        self.seen_pattern = true;

        let idx = match self.builders.iter().position(|b| b.name() == name) {
            Some(i) => i,
            None => {
                self.builders.push(TrackBuilder::new(name));
                self.builders.len() - 1
            }
        };
        self.builders[idx].push_line(&line);
        Ok(())
    }

    fn meter_for(&self, name: &str) -> Result<Meter, SyntaxError> {
        match (self.signature, self.pulses_per_beat) {
            (Some(signature), Some(ppb)) => step_grid(signature, ppb),
            _ => Err(SyntaxError::structure(format!(
                "declare TIME= and PULSES_PER_BEAT= before track '{name}'"
            ))),
        }
    }

    fn check_entry(&mut self, line: &str) -> Result<(), SyntaxError> {
        let (key, value) = line.split_once('=').ok_or_else(|| {
            SyntaxError::structure(format!("check entry '{line}' is not KEY = INTEGER"))
        })?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(SyntaxError::structure(format!(
                "check entry '{line}' has an empty key"
            )));
        }
        let value: u32 = value.parse().map_err(|_| {
            SyntaxError::structure(format!(
                "check entry '{key}': '{value}' is not a step count"
            ))
        })?;
        self.manifest.insert(key, value);
        Ok(())
    }

    fn finish(self) -> Result<Score, ParseError> {
        let signature = self
            .signature
            .ok_or_else(|| SyntaxError::structure("missing TIME= header"))?;
        let pulses_per_beat = self
            .pulses_per_beat
            .ok_or_else(|| SyntaxError::structure("missing PULSES_PER_BEAT= header"))?;
        // documents with no pattern lines never reach meter_for
        let meter = step_grid(signature, pulses_per_beat)?;

        if self.in_check_block {
            return Err(SyntaxError::structure(
                "%%CHECK: block never closed with %%ENDCHECK",
            )
            .into());
        }
        if !self.seen_check_block {
            return Err(SyntaxError::structure("missing %%CHECK: block").into());
        }

        let tracks: Vec<_> = self.builders.into_iter().map(TrackBuilder::finish).collect();
        validate(&tracks, &self.manifest, meter.bar_steps())?;

        Ok(Score {
            title: self.title,
            tempo: self.tempo,
            time_signature: signature,
            pulses_per_beat,
            tracks,
        })
    }
}

/// Drop a `#` comment. Runs before any other handling of the line.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

/// Build the meter the declared headers describe. Steps are counted in
/// `u32`, so both grid products (bar and whole note) must fit it.
fn step_grid(signature: TimeSignature, pulses_per_beat: u32) -> Result<Meter, SyntaxError> {
    let bar = signature.numerator.checked_mul(pulses_per_beat);
    let whole = signature.denominator.checked_mul(pulses_per_beat);
    match (bar, whole) {
        (Some(_), Some(_)) => Ok(Meter::new(signature, pulses_per_beat)),
        _ => Err(SyntaxError::structure(format!(
            "TIME={signature} at {pulses_per_beat} pulses per beat overflows the step grid"
        ))),
    }
}

fn parse_positive(value: &str, field: &str) -> Result<u32, SyntaxError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(SyntaxError::structure(format!(
            "{field}= expects a positive integer, got '{}'",
            value.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::ErrorKind;
    use crate::score::Symbol;

    const MINIMAL: &str = "\
TIME=4/4
PULSES_PER_BEAT=4
HH: x4 x4 x4 x4
%%CHECK:
HH_Total = 16
%%ENDCHECK
";

    fn ok(src: &str) -> Score {
        match parse(src) {
            Ok(score) => score,
            Err(e) => panic!("document should parse, got: {e}"),
        }
    }

    fn syntax_err(src: &str) -> SyntaxError {
        match parse(src) {
            Err(ParseError::Syntax(e)) => e,
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn minimal_document() {
        let score = ok(MINIMAL);
        assert_eq!(score.tracks.len(), 1);
        assert_eq!(score.tracks[0].name, "HH");
        assert_eq!(score.bars(), 1);
    }

    #[test]
    fn tempo_defaults_to_120() {
        let score = ok(MINIMAL);
        assert_eq!(score.tempo, DEFAULT_TEMPO);
        assert_eq!(score.title, None);
    }

    #[test]
    fn headers_flow_through() {
        let score = ok("\
FILENAME=ignored.txt
TITLE=Eights
TEMPO=140
TIME=3/4
PULSES_PER_BEAT=2
HH: x8 x8 x8 x8 x8 x8
%%CHECK:
HH_Total = 6
%%ENDCHECK
");
        assert_eq!(score.title.as_deref(), Some("Eights"));
        assert_eq!(score.tempo, 140);
        assert_eq!(score.time_signature, TimeSignature::new(3, 4));
        assert_eq!(score.bar_steps(), 6);
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let score = ok("\
# a groove
TIME=4/4        # the grid
PULSES_PER_BEAT=4

HH: x4 x4 x4 x4 # downbeats

%%CHECK:
HH_Total = 16   # one bar
%%ENDCHECK
");
        assert_eq!(score.tracks[0].events.len(), 4);
    }

    #[test]
    fn same_name_accumulates_across_lines() {
        let score = ok("\
TIME=4/4
PULSES_PER_BEAT=4
HH: x4 x4 x4 x4
SD: -2 x4 -4
HH: o4 o4 o4 o4
%%CHECK:
HH_Total = 32
SD_Total = 16
%%ENDCHECK
");
        assert_eq!(score.tracks.len(), 2);
        let hh = score.track("HH").unwrap();
        assert_eq!(hh.total_steps(), 32);
        assert_eq!(hh.events[4].start_step, 16);
        assert_eq!(hh.events[4].symbol, Symbol::Open);
        assert_eq!(score.track("SD").unwrap().total_steps(), 16);
    }

    #[test]
    fn track_order_follows_first_appearance() {
        let score = ok("\
TIME=4/4
PULSES_PER_BEAT=4
SD: -4 x4 -4 x4
KD: x4 -4 x4 -4
SD: -4 x4 -4 x4
%%CHECK:
SD_Total = 32
KD_Total = 16
%%ENDCHECK
");
        let names: Vec<&str> = score.tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["SD", "KD"]);
    }

    #[test]
    fn no_tracks_with_empty_check_block_is_valid() {
        let score = ok("\
TIME=4/4
PULSES_PER_BEAT=4
%%CHECK:
%%ENDCHECK
");
        assert!(score.tracks.is_empty());
        assert_eq!(score.bars(), 1);
        assert_eq!(score.total_steps(), 16);
    }

    #[test]
    fn missing_time_rejected() {
        let e = syntax_err("\
PULSES_PER_BEAT=4
%%CHECK:
%%ENDCHECK
");
        assert_eq!(e.kind, ErrorKind::Structure);
        assert!(e.message.contains("TIME"), "{e}");
    }

    #[test]
    fn missing_pulses_rejected() {
        let e = syntax_err("\
TIME=4/4
%%CHECK:
%%ENDCHECK
");
        assert!(e.message.contains("PULSES_PER_BEAT"), "{e}");
    }

    #[test]
    fn missing_check_block_rejected() {
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
HH: x4 x4 x4 x4
");
        assert_eq!(e.kind, ErrorKind::Structure);
        assert!(e.message.contains("%%CHECK"), "{e}");
    }

    #[test]
    fn pattern_before_grid_rejected() {
        let e = syntax_err("\
HH: x4 x4 x4 x4
TIME=4/4
PULSES_PER_BEAT=4
%%CHECK:
%%ENDCHECK
");
        assert_eq!(e.line, Some(1));
        assert!(e.message.contains("before track 'HH'"), "{e}");
    }

    #[test]
    fn grid_redeclared_before_patterns_overwrites() {
        let score = ok("\
TIME=3/4
TIME=4/4
PULSES_PER_BEAT=8
PULSES_PER_BEAT=4
HH: x4 x4 x4 x4
%%CHECK:
HH_Total = 16
%%ENDCHECK
");
        assert_eq!(score.time_signature, TimeSignature::new(4, 4));
        assert_eq!(score.pulses_per_beat, 4);
    }

    #[test]
    fn grid_redeclared_after_patterns_rejected() {
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
HH: x4 x4 x4 x4
TIME=3/4
%%CHECK:
HH_Total = 16
%%ENDCHECK
");
        assert_eq!(e.line, Some(4));
        assert!(e.message.contains("cannot change"), "{e}");
    }

    #[test]
    fn oversized_grid_rejected() {
        // 65536 * 65536 bar steps does not fit the u32 step counter
        let e = syntax_err("\
TIME=65536/4
PULSES_PER_BEAT=65536
HH: 1
%%CHECK:
%%ENDCHECK
");
        assert_eq!(e.kind, ErrorKind::Structure);
        assert_eq!(e.line, Some(3));
        assert!(e.message.contains("65536"), "{e}");
    }

    #[test]
    fn oversized_whole_note_rejected() {
        // the bar fits (4 * 2^20) but a whole note would be 2^40 steps
        let e = syntax_err("\
TIME=4/1048576
PULSES_PER_BEAT=1048576
HH: x4
%%CHECK:
%%ENDCHECK
");
        assert_eq!(e.kind, ErrorKind::Structure);
        assert_eq!(e.line, Some(3));
        assert!(e.message.contains("overflows"), "{e}");
    }

    #[test]
    fn oversized_grid_rejected_without_patterns() {
        let e = syntax_err("\
TIME=65536/65536
PULSES_PER_BEAT=65536
%%CHECK:
%%ENDCHECK
");
        assert_eq!(e.kind, ErrorKind::Structure);
        assert_eq!(e.line, None);
        assert!(e.message.contains("overflows"), "{e}");
    }

    #[test]
    fn unrecognized_line_rejected() {
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
drum machine go brr
%%CHECK:
%%ENDCHECK
");
        assert_eq!(e.kind, ErrorKind::Structure);
        assert_eq!(e.line, Some(3));
    }

    #[test]
    fn stray_endcheck_rejected() {
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
%%ENDCHECK
");
        assert!(e.message.contains("without an open"), "{e}");
    }

    #[test]
    fn unclosed_check_block_rejected() {
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
HH: x4 x4 x4 x4
%%CHECK:
HH_Total = 16
");
        assert!(e.message.contains("never closed"), "{e}");
    }

    #[test]
    fn malformed_check_entry_rejected() {
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
%%CHECK:
HH_Total 16
%%ENDCHECK
");
        assert_eq!(e.line, Some(4));
        assert!(e.message.contains("KEY = INTEGER"), "{e}");
    }

    #[test]
    fn non_numeric_check_value_rejected() {
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
%%CHECK:
HH_Total = lots
%%ENDCHECK
");
        assert!(e.message.contains("not a step count"), "{e}");
    }

    #[test]
    fn duplicate_check_key_last_wins() {
        ok("\
TIME=4/4
PULSES_PER_BEAT=4
HH: x4 x4 x4 x4
%%CHECK:
HH_Total = 1
HH_Total = 16
%%ENDCHECK
");
    }

    #[test]
    fn second_check_block_accumulates() {
        ok("\
TIME=4/4
PULSES_PER_BEAT=4
HH: x4 x4 x4 x4
KD: x4 x4 x4 x4
%%CHECK:
HH_Total = 16
%%ENDCHECK
%%CHECK:
KD_Total = 16
%%ENDCHECK
");
    }

    #[test]
    fn empty_track_name_rejected() {
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
: x4 x4 x4 x4
%%CHECK:
%%ENDCHECK
");
        assert!(e.message.contains("empty track name"), "{e}");
    }

    #[test]
    fn bad_tempo_rejected() {
        let e = syntax_err("TEMPO=fast\nTIME=4/4\nPULSES_PER_BEAT=4\n%%CHECK:\n%%ENDCHECK\n");
        assert!(e.message.contains("TEMPO="), "{e}");
        syntax_err("TEMPO=0\nTIME=4/4\nPULSES_PER_BEAT=4\n%%CHECK:\n%%ENDCHECK\n");
    }

    #[test]
    fn grammar_errors_carry_the_line_number() {
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
HH: x4 x4 x4 x4
HH: x4 huh x4 x4
%%CHECK:
HH_Total = 32
%%ENDCHECK
");
        assert_eq!(e.kind, ErrorKind::Grammar);
        assert_eq!(e.line, Some(4));
    }

    #[test]
    fn inexact_duration_grid_rejected() {
        // 12 steps per whole note, /8 does not divide it
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=3
HH: x8 x8 x8 x8 x8 x8
%%CHECK:
HH_Total = 12
%%ENDCHECK
");
        assert_eq!(e.kind, ErrorKind::Grammar);
        assert_eq!(e.line, Some(3));
    }

    #[test]
    fn empty_document_rejected() {
        let e = syntax_err("");
        assert!(e.message.contains("TIME"), "{e}");
    }

    #[test]
    fn comment_only_pattern_is_blank() {
        // the pattern line dissolves into a comment, so only headers remain
        let e = syntax_err("\
TIME=4/4
PULSES_PER_BEAT=4
# HH: x4 x4 x4 x4
");
        assert!(e.message.contains("%%CHECK"), "{e}");
    }
}
