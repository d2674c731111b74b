//! Token grammar: classifies one whitespace-delimited pattern token.
//!
//! A token is either a single marker (`x X o O - r R _ .`) padded by `+`
//! steps, or a marker with a note-value duration code (`x4`, `-8`, `o2+++++++`)
//! whose step length comes from the active meter. Either form may end in a
//! `^dynamic` marking.

use crate::score::{Dynamic, Meter, Symbol};

use super::error::SyntaxError;

/// Note-value codes accepted in duration form, whole note through 64th.
const DURATION_CODES: [u32; 7] = [1, 2, 4, 8, 16, 32, 64];

/// A classified token: what to play and for how many steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedToken {
    pub symbol: Symbol,
    pub dynamic: Dynamic,
    pub length_steps: u32,
}

/// Classify one token against the active meter.
pub fn parse_token(token: &str, meter: Meter) -> Result<ParsedToken, SyntaxError> {
    if token == "|" {
        return Err(SyntaxError::grammar(
            "'|' is not a token; bar lines cannot be used as spacers",
        ));
    }

    let (body, marked) = split_dynamic(token)?;

    let core = body.trim_end_matches('+');
    let plus_count = (body.len() - core.len()) as u32;

    if core.is_empty() {
        return Err(SyntaxError::grammar(format!(
            "token '{token}' has an empty core"
        )));
    }

    let (symbol, length_steps) = match duration_shape(core) {
        Some((symbol, digits)) => {
            let steps = duration_steps(token, digits, meter)?;
            if plus_count != 0 && plus_count != steps - 1 {
                return Err(SyntaxError::grammar(format!(
                    "token '{token}': found {plus_count} '+' but a {steps}-step note pads with {}",
                    steps - 1
                )));
            }
            (symbol, steps)
        }
        None => {
            let symbol = match core {
                "x" => Symbol::Hit,
                "X" => Symbol::Accent,
                "o" => Symbol::Open,
                "O" => Symbol::OpenAccent,
                "-" | "r" | "R" | "_" => Symbol::Rest,
                "." if marked.is_some() => {
                    return Err(SyntaxError::grammar(format!(
                        "token '{token}': '.' cannot carry a dynamic"
                    )))
                }
                "." => Symbol::Rest,
                _ => {
                    return Err(SyntaxError::grammar(format!("unknown token '{token}'")));
                }
            };
            (symbol, 1 + plus_count)
        }
    };

    Ok(ParsedToken {
        symbol,
        dynamic: marked.unwrap_or_default(),
        length_steps,
    })
}

/// Split an optional `^dynamic` suffix off a token.
fn split_dynamic(token: &str) -> Result<(&str, Option<Dynamic>), SyntaxError> {
    match token.split_once('^') {
        None => Ok((token, None)),
        Some((body, suffix)) => match Dynamic::from_marking(suffix) {
            Some(d) => Ok((body, Some(d))),
            None => Err(SyntaxError::grammar(format!(
                "token '{token}': unknown dynamic '^{suffix}', expected one of pp p mp mf f ff"
            ))),
        },
    }
}

/// Read `core` as `<optional marker><digits>` and return the implied symbol
/// plus the digit run. A bare digit run plays the plain strike.
fn duration_shape(core: &str) -> Option<(Symbol, &str)> {
    let first = core.chars().next()?;
    if first.is_ascii_digit() {
        if core.bytes().all(|b| b.is_ascii_digit()) {
            return Some((Symbol::Hit, core));
        }
        return None;
    }
    let symbol = prefix_symbol(first)?;
    let digits = &core[first.len_utf8()..];
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some((symbol, digits))
    } else {
        None
    }
}

/// Markers legal in front of a duration code. `.` is pad-only and excluded.
fn prefix_symbol(c: char) -> Option<Symbol> {
    match c {
        'x' => Some(Symbol::Hit),
        'X' => Some(Symbol::Accent),
        'o' => Some(Symbol::Open),
        'O' => Some(Symbol::OpenAccent),
        '-' | 'r' | 'R' | '_' => Some(Symbol::Rest),
        _ => None,
    }
}

/// Convert a duration code to steps. The code must divide the whole-note
/// step count exactly.
fn duration_steps(token: &str, digits: &str, meter: Meter) -> Result<u32, SyntaxError> {
    let code: u32 = digits
        .parse()
        .map_err(|_| invalid_code(token, digits))?;
    if !DURATION_CODES.contains(&code) {
        return Err(invalid_code(token, digits));
    }

    let whole = meter.steps_per_whole();
    if whole % code != 0 {
        return Err(SyntaxError::grammar(format!(
            "token '{token}': a /{code} note does not fit {} at {} pulses per beat \
             ({whole} steps per whole note)",
            meter.signature, meter.pulses_per_beat
        )));
    }
    Ok(whole / code)
}

fn invalid_code(token: &str, digits: &str) -> SyntaxError {
    SyntaxError::grammar(format!(
        "token '{token}': invalid duration code {digits}, expected one of 1 2 4 8 16 32 64"
    ))
}
