//! Rudiment — parse and check percussion notation documents.
//!
//! Reads a document, validates its bar arithmetic and `%%CHECK:` manifest,
//! and prints a summary, the event lists, or the score as JSON. With no
//! file argument it runs on the built-in demo groove.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use rudiment::{Score, Track};

#[derive(Parser)]
#[command(name = "rudiment", version, about = "Percussion notation parser and checker")]
struct Args {
    /// Notation file to parse. Runs the built-in demo score when omitted.
    file: Option<PathBuf>,

    /// Print every track's event list.
    #[arg(long)]
    events: bool,

    /// Emit the parsed score as JSON and nothing else.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let score = match load(args.file.as_ref()) {
        Ok(score) => score,
        Err(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&score) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("JSON serialization error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    summarize(&score);

    if args.events {
        for track in &score.tracks {
            print_events(track);
        }
    }
}

fn load(file: Option<&PathBuf>) -> Result<Score, String> {
    match file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
            Score::from_text(&text).map_err(|e| format!("{}: {e}", path.display()))
        }
        None => Ok(Score::demo()),
    }
}

fn summarize(score: &Score) {
    if let Some(title) = &score.title {
        println!("title: {title}");
    }
    println!(
        "tempo: {} BPM, time: {}, {} pulses per beat",
        score.tempo, score.time_signature, score.pulses_per_beat
    );
    println!(
        "{} track(s), {} bar(s), {} steps of {:.1} ms",
        score.tracks.len(),
        score.bars(),
        score.total_steps(),
        score.step_duration().as_secs_f64() * 1000.0
    );
    for track in &score.tracks {
        println!(
            "  {}: {} steps, {} events",
            track.name,
            track.total_steps(),
            track.events.len()
        );
    }
}

fn print_events(track: &Track) {
    println!("{}:", track.name);
    for event in &track.events {
        if event.is_rest() {
            println!(
                "  step {:>4}  len {:>3}  rest",
                event.start_step, event.length_steps
            );
        } else {
            println!(
                "  step {:>4}  len {:>3}  {}  {}",
                event.start_step, event.length_steps, event.symbol, event.dynamic
            );
        }
    }
}
