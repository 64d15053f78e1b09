//! Reference CLI collaborator for the matching core.
//!
//! Owns everything the library deliberately does not: directory enumeration
//! (sorted by name so the ranking tie-break is reproducible), result
//! presentation, and an interactive next/previous browse loop over the
//! ranked candidates.

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;

use lookalike::{CandidateScore, MatchSession, SessionConfig, SessionState};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let (query, dir) = match (args.next(), args.next()) {
        (Some(query), Some(dir)) => (query, dir),
        _ => {
            eprintln!("usage: lookalike <query-image> <candidate-dir> [config.yaml]");
            process::exit(2);
        }
    };
    let config = match args.next() {
        Some(path) => SessionConfig::from_yaml_file(path)?,
        None => SessionConfig::default(),
    };

    let candidates = list_candidates(&dir)?;
    let mut session = MatchSession::new(config)?;
    let state = session.begin(&query, &candidates)?;

    for skipped in session.diagnostics() {
        eprintln!("skipped {}: {}", skipped.id, skipped.kind);
    }

    if state == SessionState::ReadyEmpty {
        println!("no candidate in {dir} produced a usable score");
        return Ok(());
    }

    println!(
        "{} of {} candidates ranked",
        session.results().len(),
        candidates.len()
    );
    if let Some(best) = session.current() {
        print_entry(0, best);
    }
    browse(&mut session)
}

/// Ordered candidate identifiers: regular files in `dir`, sorted by path.
fn list_candidates(dir: &str) -> Result<Vec<String>, io::Error> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path().to_string_lossy().into_owned());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Single-step browsing over the ranked results, mirroring the clamped
/// next/previous cursor semantics of the core.
fn browse(session: &mut MatchSession) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("[n]ext / [p]revious / [q]uit> ");
        io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };
        let entry = match line.trim() {
            "n" => session.next().cloned(),
            "p" => session.previous().cloned(),
            "q" => return Ok(()),
            _ => {
                eprintln!("unrecognized input; expected n, p, or q");
                continue;
            }
        };
        if let Some(score) = entry {
            let rank = session.results().cursor().unwrap_or(0);
            print_entry(rank, &score);
        }
    }
}

fn print_entry(rank: usize, score: &CandidateScore) {
    println!(
        "#{} {} (mean distance {:.2}, {} pairings)",
        rank + 1,
        score.id,
        score.mean_distance,
        score.pair_count
    );
}
