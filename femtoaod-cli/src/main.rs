//! femtoaod command-line interface.
//!
//! Converts JSON-lines raw events into femtoscopy events and summarises
//! input files.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use clap::{Parser, Subcommand};

use femtoaod_core::RawEvent;
use femtoaod_io::{EventSource, JsonLinesSource, JsonLinesWriter};
use femtoaod_reader::{Conversion, EventReader, ReaderConfig};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] femtoaod_io::Error),

    #[error("Reader error: {0}")]
    Reader(#[from] femtoaod_reader::Error),
}

/// Femtoscopy event reader.
#[derive(Parser)]
#[command(name = "femtoaod")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert raw events into femtoscopy events
    Convert {
        /// Input JSON-lines file of raw events
        input: PathBuf,

        /// Output JSON-lines file
        #[arg(short, long)]
        output: PathBuf,

        /// Reader configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed of the centrality flattening draw
        #[arg(long)]
        seed: Option<u64>,

        /// Track filter bit, overriding the configuration
        #[arg(long)]
        filter_bit: Option<u8>,
    },

    /// Show information about a raw event file
    Info {
        /// Input JSON-lines file
        input: PathBuf,
    },
}

fn load_config(
    path: Option<&PathBuf>,
    seed: Option<u64>,
    filter_bit: Option<u8>,
) -> Result<ReaderConfig> {
    let mut config = match path {
        Some(path) => ReaderConfig::from_file(path)?,
        None => ReaderConfig::default(),
    };
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if let Some(bit) = filter_bit {
        config = config.with_filter_bit(bit);
    }
    Ok(config)
}

/// Next decodable event; malformed lines are logged, counted and skipped.
fn next_event<S: EventSource>(
    source: &mut S,
    malformed: &mut usize,
) -> Result<Option<RawEvent>> {
    loop {
        match source.next_event() {
            Err(err @ femtoaod_io::Error::Parse { .. }) => {
                log::warn!("skipping event: {}", err);
                *malformed += 1;
            }
            other => return Ok(other?),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            seed,
            filter_bit,
        } => {
            let config = load_config(config.as_ref(), seed, filter_bit)?;
            log::info!("reader configuration: {:?}", config);
            let mut reader = EventReader::new(config)?;
            let mut source = JsonLinesSource::open(&input)?;
            let mut writer = JsonLinesWriter::create(&output)?;

            let start = Instant::now();
            let mut read = 0usize;
            let mut tracks = 0usize;
            let mut v0s = 0usize;
            let mut xis = 0usize;
            let mut rejections: BTreeMap<String, usize> = BTreeMap::new();

            let mut malformed = 0usize;

            while let Some(event) = next_event(&mut source, &mut malformed)? {
                read += 1;
                match reader.convert(&event) {
                    Conversion::Accepted(converted) => {
                        tracks += converted.tracks.len();
                        v0s += converted.v0s.len();
                        xis += converted.xis.len();
                        writer.write_event(&converted)?;
                    }
                    Conversion::Rejected(reason) => {
                        *rejections.entry(reason.to_string()).or_default() += 1;
                    }
                }
            }
            writer.flush()?;

            println!(
                "Converted {} of {} events in {:.2}s",
                writer.events_written(),
                read,
                start.elapsed().as_secs_f64()
            );
            if malformed > 0 {
                println!("Malformed events skipped: {}", malformed);
            }
            println!("Tracks: {}", tracks);
            println!("V0s: {}", v0s);
            println!("Cascades: {}", xis);
            for (reason, count) in &rejections {
                println!("Rejected ({}): {}", reason, count);
            }
        }

        Commands::Info { input } => {
            let mut source = JsonLinesSource::open(&input)?;
            let mut events = 0usize;
            let mut with_vertex = 0usize;
            let mut with_mc = 0usize;
            let mut tracks = 0usize;
            let mut v0s = 0usize;
            let mut cascades = 0usize;
            let mut runs: BTreeMap<i32, usize> = BTreeMap::new();
            let mut malformed = 0usize;

            while let Some(event) = next_event(&mut source, &mut malformed)? {
                events += 1;
                if event.primary_vertex.is_some() {
                    with_vertex += 1;
                }
                if event.mc_particles.is_some() {
                    with_mc += 1;
                }
                tracks += event.tracks.len();
                v0s += event.v0s.len();
                cascades += event.cascades.len();
                *runs.entry(event.run_number).or_default() += 1;
            }

            println!("File: {}", input.display());
            println!("Events: {}", events);
            if malformed > 0 {
                println!("Malformed lines: {}", malformed);
            }
            println!("With primary vertex: {}", with_vertex);
            println!("With MC truth: {}", with_mc);
            if events > 0 {
                println!(
                    "Tracks: {} ({:.1} per event)",
                    tracks,
                    tracks as f64 / events as f64
                );
            }
            println!("V0s: {}", v0s);
            println!("Cascades: {}", cascades);
            for (run, count) in &runs {
                println!("Run {}: {} events", run, count);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_malformed_lines_are_skipped() {
        let input = "{\"run_number\": 1}\n{broken\n\n{\"run_number\": 3}\n";
        let mut source = JsonLinesSource::from_reader(Cursor::new(input));
        let mut malformed = 0;
        let mut runs = Vec::new();
        while let Some(event) = next_event(&mut source, &mut malformed).unwrap() {
            runs.push(event.run_number);
        }
        assert_eq!(runs, vec![1, 3]);
        assert_eq!(malformed, 1);
    }
}
