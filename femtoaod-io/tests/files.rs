#![allow(clippy::float_cmp)]
use std::io::Write;

use femtoaod_core::{RawEvent, RawTrack, ReconstructedEvent, ThreeVector, Vertex};
use femtoaod_io::{Error, EventSource, JsonLinesSource, JsonLinesWriter};
use tempfile::NamedTempFile;

fn raw_event(run_number: i32, n_tracks: usize) -> RawEvent {
    let tracks = (0..n_tracks)
        .map(|i| RawTrack {
            id: i32::try_from(i).unwrap(),
            charge: 1,
            momentum: ThreeVector::new(0.5, 0.1, 0.2),
            filter_map: 1 << 7,
            ..RawTrack::default()
        })
        .collect();
    RawEvent {
        run_number,
        magnetic_field: 5.0,
        primary_vertex: Some(Vertex::new(ThreeVector::new(0.0, 0.0, 1.0), 4)),
        tracks,
        ..RawEvent::default()
    }
}

#[test]
fn test_raw_events_survive_a_file() {
    let mut file = NamedTempFile::new().unwrap();
    let events = vec![raw_event(1, 3), raw_event(2, 0), raw_event(3, 1)];
    for event in &events {
        serde_json::to_writer(&mut file, event).unwrap();
        writeln!(file).unwrap();
    }
    file.flush().unwrap();

    let read: Vec<RawEvent> = JsonLinesSource::open(file.path())
        .unwrap()
        .events()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(read, events);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = JsonLinesSource::open(dir.path().join("absent.jsonl"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_truncated_line_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{{\"run_number\": 5}}").unwrap();
    write!(file, "{{\"run_number\": 6, \"tracks\": [").unwrap();
    file.flush().unwrap();

    let mut source = JsonLinesSource::open(file.path()).unwrap();
    assert_eq!(source.next_event().unwrap().unwrap().run_number, 5);
    let err = source.next_event().unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn test_writer_output_is_readable() {
    let file = NamedTempFile::new().unwrap();
    let mut writer = JsonLinesWriter::create(file.path()).unwrap();
    for run_number in 0..4 {
        writer
            .write_event(&ReconstructedEvent {
                run_number,
                n_tracks: 2,
                ..ReconstructedEvent::default()
            })
            .unwrap();
    }
    writer.flush().unwrap();

    let content = std::fs::read_to_string(file.path()).unwrap();
    let runs: Vec<i32> = content
        .lines()
        .map(|line| {
            serde_json::from_str::<ReconstructedEvent>(line)
                .unwrap()
                .run_number
        })
        .collect();
    assert_eq!(runs, vec![0, 1, 2, 3]);
}

#[test]
fn test_reading_continues_after_malformed_line() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{{\"run_number\": 10}}").unwrap();
    writeln!(file, "{{\"run_number\": [}}").unwrap();
    writeln!(file, "{{\"run_number\": 12}}").unwrap();
    file.flush().unwrap();

    let mut source = JsonLinesSource::open(file.path()).unwrap();
    let mut runs = Vec::new();
    let mut bad_lines = Vec::new();
    loop {
        match source.next_event() {
            Ok(Some(event)) => runs.push(event.run_number),
            Ok(None) => break,
            Err(Error::Parse { line, .. }) => bad_lines.push(line),
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
    assert_eq!(runs, vec![10, 12]);
    assert_eq!(bad_lines, vec![2]);
}
