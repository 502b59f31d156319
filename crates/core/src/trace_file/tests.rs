use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::*;
use crate::steps::StepLabel;
use crate::types::Pos;

fn trace_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

fn header() -> TraceHeader {
    TraceHeader::for_config(&RunConfig { seed: 42, ..RunConfig::default() })
}

fn step(explored: usize, label: StepLabel) -> StepRecord {
    StepRecord { explored, explorable: 9, cost: Some(explored as u32), label: Some(label) }
}

fn write_three(path: &Path) {
    let mut writer = TraceWriter::create(path, &header()).unwrap();
    writer.append(&step(1, StepLabel::Finalized { pos: Pos { y: 0, x: 0 } })).unwrap();
    writer.append(&step(1, StepLabel::Relaxed { pos: Pos { y: 0, x: 1 } })).unwrap();
    writer.append(&step(2, StepLabel::PathFound)).unwrap();
}

#[test]
fn header_and_records_roundtrip() {
    let dir = tempdir().unwrap();
    let path = trace_path(dir.path(), "roundtrip.jsonl");
    write_three(&path);

    let loaded = load_trace(&path).unwrap();
    assert_eq!(loaded.header, header());
    assert_eq!(loaded.header.seed, 42);
    assert_eq!(loaded.steps.len(), 3);
    assert_eq!(loaded.steps[2].label, Some(StepLabel::PathFound));
    assert_ne!(loaded.last_sha256_hex, INITIAL_HASH);
}

#[test]
fn header_only_trace_is_valid_and_empty() {
    let dir = tempdir().unwrap();
    let path = trace_path(dir.path(), "header_only.jsonl");
    let writer = TraceWriter::create(&path, &header()).unwrap();
    assert_eq!(writer.finish().unwrap(), 0);

    let loaded = load_trace(&path).unwrap();
    assert!(loaded.steps.is_empty());
    assert_eq!(loaded.last_sha256_hex, INITIAL_HASH);
}

#[test]
fn tampered_record_breaks_the_chain() {
    let dir = tempdir().unwrap();
    let path = trace_path(dir.path(), "tampered.jsonl");
    write_three(&path);

    let content = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    lines[2] = lines[2].replace("\"explored\":1", "\"explored\":7");
    fs::write(&path, lines.join("\n") + "\n").unwrap();

    let err = load_trace(&path).unwrap_err();
    assert!(matches!(err, TraceLoadError::HashChainBroken { line: 3 }), "got {err}");
}

#[test]
fn torn_final_line_is_reported() {
    let dir = tempdir().unwrap();
    let path = trace_path(dir.path(), "torn.jsonl");
    write_three(&path);

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "{{\"seq\":3,\"step\"").unwrap();

    let err = load_trace(&path).unwrap_err();
    assert!(matches!(err, TraceLoadError::IncompleteLine { line: 5 }), "got {err}");
}

#[test]
fn garbage_line_stops_loading() {
    let dir = tempdir().unwrap();
    let path = trace_path(dir.path(), "garbage.jsonl");
    write_three(&path);

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "not json").unwrap();

    let err = load_trace(&path).unwrap_err();
    assert!(matches!(err, TraceLoadError::InvalidRecord { line: 5, .. }), "got {err}");
}

#[test]
fn empty_file_and_bad_header_are_rejected() {
    let dir = tempdir().unwrap();
    let empty = trace_path(dir.path(), "empty.jsonl");
    fs::write(&empty, "").unwrap();
    assert!(matches!(load_trace(&empty), Err(TraceLoadError::EmptyFile)));

    let bad = trace_path(dir.path(), "bad_header.jsonl");
    fs::write(&bad, "{\"format_version\":1}\n").unwrap();
    assert!(matches!(load_trace(&bad), Err(TraceLoadError::InvalidHeader { line: 1, .. })));
}

#[test]
fn writer_records_steps_as_a_sink() {
    let dir = tempdir().unwrap();
    let path = trace_path(dir.path(), "nested/sink.jsonl");
    let mut writer = TraceWriter::create(&path, &header()).unwrap();

    let sink: &mut dyn StepSink = &mut writer;
    sink.record(step(1, StepLabel::FogEntered { pos: Pos { y: 1, x: 1 } }));
    sink.record(step(2, StepLabel::Backtracked { from: Pos { y: 1, x: 1 }, to: Pos { y: 1, x: 0 } }));
    assert_eq!(writer.records_written(), 2);
    assert_eq!(writer.finish().unwrap(), 2);

    let loaded = load_trace(&path).unwrap();
    assert_eq!(loaded.steps[1].label, Some(StepLabel::Backtracked {
        from: Pos { y: 1, x: 1 },
        to: Pos { y: 1, x: 0 },
    }));
}
