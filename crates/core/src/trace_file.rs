//! File-backed JSONL step trace with a SHA-256 hash chain for playback.
//!
//! The file format is line-delimited JSON (`.jsonl`):
//! - Line 1: header with `format_version`, `seed`, `algorithm`, `frontier_strategy`.
//! - Lines 2+: one step record per line, each carrying a SHA-256 hash chain
//!   (`prev_sha256_hex`, `sha256_hex`) for corruption detection.
//!
//! Writing flushes each record so a trace cut short by a crash stays readable.
//! Loading validates every line's JSON shape and chain link, stopping at the
//! first invalid or incomplete line.

use std::error::Error;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::RunConfig;
use crate::steps::{StepRecord, StepSink};
use crate::types::{FrontierStrategy, SearchAlgorithm};

pub const TRACE_FORMAT_VERSION: u16 = 1;

/// First line of a trace file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TraceHeader {
    pub format_version: u16,
    pub seed: u64,
    pub algorithm: SearchAlgorithm,
    pub frontier_strategy: FrontierStrategy,
}

impl TraceHeader {
    pub fn for_config(config: &RunConfig) -> Self {
        Self {
            format_version: TRACE_FORMAT_VERSION,
            seed: config.seed,
            algorithm: config.algorithm,
            frontier_strategy: config.frontier_strategy,
        }
    }
}

/// Fields hashed for one record, concatenated with `prev_sha256_hex`.
#[derive(Serialize)]
struct RecordBody<'a> {
    seq: u64,
    step: &'a StepRecord,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct FileRecord {
    seq: u64,
    step: StepRecord,
    prev_sha256_hex: String,
    sha256_hex: String,
}

const INITIAL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

fn compute_record_sha256(body_json: &str, prev_sha256_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    hasher.update(prev_sha256_hex.as_bytes());
    let result = hasher.finalize();
    format!("{result:064x}")
}

/// Appends step records to a JSONL trace.
///
/// As a [`StepSink`] it cannot return errors, so the first write failure is
/// kept and later steps are dropped; [`TraceWriter::finish`] reports it.
pub struct TraceWriter {
    writer: BufWriter<File>,
    last_sha256_hex: String,
    next_seq: u64,
    deferred_error: Option<io::Error>,
}

impl TraceWriter {
    /// Create a new trace file, writing the header line immediately.
    pub fn create(path: &Path, header: &TraceHeader) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let header_json = serde_json::to_string(header).map_err(io::Error::other)?;
        writeln!(writer, "{header_json}")?;
        writer.flush()?;

        Ok(Self {
            writer,
            last_sha256_hex: INITIAL_HASH.to_string(),
            next_seq: 0,
            deferred_error: None,
        })
    }

    pub fn append(&mut self, step: &StepRecord) -> io::Result<()> {
        let body = RecordBody { seq: self.next_seq, step };
        let body_json = serde_json::to_string(&body).map_err(io::Error::other)?;
        let sha256_hex = compute_record_sha256(&body_json, &self.last_sha256_hex);

        let record = FileRecord {
            seq: self.next_seq,
            step: *step,
            prev_sha256_hex: self.last_sha256_hex.clone(),
            sha256_hex: sha256_hex.clone(),
        };
        let record_json = serde_json::to_string(&record).map_err(io::Error::other)?;
        writeln!(self.writer, "{record_json}")?;
        self.writer.flush()?;

        self.last_sha256_hex = sha256_hex;
        self.next_seq += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.next_seq
    }

    /// Flushes and returns the number of records written, or the first
    /// error hit while recording.
    pub fn finish(mut self) -> io::Result<u64> {
        if let Some(err) = self.deferred_error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.next_seq)
    }
}

impl StepSink for TraceWriter {
    fn record(&mut self, step: StepRecord) {
        if self.deferred_error.is_some() {
            return;
        }
        if let Err(err) = self.append(&step) {
            self.deferred_error = Some(err);
        }
    }
}

#[derive(Debug)]
pub struct LoadedTrace {
    pub header: TraceHeader,
    pub steps: Vec<StepRecord>,
    /// SHA-256 hex of the last valid record (or the initial hash if empty).
    pub last_sha256_hex: String,
}

#[derive(Debug)]
pub enum TraceLoadError {
    Io(io::Error),
    EmptyFile,
    InvalidHeader { line: usize, message: String },
    InvalidRecord { line: usize, message: String },
    /// The file ended without a trailing newline.
    IncompleteLine { line: usize },
    /// A stored hash does not match its predecessor or its recomputed value.
    HashChainBroken { line: usize },
}

impl fmt::Display for TraceLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "trace I/O error: {e}"),
            Self::EmptyFile => write!(f, "trace file is empty"),
            Self::InvalidHeader { line, message } => {
                write!(f, "invalid trace header at line {line}: {message}")
            }
            Self::InvalidRecord { line, message } => {
                write!(f, "invalid trace record at line {line}: {message}")
            }
            Self::IncompleteLine { line } => write!(f, "incomplete trace line at line {line}"),
            Self::HashChainBroken { line } => {
                write!(f, "SHA-256 hash chain broken at line {line}")
            }
        }
    }
}

impl Error for TraceLoadError {}

/// Load and validate a JSONL trace file.
pub fn load_trace(path: &Path) -> Result<LoadedTrace, TraceLoadError> {
    let content = fs::read_to_string(path).map_err(TraceLoadError::Io)?;
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Err(TraceLoadError::EmptyFile);
    }
    if !content.ends_with('\n') {
        return Err(TraceLoadError::IncompleteLine { line: lines.len() });
    }

    let header: TraceHeader = serde_json::from_str(lines[0])
        .map_err(|e| TraceLoadError::InvalidHeader { line: 1, message: e.to_string() })?;
    if header.format_version != TRACE_FORMAT_VERSION {
        return Err(TraceLoadError::InvalidHeader {
            line: 1,
            message: format!("unsupported format version {}", header.format_version),
        });
    }

    let mut steps = Vec::new();
    let mut prev_sha256_hex = INITIAL_HASH.to_string();

    for (line_index, line) in lines.iter().enumerate().skip(1) {
        let line_number = line_index + 1;
        let record: FileRecord = serde_json::from_str(line).map_err(|e| {
            TraceLoadError::InvalidRecord { line: line_number, message: e.to_string() }
        })?;

        let expected_seq = steps.len() as u64;
        if record.seq != expected_seq {
            return Err(TraceLoadError::InvalidRecord {
                line: line_number,
                message: format!("expected seq {expected_seq}, found {}", record.seq),
            });
        }
        if record.prev_sha256_hex != prev_sha256_hex {
            return Err(TraceLoadError::HashChainBroken { line: line_number });
        }

        let body = RecordBody { seq: record.seq, step: &record.step };
        let body_json = serde_json::to_string(&body).map_err(|e| {
            TraceLoadError::InvalidRecord { line: line_number, message: e.to_string() }
        })?;
        if record.sha256_hex != compute_record_sha256(&body_json, &prev_sha256_hex) {
            return Err(TraceLoadError::HashChainBroken { line: line_number });
        }

        steps.push(record.step);
        prev_sha256_hex = record.sha256_hex;
    }

    Ok(LoadedTrace { header, steps, last_sha256_hex: prev_sha256_hex })
}

#[cfg(test)]
mod tests;
