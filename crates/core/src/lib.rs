pub mod config;
pub mod graph;
pub mod map_text;
pub mod oracle;
pub mod search;
pub mod steps;
pub mod trace_file;
pub mod types;

pub use config::RunConfig;
pub use graph::{Edge, Entity, Graph, Node};
pub use map_text::{MapParseError, parse_map, parse_rows, render_map};
pub use oracle::Oracle;
pub use search::*;
pub use steps::{NoopSink, StepLabel, StepRecord, StepSink};
pub use trace_file::{LoadedTrace, TraceHeader, TraceLoadError, TraceWriter, load_trace};
pub use types::*;
