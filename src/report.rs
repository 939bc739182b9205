//! Result recording and persistence
//!
//! Every engine run produces a grid of cells keyed by question and then by
//! retrieval mode, each cell holding the answer text and the elapsed wall
//! time. Runs are persisted as pretty-printed JSON; the combined comparison
//! file carries a timestamp in its name so successive runs never clobber
//! each other.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// One answered question in one retrieval mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Answer text, or an `ERROR: …` marker when the query failed
    pub answer: String,

    /// Wall-clock seconds for the query, rounded to two decimals
    pub seconds: f64,
}

/// Records for one question, keyed by retrieval mode
pub type ModeRecords = BTreeMap<String, QueryRecord>;

/// All cells produced by one engine run, keyed by question
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineRun {
    pub cells: BTreeMap<String, ModeRecords>,
}

impl EngineRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one cell
    pub fn record(&mut self, question: &str, mode: &str, answer: String, seconds: f64) {
        self.cells
            .entry(question.to_string())
            .or_default()
            .insert(mode.to_string(), QueryRecord { answer, seconds });
    }

    /// Look up one cell
    pub fn get(&self, question: &str, mode: &str) -> Option<&QueryRecord> {
        self.cells.get(question).and_then(|modes| modes.get(mode))
    }

    /// Total number of recorded cells
    pub fn len(&self) -> usize {
        self.cells.values().map(|modes| modes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Combined output of a comparison run
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CompareResults {
    pub lightrag: EngineRun,
    pub graphrag: EngineRun,
}

/// Elapsed seconds since `start`, rounded to two decimals
pub fn elapsed_secs(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 100.0).round() / 100.0
}

/// A results file name carrying the current local time
pub fn timestamped_name(prefix: &str) -> String {
    format!("{}_{}.json", prefix, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write a value as pretty JSON under `dir`, creating the directory if needed
pub fn save_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json)?;
    info!("Results saved to {}", path.display());
    Ok(path)
}

/// Load a previously saved results file
pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Log latency and answer length for every cell of a run
pub fn log_summary(engine: &str, run: &EngineRun) {
    for (question, modes) in &run.cells {
        for (mode, record) in modes {
            info!(
                engine,
                mode = mode.as_str(),
                seconds = record.seconds,
                answer_chars = record.answer.len(),
                question = question.chars().take(70).collect::<String>().as_str(),
                "summary"
            );
        }
    }
}
