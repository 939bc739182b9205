//! GraphRAG runner
//!
//! Queries an indexed GraphRAG project by spawning the `graphrag` CLI one
//! subprocess per question and method. The CLI prefixes its answer with a
//! status marker (`SUCCESS: Local Search Response:` and friends); the runner
//! strips the marker and everything before it. Failures are folded into the
//! recorded answer text so a broken method never aborts the run.

use std::path::PathBuf;
use std::time::Instant;

use tokio::process::Command;
use tracing::{info, instrument, warn};

use crate::report::{EngineRun, elapsed_secs};

/// Search methods GraphRAG is queried with, in run order
pub const GRAPHRAG_METHODS: [&str; 2] = ["local", "global"];

/// Markers the CLI prints ahead of the actual answer
const ANSWER_MARKERS: [&str; 3] = [
    "SUCCESS: Local Search Response:",
    "SUCCESS: Global Search Response:",
    "Answer:",
];

/// Runner for the GraphRAG CLI over an indexed project root
pub struct GraphRagRunner {
    program: String,
    root: PathBuf,
}

impl GraphRagRunner {
    /// Create a runner for the project at `root`, invoking `graphrag`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            program: "graphrag".to_string(),
            root: root.into(),
        }
    }

    /// Override the CLI program (e.g. a venv path or `python -m` shim)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Run one question with one method, folding failures into the answer
    #[instrument(skip(self, question), level = "debug")]
    pub async fn query(&self, question: &str, method: &str) -> String {
        let output = Command::new(&self.program)
            .arg("query")
            .arg("--root")
            .arg(&self.root)
            .arg("--method")
            .arg(method)
            .arg(question)
            .output()
            .await;

        match output {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("graphrag CLI not found: {}", e);
                format!(
                    "ERROR: {} not installed (run: pip install graphrag)",
                    self.program
                )
            }
            Err(e) => {
                warn!("failed to spawn graphrag: {}", e);
                format!("ERROR: {}", e)
            }
            Ok(output) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let code = output.status.code().unwrap_or(-1);
                warn!(code, "graphrag exited with an error");
                format!(
                    "ERROR (exit {}): {}",
                    code,
                    stderr.trim().chars().take(200).collect::<String>()
                )
            }
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                strip_answer_marker(stdout.trim())
            }
        }
    }

    /// Run every question through every method, timing each subprocess
    pub async fn run(&self, questions: &[&str]) -> EngineRun {
        info!("Running {} questions through GraphRAG", questions.len());
        let mut results = EngineRun::new();

        for question in questions {
            for method in GRAPHRAG_METHODS {
                info!(method, question = question.chars().take(70).collect::<String>().as_str(), "querying GraphRAG");
                let start = Instant::now();
                let answer = self.query(question, method).await;
                let seconds = elapsed_secs(start);
                info!(method, seconds, answer_chars = answer.len(), "GraphRAG answered");
                results.record(question, method, answer, seconds);
            }
        }

        results
    }
}

/// Strip the CLI status marker and everything before it
fn strip_answer_marker(output: &str) -> String {
    for marker in ANSWER_MARKERS {
        if let Some(position) = output.find(marker) {
            return output[position + marker.len()..].trim().to_string();
        }
    }
    output.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_local_search_marker() {
        let output = "INFO: loading index\nSUCCESS: Local Search Response: The Monkey King wields a staff.";
        assert_eq!(
            strip_answer_marker(output),
            "The Monkey King wields a staff."
        );
    }

    #[test]
    fn test_strips_global_search_marker() {
        let output = "SUCCESS: Global Search Response:\n\nThe major themes are pilgrimage and redemption.";
        assert_eq!(
            strip_answer_marker(output),
            "The major themes are pilgrimage and redemption."
        );
    }

    #[test]
    fn test_output_without_marker_is_kept_whole() {
        let output = "plain answer with no preamble";
        assert_eq!(strip_answer_marker(output), output);
    }

    #[tokio::test]
    async fn test_missing_binary_is_recorded_not_fatal() {
        let runner = GraphRagRunner::new("/tmp/graphrag-project")
            .with_program("definitely-not-a-real-binary-ragdiff");
        let answer = runner.query("Who is Sun Wukong?", "local").await;
        assert!(answer.starts_with("ERROR:"), "{}", answer);
        assert!(answer.contains("not installed"), "{}", answer);
    }

    #[tokio::test]
    async fn test_run_produces_full_grid() {
        let runner = GraphRagRunner::new("/tmp/graphrag-project")
            .with_program("definitely-not-a-real-binary-ragdiff");
        let results = runner.run(&["q1", "q2"]).await;

        assert_eq!(results.len(), 2 * GRAPHRAG_METHODS.len());
        assert!(results.get("q2", "global").is_some());
    }
}
