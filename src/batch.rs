use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::subtitle::{CaptionEmitter, SubtitleFormat};
use crate::transcription::TranscriptionResult;

/// Name of the summary written next to batch outputs; never treated as input
pub const RESULTS_FILE_NAME: &str = "render_results.json";

/// Rendering result for a single transcription file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOutcome {
    pub input: PathBuf,
    pub outputs: Vec<PathBuf>,
    pub cue_count: usize,
    pub processing_time: Duration,
    pub status: RenderStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderStatus {
    Completed,
    Failed,
}

/// Overall batch rendering results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_time: Duration,
    pub results: Vec<RenderOutcome>,
}

/// Renders every transcription JSON in a directory tree with a bounded worker pool
pub struct BatchRenderer {
    emitter: Arc<CaptionEmitter>,
    formats: Arc<Vec<SubtitleFormat>>,
    worker_semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl BatchRenderer {
    pub fn new(config: &Config) -> Self {
        let max_workers = config.performance.max_workers.max(1);
        info!("🔧 Initializing BatchRenderer with {} workers", max_workers);

        Self {
            emitter: Arc::new(CaptionEmitter::new(config.subtitles.clone())),
            formats: Arc::new(config.output.formats.clone()),
            worker_semaphore: Arc::new(Semaphore::new(max_workers)),
            max_concurrent: max_workers,
        }
    }

    /// Find transcription JSON files under `input_dir`, sorted by path
    pub fn discover_inputs(input_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::new();

        for entry in WalkDir::new(input_dir).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to scan {}", input_dir.display()))?;
            let path = entry.path();
            let is_json = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            let is_summary = path.file_name().map(|name| name == RESULTS_FILE_NAME).unwrap_or(false);

            if entry.file_type().is_file() && is_json && !is_summary {
                inputs.push(path.to_path_buf());
            }
        }

        inputs.sort();
        Ok(inputs)
    }

    /// Render all transcription files in a directory
    pub async fn render_directory(&self, input_dir: PathBuf, output_dir: PathBuf) -> Result<BatchResult> {
        let start_time = Instant::now();

        info!("🚀 Starting batch rendering...");
        info!("📁 Input: {}", input_dir.display());
        info!("📂 Output: {}", output_dir.display());

        tokio::fs::create_dir_all(&output_dir).await?;

        let inputs = Self::discover_inputs(&input_dir)?;
        if inputs.is_empty() {
            warn!("No transcription files found in {}", input_dir.display());
            return Ok(BatchResult {
                total: 0,
                successful: 0,
                failed: 0,
                total_time: start_time.elapsed(),
                results: Vec::new(),
            });
        }

        info!("📝 Found {} transcription files", inputs.len());

        let mut results = self.render_parallel(inputs, &input_dir, &output_dir).await;
        results.sort_by(|a, b| a.input.cmp(&b.input));

        let successful = results
            .iter()
            .filter(|r| r.status == RenderStatus::Completed)
            .count();
        let batch_result = BatchResult {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            total_time: start_time.elapsed(),
            results,
        };

        let results_path = output_dir.join(RESULTS_FILE_NAME);
        let json_data = serde_json::to_string_pretty(&batch_result)?;
        tokio::fs::write(&results_path, json_data).await?;
        info!("💾 Results saved to: {}", results_path.display());

        Ok(batch_result)
    }

    /// Render multiple files in parallel with controlled concurrency
    async fn render_parallel(
        &self,
        inputs: Vec<PathBuf>,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Vec<RenderOutcome> {
        let (tx, mut rx) = mpsc::channel(self.max_concurrent);
        let total_files = inputs.len();

        for (index, input) in inputs.into_iter().enumerate() {
            let emitter = Arc::clone(&self.emitter);
            let formats = Arc::clone(&self.formats);
            let semaphore = Arc::clone(&self.worker_semaphore);
            let output_dir = mirrored_output_dir(input_dir, &input, output_dir);
            let tx = tx.clone();

            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                debug!("Rendering file {}/{}: {}", index + 1, total_files, input.display());

                let outcome = render_file(&emitter, &formats, &input, &output_dir).await;

                if let Err(e) = tx.send(outcome).await {
                    error!("Failed to send result: {}", e);
                }
            });
        }

        // Channel closes once every task has dropped its sender
        drop(tx);

        let mut results = Vec::with_capacity(total_files);
        while let Some(outcome) = rx.recv().await {
            results.push(outcome);
        }
        results
    }
}

/// Output directory for `input`, keeping its subfolder relative to `input_dir`
/// so inputs sharing a file stem never write to the same paths
pub fn mirrored_output_dir(input_dir: &Path, input: &Path, output_dir: &Path) -> PathBuf {
    match input.strip_prefix(input_dir).ok().and_then(Path::parent) {
        Some(relative) => output_dir.join(relative),
        None => output_dir.to_path_buf(),
    }
}

/// Render one transcription file into `output_dir`, named after the input's stem
pub async fn render_file(
    emitter: &CaptionEmitter,
    formats: &[SubtitleFormat],
    input: &Path,
    output_dir: &Path,
) -> RenderOutcome {
    let start_time = Instant::now();
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transcript".to_string());

    let rendered = async {
        let json = tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let transcription = TranscriptionResult::from_json(&json)?;
        let captions = emitter.build(&transcription)?;
        let outputs = captions
            .to_subtitles()
            .write_to_dir(output_dir, &stem, formats)
            .await?;
        Ok::<_, anyhow::Error>((captions.cues.len(), outputs))
    }
    .await;

    match rendered {
        Ok((cue_count, outputs)) => {
            info!("✅ {} -> {} cues", input.display(), cue_count);
            RenderOutcome {
                input: input.to_path_buf(),
                outputs,
                cue_count,
                processing_time: start_time.elapsed(),
                status: RenderStatus::Completed,
                error_message: None,
            }
        }
        Err(e) => {
            error!("❌ Failed to render {}: {:#}", input.display(), e);
            RenderOutcome {
                input: input.to_path_buf(),
                outputs: Vec::new(),
                cue_count: 0,
                processing_time: start_time.elapsed(),
                status: RenderStatus::Failed,
                error_message: Some(format!("{:#}", e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mirrored_output_dir() {
        let input_dir = Path::new("/data/in");
        let output_dir = Path::new("/data/out");

        assert_eq!(
            mirrored_output_dir(input_dir, Path::new("/data/in/a/ep.json"), output_dir),
            PathBuf::from("/data/out/a")
        );
        assert_eq!(
            mirrored_output_dir(input_dir, Path::new("/data/in/ep.json"), output_dir),
            PathBuf::from("/data/out")
        );
        assert_eq!(
            mirrored_output_dir(input_dir, Path::new("/elsewhere/ep.json"), output_dir),
            PathBuf::from("/data/out")
        );
    }

    #[test]
    fn test_discover_inputs_skips_non_json_and_summary() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();

        std::fs::write(temp_dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(nested.join("a.JSON"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();
        std::fs::write(temp_dir.path().join(RESULTS_FILE_NAME), "{}").unwrap();

        let inputs = BatchRenderer::discover_inputs(temp_dir.path()).unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs.iter().any(|p| p.ends_with("b.json")));
        assert!(inputs.iter().any(|p| p.ends_with("nested/a.JSON")));
    }

    #[tokio::test]
    async fn test_render_file_reports_failure() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.json");
        tokio::fs::write(&input, r#"{"segments": []}"#).await.unwrap();

        let outcome = render_file(
            &CaptionEmitter::default(),
            &SubtitleFormat::ALL,
            &input,
            temp_dir.path(),
        )
        .await;

        assert_eq!(outcome.status, RenderStatus::Failed);
        assert!(outcome.error_message.unwrap().contains("text"));
        assert!(outcome.outputs.is_empty());
    }
}
