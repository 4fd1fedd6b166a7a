/*!
 * Speech-to-text boundary.
 *
 * The transcription engine is an external collaborator: it takes an audio
 * file and yields segments of timed words. `WhisperCliTranscriber` drives the
 * `whisper` command-line tool; `TranscriptFileSource` replays a transcript
 * JSON dumped by an earlier run.
 */

use async_trait::async_trait;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::TranscriptionConfig;
use crate::errors::TranscriptionError;
use crate::language_utils;
use crate::transcript::Transcript;

/// Anything that can turn an audio file into a word-level transcript
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, TranscriptionError>;
}

/// Runs the whisper CLI with word timestamps and reads back its JSON output
#[derive(Debug, Clone)]
pub struct WhisperCliTranscriber {
    config: TranscriptionConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self { config }
    }

    /// Arguments for one run, output going to `output_dir`
    pub fn command_args(&self, audio_path: &Path, output_dir: &Path) -> Vec<String> {
        let language = language_utils::normalize_to_part1_or_part2t(&self.config.language)
            .unwrap_or_else(|_| self.config.language.clone());

        vec![
            audio_path.to_string_lossy().to_string(),
            "--model".to_string(),
            self.config.model.clone(),
            "--language".to_string(),
            language,
            "--word_timestamps".to_string(),
            "True".to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
        ]
    }

    /// Where the CLI writes the transcript for `audio_path`
    pub fn output_path(audio_path: &Path, output_dir: &Path) -> PathBuf {
        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "transcript".to_string());
        output_dir.join(format!("{}.json", stem))
    }

    /// Keep the tail of stderr; progress output is noise
    fn summarize_stderr(stderr: &str) -> String {
        let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return "no error output".to_string();
        }
        lines[lines.len().saturating_sub(5)..].join("\n")
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    fn name(&self) -> &str {
        &self.config.command
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, TranscriptionError> {
        if !audio_path.is_file() {
            return Err(TranscriptionError::MissingAudio(audio_path.to_path_buf()));
        }

        let output_dir = tempfile::tempdir()
            .map_err(|e| TranscriptionError::CommandFailed(format!("Failed to create output directory: {}", e)))?;
        let args = self.command_args(audio_path, output_dir.path());

        info!("Transcribing {:?} with {} (model {})", audio_path, self.config.command, self.config.model);
        debug!("{} {}", self.config.command, args.join(" "));

        let run = Command::new(&self.config.command)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::select! {
            result = run => {
                result.map_err(|e| TranscriptionError::CommandFailed(
                    format!("Failed to execute {}: {}", self.config.command, e)
                ))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(TranscriptionError::Timeout(self.config.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let summary = Self::summarize_stderr(&stderr);
            error!("Transcription failed: {}", summary);
            return Err(TranscriptionError::CommandFailed(summary));
        }

        let json_path = Self::output_path(audio_path, output_dir.path());
        let content = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            TranscriptionError::InvalidTranscript(format!("{:?}: {}", json_path, e))
        })?;

        Transcript::from_json(&content)
            .map_err(|e| TranscriptionError::InvalidTranscript(format!("{:#}", e)))
    }
}

/// Replays a transcript JSON instead of running an engine
#[derive(Debug, Clone)]
pub struct TranscriptFileSource {
    path: PathBuf,
}

impl TranscriptFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Transcriber for TranscriptFileSource {
    fn name(&self) -> &str {
        "transcript-file"
    }

    async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript, TranscriptionError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            TranscriptionError::InvalidTranscript(format!("{:?}: {}", self.path, e))
        })?;
        Transcript::from_json(&content)
            .map_err(|e| TranscriptionError::InvalidTranscript(format!("{:#}", e)))
    }
}
