use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::{CaptionStyle, Config};
use crate::ass_document::write_document;
use crate::captions::CaptionBuilder;
use crate::errors::TranscriptionError;
use crate::file_utils::{FileManager, AUDIO_EXTENSIONS};
use crate::timecode::AssTime;
use crate::timeline;
use crate::transcription::{Transcriber, WhisperCliTranscriber};

// @module: Application controller for caption generation

/// Outcome of one caption generation
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output_path: PathBuf,
    /// Raw transcript dump, when enabled
    pub transcript_path: Option<PathBuf>,
    pub word_count: usize,
    pub event_count: usize,
    pub overflow_count: usize,
    /// End of the last caption
    pub caption_end: AssTime,
}

/// Totals for folder mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderReport {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Transcriber built from the configured speech-to-text command
    pub fn default_transcriber(&self) -> WhisperCliTranscriber {
        WhisperCliTranscriber::new(self.config.transcription.clone())
    }

    fn builder(&self, style: &CaptionStyle) -> CaptionBuilder {
        CaptionBuilder::new(style)
            .with_delay(self.config.generation.delay_secs)
            .with_overflow_policy(self.config.generation.overflow_policy)
    }

    /// Transcribe `audio_path` and write the caption document to `output_path`.
    ///
    /// `style` overrides the configured caption style for this job. Nothing is
    /// written unless every step succeeds; an existing output stays untouched
    /// on failure.
    pub async fn generate(
        &self,
        audio_path: &Path,
        output_path: &Path,
        style: Option<&CaptionStyle>,
        transcriber: &dyn Transcriber,
    ) -> Result<GenerationReport> {
        if !FileManager::file_exists(audio_path) {
            error!("Audio file not found: {:?}", audio_path);
            return Err(TranscriptionError::MissingAudio(audio_path.to_path_buf()).into());
        }

        let style = style.unwrap_or(&self.config.captions);
        style.validate()?;

        let transcript = transcriber
            .transcribe(audio_path)
            .await
            .with_context(|| format!("{} failed on {:?}", transcriber.name(), audio_path))?;

        let track = self
            .builder(style)
            .build(&transcript)
            .with_context(|| format!("Failed to build captions for {:?}", audio_path))?;

        if track.overflow_count > 0 {
            warn!(
                "{} word(s) exceed the {}-character line limit",
                track.overflow_count, style.max_line_length
            );
        }

        // Captions are written last; a failed dump must not replace them
        let transcript_path = if self.config.generation.dump_transcript {
            let dump_path = FileManager::companion_path(output_path, "json");
            transcript
                .save(&dump_path)
                .with_context(|| format!("Failed to write transcript to {:?}", dump_path))?;
            info!("Transcript json saved to {:?}", dump_path);
            Some(dump_path)
        } else {
            None
        };

        let document = write_document(style, &track.events);
        FileManager::write_atomic(output_path, &document)
            .with_context(|| format!("Failed to write captions to {:?}", output_path))?;

        let caption_end = track.events.iter().map(|e| e.end).max().unwrap_or(AssTime::ZERO);
        info!(
            "Subtitles saved to {:?} ({} captions, ends at {})",
            output_path,
            track.events.len(),
            caption_end
        );

        Ok(GenerationReport {
            output_path: output_path.to_path_buf(),
            transcript_path,
            word_count: transcript.word_count(),
            event_count: track.events.len(),
            overflow_count: track.overflow_count,
            caption_end,
        })
    }

    /// Generate a sibling `.ass` for every audio file under `input_dir`
    pub async fn generate_folder(
        &self,
        input_dir: &Path,
        force_overwrite: bool,
        style: Option<&CaptionStyle>,
        transcriber: &dyn Transcriber,
    ) -> Result<FolderReport> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let audio_files = FileManager::find_files(input_dir, AUDIO_EXTENSIONS)?;
        let mut report = FolderReport::default();

        if audio_files.is_empty() {
            warn!("No audio files found in {:?}", input_dir);
            return Ok(report);
        }

        let progress_bar = ProgressBar::new(audio_files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("=> "));

        for audio_path in &audio_files {
            let output_path = audio_path.with_extension("ass");
            progress_bar.set_message(
                audio_path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
            );

            if output_path.exists() && !force_overwrite {
                warn!("Skipping {:?}, captions already exist (use -f to force overwrite)", audio_path);
                report.skipped += 1;
            } else {
                match self.generate(audio_path, &output_path, style, transcriber).await {
                    Ok(_) => report.generated += 1,
                    Err(e) => {
                        error!("Error processing {:?}: {:#}", audio_path, e);
                        report.failed += 1;
                    }
                }
            }

            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();
        info!(
            "Finished {:?}: {} generated, {} skipped, {} failed",
            input_dir, report.generated, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Shift a caption file by `delta_seconds`
    pub fn shift(&self, input: &Path, output: &Path, delta_seconds: f64) -> Result<usize> {
        timeline::shift_file(input, output, delta_seconds)
            .with_context(|| format!("Failed to shift {:?}", input))
    }

    /// Join two caption files, the second starting where the first ends
    pub fn concatenate(&self, first: &Path, second: &Path, output: &Path, length_first: Option<f64>) -> Result<usize> {
        timeline::concatenate_files(first, second, output, length_first)
            .with_context(|| format!("Failed to concatenate {:?} and {:?}", first, second))
    }
}
