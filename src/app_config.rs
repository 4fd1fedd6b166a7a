use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::errors::CaptionError;
use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.

// @const: &HAABBGGRR colour literal
static COLOUR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&H[0-9A-Fa-f]{8}$").unwrap()
});

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Speech-to-text settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Default caption style, overridable per job
    #[serde(default)]
    pub captions: CaptionStyle,

    /// Caption generation behaviour
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Style of the generated captions.
///
/// Colours are `&HAABBGGRR` (alpha first, `00` opaque, `FF` transparent).
/// The four text flags use the document convention `-1` = on, `0` = off.
/// Alignment is a numeric-keypad position (1 bottom-left .. 9 top-right).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CaptionStyle {
    pub max_line_count: usize,
    pub max_line_length: usize,
    pub font_name: String,
    pub font_size: u32,
    pub primary_colour: String,
    pub secondary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub bold: i32,
    pub italic: i32,
    pub underline: i32,
    pub strikeout: i32,
    pub outline: u32,
    pub border_style: u32,
    pub shadow: u32,
    pub alignment: u8,
    pub playres_x: u32,
    pub playres_y: u32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            max_line_count: 1,
            max_line_length: 20,
            font_name: "Arial".to_string(),
            font_size: 50,
            primary_colour: "&H00FFFFFF".to_string(),
            secondary_colour: "&H00000000".to_string(),
            outline_colour: "&H00000000".to_string(),
            back_colour: "&H00000000".to_string(),
            bold: 0,
            italic: 0,
            underline: 0,
            strikeout: 0,
            outline: 1,
            border_style: 1,
            shadow: 0,
            alignment: 5,
            playres_x: 1080,
            playres_y: 1920,
        }
    }
}

impl CaptionStyle {
    /// Load a per-job style from JSON; absent keys take the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(&path)?;
        let style: CaptionStyle = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse caption style: {:?}", path.as_ref()))?;
        style.validate()?;
        Ok(style)
    }

    /// Reject values the document format cannot express
    pub fn validate(&self) -> Result<(), CaptionError> {
        let invalid = |msg: String| Err(CaptionError::InvalidStyle(msg));

        if self.max_line_count == 0 {
            return invalid("max_line_count must be at least 1".to_string());
        }
        if self.max_line_length == 0 {
            return invalid("max_line_length must be at least 1".to_string());
        }
        if self.font_name.trim().is_empty() || self.font_name.contains(',') {
            return invalid(format!("font_name '{}' must be non-empty and comma-free", self.font_name));
        }

        for (name, colour) in [
            ("primary_colour", &self.primary_colour),
            ("secondary_colour", &self.secondary_colour),
            ("outline_colour", &self.outline_colour),
            ("back_colour", &self.back_colour),
        ] {
            if !COLOUR_REGEX.is_match(colour) {
                return invalid(format!("{} '{}' is not in &HAABBGGRR form", name, colour));
            }
        }

        for (name, flag) in [
            ("bold", self.bold),
            ("italic", self.italic),
            ("underline", self.underline),
            ("strikeout", self.strikeout),
        ] {
            if flag != 0 && flag != -1 {
                return invalid(format!("{} must be -1 or 0, got {}", name, flag));
            }
        }

        if !(1..=9).contains(&self.alignment) {
            return invalid(format!("alignment must be 1-9, got {}", self.alignment));
        }
        if self.playres_x == 0 || self.playres_y == 0 {
            return invalid("playres_x and playres_y must be positive".to_string());
        }

        Ok(())
    }
}

/// Speech-to-text engine settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// Executable of the speech-to-text CLI
    #[serde(default = "default_transcription_command")]
    pub command: String,

    /// Model size passed to the engine
    #[serde(default = "default_transcription_model")]
    pub model: String,

    /// Spoken language (ISO 639)
    #[serde(default = "default_transcription_language")]
    pub language: String,

    /// Upper bound for a single transcription run
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            command: default_transcription_command(),
            model: default_transcription_model(),
            language: default_transcription_language(),
            timeout_secs: default_transcription_timeout_secs(),
        }
    }
}

/// What to do with a word longer than `max_line_length`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Keep the word on its own line and count the overflow
    #[default]
    Accept,
    /// Abort generation with a line overflow error
    Reject,
}

/// Caption generation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Uniform offset applied to every caption, in seconds
    #[serde(default)]
    pub delay_secs: f64,

    #[serde(default)]
    pub overflow_policy: OverflowPolicy,

    /// Write the raw transcript JSON next to the caption file
    #[serde(default = "default_true")]
    pub dump_transcript: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            delay_secs: 0.0,
            overflow_policy: OverflowPolicy::default(),
            dump_transcript: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_transcription_command() -> String {
    "whisper".to_string()
}

fn default_transcription_model() -> String {
    "tiny".to_string()
}

fn default_transcription_language() -> String {
    "en".to_string()
}

fn default_transcription_timeout_secs() -> u64 {
    1800
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(&path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    /// Save the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        FileManager::write_atomic(path, &json)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.transcription.language)?;

        if self.transcription.command.trim().is_empty() {
            return Err(anyhow!("Transcription command must not be empty"));
        }
        if self.transcription.timeout_secs == 0 {
            return Err(anyhow!("Transcription timeout must be positive"));
        }
        if !self.generation.delay_secs.is_finite() {
            return Err(anyhow!("Caption delay must be a finite number of seconds"));
        }

        self.captions.validate()?;
        Ok(())
    }
}
