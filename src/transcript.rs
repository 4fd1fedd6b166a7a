use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::file_utils::FileManager;

// @module: Word-level transcript model

/// A single transcribed word with its speech interval in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl TimedWord {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }

    /// `end >= start >= 0`, both finite
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.end >= self.start
    }

    /// Number of characters counted against the line length
    pub fn char_len(&self) -> usize {
        self.word.chars().count()
    }

    /// A hyphen-prefixed word joins the previous one and never wraps
    pub fn is_continuation(&self) -> bool {
        self.word.trim_start().starts_with('-')
    }
}

/// One segment as emitted by the speech-to-text engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<TimedWord>,
}

/// Full transcription result, in the JSON layout the engine writes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Build a single-segment transcript from a word list
    pub fn from_words(words: Vec<TimedWord>) -> Self {
        let text = words.iter().map(|w| w.word.as_str()).collect::<String>();
        let start = words.first().map_or(0.0, |w| w.start);
        let end = words.last().map_or(0.0, |w| w.end);
        Self {
            text: text.clone(),
            language: None,
            segments: vec![TranscriptSegment { start, end, text, words }],
        }
    }

    /// Flat, ordered word stream across all segments
    pub fn words(&self) -> impl Iterator<Item = &TimedWord> {
        self.segments.iter().flat_map(|segment| segment.words.iter())
    }

    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }

    /// Words that satisfy the timing invariant; the rest are logged and skipped
    pub fn valid_words(&self) -> Vec<&TimedWord> {
        self.words()
            .filter(|w| {
                if w.is_valid() {
                    true
                } else {
                    warn!("Skipping word '{}' with invalid timing {}..{}", w.word, w.start, w.end);
                    false
                }
            })
            .collect()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse transcript JSON")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(&path)?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid transcript file: {:?}", path.as_ref()))
    }

    /// Persist as pretty JSON, atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize transcript")?;
        FileManager::write_atomic(path, &json)
    }
}
