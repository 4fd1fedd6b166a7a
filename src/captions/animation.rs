//! Karaoke-style colour animation.
//!
//! Every word gets its own override block: primary colour, an instantaneous
//! switch to the secondary colour when the word is spoken, and a switch back
//! when it ends. Offsets are milliseconds relative to the block start.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::CaptionStyle;
use crate::transcript::TimedWord;

use super::block::SubtitleBlock;

/// Hard line break inside a dialogue text
pub const LINE_BREAK: &str = "\\N";

/// Floor for a word's start offset; a zero offset makes a degenerate `\t` tag
const MIN_WORD_OFFSET_SECS: f64 = 0.001;

static OVERRIDE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

/// `&HAABBGGRR` style colour to a `\1c&HBBGGRR&` override tag
pub fn colour_override(colour: &str) -> String {
    let hex = colour.trim().trim_start_matches("&H").trim_start_matches("&h").trim_end_matches('&');
    let skip = hex.chars().count().saturating_sub(6);
    let bgr: String = hex.chars().skip(skip).collect();
    format!("\\1c&H{}&", bgr.to_ascii_uppercase())
}

/// Remove override blocks and turn line breaks into newlines
pub fn strip_override_tags(text: &str) -> String {
    OVERRIDE_BLOCK_REGEX.replace_all(text, "").replace(LINE_BREAK, "\n")
}

fn to_millis(seconds: f64) -> u64 {
    (seconds * 1000.0 + 1e-6).floor() as u64
}

/// Renders blocks into animated dialogue text
#[derive(Debug, Clone)]
pub struct KaraokeEncoder {
    base_tag: String,
    highlight_tag: String,
}

impl KaraokeEncoder {
    pub fn new(style: &CaptionStyle) -> Self {
        Self {
            base_tag: colour_override(&style.primary_colour),
            highlight_tag: colour_override(&style.secondary_colour),
        }
    }

    /// Millisecond offsets of a word's highlight window within its block
    pub fn word_offsets(word: &TimedWord, block_start: f64, delay: f64) -> (u64, u64) {
        let delayed_start = block_start + delay;
        let rel_start = (word.start + delay - delayed_start).max(MIN_WORD_OFFSET_SECS);
        let rel_end = (word.end + delay - delayed_start).max(rel_start);
        (to_millis(rel_start), to_millis(rel_end))
    }

    pub fn word_span(&self, word: &TimedWord, block_start: f64, delay: f64) -> String {
        let (on, off) = Self::word_offsets(word, block_start, delay);
        format!(
            "{{{base}\\t({on},{on},{highlight})\\t({off},{off},{base})}}{text}",
            base = self.base_tag,
            highlight = self.highlight_tag,
            on = on,
            off = off,
            text = word.word,
        )
    }

    pub fn render_line(&self, words: &[TimedWord], block_start: f64, delay: f64) -> String {
        words
            .iter()
            .map(|w| self.word_span(w, block_start, delay))
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    pub fn render_block(&self, block: &SubtitleBlock) -> String {
        let mut lines: Vec<String> = block
            .lines()
            .map(|words| self.render_line(words, block.block_start(), block.delay()))
            .collect();

        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        lines.join(LINE_BREAK)
    }
}
