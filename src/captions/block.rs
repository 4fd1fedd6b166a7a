/*!
 * Line/block accumulator.
 *
 * A block is one caption card: up to `max_line_count` lines sharing a display
 * window. Words are packed greedily; line length is the plain sum of word
 * lengths (words carry their own leading spaces). Hyphen-prefixed
 * continuation words never wrap.
 */

use crate::timecode::AssTime;
use crate::transcript::TimedWord;

use super::CaptionEvent;
use super::animation::KaraokeEncoder;

/// Result of offering a word to a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// The word was placed; `false` means the block is full and was not touched
    pub accepted: bool,
    /// Line the word landed on (or the current line when refused)
    pub line_index: usize,
    /// The word alone is longer than `max_line_length` and was placed anyway
    pub overflowed: bool,
}

#[derive(Debug, Clone, Default)]
struct LineBuffer {
    words: Vec<TimedWord>,
    char_len: usize,
}

impl LineBuffer {
    fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Mutable accumulator for a single caption block
#[derive(Debug, Clone)]
pub struct SubtitleBlock {
    max_line_length: usize,
    lines: Box<[LineBuffer]>,
    current_line: usize,
    block_start: Option<f64>,
    block_end: f64,
    delay: f64,
}

impl SubtitleBlock {
    pub fn new(max_line_count: usize, max_line_length: usize) -> Self {
        Self {
            max_line_length,
            lines: vec![LineBuffer::default(); max_line_count.max(1)].into_boxed_slice(),
            current_line: 0,
            block_start: None,
            block_end: 0.0,
            delay: 0.0,
        }
    }

    /// Offset applied to the block window when it is finalized
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    fn would_exceed(&self, word: &TimedWord) -> bool {
        !word.is_continuation()
            && self.lines[self.current_line].char_len + word.char_len() > self.max_line_length
    }

    /// Whether `word` needs a fresh block. An empty block is never full:
    /// a word too long for any line still goes on the first one.
    pub fn is_full_for(&self, word: &TimedWord) -> bool {
        self.would_exceed(word)
            && !self.lines[self.current_line].is_empty()
            && self.current_line + 1 >= self.lines.len()
    }

    pub fn add_word(&mut self, word: &TimedWord) -> AddOutcome {
        let mut target = self.current_line;

        if self.would_exceed(word) && !self.lines[target].is_empty() {
            if target + 1 >= self.lines.len() {
                return AddOutcome {
                    accepted: false,
                    line_index: target,
                    overflowed: false,
                };
            }
            target += 1;
        }

        let overflowed = !word.is_continuation() && word.char_len() > self.max_line_length;

        self.block_start.get_or_insert(word.start);
        self.block_end = word.end;
        self.current_line = target;

        let line = &mut self.lines[target];
        line.char_len += word.char_len();
        line.words.push(word.clone());

        AddOutcome {
            accepted: true,
            line_index: target,
            overflowed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.block_start.is_none()
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn block_start(&self) -> f64 {
        self.block_start.unwrap_or(0.0)
    }

    pub fn block_end(&self) -> f64 {
        self.block_end
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Words of every line slot, in order (trailing slots may be empty)
    pub fn lines(&self) -> impl Iterator<Item = &[TimedWord]> {
        self.lines.iter().map(|line| line.words.as_slice())
    }

    /// Character length of each line slot
    pub fn line_lengths(&self) -> Vec<usize> {
        self.lines.iter().map(|line| line.char_len).collect()
    }

    /// Render the block into its display window and animated text
    pub fn finalize(self, encoder: &KaraokeEncoder) -> CaptionEvent {
        let text = encoder.render_block(&self);
        CaptionEvent {
            start: AssTime::from_seconds(self.block_start() + self.delay),
            end: AssTime::from_seconds(self.block_end + self.delay),
            text,
        }
    }
}
