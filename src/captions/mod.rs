/*!
 * Caption generation from word-level transcripts.
 *
 * Words are packed into blocks (`block`), each finished block is rendered
 * with per-word colour animation (`animation`) and emitted as a
 * `CaptionEvent`. Emission is pull-based: `CaptionEvents` yields blocks in
 * chronological order as the word stream is consumed.
 */

pub mod animation;
pub mod block;

use log::{debug, warn};
use std::iter::FusedIterator;

use crate::app_config::{CaptionStyle, OverflowPolicy};
use crate::errors::CaptionError;
use crate::timecode::AssTime;
use crate::transcript::{TimedWord, Transcript};

pub use animation::KaraokeEncoder;
pub use block::{AddOutcome, SubtitleBlock};

/// One finished caption: display window plus animated text
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEvent {
    pub start: AssTime,
    pub end: AssTime,
    pub text: String,
}

/// All events generated for one transcript
#[derive(Debug, Clone, Default)]
pub struct CaptionTrack {
    pub events: Vec<CaptionEvent>,
    /// Words longer than `max_line_length` that were kept anyway
    pub overflow_count: usize,
}

/// Configured entry point for caption generation
#[derive(Debug, Clone)]
pub struct CaptionBuilder {
    max_line_count: usize,
    max_line_length: usize,
    delay: f64,
    overflow_policy: OverflowPolicy,
    encoder: KaraokeEncoder,
}

impl CaptionBuilder {
    pub fn new(style: &CaptionStyle) -> Self {
        Self {
            max_line_count: style.max_line_count,
            max_line_length: style.max_line_length,
            delay: 0.0,
            overflow_policy: OverflowPolicy::default(),
            encoder: KaraokeEncoder::new(style),
        }
    }

    pub fn with_delay(mut self, delay_secs: f64) -> Self {
        self.delay = delay_secs;
        self
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Lazily pack `words` into caption events
    pub fn events<'w, I>(&self, words: I) -> CaptionEvents<'w, I::IntoIter>
    where
        I: IntoIterator<Item = &'w TimedWord>,
    {
        CaptionEvents {
            words: words.into_iter(),
            pending: None,
            block: self.fresh_block(),
            settings: self.clone(),
            overflow_count: 0,
            done: false,
        }
    }

    /// Generate every event for a transcript, skipping words with invalid timing
    pub fn build(&self, transcript: &Transcript) -> Result<CaptionTrack, CaptionError> {
        let words = transcript.valid_words();
        let mut events = self.events(words);
        let collected = events.by_ref().collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Packed {} words into {} caption blocks ({} overflowing)",
            transcript.word_count(),
            collected.len(),
            events.overflow_count()
        );

        Ok(CaptionTrack {
            events: collected,
            overflow_count: events.overflow_count(),
        })
    }

    fn fresh_block(&self) -> SubtitleBlock {
        SubtitleBlock::new(self.max_line_count, self.max_line_length).with_delay(self.delay)
    }
}

/// Iterator over finished caption blocks. Fused after the first error.
pub struct CaptionEvents<'w, I>
where
    I: Iterator<Item = &'w TimedWord>,
{
    words: I,
    pending: Option<&'w TimedWord>,
    block: SubtitleBlock,
    settings: CaptionBuilder,
    overflow_count: usize,
    done: bool,
}

impl<'w, I> CaptionEvents<'w, I>
where
    I: Iterator<Item = &'w TimedWord>,
{
    /// Overflowing words seen so far
    pub fn overflow_count(&self) -> usize {
        self.overflow_count
    }

    fn take_block(&mut self) -> SubtitleBlock {
        let fresh = self.settings.fresh_block();
        std::mem::replace(&mut self.block, fresh)
    }
}

impl<'w, I> Iterator for CaptionEvents<'w, I>
where
    I: Iterator<Item = &'w TimedWord>,
{
    type Item = Result<CaptionEvent, CaptionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let Some(word) = self.pending.take().or_else(|| self.words.next()) else {
                self.done = true;
                let last = self.take_block();
                return (!last.is_empty()).then(|| Ok(last.finalize(&self.settings.encoder)));
            };

            if self.block.is_full_for(word) {
                self.pending = Some(word);
                let finished = self.take_block();
                return Some(Ok(finished.finalize(&self.settings.encoder)));
            }

            let outcome = self.block.add_word(word);
            debug_assert!(outcome.accepted);

            if outcome.overflowed {
                match self.settings.overflow_policy {
                    OverflowPolicy::Accept => {
                        self.overflow_count += 1;
                        warn!(
                            "Word '{}' ({} chars) exceeds max line length {}; keeping it on its own line",
                            word.word.trim(),
                            word.char_len(),
                            self.settings.max_line_length
                        );
                    }
                    OverflowPolicy::Reject => {
                        self.done = true;
                        return Some(Err(CaptionError::LineOverflow {
                            word: word.word.clone(),
                            length: word.char_len(),
                            max_line_length: self.settings.max_line_length,
                        }));
                    }
                }
            }
        }
    }
}

impl<'w, I> FusedIterator for CaptionEvents<'w, I> where I: Iterator<Item = &'w TimedWord> {}
