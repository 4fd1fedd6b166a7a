/*!
 * # capsync - word-synchronized karaoke captions
 *
 * A Rust library for turning word-level transcripts into animated ASS
 * caption documents, and for editing the timelines of existing ones.
 *
 * ## Features
 *
 * - Pack timed words into caption blocks bounded by line count and length
 * - Per-word colour highlighting timed to speech
 * - Bit-exact ASS document generation (`H:MM:SS.cc` timestamps)
 * - Parse existing documents, shift them, or splice two of them together
 *   while keeping every non-time field verbatim
 * - Transcription through the whisper CLI, or replay of a saved transcript
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: centisecond timestamps, formatting and parsing
 * - `transcript`: timed words and the transcript JSON model
 * - `app_config`: configuration and the caption style
 * - `captions`: caption generation:
 *   - `captions::block`: line/block accumulator
 *   - `captions::animation`: per-word colour animation
 * - `ass_document`: document writer and parser
 * - `timeline`: shift and concatenate transforms
 * - `transcription`: speech-to-text collaborators
 * - `app_controller`: generation workflow
 * - `file_utils`: file system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod ass_document;
pub mod captions;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod timecode;
pub mod timeline;
pub mod transcript;
pub mod transcription;

// Re-export main types for easier usage
pub use app_config::{CaptionStyle, Config, OverflowPolicy};
pub use ass_document::{write_document, AssDocument, SubtitleEntry};
pub use captions::{CaptionBuilder, CaptionEvent, CaptionTrack};
pub use errors::{AppError, CaptionError, TranscriptionError};
pub use timecode::{format_timestamp, parse_timestamp, AssTime};
pub use timeline::{concatenate, concatenate_files, shift, shift_file};
pub use transcript::{TimedWord, Transcript, TranscriptSegment};
