use std::fmt;
use std::path::Path;

use log::debug;

use crate::app_config::CaptionStyle;
use crate::captions::CaptionEvent;
use crate::errors::{AppError, CaptionError};
use crate::timecode::{parse_timestamp, AssTime};

// @module: ASS document writing and parsing

pub const SCRIPT_TITLE: &str = "Generated Subtitles with Animation";
pub const EVENTS_HEADER: &str = "[Events]";
pub const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
pub const EVENT_FORMAT: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

const DIALOGUE_PREFIX: &str = "Dialogue:";
// Layer(with prefix), Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
const DIALOGUE_FIELD_COUNT: usize = 10;
const START_FIELD: usize = 1;
const END_FIELD: usize = 2;
const TEXT_FIELD: usize = 9;

/// Single-style generated document. `Display` yields the file content.
pub struct CaptionDocument<'a> {
    pub style: &'a CaptionStyle,
    pub events: &'a [CaptionEvent],
}

impl fmt::Display for CaptionDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = self.style;

        writeln!(f, "[Script Info]")?;
        writeln!(f, "Title: {}", SCRIPT_TITLE)?;
        writeln!(f, "ScriptType: v4.00+")?;
        writeln!(f, "PlayResX: {}", s.playres_x)?;
        writeln!(f, "PlayResY: {}", s.playres_y)?;
        writeln!(f, "Timer: 100.0000")?;
        writeln!(f)?;

        writeln!(f, "[V4+ Styles]")?;
        writeln!(f, "{}", STYLE_FORMAT)?;
        writeln!(
            f,
            "Style: Default,{},{},{},{},{},{},{},{},{},{},100,100,0,0,{},{},{},{},0,0,0,1",
            s.font_name,
            s.font_size,
            s.primary_colour,
            s.secondary_colour,
            s.outline_colour,
            s.back_colour,
            s.bold,
            s.italic,
            s.underline,
            s.strikeout,
            s.border_style,
            s.outline,
            s.shadow,
            s.alignment
        )?;
        writeln!(f)?;

        writeln!(f, "{}", EVENTS_HEADER)?;
        writeln!(f, "{}", EVENT_FORMAT)?;
        for event in self.events {
            writeln!(f, "Dialogue: 0,{},{},Default,,0,0,0,,{}", event.start, event.end, event.text)?;
        }
        Ok(())
    }
}

/// Serialize generated events into a complete document
pub fn write_document(style: &CaptionStyle, events: &[CaptionEvent]) -> String {
    CaptionDocument { style, events }.to_string()
}

/// A dialogue line read from an existing document
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    pub start: AssTime,
    pub end: AssTime,
    pub text: String,
    /// The full original line; only its time fields are ever rewritten
    pub raw_line: String,
}

impl SubtitleEntry {
    /// Parse a `Dialogue:` line. `line_number` is only used for error reporting.
    pub fn from_dialogue_line(line: &str, line_number: usize) -> Result<Self, CaptionError> {
        let raw_line = line.trim();
        let fields: Vec<&str> = raw_line.splitn(DIALOGUE_FIELD_COUNT, ',').collect();
        if fields.len() < DIALOGUE_FIELD_COUNT {
            return Err(CaptionError::Parse {
                line_number,
                line: raw_line.to_string(),
            });
        }

        Ok(Self {
            start: parse_timestamp(fields[START_FIELD])?,
            end: parse_timestamp(fields[END_FIELD])?,
            text: fields[TEXT_FIELD].trim().to_string(),
            raw_line: raw_line.to_string(),
        })
    }

    /// Copy with new times. Unchanged fields keep their original spelling;
    /// a hand-built `raw_line` without time fields is left as is.
    pub fn with_times(&self, start: AssTime, end: AssTime) -> Self {
        let mut fields: Vec<String> = self
            .raw_line
            .splitn(DIALOGUE_FIELD_COUNT, ',')
            .map(str::to_string)
            .collect();

        if start != self.start {
            if let Some(field) = fields.get_mut(START_FIELD) {
                *field = start.to_string();
            }
        }
        if end != self.end {
            if let Some(field) = fields.get_mut(END_FIELD) {
                *field = end.to_string();
            }
        }

        Self {
            start,
            end,
            text: self.text.clone(),
            raw_line: fields.join(","),
        }
    }
}

/// A parsed document: verbatim preamble, dialogue entries, verbatim trailer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssDocument {
    /// Everything before the `[Events]` header
    pub preamble: String,
    pub entries: Vec<SubtitleEntry>,
    /// Sections following `[Events]`, if any
    pub trailer: String,
}

enum Section {
    Preamble,
    Events,
}

impl AssDocument {
    pub fn parse(content: &str) -> Result<Self, CaptionError> {
        let mut document = AssDocument::default();
        let mut section = Section::Preamble;
        let mut offset = 0;

        for (index, line) in content.split_inclusive('\n').enumerate() {
            let line_start = offset;
            offset += line.len();
            let trimmed = line.trim();

            match section {
                Section::Preamble => {
                    if trimmed.starts_with(EVENTS_HEADER) {
                        document.preamble = content[..line_start].to_string();
                        section = Section::Events;
                    }
                }
                Section::Events => {
                    if trimmed.starts_with('[') && trimmed.ends_with(']') {
                        document.trailer = content[line_start..].to_string();
                        break;
                    }
                    if trimmed.starts_with(DIALOGUE_PREFIX) {
                        document.entries.push(SubtitleEntry::from_dialogue_line(trimmed, index + 1)?);
                    }
                }
            }
        }

        if matches!(section, Section::Preamble) {
            debug!("No {} section found; treating the whole document as preamble", EVENTS_HEADER);
            document.preamble = content.to_string();
        }

        Ok(document)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| AppError::File(format!("Failed to read {:?}: {}", path.as_ref(), e)))?;
        Ok(Self::parse(&content)?)
    }

    /// End of the latest entry, zero for an empty document
    pub fn timeline_end(&self) -> AssTime {
        self.entries.iter().map(|e| e.end).max().unwrap_or(AssTime::ZERO)
    }

    pub fn to_ass_string(&self) -> String {
        let mut out = String::with_capacity(
            self.preamble.len() + self.trailer.len() + self.entries.iter().map(|e| e.raw_line.len() + 1).sum::<usize>() + 128,
        );
        out.push_str(&self.preamble);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(EVENTS_HEADER);
        out.push('\n');
        out.push_str(EVENT_FORMAT);
        out.push('\n');
        for entry in &self.entries {
            out.push_str(&entry.raw_line);
            out.push('\n');
        }
        if !self.trailer.is_empty() {
            out.push('\n');
            out.push_str(&self.trailer);
        }
        out
    }
}

impl fmt::Display for AssDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_ass_string())
    }
}
