/*!
 * Timeline transforms over parsed documents.
 *
 * Both transforms only rewrite the start/end fields of each dialogue line;
 * style, margins, effect and text stay byte-for-byte, and the output shares
 * the (first) input's preamble.
 */

use std::path::Path;

use log::info;

use crate::ass_document::AssDocument;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::timecode::AssTime;

/// Move every entry by `delta_seconds`; times that would go negative clamp to zero
pub fn shift(document: &AssDocument, delta_seconds: f64) -> AssDocument {
    AssDocument {
        preamble: document.preamble.clone(),
        entries: document
            .entries
            .iter()
            .map(|e| e.with_times(e.start.shifted(delta_seconds), e.end.shifted(delta_seconds)))
            .collect(),
        trailer: document.trailer.clone(),
    }
}

/// Where `second` starts when appended to `first`: the end of `first`'s
/// captions, or `explicit_length_first` (e.g. the audio length) if later
pub fn concatenation_base(first: &AssDocument, explicit_length_first: Option<f64>) -> AssTime {
    let caption_end = first.timeline_end();
    match explicit_length_first {
        Some(length) => caption_end.max(AssTime::ZERO.shifted(length)),
        None => caption_end,
    }
}

/// Append `second` after `first`, offsetting its entries by the concatenation base
pub fn concatenate(first: &AssDocument, second: &AssDocument, explicit_length_first: Option<f64>) -> AssDocument {
    let base = concatenation_base(first, explicit_length_first);

    let mut entries = first.entries.clone();
    entries.extend(
        second
            .entries
            .iter()
            .map(|e| e.with_times(e.start.offset_by(base), e.end.offset_by(base))),
    );

    AssDocument {
        preamble: first.preamble.clone(),
        entries,
        trailer: first.trailer.clone(),
    }
}

fn persist(document: &AssDocument, output: &Path) -> Result<(), AppError> {
    FileManager::write_atomic(output, &document.to_ass_string())
        .map_err(|e| AppError::File(format!("{:#}", e)))
}

/// Shift a document file. The output is only written once the whole input parsed.
pub fn shift_file<P1: AsRef<Path>, P2: AsRef<Path>>(input: P1, output: P2, delta_seconds: f64) -> Result<usize, AppError> {
    let document = AssDocument::load(input.as_ref())?;
    let shifted = shift(&document, delta_seconds);
    persist(&shifted, output.as_ref())?;

    info!("Shifted {} entries by {}s into {:?}", shifted.entries.len(), delta_seconds, output.as_ref());
    Ok(shifted.entries.len())
}

/// Concatenate two document files into `output`
pub fn concatenate_files<P1, P2, P3>(
    first: P1,
    second: P2,
    output: P3,
    explicit_length_first: Option<f64>,
) -> Result<usize, AppError>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
    P3: AsRef<Path>,
{
    let a = AssDocument::load(first.as_ref())?;
    let b = AssDocument::load(second.as_ref())?;
    let joined = concatenate(&a, &b, explicit_length_first);
    persist(&joined, output.as_ref())?;

    info!(
        "Concatenated {} + {} entries (second offset by {}) into {:?}",
        a.entries.len(),
        b.entries.len(),
        concatenation_base(&a, explicit_length_first),
        output.as_ref()
    );
    Ok(joined.entries.len())
}
