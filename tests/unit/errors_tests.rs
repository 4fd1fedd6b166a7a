/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;
use capsync::errors::{AppError, CaptionError, TranscriptionError};

#[test]
fn test_captionError_parse_shouldReportLine() {
    let error = CaptionError::Parse { line_number: 12, line: "Dialogue: 0,broken".to_string() };
    let display = format!("{}", error);
    assert!(display.contains("12"));
    assert!(display.contains("Dialogue: 0,broken"));
}

#[test]
fn test_captionError_format_shouldNameLiteral() {
    let error = CaptionError::Format("0:0x:00.00".to_string());
    assert!(format!("{}", error).contains("0:0x:00.00"));
}

#[test]
fn test_transcriptionError_missingAudio_shouldShowPath() {
    let error = TranscriptionError::MissingAudio(PathBuf::from("/tmp/nothing.wav"));
    assert!(format!("{}", error).contains("/tmp/nothing.wav"));
}

#[test]
fn test_appError_fromCaptionError_shouldWrapCorrectly() {
    let app_error: AppError = CaptionError::Format("bad".to_string()).into();
    assert!(matches!(app_error, AppError::Caption(CaptionError::Format(_))));
    assert!(format!("{}", app_error).contains("Caption error"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldBecomeUnknown() {
    let app_error: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(app_error, AppError::Unknown(ref msg) if msg == "something odd"));
}
