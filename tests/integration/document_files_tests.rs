/*!
 * Integration tests for file-level timeline edits
 */

use std::fs;
use anyhow::Result;
use capsync::app_config::Config;
use capsync::app_controller::Controller;
use capsync::ass_document::AssDocument;
use capsync::errors::{AppError, CaptionError};
use capsync::timeline::{concatenate_files, shift_file};
use crate::common::{self, DOCUMENT_A, DOCUMENT_B};

#[test]
fn test_shift_file_withZeroDelta_shouldCopyDocumentExactly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "a.ass", DOCUMENT_A)?;
    let output = temp_dir.path().join("out.ass");

    assert_eq!(shift_file(&input, &output, 0.0)?, 3);
    assert_eq!(fs::read_to_string(&output)?, DOCUMENT_A);
    Ok(())
}

#[test]
fn test_shift_file_withHugeNegativeDelta_shouldClampToZero() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "a.ass", DOCUMENT_A)?;
    let output = temp_dir.path().join("out.ass");

    shift_file(&input, &output, -86_400.0)?;

    let shifted = AssDocument::load(&output)?;
    assert_eq!(shifted.entries.len(), 3);
    for entry in &shifted.entries {
        assert!(entry.raw_line.contains(",0:00:00.00,0:00:00.00,"));
    }
    Ok(())
}

#[test]
fn test_shift_file_inPlace_shouldReplaceInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "b.ass", DOCUMENT_B)?;

    shift_file(&path, &path, 1.0)?;

    let content = fs::read_to_string(&path)?;
    assert!(content.contains("Dialogue: 0,0:00:02.00,0:00:03.00,Default,,0,0,0,,Hello from B!"));
    assert!(content.contains("Dialogue: 0,0:00:03.50,0:00:05.25,Default,,0,0,0,,Goodbye from B"));
    Ok(())
}

#[test]
fn test_shift_file_withTruncatedLine_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let broken = format!("{}Dialogue: 0,0:00:11.00,0:00:12.00\n", DOCUMENT_B);
    let input = common::create_test_file(temp_dir.path(), "broken.ass", &broken)?;
    let output = temp_dir.path().join("out.ass");

    let result = shift_file(&input, &output, 1.0);

    assert!(matches!(result, Err(AppError::Caption(CaptionError::Parse { line_number: 9, .. }))));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_shift_file_withBadTimestamp_shouldReportFormatError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let broken = DOCUMENT_B.replace("0:00:02.50", "0:0:02.50");
    let input = common::create_test_file(temp_dir.path(), "broken.ass", &broken)?;
    let output = common::create_test_file(temp_dir.path(), "out.ass", "keep me")?;

    let result = shift_file(&input, &output, 1.0);

    assert!(matches!(result, Err(AppError::Caption(CaptionError::Format(ref literal))) if literal == "0:0:02.50"));
    assert_eq!(fs::read_to_string(&output)?, "keep me");
    Ok(())
}

#[test]
fn test_shift_file_withMissingInput_shouldReportFileError() {
    let temp_dir = common::create_temp_dir().unwrap();
    let result = shift_file(temp_dir.path().join("absent.ass"), temp_dir.path().join("out.ass"), 1.0);
    assert!(matches!(result, Err(AppError::File(_))));
}

#[test]
fn test_concatenate_files_withoutLength_shouldAppendAtEndOfFirst() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(temp_dir.path(), "a.ass", DOCUMENT_A)?;
    let b = common::create_test_file(temp_dir.path(), "b.ass", DOCUMENT_B)?;
    let output = temp_dir.path().join("joined.ass");

    assert_eq!(concatenate_files(&a, &b, &output, None)?, 5);

    let content = fs::read_to_string(&output)?;
    assert!(content.starts_with(DOCUMENT_A));
    assert!(content.ends_with(
        "Dialogue: 0,0:00:11.00,0:00:12.00,Default,,0,0,0,,Hello from B!\nDialogue: 0,0:00:12.50,0:00:14.25,Default,,0,0,0,,Goodbye from B\n"
    ));

    let joined = AssDocument::load(&output)?;
    assert_eq!(joined.entries[3].start.to_string(), "0:00:11.00");
    Ok(())
}

#[test]
fn test_controller_concatenate_withExplicitLength_shouldUseAudioLength() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(temp_dir.path(), "a.ass", DOCUMENT_A)?;
    let b = common::create_test_file(temp_dir.path(), "b.ass", DOCUMENT_B)?;
    let output = temp_dir.path().join("joined.ass");

    let controller = Controller::with_config(Config::default())?;
    controller.concatenate(&a, &b, &output, Some(20.0))?;

    let joined = AssDocument::load(&output)?;
    assert_eq!(joined.entries[3].start.to_string(), "0:00:21.00");
    assert_eq!(joined.entries[4].end.to_string(), "0:00:24.25");
    Ok(())
}

#[test]
fn test_controller_shift_withBrokenDocument_shouldAddContext() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "broken.ass", "[Events]\nDialogue: 0,1\n")?;

    let controller = Controller::with_config(Config::default())?;
    let error = controller.shift(&input, &temp_dir.path().join("out.ass"), 1.0).unwrap_err();

    let message = format!("{:#}", error);
    assert!(message.contains("Failed to shift"));
    assert!(message.contains("Malformed dialogue line 2"));
    Ok(())
}
