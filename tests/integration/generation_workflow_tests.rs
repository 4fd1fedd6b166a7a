/*!
 * Integration tests for the audio to caption document workflow
 */

use std::fs;
use anyhow::Result;
use capsync::app_config::{CaptionStyle, Config, OverflowPolicy};
use capsync::app_controller::Controller;
use capsync::ass_document::AssDocument;
use capsync::errors::TranscriptionError;
use capsync::transcript::Transcript;
use capsync::transcription::{Transcriber, TranscriptFileSource};
use crate::common::{self, mock_transcriber::MockTranscriber, word};

/// Generate a document end to end with a mock engine
#[tokio::test]
async fn test_generate_withMockTranscriber_shouldWriteDocumentAndTranscript() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let audio = common::create_test_audio(temp_dir.path(), "speech.wav")?;
    let output = temp_dir.path().join("speech.ass");

    let transcriber = MockTranscriber::new(common::sample_transcript());
    let controller = Controller::with_config(Config::default())?;
    let report = controller.generate(&audio, &output, None, &transcriber).await?;

    assert_eq!(report.word_count, 8);
    assert_eq!(report.overflow_count, 0);
    assert_eq!(report.caption_end.to_string(), "0:00:03.40");

    let document = AssDocument::load(&output)?;
    assert_eq!(document.entries.len(), report.event_count);
    assert_eq!(document.entries[0].start.to_string(), "0:00:00.00");
    assert!(document.preamble.contains("Title: Generated Subtitles with Animation"));

    let dump = report.transcript_path.expect("transcript dump enabled by default");
    assert_eq!(dump, temp_dir.path().join("speech.json"));
    assert_eq!(Transcript::load(&dump)?, common::sample_transcript());

    let tracker = transcriber.tracker();
    let tracker = tracker.lock().unwrap();
    assert_eq!(tracker.call_count, 1);
    assert_eq!(tracker.last_audio.as_deref(), Some(audio.as_path()));
    Ok(())
}

/// A per-job style overrides the configured one
#[test]
fn test_generate_withStyleOverride_shouldUseJobStyle() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio = common::create_test_audio(temp_dir.path(), "speech.wav")?;
    let output = temp_dir.path().join("speech.ass");

    let mut config = Config::default();
    config.generation.dump_transcript = false;
    let controller = Controller::with_config(config)?;
    let style = CaptionStyle {
        font_name: "Roboto".to_string(),
        max_line_count: 2,
        max_line_length: 40,
        ..CaptionStyle::default()
    };
    let transcriber = MockTranscriber::new(common::sample_transcript());

    let report = tokio_test::block_on(controller.generate(&audio, &output, Some(&style), &transcriber))?;

    assert!(report.transcript_path.is_none());
    assert!(!temp_dir.path().join("speech.json").exists());
    assert_eq!(report.event_count, 1);
    assert!(fs::read_to_string(&output)?.contains("Style: Default,Roboto,50,"));
    Ok(())
}

/// A missing audio file fails before the engine runs and writes nothing
#[test]
fn test_generate_withMissingAudio_shouldLeaveOutputUntouched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio = temp_dir.path().join("missing.wav");
    let output = common::create_test_file(temp_dir.path(), "missing.ass", "previous content")?;

    let transcriber = MockTranscriber::new(common::sample_transcript());
    let controller = Controller::with_config(Config::default())?;
    let result = tokio_test::block_on(controller.generate(&audio, &output, None, &transcriber));

    let error = result.expect_err("missing audio must fail");
    assert!(matches!(
        error.downcast_ref::<TranscriptionError>(),
        Some(TranscriptionError::MissingAudio(_))
    ));
    assert_eq!(fs::read_to_string(&output)?, "previous content");
    assert!(!temp_dir.path().join("missing.json").exists());
    assert_eq!(transcriber.tracker().lock().unwrap().call_count, 0);
    Ok(())
}

/// A failed transcript dump keeps the previous captions in place
#[test]
fn test_generate_withUnwritableTranscriptDump_shouldLeaveOutputUntouched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio = common::create_test_audio(temp_dir.path(), "speech.wav")?;
    let output = common::create_test_file(temp_dir.path(), "speech.ass", "OLD CONTENT")?;
    fs::create_dir_all(temp_dir.path().join("speech.json").join("blocked"))?;

    let transcriber = MockTranscriber::new(common::sample_transcript());
    let controller = Controller::with_config(Config::default())?;
    let result = tokio_test::block_on(controller.generate(&audio, &output, None, &transcriber));

    let message = format!("{:#}", result.expect_err("dump failure must propagate"));
    assert!(message.contains("Failed to write transcript"));
    assert_eq!(fs::read_to_string(&output)?, "OLD CONTENT");
    Ok(())
}

/// An engine failure surfaces and writes nothing
#[test]
fn test_generate_withFailingTranscriber_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio = common::create_test_audio(temp_dir.path(), "speech.wav")?;
    let output = temp_dir.path().join("speech.ass");

    let transcriber = MockTranscriber::failing();
    let controller = Controller::with_config(Config::default())?;
    let result = tokio_test::block_on(controller.generate(&audio, &output, None, &transcriber));

    let message = format!("{:#}", result.expect_err("engine failure must propagate"));
    assert!(message.contains("mock engine crashed"));
    assert!(!output.exists());
    Ok(())
}

/// The reject policy aborts generation on an oversized word
#[test]
fn test_generate_withRejectPolicy_shouldFailOnOverflow() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio = common::create_test_audio(temp_dir.path(), "speech.wav")?;
    let output = temp_dir.path().join("speech.ass");

    let mut config = Config::default();
    config.captions.max_line_length = 5;
    config.generation.overflow_policy = OverflowPolicy::Reject;
    let controller = Controller::with_config(config)?;
    let transcriber = MockTranscriber::new(Transcript::from_words(vec![
        word("supercalifragilisticexpialidocious", 0.0, 1.0),
    ]));

    let result = tokio_test::block_on(controller.generate(&audio, &output, None, &transcriber));
    assert!(result.is_err());
    assert!(!output.exists());
    Ok(())
}

/// Folder mode generates missing documents and skips existing ones
#[tokio::test]
async fn test_generate_folder_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_audio(temp_dir.path(), "one.wav")?;
    common::create_test_audio(temp_dir.path(), "two.mp3")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "not audio")?;
    common::create_test_file(temp_dir.path(), "two.ass", "existing")?;

    let transcriber = MockTranscriber::new(common::sample_transcript());
    let controller = Controller::with_config(Config::default())?;

    let report = controller.generate_folder(temp_dir.path(), false, None, &transcriber).await?;
    assert_eq!((report.generated, report.skipped, report.failed), (1, 1, 0));
    assert!(temp_dir.path().join("one.ass").exists());
    assert_eq!(fs::read_to_string(temp_dir.path().join("two.ass"))?, "existing");

    let forced = controller.generate_folder(temp_dir.path(), true, None, &transcriber).await?;
    assert_eq!((forced.generated, forced.skipped, forced.failed), (2, 0, 0));
    assert_ne!(fs::read_to_string(temp_dir.path().join("two.ass"))?, "existing");
    Ok(())
}

/// Failures in folder mode are counted, not fatal
#[tokio::test]
async fn test_generate_folder_withFailingTranscriber_shouldCountFailures() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_audio(temp_dir.path(), "one.wav")?;
    common::create_test_audio(temp_dir.path(), "two.flac")?;

    let controller = Controller::with_config(Config::default())?;
    let report = controller
        .generate_folder(temp_dir.path(), false, None, &MockTranscriber::failing())
        .await?;

    assert_eq!((report.generated, report.failed), (0, 2));
    Ok(())
}

/// A saved transcript can stand in for the engine
#[tokio::test]
async fn test_transcriptFileSource_withDumpedTranscript_shouldReplayIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio = common::create_test_audio(temp_dir.path(), "speech.wav")?;
    let saved = temp_dir.path().join("saved.json");
    common::sample_transcript().save(&saved)?;

    let source = TranscriptFileSource::new(&saved);
    assert_eq!(source.transcribe(&audio).await?, common::sample_transcript());

    let broken = TranscriptFileSource::new(temp_dir.path().join("absent.json"));
    assert!(matches!(
        broken.transcribe(&audio).await,
        Err(TranscriptionError::InvalidTranscript(_))
    ));
    Ok(())
}
