// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use capsync::app_config::{self, CaptionStyle, Config};
use capsync::app_controller::Controller;
use capsync::file_utils::FileManager;
use capsync::transcription::{Transcriber, TranscriptFileSource};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transcribe audio and write animated captions
    Generate(GenerateArgs),

    /// Shift every caption of a document by a number of seconds
    Shift {
        /// Document to read
        input: PathBuf,
        /// Document to write
        output: PathBuf,
        /// Seconds to add (negative moves captions earlier, clamped at zero)
        #[arg(allow_negative_numbers = true)]
        delta_seconds: f64,
    },

    /// Append one document after another
    Concat {
        /// First document; its header and styles are kept
        first: PathBuf,
        /// Second document, offset to start where the first ends
        second: PathBuf,
        /// Document to write
        output: PathBuf,
        /// Length of the first part's audio, when longer than its captions
        #[arg(long)]
        length_a: Option<f64>,
    },

    /// Generate shell completions for capsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Audio file, or directory of audio files
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output document (defaults to the input with an .ass extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use a saved transcript JSON instead of running the transcription engine
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Caption style JSON for this job
    #[arg(long)]
    style: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Do not write the transcript JSON next to the output
    #[arg(long)]
    no_dump: bool,
}

/// capsync - word-synchronized karaoke captions
#[derive(Parser, Debug)]
#[command(name = "capsync")]
#[command(version)]
#[command(about = "Word-synchronized ASS caption generation and timeline editing")]
#[command(long_about = "capsync transcribes audio into animated ASS captions and edits caption timelines.

EXAMPLES:
    capsync generate speech.wav                      # Write speech.ass and speech.json
    capsync generate speech.wav --style style.json   # Per-job caption style
    capsync generate speech.wav --transcript t.json  # Reuse a saved transcript
    capsync generate -f /recordings/                 # Every audio file in a folder
    capsync shift in.ass out.ass -1.5                # Move captions 1.5s earlier
    capsync concat a.ass b.ass out.ass --length-a 12 # Splice b after 12s of audio
    capsync completions bash > capsync.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info by default; raised or lowered once the config is known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "capsync", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        log::set_max_level(level_filter(&level.clone().into()));
    }

    let config = load_or_create_config(&cli.config_path, cli.log_level.clone())?;

    if cli.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    match cli.command {
        Commands::Generate(args) => run_generate(config, args).await,
        Commands::Shift { input, output, delta_seconds } => {
            let controller = Controller::with_config(config)?;
            controller.shift(&input, &output, delta_seconds)?;
            Ok(())
        }
        Commands::Concat { first, second, output, length_a } => {
            let controller = Controller::with_config(config)?;
            controller.concatenate(&first, &second, &output, length_a)?;
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_or_create_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.save(config_path)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    Ok(config)
}

async fn run_generate(mut config: Config, args: GenerateArgs) -> Result<()> {
    if args.no_dump {
        config.generation.dump_transcript = false;
    }

    let style = args.style.as_ref()
        .map(CaptionStyle::load)
        .transpose()
        .context("Failed to load caption style")?;

    let controller = Controller::with_config(config)?;

    let transcriber: Box<dyn Transcriber> = match &args.transcript {
        Some(path) => Box::new(TranscriptFileSource::new(path)),
        None => Box::new(controller.default_transcriber()),
    };

    if args.input_path.is_dir() {
        if args.transcript.is_some() || args.output.is_some() {
            return Err(anyhow!("--transcript and --output apply to a single audio file, not a directory"));
        }
        controller.generate_folder(&args.input_path, args.force_overwrite, style.as_ref(), transcriber.as_ref()).await?;
        return Ok(());
    }

    let output = args.output.clone()
        .unwrap_or_else(|| FileManager::companion_path(&args.input_path, "ass"));

    if output.exists() && !args.force_overwrite {
        warn!("Output file already exists: {:?}. Use -f to force overwrite.", output);
        return Ok(());
    }

    let report = controller.generate(&args.input_path, &output, style.as_ref(), transcriber.as_ref()).await?;
    info!(
        "Success: {:?} ({} words, {} captions)",
        report.output_path, report.word_count, report.event_count
    );

    Ok(())
}
