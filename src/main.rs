// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::app_config::{Config, LogLevel};
use crate::language_registry::{LanguageRegistry, LanguageTag, Vocabulary};
use crate::pipeline::{
    CancelFlag, PipelineCoordinator, PipelineInput, PipelineRequest, PipelineResult,
    PipelineStatus,
};

mod app_config;
mod cascade;
mod chunking;
mod errors;
mod language_registry;
mod media;
mod pipeline;
mod progress;
mod providers;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recognize speech from an audio file or URL
    Asr {
        /// Audio/video file path, or an http(s) URL to fetch
        input: String,

        /// Source language code (any vocabulary: 'hi', 'hin', 'hin_Deva', 'hindi')
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Translate text between registered languages
    Mt {
        /// Text to translate
        text: String,

        /// Source language code
        #[arg(short, long)]
        source: String,

        /// Target language code
        #[arg(short, long)]
        target: String,
    },

    /// Synthesize speech from text
    Tts {
        /// Text to synthesize
        text: String,

        /// Language of the text
        #[arg(short, long)]
        language: String,
    },

    /// Run the full pipeline: recognize, translate, synthesize
    Pipeline {
        /// Audio/video file path, or an http(s) URL to fetch
        input: String,

        /// Source language code; detected when omitted
        #[arg(short, long)]
        source: Option<String>,

        /// Target language code; configured default when omitted
        #[arg(short, long)]
        target: Option<String>,

        /// Skip the synthesis stage
        #[arg(long)]
        no_tts: bool,
    },

    /// List the registered languages and their per-provider codes
    Languages,
}

/// Vasha - speech translation pipeline
///
/// Recognizes speech, translates the transcript and synthesizes the
/// translation across English and the scheduled Indian languages, with
/// cascading fallback between model providers at every stage.
#[derive(Parser, Debug)]
#[command(name = "vasha")]
#[command(version = "1.0.0")]
#[command(about = "Multi-provider speech translation pipeline")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (default location is used when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Stderr logger with timestamps and per-level colors
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Default to info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(cmd_level) = &cli.log_level {
        log::set_max_level(level_filter(&cmd_level.clone().into()));
    }

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_init()?,
    };
    if let Some(cmd_level) = &cli.log_level {
        config.log_level = cmd_level.clone().into();
    }
    if cli.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    if matches!(cli.command, Commands::Languages) {
        print_languages();
        return Ok(());
    }

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output dir: {}", config.output_dir))?;
    let coordinator = PipelineCoordinator::new(config);

    let request = match cli.command {
        Commands::Asr { input, source } => {
            let source = source.map(|code| resolve(&code)).transpose()?;
            let mut request = PipelineRequest::new(parse_input(input));
            request.source = source;
            request.translate(false).synthesize(false)
        }
        Commands::Mt { text, source, target } => {
            PipelineRequest::new(PipelineInput::Text(text))
                .source(resolve(&source)?)
                .target(resolve(&target)?)
                .synthesize(false)
        }
        Commands::Tts { text, language } => {
            let language = resolve(&language)?;
            PipelineRequest::new(PipelineInput::Text(text))
                .source(language)
                .target(language)
                .translate(false)
        }
        Commands::Pipeline { input, source, target, no_tts } => {
            let mut request = PipelineRequest::new(parse_input(input));
            request.source = source.map(|code| resolve(&code)).transpose()?;
            request.target = target.map(|code| resolve(&code)).transpose()?;
            request.synthesize(!no_tts)
        }
        Commands::Languages => unreachable!("handled above"),
    };

    let result = run_with_progress(&coordinator, request).await;
    report(&result)
}

/// Drive the job while rendering its progress channel as a bar
async fn run_with_progress(
    coordinator: &PipelineCoordinator,
    request: PipelineRequest,
) -> PipelineResult {
    let id = request.correlation_id;
    let board = coordinator.board();

    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);

    let run = coordinator.run(request, CancelFlag::new());
    tokio::pin!(run);
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            _ = ticker.tick() => {
                if let Some(value) = board.poll(&id) {
                    bar.set_position(value as u64);
                }
            }
        }
    };

    bar.finish_and_clear();
    board.remove(&id);
    result
}

fn report(result: &PipelineResult) -> Result<()> {
    if let Some(transcript) = result.transcript() {
        println!("transcript: {}", transcript);
    }
    if let Some(translation) = result.translation() {
        println!("translation: {}", translation);
    }
    if let Some(audio) = result.audio() {
        println!("audio: {}", audio.display());
    }

    match result.status {
        PipelineStatus::Completed => {
            info!("Done in {:?}", result.elapsed);
            Ok(())
        }
        PipelineStatus::PartiallyCompleted => {
            let reason = result.failure.as_deref().unwrap_or("cancelled");
            Err(anyhow!("Pipeline partially completed: {}", reason))
        }
        PipelineStatus::Failed => {
            let reason = result.failure.as_deref().unwrap_or("unknown failure");
            Err(anyhow!("Pipeline failed: {}", reason))
        }
    }
}

fn resolve(code: &str) -> Result<LanguageTag> {
    LanguageRegistry::global()
        .resolve(code)
        .map_err(|e| anyhow!("{}", e))
}

fn parse_input(input: String) -> PipelineInput {
    match url::Url::parse(&input) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            PipelineInput::RemoteUrl(input)
        }
        _ => PipelineInput::MediaFile(PathBuf::from(input)),
    }
}

fn print_languages() {
    let registry = LanguageRegistry::global();
    println!("{:<12} {:<6} {:<6} {:<10} {}", "name", "tag", "639-1", "flores", "speech");
    for tag in registry.supported() {
        let part1 = registry
            .to_vocabulary(*tag, Vocabulary::Iso639_1)
            .unwrap_or("-");
        let flores = registry
            .to_vocabulary(*tag, Vocabulary::Flores)
            .unwrap_or("-");
        let speech = registry
            .to_vocabulary(*tag, Vocabulary::SpeechName)
            .unwrap_or("-");
        println!("{:<12} {:<6} {:<6} {:<10} {}", tag.name(), tag.code(), part1, flores, speech);
    }
}
