//! gen-serial - Convert a scraped web serial into batched audio files with chapter timestamps

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gen_serial::batch::SampleEncoding;
use gen_serial::batch::writer::format_timestamp;
use gen_serial::text::select_range;
use gen_serial::{CancelFlag, EngineKind, GenSerialConfig, Pipeline, create_engine, prepare_chapters};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::{Path, PathBuf};

#[cfg(feature = "kokoro")]
const DEFAULT_ENGINE: &str = "kokoro";
#[cfg(not(feature = "kokoro"))]
const DEFAULT_ENGINE: &str = "silence";

#[derive(Parser, Debug)]
#[command(name = "gen-serial")]
#[command(about = "Convert a scraped web serial into batched audio files with chapter timestamps", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the book text file ('-' reads stdin)
    book: Option<PathBuf>,

    /// Output directory (default from config: ./audio)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chapters per output file
    #[arg(short, long)]
    batch_limit: Option<usize>,

    /// Voice identifier for the speech engine
    #[arg(long)]
    voice: Option<String>,

    /// Speaking rate (0.5-2.0)
    #[arg(long)]
    speed: Option<f32>,

    /// Speech engine to use (kokoro needs a build with the 'kokoro' feature)
    #[arg(long, value_enum, default_value = DEFAULT_ENGINE)]
    engine: EngineKind,

    /// Chapter range to process (e.g., "0-10")
    #[arg(long)]
    chapters: Option<String>,

    /// Prefix for output file names (e.g., "Audio_")
    #[arg(long)]
    prefix: Option<String>,

    /// Sample format of written audio
    #[arg(long, value_enum)]
    encoding: Option<SampleEncoding>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Voice identifier (e.g., am_onyx)
        voice: String,
    },
    /// Set default speaking rate
    SetSpeed {
        /// Value (0.5-2.0)
        value: f32,
    },
    /// Set default chapters per output file
    SetBatchLimit {
        /// Value (at least 1)
        value: usize,
    },
    /// Set default output directory
    SetOutputDir {
        /// Directory path
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let book_path = args
        .book
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Book text path is required. Run 'gen-serial --help' for usage."))?;

    let config = apply_overrides(
        GenSerialConfig::load().context("Failed to load configuration")?,
        &args,
    );
    let settings = config.pipeline_settings().context("Invalid settings")?;

    if args.debug {
        eprintln!("Book: {}", book_path.display());
        eprintln!("Output: {}", config.output_dir.display());
        eprintln!("Batch limit: {}", config.batch_limit);
        eprintln!("Voice: {} @ {}x", config.voice, config.speed);
        eprintln!("Engine: {:?}", args.engine);
    }

    let raw = read_book(&book_path)?;
    let mut chapters = prepare_chapters(&raw);
    if let Some(ref range) = args.chapters {
        chapters = select_range(chapters, range)?;
    }

    if chapters.is_empty() {
        anyhow::bail!("No chapters found in {}", book_path.display());
    }
    eprintln!("Chapters: {}", chapters.len());
    if args.engine == EngineKind::Silence {
        log::warn!("Using the silence engine: output files contain placeholder audio");
    }

    let engine = create_engine(
        args.engine,
        config.sample_rate,
        &config.lang_code,
        config.device.as_deref(),
    )
    .context("Failed to start speech engine")?;

    let cancel = CancelFlag::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping after the current chapter...");
            ctrl_c.cancel();
        }
    });

    let pb = ProgressBar::new(chapters.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let pipeline = Pipeline::new(engine, settings).with_cancel_flag(cancel);
    let report = pipeline
        .run(chapters, |progress| {
            pb.set_position(progress.processed as u64);
            if let Some(ref title) = progress.last_title {
                pb.set_message(format!("{} (files: {})", title, progress.batches_written));
            }
        })
        .await
        .context("Audio generation failed")?;

    if report.cancelled {
        pb.abandon_with_message("Cancelled");
    } else {
        pb.finish_with_message("Audio generation complete!");
    }

    for written in &report.batches {
        eprintln!(
            "  {} ({} chapters, {})",
            written.audio_path.display(),
            written.clip_count,
            format_timestamp(written.duration_seconds)
        );
    }
    if !report.skipped.is_empty() {
        eprintln!("Skipped (no audio): {}", report.skipped.join(", "));
    }
    eprintln!(
        "\nChapters: {}, Files: {}, Skipped: {}",
        report.chapters_processed,
        report.batches.len(),
        report.skipped.len()
    );

    Ok(())
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Read the book from a file, or stdin for '-'.
fn read_book(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read book from stdin")?;
        return Ok(text);
    }

    if !path.exists() {
        anyhow::bail!("Book file not found: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Apply one-off command line settings over the saved configuration.
fn apply_overrides(mut config: GenSerialConfig, args: &Args) -> GenSerialConfig {
    if let Some(ref output) = args.output {
        config.output_dir = output.clone();
    }
    if let Some(batch_limit) = args.batch_limit {
        config.batch_limit = batch_limit;
    }
    if let Some(ref voice) = args.voice {
        config.voice = voice.clone();
    }
    if let Some(speed) = args.speed {
        config.speed = speed;
    }
    if let Some(ref prefix) = args.prefix {
        config.file_prefix = prefix.clone();
    }
    if let Some(encoding) = args.encoding {
        config.encoding = encoding;
    }
    config
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = GenSerialConfig::load()?;
            println!("Configuration file: {:?}", GenSerialConfig::config_path());
            println!();
            println!("batch_limit = {}", config.batch_limit);
            println!("sample_rate = {}", config.sample_rate);
            println!("voice = \"{}\"", config.voice);
            println!("speed = {}", config.speed);
            println!("output_dir = \"{}\"", config.output_dir.display());
            println!("file_prefix = \"{}\"", config.file_prefix);
            println!("encoding = {:?}", config.encoding);
            println!("lang_code = \"{}\"", config.lang_code);
            if let Some(device) = &config.device {
                println!("device = \"{}\"", device);
            } else {
                println!("device = (auto-detect)");
            }
            println!("write_retries = {}", config.write_retries);
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = GenSerialConfig::load()?;
            config.voice = voice.clone();
            config.save()?;
            println!("Default voice set to: {}", config.voice);
        }
        ConfigAction::SetSpeed { value } => {
            let mut config = GenSerialConfig::load()?;
            config.speed = value.clamp(0.5, 2.0);
            config.save()?;
            println!("Default speed set to: {}", config.speed);
        }
        ConfigAction::SetBatchLimit { value } => {
            let mut config = GenSerialConfig::load()?;
            config.batch_limit = *value;
            config.validate()?;
            config.save()?;
            println!("Default batch limit set to: {}", config.batch_limit);
        }
        ConfigAction::SetOutputDir { path } => {
            let mut config = GenSerialConfig::load()?;
            config.output_dir = path.clone();
            config.save()?;
            println!("Default output directory set to: {}", path.display());
        }
    }
    Ok(())
}
