use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::Level;

use voice_features::catalog::RecordingCatalog;
use voice_features::config::{ExtractorConfig, DEFAULT_N_MFCC};
use voice_features::frames::{FrameHeader, FrameSet};
use voice_features::synth::{duration_samples, SyntheticPattern, SyntheticSpec};
use voice_features::{column_names, BatchExtractor, FeatureExtractor, FeatureTableWriter};

#[derive(Parser, Debug)]
#[command(
    name = "voice_features_cli",
    about = "Batch feature extraction over framed speech recordings"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract one feature row per recording into a CSV table
    Extract(ExtractArgs),
    /// Print a frame-set header as JSON
    Inspect {
        #[arg(long)]
        file: PathBuf,
    },
    /// Write a deterministic synthetic frame set
    Synth(SynthArgs),
    /// Print the feature column names, one per line
    Columns {
        #[arg(long, default_value_t = DEFAULT_N_MFCC)]
        n_mfcc: usize,
    },
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Root directory laid out as <class>/<id>.frames
    #[arg(long)]
    input: PathBuf,
    /// Destination CSV table
    #[arg(long)]
    output: PathBuf,
    /// Metadata CSV with id and classe columns (default: walk the input directory)
    #[arg(long)]
    metadata: Option<PathBuf>,
    /// JSON extractor config; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    n_mfcc: Option<usize>,
    #[arg(long)]
    n_mels: Option<usize>,
    #[arg(long)]
    rolloff: Option<f32>,
    /// Worker threads (0 = available parallelism)
    #[arg(long)]
    workers: Option<usize>,
    /// Write the extraction summary JSON here instead of stdout
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Destination .frames file
    #[arg(long)]
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = SyntheticPatternArg::Sine)]
    pattern: SyntheticPatternArg,
    #[arg(long, default_value_t = 200.0)]
    frequency: f32,
    #[arg(long, default_value_t = 0.5)]
    amplitude: f32,
    #[arg(long, default_value_t = 1_000)]
    duration_ms: u32,
    #[arg(long, default_value_t = 16_000)]
    sample_rate: u32,
    #[arg(long, default_value_t = 480)]
    frame_len: u32,
    #[arg(long, default_value_t = 160)]
    hop_len: u32,
    /// Seed for the white-noise generator
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum SyntheticPatternArg {
    Sine,
    Square,
    WhiteNoise,
    Silence,
}

impl std::fmt::Display for SyntheticPatternArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyntheticPatternArg::Sine => "sine",
            SyntheticPatternArg::Square => "square",
            SyntheticPatternArg::WhiteNoise => "white-noise",
            SyntheticPatternArg::Silence => "silence",
        };
        f.write_str(name)
    }
}

impl From<SyntheticPatternArg> for SyntheticPattern {
    fn from(arg: SyntheticPatternArg) -> Self {
        match arg {
            SyntheticPatternArg::Sine => SyntheticPattern::Sine,
            SyntheticPatternArg::Square => SyntheticPattern::Square,
            SyntheticPatternArg::WhiteNoise => SyntheticPattern::WhiteNoise,
            SyntheticPatternArg::Silence => SyntheticPattern::Silence,
        }
    }
}

#[derive(Serialize)]
struct InspectReport<'a> {
    path: String,
    #[serde(flatten)]
    header: &'a FrameHeader,
    fft_size: usize,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Extract(args) => run_extract(args),
        Command::Inspect { file } => run_inspect(&file),
        Command::Synth(args) => run_synth(args),
        Command::Columns { n_mfcc } => run_columns(n_mfcc),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_extract(args: ExtractArgs) -> Result<ExitCode> {
    let mut config = args
        .config
        .as_deref()
        .map(ExtractorConfig::load_from_file)
        .unwrap_or_default();
    if let Some(n_mfcc) = args.n_mfcc {
        config.n_mfcc = n_mfcc;
    }
    if let Some(n_mels) = args.n_mels {
        config.n_mels = n_mels;
    }
    if let Some(rolloff) = args.rolloff {
        config.rolloff_fraction = rolloff;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    let extractor = FeatureExtractor::new(config).context("invalid extractor configuration")?;
    let batch = BatchExtractor::new(extractor);

    let catalog = RecordingCatalog::new(&args.input);
    let entries = match &args.metadata {
        Some(metadata) => catalog.from_metadata(metadata)?,
        None => catalog
            .discover()
            .with_context(|| format!("scanning {}", args.input.display()))?,
    };

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut table = FeatureTableWriter::new(file, &batch.extractor().column_names())
        .with_context(|| format!("writing header to {}", args.output.display()))?;
    let summary = batch
        .run(&entries, &mut table)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let json = serde_json::to_string_pretty(&summary)?;
    if let Some(path) = args.summary {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(ExitCode::SUCCESS)
}

fn run_inspect(file: &Path) -> Result<ExitCode> {
    let frames =
        FrameSet::read_file(file).with_context(|| format!("reading {}", file.display()))?;
    let report = InspectReport {
        path: file.display().to_string(),
        header: frames.header(),
        fft_size: frames.header().fft_size(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}

fn run_synth(args: SynthArgs) -> Result<ExitCode> {
    let spec = SyntheticSpec {
        pattern: args.pattern.into(),
        frequency_hz: args.frequency,
        amplitude: args.amplitude,
        sample_rate: args.sample_rate,
        num_samples: duration_samples(args.duration_ms, args.sample_rate),
        seed: args.seed,
    };
    let frames = spec
        .to_frame_set(args.frame_len, args.hop_len)
        .context("framing synthetic signal")?;
    frames
        .write_file(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    tracing::info!(
        "Wrote {} {} frames of {} samples to {}",
        frames.num_frames(),
        args.pattern,
        frames.frame_len(),
        args.output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_columns(n_mfcc: usize) -> Result<ExitCode> {
    if n_mfcc == 0 {
        bail!("--n-mfcc must be at least 1");
    }
    for name in column_names(n_mfcc) {
        println!("{name}");
    }
    Ok(ExitCode::SUCCESS)
}
