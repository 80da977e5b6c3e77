use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "midiroll",
    version,
    about = "Render MIDI notes as a scrolling piano-roll video"
)]
struct Cli {
    /// Log debug detail.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every frame and compile an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input MIDI file.
    midi: PathBuf,

    /// Directory for the frame folder and the video (defaults to the MIDI file's directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Encoder threads (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,

    /// Do not open the video when done.
    #[arg(long)]
    no_open: bool,

    /// Keep the PNG frames after a successful compile.
    #[arg(long)]
    keep_frames: bool,

    /// Stop after writing the PNG frames.
    #[arg(long)]
    frames_only: bool,

    /// Video compiler executable.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    #[command(flatten)]
    look: LookArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input MIDI file.
    #[arg(long)]
    midi: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    look: LookArgs,
}

/// Appearance and timing; flags override `--config`, which overrides the defaults.
#[derive(Args, Debug)]
struct LookArgs {
    /// JSON file with any subset of the configuration fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replace the tempo read from the file.
    #[arg(long)]
    bpm: Option<f64>,

    /// Seed for reproducible animation.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, allow_negative_numbers = true)]
    width: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    height: Option<i64>,

    /// X position of the guideline.
    #[arg(long, allow_negative_numbers = true)]
    guideline_x: Option<i64>,

    /// Guideline width in pixels; 0 hides it.
    #[arg(long, allow_negative_numbers = true)]
    guideline_width: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    note_height: Option<i64>,

    /// Extra vertical spacing per semitone.
    #[arg(long, allow_negative_numbers = true)]
    note_distance: Option<i64>,

    /// Peak rotation in degrees; positive tilts counter-clockwise.
    #[arg(long, allow_negative_numbers = true)]
    rotation_angle: Option<f64>,

    #[arg(long, value_enum)]
    rotation_mode: Option<RotationChoice>,

    #[arg(long, value_enum)]
    shake_mode: Option<ShakeChoice>,

    /// Clamp of the random jitter in pixels.
    #[arg(long, allow_negative_numbers = true)]
    shake_amplitude: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    shake_variance: Option<f64>,

    /// Activation offset as a percentage of the note height.
    #[arg(long, allow_negative_numbers = true)]
    shake_activation: Option<f64>,

    /// Seconds for an active note to settle.
    #[arg(long, allow_negative_numbers = true)]
    return_to_center: Option<f64>,

    #[arg(long, value_enum)]
    settle_curve: Option<CurveChoice>,

    /// Scroll speed.
    #[arg(long, allow_negative_numbers = true)]
    pixels_per_second: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    fps: Option<i64>,

    /// Colors accept `#RRGGBB` or `R,G,B`.
    #[arg(long)]
    active_color: Option<String>,
    #[arg(long)]
    inactive_color: Option<String>,
    #[arg(long)]
    background_color: Option<String>,
    #[arg(long)]
    guideline_color: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RotationChoice {
    Dynamic,
    Fixed,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShakeChoice {
    Vibrate,
    OneWay,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CurveChoice {
    Cubic,
    Quad,
    Expo,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else if quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

impl LookArgs {
    fn resolve(&self) -> anyhow::Result<midiroll::RenderConfig> {
        let file = match &self.config {
            Some(path) => midiroll::ConfigOverrides::from_json_file(path)
                .with_context(|| format!("load config '{}'", path.display()))?,
            None => midiroll::ConfigOverrides::default(),
        };
        Ok(file.merge(self.overrides()).resolve())
    }

    fn overrides(&self) -> midiroll::ConfigOverrides {
        midiroll::ConfigOverrides {
            width: self.width,
            height: self.height,
            guideline_x: self.guideline_x,
            guideline_width: self.guideline_width,
            note_height: self.note_height,
            note_distance: self.note_distance,
            rotation_angle: self.rotation_angle,
            rotation_mode: self.rotation_mode.map(|c| match c {
                RotationChoice::Dynamic => midiroll::RotationMode::Dynamic,
                RotationChoice::Fixed => midiroll::RotationMode::Fixed,
            }),
            shake_mode: self.shake_mode.map(|c| match c {
                ShakeChoice::Vibrate => midiroll::ShakeMode::Vibrate,
                ShakeChoice::OneWay => midiroll::ShakeMode::OneWay,
            }),
            shake_amplitude: self.shake_amplitude,
            shake_variance: self.shake_variance,
            shake_activation: self.shake_activation,
            return_to_center: self.return_to_center,
            settle_curve: self.settle_curve.map(|c| match c {
                CurveChoice::Cubic => midiroll::SettleCurve::Cubic,
                CurveChoice::Quad => midiroll::SettleCurve::Quad,
                CurveChoice::Expo => midiroll::SettleCurve::Expo,
            }),
            pixels_per_second: self.pixels_per_second,
            fps: self.fps,
            active_color: self.active_color.clone(),
            inactive_color: self.inactive_color.clone(),
            background_color: self.background_color.clone(),
            guideline_color: self.guideline_color.clone(),
            seed: self.seed,
        }
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = args.look.resolve()?;
    let job = midiroll::ExportJob::open(&args.midi, cfg, args.look.bpm)
        .with_context(|| format!("prepare '{}'", args.midi.display()))?;

    let out_dir = match args.out_dir {
        Some(dir) => dir,
        None => args
            .midi
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let opts = midiroll::ExportOptions {
        out_dir,
        pipeline: midiroll::PipelineOpts {
            threads: args.threads,
            ..midiroll::PipelineOpts::default()
        },
        compile: !args.frames_only,
        keep_frames: args.keep_frames,
        open_video: !args.no_open,
        ffmpeg: args.ffmpeg,
    };

    let report = job.export(&opts)?;
    let frames = report.frames_dir.display();
    match report.video {
        midiroll::VideoStatus::Skipped => {
            eprintln!("wrote {} frames to {frames}", report.frame_count);
        }
        midiroll::VideoStatus::Created {
            path,
            frames_removed,
        } => {
            eprintln!("wrote {}", path.display());
            if !frames_removed {
                eprintln!("frames kept in {frames}");
            }
        }
        midiroll::VideoStatus::Failed { code, detail } => {
            let code = code.map_or_else(|| "none".to_string(), |c| c.to_string());
            anyhow::bail!(
                "ffmpeg failed (exit code {code}); frames have NOT been deleted, \
                 find them at {frames}\n{detail}"
            );
        }
        midiroll::VideoStatus::CompilerNotFound => {
            anyhow::bail!(
                "ffmpeg not found; install it and add it to your PATH. \
                 Frames have been saved to {frames}"
            );
        }
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.look.resolve()?;
    let mut job = midiroll::ExportJob::open(&args.midi, cfg, args.look.bpm)
        .with_context(|| format!("prepare '{}'", args.midi.display()))?;
    let frame = job.render_frame(midiroll::FrameIndex(args.frame))?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .image
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
