use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::animation::model::AnimationModel;
use crate::compile::ffmpeg::{CompileOutcome, VideoCompileConfig, compile_video};
use crate::config::render::RenderConfig;
use crate::encode::pipeline::{ExportPipeline, PipelineOpts, PipelineStats};
use crate::encode::png::PngSequenceEncoder;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MidirollError, MidirollResult};
use crate::midi::source::{ParsedMidi, parse_midi_file};
use crate::output::paths::{
    create_unique_dir, frames_dir_for, open_with_default_app, remove_frames_dir, video_path_for,
};
use crate::render::cpu::FrameRenderer;
use crate::render::frame::GeneratedFrame;
use crate::timing::mapper::{Scene, TimingModel};

/// Progress lines emitted over a whole run.
const PROGRESS_STEPS: u64 = 20;

/// Options for [`ExportJob::export`] that are not part of the look of the video.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Directory receiving the frame folder and the video.
    pub out_dir: PathBuf,
    pub pipeline: PipelineOpts,
    /// Run the video compiler after the frames are written.
    pub compile: bool,
    /// Keep the frame folder after a successful compile.
    pub keep_frames: bool,
    /// Open the finished video with the platform's default application.
    pub open_video: bool,
    /// Video compiler executable.
    pub ffmpeg: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            pipeline: PipelineOpts::default(),
            compile: true,
            keep_frames: false,
            open_video: true,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// What happened after the frames were written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoStatus {
    /// Compilation was not requested.
    Skipped,
    Created {
        path: PathBuf,
        frames_removed: bool,
    },
    /// The compiler could not produce a video; frames are kept.
    Failed {
        code: Option<i32>,
        detail: String,
    },
    /// The compiler executable is missing; frames are kept.
    CompilerNotFound,
}

#[derive(Clone, Debug)]
pub struct ExportReport {
    pub frames_dir: PathBuf,
    pub frame_count: u64,
    pub stats: PipelineStats,
    pub video: VideoStatus,
}

/// A fully prepared run: annotated notes, animation model and seeded randomness.
///
/// Preparing fails on empty input, before anything touches the filesystem.
pub struct ExportJob {
    source: PathBuf,
    cfg: RenderConfig,
    scene: Scene,
    model: AnimationModel,
    rng: StdRng,
}

impl ExportJob {
    /// Parse `midi_path` and prepare a run for it.
    pub fn open(
        midi_path: &Path,
        cfg: RenderConfig,
        bpm_override: Option<f64>,
    ) -> MidirollResult<Self> {
        let midi = parse_midi_file(midi_path)?;
        if midi.unmatched > 0 {
            tracing::warn!(
                count = midi.unmatched,
                "some note-ons had no matching note-off and were dropped"
            );
        }
        Self::new(midi_path, &midi, cfg, bpm_override)
    }

    /// Prepare a run from already parsed notes. `source` names the outputs.
    #[tracing::instrument(skip_all, fields(source = %source.as_ref().display()))]
    pub fn new(
        source: impl AsRef<Path>,
        midi: &ParsedMidi,
        mut cfg: RenderConfig,
        bpm_override: Option<f64>,
    ) -> MidirollResult<Self> {
        cfg.sanitize();
        let bpm = effective_bpm(midi.bpm, bpm_override);

        let timing =
            TimingModel::new(bpm, cfg.pixels_per_second, cfg.fps, midi.ticks_per_quarter)?;
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let scene = Scene::build(&midi.notes, timing, &cfg, &mut rng)?;
        let model = AnimationModel::new(&cfg, &scene);

        cfg.log_summary();
        tracing::info!(
            bpm,
            ticks_per_quarter = midi.ticks_per_quarter,
            pixels_per_frame = timing.pixels_per_frame,
            notes = scene.notes.len(),
            frames = scene.frame_count(),
            "timing"
        );

        Ok(Self {
            source: source.as_ref().to_path_buf(),
            cfg,
            scene,
            model,
            rng,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.cfg
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn frame_count(&self) -> u64 {
        self.scene.frame_count()
    }

    /// Render one frame in isolation.
    pub fn render_frame(&mut self, index: FrameIndex) -> MidirollResult<GeneratedFrame> {
        if !self.scene.frame_range().contains(index) {
            return Err(MidirollError::validation(format!(
                "frame {} is outside 0..{}",
                index.0,
                self.frame_count()
            )));
        }
        let mut renderer = FrameRenderer::new(&self.cfg)?;
        renderer.render(index, &self.scene, &self.model, &mut self.rng)
    }

    /// Render every frame into a fresh frame directory, then optionally compile the video.
    #[tracing::instrument(skip_all, fields(source = %self.source.display()))]
    pub fn export(mut self, opts: &ExportOptions) -> MidirollResult<ExportReport> {
        let mut renderer = FrameRenderer::new(&self.cfg)?;
        let total = self.frame_count();

        let frames_dir = create_unique_dir(&frames_dir_for(&opts.out_dir, &self.source))?;
        tracing::info!(dir = %frames_dir.display(), frames = total, "writing frames");

        let encoder = Arc::new(PngSequenceEncoder::new(&frames_dir, total));
        let pipeline = ExportPipeline::start(encoder.clone(), opts.pipeline.clone())?;

        let produced = self.produce(&mut renderer, &pipeline, total);
        let finished = pipeline.finish();
        let stats = match (produced, finished) {
            (Ok(()), Ok(stats)) => stats,
            // An encoder failure is the cause of any producer-side disconnect.
            (_, Err(e)) => return Err(e),
            (Err(e), Ok(_)) => return Err(e),
        };
        tracing::info!(frames = stats.frames_encoded, "all frames written");

        let video = if opts.compile {
            self.compile(opts, &frames_dir, encoder.input_pattern())
        } else {
            VideoStatus::Skipped
        };

        Ok(ExportReport {
            frames_dir,
            frame_count: total,
            stats,
            video,
        })
    }

    fn produce(
        &mut self,
        renderer: &mut FrameRenderer,
        pipeline: &ExportPipeline,
        total: u64,
    ) -> MidirollResult<()> {
        let step = (total / PROGRESS_STEPS).max(1);
        for index in self.scene.frame_range().iter() {
            let frame = renderer.render(index, &self.scene, &self.model, &mut self.rng)?;
            pipeline.push(frame)?;
            if (index.0 + 1) % step == 0 || index.0 + 1 == total {
                tracing::info!("Generating frame {}/{}", index.0 + 1, total);
            }
        }
        Ok(())
    }

    fn compile(&self, opts: &ExportOptions, frames_dir: &Path, pattern: PathBuf) -> VideoStatus {
        let out_path = video_path_for(&opts.out_dir, &self.source);
        let vcfg = VideoCompileConfig {
            program: opts.ffmpeg.clone(),
            fps: self.cfg.fps,
            input_pattern: pattern,
            out_path: out_path.clone(),
        };

        match compile_video(&vcfg) {
            Ok(CompileOutcome::Success) => {
                tracing::info!(path = %out_path.display(), "video created");
                let frames_removed = !opts.keep_frames && remove_frames_dir(frames_dir);
                if opts.open_video
                    && let Err(e) = open_with_default_app(&out_path)
                {
                    tracing::warn!(error = %e, "could not open the video");
                }
                VideoStatus::Created {
                    path: out_path,
                    frames_removed,
                }
            }
            Ok(CompileOutcome::Failed { code, stderr_tail }) => {
                tracing::error!(
                    code = ?code,
                    frames = %frames_dir.display(),
                    "ffmpeg failed; frames have NOT been deleted"
                );
                VideoStatus::Failed {
                    code,
                    detail: stderr_tail,
                }
            }
            Ok(CompileOutcome::NotFound) => {
                tracing::error!(
                    frames = %frames_dir.display(),
                    "ffmpeg not found; install it and add it to PATH, frames have been saved"
                );
                VideoStatus::CompilerNotFound
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    frames = %frames_dir.display(),
                    "unexpected error during video compilation; frames have been saved"
                );
                VideoStatus::Failed {
                    code: None,
                    detail: e.to_string(),
                }
            }
        }
    }
}

/// `override` when it is a usable tempo, the file tempo otherwise.
pub fn effective_bpm(file_bpm: f64, bpm_override: Option<f64>) -> f64 {
    match bpm_override {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            tracing::warn!(value = v, file_bpm, "invalid tempo override, using the file tempo");
            file_bpm
        }
        None => file_bpm,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
