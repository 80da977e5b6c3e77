//! Midiroll turns the notes of a MIDI file into a scrolling piano-roll video.
//!
//! # Pipeline overview
//!
//! 1. **Parse**: `path -> ParsedMidi` (notes in ticks, tempo, resolution)
//! 2. **Map**: `ParsedMidi + RenderConfig -> Scene` (pixel extents, rows and frame indices per
//!    note)
//! 3. **Animate**: `Scene + FrameIndex -> NotePose` (activation, settle rotation and jitter)
//! 4. **Render**: poses -> `GeneratedFrame` (CPU rasterization with `vello_cpu`)
//! 5. **Export**: frames flow through a bounded queue into a pool of PNG writers, then the
//!    system `ffmpeg` assembles the sequence into an MP4
//!
//! Randomness is drawn from an explicit generator; set [`RenderConfig::seed`] for reproducible
//! output.
#![forbid(unsafe_code)]

mod animation;
mod compile;
mod config;
mod encode;
mod foundation;
mod midi;
mod output;
mod render;
mod session;
mod timing;

pub use animation::ease::{SettleCurve, ease_out_cubic};
pub use animation::model::{AnimationModel, NotePose};
pub use animation::random::{normal_clamped, uniform, uniform_exclude_middle};
pub use compile::ffmpeg::{CompileOutcome, VideoCompileConfig, compile_video, ffmpeg_args};
pub use config::render::{ConfigOverrides, RenderConfig, RotationMode, ShakeMode};
pub use encode::pipeline::{ExportPipeline, PipelineOpts, PipelineStats};
pub use encode::png::{FrameEncoder, PngSequenceEncoder, frame_file_name, frame_pad_width};
pub use encode::queue::{
    DEFAULT_QUEUE_CAPACITY, FrameConsumer, FrameProducer, TryPushError, frame_queue,
};
pub use foundation::core::{Canvas, FrameIndex, FrameRange, Rgb8};
pub use foundation::error::{MidirollError, MidirollResult};
pub use midi::source::{
    DEFAULT_BPM, NoteEvent, ParsedMidi, note_name, parse_midi_bytes, parse_midi_file,
};
pub use output::paths::{
    create_unique_dir, frames_dir_for, open_with_default_app, remove_frames_dir, unique_path,
    video_path_for,
};
pub use render::cpu::FrameRenderer;
pub use render::frame::GeneratedFrame;
pub use session::export::{ExportJob, ExportOptions, ExportReport, VideoStatus, effective_bpm};
pub use timing::mapper::{Note, Scene, TimingModel};
