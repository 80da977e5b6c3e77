use rand::Rng;

use crate::animation::random::uniform_exclude_middle;
use crate::config::render::RenderConfig;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{MidirollError, MidirollResult};
use crate::midi::source::NoteEvent;

/// Tick/pixel/frame conversion factors for a constant tempo and scroll speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingModel {
    pub bpm: f64,
    pub ticks_per_quarter: u16,
    pub fps: u32,
    pub pixels_per_second: f64,
    pub pixels_per_frame: f64,
    pub pixels_per_beat: f64,
    pub pixels_per_tick: f64,
}

impl TimingModel {
    pub fn new(
        bpm: f64,
        pixels_per_second: f64,
        fps: u32,
        ticks_per_quarter: u16,
    ) -> MidirollResult<Self> {
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(MidirollError::validation("bpm must be finite and > 0"));
        }
        if !(pixels_per_second.is_finite() && pixels_per_second > 0.0) {
            return Err(MidirollError::validation(
                "scroll speed must be finite and > 0",
            ));
        }
        if fps == 0 {
            return Err(MidirollError::validation("fps must be non-zero"));
        }
        if ticks_per_quarter == 0 {
            return Err(MidirollError::validation(
                "ticks per quarter note must be non-zero",
            ));
        }

        let pixels_per_frame = pixels_per_second / f64::from(fps);
        let pixels_per_beat = pixels_per_second * 60.0 / bpm;
        let pixels_per_tick = pixels_per_beat / f64::from(ticks_per_quarter);
        Ok(Self {
            bpm,
            ticks_per_quarter,
            fps,
            pixels_per_second,
            pixels_per_frame,
            pixels_per_beat,
            pixels_per_tick,
        })
    }

    /// Horizontal scroll distance at `frame`.
    pub fn offset_x(&self, frame: FrameIndex) -> f64 {
        self.pixels_per_frame * frame.0 as f64
    }

    pub fn ticks_to_secs(&self, ticks: u64) -> f64 {
        60.0 * ticks as f64 / (self.bpm * f64::from(self.ticks_per_quarter))
    }

    /// Frame at which a tick position reaches the guideline, truncated.
    pub fn tick_to_frame(&self, tick: u64) -> u64 {
        (tick as f64 * self.pixels_per_tick / self.pixels_per_frame) as u64
    }
}

/// A note annotated with its pixel- and frame-domain coordinates.
///
/// Derived fields are written once by [`Scene::build`] and read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub start: u64,
    pub end: u64,
    pub pitch: u8,
    pub name: String,
    pub pixel_start_x: f64,
    pub pixel_end_x: f64,
    pub pixel_length: f64,
    /// Top edge of the note row on screen.
    pub pixel_y: i64,
    pub start_frame: u64,
    pub end_frame: u64,
    /// Per-note direction for one-way shake, in `(-1,-0.7] U [0.7,1)`.
    pub unidirectional_shake: f64,
}

/// Annotated notes plus the frame budget of a run.
#[derive(Clone, Debug)]
pub struct Scene {
    pub notes: Vec<Note>,
    pub timing: TimingModel,
    /// `(min_pitch + max_pitch) / 2`, integer division.
    pub mid_pitch: i64,
    /// Frames covering the music itself.
    pub content_frames: u64,
    /// Extra frames so the last note scrolls past the guideline.
    pub lead_out_frames: u64,
}

impl Scene {
    #[tracing::instrument(skip_all, fields(events = events.len()))]
    pub fn build<R: Rng + ?Sized>(
        events: &[NoteEvent],
        timing: TimingModel,
        cfg: &RenderConfig,
        rng: &mut R,
    ) -> MidirollResult<Self> {
        let usable: Vec<&NoteEvent> = events
            .iter()
            .filter(|e| {
                let ok = e.end > e.start;
                if !ok {
                    tracing::warn!(
                        start = e.start,
                        end = e.end,
                        pitch = e.pitch,
                        "skipping note with non-positive length"
                    );
                }
                ok
            })
            .collect();

        let (Some(min_pitch), Some(max_pitch), Some(last_end)) = (
            usable.iter().map(|e| i64::from(e.pitch)).min(),
            usable.iter().map(|e| i64::from(e.pitch)).max(),
            usable.iter().map(|e| e.end).max(),
        ) else {
            return Err(MidirollError::empty_input("note list is empty"));
        };

        let mid_pitch = (min_pitch + max_pitch) / 2;
        let canvas_h = i64::from(cfg.canvas.height);
        let note_h = i64::from(cfg.note_height);

        let notes = usable
            .into_iter()
            .map(|e| {
                let pixel_start_x = e.start as f64 * timing.pixels_per_tick;
                let pixel_length = (e.end - e.start) as f64 * timing.pixels_per_tick;
                Note {
                    start: e.start,
                    end: e.end,
                    pitch: e.pitch,
                    name: e.name.clone(),
                    pixel_start_x,
                    pixel_end_x: pixel_start_x + pixel_length,
                    pixel_length,
                    pixel_y: canvas_h / 2 + (mid_pitch - i64::from(e.pitch)) * note_h - note_h / 2,
                    start_frame: timing.tick_to_frame(e.start),
                    end_frame: timing.tick_to_frame(e.end),
                    unidirectional_shake: uniform_exclude_middle(rng, 1.0, 0.7),
                }
            })
            .collect::<Vec<_>>();

        let fps = f64::from(timing.fps);
        let content_frames = (timing.ticks_to_secs(last_end) * fps).ceil() as u64;
        let lead_out_frames = (f64::from(cfg.guideline_x) / timing.pixels_per_frame)
            .ceil()
            .max(0.0) as u64
            + u64::from(timing.fps / 2);

        tracing::debug!(
            notes = notes.len(),
            mid_pitch,
            pixels_per_frame = timing.pixels_per_frame,
            pixels_per_tick = timing.pixels_per_tick,
            content_frames,
            lead_out_frames,
            "scene annotated"
        );

        Ok(Self {
            notes,
            timing,
            mid_pitch,
            content_frames,
            lead_out_frames,
        })
    }

    /// Every frame to render; the upper bound `content + lead_out` is included.
    pub fn frame_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.content_frames + self.lead_out_frames + 1),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_range().len_frames()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/mapper.rs"]
mod tests;
