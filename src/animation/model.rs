use rand::Rng;

use crate::animation::ease::SettleCurve;
use crate::animation::random::{normal_clamped, uniform_exclude_middle};
use crate::config::render::{RenderConfig, RotationMode, ShakeMode};
use crate::foundation::core::FrameIndex;
use crate::timing::mapper::{Note, Scene, TimingModel};

/// Where and how a note is drawn on one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NotePose {
    pub active: bool,
    pub screen_start_x: f64,
    pub screen_end_x: f64,
    /// Clockwise degrees in screen space, pivoting on the note's left edge.
    pub rotation_deg: f64,
    /// Vertical offset from the note row's centre line.
    pub y_offset: f64,
}

/// Per-frame activation, rotation and jitter of notes crossing the guideline.
#[derive(Clone, Debug)]
pub struct AnimationModel {
    timing: TimingModel,
    guideline_x: f64,
    note_height: f64,
    note_distance: f64,
    mid_pitch: i64,
    // Screen-space (clockwise) angle; the configured angle is counter-clockwise.
    rotation_angle: f64,
    rotation_mode: RotationMode,
    shake_mode: ShakeMode,
    shake_amplitude: f64,
    shake_variance: f64,
    shake_activation_px: f64,
    settle_frames: f64,
    settle_curve: SettleCurve,
}

impl AnimationModel {
    pub fn new(cfg: &RenderConfig, scene: &Scene) -> Self {
        Self {
            timing: scene.timing,
            guideline_x: f64::from(cfg.guideline_x),
            note_height: f64::from(cfg.note_height),
            note_distance: f64::from(cfg.note_distance),
            mid_pitch: scene.mid_pitch,
            rotation_angle: -cfg.rotation_angle,
            rotation_mode: cfg.rotation_mode,
            shake_mode: cfg.shake_mode,
            shake_amplitude: cfg.shake_amplitude,
            shake_variance: cfg.shake_variance,
            shake_activation_px: cfg.shake_activation_pixels(),
            settle_frames: cfg.return_to_center * f64::from(scene.timing.fps),
            settle_curve: cfg.settle_curve,
        }
    }

    pub fn offset_x(&self, frame: FrameIndex) -> f64 {
        self.timing.offset_x(frame)
    }

    /// The guideline lies within `[screen_start_x, screen_end_x)`.
    pub fn is_active(&self, frame: FrameIndex, note: &Note) -> bool {
        let offset_x = self.offset_x(frame);
        note.pixel_start_x <= offset_x && offset_x < note.pixel_end_x
    }

    /// Settle weight: 1 at activation, decaying to 0 over the return-to-center time.
    pub fn progress(&self, frame: FrameIndex, note: &Note) -> f64 {
        if self.settle_frames <= 0.0 {
            return 0.0;
        }
        let elapsed = frame.0 as f64 - note.start_frame as f64;
        self.settle_curve.apply(elapsed / self.settle_frames)
    }

    /// Pose of `note` at `frame`. Inactive notes draw no randomness.
    pub fn pose<R: Rng + ?Sized>(&self, frame: FrameIndex, note: &Note, rng: &mut R) -> NotePose {
        let offset_x = self.offset_x(frame);
        let screen_start_x = note.pixel_start_x - offset_x + self.guideline_x;
        let screen_end_x = note.pixel_end_x - offset_x + self.guideline_x;
        let spacing = (self.mid_pitch - i64::from(note.pitch)) as f64 * self.note_distance;

        if !self.is_active(frame, note) {
            return NotePose {
                active: false,
                screen_start_x,
                screen_end_x,
                rotation_deg: 0.0,
                y_offset: spacing,
            };
        }

        let progress = self.progress(frame, note);

        let swing = uniform_exclude_middle(rng, 1.0, 0.7);
        let rotation_deg = match self.rotation_mode {
            RotationMode::Dynamic => {
                progress * self.rotation_angle * swing * 50.0 * self.note_height / note.pixel_length
            }
            RotationMode::Fixed => progress * self.rotation_angle * swing,
        };

        let noise = normal_clamped(rng, self.shake_amplitude, self.shake_variance);
        let activation = match self.shake_mode {
            ShakeMode::Vibrate => {
                progress * self.shake_activation_px * uniform_exclude_middle(rng, 1.0, 0.7)
            }
            // Scales by the activation pixels twice; kept as the established look.
            ShakeMode::OneWay => {
                progress
                    * self.shake_activation_px
                    * note.unidirectional_shake
                    * self.shake_activation_px
            }
        };

        NotePose {
            active: true,
            screen_start_x,
            screen_end_x,
            rotation_deg,
            y_offset: spacing + noise + activation,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/model.rs"]
mod tests;
