use std::path::PathBuf;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MidirollError, MidirollResult};
use crate::render::frame::GeneratedFrame;

/// Persists one frame. Called concurrently from the encoder pool.
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: GeneratedFrame) -> MidirollResult<()>;
}

/// Digits needed so lexical file order equals frame order (at least 2).
pub fn frame_pad_width(total_frames: u64) -> usize {
    total_frames.to_string().len().max(2)
}

/// `frame_file_name(FrameIndex(7), 1234) == "0007.png"`.
pub fn frame_file_name(index: FrameIndex, total_frames: u64) -> String {
    format!("{:0width$}.png", index.0, width = frame_pad_width(total_frames))
}

/// Writes `{index:0N}.png` files into one directory.
#[derive(Clone, Debug)]
pub struct PngSequenceEncoder {
    dir: PathBuf,
    total_frames: u64,
}

impl PngSequenceEncoder {
    pub fn new(dir: impl Into<PathBuf>, total_frames: u64) -> Self {
        Self {
            dir: dir.into(),
            total_frames,
        }
    }

    pub fn pad_width(&self) -> usize {
        frame_pad_width(self.total_frames)
    }

    pub fn path_for(&self, index: FrameIndex) -> PathBuf {
        self.dir.join(frame_file_name(index, self.total_frames))
    }

    /// printf-style input pattern for ffmpeg's image2 demuxer.
    pub fn input_pattern(&self) -> PathBuf {
        self.dir.join(format!("%0{}d.png", self.pad_width()))
    }
}

impl FrameEncoder for PngSequenceEncoder {
    fn encode(&self, frame: GeneratedFrame) -> MidirollResult<()> {
        let path = self.path_for(frame.index);
        frame
            .image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| {
                MidirollError::encode(format!("failed to write '{}': {e}", path.display()))
            })?;
        tracing::trace!(frame = frame.index.0, path = %path.display(), "frame written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
