use crate::foundation::core::FrameIndex;

/// A rendered frame on its way to the encoder.
///
/// The encoder owns the image and drops it once the frame is persisted.
#[derive(Debug)]
pub struct GeneratedFrame {
    pub index: FrameIndex,
    pub image: image::RgbaImage,
}

impl GeneratedFrame {
    pub fn new(index: FrameIndex, image: image::RgbaImage) -> Self {
        Self { index, image }
    }
}
