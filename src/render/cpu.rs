use rand::Rng;

use crate::animation::model::{AnimationModel, NotePose};
use crate::config::render::RenderConfig;
use crate::foundation::core::{Affine, FrameIndex, Rgb8, Vec2};
use crate::foundation::error::{MidirollError, MidirollResult};
use crate::render::frame::GeneratedFrame;
use crate::timing::mapper::{Note, Scene};

/// Rasterizes piano-roll frames on the CPU with `vello_cpu`.
///
/// The render context and target pixmap are reused across frames of the same size.
pub struct FrameRenderer {
    width: u16,
    height: u16,
    note_height: i64,
    guideline_x: i32,
    guideline_width: u32,
    active: Rgb8,
    inactive: Rgb8,
    background: Rgb8,
    guideline: Rgb8,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: vello_cpu::Pixmap,
}

impl FrameRenderer {
    pub fn new(cfg: &RenderConfig) -> MidirollResult<Self> {
        let width: u16 = cfg
            .canvas
            .width
            .try_into()
            .map_err(|_| MidirollError::validation("canvas width exceeds u16"))?;
        let height: u16 = cfg
            .canvas
            .height
            .try_into()
            .map_err(|_| MidirollError::validation("canvas height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(MidirollError::validation("canvas size must be non-zero"));
        }

        Ok(Self {
            width,
            height,
            note_height: i64::from(cfg.note_height),
            guideline_x: cfg.guideline_x,
            guideline_width: cfg.guideline_width,
            active: cfg.active_color,
            inactive: cfg.inactive_color,
            background: cfg.background_color,
            guideline: cfg.guideline_color,
            ctx: None,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// Draw `frame`, consuming randomness for every active note in scene order.
    pub fn render<R: Rng + ?Sized>(
        &mut self,
        frame: FrameIndex,
        scene: &Scene,
        model: &AnimationModel,
        rng: &mut R,
    ) -> MidirollResult<GeneratedFrame> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) => ctx,
            None => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        // `render_to_pixmap` overwrites every pixel, so the backdrop is the first fill.
        self.draw_background(&mut ctx);

        let width = f64::from(self.width);
        for note in &scene.notes {
            let pose = model.pose(frame, note, rng);
            if pose.screen_start_x > width || pose.screen_end_x < 0.0 {
                continue;
            }
            self.draw_note(&mut ctx, note, &pose);
        }
        self.draw_guideline(&mut ctx);

        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        self.ctx = Some(ctx);

        let image = image::RgbaImage::from_raw(
            u32::from(self.width),
            u32::from(self.height),
            self.pixmap.data_as_u8_slice().to_vec(),
        )
        .ok_or_else(|| MidirollError::validation("rendered pixmap has unexpected size"))?;

        Ok(GeneratedFrame::new(frame, image))
    }

    fn draw_background(&self, ctx: &mut vello_cpu::RenderContext) {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            self.background.r,
            self.background.g,
            self.background.b,
            255,
        ));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    fn draw_note(&self, ctx: &mut vello_cpu::RenderContext, note: &Note, pose: &NotePose) {
        let half = self.note_height / 2;
        // Pivot on the left edge at the row's centre line.
        let pivot = Vec2::new(pose.screen_start_x, (note.pixel_y + half) as f64);
        let transform = Affine::translate(pivot) * Affine::rotate(pose.rotation_deg.to_radians());

        let color = if pose.active { self.active } else { self.inactive };
        let top = (-half) as f64 + pose.y_offset;

        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            top,
            note.pixel_length,
            top + self.note_height as f64,
        ));
    }

    fn draw_guideline(&self, ctx: &mut vello_cpu::RenderContext) {
        if self.guideline_width == 0 {
            return;
        }
        let x0 = f64::from(self.guideline_x) - f64::from(self.guideline_width) + 1.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            self.guideline.r,
            self.guideline.g,
            self.guideline.b,
            255,
        ));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            x0,
            0.0,
            x0 + f64::from(self.guideline_width),
            f64::from(self.height),
        ));
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
