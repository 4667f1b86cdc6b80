//! Presents a viewer surface as an egui texture.

use egui::{Color32, ColorImage, Rect, TextureHandle, TextureOptions, pos2};
use flameview_protocol::Size;
use image::RgbaImage;

/// Widget size in whole surface pixels for a rect in points.
pub fn widget_size(rect: Rect) -> Size {
    let w = rect.width().max(0.0).floor() as u32;
    let h = rect.height().max(0.0).floor() as u32;
    Size::new(w, h)
}

fn color_image(surface: &RgbaImage) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [surface.width() as usize, surface.height() as usize],
        surface.as_raw(),
    )
}

/// The uploaded copy of one view's surface.
#[derive(Default)]
pub struct SurfaceTexture {
    texture: Option<TextureHandle>,
}

impl SurfaceTexture {
    /// Upload `surface` when it changed or was never uploaded.
    pub fn update(&mut self, ctx: &egui::Context, surface: &RgbaImage, changed: bool) {
        if surface.width() == 0 || surface.height() == 0 {
            self.texture = None;
            return;
        }
        let size = [surface.width() as usize, surface.height() as usize];
        match &mut self.texture {
            Some(texture) => {
                if changed || texture.size() != size {
                    texture.set(color_image(surface), TextureOptions::NEAREST);
                }
            }
            None => {
                self.texture = Some(ctx.load_texture(
                    "flame_surface",
                    color_image(surface),
                    TextureOptions::NEAREST,
                ));
            }
        }
    }

    /// Draw the texture at one texel per point from the top-left of `rect`.
    pub fn paint(&self, painter: &egui::Painter, rect: Rect) {
        let Some(texture) = &self.texture else {
            return;
        };
        let [w, h] = texture.size();
        let target = Rect::from_min_size(rect.min, egui::vec2(w as f32, h as f32));
        painter.image(
            texture.id(),
            target,
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }
}
