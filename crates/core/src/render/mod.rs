//! Draws the visible part of a [`Raster`] onto a widget-sized surface, plus
//! the transient hover label and rubber-band outline on top of it.
//!
//! Overlays are erased by re-blitting the pixels they covered ("damage")
//! from the raster rather than by redrawing the whole surface.

pub mod text;

use flameview_protocol::{Color, Point, Rect, Size, TextAlign};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::hit_test::hit_screen;
use crate::raster::Raster;
use crate::viewport::{ScreenTransform, Viewport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub background: Color,
    pub label_color: Color,
    pub label_background: Option<Color>,
    pub selection_color: Color,
    pub label_scale: u32,
    /// Padding around label text, in surface pixels.
    pub label_margin: u32,
    /// Draw the hover label onto the surface. Hosts with their own status
    /// line turn this off and show the returned text instead.
    pub overlay_labels: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xf8, 0xf8, 0xf8),
            label_color: Color::BLACK,
            label_background: Some(Color::rgba(0xff, 0xff, 0xe0, 0xe6)),
            selection_color: Color::rgb(0x1e, 0x64, 0xc8),
            label_scale: 1,
            label_margin: 2,
            overlay_labels: true,
        }
    }
}

/// Integer pixel rectangle on the surface, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn of_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// From signed half-open bounds; negative parts are cut off. `None` if
    /// nothing remains.
    pub fn from_bounds(x0: i64, y0: i64, x1: i64, y1: i64) -> Option<Self> {
        let clamp = |v: i64| v.clamp(0, i64::from(u32::MAX)) as u32;
        let (x0, y0, x1, y1) = (clamp(x0), clamp(y0), clamp(x1), clamp(y1));
        (x1 > x0 && y1 > y0).then(|| Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        (x1 > x0 && y1 > y0).then(|| Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Grow by `margin` on every side (never below zero).
    pub fn expand(&self, margin: u32) -> PixelRect {
        let x = self.x.saturating_sub(margin);
        let y = self.y.saturating_sub(margin);
        Self::new(
            x,
            y,
            self.right() + margin - x,
            self.bottom() + margin - y,
        )
    }
}

/// Source-over blend of `color` into `dst`.
pub(crate) fn blend(dst: &mut Rgba<u8>, color: Color) {
    match color.a {
        0 => {}
        255 => *dst = Rgba(color.to_array()),
        a => {
            let a = u16::from(a);
            let mix = |s: u8, d: u8| ((u16::from(s) * a + u16::from(d) * (255 - a)) / 255) as u8;
            let [r, g, b, da] = dst.0;
            *dst = Rgba([
                mix(color.r, r),
                mix(color.g, g),
                mix(color.b, b),
                da.max(color.a),
            ]);
        }
    }
}

fn fill(image: &mut RgbaImage, area: PixelRect, color: Color) {
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            blend(image.get_pixel_mut(x, y), color);
        }
    }
}

#[derive(Debug, Clone)]
struct Label {
    text: String,
    /// Label box including padding, clipped to the surface.
    bounds: PixelRect,
    text_origin: (i64, i64),
}

#[derive(Debug, Clone, Copy)]
struct Outline {
    user: Rect,
    pixels: PixelRect,
}

/// Widget-sized RGBA surface for one view.
#[derive(Debug)]
pub struct Renderer {
    surface: RgbaImage,
    config: RenderConfig,
    label: Option<Label>,
    selection: Option<Outline>,
}

impl Renderer {
    pub fn new(widget: Size, config: RenderConfig) -> Self {
        let surface = RgbaImage::from_pixel(
            widget.width,
            widget.height,
            Rgba(config.background.to_array()),
        );
        Self {
            surface,
            config,
            label: None,
            selection: None,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn size(&self) -> Size {
        Size::new(self.surface.width(), self.surface.height())
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// Text of the label currently shown, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_ref().map(|l| l.text.as_str())
    }

    /// Reallocate for a new widget size. The surface is blank until the
    /// next [`Renderer::redraw`]. Returns whether the size changed.
    pub fn resize(&mut self, widget: Size) -> bool {
        if widget == self.size() {
            return false;
        }
        tracing::debug!(width = widget.width, height = widget.height, "surface resized");
        *self = Self::new(widget, self.config.clone());
        true
    }

    /// Resample the viewport's current rectangle onto the whole surface.
    /// Drops the hover label; a visible selection is re-projected.
    pub fn redraw(&mut self, raster: &Raster, viewport: &Viewport) {
        self.label = None;
        let full = PixelRect::of_size(self.size());
        self.blit_region(raster, viewport, full);
        if let Some(outline) = self.selection {
            self.selection = None;
            self.draw_selection(raster, viewport, outline.user);
        }
    }

    /// Nearest-neighbor copy of the raster into `area` of the surface.
    pub fn blit_region(&mut self, raster: &Raster, viewport: &Viewport, area: PixelRect) {
        let Some(area) = area.intersect(&PixelRect::of_size(self.size())) else {
            return;
        };
        let tf = viewport.to_screen(self.size());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if let Some((col, row)) = raster.cell_at(tf.invert(center)) {
                    self.surface.put_pixel(x, y, Rgba(raster.display_pixel(col, row)));
                }
            }
        }
    }

    /// Erase the previous label and, when `screen` is over a real frame,
    /// show the new one. Returns the hovered frame's label text.
    pub fn hover(&mut self, raster: &Raster, viewport: &Viewport, screen: Point) -> Option<String> {
        self.clear_hover(raster, viewport);
        let frame = raster.resolve(hit_screen(raster, viewport, self.size(), screen))?;
        let text = frame.label();
        if self.config.overlay_labels {
            self.place_label(&text, screen);
            if let Some(area) = self.label.as_ref().map(|l| l.bounds) {
                self.paint_label(area);
            }
        }
        Some(text)
    }

    /// Erase the hover label, if any.
    pub fn clear_hover(&mut self, raster: &Raster, viewport: &Viewport) {
        if let Some(old) = self.label.take() {
            let damage = old.bounds.expand(self.config.label_margin);
            self.repair(raster, viewport, damage);
        }
    }

    /// Outline `rect` (user coordinates), replacing any previous outline.
    pub fn draw_selection(&mut self, raster: &Raster, viewport: &Viewport, rect: Rect) {
        self.clear_selection(raster, viewport);
        let tf = viewport.to_screen(self.size());
        let Some(pixels) = project(&tf, rect)
            .and_then(|p| p.intersect(&PixelRect::of_size(self.size())))
        else {
            return;
        };
        self.selection = Some(Outline { user: rect, pixels });
        self.paint_selection(pixels);
        // The label stays on top, repainted only where the outline crossed it.
        if self.label.is_some() {
            for edge in edges(pixels) {
                self.paint_label(edge);
            }
        }
    }

    pub fn clear_selection(&mut self, raster: &Raster, viewport: &Viewport) {
        if let Some(old) = self.selection.take() {
            for edge in edges(old.pixels) {
                self.repair(raster, viewport, edge);
            }
        }
    }

    /// Restore `area` from the raster, then repaint the overlays that are
    /// still current over it.
    fn repair(&mut self, raster: &Raster, viewport: &Viewport, area: PixelRect) {
        let Some(area) = area.intersect(&PixelRect::of_size(self.size())) else {
            return;
        };
        self.blit_region(raster, viewport, area);
        if let Some(outline) = self.selection
            && let Some(overlap) = outline.pixels.intersect(&area)
        {
            self.paint_selection(overlap);
        }
        if self.label.is_some() {
            self.paint_label(area);
        }
    }

    fn paint_selection(&mut self, clip: PixelRect) {
        let Some(outline) = self.selection else {
            return;
        };
        for edge in edges(outline.pixels) {
            if let Some(part) = edge.intersect(&clip) {
                fill(&mut self.surface, part, self.config.selection_color);
            }
        }
    }

    fn paint_label(&mut self, clip: PixelRect) {
        let Some(label) = &self.label else {
            return;
        };
        let Some(clip) = label.bounds.intersect(&clip) else {
            return;
        };
        if let Some(bg) = self.config.label_background {
            fill(&mut self.surface, clip, bg);
        }
        text::draw_text(
            &mut self.surface,
            label.text_origin,
            &label.text,
            self.config.label_scale,
            self.config.label_color,
            clip,
        );
    }

    fn place_label(&mut self, text: &str, pointer: Point) {
        let size = self.size();
        let (text_w, text_h) = text::measure(text, self.config.label_scale);
        let pad = i64::from(self.config.label_margin);
        let box_w = i64::from(text_w) + 2 * pad;
        let box_h = i64::from(text_h) + 2 * pad;
        let (surface_w, surface_h) = (i64::from(size.width), i64::from(size.height));

        let px = pointer.x as i64;
        let py = pointer.y as i64;
        let x = match alignment(pointer.x, size.width) {
            TextAlign::Left => px,
            TextAlign::Center => px - box_w / 2,
            TextAlign::Right => px - box_w,
        };
        // Above the pointer, or below it when there is no room.
        let y = if py - box_h - pad >= 0 {
            py - box_h - pad
        } else {
            py + pad + 1
        };
        let x = x.min(surface_w - box_w).max(0);
        let y = y.min(surface_h - box_h).max(0);

        let Some(bounds) = PixelRect::from_bounds(x, y, x + box_w, y + box_h)
            .and_then(|b| b.intersect(&PixelRect::of_size(size)))
        else {
            return;
        };
        self.label = Some(Label {
            text: text.to_owned(),
            bounds,
            text_origin: (x + pad, y + pad),
        });
    }
}

/// Left, middle and right thirds of the widget align labels left, centred
/// and right of the pointer.
fn alignment(x: f64, width: u32) -> TextAlign {
    let third = f64::from(width) / 3.0;
    if x < third {
        TextAlign::Left
    } else if x < 2.0 * third {
        TextAlign::Center
    } else {
        TextAlign::Right
    }
}

fn project(tf: &ScreenTransform, rect: Rect) -> Option<PixelRect> {
    let a = tf.apply(Point::new(rect.x, rect.y));
    let b = tf.apply(Point::new(rect.right(), rect.top()));
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    PixelRect::from_bounds(
        a.x.min(b.x).floor() as i64,
        a.y.min(b.y).floor() as i64,
        a.x.max(b.x).ceil() as i64,
        a.y.max(b.y).ceil() as i64,
    )
}

/// One-pixel border strips of `r`. No pixel belongs to two strips; strips
/// that do not exist for a thin `r` are empty.
fn edges(r: PixelRect) -> [PixelRect; 4] {
    let inner = r.height.saturating_sub(2);
    [
        PixelRect::new(r.x, r.y, r.width, r.height.min(1)),
        PixelRect::new(r.x, r.bottom().saturating_sub(1), r.width, u32::from(r.height > 1)),
        PixelRect::new(r.x, r.y + 1, r.width.min(1), inner),
        PixelRect::new(r.right().saturating_sub(1), r.y + 1, u32::from(r.width > 1), inner),
    ]
}
