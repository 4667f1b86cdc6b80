//! Zoom region and the user ↔ screen mapping.
//!
//! User coordinates are image pixels: x runs along samples, y runs along
//! depth with the outermost frames at y = 0 and y growing upward. Screen
//! coordinates are widget pixels with the origin top-left.

use flameview_protocol::{Point, Rect, Size, Vec2};

/// Smallest width or height `current` may shrink to.
pub const MIN_EXTENT: f64 = 1e-6;

/// Affine map from user to screen coordinates (flipped on y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    sx: f64,
    sy: f64,
    tx: f64,
    ty: f64,
}

impl ScreenTransform {
    pub fn apply(&self, user: Point) -> Point {
        Point::new(user.x * self.sx + self.tx, user.y * self.sy + self.ty)
    }

    pub fn invert(&self, screen: Point) -> Point {
        Point::new((screen.x - self.tx) / self.sx, (screen.y - self.ty) / self.sy)
    }

    /// Screen pixels per user unit on each axis.
    pub fn scale(&self) -> Vec2 {
        Vec2::new(self.sx.abs(), self.sy.abs())
    }

    /// Convert a screen-space displacement into user units.
    pub fn delta_to_user(&self, delta: Vec2) -> Vec2 {
        Vec2::new(delta.x / self.sx, delta.y / self.sy)
    }
}

/// The full data extent and the currently visible sub-rectangle.
///
/// `current` is only reachable through the mutators below, each of which
/// keeps it inside `full` with strictly positive size.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    full: Rect,
    current: Rect,
}

impl Viewport {
    /// `None` if `full` is degenerate or not finite.
    pub fn new(full: Rect) -> Option<Self> {
        if !full.is_finite() || full.w < MIN_EXTENT || full.h < MIN_EXTENT {
            return None;
        }
        Some(Self {
            full,
            current: full,
        })
    }

    pub fn full(&self) -> Rect {
        self.full
    }

    pub fn current(&self) -> Rect {
        self.current
    }

    /// Horizontal magnification relative to the full extent.
    pub fn zoom_level(&self) -> f64 {
        self.full.w / self.current.w
    }

    /// Replace `current` with `rect ∩ full`. Returns whether `current`
    /// changed; a degenerate intersection leaves it untouched.
    pub fn set_current(&mut self, rect: Rect) -> bool {
        let Some(clamped) = self.clamp(rect) else {
            tracing::trace!(?rect, "ignored degenerate viewport rectangle");
            return false;
        };
        self.replace(clamped)
    }

    /// Scale `current` about `center` (user coordinates). `factor < 1` zooms
    /// in. The point under `center` keeps its screen position unless the
    /// result has to be clamped.
    pub fn zoom_at(&mut self, center: Point, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 || !center.is_finite() {
            return false;
        }
        self.set_current(self.current.scale_about(center, factor))
    }

    /// Translate `current` by `(dx, dy)` user units. Panning stops at the
    /// edges of `full` without shrinking the view.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        let moved = self.current.translate(dx, dy);
        let x = moved.x.clamp(self.full.x, (self.full.right() - moved.w).max(self.full.x));
        let y = moved.y.clamp(self.full.y, (self.full.top() - moved.h).max(self.full.y));
        self.set_current(Rect::new(x, y, moved.w, moved.h))
    }

    pub fn reset(&mut self) -> bool {
        self.replace(self.full)
    }

    /// Mapping of `current` onto a widget of `widget` pixels.
    pub fn to_screen(&self, widget: Size) -> ScreenTransform {
        let w = f64::from(widget.width.max(1));
        let h = f64::from(widget.height.max(1));
        let sx = w / self.current.w;
        let sy = -h / self.current.h;
        ScreenTransform {
            sx,
            sy,
            tx: -self.current.x * sx,
            ty: -self.current.top() * sy,
        }
    }

    pub fn to_user(&self, widget: Size, screen: Point) -> Point {
        self.to_screen(widget).invert(screen)
    }

    fn clamp(&self, rect: Rect) -> Option<Rect> {
        if !rect.is_finite() {
            return None;
        }
        rect.intersect(&self.full)
            .filter(|r| r.w >= MIN_EXTENT && r.h >= MIN_EXTENT)
    }

    fn replace(&mut self, rect: Rect) -> bool {
        if rect == self.current {
            return false;
        }
        tracing::debug!(
            x = rect.x,
            y = rect.y,
            w = rect.w,
            h = rect.h,
            "viewport changed"
        );
        self.current = rect;
        true
    }
}
