use flameview_protocol::{InputEvent, Vec2};

use super::{Gesture, GestureContext, Reaction};

/// Horizontal scrolling, or vertical scrolling with the pan modifier held,
/// pans the view sideways.
#[derive(Debug, Default)]
pub struct ScrollPan;

impl Gesture for ScrollPan {
    fn handle(&mut self, event: &InputEvent, cx: &mut GestureContext<'_>) -> Option<Reaction> {
        let InputEvent::Scroll {
            delta, modifiers, ..
        } = *event
        else {
            return None;
        };
        let pan_modifier = cx.config.scroll_pan_modifier;
        let amount = if !pan_modifier.is_none() && modifiers.contains(pan_modifier) {
            if delta.x.abs() > delta.y.abs() {
                delta.x
            } else {
                delta.y
            }
        } else if delta.x.abs() > delta.y.abs() {
            delta.x
        } else {
            return None;
        };

        let screen = Vec2::new(amount * cx.config.pan_pixels_per_unit, 0.0);
        let user = cx.viewport.to_screen(cx.widget).delta_to_user(screen);
        tracing::trace!(amount, "scroll pan");
        Some(Reaction::viewport(cx.viewport.pan_by(-user.x, 0.0)))
    }
}

/// Vertical scrolling zooms about the pointer.
#[derive(Debug, Default)]
pub struct ScrollZoom;

impl Gesture for ScrollZoom {
    fn handle(&mut self, event: &InputEvent, cx: &mut GestureContext<'_>) -> Option<Reaction> {
        let InputEvent::Scroll {
            position, delta, ..
        } = *event
        else {
            return None;
        };
        if delta.y == 0.0 || !delta.y.is_finite() {
            return Some(Reaction::default());
        }
        let (a, b) = cx.config.zoom_factor_range;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        // max/min rather than clamp: a NaN bound is skipped instead of panicking.
        let factor = (1.0 - cx.config.scroll_zoom_per_unit * delta.y).max(lo).min(hi);
        if !factor.is_finite() || factor <= 0.0 {
            tracing::warn!(factor, "scroll zoom factor out of range, ignored");
            return Some(Reaction::default());
        }
        let center = cx.to_user(position);
        tracing::trace!(factor, x = center.x, y = center.y, "scroll zoom");
        Some(Reaction::viewport(cx.viewport.zoom_at(center, factor)))
    }
}
