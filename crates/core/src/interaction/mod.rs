//! Pointer and scroll gestures that drive the [`Viewport`].
//!
//! Each gesture is a small state machine over [`InputEvent`]s. The
//! [`Controller`] routes every event to at most one of them: while a drag
//! gesture is in progress it owns all input until its button is released or
//! pointer capture is lost.

mod click;
mod drag_pan;
mod rubber_band;
mod scroll;

use flameview_protocol::{InputEvent, Modifiers, Point, PointerButton, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

pub use click::ClickRecognizer;
pub use drag_pan::DragPan;
pub use rubber_band::RubberBand;
pub use scroll::{ScrollPan, ScrollZoom};

/// A pointer button plus the exact set of modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBinding {
    pub button: PointerButton,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl ButtonBinding {
    pub const fn new(button: PointerButton, modifiers: Modifiers) -> Self {
        Self { button, modifiers }
    }

    pub fn matches(&self, button: PointerButton, modifiers: Modifiers) -> bool {
        self.button == button && self.modifiers == modifiers
    }
}

/// Which input drives which gesture, and how strongly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub rubber_band: ButtonBinding,
    pub drag_pan: Vec<ButtonBinding>,
    /// Zoom factor per unit of vertical scroll: `factor = 1 - k * dy`.
    pub scroll_zoom_per_unit: f64,
    /// Per-event bounds on the scroll zoom factor.
    pub zoom_factor_range: (f64, f64),
    /// Held modifier that turns vertical scrolling into panning.
    pub scroll_pan_modifier: Modifiers,
    /// Screen pixels panned per unit of scroll.
    pub pan_pixels_per_unit: f64,
    /// Drags shorter than this (screen pixels) on both axes count as clicks.
    /// A band short on one axis only keeps the current extent on that axis.
    pub min_drag_pixels: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            rubber_band: ButtonBinding::new(PointerButton::Primary, Modifiers::NONE),
            drag_pan: vec![
                ButtonBinding::new(PointerButton::Middle, Modifiers::NONE),
                ButtonBinding::new(PointerButton::Primary, Modifiers::SHIFT),
            ],
            scroll_zoom_per_unit: 0.004,
            zoom_factor_range: (0.5, 2.0),
            scroll_pan_modifier: Modifiers::SHIFT,
            pan_pixels_per_unit: 1.0,
            min_drag_pixels: 4.0,
        }
    }
}

impl InteractionConfig {
    /// Reject values the gestures cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        let (lo, hi) = self.zoom_factor_range;
        if !lo.is_finite() || !hi.is_finite() || lo <= 0.0 || lo > hi {
            return Err(format!(
                "zoom_factor_range must be 0 < min <= max, got [{lo}, {hi}]"
            ));
        }
        for (name, value) in [
            ("scroll_zoom_per_unit", self.scroll_zoom_per_unit),
            ("pan_pixels_per_unit", self.pan_pixels_per_unit),
            ("min_drag_pixels", self.min_drag_pixels),
        ] {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        if self.min_drag_pixels < 0.0 {
            return Err(format!(
                "min_drag_pixels must not be negative, got {}",
                self.min_drag_pixels
            ));
        }
        Ok(())
    }
}

/// A press/release pair with negligible movement, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub button: PointerButton,
    pub position: Point,
}

/// Transient rubber-band outline update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Selection {
    #[default]
    Unchanged,
    /// Outline this rectangle (user coordinates).
    Show(Rect),
    Clear,
}

/// Outcome of one event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reaction {
    pub viewport_changed: bool,
    pub selection: Selection,
    pub click: Option<Click>,
}

impl Reaction {
    pub(crate) fn viewport(changed: bool) -> Self {
        Self {
            viewport_changed: changed,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    RubberBand,
    DragPan,
    Click,
}

/// What a gesture sees while handling one event.
pub struct GestureContext<'a> {
    pub viewport: &'a mut Viewport,
    pub widget: Size,
    pub config: &'a InteractionConfig,
}

impl GestureContext<'_> {
    pub fn to_user(&self, screen: Point) -> Point {
        self.viewport.to_user(self.widget, screen)
    }
}

/// One gesture state machine.
pub trait Gesture {
    /// `None` when the event is not for this gesture.
    fn handle(&mut self, event: &InputEvent, cx: &mut GestureContext<'_>) -> Option<Reaction>;

    /// Mid-gesture (between press and release).
    fn is_active(&self) -> bool {
        false
    }

    /// Drop any in-progress state.
    fn reset(&mut self) {}
}

/// Routes host input to the gesture handlers.
#[derive(Debug)]
pub struct Controller {
    config: InteractionConfig,
    rubber_band: RubberBand,
    drag_pan: DragPan,
    click: ClickRecognizer,
    scroll_pan: ScrollPan,
    scroll_zoom: ScrollZoom,
}

impl Controller {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            rubber_band: RubberBand::default(),
            drag_pan: DragPan::default(),
            click: ClickRecognizer::default(),
            scroll_pan: ScrollPan,
            scroll_zoom: ScrollZoom,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn active_gesture(&self) -> Option<GestureKind> {
        if self.rubber_band.is_active() {
            Some(GestureKind::RubberBand)
        } else if self.drag_pan.is_active() {
            Some(GestureKind::DragPan)
        } else if self.click.is_active() {
            Some(GestureKind::Click)
        } else {
            None
        }
    }

    /// Abandon the gesture in progress, if any.
    pub fn cancel(&mut self) -> Reaction {
        let had_selection = self.rubber_band.is_active();
        if let Some(kind) = self.active_gesture() {
            tracing::trace!(?kind, "gesture cancelled");
        }
        self.rubber_band.reset();
        self.drag_pan.reset();
        self.click.reset();
        Reaction {
            selection: if had_selection {
                Selection::Clear
            } else {
                Selection::Unchanged
            },
            ..Reaction::default()
        }
    }

    pub fn handle(&mut self, event: &InputEvent, viewport: &mut Viewport, widget: Size) -> Reaction {
        if matches!(event, InputEvent::PointerLost) {
            return self.cancel();
        }

        let mut cx = GestureContext {
            viewport,
            widget,
            config: &self.config,
        };
        let mut handlers: [&mut dyn Gesture; 5] = [
            &mut self.rubber_band,
            &mut self.drag_pan,
            &mut self.click,
            &mut self.scroll_pan,
            &mut self.scroll_zoom,
        ];

        if let Some(active) = handlers.iter_mut().find(|h| h.is_active()) {
            return active.handle(event, &mut cx).unwrap_or_default();
        }
        for handler in handlers {
            if let Some(reaction) = handler.handle(event, &mut cx) {
                return reaction;
            }
        }
        Reaction::default()
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flameview_protocol::Vec2;

    fn setup() -> (Controller, Viewport, Size) {
        let vp = Viewport::new(Rect::new(0.0, 0.0, 800.0, 600.0)).unwrap();
        (Controller::default(), vp, Size::new(800, 600))
    }

    fn press(button: PointerButton, x: f64, y: f64) -> InputEvent {
        InputEvent::Press {
            button,
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    fn release(button: PointerButton, x: f64, y: f64) -> InputEvent {
        InputEvent::Release {
            button,
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    fn motion(x: f64, y: f64) -> InputEvent {
        InputEvent::Motion {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    fn scroll(x: f64, y: f64, dy: f64) -> InputEvent {
        InputEvent::Scroll {
            position: Point::new(x, y),
            delta: Vec2::new(0.0, dy),
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn rubber_band_zooms_to_spanned_rect() {
        let (mut c, mut vp, w) = setup();
        c.handle(&press(PointerButton::Primary, 100.0, 100.0), &mut vp, w);
        let r = c.handle(&motion(300.0, 200.0), &mut vp, w);
        assert_eq!(
            r.selection,
            Selection::Show(Rect::new(100.0, 400.0, 200.0, 100.0))
        );
        let r = c.handle(&release(PointerButton::Primary, 300.0, 200.0), &mut vp, w);
        assert!(r.viewport_changed);
        assert_eq!(r.selection, Selection::Clear);
        assert_eq!(vp.current(), Rect::new(100.0, 400.0, 200.0, 100.0));
        assert_eq!(c.active_gesture(), None);
    }

    #[test]
    fn tiny_rubber_band_is_a_click() {
        let (mut c, mut vp, w) = setup();
        c.handle(&press(PointerButton::Primary, 10.0, 10.0), &mut vp, w);
        c.handle(&motion(12.0, 11.0), &mut vp, w);
        let r = c.handle(&release(PointerButton::Primary, 12.0, 11.0), &mut vp, w);
        assert!(!r.viewport_changed);
        assert_eq!(vp.current(), vp.full());
        assert_eq!(
            r.click,
            Some(Click {
                button: PointerButton::Primary,
                position: Point::new(12.0, 11.0)
            })
        );
    }

    #[test]
    fn drag_pan_moves_content_with_pointer() {
        let (mut c, mut vp, w) = setup();
        vp.set_current(Rect::new(200.0, 150.0, 400.0, 300.0));
        c.handle(&press(PointerButton::Middle, 400.0, 300.0), &mut vp, w);
        assert_eq!(c.active_gesture(), Some(GestureKind::DragPan));
        // 2 screen px per user unit: dragging right by 100 px shows 50 units further left.
        let r = c.handle(&motion(500.0, 300.0), &mut vp, w);
        assert!(r.viewport_changed);
        assert_eq!(vp.current(), Rect::new(150.0, 150.0, 400.0, 300.0));
        // Dragging down shows content further up.
        c.handle(&motion(500.0, 400.0), &mut vp, w);
        assert_eq!(vp.current(), Rect::new(150.0, 200.0, 400.0, 300.0));
        c.handle(&release(PointerButton::Middle, 500.0, 400.0), &mut vp, w);
        assert_eq!(c.active_gesture(), None);
    }

    #[test]
    fn shift_primary_drag_pans() {
        let (mut c, mut vp, w) = setup();
        vp.set_current(Rect::new(200.0, 150.0, 400.0, 300.0));
        let ev = InputEvent::Press {
            button: PointerButton::Primary,
            position: Point::new(10.0, 10.0),
            modifiers: Modifiers::SHIFT,
        };
        c.handle(&ev, &mut vp, w);
        assert_eq!(c.active_gesture(), Some(GestureKind::DragPan));
    }

    #[test]
    fn scroll_up_zooms_in_at_pointer() {
        let (mut c, mut vp, w) = setup();
        let r = c.handle(&scroll(400.0, 300.0, 50.0), &mut vp, w);
        assert!(r.viewport_changed);
        let cur = vp.current();
        assert!((cur.w - 640.0).abs() < 1e-9, "{cur:?}");
        assert!((cur.center().x - 400.0).abs() < 1e-9);
    }

    #[test]
    fn scroll_zoom_factor_is_clamped() {
        let (mut c, mut vp, w) = setup();
        c.handle(&scroll(400.0, 300.0, 10_000.0), &mut vp, w);
        assert!((vp.current().w - 400.0).abs() < 1e-9);
    }

    #[test]
    fn inverted_zoom_range_still_clamps() {
        let config = InteractionConfig {
            zoom_factor_range: (2.0, 0.5),
            ..InteractionConfig::default()
        };
        let mut c = Controller::new(config);
        let (_, mut vp, w) = setup();
        let r = c.handle(&scroll(400.0, 300.0, 10_000.0), &mut vp, w);
        assert!(r.viewport_changed);
        assert!((vp.current().w - 400.0).abs() < 1e-9);
    }

    #[test]
    fn nan_zoom_range_is_harmless() {
        let config = InteractionConfig {
            zoom_factor_range: (f64::NAN, f64::NAN),
            ..InteractionConfig::default()
        };
        let mut c = Controller::new(config);
        let (_, mut vp, w) = setup();
        let r = c.handle(&scroll(400.0, 300.0, 10_000.0), &mut vp, w);
        assert!(!r.viewport_changed);
        assert_eq!(vp.current(), vp.full());
    }

    #[test]
    fn default_interaction_config_is_valid() {
        assert_eq!(InteractionConfig::default().validate(), Ok(()));
        let bad = InteractionConfig {
            min_drag_pixels: -1.0,
            ..InteractionConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn wide_flat_band_selects_a_horizontal_range() {
        let (mut c, mut vp, w) = setup();
        vp.set_current(Rect::new(0.0, 100.0, 800.0, 400.0));
        c.handle(&press(PointerButton::Primary, 10.0, 300.0), &mut vp, w);
        let r = c.handle(&motion(500.0, 302.0), &mut vp, w);
        assert!(
            matches!(
                r.selection,
                Selection::Show(s) if (s.y - 100.0).abs() < 1e-9 && (s.h - 400.0).abs() < 1e-9
            ),
            "{:?}",
            r.selection
        );

        let r = c.handle(&release(PointerButton::Primary, 500.0, 302.0), &mut vp, w);
        assert_eq!(r.click, None);
        assert!(r.viewport_changed);
        let cur = vp.current();
        assert!((cur.x - 10.0).abs() < 1e-9, "{cur:?}");
        assert!((cur.w - 490.0).abs() < 1e-9, "{cur:?}");
        assert!((cur.y - 100.0).abs() < 1e-9 && (cur.h - 400.0).abs() < 1e-9, "{cur:?}");
    }

    #[test]
    fn tall_narrow_band_selects_a_depth_range() {
        let (mut c, mut vp, w) = setup();
        c.handle(&press(PointerButton::Primary, 200.0, 100.0), &mut vp, w);
        let r = c.handle(&release(PointerButton::Primary, 201.0, 400.0), &mut vp, w);
        assert_eq!(r.click, None);
        let cur = vp.current();
        assert_eq!((cur.x, cur.w), (0.0, 800.0));
        assert!((cur.y - 200.0).abs() < 1e-9 && (cur.h - 300.0).abs() < 1e-9, "{cur:?}");
    }

    #[test]
    fn shift_scroll_pans_horizontally() {
        let (mut c, mut vp, w) = setup();
        vp.set_current(Rect::new(200.0, 150.0, 400.0, 300.0));
        let ev = InputEvent::Scroll {
            position: Point::new(10.0, 10.0),
            delta: Vec2::new(0.0, 20.0),
            modifiers: Modifiers::SHIFT,
        };
        let r = c.handle(&ev, &mut vp, w);
        assert!(r.viewport_changed);
        assert_eq!(vp.current(), Rect::new(190.0, 150.0, 400.0, 300.0));
    }

    #[test]
    fn horizontal_scroll_pans_without_modifier() {
        let (mut c, mut vp, w) = setup();
        vp.set_current(Rect::new(200.0, 150.0, 400.0, 300.0));
        let ev = InputEvent::Scroll {
            position: Point::new(10.0, 10.0),
            delta: Vec2::new(-40.0, 2.0),
            modifiers: Modifiers::NONE,
        };
        c.handle(&ev, &mut vp, w);
        assert_eq!(vp.current(), Rect::new(220.0, 150.0, 400.0, 300.0));
    }

    #[test]
    fn scroll_ignored_during_rubber_band() {
        let (mut c, mut vp, w) = setup();
        c.handle(&press(PointerButton::Primary, 100.0, 100.0), &mut vp, w);
        let r = c.handle(&scroll(400.0, 300.0, 50.0), &mut vp, w);
        assert_eq!(r, Reaction::default());
        assert_eq!(vp.current(), vp.full());
        assert_eq!(c.active_gesture(), Some(GestureKind::RubberBand));
    }

    #[test]
    fn pointer_lost_resets_gesture() {
        let (mut c, mut vp, w) = setup();
        c.handle(&press(PointerButton::Primary, 100.0, 100.0), &mut vp, w);
        c.handle(&motion(300.0, 300.0), &mut vp, w);
        let r = c.handle(&InputEvent::PointerLost, &mut vp, w);
        assert_eq!(r.selection, Selection::Clear);
        assert_eq!(c.active_gesture(), None);
        // The late release belongs to no gesture.
        let r = c.handle(&release(PointerButton::Primary, 300.0, 300.0), &mut vp, w);
        assert_eq!(r, Reaction::default());
        assert_eq!(vp.current(), vp.full());
    }

    #[test]
    fn secondary_click_is_recognized() {
        let (mut c, mut vp, w) = setup();
        c.handle(&press(PointerButton::Secondary, 50.0, 60.0), &mut vp, w);
        let r = c.handle(&release(PointerButton::Secondary, 51.0, 60.0), &mut vp, w);
        assert_eq!(r.click.map(|k| k.button), Some(PointerButton::Secondary));
    }

    #[test]
    fn secondary_drag_is_not_a_click() {
        let (mut c, mut vp, w) = setup();
        c.handle(&press(PointerButton::Secondary, 50.0, 60.0), &mut vp, w);
        let r = c.handle(&release(PointerButton::Secondary, 150.0, 60.0), &mut vp, w);
        assert_eq!(r.click, None);
    }

    #[test]
    fn keys_and_stray_events_are_ignored() {
        let (mut c, mut vp, w) = setup();
        let key = InputEvent::Key {
            key: flameview_protocol::Key::Char('x'),
            modifiers: Modifiers::NONE,
        };
        assert_eq!(c.handle(&key, &mut vp, w), Reaction::default());
        assert_eq!(c.handle(&motion(5.0, 5.0), &mut vp, w), Reaction::default());
        assert_eq!(
            c.handle(&release(PointerButton::Middle, 5.0, 5.0), &mut vp, w),
            Reaction::default()
        );
    }
}
