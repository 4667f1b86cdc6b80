//! egui events → viewer input, in pixels relative to the view's top-left.

use egui::{Event, MouseWheelUnit, Pos2, Rect};
use flameview_protocol::{InputEvent, Key, Modifiers, Point, PointerButton, Vec2};

/// Points per wheel line, matching egui's own scroll speed.
const LINE_HEIGHT: f32 = 40.0;

fn modifiers(m: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: m.shift,
        ctrl: m.ctrl || m.mac_cmd,
        alt: m.alt,
    }
}

fn button(b: egui::PointerButton) -> Option<PointerButton> {
    match b {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Extra1 | egui::PointerButton::Extra2 => None,
    }
}

fn key(k: egui::Key) -> Option<Key> {
    match k {
        egui::Key::Escape => Some(Key::Escape),
        egui::Key::Home => Some(Key::Home),
        other => {
            let mut chars = other.name().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Key::Char(c.to_ascii_lowercase())),
                _ => None,
            }
        }
    }
}

/// Scroll amount in pixels. Positive `y` scrolls up.
pub fn wheel_delta(unit: MouseWheelUnit, delta: egui::Vec2, page_height: f32) -> Vec2 {
    let scale = match unit {
        MouseWheelUnit::Point => 1.0,
        MouseWheelUnit::Line => LINE_HEIGHT,
        MouseWheelUnit::Page => page_height,
    };
    Vec2::new(f64::from(delta.x * scale), f64::from(delta.y * scale))
}

/// Translates one frame's events for a view occupying `rect`. Presses and
/// scrolls only count inside the rect. Releases are always forwarded, and so
/// is motion while a button is held, so a drag can leave the view and still
/// finish. Idle motion outside the rect drops the pointer.
pub struct Translator {
    rect: Rect,
    hover: Option<Pos2>,
    button_down: bool,
}

impl Translator {
    pub fn new(rect: Rect, hover: Option<Pos2>, button_down: bool) -> Self {
        Self {
            rect,
            hover,
            button_down,
        }
    }

    fn local(&self, pos: Pos2) -> Point {
        let v = pos - self.rect.min;
        Point::new(f64::from(v.x), f64::from(v.y))
    }

    pub fn translate(&self, event: &Event) -> Option<InputEvent> {
        match event {
            Event::PointerButton {
                pos,
                button: b,
                pressed,
                modifiers: m,
                ..
            } => {
                let button = button(*b)?;
                let position = self.local(*pos);
                let modifiers = modifiers(*m);
                if *pressed {
                    self.rect.contains(*pos).then_some(InputEvent::Press {
                        button,
                        position,
                        modifiers,
                    })
                } else {
                    Some(InputEvent::Release {
                        button,
                        position,
                        modifiers,
                    })
                }
            }
            Event::PointerMoved(pos) if self.button_down || self.rect.contains(*pos) => {
                Some(InputEvent::Motion {
                    position: self.local(*pos),
                    modifiers: Modifiers::NONE,
                })
            }
            Event::PointerMoved(_) => Some(InputEvent::PointerLost),
            Event::MouseWheel {
                unit,
                delta,
                modifiers: m,
                ..
            } => {
                let pos = self.hover.filter(|p| self.rect.contains(*p))?;
                Some(InputEvent::Scroll {
                    position: self.local(pos),
                    delta: wheel_delta(*unit, *delta, self.rect.height()),
                    modifiers: modifiers(*m),
                })
            }
            Event::PointerGone | Event::WindowFocused(false) => Some(InputEvent::PointerLost),
            Event::Key {
                key: k,
                pressed: true,
                modifiers: m,
                ..
            } => {
                let key = key(*k)?;
                let mut modifiers = modifiers(*m);
                if matches!(key, Key::Char(_)) {
                    modifiers.shift = false;
                }
                Some(InputEvent::Key { key, modifiers })
            }
            _ => None,
        }
    }
}
