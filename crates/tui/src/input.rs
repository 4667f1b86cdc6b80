//! crossterm events → viewer input.
//!
//! The viewer surface has two pixel rows per character cell, so cell
//! `(column, row)` covers surface pixels `(column, 2 * row ..= 2 * row + 1)`.

use crossterm::event::{
    Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use flameview_protocol::{InputEvent, Key, Modifiers, Point, PointerButton, Vec2};

fn modifiers(m: KeyModifiers) -> Modifiers {
    Modifiers {
        shift: m.contains(KeyModifiers::SHIFT),
        ctrl: m.contains(KeyModifiers::CONTROL),
        alt: m.contains(KeyModifiers::ALT),
    }
}

fn button(b: MouseButton) -> PointerButton {
    match b {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

/// Centre of the cell in surface pixels.
fn cell_center(column: u16, row: u16) -> Point {
    Point::new(f64::from(column) + 0.5, f64::from(row) * 2.0 + 1.0)
}

fn mouse(ev: &MouseEvent) -> InputEvent {
    let position = cell_center(ev.column, ev.row);
    let modifiers = modifiers(ev.modifiers);
    let scroll = |x: f64, y: f64| InputEvent::Scroll {
        position,
        delta: Vec2::new(x, y),
        modifiers,
    };
    match ev.kind {
        MouseEventKind::Down(b) => InputEvent::Press {
            button: button(b),
            position,
            modifiers,
        },
        MouseEventKind::Up(b) => InputEvent::Release {
            button: button(b),
            position,
            modifiers,
        },
        MouseEventKind::Drag(_) | MouseEventKind::Moved => InputEvent::Motion {
            position,
            modifiers,
        },
        MouseEventKind::ScrollUp => scroll(0.0, 1.0),
        MouseEventKind::ScrollDown => scroll(0.0, -1.0),
        MouseEventKind::ScrollLeft => scroll(-1.0, 0.0),
        MouseEventKind::ScrollRight => scroll(1.0, 0.0),
    }
}

/// `None` for events the viewer has no use for.
pub fn map_event(event: &Event) -> Option<InputEvent> {
    match event {
        Event::Mouse(ev) => Some(mouse(ev)),
        Event::FocusLost => Some(InputEvent::PointerLost),
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            let key_code = match key.code {
                KeyCode::Char(c) => Key::Char(c.to_ascii_lowercase()),
                KeyCode::Esc => Key::Escape,
                KeyCode::Home => Key::Home,
                _ => return None,
            };
            let mut modifiers = modifiers(key.modifiers);
            // Shift is already folded into the character.
            if matches!(key.code, KeyCode::Char(_)) {
                modifiers.shift = false;
            }
            Some(InputEvent::Key {
                key: key_code,
                modifiers,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn mouse_event(kind: MouseEventKind, column: u16, row: u16, m: KeyModifiers) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: m,
        })
    }

    #[test]
    fn press_maps_to_cell_center() {
        let ev = mouse_event(MouseEventKind::Down(MouseButton::Left), 3, 4, KeyModifiers::NONE);
        assert_eq!(
            map_event(&ev),
            Some(InputEvent::Press {
                button: PointerButton::Primary,
                position: Point::new(3.5, 9.0),
                modifiers: Modifiers::NONE,
            })
        );
    }

    #[test]
    fn wheel_up_is_positive() {
        let ev = mouse_event(MouseEventKind::ScrollUp, 0, 0, KeyModifiers::SHIFT);
        let Some(InputEvent::Scroll { delta, modifiers, .. }) = map_event(&ev) else {
            panic!("expected scroll");
        };
        assert_eq!(delta, Vec2::new(0.0, 1.0));
        assert!(modifiers.shift);
    }

    #[test]
    fn drag_is_motion() {
        let ev = mouse_event(MouseEventKind::Drag(MouseButton::Middle), 1, 1, KeyModifiers::NONE);
        assert!(matches!(map_event(&ev), Some(InputEvent::Motion { .. })));
    }

    #[test]
    fn keys() {
        let ctrl_q = Event::Key(KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::CONTROL | KeyModifiers::SHIFT));
        assert_eq!(
            map_event(&ctrl_q),
            Some(InputEvent::Key {
                key: Key::Char('q'),
                modifiers: Modifiers::CTRL,
            })
        );
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(matches!(map_event(&esc), Some(InputEvent::Key { key: Key::Escape, .. })));
        let f1 = Event::Key(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE));
        assert_eq!(map_event(&f1), None);
    }

    #[test]
    fn focus_loss_drops_pointer() {
        assert_eq!(map_event(&Event::FocusLost), Some(InputEvent::PointerLost));
        assert_eq!(map_event(&Event::FocusGained), None);
    }
}
