use serde::{Deserialize, Serialize};

use crate::types::{Point, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Keyboard modifiers held while an event was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
    pub const ALT: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: true,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Every modifier set in `required` is also set in `self`.
    pub fn contains(&self, required: Modifiers) -> bool {
        (!required.shift || self.shift) && (!required.ctrl || self.ctrl) && (!required.alt || self.alt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable key, lower-cased by the host.
    Char(char),
    Escape,
    Home,
}

/// Raw input delivered by a host toolkit, in widget pixel coordinates
/// (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Press {
        button: PointerButton,
        position: Point,
        modifiers: Modifiers,
    },
    Release {
        button: PointerButton,
        position: Point,
        modifiers: Modifiers,
    },
    /// Pointer moved, with or without a button held.
    Motion {
        position: Point,
        modifiers: Modifiers,
    },
    /// Wheel or trackpad scroll. Positive `delta.y` scrolls up / away from
    /// the user.
    Scroll {
        position: Point,
        delta: Vec2,
        modifiers: Modifiers,
    },
    Key {
        key: Key,
        modifiers: Modifiers,
    },
    /// Pointer capture was lost (window defocus, pointer left the widget).
    PointerLost,
}

impl InputEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Press { position, .. }
            | Self::Release { position, .. }
            | Self::Motion { position, .. }
            | Self::Scroll { position, .. } => Some(*position),
            Self::Key { .. } | Self::PointerLost => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Press { modifiers, .. }
            | Self::Release { modifiers, .. }
            | Self::Motion { modifiers, .. }
            | Self::Scroll { modifiers, .. }
            | Self::Key { modifiers, .. } => *modifiers,
            Self::PointerLost => Modifiers::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_contains() {
        let held = Modifiers {
            shift: true,
            ctrl: true,
            alt: false,
        };
        assert!(held.contains(Modifiers::SHIFT));
        assert!(held.contains(Modifiers::NONE));
        assert!(!held.contains(Modifiers::ALT));
        assert!(!Modifiers::NONE.contains(Modifiers::CTRL));
    }

    #[test]
    fn event_accessors() {
        let ev = InputEvent::Scroll {
            position: Point::new(3.0, 4.0),
            delta: Vec2::new(0.0, 1.0),
            modifiers: Modifiers::SHIFT,
        };
        assert_eq!(ev.position(), Some(Point::new(3.0, 4.0)));
        assert_eq!(ev.modifiers(), Modifiers::SHIFT);
        assert_eq!(InputEvent::PointerLost.position(), None);
    }

    #[test]
    fn modifiers_deserialize_partially() {
        let m: Modifiers = serde_json::from_str(r#"{"ctrl": true}"#).unwrap_or_default();
        assert_eq!(m, Modifiers::CTRL);
    }
}
