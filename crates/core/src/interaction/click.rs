use flameview_protocol::{InputEvent, Point, PointerButton};

use super::{Click, Gesture, GestureContext, Reaction};

/// Press/release of any button no drag gesture claimed.
#[derive(Debug, Default)]
pub struct ClickRecognizer {
    pressed: Option<(PointerButton, Point)>,
}

impl Gesture for ClickRecognizer {
    fn handle(&mut self, event: &InputEvent, cx: &mut GestureContext<'_>) -> Option<Reaction> {
        match (*event, self.pressed) {
            (InputEvent::Press { button, position, .. }, None) => {
                self.pressed = Some((button, position));
                Some(Reaction::default())
            }
            (InputEvent::Motion { .. }, Some(_)) => Some(Reaction::default()),
            (InputEvent::Release { button, position, .. }, Some((held, origin)))
                if button == held =>
            {
                self.pressed = None;
                let moved = position - origin;
                let min = cx.config.min_drag_pixels;
                let click = (moved.x.abs() < min && moved.y.abs() < min)
                    .then_some(Click { button, position });
                Some(Reaction {
                    click,
                    ..Reaction::default()
                })
            }
            _ => None,
        }
    }

    fn is_active(&self) -> bool {
        self.pressed.is_some()
    }

    fn reset(&mut self) {
        self.pressed = None;
    }
}
