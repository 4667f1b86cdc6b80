use flameview_protocol::{InputEvent, Point, PointerButton};

use super::{Gesture, GestureContext, Reaction};

/// Grab-and-drag panning. Content follows the pointer.
#[derive(Debug, Default)]
pub struct DragPan {
    grab: Option<(PointerButton, Point)>,
}

impl Gesture for DragPan {
    fn handle(&mut self, event: &InputEvent, cx: &mut GestureContext<'_>) -> Option<Reaction> {
        match (*event, self.grab) {
            (
                InputEvent::Press {
                    button,
                    position,
                    modifiers,
                },
                None,
            ) if cx.config.drag_pan.iter().any(|b| b.matches(button, modifiers)) => {
                tracing::trace!(?button, "drag pan started");
                self.grab = Some((button, position));
                Some(Reaction::default())
            }
            (InputEvent::Motion { position, .. }, Some((button, last))) => {
                let delta = cx
                    .viewport
                    .to_screen(cx.widget)
                    .delta_to_user(position - last);
                self.grab = Some((button, position));
                Some(Reaction::viewport(cx.viewport.pan_by(-delta.x, -delta.y)))
            }
            (InputEvent::Release { button, .. }, Some((held, _))) if button == held => {
                tracing::trace!(?button, "drag pan finished");
                self.grab = None;
                Some(Reaction::default())
            }
            _ => None,
        }
    }

    fn is_active(&self) -> bool {
        self.grab.is_some()
    }

    fn reset(&mut self) {
        self.grab = None;
    }
}
