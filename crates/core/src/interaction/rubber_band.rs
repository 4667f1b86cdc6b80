use flameview_protocol::{InputEvent, Point, Rect};

use super::{Click, Gesture, GestureContext, Reaction, Selection};

/// Press-drag-release selects a rectangle and zooms to it.
#[derive(Debug, Default)]
pub struct RubberBand {
    origin: Option<Origin>,
}

#[derive(Debug, Clone, Copy)]
struct Origin {
    user: Point,
    screen: Point,
}

impl Gesture for RubberBand {
    fn handle(&mut self, event: &InputEvent, cx: &mut GestureContext<'_>) -> Option<Reaction> {
        let binding = cx.config.rubber_band;
        match (*event, self.origin) {
            (
                InputEvent::Press {
                    button,
                    position,
                    modifiers,
                },
                None,
            ) if binding.matches(button, modifiers) => {
                tracing::trace!(x = position.x, y = position.y, "rubber band started");
                self.origin = Some(Origin {
                    user: cx.to_user(position),
                    screen: position,
                });
                Some(Reaction::default())
            }
            (InputEvent::Motion { position, .. }, Some(origin)) => {
                let shown = band(origin, position, cx)
                    .unwrap_or_else(|| Rect::from_corners(origin.user, cx.to_user(position)));
                Some(Reaction {
                    selection: Selection::Show(shown),
                    ..Reaction::default()
                })
            }
            (
                InputEvent::Release {
                    button, position, ..
                },
                Some(origin),
            ) if button == binding.button => {
                self.origin = None;
                let Some(target) = band(origin, position, cx) else {
                    tracing::trace!(x = position.x, y = position.y, "rubber band too small, treating as click");
                    return Some(Reaction {
                        selection: Selection::Clear,
                        click: Some(Click { button, position }),
                        ..Reaction::default()
                    });
                };
                tracing::trace!(?target, "rubber band released");
                Some(Reaction {
                    viewport_changed: cx.viewport.set_current(target),
                    selection: Selection::Clear,
                    click: None,
                })
            }
            _ => None,
        }
    }

    fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    fn reset(&mut self) {
        self.origin = None;
    }
}

/// User rectangle spanned from `origin` to `position`. An axis dragged less
/// than `min_drag_pixels` keeps the current extent, so a wide flat band
/// selects a horizontal range. `None` when both axes are that short.
fn band(origin: Origin, position: Point, cx: &GestureContext<'_>) -> Option<Rect> {
    let span = Rect::from_corners(origin.screen, position);
    let min = cx.config.min_drag_pixels;
    let (thin_x, thin_y) = (span.w < min, span.h < min);
    if thin_x && thin_y {
        return None;
    }
    let mut target = Rect::from_corners(origin.user, cx.to_user(position));
    let current = cx.viewport.current();
    if thin_x {
        target.x = current.x;
        target.w = current.w;
    }
    if thin_y {
        target.y = current.y;
        target.h = current.h;
    }
    Some(target)
}
