//! One interactive view over a rasterized call tree.

use flameview_protocol::{InputEvent, Key, Modifiers, Point, PointerButton, SharedStr, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ViewerConfig;
use crate::hit_test::hit_screen;
use crate::interaction::{Click, Controller, Selection};
use crate::raster::Raster;
use crate::render::Renderer;
use crate::viewport::Viewport;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("nothing to show: the call tree has no samples")]
    NothingToShow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyBinding {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == key && self.modifiers == modifiers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub close: Vec<KeyBinding>,
    pub reset: Vec<KeyBinding>,
    /// Abandons a drag in progress.
    pub cancel: Vec<KeyBinding>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            close: vec![
                KeyBinding::new(Key::Char('q'), Modifiers::CTRL),
                KeyBinding::new(Key::Char('w'), Modifiers::CTRL),
            ],
            reset: vec![
                KeyBinding::new(Key::Char('0'), Modifiers::NONE),
                KeyBinding::new(Key::Home, Modifiers::NONE),
            ],
            cancel: vec![KeyBinding::new(Key::Escape, Modifiers::NONE)],
        }
    }
}

fn bound(bindings: &[KeyBinding], key: Key, modifiers: Modifiers) -> bool {
    bindings.iter().any(|b| b.matches(key, modifiers))
}

/// Source navigation requested by a click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewerEvent {
    /// Show where the frame lives.
    Locate {
        file: SharedStr,
        function: SharedStr,
        line: u32,
    },
    /// Open the file in an editor at the line.
    EditAt { file: SharedStr, line: u32 },
}

/// What the host has to do after an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewUpdate {
    /// The surface changed and should be presented again.
    pub redraw: bool,
    pub events: Vec<ViewerEvent>,
    /// The user asked to close this view.
    pub close: bool,
    /// Label of the frame under the pointer after this event.
    pub label: Option<String>,
}

/// Viewport, gestures and renderer for one raster.
#[derive(Debug)]
pub struct Viewer {
    raster: Raster,
    viewport: Viewport,
    controller: Controller,
    renderer: Renderer,
    keys: KeyConfig,
    pointer: Option<Point>,
    hovered: Option<String>,
}

impl Viewer {
    /// The surface starts empty; the first [`Viewer::handle`] or
    /// [`Viewer::resize`] sizes and draws it.
    pub fn new(raster: Raster, config: &ViewerConfig) -> Result<Self, ViewError> {
        let viewport = Viewport::new(raster.extent()).ok_or(ViewError::NothingToShow)?;
        Ok(Self {
            raster,
            viewport,
            controller: Controller::new(config.interaction.clone()),
            renderer: Renderer::new(Size::new(0, 0), config.render.clone()),
            keys: config.keys.clone(),
            pointer: None,
            hovered: None,
        })
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn surface(&self) -> &image::RgbaImage {
        self.renderer.surface()
    }

    /// Label of the frame last hovered.
    pub fn label(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Match the surface to `widget`, redrawing if it changed.
    pub fn resize(&mut self, widget: Size) -> bool {
        if !self.renderer.resize(widget) {
            return false;
        }
        self.renderer.redraw(&self.raster, &self.viewport);
        self.refresh_hover();
        true
    }

    pub fn handle(&mut self, event: &InputEvent, widget: Size) -> ViewUpdate {
        let mut update = ViewUpdate {
            redraw: self.resize(widget),
            ..ViewUpdate::default()
        };

        if let InputEvent::Key { key, modifiers } = *event {
            self.handle_key(key, modifiers, &mut update);
            update.label = self.hovered.clone();
            return update;
        }

        let reaction = self.controller.handle(event, &mut self.viewport, widget);
        if reaction.viewport_changed {
            self.renderer.redraw(&self.raster, &self.viewport);
            update.redraw = true;
        }
        match reaction.selection {
            Selection::Show(rect) => {
                self.renderer.draw_selection(&self.raster, &self.viewport, rect);
                update.redraw = true;
            }
            Selection::Clear => {
                self.renderer.clear_selection(&self.raster, &self.viewport);
                update.redraw = true;
            }
            Selection::Unchanged => {}
        }
        if let Some(click) = reaction.click {
            update.events.extend(self.dispatch(click));
        }

        let pointer = match event {
            InputEvent::PointerLost => None,
            other => other.position().or(self.pointer),
        };
        if pointer != self.pointer || reaction.viewport_changed {
            self.pointer = pointer;
            update.redraw |= self.refresh_hover();
        }
        update.label = self.hovered.clone();
        update
    }

    fn handle_key(&mut self, key: Key, modifiers: Modifiers, update: &mut ViewUpdate) {
        if bound(&self.keys.close, key, modifiers) {
            tracing::info!("close requested");
            update.close = true;
        } else if bound(&self.keys.reset, key, modifiers) {
            if self.viewport.reset() {
                self.renderer.redraw(&self.raster, &self.viewport);
                self.refresh_hover();
                update.redraw = true;
            }
        } else if bound(&self.keys.cancel, key, modifiers) {
            let reaction = self.controller.cancel();
            if reaction.selection == Selection::Clear {
                self.renderer.clear_selection(&self.raster, &self.viewport);
                update.redraw = true;
            }
        } else {
            tracing::trace!(?key, "unbound key");
        }
    }

    /// Hover at the last known pointer position. Returns whether the surface
    /// was touched.
    fn refresh_hover(&mut self) -> bool {
        let had_overlay = self.renderer.label().is_some();
        self.hovered = match self.pointer {
            Some(p) => self.renderer.hover(&self.raster, &self.viewport, p),
            None => {
                self.renderer.clear_hover(&self.raster, &self.viewport);
                None
            }
        };
        had_overlay || self.renderer.label().is_some()
    }

    fn dispatch(&self, click: Click) -> Option<ViewerEvent> {
        let tag = hit_screen(&self.raster, &self.viewport, self.renderer.size(), click.position);
        let Some(frame) = self.raster.resolve(tag) else {
            tracing::trace!(x = click.position.x, y = click.position.y, "click on empty space");
            return None;
        };
        match click.button {
            PointerButton::Primary => {
                tracing::info!(
                    file = %frame.file,
                    function = %frame.function,
                    line = frame.line,
                    "locate"
                );
                Some(ViewerEvent::Locate {
                    file: frame.file.clone(),
                    function: frame.function.clone(),
                    line: frame.line,
                })
            }
            PointerButton::Secondary => {
                tracing::info!(file = %frame.file, line = frame.line, "edit");
                Some(ViewerEvent::EditAt {
                    file: frame.file.clone(),
                    line: frame.line,
                })
            }
            PointerButton::Middle => None,
        }
    }
}
