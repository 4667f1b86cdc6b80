use std::collections::BTreeMap;
use std::path::Path;
use std::process::Child;

use eframe::egui;
use flameview_core::{ViewError, ViewId, ViewUpdate, ViewerConfig, ViewerEvent, Views};
use flameview_protocol::InputEvent;

use crate::input::Translator;
use crate::surface::{self, SurfaceTexture};
use crate::theme::ThemeMode;

const HINT: &str = "drag: zoom | shift-drag or middle-drag: pan | wheel: zoom | shift-wheel: pan | 0: reset | ctrl-w: close";

/// Drop editors that have exited. Returns how many are still running.
fn reap(editors: &mut Vec<Child>) -> usize {
    editors.retain_mut(|child| match child.try_wait() {
        Ok(None) => true,
        Ok(Some(status)) => {
            tracing::debug!(pid = child.id(), %status, "editor exited");
            false
        }
        Err(e) => {
            tracing::warn!(pid = child.id(), error = %e, "lost track of editor");
            false
        }
    });
    editors.len()
}

fn title_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

struct Tab {
    title: String,
    texture: SurfaceTexture,
}

/// Main application state: every open view plus the window chrome.
pub struct FlameApp {
    views: Views,
    tabs: BTreeMap<ViewId, Tab>,
    current: Option<ViewId>,
    theme_mode: ThemeMode,
    /// Label of the frame under the pointer.
    label: Option<String>,
    /// Result of the last click.
    message: Option<String>,
    error: Option<String>,
    /// Editors launched from the view, reaped once they exit.
    editors: Vec<Child>,
}

impl FlameApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Self {
        let theme_mode = ThemeMode::default();
        theme_mode.apply(&cc.egui_ctx);
        Self {
            views: Views::new(config),
            tabs: BTreeMap::new(),
            current: None,
            theme_mode,
            label: None,
            message: None,
            error: None,
            editors: Vec::new(),
        }
    }

    pub fn open_path(&mut self, path: &Path) {
        match std::fs::read(path) {
            Ok(data) => self.open_bytes(&title_of(path), &data),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read stacks");
                self.error = Some(format!("Failed to read {}: {e}", path.display()));
            }
        }
    }

    fn open_bytes(&mut self, title: &str, data: &[u8]) {
        let tree = match flameview_profile::parse_collapsed(data) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(title, error = %e, "failed to parse stacks");
                self.error = Some(format!("{title}: {e}"));
                return;
            }
        };
        match self.views.view(&tree, flameview_profile::warm) {
            Ok(id) => {
                tracing::info!(title, ?id, samples = tree.total_width(), "opened view");
                self.tabs.insert(
                    id,
                    Tab {
                        title: title.to_owned(),
                        texture: SurfaceTexture::default(),
                    },
                );
                self.current = Some(id);
                self.label = None;
                self.message = None;
                self.error = None;
            }
            Err(ViewError::NothingToShow) => {
                self.error = Some(format!("{title}: nothing to show"));
            }
        }
    }

    fn close(&mut self, id: ViewId) {
        self.views.close(id);
        self.tabs.remove(&id);
        if self.current == Some(id) {
            self.current = self.tabs.keys().next_back().copied();
            self.label = None;
            self.message = None;
        }
    }

    /// Act on what a view asked for. Returns whether it wants to close.
    fn apply(&mut self, update: ViewUpdate) -> bool {
        self.label = update.label;
        for event in update.events {
            match event {
                ViewerEvent::Locate {
                    file,
                    function,
                    line,
                } => {
                    self.message = Some(format!("{file}:{line} {function}"));
                }
                ViewerEvent::EditAt { file, line } => {
                    let message = self.edit(&file, line);
                    self.message = Some(message);
                }
            }
        }
        update.close
    }

    fn edit(&mut self, file: &str, line: u32) -> String {
        if file.is_empty() {
            return "no source file for this frame".to_owned();
        }
        let editor = std::env::var("EDITOR").ok();
        let Some(mut cmd) = flameview_profile::editor_command(editor.as_deref(), None, file, line)
        else {
            return format!("{file}:{line} (set $EDITOR to open it)");
        };
        tracing::info!(file, line, editor = editor.as_deref(), "launching editor");
        match cmd.spawn() {
            Ok(child) => {
                self.editors.push(child);
                format!("editing {file}:{line}")
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to launch editor");
                format!("could not launch editor: {e}")
            }
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("flameview");
                ui.separator();

                if ui.button("Open").clicked()
                    && let Some(path) = rfd::FileDialog::new()
                        .add_filter("Collapsed stacks", &["txt", "folded", "collapsed"])
                        .pick_file()
                {
                    self.open_path(&path);
                }

                let mut closing = None;
                for (id, tab) in &self.tabs {
                    if ui
                        .selectable_label(self.current == Some(*id), tab.title.as_str())
                        .clicked()
                    {
                        self.current = Some(*id);
                        self.label = None;
                    }
                    if ui.small_button("x").clicked() {
                        closing = Some(*id);
                    }
                }
                if let Some(id) = closing {
                    self.close(id);
                }

                ui.separator();
                if ui.button(self.theme_mode.switch_label()).clicked() {
                    self.theme_mode = self.theme_mode.toggled();
                    self.theme_mode.apply(ctx);
                }

                let zoom = self
                    .current
                    .and_then(|id| self.views.get(id))
                    .map(|v| v.viewport().zoom_level());
                if let Some(zoom) = zoom {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!("{:.0}%", zoom * 100.0));
                    });
                }
            });
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(err) = &self.error {
                    ui.colored_label(self.theme_mode.error_color(), err.as_str());
                    return;
                }
                let parts: Vec<&str> = [self.label.as_deref(), self.message.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect();
                if parts.is_empty() {
                    ui.label(HINT);
                } else {
                    ui.label(parts.join(" | "));
                }
            });
        });
    }

    fn flame_view(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let Some(id) = self.current else {
                    ui.centered_and_justified(|ui| {
                        ui.heading("Drop a collapsed stack file here or click Open");
                    });
                    return;
                };

                let rect = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
                if response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
                }

                let translator = ui.input(|i| {
                    let held = i.pointer.any_down() || i.pointer.any_released();
                    Translator::new(rect, i.pointer.hover_pos(), held)
                });
                let events: Vec<InputEvent> = ui.input(|i| {
                    i.events
                        .iter()
                        .filter_map(|e| translator.translate(e))
                        .collect()
                });

                let widget = surface::widget_size(rect);
                let mut updates = Vec::new();
                if let (Some(viewer), Some(tab)) = (self.views.get_mut(id), self.tabs.get_mut(&id))
                {
                    let mut changed = viewer.resize(widget);
                    for event in &events {
                        let update = viewer.handle(event, widget);
                        changed |= update.redraw;
                        updates.push(update);
                    }
                    tab.texture.update(ui.ctx(), viewer.surface(), changed);
                    tab.texture.paint(ui.painter(), rect);
                }

                let mut close = false;
                for update in updates {
                    close |= self.apply(update);
                }
                if close {
                    self.close(id);
                }
            });
    }

    fn take_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(bytes) = &file.bytes {
                self.open_bytes(&file.name, bytes);
            } else if let Some(path) = &file.path {
                self.open_path(path);
            }
        }
    }
}

impl eframe::App for FlameApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if reap(&mut self.editors) > 0 {
            ctx.request_repaint_after(std::time::Duration::from_secs(1));
        }
        self.take_dropped_files(ctx);
        self.toolbar(ctx);
        self.status_bar(ctx);
        self.flame_view(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn exited_editors_are_reaped() {
        use std::process::Command;
        use std::time::{Duration, Instant};

        let done = Command::new("true").spawn().unwrap();
        let running = Command::new("sleep").arg("5").spawn().unwrap();
        let mut editors = vec![done, running];

        let deadline = Instant::now() + Duration::from_secs(4);
        while reap(&mut editors) > 1 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(editors.len(), 1);

        let mut running = editors.remove(0);
        running.kill().unwrap();
        running.wait().unwrap();
        assert_eq!(reap(&mut editors), 0);
    }

    #[test]
    fn no_editor_without_configuring() {
        assert!(flameview_profile::editor_command(None, None, "a.py", 3).is_none());
    }

    #[test]
    fn title_is_the_file_name() {
        assert_eq!(title_of(Path::new("/tmp/out/app.folded")), "app.folded");
    }
}
