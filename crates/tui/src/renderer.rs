use std::io::{Stdout, stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use flameview_core::{ViewId, ViewerEvent, Views};
use flameview_protocol::Size;
use image::RgbaImage;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
};

use crate::{editor, input};

type Term = Terminal<CrosstermBackend<Stdout>>;

const HINT: &str = "drag: zoom | shift-drag: pan | wheel: zoom | shift-wheel: pan | 0: reset | q: quit";

fn setup() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Take the terminal back after an external program used it.
fn resume(terminal: &mut Term) -> Result<()> {
    enable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    terminal.clear()?;
    Ok(())
}

fn restore(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Surface pixels for a terminal of `columns × rows`, keeping the last row
/// for the status line.
fn surface_size(columns: u16, rows: u16) -> Size {
    Size::new(u32::from(columns), u32::from(rows.saturating_sub(1)) * 2)
}

fn rgb(p: [u8; 4]) -> Color {
    Color::Rgb(p[0], p[1], p[2])
}

/// Two surface rows per cell: upper half block in the top pixel's color over
/// the bottom pixel's color.
fn draw_surface(frame: &mut Frame<'_>, surface: &RgbaImage, area: Rect) {
    let buf = frame.buffer_mut();
    for row in 0..area.height {
        let top = u32::from(row) * 2;
        if top + 1 >= surface.height() {
            break;
        }
        for col in 0..area.width.min(surface.width() as u16) {
            let x = u32::from(col);
            let upper = surface.get_pixel(x, top).0;
            let lower = surface.get_pixel(x, top + 1).0;
            buf[(area.x + col, area.y + row)]
                .set_char('▀')
                .set_fg(rgb(upper))
                .set_bg(rgb(lower));
        }
    }
}

fn draw(frame: &mut Frame<'_>, surface: &RgbaImage, status: &str) {
    let area = frame.area();
    let content = Rect::new(0, 0, area.width, area.height.saturating_sub(1));
    draw_surface(frame, surface, content);

    let status_area = Rect::new(0, area.height.saturating_sub(1), area.width, 1);
    let line = Paragraph::new(status.to_owned())
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(line, status_area);
}

/// A plain `q` quits, as well as the configured close combo.
fn is_quit(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(key)
            if key.kind == KeyEventKind::Press
                && key.code == KeyCode::Char('q')
                && key.modifiers == KeyModifiers::NONE
    )
}

/// Run the event loop on view `id` until the user closes it.
pub fn run(views: &mut Views, id: ViewId, title: &str) -> Result<()> {
    let mut terminal = setup()?;
    let result = event_loop(&mut terminal, views, id, title);
    restore(&mut terminal)?;
    result
}

fn event_loop(terminal: &mut Term, views: &mut Views, id: ViewId, title: &str) -> Result<()> {
    let mut message: Option<String> = None;
    let mut label: Option<String> = None;

    loop {
        let Some(viewer) = views.get_mut(id) else {
            return Ok(());
        };
        let area = terminal.size()?;
        let widget = surface_size(area.width, area.height);
        viewer.resize(widget);

        let parts: Vec<&str> = [label.as_deref(), message.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        let status = if parts.is_empty() {
            format!(" {title} | {HINT}")
        } else {
            format!(" {}", parts.join(" | "))
        };
        terminal.draw(|frame| draw(frame, viewer.surface(), &status))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let ev = event::read()?;
        if is_quit(&ev) {
            return Ok(());
        }
        let Some(input) = input::map_event(&ev) else {
            continue;
        };

        let update = viewer.handle(&input, widget);
        label = update.label;
        if update.close {
            return Ok(());
        }
        for event in update.events {
            match event {
                ViewerEvent::Locate {
                    file,
                    function,
                    line,
                } => {
                    message = Some(format!("{file}:{line} {function}"));
                }
                ViewerEvent::EditAt { file, line } => {
                    if file.is_empty() {
                        message = Some("no source file for this frame".to_owned());
                        continue;
                    }
                    // The editor gets the terminal until it exits.
                    restore(terminal)?;
                    let status = editor::open(&file, line);
                    resume(terminal)?;
                    message = Some(match status {
                        Ok(s) if s.success() => format!("edited {file}:{line}"),
                        Ok(s) => format!("editor exited with {s}"),
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to launch editor");
                            format!("could not launch editor: {e}")
                        }
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn status_row_is_reserved() {
        assert_eq!(surface_size(80, 25), Size::new(80, 48));
        assert_eq!(surface_size(80, 0), Size::new(80, 0));
    }

    #[test]
    fn plain_q_quits() {
        let q = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        let ctrl_q = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(is_quit(&q));
        assert!(!is_quit(&ctrl_q));
    }
}
