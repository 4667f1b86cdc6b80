//! Window chrome. The flame graph itself keeps its own colors from the
//! viewer config; only the panels around it follow the theme.

use egui::{Color32, CornerRadius, Stroke, Visuals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Toolbar button text: the mode a click switches to.
    pub fn switch_label(self) -> &'static str {
        match self {
            Self::Dark => "Light",
            Self::Light => "Dark",
        }
    }

    pub fn visuals(self) -> Visuals {
        match self {
            Self::Dark => dark_visuals(),
            Self::Light => light_visuals(),
        }
    }

    pub fn error_color(self) -> Color32 {
        match self {
            Self::Dark => Color32::from_rgb(0xf3, 0x8b, 0xa8),
            Self::Light => Color32::from_rgb(211, 47, 47),
        }
    }

    pub fn apply(self, ctx: &egui::Context) {
        ctx.set_visuals(self.visuals());
    }
}

fn rounded(v: &mut Visuals) {
    v.window_corner_radius = CornerRadius::same(6);
    v.menu_corner_radius = CornerRadius::same(6);
    for w in [
        &mut v.widgets.noninteractive,
        &mut v.widgets.inactive,
        &mut v.widgets.hovered,
        &mut v.widgets.active,
        &mut v.widgets.open,
    ] {
        w.corner_radius = CornerRadius::same(5);
    }
}

fn dark_visuals() -> Visuals {
    let mut v = Visuals::dark();
    v.panel_fill = Color32::from_rgb(0x18, 0x18, 0x25);
    v.window_fill = Color32::from_rgb(0x1e, 0x1e, 0x2e);
    v.extreme_bg_color = Color32::from_rgb(0x11, 0x11, 0x1b);
    v.widgets.inactive.bg_fill = Color32::from_rgb(0x45, 0x47, 0x5a);
    v.widgets.hovered.bg_fill = Color32::from_rgb(0x58, 0x5b, 0x70);
    v.widgets.active.bg_fill = Color32::from_rgb(0x89, 0xb4, 0xfa);
    v.selection.stroke = Stroke::new(1.0, Color32::from_rgb(0x89, 0xb4, 0xfa));
    v.error_fg_color = ThemeMode::Dark.error_color();
    rounded(&mut v);
    v
}

fn light_visuals() -> Visuals {
    let mut v = Visuals::light();
    v.panel_fill = Color32::from_rgb(250, 250, 252);
    v.window_fill = Color32::WHITE;
    v.extreme_bg_color = Color32::WHITE;
    v.widgets.inactive.bg_fill = Color32::from_rgb(230, 230, 235);
    v.widgets.hovered.bg_fill = Color32::from_rgb(220, 220, 228);
    v.widgets.active.bg_fill = Color32::from_rgb(50, 110, 220);
    v.selection.stroke = Stroke::new(1.0, Color32::from_rgb(50, 110, 220));
    v.error_fg_color = ThemeMode::Light.error_color();
    rounded(&mut v);
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trips() {
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::Dark.toggled().toggled(), ThemeMode::Dark);
    }

    #[test]
    fn visuals_match_mode() {
        assert!(ThemeMode::Dark.visuals().dark_mode);
        assert!(!ThemeMode::Light.visuals().dark_mode);
    }
}
