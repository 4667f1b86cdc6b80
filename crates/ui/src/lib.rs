//! Desktop host for flameview: an eframe window with one flame graph view
//! per opened stack file.

mod app;
mod input;
mod surface;
mod theme;

pub use app::FlameApp;
