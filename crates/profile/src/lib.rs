//! Builds flameview call trees from collapsed stacks and colors them, and
//! locates the editor the viewers hand source locations to.

pub mod collapsed;
pub mod editor;
pub mod palette;

pub use collapsed::{CollapsedParseError, parse_collapsed};
pub use editor::editor_command;
pub use palette::warm;
