pub mod input;
pub mod shared_str;
pub mod types;

pub use input::{InputEvent, Key, Modifiers, PointerButton};
pub use shared_str::SharedStr;
pub use types::{Color, Point, Rect, Size, TextAlign, Vec2};
