mod painter;
mod styled_text;

pub(crate) use painter::{CursorShape, PaintView, Painter};
pub use styled_text::StyledText;
