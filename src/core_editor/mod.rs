mod cursor;
mod editor;
mod iterations;
mod line_buffer;
mod registers;
mod selection;

pub use cursor::Cursor;
pub use editor::{Editor, LineState};
pub use iterations::Iterations;
pub use line_buffer::LineBuffer;
pub(crate) use line_buffer::{is_bracket, match_surround};
pub use registers::Registers;
pub use selection::{Selection, SelectionKind};
