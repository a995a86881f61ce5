use crate::result::Result;

/// A store of history lines.
///
/// Index 0 is the oldest entry, `len() - 1` the most recent; the sources
/// manager maps its walk position onto indices from the recent end. A
/// source is a finite lazy sequence: `get_line` may fail (I/O backed
/// stores), which surfaces as a hint-line message, never as a loop abort.
pub trait History: Send {
    /// Number of stored lines
    fn len(&self) -> usize;

    /// The line at `pos` (0 = oldest)
    fn get_line(&self, pos: usize) -> Result<String>;

    /// Append a line, returning its index
    fn write(&mut self, line: &str) -> Result<usize>;

    /// All lines, oldest first
    fn dump(&self) -> Vec<String>;

    /// Display name of the backing store kind
    fn name(&self) -> &'static str {
        "history"
    }

    /// True when no lines are stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
