use super::{Cursor, LineBuffer, Selection};

/// Snapshot of the editable state, as stored by the per-line undo stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineState {
    pub line: LineBuffer,
    pub cursor_pos: usize,
}

/// Owns the line buffer, cursor and selection and coordinates operations
/// that span more than one of them.
///
/// Commands receive a borrow of the active editor from the orchestrator:
/// either this one (the real input line), or one of the completion engine's
/// views (minibuffer, virtually completed line).
#[derive(Debug, Clone, Default)]
pub struct Editor {
    pub line: LineBuffer,
    pub cursor: Cursor,
    pub selection: Selection,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(content: &str) -> Self {
        let line = LineBuffer::from(content);
        let mut cursor = Cursor::new();
        cursor.set(line.len(), &line);
        Editor {
            line,
            cursor,
            selection: Selection::new(),
        }
    }

    /// Reset to the empty state at the start of an accept cycle. The
    /// components are reused, not reallocated.
    pub fn reset(&mut self) {
        self.line.clear();
        self.cursor = Cursor::new();
        self.selection.reset();
    }

    /// Replace line content, moving the cursor to the end
    pub fn set_line(&mut self, content: &[char]) {
        self.line.set(content);
        self.cursor.set(self.line.len(), &self.line);
    }

    /// Insert at the cursor and advance past the insertion
    pub fn insert_at_cursor(&mut self, content: &[char]) {
        let pos = self.cursor.pos();
        self.line.insert(pos, content);
        self.cursor.set(pos + content.len(), &self.line);
    }

    pub fn insert_str_at_cursor(&mut self, content: &str) {
        self.insert_at_cursor(&content.chars().collect::<Vec<_>>());
    }

    /// Capture the undo snapshot
    pub fn snapshot(&self) -> LineState {
        LineState {
            line: self.line.clone(),
            cursor_pos: self.cursor.pos(),
        }
    }

    /// Restore an undo snapshot
    pub fn restore(&mut self, state: &LineState) {
        self.line = state.line.clone();
        self.cursor.set(state.cursor_pos, &self.line);
        self.selection.reset();
    }

    //
    // Selection handling ---------------------------------------------------
    //

    /// Anchor the selection at the cursor
    pub fn mark_selection_at_cursor(&mut self) {
        self.selection.mark(self.cursor.pos());
    }

    /// Derived selection range for the current cursor position
    pub fn selection_pos(&self) -> Option<(usize, usize)> {
        self.selection.pos(&self.line, self.cursor.pos())
    }

    /// Selected text, range and landing position; clears the selection
    /// without editing the line (used by yanks).
    pub fn selection_pop(&mut self) -> Option<(String, usize, usize, usize)> {
        let (bpos, epos) = self.selection_pos()?;
        let land = self.selection.cursor_land(&self.line, self.cursor.pos());
        let text: String = self.line.chars()[bpos..epos].iter().collect();
        self.selection.reset();
        Some((text, bpos, epos, land))
    }

    /// Cut the selected range out of the line, land the cursor per the
    /// selection rule, and return the removed text.
    pub fn selection_cut(&mut self) -> Option<String> {
        let (text, bpos, epos, land) = self.selection_pop()?;
        self.line.cut(bpos, epos);
        self.cursor.set(land, &self.line);
        Some(text)
    }

    /// Map every code point of the selection in place
    pub fn replace_selection_with(&mut self, replace: impl FnMut(char) -> char) {
        if let Some((bpos, epos)) = self.selection_pos() {
            self.line.replace_range_with(bpos, epos, replace);
            self.selection.reset();
            self.cursor.set(bpos, &self.line);
        }
    }

    /// Wrap the selection in a surround pair
    pub fn surround_selection(&mut self, open: char, close: char) {
        if let Some((bpos, epos)) = self.selection_pos() {
            self.line.insert_char(epos, close);
            self.line.insert_char(bpos, open);
            self.selection.reset();
            self.cursor.set(bpos, &self.line);
        }
    }

    //
    // Word selections ------------------------------------------------------
    //

    /// Select the word under the cursor: cursor to its end, mark at start
    pub fn select_in_word(&mut self) {
        let (bpos, epos) = self.line.select_word(self.cursor.pos());
        self.cursor.set(epos, &self.line);
        self.selection.mark(bpos);
    }

    /// Select the blank-word under the cursor
    pub fn select_in_blank_word(&mut self) {
        let (bpos, epos) = self.line.select_blank_word(self.cursor.pos());
        self.cursor.set(epos, &self.line);
        self.selection.mark(bpos);
    }

    /// Select the word under the cursor including trailing blanks
    pub fn select_a_word(&mut self) {
        let (bpos, epos) = self.line.select_word(self.cursor.pos());
        let epos = self.extend_over_blanks(epos);
        self.cursor.set(epos, &self.line);
        self.selection.mark(bpos);
    }

    /// Select the blank-word under the cursor including trailing blanks
    pub fn select_a_blank_word(&mut self) {
        let (bpos, epos) = self.line.select_blank_word(self.cursor.pos());
        let epos = self.extend_over_blanks(epos);
        self.cursor.set(epos, &self.line);
        self.selection.mark(bpos);
    }

    fn extend_over_blanks(&self, mut epos: usize) -> usize {
        while epos + 1 < self.line.len() {
            match self.line.char_at(epos + 1) {
                Some(c) if c.is_whitespace() && c != '\n' => epos += 1,
                _ => break,
            }
        }
        epos
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_at_cursor_advances() {
        let mut editor = Editor::new();
        editor.insert_str_at_cursor("ab");
        editor.cursor.dec();
        editor.insert_str_at_cursor("X");
        assert_eq!(editor.line.to_string(), "aXb");
        assert_eq!(editor.cursor.pos(), 2);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut editor = Editor::from_str("hello");
        let saved = editor.snapshot();
        editor.set_line(&['x']);
        editor.restore(&saved);
        assert_eq!(editor.line.to_string(), "hello");
        assert_eq!(editor.cursor.pos(), 5);
    }

    #[test]
    fn selection_cut_lands_on_range_start() {
        let mut editor = Editor::from_str("the quick fox");
        editor.cursor.set(4, &editor.line);
        editor.mark_selection_at_cursor();
        editor.cursor.set(10, &editor.line);
        let cut = editor.selection_cut();
        assert_eq!(cut.as_deref(), Some("quick "));
        assert_eq!(editor.line.to_string(), "the fox");
        assert_eq!(editor.cursor.pos(), 4);
    }

    #[test]
    fn select_a_word_takes_trailing_space() {
        let mut editor = Editor::from_str("one two three");
        editor.cursor.set(5, &editor.line);
        editor.select_a_word();
        editor.selection.visual(false);
        let (text, ..) = editor.selection_pop().expect("selection active");
        assert_eq!(text, "two ");
    }

    #[test]
    fn surround_selection_wraps() {
        let mut editor = Editor::from_str("word");
        editor.cursor.set(0, &editor.line);
        editor.mark_selection_at_cursor();
        editor.cursor.set(3, &editor.line);
        editor.selection.visual(false);
        editor.surround_selection('(', ')');
        assert_eq!(editor.line.to_string(), "(word)");
    }
}
