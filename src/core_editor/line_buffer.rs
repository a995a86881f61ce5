use std::fmt::{Display, Formatter};

/// Character classes used by the word tokenizers.
///
/// The `word` tokenizer distinguishes alphanumeric runs from punctuation
/// runs, the `blank-word` tokenizer only splits on whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Blank,
    Word,
    Punctuation,
}

fn class_of(c: char, blank_only: bool) -> CharClass {
    if c.is_whitespace() {
        CharClass::Blank
    } else if blank_only || c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

pub(crate) fn is_bracket(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | '{' | '}')
}

/// Returns the opening/closing pair a surround character stands for.
///
/// Non-matcher characters (quotes, `*`, ...) surround with themselves.
pub(crate) fn match_surround(c: char) -> (char, char) {
    match c {
        '(' | ')' => ('(', ')'),
        '[' | ']' => ('[', ']'),
        '{' | '}' => ('{', '}'),
        '<' | '>' => ('<', '>'),
        other => (other, other),
    }
}

/// In-memory representation of the input line.
///
/// The buffer is an ordered sequence of code points: every position handed
/// to or returned by its operations is a code-point index, never a byte
/// offset. Valid cursor positions are `0..=len()`, valid dereference
/// positions `0..len()`. Newlines partition the buffer into logical lines.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct LineBuffer {
    buffer: Vec<char>,
}

impl From<&str> for LineBuffer {
    fn from(input: &str) -> Self {
        LineBuffer {
            buffer: input.chars().collect(),
        }
    }
}

impl Display for LineBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.buffer.iter().collect::<String>())
    }
}

impl LineBuffer {
    /// Create an empty line buffer
    pub fn new() -> LineBuffer {
        Self::default()
    }

    /// Check to see if the line buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of code points in the buffer
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Direct view of the code points
    pub fn chars(&self) -> &[char] {
        &self.buffer
    }

    /// The code point at `pos`, if in bounds
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.buffer.get(pos).copied()
    }

    /// Number of logical lines (1 + newline count)
    pub fn num_lines(&self) -> usize {
        1 + self.buffer.iter().filter(|c| **c == '\n').count()
    }

    /// Replace the whole buffer content
    pub fn set(&mut self, content: &[char]) {
        self.buffer.clear();
        self.buffer.extend_from_slice(content);
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Insert the code points at `pos`, shifting the remainder right
    pub fn insert(&mut self, pos: usize, content: &[char]) {
        let pos = pos.min(self.buffer.len());
        self.buffer.splice(pos..pos, content.iter().copied());
    }

    /// Insert a single code point at `pos`
    pub fn insert_char(&mut self, pos: usize, c: char) {
        let pos = pos.min(self.buffer.len());
        self.buffer.insert(pos, c);
    }

    /// Remove and return the range `[bpos, epos)`
    pub fn cut(&mut self, bpos: usize, epos: usize) -> String {
        let epos = epos.min(self.buffer.len());
        let bpos = bpos.min(epos);
        self.buffer.drain(bpos..epos).collect()
    }

    /// Remove and return the code point at `pos`
    pub fn cut_char(&mut self, pos: usize) -> Option<char> {
        if pos < self.buffer.len() {
            Some(self.buffer.remove(pos))
        } else {
            None
        }
    }

    /// Overwrite the code point at `pos`
    pub fn replace_char(&mut self, pos: usize, c: char) {
        if let Some(slot) = self.buffer.get_mut(pos) {
            *slot = c;
        }
    }

    /// Map the code points in `[bpos, epos)` in place
    pub fn replace_range_with(
        &mut self,
        bpos: usize,
        epos: usize,
        mut replace: impl FnMut(char) -> char,
    ) {
        let epos = epos.min(self.buffer.len());
        for slot in &mut self.buffer[bpos.min(epos)..epos] {
            *slot = replace(*slot);
        }
    }

    /// Find the next/previous occurrence of `c`, starting strictly after
    /// (resp. before) `from`.
    pub fn find(&self, c: char, from: usize, forward: bool) -> Option<usize> {
        if forward {
            self.buffer
                .iter()
                .enumerate()
                .skip(from.saturating_add(1))
                .find(|(_, ch)| **ch == c)
                .map(|(i, _)| i)
        } else {
            self.buffer[..from.min(self.buffer.len())]
                .iter()
                .rposition(|ch| *ch == c)
        }
    }

    //
    // Logical-line geometry ------------------------------------------------
    //

    /// Start position of the logical line containing `pos`
    pub fn line_start(&self, pos: usize) -> usize {
        let pos = pos.min(self.buffer.len());
        self.buffer[..pos]
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(0, |nl| nl + 1)
    }

    /// Exclusive end position of the logical line containing `pos`
    /// (index of the terminating newline, or `len()` on the last line)
    pub fn line_end(&self, pos: usize) -> usize {
        let pos = pos.min(self.buffer.len());
        self.buffer[pos..]
            .iter()
            .position(|c| *c == '\n')
            .map_or(self.buffer.len(), |nl| pos + nl)
    }

    /// Zero-based row of `pos`
    pub fn line_of(&self, pos: usize) -> usize {
        let pos = pos.min(self.buffer.len());
        self.buffer[..pos].iter().filter(|c| **c == '\n').count()
    }

    /// Column of `pos` within its logical line
    pub fn column_of(&self, pos: usize) -> usize {
        pos.min(self.buffer.len()) - self.line_start(pos)
    }

    /// Position of `col` (clamped to the line length) on the zero-based `row`
    pub fn pos_at(&self, row: usize, col: usize) -> usize {
        let mut start = 0;
        for _ in 0..row {
            match self.buffer[start..].iter().position(|c| *c == '\n') {
                Some(nl) => start += nl + 1,
                None => break,
            }
        }
        let end = self.line_end(start);
        (start + col).min(end)
    }

    //
    // Word tokenizers ------------------------------------------------------
    //

    /// Start of the next word after `pos` (vi `w`/`W`)
    pub fn next_word_start(&self, pos: usize, blank_only: bool) -> usize {
        let n = self.buffer.len();
        if n == 0 {
            return 0;
        }
        let mut i = pos.min(n - 1);
        let start = class_of(self.buffer[i], blank_only);
        if start != CharClass::Blank {
            while i < n && class_of(self.buffer[i], blank_only) == start {
                i += 1;
            }
        }
        while i < n && self.buffer[i].is_whitespace() {
            i += 1;
        }
        i
    }

    /// End (inclusive) of the current or next word (vi `e`/`E`)
    pub fn word_end(&self, pos: usize, blank_only: bool) -> usize {
        let n = self.buffer.len();
        if n == 0 {
            return 0;
        }
        let mut i = (pos + 1).min(n - 1);
        while i < n - 1 && self.buffer[i].is_whitespace() {
            i += 1;
        }
        let start = class_of(self.buffer[i], blank_only);
        while i + 1 < n
            && class_of(self.buffer[i + 1], blank_only) == start
            && start != CharClass::Blank
        {
            i += 1;
        }
        i
    }

    /// Start of the current or previous word (vi `b`/`B`)
    pub fn prev_word_start(&self, pos: usize, blank_only: bool) -> usize {
        if self.buffer.is_empty() || pos == 0 {
            return 0;
        }
        let mut i = pos.min(self.buffer.len()) - 1;
        while i > 0 && self.buffer[i].is_whitespace() {
            i -= 1;
        }
        let start = class_of(self.buffer[i], blank_only);
        while i > 0 && class_of(self.buffer[i - 1], blank_only) == start && start != CharClass::Blank
        {
            i -= 1;
        }
        i
    }

    /// End (inclusive) of the previous word (vi `ge`/`gE`)
    pub fn prev_word_end(&self, pos: usize, blank_only: bool) -> usize {
        if self.buffer.is_empty() || pos == 0 {
            return 0;
        }
        let mut i = pos.min(self.buffer.len() - 1);
        let start = class_of(self.buffer[i], blank_only);
        while i > 0 && start != CharClass::Blank && class_of(self.buffer[i - 1], blank_only) == start
        {
            i -= 1;
        }
        if i == 0 {
            return 0;
        }
        i -= 1;
        while i > 0 && self.buffer[i].is_whitespace() {
            i -= 1;
        }
        i
    }

    /// Inclusive bounds of the word under (or right of) `pos`
    pub fn select_word(&self, pos: usize) -> (usize, usize) {
        self.select_token(pos, false)
    }

    /// Inclusive bounds of the blank-word under (or right of) `pos`
    pub fn select_blank_word(&self, pos: usize) -> (usize, usize) {
        self.select_token(pos, true)
    }

    fn select_token(&self, pos: usize, blank_only: bool) -> (usize, usize) {
        let n = self.buffer.len();
        if n == 0 {
            return (0, 0);
        }
        let mut i = pos.min(n - 1);
        while i < n - 1 && self.buffer[i].is_whitespace() {
            i += 1;
        }
        let start = class_of(self.buffer[i], blank_only);
        let mut bpos = i;
        let mut epos = i;
        while bpos > 0 && class_of(self.buffer[bpos - 1], blank_only) == start {
            bpos -= 1;
        }
        while epos + 1 < n && class_of(self.buffer[epos + 1], blank_only) == start {
            epos += 1;
        }
        (bpos, epos)
    }

    /// Inclusive bounds of the shell word under `pos`.
    ///
    /// Shell words are split on whitespace, except that whitespace inside a
    /// matched pair of single or double quotes does not split.
    pub fn select_shell_word(&self, pos: usize) -> (usize, usize) {
        let n = self.buffer.len();
        if n == 0 {
            return (0, 0);
        }
        let pos = pos.min(n - 1);

        let mut words: Vec<(usize, usize)> = Vec::new();
        let mut quote: Option<char> = None;
        let mut start: Option<usize> = None;

        for (i, &c) in self.buffer.iter().enumerate() {
            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                }
                None => {
                    if c == '\'' || c == '"' {
                        quote = Some(c);
                    } else if c.is_whitespace() {
                        if let Some(b) = start.take() {
                            words.push((b, i - 1));
                        }
                        continue;
                    }
                }
            }
            if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(b) = start {
            words.push((b, n - 1));
        }

        words
            .iter()
            .find(|(b, e)| pos >= *b && pos <= *e)
            .or_else(|| words.iter().find(|(b, _)| *b > pos))
            .copied()
            .unwrap_or((pos, pos))
    }

    //
    // Surround helpers -----------------------------------------------------
    //

    /// Positions of the surround pair for `c` enclosing `pos`.
    ///
    /// The opening character is searched backwards from the cursor (the
    /// cursor itself may sit on it), the closing one forwards.
    pub fn find_surround(&self, c: char, pos: usize) -> (Option<usize>, Option<usize>) {
        let (open, close) = match_surround(c);
        if self.buffer.is_empty() {
            return (None, None);
        }
        let pos = pos.min(self.buffer.len() - 1);

        let bpos = if self.buffer[pos] == open {
            Some(pos)
        } else {
            self.find(open, pos, false)
        };
        let epos = if open != close && self.buffer[pos] == close {
            Some(pos)
        } else {
            self.find(close, pos, true)
        };

        match (bpos, epos) {
            (Some(b), Some(e)) if b < e => (Some(b), Some(e)),
            _ => (None, None),
        }
    }

    /// Positions of the quote pair enclosing `pos`, for single (`'`) or
    /// double (`"`) quotes. Quote parity is counted from the start of the
    /// buffer, so the `b` in `"a" b "c"` is not treated as quoted.
    pub fn surround_quotes(&self, single: bool, pos: usize) -> (Option<usize>, Option<usize>) {
        let quote = if single { '\'' } else { '"' };
        let pos = pos.min(self.buffer.len());

        let before = self.buffer[..pos].iter().filter(|c| **c == quote).count();
        if before % 2 == 0 {
            return (None, None);
        }

        let open = self.buffer[..pos]
            .iter()
            .rposition(|c| *c == quote)
            .expect("odd count implies at least one quote");
        let close = self.buffer[pos..]
            .iter()
            .position(|c| *c == quote)
            .map(|i| pos + i);

        (Some(open), close)
    }

    /// Position of the bracket matching the one at `pos`, scanning with
    /// nesting depth. Returns `None` when `pos` is not on a bracket or the
    /// pair is unbalanced.
    pub fn matching_bracket(&self, pos: usize) -> Option<usize> {
        let c = self.char_at(pos)?;
        let (open, close, forward) = match c {
            '(' => ('(', ')', true),
            '[' => ('[', ']', true),
            '{' => ('{', '}', true),
            ')' => ('(', ')', false),
            ']' => ('[', ']', false),
            '}' => ('{', '}', false),
            _ => return None,
        };

        let mut depth = 0usize;
        if forward {
            for (i, &ch) in self.buffer.iter().enumerate().skip(pos) {
                if ch == open {
                    depth += 1;
                } else if ch == close {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
            }
        } else {
            for i in (0..=pos).rev() {
                let ch = self.buffer[i];
                if ch == close {
                    depth += 1;
                } else if ch == open {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn buffer(s: &str) -> LineBuffer {
        LineBuffer::from(s)
    }

    #[test]
    fn insert_and_cut_are_code_point_based() {
        let mut buf = buffer("héllo");
        buf.insert(2, &['x']);
        assert_eq!(buf.to_string(), "héxllo");
        assert_eq!(buf.cut(1, 3), "éx");
        assert_eq!(buf.to_string(), "hllo");
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn cut_char_out_of_bounds_is_none() {
        let mut buf = buffer("ab");
        assert_eq!(buf.cut_char(5), None);
        assert_eq!(buf.cut_char(1), Some('b'));
    }

    #[rstest]
    #[case("the quick brown fox", 0, false, 4)] // the -> quick
    #[case("the quick brown fox", 4, false, 10)] // quick -> brown
    #[case("foo.bar baz", 0, false, 3)] // word stops at punctuation
    #[case("foo.bar baz", 0, true, 8)] // blank word skips over it
    #[case("tail", 2, false, 4)] // end of buffer
    fn next_word_start_cases(
        #[case] line: &str,
        #[case] pos: usize,
        #[case] blank: bool,
        #[case] expected: usize,
    ) {
        assert_eq!(buffer(line).next_word_start(pos, blank), expected);
    }

    #[rstest]
    #[case("the quick brown fox", 0, 2)]
    #[case("the quick brown fox", 2, 8)] // from a word end, jumps to the next
    #[case("a b", 0, 2)]
    fn word_end_cases(#[case] line: &str, #[case] pos: usize, #[case] expected: usize) {
        assert_eq!(buffer(line).word_end(pos, false), expected);
    }

    #[rstest]
    #[case("the quick brown fox", 10, 4)] // brown -> quick
    #[case("the quick", 4, 0)]
    #[case("", 0, 0)]
    fn prev_word_start_cases(#[case] line: &str, #[case] pos: usize, #[case] expected: usize) {
        assert_eq!(buffer(line).prev_word_start(pos, false), expected);
    }

    #[test]
    fn select_word_bounds_are_inclusive() {
        let buf = buffer("one two three");
        assert_eq!(buf.select_word(5), (4, 6));
        assert_eq!(buf.select_blank_word(9), (8, 12));
    }

    #[test]
    fn shell_word_respects_quotes() {
        let buf = buffer(r#"echo "hello world" done"#);
        assert_eq!(buf.select_shell_word(8), (5, 17));
        assert_eq!(buf.select_shell_word(0), (0, 3));
        assert_eq!(buf.select_shell_word(20), (19, 22));
    }

    #[test]
    fn find_is_exclusive_of_start() {
        let buf = buffer("abcabc");
        assert_eq!(buf.find('a', 0, true), Some(3));
        assert_eq!(buf.find('c', 5, false), Some(2));
        assert_eq!(buf.find('z', 0, true), None);
    }

    #[test]
    fn logical_line_geometry() {
        let buf = buffer("one\ntwo\nthree");
        assert_eq!(buf.num_lines(), 3);
        assert_eq!(buf.line_start(5), 4);
        assert_eq!(buf.line_end(5), 7);
        assert_eq!(buf.line_of(5), 1);
        assert_eq!(buf.column_of(5), 1);
        assert_eq!(buf.pos_at(2, 1), 9);
        assert_eq!(buf.pos_at(0, 10), 3); // clamped to line end
    }

    #[test]
    fn surround_quotes_uses_parity() {
        let buf = buffer(r#"say "hi there" now"#);
        assert_eq!(buf.surround_quotes(false, 7), (Some(4), Some(13)));
        assert_eq!(buf.surround_quotes(false, 16), (None, None));
    }

    #[test]
    fn find_surround_pairs() {
        let buf = buffer("call(arg, other)");
        assert_eq!(buf.find_surround('(', 7), (Some(4), Some(15)));
        assert_eq!(buf.find_surround('[', 7), (None, None));
    }

    #[test]
    fn matching_bracket_nested() {
        let buf = buffer("a(b(c)d)e");
        assert_eq!(buf.matching_bracket(1), Some(7));
        assert_eq!(buf.matching_bracket(7), Some(1));
        assert_eq!(buf.matching_bracket(3), Some(5));
        assert_eq!(buf.matching_bracket(0), None);
    }
}
